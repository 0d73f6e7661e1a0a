//! Job recommendations: every job scored for one user, best first.

use uuid::Uuid;

use crate::matching::matcher::{JobMatch, JobMatcher};
use crate::models::{Job, SkillRecord};

pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;
pub const MAX_RECOMMENDATION_LIMIT: usize = 50;

pub fn effective_limit(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_RECOMMENDATION_LIMIT)
        .min(MAX_RECOMMENDATION_LIMIT)
}

/// Ranks by match percentage (desc), then title, then job id.
pub fn rank_jobs(
    matcher: &dyn JobMatcher,
    user_id: Uuid,
    skills: &[SkillRecord],
    jobs: &[Job],
    limit: usize,
) -> Vec<JobMatch> {
    let mut ranked: Vec<JobMatch> = jobs
        .iter()
        .map(|job| matcher.score(user_id, skills, job))
        .collect();

    ranked.sort_by(|a, b| {
        b.match_percentage
            .cmp(&a.match_percentage)
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.job_id.cmp(&b.job_id))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::matcher::WeightedJobMatcher;
    use crate::models::skill::ManualEvidence;
    use crate::models::{Evidence, JobRequirement, Proficiency, Skill, SkillCategory};
    use chrono::Utc;

    fn job(title: &str, requirement: &str) -> Job {
        Job {
            id: Uuid::new_v4(),
            title: title.to_string(),
            company: "Acme".to_string(),
            required_skills: vec![JobRequirement {
                name: requirement.to_string(),
                minimum_proficiency: Proficiency::new(50.0),
                weight: None,
            }],
            created_at: Utc::now(),
        }
    }

    fn rust_skill(user_id: Uuid) -> SkillRecord {
        SkillRecord {
            id: Uuid::new_v4(),
            user_id,
            skill: Skill {
                name: "Rust".to_string(),
                category: SkillCategory::Language,
                proficiency: Proficiency::new(70.0),
                evidence: Evidence::Manual(ManualEvidence {
                    mentions: 1,
                    note: None,
                }),
            },
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_limit_defaults_and_caps() {
        assert_eq!(effective_limit(None), 10);
        assert_eq!(effective_limit(Some(3)), 3);
        assert_eq!(effective_limit(Some(500)), 50);
    }

    #[test]
    fn test_ranks_by_percentage_then_title() {
        let user = Uuid::new_v4();
        let skills = vec![rust_skill(user)];
        let jobs = vec![
            job("Zeta Java Dev", "Java"),
            job("Beta Rust Dev", "Rust"),
            job("Alpha Java Dev", "Java"),
        ];

        let ranked = rank_jobs(&WeightedJobMatcher, user, &skills, &jobs, 10);
        let titles: Vec<_> = ranked.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["Beta Rust Dev", "Alpha Java Dev", "Zeta Java Dev"]);
        assert_eq!(ranked[0].match_percentage, 100);
    }

    #[test]
    fn test_truncates_to_limit() {
        let jobs: Vec<Job> = (0..5).map(|i| job(&format!("Job {i}"), "Go")).collect();
        let ranked = rank_jobs(&WeightedJobMatcher, Uuid::new_v4(), &[], &jobs, 2);
        assert_eq!(ranked.len(), 2);
    }
}
