//! Job Matcher: pluggable, trait-based scorer that measures a user's skill set
//! against a job's declared requirements.
//!
//! Default: `WeightedJobMatcher` (pure, deterministic).
//!
//! `AppState` holds an `Arc<dyn JobMatcher>`.

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Job, Proficiency, SkillRecord};
use crate::skills::aggregator::ProficiencyIndex;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// A requirement the user holds at some level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementMatch {
    pub name: String,
    pub user_proficiency: Proficiency,
    pub minimum_proficiency: Proficiency,
    pub weight: f64,
}

/// A requirement the user has no record of.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingRequirement {
    pub name: String,
    pub minimum_proficiency: Proficiency,
    pub weight: f64,
}

/// Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobMatch {
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub company: String,
    pub match_percentage: u32, // 0 – 100
    pub matched: Vec<RequirementMatch>, // level ≥ minimum, full weight
    pub partial: Vec<RequirementMatch>, // level < minimum, half weight
    pub missing: Vec<MissingRequirement>,
    pub summary: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap the scoring strategy without touching handlers.
///
/// Carried in `AppState` as `Arc<dyn JobMatcher>`.
pub trait JobMatcher: Send + Sync {
    fn score(&self, user_id: Uuid, skills: &[SkillRecord], job: &Job) -> JobMatch;
}

// ────────────────────────────────────────────────────────────────────────────
// WeightedJobMatcher
// ────────────────────────────────────────────────────────────────────────────

const PARTIAL_CREDIT: f64 = 0.5;

/// Algorithm:
/// 1. For each requirement, user level = max proficiency across sources.
///    - level ≥ minimum → matched, earns the full weight
///    - level < minimum → partial, earns half the weight
///    - no record       → missing, earns nothing
/// 2. match_percentage = round(earned / possible × 100), halves away from zero
/// 3. No requirements → 100
pub struct WeightedJobMatcher;

impl JobMatcher for WeightedJobMatcher {
    fn score(&self, user_id: Uuid, skills: &[SkillRecord], job: &Job) -> JobMatch {
        let index = ProficiencyIndex::from_records(skills);
        compute_weighted_match(user_id, &index, job)
    }
}

fn compute_weighted_match(user_id: Uuid, index: &ProficiencyIndex, job: &Job) -> JobMatch {
    let mut matched = Vec::new();
    let mut partial = Vec::new();
    let mut missing = Vec::new();

    let mut possible = 0.0_f64;
    let mut earned = 0.0_f64;

    for requirement in &job.required_skills {
        let weight = requirement.effective_weight();
        possible += weight;

        match index.level(&requirement.name) {
            Some(level) => {
                let entry = RequirementMatch {
                    name: requirement.name.clone(),
                    user_proficiency: level,
                    minimum_proficiency: requirement.minimum_proficiency,
                    weight,
                };
                if level >= requirement.minimum_proficiency {
                    earned += weight;
                    matched.push(entry);
                } else {
                    earned += weight * PARTIAL_CREDIT;
                    partial.push(entry);
                }
            }
            None => missing.push(MissingRequirement {
                name: requirement.name.clone(),
                minimum_proficiency: requirement.minimum_proficiency,
                weight,
            }),
        }
    }

    let match_percentage = if possible > 0.0 {
        ((earned / possible) * 100.0).round().clamp(0.0, 100.0) as u32
    } else {
        100
    };

    let summary = build_summary(match_percentage, &partial, &missing);

    JobMatch {
        job_id: job.id,
        user_id,
        title: job.title.clone(),
        company: job.company.clone(),
        match_percentage,
        matched,
        partial,
        missing,
        summary,
    }
}

/// Human-readable one-liner naming the first few gaps.
fn build_summary(percentage: u32, partial: &[RequirementMatch], missing: &[MissingRequirement]) -> String {
    let gaps: Vec<&str> = missing
        .iter()
        .map(|m| m.name.as_str())
        .chain(partial.iter().map(|p| p.name.as_str()))
        .take(3)
        .collect();

    if gaps.is_empty() {
        format!("Full match ({percentage}%). Every requirement is met.")
    } else if percentage >= 70 {
        format!("Strong match ({percentage}%). Remaining gaps: {}.", gaps.join(", "))
    } else if percentage >= 40 {
        format!("Moderate match ({percentage}%). Work on: {}.", gaps.join(", "))
    } else {
        format!("Low match ({percentage}%). Significant gaps: {}.", gaps.join(", "))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::skill::ManualEvidence;
    use crate::models::{Evidence, JobRequirement, Skill, SkillCategory};
    use chrono::Utc;

    fn record(user_id: Uuid, name: &str, proficiency: f64) -> SkillRecord {
        SkillRecord {
            id: Uuid::new_v4(),
            user_id,
            skill: Skill {
                name: name.to_string(),
                category: SkillCategory::Language,
                proficiency: Proficiency::new(proficiency),
                evidence: Evidence::Manual(ManualEvidence {
                    mentions: 1,
                    note: None,
                }),
            },
            updated_at: Utc::now(),
        }
    }

    fn make_job(requirements: Vec<(&str, f64, Option<f64>)>) -> Job {
        Job {
            id: Uuid::new_v4(),
            title: "Data Engineer".to_string(),
            company: "Acme".to_string(),
            required_skills: requirements
                .into_iter()
                .map(|(name, minimum, weight)| JobRequirement {
                    name: name.to_string(),
                    minimum_proficiency: Proficiency::new(minimum),
                    weight,
                })
                .collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_weighted_example_rounds_half_up() {
        let user = Uuid::new_v4();
        let skills = vec![record(user, "Python", 80.0), record(user, "SQL", 40.0)];
        let job = make_job(vec![
            ("Python", 60.0, Some(2.0)),
            ("SQL", 60.0, Some(1.0)),
            ("Go", 50.0, Some(1.0)),
        ]);

        let report = WeightedJobMatcher.score(user, &skills, &job);

        // (2 + 0.5 + 0) / 4 = 62.5%
        assert_eq!(report.match_percentage, 63);
        assert_eq!(report.matched.len(), 1);
        assert_eq!(report.matched[0].name, "Python");
        assert_eq!(report.partial.len(), 1);
        assert_eq!(report.partial[0].name, "SQL");
        assert_eq!(report.missing.len(), 1);
        assert_eq!(report.missing[0].name, "Go");
    }

    #[test]
    fn test_no_requirements_is_full_match() {
        let report = WeightedJobMatcher.score(Uuid::new_v4(), &[], &make_job(vec![]));
        assert_eq!(report.match_percentage, 100);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn test_no_skills_scores_zero() {
        let job = make_job(vec![("Rust", 50.0, None), ("Go", 50.0, None)]);
        let report = WeightedJobMatcher.score(Uuid::new_v4(), &[], &job);
        assert_eq!(report.match_percentage, 0);
        assert_eq!(report.missing.len(), 2);
    }

    #[test]
    fn test_user_level_is_max_across_sources_and_synonyms() {
        let user = Uuid::new_v4();
        let skills = vec![record(user, "golang", 30.0), record(user, "Go", 75.0)];
        let job = make_job(vec![("GO", 70.0, None)]);

        let report = WeightedJobMatcher.score(user, &skills, &job);
        assert_eq!(report.match_percentage, 100);
        assert_eq!(report.matched[0].user_proficiency.value(), 75.0);
    }

    #[test]
    fn test_meeting_minimum_exactly_counts_as_matched() {
        let user = Uuid::new_v4();
        let skills = vec![record(user, "Rust", 60.0)];
        let job = make_job(vec![("Rust", 60.0, None)]);
        let report = WeightedJobMatcher.score(user, &skills, &job);
        assert_eq!(report.matched.len(), 1);
        assert!(report.partial.is_empty());
    }

    #[test]
    fn test_percentage_bounded_0_to_100() {
        let user = Uuid::new_v4();
        let skills = vec![record(user, "Rust", 100.0)];
        let job = make_job(vec![("Rust", 0.0, Some(1000.0)), ("Java", 100.0, Some(0.001))]);
        let report = WeightedJobMatcher.score(user, &skills, &job);
        assert!(report.match_percentage <= 100);
    }

    #[test]
    fn test_summary_names_gaps() {
        let user = Uuid::new_v4();
        let job = make_job(vec![("Kubernetes", 50.0, None)]);
        let report = WeightedJobMatcher.score(user, &[], &job);
        assert!(report.summary.contains("Kubernetes"));
        assert!(report.summary.starts_with("Low match"));
    }
}
