//! Skill Aggregator: merges extracted skills into a user's stored set and
//! summarizes that set.
//!
//! Identity is (user, normalized name, source). Re-analysis of the same source
//! overwrites; evidence from different sources lives side by side, and readers
//! that need one number per skill take the maximum across sources.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Proficiency, Skill, SkillCategory, SkillRecord, SkillSource};
use crate::skills::normalize::skill_key;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub inserted: usize,
    pub updated: usize,
}

/// Last-write-wins merge of `incoming` into `stored` for one user.
pub fn merge_skills(
    stored: &mut Vec<SkillRecord>,
    user_id: Uuid,
    incoming: Vec<Skill>,
    now: DateTime<Utc>,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for skill in incoming {
        let key = skill.key();
        let source = skill.source();
        let existing = stored
            .iter_mut()
            .find(|r| r.user_id == user_id && r.skill.source() == source && r.skill.key() == key);

        match existing {
            Some(record) => {
                record.skill = skill;
                record.updated_at = now;
                outcome.updated += 1;
            }
            None => {
                stored.push(SkillRecord {
                    id: Uuid::new_v4(),
                    user_id,
                    skill,
                    updated_at: now,
                });
                outcome.inserted += 1;
            }
        }
    }

    outcome
}

/// One entry per normalized skill name, folded across sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillSummary {
    pub name: String,
    /// Category of the strongest record.
    pub category: SkillCategory,
    /// Maximum proficiency across sources.
    pub proficiency: Proficiency,
    pub sources: Vec<SkillSource>,
    /// Evidence data points summed across sources.
    pub data_points: u32,
}

/// Folds records into per-name summaries, ordered by normalized name.
pub fn summarize(records: &[SkillRecord]) -> Vec<SkillSummary> {
    let mut by_key: BTreeMap<String, SkillSummary> = BTreeMap::new();

    for record in records {
        let skill = &record.skill;
        let entry = by_key.entry(skill.key()).or_insert_with(|| SkillSummary {
            name: skill.name.clone(),
            category: skill.category,
            proficiency: skill.proficiency,
            sources: Vec::new(),
            data_points: 0,
        });
        if skill.proficiency > entry.proficiency {
            entry.name = skill.name.clone();
            entry.category = skill.category;
            entry.proficiency = skill.proficiency;
        }
        if !entry.sources.contains(&skill.source()) {
            entry.sources.push(skill.source());
            entry.sources.sort();
        }
        entry.data_points = entry.data_points.saturating_add(skill.evidence.data_points());
    }

    by_key.into_values().collect()
}

/// Lookup of a user's current level per normalized skill name.
#[derive(Debug, Clone, Default)]
pub struct ProficiencyIndex {
    levels: HashMap<String, Proficiency>,
}

impl ProficiencyIndex {
    pub fn from_records(records: &[SkillRecord]) -> Self {
        let mut levels: HashMap<String, Proficiency> = HashMap::new();
        for record in records {
            let level = levels.entry(record.skill.key()).or_insert(Proficiency::MIN);
            if record.skill.proficiency > *level {
                *level = record.skill.proficiency;
            }
        }
        Self { levels }
    }

    /// Maximum proficiency across sources, `None` when the user has no record.
    pub fn level(&self, name: &str) -> Option<Proficiency> {
        self.levels.get(&skill_key(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Statistics
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct StatsOptions {
    pub top_n: usize,
    /// Minimum summed data points before a skill may appear as an improvement area.
    pub min_evidence: u32,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            top_n: 5,
            min_evidence: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillLevel {
    pub name: String,
    pub proficiency: Proficiency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category: SkillCategory,
    pub count: usize,
    pub average_proficiency: f64,
    pub strongest: SkillLevel,
    pub weakest: SkillLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceCount {
    pub source: SkillSource,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillStatistics {
    pub total_records: usize,
    pub total_skills: usize,
    pub average_proficiency: f64,
    pub categories: Vec<CategoryBreakdown>,
    pub sources: Vec<SourceCount>,
    pub top_skills: Vec<SkillLevel>,
    pub improvement_areas: Vec<SkillLevel>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        round1(sum / count as f64)
    }
}

fn level_of(summary: &SkillSummary) -> SkillLevel {
    SkillLevel {
        name: summary.name.clone(),
        proficiency: summary.proficiency,
    }
}

/// Strongest first; equal proficiencies ordered by name.
fn by_strength_desc(a: &SkillSummary, b: &SkillSummary) -> std::cmp::Ordering {
    b.proficiency
        .value()
        .total_cmp(&a.proficiency.value())
        .then_with(|| a.name.cmp(&b.name))
}

fn by_strength_asc(a: &SkillSummary, b: &SkillSummary) -> std::cmp::Ordering {
    a.proficiency
        .value()
        .total_cmp(&b.proficiency.value())
        .then_with(|| a.name.cmp(&b.name))
}

pub fn compute_statistics(records: &[SkillRecord], options: &StatsOptions) -> SkillStatistics {
    let summaries = summarize(records);

    let categories = SkillCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let mut members: Vec<&SkillSummary> =
                summaries.iter().filter(|s| s.category == category).collect();
            if members.is_empty() {
                return None;
            }
            members.sort_by(|a, b| by_strength_desc(a, b));
            let strongest = members.first().map(|s| level_of(s))?;
            let weakest = members.last().map(|s| level_of(s))?;
            Some(CategoryBreakdown {
                category,
                count: members.len(),
                average_proficiency: average(members.iter().map(|s| s.proficiency.value())),
                strongest,
                weakest,
            })
        })
        .collect();

    let sources = SkillSource::ALL
        .into_iter()
        .map(|source| SourceCount {
            source,
            count: records.iter().filter(|r| r.skill.source() == source).count(),
        })
        .filter(|c| c.count > 0)
        .collect();

    let mut ranked: Vec<&SkillSummary> = summaries.iter().collect();
    ranked.sort_by(|a, b| by_strength_desc(a, b));
    let top_skills = ranked.iter().take(options.top_n).map(|s| level_of(s)).collect();

    let mut candidates: Vec<&SkillSummary> = summaries
        .iter()
        .filter(|s| s.data_points >= options.min_evidence)
        .collect();
    candidates.sort_by(|a, b| by_strength_asc(a, b));
    let improvement_areas = candidates
        .iter()
        .take(options.top_n)
        .map(|s| level_of(s))
        .collect();

    SkillStatistics {
        total_records: records.len(),
        total_skills: summaries.len(),
        average_proficiency: average(summaries.iter().map(|s| s.proficiency.value())),
        categories,
        sources,
        top_skills,
        improvement_areas,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::skill::{CodeEvidence, ManualEvidence};
    use crate::models::Evidence;

    fn manual(name: &str, category: SkillCategory, proficiency: f64, mentions: u32) -> Skill {
        Skill {
            name: name.to_string(),
            category,
            proficiency: Proficiency::new(proficiency),
            evidence: Evidence::Manual(ManualEvidence {
                mentions,
                note: None,
            }),
        }
    }

    fn from_code(name: &str, category: SkillCategory, proficiency: f64, occurrences: u32) -> Skill {
        Skill {
            name: name.to_string(),
            category,
            proficiency: Proficiency::new(proficiency),
            evidence: Evidence::CodeAnalysis(CodeEvidence {
                language: None,
                occurrences,
                line_count: 10,
                complexity: 0.0,
                construct_variety: 0.0,
            }),
        }
    }

    fn seeded(user: Uuid, skills: Vec<Skill>) -> Vec<SkillRecord> {
        let mut stored = Vec::new();
        merge_skills(&mut stored, user, skills, Utc::now());
        stored
    }

    #[test]
    fn test_merge_replaces_same_source_and_name() {
        let user = Uuid::new_v4();
        let mut stored = seeded(user, vec![manual("Python", SkillCategory::Language, 40.0, 1)]);

        let outcome = merge_skills(
            &mut stored,
            user,
            vec![manual("python", SkillCategory::Language, 65.0, 1)],
            Utc::now(),
        );

        assert_eq!(outcome, MergeOutcome { inserted: 0, updated: 1 });
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].skill.proficiency.value(), 65.0);
    }

    #[test]
    fn test_merge_keeps_sources_separate() {
        let user = Uuid::new_v4();
        let mut stored = seeded(user, vec![manual("Python", SkillCategory::Language, 40.0, 1)]);

        let outcome = merge_skills(
            &mut stored,
            user,
            vec![from_code("Python", SkillCategory::Language, 70.0, 3)],
            Utc::now(),
        );

        assert_eq!(outcome.inserted, 1);
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn test_merge_is_scoped_to_user() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut stored = seeded(alice, vec![manual("Go", SkillCategory::Language, 40.0, 1)]);

        let outcome = merge_skills(
            &mut stored,
            bob,
            vec![manual("Go", SkillCategory::Language, 10.0, 1)],
            Utc::now(),
        );

        assert_eq!(outcome.inserted, 1);
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn test_index_takes_max_across_sources_and_synonyms() {
        let user = Uuid::new_v4();
        let stored = seeded(
            user,
            vec![
                manual("golang", SkillCategory::Language, 30.0, 1),
                from_code("Go", SkillCategory::Language, 55.0, 4),
            ],
        );
        let index = ProficiencyIndex::from_records(&stored);

        assert_eq!(index.len(), 1);
        assert_eq!(index.level("GO").map(Proficiency::value), Some(55.0));
        assert!(index.level("Rust").is_none());
    }

    #[test]
    fn test_statistics_for_empty_set() {
        let stats = compute_statistics(&[], &StatsOptions::default());
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.total_skills, 0);
        assert_eq!(stats.average_proficiency, 0.0);
        assert!(stats.categories.is_empty());
        assert!(stats.sources.is_empty());
        assert!(stats.top_skills.is_empty());
        assert!(stats.improvement_areas.is_empty());
    }

    #[test]
    fn test_statistics_breakdown() {
        let user = Uuid::new_v4();
        let stored = seeded(
            user,
            vec![
                manual("Python", SkillCategory::Language, 80.0, 1),
                from_code("Python", SkillCategory::Language, 60.0, 5),
                manual("SQL", SkillCategory::Language, 40.0, 1),
                from_code("Pandas", SkillCategory::Framework, 35.0, 3),
            ],
        );
        let stats = compute_statistics(&stored, &StatsOptions::default());

        assert_eq!(stats.total_records, 4);
        assert_eq!(stats.total_skills, 3);
        // (80 + 40 + 35) / 3
        assert_eq!(stats.average_proficiency, 51.7);

        let languages = &stats.categories[0];
        assert_eq!(languages.category, SkillCategory::Language);
        assert_eq!(languages.count, 2);
        assert_eq!(languages.average_proficiency, 60.0);
        assert_eq!(languages.strongest.name, "Python");
        assert_eq!(languages.weakest.name, "SQL");

        assert_eq!(
            stats.sources,
            vec![
                SourceCount {
                    source: SkillSource::Manual,
                    count: 2
                },
                SourceCount {
                    source: SkillSource::CodeAnalysis,
                    count: 2
                },
            ]
        );
        let top: Vec<_> = stats.top_skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(top, ["Python", "SQL", "Pandas"]);
    }

    #[test]
    fn test_improvement_areas_require_enough_evidence() {
        let user = Uuid::new_v4();
        let stored = seeded(
            user,
            vec![
                manual("Rust", SkillCategory::Language, 10.0, 1),
                from_code("Docker", SkillCategory::Framework, 20.0, 2),
                from_code("Redis", SkillCategory::Framework, 30.0, 6),
            ],
        );
        let stats = compute_statistics(&stored, &StatsOptions::default());

        let weak: Vec<_> = stats
            .improvement_areas
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(weak, ["Docker", "Redis"]);
    }

    #[test]
    fn test_top_skills_ties_break_by_name() {
        let user = Uuid::new_v4();
        let stored = seeded(
            user,
            vec![
                manual("Zig", SkillCategory::Language, 50.0, 1),
                manual("Ada", SkillCategory::Language, 50.0, 1),
                manual("Go", SkillCategory::Language, 90.0, 1),
            ],
        );
        let options = StatsOptions {
            top_n: 2,
            min_evidence: 2,
        };
        let stats = compute_statistics(&stored, &options);
        let top: Vec<_> = stats.top_skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(top, ["Go", "Ada"]);
    }
}
