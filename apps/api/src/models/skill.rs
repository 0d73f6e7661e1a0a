use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::skills::normalize::skill_key;

/// A 0 – 100 score. Construction and deserialization both clamp, so a
/// `Proficiency` can never hold an out-of-range value.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Proficiency(f64);

impl Proficiency {
    pub const MIN: Proficiency = Proficiency(0.0);
    pub const MAX: Proficiency = Proficiency(100.0);

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        Self(value.clamp(0.0, 100.0))
    }

    /// Clamps and rounds to one decimal place. Used for heuristic outputs.
    pub fn rounded(value: f64) -> Self {
        let clamped = Self::new(value).0;
        Self((clamped * 10.0).round() / 10.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Proficiency {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Proficiency> for f64 {
    fn from(p: Proficiency) -> Self {
        p.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkillCategory {
    Language,
    Framework,
    Algorithm,
    DataStructure,
    SoftSkill,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 5] = [
        SkillCategory::Language,
        SkillCategory::Framework,
        SkillCategory::Algorithm,
        SkillCategory::DataStructure,
        SkillCategory::SoftSkill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::Language => "language",
            SkillCategory::Framework => "framework",
            SkillCategory::Algorithm => "algorithm",
            SkillCategory::DataStructure => "data-structure",
            SkillCategory::SoftSkill => "soft-skill",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SkillCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown skill category '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillSource {
    #[serde(rename = "manual")]
    Manual,
    #[serde(rename = "code-analysis")]
    CodeAnalysis,
    #[serde(rename = "leetcode")]
    LeetCode,
    #[serde(rename = "github")]
    GitHub,
}

impl SkillSource {
    pub const ALL: [SkillSource; 4] = [
        SkillSource::Manual,
        SkillSource::CodeAnalysis,
        SkillSource::LeetCode,
        SkillSource::GitHub,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillSource::Manual => "manual",
            SkillSource::CodeAnalysis => "code-analysis",
            SkillSource::LeetCode => "leetcode",
            SkillSource::GitHub => "github",
        }
    }
}

impl fmt::Display for SkillSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeEvidence {
    pub language: Option<String>,
    pub occurrences: u32,
    pub line_count: u32,
    /// Control-flow points, 0 – 35.
    pub complexity: f64,
    /// Construct-variety points, 0 – 35.
    pub construct_variety: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeetCodeEvidence {
    pub problems_solved: u32,
    pub easy_solved: u32,
    pub medium_solved: u32,
    pub hard_solved: u32,
    pub acceptance_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubEvidence {
    pub repositories: u32,
    pub bytes_of_code: u64,
    pub stars: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualEvidence {
    pub mentions: u32,
    pub note: Option<String>,
}

/// Evidence backing a skill. The variant decides the skill's source, so the
/// source and the evidence shape can never disagree.
///
/// Serialized as `{"source": "...", "evidence": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "evidence")]
pub enum Evidence {
    #[serde(rename = "manual")]
    Manual(ManualEvidence),
    #[serde(rename = "code-analysis")]
    CodeAnalysis(CodeEvidence),
    #[serde(rename = "leetcode")]
    LeetCode(LeetCodeEvidence),
    #[serde(rename = "github")]
    GitHub(GitHubEvidence),
}

impl Evidence {
    pub fn source(&self) -> SkillSource {
        match self {
            Evidence::Manual(_) => SkillSource::Manual,
            Evidence::CodeAnalysis(_) => SkillSource::CodeAnalysis,
            Evidence::LeetCode(_) => SkillSource::LeetCode,
            Evidence::GitHub(_) => SkillSource::GitHub,
        }
    }

    /// Number of independent observations behind this evidence.
    pub fn data_points(&self) -> u32 {
        match self {
            Evidence::Manual(e) => e.mentions.max(1),
            Evidence::CodeAnalysis(e) => e.occurrences,
            Evidence::LeetCode(e) => e.problems_solved,
            Evidence::GitHub(e) => e.repositories,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub category: SkillCategory,
    pub proficiency: Proficiency,
    #[serde(flatten)]
    pub evidence: Evidence,
}

impl Skill {
    pub fn source(&self) -> SkillSource {
        self.evidence.source()
    }

    /// Case-insensitive, synonym-normalized identity of the skill name.
    pub fn key(&self) -> String {
        skill_key(&self.name)
    }
}

/// A skill as stored for one user. Unique per (user, key, source).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub skill: Skill,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SkillRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub name_key: String,
    pub category: String,
    pub proficiency: f64,
    pub source: String,
    pub evidence: Json<Evidence>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_proficiency_clamps_on_construction() {
        assert_eq!(Proficiency::new(140.0).value(), 100.0);
        assert_eq!(Proficiency::new(-3.0).value(), 0.0);
        assert_eq!(Proficiency::new(f64::NAN).value(), 0.0);
    }

    #[test]
    fn test_proficiency_clamps_on_deserialize() {
        let p: Proficiency = serde_json::from_str("250").unwrap();
        assert_eq!(p.value(), 100.0);
    }

    #[test]
    fn test_rounded_keeps_one_decimal() {
        assert_eq!(Proficiency::rounded(42.26).value(), 42.3);
    }

    #[test]
    fn test_skill_json_shape_is_flat_with_source_tag() {
        let skill = Skill {
            name: "Python".to_string(),
            category: SkillCategory::Language,
            proficiency: Proficiency::new(72.5),
            evidence: Evidence::Manual(ManualEvidence {
                mentions: 1,
                note: None,
            }),
        };
        let value = serde_json::to_value(&skill).unwrap();
        assert_eq!(value["source"], "manual");
        assert_eq!(value["category"], "language");
        assert_eq!(value["evidence"]["mentions"], 1);
        assert_eq!(value["proficiency"], 72.5);
    }

    #[test]
    fn test_skill_deserializes_leetcode_evidence() {
        let value = json!({
            "name": "Dynamic Programming",
            "category": "algorithm",
            "proficiency": 64.0,
            "source": "leetcode",
            "evidence": {
                "problems_solved": 16,
                "easy_solved": 0,
                "medium_solved": 0,
                "hard_solved": 0,
                "acceptance_rate": 0.7
            }
        });
        let skill: Skill = serde_json::from_value(value).unwrap();
        assert_eq!(skill.source(), SkillSource::LeetCode);
        assert_eq!(skill.evidence.data_points(), 16);
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in SkillCategory::ALL {
            assert_eq!(category.as_str().parse::<SkillCategory>(), Ok(category));
        }
        assert!("cooking".parse::<SkillCategory>().is_err());
    }

    #[test]
    fn test_manual_evidence_counts_at_least_one_point() {
        let evidence = Evidence::Manual(ManualEvidence {
            mentions: 0,
            note: None,
        });
        assert_eq!(evidence.data_points(), 1);
    }
}
