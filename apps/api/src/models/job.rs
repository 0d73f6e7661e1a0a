use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::skill::Proficiency;

pub const DEFAULT_REQUIREMENT_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequirement {
    pub name: String,
    pub minimum_proficiency: Proficiency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl JobRequirement {
    pub fn effective_weight(&self) -> f64 {
        match self.weight {
            Some(w) if w.is_finite() && w > 0.0 => w,
            _ => DEFAULT_REQUIREMENT_WEIGHT,
        }
    }
}

/// A job posting. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub required_skills: Vec<JobRequirement>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Case-insensitive substring match over title, company and requirement
    /// names. `needle` must already be lowercase.
    pub fn mentions(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.company.to_lowercase().contains(needle)
            || self
                .required_skills
                .iter()
                .any(|r| r.name.to_lowercase().contains(needle))
    }
}

/// Filters for listing jobs.
#[derive(Debug, Clone, Default)]
pub struct JobQuery {
    /// Lowercased, trimmed keyword. `None` matches every job.
    pub keyword: Option<String>,
    pub limit: Option<usize>,
}

impl JobQuery {
    pub fn new(keyword: Option<&str>, limit: Option<usize>) -> Self {
        Self {
            keyword: keyword
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty()),
            limit,
        }
    }

    pub fn matches(&self, job: &Job) -> bool {
        self.keyword.as_deref().map_or(true, |k| job.mentions(k))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub required_skills: Vec<JobRequirement>,
}

impl NewJob {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::InvalidRequest("title cannot be empty".to_string()));
        }
        for req in &self.required_skills {
            if req.name.trim().is_empty() {
                return Err(AppError::InvalidRequest(
                    "required skill name cannot be empty".to_string(),
                ));
            }
            if let Some(w) = req.weight {
                if !w.is_finite() || w <= 0.0 {
                    return Err(AppError::InvalidRequest(format!(
                        "weight for '{}' must be a positive number",
                        req.name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub required_skills: Json<Vec<JobRequirement>>,
    pub created_at: DateTime<Utc>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Job {
            id: row.id,
            title: row.title,
            company: row.company,
            required_skills: row.required_skills.0,
            created_at: row.created_at,
        }
    }
}
