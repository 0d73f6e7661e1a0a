//! Learning Path Generator: target skills + current skills → ordered tasks.
//!
//! Ordering: job requirements before chosen targets, then smallest deficit
//! first, then normalized name. A path id is UUID v5 over the user and the
//! collapsed targets (or the job for job-derived paths); task ids are UUID v5
//! over (path, skill key, target). Regenerating a path with unchanged inputs
//! yields the same task list and never touches other paths.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::matcher::JobMatch;
use crate::models::{
    Job, LearningPath, LearningTask, Proficiency, SkillRecord, TaskPriority, TaskStatus,
};
use crate::skills::aggregator::ProficiencyIndex;
use crate::skills::normalize::{canonical_name, skill_key};

pub use crate::models::SkillTarget;

const HOURS_PER_WEEK: f64 = 10.0;

/// Where a path's targets came from. Decides the path identity and name.
#[derive(Debug, Clone, Copy)]
pub enum PathOrigin<'a> {
    Targets,
    Job(&'a Job),
}

#[derive(Debug, Clone, Copy)]
pub struct PathSettings {
    pub hours_per_point: f64,
    pub min_task_hours: u32,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            hours_per_point: 0.5,
            min_task_hours: 2,
        }
    }
}

impl PathSettings {
    pub fn estimate_hours(&self, deficit: f64) -> u32 {
        let raw = (deficit.max(0.0) * self.hours_per_point).ceil();
        (raw as u32).max(self.min_task_hours)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Current proficiency already reaches the target.
    CurrentLevel,
    /// A completed task already covered this target.
    CompletedTask,
    /// A task for this skill is under way.
    TaskInProgress,
}

/// A target that did not produce a new task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTarget {
    pub name: String,
    pub target_proficiency: Proficiency,
    pub current_proficiency: Proficiency,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningPlan {
    /// `None` only for a plan with nothing to learn that was never saved.
    pub path: Option<LearningPath>,
    pub tasks: Vec<LearningTask>,
    pub already_met: Vec<SkippedTarget>,
    pub in_progress: Vec<SkippedTarget>,
    pub total_estimated_hours: u32,
    pub estimated_weeks: u32,
}

impl LearningPlan {
    pub fn empty() -> Self {
        Self {
            path: None,
            tasks: Vec::new(),
            already_met: Vec::new(),
            in_progress: Vec::new(),
            total_estimated_hours: 0,
            estimated_weeks: 0,
        }
    }
}

struct CollapsedTarget {
    key: String,
    name: String,
    target: Proficiency,
    priority: TaskPriority,
}

/// Same normalized name → one target at the highest level; job requirement wins.
fn collapse_targets(targets: &[SkillTarget]) -> Result<Vec<CollapsedTarget>, AppError> {
    let mut by_key: BTreeMap<String, CollapsedTarget> = BTreeMap::new();

    for target in targets {
        let name = canonical_name(&target.name);
        if name.is_empty() {
            return Err(AppError::InvalidRequest(
                "target skill name cannot be empty".to_string(),
            ));
        }
        let priority = if target.job_requirement {
            TaskPriority::JobRequirement
        } else {
            TaskPriority::Chosen
        };
        let key = skill_key(&name);

        by_key
            .entry(key.clone())
            .and_modify(|existing| {
                if target.target_proficiency > existing.target {
                    existing.target = target.target_proficiency;
                }
                existing.priority = existing.priority.min(priority);
            })
            .or_insert(CollapsedTarget {
                key,
                name,
                target: target.target_proficiency,
                priority,
            });
    }

    Ok(by_key.into_values().collect())
}

fn path_id(user_id: Uuid, origin: PathOrigin<'_>, targets: &[CollapsedTarget]) -> Uuid {
    let identity = match origin {
        PathOrigin::Job(job) => format!("job:{}", job.id),
        PathOrigin::Targets => {
            let parts: Vec<String> = targets
                .iter()
                .map(|t| format!("{}:{:.1}", t.key, t.target.value()))
                .collect();
            format!("targets:{}", parts.join(","))
        }
    };
    Uuid::new_v5(&user_id, identity.as_bytes())
}

fn path_name(origin: PathOrigin<'_>, targets: &[CollapsedTarget]) -> String {
    match origin {
        PathOrigin::Job(job) if job.company.is_empty() => job.title.clone(),
        PathOrigin::Job(job) => format!("{} at {}", job.title, job.company),
        PathOrigin::Targets => {
            let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
            format!("Learning path: {}", names.join(", "))
        }
    }
}

pub fn task_id(path_id: Uuid, key: &str, target: Proficiency) -> Uuid {
    Uuid::new_v5(&path_id, format!("{key}:{:.1}", target.value()).as_bytes())
}

/// Builds the plan and the path that owns it. `existing_tasks` are the
/// user's stored tasks across all paths; completed and in-progress ones
/// suppress duplicates.
pub fn generate_plan(
    user_id: Uuid,
    origin: PathOrigin<'_>,
    targets: &[SkillTarget],
    skills: &[SkillRecord],
    existing_tasks: &[LearningTask],
    settings: &PathSettings,
    now: DateTime<Utc>,
) -> Result<LearningPlan, AppError> {
    if targets.is_empty() {
        return Err(AppError::InvalidRequest(
            "at least one target skill is required".to_string(),
        ));
    }

    let collapsed = collapse_targets(targets)?;
    let path = LearningPath {
        id: path_id(user_id, origin, &collapsed),
        user_id,
        name: path_name(origin, &collapsed),
        job_id: match origin {
            PathOrigin::Job(job) => Some(job.id),
            PathOrigin::Targets => None,
        },
        targets: collapsed
            .iter()
            .map(|t| SkillTarget {
                name: t.name.clone(),
                target_proficiency: t.target,
                job_requirement: t.priority == TaskPriority::JobRequirement,
            })
            .collect(),
        created_at: now,
        updated_at: now,
    };

    let index = ProficiencyIndex::from_records(skills);
    let mut already_met = Vec::new();
    let mut in_progress = Vec::new();
    let mut candidates: Vec<(CollapsedTarget, Proficiency, f64)> = Vec::new();

    for target in collapsed {
        let current = index.level(&target.name).unwrap_or(Proficiency::MIN);
        let skipped = |reason| SkippedTarget {
            name: target.name.clone(),
            target_proficiency: target.target,
            current_proficiency: current,
            reason,
        };

        let same_skill = existing_tasks
            .iter()
            .filter(|t| t.user_id == user_id && t.skill_key() == target.key);

        if current >= target.target {
            already_met.push(skipped(SkipReason::CurrentLevel));
            continue;
        }
        if same_skill
            .clone()
            .any(|t| t.status == TaskStatus::Completed && t.target_proficiency >= target.target)
        {
            already_met.push(skipped(SkipReason::CompletedTask));
            continue;
        }
        if same_skill.clone().any(|t| t.status == TaskStatus::InProgress) {
            in_progress.push(skipped(SkipReason::TaskInProgress));
            continue;
        }

        let deficit = target.target.value() - current.value();
        candidates.push((target, current, deficit));
    }

    candidates.sort_by(|(a, _, da), (b, _, db)| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| da.total_cmp(db))
            .then_with(|| a.key.cmp(&b.key))
    });

    let tasks: Vec<LearningTask> = candidates
        .into_iter()
        .enumerate()
        .map(|(order, (target, current, deficit))| LearningTask {
            id: task_id(path.id, &target.key, target.target),
            user_id,
            path_id: path.id,
            skill_target: target.name,
            target_proficiency: target.target,
            current_proficiency: current,
            estimated_hours: settings.estimate_hours(deficit),
            priority: target.priority,
            order_index: order as u32,
            status: TaskStatus::NotStarted,
            progress: 0,
            created_at: now,
            updated_at: now,
        })
        .collect();

    let total_estimated_hours: u32 = tasks.iter().map(|t| t.estimated_hours).sum();
    let estimated_weeks = if tasks.is_empty() {
        0
    } else {
        ((total_estimated_hours as f64 / HOURS_PER_WEEK).ceil() as u32).max(1)
    };

    Ok(LearningPlan {
        path: Some(path),
        tasks,
        already_met,
        in_progress,
        total_estimated_hours,
        estimated_weeks,
    })
}

/// A job's partial and missing requirements as job-priority targets at the
/// requirement minimum.
pub fn targets_from_match(report: &JobMatch) -> Vec<SkillTarget> {
    report
        .partial
        .iter()
        .map(|p| (p.name.as_str(), p.minimum_proficiency))
        .chain(
            report
                .missing
                .iter()
                .map(|m| (m.name.as_str(), m.minimum_proficiency)),
        )
        .map(|(name, minimum)| SkillTarget {
            name: name.to_string(),
            target_proficiency: minimum,
            job_requirement: true,
        })
        .collect()
}
