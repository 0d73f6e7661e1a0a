pub mod job;
pub mod learning;
pub mod skill;

pub use job::{Job, JobQuery, JobRequirement, NewJob};
pub use learning::{LearningPath, LearningTask, SkillTarget, TaskPriority, TaskStatus};
pub use skill::{Evidence, Proficiency, Skill, SkillCategory, SkillRecord, SkillSource};
