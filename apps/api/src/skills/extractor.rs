//! Skill Extractor: turns one uploaded artifact into zero or more `Skill` records.
//!
//! Pure functions over the input. Persistence belongs to the aggregator/store.
//!
//! Proficiency heuristic for source code (all parts clamped to 0 – 100):
//! - volume      = min(non-blank lines / 200, 1) × 30
//! - complexity  = min(control-flow keywords per line / 0.5, 1) × 35
//! - variety     = distinct construct kinds / 7 × 35
//! - language    = volume + complexity + variety
//! - keyword hit = 15 + min(occurrences, 10) × 5 + 0.3 × complexity + 0.3 × variety

use std::collections::HashMap;
use std::sync::OnceLock;

use bytes::Bytes;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::models::skill::{CodeEvidence, GitHubEvidence, LeetCodeEvidence, ManualEvidence};
use crate::models::{Evidence, Proficiency, Skill, SkillCategory, SkillSource};
use crate::skills::catalog::{self, CatalogEntry, LanguageSpec, CATALOG, LANGUAGES};
use crate::skills::normalize::{canonical_name, skill_key};

// ────────────────────────────────────────────────────────────────────────────
// Input artifacts
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CodeArtifact {
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicCount {
    pub topic: String,
    pub solved: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageCount {
    pub language: String,
    pub solved: u32,
}

/// LeetCode profile statistics, as parsed from a profile page or screenshot.
#[derive(Debug, Clone, Deserialize)]
pub struct LeetCodeStats {
    #[serde(default)]
    pub easy_solved: u32,
    #[serde(default)]
    pub medium_solved: u32,
    #[serde(default)]
    pub hard_solved: u32,
    /// Either a fraction (0.62) or a percentage (62.0).
    #[serde(default = "default_acceptance_rate")]
    pub acceptance_rate: f64,
    #[serde(default)]
    pub optimal_solution_rate: Option<f64>,
    #[serde(default)]
    pub topics: Vec<TopicCount>,
    #[serde(default)]
    pub languages: Vec<LanguageCount>,
}

fn default_acceptance_rate() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubLanguage {
    pub language: String,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub repositories: u32,
}

/// Aggregated view of a user's public repositories.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubSummary {
    #[serde(default)]
    pub languages: Vec<GitHubLanguage>,
    /// Repository topics, one entry per repository that carries the topic.
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub stars: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManualEntry {
    pub name: String,
    #[serde(default)]
    pub category: Option<SkillCategory>,
    pub proficiency: f64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content: Bytes,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact {
    Code(CodeArtifact),
    Text {
        text: String,
    },
    #[serde(rename = "leetcode")]
    LeetCode(LeetCodeStats),
    #[serde(rename = "github")]
    GitHub(GitHubSummary),
    Manual(ManualEntry),
    #[serde(skip)]
    Upload(UploadedFile),
}

impl Artifact {
    pub fn kind(&self) -> &'static str {
        match self {
            Artifact::Code(_) => "code",
            Artifact::Text { .. } => "text",
            Artifact::LeetCode(_) => "leetcode",
            Artifact::GitHub(_) => "github",
            Artifact::Manual(_) => "manual",
            Artifact::Upload(_) => "upload",
        }
    }

    fn file_name(&self) -> Option<&str> {
        match self {
            Artifact::Code(code) => code.file_name.as_deref(),
            Artifact::Upload(file) => Some(file.file_name.as_str()),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

/// Per-artifact result of a batch extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub index: usize,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub skills_found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchExtraction {
    pub skills: Vec<Skill>,
    pub outcomes: Vec<ItemOutcome>,
}

// ────────────────────────────────────────────────────────────────────────────
// Code metrics
// ────────────────────────────────────────────────────────────────────────────

const CONTROL_FLOW_PATTERN: &str =
    r"\b(if|else|elif|for|while|loop|match|switch|case|try|catch|except)\b";

/// One pattern per construct kind: function, type definition, loop,
/// conditional, error handling, closure, async.
const CONSTRUCT_PATTERNS: [&str; 7] = [
    r"\b(def|fn|func|function|fun)\s+\w+",
    r"\b(class|struct|interface|enum|trait)\s+\w+",
    r"\b(for|while|loop|foreach)\b",
    r"\b(if|switch|match|elif|case)\b",
    r"\b(try|catch|except|finally|rescue)\b|\?;",
    r"\blambda\b|=>|\|[\w\s,:&]*\|\s*[\w{(]",
    r"\b(async|await)\b|\bgo\s+func\b",
];

const LINES_FOR_FULL_VOLUME: f64 = 200.0;
const DENSITY_FOR_FULL_COMPLEXITY: f64 = 0.5;

struct Patterns {
    control_flow: Vec<Regex>,
    constructs: Vec<Regex>,
    signatures: Vec<Vec<Regex>>,
}

fn compile_all(sources: &[&str]) -> Vec<Regex> {
    sources.iter().filter_map(|s| Regex::new(s).ok()).collect()
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        control_flow: compile_all(&[CONTROL_FLOW_PATTERN]),
        constructs: compile_all(&CONSTRUCT_PATTERNS),
        signatures: LANGUAGES.iter().map(|l| compile_all(l.signatures)).collect(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodeMetrics {
    pub line_count: u32,
    pub control_flow: u32,
    pub construct_kinds: u32,
}

impl CodeMetrics {
    pub fn measure(text: &str) -> Self {
        let p = patterns();
        let line_count = text.lines().filter(|l| !l.trim().is_empty()).count() as u32;
        let control_flow = p
            .control_flow
            .iter()
            .map(|re| re.find_iter(text).count())
            .sum::<usize>() as u32;
        let construct_kinds = p.constructs.iter().filter(|re| re.is_match(text)).count() as u32;
        Self {
            line_count,
            control_flow,
            construct_kinds,
        }
    }

    pub fn volume_points(&self) -> f64 {
        (self.line_count as f64 / LINES_FOR_FULL_VOLUME).min(1.0) * 30.0
    }

    pub fn complexity_points(&self) -> f64 {
        if self.line_count == 0 {
            return 0.0;
        }
        let density = self.control_flow as f64 / self.line_count as f64;
        (density / DENSITY_FOR_FULL_COMPLEXITY).min(1.0) * 35.0
    }

    pub fn variety_points(&self) -> f64 {
        self.construct_kinds as f64 / CONSTRUCT_PATTERNS.len() as f64 * 35.0
    }

    pub fn language_score(&self) -> Proficiency {
        Proficiency::rounded(self.volume_points() + self.complexity_points() + self.variety_points())
    }

    pub fn keyword_score(&self, occurrences: usize) -> Proficiency {
        Proficiency::rounded(
            15.0 + occurrences.min(10) as f64 * 5.0
                + 0.3 * self.complexity_points()
                + 0.3 * self.variety_points(),
        )
    }
}

fn signature_hits(index: usize, text: &str) -> u32 {
    patterns().signatures[index]
        .iter()
        .map(|re| re.find_iter(text).count())
        .sum::<usize>() as u32
}

/// Picks the language with the most signature hits. Ties keep catalog order.
pub fn detect_language(text: &str) -> Option<(&'static LanguageSpec, u32)> {
    let mut best: Option<(&'static LanguageSpec, u32)> = None;
    for (index, spec) in LANGUAGES.iter().enumerate() {
        let hits = signature_hits(index, text);
        if hits > 0 && best.map_or(true, |(_, h)| hits > h) {
            best = Some((spec, hits));
        }
    }
    best
}

fn hits_for(spec: &LanguageSpec, text: &str) -> u32 {
    LANGUAGES
        .iter()
        .position(|l| l.name == spec.name)
        .map_or(0, |index| signature_hits(index, text))
}

/// Declared language wins, then the file extension, then signature detection.
fn resolve_language(text: &str, declared: Option<&str>, file_name: Option<&str>) -> Option<(String, u32)> {
    if let Some(declared) = declared.map(str::trim).filter(|d| !d.is_empty()) {
        return Some(match catalog::language_by_name(declared) {
            Some(spec) => (spec.name.to_string(), hits_for(spec, text)),
            None => (canonical_name(declared), 0),
        });
    }
    if let Some(spec) = file_name.and_then(catalog::language_by_extension) {
        return Some((spec.name.to_string(), hits_for(spec, text)));
    }
    detect_language(text).map(|(spec, hits)| (spec.name.to_string(), hits))
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction per artifact kind
// ────────────────────────────────────────────────────────────────────────────

fn code_skill(
    name: &str,
    category: SkillCategory,
    proficiency: Proficiency,
    occurrences: u32,
    metrics: &CodeMetrics,
    language: Option<&str>,
) -> Skill {
    Skill {
        name: name.to_string(),
        category,
        proficiency,
        evidence: Evidence::CodeAnalysis(CodeEvidence {
            language: language.map(str::to_string),
            occurrences,
            line_count: metrics.line_count,
            complexity: (metrics.complexity_points() * 10.0).round() / 10.0,
            construct_variety: (metrics.variety_points() * 10.0).round() / 10.0,
        }),
    }
}

fn count_keywords(lower: &str, entry: &CatalogEntry) -> usize {
    entry
        .keywords
        .iter()
        .map(|kw| catalog::count_term(lower, kw))
        .sum()
}

fn extract_source(text: &str, declared: Option<&str>, file_name: Option<&str>) -> Vec<Skill> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let metrics = CodeMetrics::measure(text);
    let lower = text.to_lowercase();
    let language = resolve_language(text, declared, file_name);
    let language_name = language.as_ref().map(|(name, _)| name.as_str());

    let mut skills = Vec::new();
    if let Some((name, hits)) = &language {
        skills.push(code_skill(
            name.as_str(),
            SkillCategory::Language,
            metrics.language_score(),
            (*hits).max(1),
            &metrics,
            Some(name.as_str()),
        ));
    }

    for entry in CATALOG.iter().filter(|e| e.category != SkillCategory::SoftSkill) {
        if language_name.is_some_and(|l| skill_key(l) == skill_key(entry.name)) {
            continue;
        }
        let occurrences = count_keywords(&lower, entry);
        if occurrences == 0 {
            continue;
        }
        skills.push(code_skill(
            entry.name,
            entry.category,
            metrics.keyword_score(occurrences),
            occurrences as u32,
            &metrics,
            language_name,
        ));
    }

    skills
}

/// Source code → language skill plus library/algorithm/data-structure hits.
/// Empty input yields an empty list.
pub fn extract_code(code: &CodeArtifact) -> Vec<Skill> {
    extract_source(&code.text, code.language.as_deref(), code.file_name.as_deref())
}

fn text_proficiency(mentions: usize) -> Proficiency {
    Proficiency::rounded((10.0 + mentions as f64 * 15.0).min(60.0))
}

fn text_skill(name: &str, category: SkillCategory, mentions: usize) -> Skill {
    Skill {
        name: name.to_string(),
        category,
        proficiency: text_proficiency(mentions),
        evidence: Evidence::Manual(ManualEvidence {
            mentions: mentions as u32,
            note: Some("free text".to_string()),
        }),
    }
}

/// Free text (resume prose, OCR output). Claims in prose are capped at 60.
pub fn extract_text(text: &str) -> Vec<Skill> {
    let lower = text.to_lowercase();
    if lower.trim().is_empty() {
        return Vec::new();
    }

    let mut skills = Vec::new();
    for lang in LANGUAGES {
        let mentions: usize = lang
            .text_terms
            .iter()
            .map(|t| catalog::count_term(&lower, t))
            .sum();
        if mentions > 0 {
            skills.push(text_skill(lang.name, SkillCategory::Language, mentions));
        }
    }
    for entry in CATALOG {
        let mentions = count_keywords(&lower, entry);
        if mentions > 0 {
            skills.push(text_skill(entry.name, entry.category, mentions));
        }
    }
    skills
}

fn normalize_rate(rate: f64) -> f64 {
    if !rate.is_finite() {
        return 0.0;
    }
    let fraction = if rate > 1.0 { rate / 100.0 } else { rate };
    fraction.clamp(0.0, 1.0)
}

/// LeetCode statistics → overall "Algorithms" plus per-topic and per-language skills.
///
/// Algorithms = min(easy + 3·medium + 5·hard + 20·optimal_rate, 100) × (0.5 + 0.5·acceptance)
pub fn extract_leetcode(stats: &LeetCodeStats) -> Vec<Skill> {
    let acceptance = normalize_rate(stats.acceptance_rate);
    let solved = stats
        .easy_solved
        .saturating_add(stats.medium_solved)
        .saturating_add(stats.hard_solved);
    let mut skills = Vec::new();

    let evidence = |problems_solved: u32, breakdown: bool| {
        Evidence::LeetCode(LeetCodeEvidence {
            problems_solved,
            easy_solved: if breakdown { stats.easy_solved } else { 0 },
            medium_solved: if breakdown { stats.medium_solved } else { 0 },
            hard_solved: if breakdown { stats.hard_solved } else { 0 },
            acceptance_rate: acceptance,
        })
    };

    if solved > 0 {
        let problem_solving = stats.easy_solved as f64
            + stats.medium_solved as f64 * 3.0
            + stats.hard_solved as f64 * 5.0;
        let optimal = normalize_rate(stats.optimal_solution_rate.unwrap_or(0.5)) * 20.0;
        let score = (problem_solving + optimal).min(100.0) * (0.5 + 0.5 * acceptance);
        skills.push(Skill {
            name: "Algorithms".to_string(),
            category: SkillCategory::Algorithm,
            proficiency: Proficiency::rounded(score),
            evidence: evidence(solved, true),
        });
    }

    for topic in stats.topics.iter().filter(|t| t.solved > 0) {
        let (name, category) = match catalog::entry_for(&topic.topic) {
            Some(entry) => (entry.name.to_string(), entry.category),
            None => (canonical_name(&topic.topic), SkillCategory::Algorithm),
        };
        if name.is_empty() {
            continue;
        }
        skills.push(Skill {
            name,
            category,
            proficiency: Proficiency::rounded(topic.solved as f64 * 4.0),
            evidence: evidence(topic.solved, false),
        });
    }

    for lang in stats.languages.iter().filter(|l| l.solved > 0) {
        let name = catalog::language_by_name(&lang.language)
            .map(|spec| spec.name.to_string())
            .unwrap_or_else(|| canonical_name(&lang.language));
        if name.is_empty() {
            continue;
        }
        skills.push(Skill {
            name,
            category: SkillCategory::Language,
            proficiency: Proficiency::rounded(lang.solved as f64 * 4.0 + 10.0),
            evidence: evidence(lang.solved, false),
        });
    }

    skills
}

/// GitHub summary → language skills weighted by byte share, plus framework
/// skills from catalogued repository topics.
pub fn extract_github(summary: &GitHubSummary) -> Vec<Skill> {
    let total_bytes = summary
        .languages
        .iter()
        .fold(0u64, |total, l| total.saturating_add(l.bytes));
    let star_points = summary.stars.min(50) as f64 * 0.2;
    let mut skills = Vec::new();

    for lang in &summary.languages {
        if lang.bytes == 0 && lang.repositories == 0 {
            continue;
        }
        let name = catalog::language_by_name(&lang.language)
            .map(|spec| spec.name.to_string())
            .unwrap_or_else(|| canonical_name(&lang.language));
        if name.is_empty() {
            continue;
        }
        let share = if total_bytes > 0 {
            lang.bytes as f64 / total_bytes as f64
        } else {
            0.0
        };
        let score = share * 50.0 + lang.repositories.min(10) as f64 * 4.0 + star_points;
        skills.push(Skill {
            name,
            category: SkillCategory::Language,
            proficiency: Proficiency::rounded(score),
            evidence: Evidence::GitHub(GitHubEvidence {
                repositories: lang.repositories,
                bytes_of_code: lang.bytes,
                stars: summary.stars,
            }),
        });
    }

    let mut topic_counts: Vec<(&'static CatalogEntry, u32)> = Vec::new();
    for topic in &summary.topics {
        let Some(entry) = catalog::entry_for(topic) else {
            continue;
        };
        match topic_counts.iter_mut().find(|(e, _)| e.name == entry.name) {
            Some((_, count)) => *count += 1,
            None => topic_counts.push((entry, 1)),
        }
    }
    for (entry, repositories) in topic_counts {
        skills.push(Skill {
            name: entry.name.to_string(),
            category: entry.category,
            proficiency: Proficiency::rounded((20.0 + repositories as f64 * 5.0).min(70.0)),
            evidence: Evidence::GitHub(GitHubEvidence {
                repositories,
                bytes_of_code: 0,
                stars: summary.stars,
            }),
        });
    }

    skills
}

/// A self-declared skill. Category falls back to the catalog, then `framework`.
pub fn extract_manual(entry: &ManualEntry) -> Result<Vec<Skill>, AppError> {
    let name = canonical_name(&entry.name);
    if name.is_empty() {
        return Err(AppError::InputFormat(
            "manual entry is missing a skill name".to_string(),
        ));
    }
    if !entry.proficiency.is_finite() {
        return Err(AppError::InputFormat(format!(
            "manual entry '{name}' has a non-numeric proficiency"
        )));
    }
    let category = entry
        .category
        .or_else(|| catalog::category_for(&name))
        .unwrap_or(SkillCategory::Framework);

    Ok(vec![Skill {
        name,
        category,
        proficiency: Proficiency::new(entry.proficiency),
        evidence: Evidence::Manual(ManualEvidence {
            mentions: 1,
            note: entry.note.clone(),
        }),
    }])
}

const PROSE_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "rst"];

/// Raw uploaded bytes. Binary or non-UTF-8 content is an `InputFormat` error.
pub fn extract_upload(file: &UploadedFile) -> Result<Vec<Skill>, AppError> {
    if file.content.is_empty() {
        return Ok(Vec::new());
    }
    if file.content.contains(&0) {
        return Err(AppError::InputFormat(format!(
            "'{}' looks like binary content",
            file.file_name
        )));
    }
    let text = std::str::from_utf8(&file.content).map_err(|e| {
        AppError::InputFormat(format!("'{}' is not valid UTF-8 text: {e}", file.file_name))
    })?;

    let is_prose = file
        .file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| PROSE_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
    if is_prose {
        Ok(extract_text(text))
    } else {
        Ok(extract_source(text, None, Some(&file.file_name)))
    }
}

/// Collapses duplicate (name, source) pairs, keeping the highest proficiency.
/// First-seen order is preserved.
pub fn keep_strongest(skills: Vec<Skill>) -> Vec<Skill> {
    let mut index: HashMap<(String, SkillSource), usize> = HashMap::new();
    let mut out: Vec<Skill> = Vec::with_capacity(skills.len());
    for skill in skills {
        let id = (skill.key(), skill.source());
        match index.get(&id) {
            Some(&i) => {
                if skill.proficiency > out[i].proficiency {
                    out[i] = skill;
                }
            }
            None => {
                index.insert(id, out.len());
                out.push(skill);
            }
        }
    }
    out
}

/// Extracts skills from a single artifact.
pub fn extract(artifact: &Artifact) -> Result<Vec<Skill>, AppError> {
    let skills = match artifact {
        Artifact::Code(code) => extract_code(code),
        Artifact::Text { text } => extract_text(text),
        Artifact::LeetCode(stats) => extract_leetcode(stats),
        Artifact::GitHub(summary) => extract_github(summary),
        Artifact::Manual(entry) => extract_manual(entry)?,
        Artifact::Upload(file) => extract_upload(file)?,
    };
    Ok(keep_strongest(skills))
}

/// Extracts every artifact. A failing artifact is annotated in `outcomes`
/// and does not abort the rest of the batch.
pub fn extract_batch(artifacts: &[Artifact]) -> BatchExtraction {
    let mut skills = Vec::new();
    let mut outcomes = Vec::with_capacity(artifacts.len());

    for (index, artifact) in artifacts.iter().enumerate() {
        let file_name = artifact.file_name().map(str::to_string);
        match extract(artifact) {
            Ok(found) => {
                outcomes.push(ItemOutcome {
                    index,
                    kind: artifact.kind(),
                    file_name,
                    skills_found: found.len(),
                    error: None,
                });
                skills.extend(found);
            }
            Err(e) => {
                warn!(index, kind = artifact.kind(), "Artifact extraction failed: {e}");
                outcomes.push(ItemOutcome {
                    index,
                    kind: artifact.kind(),
                    file_name,
                    skills_found: 0,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    BatchExtraction {
        skills: keep_strongest(skills),
        outcomes,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
