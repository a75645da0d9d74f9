//! Profile analyzer
//!
//! Scores headline, about, experience and skills sections from
//! simple text patterns and derives recommendations from the same flags.

use super::{decode_input, Agent, AgentAction, AgentCore, Thought};
use crate::models::{ExperienceEntry, ProfileData, SkillEntry};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const VALUE_PROPOSITION_KEYWORDS: &[&str] = &["helping", "driving", "building", "leading"];
const CALL_TO_ACTION_KEYWORDS: &[&str] = &["reach out", "connect", "contact", "email"];
const ACHIEVEMENT_KEYWORDS: &[&str] = &["achieved", "increased", "reduced", "led"];
const TECHNICAL_SKILL_KEYWORDS: &[&str] = &["python", "java", "sql", "aws"];
const SOFT_SKILL_KEYWORDS: &[&str] = &["leadership", "communication"];

// ===== Request & Actions =====

/// Which sections to analyze
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisScope {
    #[default]
    Full,
    Headline,
    About,
    Experience,
    Skills,
    #[serde(other)]
    Unrecognized,
}

impl AnalysisScope {
    fn covers(self, section: AnalysisScope) -> bool {
        self == AnalysisScope::Full || self == section
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisRequest {
    pub profile_data: ProfileData,
    pub analysis_type: AnalysisScope,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlineInput {
    pub headline: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutInput {
    pub about: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceInput {
    pub experience: Vec<ExperienceEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsInput {
    pub skills: Vec<SkillEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", content = "input", rename_all = "snake_case")]
pub enum AnalyzerAction {
    AnalyzeHeadline(HeadlineInput),
    AnalyzeAbout(AboutInput),
    AnalyzeExperience(ExperienceInput),
    AnalyzeSkills(SkillsInput),
}

impl AgentAction for AnalyzerAction {
    const NAMES: &'static [&'static str] = &[
        "analyze_headline",
        "analyze_about",
        "analyze_experience",
        "analyze_skills",
    ];

    fn name(&self) -> &'static str {
        match self {
            AnalyzerAction::AnalyzeHeadline(_) => "analyze_headline",
            AnalyzerAction::AnalyzeAbout(_) => "analyze_about",
            AnalyzerAction::AnalyzeExperience(_) => "analyze_experience",
            AnalyzerAction::AnalyzeSkills(_) => "analyze_skills",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzerMeta {
    pub strategy: &'static str,
}

// ===== Patterns =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeadlinePatterns {
    pub has_title: bool,
    pub word_count: usize,
    pub has_value_proposition: bool,
    pub has_metrics: bool,
    pub uses_separator: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AboutPatterns {
    pub has_content: bool,
    pub word_count: usize,
    pub has_call_to_action: bool,
    pub has_achievements: bool,
    pub uses_first_person: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperiencePatterns {
    pub total_positions: usize,
    /// Positions with a non-empty description
    pub has_descriptions: usize,
    pub avg_bullets: f64,
    /// Positions whose description mentions a number
    pub has_metrics: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SkillCategories {
    pub technical: usize,
    pub soft: usize,
    pub tools: usize,
    pub other: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillPatterns {
    pub total_skills: usize,
    pub has_endorsements: usize,
    pub skill_categories: SkillCategories,
}

/// Output of one analyze action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionAnalysis<P> {
    pub section: String,
    pub patterns: P,
    pub score: u32,
    pub recommendations: Vec<String>,
}

// ===== Agent =====

pub struct ProfileAnalyzerAgent {
    core: AgentCore,
}

impl ProfileAnalyzerAgent {
    pub fn new() -> Self {
        Self {
            core: AgentCore::new(
                "ProfileAnalyzer",
                "Analyzes profiles to extract success patterns",
            ),
        }
    }
}

impl Default for ProfileAnalyzerAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for ProfileAnalyzerAgent {
    type Action = AnalyzerAction;
    type Meta = AnalyzerMeta;

    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    async fn think(&self, input: &Value) -> Result<Thought<AnalyzerAction, AnalyzerMeta>> {
        let request: AnalysisRequest = decode_input(input)?;
        let scope = request.analysis_type;
        let profile = request.profile_data;

        let mut actions = Vec::new();

        if scope.covers(AnalysisScope::Headline) {
            actions.push(AnalyzerAction::AnalyzeHeadline(HeadlineInput {
                headline: profile.headline,
            }));
        }
        if scope.covers(AnalysisScope::About) {
            actions.push(AnalyzerAction::AnalyzeAbout(AboutInput { about: profile.about }));
        }
        if scope.covers(AnalysisScope::Experience) {
            actions.push(AnalyzerAction::AnalyzeExperience(ExperienceInput {
                experience: profile.experience,
            }));
        }
        if scope.covers(AnalysisScope::Skills) {
            actions.push(AnalyzerAction::AnalyzeSkills(SkillsInput {
                skills: profile.skills,
            }));
        }

        debug!(scope = ?scope, action_count = actions.len(), "Planned profile analysis");

        Ok(Thought::new(
            actions,
            AnalyzerMeta {
                strategy: "comprehensive_analysis",
            },
        ))
    }

    async fn execute(&mut self, action: &AnalyzerAction) -> Result<Value> {
        let output = match action {
            AnalyzerAction::AnalyzeHeadline(input) => serde_json::to_value(analyze_headline(&input.headline))?,
            AnalyzerAction::AnalyzeAbout(input) => serde_json::to_value(analyze_about(&input.about))?,
            AnalyzerAction::AnalyzeExperience(input) => {
                serde_json::to_value(analyze_experience(&input.experience))?
            }
            AnalyzerAction::AnalyzeSkills(input) => serde_json::to_value(analyze_skills(&input.skills))?,
        };
        Ok(output)
    }
}

// ===== Scoring =====

fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

/// `count * weight`, saturating instead of wrapping on huge profiles
fn points(count: usize, weight: u32) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX).saturating_mul(weight)
}

fn total(parts: &[u32]) -> u32 {
    parts.iter().fold(0u32, |acc, part| acc.saturating_add(*part))
}

pub fn analyze_headline(headline: &str) -> SectionAnalysis<HeadlinePatterns> {
    let lower = headline.to_lowercase();
    let patterns = HeadlinePatterns {
        has_title: !headline.is_empty(),
        word_count: headline.split_whitespace().count(),
        has_value_proposition: contains_any(&lower, VALUE_PROPOSITION_KEYWORDS),
        has_metrics: has_digit(headline),
        uses_separator: headline.contains('|') || headline.contains('•'),
    };

    let score = total(&[
        u32::from(patterns.has_title) * 20,
        points(patterns.word_count, 5).min(25),
        u32::from(patterns.has_value_proposition) * 25,
        u32::from(patterns.has_metrics) * 15,
        u32::from(patterns.uses_separator) * 15,
    ]);

    let mut recommendations = Vec::new();
    if !patterns.has_value_proposition {
        recommendations.push("Add a value proposition to your headline".to_string());
    }
    if !patterns.has_metrics {
        recommendations.push("Include quantifiable achievements".to_string());
    }

    SectionAnalysis {
        section: "headline".to_string(),
        patterns,
        score: score.min(100),
        recommendations,
    }
}

pub fn analyze_about(about: &str) -> SectionAnalysis<AboutPatterns> {
    let lower = about.to_lowercase();
    let patterns = AboutPatterns {
        has_content: !about.is_empty(),
        word_count: about.split_whitespace().count(),
        has_call_to_action: contains_any(&lower, CALL_TO_ACTION_KEYWORDS),
        has_achievements: contains_any(&lower, ACHIEVEMENT_KEYWORDS),
        uses_first_person: lower.starts_with("i "),
    };

    let score = total(&[
        u32::from(patterns.has_content) * 30,
        (points(patterns.word_count, 1) / 10).min(30),
        u32::from(patterns.has_call_to_action) * 20,
        u32::from(patterns.has_achievements) * 20,
    ]);

    let mut recommendations = Vec::new();
    if patterns.word_count < 100 {
        recommendations.push("Expand your about section (aim for 200+ words)".to_string());
    }
    if !patterns.has_call_to_action {
        recommendations.push("Add a call-to-action at the end".to_string());
    }

    SectionAnalysis {
        section: "about".to_string(),
        patterns,
        score: score.min(100),
        recommendations,
    }
}

pub fn analyze_experience(experience: &[ExperienceEntry]) -> SectionAnalysis<ExperiencePatterns> {
    let total_positions = experience.len();
    let avg_bullets = if total_positions == 0 {
        0.0
    } else {
        let bullets: usize = experience.iter().map(|e| e.bullets.len()).sum();
        bullets as f64 / total_positions as f64
    };

    let patterns = ExperiencePatterns {
        total_positions,
        has_descriptions: experience.iter().filter(|e| !e.description.is_empty()).count(),
        avg_bullets,
        has_metrics: experience.iter().filter(|e| has_digit(&e.description)).count(),
    };

    // float to int casts saturate
    let score = total(&[
        points(patterns.total_positions, 15).min(30),
        points(patterns.has_descriptions, 10),
        ((patterns.avg_bullets * 10.0) as u32).min(20),
        points(patterns.has_metrics, 10),
    ]);

    let mut recommendations = Vec::new();
    if patterns.avg_bullets < 3.0 {
        recommendations.push("Add more bullet points to each experience".to_string());
    }
    if patterns.has_metrics < patterns.total_positions / 2 {
        recommendations.push("Include more quantifiable metrics".to_string());
    }

    SectionAnalysis {
        section: "experience".to_string(),
        patterns,
        score: score.min(100),
        recommendations,
    }
}

fn categorize_skills(skills: &[SkillEntry]) -> SkillCategories {
    let mut categories = SkillCategories::default();
    for skill in skills {
        let name = skill.name().to_lowercase();
        if contains_any(&name, TECHNICAL_SKILL_KEYWORDS) {
            categories.technical += 1;
        } else if contains_any(&name, SOFT_SKILL_KEYWORDS) {
            categories.soft += 1;
        } else {
            categories.other += 1;
        }
    }
    categories
}

pub fn analyze_skills(skills: &[SkillEntry]) -> SectionAnalysis<SkillPatterns> {
    let patterns = SkillPatterns {
        total_skills: skills.len(),
        has_endorsements: skills.iter().filter(|s| s.endorsements() > 0).count(),
        skill_categories: categorize_skills(skills),
    };

    let technical_bonus = if patterns.skill_categories.technical > 5 { 30 } else { 15 };
    let score = total(&[
        points(patterns.total_skills, 3).min(40),
        points(patterns.has_endorsements, 5).min(30),
        technical_bonus,
    ]);

    let mut recommendations = Vec::new();
    if patterns.total_skills < 10 {
        recommendations.push("Add more relevant skills (aim for 15-20)".to_string());
    }

    SectionAnalysis {
        section: "skills".to_string(),
        patterns,
        score: score.min(100),
        recommendations,
    }
}
