//! Content generator
//!
//! Writes headline, about and experience content. Uses the configured
//! [`TextGenerator`] when present, deterministic templates otherwise.

use super::{decode_input, Agent, AgentAction, AgentCore, Thought};
use crate::llm::TextGenerator;
use crate::models::{ExperienceEntry, MarketPatterns, UserData};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

// ===== Prompt templates =====

const HEADLINE_PROMPT: &str = "Generate a compelling LinkedIn headline for:
Role: {role}
Industry: {industry}
Key Skills: {skills}
Value Proposition: {value_prop}

Requirements:
- Maximum 120 characters
- Include role and value proposition
- Use power words
- Make it specific and impactful";

const ABOUT_PROMPT: &str = "Write a professional LinkedIn About section for:
Name: {name}
Current Role: {role}
Industry: {industry}
Experience Summary: {experience}
Key Achievements: {achievements}
Career Goals: {goals}

Requirements:
- 200-300 words
- First person perspective
- Hook in first line
- Include achievements with metrics
- End with call-to-action";

const EXPERIENCE_PROMPT: &str = "Transform this experience into impactful bullet points:
Role: {role}
Company: {company}
Responsibilities: {responsibilities}

Requirements:
- Start with action verb
- Include quantifiable results
- Be specific and concise
- 3-5 bullet points";

/// Substitute `{key}` placeholders in one left-to-right pass. Substituted
/// text is never rescanned; unknown placeholders are kept as written.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let value = tail[1..].find('}').and_then(|close| {
            let key = &tail[1..1 + close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close + 2))
        });

        match value {
            Some((value, consumed)) => {
                out.push_str(value);
                rest = &tail[consumed..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

// ===== Request & Actions =====

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentScope {
    #[default]
    All,
    Headline,
    About,
    Experience,
    #[serde(other)]
    Unrecognized,
}

impl ContentScope {
    fn covers(self, section: ContentScope) -> bool {
        self == ContentScope::All || self == section
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentRequest {
    pub content_type: ContentScope,
    pub user_data: UserData,
    pub market_patterns: MarketPatterns,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationInput {
    pub user_data: UserData,
    pub patterns: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", content = "input", rename_all = "snake_case")]
pub enum ContentAction {
    GenerateHeadline(GenerationInput),
    GenerateAbout(GenerationInput),
    GenerateExperience(GenerationInput),
}

impl AgentAction for ContentAction {
    const NAMES: &'static [&'static str] = &["generate_headline", "generate_about", "generate_experience"];

    fn name(&self) -> &'static str {
        match self {
            ContentAction::GenerateHeadline(_) => "generate_headline",
            ContentAction::GenerateAbout(_) => "generate_about",
            ContentAction::GenerateExperience(_) => "generate_experience",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentMeta {
    pub strategy: &'static str,
}

/// Bullets are free text from a model or a list from the template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Bullets {
    Generated(String),
    Template(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperienceContent {
    pub title: String,
    pub company: String,
    pub bullets: Bullets,
}

// ===== Agent =====

#[derive(Debug, Clone, Default)]
pub struct ContentGeneratorConfig {
    /// Use the template when the generator fails instead of aborting the run
    pub fallback_on_error: bool,
}

pub struct ContentGeneratorAgent {
    core: AgentCore,
    generator: Option<Arc<dyn TextGenerator>>,
    config: ContentGeneratorConfig,
}

impl ContentGeneratorAgent {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self::with_config(generator, ContentGeneratorConfig::default())
    }

    pub fn with_config(generator: Option<Arc<dyn TextGenerator>>, config: ContentGeneratorConfig) -> Self {
        Self {
            core: AgentCore::new("ContentGenerator", "Generates optimized profile content"),
            generator,
            config,
        }
    }

    /// Ask the generator. `Ok(None)` means the template should be used.
    async fn compose(&self, section: &str, prompt: &str) -> Result<Option<String>> {
        let Some(generator) = &self.generator else {
            return Ok(None);
        };

        debug!(section, model = generator.model(), "Generating content");
        match generator.generate(prompt).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if self.config.fallback_on_error => {
                warn!(section, error = %e, "Generation failed, using template");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn generate_headline(&self, input: &GenerationInput) -> Result<Value> {
        let user = &input.user_data;
        let skills = if user.top_skills.is_empty() {
            "Leadership".to_string()
        } else {
            user.top_skills.join(", ")
        };

        let prompt = fill(
            HEADLINE_PROMPT,
            &[
                ("role", user.target_role.as_deref().unwrap_or("Professional")),
                ("industry", user.industry.as_deref().unwrap_or("Technology")),
                ("skills", skills.as_str()),
                ("value_prop", user.value_proposition.as_deref().unwrap_or("Driving results")),
            ],
        );

        let content = self
            .compose("headline", &prompt)
            .await?
            .unwrap_or_else(|| template_headline(user));

        Ok(json!({ "section": "headline", "content": content, "prompt_used": prompt }))
    }

    async fn generate_about(&self, input: &GenerationInput) -> Result<Value> {
        let user = &input.user_data;
        let achievements = user.achievements.join(", ");

        let prompt = fill(
            ABOUT_PROMPT,
            &[
                ("name", user.name.as_deref().unwrap_or("Professional")),
                ("role", user.current_role.as_deref().unwrap_or("")),
                ("industry", user.industry.as_deref().unwrap_or("")),
                ("experience", user.experience_summary.as_deref().unwrap_or("")),
                ("achievements", achievements.as_str()),
                ("goals", user.career_goals.as_deref().unwrap_or("")),
            ],
        );

        let content = self
            .compose("about", &prompt)
            .await?
            .unwrap_or_else(|| template_about(user));

        Ok(json!({ "section": "about", "content": content, "prompt_used": prompt }))
    }

    async fn generate_experience(&self, input: &GenerationInput) -> Result<Value> {
        let mut optimized = Vec::with_capacity(input.user_data.experience.len());

        for entry in &input.user_data.experience {
            let prompt = fill(
                EXPERIENCE_PROMPT,
                &[
                    ("role", entry.title.as_str()),
                    ("company", entry.company.as_str()),
                    ("responsibilities", entry.description.as_str()),
                ],
            );

            let bullets = match self.compose("experience", &prompt).await? {
                Some(text) => Bullets::Generated(text),
                None => Bullets::Template(template_experience(entry)),
            };

            optimized.push(ExperienceContent {
                title: entry.title.clone(),
                company: entry.company.clone(),
                bullets,
            });
        }

        Ok(json!({ "section": "experience", "content": optimized }))
    }
}

#[async_trait]
impl Agent for ContentGeneratorAgent {
    type Action = ContentAction;
    type Meta = ContentMeta;

    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    async fn think(&self, input: &Value) -> Result<Thought<ContentAction, ContentMeta>> {
        let request: ContentRequest = decode_input(input)?;
        let scope = request.content_type;
        let patterns = request.market_patterns;

        let mut actions = Vec::new();
        if scope.covers(ContentScope::Headline) {
            actions.push(ContentAction::GenerateHeadline(GenerationInput {
                user_data: request.user_data.clone(),
                patterns: patterns.headline,
            }));
        }
        if scope.covers(ContentScope::About) {
            actions.push(ContentAction::GenerateAbout(GenerationInput {
                user_data: request.user_data.clone(),
                patterns: patterns.about,
            }));
        }
        if scope.covers(ContentScope::Experience) {
            actions.push(ContentAction::GenerateExperience(GenerationInput {
                user_data: request.user_data,
                patterns: patterns.experience,
            }));
        }

        Ok(Thought::new(actions, ContentMeta { strategy: "content_generation" }))
    }

    async fn execute(&mut self, action: &ContentAction) -> Result<Value> {
        match action {
            ContentAction::GenerateHeadline(input) => self.generate_headline(input).await,
            ContentAction::GenerateAbout(input) => self.generate_about(input).await,
            ContentAction::GenerateExperience(input) => self.generate_experience(input).await,
        }
    }
}

// ===== Templates =====

fn template_headline(user: &UserData) -> String {
    let role = user.target_role.as_deref().unwrap_or("Professional");
    let industry = user.industry.as_deref().unwrap_or("");
    let skills = if user.top_skills.is_empty() {
        "Excellence".to_string()
    } else {
        user.top_skills.iter().take(2).cloned().collect::<Vec<_>>().join(" & ")
    };

    format!("{} | {} | Driving Impact in {}", role, skills, industry)
}

fn template_about(user: &UserData) -> String {
    let role = user.current_role.as_deref().unwrap_or("professional");
    let industry = user.industry.as_deref().unwrap_or("my field");
    let first_skill = user.top_skills.first().map(String::as_str).unwrap_or("Leadership");

    format!(
        "Passionate {role} with expertise in {industry}.

I thrive on solving complex challenges and delivering measurable results.
My approach combines strategic thinking with hands-on execution.

Key areas of expertise:
• {first_skill}
• Strategic Planning
• Team Collaboration

Let's connect to explore how we can create value together.
📧 Feel free to reach out!"
    )
}

fn template_experience(entry: &ExperienceEntry) -> Vec<String> {
    let company = if entry.company.is_empty() {
        "the organization"
    } else {
        entry.company.as_str()
    };

    vec![
        format!("Led initiatives at {}", company),
        "Collaborated with cross-functional teams to deliver results".to_string(),
        "Implemented improvements that enhanced efficiency".to_string(),
    ]
}
