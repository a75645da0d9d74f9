//! Portfolio builder
//!
//! Picks a layout from the target role, then produces hero, section and
//! theme content that the site renderer turns into React source.

use super::{decode_input, Agent, AgentAction, AgentCore, Thought};
use crate::career_dna::CareerDna;
use crate::classifier::RoleCategory;
use crate::models::{SkillEntry, UserData};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

const HIGHLIGHTED_SKILLS: usize = 5;
const EXPERIENCE_HIGHLIGHTS: usize = 3;

// ===== Layout rules =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutRule {
    pub primary_sections: Vec<String>,
    pub layout_style: String,
    pub color_scheme: String,
}

impl LayoutRule {
    pub fn for_category(category: RoleCategory) -> Self {
        let (sections, style, scheme) = match category {
            RoleCategory::Developer => (&["hero", "projects", "skills"][..], "project-first", "tech-modern"),
            RoleCategory::Analyst => (&["hero", "metrics", "experience"][..], "metrics-first", "professional"),
            RoleCategory::Designer => (&["hero", "portfolio", "about"][..], "visual-first", "creative"),
            RoleCategory::Manager => (&["hero", "experience", "achievements"][..], "experience-first", "executive"),
            RoleCategory::Default => (&["hero", "about", "skills", "experience"][..], "balanced", "professional"),
        };

        Self {
            primary_sections: sections.iter().map(|s| s.to_string()).collect(),
            layout_style: style.to_string(),
            color_scheme: scheme.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColorPalette {
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub text: String,
}

impl ColorPalette {
    /// Unknown schemes use the professional palette
    pub fn for_scheme(scheme: &str) -> Self {
        let (primary, secondary, background, text) = match scheme {
            "tech-modern" => ("#8b5cf6", "#06b6d4", "#0f172a", "#f1f5f9"),
            "creative" => ("#ec4899", "#f59e0b", "#fdf4ff", "#1e1b4b"),
            "executive" => ("#0f172a", "#475569", "#f8fafc", "#0f172a"),
            _ => ("#2563eb", "#64748b", "#ffffff", "#1e293b"),
        };

        Self {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
            background: background.to_string(),
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Typography {
    pub heading_font: String,
    pub body_font: String,
    pub code_font: String,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            heading_font: "Inter".to_string(),
            body_font: "Inter".to_string(),
            code_font: "Fira Code".to_string(),
        }
    }
}

// ===== Request & Actions =====

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PortfolioRequest {
    pub user_data: UserData,
    pub career_dna: CareerDna,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroInput {
    pub user_data: UserData,
    pub style: String,
}

impl Default for HeroInput {
    fn default() -> Self {
        Self {
            user_data: UserData::default(),
            style: "professional".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionsInput {
    pub user_data: UserData,
    pub sections: Vec<String>,
    pub career_dna: CareerDna,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutInput {
    pub layout_style: String,
    pub color_scheme: String,
}

impl Default for LayoutInput {
    fn default() -> Self {
        Self {
            layout_style: "balanced".to_string(),
            color_scheme: "professional".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", content = "input", rename_all = "snake_case")]
pub enum PortfolioAction {
    GenerateHero(HeroInput),
    GenerateSections(SectionsInput),
    GenerateLayout(LayoutInput),
}

impl AgentAction for PortfolioAction {
    const NAMES: &'static [&'static str] = &["generate_hero", "generate_sections", "generate_layout"];

    fn name(&self) -> &'static str {
        match self {
            PortfolioAction::GenerateHero(_) => "generate_hero",
            PortfolioAction::GenerateSections(_) => "generate_sections",
            PortfolioAction::GenerateLayout(_) => "generate_layout",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioMeta {
    pub strategy: &'static str,
    pub role_category: RoleCategory,
    pub layout: LayoutRule,
}

// ===== Agent =====

pub struct PortfolioBuilderAgent {
    core: AgentCore,
}

impl PortfolioBuilderAgent {
    pub fn new() -> Self {
        Self {
            core: AgentCore::new("PortfolioBuilder", "Builds personalized React portfolios"),
        }
    }
}

impl Default for PortfolioBuilderAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for PortfolioBuilderAgent {
    type Action = PortfolioAction;
    type Meta = PortfolioMeta;

    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    async fn think(&self, input: &Value) -> Result<Thought<PortfolioAction, PortfolioMeta>> {
        let request: PortfolioRequest = decode_input(input)?;
        let role_category = RoleCategory::classify(request.user_data.target_role.as_deref().unwrap_or(""));
        let layout = LayoutRule::for_category(role_category);

        debug!(%role_category, layout_style = %layout.layout_style, "Selected portfolio layout");

        let actions = vec![
            PortfolioAction::GenerateHero(HeroInput {
                user_data: request.user_data.clone(),
                style: layout.color_scheme.clone(),
            }),
            PortfolioAction::GenerateSections(SectionsInput {
                user_data: request.user_data,
                sections: layout.primary_sections.clone(),
                career_dna: request.career_dna,
            }),
            PortfolioAction::GenerateLayout(LayoutInput {
                layout_style: layout.layout_style.clone(),
                color_scheme: layout.color_scheme.clone(),
            }),
        ];

        Ok(Thought::new(
            actions,
            PortfolioMeta {
                strategy: "portfolio_generation",
                role_category,
                layout,
            },
        ))
    }

    async fn execute(&mut self, action: &PortfolioAction) -> Result<Value> {
        Ok(match action {
            PortfolioAction::GenerateHero(input) => generate_hero(input),
            PortfolioAction::GenerateSections(input) => generate_sections(input),
            PortfolioAction::GenerateLayout(input) => generate_layout(input),
        })
    }
}

// ===== Handlers =====

fn tagline(user: &UserData) -> String {
    let role = user.target_role.as_deref().unwrap_or("Professional");
    match user.top_skills.first() {
        Some(skill) => format!("Specializing in {} | {}", skill, role),
        None => format!("Passionate {} Building Impactful Solutions", role),
    }
}

fn generate_hero(input: &HeroInput) -> Value {
    let user = &input.user_data;
    json!({
        "section": "hero",
        "content": {
            "name": user.name.as_deref().unwrap_or(""),
            "title": user.target_role.as_deref().unwrap_or(""),
            "tagline": tagline(user),
            "cta_primary": "View My Work",
            "cta_secondary": "Contact Me",
            "style": input.style,
        }
    })
}

fn skill_names(skills: &[SkillEntry]) -> Vec<&str> {
    skills.iter().map(SkillEntry::name).collect()
}

fn format_section(section: &str, user: &UserData, career_dna: &CareerDna) -> Option<Value> {
    let value = match section {
        "projects" => json!(user
            .projects
            .iter()
            .map(|p| json!({
                "title": p.name,
                "description": p.description,
                "technologies": p.technologies,
                "link": p.url,
                "image": p.image,
            }))
            .collect::<Vec<_>>()),
        "skills" => json!({
            "highlighted": career_dna.strengths.iter().take(HIGHLIGHTED_SKILLS).collect::<Vec<_>>(),
            "all_skills": user.skills,
            "categories": {
                "technical": skill_names(&user.skills),
                "tools": [],
                "soft": [],
            },
        }),
        "experience" => json!(user
            .experience
            .iter()
            .map(|e| json!({
                "title": e.title,
                "company": e.company,
                "period": e.period,
                "highlights": e.bullets.iter().take(EXPERIENCE_HIGHLIGHTS).collect::<Vec<_>>(),
            }))
            .collect::<Vec<_>>()),
        "about" => json!({
            "summary": user.about.as_deref().unwrap_or(""),
            "interests": user.interests,
            "values": user.values,
        }),
        "metrics" => json!([
            { "label": "Years Experience", "value": user.years_exp.as_deref().unwrap_or("5+") },
            { "label": "Projects Completed", "value": user.projects.len().to_string() },
            { "label": "Skills", "value": user.skills.len().to_string() },
        ]),
        "contact" => json!({
            "email": user.email.as_deref().unwrap_or(""),
            "linkedin": user.linkedin_url.as_deref().unwrap_or(""),
            "github": user.github_url.as_deref().unwrap_or(""),
            "website": user.website.as_deref().unwrap_or(""),
        }),
        // hero has its own action; portfolio and achievements have no formatter
        _ => return None,
    };
    Some(value)
}

fn generate_sections(input: &SectionsInput) -> Value {
    let mut sections = Map::new();
    for section in &input.sections {
        if let Some(content) = format_section(section, &input.user_data, &input.career_dna) {
            sections.insert(section.clone(), content);
        }
    }
    json!({ "sections": sections })
}

fn generate_layout(input: &LayoutInput) -> Value {
    json!({
        "layout_style": input.layout_style,
        "colors": ColorPalette::for_scheme(&input.color_scheme),
        "typography": Typography::default(),
        "spacing": "comfortable",
    })
}
