//! Optimization agent
//!
//! Reads engagement feedback, decides what to re-tune, and re-scores or
//! re-ranks existing content instead of generating new content.

use super::{decode_input, Agent, AgentAction, AgentCore, Thought, DEFAULT_HISTORY_CAPACITY};
use crate::models::{CurrentContent, Feedback, HeadlineMetrics, HeadlineTrends, MarketTrends, PortfolioMetrics, SkillEntry};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info};

const MAX_TRENDING_KEYWORDS: usize = 3;
const MAX_HEADLINE_CHARS: usize = 120;
const LOW_SEARCH_APPEARANCES: f64 = 10.0;
const NEUTRAL_SKILL_SCORE: f64 = 50.0;

/// Feedback thresholds that trigger each optimization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackThresholds {
    /// Profile view trend below this requests a headline update
    pub view_trend_floor: f64,
    /// Skill click rate below this requests a skill reorder
    pub min_skill_click_rate: f64,
    /// Portfolio bounce rate above this requests a portfolio update
    pub max_bounce_rate: f64,
}

impl Default for FeedbackThresholds {
    fn default() -> Self {
        Self {
            view_trend_floor: 0.0,
            min_skill_click_rate: 0.05,
            max_bounce_rate: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackAnalysis {
    pub headline_needs_update: bool,
    pub skills_need_reorder: bool,
    pub portfolio_needs_update: bool,
    pub content_needs_refresh: bool,
}

impl FeedbackThresholds {
    pub fn analyze(&self, feedback: &Feedback) -> FeedbackAnalysis {
        let declining = feedback.profile_views_trend < self.view_trend_floor;
        FeedbackAnalysis {
            headline_needs_update: declining,
            content_needs_refresh: declining,
            skills_need_reorder: feedback.skill_click_rate < self.min_skill_click_rate,
            portfolio_needs_update: feedback.portfolio_bounce_rate > self.max_bounce_rate,
        }
    }
}

// ===== Request & Actions =====

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OptimizationRequest {
    pub feedback: Feedback,
    pub current_content: CurrentContent,
    pub market_trends: MarketTrends,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlineOptimizationInput {
    pub current: String,
    pub feedback: HeadlineMetrics,
    pub trends: HeadlineTrends,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillReorderInput {
    pub current_skills: Vec<SkillEntry>,
    pub market_demand: BTreeMap<String, f64>,
    pub engagement: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioUpdateInput {
    pub current_layout: Map<String, Value>,
    pub engagement_metrics: PortfolioMetrics,
    pub trends: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbTestInput {
    pub content_type: String,
    pub current: String,
}

impl Default for AbTestInput {
    fn default() -> Self {
        Self {
            content_type: "headline".to_string(),
            current: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", content = "input", rename_all = "snake_case")]
pub enum OptimizationAction {
    OptimizeHeadline(HeadlineOptimizationInput),
    ReorderSkills(SkillReorderInput),
    UpdatePortfolio(PortfolioUpdateInput),
    GenerateAbTest(AbTestInput),
}

impl AgentAction for OptimizationAction {
    const NAMES: &'static [&'static str] = &[
        "optimize_headline",
        "reorder_skills",
        "update_portfolio",
        "generate_ab_test",
    ];

    fn name(&self) -> &'static str {
        match self {
            OptimizationAction::OptimizeHeadline(_) => "optimize_headline",
            OptimizationAction::ReorderSkills(_) => "reorder_skills",
            OptimizationAction::UpdatePortfolio(_) => "update_portfolio",
            OptimizationAction::GenerateAbTest(_) => "generate_ab_test",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationMeta {
    pub analysis: FeedbackAnalysis,
    pub strategy: &'static str,
}

/// One handled optimization, kept across resets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationEvent {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub result_summary: String,
}

// ===== Agent =====

pub struct OptimizationAgent {
    core: AgentCore,
    thresholds: FeedbackThresholds,
    history: Vec<OptimizationEvent>,
}

impl OptimizationAgent {
    pub fn new() -> Self {
        Self::with_thresholds(FeedbackThresholds::default())
    }

    pub fn with_thresholds(thresholds: FeedbackThresholds) -> Self {
        Self {
            core: AgentCore::new("OptimizationAgent", "Optimizes content based on feedback"),
            thresholds,
            history: Vec::new(),
        }
    }

    pub fn thresholds(&self) -> &FeedbackThresholds {
        &self.thresholds
    }

    pub fn optimization_history(&self) -> &[OptimizationEvent] {
        &self.history
    }

    fn record(&mut self, action: &str, result: &Value) {
        let summary = result
            .get("optimization_type")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        if self.history.len() >= DEFAULT_HISTORY_CAPACITY {
            self.history.remove(0);
        }
        self.history.push(OptimizationEvent {
            timestamp: Utc::now(),
            action: action.to_string(),
            result_summary: summary.to_string(),
        });
    }
}

impl Default for OptimizationAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for OptimizationAgent {
    type Action = OptimizationAction;
    type Meta = OptimizationMeta;

    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    async fn think(&self, input: &Value) -> Result<Thought<OptimizationAction, OptimizationMeta>> {
        let request: OptimizationRequest = decode_input(input)?;
        let analysis = self.thresholds.analyze(&request.feedback);
        debug!(?analysis, "Analyzed feedback");

        let OptimizationRequest {
            feedback,
            current_content,
            market_trends,
        } = request;

        let mut actions = Vec::new();
        if analysis.headline_needs_update {
            actions.push(OptimizationAction::OptimizeHeadline(HeadlineOptimizationInput {
                current: current_content.headline.unwrap_or_default(),
                feedback: feedback.headline_metrics,
                trends: market_trends.headline_trends,
            }));
        }
        if analysis.skills_need_reorder {
            actions.push(OptimizationAction::ReorderSkills(SkillReorderInput {
                current_skills: current_content.skills,
                market_demand: market_trends.skill_demand,
                engagement: feedback.skill_engagement,
            }));
        }
        if analysis.portfolio_needs_update {
            actions.push(OptimizationAction::UpdatePortfolio(PortfolioUpdateInput {
                current_layout: current_content.portfolio_layout,
                engagement_metrics: feedback.portfolio_metrics,
                trends: market_trends.portfolio_trends,
            }));
        }

        Ok(Thought::new(
            actions,
            OptimizationMeta {
                analysis,
                strategy: "continuous_optimization",
            },
        ))
    }

    async fn execute(&mut self, action: &OptimizationAction) -> Result<Value> {
        let result = match action {
            OptimizationAction::OptimizeHeadline(input) => optimize_headline(input),
            OptimizationAction::ReorderSkills(input) => reorder_skills(input),
            OptimizationAction::UpdatePortfolio(input) => update_portfolio(input),
            OptimizationAction::GenerateAbTest(input) => generate_ab_test(input),
        };

        self.record(action.name(), &result);
        info!(action = action.name(), history_len = self.history.len(), "Recorded optimization");
        Ok(result)
    }
}

// ===== Handlers =====

fn optimize_headline(input: &HeadlineOptimizationInput) -> Value {
    let current = input.current.as_str();
    let lower = current.to_lowercase();

    let mut suggestions: Vec<String> = input
        .trends
        .keywords
        .iter()
        .take(MAX_TRENDING_KEYWORDS)
        .filter(|kw| !lower.contains(&kw.to_lowercase()))
        .map(|kw| format!("{} | {}", current, kw))
        .collect();

    if input.feedback.search_appearances < LOW_SEARCH_APPEARANCES {
        suggestions.push(current.replace('|', "•"));
    }
    if suggestions.is_empty() {
        suggestions.push(current.to_string());
    }

    let ranked = rank_suggestions(suggestions);
    let recommended = ranked.first().cloned().unwrap_or_else(|| current.to_string());

    json!({
        "optimization_type": "headline",
        "current": current,
        "suggestions": ranked,
        "recommended": recommended,
        "confidence": headline_confidence(&input.feedback),
    })
}

/// Stable, highest score first
fn rank_suggestions(suggestions: Vec<String>) -> Vec<String> {
    let mut scored: Vec<(String, u32)> = suggestions
        .into_iter()
        .map(|s| {
            let mut score = 50;
            if s.chars().count() <= MAX_HEADLINE_CHARS {
                score += 20;
            }
            if s.contains('|') || s.contains('•') {
                score += 15;
            }
            (s, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(s, _)| s).collect()
}

fn headline_confidence(metrics: &HeadlineMetrics) -> f64 {
    let data_points = [
        metrics.profile_views,
        metrics.search_appearances,
        metrics.connection_requests,
    ]
    .iter()
    .filter(|v| **v > 0.0)
    .count();

    (data_points as f64 * 0.33).min(1.0)
}

fn skill_score(skill: &str, demand: &BTreeMap<String, f64>, engagement: &BTreeMap<String, f64>) -> f64 {
    let key = skill.to_lowercase();
    let demand_score = demand.get(&key).copied().unwrap_or(NEUTRAL_SKILL_SCORE);
    let engagement_score = engagement.get(&key).copied().unwrap_or(NEUTRAL_SKILL_SCORE);
    demand_score * 0.6 + engagement_score * 0.4
}

fn reorder_skills(input: &SkillReorderInput) -> Value {
    let mut scored: Vec<(&str, f64)> = input
        .current_skills
        .iter()
        .map(|s| (s.name(), skill_score(s.name(), &input.market_demand, &input.engagement)))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let optimized_order: Vec<&str> = scored.iter().map(|(name, _)| *name).collect();
    let scores: Map<String, Value> = scored
        .iter()
        .map(|(name, score)| (name.to_string(), json!(score)))
        .collect();

    json!({
        "optimization_type": "skills",
        "original_order": input.current_skills,
        "optimized_order": optimized_order,
        "scores": scores,
    })
}

fn update_portfolio(input: &PortfolioUpdateInput) -> Value {
    let metrics = &input.engagement_metrics;
    let section_performance = json!({
        "hero": { "scroll_depth": 100, "time_spent": metrics.hero_time.unwrap_or(5.0) },
        "projects": { "scroll_depth": 80, "engagement": metrics.project_clicks },
        "skills": { "scroll_depth": 70, "engagement": metrics.skill_views },
        "contact": { "scroll_depth": 40, "conversions": metrics.contact_clicks },
    });

    let mut recommendations = Vec::new();
    let projects_depth = section_performance["projects"]["scroll_depth"].as_f64().unwrap_or(0.0);
    if projects_depth < 50.0 {
        recommendations.push(json!({
            "type": "reorder",
            "action": "Move projects section higher",
            "reason": "Low scroll depth for projects section",
        }));
    }
    if metrics.contact_clicks < 1.0 {
        recommendations.push(json!({
            "type": "enhance",
            "action": "Add floating CTA button",
            "reason": "Low contact conversions",
        }));
    }

    json!({
        "optimization_type": "portfolio",
        "current_layout": input.current_layout,
        "section_performance": section_performance,
        "recommendations": recommendations,
    })
}

fn headline_variants(current: &str) -> Vec<String> {
    let mut variants = vec![format!("🚀 {}", current)];

    if current.contains('|') {
        variants.push(current.replace('|', "•"));
    }

    let words: Vec<&str> = current.split_whitespace().collect();
    if words.len() > 6 {
        variants.push(words[..6].join(" "));
    }

    variants
}

fn generate_ab_test(input: &AbTestInput) -> Value {
    let variants = if input.content_type == "headline" {
        headline_variants(&input.current)
    } else {
        Vec::new()
    };

    json!({
        "test_type": format!("{}_ab_test", input.content_type),
        "control": input.current,
        "variants": variants,
        "recommended_duration": "7 days",
    })
}
