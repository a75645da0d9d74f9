//! Orchestrator - coordinates the four career agents
//!
//! REQUEST TYPE → WORKFLOW (fixed step list) → one sub-agent `run` per step
//!
//! A sub-agent that fails reports its own error outcome; whether that
//! failure aborts the orchestrator is decided by [`NestedFailurePolicy`].

use super::{
    decode_input, Agent, AgentAction, AgentCore, ContentGeneratorAgent, ContentGeneratorConfig,
    FeedbackThresholds, OptimizationAgent, PortfolioBuilderAgent, ProfileAnalyzerAgent, Thought,
};
use crate::career_dna::{merge_sources, AnalysisDigest, CareerDna};
use crate::error::AgentError;
use crate::llm::TextGenerator;
use crate::memory::MessageRole;
use crate::models::{CurrentContent, Feedback, MarketPatterns, MarketTrends, Outcome, ProfileData, UserData};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

// ===== Workflows =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    FullOptimization,
    ProfileOnly,
    PortfolioOnly,
    Optimize,
}

impl Workflow {
    /// Unknown tags fall back to the full optimization workflow
    pub fn from_request(request_type: &str) -> Self {
        match request_type {
            "profile_only" => Workflow::ProfileOnly,
            "portfolio_only" => Workflow::PortfolioOnly,
            "optimize" => Workflow::Optimize,
            _ => Workflow::FullOptimization,
        }
    }

    pub fn steps(self) -> &'static [&'static str] {
        match self {
            Workflow::FullOptimization => &[
                "analyze_profile",
                "build_career_dna",
                "generate_content",
                "build_portfolio",
            ],
            Workflow::ProfileOnly => &["analyze_profile", "generate_content"],
            Workflow::PortfolioOnly => &["build_career_dna", "build_portfolio"],
            Workflow::Optimize => &["analyze_feedback", "apply_optimizations"],
        }
    }
}

fn default_request_type() -> String {
    "full_optimization".to_string()
}

/// One optimization proposed to the user; extra fields pass through untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PendingOptimization {
    #[serde(default)]
    pub auto_apply: bool,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Everything a workflow step may read. Every step receives the whole request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowInput {
    pub request_type: String,
    pub profile_data: ProfileData,
    pub user_data: UserData,
    /// Extra profile sources merged under `user_data`
    pub sources: Vec<UserData>,
    pub profile_analysis: AnalysisDigest,
    pub career_dna: CareerDna,
    pub market_patterns: MarketPatterns,
    pub feedback: Feedback,
    pub current_content: CurrentContent,
    pub market_trends: MarketTrends,
    pub optimizations: Vec<PendingOptimization>,
}

impl Default for WorkflowInput {
    fn default() -> Self {
        Self {
            request_type: default_request_type(),
            profile_data: ProfileData::default(),
            user_data: UserData::default(),
            sources: Vec::new(),
            profile_analysis: AnalysisDigest::default(),
            career_dna: CareerDna::default(),
            market_patterns: MarketPatterns::default(),
            feedback: Feedback::default(),
            current_content: CurrentContent::default(),
            market_trends: MarketTrends::default(),
            optimizations: Vec::new(),
        }
    }
}

impl WorkflowInput {
    fn merged_user_data(&self) -> UserData {
        if self.sources.is_empty() {
            self.user_data.clone()
        } else {
            merge_sources(&self.user_data, &self.sources)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", content = "input", rename_all = "snake_case")]
pub enum OrchestratorAction {
    AnalyzeProfile(WorkflowInput),
    BuildCareerDna(WorkflowInput),
    GenerateContent(WorkflowInput),
    BuildPortfolio(WorkflowInput),
    AnalyzeFeedback(WorkflowInput),
    ApplyOptimizations(WorkflowInput),
}

impl OrchestratorAction {
    fn for_step(step: &str, input: WorkflowInput) -> Option<Self> {
        let action = match step {
            "analyze_profile" => OrchestratorAction::AnalyzeProfile(input),
            "build_career_dna" => OrchestratorAction::BuildCareerDna(input),
            "generate_content" => OrchestratorAction::GenerateContent(input),
            "build_portfolio" => OrchestratorAction::BuildPortfolio(input),
            "analyze_feedback" => OrchestratorAction::AnalyzeFeedback(input),
            "apply_optimizations" => OrchestratorAction::ApplyOptimizations(input),
            _ => return None,
        };
        Some(action)
    }
}

impl AgentAction for OrchestratorAction {
    const NAMES: &'static [&'static str] = &[
        "analyze_profile",
        "build_career_dna",
        "generate_content",
        "build_portfolio",
        "analyze_feedback",
        "apply_optimizations",
    ];

    fn name(&self) -> &'static str {
        match self {
            OrchestratorAction::AnalyzeProfile(_) => "analyze_profile",
            OrchestratorAction::BuildCareerDna(_) => "build_career_dna",
            OrchestratorAction::GenerateContent(_) => "generate_content",
            OrchestratorAction::BuildPortfolio(_) => "build_portfolio",
            OrchestratorAction::AnalyzeFeedback(_) => "analyze_feedback",
            OrchestratorAction::ApplyOptimizations(_) => "apply_optimizations",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorMeta {
    pub workflow: Vec<&'static str>,
    /// The request type exactly as supplied
    pub strategy: String,
}

// ===== Nested outcomes =====

/// What happened when a step handed work to a sub-agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "delegation", content = "result", rename_all = "snake_case")]
pub enum NestedOutcome {
    /// The sub-agent ran and succeeded
    Completed(Outcome),
    /// The sub-agent ran and reported its own error
    Failed(Outcome),
    /// The sub-agent still had a run in flight and refused this one
    NotRun(Outcome),
}

impl NestedOutcome {
    pub fn outcome(&self) -> &Outcome {
        match self {
            NestedOutcome::Completed(o) | NestedOutcome::Failed(o) | NestedOutcome::NotRun(o) => o,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NestedOutcome::Completed(_) => "completed",
            NestedOutcome::Failed(_) => "failed",
            NestedOutcome::NotRun(_) => "not_run",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct StepReport {
    step: &'static str,
    #[serde(flatten)]
    nested: NestedOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedFailurePolicy {
    /// Report the failed step and keep going
    #[default]
    Swallow,
    /// Abort the orchestrator run on the first failed or refused step
    Propagate,
}

#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub nested_failures: NestedFailurePolicy,
    pub content: ContentGeneratorConfig,
    pub thresholds: FeedbackThresholds,
}

async fn delegate<A: Agent>(agent: &mut A, input: &Value) -> NestedOutcome {
    let refused = agent.state().is_in_flight();
    let outcome = agent.run(input).await;

    if refused {
        NestedOutcome::NotRun(outcome)
    } else if outcome.is_success() {
        NestedOutcome::Completed(outcome)
    } else {
        NestedOutcome::Failed(outcome)
    }
}

// ===== Agent =====

pub struct OrchestratorAgent {
    core: AgentCore,
    config: OrchestratorConfig,
    profile_analyzer: ProfileAnalyzerAgent,
    content_generator: ContentGeneratorAgent,
    portfolio_builder: PortfolioBuilderAgent,
    optimization_agent: OptimizationAgent,
}

impl OrchestratorAgent {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self::with_config(generator, OrchestratorConfig::default())
    }

    pub fn with_config(generator: Option<Arc<dyn TextGenerator>>, config: OrchestratorConfig) -> Self {
        Self {
            core: AgentCore::new("Orchestrator", "Coordinates all career optimization agents"),
            profile_analyzer: ProfileAnalyzerAgent::new(),
            content_generator: ContentGeneratorAgent::with_config(generator, config.content.clone()),
            portfolio_builder: PortfolioBuilderAgent::new(),
            optimization_agent: OptimizationAgent::with_thresholds(config.thresholds.clone()),
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn profile_analyzer(&self) -> &ProfileAnalyzerAgent {
        &self.profile_analyzer
    }

    pub fn profile_analyzer_mut(&mut self) -> &mut ProfileAnalyzerAgent {
        &mut self.profile_analyzer
    }

    pub fn content_generator(&self) -> &ContentGeneratorAgent {
        &self.content_generator
    }

    pub fn content_generator_mut(&mut self) -> &mut ContentGeneratorAgent {
        &mut self.content_generator
    }

    pub fn portfolio_builder(&self) -> &PortfolioBuilderAgent {
        &self.portfolio_builder
    }

    pub fn portfolio_builder_mut(&mut self) -> &mut PortfolioBuilderAgent {
        &mut self.portfolio_builder
    }

    pub fn optimization_agent(&self) -> &OptimizationAgent {
        &self.optimization_agent
    }

    pub fn optimization_agent_mut(&mut self) -> &mut OptimizationAgent {
        &mut self.optimization_agent
    }

    /// Apply the failure policy and log the step to memory
    fn settle(&mut self, step: &'static str, nested: NestedOutcome) -> Result<Value> {
        let label = nested.label();
        let mut metadata = Map::new();
        metadata.insert("step".to_string(), json!(step));
        metadata.insert("delegation".to_string(), json!(label));
        self.core
            .add_to_memory(MessageRole::Agent, format!("{} {}", step, label), metadata);

        if !matches!(nested, NestedOutcome::Completed(_)) {
            let outcome = nested.outcome();
            warn!(step, agent = outcome.agent(), delegation = label, "Sub-agent step did not complete");

            if self.config.nested_failures == NestedFailurePolicy::Propagate {
                return Err(AgentError::SubAgentFailed {
                    agent: outcome.agent().to_string(),
                    error: outcome.error_message().unwrap_or("not run").to_string(),
                });
            }
        }

        Ok(serde_json::to_value(StepReport { step, nested })?)
    }

    fn settle_local(&mut self, step: &'static str, report: Value) -> Value {
        let mut metadata = Map::new();
        metadata.insert("step".to_string(), json!(step));
        self.core
            .add_to_memory(MessageRole::Agent, format!("{} completed", step), metadata);
        report
    }
}

#[async_trait]
impl Agent for OrchestratorAgent {
    type Action = OrchestratorAction;
    type Meta = OrchestratorMeta;

    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    async fn think(&self, input: &Value) -> Result<Thought<OrchestratorAction, OrchestratorMeta>> {
        let request: WorkflowInput = decode_input(input)?;
        let workflow = Workflow::from_request(&request.request_type);
        let steps = workflow.steps();

        let actions = steps
            .iter()
            .filter_map(|step| OrchestratorAction::for_step(step, request.clone()))
            .collect();

        info!(request_type = %request.request_type, workflow = ?workflow, "Selected workflow");

        Ok(Thought::new(
            actions,
            OrchestratorMeta {
                workflow: steps.to_vec(),
                strategy: request.request_type,
            },
        ))
    }

    async fn execute(&mut self, action: &OrchestratorAction) -> Result<Value> {
        match action {
            OrchestratorAction::AnalyzeProfile(input) => {
                info!("Running profile analysis");
                let nested = delegate(
                    &mut self.profile_analyzer,
                    &json!({ "profile_data": input.profile_data, "analysis_type": "full" }),
                )
                .await;
                self.settle("profile_analysis", nested)
            }
            OrchestratorAction::BuildCareerDna(input) => {
                info!("Building career DNA");
                let dna = CareerDna::build(&input.merged_user_data(), &input.profile_analysis);
                let report = json!({ "step": "career_dna", "result": dna });
                Ok(self.settle_local("career_dna", report))
            }
            OrchestratorAction::GenerateContent(input) => {
                info!("Generating optimized content");
                let nested = delegate(
                    &mut self.content_generator,
                    &json!({
                        "content_type": "all",
                        "user_data": input.merged_user_data(),
                        "market_patterns": input.market_patterns,
                    }),
                )
                .await;
                self.settle("content_generation", nested)
            }
            OrchestratorAction::BuildPortfolio(input) => {
                info!("Building portfolio");
                let nested = delegate(
                    &mut self.portfolio_builder,
                    &json!({
                        "user_data": input.merged_user_data(),
                        "career_dna": input.career_dna,
                    }),
                )
                .await;
                self.settle("portfolio_building", nested)
            }
            OrchestratorAction::AnalyzeFeedback(input) => {
                info!("Analyzing feedback");
                let nested = delegate(
                    &mut self.optimization_agent,
                    &json!({
                        "feedback": input.feedback,
                        "current_content": input.current_content,
                        "market_trends": input.market_trends,
                    }),
                )
                .await;
                self.settle("feedback_analysis", nested)
            }
            OrchestratorAction::ApplyOptimizations(input) => {
                info!(count = input.optimizations.len(), "Applying optimizations");
                let (applied, pending): (Vec<_>, Vec<_>) =
                    input.optimizations.iter().cloned().partition(|o| o.auto_apply);
                let report = json!({
                    "step": "apply_optimizations",
                    "applied": applied,
                    "pending_approval": pending,
                });
                Ok(self.settle_local("apply_optimizations", report))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockGenerator;
    use crate::models::ExecutionState;

    fn sample_request(request_type: &str) -> Value {
        json!({
            "request_type": request_type,
            "profile_data": {
                "headline": "Analyst at Acme",
                "about": "I analyze data.",
                "skills": ["SQL", "Excel"]
            },
            "user_data": {
                "name": "Jordan",
                "current_role": "Analyst",
                "target_role": "Data Scientist",
                "industry": "Finance",
                "top_skills": ["Python", "SQL"],
                "skills": ["Python", "SQL"]
            }
        })
    }

    #[tokio::test]
    async fn test_unknown_request_type_falls_back() {
        let agent = OrchestratorAgent::new(None);
        let unknown = agent.think(&json!({ "request_type": "unknown_tag" })).await.unwrap();
        let full = agent.think(&json!({ "request_type": "full_optimization" })).await.unwrap();

        assert_eq!(unknown.action_names(), full.action_names());
        assert_eq!(unknown.meta.workflow, full.meta.workflow);
        assert_eq!(unknown.meta.strategy, "unknown_tag");

        let default = agent.think(&json!({})).await.unwrap();
        assert_eq!(default.meta.strategy, "full_optimization");
        assert_eq!(default.action_names(), full.action_names());
    }

    #[tokio::test]
    async fn test_workflow_tables() {
        let agent = OrchestratorAgent::new(None);
        let cases = vec![
            ("profile_only", vec!["analyze_profile", "generate_content"]),
            ("portfolio_only", vec!["build_career_dna", "build_portfolio"]),
            ("optimize", vec!["analyze_feedback", "apply_optimizations"]),
        ];
        for (tag, expected) in cases {
            let thought = agent.think(&json!({ "request_type": tag })).await.unwrap();
            assert_eq!(thought.action_names(), expected, "request_type: {}", tag);
        }
    }

    #[tokio::test]
    async fn test_full_optimization_run() {
        let mut agent = OrchestratorAgent::new(None);
        let outcome = agent.run(&sample_request("full_optimization")).await;

        assert!(outcome.is_success());
        let results = outcome.results();
        let steps: Vec<_> = results.iter().map(|r| r["step"].as_str().unwrap()).collect();
        assert_eq!(
            steps,
            vec!["profile_analysis", "career_dna", "content_generation", "portfolio_building"]
        );

        assert_eq!(results[0]["delegation"], "completed");
        assert_eq!(results[0]["result"]["status"], "success");
        assert_eq!(results[0]["result"]["agent"], "ProfileAnalyzer");
        assert!(results[1].get("delegation").is_none());
        assert_eq!(results[1]["result"]["opportunities"], json!(["Transition to Data Scientist"]));
        assert_eq!(results[1]["result"]["strengths"], json!(["Python", "SQL"]));
        assert_eq!(results[3]["result"]["thought"]["role_category"], "analyst");

        let memory = agent.core().get_memory_context(10);
        assert_eq!(memory.len(), 4);
        assert_eq!(memory[0].role, MessageRole::Agent);
        assert_eq!(memory[0].content, "profile_analysis completed");

        assert_eq!(agent.profile_analyzer().state(), ExecutionState::Completed);
        assert_eq!(agent.portfolio_builder().state(), ExecutionState::Completed);
    }

    #[tokio::test]
    async fn test_sub_agent_failure_is_swallowed_by_default() {
        let generator = Arc::new(MockGenerator::failing("model is loading"));
        let mut agent = OrchestratorAgent::new(Some(generator));
        let outcome = agent.run(&sample_request("profile_only")).await;

        assert!(outcome.is_success());
        let content_step = &outcome.results()[1];
        assert_eq!(content_step["step"], "content_generation");
        assert_eq!(content_step["delegation"], "failed");
        assert_eq!(content_step["result"]["status"], "error");
        assert_eq!(agent.state(), ExecutionState::Completed);
        assert_eq!(agent.content_generator().state(), ExecutionState::Error);
    }

    #[tokio::test]
    async fn test_sub_agent_failure_propagates_when_configured() {
        let generator = Arc::new(MockGenerator::failing("model is loading"));
        let config = OrchestratorConfig {
            nested_failures: NestedFailurePolicy::Propagate,
            ..Default::default()
        };
        let mut agent = OrchestratorAgent::with_config(Some(generator), config);
        let outcome = agent.run(&sample_request("profile_only")).await;

        assert!(!outcome.is_success());
        let message = outcome.error_message().unwrap();
        assert!(message.contains("ContentGenerator"));
        assert!(message.contains("model is loading"));
        assert_eq!(agent.state(), ExecutionState::Error);
    }

    #[tokio::test]
    async fn test_in_flight_sub_agent_is_not_run() {
        let mut agent = OrchestratorAgent::new(None);
        agent
            .profile_analyzer_mut()
            .core_mut()
            .set_state(ExecutionState::Thinking);

        let outcome = agent.run(&sample_request("profile_only")).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.results()[0]["delegation"], "not_run");
        assert_eq!(outcome.results()[1]["delegation"], "completed");
        assert_eq!(agent.profile_analyzer().state(), ExecutionState::Thinking);
    }

    #[tokio::test]
    async fn test_optimize_workflow() {
        let mut agent = OrchestratorAgent::new(None);
        let outcome = agent
            .run(&json!({
                "request_type": "optimize",
                "feedback": { "profile_views_trend": -2, "skill_click_rate": 0.5 },
                "current_content": { "headline": "Analyst | SQL" },
                "optimizations": [
                    { "id": "headline", "auto_apply": true },
                    { "id": "skills" }
                ]
            }))
            .await;

        assert!(outcome.is_success());
        let results = outcome.results();
        assert_eq!(results[0]["step"], "feedback_analysis");
        assert_eq!(results[0]["result"]["results"][0]["optimization_type"], "headline");

        assert_eq!(results[1]["applied"], json!([{ "id": "headline", "auto_apply": true }]));
        assert_eq!(results[1]["pending_approval"], json!([{ "id": "skills", "auto_apply": false }]));
        assert_eq!(agent.optimization_agent().optimization_history().len(), 1);
    }

    #[tokio::test]
    async fn test_sources_are_merged_into_user_data() {
        let mut agent = OrchestratorAgent::new(None);
        let outcome = agent
            .run(&json!({
                "request_type": "portfolio_only",
                "user_data": { "target_role": "UX Designer", "skills": ["Figma"] },
                "sources": [{ "name": "Riley", "skills": ["figma", "Sketch"] }]
            }))
            .await;

        let results = outcome.results();
        assert_eq!(results[0]["result"]["strengths"], json!(["Figma", "Sketch"]));
        let hero = &results[1]["result"]["results"][0]["content"];
        assert_eq!(hero["name"], "Riley");
        assert_eq!(hero["style"], "creative");
    }

    #[tokio::test]
    async fn test_reset_leaves_sub_agents_alone() {
        let mut agent = OrchestratorAgent::new(None);
        agent.run(&sample_request("profile_only")).await;
        agent.reset();

        assert_eq!(agent.state(), ExecutionState::Idle);
        assert!(agent.core().memory().is_empty());
        assert!(agent.core().actions_history().is_empty());
        assert_eq!(agent.profile_analyzer().state(), ExecutionState::Completed);
    }
}
