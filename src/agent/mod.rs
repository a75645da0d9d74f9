//! Agent contract shared by every career agent
//!
//! THINK → EXECUTE (in order) → OUTCOME
//!
//! `think` decides which named actions to request, `execute` performs exactly
//! one of them, and the control loop in [`crate::execution`] drives both.

pub mod content_generator;
pub mod optimization;
pub mod orchestrator;
pub mod portfolio;
pub mod profile_analyzer;

use crate::error::AgentError;
use crate::execution::run_agent;
use crate::memory::{AgentMemory, ContextLine, MemoryEntry, MessageRole};
use crate::models::{ActionRecord, ExecutionState, Outcome};
use crate::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt::Debug;

pub use content_generator::{ContentGeneratorAgent, ContentGeneratorConfig};
pub use optimization::{FeedbackThresholds, OptimizationAgent};
pub use orchestrator::{NestedFailurePolicy, NestedOutcome, OrchestratorAgent, OrchestratorConfig};
pub use portfolio::PortfolioBuilderAgent;
pub use profile_analyzer::ProfileAnalyzerAgent;

// ===== Actions =====

/// A closed set of actions one agent knows how to perform.
///
/// Implementors are enums serialized as `{"name": ..., "input": {...}}`.
pub trait AgentAction: Serialize + DeserializeOwned + Clone + Debug + Send + Sync {
    /// Every name `from_named` accepts
    const NAMES: &'static [&'static str];

    fn name(&self) -> &'static str;

    /// The action's input payload as it appears on the wire
    fn input(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => map.remove("input").unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Resolve a string-keyed request. `Ok(None)` means the name is unknown.
    fn from_named(name: &str, input: Value) -> Result<Option<Self>> {
        if !Self::NAMES.contains(&name) {
            return Ok(None);
        }

        let input = if input.is_null() { json!({}) } else { input };
        serde_json::from_value(json!({ "name": name, "input": input }))
            .map(Some)
            .map_err(|e| AgentError::InvalidActionInput {
                action: name.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Result of `think`: the ordered action list plus agent-specific metadata
/// flattened beside it.
#[derive(Debug, Clone, Serialize)]
pub struct Thought<A, M> {
    pub actions: Vec<A>,
    #[serde(flatten)]
    pub meta: M,
}

impl<A, M> Thought<A, M> {
    pub fn new(actions: Vec<A>, meta: M) -> Self {
        Self { actions, meta }
    }

    pub fn action_names(&self) -> Vec<&'static str>
    where
        A: AgentAction,
    {
        self.actions.iter().map(AgentAction::name).collect()
    }
}

/// Decode a boundary mapping into an agent's request record.
///
/// `null` means "nothing supplied" and yields the record's defaults.
pub fn decode_input<T>(input: &Value) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if input.is_null() {
        return Ok(T::default());
    }
    T::deserialize(input).map_err(|e| AgentError::Decision(e.to_string()))
}

// ===== Agent =====

#[async_trait]
pub trait Agent: Send + Sync {
    type Action: AgentAction;
    type Meta: Serialize + Send + Sync;

    fn core(&self) -> &AgentCore;
    fn core_mut(&mut self) -> &mut AgentCore;

    fn name(&self) -> &str {
        self.core().name()
    }

    fn state(&self) -> ExecutionState {
        self.core().state()
    }

    /// Decide which actions to request. Never performs the work itself.
    async fn think(&self, input: &Value) -> Result<Thought<Self::Action, Self::Meta>>;

    /// Perform exactly one action.
    async fn execute(&mut self, action: &Self::Action) -> Result<Value>;

    /// Run the full think/execute loop. Never fails; faults become an error outcome.
    async fn run(&mut self, input: &Value) -> Outcome {
        run_agent(self, input).await
    }

    /// Execute an action addressed by name.
    ///
    /// Unknown names produce an `{"error": "Unknown action: ..."}` payload
    /// instead of a fault.
    async fn execute_named(&mut self, name: &str, input: Value) -> Result<Value> {
        match Self::Action::from_named(name, input)? {
            Some(action) => self.execute(&action).await,
            None => Ok(json!({ "error": format!("Unknown action: {}", name) })),
        }
    }

    fn reset(&mut self) {
        self.core_mut().reset();
    }
}

// ===== Core =====

/// Action records kept per agent before the oldest are dropped
pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

/// Identity, lifecycle state, memory and action history of one agent instance.
#[derive(Debug, Clone)]
pub struct AgentCore {
    name: String,
    description: String,
    pub(crate) state: ExecutionState,
    memory: AgentMemory,
    history: Vec<ActionRecord>,
}

/// Serializable snapshot used by the HTTP driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatus {
    pub name: String,
    pub description: String,
    pub state: ExecutionState,
    pub memory_entries: usize,
    pub actions_completed: usize,
}

impl AgentCore {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            state: ExecutionState::Idle,
            memory: AgentMemory::new(),
            history: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn memory(&self) -> &AgentMemory {
        &self.memory
    }

    pub fn add_to_memory(&mut self, role: MessageRole, content: impl Into<String>, metadata: Map<String, Value>) {
        let mut entry = MemoryEntry::new(role, content);
        entry.metadata = metadata;
        self.memory.push(entry);
    }

    pub fn get_memory_context(&self, limit: usize) -> Vec<ContextLine> {
        self.memory.context(limit)
    }

    pub fn actions_history(&self) -> &[ActionRecord] {
        &self.history
    }

    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            name: self.name.clone(),
            description: self.description.clone(),
            state: self.state,
            memory_entries: self.memory.len(),
            actions_completed: self.history.len(),
        }
    }

    pub fn reset(&mut self) {
        self.state = ExecutionState::Idle;
        self.memory.clear();
        self.history.clear();
    }

    pub(crate) fn set_state(&mut self, state: ExecutionState) {
        self.state = state;
    }

    /// Append a finished action, dropping the oldest records past capacity
    pub(crate) fn record_action(&mut self, record: ActionRecord) {
        if self.history.len() >= DEFAULT_HISTORY_CAPACITY {
            let excess = self.history.len() + 1 - DEFAULT_HISTORY_CAPACITY;
            self.history.drain(..excess);
        }
        self.history.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActionStatus;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(tag = "name", content = "input", rename_all = "snake_case")]
    enum EchoAction {
        Echo(EchoInput),
        Explode(EchoInput),
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct EchoInput {
        text: String,
    }

    impl AgentAction for EchoAction {
        const NAMES: &'static [&'static str] = &["echo", "explode"];

        fn name(&self) -> &'static str {
            match self {
                EchoAction::Echo(_) => "echo",
                EchoAction::Explode(_) => "explode",
            }
        }
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct EchoRequest {
        words: Vec<String>,
        fail_at: Option<String>,
    }

    struct EchoAgent {
        core: AgentCore,
    }

    impl EchoAgent {
        fn new() -> Self {
            Self {
                core: AgentCore::new("Echo", "Repeats its input"),
            }
        }
    }

    #[async_trait]
    impl Agent for EchoAgent {
        type Action = EchoAction;
        type Meta = Value;

        fn core(&self) -> &AgentCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut AgentCore {
            &mut self.core
        }

        async fn think(&self, input: &Value) -> Result<Thought<EchoAction, Value>> {
            let request: EchoRequest = decode_input(input)?;
            let actions = request
                .words
                .into_iter()
                .map(|text| {
                    if request.fail_at.as_deref() == Some(text.as_str()) {
                        EchoAction::Explode(EchoInput { text })
                    } else {
                        EchoAction::Echo(EchoInput { text })
                    }
                })
                .collect();
            Ok(Thought::new(actions, json!({ "strategy": "echo" })))
        }

        async fn execute(&mut self, action: &EchoAction) -> Result<Value> {
            match action {
                EchoAction::Echo(input) => Ok(json!({ "echo": input.text })),
                EchoAction::Explode(input) => Err(AgentError::Execution(format!("cannot echo {}", input.text))),
            }
        }
    }

    #[tokio::test]
    async fn test_run_executes_actions_in_order() {
        let mut agent = EchoAgent::new();
        let outcome = agent.run(&json!({ "words": ["a", "b", "c"] })).await;

        assert!(outcome.is_success());
        let echoed: Vec<_> = outcome.results().iter().map(|r| r["echo"].clone()).collect();
        assert_eq!(echoed, vec![json!("a"), json!("b"), json!("c")]);
        assert_eq!(outcome.thought().unwrap()["strategy"], "echo");
        assert_eq!(outcome.thought().unwrap()["actions"][1]["name"], "echo");
        assert_eq!(agent.state(), ExecutionState::Completed);
        assert_eq!(agent.core().actions_history().len(), 3);
        assert!(agent
            .core()
            .actions_history()
            .iter()
            .all(|r| r.status == ActionStatus::Completed));
    }

    #[tokio::test]
    async fn test_handler_fault_aborts_remaining_actions() {
        let mut agent = EchoAgent::new();
        let outcome = agent
            .run(&json!({ "words": ["a", "b", "c"], "fail_at": "b" }))
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.error_message(), Some("Execution error: cannot echo b"));
        assert!(outcome.results().is_empty());
        assert_eq!(agent.state(), ExecutionState::Error);

        let history = agent.core().actions_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].status, ActionStatus::Failed);
        assert!(history[1].error.is_some());
    }

    #[tokio::test]
    async fn test_wrong_typed_input_is_a_decision_fault() {
        let mut agent = EchoAgent::new();
        let outcome = agent.run(&json!({ "words": 42 })).await;

        assert_eq!(outcome.agent(), "Echo");
        assert!(outcome.error_message().unwrap().starts_with("Decision error"));
        assert_eq!(agent.state(), ExecutionState::Error);

        let outcome = agent.run(&json!("not a mapping")).await;
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn test_unknown_action_is_idempotent() {
        let mut agent = EchoAgent::new();
        let first = agent.execute_named("summon", json!({})).await.unwrap();
        let second = agent.execute_named("summon", json!({})).await.unwrap();

        assert_eq!(first, json!({ "error": "Unknown action: summon" }));
        assert_eq!(first, second);
        assert_eq!(agent.state(), ExecutionState::Idle);
        assert!(agent.core().actions_history().is_empty());
    }

    #[tokio::test]
    async fn test_known_action_with_bad_input() {
        let mut agent = EchoAgent::new();
        let err = agent
            .execute_named("echo", json!({ "text": ["not", "a", "string"] }))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidActionInput { ref action, .. } if action == "echo"));

        let ok = agent.execute_named("echo", json!({ "text": "hi" })).await.unwrap();
        assert_eq!(ok, json!({ "echo": "hi" }));
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let mut agent = EchoAgent::new();
        agent
            .core_mut()
            .add_to_memory(MessageRole::User, "hello", Map::new());
        agent.run(&json!({ "words": ["x"] })).await;

        agent.reset();
        assert_eq!(agent.state(), ExecutionState::Idle);
        assert!(agent.core().memory().is_empty());
        assert!(agent.core().actions_history().is_empty());
    }

    #[tokio::test]
    async fn test_in_flight_agent_refuses_second_run() {
        let mut agent = EchoAgent::new();
        agent.core_mut().set_state(ExecutionState::Executing);

        let outcome = agent.run(&json!({ "words": ["x"] })).await;
        assert!(outcome.error_message().unwrap().contains("already has a run in flight"));
        assert_eq!(agent.state(), ExecutionState::Executing);
        assert!(agent.core().actions_history().is_empty());

        agent.reset();
        assert!(agent.run(&json!({ "words": ["x"] })).await.is_success());
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let mut agent = EchoAgent::new();
        let words: Vec<String> = (0..DEFAULT_HISTORY_CAPACITY + 44).map(|i| format!("w{}", i)).collect();

        let outcome = agent.run(&json!({ "words": words })).await;
        assert_eq!(outcome.results().len(), DEFAULT_HISTORY_CAPACITY + 44);

        let history = agent.core().actions_history();
        assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(history[0].input["text"], "w44");
        assert_eq!(history[DEFAULT_HISTORY_CAPACITY - 1].input["text"], format!("w{}", DEFAULT_HISTORY_CAPACITY + 43));
        assert_eq!(agent.core().status().actions_completed, DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_memory_context_round_trip() {
        let mut core = AgentCore::new("Echo", "Repeats its input");
        for i in 0..5 {
            core.add_to_memory(MessageRole::Agent, format!("step {}", i), Map::new());
        }
        let context = core.get_memory_context(2);
        assert_eq!(context.len(), 2);
        assert_eq!(context[0].content, "step 3");
        assert_eq!(context[1].content, "step 4");
        assert_eq!(core.get_memory_context(10).len(), 5);
    }

    #[test]
    fn test_action_input_extraction() {
        let action = EchoAction::Echo(EchoInput { text: "hey".to_string() });
        assert_eq!(action.input(), json!({ "text": "hey" }));
        assert!(EchoAction::from_named("missing", json!({})).unwrap().is_none());
        let parsed = EchoAction::from_named("echo", Value::Null).unwrap().unwrap();
        assert_eq!(parsed.name(), "echo");
    }
}
