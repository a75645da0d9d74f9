//! Control loop shared by every agent
//!
//! Actions run strictly in the order `think` returned them, one at a time.
//! The first fault aborts the loop; no partial results are reported.

use crate::agent::{Agent, AgentAction};
use crate::error::AgentError;
use crate::models::{ActionRecord, ExecutionState, Outcome};
use crate::Result;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Drive `think` then `execute` for each requested action, converting any fault
/// into an error outcome.
pub async fn run_agent<A>(agent: &mut A, input: &Value) -> Outcome
where
    A: Agent + ?Sized,
{
    let name = agent.name().to_string();

    if agent.state().is_in_flight() {
        warn!(agent = %name, state = ?agent.state(), "Refusing re-entrant run");
        return Outcome::error(name.clone(), AgentError::AlreadyRunning(name));
    }

    let start = Instant::now();
    info!(agent = %name, "Starting thought process");

    match drive(agent, input).await {
        Ok((results, thought)) => {
            agent.core_mut().set_state(ExecutionState::Completed);
            info!(
                agent = %name,
                result_count = results.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Completed execution"
            );
            Outcome::Success {
                agent: name,
                results,
                thought,
            }
        }
        Err(e) => {
            agent.core_mut().set_state(ExecutionState::Error);
            error!(agent = %name, error = %e, "Agent run failed");
            Outcome::error(name, e)
        }
    }
}

async fn drive<A>(agent: &mut A, input: &Value) -> Result<(Vec<Value>, Value)>
where
    A: Agent + ?Sized,
{
    agent.core_mut().set_state(ExecutionState::Thinking);
    let thought = agent.think(input).await?;
    let thought_value = serde_json::to_value(&thought)?;

    agent.core_mut().set_state(ExecutionState::Executing);
    let mut results = Vec::with_capacity(thought.actions.len());

    for action in &thought.actions {
        let mut record = ActionRecord::pending(action.name(), action.input());
        debug!(agent = %agent.name(), action = action.name(), "Executing action");

        match agent.execute(action).await {
            Ok(output) => {
                record.complete(output.clone());
                agent.core_mut().record_action(record);
                results.push(output);
            }
            Err(e) => {
                warn!(
                    agent = %agent.name(),
                    action = action.name(),
                    error = %e,
                    "Halting run due to action failure"
                );
                record.fail(e.to_string());
                agent.core_mut().record_action(record);
                return Err(e);
            }
        }
    }

    Ok((results, thought_value))
}
