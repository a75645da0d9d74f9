//! Career Architect
//!
//! A set of cooperating agents that:
//! - Analyze a professional profile section by section
//! - Generate headline, about and experience content (hosted model or templates)
//! - Build a role-aware portfolio and render it as a React site
//! - Re-tune published content from engagement feedback
//! - Coordinate all of the above through one orchestrator
//!
//! UNIFIED LOOP:
//! INPUT → THINK → EXECUTE (each action, in order) → OUTCOME

pub mod agent;
pub mod api;
pub mod career_dna;
pub mod classifier;
pub mod config;
pub mod error;
pub mod execution;
pub mod llm;
pub mod memory;
pub mod models;
pub mod site;
pub mod state;

pub use error::{AgentError, Result};

// Re-export common types
pub use agent::{Agent, AgentAction, AgentCore, OrchestratorAgent};
pub use classifier::RoleCategory;
pub use models::*;
