//! Error types for the career agents

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {

    // =============================
    // Control Loop Errors
    // =============================

    #[error("Decision error: {0}")]
    Decision(String),

    #[error("Invalid input for action '{action}': {reason}")]
    InvalidActionInput { action: String, reason: String },

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Text generation error: {0}")]
    Generation(String),

    #[error("Sub-agent {agent} failed: {error}")]
    SubAgentFailed { agent: String, error: String },

    #[error("Agent {0} already has a run in flight")]
    AlreadyRunning(String),

    // =============================
    // Surrounding Glue
    // =============================

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
