//! Agent Memory System
//!
//! Each agent owns a bounded, ordered memory used as a chat-style context window.

pub mod store;

pub use store::{AgentMemory, ContextLine, MemoryEntry, MessageRole, DEFAULT_MEMORY_CAPACITY};
