//! Agent memory storage
//!
//! Bounded, append-only log of messages an agent has seen or produced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use uuid::Uuid;

/// Default number of entries kept before the oldest is evicted
pub const DEFAULT_MEMORY_CAPACITY: usize = 256;

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Agent,
    System,
}

/// A single entry in an agent's memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub entry_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub role: MessageRole,
    pub content: String,
    pub metadata: Map<String, Value>,
    /// Approximate token count for context window management
    pub token_count: usize,
}

impl MemoryEntry {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        let content = content.into();
        let token_count = (content.len() + 3) / 4;

        Self {
            entry_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            role,
            content,
            metadata: Map::new(),
            token_count,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Chat-style view of an entry: role and content only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextLine {
    pub role: MessageRole,
    pub content: String,
}

/// Ordered memory owned by exactly one agent instance
#[derive(Debug, Clone)]
pub struct AgentMemory {
    entries: VecDeque<MemoryEntry>,
    capacity: usize,
    total_tokens: usize,
}

impl AgentMemory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_MEMORY_CAPACITY)),
            capacity,
            total_tokens: 0,
        }
    }

    /// Append an entry, evicting the oldest one when full
    pub fn push(&mut self, entry: MemoryEntry) {
        while self.entries.len() >= self.capacity {
            self.remove_oldest();
        }
        self.total_tokens += entry.token_count;
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &MemoryEntry> {
        self.entries.iter()
    }

    /// The last `min(len, limit)` entries in insertion order, reduced to role and content
    pub fn context(&self, limit: usize) -> Vec<ContextLine> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries
            .iter()
            .skip(skip)
            .map(|entry| ContextLine {
                role: entry.role,
                content: entry.content.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_tokens(&self) -> usize {
        self.total_tokens
    }

    fn remove_oldest(&mut self) -> Option<MemoryEntry> {
        let entry = self.entries.pop_front();
        if let Some(ref e) = entry {
            self.total_tokens = self.total_tokens.saturating_sub(e.token_count);
        }
        entry
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.total_tokens = 0;
    }
}

impl Default for AgentMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_returns_last_entries_in_order() {
        let mut memory = AgentMemory::new();
        for i in 0..7 {
            memory.push(MemoryEntry::new(MessageRole::User, format!("message {}", i)));
        }

        let context = memory.context(3);
        assert_eq!(context.len(), 3);
        assert_eq!(context[0].content, "message 4");
        assert_eq!(context[1].content, "message 5");
        assert_eq!(context[2].content, "message 6");
    }

    #[test]
    fn test_context_limit_larger_than_memory() {
        let mut memory = AgentMemory::new();
        memory.push(MemoryEntry::new(MessageRole::System, "boot"));
        memory.push(MemoryEntry::new(MessageRole::Agent, "ready"));

        let context = memory.context(10);
        assert_eq!(
            context,
            vec![
                ContextLine { role: MessageRole::System, content: "boot".to_string() },
                ContextLine { role: MessageRole::Agent, content: "ready".to_string() },
            ]
        );
        assert!(memory.context(0).is_empty());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut memory = AgentMemory::with_capacity(2);
        memory.push(MemoryEntry::new(MessageRole::User, "a"));
        memory.push(MemoryEntry::new(MessageRole::User, "b"));
        memory.push(MemoryEntry::new(MessageRole::User, "c"));

        assert_eq!(memory.len(), 2);
        let contents: Vec<_> = memory.entries().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["b", "c"]);
    }

    #[test]
    fn test_clear_resets_tokens() {
        let mut memory = AgentMemory::new();
        memory.push(
            MemoryEntry::new(MessageRole::User, "What should my headline say?")
                .with_metadata("source", Value::from("ui")),
        );
        assert!(memory.total_tokens() > 0);

        memory.clear();
        assert!(memory.is_empty());
        assert_eq!(memory.total_tokens(), 0);
    }
}
