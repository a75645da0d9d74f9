//! Model catalogue and selection rules
//!
//! Filters by task, then by use case, then by performance tier. Each filter
//! is skipped when it would leave no candidates; the first survivor wins.

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelTask {
    #[serde(rename = "text-generation")]
    TextGeneration,
    #[serde(rename = "summarization")]
    Summarization,
    #[serde(rename = "zero-shot-classification")]
    Classification,
    #[serde(rename = "feature-extraction")]
    Embedding,
    #[serde(rename = "token-classification")]
    Ner,
    #[serde(rename = "question-answering")]
    QuestionAnswering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Fast,
    Balanced,
    Quality,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub key: &'static str,
    pub id: &'static str,
    pub task: ModelTask,
    pub description: &'static str,
    pub max_input_length: usize,
    pub recommended_for: &'static [&'static str],
    pub tier: ModelTier,
}

const CATALOGUE: &[ModelInfo] = &[
    // Text generation
    ModelInfo {
        key: "mistral-7b",
        id: "mistralai/Mistral-7B-Instruct-v0.2",
        task: ModelTask::TextGeneration,
        description: "High-quality instruction-tuned model",
        max_input_length: 8192,
        recommended_for: &["content_generation", "creative_writing"],
        tier: ModelTier::Quality,
    },
    ModelInfo {
        key: "phi-2",
        id: "microsoft/phi-2",
        task: ModelTask::TextGeneration,
        description: "Fast and efficient small model",
        max_input_length: 2048,
        recommended_for: &["quick_responses", "simple_tasks"],
        tier: ModelTier::Fast,
    },
    ModelInfo {
        key: "zephyr-7b",
        id: "HuggingFaceH4/zephyr-7b-beta",
        task: ModelTask::TextGeneration,
        description: "Balanced performance model",
        max_input_length: 4096,
        recommended_for: &["general_purpose", "chat"],
        tier: ModelTier::Balanced,
    },
    // Summarization
    ModelInfo {
        key: "bart-large-cnn",
        id: "facebook/bart-large-cnn",
        task: ModelTask::Summarization,
        description: "News-style summarization",
        max_input_length: 1024,
        recommended_for: &["article_summary", "content_condensing"],
        tier: ModelTier::Quality,
    },
    ModelInfo {
        key: "t5-base",
        id: "t5-base",
        task: ModelTask::Summarization,
        description: "Versatile text-to-text model",
        max_input_length: 512,
        recommended_for: &["general_summarization"],
        tier: ModelTier::Balanced,
    },
    // Embeddings
    ModelInfo {
        key: "minilm",
        id: "sentence-transformers/all-MiniLM-L6-v2",
        task: ModelTask::Embedding,
        description: "Fast semantic embeddings",
        max_input_length: 256,
        recommended_for: &["similarity_search", "clustering"],
        tier: ModelTier::Fast,
    },
    ModelInfo {
        key: "mpnet",
        id: "sentence-transformers/all-mpnet-base-v2",
        task: ModelTask::Embedding,
        description: "High-quality embeddings",
        max_input_length: 384,
        recommended_for: &["semantic_search", "retrieval"],
        tier: ModelTier::Quality,
    },
    // Classification
    ModelInfo {
        key: "bart-mnli",
        id: "facebook/bart-large-mnli",
        task: ModelTask::Classification,
        description: "Zero-shot classification",
        max_input_length: 1024,
        recommended_for: &["categorization", "intent_detection"],
        tier: ModelTier::Quality,
    },
    // NER
    ModelInfo {
        key: "bert-ner",
        id: "dslim/bert-base-NER",
        task: ModelTask::Ner,
        description: "Named entity recognition",
        max_input_length: 512,
        recommended_for: &["entity_extraction", "resume_parsing"],
        tier: ModelTier::Balanced,
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ModelSelector;

impl ModelSelector {
    pub fn new() -> Self {
        Self
    }

    pub fn select(&self, task: ModelTask, use_case: Option<&str>, tier: ModelTier) -> &'static ModelInfo {
        let mut candidates: Vec<&'static ModelInfo> =
            CATALOGUE.iter().filter(|m| m.task == task).collect();

        if candidates.is_empty() {
            warn!(task = ?task, "No models registered for task, using catalogue default");
            return &CATALOGUE[0];
        }

        if let Some(use_case) = use_case {
            let matches: Vec<_> = candidates
                .iter()
                .copied()
                .filter(|m| m.recommended_for.contains(&use_case))
                .collect();
            if !matches.is_empty() {
                candidates = matches;
            }
        }

        let tier_matches: Vec<_> = candidates.iter().copied().filter(|m| m.tier == tier).collect();
        if !tier_matches.is_empty() {
            candidates = tier_matches;
        }

        candidates[0]
    }

    /// Default model for profile content generation
    pub fn for_headline(&self) -> &'static ModelInfo {
        self.select(ModelTask::TextGeneration, Some("content_generation"), ModelTier::Quality)
    }

    pub fn list(&self, task: Option<ModelTask>) -> Vec<&'static ModelInfo> {
        CATALOGUE
            .iter()
            .filter(|m| task.map_or(true, |t| m.task == t))
            .collect()
    }

    /// Look up a catalogue entry by its short key
    pub fn get(&self, key: &str) -> Option<&'static ModelInfo> {
        CATALOGUE.iter().find(|m| m.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_case_selection() {
        let selector = ModelSelector::new();
        assert_eq!(selector.for_headline().id, "mistralai/Mistral-7B-Instruct-v0.2");
        // use case picks mpnet, tier filter finds no balanced match and is skipped
        let embedding = selector.select(ModelTask::Embedding, Some("semantic_search"), ModelTier::Balanced);
        assert_eq!(embedding.key, "mpnet");
        let ner = selector.select(ModelTask::Ner, Some("entity_extraction"), ModelTier::Balanced);
        assert_eq!(ner.id, "dslim/bert-base-NER");
    }

    #[test]
    fn test_tier_and_fallbacks() {
        let selector = ModelSelector::new();
        let fast = selector.select(ModelTask::TextGeneration, None, ModelTier::Fast);
        assert_eq!(fast.key, "phi-2");

        let unknown_use_case = selector.select(ModelTask::Summarization, Some("poetry"), ModelTier::Balanced);
        assert_eq!(unknown_use_case.key, "t5-base");

        let no_models = selector.select(ModelTask::QuestionAnswering, None, ModelTier::Fast);
        assert_eq!(no_models.key, "mistral-7b");
    }

    #[test]
    fn test_listing() {
        let selector = ModelSelector::new();
        assert_eq!(selector.list(None).len(), 9);
        assert_eq!(selector.list(Some(ModelTask::Embedding)).len(), 2);
        assert!(selector.get("zephyr-7b").is_some());
        assert!(selector.get("gpt-5").is_none());

        let value = serde_json::to_value(selector.get("minilm").unwrap()).unwrap();
        assert_eq!(value["task"], "feature-extraction");
        assert_eq!(value["tier"], "fast");
    }
}
