//! Core data models for the career agents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

//
// ================= Enums =================
//

/// Lifecycle of a single agent instance.
///
/// The control loop moves `Idle → Thinking → Executing → {Completed | Error}`;
/// only `reset` brings an agent back to `Idle`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionState {
    #[default]
    Idle,
    Thinking,
    Executing,
    Waiting,
    Completed,
    Error,
}

impl ExecutionState {
    /// True while a `run` owns the agent.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            ExecutionState::Thinking | ExecutionState::Executing | ExecutionState::Waiting
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Completed,
    Failed,
}

//
// ================= Action Record =================
//

/// One unit of agent work, as requested by `think` and settled by the loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action_id: Uuid,
    pub name: String,
    pub input: Value,
    pub output: Option<Value>,
    pub status: ActionStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ActionRecord {
    pub fn pending(name: impl Into<String>, input: Value) -> Self {
        Self {
            action_id: Uuid::new_v4(),
            name: name.into(),
            input,
            output: None,
            status: ActionStatus::Pending,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub(crate) fn complete(&mut self, output: Value) {
        self.output = Some(output);
        self.status = ActionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub(crate) fn fail(&mut self, error: String) {
        self.error = Some(error);
        self.status = ActionStatus::Failed;
        self.completed_at = Some(Utc::now());
    }
}

//
// ================= Outcome =================
//

/// The mapping every `run` returns. Serializes with a `status` tag of
/// `"success"` or `"error"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Success {
        agent: String,
        results: Vec<Value>,
        thought: Value,
    },
    Error {
        agent: String,
        error: String,
    },
}

impl Outcome {
    pub fn error(agent: impl Into<String>, error: impl fmt::Display) -> Self {
        Outcome::Error {
            agent: agent.into(),
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn agent(&self) -> &str {
        match self {
            Outcome::Success { agent, .. } | Outcome::Error { agent, .. } => agent,
        }
    }

    pub fn results(&self) -> &[Value] {
        match self {
            Outcome::Success { results, .. } => results,
            Outcome::Error { .. } => &[],
        }
    }

    pub fn thought(&self) -> Option<&Value> {
        match self {
            Outcome::Success { thought, .. } => Some(thought),
            Outcome::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Outcome::Error { error, .. } => Some(error),
            Outcome::Success { .. } => None,
        }
    }
}

//
// ================= Profile Inputs =================
//

/// A skill as it appears in profile data: either a bare name or a record
/// carrying endorsements.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SkillEntry {
    Named(String),
    Detailed {
        name: String,
        #[serde(default)]
        endorsements: u32,
    },
}

impl SkillEntry {
    pub fn name(&self) -> &str {
        match self {
            SkillEntry::Named(name) | SkillEntry::Detailed { name, .. } => name,
        }
    }

    pub fn endorsements(&self) -> u32 {
        match self {
            SkillEntry::Named(_) => 0,
            SkillEntry::Detailed { endorsements, .. } => *endorsements,
        }
    }
}

impl From<&str> for SkillEntry {
    fn from(name: &str) -> Self {
        SkillEntry::Named(name.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub period: String,
    pub description: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub url: String,
    pub image: String,
}

/// LinkedIn-style profile sections fed to the profile analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileData {
    pub headline: String,
    pub about: String,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<SkillEntry>,
}

/// Everything the user told us about themselves. Every field is optional at
/// the boundary; agents apply their own documented defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserData {
    pub name: Option<String>,
    pub email: Option<String>,
    pub current_role: Option<String>,
    pub target_role: Option<String>,
    pub industry: Option<String>,
    pub top_skills: Vec<String>,
    pub value_proposition: Option<String>,
    pub experience_summary: Option<String>,
    pub achievements: Vec<String>,
    pub career_goals: Option<String>,
    pub about: Option<String>,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<SkillEntry>,
    pub projects: Vec<Project>,
    pub interests: Vec<String>,
    pub values: Vec<String>,
    pub years_exp: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub website: Option<String>,
}

//
// ================= Feedback Inputs =================
//

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeadlineMetrics {
    pub profile_views: f64,
    pub search_appearances: f64,
    pub connection_requests: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PortfolioMetrics {
    pub hero_time: Option<f64>,
    pub project_clicks: f64,
    pub skill_views: f64,
    pub contact_clicks: f64,
}

/// Engagement signals collected after publishing. Missing numbers are zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Feedback {
    pub profile_views_trend: f64,
    pub skill_click_rate: f64,
    pub portfolio_bounce_rate: f64,
    pub headline_metrics: HeadlineMetrics,
    pub skill_engagement: BTreeMap<String, f64>,
    pub portfolio_metrics: PortfolioMetrics,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CurrentContent {
    pub headline: Option<String>,
    pub skills: Vec<SkillEntry>,
    pub portfolio_layout: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeadlineTrends {
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarketTrends {
    pub headline_trends: HeadlineTrends,
    pub skill_demand: BTreeMap<String, f64>,
    pub portfolio_trends: Map<String, Value>,
}

/// Per-section hints from market research, passed through to generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarketPatterns {
    pub headline: Map<String, Value>,
    pub about: Map<String, Value>,
    pub experience: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_serialization_shape() {
        let success = Outcome::Success {
            agent: "ProfileAnalyzer".to_string(),
            results: vec![json!({"section": "headline"})],
            thought: json!({"actions": []}),
        };
        let value = serde_json::to_value(&success).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["agent"], "ProfileAnalyzer");
        assert_eq!(value["results"][0]["section"], "headline");

        let failure = Outcome::error("Orchestrator", "boom");
        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value, json!({"status": "error", "agent": "Orchestrator", "error": "boom"}));
    }

    #[test]
    fn test_skill_entry_accepts_both_shapes() {
        let skills: Vec<SkillEntry> =
            serde_json::from_value(json!(["Rust", {"name": "SQL", "endorsements": 4}])).unwrap();
        assert_eq!(skills[0].name(), "Rust");
        assert_eq!(skills[0].endorsements(), 0);
        assert_eq!(skills[1].name(), "SQL");
        assert_eq!(skills[1].endorsements(), 4);
    }

    #[test]
    fn test_action_record_settles_once() {
        let mut record = ActionRecord::pending("analyze_headline", json!({"headline": ""}));
        assert_eq!(record.status, ActionStatus::Pending);
        record.complete(json!({"score": 0}));
        assert_eq!(record.status, ActionStatus::Completed);
        assert!(record.completed_at.is_some());
        assert!(record.error.is_none());
    }

    #[test]
    fn test_in_flight_states() {
        assert!(ExecutionState::Thinking.is_in_flight());
        assert!(ExecutionState::Executing.is_in_flight());
        assert!(!ExecutionState::Idle.is_in_flight());
        assert!(!ExecutionState::Completed.is_in_flight());
        assert!(!ExecutionState::Error.is_in_flight());
    }
}
