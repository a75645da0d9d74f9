//! Role Classifier
//!
//! Maps a target role onto a portfolio layout category:
//! - Developer: project-first layouts
//! - Analyst: metrics-first layouts
//! - Designer: visual-first layouts
//! - Manager: experience-first layouts
//! - Default: balanced layout
//!
//! Categories are checked in that fixed order; the first keyword hit wins.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleCategory {
    Developer,
    Analyst,
    Designer,
    Manager,
    Default,
}

/// Static keyword lists, checked in priority order
const DEVELOPER_KEYWORDS: &[&str] = &["developer", "engineer", "programmer", "architect"];
const ANALYST_KEYWORDS: &[&str] = &["analyst", "scientist", "researcher"];
const DESIGNER_KEYWORDS: &[&str] = &["designer", "ux", "ui", "creative"];
const MANAGER_KEYWORDS: &[&str] = &["manager", "director", "lead", "head", "vp"];

/// Priority order used for tie-breaks
const PRIORITY: &[(RoleCategory, &[&str])] = &[
    (RoleCategory::Developer, DEVELOPER_KEYWORDS),
    (RoleCategory::Analyst, ANALYST_KEYWORDS),
    (RoleCategory::Designer, DESIGNER_KEYWORDS),
    (RoleCategory::Manager, MANAGER_KEYWORDS),
];

impl RoleCategory {
    /// Classify a role title by lowercase substring match
    pub fn classify(role: &str) -> RoleCategory {
        let role = role.to_lowercase();

        PRIORITY
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| role.contains(kw)))
            .map(|(category, _)| *category)
            .unwrap_or(RoleCategory::Default)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoleCategory::Developer => "developer",
            RoleCategory::Analyst => "analyst",
            RoleCategory::Designer => "designer",
            RoleCategory::Manager => "manager",
            RoleCategory::Default => "default",
        }
    }
}

impl fmt::Display for RoleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
