//! Career DNA
//!
//! Merged profile summary (strengths, gaps, opportunities, focus areas)
//! derived from user data and a previous profile analysis.

use crate::models::{SkillEntry, UserData};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const MAX_STRENGTHS: usize = 5;
const MAX_GAPS: usize = 5;

const RECOMMENDED_FOCUS: &[&str] = &[
    "Optimize LinkedIn headline",
    "Enhance project descriptions",
    "Build thought leadership content",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CareerDna {
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub opportunities: Vec<String>,
    pub recommended_focus: Vec<String>,
}

/// The part of a profile analysis the DNA builder reads.
///
/// A full analyzer outcome deserializes into this directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisDigest {
    pub results: Vec<AnalysisFindings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisFindings {
    pub recommendations: Vec<String>,
}

impl CareerDna {
    pub fn build(user: &UserData, analysis: &AnalysisDigest) -> Self {
        let strengths = user
            .skills
            .iter()
            .take(MAX_STRENGTHS)
            .map(|s| s.name().to_string())
            .collect();

        let gaps = analysis
            .results
            .iter()
            .flat_map(|r| r.recommendations.iter().cloned())
            .take(MAX_GAPS)
            .collect();

        let target = user.target_role.as_deref().unwrap_or("");
        let current = user.current_role.as_deref().unwrap_or("");
        let mut opportunities = Vec::new();
        if target != current {
            opportunities.push(format!("Transition to {}", target));
        }

        Self {
            strengths,
            gaps,
            opportunities,
            recommended_focus: RECOMMENDED_FOCUS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn first_some(primary: &Option<String>, fallbacks: &[UserData], field: fn(&UserData) -> &Option<String>) -> Option<String> {
    primary
        .clone()
        .or_else(|| fallbacks.iter().find_map(|f| field(f).clone()))
}

fn first_non_empty(primary: &[String], fallbacks: &[UserData], field: fn(&UserData) -> &Vec<String>) -> Vec<String> {
    if !primary.is_empty() {
        return primary.to_vec();
    }
    fallbacks
        .iter()
        .map(field)
        .find(|v| !v.is_empty())
        .cloned()
        .unwrap_or_default()
}

/// Merge profile sources with set-default priority.
///
/// Scalars and plain lists keep the first present value (primary first),
/// skills are unioned in first-seen order with case-insensitive de-duplication,
/// and projects and experience are concatenated.
pub fn merge_sources(primary: &UserData, fallbacks: &[UserData]) -> UserData {
    let mut seen = HashSet::new();
    let skills: Vec<SkillEntry> = std::iter::once(primary)
        .chain(fallbacks.iter())
        .flat_map(|source| source.skills.iter())
        .filter(|skill| seen.insert(skill.name().to_lowercase()))
        .cloned()
        .collect();

    let experience = std::iter::once(primary)
        .chain(fallbacks.iter())
        .flat_map(|source| source.experience.iter().cloned())
        .collect();

    let projects = std::iter::once(primary)
        .chain(fallbacks.iter())
        .flat_map(|source| source.projects.iter().cloned())
        .collect();

    UserData {
        name: first_some(&primary.name, fallbacks, |u| &u.name),
        email: first_some(&primary.email, fallbacks, |u| &u.email),
        current_role: first_some(&primary.current_role, fallbacks, |u| &u.current_role),
        target_role: first_some(&primary.target_role, fallbacks, |u| &u.target_role),
        industry: first_some(&primary.industry, fallbacks, |u| &u.industry),
        top_skills: first_non_empty(&primary.top_skills, fallbacks, |u| &u.top_skills),
        value_proposition: first_some(&primary.value_proposition, fallbacks, |u| &u.value_proposition),
        experience_summary: first_some(&primary.experience_summary, fallbacks, |u| &u.experience_summary),
        achievements: first_non_empty(&primary.achievements, fallbacks, |u| &u.achievements),
        career_goals: first_some(&primary.career_goals, fallbacks, |u| &u.career_goals),
        about: first_some(&primary.about, fallbacks, |u| &u.about),
        experience,
        skills,
        projects,
        interests: first_non_empty(&primary.interests, fallbacks, |u| &u.interests),
        values: first_non_empty(&primary.values, fallbacks, |u| &u.values),
        years_exp: first_some(&primary.years_exp, fallbacks, |u| &u.years_exp),
        linkedin_url: first_some(&primary.linkedin_url, fallbacks, |u| &u.linkedin_url),
        github_url: first_some(&primary.github_url, fallbacks, |u| &u.github_url),
        website: first_some(&primary.website, fallbacks, |u| &u.website),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Project;
    use serde_json::json;

    #[test]
    fn test_build_from_analysis_outcome() {
        let user: UserData = serde_json::from_value(json!({
            "current_role": "Analyst",
            "target_role": "Data Scientist",
            "skills": ["Python", "SQL", {"name": "Statistics", "endorsements": 2}, "R", "Tableau", "Excel"]
        }))
        .unwrap();

        let analysis: AnalysisDigest = serde_json::from_value(json!({
            "status": "success",
            "agent": "ProfileAnalyzer",
            "results": [
                {"section": "headline", "recommendations": ["a", "b"]},
                {"section": "about", "recommendations": ["c", "d"]},
                {"section": "skills", "recommendations": ["e", "f"]}
            ]
        }))
        .unwrap();

        let dna = CareerDna::build(&user, &analysis);
        assert_eq!(dna.strengths, vec!["Python", "SQL", "Statistics", "R", "Tableau"]);
        assert_eq!(dna.gaps, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(dna.opportunities, vec!["Transition to Data Scientist"]);
        assert_eq!(dna.recommended_focus.len(), 3);
    }

    #[test]
    fn test_same_role_has_no_transition() {
        let user = UserData {
            current_role: Some("Designer".into()),
            target_role: Some("Designer".into()),
            ..Default::default()
        };
        let dna = CareerDna::build(&user, &AnalysisDigest::default());
        assert!(dna.opportunities.is_empty());
        assert!(dna.gaps.is_empty());

        // both missing compare equal
        let dna = CareerDna::build(&UserData::default(), &AnalysisDigest::default());
        assert!(dna.opportunities.is_empty());
    }

    #[test]
    fn test_merge_sources_priority() {
        let primary = UserData {
            name: Some("Ada".into()),
            skills: vec![SkillEntry::from("Rust"), SkillEntry::from("SQL")],
            projects: vec![Project { name: "compiler".into(), ..Default::default() }],
            ..Default::default()
        };
        let resume = UserData {
            name: Some("A. Lovelace".into()),
            email: Some("ada@example.com".into()),
            skills: vec![SkillEntry::from("sql"), SkillEntry::from("Python")],
            projects: vec![Project { name: "engine".into(), ..Default::default() }],
            interests: vec!["math".into()],
            ..Default::default()
        };

        let merged = merge_sources(&primary, &[resume]);
        assert_eq!(merged.name.as_deref(), Some("Ada"));
        assert_eq!(merged.email.as_deref(), Some("ada@example.com"));
        let skills: Vec<_> = merged.skills.iter().map(|s| s.name()).collect();
        assert_eq!(skills, vec!["Rust", "SQL", "Python"]);
        assert_eq!(merged.projects.len(), 2);
        assert_eq!(merged.interests, vec!["math"]);
    }
}
