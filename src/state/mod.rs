//! Profile persistence layer
//!
//! Users, their imported profiles, and analyses derived from those profiles.
//! The in-memory store is used for tests and the CLI; the SQLite store backs
//! the API server.

pub mod sqlite;

use crate::error::AgentError;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

pub use sqlite::SqliteProfileStore;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileRecord {
    pub id: i64,
    pub user_id: i64,
    /// linkedin, resume, github or manual
    pub source: String,
    pub raw_data: Value,
    pub processed_data: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Something derived from a profile: an agent outcome, career DNA, an optimization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRecord {
    pub id: i64,
    pub profile_id: i64,
    pub kind: String,
    pub payload: Value,
    pub score: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Trait for profile persistence
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fails with a store error if the email is already registered
    async fn create_user(&self, email: &str, name: &str) -> Result<UserRecord>;
    async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn get_or_create_user(&self, email: &str, name: &str) -> Result<UserRecord> {
        match self.get_user_by_email(email).await? {
            Some(user) => Ok(user),
            None => self.create_user(email, name).await,
        }
    }

    async fn create_profile(&self, user_id: i64, source: &str, raw_data: Value) -> Result<ProfileRecord>;
    async fn get_profile(&self, profile_id: i64) -> Result<Option<ProfileRecord>>;
    async fn profiles_for_user(&self, user_id: i64) -> Result<Vec<ProfileRecord>>;
    async fn latest_profile_for_user(&self, user_id: i64) -> Result<Option<ProfileRecord>>;
    async fn update_processed_data(&self, profile_id: i64, processed: Value) -> Result<ProfileRecord>;

    async fn save_analysis(
        &self,
        profile_id: i64,
        kind: &str,
        payload: Value,
        score: Option<i64>,
    ) -> Result<AnalysisRecord>;
    async fn analyses_for_profile(&self, profile_id: i64) -> Result<Vec<AnalysisRecord>>;
}

/// In-memory profile store for development and tests
pub struct InMemoryProfileStore {
    users: Arc<RwLock<HashMap<i64, UserRecord>>>,
    profiles: Arc<RwLock<HashMap<i64, ProfileRecord>>>,
    analyses: Arc<RwLock<HashMap<i64, AnalysisRecord>>>,
    next_id: AtomicI64,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            profiles: Arc::new(RwLock::new(HashMap::new())),
            analyses: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn require_user(&self, user_id: i64) -> Result<()> {
        if self.users.read().await.contains_key(&user_id) {
            Ok(())
        } else {
            Err(AgentError::NotFound(format!("user {}", user_id)))
        }
    }

    async fn require_profile(&self, profile_id: i64) -> Result<()> {
        if self.profiles.read().await.contains_key(&profile_id) {
            Ok(())
        } else {
            Err(AgentError::NotFound(format!("profile {}", profile_id)))
        }
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Newest first; ids break timestamp ties
fn newest_first(a: &ProfileRecord, b: &ProfileRecord) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

#[async_trait::async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn create_user(&self, email: &str, name: &str) -> Result<UserRecord> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(AgentError::Store(format!("user with email {} already exists", email)));
        }

        let user = UserRecord {
            id: self.allocate_id(),
            email: email.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create_profile(&self, user_id: i64, source: &str, raw_data: Value) -> Result<ProfileRecord> {
        self.require_user(user_id).await?;

        let now = Utc::now();
        let profile = ProfileRecord {
            id: self.allocate_id(),
            user_id,
            source: source.to_string(),
            raw_data,
            processed_data: None,
            created_at: now,
            updated_at: now,
        };
        self.profiles.write().await.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn get_profile(&self, profile_id: i64) -> Result<Option<ProfileRecord>> {
        Ok(self.profiles.read().await.get(&profile_id).cloned())
    }

    async fn profiles_for_user(&self, user_id: i64) -> Result<Vec<ProfileRecord>> {
        let profiles = self.profiles.read().await;
        let mut owned: Vec<ProfileRecord> = profiles
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(newest_first);
        Ok(owned)
    }

    async fn latest_profile_for_user(&self, user_id: i64) -> Result<Option<ProfileRecord>> {
        Ok(self.profiles_for_user(user_id).await?.into_iter().next())
    }

    async fn update_processed_data(&self, profile_id: i64, processed: Value) -> Result<ProfileRecord> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(&profile_id)
            .ok_or_else(|| AgentError::NotFound(format!("profile {}", profile_id)))?;

        profile.processed_data = Some(processed);
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn save_analysis(
        &self,
        profile_id: i64,
        kind: &str,
        payload: Value,
        score: Option<i64>,
    ) -> Result<AnalysisRecord> {
        self.require_profile(profile_id).await?;

        let analysis = AnalysisRecord {
            id: self.allocate_id(),
            profile_id,
            kind: kind.to_string(),
            payload,
            score,
            created_at: Utc::now(),
        };
        self.analyses.write().await.insert(analysis.id, analysis.clone());
        Ok(analysis)
    }

    async fn analyses_for_profile(&self, profile_id: i64) -> Result<Vec<AnalysisRecord>> {
        let analyses = self.analyses.read().await;
        let mut found: Vec<AnalysisRecord> = analyses
            .values()
            .filter(|a| a.profile_id == profile_id)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.id);
        Ok(found)
    }
}

/// Shared behaviour checks run against every store implementation
#[cfg(test)]
pub(crate) mod conformance {
    use super::*;
    use serde_json::json;

    pub async fn exercise(store: &dyn ProfileStore) {
        let user = store.create_user("ada@example.com", "Ada").await.unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(store.get_user(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(
            store.get_user_by_email("ada@example.com").await.unwrap().map(|u| u.id),
            Some(user.id)
        );
        assert!(store.get_user(user.id + 1000).await.unwrap().is_none());

        let duplicate = store.create_user("ada@example.com", "Someone").await;
        assert!(matches!(duplicate, Err(AgentError::Store(_))));

        let same = store.get_or_create_user("ada@example.com", "Ignored").await.unwrap();
        assert_eq!(same.id, user.id);
        assert_eq!(same.name, "Ada");
        let fresh = store.get_or_create_user("grace@example.com", "Grace").await.unwrap();
        assert_ne!(fresh.id, user.id);

        let first = store
            .create_profile(user.id, "linkedin", json!({ "headline": "Engineer" }))
            .await
            .unwrap();
        let second = store
            .create_profile(user.id, "resume", json!({ "skills": ["Rust"] }))
            .await
            .unwrap();
        assert!(first.processed_data.is_none());

        let latest = store.latest_profile_for_user(user.id).await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
        assert_eq!(store.profiles_for_user(user.id).await.unwrap().len(), 2);
        assert!(store.latest_profile_for_user(fresh.id).await.unwrap().is_none());

        let missing_owner = store.create_profile(user.id + 1000, "manual", json!({})).await;
        assert!(matches!(missing_owner, Err(AgentError::NotFound(_))));

        let updated = store
            .update_processed_data(first.id, json!({ "score": 80 }))
            .await
            .unwrap();
        assert_eq!(updated.processed_data, Some(json!({ "score": 80 })));
        assert_eq!(
            store.get_profile(first.id).await.unwrap().unwrap().processed_data,
            Some(json!({ "score": 80 }))
        );
        let missing = store.update_processed_data(first.id + 1000, json!({})).await;
        assert!(matches!(missing, Err(AgentError::NotFound(_))));

        store
            .save_analysis(first.id, "profile_analysis", json!({ "status": "success" }), Some(72))
            .await
            .unwrap();
        store
            .save_analysis(first.id, "career_dna", json!({ "strengths": [] }), None)
            .await
            .unwrap();
        let analyses = store.analyses_for_profile(first.id).await.unwrap();
        let kinds: Vec<_> = analyses.iter().map(|a| a.kind.as_str()).collect();
        assert_eq!(kinds, vec!["profile_analysis", "career_dna"]);
        assert_eq!(analyses[0].score, Some(72));
        assert!(store.analyses_for_profile(second.id).await.unwrap().is_empty());

        let orphan = store.save_analysis(first.id + 1000, "x", json!({}), None).await;
        assert!(matches!(orphan, Err(AgentError::NotFound(_))));
    }
}
