//! SQLite-backed profile store

use super::{AnalysisRecord, ProfileRecord, ProfileStore, UserRecord};
use crate::error::AgentError;
use crate::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      email TEXT NOT NULL UNIQUE,
      name TEXT NOT NULL,
      created_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL REFERENCES users(id),
      source TEXT NOT NULL,
      raw_data TEXT NOT NULL,
      processed_data TEXT,
      created_at TEXT NOT NULL,
      updated_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_profiles_user_time
    ON profiles (user_id, created_at);
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS analyses (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      profile_id INTEGER NOT NULL REFERENCES profiles(id),
      kind TEXT NOT NULL,
      payload TEXT NOT NULL,
      score INTEGER,
      created_at TEXT NOT NULL
    );
    "#,
];

pub struct SqliteProfileStore {
    pool: SqlitePool,
    schema_ready: Arc<OnceCell<()>>,
}

impl SqliteProfileStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            schema_ready: Arc::new(OnceCell::new()),
        }
    }

    /// Lazily connecting pool; the schema is created on first use
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_lazy(database_url)?;
        info!(database_url, "Profile store backend: sqlite");
        Ok(Self::new(pool))
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.schema_ready
            .get_or_try_init(|| async {
                for statement in SCHEMA {
                    sqlx::query(statement).execute(&self.pool).await?;
                }
                Ok::<(), sqlx::Error>(())
            })
            .await
            .map_err(|e| AgentError::Store(format!("Failed to initialize profile schema: {}", e)))?;

        Ok(())
    }
}

fn json_column(row: &SqliteRow, column: &str) -> Result<Value> {
    let raw: String = row.try_get(column)?;
    Ok(serde_json::from_str(&raw)?)
}

fn user_from_row(row: &SqliteRow) -> Result<UserRecord> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn profile_from_row(row: &SqliteRow) -> Result<ProfileRecord> {
    let processed: Option<String> = row.try_get("processed_data")?;
    Ok(ProfileRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        source: row.try_get("source")?,
        raw_data: json_column(row, "raw_data")?,
        processed_data: processed.map(|raw| serde_json::from_str(&raw)).transpose()?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn analysis_from_row(row: &SqliteRow) -> Result<AnalysisRecord> {
    Ok(AnalysisRecord {
        id: row.try_get("id")?,
        profile_id: row.try_get("profile_id")?,
        kind: row.try_get("kind")?,
        payload: json_column(row, "payload")?,
        score: row.try_get("score")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[async_trait::async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn create_user(&self, email: &str, name: &str) -> Result<UserRecord> {
        self.ensure_schema().await?;
        if self.get_user_by_email(email).await?.is_some() {
            return Err(AgentError::Store(format!("user with email {} already exists", email)));
        }

        let created_at = Utc::now();
        let id = sqlx::query("INSERT INTO users (email, name, created_at) VALUES (?, ?, ?)")
            .bind(email)
            .bind(name)
            .bind(created_at)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(UserRecord {
            id,
            email: email.to_string(),
            name: name.to_string(),
            created_at,
        })
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>> {
        self.ensure_schema().await?;
        let row = sqlx::query("SELECT id, email, name, created_at FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.ensure_schema().await?;
        let row = sqlx::query("SELECT id, email, name, created_at FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn create_profile(&self, user_id: i64, source: &str, raw_data: Value) -> Result<ProfileRecord> {
        if self.get_user(user_id).await?.is_none() {
            return Err(AgentError::NotFound(format!("user {}", user_id)));
        }

        let now = Utc::now();
        let id = sqlx::query(
            r#"
            INSERT INTO profiles (user_id, source, raw_data, processed_data, created_at, updated_at)
            VALUES (?, ?, ?, NULL, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(source)
        .bind(serde_json::to_string(&raw_data)?)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(ProfileRecord {
            id,
            user_id,
            source: source.to_string(),
            raw_data,
            processed_data: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_profile(&self, profile_id: i64) -> Result<Option<ProfileRecord>> {
        self.ensure_schema().await?;
        let row = sqlx::query(
            r#"
            SELECT id, user_id, source, raw_data, processed_data, created_at, updated_at
            FROM profiles WHERE id = ?
            "#,
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(profile_from_row).transpose()
    }

    async fn profiles_for_user(&self, user_id: i64) -> Result<Vec<ProfileRecord>> {
        self.ensure_schema().await?;
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, source, raw_data, processed_data, created_at, updated_at
            FROM profiles WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(profile_from_row).collect()
    }

    async fn latest_profile_for_user(&self, user_id: i64) -> Result<Option<ProfileRecord>> {
        Ok(self.profiles_for_user(user_id).await?.into_iter().next())
    }

    async fn update_processed_data(&self, profile_id: i64, processed: Value) -> Result<ProfileRecord> {
        self.ensure_schema().await?;
        let affected = sqlx::query("UPDATE profiles SET processed_data = ?, updated_at = ? WHERE id = ?")
            .bind(serde_json::to_string(&processed)?)
            .bind(Utc::now())
            .bind(profile_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(AgentError::NotFound(format!("profile {}", profile_id)));
        }

        self.get_profile(profile_id)
            .await?
            .ok_or_else(|| AgentError::NotFound(format!("profile {}", profile_id)))
    }

    async fn save_analysis(
        &self,
        profile_id: i64,
        kind: &str,
        payload: Value,
        score: Option<i64>,
    ) -> Result<AnalysisRecord> {
        if self.get_profile(profile_id).await?.is_none() {
            return Err(AgentError::NotFound(format!("profile {}", profile_id)));
        }

        let created_at = Utc::now();
        let id = sqlx::query(
            "INSERT INTO analyses (profile_id, kind, payload, score, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(profile_id)
        .bind(kind)
        .bind(serde_json::to_string(&payload)?)
        .bind(score)
        .bind(created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(AnalysisRecord {
            id,
            profile_id,
            kind: kind.to_string(),
            payload,
            score,
            created_at,
        })
    }

    async fn analyses_for_profile(&self, profile_id: i64) -> Result<Vec<AnalysisRecord>> {
        self.ensure_schema().await?;
        let rows = sqlx::query(
            r#"
            SELECT id, profile_id, kind, payload, score, created_at
            FROM analyses WHERE profile_id = ?
            ORDER BY id
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(analysis_from_row).collect()
    }
}
