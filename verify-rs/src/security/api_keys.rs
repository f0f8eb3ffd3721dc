//! API key authentication
//!
//! Callers authenticate with a bearer key carried in the `X-API-Key`
//! header. Keys live in sqlite and map to the owning user id.
//!
//! # Security
//! - Keys can be deactivated without losing the audit trail
//! - Successful lookups record a last-used timestamp
//! - Store failures deny access: identity is never guessed

use crate::error::Result;
use rand::Rng;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info, warn};

const KEY_PREFIX: &str = "uv_";
const KEY_HEX_LEN: usize = 64;

/// Credential store backed by sqlite
#[derive(Clone)]
pub struct ApiKeyStore {
    pub db: Arc<SqlitePool>,
}

impl ApiKeyStore {
    /// Connect and ensure the schema exists
    pub async fn new(database_url: &str) -> Result<Self> {
        let db = SqlitePool::connect(database_url).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS api_keys (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                key TEXT NOT NULL UNIQUE,
                user_id TEXT NOT NULL,
                name TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                last_used TEXT
            )
            "#,
        )
        .execute(&db)
        .await?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Owner of an active key, touching its last-used time
    ///
    /// Returns `Ok(None)` for unknown or deactivated keys. Store errors
    /// propagate so the caller can refuse the request.
    pub async fn lookup_caller(&self, api_key: &str) -> Result<Option<String>> {
        let row = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT id, user_id FROM api_keys
            WHERE key = ? AND is_active = 1
            "#,
        )
        .bind(api_key)
        .fetch_optional(&*self.db)
        .await?;

        let Some((id, user_id)) = row else {
            warn!("Rejected unknown or inactive API key");
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE api_keys SET last_used = datetime('now') WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&*self.db)
        .await?;

        debug!("Authenticated caller {}", user_id);
        Ok(Some(user_id))
    }

    /// Provision a key for a caller; returns the generated key
    pub async fn add_key(&self, user_id: &str, name: &str) -> Result<String> {
        let key = generate_key();

        sqlx::query(
            r#"
            INSERT INTO api_keys (key, user_id, name, created_at)
            VALUES (?, ?, ?, datetime('now'))
            "#,
        )
        .bind(&key)
        .bind(user_id)
        .bind(name)
        .execute(&*self.db)
        .await?;

        info!("Provisioned API key \"{}\" for {}", name, user_id);
        Ok(key)
    }

    /// Deactivate a key, keeping its row for auditing
    pub async fn deactivate_key(&self, api_key: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE api_keys SET is_active = 0 WHERE key = ?
            "#,
        )
        .bind(api_key)
        .execute(&*self.db)
        .await?;

        Ok(())
    }
}

/// `uv_` plus 64 random hex characters
fn generate_key() -> String {
    const HEX: &[u8] = b"0123456789abcdef";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..KEY_HEX_LEN)
        .map(|_| HEX[rng.gen_range(0..HEX.len())] as char)
        .collect();
    format!("{}{}", KEY_PREFIX, suffix)
}
