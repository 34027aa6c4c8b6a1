use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;

use super::SessionStore;
use crate::metrics::track_storage_operation;
use crate::models::Session;
use crate::utils::retry::{retry_async, RetryConfig};

fn session_key(id: &str) -> String {
    format!("session:{}", id)
}

/// Session records stored as JSON values in Redis, one key per session.
/// Whole-record writes only; concurrency control lives above this layer
/// in the per-session locks.
pub struct RedisSessionStore {
    redis: ConnectionManager,
    retry: RetryConfig,
}

impl RedisSessionStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self {
            redis,
            retry: RetryConfig::default(),
        }
    }

    async fn set_session(&self, session: &Session) -> Result<()> {
        let mut conn = self.redis.clone();
        let json = serde_json::to_string(session).context("Failed to serialize session")?;

        redis::cmd("SET")
            .arg(session_key(&session.id))
            .arg(&json)
            .query_async::<()>(&mut conn)
            .await
            .context("Failed to store session in Redis")?;

        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let mut conn = self.redis.clone();

        let session_json: Option<String> = redis::cmd("GET")
            .arg(session_key(id))
            .query_async(&mut conn)
            .await
            .context("Failed to get session from Redis")?;

        match session_json {
            Some(json) => {
                let session: Session =
                    serde_json::from_str(&json).context("Failed to deserialize session")?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    // SET with XX only touches keys that already exist, so a session that
    // expired or was never created stays absent instead of resurrecting.
    async fn update_session(&self, session: &Session) -> Result<Option<Session>> {
        let mut conn = self.redis.clone();
        let json = serde_json::to_string(session).context("Failed to serialize session")?;

        let stored: Option<String> = redis::cmd("SET")
            .arg(session_key(&session.id))
            .arg(&json)
            .arg("XX")
            .query_async(&mut conn)
            .await
            .context("Failed to update session in Redis")?;

        Ok(stored.map(|_| session.clone()))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn insert(&self, session: Session) -> Result<()> {
        track_storage_operation(
            "redis",
            "insert",
            retry_async(self.retry.clone(), || async {
                self.set_session(&session).await
            }),
        )
        .await
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        track_storage_operation(
            "redis",
            "get",
            retry_async(self.retry.clone(), || async {
                self.get_session(id).await
            }),
        )
        .await
    }

    async fn save(&self, session: Session) -> Result<Option<Session>> {
        track_storage_operation(
            "redis",
            "save",
            retry_async(self.retry.clone(), || async {
                self.update_session(&session).await
            }),
        )
        .await
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.redis.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .context("Redis ping failed")?;
        Ok(())
    }
}
