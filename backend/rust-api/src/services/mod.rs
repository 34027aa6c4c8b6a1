use std::sync::Arc;

use mongodb::Client as MongoClient;
use redis::aio::ConnectionManager;

use crate::config::{Config, StorageBackend};
use crate::storage::memory::{MemoryQuestionStore, MemorySessionStore};
use crate::storage::mongo::MongoQuestionStore;
use crate::storage::redis::RedisSessionStore;
use crate::storage::{QuestionStore, SessionStore};

pub mod allocation_service;
pub mod grading_service;
pub mod scoring_service;
pub mod session_service;

use session_service::SessionLocks;

pub struct AppState {
    pub config: Config,
    pub questions: Arc<dyn QuestionStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub locks: Arc<SessionLocks>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (questions, sessions) = match config.storage_backend {
            StorageBackend::Memory => {
                tracing::info!("Using in-memory storage backend");
                let questions: Arc<dyn QuestionStore> = Arc::new(MemoryQuestionStore::new());
                let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
                (questions, sessions)
            }
            StorageBackend::MongoRedis => {
                let mongo_uri = config.mongo_uri.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("MONGO_URI is required for the mongo-redis backend")
                })?;
                let redis_uri = config.redis_uri.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("REDIS_URI is required for the mongo-redis backend")
                })?;

                let mongo_client = MongoClient::with_uri_str(mongo_uri).await?;
                let mongo = mongo_client.database(&config.mongo_database);

                tracing::info!("Attempting to connect to Redis...");

                let redis_client = redis::Client::open(redis_uri)?;
                let redis = tokio::time::timeout(
                    std::time::Duration::from_secs(30),
                    ConnectionManager::new(redis_client),
                )
                .await
                .map_err(|_| anyhow::anyhow!("Redis connection timeout after 30s"))??;

                tracing::info!("Redis ConnectionManager created, testing with PING...");

                let mut conn = redis.clone();
                tokio::time::timeout(
                    std::time::Duration::from_secs(5),
                    redis::cmd("PING").query_async::<String>(&mut conn),
                )
                .await
                .map_err(|_| anyhow::anyhow!("Redis PING timeout after 5s"))??;

                tracing::info!("Redis connection established successfully");

                let questions: Arc<dyn QuestionStore> = Arc::new(MongoQuestionStore::new(mongo));
                let sessions: Arc<dyn SessionStore> = Arc::new(RedisSessionStore::new(redis));
                (questions, sessions)
            }
        };

        Ok(Self {
            config,
            questions,
            sessions,
            locks: Arc::new(SessionLocks::new()),
        })
    }
}
