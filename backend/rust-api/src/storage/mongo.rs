use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson};
use mongodb::{Collection, Database};

use super::QuestionStore;
use crate::metrics::track_storage_operation;
use crate::models::question::Question;
use crate::utils::retry::{retry_async, RetryConfig};

const QUESTIONS_COLLECTION: &str = "questions";

/// Question bank backed by a MongoDB collection. Every operation retries
/// transient failures with bounded backoff and reports to the storage
/// metrics, so a flaky primary shows up in Prometheus before it shows up
/// as a 500.
pub struct MongoQuestionStore {
    db: Database,
    collection: Collection<Question>,
    retry: RetryConfig,
}

impl MongoQuestionStore {
    pub fn new(db: Database) -> Self {
        let collection = db.collection(QUESTIONS_COLLECTION);
        Self {
            db,
            collection,
            retry: RetryConfig::default(),
        }
    }

    async fn replace_by_id(&self, questions: &[Question]) -> Result<u64> {
        let ids: Vec<Bson> = questions
            .iter()
            .map(|q| Bson::String(q.id.clone()))
            .collect();

        // Re-seeding the same ids replaces the previous rows.
        self.collection
            .delete_many(doc! { "id": { "$in": ids } })
            .await
            .context("Failed to drop questions being re-seeded")?;

        let result = self
            .collection
            .insert_many(questions)
            .await
            .context("Failed to insert questions")?;

        Ok(result.inserted_ids.len() as u64)
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = self
            .collection
            .delete_many(doc! {})
            .await
            .context("Failed to clear question bank")?;
        Ok(result.deleted_count)
    }

    async fn find_published_in_domains(&self, domains: &[String]) -> Result<Vec<Question>> {
        let domains: Vec<Bson> = domains
            .iter()
            .map(|d| Bson::String(d.clone()))
            .collect();

        let cursor = self
            .collection
            .find(doc! { "domain": { "$in": domains }, "status": "published" })
            .await
            .context("Failed to query questions by domain")?;

        cursor
            .try_collect()
            .await
            .context("Failed to collect domain questions")
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Question>> {
        let ids: Vec<Bson> = ids.iter().map(|id| Bson::String(id.clone())).collect();

        let cursor = self
            .collection
            .find(doc! { "id": { "$in": ids } })
            .await
            .context("Failed to query questions by id")?;

        cursor
            .try_collect()
            .await
            .context("Failed to collect questions by id")
    }
}

#[async_trait]
impl QuestionStore for MongoQuestionStore {
    async fn seed(&self, questions: Vec<Question>) -> Result<u64> {
        track_storage_operation(
            "mongo",
            "seed",
            retry_async(self.retry.clone(), || async {
                self.replace_by_id(&questions).await
            }),
        )
        .await
    }

    async fn clear(&self) -> Result<u64> {
        track_storage_operation(
            "mongo",
            "clear",
            retry_async(self.retry.clone(), || async { self.delete_all().await }),
        )
        .await
    }

    async fn by_domains(&self, domains: &[String]) -> Result<Vec<Question>> {
        track_storage_operation(
            "mongo",
            "by_domains",
            retry_async(self.retry.clone(), || async {
                self.find_published_in_domains(domains).await
            }),
        )
        .await
    }

    async fn get_many(&self, ids: &[String]) -> Result<Vec<Question>> {
        track_storage_operation(
            "mongo",
            "get_many",
            retry_async(self.retry.clone(), || async {
                self.find_by_ids(ids).await
            }),
        )
        .await
    }

    async fn count(&self) -> Result<u64> {
        track_storage_operation("mongo", "count", async {
            self.collection
                .count_documents(doc! {})
                .await
                .context("Failed to count questions")
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB ping failed")?;
        Ok(())
    }
}
