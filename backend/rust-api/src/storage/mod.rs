use anyhow::Result;
use async_trait::async_trait;

use crate::models::question::Question;
use crate::models::Session;

pub mod memory;
pub mod mongo;
pub mod redis;

/// Read/seed interface over the question bank. The engine only ever needs
/// published questions; drafts stay invisible to allocation and grading.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Bulk-load questions, returning how many were stored.
    async fn seed(&self, questions: Vec<Question>) -> Result<u64>;

    /// Remove every question, returning how many were deleted.
    async fn clear(&self) -> Result<u64>;

    /// All published questions tagged with any of the given domains.
    async fn by_domains(&self, domains: &[String]) -> Result<Vec<Question>>;

    /// Fetch questions by id; missing ids are silently absent from the result.
    async fn get_many(&self, ids: &[String]) -> Result<Vec<Question>>;

    async fn count(&self) -> Result<u64>;

    async fn ping(&self) -> Result<()>;
}

/// Session persistence. Updates are whole-record writes: the service reads a
/// session, computes the new fields and saves the merged record back.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: Session) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<Session>>;

    /// Overwrite an existing session. Returns `None` when the id is gone.
    async fn save(&self, session: Session) -> Result<Option<Session>>;

    async fn ping(&self) -> Result<()>;
}
