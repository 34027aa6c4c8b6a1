use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{QuestionStore, SessionStore};
use crate::models::question::{Question, QuestionStatus};
use crate::models::Session;

/// Reference question bank: an in-process map. Everything the engine needs
/// runs against this backend, and every test uses it.
#[derive(Default)]
pub struct MemoryQuestionStore {
    questions: RwLock<HashMap<String, Question>>,
}

impl MemoryQuestionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionStore for MemoryQuestionStore {
    async fn seed(&self, questions: Vec<Question>) -> Result<u64> {
        let mut map = self.questions.write().await;
        let count = questions.len() as u64;
        for question in questions {
            map.insert(question.id.clone(), question);
        }
        Ok(count)
    }

    async fn clear(&self) -> Result<u64> {
        let mut map = self.questions.write().await;
        let removed = map.len() as u64;
        map.clear();
        Ok(removed)
    }

    async fn by_domains(&self, domains: &[String]) -> Result<Vec<Question>> {
        let map = self.questions.read().await;
        Ok(map
            .values()
            .filter(|q| q.status == QuestionStatus::Published)
            .filter(|q| domains.contains(&q.domain))
            .cloned()
            .collect())
    }

    async fn get_many(&self, ids: &[String]) -> Result<Vec<Question>> {
        let map = self.questions.read().await;
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.questions.read().await.len() as u64)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: Session) -> Result<()> {
        let mut map = self.sessions.write().await;
        map.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn save(&self, session: Session) -> Result<Option<Session>> {
        let mut map = self.sessions.write().await;
        if !map.contains_key(&session.id) {
            return Ok(None);
        }
        map.insert(session.id.clone(), session.clone());
        Ok(Some(session))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Explanation, QuestionOption, QuestionType};

    fn question(id: &str, domain: &str, status: QuestionStatus) -> Question {
        Question {
            id: id.to_string(),
            question_type: QuestionType::SingleSelect,
            domain: domain.to_string(),
            stem: format!("{} stem", id),
            options: vec![
                QuestionOption {
                    id: "a".to_string(),
                    text: "right".to_string(),
                    weight: 1.0,
                },
                QuestionOption {
                    id: "b".to_string(),
                    text: "wrong".to_string(),
                    weight: 0.0,
                },
            ],
            explanation: Explanation::default(),
            difficulty: None,
            suggested_seconds: None,
            status,
        }
    }

    #[tokio::test]
    async fn by_domains_returns_only_published_matches() {
        let store = MemoryQuestionStore::new();
        store
            .seed(vec![
                question("q1", "Networking", QuestionStatus::Published),
                question("q2", "Networking", QuestionStatus::Draft),
                question("q3", "Security", QuestionStatus::Published),
            ])
            .await
            .unwrap();

        let found = store.by_domains(&["Networking".to_string()]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "q1");
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn seed_overwrites_by_id_and_clear_empties() {
        let store = MemoryQuestionStore::new();
        store
            .seed(vec![question("q1", "Networking", QuestionStatus::Published)])
            .await
            .unwrap();
        store
            .seed(vec![question("q1", "Security", QuestionStatus::Published)])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let found = store.get_many(&["q1".to_string()]).await.unwrap();
        assert_eq!(found[0].domain, "Security");

        assert_eq!(store.clear().await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn save_refuses_unknown_session_id() {
        use crate::models::{ReviewConfig, SessionMode, SessionStatus, TimerState};

        let store = MemorySessionStore::new();
        let session = Session {
            id: "s-1".to_string(),
            user_id: "u-1".to_string(),
            certification_name: "Cloud Associate".to_string(),
            mode: SessionMode::Quiz,
            domains: vec![],
            blueprint: HashMap::new(),
            question_count: 0,
            timer: TimerState::default(),
            review: ReviewConfig::default(),
            status: SessionStatus::Active,
            current_index: 0,
            questions: vec![],
            answers: HashMap::new(),
            created_at: chrono::Utc::now(),
            submitted_at: None,
        };

        assert!(store.save(session.clone()).await.unwrap().is_none());
        store.insert(session.clone()).await.unwrap();
        assert!(store.save(session).await.unwrap().is_some());
    }
}
