use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::ApiError;
use crate::metrics::{
    ALLOCATION_SHORTFALL_TOTAL, ANSWERS_GRADED_TOTAL, SESSIONS_ACTIVE, SESSIONS_TOTAL,
};
use crate::models::answer::{GradeAnswerRequest, GradeAnswerResponse};
use crate::models::question::Question;
use crate::models::reporting::SessionResults;
use crate::models::{
    AllocationSummary, CreateSessionRequest, CreateSessionResponse, PauseSessionResponse,
    RecordedAnswer, ResumeSessionResponse, Session, SessionQuestion, SessionStatus, TimerState,
};
use crate::storage::{QuestionStore, SessionStore};
use crate::utils::time;

use super::{allocation_service, grading_service, scoring_service};

/// Registry of per-session mutexes. Every mutation (grade, pause, resume,
/// submit) runs read-modify-write against the whole session record, so
/// mutations on the same id must be serialized; reads stay lock-free.
/// Submit releases the entry, the terminal state has nothing left to
/// serialize.
#[derive(Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn release(&self, id: &str) {
        self.locks.lock().await.remove(id);
    }
}

pub struct SessionService {
    questions: Arc<dyn QuestionStore>,
    sessions: Arc<dyn SessionStore>,
    locks: Arc<SessionLocks>,
}

impl SessionService {
    pub fn new(
        questions: Arc<dyn QuestionStore>,
        sessions: Arc<dyn SessionStore>,
        locks: Arc<SessionLocks>,
    ) -> Self {
        Self {
            questions,
            sessions,
            locks,
        }
    }

    /// Allocate a blueprint-weighted question set and persist the new session.
    pub async fn create(
        &self,
        req: CreateSessionRequest,
    ) -> Result<CreateSessionResponse, ApiError> {
        tracing::info!(
            "Creating session: user={}, certification={}, mode={}, questions={}",
            req.user_id,
            req.certification_name,
            req.mode.as_str(),
            req.question_count
        );

        let mut pools: HashMap<String, Vec<Question>> = HashMap::new();
        for question in self.questions.by_domains(&req.domains).await? {
            pools.entry(question.domain.clone()).or_default().push(question);
        }

        // Thread-local rng stays inside this block; the draw itself is
        // synchronous.
        let outcome = {
            let mut rng = rand::rng();
            allocation_service::allocate(
                &req.blueprint,
                &req.domains,
                req.question_count,
                pools,
                &mut rng,
            )?
        };

        for shortfall in &outcome.shortfalls {
            tracing::warn!(
                "Domain {} pool under-delivered: requested={}, drawn={}",
                shortfall.domain,
                shortfall.requested,
                shortfall.drawn
            );
            ALLOCATION_SHORTFALL_TOTAL
                .with_label_values(&[&shortfall.domain])
                .inc_by((shortfall.requested - shortfall.drawn) as u64);
        }

        let now = Utc::now();
        let timer = if req.timer.enabled {
            TimerState {
                enabled: true,
                duration_min: req.timer.duration_min,
                ends_at: Some(time::deadline_after(
                    now,
                    i64::from(req.timer.duration_min) * 60,
                )),
                remaining_sec: None,
            }
        } else {
            TimerState::default()
        };

        let session_questions: Vec<SessionQuestion> = outcome
            .questions
            .iter()
            .map(|q| SessionQuestion {
                question_id: q.id.clone(),
                domain: q.domain.clone(),
                question_type: q.question_type,
            })
            .collect();

        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: req.user_id,
            certification_name: req.certification_name,
            mode: req.mode,
            domains: req.domains,
            blueprint: req.blueprint,
            question_count: req.question_count,
            timer,
            review: req.review,
            status: SessionStatus::Active,
            current_index: 0,
            questions: session_questions,
            answers: HashMap::new(),
            created_at: now,
            submitted_at: None,
        };

        let session_id = session.id.clone();
        let summary = AllocationSummary {
            allocations: outcome.allocations,
            shortfalls: outcome.shortfalls,
        };

        self.sessions.insert(session).await?;

        SESSIONS_TOTAL.with_label_values(&["created"]).inc();
        SESSIONS_ACTIVE.inc();
        tracing::info!("Session {} created", session_id);

        Ok(CreateSessionResponse {
            session_id,
            summary,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Session, ApiError> {
        self.load(id).await
    }

    /// Grade one item and record the answer on the session. Allowed in any
    /// non-submitted state; re-answering overwrites the previous record.
    pub async fn grade_answer(
        &self,
        id: &str,
        req: GradeAnswerRequest,
    ) -> Result<GradeAnswerResponse, ApiError> {
        let lock = self.locks.acquire(id).await;
        let _guard = lock.lock().await;

        let mut session = self.load(id).await?;
        if session.is_submitted() {
            return Err(ApiError::conflict(format!(
                "Session {} is already submitted",
                id
            )));
        }

        if !session.questions.iter().any(|q| q.question_id == req.qid) {
            return Err(ApiError::not_found(format!(
                "Question {} is not part of session {}",
                req.qid, id
            )));
        }

        let question = self
            .questions
            .get_many(std::slice::from_ref(&req.qid))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::not_found(format!("Question {} not found", req.qid)))?;

        let (score, feedback) = grading_service::grade(&question, &req.selected);
        let feedback_allowed = grading_service::feedback_visible(session.mode, &session.review);

        session.answers.insert(
            req.qid.clone(),
            RecordedAnswer {
                selected: req.selected,
                score,
                feedback: feedback_allowed.then(|| feedback.clone()),
            },
        );
        self.persist(session).await?;

        ANSWERS_GRADED_TOTAL
            .with_label_values(&[question.question_type.as_str()])
            .inc();

        Ok(GradeAnswerResponse {
            per_item_score: score,
            feedback_allowed,
            feedback: feedback_allowed.then_some(feedback),
        })
    }

    /// Freeze the countdown. Only an active session with a timer can pause.
    pub async fn pause(&self, id: &str) -> Result<PauseSessionResponse, ApiError> {
        let lock = self.locks.acquire(id).await;
        let _guard = lock.lock().await;

        let mut session = self.load(id).await?;
        if session.status != SessionStatus::Active {
            return Err(ApiError::conflict(format!(
                "Session {} is {}, only an active session can be paused",
                id,
                session.status.as_str()
            )));
        }
        if !session.timer.enabled {
            return Err(ApiError::conflict(format!(
                "Session {} has no timer to pause",
                id
            )));
        }

        let now = Utc::now();
        let remaining_sec = session
            .timer
            .ends_at
            .map(|ends_at| time::remaining_seconds(ends_at, now))
            .unwrap_or(0);

        session.timer.remaining_sec = Some(remaining_sec);
        session.status = SessionStatus::Paused;
        self.persist(session).await?;

        tracing::info!("Session {} paused with {}s remaining", id, remaining_sec);
        Ok(PauseSessionResponse { remaining_sec })
    }

    /// Restart the countdown from the remaining seconds captured at pause;
    /// wall time spent paused does not count against the learner.
    pub async fn resume(&self, id: &str) -> Result<ResumeSessionResponse, ApiError> {
        let lock = self.locks.acquire(id).await;
        let _guard = lock.lock().await;

        let mut session = self.load(id).await?;
        if session.status != SessionStatus::Paused {
            return Err(ApiError::conflict(format!(
                "Session {} is {}, only a paused session can be resumed",
                id,
                session.status.as_str()
            )));
        }

        let now = Utc::now();
        let remaining_sec = session.timer.remaining_sec.unwrap_or(0);
        let ends_at = time::deadline_after(now, remaining_sec);

        session.timer.ends_at = Some(ends_at);
        session.timer.remaining_sec = None;
        session.status = SessionStatus::Active;
        self.persist(session).await?;

        tracing::info!("Session {} resumed, ends at {}", id, ends_at);
        Ok(ResumeSessionResponse { ends_at })
    }

    /// Terminal transition: aggregate the final results and seal the record.
    /// Accepted from both `active` and `paused` so a paused session is never
    /// stranded; a second submit is a conflict.
    pub async fn submit(&self, id: &str) -> Result<SessionResults, ApiError> {
        let lock = self.locks.acquire(id).await;
        let _guard = lock.lock().await;

        let mut session = self.load(id).await?;
        if session.is_submitted() {
            return Err(ApiError::conflict(format!(
                "Session {} is already submitted",
                id
            )));
        }

        let ids: Vec<String> = session
            .questions
            .iter()
            .map(|q| q.question_id.clone())
            .collect();
        let bank: HashMap<String, Question> = self
            .questions
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|q| (q.id.clone(), q))
            .collect();

        let results = scoring_service::finalize(
            &session.questions,
            &bank,
            &session.answers,
            &session.blueprint,
        );

        session.status = SessionStatus::Submitted;
        session.submitted_at = Some(Utc::now());
        self.persist(session).await?;

        SESSIONS_TOTAL.with_label_values(&["submitted"]).inc();
        SESSIONS_ACTIVE.dec();
        self.locks.release(id).await;

        tracing::info!(
            "Session {} submitted, overall score {}%",
            id,
            results.overall_score_pct
        );
        Ok(results)
    }

    async fn load(&self, id: &str) -> Result<Session, ApiError> {
        self.sessions
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Session {} not found", id)))
    }

    async fn persist(&self, session: Session) -> Result<(), ApiError> {
        let id = session.id.clone();
        self.sessions
            .save(session)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Session {} not found", id)))?;
        Ok(())
    }
}
