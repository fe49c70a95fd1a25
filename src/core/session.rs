use crate::core::aggregator::PreferenceAggregator;
use crate::domain::model::{
    Approach, FeedbackRequest, FeedbackType, Grades, RecommendationRequest,
    RecommendationResponse, UserProfile, DEFAULT_K,
};
use crate::domain::ports::{ConfigProvider, RecommendationService};
use crate::utils::error::{RecsError, Result};
use crate::utils::validation::{validate_positive_number, validate_range};
use chrono::{DateTime, Utc};

/// Oldest submission records are dropped past this many.
pub const MAX_HISTORY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Ready,
    Pending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Succeeded { results: usize },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRecord {
    pub submitted_at: DateTime<Utc>,
    pub query: String,
    pub approach: Approach,
    pub k: usize,
    pub outcome: Option<SubmissionOutcome>,
}

/// One user's interaction with the recommendation service.
///
/// Owns the preference set and the caller-side request options. Only one
/// request may be in flight: `begin_submission` flips the session to
/// `Pending` and `complete_submission` always brings it back to `Ready`.
#[derive(Debug, Clone)]
pub struct RecommendationSession {
    preferences: PreferenceAggregator,
    k: usize,
    approach: Approach,
    user_id: Option<String>,
    session_id: Option<String>,
    grades: Grades,
    state: SessionState,
    last_response: Option<RecommendationResponse>,
    history: Vec<SubmissionRecord>,
}

impl Default for RecommendationSession {
    fn default() -> Self {
        Self::new(DEFAULT_K, Approach::default())
    }
}

impl RecommendationSession {
    pub fn new(k: usize, approach: Approach) -> Self {
        Self {
            preferences: PreferenceAggregator::new(),
            k,
            approach,
            user_id: None,
            session_id: None,
            grades: Grades::default(),
            state: SessionState::Ready,
            last_response: None,
            history: Vec::new(),
        }
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self::new(config.default_k(), config.default_approach())
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn preferences(&self) -> &PreferenceAggregator {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut PreferenceAggregator {
        &mut self.preferences
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == SessionState::Pending
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn approach(&self) -> Approach {
        self.approach
    }

    pub fn set_k(&mut self, k: usize) -> Result<()> {
        validate_positive_number("k", k, 1)?;
        self.k = k;
        Ok(())
    }

    pub fn set_approach(&mut self, approach: Approach) {
        self.approach = approach;
    }

    pub fn set_grades(&mut self, grades: Grades) -> Result<()> {
        for (field, value) in [
            ("math_grade", grades.math),
            ("science_grade", grades.science),
            ("language_grade", grades.language),
        ] {
            if let Some(value) = value {
                validate_range(field, value, 0.0, 100.0)?;
            }
        }
        self.grades = grades;
        Ok(())
    }

    pub fn last_response(&self) -> Option<&RecommendationResponse> {
        self.last_response.as_ref()
    }

    /// The most recent submissions, oldest first, at most `MAX_HISTORY`.
    pub fn history(&self) -> &[SubmissionRecord] {
        &self.history
    }

    /// Builds the request without changing state.
    pub fn build_request(&self) -> Result<RecommendationRequest> {
        let interests = self.preferences.require_query()?.to_string();
        Ok(RecommendationRequest {
            profile: UserProfile {
                interests,
                math_grade: self.grades.math,
                science_grade: self.grades.science,
                language_grade: self.grades.language,
                user_id: self.user_id.clone(),
            },
            k: self.k,
            approach: self.approach,
        })
    }

    /// Marks the session pending and returns the request to send.
    pub fn begin_submission(&mut self) -> Result<RecommendationRequest> {
        if self.is_pending() {
            return Err(RecsError::SubmissionPendingError);
        }

        let request = self.build_request()?;
        self.state = SessionState::Pending;
        if self.history.len() >= MAX_HISTORY {
            self.history.remove(0);
        }
        self.history.push(SubmissionRecord {
            submitted_at: Utc::now(),
            query: request.profile.interests.clone(),
            approach: request.approach,
            k: request.k,
            outcome: None,
        });

        tracing::debug!(
            "Submission started (approach: {}, k: {})",
            request.approach,
            request.k
        );
        Ok(request)
    }

    /// Returns the session to `Ready` and records the outcome. The
    /// preference set is left as it was so the user can resubmit.
    ///
    /// Fails without touching history or the last response when no
    /// submission is pending.
    pub fn complete_submission(
        &mut self,
        result: Result<RecommendationResponse>,
    ) -> Result<&RecommendationResponse> {
        if !self.is_pending() {
            return Err(RecsError::validation(
                "session",
                "No recommendation request is pending",
            ));
        }
        self.state = SessionState::Ready;

        let outcome = match &result {
            Ok(response) => SubmissionOutcome::Succeeded {
                results: response.recommendations.len(),
            },
            Err(e) => SubmissionOutcome::Failed {
                message: e.user_friendly_message(),
            },
        };
        if let Some(record) = self.history.last_mut() {
            record.outcome = Some(outcome);
        }

        match result {
            Ok(response) => {
                tracing::info!(
                    "Received {} recommendations ({})",
                    response.recommendations.len(),
                    response.approach
                );
                Ok(self.last_response.insert(response))
            }
            Err(e) => {
                tracing::warn!("Recommendation request failed: {}", e);
                Err(e)
            }
        }
    }

    pub async fn submit<S: RecommendationService + ?Sized>(
        &mut self,
        service: &S,
    ) -> Result<&RecommendationResponse> {
        let request = self.begin_submission()?;
        let result = service.recommend(&request).await;
        self.complete_submission(result)
    }

    /// Clears selected skills and the last results; history is kept.
    pub fn reset(&mut self) {
        self.preferences.clear();
        self.last_response = None;
    }

    /// Feedback on an item from the most recent results.
    pub fn feedback(&self, program_id: &str, feedback_type: FeedbackType) -> Result<FeedbackRequest> {
        let known = self
            .last_response
            .as_ref()
            .is_some_and(|r| r.recommendations.iter().any(|i| i.program_id == program_id));
        if !known {
            return Err(RecsError::validation(
                "program_id",
                format!("'{}' is not among the current recommendations", program_id),
            ));
        }

        Ok(FeedbackRequest {
            user_id: self.user_id.clone(),
            program_id: program_id.to_string(),
            feedback_type,
            session_id: self.session_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        FeedbackAck, HealthStatus, ProgramCatalog, RecommendationItem, SkillLevel,
    };
    use crate::utils::error::RetrievalError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockService {
        fail: bool,
        seen: Mutex<Vec<RecommendationRequest>>,
    }

    impl MockService {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RecommendationService for MockService {
        async fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResponse> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(RetrievalError::Status {
                    status: 500,
                    body: "boom".to_string(),
                }
                .into());
            }
            Ok(RecommendationResponse {
                user_id: None,
                approach: request.approach.to_string(),
                recommendations: vec![RecommendationItem {
                    program_id: "p1".to_string(),
                    program_name: "Data Science".to_string(),
                    description: String::new(),
                    skills: "python".to_string(),
                    score: 0.9,
                    explanation: "python match".to_string(),
                    course_url: None,
                    course_rating: None,
                }],
            })
        }

        async fn submit_feedback(&self, _feedback: &FeedbackRequest) -> Result<FeedbackAck> {
            unreachable!()
        }

        async fn health(&self) -> Result<HealthStatus> {
            unreachable!()
        }

        async fn programs(&self) -> Result<ProgramCatalog> {
            unreachable!()
        }
    }

    fn session_with_python() -> RecommendationSession {
        let mut session = RecommendationSession::default();
        session
            .preferences_mut()
            .add("python", SkillLevel::try_from(2_i64).unwrap());
        session
    }

    #[test]
    fn test_empty_session_cannot_submit() {
        let mut session = RecommendationSession::default();
        assert!(matches!(
            session.begin_submission(),
            Err(RecsError::EmptyQueryError)
        ));
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_second_begin_while_pending_is_rejected() {
        let mut session = session_with_python();
        let request = session.begin_submission().unwrap();
        assert_eq!(request.profile.interests, "python python");
        assert_eq!(request.k, DEFAULT_K);
        assert!(session.is_pending());

        assert!(matches!(
            session.begin_submission(),
            Err(RecsError::SubmissionPendingError)
        ));
        assert_eq!(session.history().len(), 1);
    }

    fn empty_response() -> RecommendationResponse {
        RecommendationResponse {
            user_id: None,
            approach: "hybrid".to_string(),
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn test_complete_without_pending_is_rejected() {
        let mut session = session_with_python();
        assert!(session.complete_submission(Ok(empty_response())).is_err());
        assert!(session.history().is_empty());
        assert!(session.last_response().is_none());

        session.begin_submission().unwrap();
        session.complete_submission(Ok(empty_response())).unwrap();

        let err = session
            .complete_submission(Err(RecsError::SubmissionPendingError))
            .unwrap_err();
        assert!(matches!(err, RecsError::ValidationError { .. }));
        assert_eq!(session.history().len(), 1);
        assert_eq!(
            session.history()[0].outcome,
            Some(SubmissionOutcome::Succeeded { results: 0 })
        );
        assert!(session.last_response().is_some());
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_history_keeps_most_recent_entries() {
        let mut session = session_with_python();
        for k in 1..=MAX_HISTORY + 3 {
            session.set_k(k).unwrap();
            session.begin_submission().unwrap();
            session.complete_submission(Ok(empty_response())).unwrap();
        }

        assert_eq!(session.history().len(), MAX_HISTORY);
        assert_eq!(session.history()[0].k, 4);
        assert_eq!(session.history()[MAX_HISTORY - 1].k, MAX_HISTORY + 3);
    }

    #[tokio::test]
    async fn test_submit_success_caches_response() {
        let service = MockService::new(false);
        let mut session = session_with_python();
        session.set_approach(Approach::ContentBased);

        let response = session.submit(&service).await.unwrap();
        assert_eq!(response.approach, "content-based");
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.last_response().unwrap().recommendations.len(), 1);
        assert_eq!(
            session.history()[0].outcome,
            Some(SubmissionOutcome::Succeeded { results: 1 })
        );
        assert_eq!(service.seen.lock().unwrap()[0].approach, Approach::ContentBased);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_preferences() {
        let service = MockService::new(true);
        let mut session = session_with_python();

        let err = session.submit(&service).await.unwrap_err();
        assert!(matches!(err, RecsError::RetrievalError(_)));
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.preferences().to_weighted_query(), "python python");
        assert!(matches!(
            session.history()[0].outcome,
            Some(SubmissionOutcome::Failed { .. })
        ));

        // resubmission is allowed after a failure
        assert!(session.begin_submission().is_ok());
    }

    #[test]
    fn test_request_options_validation() {
        let mut session = session_with_python().with_user_id("u-1");
        assert!(session.set_k(0).is_err());
        assert!(session.set_k(10).is_ok());
        assert!(session
            .set_grades(Grades {
                math: Some(120.0),
                ..Grades::default()
            })
            .is_err());
        session
            .set_grades(Grades {
                math: Some(88.0),
                ..Grades::default()
            })
            .unwrap();

        let request = session.build_request().unwrap();
        assert_eq!(request.k, 10);
        assert_eq!(request.profile.math_grade, Some(88.0));
        assert_eq!(request.profile.user_id.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn test_feedback_requires_known_program() {
        let service = MockService::new(false);
        let mut session = session_with_python().with_session_id("s-9");
        assert!(session.feedback("p1", FeedbackType::Clicked).is_err());

        session.submit(&service).await.unwrap();
        let fb = session.feedback("p1", FeedbackType::Accepted).unwrap();
        assert_eq!(fb.session_id.as_deref(), Some("s-9"));
        assert!(session.feedback("p404", FeedbackType::Rejected).is_err());

        session.reset();
        assert!(session.preferences().is_empty());
        assert!(session.last_response().is_none());
        assert_eq!(session.history().len(), 1);
    }
}
