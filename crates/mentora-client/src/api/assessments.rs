//! Assessments API.

use crate::client::MentoraClient;
use crate::error::Result;
use crate::types::{
    Assessment, AssessmentFilter, AssessmentSession, AssessmentsPage, CreateAssessmentRequest,
    SessionFilter, SessionsPage, StartSessionRequest, UpdateAssessmentRequest,
};

/// Assessments API client.
pub struct AssessmentsApi {
    client: MentoraClient,
}

impl AssessmentsApi {
    pub(crate) fn new(client: MentoraClient) -> Self {
        Self { client }
    }

    /// List assessments.
    pub async fn list(&self, filter: AssessmentFilter) -> Result<AssessmentsPage> {
        self.client.get_with_query("assessments", &filter).await
    }

    /// Get an assessment by ID.
    pub async fn get(&self, id: i64) -> Result<Assessment> {
        self.client.get(&format!("assessments/{}", id)).await
    }

    /// Create a new assessment.
    pub async fn create(&self, request: CreateAssessmentRequest) -> Result<Assessment> {
        self.client.post("assessments", &request).await
    }

    /// Update an assessment.
    pub async fn update(&self, id: i64, request: UpdateAssessmentRequest) -> Result<Assessment> {
        self.client.patch(&format!("assessments/{}", id), &request).await
    }

    /// Delete an assessment.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("assessments/{}", id)).await
    }

    /// List the sessions run against an assessment.
    pub async fn sessions(
        &self,
        assessment_id: i64,
        filter: SessionFilter,
    ) -> Result<SessionsPage> {
        self.client
            .get_with_query(&format!("assessments/{}/sessions", assessment_id), &filter)
            .await
    }

    /// Start a session for a user.
    pub async fn start_session(
        &self,
        assessment_id: i64,
        user_id: i64,
    ) -> Result<AssessmentSession> {
        self.client
            .post(
                &format!("assessments/{}/sessions", assessment_id),
                &StartSessionRequest { user_id },
            )
            .await
    }
}
