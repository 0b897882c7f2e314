//! Sessions API.
//!
//! A session is one user's run through an assessment: its chat transcript
//! accumulates under `/sessions/{id}/chats`, and the generated scoring and
//! report live under `/sessions/{id}/result`.

use crate::client::MentoraClient;
use crate::error::Result;
use crate::types::{
    AddChatRequest, AssessmentChat, AssessmentResult, AssessmentSession, ChatRole,
    GenerateReportRequest, SessionStatus, UpdateSessionStatusRequest,
};

/// Sessions API client.
pub struct SessionsApi {
    client: MentoraClient,
}

impl SessionsApi {
    pub(crate) fn new(client: MentoraClient) -> Self {
        Self { client }
    }

    /// Get a session by ID.
    pub async fn get(&self, id: i64) -> Result<AssessmentSession> {
        self.client.get(&format!("sessions/{}", id)).await
    }

    /// Move a session to a new status.
    pub async fn update_status(
        &self,
        id: i64,
        status: SessionStatus,
    ) -> Result<AssessmentSession> {
        self.client
            .patch(
                &format!("sessions/{}", id),
                &UpdateSessionStatusRequest { status },
            )
            .await
    }

    /// Get a session's chat transcript.
    pub async fn chats(&self, id: i64) -> Result<Vec<AssessmentChat>> {
        self.client.get(&format!("sessions/{}/chats", id)).await
    }

    /// Append a chat message to a session transcript.
    pub async fn add_chat(
        &self,
        id: i64,
        role: ChatRole,
        content: impl Into<String>,
    ) -> Result<AssessmentChat> {
        self.client
            .post(
                &format!("sessions/{}/chats", id),
                &AddChatRequest {
                    role,
                    content: content.into(),
                },
            )
            .await
    }

    /// Get the result for a session.
    pub async fn result(&self, id: i64) -> Result<AssessmentResult> {
        self.client.get(&format!("sessions/{}/result", id)).await
    }

    /// Kick off report generation for a session.
    pub async fn generate_report(&self, id: i64) -> Result<AssessmentResult> {
        self.client
            .post(
                &format!("sessions/{}/result", id),
                &GenerateReportRequest {
                    generate_report: true,
                },
            )
            .await
    }
}
