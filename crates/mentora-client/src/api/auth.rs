//! Authentication API.

use serde_json::Value;

use crate::client::MentoraClient;
use crate::error::Result;
use crate::types::{EndUserLoginRequest, GoogleLoginRequest, LoginResponse, RefreshResponse};

/// Auth API client.
pub struct AuthApi {
    client: MentoraClient,
}

impl AuthApi {
    pub(crate) fn new(client: MentoraClient) -> Self {
        Self { client }
    }

    /// Exchange a Google ID token for platform credentials.
    ///
    /// The returned access token is not stored automatically — write it to
    /// the client's token store (or wherever the application keeps it) to
    /// authenticate subsequent calls.
    pub async fn login(&self, request: GoogleLoginRequest) -> Result<LoginResponse> {
        self.client.post("auth/google", &request).await
    }

    /// Log in as an end user with an invite token.
    pub async fn enduser_login(&self, request: EndUserLoginRequest) -> Result<LoginResponse> {
        self.client.post("auth/enduser/login", &request).await
    }

    /// Invalidate the server-side session.
    pub async fn logout(&self) -> Result<()> {
        let _: Value = self.client.post_empty("auth/logout").await?;
        Ok(())
    }

    /// Rotate the access token.
    ///
    /// Runs through the client's single-flight refresh machinery, so a manual
    /// refresh coalesces with any 401-triggered refresh already in flight.
    /// The rotated token is stored before this returns.
    pub async fn refresh(&self) -> Result<RefreshResponse> {
        let access_token = self.client.refresh_token().await?;
        Ok(RefreshResponse { access_token })
    }
}
