//! Users API.

use crate::client::MentoraClient;
use crate::error::Result;
use crate::types::{
    CreateEndUserRequest, CreateHrRequest, UpdateUserRequest, User, UserFilter, UsersPage,
};

/// Users API client.
pub struct UsersApi {
    client: MentoraClient,
}

impl UsersApi {
    pub(crate) fn new(client: MentoraClient) -> Self {
        Self { client }
    }

    /// Get the currently authenticated user.
    pub async fn me(&self) -> Result<User> {
        self.client.get("users/me").await
    }

    /// List users.
    pub async fn list(&self, filter: UserFilter) -> Result<UsersPage> {
        self.client.get_with_query("users", &filter).await
    }

    /// Get a user by ID.
    pub async fn get(&self, id: i64) -> Result<User> {
        self.client.get(&format!("users/{}", id)).await
    }

    /// Create an HR coordinator account.
    pub async fn create_hr(&self, request: CreateHrRequest) -> Result<User> {
        self.client.post("users/hr", &request).await
    }

    /// Create an end-user account.
    pub async fn create_enduser(&self, request: CreateEndUserRequest) -> Result<User> {
        self.client.post("users/enduser", &request).await
    }

    /// Update a user.
    pub async fn update(&self, id: i64, request: UpdateUserRequest) -> Result<User> {
        self.client.put(&format!("users/{}", id), &request).await
    }

    /// Delete a user.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("users/{}", id)).await
    }

    /// Reactivate a deactivated user.
    pub async fn activate(&self, id: i64) -> Result<User> {
        self.client.post_empty(&format!("users/{}/activate", id)).await
    }

    /// Deactivate a user without deleting the account.
    pub async fn deactivate(&self, id: i64) -> Result<User> {
        self.client
            .post_empty(&format!("users/{}/deactivate", id))
            .await
    }
}
