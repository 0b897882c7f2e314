//! Groups API.

use crate::client::MentoraClient;
use crate::error::Result;
use crate::types::{
    AddGroupMemberRequest, CreateGroupRequest, Group, GroupFilter, GroupMember, GroupsPage,
    UpdateGroupMemberRequest, UpdateGroupRequest,
};

/// Groups API client.
pub struct GroupsApi {
    client: MentoraClient,
}

impl GroupsApi {
    pub(crate) fn new(client: MentoraClient) -> Self {
        Self { client }
    }

    /// List groups.
    pub async fn list(&self, filter: GroupFilter) -> Result<GroupsPage> {
        self.client.get_with_query("groups", &filter).await
    }

    /// Get a group by ID.
    pub async fn get(&self, id: i64) -> Result<Group> {
        self.client.get(&format!("groups/{}", id)).await
    }

    /// Create a new group.
    pub async fn create(&self, request: CreateGroupRequest) -> Result<Group> {
        self.client.post("groups", &request).await
    }

    /// Update a group.
    pub async fn update(&self, id: i64, request: UpdateGroupRequest) -> Result<Group> {
        self.client.put(&format!("groups/{}", id), &request).await
    }

    /// Delete a group.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("groups/{}", id)).await
    }

    /// List the members of a group.
    pub async fn members(&self, group_id: i64) -> Result<Vec<GroupMember>> {
        self.client.get(&format!("groups/{}/members", group_id)).await
    }

    /// Add a user to a group.
    pub async fn add_member(
        &self,
        group_id: i64,
        request: AddGroupMemberRequest,
    ) -> Result<GroupMember> {
        self.client
            .post(&format!("groups/{}/members", group_id), &request)
            .await
    }

    /// Change a member's role within a group.
    pub async fn update_member(
        &self,
        group_id: i64,
        user_id: i64,
        request: UpdateGroupMemberRequest,
    ) -> Result<GroupMember> {
        self.client
            .put(&format!("groups/{}/members/{}", group_id, user_id), &request)
            .await
    }

    /// Remove a user from a group.
    pub async fn remove_member(&self, group_id: i64, user_id: i64) -> Result<()> {
        self.client
            .delete(&format!("groups/{}/members/{}", group_id, user_id))
            .await
    }
}
