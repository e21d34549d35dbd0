//! Boundary with the profile API service.

use crate::error::ApiError;
use crate::profile::{
    Connections, Contacts, CourseInfo, DiscordInfo, GeneralInfo, PermissionSettings,
    ProfileRecord,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Payload of a profile save
///
/// Carries the editable sections plus both dirty flags so the service can
/// skip the parts that did not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProfileRequest {
    pub permissions_settings: Option<PermissionSettings>,
    pub general_info: Option<GeneralInfo>,
    pub contacts: Option<Contacts>,
    pub discord: Option<DiscordInfo>,
    pub is_permissions_settings_changed: bool,
    pub is_profile_settings_changed: bool,
}

/// Calls the profile controller makes against the API service
///
/// A `None` github id means the signed-in user.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Github id of the signed-in user
    fn current_github_id(&self) -> &str;

    async fn fetch_profile(&self, github_id: Option<&str>) -> Result<ProfileRecord, ApiError>;

    /// Partial record merged over the base profile
    async fn fetch_extended_profile(
        &self,
        github_id: Option<&str>,
    ) -> Result<ProfileRecord, ApiError>;

    async fn fetch_course_info(&self, course_id: u32) -> Result<CourseInfo, ApiError>;

    /// Notification channels of the signed-in user
    async fn fetch_connections(&self) -> Result<Connections, ApiError>;

    /// Discord account linked through the OAuth callback, if any
    async fn fetch_discord_link(&self) -> Result<Option<DiscordInfo>, ApiError>;

    async fn save_profile(&self, request: &SaveProfileRequest) -> Result<(), ApiError>;

    async fn resend_email_confirmation(&self) -> Result<(), ApiError>;
}
