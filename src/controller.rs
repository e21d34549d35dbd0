use crate::api::{ProfileApi, SaveProfileRequest};
use crate::edit::{EditRequest, GeneralEdit, PermissionEdit};
use crate::error::{ApiError, ProfileError};
use crate::local::LocalCache;
use crate::profile::{Connections, PermissionSettings, ProfileRecord};
use crate::reducer;
use futures::future::try_join_all;
use log::{debug, error, info, warn};
use serde::Serialize;

/// Route the page returns to after an OAuth round trip
pub const PROFILE_ROUTE: &str = "/profile";

/// Unsaved divergence from the last load or save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirtyState {
    pub permissions_changed: bool,
    pub profile_settings_changed: bool,
}

impl DirtyState {
    pub fn any(&self) -> bool {
        self.permissions_changed || self.profile_settings_changed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PageView {
    Loading,
    AccessDenied,
    Ready,
}

/// User-visible outcome of the last side-effecting action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Notice {
    Saved,
    SaveFailed,
    EmailConfirmationSent,
    EmailConfirmationFailed,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::Saved => "Profile was successfully saved",
            Notice::SaveFailed => "Profile was not saved. Please try again later",
            Notice::EmailConfirmationSent => "Confirmation email was sent",
            Notice::EmailConfirmationFailed => {
                "Confirmation email was not sent. Please try again later"
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::SaveFailed | Notice::EmailConfirmationFailed)
    }
}

/// Serializable view of the controller, returned by the JSON endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerState<'a> {
    pub view: PageView,
    pub record: Option<&'a ProfileRecord>,
    pub connections: &'a Connections,
    pub dirty: DirtyState,
    pub notice: Option<&'static str>,
    pub is_profile_owner: bool,
    pub editing: bool,
    pub save_visible: bool,
}

/// Owner of the profile being displayed and edited
///
/// Holds the canonical record, the two snapshots taken at the last load or
/// save, and the dirty flags derived from them. Cards never touch this
/// state; they go through [`apply_general_edit`](Self::apply_general_edit)
/// and [`apply_permission_edit`](Self::apply_permission_edit).
///
/// Only the signed-in user's own profile can be changed: edits, saves and
/// the discord link are refused with `NotOwner` on anyone else's.
pub struct ProfileController<A: ProfileApi> {
    api: A,
    record: Option<ProfileRecord>,
    connections: Connections,
    permissions_snapshot: Option<PermissionSettings>,
    profile_snapshot: Option<ProfileRecord>,
    dirty: DirtyState,
    view: PageView,
    notice: Option<Notice>,
    is_profile_owner: bool,
    editing: bool,
    target_github_id: Option<String>,
    active_course_id: Option<u32>,
}

impl<A: ProfileApi> ProfileController<A> {
    pub fn new(api: A, cache: &LocalCache) -> Self {
        ProfileController {
            api,
            record: None,
            connections: Connections::new(),
            permissions_snapshot: None,
            profile_snapshot: None,
            dirty: DirtyState::default(),
            view: PageView::Loading,
            notice: None,
            is_profile_owner: false,
            editing: false,
            target_github_id: None,
            active_course_id: cache.active_course_id,
        }
    }

    /// Fetch the profile to display
    ///
    /// Profile, connections and extended data are requested concurrently.
    /// Extended data is merged over the base record and student stats are
    /// annotated with course completion. A failed profile, extended or
    /// course fetch clears the record and switches to the access-denied
    /// view; a failed connections fetch yields no connections.
    ///
    /// # Arguments
    /// * `target_github_id` - Profile to show, `None` for the signed-in user
    ///
    /// # Errors
    /// * `AccessDenied` carrying the collaborator failure
    pub async fn load(&mut self, target_github_id: Option<&str>) -> Result<(), ProfileError> {
        self.view = PageView::Loading;
        self.target_github_id = target_github_id.map(str::to_string);

        let (profile, connections, extended) = futures::join!(
            self.api.fetch_profile(target_github_id),
            self.api.fetch_connections(),
            self.api.fetch_extended_profile(target_github_id),
        );

        let connections = connections.unwrap_or_else(|e| {
            warn!("Connections unavailable, showing none: {}", e);
            Connections::new()
        });

        let record = match (profile, extended) {
            (Ok(profile), Ok(extended)) => profile.merge(extended),
            (Err(e), _) | (_, Err(e)) => return Err(self.deny(e)),
        };

        let record = match self.annotate_course_completion(record).await {
            Ok(record) => record,
            Err(e) => return Err(self.deny(e)),
        };

        let is_profile_owner = record.github_id() == Some(self.api.current_github_id());
        info!(
            "Loaded profile {} (owner: {})",
            record.github_id().unwrap_or("<unnamed>"),
            is_profile_owner
        );

        self.permissions_snapshot = record.permissions_settings.clone();
        self.profile_snapshot = Some(record.clone());
        self.record = Some(record);
        self.connections = connections;
        self.is_profile_owner = is_profile_owner;
        self.dirty = DirtyState::default();
        self.notice = None;
        self.view = PageView::Ready;
        Ok(())
    }

    async fn annotate_course_completion(
        &self,
        mut record: ProfileRecord,
    ) -> Result<ProfileRecord, ApiError> {
        if let Some(stats) = record.student_stats.as_mut() {
            let course_ids: Vec<u32> = stats.iter().map(|s| s.course_id).collect();
            let courses = try_join_all(
                course_ids
                    .into_iter()
                    .map(|course_id| self.api.fetch_course_info(course_id)),
            )
            .await?;

            for (stat, course) in stats.iter_mut().zip(courses) {
                stat.is_course_completed = course.completed;
            }
        }
        Ok(record)
    }

    fn deny(&mut self, e: ApiError) -> ProfileError {
        error!("Profile could not be loaded: {}", e);
        self.record = None;
        self.permissions_snapshot = None;
        self.profile_snapshot = None;
        self.is_profile_owner = false;
        self.dirty = DirtyState::default();
        self.view = PageView::AccessDenied;
        ProfileError::AccessDenied(e)
    }

    fn owned_record(&self) -> Result<&ProfileRecord, ProfileError> {
        let record = self.record.as_ref().ok_or(ProfileError::NotLoaded)?;
        if !self.is_profile_owner {
            return Err(ProfileError::NotOwner);
        }
        Ok(record)
    }

    /// Apply an edit of the general profile settings
    ///
    /// The record is replaced by a fresh copy and `profile_settings_changed`
    /// is recomputed against the profile snapshot.
    ///
    /// # Returns
    /// * `Result<DirtyState, ProfileError>` - Flags after the edit
    pub fn apply_general_edit(&mut self, edit: &GeneralEdit) -> Result<DirtyState, ProfileError> {
        let record = self.owned_record()?;
        let snapshot = self
            .profile_snapshot
            .as_ref()
            .ok_or(ProfileError::NotLoaded)?;

        let (next, changed) = reducer::reduce_general_edit(record, snapshot, edit)?;
        debug!("Applied edit at {} (changed: {})", edit.path(), changed);

        self.record = Some(next);
        self.dirty.profile_settings_changed = changed;
        Ok(self.dirty)
    }

    /// Parse a wire edit and apply it
    pub fn apply_edit_request(&mut self, request: &EditRequest) -> Result<DirtyState, ProfileError> {
        let edit = GeneralEdit::from_request(request)?;
        self.apply_general_edit(&edit)
    }

    /// Toggle a visibility checkbox
    ///
    /// # Arguments
    /// * `checked` - New visibility
    /// * `edit` - Permission and role; `Role::All` sets every role
    ///
    /// # Returns
    /// * `Result<DirtyState, ProfileError>` - Flags after the edit
    pub fn apply_permission_edit(
        &mut self,
        checked: bool,
        edit: &PermissionEdit,
    ) -> Result<DirtyState, ProfileError> {
        let record = self.owned_record()?;
        let current = record
            .permissions_settings
            .as_ref()
            .ok_or_else(|| ProfileError::UnknownPermission(edit.permission_name.clone()))?;
        let empty = PermissionSettings::new();
        let snapshot = self.permissions_snapshot.as_ref().unwrap_or(&empty);

        let (settings, changed) =
            reducer::reduce_permission_edit(current, snapshot, checked, edit)?;
        debug!(
            "Set {}.{} to {} (changed: {})",
            edit.permission_name, edit.role, checked, changed
        );

        let mut next = record.clone();
        next.permissions_settings = Some(settings);
        self.record = Some(next);
        self.dirty.permissions_changed = changed;
        Ok(self.dirty)
    }

    /// Persist the editable sections
    ///
    /// On success connections are refreshed, both flags cleared and both
    /// snapshots replaced by copies of the current record. On failure the
    /// record, flags and snapshots stay as they were.
    ///
    /// # Errors
    /// * `NotLoaded` when there is nothing to save
    /// * `NotOwner` when the profile is someone else's
    /// * `SaveFailed` carrying the collaborator failure
    pub async fn save(&mut self) -> Result<(), ProfileError> {
        let record = self.owned_record()?;
        let request = SaveProfileRequest {
            permissions_settings: record.permissions_settings.clone(),
            general_info: record.general_info.clone(),
            contacts: record.contacts.clone(),
            discord: record.discord.clone(),
            is_permissions_settings_changed: self.dirty.permissions_changed,
            is_profile_settings_changed: self.dirty.profile_settings_changed,
        };

        if let Err(e) = self.api.save_profile(&request).await {
            error!("Profile save failed: {}", e);
            self.notice = Some(Notice::SaveFailed);
            return Err(ProfileError::SaveFailed(e));
        }

        self.connections = self.api.fetch_connections().await.unwrap_or_else(|e| {
            warn!("Connections unavailable after save: {}", e);
            Connections::new()
        });

        if let Some(record) = &self.record {
            self.permissions_snapshot = record.permissions_settings.clone();
            self.profile_snapshot = Some(record.clone());
        }
        self.dirty = DirtyState::default();
        self.notice = Some(Notice::Saved);
        info!("Profile saved");
        Ok(())
    }

    /// Finish a discord OAuth round trip
    ///
    /// When the service reports a linked account it is merged into the
    /// record and saved right away.
    ///
    /// # Returns
    /// * `Result<Option<&'static str>, ProfileError>` - Route to navigate to,
    ///   `None` when no account was linked. A failed save still navigates;
    ///   its outcome is left in the notice.
    pub async fn authorize_discord(&mut self) -> Result<Option<&'static str>, ProfileError> {
        self.owned_record()?;
        let discord = match self.api.fetch_discord_link().await {
            Ok(Some(discord)) => discord,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("Discord lookup failed: {}", e);
                return Ok(None);
            }
        };

        let record = self.owned_record()?;
        info!("Linking discord account {}", discord.username);
        let mut next = record.clone();
        next.discord = Some(discord);
        self.record = Some(next);
        self.dirty.profile_settings_changed = true;

        if let Err(e) = self.save().await {
            warn!("Discord link kept unsaved: {}", e);
        }
        Ok(Some(PROFILE_ROUTE))
    }

    /// Side effect behind the contacts card button
    pub async fn resend_email_confirmation(&mut self) -> Result<(), ProfileError> {
        self.owned_record()?;
        match self.api.resend_email_confirmation().await {
            Ok(()) => {
                self.notice = Some(Notice::EmailConfirmationSent);
                Ok(())
            }
            Err(e) => {
                warn!("Confirmation email failed: {}", e);
                self.notice = Some(Notice::EmailConfirmationFailed);
                Err(ProfileError::ActionFailed(e))
            }
        }
    }

    pub fn set_editing_mode(&mut self, editing: bool) {
        self.editing = editing;
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// The loaded profile is the signed-in user's own
    pub fn is_profile_owner(&self) -> bool {
        self.is_profile_owner
    }

    /// The save button is offered while either flag is set
    pub fn is_save_visible(&self) -> bool {
        self.view == PageView::Ready && self.dirty.any()
    }

    pub fn record(&self) -> Option<&ProfileRecord> {
        self.record.as_ref()
    }

    pub fn connections(&self) -> &Connections {
        &self.connections
    }

    pub fn dirty(&self) -> DirtyState {
        self.dirty
    }

    pub fn view(&self) -> PageView {
        self.view
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn target_github_id(&self) -> Option<&str> {
        self.target_github_id.as_deref()
    }

    pub fn active_course_id(&self) -> Option<u32> {
        self.active_course_id
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> ControllerState<'_> {
        ControllerState {
            view: self.view,
            record: self.record.as_ref(),
            connections: &self.connections,
            dirty: self.dirty,
            notice: self.notice.map(|n| n.message()),
            is_profile_owner: self.is_profile_owner,
            editing: self.editing,
            save_visible: self.is_save_visible(),
        }
    }
}
