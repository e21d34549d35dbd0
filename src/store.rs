//! JSON file standing in for the profile API service.
//!
//! The whole database is one JSON document read on every call and written
//! back after every change. The signed-in user is fixed at construction.

use crate::api::{ProfileApi, SaveProfileRequest};
use crate::error::ApiError;
use crate::profile::{
    Connections, Contacts, CourseInfo, DiscordInfo, GeneralInfo, IS_PROFILE_VISIBLE,
    ProfileRecord, Role, default_permissions_settings,
};
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, create_dir_all};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDatabase {
    #[serde(default)]
    pub profiles: HashMap<String, ProfileRecord>,

    /// Extra sections merged over the base profile on load
    #[serde(default)]
    pub extended: HashMap<String, ProfileRecord>,

    #[serde(default)]
    pub courses: HashMap<u32, CourseInfo>,

    /// Notification channels per github id
    #[serde(default)]
    pub connections: HashMap<String, Connections>,

    /// Discord accounts waiting to be linked, per github id; removed once read
    #[serde(default)]
    pub discord_links: HashMap<String, DiscordInfo>,

    /// Addresses a confirmation email was sent to
    #[serde(default)]
    pub email_confirmations: Vec<String>,
}

/// Create the database file with a profile for `github_id` if it is missing
///
/// # Arguments
/// * `path` - Database file location; parent directories are created
/// * `github_id` - Owner of the seeded profile
///
/// # Returns
/// * `std::io::Result<()>` - Success or an IO error
pub fn init_database<P: AsRef<Path>>(path: P, github_id: &str) -> std::io::Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let mut database = ProfileDatabase::default();
    database.profiles.insert(
        github_id.to_string(),
        ProfileRecord {
            general_info: Some(GeneralInfo {
                name: github_id.to_string(),
                github_id: github_id.to_string(),
                ..GeneralInfo::default()
            }),
            contacts: Some(Contacts::default()),
            permissions_settings: Some(default_permissions_settings()),
            ..ProfileRecord::default()
        },
    );

    let json = serde_json::to_string_pretty(&database)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    info!("Created profile database {} for {}", path.display(), github_id);
    Ok(())
}

/// `ProfileApi` backed by a JSON database file
pub struct JsonFileApi {
    path: PathBuf,
    current_github_id: String,
}

impl JsonFileApi {
    pub fn new<P: Into<PathBuf>>(path: P, current_github_id: &str) -> Self {
        JsonFileApi {
            path: path.into(),
            current_github_id: current_github_id.to_string(),
        }
    }

    pub fn read_database(&self) -> Result<ProfileDatabase, ApiError> {
        let mut file = File::open(&self.path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_database(&self, database: &ProfileDatabase) -> Result<(), ApiError> {
        let json = serde_json::to_string_pretty(database)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn resolve<'a>(&'a self, github_id: Option<&'a str>) -> &'a str {
        github_id.unwrap_or(&self.current_github_id)
    }

    // Other users' profiles are hidden unless shown to everyone.
    fn check_visible(&self, github_id: &str, record: &ProfileRecord) -> Result<(), ApiError> {
        if github_id == self.current_github_id {
            return Ok(());
        }
        let public = record
            .permissions_settings
            .as_ref()
            .and_then(|settings| settings.get(IS_PROFILE_VISIBLE))
            .and_then(|roles| roles.get(&Role::All))
            .copied()
            .unwrap_or(false);
        if public { Ok(()) } else { Err(ApiError::Forbidden) }
    }
}

#[async_trait]
impl ProfileApi for JsonFileApi {
    fn current_github_id(&self) -> &str {
        &self.current_github_id
    }

    async fn fetch_profile(&self, github_id: Option<&str>) -> Result<ProfileRecord, ApiError> {
        let github_id = self.resolve(github_id);
        let database = self.read_database()?;
        let record = database
            .profiles
            .get(github_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("profile {}", github_id)))?;
        self.check_visible(github_id, &record)?;
        Ok(record)
    }

    async fn fetch_extended_profile(
        &self,
        github_id: Option<&str>,
    ) -> Result<ProfileRecord, ApiError> {
        let github_id = self.resolve(github_id);
        let database = self.read_database()?;
        Ok(database.extended.get(github_id).cloned().unwrap_or_default())
    }

    async fn fetch_course_info(&self, course_id: u32) -> Result<CourseInfo, ApiError> {
        let database = self.read_database()?;
        Ok(database
            .courses
            .get(&course_id)
            .copied()
            .unwrap_or(CourseInfo {
                id: course_id,
                completed: false,
            }))
    }

    async fn fetch_connections(&self) -> Result<Connections, ApiError> {
        let database = self.read_database()?;
        Ok(database
            .connections
            .get(&self.current_github_id)
            .cloned()
            .unwrap_or_default())
    }

    // A pending link is handed out once.
    async fn fetch_discord_link(&self) -> Result<Option<DiscordInfo>, ApiError> {
        let mut database = self.read_database()?;
        let link = database.discord_links.remove(&self.current_github_id);
        if link.is_some() {
            self.write_database(&database)?;
        }
        Ok(link)
    }

    async fn save_profile(&self, request: &SaveProfileRequest) -> Result<(), ApiError> {
        let mut database = self.read_database()?;
        let profile = database
            .profiles
            .get_mut(&self.current_github_id)
            .ok_or_else(|| ApiError::NotFound(format!("profile {}", self.current_github_id)))?;

        if request.is_permissions_settings_changed {
            profile.permissions_settings = request.permissions_settings.clone();
        }
        if request.is_profile_settings_changed {
            profile.general_info = request.general_info.clone();
            profile.contacts = request.contacts.clone();
            profile.discord = request.discord.clone();
        }

        self.write_database(&database)?;
        debug!("Saved profile {}", self.current_github_id);
        Ok(())
    }

    async fn resend_email_confirmation(&self) -> Result<(), ApiError> {
        let mut database = self.read_database()?;
        let email = database
            .profiles
            .get(&self.current_github_id)
            .and_then(|profile| profile.contacts.as_ref())
            .and_then(|contacts| contacts.email.clone())
            .ok_or_else(|| ApiError::NotFound("email".to_string()))?;

        info!("Sending confirmation email to {}", email);
        database.email_confirmations.push(email);
        self.write_database(&database)
    }
}
