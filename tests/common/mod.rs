#![allow(dead_code)]

use async_trait::async_trait;
use profile_page::{
    ApiError, Connection, Connections, Contacts, CourseInfo, DiscordInfo, EducationEntry,
    EnglishLevel, GeneralInfo, Location, PersonRef, ProfileApi, ProfileRecord,
    SaveProfileRequest, StudentStats, default_permissions_settings,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Github id the mock treats as signed in; `sample_profile` belongs to it
pub const SIGNED_IN_USER: &str = "alex-dev";

/// In-memory `ProfileApi` with switches to make each call fail
#[derive(Default)]
pub struct MockApi {
    pub profile: Option<ProfileRecord>,
    pub extended: ProfileRecord,
    pub completed_courses: HashMap<u32, bool>,
    pub connections: Mutex<Connections>,
    pub discord: Option<DiscordInfo>,

    pub fail_profile: AtomicBool,
    pub fail_extended: AtomicBool,
    pub fail_courses: AtomicBool,
    pub fail_connections: AtomicBool,
    pub fail_save: AtomicBool,
    pub fail_discord: AtomicBool,
    pub fail_email: AtomicBool,

    pub saved: Mutex<Vec<SaveProfileRequest>>,
    pub connection_fetches: AtomicUsize,
    pub emails_sent: AtomicUsize,
}

impl MockApi {
    pub fn with_profile(profile: ProfileRecord) -> Self {
        MockApi {
            profile: Some(profile),
            ..MockApi::default()
        }
    }

    pub fn fail(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    pub fn recover(flag: &AtomicBool) {
        flag.store(false, Ordering::SeqCst);
    }

    pub fn saved_requests(&self) -> Vec<SaveProfileRequest> {
        self.saved.lock().unwrap().clone()
    }
}

fn failing(flag: &AtomicBool) -> bool {
    flag.load(Ordering::SeqCst)
}

#[async_trait]
impl ProfileApi for MockApi {
    fn current_github_id(&self) -> &str {
        SIGNED_IN_USER
    }

    async fn fetch_profile(&self, github_id: Option<&str>) -> Result<ProfileRecord, ApiError> {
        if failing(&self.fail_profile) {
            return Err(ApiError::Forbidden);
        }
        self.profile
            .clone()
            .ok_or_else(|| ApiError::NotFound(github_id.unwrap_or("me").to_string()))
    }

    async fn fetch_extended_profile(
        &self,
        _github_id: Option<&str>,
    ) -> Result<ProfileRecord, ApiError> {
        if failing(&self.fail_extended) {
            return Err(ApiError::Io("extended profile timed out".to_string()));
        }
        Ok(self.extended.clone())
    }

    async fn fetch_course_info(&self, course_id: u32) -> Result<CourseInfo, ApiError> {
        if failing(&self.fail_courses) {
            return Err(ApiError::Io("course service down".to_string()));
        }
        Ok(CourseInfo {
            id: course_id,
            completed: self.completed_courses.get(&course_id).copied().unwrap_or(false),
        })
    }

    async fn fetch_connections(&self) -> Result<Connections, ApiError> {
        self.connection_fetches.fetch_add(1, Ordering::SeqCst);
        if failing(&self.fail_connections) {
            return Err(ApiError::Io("notifications down".to_string()));
        }
        Ok(self.connections.lock().unwrap().clone())
    }

    async fn fetch_discord_link(&self) -> Result<Option<DiscordInfo>, ApiError> {
        if failing(&self.fail_discord) {
            return Err(ApiError::Io("discord down".to_string()));
        }
        Ok(self.discord.clone())
    }

    async fn save_profile(&self, request: &SaveProfileRequest) -> Result<(), ApiError> {
        if failing(&self.fail_save) {
            return Err(ApiError::Io("connection reset".to_string()));
        }
        self.saved.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn resend_email_confirmation(&self) -> Result<(), ApiError> {
        if failing(&self.fail_email) {
            return Err(ApiError::Io("smtp down".to_string()));
        }
        self.emails_sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn student_stats(course_id: u32, course_name: &str) -> StudentStats {
    StudentStats {
        course_id,
        course_name: course_name.to_string(),
        course_full_name: format!("Rolling Scopes {}", course_name),
        location_name: Some("Minsk".to_string()),
        is_expelled: false,
        expelling_reason: None,
        is_course_completed: false,
        total_score: 420.0,
        mentor: Some(PersonRef {
            name: "Dzmitry".to_string(),
            github_id: "dzmitry-mentor".to_string(),
        }),
        tasks: Vec::new(),
    }
}

/// Profile of another user, `bob`, with everything else as in `sample_profile`
pub fn other_profile() -> ProfileRecord {
    let mut profile = sample_profile();
    if let Some(info) = profile.general_info.as_mut() {
        info.name = "Bob Kowalski".to_string();
        info.github_id = "bob".to_string();
    }
    profile
}

/// Profile of a Minsk-based student with two courses
pub fn sample_profile() -> ProfileRecord {
    ProfileRecord {
        general_info: Some(GeneralInfo {
            name: "Alex Shevchenko".to_string(),
            github_id: "alex-dev".to_string(),
            about_myself: Some("Frontend developer".to_string()),
            location: Some(Location::new("Minsk", "Belarus")),
            education_history: Some(Vec::new()),
            english_level: Some(EnglishLevel::B1),
        }),
        contacts: Some(Contacts {
            email: Some("alex@example.com".to_string()),
            telegram: Some("@alex_dev".to_string()),
            ..Contacts::default()
        }),
        permissions_settings: Some(default_permissions_settings()),
        student_stats: Some(vec![student_stats(11, "js-2020"), student_stats(12, "react-2021")]),
        ..ProfileRecord::default()
    }
}

pub fn university(name: &str, year: u16) -> EducationEntry {
    EducationEntry {
        graduation_year: Some(year),
        faculty: Some("Applied Mathematics".to_string()),
        university: Some(name.to_string()),
    }
}

pub fn email_connection(enabled: bool) -> Connections {
    let mut connections = Connections::new();
    connections.insert(
        "email".to_string(),
        Connection {
            value: "alex@example.com".to_string(),
            enabled,
        },
    );
    connections
}
