use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Profile record as served by the API
///
/// Every section is optional and absence is meaningful: a profile without
/// `student_stats` is not the same as one with an empty list. The wire form
/// is camelCase JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_info: Option<GeneralInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Contacts>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<DiscordInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_feedback: Option<Vec<PublicFeedback>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_stats: Option<Vec<StudentStats>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentor_stats: Option<Vec<MentorStats>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions_settings: Option<PermissionSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_interview_feedback: Option<Vec<InterviewFeedback>>,
}

impl ProfileRecord {
    /// Overlay `extended` on top of this record
    ///
    /// Sections present in `extended` replace the base ones; absent sections
    /// keep the base value.
    pub fn merge(self, extended: ProfileRecord) -> ProfileRecord {
        ProfileRecord {
            general_info: extended.general_info.or(self.general_info),
            contacts: extended.contacts.or(self.contacts),
            discord: extended.discord.or(self.discord),
            public_feedback: extended.public_feedback.or(self.public_feedback),
            student_stats: extended.student_stats.or(self.student_stats),
            mentor_stats: extended.mentor_stats.or(self.mentor_stats),
            permissions_settings: extended.permissions_settings.or(self.permissions_settings),
            stage_interview_feedback: extended
                .stage_interview_feedback
                .or(self.stage_interview_feedback),
        }
    }

    pub fn github_id(&self) -> Option<&str> {
        self.general_info.as_ref().map(|info| info.github_id.as_str())
    }

    pub fn location(&self) -> Option<&Location> {
        self.general_info.as_ref().and_then(|info| info.location.as_ref())
    }

    pub fn english_level(&self) -> Option<EnglishLevel> {
        self.general_info.as_ref().and_then(|info| info.english_level)
    }

    /// Education history, with an absent list read as empty
    pub fn education_history(&self) -> &[EducationEntry] {
        self.general_info
            .as_ref()
            .and_then(|info| info.education_history.as_deref())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub github_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_myself: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_history: Option<Vec<EducationEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_level: Option<EnglishLevel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub city_name: Option<String>,
    pub country_name: Option<String>,
}

impl Location {
    pub fn new(city_name: &str, country_name: &str) -> Self {
        Location {
            city_name: Some(city_name.to_string()),
            country_name: Some(country_name.to_string()),
        }
    }
}

/// One entry of the education history; a freshly added entry has every
/// field unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub graduation_year: Option<u16>,
    pub faculty: Option<String>,
    pub university: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnglishLevel {
    #[serde(rename = "a0")]
    A0,
    #[serde(rename = "a1")]
    A1,
    #[serde(rename = "a1+")]
    A1Plus,
    #[serde(rename = "a2")]
    A2,
    #[serde(rename = "a2+")]
    A2Plus,
    #[serde(rename = "b1")]
    B1,
    #[serde(rename = "b1+")]
    B1Plus,
    #[serde(rename = "b2")]
    B2,
    #[serde(rename = "b2+")]
    B2Plus,
    #[serde(rename = "c1")]
    C1,
    #[serde(rename = "c1+")]
    C1Plus,
    #[serde(rename = "c2")]
    C2,
}

impl EnglishLevel {
    pub const ALL: [EnglishLevel; 12] = [
        EnglishLevel::A0,
        EnglishLevel::A1,
        EnglishLevel::A1Plus,
        EnglishLevel::A2,
        EnglishLevel::A2Plus,
        EnglishLevel::B1,
        EnglishLevel::B1Plus,
        EnglishLevel::B2,
        EnglishLevel::B2Plus,
        EnglishLevel::C1,
        EnglishLevel::C1Plus,
        EnglishLevel::C2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnglishLevel::A0 => "a0",
            EnglishLevel::A1 => "a1",
            EnglishLevel::A1Plus => "a1+",
            EnglishLevel::A2 => "a2",
            EnglishLevel::A2Plus => "a2+",
            EnglishLevel::B1 => "b1",
            EnglishLevel::B1Plus => "b1+",
            EnglishLevel::B2 => "b2",
            EnglishLevel::B2Plus => "b2+",
            EnglishLevel::C1 => "c1",
            EnglishLevel::C1Plus => "c1+",
            EnglishLevel::C2 => "c2",
        }
    }

    pub fn from_str_name(level: &str) -> Option<Self> {
        let level = level.trim().to_lowercase();
        EnglishLevel::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.as_str() == level)
    }
}

impl fmt::Display for EnglishLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contacts {
    pub email: Option<String>,
    pub epam_email: Option<String>,
    pub phone: Option<String>,
    pub skype: Option<String>,
    pub telegram: Option<String>,
    pub notes: Option<String>,
    pub linked_in: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordInfo {
    pub id: String,
    pub username: String,
    pub discriminator: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRef {
    pub name: String,
    pub github_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicFeedback {
    pub feedback_date: DateTime<Utc>,
    pub badge_id: String,
    pub comment: Option<String>,
    pub from_user: PersonRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub name: String,
    pub max_score: f64,
    pub score_weight: f64,
    pub score: Option<f64>,
    pub comment: Option<String>,
    pub github_pr_uri: Option<String>,
    /// Set on interview tasks only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interviewer: Option<PersonRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_form_answers: Option<Vec<InterviewFormAnswer>>,
}

/// One question of an interview form; the answer is free-form (text, yes/no
/// or a score) and kept as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewFormAnswer {
    pub question_id: String,
    pub question_text: String,
    #[serde(default)]
    pub answer: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub course_id: u32,
    pub course_name: String,
    pub course_full_name: String,
    pub location_name: Option<String>,
    #[serde(default)]
    pub is_expelled: bool,
    pub expelling_reason: Option<String>,
    /// Filled in on load from the course lookup
    #[serde(default)]
    pub is_course_completed: bool,
    #[serde(default)]
    pub total_score: f64,
    pub mentor: Option<PersonRef>,
    #[serde(default)]
    pub tasks: Vec<TaskStats>,
}

impl StudentStats {
    /// Tasks that carry interview form answers
    pub fn interviews(&self) -> impl Iterator<Item = &TaskStats> {
        self.tasks
            .iter()
            .filter(|task| task.interview_form_answers.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorStudent {
    pub name: String,
    pub github_id: String,
    #[serde(default)]
    pub is_expelled: bool,
    #[serde(default)]
    pub total_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorStats {
    pub course_name: String,
    pub course_full_name: String,
    pub location_name: Option<String>,
    pub students: Option<Vec<MentorStudent>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewFeedback {
    pub date: DateTime<Utc>,
    pub course_name: String,
    pub course_full_name: String,
    pub interviewer: PersonRef,
    pub rating: Option<f64>,
    pub comment: Option<String>,
    pub is_good_candidate: Option<bool>,
}

/// Course lookup result used to annotate student stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseInfo {
    pub id: u32,
    pub completed: bool,
}

/// Notification channel state, keyed by channel name (`email`, `telegram`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub value: String,
    pub enabled: bool,
}

pub type Connections = HashMap<String, Connection>;

/// Audience a visibility flag applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    All,
    Mentor,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::All => "all",
            Role::Mentor => "mentor",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type RoleVisibility = BTreeMap<Role, bool>;

/// Permission name -> role -> visible
pub type PermissionSettings = BTreeMap<String, RoleVisibility>;

pub const IS_PROFILE_VISIBLE: &str = "isProfileVisible";
pub const IS_ABOUT_VISIBLE: &str = "isAboutVisible";
pub const IS_EDUCATION_VISIBLE: &str = "isEducationVisible";
pub const IS_ENGLISH_VISIBLE: &str = "isEnglishVisible";
pub const IS_EMAIL_VISIBLE: &str = "isEmailVisible";
pub const IS_TELEGRAM_VISIBLE: &str = "isTelegramVisible";
pub const IS_SKYPE_VISIBLE: &str = "isSkypeVisible";
pub const IS_PHONE_VISIBLE: &str = "isPhoneVisible";
pub const IS_CONTACTS_NOTES_VISIBLE: &str = "isContactsNotesVisible";
pub const IS_LINKED_IN_VISIBLE: &str = "isLinkedInVisible";
pub const IS_PUBLIC_FEEDBACK_VISIBLE: &str = "isPublicFeedbackVisible";
pub const IS_MENTOR_STATS_VISIBLE: &str = "isMentorStatsVisible";
pub const IS_STUDENT_STATS_VISIBLE: &str = "isStudentStatsVisible";

/// Role keys each permission carries
pub const PERMISSION_ROLES: [(&str, &[Role]); 13] = [
    (IS_PROFILE_VISIBLE, &[Role::All]),
    (IS_ABOUT_VISIBLE, &[Role::All, Role::Mentor, Role::Student]),
    (IS_EDUCATION_VISIBLE, &[Role::All, Role::Mentor, Role::Student]),
    (IS_ENGLISH_VISIBLE, &[Role::All, Role::Student]),
    (IS_EMAIL_VISIBLE, &[Role::All, Role::Student]),
    (IS_TELEGRAM_VISIBLE, &[Role::All, Role::Student]),
    (IS_SKYPE_VISIBLE, &[Role::All, Role::Student]),
    (IS_PHONE_VISIBLE, &[Role::All, Role::Student]),
    (IS_CONTACTS_NOTES_VISIBLE, &[Role::All, Role::Student]),
    (IS_LINKED_IN_VISIBLE, &[Role::All, Role::Mentor, Role::Student]),
    (IS_PUBLIC_FEEDBACK_VISIBLE, &[Role::All, Role::Mentor, Role::Student]),
    (IS_MENTOR_STATS_VISIBLE, &[Role::All, Role::Mentor, Role::Student]),
    (IS_STUDENT_STATS_VISIBLE, &[Role::All, Role::Student]),
];

/// Settings for a new profile: every permission with its full role set,
/// mentors and students allowed to see the about and education sections.
pub fn default_permissions_settings() -> PermissionSettings {
    PERMISSION_ROLES
        .iter()
        .map(|(name, roles)| {
            let visibility = roles
                .iter()
                .map(|role| {
                    let visible = matches!(
                        (*name, role),
                        (IS_ABOUT_VISIBLE, Role::Mentor | Role::Student)
                            | (IS_EDUCATION_VISIBLE, Role::Mentor | Role::Student)
                    );
                    (*role, visible)
                })
                .collect();
            (name.to_string(), visibility)
        })
        .collect()
}
