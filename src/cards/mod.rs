//! Presentational cards of the profile page.
//!
//! A card is a pure function of [`CardProps`]: it picks its slice of the
//! record, builds a template context and never changes anything. Edits
//! leave a card as form posts (`{path, value}` or a permission toggle)
//! that the controller applies.

mod about;
mod contacts;
mod discord;
mod education;
mod english;
mod feedback;
mod general;
mod interviews;
mod stats;

pub use about::AboutCard;
pub use contacts::ContactsCard;
pub use discord::DiscordCard;
pub use education::EducationCard;
pub use english::EnglishCard;
pub use feedback::PublicFeedbackCard;
pub use general::MainCard;
pub use interviews::{CoreJsInterviewsCard, StageInterviewsCard};
pub use stats::{MentorStatsCard, StudentStatsCard};

use crate::profile::{Connections, ProfileRecord, Role};
use serde_json::{Value, json};

/// Everything a card may read
#[derive(Debug, Clone, Copy)]
pub struct CardProps<'a> {
    pub record: &'a ProfileRecord,
    pub connections: &'a Connections,
    pub edit_mode: bool,
    /// The signed-in user is looking at their own profile
    pub is_profile_owner: bool,
    pub active_course_id: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    Main,
    About,
    Education,
    English,
    Contacts,
    Discord,
    PublicFeedback,
    StudentStats,
    MentorStats,
    CoreJsInterviews,
    StageInterviews,
}

pub trait Card: Send + Sync {
    fn kind(&self) -> CardKind;

    /// Handlebars template name and source
    fn template(&self) -> (&'static str, &'static str);

    /// Whether the card has anything to show
    fn is_visible(&self, props: &CardProps) -> bool;

    fn context(&self, props: &CardProps) -> Value;

    /// True when the slice of the record this card shows differs
    fn slice_changed(&self, prev: &CardProps, next: &CardProps) -> bool;
}

/// Cards in page order
pub fn all_cards() -> Vec<Box<dyn Card>> {
    vec![
        Box::new(MainCard),
        Box::new(AboutCard),
        Box::new(EducationCard),
        Box::new(EnglishCard),
        Box::new(ContactsCard),
        Box::new(DiscordCard),
        Box::new(PublicFeedbackCard),
        Box::new(StudentStatsCard),
        Box::new(MentorStatsCard),
        Box::new(CoreJsInterviewsCard),
        Box::new(StageInterviewsCard),
    ]
}

/// Checkbox rows for the visibility settings a card owns
///
/// Permissions missing from the record are left out.
pub(crate) fn permission_rows(record: &ProfileRecord, names: &[(&str, &str)]) -> Value {
    let settings = match &record.permissions_settings {
        Some(settings) => settings,
        None => return json!([]),
    };

    let rows: Vec<Value> = names
        .iter()
        .filter_map(|(name, label)| {
            let roles = settings.get(*name)?;
            let checks: Vec<Value> = roles
                .iter()
                .map(|(role, visible)| {
                    json!({
                        "role": role.as_str(),
                        "label": role_label(*role),
                        "checked": visible,
                    })
                })
                .collect();
            Some(json!({ "name": name, "label": label, "roles": checks }))
        })
        .collect();

    Value::Array(rows)
}

/// True when any of the named permissions differs between the two records
pub(crate) fn permissions_differ(prev: &ProfileRecord, next: &ProfileRecord, names: &[(&str, &str)]) -> bool {
    let lookup = |record: &ProfileRecord, name: &str| {
        record
            .permissions_settings
            .as_ref()
            .and_then(|settings| settings.get(name).cloned())
    };
    names
        .iter()
        .any(|(name, _)| lookup(prev, name) != lookup(next, name))
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::All => "Everyone",
        Role::Mentor => "Mentors",
        Role::Student => "Students",
    }
}
