use crate::error::ProfileError;
use crate::profile::{Contacts, EducationEntry, EnglishLevel, Role};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const LOCATION_PATH: &str = "generalInfo.location";
pub const ENGLISH_LEVEL_PATH: &str = "generalInfo.englishLevel";
pub const EDUCATION_HISTORY_PATH: &str = "generalInfo.educationHistory";
pub const NAME_PATH: &str = "generalInfo.name";
pub const ABOUT_MYSELF_PATH: &str = "generalInfo.aboutMyself";

lazy_static! {
    static ref EDUCATION_FIELD_REGEX: Regex = Regex::new(
        r"^generalInfo\.educationHistory(?:\[(\d+)\]|\.(\d+))\.(university|faculty|graduationYear)$"
    )
    .unwrap();
    static ref CONTACT_FIELD_REGEX: Regex = Regex::new(r"^contacts\.([A-Za-z]+)$").unwrap();
}

/// Edit sent by a card, as it arrives over the wire
///
/// `path` is the dotted field locator (`generalInfo.location`,
/// `contacts.telegram`, `generalInfo.educationHistory[1].faculty`); `value`
/// is either the new value or an input-change event `{"target": {"value": ..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRequest {
    pub path: String,
    #[serde(default)]
    pub value: Value,
}

impl EditRequest {
    pub fn new(path: &str, value: Value) -> Self {
        EditRequest {
            path: path.to_string(),
            value,
        }
    }
}

/// Partial location; an omitted field keeps its current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPatch {
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
}

impl LocationPatch {
    pub fn city(city_name: &str) -> Self {
        LocationPatch {
            city_name: Some(city_name.to_string()),
            country_name: None,
        }
    }

    pub fn country(country_name: &str) -> Self {
        LocationPatch {
            city_name: None,
            country_name: Some(country_name.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EducationEdit {
    Add,
    Delete { index: usize },
}

/// One field of an education entry together with its new value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EducationField {
    University(Option<String>),
    Faculty(Option<String>),
    GraduationYear(Option<u16>),
}

impl EducationField {
    pub fn name(&self) -> &'static str {
        match self {
            EducationField::University(_) => "university",
            EducationField::Faculty(_) => "faculty",
            EducationField::GraduationYear(_) => "graduationYear",
        }
    }

    pub(crate) fn write(&self, entry: &mut EducationEntry) {
        match self {
            EducationField::University(value) => entry.university = value.clone(),
            EducationField::Faculty(value) => entry.faculty = value.clone(),
            EducationField::GraduationYear(value) => entry.graduation_year = *value,
        }
    }

    /// True when `entry` already holds this value
    pub(crate) fn matches(&self, entry: Option<&EducationEntry>) -> bool {
        match self {
            EducationField::University(value) => {
                entry.and_then(|e| e.university.as_ref()) == value.as_ref()
            }
            EducationField::Faculty(value) => entry.and_then(|e| e.faculty.as_ref()) == value.as_ref(),
            EducationField::GraduationYear(value) => {
                entry.and_then(|e| e.graduation_year) == *value
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    Email,
    EpamEmail,
    Phone,
    Skype,
    Telegram,
    Notes,
    LinkedIn,
}

impl ContactField {
    pub const ALL: [ContactField; 7] = [
        ContactField::Email,
        ContactField::EpamEmail,
        ContactField::Phone,
        ContactField::Skype,
        ContactField::Telegram,
        ContactField::Notes,
        ContactField::LinkedIn,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ContactField::Email => "email",
            ContactField::EpamEmail => "epamEmail",
            ContactField::Phone => "phone",
            ContactField::Skype => "skype",
            ContactField::Telegram => "telegram",
            ContactField::Notes => "notes",
            ContactField::LinkedIn => "linkedIn",
        }
    }

    pub fn from_str_name(name: &str) -> Option<Self> {
        ContactField::ALL.iter().copied().find(|f| f.name() == name)
    }

    pub fn get<'a>(&self, contacts: &'a Contacts) -> Option<&'a String> {
        self.slot_ref(contacts).as_ref()
    }

    fn slot_ref<'a>(&self, contacts: &'a Contacts) -> &'a Option<String> {
        match self {
            ContactField::Email => &contacts.email,
            ContactField::EpamEmail => &contacts.epam_email,
            ContactField::Phone => &contacts.phone,
            ContactField::Skype => &contacts.skype,
            ContactField::Telegram => &contacts.telegram,
            ContactField::Notes => &contacts.notes,
            ContactField::LinkedIn => &contacts.linked_in,
        }
    }

    pub(crate) fn slot<'a>(&self, contacts: &'a mut Contacts) -> &'a mut Option<String> {
        match self {
            ContactField::Email => &mut contacts.email,
            ContactField::EpamEmail => &mut contacts.epam_email,
            ContactField::Phone => &mut contacts.phone,
            ContactField::Skype => &mut contacts.skype,
            ContactField::Telegram => &mut contacts.telegram,
            ContactField::Notes => &mut contacts.notes,
            ContactField::LinkedIn => &mut contacts.linked_in,
        }
    }
}

/// Plain field write handled by the default reducer branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Name(String),
    AboutMyself(Option<String>),
    Education { index: usize, field: EducationField },
    Contact(ContactField, Option<String>),
}

/// Typed edit of the general profile settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneralEdit {
    Location(LocationPatch),
    EnglishLevel(Option<EnglishLevel>),
    EducationHistory(EducationEdit),
    Field(FieldEdit),
}

impl GeneralEdit {
    /// Parse a wire edit into its typed form
    ///
    /// # Errors
    /// * `UnknownPath` when the path addresses no editable field
    /// * `InvalidValue` when the value does not fit the field
    pub fn from_request(request: &EditRequest) -> Result<Self, ProfileError> {
        let path = request.path.trim();
        let value = event_value(&request.value);

        match path {
            LOCATION_PATH => {
                let patch = serde_json::from_value::<LocationPatch>(value.clone())
                    .map_err(|e| invalid(path, &e.to_string()))?;
                Ok(GeneralEdit::Location(patch))
            }
            ENGLISH_LEVEL_PATH => match value {
                Value::Null => Ok(GeneralEdit::EnglishLevel(None)),
                Value::String(s) if s.is_empty() => Ok(GeneralEdit::EnglishLevel(None)),
                Value::String(s) => EnglishLevel::from_str_name(s)
                    .map(|level| GeneralEdit::EnglishLevel(Some(level)))
                    .ok_or_else(|| invalid(path, &format!("unknown english level '{}'", s))),
                _ => Err(invalid(path, "expected a level string")),
            },
            EDUCATION_HISTORY_PATH => {
                let edit = serde_json::from_value::<EducationEdit>(value.clone())
                    .map_err(|e| invalid(path, &e.to_string()))?;
                Ok(GeneralEdit::EducationHistory(edit))
            }
            NAME_PATH => match value {
                Value::String(s) => Ok(GeneralEdit::Field(FieldEdit::Name(s.trim().to_string()))),
                _ => Err(invalid(path, "expected a string")),
            },
            ABOUT_MYSELF_PATH => Ok(GeneralEdit::Field(FieldEdit::AboutMyself(
                optional_text(path, value)?,
            ))),
            _ => Self::parse_indexed(path, value),
        }
    }

    fn parse_indexed(path: &str, value: &Value) -> Result<Self, ProfileError> {
        if let Some(caps) = EDUCATION_FIELD_REGEX.captures(path) {
            let index = caps
                .get(1)
                .or_else(|| caps.get(2))
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .ok_or_else(|| ProfileError::UnknownPath(path.to_string()))?;
            let field = match &caps[3] {
                "university" => EducationField::University(optional_text(path, value)?),
                "faculty" => EducationField::Faculty(optional_text(path, value)?),
                _ => EducationField::GraduationYear(optional_year(path, value)?),
            };
            return Ok(GeneralEdit::Field(FieldEdit::Education { index, field }));
        }

        if let Some(caps) = CONTACT_FIELD_REGEX.captures(path) {
            let field = ContactField::from_str_name(&caps[1])
                .ok_or_else(|| ProfileError::UnknownPath(path.to_string()))?;
            return Ok(GeneralEdit::Field(FieldEdit::Contact(
                field,
                optional_text(path, value)?,
            )));
        }

        Err(ProfileError::UnknownPath(path.to_string()))
    }

    /// Dotted path this edit addresses
    pub fn path(&self) -> String {
        match self {
            GeneralEdit::Location(_) => LOCATION_PATH.to_string(),
            GeneralEdit::EnglishLevel(_) => ENGLISH_LEVEL_PATH.to_string(),
            GeneralEdit::EducationHistory(_) => EDUCATION_HISTORY_PATH.to_string(),
            GeneralEdit::Field(FieldEdit::Name(_)) => NAME_PATH.to_string(),
            GeneralEdit::Field(FieldEdit::AboutMyself(_)) => ABOUT_MYSELF_PATH.to_string(),
            GeneralEdit::Field(FieldEdit::Education { index, field }) => {
                format!("{}[{}].{}", EDUCATION_HISTORY_PATH, index, field.name())
            }
            GeneralEdit::Field(FieldEdit::Contact(field, _)) => format!("contacts.{}", field.name()),
        }
    }
}

/// Permission toggle target; `Role::All` addresses every role of the permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionEdit {
    pub permission_name: String,
    pub role: Role,
}

impl PermissionEdit {
    pub fn new(permission_name: &str, role: Role) -> Self {
        PermissionEdit {
            permission_name: permission_name.to_string(),
            role,
        }
    }
}

/// Wire form of a permission checkbox change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEditRequest {
    pub checked: bool,
    #[serde(flatten)]
    pub edit: PermissionEdit,
}

/// Unwrap an input-change event to the value it carries
fn event_value(value: &Value) -> &Value {
    value
        .get("target")
        .and_then(|target| target.get("value"))
        .unwrap_or(value)
}

fn invalid(path: &str, reason: &str) -> ProfileError {
    ProfileError::InvalidValue {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

// Cleared inputs arrive as "" and are stored as unset.
fn optional_text(path: &str, value: &Value) -> Result<Option<String>, ProfileError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(invalid(path, "expected text")),
    }
}

fn optional_year(path: &str, value: &Value) -> Result<Option<u16>, ProfileError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<u16>()
            .map(Some)
            .map_err(|_| invalid(path, &format!("'{}' is not a year", s))),
        Value::Number(n) => n
            .as_u64()
            .and_then(|year| u16::try_from(year).ok())
            .map(Some)
            .ok_or_else(|| invalid(path, &format!("{} is not a year", n))),
        _ => Err(invalid(path, "expected a year")),
    }
}
