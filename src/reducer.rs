//! Pure state transitions behind the profile controller.
//!
//! Each reducer takes the current value and the snapshot taken at the last
//! load or save, and returns a fresh value plus the recomputed dirty flag.
//! The inputs are never modified, so a rejected edit leaves nothing behind.

use crate::edit::{EducationEdit, FieldEdit, GeneralEdit, PermissionEdit};
use crate::error::ProfileError;
use crate::profile::{
    Contacts, EducationEntry, GeneralInfo, Location, PermissionSettings, ProfileRecord, Role,
};

/// Apply a general settings edit
///
/// # Arguments
/// * `current` - Record being edited
/// * `snapshot` - Record as of the last load or save
/// * `edit` - Typed edit to apply
///
/// # Returns
/// * `Result<(ProfileRecord, bool), ProfileError>` - The new record and whether
///   the touched fields now differ from the snapshot
///
/// # Errors
/// * `IndexOutOfRange` when an education entry index does not exist
pub fn reduce_general_edit(
    current: &ProfileRecord,
    snapshot: &ProfileRecord,
    edit: &GeneralEdit,
) -> Result<(ProfileRecord, bool), ProfileError> {
    let mut next = current.clone();

    let changed = match edit {
        GeneralEdit::Location(patch) => {
            // a blank field keeps the current value
            let city_name = non_blank(&patch.city_name);
            let country_name = non_blank(&patch.country_name);
            if city_name.is_some() || country_name.is_some() {
                let info = next.general_info.get_or_insert_with(GeneralInfo::default);
                let location = info.location.get_or_insert_with(Location::default);
                if let Some(city_name) = city_name {
                    location.city_name = Some(city_name.to_string());
                }
                if let Some(country_name) = country_name {
                    location.country_name = Some(country_name.to_string());
                }
            }

            let location = next.location().cloned().unwrap_or_default();
            location != snapshot.location().cloned().unwrap_or_default()
        }
        GeneralEdit::EnglishLevel(level) => {
            let info = next.general_info.get_or_insert_with(GeneralInfo::default);
            info.english_level = *level;
            *level != snapshot.english_level()
        }
        GeneralEdit::EducationHistory(intent) => {
            let info = next.general_info.get_or_insert_with(GeneralInfo::default);
            let history = info.education_history.get_or_insert_with(Vec::new);
            match intent {
                EducationEdit::Add => history.push(EducationEntry::default()),
                EducationEdit::Delete { index } => {
                    if *index >= history.len() {
                        return Err(ProfileError::IndexOutOfRange {
                            index: *index,
                            len: history.len(),
                        });
                    }
                    history.remove(*index);
                }
            }
            history.as_slice() != snapshot.education_history()
        }
        GeneralEdit::Field(field) => write_field(&mut next, snapshot, field)?,
    };

    Ok((next, changed))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

// Default branch: write one value and compare it with the snapshot value
// at the same field.
fn write_field(
    next: &mut ProfileRecord,
    snapshot: &ProfileRecord,
    edit: &FieldEdit,
) -> Result<bool, ProfileError> {
    let saved_info = snapshot.general_info.as_ref();

    let changed = match edit {
        FieldEdit::Name(name) => {
            let info = next.general_info.get_or_insert_with(GeneralInfo::default);
            info.name = name.clone();
            saved_info.map(|i| i.name.as_str()).unwrap_or_default() != name.as_str()
        }
        FieldEdit::AboutMyself(text) => {
            let info = next.general_info.get_or_insert_with(GeneralInfo::default);
            info.about_myself = text.clone();
            saved_info.and_then(|i| i.about_myself.as_ref()) != text.as_ref()
        }
        FieldEdit::Education { index, field } => {
            let info = next.general_info.get_or_insert_with(GeneralInfo::default);
            let history = info.education_history.get_or_insert_with(Vec::new);
            let len = history.len();
            let entry = history
                .get_mut(*index)
                .ok_or(ProfileError::IndexOutOfRange { index: *index, len })?;
            field.write(entry);
            !field.matches(snapshot.education_history().get(*index))
        }
        FieldEdit::Contact(field, value) => {
            let contacts = next.contacts.get_or_insert_with(Contacts::default);
            *field.slot(contacts) = value.clone();
            snapshot.contacts.as_ref().and_then(|c| field.get(c)) != value.as_ref()
        }
    };

    Ok(changed)
}

/// Apply a permission checkbox change
///
/// With `Role::All` every role key of the permission takes `checked`;
/// otherwise only the named role does.
///
/// # Returns
/// * `Result<(PermissionSettings, bool), ProfileError>` - The new settings and
///   whether they differ from the snapshot
///
/// # Errors
/// * `UnknownPermission` when the permission is not in the settings
/// * `UnknownRole` when the role is not one of the permission's keys
pub fn reduce_permission_edit(
    current: &PermissionSettings,
    snapshot: &PermissionSettings,
    checked: bool,
    edit: &PermissionEdit,
) -> Result<(PermissionSettings, bool), ProfileError> {
    let mut next = current.clone();
    let roles = next
        .get_mut(&edit.permission_name)
        .ok_or_else(|| ProfileError::UnknownPermission(edit.permission_name.clone()))?;

    if edit.role == Role::All {
        for visible in roles.values_mut() {
            *visible = checked;
        }
    } else {
        let visible = roles
            .get_mut(&edit.role)
            .ok_or_else(|| ProfileError::UnknownRole {
                permission: edit.permission_name.clone(),
                role: edit.role.to_string(),
            })?;
        *visible = checked;
    }

    let changed = next != *snapshot;
    Ok((next, changed))
}
