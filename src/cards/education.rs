use super::{Card, CardKind, CardProps, permission_rows, permissions_differ};
use crate::profile::IS_EDUCATION_VISIBLE;
use serde_json::{Value, json};

const PERMISSIONS: [(&str, &str); 1] = [(IS_EDUCATION_VISIBLE, "Education")];

/// Education history with add/delete controls in edit mode
pub struct EducationCard;

impl Card for EducationCard {
    fn kind(&self) -> CardKind {
        CardKind::Education
    }

    fn template(&self) -> (&'static str, &'static str) {
        ("education", include_str!("../templates/education.hbs"))
    }

    fn is_visible(&self, props: &CardProps) -> bool {
        props.edit_mode || !props.record.education_history().is_empty()
    }

    fn context(&self, props: &CardProps) -> Value {
        let entries: Vec<Value> = props
            .record
            .education_history()
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                json!({
                    "index": index,
                    "university": entry.university,
                    "faculty": entry.faculty,
                    "graduation_year": entry.graduation_year,
                })
            })
            .collect();

        json!({
            "edit_mode": props.edit_mode,
            "entries": entries,
            "permissions": permission_rows(props.record, &PERMISSIONS),
        })
    }

    fn slice_changed(&self, prev: &CardProps, next: &CardProps) -> bool {
        prev.record.education_history() != next.record.education_history()
            || permissions_differ(prev.record, next.record, &PERMISSIONS)
    }
}
