use super::{Card, CardKind, CardProps, permission_rows, permissions_differ};
use crate::profile::{IS_ABOUT_VISIBLE, ProfileRecord};
use serde_json::{Value, json};

const PERMISSIONS: [(&str, &str); 1] = [(IS_ABOUT_VISIBLE, "About")];

pub struct AboutCard;

fn about(record: &ProfileRecord) -> Option<&str> {
    record
        .general_info
        .as_ref()
        .and_then(|info| info.about_myself.as_deref())
}

impl Card for AboutCard {
    fn kind(&self) -> CardKind {
        CardKind::About
    }

    fn template(&self) -> (&'static str, &'static str) {
        ("about", include_str!("../templates/about.hbs"))
    }

    fn is_visible(&self, props: &CardProps) -> bool {
        props.edit_mode || about(props.record).is_some()
    }

    fn context(&self, props: &CardProps) -> Value {
        let text = about(props.record).unwrap_or_default();
        json!({
            "edit_mode": props.edit_mode,
            "about": text,
            "paragraphs": text.lines().filter(|l| !l.trim().is_empty()).collect::<Vec<_>>(),
            "permissions": permission_rows(props.record, &PERMISSIONS),
        })
    }

    fn slice_changed(&self, prev: &CardProps, next: &CardProps) -> bool {
        about(prev.record) != about(next.record)
            || permissions_differ(prev.record, next.record, &PERMISSIONS)
    }
}
