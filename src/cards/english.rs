use super::{Card, CardKind, CardProps, permission_rows, permissions_differ};
use crate::profile::{EnglishLevel, IS_ENGLISH_VISIBLE};
use serde_json::{Value, json};

const PERMISSIONS: [(&str, &str); 1] = [(IS_ENGLISH_VISIBLE, "English level")];

pub struct EnglishCard;

impl Card for EnglishCard {
    fn kind(&self) -> CardKind {
        CardKind::English
    }

    fn template(&self) -> (&'static str, &'static str) {
        ("english", include_str!("../templates/english.hbs"))
    }

    fn is_visible(&self, props: &CardProps) -> bool {
        props.edit_mode || props.record.english_level().is_some()
    }

    fn context(&self, props: &CardProps) -> Value {
        let current = props.record.english_level();
        let levels: Vec<Value> = EnglishLevel::ALL
            .iter()
            .map(|level| {
                json!({
                    "value": level.as_str(),
                    "label": level.to_string(),
                    "selected": Some(*level) == current,
                })
            })
            .collect();

        json!({
            "edit_mode": props.edit_mode,
            "level": current.map(|level| level.to_string()),
            "levels": levels,
            "permissions": permission_rows(props.record, &PERMISSIONS),
        })
    }

    fn slice_changed(&self, prev: &CardProps, next: &CardProps) -> bool {
        prev.record.english_level() != next.record.english_level()
            || permissions_differ(prev.record, next.record, &PERMISSIONS)
    }
}
