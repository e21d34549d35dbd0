use super::{Card, CardKind, CardProps, permission_rows, permissions_differ};
use crate::profile::{IS_PROFILE_VISIBLE, Location, ProfileRecord};
use serde_json::{Value, json};

const PERMISSIONS: [(&str, &str); 1] = [(IS_PROFILE_VISIBLE, "Profile")];

/// Name, github account and location
pub struct MainCard;

impl MainCard {
    fn slice(record: &ProfileRecord) -> (Option<&str>, Option<&str>, Option<&Location>) {
        let info = record.general_info.as_ref();
        (
            info.map(|i| i.name.as_str()),
            info.map(|i| i.github_id.as_str()),
            record.location(),
        )
    }
}

impl Card for MainCard {
    fn kind(&self) -> CardKind {
        CardKind::Main
    }

    fn template(&self) -> (&'static str, &'static str) {
        ("main", include_str!("../templates/main.hbs"))
    }

    fn is_visible(&self, props: &CardProps) -> bool {
        props.record.general_info.is_some() || props.edit_mode
    }

    fn context(&self, props: &CardProps) -> Value {
        let info = props.record.general_info.as_ref();
        let github_id = info.map(|i| i.github_id.as_str()).unwrap_or_default();
        let location = props.record.location();

        json!({
            "edit_mode": props.edit_mode,
            "name": info.map(|i| i.name.as_str()).unwrap_or_default(),
            "github_id": github_id,
            "avatar_url": format!("https://github.com/{}.png?size=96", github_id),
            "city_name": location.and_then(|l| l.city_name.as_deref()),
            "country_name": location.and_then(|l| l.country_name.as_deref()),
            "permissions": permission_rows(props.record, &PERMISSIONS),
        })
    }

    fn slice_changed(&self, prev: &CardProps, next: &CardProps) -> bool {
        MainCard::slice(prev.record) != MainCard::slice(next.record)
            || permissions_differ(prev.record, next.record, &PERMISSIONS)
    }
}
