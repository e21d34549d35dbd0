use super::{Card, CardKind, CardProps, permission_rows, permissions_differ};
use crate::edit::ContactField;
use crate::profile::{
    IS_CONTACTS_NOTES_VISIBLE, IS_EMAIL_VISIBLE, IS_LINKED_IN_VISIBLE, IS_PHONE_VISIBLE,
    IS_SKYPE_VISIBLE, IS_TELEGRAM_VISIBLE, ProfileRecord,
};
use serde_json::{Value, json};

const PERMISSIONS: [(&str, &str); 6] = [
    (IS_EMAIL_VISIBLE, "Email"),
    (IS_TELEGRAM_VISIBLE, "Telegram"),
    (IS_PHONE_VISIBLE, "Phone"),
    (IS_SKYPE_VISIBLE, "Skype"),
    (IS_CONTACTS_NOTES_VISIBLE, "Notes"),
    (IS_LINKED_IN_VISIBLE, "LinkedIn"),
];

/// Contacts and notification channels
///
/// Owns the "resend confirmation email" button, shown to the owner while the
/// email channel is not confirmed.
pub struct ContactsCard;

fn label(field: ContactField) -> &'static str {
    match field {
        ContactField::Email => "Email",
        ContactField::EpamEmail => "EPAM email",
        ContactField::Phone => "Phone",
        ContactField::Skype => "Skype",
        ContactField::Telegram => "Telegram",
        ContactField::Notes => "Notes",
        ContactField::LinkedIn => "LinkedIn",
    }
}

fn has_contacts(record: &ProfileRecord) -> bool {
    record
        .contacts
        .as_ref()
        .is_some_and(|c| ContactField::ALL.iter().any(|f| f.get(c).is_some()))
}

impl ContactsCard {
    /// Own email is set but its notification channel is not confirmed
    pub fn needs_email_confirmation(props: &CardProps) -> bool {
        if !props.is_profile_owner {
            return false;
        }
        let has_email = props
            .record
            .contacts
            .as_ref()
            .is_some_and(|c| c.email.is_some());
        let confirmed = props
            .connections
            .get("email")
            .is_some_and(|connection| connection.enabled);
        has_email && !confirmed
    }
}

impl Card for ContactsCard {
    fn kind(&self) -> CardKind {
        CardKind::Contacts
    }

    fn template(&self) -> (&'static str, &'static str) {
        ("contacts", include_str!("../templates/contacts.hbs"))
    }

    fn is_visible(&self, props: &CardProps) -> bool {
        props.edit_mode || has_contacts(props.record)
    }

    fn context(&self, props: &CardProps) -> Value {
        let contacts = props.record.contacts.clone().unwrap_or_default();
        let fields: Vec<Value> = ContactField::ALL
            .iter()
            .map(|field| {
                json!({
                    "path": format!("contacts.{}", field.name()),
                    "label": label(*field),
                    "value": field.get(&contacts),
                })
            })
            .collect();

        let mut channels: Vec<Value> = props
            .connections
            .iter()
            .map(|(channel, connection)| {
                json!({
                    "channel": channel,
                    "value": connection.value,
                    "enabled": connection.enabled,
                })
            })
            .collect();
        channels.sort_by(|a, b| a["channel"].as_str().cmp(&b["channel"].as_str()));

        json!({
            "edit_mode": props.edit_mode,
            "fields": fields,
            "channels": channels,
            "needs_email_confirmation": ContactsCard::needs_email_confirmation(props),
            "permissions": permission_rows(props.record, &PERMISSIONS),
        })
    }

    fn slice_changed(&self, prev: &CardProps, next: &CardProps) -> bool {
        prev.record.contacts != next.record.contacts
            || prev.connections != next.connections
            || prev.is_profile_owner != next.is_profile_owner
            || permissions_differ(prev.record, next.record, &PERMISSIONS)
    }
}
