use super::{Card, CardKind, CardProps, permission_rows, permissions_differ};
use crate::profile::IS_PUBLIC_FEEDBACK_VISIBLE;
use serde_json::{Value, json};

const PERMISSIONS: [(&str, &str); 1] = [(IS_PUBLIC_FEEDBACK_VISIBLE, "Public feedback")];

/// Badges and comments left by other users, newest first
pub struct PublicFeedbackCard;

impl Card for PublicFeedbackCard {
    fn kind(&self) -> CardKind {
        CardKind::PublicFeedback
    }

    fn template(&self) -> (&'static str, &'static str) {
        ("feedback", include_str!("../templates/feedback.hbs"))
    }

    fn is_visible(&self, props: &CardProps) -> bool {
        props
            .record
            .public_feedback
            .as_ref()
            .is_some_and(|feedback| !feedback.is_empty())
    }

    fn context(&self, props: &CardProps) -> Value {
        let mut feedback = props.record.public_feedback.clone().unwrap_or_default();
        feedback.sort_by(|a, b| b.feedback_date.cmp(&a.feedback_date));

        let items: Vec<Value> = feedback
            .iter()
            .map(|item| {
                json!({
                    "date": item.feedback_date.format("%Y-%m-%d").to_string(),
                    "badge": item.badge_id,
                    "comment": item.comment,
                    "from_name": item.from_user.name,
                    "from_github_id": item.from_user.github_id,
                })
            })
            .collect();

        json!({
            "edit_mode": props.edit_mode,
            "count": items.len(),
            "items": items,
            "permissions": permission_rows(props.record, &PERMISSIONS),
        })
    }

    fn slice_changed(&self, prev: &CardProps, next: &CardProps) -> bool {
        prev.record.public_feedback != next.record.public_feedback
            || permissions_differ(prev.record, next.record, &PERMISSIONS)
    }
}
