use super::{Card, CardKind, CardProps};
use serde_json::{Value, json};

/// Starts the discord link round trip; the callback lands back on the profile
pub const DISCORD_AUTHORIZE_ROUTE: &str = "/profile?code=discord";

/// Linked discord account
///
/// Only the owner is offered the link (or relink) action. Visitors see the
/// card only when an account is linked.
pub struct DiscordCard;

impl Card for DiscordCard {
    fn kind(&self) -> CardKind {
        CardKind::Discord
    }

    fn template(&self) -> (&'static str, &'static str) {
        ("discord", include_str!("../templates/discord.hbs"))
    }

    fn is_visible(&self, props: &CardProps) -> bool {
        props.is_profile_owner || props.record.discord.is_some()
    }

    fn context(&self, props: &CardProps) -> Value {
        let discord = props.record.discord.as_ref();
        json!({
            "account": discord.map(|d| format!("{}#{}", d.username, d.discriminator)),
            "user_url": discord.map(|d| format!("https://discordapp.com/users/{}", d.id)),
            "is_profile_owner": props.is_profile_owner,
            "authorize_url": DISCORD_AUTHORIZE_ROUTE,
        })
    }

    fn slice_changed(&self, prev: &CardProps, next: &CardProps) -> bool {
        prev.record.discord != next.record.discord
            || prev.is_profile_owner != next.is_profile_owner
    }
}
