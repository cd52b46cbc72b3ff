//! Reply rendering
//!
//! Replies are Satori message content: escaped text plus `<quote/>` and
//! `<img/>` elements.

use waifu_core::{MemberSnapshot, PairingError};
use waifu_service::{Marriage, ServiceError};

/// Escape text for Satori message content
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A reply being assembled
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reply {
    content: String,
}

impl Reply {
    /// Start a reply, quoting the triggering message when known
    pub fn to(message_id: Option<&str>) -> Self {
        let mut reply = Self::default();
        if let Some(id) = message_id {
            reply.content.push_str(&format!("<quote id=\"{}\"/>", escape(id)));
        }
        reply
    }

    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.content.push_str(&escape(text));
        self
    }

    #[must_use]
    pub fn image(mut self, src: Option<&str>) -> Self {
        if let Some(src) = src.filter(|s| !s.is_empty()) {
            self.content.push_str(&format!("<img src=\"{}\"/>", escape(src)));
        }
        self
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

fn with_partner(reply: Reply, lead: &str, partner: &MemberSnapshot) -> String {
    reply
        .text(lead)
        .text(partner.display_name())
        .text("!")
        .image(partner.avatar_url())
        .into_content()
}

/// Reply for a successful `waifu` or `force-marry`
pub fn render_marriage(message_id: Option<&str>, marriage: &Marriage, forced: bool) -> String {
    let lead = match (forced, marriage.fresh) {
        (true, _) => "You married ",
        (false, true) => "Your waifu today is ",
        (false, false) => "You are already married today to ",
    };
    with_partner(Reply::to(message_id), lead, &marriage.partner)
}

/// Reply for a failed command, or `None` when the requester should not
/// see the error
pub fn render_error(message_id: Option<&str>, err: &ServiceError) -> Option<String> {
    let text = match err.pairing()? {
        PairingError::MembersTooFew => "Not enough members to pick a waifu from.".to_string(),
        PairingError::NotInGuild => "This command only works in a group.".to_string(),
        PairingError::NoTarget => "Mention who you want to marry.".to_string(),
        PairingError::TargetSelf => "You cannot marry yourself.".to_string(),
        PairingError::TargetNotFound(id) => format!("{id} is not a member of this group."),
        PairingError::TargetTaken { name } => format!("{name} is already married today."),
    };
    Some(Reply::to(message_id).text(&text).into_content())
}
