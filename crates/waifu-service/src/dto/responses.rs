//! Response DTOs

use waifu_core::MemberSnapshot;

/// Result of a successful `waifu` or `force-marry` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marriage {
    pub partner: MemberSnapshot,
    /// `false` when an existing same-day relationship was returned
    pub fresh: bool,
}

impl Marriage {
    pub fn fresh(partner: MemberSnapshot) -> Self {
        Self {
            partner,
            fresh: true,
        }
    }

    pub fn existing(partner: MemberSnapshot) -> Self {
        Self {
            partner,
            fresh: false,
        }
    }
}
