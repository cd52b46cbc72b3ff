//! Member list port - live roster access on the messaging host
//!
//! The domain defines what it needs, and the gateway layer provides the
//! implementation (the Satori HTTP client in production, fakes in tests).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::MemberSnapshot;
use crate::error::HostError;

/// One page of a paginated member listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPage {
    #[serde(default)]
    pub data: Vec<MemberSnapshot>,
    /// Continuation token; `None` when the listing is exhausted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl MemberPage {
    /// A final page with no continuation
    pub fn last(data: Vec<MemberSnapshot>) -> Self {
        Self { data, next: None }
    }

    /// Check if another page follows this one
    #[inline]
    pub fn has_next(&self) -> bool {
        self.next.as_deref().is_some_and(|n| !n.is_empty())
    }
}

#[async_trait]
pub trait MemberListSource: Send + Sync {
    /// Fetch one page of the group's member list
    async fn guild_member_list(
        &self,
        guild_id: &str,
        next: Option<&str>,
    ) -> Result<MemberPage, HostError>;
}
