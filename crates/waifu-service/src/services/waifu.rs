//! Waifu service
//!
//! The `waifu` and `force-marry` commands: resolve the roster, filter
//! candidates, and hand the result to the pairing engine.

use tracing::{info, instrument};
use waifu_core::{GuildKey, MemberListSource, MemberSnapshot, PairingError};

use crate::dto::{Marriage, Requester};

use super::candidates::CandidateFilter;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::pairing::{PairingEngine, PairingOptions};
use super::roster::RosterResolver;

/// Waifu service
pub struct WaifuService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> WaifuService<'a> {
    /// Create a new WaifuService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn options(&self) -> PairingOptions {
        PairingOptions::from(self.ctx.config())
    }

    /// Today's partner for the requester, chosen now if there is none yet
    #[instrument(skip(self, host), fields(user_id = %requester.user_id))]
    pub async fn marry(
        &self,
        requester: &Requester,
        host: &dyn MemberListSource,
    ) -> ServiceResult<Marriage> {
        let fid = requester.member_key().ok_or(PairingError::NotInGuild)?;
        let guild = fid.guild();
        let engine = PairingEngine::new(self.ctx);

        if let Some(partner) = engine.current_partner(&fid) {
            return Ok(Marriage::existing(partner));
        }

        let roster = RosterResolver::new(self.ctx).resolve(&guild, host).await;
        let pool = CandidateFilter::new(self.ctx)
            .candidates(requester, &guild, &roster)
            .await;

        let outcome = engine.pair(&fid, &requester.member, pool, self.options())?;
        if !outcome.is_fresh() {
            return Ok(Marriage::existing(outcome.into_partner()));
        }
        let partner = outcome.into_partner();
        info!(fid = %fid, partner = partner.display_name(), "Marriage recorded");
        Ok(Marriage::fresh(partner))
    }

    /// Bind the requester to an explicit target
    ///
    /// `target` may be an `<at id=".."/>` element, `@id`, `platform:id`, or
    /// a bare user id.
    #[instrument(skip(self, host), fields(user_id = %requester.user_id))]
    pub async fn force_marry(
        &self,
        requester: &Requester,
        target: Option<&str>,
        host: &dyn MemberListSource,
    ) -> ServiceResult<Marriage> {
        if !self.ctx.config().force_marry {
            return Err(ServiceError::Disabled("force-marry"));
        }
        let fid = requester.member_key().ok_or(PairingError::NotInGuild)?;
        let guild = fid.guild();
        let target_id = target
            .and_then(|raw| normalize_target(raw, &requester.platform))
            .ok_or(PairingError::NoTarget)?;
        if target_id == requester.user_id {
            return Err(PairingError::TargetSelf.into());
        }

        let target = self
            .find_member(&guild, &target_id, host)
            .await
            .ok_or_else(|| PairingError::TargetNotFound(target_id.clone()))?;

        let partner = PairingEngine::new(self.ctx).force_pair(
            &fid,
            &requester.member,
            &target,
            self.options(),
        )?;

        info!(fid = %fid, target = %target_id, "Forced marriage recorded");
        Ok(Marriage::fresh(partner))
    }

    /// Look a member up in the resolved roster, then in the directory
    async fn find_member(
        &self,
        guild: &GuildKey,
        user_id: &str,
        host: &dyn MemberListSource,
    ) -> Option<MemberSnapshot> {
        let roster = RosterResolver::new(self.ctx).resolve(guild, host).await;
        if let Some(member) = roster.get(user_id) {
            return Some(member.clone());
        }

        match self.ctx.directory().member(guild, user_id).await {
            Ok(member) => member,
            Err(e) => {
                tracing::warn!(guild = %guild, user_id = %user_id, error = %e, "Directory lookup failed");
                None
            }
        }
    }
}

/// Extract a user id from a command argument
fn normalize_target(raw: &str, platform: &str) -> Option<String> {
    let raw = raw.trim();
    let id = if raw.starts_with("<at") {
        let rest = &raw[raw.find("id=\"")? + 4..];
        &rest[..rest.find('"')?]
    } else {
        raw.strip_prefix('@').unwrap_or(raw)
    };
    let id = id
        .strip_prefix(platform)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(id)
        .trim();

    (!id.is_empty()).then(|| id.to_string())
}
