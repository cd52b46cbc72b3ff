//! Pairing engine
//!
//! Picks a partner uniformly at random from a candidate pool and records the
//! relationship in both directions. Every check and write happens under a
//! single lock of the relationship table with no await in between, so two
//! interleaved requests can never both claim the same member.

use rand::seq::SliceRandom;
use tracing::instrument;
use waifu_common::WaifuConfig;
use waifu_core::{MemberKey, MemberSnapshot, PairingError};

use super::context::ServiceContext;

/// Options that change how partners are chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairingOptions {
    /// Skip members who already take part in a relationship today
    pub avoid_ntr: bool,
}

impl From<&WaifuConfig> for PairingOptions {
    fn from(config: &WaifuConfig) -> Self {
        Self {
            avoid_ntr: config.avoid_ntr,
        }
    }
}

/// Result of a pairing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairOutcome {
    /// Same-day relationship already on record
    Existing(MemberSnapshot),
    /// Newly chosen partner
    Fresh(MemberSnapshot),
}

impl PairOutcome {
    pub fn partner(&self) -> &MemberSnapshot {
        match self {
            Self::Existing(partner) | Self::Fresh(partner) => partner,
        }
    }

    pub fn into_partner(self) -> MemberSnapshot {
        match self {
            Self::Existing(partner) | Self::Fresh(partner) => partner,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }
}

/// Pairing engine
pub struct PairingEngine<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PairingEngine<'a> {
    /// Create a new PairingEngine
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Partner already recorded for `requester` today
    pub fn current_partner(&self, requester: &MemberKey) -> Option<MemberSnapshot> {
        self.ctx.relationships().partner_of(requester)
    }

    /// Pair `requester` with a random member of `pool`
    ///
    /// An existing relationship is returned as-is without touching the
    /// random source.
    #[instrument(skip(self, requester_snapshot, pool), fields(fid = %requester, pool = pool.len()))]
    pub fn pair(
        &self,
        requester: &MemberKey,
        requester_snapshot: &MemberSnapshot,
        pool: Vec<MemberSnapshot>,
        options: PairingOptions,
    ) -> Result<PairOutcome, PairingError> {
        let guild = requester.guild();
        let mut bindings = self.ctx.relationships().lock();

        if let Some(partner) = bindings.partner_of(requester) {
            return Ok(PairOutcome::Existing(partner.clone()));
        }

        let pool: Vec<MemberSnapshot> = pool
            .into_iter()
            .filter(|candidate| match candidate.user_id() {
                Some(uid) => {
                    uid != requester.user_id
                        && !(options.avoid_ntr && bindings.is_bound(&guild, uid))
                }
                None => false,
            })
            .collect();

        let chosen = {
            let mut rng = self.ctx.rng().lock();
            pool.choose(&mut *rng).cloned()
        };
        let Some(chosen) = chosen else {
            tracing::debug!(fid = %requester, "No candidates left");
            return Err(PairingError::MembersTooFew);
        };
        let Some(chosen_id) = chosen.user_id() else {
            return Err(PairingError::MembersTooFew);
        };

        let partner_key = guild.member(chosen_id);
        bindings.bind(
            requester,
            requester_snapshot.clone(),
            &partner_key,
            chosen.clone(),
            options.avoid_ntr,
        );

        tracing::info!(fid = %requester, partner = %partner_key, "Paired");
        Ok(PairOutcome::Fresh(chosen))
    }

    /// Bind `requester` to an explicit `target`, bypassing randomness
    #[instrument(skip(self, requester_snapshot, target), fields(fid = %requester))]
    pub fn force_pair(
        &self,
        requester: &MemberKey,
        requester_snapshot: &MemberSnapshot,
        target: &MemberSnapshot,
        options: PairingOptions,
    ) -> Result<MemberSnapshot, PairingError> {
        let Some(target_id) = target.user_id() else {
            return Err(PairingError::NoTarget);
        };
        if target_id == requester.user_id {
            return Err(PairingError::TargetSelf);
        }

        let target_key = requester.guild().member(target_id);
        let mut bindings = self.ctx.relationships().lock();

        if let Some(current) = bindings.partner_of(&target_key) {
            if current.user_id() == Some(requester.user_id.as_str()) {
                // Already each other's partner
                return Ok(target.clone());
            }
            if options.avoid_ntr {
                return Err(PairingError::TargetTaken {
                    name: target.display_name().to_string(),
                });
            }
        }

        bindings.bind(
            requester,
            requester_snapshot.clone(),
            &target_key,
            target.clone(),
            options.avoid_ntr,
        );

        tracing::info!(fid = %requester, partner = %target_key, "Force paired");
        Ok(target.clone())
    }
}
