//! Rank rules of multi-phase actions.
//!
//! Each multi-phase action names a rank rule in its [`PhaseProfile`]. The rule
//! is instantiated as a [`PhaseStrategy`] object through
//! [`PhaseProfile::strategy`], so adding an action family means adding a tag
//! and a strategy, never another branch keyed by action id.
//!
//! Strategies only implement the family-specific step function. The rules
//! shared by every family (forced rank, emergency, movement) are applied by
//! [`crate::commitment::decide_rank`] before a strategy is consulted.

use crate::action::PhaseProfile;
use crate::state::Seconds;

/// How urgent the situation is when a multi-phase action is requested.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum Urgency {
    #[default]
    Normal,
    Elevated,
    /// Someone is about to die; release as early as possible.
    Emergency,
}

/// Inputs of the one-time rank decision.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RankContext {
    pub urgency: Urgency,
    /// Number of injured actors the action could reach.
    pub target_count: usize,
    /// Mean deficit of those actors, in percent of max health.
    pub avg_deficit: f32,
    /// Time the controller can keep channeling.
    pub time_available: Seconds,
    pub movement_required: bool,
    /// Caller override, capped at the action's maximum rank.
    pub forced_rank: Option<u8>,
}

/// Family-specific rank rule of a multi-phase action.
pub trait PhaseStrategy {
    /// Returns the rank in `1..=max_rank` this family picks for `ctx`.
    fn decide_rank(&self, ctx: &RankContext) -> u8;

    /// Duration of each phase, in rank order.
    fn phase_durations(&self) -> &[Seconds];

    /// Thresholds the step function compares against; empty when unused.
    fn thresholds(&self) -> &[f32];

    fn max_rank(&self) -> u8 {
        self.phase_durations().len() as u8
    }
}

/// One rank per deficit threshold reached.
///
/// With thresholds 20/40/60 a four-rank action picks rank 1 below 20 %
/// average deficit, rank 2 from 20 %, rank 3 from 40 % and rank 4 from 60 %.
pub struct DeficitSteps<'a> {
    profile: &'a PhaseProfile,
    thresholds: &'a [f32],
}

impl<'a> DeficitSteps<'a> {
    pub fn new(profile: &'a PhaseProfile, thresholds: &'a [f32]) -> Self {
        Self {
            profile,
            thresholds,
        }
    }
}

impl PhaseStrategy for DeficitSteps<'_> {
    fn decide_rank(&self, ctx: &RankContext) -> u8 {
        let reached = self
            .thresholds
            .iter()
            .filter(|threshold| ctx.avg_deficit >= **threshold)
            .count();
        let rank = u8::try_from(reached + 1).unwrap_or(u8::MAX);
        rank.clamp(1, self.max_rank().max(1))
    }

    fn phase_durations(&self) -> &[Seconds] {
        &self.profile.durations
    }

    fn thresholds(&self) -> &[f32] {
        self.thresholds
    }
}

/// Rank matched to the number of injured targets, for spread actions.
///
/// When the profile lists per-rank target caps, the smallest rank whose cap
/// covers `target_count` is picked; otherwise one rank per target.
pub struct CountMatched<'a> {
    profile: &'a PhaseProfile,
}

impl<'a> CountMatched<'a> {
    pub fn new(profile: &'a PhaseProfile) -> Self {
        Self { profile }
    }
}

impl PhaseStrategy for CountMatched<'_> {
    fn decide_rank(&self, ctx: &RankContext) -> u8 {
        let max_rank = self.max_rank().max(1);
        let caps = &self.profile.target_caps;
        if caps.is_empty() {
            let rank = u8::try_from(ctx.target_count).unwrap_or(u8::MAX);
            return rank.clamp(1, max_rank);
        }
        caps.iter()
            .take(usize::from(max_rank))
            .position(|cap| usize::from(*cap) >= ctx.target_count)
            .map(|index| index as u8 + 1)
            .unwrap_or(max_rank)
    }

    fn phase_durations(&self) -> &[Seconds] {
        &self.profile.durations
    }

    fn thresholds(&self) -> &[f32] {
        &[]
    }
}
