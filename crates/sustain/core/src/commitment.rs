//! Commitment state machine for multi-phase (channeled) actions.
//!
//! ```text
//!            begin                 tick: phase ≥ rank / new emergency / target invalid
//!   Idle ───────────► Pending ──► Committed(rank) ─────────────────────► Released ─► Idle
//!                        │               │
//!                        │ timeout       │ interrupt / action ended
//!                        └───────────────┴─────────────────────────────► Aborted  ─► Idle
//! ```
//!
//! The target rank is decided once, when the commitment is created, and never
//! re-optimised while the action escalates. Ticks only decide whether to
//! release early.
//!
//! A commitment is *pending* (phase 0) until the scene first reports the action
//! in flight. Nothing but an abort can end a pending commitment.

use std::collections::BTreeSet;

use arrayvec::ArrayVec;

use crate::action::{ActionFamily, ActionId, ActionSpec, PhaseStrategy, RankContext, Urgency};
use crate::config::{CommitmentConfig, SustainConfig};
use crate::error::{ErrorSeverity, SustainError};
use crate::state::{ActorId, Seconds};

/// Applies the rank rules shared by every multi-phase family, then the
/// family's own step function.
///
/// 1. `forced_rank`, capped at the maximum rank
/// 2. rank 1 in an emergency
/// 3. the movement rank cap when the controller must move soon
/// 4. the strategy's step function
pub fn decide_rank(
    strategy: &dyn PhaseStrategy,
    ctx: &RankContext,
    config: &CommitmentConfig,
) -> u8 {
    let max_rank = strategy.max_rank().max(1);

    if let Some(forced) = ctx.forced_rank {
        return forced.clamp(1, max_rank);
    }
    if ctx.urgency == Urgency::Emergency {
        return 1;
    }
    if ctx.movement_required && ctx.time_available < config.movement_time_threshold {
        return config.movement_rank.clamp(1, max_rank);
    }
    strategy.decide_rank(ctx).clamp(1, max_rank)
}

/// The in-flight multi-phase action.
#[derive(Clone, Debug, PartialEq)]
pub struct Commitment {
    pub action: ActionId,
    pub started_at: Seconds,
    pub target: Option<ActorId>,
    target_rank: u8,
    pub elapsed: Seconds,
    confirmed: bool,
    durations: ArrayVec<Seconds, { SustainConfig::MAX_PHASES }>,
    /// Expected healing at the target rank.
    projected_effect: f32,
    /// Actors in emergency since the commitment began; pruned as they recover.
    baseline: BTreeSet<ActorId>,
}

impl Commitment {
    /// Rank fixed at creation.
    pub fn target_rank(&self) -> u8 {
        self.target_rank
    }

    pub fn max_rank(&self) -> u8 {
        self.durations.len() as u8
    }

    pub fn projected_effect(&self) -> f32 {
        self.projected_effect
    }

    pub fn is_pending(&self) -> bool {
        !self.confirmed
    }

    /// Phase reached so far: 0 while pending, then `1 + completed phases`,
    /// capped at the maximum rank.
    pub fn current_phase(&self) -> u8 {
        if !self.confirmed {
            return 0;
        }
        let mut boundary = 0.0;
        let mut completed = 0u8;
        for duration in &self.durations {
            boundary += *duration;
            if self.elapsed >= boundary {
                completed += 1;
            } else {
                break;
            }
        }
        (completed + 1).min(self.max_rank().max(1))
    }
}

/// Why a commitment was released before or at its target rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseReason {
    RankReached,
    NewEmergency(ActorId),
    TargetDied,
    /// Bound target no longer in the scene.
    TargetMissing,
    /// Bound target above the release fraction.
    TargetRecovered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    Interrupted,
    /// The scene reports the action is no longer executing.
    ActionEnded,
    /// The scene never reported the action in flight.
    NeverStarted,
}

/// Terminal transition of a commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitmentTransition {
    Released {
        action: ActionId,
        phase: u8,
        reason: ReleaseReason,
    },
    Aborted {
        action: ActionId,
        reason: AbortReason,
    },
}

/// State of the bound target as observed this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TargetStatus {
    /// The commitment has no bound target.
    Unbound,
    Alive { fraction: f32 },
    Dead,
    Missing,
}

/// What the machine needs to know about the current tick.
#[derive(Clone, Copy, Debug)]
pub struct CommitmentObservation<'a> {
    pub now: Seconds,
    /// The scene reports the committed action as executing.
    pub action_active: bool,
    pub target: TargetStatus,
    /// Actors currently in emergency.
    pub emergencies: &'a BTreeSet<ActorId>,
}

/// Coarse view of the machine for callers and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitmentState {
    Idle,
    Pending,
    Committed { phase: u8, target_rank: u8 },
}

/// Commitment request errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommitmentError {
    #[error("a commitment for {0} is already in flight")]
    AlreadyCommitted(ActionId),

    #[error("{0} is not a multi-phase action")]
    NotMultiPhase(ActionId),

    #[error("{0} has an empty phase table")]
    EmptyPhaseTable(ActionId),
}

impl SustainError for CommitmentError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::AlreadyCommitted(_) => ErrorSeverity::Recoverable,
            Self::NotMultiPhase(_) | Self::EmptyPhaseTable(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyCommitted(_) => "COMMITMENT_ALREADY_COMMITTED",
            Self::NotMultiPhase(_) => "COMMITMENT_NOT_MULTI_PHASE",
            Self::EmptyPhaseTable(_) => "COMMITMENT_EMPTY_PHASE_TABLE",
        }
    }
}

/// Owns at most one [`Commitment`].
#[derive(Clone, Debug)]
pub struct CommitmentMachine {
    config: CommitmentConfig,
    current: Option<Commitment>,
    last_transition: Option<CommitmentTransition>,
}

impl CommitmentMachine {
    pub fn new(config: &CommitmentConfig) -> Self {
        Self {
            config: config.clone(),
            current: None,
            last_transition: None,
        }
    }

    pub fn current(&self) -> Option<&Commitment> {
        self.current.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub fn last_transition(&self) -> Option<CommitmentTransition> {
        self.last_transition
    }

    pub fn state(&self) -> CommitmentState {
        match &self.current {
            None => CommitmentState::Idle,
            Some(commitment) if commitment.is_pending() => CommitmentState::Pending,
            Some(commitment) => CommitmentState::Committed {
                phase: commitment.current_phase(),
                target_rank: commitment.target_rank,
            },
        }
    }

    /// Creates a commitment for `spec` and returns its fixed target rank.
    ///
    /// `emergencies` is the set of actors already in emergency; only actors
    /// outside it can trigger an early release later.
    ///
    /// # Errors
    ///
    /// Fails when a commitment already exists or `spec` has no phase table.
    pub fn begin(
        &mut self,
        spec: &ActionSpec,
        ctx: &RankContext,
        target: Option<ActorId>,
        now: Seconds,
        emergencies: BTreeSet<ActorId>,
    ) -> Result<u8, CommitmentError> {
        if let Some(existing) = &self.current {
            return Err(CommitmentError::AlreadyCommitted(existing.action));
        }
        let profile = match (&spec.family, &spec.phases) {
            (ActionFamily::MultiPhase, Some(profile)) => profile,
            _ => return Err(CommitmentError::NotMultiPhase(spec.id)),
        };
        if profile.durations.is_empty() {
            return Err(CommitmentError::EmptyPhaseTable(spec.id));
        }

        let strategy = profile.strategy();
        let target_rank = decide_rank(strategy.as_ref(), ctx, &self.config);
        let projected_effect = spec.projected_effect(target_rank);

        tracing::debug!(
            "CommitmentMachine: begin {} target={:?} rank={}/{} effect={} (urgency={}, targets={}, deficit={}, forced={:?})",
            spec.id,
            target,
            target_rank,
            profile.max_rank(),
            projected_effect,
            ctx.urgency,
            ctx.target_count,
            ctx.avg_deficit,
            ctx.forced_rank
        );

        self.current = Some(Commitment {
            action: spec.id,
            started_at: now,
            target,
            target_rank,
            elapsed: 0.0,
            confirmed: false,
            durations: strategy.phase_durations().iter().copied().collect(),
            projected_effect,
            baseline: emergencies,
        });
        Ok(target_rank)
    }

    /// Advances the commitment by one tick and applies any terminal transition.
    pub fn advance(&mut self, observation: &CommitmentObservation<'_>) -> Option<CommitmentTransition> {
        let confirm_timeout = self.config.confirm_timeout;
        let release_fraction = self.config.release_fraction;
        let commitment = self.current.as_mut()?;
        commitment.elapsed = (observation.now - commitment.started_at).max(0.0);
        // An actor that recovered counts as new if it falls back into emergency.
        commitment
            .baseline
            .retain(|actor| observation.emergencies.contains(actor));

        if !commitment.confirmed {
            if !observation.action_active {
                if commitment.elapsed > confirm_timeout {
                    return self.abort(AbortReason::NeverStarted);
                }
                return None;
            }
            commitment.confirmed = true;
        } else if !observation.action_active {
            return self.abort(AbortReason::ActionEnded);
        }

        let phase = commitment.current_phase();
        let reason = if phase >= commitment.target_rank {
            Some(ReleaseReason::RankReached)
        } else {
            match observation.target {
                TargetStatus::Dead => Some(ReleaseReason::TargetDied),
                TargetStatus::Missing => Some(ReleaseReason::TargetMissing),
                TargetStatus::Alive { fraction } if fraction > release_fraction => {
                    Some(ReleaseReason::TargetRecovered)
                }
                _ => observation
                    .emergencies
                    .iter()
                    .find(|actor| !commitment.baseline.contains(actor))
                    .map(|actor| ReleaseReason::NewEmergency(*actor)),
            }
        };

        let reason = reason?;
        let transition = CommitmentTransition::Released {
            action: commitment.action,
            phase,
            reason,
        };
        tracing::debug!(
            "CommitmentMachine: release {} at phase {}/{} ({:?})",
            commitment.action,
            phase,
            commitment.target_rank,
            reason
        );
        self.finish(transition)
    }

    /// Aborts the current commitment, if any.
    pub fn abort(&mut self, reason: AbortReason) -> Option<CommitmentTransition> {
        let commitment = self.current.as_ref()?;
        tracing::debug!(
            "CommitmentMachine: abort {} at phase {} ({:?})",
            commitment.action,
            commitment.current_phase(),
            reason
        );
        let transition = CommitmentTransition::Aborted {
            action: commitment.action,
            reason,
        };
        self.finish(transition)
    }

    fn finish(&mut self, transition: CommitmentTransition) -> Option<CommitmentTransition> {
        self.current = None;
        self.last_transition = Some(transition);
        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{PhaseProfile, RankStrategyKind};

    fn spec(max_rank: u8) -> ActionSpec {
        ActionSpec::multi_phase(ActionId(10), "channel", PhaseProfile::uniform(max_rank, 1.0))
    }

    fn machine() -> CommitmentMachine {
        CommitmentMachine::new(&CommitmentConfig::default())
    }

    fn observe<'a>(
        now: Seconds,
        target: TargetStatus,
        emergencies: &'a BTreeSet<ActorId>,
    ) -> CommitmentObservation<'a> {
        CommitmentObservation {
            now,
            action_active: true,
            target,
            emergencies,
        }
    }

    fn deep_deficit() -> RankContext {
        RankContext {
            avg_deficit: 65.0,
            target_count: 4,
            time_available: 10.0,
            ..RankContext::default()
        }
    }

    #[test]
    fn forced_rank_wins_over_context() {
        let profile = PhaseProfile::uniform(4, 1.0);
        let config = CommitmentConfig::default();
        let ctx = RankContext {
            urgency: Urgency::Emergency,
            avg_deficit: 90.0,
            target_count: 5,
            movement_required: true,
            time_available: 0.5,
            forced_rank: Some(3),
        };
        assert_eq!(decide_rank(profile.strategy().as_ref(), &ctx, &config), 3);
    }

    #[test]
    fn forced_rank_is_capped() {
        let profile = PhaseProfile::uniform(4, 1.0);
        let ctx = RankContext {
            forced_rank: Some(9),
            ..RankContext::default()
        };
        let rank = decide_rank(profile.strategy().as_ref(), &ctx, &CommitmentConfig::default());
        assert_eq!(rank, 4);
    }

    #[test]
    fn emergency_always_picks_rank_one() {
        let config = CommitmentConfig::default();
        for strategy in [
            RankStrategyKind::CountMatched,
            RankStrategyKind::DeficitSteps {
                thresholds: [20.0, 40.0, 60.0].into_iter().collect(),
            },
        ] {
            let profile = PhaseProfile::uniform(4, 1.0).with_strategy(strategy);
            for (target_count, avg_deficit) in [(0, 0.0), (5, 80.0), (12, 100.0)] {
                let ctx = RankContext {
                    urgency: Urgency::Emergency,
                    target_count,
                    avg_deficit,
                    ..RankContext::default()
                };
                assert_eq!(decide_rank(profile.strategy().as_ref(), &ctx, &config), 1);
            }
        }
    }

    #[test]
    fn movement_caps_rank_at_two() {
        let config = CommitmentConfig::default();
        let ctx = RankContext {
            movement_required: true,
            time_available: 1.5,
            ..deep_deficit()
        };
        let four = PhaseProfile::uniform(4, 1.0);
        assert_eq!(decide_rank(four.strategy().as_ref(), &ctx, &config), 2);

        let one = PhaseProfile::uniform(1, 1.0);
        assert_eq!(decide_rank(one.strategy().as_ref(), &ctx, &config), 1);

        let relaxed = RankContext {
            time_available: 2.0,
            ..ctx
        };
        assert_eq!(decide_rank(four.strategy().as_ref(), &relaxed, &config), 4);
    }

    #[test]
    fn begin_rejects_second_commitment() {
        let mut machine = machine();
        machine
            .begin(&spec(4), &deep_deficit(), None, 0.0, BTreeSet::new())
            .unwrap();
        let err = machine
            .begin(&spec(4), &deep_deficit(), None, 0.0, BTreeSet::new())
            .unwrap_err();
        assert_eq!(err, CommitmentError::AlreadyCommitted(ActionId(10)));
        assert!(err.severity().is_recoverable());
    }

    #[test]
    fn begin_rejects_non_multi_phase() {
        let mut machine = machine();
        let instant = ActionSpec::instant(ActionId(1), "flash", 40.0);
        let err = machine
            .begin(&instant, &deep_deficit(), None, 0.0, BTreeSet::new())
            .unwrap_err();
        assert_eq!(err, CommitmentError::NotMultiPhase(ActionId(1)));
        assert!(machine.is_idle());
    }

    #[test]
    fn pending_until_scene_confirms() {
        let mut machine = machine();
        machine
            .begin(&spec(4), &deep_deficit(), None, 0.0, BTreeSet::new())
            .unwrap();
        assert_eq!(machine.state(), CommitmentState::Pending);

        let none = BTreeSet::new();
        let mut waiting = observe(0.2, TargetStatus::Unbound, &none);
        waiting.action_active = false;
        assert_eq!(machine.advance(&waiting), None);
        assert_eq!(machine.state(), CommitmentState::Pending);

        let transition = machine.advance(&observe(0.3, TargetStatus::Unbound, &none));
        assert_eq!(transition, None);
        assert_eq!(
            machine.state(),
            CommitmentState::Committed {
                phase: 1,
                target_rank: 4
            }
        );
    }

    #[test]
    fn pending_timeout_aborts() {
        let mut machine = machine();
        machine
            .begin(&spec(4), &deep_deficit(), None, 0.0, BTreeSet::new())
            .unwrap();

        let none = BTreeSet::new();
        let mut waiting = observe(1.0, TargetStatus::Unbound, &none);
        waiting.action_active = false;
        assert_eq!(
            machine.advance(&waiting),
            Some(CommitmentTransition::Aborted {
                action: ActionId(10),
                reason: AbortReason::NeverStarted
            })
        );
        assert!(machine.is_idle());
    }

    #[test]
    fn projected_effect_follows_target_rank() {
        let mut profile = PhaseProfile::uniform(4, 1.0);
        profile.multipliers.extend([1.0, 1.5, 2.0, 2.5]);
        let channel = ActionSpec {
            magnitude: 40.0,
            ..ActionSpec::multi_phase(ActionId(10), "channel", profile)
        };

        let mut machine = machine();
        let rank = machine
            .begin(&channel, &deep_deficit(), None, 0.0, BTreeSet::new())
            .unwrap();
        assert_eq!(rank, 4);
        assert_eq!(machine.current().map(Commitment::projected_effect), Some(100.0));
    }

    #[test]
    fn releases_when_target_rank_reached() {
        let mut machine = machine();
        let rank = machine
            .begin(&spec(4), &deep_deficit(), None, 0.0, BTreeSet::new())
            .unwrap();
        assert_eq!(rank, 4);

        let none = BTreeSet::new();
        for now in [0.1, 1.0, 2.0, 2.9] {
            assert_eq!(machine.advance(&observe(now, TargetStatus::Unbound, &none)), None);
            assert_eq!(machine.current().map(Commitment::target_rank), Some(4));
        }

        let transition = machine.advance(&observe(3.0, TargetStatus::Unbound, &none));
        assert_eq!(
            transition,
            Some(CommitmentTransition::Released {
                action: ActionId(10),
                phase: 4,
                reason: ReleaseReason::RankReached
            })
        );
        assert!(machine.is_idle());
        assert_eq!(machine.last_transition(), transition);
    }

    #[test]
    fn phase_is_capped_at_max_rank() {
        let mut machine = machine();
        let ctx = RankContext {
            forced_rank: Some(4),
            ..RankContext::default()
        };
        machine.begin(&spec(4), &ctx, None, 0.0, BTreeSet::new()).unwrap();
        let none = BTreeSet::new();
        machine.advance(&observe(0.0, TargetStatus::Unbound, &none));
        let commitment = machine.current().cloned().unwrap();
        let late = Commitment {
            elapsed: 40.0,
            ..commitment
        };
        assert_eq!(late.current_phase(), 4);
    }

    #[test]
    fn new_emergency_releases_early() {
        let mut machine = machine();
        let baseline: BTreeSet<_> = [ActorId(2)].into_iter().collect();
        machine
            .begin(&spec(4), &deep_deficit(), Some(ActorId(1)), 0.0, baseline.clone())
            .unwrap();

        let alive = TargetStatus::Alive { fraction: 0.4 };
        assert_eq!(machine.advance(&observe(0.5, alive, &baseline)), None);

        let mut grown = baseline.clone();
        grown.insert(ActorId(5));
        assert_eq!(
            machine.advance(&observe(1.2, alive, &grown)),
            Some(CommitmentTransition::Released {
                action: ActionId(10),
                phase: 2,
                reason: ReleaseReason::NewEmergency(ActorId(5))
            })
        );
    }

    #[test]
    fn recovered_actor_falling_back_is_a_new_emergency() {
        let mut machine = machine();
        let baseline: BTreeSet<_> = [ActorId(2)].into_iter().collect();
        machine
            .begin(&spec(4), &deep_deficit(), Some(ActorId(1)), 0.0, baseline.clone())
            .unwrap();

        let alive = TargetStatus::Alive { fraction: 0.4 };
        let calm = BTreeSet::new();
        assert_eq!(machine.advance(&observe(0.5, alive, &calm)), None);
        assert_eq!(
            machine.advance(&observe(1.2, alive, &baseline)),
            Some(CommitmentTransition::Released {
                action: ActionId(10),
                phase: 2,
                reason: ReleaseReason::NewEmergency(ActorId(2))
            })
        );
    }

    #[test]
    fn target_death_and_recovery_release() {
        let none = BTreeSet::new();
        for (status, reason) in [
            (TargetStatus::Dead, ReleaseReason::TargetDied),
            (TargetStatus::Missing, ReleaseReason::TargetMissing),
            (
                TargetStatus::Alive { fraction: 0.97 },
                ReleaseReason::TargetRecovered,
            ),
        ] {
            let mut machine = machine();
            machine
                .begin(&spec(4), &deep_deficit(), Some(ActorId(1)), 0.0, BTreeSet::new())
                .unwrap();
            let transition = machine.advance(&observe(0.4, status, &none));
            assert_eq!(
                transition,
                Some(CommitmentTransition::Released {
                    action: ActionId(10),
                    phase: 1,
                    reason
                })
            );
        }
    }

    #[test]
    fn pending_commitment_ignores_release_triggers() {
        let mut machine = machine();
        machine
            .begin(&spec(4), &deep_deficit(), Some(ActorId(1)), 0.0, BTreeSet::new())
            .unwrap();
        let emergencies: BTreeSet<_> = [ActorId(3)].into_iter().collect();
        let mut waiting = observe(0.2, TargetStatus::Dead, &emergencies);
        waiting.action_active = false;
        assert_eq!(machine.advance(&waiting), None);
        assert_eq!(machine.state(), CommitmentState::Pending);
    }

    #[test]
    fn external_end_aborts() {
        let mut machine = machine();
        machine
            .begin(&spec(4), &deep_deficit(), None, 0.0, BTreeSet::new())
            .unwrap();
        let none = BTreeSet::new();
        machine.advance(&observe(0.1, TargetStatus::Unbound, &none));

        let mut ended = observe(0.6, TargetStatus::Unbound, &none);
        ended.action_active = false;
        assert_eq!(
            machine.advance(&ended),
            Some(CommitmentTransition::Aborted {
                action: ActionId(10),
                reason: AbortReason::ActionEnded
            })
        );
    }

    #[test]
    fn interrupt_abort_clears_commitment() {
        let mut machine = machine();
        machine
            .begin(&spec(3), &deep_deficit(), None, 0.0, BTreeSet::new())
            .unwrap();
        let transition = machine.abort(AbortReason::Interrupted);
        assert!(matches!(
            transition,
            Some(CommitmentTransition::Aborted {
                reason: AbortReason::Interrupted,
                ..
            })
        ));
        assert!(machine.is_idle());
        assert_eq!(machine.abort(AbortReason::Interrupted), None);
    }
}
