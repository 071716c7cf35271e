//! Per-tick decision pipeline.
//!
//! The [`Controller`] owns every piece of mutable engine state (health
//! history, the single commitment, the in-flight emergency baseline) and
//! turns one [`TickSnapshot`] into at most one [`Decision`]:
//!
//! 1. record live actors into the history and evict stale ones
//! 2. monitor the commitment, if any
//! 3. otherwise review a simple in-flight action for abort
//! 4. otherwise walk the caller's candidate actions in order; the first
//!    family that accepts produces the decision
//!
//! `tick` never fails. Missing oracles, unknown actions and refused
//! commitments are logged and the affected candidate is skipped.

mod families;

use std::collections::BTreeSet;

use crate::action::{ActionId, Decision};
use crate::commitment::{
    CommitmentMachine, CommitmentObservation, CommitmentTransition, TargetStatus,
};
use crate::config::{ConfigError, SustainConfig};
use crate::env::{CatalogOracle, Env, SceneOracle};
use crate::error::SustainError;
use crate::forecast::ForecastModel;
use crate::history::HistoryTracker;
use crate::interrupt::{InterruptPolicy, InterruptVerdict};
use crate::scoring::PriorityScorer;
use crate::state::{ActorId, TickSnapshot};

/// Emergencies recorded when a simple in-flight action was first seen.
#[derive(Clone, Debug, PartialEq)]
struct InFlightBaseline {
    action: ActionId,
    target: Option<ActorId>,
    emergencies: BTreeSet<ActorId>,
}

/// Autonomous support controller.
///
/// Each instance owns independent state; controllers never share anything.
#[derive(Clone, Debug)]
pub struct Controller {
    config: SustainConfig,
    history: HistoryTracker,
    commitment: CommitmentMachine,
    interrupt: InterruptPolicy,
    baseline: Option<InFlightBaseline>,
    /// Channel released by this controller that the scene may still report.
    releasing: Option<ActionId>,
    last_decision: Decision,
}

impl Controller {
    pub fn new(config: SustainConfig) -> Self {
        Self {
            history: HistoryTracker::new(&config.history),
            commitment: CommitmentMachine::new(&config.commitment),
            interrupt: InterruptPolicy::new(&config.interrupt),
            config,
            baseline: None,
            releasing: None,
            last_decision: Decision::NoAction,
        }
    }

    /// Validates `config` before building the controller.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn try_new(config: SustainConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &SustainConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryTracker {
        &self.history
    }

    pub fn commitment(&self) -> &CommitmentMachine {
        &self.commitment
    }

    pub fn last_decision(&self) -> Decision {
        self.last_decision
    }

    /// Runs one tick and returns the decision for the host to apply.
    pub fn tick<S, C>(&mut self, snapshot: &TickSnapshot<'_>, env: &Env<'_, S, C>) -> Decision
    where
        S: SceneOracle + ?Sized,
        C: CatalogOracle + ?Sized,
    {
        let now = snapshot.now;
        for actor in snapshot.live_actors() {
            self.history.record(actor, now);
        }
        self.history.evict_stale(now);

        if self
            .releasing
            .is_some_and(|action| snapshot.in_flight.is_none_or(|f| f.action != action))
        {
            self.releasing = None;
        }

        let scene = match env.scene() {
            Ok(scene) => scene,
            Err(err) => {
                tracing::warn!("Controller: tick skipped: {} [{}]", err, err.error_code());
                return self.settle(Decision::NoAction);
            }
        };

        let model = ForecastModel::new(&self.config.forecast, &self.history, scene);
        let scorer = PriorityScorer::new(&self.config.scoring, &model, snapshot.position);
        let emergencies = model.emergencies(snapshot.actors);

        let decision = if !self.commitment.is_idle() {
            self.baseline = None;
            match monitor_commitment(&mut self.commitment, snapshot, &emergencies) {
                Some(CommitmentTransition::Released { action, .. }) => {
                    self.releasing = Some(action);
                    Decision::ReleaseCurrent
                }
                _ => Decision::NoAction,
            }
        } else if let Some(in_flight) = snapshot.in_flight {
            if self.releasing == Some(in_flight.action) {
                Decision::NoAction
            } else {
                let baseline = match self.baseline.take() {
                    Some(mut known)
                        if known.action == in_flight.action && known.target == in_flight.target =>
                    {
                        known.emergencies.retain(|actor| emergencies.contains(actor));
                        known
                    }
                    _ => InFlightBaseline {
                        action: in_flight.action,
                        target: in_flight.target,
                        emergencies: emergencies.clone(),
                    },
                };
                // Actions reviewed here run without a commitment, at rank 1.
                let projected = match env.action(in_flight.action) {
                    Ok(spec) => spec.projected_effect(1),
                    Err(err) => {
                        tracing::warn!(
                            "Controller: no descriptor for in-flight {}: {} [{}]",
                            in_flight.action,
                            err,
                            err.error_code()
                        );
                        0.0
                    }
                };
                let verdict = self.interrupt.should_abort(
                    &in_flight,
                    projected,
                    snapshot.actors,
                    &scorer,
                    &baseline.emergencies,
                );
                match verdict {
                    InterruptVerdict::Abort(_) => Decision::AbortCurrent,
                    InterruptVerdict::Continue => {
                        self.baseline = Some(baseline);
                        Decision::NoAction
                    }
                }
            }
        } else {
            self.baseline = None;
            families::choose(
                &self.config,
                &mut self.commitment,
                snapshot,
                env,
                scene,
                &scorer,
                &emergencies,
            )
        };

        self.settle(decision)
    }

    fn settle(&mut self, decision: Decision) -> Decision {
        if decision.is_action() {
            tracing::debug!("Controller: decision {:?}", decision);
        }
        self.last_decision = decision;
        decision
    }
}

fn monitor_commitment(
    machine: &mut CommitmentMachine,
    snapshot: &TickSnapshot<'_>,
    emergencies: &BTreeSet<ActorId>,
) -> Option<CommitmentTransition> {
    let commitment = machine.current()?;
    let action = commitment.action;
    let target = match commitment.target {
        None => TargetStatus::Unbound,
        Some(id) => match snapshot.actor(id) {
            None => TargetStatus::Missing,
            Some(actor) if !actor.alive => TargetStatus::Dead,
            Some(actor) => TargetStatus::Alive {
                fraction: actor.health_fraction(),
            },
        },
    };
    let observation = CommitmentObservation {
        now: snapshot.now,
        action_active: snapshot
            .in_flight
            .is_some_and(|in_flight| in_flight.action == action),
        target,
        emergencies,
    };
    machine.advance(&observation)
}
