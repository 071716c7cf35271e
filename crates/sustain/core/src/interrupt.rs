//! Reconsiders a simple in-flight action as forecasts change.
//!
//! An action is aborted when it would mostly overheal its target while someone
//! else is badly hurt, or when an actor outside the action has just entered an
//! emergency. Actions about to land are never aborted: the abort could not
//! reach the host before the effect does.

use std::collections::BTreeSet;

use crate::config::InterruptConfig;
use crate::env::SceneOracle;
use crate::scoring::PriorityScorer;
use crate::state::{Actor, ActorId, InFlightAction, Seconds};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InterruptReason {
    /// The projected effect exceeds the target's need while `needier` waits.
    Overheal {
        projected: f32,
        need: f32,
        needier: ActorId,
    },
    /// An actor not targeted by the action entered an emergency.
    NewEmergency(ActorId),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum InterruptVerdict {
    #[default]
    Continue,
    Abort(InterruptReason),
}

impl InterruptVerdict {
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Abort(_))
    }
}

#[derive(Clone, Debug)]
pub struct InterruptPolicy {
    config: InterruptConfig,
}

impl InterruptPolicy {
    pub fn new(config: &InterruptConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Remaining time under which an action is left to land.
    pub fn guard_window(&self) -> Seconds {
        self.config.scheduling_tick + self.config.latency
    }

    /// Decides whether `in_flight` should be aborted.
    ///
    /// `projected` is the effect the action will deliver on its target and
    /// `baseline` the emergencies already known when the action was first
    /// seen in flight.
    pub fn should_abort<S: SceneOracle + ?Sized>(
        &self,
        in_flight: &InFlightAction,
        projected: f32,
        actors: &[Actor],
        scorer: &PriorityScorer<'_, S>,
        baseline: &BTreeSet<ActorId>,
    ) -> InterruptVerdict {
        if in_flight.remaining < self.guard_window() {
            return InterruptVerdict::Continue;
        }

        let forecaster = scorer.forecaster();
        let target = in_flight.target;
        let others = || {
            actors
                .iter()
                .filter(move |actor| actor.alive && Some(actor.id) != target)
        };

        if let Some(emergency) = others()
            .filter(|actor| !baseline.contains(&actor.id))
            .find(|actor| forecaster.forecast(actor).is_emergency())
        {
            return self.abort(in_flight, InterruptReason::NewEmergency(emergency.id));
        }

        let Some(bound) = target.and_then(|id| actors.iter().find(|actor| actor.id == id)) else {
            return InterruptVerdict::Continue;
        };
        if !bound.alive {
            return InterruptVerdict::Continue;
        }
        let need = forecaster.forecast(bound).deficit();
        if projected <= self.config.overheal_ratio * need {
            return InterruptVerdict::Continue;
        }

        let needier = others()
            .filter(|actor| {
                let deficit = forecaster.forecast(actor).deficit();
                deficit > self.config.deficit_fraction * actor.max_health
            })
            .map(|actor| (actor.id, scorer.score(actor).value()))
            .max_by(|(a_id, a), (b_id, b)| a.total_cmp(b).then_with(|| b_id.cmp(a_id)));

        match needier {
            Some((needier, _)) => self.abort(
                in_flight,
                InterruptReason::Overheal {
                    projected,
                    need,
                    needier,
                },
            ),
            None => InterruptVerdict::Continue,
        }
    }

    fn abort(&self, in_flight: &InFlightAction, reason: InterruptReason) -> InterruptVerdict {
        tracing::debug!(
            "InterruptPolicy: abort {} (target {:?}, {:.2}s left): {:?}",
            in_flight.action,
            in_flight.target,
            in_flight.remaining,
            reason
        );
        InterruptVerdict::Abort(reason)
    }
}
