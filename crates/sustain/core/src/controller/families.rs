//! Candidate evaluation per action family.

use std::collections::BTreeSet;

use crate::action::{ActionFamily, ActionSpec, Decision, RankContext, RankStrategyKind, Urgency};
use crate::commitment::CommitmentMachine;
use crate::config::SustainConfig;
use crate::env::{CatalogOracle, Env, SceneOracle};
use crate::error::SustainError;
use crate::path::PathSearch;
use crate::scoring::PriorityScorer;
use crate::state::{ActorId, TickSnapshot};

/// Walks the snapshot's candidate actions in order; the first accepted
/// candidate becomes the decision.
pub(super) fn choose<S, C>(
    config: &SustainConfig,
    commitment: &mut CommitmentMachine,
    snapshot: &TickSnapshot<'_>,
    env: &Env<'_, S, C>,
    scene: &S,
    scorer: &PriorityScorer<'_, S>,
    emergencies: &BTreeSet<ActorId>,
) -> Decision
where
    S: SceneOracle + ?Sized,
    C: CatalogOracle + ?Sized,
{
    for &id in snapshot.options {
        let spec = match env.action(id) {
            Ok(spec) => spec,
            Err(err) => {
                tracing::warn!("Controller: skipping {}: {} [{}]", id, err, err.error_code());
                continue;
            }
        };
        if !affordable(spec, snapshot) {
            tracing::trace!("Controller: {} unaffordable", id);
            continue;
        }

        let decision = match spec.family {
            ActionFamily::Instant => instant(config, spec, snapshot, scorer),
            ActionFamily::MultiPhase => {
                multi_phase(config, commitment, spec, snapshot, scorer, emergencies)
            }
            ActionFamily::Positional => positional(config, spec, snapshot, scene),
        };
        if decision.is_action() {
            return decision;
        }
    }
    Decision::NoAction
}

/// Primary cost against the snapshot's mana; gauge cost against the gauge
/// once the cast completes.
fn affordable(spec: &ActionSpec, snapshot: &TickSnapshot<'_>) -> bool {
    let mana = spec.cost <= 0.0 || snapshot.mana >= spec.cost;
    mana && snapshot.gauge.can_afford(spec.gauge_cost, spec.cast_time)
}

fn range(config: &SustainConfig, spec: &ActionSpec) -> f32 {
    if spec.range > 0.0 {
        spec.range
    } else {
        config.selection.max_range
    }
}

fn instant<S: SceneOracle + ?Sized>(
    config: &SustainConfig,
    spec: &ActionSpec,
    snapshot: &TickSnapshot<'_>,
    scorer: &PriorityScorer<'_, S>,
) -> Decision {
    scorer
        .best(snapshot.actors, config.selection.min_fraction, range(config, spec))
        .map_or(Decision::NoAction, |best| Decision::StartInstant {
            action: spec.id,
            target: best.id(),
        })
}

fn multi_phase<S: SceneOracle + ?Sized>(
    config: &SustainConfig,
    commitment: &mut CommitmentMachine,
    spec: &ActionSpec,
    snapshot: &TickSnapshot<'_>,
    scorer: &PriorityScorer<'_, S>,
    emergencies: &BTreeSet<ActorId>,
) -> Decision {
    let selection = &config.selection;
    let targets = scorer.top_k(
        snapshot.actors,
        selection.top_k,
        selection.min_fraction,
        selection.cluster_radius,
    );
    let Some(first) = targets.first() else {
        return Decision::NoAction;
    };

    let urgency = if targets.iter().any(|t| emergencies.contains(&t.id())) {
        Urgency::Emergency
    } else if targets.iter().any(|t| t.priority.doubled) {
        Urgency::Elevated
    } else {
        Urgency::Normal
    };
    let avg_deficit = targets
        .iter()
        .map(|t| (1.0 - t.actor.health_fraction()) * 100.0)
        .sum::<f32>()
        / targets.len() as f32;
    let ctx = RankContext {
        urgency,
        target_count: targets.len(),
        avg_deficit,
        time_available: snapshot.time_available,
        movement_required: snapshot.movement_required,
        forced_rank: snapshot.forced_rank,
    };

    // Spread actions heal the group; only single-target channels bind a target.
    let target = match spec.phases.as_ref().map(|profile| &profile.strategy) {
        Some(RankStrategyKind::CountMatched) => None,
        _ => Some(first.id()),
    };

    match commitment.begin(spec, &ctx, target, snapshot.now, emergencies.clone()) {
        Ok(rank) => Decision::StartMultiPhase {
            action: spec.id,
            target,
            rank,
        },
        Err(err) => {
            tracing::warn!(
                "Controller: commitment for {} refused: {} [{}]",
                spec.id,
                err,
                err.error_code()
            );
            Decision::NoAction
        }
    }
}

fn positional<S: SceneOracle + ?Sized>(
    config: &SustainConfig,
    spec: &ActionSpec,
    snapshot: &TickSnapshot<'_>,
    scene: &S,
) -> Decision {
    let search =
        PathSearch::new(&config.path, scene, snapshot.actors).excluding(snapshot.controller);
    if !search.opportunity(snapshot.position, spec.max_length) {
        return Decision::NoAction;
    }
    search
        .find_best_path(snapshot.position, spec.max_length)
        .map_or(Decision::NoAction, |path| Decision::StartPath {
            action: spec.id,
            terminal: path.terminal,
        })
}
