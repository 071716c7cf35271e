//! Per-tick decision engine for an autonomous support controller.
//!
//! `sustain-core` forecasts actor health from observed damage history, scores
//! actors by urgency, and picks at most one sustain action per tick: an
//! instant heal, a multi-phase channel with a rank fixed at commitment, or a
//! positional path through the group. All mutable state is owned by
//! [`controller::Controller`]; world and catalog data arrive through the
//! oracle traits in [`env`].
pub mod action;
pub mod commitment;
pub mod config;
pub mod controller;
pub mod env;
pub mod error;
pub mod forecast;
pub mod history;
pub mod interrupt;
pub mod path;
pub mod scoring;
pub mod state;

pub use action::{
    ActionFamily, ActionId, ActionSpec, CountMatched, Decision, DeficitSteps, PhaseProfile,
    PhaseStrategy, RankContext, RankStrategyKind, Urgency,
};
pub use commitment::{
    AbortReason, Commitment, CommitmentError, CommitmentMachine, CommitmentObservation,
    CommitmentState, CommitmentTransition, ReleaseReason, TargetStatus, decide_rank,
};
pub use config::{
    CommitmentConfig, ConfigError, ForecastConfig, HistoryConfig, InterruptConfig, PathConfig,
    ScoringConfig, SelectionConfig, SustainConfig, TierBonus,
};
pub use controller::Controller;
pub use env::{
    CatalogOracle, Env, HazardRegion, Occluder, OracleError, SceneOracle, SceneSnapshot,
    SustainEnv,
};
pub use error::{ErrorSeverity, SustainError};
pub use forecast::{EffectEstimate, Forecast, ForecastModel};
pub use history::{HealthSample, HistoryTracker};
pub use interrupt::{InterruptPolicy, InterruptReason, InterruptVerdict};
pub use path::{CandidatePath, Coverage, PathSearch};
pub use scoring::{Priority, PriorityScorer, ScoredActor};
pub use state::{
    Actor, ActorEffects, ActorId, EffectId, HazardFlags, InFlightAction, ResourceGauge, Role,
    Seconds, TickSnapshot, TimedEffect,
};
