//! Action descriptors, rank strategies and the decisions a tick produces.
mod decision;
mod spec;
mod strategy;

pub use decision::Decision;
pub use spec::{ActionFamily, ActionId, ActionSpec, PhaseProfile, RankStrategyKind};
pub use strategy::{CountMatched, DeficitSteps, PhaseStrategy, RankContext, Urgency};
