//! Per-tick observable state.
//!
//! Everything in this module is refreshed by the host every tick. The engine
//! never mutates it; its own bookkeeping lives in [`crate::history`] and
//! [`crate::commitment`].
mod actor;
mod common;
mod resource;
mod snapshot;

pub use actor::{Actor, ActorEffects, EffectId, HazardFlags, Role, TimedEffect};
pub use common::{ActorId, Seconds};
pub use resource::ResourceGauge;
pub use snapshot::{InFlightAction, TickSnapshot};
