//! Decisions produced by a controller tick.

use glam::Vec3;

use crate::action::ActionId;
use crate::state::ActorId;

/// The single decision a tick hands back to the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Decision {
    /// Begin a single-target action.
    StartInstant { action: ActionId, target: ActorId },

    /// Begin channeling a multi-phase action and release it at `rank`.
    StartMultiPhase {
        action: ActionId,
        target: Option<ActorId>,
        rank: u8,
    },

    /// Release the channeled action now.
    ReleaseCurrent,

    /// Cancel whatever is executing.
    AbortCurrent,

    /// Begin a positional action toward `terminal`.
    StartPath { action: ActionId, terminal: Vec3 },

    #[default]
    NoAction,
}

impl Decision {
    pub fn is_action(&self) -> bool {
        !matches!(self, Self::NoAction)
    }

    /// Action started by this decision, if any.
    pub fn started_action(&self) -> Option<ActionId> {
        match self {
            Self::StartInstant { action, .. }
            | Self::StartMultiPhase { action, .. }
            | Self::StartPath { action, .. } => Some(*action),
            Self::ReleaseCurrent | Self::AbortCurrent | Self::NoAction => None,
        }
    }
}
