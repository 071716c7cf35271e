//! Engine configuration constants and tunable thresholds.
//!
//! Every numeric threshold the engine uses is supplied here, grouped by the
//! component that consumes it. Defaults are the shipped tuning; hosts
//! typically load overrides through `sustain-content`'s `ConfigLoader`.

use crate::error::{ErrorSeverity, SustainError};
use crate::state::Role;

/// Top-level configuration for one [`crate::Controller`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SustainConfig {
    pub history: HistoryConfig,
    pub forecast: ForecastConfig,
    pub scoring: ScoringConfig,
    pub selection: SelectionConfig,
    pub commitment: CommitmentConfig,
    pub interrupt: InterruptConfig,
    pub path: PathConfig,
}

impl SustainConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of timed effects tracked per actor.
    pub const MAX_EFFECTS: usize = 16;
    /// Maximum escalation rank of a multi-phase action.
    pub const MAX_PHASES: usize = 5;
    /// Maximum number of deficit thresholds a rank strategy may carry.
    pub const MAX_THRESHOLDS: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }

    /// Checks cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.history.window > 0.0) {
            return Err(ConfigError::NonPositive("history.window"));
        }
        if self.history.ttl < self.history.window {
            return Err(ConfigError::TtlShorterThanWindow {
                ttl: self.history.ttl,
                window: self.history.window,
            });
        }
        if !(self.forecast.tick_period > 0.0) {
            return Err(ConfigError::NonPositive("forecast.tick_period"));
        }
        if self.forecast.horizon < 0.0 {
            return Err(ConfigError::Negative("forecast.horizon"));
        }
        for (name, value) in [
            ("forecast.critical_fraction", self.forecast.critical_fraction),
            ("scoring.doubling_fraction", self.scoring.doubling_fraction),
            ("selection.min_fraction", self.selection.min_fraction),
            ("commitment.release_fraction", self.commitment.release_fraction),
            ("interrupt.deficit_fraction", self.interrupt.deficit_fraction),
            ("path.tank_fraction", self.path.tank_fraction),
            ("path.opportunity_fraction", self.path.opportunity_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::FractionOutOfRange { name, value });
            }
        }
        let tiers = &self.path.tiers;
        if tiers.windows(2).any(|pair| pair[0].below > pair[1].below) {
            return Err(ConfigError::UnorderedTiers);
        }
        if self.path.headings == 0 {
            return Err(ConfigError::NonPositive("path.headings"));
        }
        if !(self.path.length_step > 0.0) {
            return Err(ConfigError::NonPositive("path.length_step"));
        }
        if self.path.min_length < 0.0 {
            return Err(ConfigError::Negative("path.min_length"));
        }
        if self.interrupt.latency < 0.0 {
            return Err(ConfigError::Negative("interrupt.latency"));
        }
        Ok(())
    }
}

/// History Tracker window sizes (seconds).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HistoryConfig {
    /// Samples older than `now - window` are trimmed.
    pub window: f32,
    /// Actors unseen for longer than this are evicted.
    pub ttl: f32,
}

impl HistoryConfig {
    pub const DEFAULT_WINDOW: f32 = 5.0;
    pub const DEFAULT_TTL: f32 = 10.0;
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window: Self::DEFAULT_WINDOW,
            ttl: Self::DEFAULT_TTL,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ForecastConfig {
    /// Default forecast horizon Δ in seconds.
    pub horizon: f32,
    /// Period at which timed effects tick.
    pub tick_period: f32,
    /// Predicted fraction below which an actor is critical.
    pub critical_fraction: f32,
}

impl ForecastConfig {
    pub const DEFAULT_HORIZON: f32 = 2.0;
    pub const DEFAULT_TICK_PERIOD: f32 = 1.0;
    pub const DEFAULT_CRITICAL_FRACTION: f32 = 0.30;
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: Self::DEFAULT_HORIZON,
            tick_period: Self::DEFAULT_TICK_PERIOD,
            critical_fraction: Self::DEFAULT_CRITICAL_FRACTION,
        }
    }
}

/// Weights of the priority score.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScoringConfig {
    pub deficit_weight: f32,
    pub incoming_weight: f32,
    pub hazard_bonus: f32,
    pub tank_multiplier: f32,
    pub support_multiplier: f32,
    pub self_multiplier: f32,
    pub other_multiplier: f32,
    /// Distance up to which no penalty applies.
    pub free_distance: f32,
    /// Penalty per unit of distance beyond `free_distance`.
    pub distance_slope: f32,
    /// Fraction at or below which the score is doubled.
    pub doubling_fraction: f32,
}

impl ScoringConfig {
    pub fn role_multiplier(&self, role: Role) -> f32 {
        match role {
            Role::Tank => self.tank_multiplier,
            Role::Support => self.support_multiplier,
            Role::Myself => self.self_multiplier,
            Role::Damage => self.other_multiplier,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            deficit_weight: 200.0,
            incoming_weight: 150.0,
            hazard_bonus: 30.0,
            tank_multiplier: 1.5,
            support_multiplier: 1.3,
            self_multiplier: 1.2,
            other_multiplier: 1.0,
            free_distance: 20.0,
            distance_slope: 2.0,
            doubling_fraction: 0.30,
        }
    }
}

/// Target filters applied by the controller when it asks the scorer for targets.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SelectionConfig {
    /// Actors at or above this fraction are not considered.
    pub min_fraction: f32,
    /// Fallback range when an action spec has none.
    pub max_range: f32,
    /// Number of targets considered for multi-phase rank decisions.
    pub top_k: usize,
    /// Forwarded to top-k selection; currently unused there.
    pub cluster_radius: f32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_fraction: 0.95,
            max_range: 40.0,
            top_k: 5,
            cluster_radius: 8.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CommitmentConfig {
    /// Bound target above this fraction releases the commitment early.
    pub release_fraction: f32,
    /// Time available below which a moving controller caps its rank.
    pub movement_time_threshold: f32,
    /// Rank cap applied while movement is required.
    pub movement_rank: u8,
    /// A pending commitment not reported in flight within this delay is aborted.
    pub confirm_timeout: f32,
}

impl Default for CommitmentConfig {
    fn default() -> Self {
        Self {
            release_fraction: 0.95,
            movement_time_threshold: 2.0,
            movement_rank: 2,
            confirm_timeout: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InterruptConfig {
    /// Projected effect / remaining need ratio considered wasteful.
    pub overheal_ratio: f32,
    /// Deficit (as a fraction of max health) that makes another actor needier.
    pub deficit_fraction: f32,
    /// Round-trip latency between decision and effect, in seconds.
    pub latency: f32,
    /// Scheduling tick of the host, in seconds.
    pub scheduling_tick: f32,
}

impl Default for InterruptConfig {
    fn default() -> Self {
        Self {
            overheal_ratio: 1.5,
            deficit_fraction: 0.5,
            latency: 0.1,
            scheduling_tick: 0.1,
        }
    }
}

/// Health-tier bonus applied to each actor covered by a candidate path.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierBonus {
    /// Applies when the covered actor's fraction is strictly below this value.
    pub below: f32,
    pub bonus: f32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PathConfig {
    pub headings: u16,
    pub min_length: f32,
    pub length_step: f32,
    /// Perpendicular distance within which an actor is covered.
    pub half_width: f32,
    pub min_coverage: usize,
    pub coverage_weight: f32,
    /// Ordered by ascending `below`; the first matching tier wins.
    pub tiers: Vec<TierBonus>,
    pub tank_fraction: f32,
    pub tank_bonus: f32,
    pub hazard_weight: f32,
    pub length_weight: f32,
    /// Clearance at which hazard proximity falls to zero.
    pub hazard_margin: f32,
    /// Hazards activating later than this are ignored.
    pub hazard_lookahead: f32,
    /// Actors below this fraction count toward a path opportunity.
    pub opportunity_fraction: f32,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            headings: 16,
            min_length: 5.0,
            length_step: 5.0,
            half_width: 3.0,
            min_coverage: 3,
            coverage_weight: 100.0,
            tiers: vec![
                TierBonus {
                    below: 0.30,
                    bonus: 50.0,
                },
                TierBonus {
                    below: 0.50,
                    bonus: 30.0,
                },
                TierBonus {
                    below: 0.70,
                    bonus: 15.0,
                },
            ],
            tank_fraction: 0.60,
            tank_bonus: 20.0,
            hazard_weight: 50.0,
            length_weight: 0.5,
            hazard_margin: 5.0,
            hazard_lookahead: 3.0,
            opportunity_fraction: 0.90,
        }
    }
}

/// Configuration validation failures.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be positive")]
    NonPositive(&'static str),

    #[error("{0} must not be negative")]
    Negative(&'static str),

    #[error("{name} = {value} is outside [0, 1]")]
    FractionOutOfRange { name: &'static str, value: f32 },

    #[error("history ttl {ttl} is shorter than the sample window {window}")]
    TtlShorterThanWindow { ttl: f32, window: f32 },

    #[error("path tiers must be ordered by ascending threshold")]
    UnorderedTiers,
}

impl SustainError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositive(_) => "CONFIG_NON_POSITIVE",
            Self::Negative(_) => "CONFIG_NEGATIVE",
            Self::FractionOutOfRange { .. } => "CONFIG_FRACTION_OUT_OF_RANGE",
            Self::TtlShorterThanWindow { .. } => "CONFIG_TTL_SHORTER_THAN_WINDOW",
            Self::UnorderedTiers => "CONFIG_UNORDERED_TIERS",
        }
    }
}
