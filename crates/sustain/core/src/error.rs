//! Common error infrastructure for sustain-core.
//!
//! The engine itself is total: every per-tick computation has a defined result
//! for degenerate input. Errors only surface at the edges, when a configuration
//! is malformed, an oracle is missing, or a caller drives the commitment machine
//! out of order. Domain-specific errors live next to the code that raises them
//! ([`crate::config::ConfigError`], [`crate::env::OracleError`],
//! [`crate::commitment::CommitmentError`]) and all implement [`SustainError`].

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Transient condition; the next tick recomputes from fresh state.
    ///
    /// Examples: commitment requested while another is in flight
    Recoverable,

    /// Invalid input that will keep failing until the caller changes it.
    ///
    /// Examples: unknown action id, non-positive tick period
    Validation,

    /// Unexpected state inconsistency. Indicates a bug in the host.
    Internal,

    /// The controller cannot run at all.
    ///
    /// Examples: required oracle not provided
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all sustain-core errors.
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait SustainError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
