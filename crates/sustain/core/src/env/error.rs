//! Oracle access errors.

use crate::action::ActionId;
use crate::error::{ErrorSeverity, SustainError};

/// Errors that occur when accessing oracle data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// SceneOracle is not available in the environment.
    #[error("SceneOracle not available")]
    SceneNotAvailable,

    /// CatalogOracle is not available in the environment.
    #[error("CatalogOracle not available")]
    CatalogNotAvailable,

    /// The catalog has no descriptor for the requested action.
    #[error("action {0} not found in catalog")]
    ActionNotFound(ActionId),
}

impl SustainError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            SceneNotAvailable | CatalogNotAvailable => ErrorSeverity::Fatal,
            ActionNotFound(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            SceneNotAvailable => "ORACLE_SCENE_NOT_AVAILABLE",
            CatalogNotAvailable => "ORACLE_CATALOG_NOT_AVAILABLE",
            ActionNotFound(_) => "ORACLE_ACTION_NOT_FOUND",
        }
    }
}
