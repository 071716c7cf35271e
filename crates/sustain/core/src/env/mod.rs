//! Traits describing the read-only collaborators of the engine.
//!
//! The scene oracle answers world queries (damage intake, line of sight,
//! hazards); the catalog oracle provides static action descriptors. The
//! [`Env`] aggregate bundles them so the controller can reach everything it
//! needs without coupling to concrete implementations.
mod catalog;
mod error;
mod scene;
mod snapshot;

pub use catalog::CatalogOracle;
pub use error::OracleError;
pub use scene::{HazardRegion, SceneOracle};
pub use snapshot::{Occluder, SceneSnapshot};

use crate::action::{ActionId, ActionSpec};

/// Aggregates the oracles a controller tick reads from.
pub struct Env<'a, S, C>
where
    S: SceneOracle + ?Sized,
    C: CatalogOracle + ?Sized,
{
    scene: Option<&'a S>,
    catalog: Option<&'a C>,
}

impl<S, C> Clone for Env<'_, S, C>
where
    S: SceneOracle + ?Sized,
    C: CatalogOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, C> Copy for Env<'_, S, C>
where
    S: SceneOracle + ?Sized,
    C: CatalogOracle + ?Sized,
{
}

pub type SustainEnv<'a> = Env<'a, dyn SceneOracle + 'a, dyn CatalogOracle + 'a>;

impl<'a, S, C> Env<'a, S, C>
where
    S: SceneOracle + ?Sized,
    C: CatalogOracle + ?Sized,
{
    pub fn new(scene: Option<&'a S>, catalog: Option<&'a C>) -> Self {
        Self { scene, catalog }
    }

    pub fn with_all(scene: &'a S, catalog: &'a C) -> Self {
        Self::new(Some(scene), Some(catalog))
    }

    pub fn empty() -> Self {
        Self {
            scene: None,
            catalog: None,
        }
    }

    /// Returns the SceneOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::SceneNotAvailable` if no scene oracle was provided.
    pub fn scene(&self) -> Result<&'a S, OracleError> {
        self.scene.ok_or(OracleError::SceneNotAvailable)
    }

    /// Returns the CatalogOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::CatalogNotAvailable` if no catalog oracle was provided.
    pub fn catalog(&self) -> Result<&'a C, OracleError> {
        self.catalog.ok_or(OracleError::CatalogNotAvailable)
    }

    /// Looks up an action descriptor.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::CatalogNotAvailable` without a catalog and
    /// `OracleError::ActionNotFound` for unknown ids.
    pub fn action(&self, id: ActionId) -> Result<&'a ActionSpec, OracleError> {
        self.catalog()?
            .action(id)
            .ok_or(OracleError::ActionNotFound(id))
    }
}

impl<'a, S, C> Env<'a, S, C>
where
    S: SceneOracle + 'a,
    C: CatalogOracle + 'a,
{
    /// Converts this environment into a trait-object based `SustainEnv`.
    pub fn into_sustain_env(self) -> SustainEnv<'a> {
        let scene: Option<&'a dyn SceneOracle> = self.scene.map(|scene| scene as _);
        let catalog: Option<&'a dyn CatalogOracle> = self.catalog.map(|catalog| catalog as _);
        Env::new(scene, catalog)
    }
}
