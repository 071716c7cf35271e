//! Action catalog loader.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sustain_core::{ActionFamily, ActionId, ActionSpec, CatalogOracle};

use crate::loaders::{LoadResult, read_file};

/// Action catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub actions: Vec<ActionSpec>,
}

/// In-memory action catalog keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionCatalog {
    actions: BTreeMap<ActionId, ActionSpec>,
}

impl ActionCatalog {
    /// Builds a catalog, rejecting duplicate ids and incomplete descriptors.
    pub fn from_specs(specs: impl IntoIterator<Item = ActionSpec>) -> LoadResult<Self> {
        let mut actions = BTreeMap::new();
        for spec in specs {
            Self::check(&spec)?;
            let id = spec.id;
            if actions.insert(id, spec).is_some() {
                anyhow::bail!("Duplicate action {} in catalog", id);
            }
        }
        Ok(Self { actions })
    }

    fn check(spec: &ActionSpec) -> LoadResult<()> {
        match spec.family {
            ActionFamily::MultiPhase => {
                let Some(phases) = &spec.phases else {
                    anyhow::bail!("{} ({}) is multi-phase but has no phase table", spec.id, spec.name);
                };
                if phases.durations.is_empty() {
                    anyhow::bail!("{} ({}) has an empty phase table", spec.id, spec.name);
                }
                if phases.durations.iter().any(|d| *d <= 0.0) {
                    anyhow::bail!("{} ({}) has a non-positive phase duration", spec.id, spec.name);
                }
            }
            ActionFamily::Positional if !(spec.max_length > 0.0) => {
                anyhow::bail!("{} ({}) is positional but has no max_length", spec.id, spec.name);
            }
            ActionFamily::Positional if !spec.max_length.is_finite() => {
                anyhow::bail!("{} ({}) has an unbounded max_length", spec.id, spec.name);
            }
            _ => {}
        }
        Ok(())
    }

    pub fn get(&self, id: ActionId) -> Option<&ActionSpec> {
        self.actions.get(&id)
    }

    /// Actions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionSpec> + '_ {
        self.actions.values()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl CatalogOracle for ActionCatalog {
    fn action(&self, id: ActionId) -> Option<&ActionSpec> {
        self.get(id)
    }
}

/// Loader for action catalogs from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load an action catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<ActionCatalog> {
        let content = read_file(path)?;
        let catalog = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        tracing::debug!(
            "CatalogLoader: loaded {} actions from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse catalog RON.
    pub fn parse(content: &str) -> LoadResult<ActionCatalog> {
        let file: CatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse action catalog RON: {}", e))?;
        ActionCatalog::from_specs(file.actions)
    }
}
