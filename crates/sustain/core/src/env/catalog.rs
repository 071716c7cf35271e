//! Action catalog oracle.

use crate::action::{ActionId, ActionSpec};

/// Provides static action descriptors by id.
pub trait CatalogOracle {
    fn action(&self, id: ActionId) -> Option<&ActionSpec>;
}

/// Linear lookup over a slice, for small fixed catalogs and tests.
impl CatalogOracle for [ActionSpec] {
    fn action(&self, id: ActionId) -> Option<&ActionSpec> {
        self.iter().find(|spec| spec.id == id)
    }
}

impl CatalogOracle for Vec<ActionSpec> {
    fn action(&self, id: ActionId) -> Option<&ActionSpec> {
        self.as_slice().action(id)
    }
}
