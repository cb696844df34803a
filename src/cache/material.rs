//! Material binding cache.
//!
//! A node's bound material is the nearest binding authored on it or an
//! ancestor. Bindings are relationships and carry no time samples, but the
//! cache is still stamped with the delegate's time so all three shared
//! caches invalidate together.

use crate::core::{SceneNode, ScenePath, TimeCode};

use super::store::{CacheStats, TimedStore};

/// Auxiliary data for binding resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialBindingData {
    /// Binding purpose (`""` for all-purpose, `"preview"`, `"full"`, ...).
    pub purpose: String,
}

impl MaterialBindingData {
    pub fn with_purpose(purpose: impl Into<String>) -> Self {
        Self { purpose: purpose.into() }
    }
}

pub struct MaterialBindingCache {
    values: TimedStore<ScenePath>,
    data: MaterialBindingData,
}

impl MaterialBindingCache {
    pub fn new(time: TimeCode, data: MaterialBindingData) -> Self {
        Self { values: TimedStore::new(time), data }
    }

    #[inline]
    pub fn time(&self) -> TimeCode {
        self.values.time()
    }

    pub fn set_time(&mut self, time: TimeCode) -> bool {
        self.values.set_time(time)
    }

    pub fn binding_data(&self) -> &MaterialBindingData {
        &self.data
    }

    pub fn set_binding_data(&mut self, data: MaterialBindingData) {
        self.data = data;
        self.values.clear();
    }

    /// Bound material of `node`, or the empty path.
    pub fn value(&self, node: &dyn SceneNode) -> ScenePath {
        if let Some(v) = self.values.get(node.path()) {
            return v;
        }
        let v = self.compute_inherited(node);
        self.values.get_or_insert(node.path(), v)
    }

    pub fn stats(&self) -> CacheStats {
        self.values.stats()
    }

    fn compute_inherited(&self, node: &dyn SceneNode) -> ScenePath {
        if node.is_root() {
            return ScenePath::empty();
        }
        if let Some(material) = node.direct_material_binding(&self.data.purpose) {
            return material;
        }
        node.parent()
            .map(|p| self.value(p.as_ref()))
            .unwrap_or_default()
    }
}

/// Direct (uncached) material binding of `node`.
pub fn compute_material_path(node: &dyn SceneNode, data: &MaterialBindingData) -> ScenePath {
    if let Some(material) = node.direct_material_binding(&data.purpose) {
        return material;
    }
    let mut current = node.parent();
    while let Some(p) = current {
        if p.is_root() {
            break;
        }
        if let Some(material) = p.direct_material_binding(&data.purpose) {
            return material;
        }
        current = p.parent();
    }
    ScenePath::empty()
}
