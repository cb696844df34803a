//! Shared, time-indexed caches for transforms, visibility and material
//! bindings.
//!
//! All three caches are stamped with the same evaluation time. Usage is two
//! phase:
//!
//! 1. exclusive: [`SharedCaches::set_time`] (needs `&mut`) invalidates
//!    everything when the time changes;
//! 2. shared: any number of threads query through `&self`, and values are
//!    computed lazily and stay fixed until the next stamp.
//!
//! ```ignore
//! let mut caches = SharedCaches::new(Config::from_env());
//! caches.set_time(TimeCode::new(24.0));
//! caches.prefetch(&nodes);
//! let world = caches.xform().value(node.as_ref());
//! ```

mod material;
mod store;
mod visibility;
mod xform;

pub use material::{compute_material_path, MaterialBindingCache, MaterialBindingData};
pub use store::{CacheStats, TimedStore};
pub use visibility::{compute_visibility, VisCache};
pub use xform::{compute_transform, XformCache, XformQuery};

use rayon::prelude::*;

use crate::config::Config;
use crate::core::{NodeRef, TimeCode};

/// The delegate-owned set of caches plus the config that toggles them.
pub struct SharedCaches {
    config: Config,
    xform: XformCache,
    vis: VisCache,
    material: MaterialBindingCache,
}

impl SharedCaches {
    pub fn new(config: Config) -> Self {
        Self::with_binding_data(config, MaterialBindingData::default())
    }

    pub fn with_binding_data(config: Config, data: MaterialBindingData) -> Self {
        let time = TimeCode::Default;
        Self {
            config,
            xform: XformCache::new(time),
            vis: VisCache::new(time),
            material: MaterialBindingCache::new(time, data),
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The time all three caches are stamped with.
    #[inline]
    pub fn time(&self) -> TimeCode {
        self.xform.time()
    }

    /// Stamp a new evaluation time on every cache.
    ///
    /// Returns true if the time changed, in which case no value from the
    /// previous epoch survives.
    pub fn set_time(&mut self, time: TimeCode) -> bool {
        let changed = self.xform.set_time(time);
        self.vis.set_time(time);
        self.material.set_time(time);
        if changed {
            tracing::debug!(%time, "shared caches invalidated");
        }
        changed
    }

    pub fn xform(&self) -> &XformCache {
        &self.xform
    }

    pub fn xform_mut(&mut self) -> &mut XformCache {
        &mut self.xform
    }

    pub fn vis(&self) -> &VisCache {
        &self.vis
    }

    pub fn material(&self) -> &MaterialBindingCache {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut MaterialBindingCache {
        &mut self.material
    }

    /// Warm every enabled cache for `nodes` in parallel.
    #[tracing::instrument(skip_all, fields(nodes = nodes.len(), time = %self.time()))]
    pub fn prefetch(&self, nodes: &[NodeRef]) {
        let config = self.config;
        nodes.par_iter().for_each(|node| {
            let node = node.as_ref();
            if config.enable_xform_cache {
                self.xform.value(node);
            }
            if config.enable_vis_cache {
                self.vis.value(node);
            }
            if config.enable_binding_cache {
                self.material.value(node);
            }
        });
    }
}

impl Default for SharedCaches {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SceneStage, ScenePath};
    use crate::memory::MemoryStage;

    #[test]
    fn test_set_time_stamps_all() {
        let mut caches = SharedCaches::default();
        assert_eq!(caches.time(), TimeCode::Default);

        assert!(caches.set_time(TimeCode::new(3.0)));
        assert!(!caches.set_time(TimeCode::new(3.0)));
        assert_eq!(caches.xform().time(), TimeCode::new(3.0));
        assert_eq!(caches.vis().time(), TimeCode::new(3.0));
        assert_eq!(caches.material().time(), TimeCode::new(3.0));
    }

    #[test]
    fn test_prefetch_respects_toggles() {
        let stage = MemoryStage::new();
        let nodes: Vec<NodeRef> = (0..8)
            .map(|i| {
                let path = stage.define(&format!("/World/n{i}")).unwrap();
                stage.node_at_path(&path).unwrap()
            })
            .collect();

        let config = Config { enable_vis_cache: false, ..Config::default() };
        let caches = SharedCaches::new(config);
        caches.prefetch(&nodes);

        // 8 nodes + /World + pseudo-root.
        assert_eq!(caches.xform().stats().entries, 10);
        assert_eq!(caches.material().stats().entries, 10);
        assert_eq!(caches.vis().stats().entries, 0);

        let root = stage.node_at_path(&ScenePath::absolute_root()).unwrap();
        assert!(caches.material().value(root.as_ref()).is_empty());
    }
}
