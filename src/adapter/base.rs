//! Shared adapter state and the helpers behind the default contract.

use crate::cache::{compute_material_path, compute_transform, compute_visibility};
use crate::core::{
    CachePath, DirtyBits, NodeRef, SceneNode, ScenePath, TimeCode, Visibility,
};
use crate::delegate::Delegate;
use crate::index::IndexProxy;
use crate::util::{DMat4, Result, Value};

use super::change::classify_changed_fields;
use super::instancing::resolve_instancer_chain;
use super::sampler::{sample_primvar, TimeSamples};
use super::selection::{HighlightMode, SelectionSink};

/// Borrowed link from an adapter back to the delegate that owns it.
///
/// Every concrete adapter embeds one and exposes it through
/// [`PrimAdapter::base`](super::PrimAdapter::base).
#[derive(Clone, Copy)]
pub struct AdapterBase<'d> {
    delegate: &'d dyn Delegate,
}

impl<'d> AdapterBase<'d> {
    pub fn new(delegate: &'d dyn Delegate) -> Self {
        Self { delegate }
    }

    #[inline]
    pub fn delegate(&self) -> &'d dyn Delegate {
        self.delegate
    }

    /// Scene node at `path`, if any.
    pub fn prim(&self, path: &ScenePath) -> Option<NodeRef> {
        self.delegate.stage().node_at_path(path)
    }

    pub fn time_with_offset(&self, offset: f32) -> TimeCode {
        self.delegate.time_with_offset(offset)
    }

    pub fn path_for_index(&self, usd_path: &ScenePath) -> ScenePath {
        self.delegate.path_for_index(usd_path)
    }

    pub fn scene_path_for_index(&self, index_path: &CachePath) -> ScenePath {
        self.delegate.scene_path_for_index(index_path)
    }

    /// Render prims populated at or below `index_path`.
    pub fn rprim_subtree(&self, index: &dyn IndexProxy, index_path: &CachePath) -> Vec<CachePath> {
        index.rprim_subtree(index_path)
    }

    pub fn is_child_path(&self, path: &ScenePath) -> bool {
        self.delegate.is_child_path(path)
    }

    pub fn can_compute_material_networks(&self) -> bool {
        self.delegate.can_compute_material_networks()
    }

    pub fn is_in_invised_paths(&self, usd_path: &ScenePath) -> bool {
        self.delegate.is_in_invised_paths(usd_path)
    }

    pub fn is_refined(&self, cache_path: &CachePath) -> bool {
        self.delegate.is_refined(cache_path)
    }

    pub fn root_transform(&self) -> DMat4 {
        self.delegate.root_transform()
    }

    /// Check whether attribute `attr_name` may vary over time.
    ///
    /// `dirty_bit` is cleared first. The node is checked, then its ancestors
    /// up to (not including) the pseudo-root when `is_inherited` is set. On
    /// the first varying attribute the bit is set in `dirty` and the perf
    /// counter is bumped.
    pub fn is_varying(
        &self,
        node: &dyn SceneNode,
        attr_name: &str,
        dirty_bit: DirtyBits,
        perf_counter: &str,
        dirty: &mut DirtyBits,
        is_inherited: bool,
    ) -> bool {
        dirty.remove(dirty_bit);

        let varies = |n: &dyn SceneNode| {
            n.attribute(attr_name)
                .is_some_and(|attr| attr.value_might_be_time_varying())
        };

        let mut found = varies(node);
        if !found && is_inherited {
            let mut current = node.parent();
            while let Some(parent) = current {
                if parent.is_root() {
                    break;
                }
                if varies(parent.as_ref()) {
                    found = true;
                    break;
                }
                current = parent.parent();
            }
        }

        if found {
            dirty.insert(dirty_bit);
            self.delegate.perf_counters().incr(perf_counter);
        }
        found
    }

    /// Like [`is_varying`](Self::is_varying), for the inherited transform.
    ///
    /// The walk ends at the pseudo-root or after a node that resets the
    /// transform stack.
    pub fn is_transform_varying(
        &self,
        node: &dyn SceneNode,
        dirty_bit: DirtyBits,
        perf_counter: &str,
        dirty: &mut DirtyBits,
    ) -> bool {
        dirty.remove(dirty_bit);
        let found = self.transform_might_vary(node);
        if found {
            dirty.insert(dirty_bit);
            self.delegate.perf_counters().incr(perf_counter);
        }
        found
    }

    /// True if the world transform of `node` is not provably constant.
    pub fn transform_might_vary(&self, node: &dyn SceneNode) -> bool {
        let cache = self.delegate.caches().xform();
        let query = cache.query(node);
        if query.might_vary {
            return true;
        }
        if query.resets_stack || node.is_root() {
            return false;
        }

        let mut current = node.parent();
        while let Some(parent) = current {
            if parent.is_root() {
                break;
            }
            let query = cache.query(parent.as_ref());
            if query.might_vary {
                return true;
            }
            if query.resets_stack {
                break;
            }
            current = parent.parent();
        }
        false
    }

    /// Scene path an instancer chain stands for. See
    /// [`resolve_instancer_chain`].
    pub fn prim_path_from_instancer_chain(&self, chain: &[ScenePath]) -> Result<ScenePath> {
        resolve_instancer_chain(self.delegate.stage(), chain)
    }

    /// World transform of `node` at `time`.
    pub fn transform(&self, node: &dyn SceneNode, time: TimeCode, ignore_root_transform: bool) -> DMat4 {
        let caches = self.delegate.caches();
        let xform = caches.xform();
        let ctm = if caches.config().enable_xform_cache && xform.time() == time {
            xform.value(node)
        } else {
            compute_transform(node, xform.root_path(), time, xform.overrides())
        };

        if ignore_root_transform {
            ctm
        } else {
            self.root_transform() * ctm
        }
    }

    /// Resolved visibility of `node` at `time`; invised paths are hidden.
    pub fn visible(&self, node: &dyn SceneNode, time: TimeCode) -> bool {
        if self.is_in_invised_paths(node.path()) {
            return false;
        }
        let caches = self.delegate.caches();
        let vis = if caches.config().enable_vis_cache && caches.vis().time() == time {
            caches.vis().value(node)
        } else {
            compute_visibility(node, time)
        };
        vis == Visibility::Inherited
    }

    /// Material bound to `node`, or the empty path.
    pub fn material_id(&self, node: &dyn SceneNode) -> ScenePath {
        let caches = self.delegate.caches();
        if caches.config().enable_binding_cache {
            caches.material().value(node)
        } else {
            compute_material_path(node, caches.material().binding_data())
        }
    }

    pub fn sample_primvar(
        &self,
        node: &dyn SceneNode,
        key: &str,
        time: TimeCode,
        offsets: &[f32],
        max_samples: usize,
    ) -> TimeSamples<Value> {
        sample_primvar(node, key, time, offsets, max_samples, |o| self.time_with_offset(o))
    }

    pub fn process_prim_change(&self, changed_fields: &[&str]) -> DirtyBits {
        classify_changed_fields(self.delegate.stage(), changed_fields)
    }

    /// Report `usd_path` (or some of its instances) to a selection sink.
    pub fn populate_selection(
        &self,
        mode: HighlightMode,
        usd_path: &ScenePath,
        instance_indices: &[i32],
        sink: &mut dyn SelectionSink,
    ) -> bool {
        let index_path = self.path_for_index(usd_path);
        if instance_indices.is_empty() {
            tracing::debug!(path = %index_path, ?mode, "select rprim");
            sink.add_rprim(mode, &index_path);
        } else {
            tracing::debug!(path = %index_path, ?mode, instances = instance_indices.len(), "select instances");
            sink.add_instance(mode, &index_path, instance_indices);
        }
        true
    }
}
