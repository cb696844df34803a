//! The prim adapter contract.
//!
//! An adapter translates one kind of scene node into render-index prims and
//! keeps them current. The delegate picks an adapter per node type, calls
//! [`PrimAdapter::populate`] once, [`PrimAdapter::track_variability`] to
//! learn which bits may change over time, and then routes scene edits to
//! the `process_*` and `mark_*` entry points.
//!
//! Concrete adapters implement the required methods and embed an
//! [`AdapterBase`], which supplies everything else.

mod base;
mod change;
mod instancing;
mod sampler;
mod selection;

pub use base::AdapterBase;
pub use change::classify_changed_fields;
pub use instancing::{
    resolve_instancer_chain, InstanceIndexResolution, InstancerContext, ALL_INSTANCES,
};
pub use sampler::{sample_primvar, sample_values, TimeSamples};
pub use selection::{HighlightMode, SelectionSink, TextureResource, TextureResourceId};

use std::sync::Arc;

use crate::core::{CachePath, DirtyBits, SceneNode, ScenePath, TimeCode};
use crate::delegate::DrawMode;
use crate::index::IndexProxy;
use crate::util::{DMat4, Value, IDENTITY};

/// Node-type specific translator between the scene and the render index.
pub trait PrimAdapter: Send + Sync {
    /// Link back to the owning delegate.
    fn base(&self) -> &AdapterBase<'_>;

    // ==============================================================
    // Required
    // ==============================================================

    /// Insert the render prims for `node`; returns the primary cache path.
    fn populate(
        &self,
        node: &dyn SceneNode,
        index: &mut dyn IndexProxy,
        instancer_context: Option<&InstancerContext>,
    ) -> CachePath;

    /// Set in `time_varying_bits` every bit whose data may change over time.
    fn track_variability(
        &self,
        node: &dyn SceneNode,
        cache_path: &CachePath,
        time_varying_bits: &mut DirtyBits,
        instancer_context: Option<&InstancerContext>,
    );

    /// Forward `dirty` to the render index for `cache_path`.
    fn mark_dirty(
        &self,
        node: &dyn SceneNode,
        cache_path: &CachePath,
        dirty: DirtyBits,
        index: &mut dyn IndexProxy,
    );

    /// Remove everything [`populate`](Self::populate) inserted.
    fn remove_prim(&self, cache_path: &CachePath, index: &mut dyn IndexProxy);

    // ==============================================================
    // Population policy
    // ==============================================================

    /// True if the traversal should not descend below `node`.
    fn should_cull_children(&self, _node: &dyn SceneNode) -> bool {
        false
    }

    /// True if this adapter populates instancers rather than plain rprims.
    fn is_instancer_adapter(&self) -> bool {
        false
    }

    /// True if prims of this type are only populated by some other adapter.
    fn is_populated_indirectly(&self) -> bool {
        false
    }

    // ==============================================================
    // Change processing
    // ==============================================================

    /// Dirty bits for a metadata-only change on `node`.
    fn process_prim_change(
        &self,
        _node: &dyn SceneNode,
        _cache_path: &CachePath,
        changed_fields: &[&str],
    ) -> DirtyBits {
        self.base().process_prim_change(changed_fields)
    }

    /// The node at `cache_path` changed structurally: tear down, then queue
    /// repopulation if it still exists.
    fn process_prim_resync(&self, cache_path: &CachePath, index: &mut dyn IndexProxy) {
        let usd_path = self.base().scene_path_for_index(cache_path);
        self.remove_prim(cache_path, index);
        index.remove_prim_info(&usd_path);

        if self.base().prim(&usd_path).is_some() {
            tracing::debug!(path = %cache_path, "resync: repopulating");
            index.repopulate(cache_path);
        } else {
            tracing::debug!(path = %cache_path, "resync: node is gone");
        }
    }

    /// The node at `cache_path` was deleted.
    fn process_prim_removal(&self, cache_path: &CachePath, index: &mut dyn IndexProxy) {
        tracing::debug!(path = %cache_path, "removal");
        self.remove_prim(cache_path, index);
        index.remove_prim_info(&self.base().scene_path_for_index(cache_path));
    }

    /// The refine level of `node` changed.
    fn mark_refine_level_dirty(&self, _node: &dyn SceneNode, _cache_path: &CachePath, _index: &mut dyn IndexProxy) {}

    /// The display representation of `node` changed.
    fn mark_repr_dirty(&self, _node: &dyn SceneNode, _cache_path: &CachePath, _index: &mut dyn IndexProxy) {}

    /// The cull style of `node` changed.
    fn mark_cull_style_dirty(&self, _node: &dyn SceneNode, _cache_path: &CachePath, _index: &mut dyn IndexProxy) {}

    /// The transform of `node` or one of its ancestors changed.
    fn mark_transform_dirty(&self, _node: &dyn SceneNode, _cache_path: &CachePath, _index: &mut dyn IndexProxy) {}

    /// The visibility of `node` or one of its ancestors changed.
    fn mark_visibility_dirty(&self, _node: &dyn SceneNode, _cache_path: &CachePath, _index: &mut dyn IndexProxy) {}

    // ==============================================================
    // Instancing
    // ==============================================================

    /// Instancer of the rprim at `cache_path`, or the empty path.
    fn instancer(&self, _cache_path: &CachePath) -> ScenePath {
        ScenePath::empty()
    }

    /// Transform samples of the instancer itself.
    fn sample_instancer_transform(
        &self,
        _instancer_node: &dyn SceneNode,
        _instancer_path: &CachePath,
        _time: TimeCode,
        _offsets: &[f32],
        _max_samples: usize,
    ) -> TimeSamples<DMat4> {
        TimeSamples::new()
    }

    /// Samples of primvar `key` around `time`.
    fn sample_primvar(
        &self,
        node: &dyn SceneNode,
        _cache_path: &CachePath,
        key: &str,
        time: TimeCode,
        offsets: &[f32],
        max_samples: usize,
    ) -> TimeSamples<Value> {
        self.base().sample_primvar(node, key, time, offsets, max_samples)
    }

    /// Map an instance index of `proto_path` back to a scene path.
    fn path_for_instance_index(&self, _proto_path: &CachePath, _instance_index: i32) -> InstanceIndexResolution {
        InstanceIndexResolution::not_instanced()
    }

    /// Like [`path_for_instance_index`](Self::path_for_instance_index) with
    /// the instancer already known.
    fn path_for_instance_index_with_instancer(
        &self,
        _instancer_path: &CachePath,
        _proto_path: &CachePath,
        _instance_index: i32,
    ) -> InstanceIndexResolution {
        InstanceIndexResolution::not_instanced()
    }

    /// Instance indices of `proto_path` within `instancer_path`.
    fn instance_indices(&self, _instancer_path: &CachePath, _proto_path: &CachePath) -> Vec<i32> {
        Vec::new()
    }

    /// Transform from a nested instancer into its parent instancer.
    fn relative_instancer_transform(
        &self,
        _instancer_path: &CachePath,
        _proto_instancer_path: &CachePath,
        _time: TimeCode,
    ) -> DMat4 {
        IDENTITY
    }

    /// Instancer an instanced prototype is bound to.
    fn instancer_binding(&self, _node: &dyn SceneNode, instancer_context: Option<&InstancerContext>) -> ScenePath {
        instancer_context
            .map(|ctx| ctx.instancer_id.clone())
            .unwrap_or_default()
    }

    // ==============================================================
    // Selection and textures
    // ==============================================================

    /// Report the render paths `usd_path` selects; false if nothing was
    /// added.
    fn populate_selection(
        &self,
        mode: HighlightMode,
        usd_path: &ScenePath,
        instance_indices: &[i32],
        sink: &mut dyn SelectionSink,
    ) -> bool {
        self.base().populate_selection(mode, usd_path, instance_indices, sink)
    }

    /// Resource key of the texture `id`, [`TextureResourceId::INVALID`] if
    /// this adapter has none.
    fn texture_resource_id(
        &self,
        _node: &dyn SceneNode,
        _id: &ScenePath,
        _time: TimeCode,
        _salt: u64,
    ) -> TextureResourceId {
        TextureResourceId::INVALID
    }

    /// Loaded texture `id`.
    fn texture_resource(
        &self,
        _node: &dyn SceneNode,
        _id: &ScenePath,
        _time: TimeCode,
    ) -> Option<Arc<dyn TextureResource>> {
        None
    }

    /// Extra scene paths whose edits should be routed to this adapter.
    fn depend_paths(&self, _path: &ScenePath) -> Vec<ScenePath> {
        Vec::new()
    }

    // ==============================================================
    // Resolved data
    // ==============================================================

    /// World transform of `node` at `time`.
    fn transform(&self, node: &dyn SceneNode, time: TimeCode, ignore_root_transform: bool) -> DMat4 {
        self.base().transform(node, time, ignore_root_transform)
    }

    /// Resolved visibility of `node` at `time`.
    fn visible(&self, node: &dyn SceneNode, time: TimeCode) -> bool {
        self.base().visible(node, time)
    }

    /// Material bound to `node`, or the empty path.
    fn material_id(&self, node: &dyn SceneNode) -> ScenePath {
        self.base().material_id(node)
    }

    /// Like [`material_id`](Self::material_id); an instanced prototype with
    /// no binding of its own takes the instancer's material from the context.
    fn material_id_with_context(
        &self,
        node: &dyn SceneNode,
        instancer_context: Option<&InstancerContext>,
    ) -> ScenePath {
        let own = self.material_id(node);
        match instancer_context {
            Some(ctx) if own.is_empty() => ctx.material_id.clone(),
            _ => own,
        }
    }

    /// Draw mode authored on the model `node`.
    fn model_draw_mode(&self, node: &dyn SceneNode) -> DrawMode {
        self.base().delegate().model_draw_mode(node)
    }
}
