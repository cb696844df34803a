//! Adapter for point instancers.
//!
//! The instancer node becomes a render-index instancer, and each direct
//! child becomes a prototype rprim named `proto_<child>_id<N>` under the
//! instancer's cache path. `protoIndices[i]` names the prototype drawn by
//! instance `i`.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::adapter::{
    sample_values, AdapterBase, InstanceIndexResolution, InstancerContext, PrimAdapter,
    TimeSamples, ALL_INSTANCES,
};
use crate::core::{CachePath, DirtyBits, SceneNode, ScenePath, TimeCode, VISIBILITY_ATTR};
use crate::delegate::Delegate;
use crate::index::IndexProxy;
use crate::util::{perf, DMat4};

use super::GprimAdapter;

pub const PROTO_INDICES_ATTR: &str = "protoIndices";
pub const POSITIONS_ATTR: &str = "positions";

/// What one populated instancer produced.
#[derive(Clone, Debug, Default)]
struct InstancerData {
    usd_path: ScenePath,
    /// Prototype rprim cache paths, by prototype index.
    prototypes: Vec<CachePath>,
    /// Scene paths of the prototype nodes, by prototype index.
    proto_usd_paths: Vec<ScenePath>,
    /// Context each prototype was populated with, by prototype index.
    proto_contexts: Vec<InstancerContext>,
}

impl InstancerData {
    fn proto_index(&self, proto_path: &CachePath) -> Option<usize> {
        self.prototypes.iter().position(|p| p == proto_path)
    }
}

pub struct PointInstancerAdapter<'d> {
    base: AdapterBase<'d>,
    prototype_adapter: GprimAdapter<'d>,
    instancers: RwLock<HashMap<CachePath, InstancerData>>,
}

impl<'d> PointInstancerAdapter<'d> {
    pub fn new(delegate: &'d dyn Delegate) -> Self {
        Self {
            base: AdapterBase::new(delegate),
            prototype_adapter: GprimAdapter::new(delegate),
            instancers: RwLock::new(HashMap::new()),
        }
    }

    /// Prototype rprims of a populated instancer, by prototype index.
    pub fn prototypes(&self, instancer_path: &CachePath) -> Vec<CachePath> {
        self.instancers
            .read()
            .get(instancer_path)
            .map(|data| data.prototypes.clone())
            .unwrap_or_default()
    }

    /// Context the prototype rprim at `proto_path` was populated with,
    /// together with the prototype's scene path.
    pub fn prototype_context(&self, proto_path: &CachePath) -> Option<(InstancerContext, ScenePath)> {
        self.instancers.read().values().find_map(|data| {
            data.proto_index(proto_path)
                .map(|i| (data.proto_contexts[i].clone(), data.proto_usd_paths[i].clone()))
        })
    }

    /// Material of a prototype rprim. A prototype with no binding of its
    /// own falls back to the instancer's material.
    pub fn prototype_material_id(&self, proto_path: &CachePath) -> ScenePath {
        let Some((ctx, usd_path)) = self.prototype_context(proto_path) else {
            return ScenePath::empty();
        };
        match self.base.prim(&usd_path) {
            Some(node) => self.prototype_adapter.material_id_with_context(node.as_ref(), Some(&ctx)),
            None => ctx.material_id,
        }
    }

    /// Scene paths of the prototype nodes of a populated instancer.
    fn proto_usd_paths(&self, instancer_path: &CachePath) -> Vec<ScenePath> {
        self.instancers
            .read()
            .get(instancer_path)
            .map(|data| data.proto_usd_paths.clone())
            .unwrap_or_default()
    }

    /// `protoIndices` of the instancer node at the delegate's time.
    fn proto_indices(&self, usd_path: &ScenePath) -> Vec<i32> {
        let time = self.base.delegate().time();
        self.base
            .prim(usd_path)
            .and_then(|node| node.attribute(PROTO_INDICES_ATTR))
            .and_then(|attr| attr.get(time))
            .and_then(|value| value.as_int_array().map(<[i32]>::to_vec))
            .unwrap_or_default()
    }
}

impl PrimAdapter for PointInstancerAdapter<'_> {
    fn base(&self) -> &AdapterBase<'_> {
        &self.base
    }

    fn populate(
        &self,
        node: &dyn SceneNode,
        index: &mut dyn IndexProxy,
        _instancer_context: Option<&InstancerContext>,
    ) -> CachePath {
        let cache_path = self.base.path_for_index(node.path());
        index.insert_instancer(&cache_path, node.path());

        let material_id = self.base.material_id(node);
        let mut data = InstancerData {
            usd_path: node.path().clone(),
            ..Default::default()
        };
        for (i, proto) in node.children().iter().enumerate() {
            let child_name = format!("proto_{}_id{i}", proto.path().name());
            let ctx = InstancerContext::new(cache_path.clone(), child_name)
                .with_material(material_id.clone());
            let proto_path = self.prototype_adapter.populate(proto.as_ref(), index, Some(&ctx));
            data.prototypes.push(proto_path);
            data.proto_usd_paths.push(proto.path().clone());
            data.proto_contexts.push(ctx);
        }

        tracing::debug!(path = %cache_path, prototypes = data.prototypes.len(), "populated instancer");
        self.instancers.write().insert(cache_path.clone(), data);
        cache_path
    }

    fn track_variability(
        &self,
        node: &dyn SceneNode,
        _cache_path: &CachePath,
        time_varying_bits: &mut DirtyBits,
        _instancer_context: Option<&InstancerContext>,
    ) {
        let base = &self.base;
        base.is_varying(
            node,
            PROTO_INDICES_ATTR,
            DirtyBits::DIRTY_INSTANCE_INDEX,
            perf::INSTANCE_INDICES_VARYING,
            time_varying_bits,
            false,
        );
        base.is_varying(
            node,
            POSITIONS_ATTR,
            DirtyBits::DIRTY_PRIMVAR,
            perf::PRIMVAR_VARYING,
            time_varying_bits,
            false,
        );
        base.is_transform_varying(
            node,
            DirtyBits::DIRTY_TRANSFORM,
            perf::TRANSFORM_VARYING,
            time_varying_bits,
        );
        base.is_varying(
            node,
            VISIBILITY_ATTR,
            DirtyBits::DIRTY_VISIBILITY,
            perf::VISIBILITY_VARYING,
            time_varying_bits,
            true,
        );
    }

    fn mark_dirty(
        &self,
        _node: &dyn SceneNode,
        cache_path: &CachePath,
        dirty: DirtyBits,
        index: &mut dyn IndexProxy,
    ) {
        index.mark_instancer_dirty(cache_path, dirty);
    }

    fn remove_prim(&self, cache_path: &CachePath, index: &mut dyn IndexProxy) {
        let removed = self.instancers.write().remove(cache_path);
        if let Some(data) = removed {
            for proto in &data.prototypes {
                self.prototype_adapter.remove_prim(proto, index);
            }
        }
        index.remove_instancer(cache_path);
    }

    fn should_cull_children(&self, _node: &dyn SceneNode) -> bool {
        true
    }

    fn is_instancer_adapter(&self) -> bool {
        true
    }

    fn process_prim_resync(&self, cache_path: &CachePath, index: &mut dyn IndexProxy) {
        let usd_path = self.base.scene_path_for_index(cache_path);
        let proto_usd_paths = self.proto_usd_paths(cache_path);

        self.remove_prim(cache_path, index);
        index.remove_prim_info(&usd_path);
        for proto in &proto_usd_paths {
            index.remove_prim_info(proto);
        }

        if self.base.prim(&usd_path).is_some() {
            tracing::debug!(path = %cache_path, prototypes = proto_usd_paths.len(), "instancer resync: repopulating");
            index.repopulate(cache_path);
        } else {
            tracing::debug!(path = %cache_path, "instancer resync: node is gone");
        }
    }

    fn process_prim_removal(&self, cache_path: &CachePath, index: &mut dyn IndexProxy) {
        let usd_path = self.base.scene_path_for_index(cache_path);
        let proto_usd_paths = self.proto_usd_paths(cache_path);

        tracing::debug!(path = %cache_path, prototypes = proto_usd_paths.len(), "instancer removal");
        self.remove_prim(cache_path, index);
        index.remove_prim_info(&usd_path);
        for proto in &proto_usd_paths {
            index.remove_prim_info(proto);
        }
    }

    fn mark_transform_dirty(&self, _node: &dyn SceneNode, cache_path: &CachePath, index: &mut dyn IndexProxy) {
        index.mark_instancer_dirty(cache_path, DirtyBits::DIRTY_TRANSFORM);
        for rprim in self.base.rprim_subtree(index, cache_path) {
            index.mark_rprim_dirty(&rprim, DirtyBits::DIRTY_TRANSFORM);
        }
    }

    fn mark_visibility_dirty(&self, _node: &dyn SceneNode, cache_path: &CachePath, index: &mut dyn IndexProxy) {
        index.mark_instancer_dirty(cache_path, DirtyBits::DIRTY_VISIBILITY);
        for rprim in self.base.rprim_subtree(index, cache_path) {
            index.mark_rprim_dirty(&rprim, DirtyBits::DIRTY_VISIBILITY);
        }
    }

    fn instancer(&self, cache_path: &CachePath) -> ScenePath {
        self.instancers
            .read()
            .iter()
            .find(|(_, data)| data.proto_index(cache_path).is_some())
            .map(|(path, _)| path.clone())
            .unwrap_or_default()
    }

    fn instance_indices(&self, instancer_path: &CachePath, proto_path: &CachePath) -> Vec<i32> {
        let (usd_path, proto_index) = {
            let instancers = self.instancers.read();
            let Some(data) = instancers.get(instancer_path) else {
                return Vec::new();
            };
            let Some(proto_index) = data.proto_index(proto_path) else {
                return Vec::new();
            };
            (data.usd_path.clone(), proto_index)
        };

        self.proto_indices(&usd_path)
            .iter()
            .enumerate()
            .filter(|(_, p)| usize::try_from(**p).ok() == Some(proto_index))
            .map(|(i, _)| i as i32)
            .collect()
    }

    fn sample_instancer_transform(
        &self,
        instancer_node: &dyn SceneNode,
        _instancer_path: &CachePath,
        time: TimeCode,
        offsets: &[f32],
        max_samples: usize,
    ) -> TimeSamples<DMat4> {
        let base = &self.base;
        sample_values(
            base.transform_might_vary(instancer_node),
            time,
            offsets,
            max_samples,
            |o| base.time_with_offset(o),
            |t| base.transform(instancer_node, t, true),
        )
    }

    fn path_for_instance_index(&self, proto_path: &CachePath, instance_index: i32) -> InstanceIndexResolution {
        let instancer = self.instancer(proto_path);
        if instancer.is_empty() {
            return InstanceIndexResolution::not_instanced();
        }
        self.path_for_instance_index_with_instancer(&instancer, proto_path, instance_index)
    }

    fn path_for_instance_index_with_instancer(
        &self,
        instancer_path: &CachePath,
        proto_path: &CachePath,
        instance_index: i32,
    ) -> InstanceIndexResolution {
        let indices = self.instance_indices(instancer_path, proto_path);

        let instancers = self.instancers.read();
        let Some(data) = instancers.get(instancer_path) else {
            return InstanceIndexResolution::not_instanced();
        };
        let Some(proto_index) = data.proto_index(proto_path) else {
            return InstanceIndexResolution::not_instanced();
        };

        let (absolute_instance_index, instance_count) = if instance_index == ALL_INSTANCES {
            (ALL_INSTANCES, indices.len())
        } else {
            match usize::try_from(instance_index).ok().and_then(|i| indices.get(i)) {
                Some(absolute) => (*absolute, 1),
                None => return InstanceIndexResolution::not_instanced(),
            }
        };

        InstanceIndexResolution {
            path: data.usd_path.clone(),
            instance_count,
            absolute_instance_index,
            resolved_prim_path: data.proto_usd_paths[proto_index].clone(),
            instance_context: vec![data.usd_path.clone()],
        }
    }
}
