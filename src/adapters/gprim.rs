//! Adapter for generic geometry (meshes, curves, points).

use crate::adapter::{AdapterBase, InstancerContext, PrimAdapter};
use crate::core::{
    merge_primvar, role, CachePath, DirtyBits, Interpolation, PrimvarDescriptor, SceneNode,
    VISIBILITY_ATTR,
};
use crate::delegate::Delegate;
use crate::index::IndexProxy;
use crate::util::perf;

pub const POINTS_ATTR: &str = "points";
pub const NORMALS_ATTR: &str = "normals";
pub const EXTENT_ATTR: &str = "extent";
pub const DISPLAY_COLOR: &str = "displayColor";
pub const DISPLAY_OPACITY: &str = "displayOpacity";

/// Geometry adapter: one render prim per scene node.
pub struct GprimAdapter<'d> {
    base: AdapterBase<'d>,
}

impl<'d> GprimAdapter<'d> {
    pub fn new(delegate: &'d dyn Delegate) -> Self {
        Self { base: AdapterBase::new(delegate) }
    }

    /// Primvars the render prim exposes, one entry per name.
    ///
    /// `displayColor` and `displayOpacity` are always present with constant
    /// interpolation; an authored primvar (own or inherited) overrides that
    /// in place.
    pub fn primvar_descriptors(&self, node: &dyn SceneNode) -> Vec<PrimvarDescriptor> {
        let mut primvars = Vec::new();

        if node.attribute(POINTS_ATTR).is_some() {
            merge_primvar(&mut primvars, POINTS_ATTR, Interpolation::Vertex, role::POINT);
        }
        if let Some(normals) = node.primvar(NORMALS_ATTR).or_else(|| node.attribute(NORMALS_ATTR)) {
            let interp = match normals.interpolation() {
                Interpolation::Constant => Interpolation::Vertex,
                other => other,
            };
            merge_primvar(&mut primvars, NORMALS_ATTR, interp, role::NORMAL);
        }

        for (name, pv_role) in [(DISPLAY_COLOR, role::COLOR), (DISPLAY_OPACITY, role::NONE)] {
            merge_primvar(&mut primvars, name, Interpolation::Constant, pv_role);
            if let Some(pv) = node.primvar(name).or_else(|| node.inherited_primvar(name)) {
                merge_primvar(&mut primvars, name, pv.interpolation(), pv_role);
            }
        }
        primvars
    }
}

impl PrimAdapter for GprimAdapter<'_> {
    fn base(&self) -> &AdapterBase<'_> {
        &self.base
    }

    fn populate(
        &self,
        node: &dyn SceneNode,
        index: &mut dyn IndexProxy,
        instancer_context: Option<&InstancerContext>,
    ) -> CachePath {
        let cache_path = instancer_context
            .and_then(InstancerContext::prototype_path)
            .unwrap_or_else(|| self.base.path_for_index(node.path()));
        let instancer = instancer_context
            .map(|ctx| &ctx.instancer_id)
            .filter(|id| !id.is_empty());

        index.insert_rprim(&cache_path, node.path(), instancer);
        tracing::debug!(path = %cache_path, usd_path = %node.path(), "populated gprim");
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
            POINTS_ATTR,
            DirtyBits::DIRTY_POINTS,
            perf::GPRIM_POINTS_VARYING,
            time_varying_bits,
            false,
        );
        base.is_varying(
            node,
            NORMALS_ATTR,
            DirtyBits::DIRTY_NORMALS,
            perf::PRIMVAR_VARYING,
            time_varying_bits,
            false,
        );
        // Normals may be authored as a primvar instead of an attribute.
        let normals_primvar_varies = node
            .primvar(NORMALS_ATTR)
            .is_some_and(|pv| pv.value_might_be_time_varying());
        if normals_primvar_varies && !time_varying_bits.contains(DirtyBits::DIRTY_NORMALS) {
            time_varying_bits.insert(DirtyBits::DIRTY_NORMALS);
            base.delegate().perf_counters().incr(perf::PRIMVAR_VARYING);
        }
        base.is_varying(
            node,
            EXTENT_ATTR,
            DirtyBits::DIRTY_EXTENT,
            perf::PRIMVAR_VARYING,
            time_varying_bits,
            false,
        );

        // Primvars live apart from attributes, so the generic check above
        // does not see them.
        time_varying_bits.remove(DirtyBits::DIRTY_PRIMVAR);
        let primvar_varies = [DISPLAY_COLOR, DISPLAY_OPACITY].into_iter().any(|name| {
            node.primvar(name)
                .or_else(|| node.inherited_primvar(name))
                .is_some_and(|pv| pv.value_might_be_time_varying())
        });
        if primvar_varies {
            time_varying_bits.insert(DirtyBits::DIRTY_PRIMVAR);
            base.delegate().perf_counters().incr(perf::PRIMVAR_VARYING);
        }

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
        index.mark_rprim_dirty(cache_path, dirty);
    }

    fn remove_prim(&self, cache_path: &CachePath, index: &mut dyn IndexProxy) {
        index.remove_rprim(cache_path);
    }

    fn mark_refine_level_dirty(&self, _node: &dyn SceneNode, cache_path: &CachePath, index: &mut dyn IndexProxy) {
        index.mark_rprim_dirty(cache_path, DirtyBits::DIRTY_DISPLAY_STYLE);
    }

    fn mark_repr_dirty(&self, _node: &dyn SceneNode, cache_path: &CachePath, index: &mut dyn IndexProxy) {
        index.mark_rprim_dirty(cache_path, DirtyBits::DIRTY_REPR);
    }

    fn mark_cull_style_dirty(&self, _node: &dyn SceneNode, cache_path: &CachePath, index: &mut dyn IndexProxy) {
        index.mark_rprim_dirty(cache_path, DirtyBits::DIRTY_CULL_STYLE);
    }

    fn mark_transform_dirty(&self, _node: &dyn SceneNode, cache_path: &CachePath, index: &mut dyn IndexProxy) {
        index.mark_rprim_dirty(cache_path, DirtyBits::DIRTY_TRANSFORM);
    }

    fn mark_visibility_dirty(&self, _node: &dyn SceneNode, cache_path: &CachePath, index: &mut dyn IndexProxy) {
        index.mark_rprim_dirty(cache_path, DirtyBits::DIRTY_VISIBILITY);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::core::ScenePath;
    use crate::delegate::SceneDelegate;
    use crate::index::MemoryIndex;
    use crate::memory::{MemoryAttribute, MemoryStage};
    use crate::util::{Value, Vec3};

    #[test]
    fn test_primvar_descriptors_replace_in_place() {
        let stage = Arc::new(MemoryStage::new());
        let mesh = stage.define("/World/mesh").unwrap();
        stage.set_attribute(&mesh, MemoryAttribute::uniform(POINTS_ATTR, Value::Vec3fArray(vec![])));
        stage.set_primvar(
            &mesh,
            MemoryAttribute::uniform(DISPLAY_COLOR, Value::Vec3fArray(vec![]))
                .with_interpolation(Interpolation::Vertex),
        );

        let delegate = SceneDelegate::new(stage, Config::default());
        let adapter = GprimAdapter::new(&delegate);
        let node = delegate.node(&mesh).unwrap();
        let pvs = adapter.primvar_descriptors(node.as_ref());

        let names: Vec<_> = pvs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec![POINTS_ATTR, DISPLAY_COLOR, DISPLAY_OPACITY]);
        assert_eq!(pvs[1].interpolation, Interpolation::Vertex);
        assert_eq!(pvs[2].interpolation, Interpolation::Constant);
    }

    #[test]
    fn test_instanced_populate() {
        let stage = Arc::new(MemoryStage::new());
        let cube = stage.define("/World/inst/cube").unwrap();
        let delegate = SceneDelegate::new(stage, Config::default());
        let adapter = GprimAdapter::new(&delegate);
        let mut index = MemoryIndex::new();

        let inst = ScenePath::new("/World/inst").unwrap();
        let ctx = InstancerContext::new(inst.clone(), "proto_cube_id0");
        let node = delegate.node(&cube).unwrap();
        let cache_path = adapter.populate(node.as_ref(), &mut index, Some(&ctx));

        assert_eq!(cache_path.as_str(), "/World/inst/proto_cube_id0");
        let entry = index.rprim(&cache_path).unwrap();
        assert_eq!(entry.usd_path, cube);
        assert_eq!(entry.instancer.as_ref(), Some(&inst));
    }

    #[test]
    fn test_varying_normals_primvar() {
        let stage = Arc::new(MemoryStage::new());
        let mesh = stage.define("/World/mesh").unwrap();
        stage.set_primvar(
            &mesh,
            MemoryAttribute::sampled(
                NORMALS_ATTR,
                vec![
                    (1.0, Value::Vec3fArray(vec![Vec3::X])),
                    (2.0, Value::Vec3fArray(vec![Vec3::Y])),
                ],
            )
            .with_interpolation(Interpolation::FaceVarying),
        );

        let delegate = SceneDelegate::new(stage, Config::default());
        let adapter = GprimAdapter::new(&delegate);
        let node = delegate.node(&mesh).unwrap();

        let pvs = adapter.primvar_descriptors(node.as_ref());
        assert_eq!(pvs[0].name, NORMALS_ATTR);
        assert_eq!(pvs[0].interpolation, Interpolation::FaceVarying);

        let mut bits = DirtyBits::CLEAN;
        adapter.track_variability(node.as_ref(), &mesh, &mut bits, None);
        assert!(bits.contains(DirtyBits::DIRTY_NORMALS));
        assert!(!bits.contains(DirtyBits::DIRTY_POINTS));
    }

    #[test]
    fn test_populate_under_delegate_id() {
        let stage = Arc::new(MemoryStage::new());
        let cube = stage.define("/World/cube").unwrap();
        let delegate = SceneDelegate::new(stage, Config::default())
            .with_delegate_id(ScenePath::new("/Delegate").unwrap());
        let adapter = GprimAdapter::new(&delegate);
        let mut index = MemoryIndex::new();

        let node = delegate.node(&cube).unwrap();
        let cache_path = adapter.populate(node.as_ref(), &mut index, None);
        assert_eq!(cache_path.as_str(), "/Delegate/World/cube");
        assert_eq!(index.rprim(&cache_path).unwrap().usd_path, cube);
        assert!(index.has_prim_info(&cube));

        adapter.process_prim_removal(&cache_path, &mut index);
        assert_eq!(index.num_rprims(), 0);
        assert!(!index.has_prim_info(&cube));
    }

    #[test]
    fn test_material_from_instancer_context() {
        let stage = Arc::new(MemoryStage::new());
        let plain = stage.define("/Protos/plain").unwrap();
        let bound = stage.define("/Protos/bound").unwrap();
        let own = ScenePath::new("/Looks/own").unwrap();
        stage.bind_material(&bound, "", own.clone());

        let delegate = SceneDelegate::new(stage, Config::default());
        let adapter = GprimAdapter::new(&delegate);
        let inst_material = ScenePath::new("/Looks/inst").unwrap();
        let ctx = InstancerContext::new(ScenePath::new("/World/inst").unwrap(), "proto_plain_id0")
            .with_material(inst_material.clone());

        let plain = delegate.node(&plain).unwrap();
        let bound = delegate.node(&bound).unwrap();
        assert_eq!(adapter.material_id_with_context(plain.as_ref(), Some(&ctx)), inst_material);
        assert_eq!(adapter.material_id_with_context(bound.as_ref(), Some(&ctx)), own);
        assert!(adapter.material_id_with_context(plain.as_ref(), None).is_empty());
    }
}
