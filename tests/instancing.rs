//! Integration tests for instance path resolution and the point instancer.

mod common;

use std::sync::Arc;

use common::{p, translate};
use scene_imaging::adapter::{PrimAdapter, ALL_INSTANCES};
use scene_imaging::adapters::{GprimAdapter, PointInstancerAdapter, PROTO_INDICES_ATTR};
use scene_imaging::config::Config;
use scene_imaging::core::{DirtyBits, InstancerChain, TimeCode};
use scene_imaging::delegate::SceneDelegate;
use scene_imaging::index::{IndexProxy, MemoryIndex};
use scene_imaging::memory::{MemoryAttribute, MemoryStage, SampledValue};
use scene_imaging::util::{approx_eq, Error, InternalError};

#[test]
fn test_two_link_chain() {
    let stage = Arc::new(MemoryStage::new());
    let master = stage.define("/Master1").unwrap();
    stage.set_master(&master, true);
    stage.define("/Master1/cube").unwrap();

    let delegate = SceneDelegate::new(stage, Config::default());
    let adapter = GprimAdapter::new(&delegate);

    let resolved = adapter
        .base()
        .prim_path_from_instancer_chain(&[p("/Master1/cube"), p("/PointInstancer/ProtoA")])
        .unwrap();
    assert_eq!(resolved, p("/PointInstancer/ProtoA/cube"));
}

#[test]
fn test_three_link_chain() {
    let delegate = SceneDelegate::new(common::master_scene(), Config::default());
    let adapter = GprimAdapter::new(&delegate);

    let chain: InstancerChain = [
        p("/__Master__1/cube"),
        p("/__Master__2/ProtoCube"),
        p("/PointInstancer/ProtoA"),
    ]
    .into_iter()
    .collect();
    let resolved = adapter.base().prim_path_from_instancer_chain(&chain).unwrap();
    assert_eq!(resolved, p("/PointInstancer/ProtoA/ProtoCube/cube"));
}

#[test]
fn test_resolution_is_idempotent() {
    let delegate = SceneDelegate::new(common::master_scene(), Config::default());
    let adapter = GprimAdapter::new(&delegate);
    let base = adapter.base();

    let chain = [p("/__Master__2/ProtoCube/cube"), p("/PointInstancer/ProtoA")];
    let once = base.prim_path_from_instancer_chain(&chain).unwrap();
    let twice = base.prim_path_from_instancer_chain(&[once.clone()]).unwrap();
    assert_eq!(once, twice);

    // Deterministic across calls.
    assert_eq!(base.prim_path_from_instancer_chain(&chain).unwrap(), once);
}

#[test]
fn test_empty_chain() {
    let delegate = SceneDelegate::new(common::master_scene(), Config::default());
    let adapter = GprimAdapter::new(&delegate);
    assert!(adapter.base().prim_path_from_instancer_chain(&[]).unwrap().is_empty());
}

#[test]
fn test_link_outside_master_is_internal_error() {
    let delegate = SceneDelegate::new(common::master_scene(), Config::default());
    let adapter = GprimAdapter::new(&delegate);

    let err = adapter
        .base()
        .prim_path_from_instancer_chain(&[p("/Plain/thing"), p("/PointInstancer/ProtoA")])
        .unwrap_err();
    assert!(err.is_internal());
    assert!(matches!(err, Error::Internal(InternalError::NotInMaster(ref path)) if *path == p("/Plain/thing")));

    let err = adapter
        .base()
        .prim_path_from_instancer_chain(&[p("/__Master__1/gone"), p("/PointInstancer/ProtoA")])
        .unwrap_err();
    assert!(matches!(err, Error::Internal(InternalError::MissingNode(_))));
}

fn instancer_scene() -> Arc<MemoryStage> {
    let stage = Arc::new(MemoryStage::new());
    let world = stage.define("/World").unwrap();
    let inst = stage.define("/World/inst").unwrap();
    stage.define("/World/inst/cube").unwrap();
    stage.define("/World/inst/sphere").unwrap();
    stage.define("/World/other").unwrap();

    stage.set_transform(&world, SampledValue::uniform(translate(0.0, 0.0, 1.0)));
    stage.set_transform(&inst, common::animated_x(&[(0.0, 0.0), (1.0, 10.0), (2.0, 20.0)]));
    stage.set_attribute(&inst, MemoryAttribute::uniform(PROTO_INDICES_ATTR, vec![1, 0, 1]));
    stage
}

#[test]
fn test_instancer_transform_samples() {
    let mut delegate = SceneDelegate::new(instancer_scene(), Config::default());
    delegate.set_time(TimeCode::new(1.0));
    let adapter = PointInstancerAdapter::new(&delegate);
    let inst = p("/World/inst");
    let node = delegate.node(&inst).unwrap();

    let samples = adapter.sample_instancer_transform(node.as_ref(), &inst, TimeCode::new(1.0), &[0.0, 1.0, 2.0], 2);
    assert_eq!(samples.times, vec![0.0, 1.0]);
    assert!(approx_eq(&samples.values[0], &translate(10.0, 0.0, 1.0), 1e-12));
    assert!(approx_eq(&samples.values[1], &translate(20.0, 0.0, 1.0), 1e-12));

    // A static instancer yields exactly one sample.
    let other = p("/World/other");
    let node = delegate.node(&other).unwrap();
    let samples = adapter.sample_instancer_transform(node.as_ref(), &other, TimeCode::new(1.0), &[0.0, 1.0], 2);
    assert_eq!(samples.times, vec![0.0]);
    assert!(approx_eq(&samples.values[0], &translate(0.0, 0.0, 1.0), 1e-12));
}

#[test]
fn test_instancer_marks_prototypes() {
    let delegate = SceneDelegate::new(instancer_scene(), Config::default());
    let adapter = PointInstancerAdapter::new(&delegate);
    let mut index = MemoryIndex::new();
    let inst = p("/World/inst");
    let node = delegate.node(&inst).unwrap();

    adapter.populate(node.as_ref(), &mut index, None);
    assert!(adapter.should_cull_children(node.as_ref()));
    assert!(adapter.is_instancer_adapter());

    let protos = adapter.prototypes(&inst);
    for path in protos.iter().chain([&inst]) {
        index.mark_clean(path);
    }

    adapter.mark_transform_dirty(node.as_ref(), &inst, &mut index);
    assert_eq!(index.dirty_bits(&inst), DirtyBits::DIRTY_TRANSFORM);
    for proto in &protos {
        assert_eq!(index.dirty_bits(proto), DirtyBits::DIRTY_TRANSFORM);
        assert_eq!(index.rprim(proto).unwrap().instancer.as_ref(), Some(&inst));
    }

    adapter.mark_dirty(node.as_ref(), &inst, DirtyBits::DIRTY_INSTANCE_INDEX, &mut index);
    assert_eq!(
        index.dirty_bits(&inst),
        DirtyBits::DIRTY_TRANSFORM | DirtyBits::DIRTY_INSTANCE_INDEX
    );
}

#[test]
fn test_instance_index_resolution() {
    let delegate = SceneDelegate::new(instancer_scene(), Config::default());
    let adapter = PointInstancerAdapter::new(&delegate);
    let mut index = MemoryIndex::new();
    let inst = p("/World/inst");
    let node = delegate.node(&inst).unwrap();
    adapter.populate(node.as_ref(), &mut index, None);

    let sphere_proto = p("/World/inst/proto_sphere_id1");
    assert!(index.is_populated(&sphere_proto));
    assert_eq!(adapter.instance_indices(&inst, &sphere_proto), vec![0, 2]);

    let r = adapter.path_for_instance_index(&sphere_proto, 1);
    assert_eq!(r.path, inst);
    assert_eq!(r.absolute_instance_index, 2);
    assert_eq!(r.instance_count, 1);
    assert_eq!(r.resolved_prim_path, p("/World/inst/sphere"));
    assert_eq!(r.instance_context, vec![inst.clone()]);

    let r = adapter.path_for_instance_index_with_instancer(&inst, &sphere_proto, ALL_INSTANCES);
    assert_eq!(r.absolute_instance_index, ALL_INSTANCES);
    assert_eq!(r.instance_count, 2);

    assert!(!adapter.path_for_instance_index(&p("/World/other"), 0).is_instanced());
}

#[test]
fn test_instancer_resync() {
    let stage = instancer_scene();
    let delegate = SceneDelegate::new(stage, Config::default());
    let adapter = PointInstancerAdapter::new(&delegate);
    let mut index = MemoryIndex::new();
    let inst = p("/World/inst");
    let node = delegate.node(&inst).unwrap();
    adapter.populate(node.as_ref(), &mut index, None);

    adapter.process_prim_resync(&inst, &mut index);
    assert_eq!(index.num_rprims(), 0);
    assert_eq!(index.num_instancers(), 0);
    assert_eq!(index.take_repopulation(), vec![inst.clone()]);

    let repopulated = adapter.populate(node.as_ref(), &mut index, None);
    assert_eq!(repopulated, inst);
    assert_eq!(index.num_rprims(), 2);
}
