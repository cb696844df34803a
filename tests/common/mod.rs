//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use scene_imaging::adapter::{HighlightMode, SelectionSink};
use scene_imaging::core::ScenePath;
use scene_imaging::memory::{MemoryStage, SampledValue};
use scene_imaging::util::{DMat4, DVec3, LOG_ENV};
use tracing_subscriber::EnvFilter;

/// Route library logs through the libtest writer so they stay captured.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn p(s: &str) -> ScenePath {
    ScenePath::new(s).unwrap()
}

pub fn translate(x: f64, y: f64, z: f64) -> DMat4 {
    DMat4::from_translation(DVec3::new(x, y, z))
}

/// Translation along x, keyed at each `(time, x)`.
pub fn animated_x(keys: &[(f64, f64)]) -> SampledValue<DMat4> {
    SampledValue::sampled(keys.iter().map(|&(t, x)| (t, translate(x, 0.0, 0.0))).collect())
}

/// Selection sink that records what adapters report.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub rprims: Vec<(HighlightMode, ScenePath)>,
    pub instances: Vec<(HighlightMode, ScenePath, Vec<i32>)>,
}

impl SelectionSink for RecordingSink {
    fn add_rprim(&mut self, mode: HighlightMode, index_path: &ScenePath) {
        self.rprims.push((mode, index_path.clone()));
    }

    fn add_instance(&mut self, mode: HighlightMode, index_path: &ScenePath, instance_indices: &[i32]) {
        self.instances.push((mode, index_path.clone(), instance_indices.to_vec()));
    }
}

/// ```text
/// /World            translate(10, 0, 0)
/// /World/geo        x animated: t=1 -> 1, t=2 -> 2
/// /World/geo/cube   translate(0, 5, 0)
/// /World/lights
/// ```
pub fn transform_scene() -> Arc<MemoryStage> {
    init_test_tracing();
    let stage = Arc::new(MemoryStage::new());
    let world = stage.define("/World").unwrap();
    let geo = stage.define("/World/geo").unwrap();
    let cube = stage.define("/World/geo/cube").unwrap();
    stage.define("/World/lights").unwrap();

    stage.set_transform(&world, SampledValue::uniform(translate(10.0, 0.0, 0.0)));
    stage.set_transform(&geo, animated_x(&[(1.0, 1.0), (2.0, 2.0)]));
    stage.set_transform(&cube, SampledValue::uniform(translate(0.0, 5.0, 0.0)));
    stage
}

/// Two masters, one nested inside the other's instance.
///
/// ```text
/// /__Master__1/cube
/// /__Master__2/ProtoCube/cube
/// /PointInstancer/ProtoA
/// /Plain/thing
/// ```
pub fn master_scene() -> Arc<MemoryStage> {
    init_test_tracing();
    let stage = Arc::new(MemoryStage::new());
    let m1 = stage.define("/__Master__1").unwrap();
    let m2 = stage.define("/__Master__2").unwrap();
    stage.set_master(&m1, true);
    stage.set_master(&m2, true);
    stage.define("/__Master__1/cube").unwrap();
    stage.define("/__Master__2/ProtoCube/cube").unwrap();
    stage.define("/PointInstancer/ProtoA").unwrap();
    stage.define("/Plain/thing").unwrap();
    stage
}
