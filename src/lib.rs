//! # Scene Imaging
//!
//! Adapter layer between a hierarchical, time-sampled scene description and
//! a render-graph engine.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (errors, values, math, perf counters, logging)
//! - [`core`] - Paths, times, dirty bits and the scene-description traits
//! - [`memory`] - In-memory scene description
//! - [`config`] - Cache toggles
//! - [`cache`] - Shared transform, visibility and material-binding caches
//! - [`index`] - Render-index collaborator
//! - [`delegate`] - Owning context adapters call back into
//! - [`adapter`] - The prim adapter contract and its default behavior
//! - [`adapters`] - Concrete adapters (geometry, point instancers)
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use scene_imaging::prelude::*;
//!
//! let stage = Arc::new(MemoryStage::new());
//! let cube = stage.define("/World/cube")?;
//!
//! let mut delegate = SceneDelegate::new(stage, Config::from_env());
//! delegate.set_time(TimeCode::new(1.0));
//!
//! let adapter = GprimAdapter::new(&delegate);
//! let mut index = MemoryIndex::new();
//! let node = delegate.node(&cube).unwrap();
//! let cache_path = adapter.populate(node.as_ref(), &mut index, None);
//! ```

pub mod util;
pub mod core;
pub mod memory;
pub mod config;
pub mod cache;
pub mod index;
pub mod delegate;
pub mod adapter;
pub mod adapters;

// Re-export commonly used types
pub use util::{Error, InternalError, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, InternalError, Result, Value, DMat4, PerfCounters};
    pub use crate::core::{
        CachePath, DirtyBits, Interpolation, NodeRef, PrimvarDescriptor, SceneNode, SceneStage,
        ScenePath, TimeCode, Visibility,
    };
    pub use crate::memory::{MemoryAttribute, MemoryStage, SampledValue};
    pub use crate::config::Config;
    pub use crate::cache::SharedCaches;
    pub use crate::index::{IndexProxy, MemoryIndex};
    pub use crate::delegate::{Delegate, DrawMode, SceneDelegate};
    pub use crate::adapter::{
        AdapterBase, HighlightMode, InstanceIndexResolution, InstancerContext, PrimAdapter,
        SelectionSink, TimeSamples, ALL_INSTANCES,
    };
    pub use crate::adapters::{GprimAdapter, PointInstancerAdapter};
}
