//! Core layer - fundamental types and collaborator traits.
//!
//! This module provides:
//! - [`ScenePath`] - Hierarchical identifiers for scene nodes and render prims
//! - [`TimeCode`] - Evaluation times
//! - [`DirtyBits`] - Render-index invalidation bitmask
//! - [`PrimvarDescriptor`] / [`Interpolation`] - Primvar bookkeeping
//! - Scene-description traits ([`SceneStage`], [`SceneNode`], [`Attribute`])

mod dirty;
mod path;
mod primvar;
mod scene;
mod time;

pub use dirty::DirtyBits;
pub use path::{CachePath, InstancerChain, ScenePath};
pub use primvar::{merge_primvar, role, Interpolation, PrimvarDescriptor};
pub use scene::{
    Attribute, AttributeRef, FieldDefinition, NodeRef, SceneNode, SceneStage, Visibility,
    VISIBILITY_ATTR,
};
pub use time::TimeCode;
