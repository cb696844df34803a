//! Selection and texture collaborators.
//!
//! Both are owned outside the adapter layer. Adapters only report into a
//! [`SelectionSink`] and hand out opaque texture handles.

use crate::core::ScenePath;

/// How a selected prim should be highlighted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HighlightMode {
    #[default]
    Select,
    Locate,
}

/// Receiver for selection entries produced by adapters.
pub trait SelectionSink {
    /// Select the whole render prim at `index_path`.
    fn add_rprim(&mut self, mode: HighlightMode, index_path: &ScenePath);

    /// Select individual instances of the render prim at `index_path`.
    fn add_instance(&mut self, mode: HighlightMode, index_path: &ScenePath, instance_indices: &[i32]);
}

/// Opaque texture handle. Loading textures is not this layer's job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureResourceId(pub u64);

impl TextureResourceId {
    pub const INVALID: Self = Self(u64::MAX);

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl Default for TextureResourceId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// A texture loaded by the render engine.
pub trait TextureResource: Send + Sync {
    /// Bytes of memory held by the texture.
    fn memory_used(&self) -> usize;
}
