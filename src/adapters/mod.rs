//! Concrete adapters.
//!
//! - [`GprimAdapter`] - Meshes, curves and other drawable geometry
//! - [`PointInstancerAdapter`] - Instancers and their prototypes

mod gprim;
mod point_instancer;

pub use gprim::*;
pub use point_instancer::*;
