//! Math type re-exports and matrix helpers.
//!
//! Transforms are double precision and use glam's column-vector convention:
//! a world transform is `parent_world * local`.

pub use glam::{DMat4, DVec3, Vec3};

/// Identity 4x4 matrix.
pub const IDENTITY: DMat4 = DMat4::IDENTITY;

/// Compose a child-local transform under its parent's world transform.
#[inline]
pub fn compose(parent_world: &DMat4, local: &DMat4) -> DMat4 {
    *parent_world * *local
}

/// Approximate matrix equality, used when comparing cached against direct
/// results where float association order differs.
pub fn approx_eq(a: &DMat4, b: &DMat4, eps: f64) -> bool {
    a.abs_diff_eq(*b, eps)
}
