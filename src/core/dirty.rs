//! Render-index dirty bits.
//!
//! The bit layout mirrors the render engine's change tracker. This layer
//! only produces and unions these values; their meaning belongs to the
//! engine.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Bitmask of invalidated render-prim state.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DirtyBits(pub u32);

impl DirtyBits {
    pub const CLEAN: Self = Self(0);
    pub const INIT_REPR: Self = Self(1 << 0);
    pub const VARYING: Self = Self(1 << 1);
    /// Everything except the `VARYING` bookkeeping bit.
    pub const ALL_DIRTY: Self = Self(!(1 << 1));

    pub const DIRTY_PRIM_ID: Self = Self(1 << 2);
    pub const DIRTY_EXTENT: Self = Self(1 << 3);
    pub const DIRTY_DISPLAY_STYLE: Self = Self(1 << 4);
    pub const DIRTY_POINTS: Self = Self(1 << 5);
    pub const DIRTY_PRIMVAR: Self = Self(1 << 6);
    pub const DIRTY_MATERIAL_ID: Self = Self(1 << 7);
    pub const DIRTY_TOPOLOGY: Self = Self(1 << 8);
    pub const DIRTY_TRANSFORM: Self = Self(1 << 9);
    pub const DIRTY_VISIBILITY: Self = Self(1 << 10);
    pub const DIRTY_NORMALS: Self = Self(1 << 11);
    pub const DIRTY_DOUBLE_SIDED: Self = Self(1 << 12);
    pub const DIRTY_CULL_STYLE: Self = Self(1 << 13);
    pub const DIRTY_SUBDIV_TAGS: Self = Self(1 << 14);
    pub const DIRTY_WIDTHS: Self = Self(1 << 15);
    pub const DIRTY_INSTANCER: Self = Self(1 << 16);
    pub const DIRTY_INSTANCE_INDEX: Self = Self(1 << 17);
    pub const DIRTY_REPR: Self = Self(1 << 18);
    pub const DIRTY_RENDER_TAG: Self = Self(1 << 19);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_clean(self) -> bool {
        self.0 == 0
    }

    /// True if any bit of `other` is set in `self`.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True if every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for DirtyBits {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DirtyBits {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for DirtyBits {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for DirtyBits {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for DirtyBits {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Debug for DirtyBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirtyBits({:#010x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_and_remove() {
        let mut bits = DirtyBits::CLEAN;
        assert!(bits.is_clean());

        bits |= DirtyBits::DIRTY_TRANSFORM;
        bits.insert(DirtyBits::DIRTY_VISIBILITY);
        assert!(bits.contains(DirtyBits::DIRTY_TRANSFORM | DirtyBits::DIRTY_VISIBILITY));
        assert!(!bits.intersects(DirtyBits::DIRTY_POINTS));

        bits.remove(DirtyBits::DIRTY_TRANSFORM);
        assert_eq!(bits, DirtyBits::DIRTY_VISIBILITY);
    }

    #[test]
    fn test_all_dirty_excludes_varying() {
        assert!(!DirtyBits::ALL_DIRTY.intersects(DirtyBits::VARYING));
        assert!(DirtyBits::ALL_DIRTY.contains(DirtyBits::DIRTY_RENDER_TAG));
    }
}
