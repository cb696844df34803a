//! Evaluation time codes.

use std::fmt;

/// Time at which scene values are evaluated.
///
/// `Default` selects the non-animated fallback value of an attribute. It is
/// a distinct time: caches stamped with `Default` are not valid for any
/// numeric time and vice versa.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TimeCode {
    #[default]
    Default,
    Numeric(f64),
}

impl TimeCode {
    #[inline]
    pub fn new(t: f64) -> Self {
        Self::Numeric(t)
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }

    /// Numeric value, if any.
    #[inline]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Numeric(t) => Some(*t),
            Self::Default => None,
        }
    }

    /// Shift by a relative sample offset. `Default` is not shifted.
    #[inline]
    pub fn with_offset(&self, offset: f32) -> Self {
        match self {
            Self::Numeric(t) => Self::Numeric(t + offset as f64),
            Self::Default => Self::Default,
        }
    }
}

impl From<f64> for TimeCode {
    fn from(t: f64) -> Self {
        Self::Numeric(t)
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("DEFAULT"),
            Self::Numeric(t) => write!(f, "{t}"),
        }
    }
}
