//! Dynamically typed attribute values.

use std::fmt;

use super::math::{DMat4, Vec3};

/// A value read from a scene attribute or primvar.
///
/// `Empty` is what a sample holds when its source resolved but the read
/// produced nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Empty,
    Bool(bool),
    Int(i32),
    Float(f32),
    Double(f64),
    Token(String),
    Vec3f(Vec3),
    FloatArray(Vec<f32>),
    IntArray(Vec<i32>),
    Vec3fArray(Vec<Vec3>),
    Matrix4d(DMat4),
}

impl Value {
    /// Create a token value.
    pub fn token(s: impl Into<String>) -> Self {
        Self::Token(s.into())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_token(&self) -> Option<&str> {
        match self {
            Self::Token(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Self::IntArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<DMat4> {
        match self {
            Self::Matrix4d(m) => Some(*m),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Short type name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Token(_) => "token",
            Self::Vec3f(_) => "float3",
            Self::FloatArray(_) => "float[]",
            Self::IntArray(_) => "int[]",
            Self::Vec3fArray(_) => "point3f[]",
            Self::Matrix4d(_) => "matrix4d",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "<empty>"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Token(v) => write!(f, "{v}"),
            Self::Vec3f(v) => write!(f, "{v}"),
            Self::Matrix4d(v) => write!(f, "{v}"),
            other => write!(f, "<{}>", other.type_name()),
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec<i32>> for Value {
    fn from(v: Vec<i32>) -> Self {
        Self::IntArray(v)
    }
}

impl From<Vec<Vec3>> for Value {
    fn from(v: Vec<Vec3>) -> Self {
        Self::Vec3fArray(v)
    }
}

impl From<DMat4> for Value {
    fn from(v: DMat4) -> Self {
        Self::Matrix4d(v)
    }
}
