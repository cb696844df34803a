//! Primvar descriptors.

/// Interpolation class of a primvar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// One value for the entire prim.
    #[default]
    Constant,
    /// One value per face.
    Uniform,
    /// Per-vertex, linearly interpolated.
    Varying,
    /// Per-vertex, interpolated with the surface basis.
    Vertex,
    /// Per-face-vertex.
    FaceVarying,
    /// One value per instance.
    Instance,
}

impl Interpolation {
    /// Parse from the token stored in scene metadata.
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "constant" => Some(Self::Constant),
            "uniform" => Some(Self::Uniform),
            "varying" => Some(Self::Varying),
            "vertex" => Some(Self::Vertex),
            "faceVarying" => Some(Self::FaceVarying),
            "instance" => Some(Self::Instance),
            _ => None,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Uniform => "uniform",
            Self::Varying => "varying",
            Self::Vertex => "vertex",
            Self::FaceVarying => "faceVarying",
            Self::Instance => "instance",
        }
    }
}

/// Well-known primvar roles.
pub mod role {
    pub const NONE: &str = "";
    pub const POINT: &str = "point";
    pub const NORMAL: &str = "normal";
    pub const VECTOR: &str = "vector";
    pub const COLOR: &str = "color";
    pub const TEXTURE_COORDINATE: &str = "textureCoordinate";
}

/// Describes one primvar a render prim consumes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrimvarDescriptor {
    pub name: String,
    pub interpolation: Interpolation,
    pub role: String,
}

impl PrimvarDescriptor {
    pub fn new(name: impl Into<String>, interpolation: Interpolation, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interpolation,
            role: role.into(),
        }
    }
}

/// Add or replace a descriptor, keyed by name.
///
/// A name that is already present is overwritten in place, keeping its
/// position; a new name is appended.
pub fn merge_primvar(
    descriptors: &mut Vec<PrimvarDescriptor>,
    name: &str,
    interpolation: Interpolation,
    role: &str,
) {
    let primvar = PrimvarDescriptor::new(name, interpolation, role);
    match descriptors.iter_mut().find(|d| d.name == name) {
        Some(existing) => *existing = primvar,
        None => descriptors.push(primvar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolation_tokens() {
        assert_eq!(Interpolation::from_token("faceVarying"), Some(Interpolation::FaceVarying));
        assert_eq!(Interpolation::Vertex.as_token(), "vertex");
        assert_eq!(Interpolation::from_token("bogus"), None);
    }

    #[test]
    fn test_merge_replaces_in_place() {
        let mut pvs = Vec::new();
        merge_primvar(&mut pvs, "points", Interpolation::Vertex, role::POINT);
        merge_primvar(&mut pvs, "displayColor", Interpolation::Constant, role::COLOR);
        merge_primvar(&mut pvs, "normals", Interpolation::Vertex, role::NORMAL);
        merge_primvar(&mut pvs, "displayColor", Interpolation::Uniform, role::COLOR);

        let names: Vec<_> = pvs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["points", "displayColor", "normals"]);
        assert_eq!(pvs[1].interpolation, Interpolation::Uniform);
    }
}
