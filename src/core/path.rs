//! Hierarchical scene paths.
//!
//! The same path type addresses nodes in the scene description and
//! primitives in the render index. Which namespace a given path belongs to
//! is up to the caller; [`CachePath`] marks the render-index side in
//! signatures.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::util::{Error, Result};

/// Immutable, absolute, slash-delimited path.
///
/// Cloning is a reference-count bump. The empty path is a valid value and
/// means "no path" (no instancer, no material, ...).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScenePath(Arc<str>);

/// A [`ScenePath`] used as a render-index identity.
pub type CachePath = ScenePath;

/// Chain of instancing contexts, most-local link first.
pub type InstancerChain = SmallVec<[ScenePath; 4]>;

impl ScenePath {
    /// Parse an absolute path like `/World/geo/cube`.
    ///
    /// Rejects relative paths, empty elements (`//`), trailing slashes and
    /// `.`/`..` elements. Use [`ScenePath::empty`] for the empty path.
    pub fn new(path: &str) -> Result<Self> {
        if path == "/" {
            return Ok(Self::absolute_root());
        }
        let Some(rest) = path.strip_prefix('/') else {
            return Err(Error::invalid_path(path));
        };
        for elem in rest.split('/') {
            if !is_valid_element(elem) {
                return Err(Error::invalid_path(path));
            }
        }
        Ok(Self(Arc::from(path)))
    }

    /// The empty path.
    pub fn empty() -> Self {
        Self(Arc::from(""))
    }

    /// The absolute root `/`.
    pub fn absolute_root() -> Self {
        Self(Arc::from("/"))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn is_absolute_root(&self) -> bool {
        &*self.0 == "/"
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path elements, root first. Empty for `/` and the empty path.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Number of elements below the root.
    pub fn depth(&self) -> usize {
        self.elements().count()
    }

    /// Last element, or `""` for the root and the empty path.
    pub fn name(&self) -> &str {
        match self.0.rfind('/') {
            Some(i) => &self.0[i + 1..],
            None => "",
        }
    }

    /// Parent path. The root and the empty path have an empty parent.
    pub fn parent(&self) -> ScenePath {
        if self.is_empty() || self.is_absolute_root() {
            return Self::empty();
        }
        match self.0.rfind('/') {
            Some(0) => Self::absolute_root(),
            Some(i) => Self(Arc::from(&self.0[..i])),
            None => Self::empty(),
        }
    }

    /// Append one child element.
    pub fn append_child(&self, name: &str) -> Result<ScenePath> {
        if self.is_empty() || !is_valid_element(name) {
            return Err(Error::invalid_path(format!("{}/{}", self, name)));
        }
        if self.is_absolute_root() {
            Ok(Self(Arc::from(format!("/{name}"))))
        } else {
            Ok(Self(Arc::from(format!("{}/{}", self.0, name))))
        }
    }

    /// True if `prefix` is this path or one of its ancestors.
    ///
    /// Element-wise: `/a/bc` does not have prefix `/a/b`.
    pub fn has_prefix(&self, prefix: &ScenePath) -> bool {
        if self.is_empty() || prefix.is_empty() {
            return false;
        }
        if prefix.is_absolute_root() {
            return true;
        }
        match self.0.strip_prefix(&*prefix.0) {
            Some("") => true,
            Some(rest) => rest.starts_with('/'),
            None => false,
        }
    }

    /// Replace the leading `old` prefix with `new`.
    ///
    /// Returns the path unchanged if it does not have `old` as a prefix.
    pub fn replace_prefix(&self, old: &ScenePath, new: &ScenePath) -> ScenePath {
        if !self.has_prefix(old) {
            return self.clone();
        }
        let suffix = if old.is_absolute_root() {
            &self.0[..]
        } else {
            &self.0[old.0.len()..]
        };
        if suffix.is_empty() || suffix == "/" {
            return new.clone();
        }
        if new.is_absolute_root() {
            Self(Arc::from(suffix))
        } else {
            Self(Arc::from(format!("{}{}", new.0, suffix)))
        }
    }
}

fn is_valid_element(elem: &str) -> bool {
    !elem.is_empty() && elem != "." && elem != ".." && !elem.contains('/')
}

impl Default for ScenePath {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScenePath({:?})", &*self.0)
    }
}

impl std::str::FromStr for ScenePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for ScenePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> ScenePath {
        ScenePath::new(s).unwrap()
    }

    #[test]
    fn test_parse() {
        assert!(ScenePath::new("/World/cube").is_ok());
        assert!(ScenePath::new("/").unwrap().is_absolute_root());
        assert!(ScenePath::new("World").is_err());
        assert!(ScenePath::new("/World//cube").is_err());
        assert!(ScenePath::new("/World/").is_err());
        assert!(ScenePath::new("/World/..").is_err());
        assert!(ScenePath::new("").is_err());
    }

    #[test]
    fn test_navigation() {
        let cube = p("/World/geo/cube");
        assert_eq!(cube.name(), "cube");
        assert_eq!(cube.parent(), p("/World/geo"));
        assert_eq!(p("/World").parent(), ScenePath::absolute_root());
        assert!(ScenePath::absolute_root().parent().is_empty());
        assert_eq!(cube.depth(), 3);
        assert_eq!(cube.elements().collect::<Vec<_>>(), ["World", "geo", "cube"]);

        assert_eq!(ScenePath::absolute_root().append_child("a").unwrap(), p("/a"));
        assert_eq!(p("/a").append_child("b").unwrap(), p("/a/b"));
        assert!(p("/a").append_child("").is_err());
        assert!(ScenePath::empty().append_child("a").is_err());
    }

    #[test]
    fn test_has_prefix() {
        let path = p("/a/bc/d");
        assert!(path.has_prefix(&p("/a")));
        assert!(path.has_prefix(&p("/a/bc")));
        assert!(path.has_prefix(&path));
        assert!(path.has_prefix(&ScenePath::absolute_root()));
        assert!(!path.has_prefix(&p("/a/b")));
        assert!(!path.has_prefix(&ScenePath::empty()));
        assert!(!ScenePath::empty().has_prefix(&p("/a")));
    }

    #[test]
    fn test_replace_prefix() {
        let cube = p("/Master1/cube");
        assert_eq!(
            cube.replace_prefix(&p("/Master1"), &p("/PointInstancer/ProtoA")),
            p("/PointInstancer/ProtoA/cube")
        );
        assert_eq!(cube.replace_prefix(&cube, &p("/x")), p("/x"));
        assert_eq!(cube.replace_prefix(&p("/Other"), &p("/x")), cube);
        assert_eq!(
            cube.replace_prefix(&ScenePath::absolute_root(), &p("/Delegate")),
            p("/Delegate/Master1/cube")
        );
        assert_eq!(
            cube.replace_prefix(&p("/Master1"), &ScenePath::absolute_root()),
            p("/cube")
        );
    }
}
