//! Identity under nested instancing.
//!
//! A node inside a master (a shared subtree) is reached through a chain of
//! instancing links. The chain is listed most-local first: link 0 is a path
//! inside a master, and every later link is the instance that pulls the
//! master of the previous working path into the scene.
//!
//! ```text
//! ["/__Master__1/cube", "/__Master__2/ProtoCube", "/PointInstancer/ProtoA"]
//!     -> "/__Master__2/ProtoCube/cube"
//!     -> "/PointInstancer/ProtoA/ProtoCube/cube"
//! ```

use crate::core::{CachePath, SceneStage, ScenePath};
use crate::util::{Error, InternalError, Result};

/// Instance index meaning "every instance".
pub const ALL_INSTANCES: i32 = -1;

/// Per-prototype context handed down while an instancer populates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstancerContext {
    /// Cache path of the instancer that owns the prototype.
    pub instancer_id: CachePath,
    /// Name of the prototype rprim under the instancer.
    pub child_name: String,
    /// Material bound on the instancer; see
    /// [`PrimAdapter::material_id_with_context`](super::PrimAdapter::material_id_with_context).
    pub material_id: ScenePath,
}

impl InstancerContext {
    pub fn new(instancer_id: CachePath, child_name: impl Into<String>) -> Self {
        Self {
            instancer_id,
            child_name: child_name.into(),
            material_id: ScenePath::empty(),
        }
    }

    /// Material the prototype falls back to when it has no binding of its own.
    pub fn with_material(mut self, material_id: ScenePath) -> Self {
        self.material_id = material_id;
        self
    }

    /// Cache path of the prototype rprim, `None` if the context does not
    /// name one.
    pub fn prototype_path(&self) -> Option<CachePath> {
        self.instancer_id.append_child(&self.child_name).ok()
    }
}

/// Result of mapping an instance index back to a scene path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceIndexResolution {
    /// Resolved path, empty when the prototype is not instanced.
    pub path: ScenePath,
    /// Number of instances the resolved path stands for.
    pub instance_count: usize,
    /// Index among all instances of the instancer, or [`ALL_INSTANCES`].
    pub absolute_instance_index: i32,
    /// Scene path of the prim the instance draws.
    pub resolved_prim_path: ScenePath,
    /// Instancer paths from outermost to innermost.
    pub instance_context: Vec<ScenePath>,
}

impl InstanceIndexResolution {
    pub fn not_instanced() -> Self {
        Self {
            path: ScenePath::empty(),
            instance_count: 0,
            absolute_instance_index: ALL_INSTANCES,
            resolved_prim_path: ScenePath::empty(),
            instance_context: Vec::new(),
        }
    }

    pub fn is_instanced(&self) -> bool {
        !self.path.is_empty()
    }
}

impl Default for InstanceIndexResolution {
    fn default() -> Self {
        Self::not_instanced()
    }
}

/// Expand an instancer chain into the scene path it stands for.
///
/// An empty chain resolves to the empty path. Any link whose working path
/// is missing, is not inside a master, or has no master ancestor aborts the
/// whole resolution with an internal error.
#[tracing::instrument(skip_all, fields(links = chain.len()))]
pub fn resolve_instancer_chain(stage: &dyn SceneStage, chain: &[ScenePath]) -> Result<ScenePath> {
    let Some((first, rest)) = chain.split_first() else {
        return Ok(ScenePath::empty());
    };

    let mut prim_path = first.clone();
    for link in rest {
        let master_path = enclosing_master(stage, &prim_path).inspect_err(|e| {
            tracing::error!(path = %prim_path, link = %link, "{e}");
        })?;
        prim_path = prim_path.replace_prefix(&master_path, link);
    }
    Ok(prim_path)
}

fn enclosing_master(stage: &dyn SceneStage, path: &ScenePath) -> Result<ScenePath> {
    let node = stage
        .node_at_path(path)
        .ok_or_else(|| InternalError::MissingNode(path.clone()))?;
    if !node.is_in_master() {
        return Err(InternalError::NotInMaster(path.clone()).into());
    }

    let mut current = node;
    while !current.is_master() {
        current = match current.parent() {
            Some(parent) if !parent.is_root() => parent,
            _ => return Err(Error::from(InternalError::NoMasterAncestor(path.clone()))),
        };
    }
    Ok(current.path().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStage;

    fn p(s: &str) -> ScenePath {
        ScenePath::new(s).unwrap()
    }

    #[test]
    fn test_prototype_path() {
        let ctx = InstancerContext::new(p("/World/inst"), "proto_cube_id0");
        assert_eq!(ctx.prototype_path(), Some(p("/World/inst/proto_cube_id0")));

        let ctx = InstancerContext::new(p("/World/inst"), "");
        assert_eq!(ctx.prototype_path(), None);
        assert_eq!(InstancerContext::default().prototype_path(), None);
    }

    #[test]
    fn test_nested_chain() {
        let stage = MemoryStage::new();
        let m1 = stage.define("/__Master__1").unwrap();
        let m2 = stage.define("/__Master__2").unwrap();
        stage.set_master(&m1, true);
        stage.set_master(&m2, true);
        stage.define("/__Master__1/cube").unwrap();
        stage.define("/__Master__2/ProtoCube/cube").unwrap();

        let chain = [
            p("/__Master__1/cube"),
            p("/__Master__2/ProtoCube"),
            p("/PointInstancer/ProtoA"),
        ];
        let resolved = resolve_instancer_chain(&stage, &chain).unwrap();
        assert_eq!(resolved, p("/PointInstancer/ProtoA/ProtoCube/cube"));
    }

    #[test]
    fn test_missing_node() {
        let stage = MemoryStage::new();
        let err = resolve_instancer_chain(&stage, &[p("/nope"), p("/inst")]).unwrap_err();
        assert!(matches!(err, Error::Internal(InternalError::MissingNode(_))));
    }

    #[test]
    fn test_empty_and_single_link() {
        let stage = MemoryStage::new();
        assert!(resolve_instancer_chain(&stage, &[]).unwrap().is_empty());
        // One link needs no lookup at all.
        assert_eq!(resolve_instancer_chain(&stage, &[p("/a/b")]).unwrap(), p("/a/b"));
    }

    #[test]
    fn test_not_instanced_sentinel() {
        let r = InstanceIndexResolution::default();
        assert!(!r.is_instanced());
        assert_eq!(r.absolute_instance_index, ALL_INSTANCES);
    }
}
