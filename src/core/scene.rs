//! Traits for the scene-description collaborator.
//!
//! The adapter layer never owns scene data. It reads it through these
//! traits, which an actual scene store (or [`crate::memory::MemoryStage`])
//! implements.

use std::sync::Arc;

use crate::core::{Interpolation, ScenePath, TimeCode};
use crate::util::{DMat4, Value};

/// Shared handle to a scene node.
pub type NodeRef = Arc<dyn SceneNode>;

/// Shared handle to an attribute or primvar.
pub type AttributeRef = Arc<dyn Attribute>;

/// Name of the visibility attribute.
pub const VISIBILITY_ATTR: &str = "visibility";

/// Resolved visibility of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Visible unless an ancestor is invisible.
    #[default]
    Inherited,
    /// Hidden, along with all descendants.
    Invisible,
}

impl Visibility {
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "inherited" => Some(Self::Inherited),
            "invisible" => Some(Self::Invisible),
            _ => None,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Inherited => "inherited",
            Self::Invisible => "invisible",
        }
    }
}

/// A named, possibly time-sampled value on a node.
pub trait Attribute: Send + Sync {
    fn name(&self) -> &str;

    /// False only when the value is provably constant over time.
    fn value_might_be_time_varying(&self) -> bool;

    /// Value at `time`, or `None` if nothing is authored.
    fn get(&self, time: TimeCode) -> Option<Value>;

    /// Interpolation class (primvars only).
    fn interpolation(&self) -> Interpolation {
        Interpolation::Constant
    }
}

/// A node in the scene hierarchy.
pub trait SceneNode: Send + Sync {
    fn path(&self) -> &ScenePath;

    /// Parent node, `None` for the pseudo-root.
    fn parent(&self) -> Option<NodeRef>;

    /// Direct children.
    fn children(&self) -> Vec<NodeRef>;

    /// True for the pseudo-root at the top of the hierarchy.
    fn is_root(&self) -> bool;

    /// True for the root of a shared (master) subtree.
    fn is_master(&self) -> bool;

    /// True for a master root and everything beneath it.
    fn is_in_master(&self) -> bool;

    fn attribute(&self, name: &str) -> Option<AttributeRef>;

    /// Primvar authored directly on this node.
    fn primvar(&self, name: &str) -> Option<AttributeRef>;

    /// Constant-interpolation primvar authored on the nearest ancestor.
    fn inherited_primvar(&self, name: &str) -> Option<AttributeRef> {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.is_root() {
                break;
            }
            if let Some(pv) = node.primvar(name) {
                if pv.interpolation() == Interpolation::Constant {
                    return Some(pv);
                }
            }
            current = node.parent();
        }
        None
    }

    /// Local transform at `time`, `None` if the node is not transformable.
    fn local_transform(&self, _time: TimeCode) -> Option<DMat4> {
        None
    }

    /// True if this node's transform ignores its ancestors.
    fn resets_transform_stack(&self) -> bool {
        false
    }

    /// True unless the local transform is provably constant over time.
    fn transform_might_be_time_varying(&self) -> bool {
        false
    }

    /// Visibility authored on this node alone.
    fn authored_visibility(&self, time: TimeCode) -> Visibility {
        self.attribute(VISIBILITY_ATTR)
            .and_then(|attr| attr.get(time))
            .and_then(|v| v.as_token().and_then(Visibility::from_token))
            .unwrap_or_default()
    }

    /// Material bound directly on this node for `purpose`.
    fn direct_material_binding(&self, _purpose: &str) -> Option<ScenePath> {
        None
    }
}

/// Definition of a metadata field in the scene schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    /// Registered by a schema plugin rather than built in.
    pub is_plugin: bool,
}

impl FieldDefinition {
    pub fn builtin(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_plugin: false }
    }

    pub fn plugin(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_plugin: true }
    }
}

/// Access to the composed scene.
pub trait SceneStage: Send + Sync {
    /// Node at `path`, `None` if nothing exists there.
    fn node_at_path(&self, path: &ScenePath) -> Option<NodeRef>;

    /// Schema definition of a metadata field, `None` if unregistered.
    fn field_definition(&self, name: &str) -> Option<FieldDefinition>;
}
