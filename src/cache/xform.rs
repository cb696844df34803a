//! Shared world-transform cache.
//!
//! World transforms are resolved top-down: a node's value is its parent's
//! cached value composed with its own local transform, so siblings share
//! the ancestor work. Rigid-transform overrides replace a node's world
//! transform outright, and a node that resets the transform stack ignores
//! its ancestors.

use std::collections::HashMap;

use crate::core::{SceneNode, ScenePath, TimeCode};
use crate::util::{compose, DMat4, IDENTITY};

use super::store::{CacheStats, TimedStore};

/// Time-invariant transform facts about one node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct XformQuery {
    /// Local transform is not provably constant.
    pub might_vary: bool,
    /// Node ignores ancestor transforms.
    pub resets_stack: bool,
}

impl XformQuery {
    pub fn from_node(node: &dyn SceneNode) -> Self {
        Self {
            might_vary: node.transform_might_be_time_varying(),
            resets_stack: node.resets_transform_stack(),
        }
    }
}

/// World-transform cache stamped with one evaluation time.
pub struct XformCache {
    values: TimedStore<DMat4>,
    queries: TimedStore<XformQuery>,
    root_path: ScenePath,
    overrides: HashMap<ScenePath, DMat4>,
}

impl XformCache {
    pub fn new(time: TimeCode) -> Self {
        Self {
            values: TimedStore::new(time),
            queries: TimedStore::new(time),
            root_path: ScenePath::absolute_root(),
            overrides: HashMap::new(),
        }
    }

    #[inline]
    pub fn time(&self) -> TimeCode {
        self.values.time()
    }

    /// Stamp a new time; drops every cached value if it changed.
    pub fn set_time(&mut self, time: TimeCode) -> bool {
        self.queries.set_time(time);
        self.values.set_time(time)
    }

    /// Transforms are computed relative to this node; it and its
    /// ancestors contribute identity.
    pub fn root_path(&self) -> &ScenePath {
        &self.root_path
    }

    pub fn set_root_path(&mut self, root_path: ScenePath) {
        self.root_path = root_path;
        self.values.clear();
    }

    pub fn overrides(&self) -> &HashMap<ScenePath, DMat4> {
        &self.overrides
    }

    /// Replace the rigid-transform overrides and invalidate.
    pub fn set_overrides(&mut self, overrides: HashMap<ScenePath, DMat4>) {
        self.overrides = overrides;
        self.values.clear();
    }

    /// World transform of `node` at the cache time.
    pub fn value(&self, node: &dyn SceneNode) -> DMat4 {
        if let Some(v) = self.values.get(node.path()) {
            return v;
        }
        let v = self.compute_inherited(node);
        self.values.get_or_insert(node.path(), v)
    }

    /// Cached variability facts for `node`.
    pub fn query(&self, node: &dyn SceneNode) -> XformQuery {
        if let Some(q) = self.queries.get(node.path()) {
            return q;
        }
        self.queries.get_or_insert(node.path(), XformQuery::from_node(node))
    }

    pub fn stats(&self) -> CacheStats {
        self.values.stats()
    }

    fn compute_inherited(&self, node: &dyn SceneNode) -> DMat4 {
        if node.is_root() || *node.path() == self.root_path {
            return IDENTITY;
        }
        if let Some(m) = self.overrides.get(node.path()) {
            return *m;
        }
        let local = node.local_transform(self.time()).unwrap_or(IDENTITY);
        if node.resets_transform_stack() {
            return local;
        }
        match node.parent() {
            Some(parent) => compose(&self.value(parent.as_ref()), &local),
            None => local,
        }
    }
}

/// Direct (uncached) world transform of `node` at `time`.
///
/// Walks from the node towards `root_path`, stopping at the first override
/// or transform-stack reset.
pub fn compute_transform(
    node: &dyn SceneNode,
    root_path: &ScenePath,
    time: TimeCode,
    overrides: &HashMap<ScenePath, DMat4>,
) -> DMat4 {
    let mut ctm = IDENTITY;
    if node.is_root() || node.path() == root_path {
        return ctm;
    }
    if let Some(m) = overrides.get(node.path()) {
        return *m;
    }
    if let Some(local) = node.local_transform(time) {
        ctm = local;
    }
    if node.resets_transform_stack() {
        return ctm;
    }

    let mut current = node.parent();
    while let Some(p) = current {
        if p.is_root() || p.path() == root_path {
            break;
        }
        if let Some(m) = overrides.get(p.path()) {
            ctm = *m * ctm;
            break;
        }
        if let Some(local) = p.local_transform(time) {
            ctm = local * ctm;
        }
        if p.resets_transform_stack() {
            break;
        }
        current = p.parent();
    }
    ctm
}
