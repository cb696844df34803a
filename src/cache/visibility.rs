//! Shared visibility cache.
//!
//! Visibility is inherited: a node is invisible if it, or any ancestor, has
//! `visibility = invisible` authored at the evaluation time.

use crate::core::{SceneNode, TimeCode, Visibility};

use super::store::{CacheStats, TimedStore};

/// Resolved-visibility cache stamped with one evaluation time.
pub struct VisCache {
    values: TimedStore<Visibility>,
}

impl VisCache {
    pub fn new(time: TimeCode) -> Self {
        Self { values: TimedStore::new(time) }
    }

    #[inline]
    pub fn time(&self) -> TimeCode {
        self.values.time()
    }

    pub fn set_time(&mut self, time: TimeCode) -> bool {
        self.values.set_time(time)
    }

    /// Resolved visibility of `node` at the cache time.
    pub fn value(&self, node: &dyn SceneNode) -> Visibility {
        if let Some(v) = self.values.get(node.path()) {
            return v;
        }
        let v = self.compute_inherited(node);
        self.values.get_or_insert(node.path(), v)
    }

    pub fn stats(&self) -> CacheStats {
        self.values.stats()
    }

    fn compute_inherited(&self, node: &dyn SceneNode) -> Visibility {
        if node.is_root() {
            return Visibility::Inherited;
        }
        if let Some(parent) = node.parent() {
            if self.value(parent.as_ref()) == Visibility::Invisible {
                return Visibility::Invisible;
            }
        }
        node.authored_visibility(self.time())
    }
}

/// Direct (uncached) visibility of `node` at `time`.
pub fn compute_visibility(node: &dyn SceneNode, time: TimeCode) -> Visibility {
    if node.is_root() {
        return Visibility::Inherited;
    }
    if node.authored_visibility(time) == Visibility::Invisible {
        return Visibility::Invisible;
    }
    let mut current = node.parent();
    while let Some(p) = current {
        if p.is_root() {
            break;
        }
        if p.authored_visibility(time) == Visibility::Invisible {
            return Visibility::Invisible;
        }
        current = p.parent();
    }
    Visibility::Inherited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SceneStage, ScenePath, VISIBILITY_ATTR};
    use crate::memory::{MemoryAttribute, MemoryStage};
    use crate::util::Value;

    #[test]
    fn test_invisible_ancestor_hides_subtree() {
        let stage = MemoryStage::new();
        let leaf = stage.define("/World/group/leaf").unwrap();
        let sibling = stage.define("/World/other").unwrap();
        stage.set_visibility(&ScenePath::new("/World/group").unwrap(), Visibility::Invisible);

        let cache = VisCache::new(TimeCode::Default);
        let leaf = stage.node_at_path(&leaf).unwrap();
        let sibling = stage.node_at_path(&sibling).unwrap();

        assert_eq!(cache.value(leaf.as_ref()), Visibility::Invisible);
        assert_eq!(cache.value(sibling.as_ref()), Visibility::Inherited);
        assert_eq!(compute_visibility(leaf.as_ref(), TimeCode::Default), Visibility::Invisible);
        assert_eq!(compute_visibility(sibling.as_ref(), TimeCode::Default), Visibility::Inherited);
    }

    #[test]
    fn test_animated_visibility_needs_new_epoch() {
        let stage = MemoryStage::new();
        let p = stage.define("/World/blink").unwrap();
        stage.set_attribute(
            &p,
            MemoryAttribute::sampled(
                VISIBILITY_ATTR,
                vec![
                    (0.0, Value::token("inherited")),
                    (1.0, Value::token("invisible")),
                ],
            ),
        );
        let node = stage.node_at_path(&p).unwrap();

        let mut cache = VisCache::new(TimeCode::new(0.0));
        assert_eq!(cache.value(node.as_ref()), Visibility::Inherited);
        assert_eq!(cache.value(node.as_ref()), Visibility::Inherited);
        assert_eq!(cache.stats().hits, 1);

        assert!(cache.set_time(TimeCode::new(1.0)));
        assert_eq!(cache.value(node.as_ref()), Visibility::Invisible);
    }
}
