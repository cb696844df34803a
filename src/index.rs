//! Render-index collaborator.
//!
//! Adapters never talk to the render engine directly. They insert, remove
//! and invalidate prims through an [`IndexProxy`], which the owning delegate
//! provides for the duration of a population or change-processing pass.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::{CachePath, DirtyBits, ScenePath};

/// Mutations and queries an adapter may issue against the render index.
pub trait IndexProxy {
    /// Insert a render prim for the scene node at `usd_path`.
    fn insert_rprim(&mut self, cache_path: &CachePath, usd_path: &ScenePath, instancer: Option<&CachePath>);

    /// Insert an instancer for the scene node at `usd_path`.
    fn insert_instancer(&mut self, cache_path: &CachePath, usd_path: &ScenePath);

    fn remove_rprim(&mut self, cache_path: &CachePath);

    fn remove_instancer(&mut self, cache_path: &CachePath);

    /// Drop the delegate's per-scene-path bookkeeping.
    fn remove_prim_info(&mut self, usd_path: &ScenePath);

    /// Queue `cache_path` for population in the next pass.
    fn repopulate(&mut self, cache_path: &CachePath);

    /// Union `bits` into a render prim's dirty state.
    fn mark_rprim_dirty(&mut self, cache_path: &CachePath, bits: DirtyBits);

    /// Union `bits` into an instancer's dirty state.
    fn mark_instancer_dirty(&mut self, cache_path: &CachePath, bits: DirtyBits);

    fn is_populated(&self, cache_path: &CachePath) -> bool;

    /// All render prims at or below `root`.
    fn rprim_subtree(&self, root: &CachePath) -> Vec<CachePath>;
}

/// Render prim record held by [`MemoryIndex`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RprimEntry {
    pub usd_path: ScenePath,
    pub instancer: Option<CachePath>,
    pub dirty: DirtyBits,
}

/// Instancer record held by [`MemoryIndex`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstancerEntry {
    pub usd_path: ScenePath,
    pub dirty: DirtyBits,
}

/// Ordered in-memory render index.
///
/// Dirty bits only accumulate here; clearing them is the render engine's
/// sync step, modelled by [`MemoryIndex::mark_clean`].
#[derive(Debug, Default)]
pub struct MemoryIndex {
    rprims: BTreeMap<CachePath, RprimEntry>,
    instancers: BTreeMap<CachePath, InstancerEntry>,
    prim_infos: BTreeSet<ScenePath>,
    repopulate: Vec<CachePath>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rprim(&self, cache_path: &CachePath) -> Option<&RprimEntry> {
        self.rprims.get(cache_path)
    }

    pub fn instancer(&self, cache_path: &CachePath) -> Option<&InstancerEntry> {
        self.instancers.get(cache_path)
    }

    /// Dirty bits of a render prim or instancer (`CLEAN` if absent).
    pub fn dirty_bits(&self, cache_path: &CachePath) -> DirtyBits {
        self.rprims
            .get(cache_path)
            .map(|e| e.dirty)
            .or_else(|| self.instancers.get(cache_path).map(|e| e.dirty))
            .unwrap_or(DirtyBits::CLEAN)
    }

    /// Render-engine sync: reset a prim's dirty bits.
    pub fn mark_clean(&mut self, cache_path: &CachePath) {
        if let Some(e) = self.rprims.get_mut(cache_path) {
            e.dirty = DirtyBits::CLEAN;
        }
        if let Some(e) = self.instancers.get_mut(cache_path) {
            e.dirty = DirtyBits::CLEAN;
        }
    }

    pub fn has_prim_info(&self, usd_path: &ScenePath) -> bool {
        self.prim_infos.contains(usd_path)
    }

    /// Paths queued for repopulation, in request order.
    pub fn pending_repopulation(&self) -> &[CachePath] {
        &self.repopulate
    }

    pub fn take_repopulation(&mut self) -> Vec<CachePath> {
        std::mem::take(&mut self.repopulate)
    }

    pub fn rprim_paths(&self) -> impl Iterator<Item = &CachePath> {
        self.rprims.keys()
    }

    pub fn num_rprims(&self) -> usize {
        self.rprims.len()
    }

    pub fn num_instancers(&self) -> usize {
        self.instancers.len()
    }
}

impl IndexProxy for MemoryIndex {
    fn insert_rprim(&mut self, cache_path: &CachePath, usd_path: &ScenePath, instancer: Option<&CachePath>) {
        self.prim_infos.insert(usd_path.clone());
        self.rprims.insert(
            cache_path.clone(),
            RprimEntry {
                usd_path: usd_path.clone(),
                instancer: instancer.cloned(),
                dirty: DirtyBits::ALL_DIRTY,
            },
        );
    }

    fn insert_instancer(&mut self, cache_path: &CachePath, usd_path: &ScenePath) {
        self.prim_infos.insert(usd_path.clone());
        self.instancers.insert(
            cache_path.clone(),
            InstancerEntry {
                usd_path: usd_path.clone(),
                dirty: DirtyBits::ALL_DIRTY,
            },
        );
    }

    fn remove_rprim(&mut self, cache_path: &CachePath) {
        self.rprims.remove(cache_path);
    }

    fn remove_instancer(&mut self, cache_path: &CachePath) {
        self.instancers.remove(cache_path);
    }

    fn remove_prim_info(&mut self, usd_path: &ScenePath) {
        self.prim_infos.remove(usd_path);
    }

    fn repopulate(&mut self, cache_path: &CachePath) {
        if !self.repopulate.contains(cache_path) {
            self.repopulate.push(cache_path.clone());
        }
    }

    fn mark_rprim_dirty(&mut self, cache_path: &CachePath, bits: DirtyBits) {
        match self.rprims.get_mut(cache_path) {
            Some(e) => e.dirty |= bits,
            None => tracing::warn!(path = %cache_path, "mark_rprim_dirty on unknown rprim"),
        }
    }

    fn mark_instancer_dirty(&mut self, cache_path: &CachePath, bits: DirtyBits) {
        match self.instancers.get_mut(cache_path) {
            Some(e) => e.dirty |= bits,
            None => tracing::warn!(path = %cache_path, "mark_instancer_dirty on unknown instancer"),
        }
    }

    fn is_populated(&self, cache_path: &CachePath) -> bool {
        self.rprims.contains_key(cache_path) || self.instancers.contains_key(cache_path)
    }

    fn rprim_subtree(&self, root: &CachePath) -> Vec<CachePath> {
        // Paths are ordered, so a subtree is a contiguous run; `/a/b` and
        // `/a/b-c` are not related and are filtered by `has_prefix`.
        self.rprims
            .range(root.clone()..)
            .map(|(p, _)| p)
            .take_while(|p| p.as_str().starts_with(root.as_str()))
            .filter(|p| p.has_prefix(root))
            .cloned()
            .collect()
    }
}
