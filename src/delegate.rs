//! The owning delegate.
//!
//! Adapters hold a borrowed `&dyn Delegate` and call back into it for the
//! current time, root transform, invised paths, the shared caches and the
//! scene itself. [`SceneDelegate`] is a complete implementation over any
//! [`SceneStage`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::cache::SharedCaches;
use crate::config::Config;
use crate::core::{NodeRef, SceneNode, SceneStage, ScenePath, TimeCode};
use crate::util::{DMat4, PerfCounters, IDENTITY};

/// Attribute holding a model's draw mode.
pub const DRAW_MODE_ATTR: &str = "model:drawMode";

/// How a model is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawMode {
    #[default]
    Default,
    Origin,
    Bounds,
    Cards,
}

impl DrawMode {
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "default" => Some(Self::Default),
            "origin" => Some(Self::Origin),
            "bounds" => Some(Self::Bounds),
            "cards" => Some(Self::Cards),
            _ => None,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Origin => "origin",
            Self::Bounds => "bounds",
            Self::Cards => "cards",
        }
    }
}

/// Callbacks adapters consume from the delegate that owns them.
pub trait Delegate: Send + Sync {
    fn stage(&self) -> &dyn SceneStage;

    fn caches(&self) -> &SharedCaches;

    fn perf_counters(&self) -> &PerfCounters;

    /// Current evaluation time.
    fn time(&self) -> TimeCode;

    /// Current time shifted by a relative sample offset.
    fn time_with_offset(&self, offset: f32) -> TimeCode {
        self.time().with_offset(offset)
    }

    /// Transform applied on top of every world transform.
    fn root_transform(&self) -> DMat4 {
        IDENTITY
    }

    /// True if `usd_path` was explicitly hidden by the application.
    fn is_in_invised_paths(&self, _usd_path: &ScenePath) -> bool {
        false
    }

    /// Render-index path of a scene path.
    fn path_for_index(&self, usd_path: &ScenePath) -> ScenePath {
        usd_path.clone()
    }

    /// Scene path of a render-index path; inverse of
    /// [`path_for_index`](Self::path_for_index).
    fn scene_path_for_index(&self, index_path: &ScenePath) -> ScenePath {
        index_path.clone()
    }

    /// True if the prim at `cache_path` is drawn refined.
    fn is_refined(&self, _cache_path: &ScenePath) -> bool {
        false
    }

    /// True for paths that name a delegate-generated child of a prim.
    fn is_child_path(&self, _path: &ScenePath) -> bool {
        false
    }

    /// Render-engine capability: can material networks be computed.
    fn can_compute_material_networks(&self) -> bool {
        false
    }

    fn model_draw_mode(&self, _node: &dyn SceneNode) -> DrawMode {
        DrawMode::Default
    }
}

/// Concrete delegate over a shared [`SceneStage`].
///
/// Time changes go through [`SceneDelegate::set_time`], which needs
/// `&mut self`; queries from adapters only need `&self` and may run in
/// parallel.
pub struct SceneDelegate {
    stage: Arc<dyn SceneStage>,
    caches: SharedCaches,
    perf: PerfCounters,
    time: TimeCode,
    delegate_id: ScenePath,
    root_transform: DMat4,
    invised: HashSet<ScenePath>,
    refine_levels: HashMap<ScenePath, i32>,
    material_networks: bool,
}

impl SceneDelegate {
    pub fn new(stage: Arc<dyn SceneStage>, config: Config) -> Self {
        Self {
            stage,
            caches: SharedCaches::new(config),
            perf: PerfCounters::new(),
            time: TimeCode::Default,
            delegate_id: ScenePath::absolute_root(),
            root_transform: IDENTITY,
            invised: HashSet::new(),
            refine_levels: HashMap::new(),
            material_networks: false,
        }
    }

    /// Render-index prefix under which this delegate's prims live.
    pub fn with_delegate_id(mut self, delegate_id: ScenePath) -> Self {
        self.delegate_id = delegate_id;
        self
    }

    pub fn with_material_networks(mut self, enabled: bool) -> Self {
        self.material_networks = enabled;
        self
    }

    /// Move to a new evaluation time, invalidating the shared caches.
    pub fn set_time(&mut self, time: TimeCode) {
        self.time = time;
        self.caches.set_time(time);
    }

    pub fn set_root_transform(&mut self, m: DMat4) {
        self.root_transform = m;
    }

    pub fn set_invised_paths(&mut self, paths: impl IntoIterator<Item = ScenePath>) {
        self.invised = paths.into_iter().collect();
    }

    pub fn set_rigid_xform_overrides(&mut self, overrides: HashMap<ScenePath, DMat4>) {
        self.caches.xform_mut().set_overrides(overrides);
    }

    pub fn set_refine_level(&mut self, cache_path: ScenePath, level: i32) {
        self.refine_levels.insert(cache_path, level);
    }

    pub fn caches_mut(&mut self) -> &mut SharedCaches {
        &mut self.caches
    }

    /// Node at `path`, if it exists.
    pub fn node(&self, path: &ScenePath) -> Option<NodeRef> {
        self.stage.node_at_path(path)
    }
}

impl Delegate for SceneDelegate {
    fn stage(&self) -> &dyn SceneStage {
        self.stage.as_ref()
    }

    fn caches(&self) -> &SharedCaches {
        &self.caches
    }

    fn perf_counters(&self) -> &PerfCounters {
        &self.perf
    }

    fn time(&self) -> TimeCode {
        self.time
    }

    fn root_transform(&self) -> DMat4 {
        self.root_transform
    }

    fn is_in_invised_paths(&self, usd_path: &ScenePath) -> bool {
        self.invised.contains(usd_path)
    }

    fn path_for_index(&self, usd_path: &ScenePath) -> ScenePath {
        if self.delegate_id.is_absolute_root() {
            return usd_path.clone();
        }
        usd_path.replace_prefix(&ScenePath::absolute_root(), &self.delegate_id)
    }

    fn scene_path_for_index(&self, index_path: &ScenePath) -> ScenePath {
        if self.delegate_id.is_absolute_root() {
            return index_path.clone();
        }
        index_path.replace_prefix(&self.delegate_id, &ScenePath::absolute_root())
    }

    fn is_refined(&self, cache_path: &ScenePath) -> bool {
        self.refine_levels.get(cache_path).is_some_and(|l| *l > 0)
    }

    fn can_compute_material_networks(&self) -> bool {
        self.material_networks
    }

    fn model_draw_mode(&self, node: &dyn SceneNode) -> DrawMode {
        node.attribute(DRAW_MODE_ATTR)
            .and_then(|attr| attr.get(TimeCode::Default))
            .and_then(|v| v.as_token().and_then(DrawMode::from_token))
            .unwrap_or_default()
    }
}
