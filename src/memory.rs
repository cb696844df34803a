//! In-memory scene description.
//!
//! A small, mutable implementation of the scene traits. It backs the tests
//! and lets the adapter layer be driven without an external scene store.
//! Time samples use held interpolation: a query returns the last sample at
//! or before the requested time.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::{
    Attribute, AttributeRef, FieldDefinition, Interpolation, NodeRef, SceneNode, SceneStage,
    ScenePath, TimeCode, Visibility, VISIBILITY_ATTR,
};
use crate::util::{DMat4, Result, Value};

/// A value with an optional default and time samples sorted by time.
#[derive(Clone, Debug)]
pub struct SampledValue<T> {
    default: Option<T>,
    samples: Vec<(f64, T)>,
}

impl<T: Clone> SampledValue<T> {
    /// Constant value, authored as the default.
    pub fn uniform(value: T) -> Self {
        Self { default: Some(value), samples: Vec::new() }
    }

    /// Time-sampled value. Samples are sorted by time.
    pub fn sampled(mut samples: Vec<(f64, T)>) -> Self {
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { default: None, samples }
    }

    /// More than one time sample means the value may vary.
    pub fn might_vary(&self) -> bool {
        self.samples.len() > 1
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn eval(&self, time: TimeCode) -> Option<T> {
        let t = match time {
            TimeCode::Default => {
                return self
                    .default
                    .clone()
                    .or_else(|| self.samples.first().map(|(_, v)| v.clone()));
            }
            TimeCode::Numeric(t) => t,
        };
        if self.samples.is_empty() {
            return self.default.clone();
        }
        // Index of first sample strictly after t.
        let idx = self.samples.partition_point(|(st, _)| *st <= t);
        let idx = idx.saturating_sub(1);
        Some(self.samples[idx].1.clone())
    }
}

/// Attribute or primvar stored in a [`MemoryStage`].
#[derive(Clone, Debug)]
pub struct MemoryAttribute {
    name: String,
    value: SampledValue<Value>,
    interpolation: Interpolation,
}

impl MemoryAttribute {
    pub fn uniform(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: SampledValue::uniform(value.into()),
            interpolation: Interpolation::Constant,
        }
    }

    pub fn sampled(name: impl Into<String>, samples: Vec<(f64, Value)>) -> Self {
        Self {
            name: name.into(),
            value: SampledValue::sampled(samples),
            interpolation: Interpolation::Constant,
        }
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }
}

impl Attribute for MemoryAttribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn value_might_be_time_varying(&self) -> bool {
        self.value.might_vary()
    }

    fn get(&self, time: TimeCode) -> Option<Value> {
        self.value.eval(time)
    }

    fn interpolation(&self) -> Interpolation {
        self.interpolation
    }
}

#[derive(Clone, Debug, Default)]
struct NodeSpec {
    is_master: bool,
    attributes: HashMap<String, Arc<MemoryAttribute>>,
    primvars: HashMap<String, Arc<MemoryAttribute>>,
    transform: Option<SampledValue<DMat4>>,
    resets_xform_stack: bool,
    material_bindings: HashMap<String, ScenePath>,
}

#[derive(Default)]
struct StageData {
    nodes: RwLock<BTreeMap<ScenePath, NodeSpec>>,
    fields: RwLock<HashMap<String, FieldDefinition>>,
}

/// Mutable in-memory scene.
///
/// Cloning shares the underlying data. Setters define the target node (and
/// its ancestors) if it does not exist yet.
#[derive(Clone, Default)]
pub struct MemoryStage {
    data: Arc<StageData>,
}

impl MemoryStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a node and any missing ancestors.
    pub fn define(&self, path: &str) -> Result<ScenePath> {
        let path = ScenePath::new(path)?;
        self.edit(&path, |_| {});
        Ok(path)
    }

    /// Remove a node and its whole subtree.
    pub fn remove(&self, path: &ScenePath) {
        let mut nodes = self.data.nodes.write();
        nodes.retain(|p, _| !p.has_prefix(path));
    }

    pub fn set_master(&self, path: &ScenePath, is_master: bool) {
        self.edit(path, |spec| spec.is_master = is_master);
    }

    pub fn set_attribute(&self, path: &ScenePath, attr: MemoryAttribute) {
        self.edit(path, |spec| {
            spec.attributes.insert(attr.name.clone(), Arc::new(attr));
        });
    }

    pub fn set_primvar(&self, path: &ScenePath, primvar: MemoryAttribute) {
        self.edit(path, |spec| {
            spec.primvars.insert(primvar.name.clone(), Arc::new(primvar));
        });
    }

    /// Author the visibility token.
    pub fn set_visibility(&self, path: &ScenePath, vis: Visibility) {
        self.set_attribute(path, MemoryAttribute::uniform(VISIBILITY_ATTR, Value::token(vis.as_token())));
    }

    pub fn set_transform(&self, path: &ScenePath, transform: SampledValue<DMat4>) {
        self.edit(path, |spec| spec.transform = Some(transform));
    }

    pub fn set_resets_transform_stack(&self, path: &ScenePath, resets: bool) {
        self.edit(path, |spec| spec.resets_xform_stack = resets);
    }

    /// Bind `material` to the node for `purpose` (`""` is all-purpose).
    pub fn bind_material(&self, path: &ScenePath, purpose: &str, material: ScenePath) {
        self.edit(path, |spec| {
            spec.material_bindings.insert(purpose.to_string(), material);
        });
    }

    /// Register a metadata field in the schema.
    pub fn register_field(&self, field: FieldDefinition) {
        self.data.fields.write().insert(field.name.clone(), field);
    }

    /// Number of defined nodes (excluding the pseudo-root).
    pub fn len(&self) -> usize {
        self.data.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn edit(&self, path: &ScenePath, f: impl FnOnce(&mut NodeSpec)) {
        if path.is_empty() || path.is_absolute_root() {
            return;
        }
        let mut nodes = self.data.nodes.write();
        let mut ancestor = path.parent();
        while !ancestor.is_empty() && !ancestor.is_absolute_root() {
            nodes.entry(ancestor.clone()).or_default();
            ancestor = ancestor.parent();
        }
        f(nodes.entry(path.clone()).or_default());
    }
}

impl SceneStage for MemoryStage {
    fn node_at_path(&self, path: &ScenePath) -> Option<NodeRef> {
        if path.is_empty() {
            return None;
        }
        if !path.is_absolute_root() && !self.data.nodes.read().contains_key(path) {
            return None;
        }
        Some(Arc::new(MemoryNode {
            data: Arc::clone(&self.data),
            path: path.clone(),
        }))
    }

    fn field_definition(&self, name: &str) -> Option<FieldDefinition> {
        self.data.fields.read().get(name).cloned()
    }
}

/// Handle to a node in a [`MemoryStage`].
struct MemoryNode {
    data: Arc<StageData>,
    path: ScenePath,
}

impl MemoryNode {
    fn with_spec<R>(&self, f: impl FnOnce(&NodeSpec) -> R) -> Option<R> {
        self.data.nodes.read().get(&self.path).map(f)
    }
}

impl SceneNode for MemoryNode {
    fn path(&self) -> &ScenePath {
        &self.path
    }

    fn parent(&self) -> Option<NodeRef> {
        if self.path.is_absolute_root() {
            return None;
        }
        Some(Arc::new(MemoryNode {
            data: Arc::clone(&self.data),
            path: self.path.parent(),
        }))
    }

    fn children(&self) -> Vec<NodeRef> {
        let depth = self.path.depth() + 1;
        let nodes = self.data.nodes.read();
        nodes
            .range(self.path.clone()..)
            .map(|(p, _)| p)
            .take_while(|p| p.as_str().starts_with(self.path.as_str()))
            .filter(|p| p.depth() == depth && p.has_prefix(&self.path))
            .map(|p| {
                Arc::new(MemoryNode {
                    data: Arc::clone(&self.data),
                    path: p.clone(),
                }) as NodeRef
            })
            .collect()
    }

    fn is_root(&self) -> bool {
        self.path.is_absolute_root()
    }

    fn is_master(&self) -> bool {
        self.with_spec(|s| s.is_master).unwrap_or(false)
    }

    fn is_in_master(&self) -> bool {
        let nodes = self.data.nodes.read();
        let mut current = self.path.clone();
        while !current.is_empty() && !current.is_absolute_root() {
            if nodes.get(&current).is_some_and(|s| s.is_master) {
                return true;
            }
            current = current.parent();
        }
        false
    }

    fn attribute(&self, name: &str) -> Option<AttributeRef> {
        self.with_spec(|s| s.attributes.get(name).map(|a| Arc::clone(a) as AttributeRef))
            .flatten()
    }

    fn primvar(&self, name: &str) -> Option<AttributeRef> {
        self.with_spec(|s| s.primvars.get(name).map(|a| Arc::clone(a) as AttributeRef))
            .flatten()
    }

    fn local_transform(&self, time: TimeCode) -> Option<DMat4> {
        self.with_spec(|s| s.transform.as_ref().and_then(|t| t.eval(time)))
            .flatten()
    }

    fn resets_transform_stack(&self) -> bool {
        self.with_spec(|s| s.resets_xform_stack).unwrap_or(false)
    }

    fn transform_might_be_time_varying(&self) -> bool {
        self.with_spec(|s| s.transform.as_ref().is_some_and(|t| t.might_vary()))
            .unwrap_or(false)
    }

    fn direct_material_binding(&self, purpose: &str) -> Option<ScenePath> {
        self.with_spec(|s| {
            s.material_bindings
                .get(purpose)
                .or_else(|| s.material_bindings.get(""))
                .cloned()
        })
        .flatten()
    }
}
