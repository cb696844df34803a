//! Time-sampling of attribute values around the current time.
//!
//! A sample request carries relative offsets (shutter-style, e.g.
//! `[-0.25, 0.0, 0.25]`) and a capacity. Time-invariant sources always
//! produce exactly one sample at offset zero.

use crate::core::{SceneNode, TimeCode};
use crate::util::Value;

/// Parallel arrays of relative sample times and the values found there.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSamples<V> {
    pub times: Vec<f32>,
    pub values: Vec<V>,
}

impl<V> TimeSamples<V> {
    pub fn new() -> Self {
        Self { times: Vec::new(), values: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            times: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, time: f32, value: V) {
        self.times.push(time);
        self.values.push(value);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Iterate `(relative time, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f32, &V)> {
        self.times.iter().copied().zip(self.values.iter())
    }
}

impl<V> Default for TimeSamples<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample a value source.
///
/// * `might_vary` false: one sample at offset 0, evaluated at `time`.
/// * `might_vary` true: the first `min(max_samples, offsets.len())`
///   offsets, each evaluated at `time_with_offset(offset)`.
///
/// `max_samples == 0` always yields nothing.
pub fn sample_values<V>(
    might_vary: bool,
    time: TimeCode,
    offsets: &[f32],
    max_samples: usize,
    time_with_offset: impl Fn(f32) -> TimeCode,
    mut eval: impl FnMut(TimeCode) -> V,
) -> TimeSamples<V> {
    if max_samples == 0 {
        return TimeSamples::new();
    }
    if !might_vary {
        let mut out = TimeSamples::with_capacity(1);
        out.push(0.0, eval(time));
        return out;
    }

    let n = max_samples.min(offsets.len());
    let mut out = TimeSamples::with_capacity(n);
    for &offset in &offsets[..n] {
        out.push(offset, eval(time_with_offset(offset)));
    }
    out
}

/// Sample the primvar or attribute `key` on `node`.
///
/// Lookup order is the node's own primvar, then a constant primvar
/// inherited from an ancestor, then a plain attribute. Nothing found gives
/// zero samples. A read that finds no value still occupies its slot, as
/// [`Value::Empty`].
#[tracing::instrument(skip_all, fields(path = %node.path(), key = %key, max_samples = max_samples))]
pub fn sample_primvar(
    node: &dyn SceneNode,
    key: &str,
    time: TimeCode,
    offsets: &[f32],
    max_samples: usize,
    time_with_offset: impl Fn(f32) -> TimeCode,
) -> TimeSamples<Value> {
    let source = node
        .primvar(key)
        .or_else(|| node.inherited_primvar(key))
        .or_else(|| node.attribute(key));
    let Some(source) = source else {
        tracing::trace!("no source");
        return TimeSamples::new();
    };

    sample_values(
        source.value_might_be_time_varying(),
        time,
        offsets,
        max_samples,
        time_with_offset,
        |t| source.get(t).unwrap_or_default(),
    )
}
