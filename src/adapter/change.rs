//! Default classification of metadata changes.

use crate::core::{DirtyBits, SceneStage};

/// Dirty bits for a set of changed metadata fields.
///
/// Built-in fields are handled by the adapters that understand them, so
/// they contribute nothing here. Any field registered by a schema plugin has
/// unknown consequences and invalidates everything.
pub fn classify_changed_fields(stage: &dyn SceneStage, changed_fields: &[&str]) -> DirtyBits {
    let plugin_field = changed_fields
        .iter()
        .find(|name| stage.field_definition(name).is_some_and(|def| def.is_plugin));

    match plugin_field {
        Some(name) => {
            tracing::debug!(field = %name, "plugin field changed");
            DirtyBits::ALL_DIRTY
        }
        None => DirtyBits::CLEAN,
    }
}
