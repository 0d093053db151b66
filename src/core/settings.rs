use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::raw::{RawObject, parse_or_fallback, parse_str_or_fallback};
use crate::error::{GalleryError, GalleryResult};

const DEFAULT_ENABLED: bool = true;
const DEFAULT_ALLOW_SHARED_IMAGES: bool = true;
const DEFAULT_HIDE_UNASSIGNED_IMAGES: bool = false;

/// Shop-level switches for storefront filtering.
///
/// Serializes to the persisted shape
/// `{"enabled":bool,"allowSharedImages":bool,"hideUnassignedImages":bool}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Storefront filtering runs at all.
    pub enabled: bool,
    /// One image may belong to several option values.
    pub allow_shared_images: bool,
    /// Images assigned to no option value are hidden instead of shown globally.
    pub hide_unassigned_images: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_ENABLED,
            allow_shared_images: DEFAULT_ALLOW_SHARED_IMAGES,
            hide_unassigned_images: DEFAULT_HIDE_UNASSIGNED_IMAGES,
        }
    }
}

impl Settings {
    /// Builds settings from any persisted value; never fails.
    #[must_use]
    pub fn from_raw(raw: &Value) -> Self {
        parse_or_fallback(raw, |object| Self::from_object(&object))
    }

    /// Builds settings from a persisted JSON string; never fails.
    #[must_use]
    pub fn from_json_lenient(raw: &str) -> Self {
        parse_str_or_fallback(raw, |object| Self::from_object(&object))
    }

    fn from_object(object: &RawObject) -> Self {
        Self {
            enabled: bool_field(object, "enabled", DEFAULT_ENABLED),
            allow_shared_images: bool_field(
                object,
                "allowSharedImages",
                DEFAULT_ALLOW_SHARED_IMAGES,
            ),
            hide_unassigned_images: bool_field(
                object,
                "hideUnassignedImages",
                DEFAULT_HIDE_UNASSIGNED_IMAGES,
            ),
        }
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_allow_shared_images(mut self, allow: bool) -> Self {
        self.allow_shared_images = allow;
        self
    }

    #[must_use]
    pub fn with_hide_unassigned_images(mut self, hide: bool) -> Self {
        self.hide_unassigned_images = hide;
        self
    }

    /// Serializes the persisted shape handed to the settings write-back.
    pub fn to_json(&self) -> GalleryResult<String> {
        serde_json::to_string(self)
            .map_err(|e| GalleryError::InvalidData(format!("failed to serialize settings: {e}")))
    }
}

/// Free-function form of [`Settings::from_raw`].
#[must_use]
pub fn normalize_settings(raw: &Value) -> Settings {
    Settings::from_raw(raw)
}

fn bool_field(object: &RawObject, key: &str, default: bool) -> bool {
    object.get(key).and_then(Value::as_bool).unwrap_or(default)
}
