use serde::{Deserialize, Serialize};

use crate::error::{GalleryError, GalleryResult};

/// Runtime tuning for [`super::GalleryEngine`].
///
/// Serializable so a host can ship it next to the bootstrap payload; every
/// field has a default, so partial documents load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryEngineConfig {
    /// Query parameter that carries the selected variant in product URLs.
    #[serde(default = "default_variant_query_param")]
    pub variant_query_param: String,
    /// Activate the first visible slide when the active one gets hidden.
    #[serde(default = "default_recover_active_slide")]
    pub recover_active_slide: bool,
    /// Skip recomputation when the same variant is reported twice in a row.
    #[serde(default = "default_dedupe_repeated_variant")]
    pub dedupe_repeated_variant: bool,
}

impl Default for GalleryEngineConfig {
    fn default() -> Self {
        Self {
            variant_query_param: default_variant_query_param(),
            recover_active_slide: default_recover_active_slide(),
            dedupe_repeated_variant: default_dedupe_repeated_variant(),
        }
    }
}

impl GalleryEngineConfig {
    #[must_use]
    pub fn with_variant_query_param(mut self, param: impl Into<String>) -> Self {
        self.variant_query_param = param.into();
        self
    }

    #[must_use]
    pub fn with_recover_active_slide(mut self, enabled: bool) -> Self {
        self.recover_active_slide = enabled;
        self
    }

    #[must_use]
    pub fn with_dedupe_repeated_variant(mut self, enabled: bool) -> Self {
        self.dedupe_repeated_variant = enabled;
        self
    }

    pub fn to_json_pretty(&self) -> GalleryResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            GalleryError::InvalidData(format!("failed to serialize engine config: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> GalleryResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            GalleryError::InvalidData(format!("failed to parse engine config: {e}"))
        })?;
        if config.variant_query_param.trim().is_empty() {
            return Err(GalleryError::InvalidData(
                "variant_query_param must not be empty".to_owned(),
            ));
        }
        Ok(config)
    }
}

fn default_variant_query_param() -> String {
    "variant".to_owned()
}

fn default_recover_active_slide() -> bool {
    true
}

fn default_dedupe_repeated_variant() -> bool {
    true
}
