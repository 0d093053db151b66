//! Static payload shared between server-side normalization and the storefront
//! engine.
//!
//! Field names are fixed (`mapping`, `imageUrls`, `initialVariantId`,
//! `settings`, `optionNames`, `variantOptions`); storefront scripts parse
//! them by name.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::raw::{RawObject, parse_or_fallback, parse_str_or_fallback};
use crate::core::{
    CanonicalMapping, ImageId, ImageIdentityTable, ProductSnapshot, Settings, VariantId,
    VariantOptionTable,
};
use crate::error::{GalleryError, GalleryResult};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontBootstrap {
    /// `None` leaves every selection fail-closed.
    pub mapping: Option<CanonicalMapping>,
    #[serde(default)]
    pub image_urls: ImageIdentityTable,
    #[serde(default)]
    pub initial_variant_id: Option<VariantId>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub option_names: Vec<String>,
    #[serde(default)]
    pub variant_options: VariantOptionTable,
}

impl StorefrontBootstrap {
    /// Builds the payload for one product page.
    ///
    /// `initial_variant` falls back to the product's first variant when it is
    /// absent or not one of the product's variants.
    #[must_use]
    pub fn from_product(
        product: &ProductSnapshot,
        settings: Settings,
        initial_variant: Option<&str>,
    ) -> Self {
        let variant_options = product.variant_option_table();
        let initial_variant_id = initial_variant
            .and_then(VariantId::parse)
            .filter(|id| variant_options.contains_key(id))
            .or_else(|| variant_options.keys().next().cloned());
        let mapping = product.normalized_mapping();
        debug!(
            product_id = product.id.as_str(),
            mapped_values = mapping.mapping.len(),
            images = product.images.len(),
            variants = variant_options.len(),
            "built storefront bootstrap"
        );
        Self {
            mapping: Some(mapping),
            image_urls: product.image_identity_table(),
            initial_variant_id,
            settings,
            option_names: product.option_names(),
            variant_options,
        }
    }

    pub fn to_json(&self) -> GalleryResult<String> {
        serde_json::to_string(self).map_err(|e| {
            GalleryError::InvalidData(format!("failed to serialize storefront bootstrap: {e}"))
        })
    }

    /// JSON safe to inline in a `<script type="application/json">` element.
    pub fn to_script_json(&self) -> GalleryResult<String> {
        // `<` only occurs inside JSON strings, where the escape is equivalent.
        Ok(self.to_json()?.replace('<', "\\u003c"))
    }

    /// Strict parse; any malformed field is an error.
    pub fn from_json_str(input: &str) -> GalleryResult<Self> {
        serde_json::from_str(input).map_err(|e| {
            GalleryError::InvalidData(format!("failed to parse storefront bootstrap: {e}"))
        })
    }

    /// Field-by-field tolerant parse used by the storefront runtime.
    ///
    /// A broken field degrades on its own: an unusable mapping becomes `None`
    /// (fail-closed), broken settings become defaults, malformed table entries
    /// are skipped.
    #[must_use]
    pub fn from_json_lenient(input: &str) -> Self {
        parse_str_or_fallback(input, |object| Self::from_object(&object))
    }

    #[must_use]
    pub fn from_value_lenient(raw: &Value) -> Self {
        parse_or_fallback(raw, |object| Self::from_object(&object))
    }

    fn from_object(object: &RawObject) -> Self {
        let field = |key: &str| object.get(key).unwrap_or(&Value::Null);
        let payload = Self {
            mapping: CanonicalMapping::from_value_lenient(field("mapping")),
            image_urls: image_urls_from(field("imageUrls")),
            initial_variant_id: VariantId::from_value(field("initialVariantId")),
            settings: Settings::from_raw(field("settings")),
            option_names: string_list(field("optionNames")),
            variant_options: variant_options_from(field("variantOptions")),
        };
        if payload.mapping.is_none() {
            debug!("bootstrap mapping missing or unusable; selections fail closed");
        }
        payload
    }
}

fn image_urls_from(raw: &Value) -> ImageIdentityTable {
    let Value::Object(entries) = raw else {
        return ImageIdentityTable::new();
    };
    entries
        .iter()
        .filter_map(|(id, url)| Some((ImageId::parse(id)?, url.as_str()?.to_owned())))
        .collect()
}

fn variant_options_from(raw: &Value) -> VariantOptionTable {
    let Value::Object(entries) = raw else {
        return VariantOptionTable::new();
    };
    entries
        .iter()
        .filter_map(|(id, values)| {
            let id = VariantId::parse(id)?;
            values.is_array().then(|| (id, string_list(values)))
        })
        .collect()
}

/// Non-string items become empty strings so positional lookups stay aligned.
fn string_list(raw: &Value) -> Vec<String> {
    match raw {
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().unwrap_or_default().to_owned())
            .collect(),
        _ => Vec::new(),
    }
}
