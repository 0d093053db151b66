//! Canonical option-value → image mapping and its normalizer.
//!
//! Persisted mappings come in two generations. The current one is keyed by the
//! values of a single product option; the legacy one is keyed by variant id.
//! [`normalize_mapping`] classifies the raw record once and always returns a
//! [`CanonicalMapping`] restricted to what the product still has.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::core::catalog::{ProductOption, ProductSnapshot, ProductVariant};
use crate::core::ids::{ImageId, VariantId};
use crate::core::legacy::migrate_legacy_mapping;
use crate::core::raw::{RawObject, parse_or_fallback, value_kind};
use crate::error::{GalleryError, GalleryResult};

pub type ImageSet = IndexSet<ImageId>;
pub type OptionImageMap = IndexMap<String, ImageSet>;

const OPTION_MODE_TAG: &str = "option";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingMode {
    #[default]
    Option,
}

/// Validated mapping in the shape
/// `{"mode":"option","optionName":..,"mapping":{value: [imageId, ..]}}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMapping {
    pub mode: MappingMode,
    pub option_name: String,
    pub mapping: OptionImageMap,
}

impl CanonicalMapping {
    #[must_use]
    pub fn empty(option_name: impl Into<String>) -> Self {
        Self {
            mode: MappingMode::Option,
            option_name: option_name.into(),
            mapping: OptionImageMap::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    #[must_use]
    pub fn images_for(&self, value: &str) -> Option<&ImageSet> {
        self.mapping.get(value)
    }

    /// Union of every image id referenced by any option value.
    #[must_use]
    pub fn assigned_image_ids(&self) -> ImageSet {
        self.mapping.values().flatten().cloned().collect()
    }

    /// Option values whose image set contains `image_id`, in mapping order.
    #[must_use]
    pub fn values_for_image(&self, image_id: &ImageId) -> Vec<&str> {
        self.mapping
            .iter()
            .filter(|(_, images)| images.contains(image_id))
            .map(|(value, _)| value.as_str())
            .collect()
    }

    /// Catalog images that no option value references.
    #[must_use]
    pub fn unassigned_image_ids(&self, product: &ProductSnapshot) -> ImageSet {
        let assigned = self.assigned_image_ids();
        product
            .valid_image_ids()
            .into_iter()
            .filter(|id| !assigned.contains(id))
            .collect()
    }

    /// Strict parse of an already canonical payload.
    pub fn from_json_str(input: &str) -> GalleryResult<Self> {
        serde_json::from_str(input).map_err(|e| {
            GalleryError::InvalidData(format!("failed to parse canonical mapping: {e}"))
        })
    }

    /// Tolerant parse of a mapping embedded in storefront data.
    ///
    /// There is no catalog to validate against, so keys and image ids are only
    /// shape-checked. Returns `None` unless the value is option-mode.
    #[must_use]
    pub fn from_value_lenient(raw: &Value) -> Option<Self> {
        parse_or_fallback(raw, |object| match PersistedMapping::classify(object) {
            PersistedMapping::Option {
                option_name: Some(option_name),
                entries,
            } => Some(Self {
                mode: MappingMode::Option,
                mapping: filter_option_mapping(&entries, KeyDomain::Any, ImageDomain::Any),
                option_name,
            }),
            PersistedMapping::Option {
                option_name: None, ..
            }
            | PersistedMapping::Legacy(_) => None,
        })
    }

    /// Serializes the persisted shape handed to the mapping write-back.
    pub fn to_json(&self) -> GalleryResult<String> {
        serde_json::to_string(self).map_err(|e| {
            GalleryError::InvalidData(format!("failed to serialize canonical mapping: {e}"))
        })
    }

    pub fn to_json_pretty(&self) -> GalleryResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            GalleryError::InvalidData(format!("failed to serialize canonical mapping: {e}"))
        })
    }
}

/// Raw persisted record after classification.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistedMapping {
    /// `mode == "option"`; `entries` is the raw `mapping` object.
    Option {
        option_name: Option<String>,
        entries: RawObject,
    },
    /// Anything else is read as `{variantId: imageIds}`.
    Legacy(RawObject),
}

impl PersistedMapping {
    #[must_use]
    pub fn classify(mut object: RawObject) -> Self {
        let is_option_mode = object.get("mode").and_then(Value::as_str) == Some(OPTION_MODE_TAG);
        if !is_option_mode {
            return Self::Legacy(object);
        }

        let option_name = object
            .get("optionName")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_owned);
        let entries = match object.remove("mapping") {
            Some(Value::Object(entries)) => entries,
            Some(Value::String(text)) => crate::core::raw::parse_object_str(&text),
            Some(other) => {
                debug!(
                    kind = value_kind(&other),
                    "option mapping body is not an object"
                );
                RawObject::new()
            }
            None => RawObject::new(),
        };
        Self::Option {
            option_name,
            entries,
        }
    }
}

/// Which keys the option mapping filter keeps.
#[derive(Debug, Clone, Copy)]
pub enum KeyDomain<'a> {
    Any,
    /// Exact match against an option's declared values.
    OptionValues(&'a [String]),
    /// Keys are normalized to variant ids and matched against the product.
    VariantIds(&'a IndexSet<VariantId>),
}

impl KeyDomain<'_> {
    fn admit(&self, key: &str) -> Option<String> {
        match self {
            Self::Any => (!key.is_empty()).then(|| key.to_owned()),
            Self::OptionValues(values) => values
                .iter()
                .any(|value| value == key)
                .then(|| key.to_owned()),
            Self::VariantIds(ids) => VariantId::parse(key)
                .filter(|id| ids.contains(id))
                .map(|id| id.as_str().to_owned()),
        }
    }
}

/// Which image ids the option mapping filter keeps.
#[derive(Debug, Clone, Copy)]
pub enum ImageDomain<'a> {
    Any,
    Only(&'a ImageSet),
}

impl ImageDomain<'_> {
    fn admits(&self, id: &ImageId) -> bool {
        match self {
            Self::Any => true,
            Self::Only(valid) => valid.contains(id),
        }
    }
}

/// Filters a raw `{key: imageIds | {imageIds}}` object.
///
/// Keys outside `keys` are dropped, image ids are normalized, deduplicated and
/// restricted to `images`, and keys left without images are omitted.
#[must_use]
pub fn filter_option_mapping(
    raw: &RawObject,
    keys: KeyDomain<'_>,
    images: ImageDomain<'_>,
) -> OptionImageMap {
    let mut filtered = OptionImageMap::new();
    let mut dropped_keys = 0usize;

    for (raw_key, raw_entry) in raw {
        let Some(key) = keys.admit(raw_key) else {
            dropped_keys += 1;
            trace!(key = raw_key.as_str(), "dropping mapping key outside domain");
            continue;
        };
        let ids = entry_image_ids(raw_entry)
            .iter()
            .filter_map(ImageId::from_value)
            .filter(|id| images.admits(id));
        // Keys that normalize to the same variant id merge.
        filtered.entry(key).or_default().extend(ids);
    }

    let before_prune = filtered.len();
    filtered.retain(|_, ids| !ids.is_empty());
    debug!(
        raw_count = raw.len(),
        dropped_keys,
        emptied = before_prune - filtered.len(),
        kept = filtered.len(),
        "filtered option mapping"
    );
    filtered
}

fn entry_image_ids(entry: &Value) -> &[Value] {
    match entry {
        Value::Array(ids) => ids,
        Value::Object(object) => match object.get("imageIds") {
            Some(Value::Array(ids)) => ids,
            _ => &[],
        },
        _ => &[],
    }
}

/// Picks the mapped option: the requested one when it still exists, otherwise
/// the product's first option.
#[must_use]
pub fn resolve_mapped_option<'a>(
    requested: Option<&str>,
    options: &'a [ProductOption],
) -> Option<&'a ProductOption> {
    if let Some(name) = requested {
        if let Some(option) = options.iter().find(|option| option.name == name) {
            return Some(option);
        }
        debug!(
            requested = name,
            "mapped option no longer exists; falling back to first option"
        );
    }
    options.first()
}

/// Normalizes any persisted mapping value against the product's current
/// options, variants and images. Never fails.
#[must_use]
pub fn normalize_mapping(
    raw: &Value,
    options: &[ProductOption],
    variants: &[ProductVariant],
    valid_images: &ImageSet,
) -> CanonicalMapping {
    parse_or_fallback(raw, |object| match PersistedMapping::classify(object) {
        PersistedMapping::Option {
            option_name,
            entries,
        } => normalize_option_shape(option_name.as_deref(), &entries, options, valid_images),
        PersistedMapping::Legacy(entries) => {
            migrate_legacy_mapping(&entries, options, variants, valid_images)
        }
    })
}

fn normalize_option_shape(
    option_name: Option<&str>,
    entries: &RawObject,
    options: &[ProductOption],
    valid_images: &ImageSet,
) -> CanonicalMapping {
    let Some(option) = resolve_mapped_option(option_name, options) else {
        debug!("product has no options; mapping normalizes to empty");
        return CanonicalMapping::empty(String::new());
    };
    CanonicalMapping {
        mode: MappingMode::Option,
        option_name: option.name.clone(),
        mapping: filter_option_mapping(
            entries,
            KeyDomain::OptionValues(&option.values),
            ImageDomain::Only(valid_images),
        ),
    }
}

impl ProductSnapshot {
    /// Normalizes this product's persisted mapping record.
    #[must_use]
    pub fn normalized_mapping(&self) -> CanonicalMapping {
        normalize_mapping(
            &self.raw_mapping,
            &self.options,
            &self.variants,
            &self.valid_image_ids(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(raw: &[&str]) -> ImageSet {
        raw.iter().filter_map(|id| ImageId::parse(id)).collect()
    }

    #[test]
    fn classify_distinguishes_option_and_legacy_shapes() {
        let option = PersistedMapping::classify(
            json!({"mode": "option", "optionName": "Color", "mapping": {"Black": ["1"]}})
                .as_object()
                .cloned()
                .expect("object"),
        );
        assert!(matches!(
            option,
            PersistedMapping::Option { option_name: Some(ref name), .. } if name == "Color"
        ));

        let legacy = PersistedMapping::classify(
            json!({"mode": "variant", "1111": ["1"]})
                .as_object()
                .cloned()
                .expect("object"),
        );
        assert!(matches!(legacy, PersistedMapping::Legacy(_)));
    }

    #[test]
    fn filter_accepts_arrays_and_image_id_objects() {
        let raw = json!({
            "Black": ["gid://shopify/ProductImage/1", 2, "2"],
            "Red": {"imageIds": ["3"]},
            "Blue": "3",
            "Green": ["999"],
            "Pink": ["1"]
        });
        let values = vec![
            "Black".to_owned(),
            "Red".to_owned(),
            "Blue".to_owned(),
            "Green".to_owned(),
        ];
        let valid = ids(&["1", "2", "3"]);
        let filtered = filter_option_mapping(
            raw.as_object().expect("object"),
            KeyDomain::OptionValues(&values),
            ImageDomain::Only(&valid),
        );

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered["Black"], ids(&["1", "2"]));
        assert_eq!(filtered["Red"], ids(&["3"]));
    }

    #[test]
    fn lenient_storefront_parse_requires_option_mode() {
        assert!(CanonicalMapping::from_value_lenient(&json!({"1": ["2"]})).is_none());
        let parsed = CanonicalMapping::from_value_lenient(&json!({
            "mode": "option",
            "optionName": "Color",
            "mapping": {"Black": ["2"], "Red": []}
        }))
        .expect("option mapping");
        assert_eq!(parsed.option_name, "Color");
        assert_eq!(parsed.mapping.len(), 1);
    }
}
