//! Pure visibility decision for a selected variant.
//!
//! Nothing here touches markup: callers hand in resolved image ids and get
//! booleans back, which keeps the rule testable against synthetic galleries.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::ids::{ImageId, VariantId};
use crate::core::mapping::{CanonicalMapping, ImageSet};
use crate::core::settings::Settings;

/// Variant id → selected values, indexed like the product's option names.
pub type VariantOptionTable = IndexMap<VariantId, Vec<String>>;

/// Mapping entry a selected variant looks up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingKey {
    Value(String),
    /// The variant or mapped option could not be resolved; matches nothing.
    Unknown,
}

impl MappingKey {
    #[must_use]
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Value(value) => Some(value),
            Self::Unknown => None,
        }
    }
}

/// Translates a variant id into the mapped option's selected value.
#[must_use]
pub fn resolve_mapping_key(
    mapping: Option<&CanonicalMapping>,
    option_names: &[String],
    variant_options: &VariantOptionTable,
    variant: &VariantId,
) -> MappingKey {
    let Some(mapping) = mapping else {
        return MappingKey::Unknown;
    };
    let Some(index) = option_names
        .iter()
        .position(|name| *name == mapping.option_name)
    else {
        return MappingKey::Unknown;
    };
    variant_options
        .get(variant)
        .and_then(|values| values.get(index))
        .filter(|value| !value.is_empty())
        .map_or(MappingKey::Unknown, |value| MappingKey::Value(value.clone()))
}

/// Rule applied to every element for one variant selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityPlan {
    /// Filtering is switched off for the shop.
    ShowAll,
    /// No mapping entry for the selection; nothing is shown.
    HideAll,
    Filter {
        allowed: ImageSet,
        assigned: ImageSet,
        hide_unassigned: bool,
    },
}

impl VisibilityPlan {
    #[must_use]
    pub fn new(mapping: Option<&CanonicalMapping>, key: &MappingKey, settings: &Settings) -> Self {
        if !settings.enabled {
            return Self::ShowAll;
        }
        let allowed = mapping.zip(key.as_value()).and_then(|(mapping, value)| {
            mapping.images_for(value).map(|allowed| (mapping, allowed))
        });
        match allowed {
            Some((mapping, allowed)) => Self::Filter {
                allowed: allowed.clone(),
                assigned: mapping.assigned_image_ids(),
                hide_unassigned: settings.hide_unassigned_images,
            },
            None => {
                debug!(key = ?key, "no mapping entry for selection; hiding gallery");
                Self::HideAll
            }
        }
    }

    #[must_use]
    pub fn is_fail_closed(&self) -> bool {
        matches!(self, Self::HideAll)
    }

    /// Whether an element showing `image` stays visible. `None` means the
    /// element could not be identified and counts as unassigned.
    #[must_use]
    pub fn is_visible(&self, image: Option<&ImageId>) -> bool {
        match self {
            Self::ShowAll => true,
            Self::HideAll => false,
            Self::Filter {
                allowed,
                assigned,
                hide_unassigned,
            } => match image {
                Some(id) if allowed.contains(id) => true,
                Some(id) if assigned.contains(id) => false,
                _ => !hide_unassigned,
            },
        }
    }

    #[must_use]
    pub fn decide(&self, images: &[Option<ImageId>]) -> Vec<bool> {
        images
            .iter()
            .map(|image| self.is_visible(image.as_ref()))
            .collect()
    }
}
