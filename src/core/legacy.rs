//! Migration of variant-keyed mappings into option-keyed ones.
//!
//! Older records stored `{variantId: imageIds}`. They are folded onto the
//! product's first option: every variant contributes its images to the value
//! it selects for that option, and variants sharing a value are unioned.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::core::catalog::{ProductOption, ProductVariant};
use crate::core::ids::VariantId;
use crate::core::mapping::{
    CanonicalMapping, ImageDomain, ImageSet, KeyDomain, MappingMode, OptionImageMap,
    filter_option_mapping,
};
use crate::core::raw::RawObject;

/// Converts a legacy `{variantId: imageIds}` object into a canonical mapping.
///
/// Two variants with the same option value but different image lists merge to
/// the union of both lists.
#[must_use]
pub fn migrate_legacy_mapping(
    raw: &RawObject,
    options: &[ProductOption],
    variants: &[ProductVariant],
    valid_images: &ImageSet,
) -> CanonicalMapping {
    let Some(target) = options.first() else {
        debug!(
            legacy_entries = raw.len(),
            "product has no options; legacy mapping migrates to empty"
        );
        return CanonicalMapping::empty(String::new());
    };

    let variant_ids: IndexSet<VariantId> = variants
        .iter()
        .filter_map(ProductVariant::normalized_id)
        .collect();
    let by_variant = filter_option_mapping(
        raw,
        KeyDomain::VariantIds(&variant_ids),
        ImageDomain::Only(valid_images),
    );
    let value_of = variant_values_for(&target.name, variants);

    let mut mapping = OptionImageMap::new();
    let mut unresolved = 0usize;
    for (variant_id, images) in by_variant {
        let Some(value) = VariantId::parse(&variant_id)
            .and_then(|id| value_of.get(&id))
            .filter(|value| target.has_value(value))
        else {
            unresolved += 1;
            continue;
        };
        mapping
            .entry(value.clone())
            .or_insert_with(ImageSet::new)
            .extend(images);
    }

    debug!(
        option = target.name.as_str(),
        migrated_values = mapping.len(),
        unresolved_variants = unresolved,
        "migrated legacy variant mapping"
    );

    CanonicalMapping {
        mode: MappingMode::Option,
        option_name: target.name.clone(),
        mapping,
    }
}

/// Variant id → the value it selects for `option_name`. Variants that do not
/// select the option are left out.
fn variant_values_for(
    option_name: &str,
    variants: &[ProductVariant],
) -> IndexMap<VariantId, String> {
    variants
        .iter()
        .filter_map(|variant| {
            let id = variant.normalized_id()?;
            let value = variant.selected_value(option_name)?;
            Some((id, value.to_owned()))
        })
        .collect()
}
