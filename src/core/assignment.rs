//! Edits applied on the save path before a mapping is written back.
//!
//! When a shop disallows shared images, one image may belong to at most one
//! option value. These helpers keep that true for every mapping they produce.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::core::catalog::{ProductOption, ProductSnapshot};
use crate::core::ids::ImageId;
use crate::core::mapping::{CanonicalMapping, ImageSet};
use crate::core::settings::Settings;
use crate::error::{GalleryError, GalleryResult};

/// Replaces the image set of `value`.
///
/// With shared images disabled the assigned images are removed from every
/// other value first. An empty `images` removes the entry.
pub fn assign_images<I>(
    mapping: &mut CanonicalMapping,
    option: &ProductOption,
    value: &str,
    images: I,
    settings: &Settings,
) -> GalleryResult<()>
where
    I: IntoIterator<Item = ImageId>,
{
    if !option.has_value(value) {
        return Err(GalleryError::UnknownOptionValue {
            option: option.name.clone(),
            value: value.to_owned(),
        });
    }
    if mapping.option_name != option.name {
        debug!(
            from = mapping.option_name.as_str(),
            to = option.name.as_str(),
            "mapped option changed; starting a fresh mapping"
        );
        *mapping = CanonicalMapping::empty(option.name.clone());
    }

    let images: ImageSet = images.into_iter().collect();
    if !settings.allow_shared_images {
        for (other_value, other_images) in &mut mapping.mapping {
            if other_value != value {
                other_images.retain(|id| !images.contains(id));
            }
        }
        mapping.mapping.retain(|_, ids| !ids.is_empty());
    }

    if images.is_empty() {
        mapping.mapping.shift_remove(value);
    } else {
        mapping.mapping.insert(value.to_owned(), images);
    }
    Ok(())
}

/// Removes `image_id` from every option value, dropping emptied entries.
/// Returns whether anything changed.
pub fn unassign_image(mapping: &mut CanonicalMapping, image_id: &ImageId) -> bool {
    let mut changed = false;
    for images in mapping.mapping.values_mut() {
        changed |= images.shift_remove(image_id);
    }
    mapping.mapping.retain(|_, ids| !ids.is_empty());
    changed
}

/// Images referenced by more than one option value, with those values.
#[must_use]
pub fn shared_images(mapping: &CanonicalMapping) -> IndexMap<ImageId, Vec<String>> {
    let mut owners: IndexMap<ImageId, Vec<String>> = IndexMap::new();
    for (value, images) in &mapping.mapping {
        for id in images {
            owners.entry(id.clone()).or_default().push(value.clone());
        }
    }
    owners.retain(|_, values| values.len() > 1);
    owners
}

/// Rejects mappings that share an image while the shop disallows it.
pub fn validate_for_save(mapping: &CanonicalMapping, settings: &Settings) -> GalleryResult<()> {
    if settings.allow_shared_images {
        return Ok(());
    }
    match shared_images(mapping).into_iter().next() {
        Some((image_id, values)) => Err(GalleryError::SharedImage {
            image_id: image_id.to_string(),
            values,
        }),
        None => Ok(()),
    }
}

/// Keeps each shared image only on the first option value that lists it.
/// Returns the number of removed references.
pub fn enforce_exclusive(mapping: &mut CanonicalMapping) -> usize {
    let mut seen = ImageSet::new();
    let mut removed = 0usize;
    for images in mapping.mapping.values_mut() {
        let before = images.len();
        images.retain(|id| seen.insert(id.clone()));
        removed += before - images.len();
    }
    mapping.mapping.retain(|_, ids| !ids.is_empty());
    removed
}

/// Produces the mapping handed to the write-back for `product`.
///
/// The raw value is normalized against the product, and shared images are
/// resolved when the settings disallow them, so the result always passes
/// [`validate_for_save`].
#[must_use]
pub fn prepare_for_save(
    raw: &serde_json::Value,
    product: &ProductSnapshot,
    settings: &Settings,
) -> CanonicalMapping {
    let mut mapping = crate::core::mapping::normalize_mapping(
        raw,
        &product.options,
        &product.variants,
        &product.valid_image_ids(),
    );
    if !settings.allow_shared_images {
        let removed = enforce_exclusive(&mut mapping);
        if removed > 0 {
            warn!(
                product_id = product.id.as_str(),
                removed, "dropped shared image references before save"
            );
        }
    }
    mapping
}
