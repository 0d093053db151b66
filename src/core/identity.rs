//! Recovers catalog image ids from rendered storefront image URLs.
//!
//! Themes expose only a resized CDN URL per `<img>`. The filename survives
//! resizing once the size suffix is removed (`shirt_800x.jpg` → `shirt.jpg`),
//! so that base filename is the identity key.

use std::collections::HashMap;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, trace};

use crate::core::ids::ImageId;

/// Image id → source URL as shipped to the storefront.
pub type ImageIdentityTable = IndexMap<ImageId, String>;

// `_800x.jpg`, `_800x600.jpg`, `_x600.jpg`; at least one dimension.
static SIZE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_(?:\d+x\d*|x\d+)\.([A-Za-z0-9]+)$").expect("valid size suffix regex")
});

/// Filename of `url` without query, fragment or size suffix.
#[must_use]
pub fn base_filename(url: &str) -> Option<String> {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let filename = path.rsplit('/').next().unwrap_or_default();
    if filename.is_empty() {
        return None;
    }
    Some(SIZE_SUFFIX_RE.replace(filename, ".${1}").into_owned())
}

/// Reverse lookup from base filename to image id, built once per page.
#[derive(Debug, Clone, Default)]
pub struct ImageIdentityIndex {
    by_base_filename: HashMap<String, ImageId>,
}

impl ImageIdentityIndex {
    #[must_use]
    pub fn new(table: &ImageIdentityTable) -> Self {
        let mut by_base_filename = HashMap::with_capacity(table.len());
        for (id, url) in table {
            let Some(base) = base_filename(url) else {
                debug!(image_id = %id, "catalog image url has no filename");
                continue;
            };
            // First catalog image wins a filename collision.
            if let Some(existing) = by_base_filename.get(&base) {
                debug!(
                    base = base.as_str(),
                    kept = %existing,
                    ignored = %id,
                    "duplicate base filename in image table"
                );
                continue;
            }
            by_base_filename.insert(base, id.clone());
        }
        Self { by_base_filename }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_base_filename.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_base_filename.is_empty()
    }

    /// Image id behind a rendered source URL, if its filename is known.
    #[must_use]
    pub fn resolve(&self, src: &str) -> Option<&ImageId> {
        let base = base_filename(src)?;
        let resolved = self.by_base_filename.get(&base);
        if resolved.is_none() {
            trace!(src, base = base.as_str(), "unresolved gallery image");
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_suffixes_are_stripped() {
        for url in [
            "https://cdn.example.com/files/a_800x.jpg?v=2",
            "https://cdn.example.com/files/a_400x600.jpg",
            "//cdn.example.com/files/a_x600.jpg#zoom",
            "a.jpg",
        ] {
            assert_eq!(base_filename(url).as_deref(), Some("a.jpg"), "{url}");
        }
    }

    #[test]
    fn names_that_only_look_like_suffixes_are_kept() {
        assert_eq!(base_filename("/files/photo_x.jpg").as_deref(), Some("photo_x.jpg"));
        assert_eq!(base_filename("/files/box_12.png").as_deref(), Some("box_12.png"));
        assert_eq!(base_filename("https://cdn.example.com/files/"), None);
    }
}
