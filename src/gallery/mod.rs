mod memory_gallery;

pub use memory_gallery::{GalleryItem, InMemoryGallery};

use serde::{Deserialize, Serialize};

/// Markup region the engine queries independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GallerySurface {
    /// Main media slides.
    Primary,
    /// Thumbnail strip; may reference different nodes than the primary slides.
    Thumbnails,
}

impl GallerySurface {
    pub const ALL: [Self; 2] = [Self::Primary, Self::Thumbnails];
}

/// Contract implemented by whatever owns the storefront markup.
///
/// The engine re-queries items on every recomputation because themes may
/// re-render between events; implementations must not hand out stale items.
pub trait GalleryAdapter {
    type Item;

    fn find_items(&self, surface: GallerySurface) -> Vec<Self::Item>;

    /// Resolved image source of an item, if it carries one.
    fn image_src(&self, item: &Self::Item) -> Option<String>;

    fn set_visible(&mut self, item: &Self::Item, visible: bool);

    /// Whether the theme currently marks `item` as the active slide.
    fn is_active(&self, item: &Self::Item) -> bool;

    /// Activates `item` the way the theme's own interaction would.
    fn activate(&mut self, item: &Self::Item);
}
