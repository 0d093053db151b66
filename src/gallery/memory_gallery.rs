use crate::gallery::{GalleryAdapter, GallerySurface};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub surface: GallerySurface,
    pub src: Option<String>,
    pub visible: bool,
    pub active: bool,
}

/// Markup-free gallery used by tests and headless tooling.
///
/// Items are addressed by insertion index. Activation is exclusive per
/// surface, mirroring how themes track a single current slide.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGallery {
    items: Vec<GalleryItem>,
    pub activation_count: usize,
    pub visibility_writes: usize,
}

impl InMemoryGallery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a visible item and returns its index.
    pub fn push(&mut self, surface: GallerySurface, src: impl Into<String>) -> usize {
        self.items.push(GalleryItem {
            surface,
            src: Some(src.into()),
            visible: true,
            active: false,
        });
        self.items.len() - 1
    }

    /// Adds an item without an image source.
    pub fn push_without_src(&mut self, surface: GallerySurface) -> usize {
        self.items.push(GalleryItem {
            surface,
            src: None,
            visible: true,
            active: false,
        });
        self.items.len() - 1
    }

    #[must_use]
    pub fn with_item(mut self, surface: GallerySurface, src: impl Into<String>) -> Self {
        self.push(surface, src);
        self
    }

    /// Marks `index` active without counting it as an engine activation.
    pub fn set_active(&mut self, index: usize) {
        self.mark_active(index);
    }

    /// Drops every item, as a theme re-render would.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn item(&self, index: usize) -> Option<&GalleryItem> {
        self.items.get(index)
    }

    #[must_use]
    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    #[must_use]
    pub fn visible_srcs(&self, surface: GallerySurface) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| item.surface == surface && item.visible)
            .filter_map(|item| item.src.as_deref())
            .collect()
    }

    #[must_use]
    pub fn active_index(&self, surface: GallerySurface) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.surface == surface && item.active)
    }

    fn mark_active(&mut self, index: usize) {
        let Some(surface) = self.items.get(index).map(|item| item.surface) else {
            return;
        };
        for (idx, item) in self.items.iter_mut().enumerate() {
            if item.surface == surface {
                item.active = idx == index;
            }
        }
    }
}

impl GalleryAdapter for InMemoryGallery {
    type Item = usize;

    fn find_items(&self, surface: GallerySurface) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.surface == surface)
            .map(|(idx, _)| idx)
            .collect()
    }

    fn image_src(&self, item: &usize) -> Option<String> {
        self.items.get(*item).and_then(|item| item.src.clone())
    }

    fn set_visible(&mut self, item: &usize, visible: bool) {
        if let Some(item) = self.items.get_mut(*item) {
            item.visible = visible;
            self.visibility_writes += 1;
        }
    }

    fn is_active(&self, item: &usize) -> bool {
        self.items.get(*item).is_some_and(|item| item.active)
    }

    fn activate(&mut self, item: &usize) {
        self.mark_active(*item);
        self.activation_count += 1;
    }
}
