pub mod assignment;
pub mod catalog;
pub mod identity;
pub mod ids;
pub mod legacy;
pub mod mapping;
pub mod raw;
pub mod settings;
pub mod visibility;

pub use assignment::{
    assign_images, enforce_exclusive, prepare_for_save, shared_images, unassign_image,
    validate_for_save,
};
pub use catalog::{ProductImage, ProductOption, ProductSnapshot, ProductVariant, SelectedOption};
pub use identity::{ImageIdentityIndex, ImageIdentityTable, base_filename};
pub use ids::{ImageId, ProductId, VariantId, normalize_id_value, normalize_numeric_id};
pub use legacy::migrate_legacy_mapping;
pub use mapping::{
    CanonicalMapping, ImageDomain, ImageSet, KeyDomain, MappingMode, OptionImageMap,
    PersistedMapping, filter_option_mapping, normalize_mapping, resolve_mapped_option,
};
pub use raw::{RawObject, parse_or_fallback, parse_str_or_fallback};
pub use settings::{Settings, normalize_settings};
pub use visibility::{MappingKey, VariantOptionTable, VisibilityPlan, resolve_mapping_key};
