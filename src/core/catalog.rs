//! Read-only product snapshot supplied by the catalog service.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::ids::{ImageId, ProductId, VariantId, deserialize_loose_id};
use crate::core::identity::ImageIdentityTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl ProductOption {
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|candidate| candidate == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    #[serde(deserialize_with = "deserialize_loose_id")]
    pub id: String,
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
}

impl ProductVariant {
    #[must_use]
    pub fn new<I, N, V>(id: impl Into<String>, selected: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            id: id.into(),
            selected_options: selected
                .into_iter()
                .map(|(name, value)| SelectedOption {
                    name: name.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn normalized_id(&self) -> Option<VariantId> {
        VariantId::parse(&self.id)
    }

    #[must_use]
    pub fn selected_value(&self, option_name: &str) -> Option<&str> {
        self.selected_options
            .iter()
            .find(|selected| selected.name == option_name)
            .map(|selected| selected.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(deserialize_with = "deserialize_loose_id")]
    pub id: String,
    pub url: String,
}

impl ProductImage {
    #[must_use]
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// Catalog snapshot returned by the product lookup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    #[serde(default, deserialize_with = "deserialize_loose_id")]
    pub id: String,
    #[serde(default)]
    pub options: Vec<ProductOption>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default, rename = "rawMappingJSON")]
    pub raw_mapping: Value,
}

impl ProductSnapshot {
    #[must_use]
    pub fn normalized_id(&self) -> Option<ProductId> {
        ProductId::parse(&self.id)
    }

    #[must_use]
    pub fn option_names(&self) -> Vec<String> {
        self.options.iter().map(|option| option.name.clone()).collect()
    }

    #[must_use]
    pub fn option(&self, name: &str) -> Option<&ProductOption> {
        self.options.iter().find(|option| option.name == name)
    }

    #[must_use]
    pub fn valid_image_ids(&self) -> IndexSet<ImageId> {
        self.images
            .iter()
            .filter_map(|image| ImageId::parse(&image.id))
            .collect()
    }

    #[must_use]
    pub fn valid_variant_ids(&self) -> IndexSet<VariantId> {
        self.variants
            .iter()
            .filter_map(ProductVariant::normalized_id)
            .collect()
    }

    /// Image id → source URL, in catalog order.
    #[must_use]
    pub fn image_identity_table(&self) -> ImageIdentityTable {
        self.images
            .iter()
            .filter_map(|image| ImageId::parse(&image.id).map(|id| (id, image.url.clone())))
            .collect()
    }

    /// Per-variant selected values ordered like [`Self::option_names`].
    ///
    /// Missing selections become empty strings so indexes stay aligned.
    #[must_use]
    pub fn variant_option_table(&self) -> IndexMap<VariantId, Vec<String>> {
        self.variants
            .iter()
            .filter_map(|variant| {
                let id = variant.normalized_id()?;
                let values = self
                    .options
                    .iter()
                    .map(|option| {
                        variant
                            .selected_value(&option.name)
                            .unwrap_or_default()
                            .to_owned()
                    })
                    .collect();
                Some((id, values))
            })
            .collect()
    }
}
