use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Extracts the trailing digit run of a catalog identifier.
///
/// `"gid://shopify/ProductImage/123"` and `"123"` both yield `"123"`, so the
/// function is idempotent on its own output.
#[must_use]
pub fn normalize_numeric_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits_start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, ch)| ch.is_ascii_digit())
        .last()
        .map(|(idx, _)| idx)?;
    Some(trimmed[digits_start..].to_owned())
}

/// Normalizes an identifier that arrived as either a JSON string or number.
#[must_use]
pub fn normalize_id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => normalize_numeric_id(text),
        Value::Number(number) => {
            if let Some(unsigned) = number.as_u64() {
                return Some(unsigned.to_string());
            }
            // Whole floats such as `123.0` show up in hand-edited metafields.
            number
                .as_f64()
                .filter(|float| float.is_finite() && *float >= 0.0 && float.fract() == 0.0)
                .map(|float| format!("{float:.0}"))
        }
        _ => None,
    }
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Normalizes a raw catalog identifier; `None` when it carries no digits.
            #[must_use]
            pub fn parse(raw: &str) -> Option<Self> {
                normalize_numeric_id(raw).map(Self)
            }

            #[must_use]
            pub fn from_value(value: &Value) -> Option<Self> {
                normalize_id_value(value).map(Self)
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let value = Value::deserialize(deserializer)?;
                Self::from_value(&value).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "{} must be numeric or end in digits, got {value}",
                        stringify!($name)
                    ))
                })
            }
        }
    };
}

numeric_id!(
    /// Catalog image identifier in normalized numeric form.
    ImageId
);
numeric_id!(
    /// Product variant identifier in normalized numeric form.
    VariantId
);
numeric_id!(
    /// Product identifier in normalized numeric form.
    ProductId
);

/// Accepts a JSON string or number for identifier fields of catalog snapshots
/// and keeps the raw text; normalization happens where the id is consumed.
pub(crate) fn deserialize_loose_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "identifier must be a string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn composite_and_bare_ids_normalize_to_the_same_digits() {
        assert_eq!(
            normalize_numeric_id("gid://shopify/ProductImage/123").as_deref(),
            Some("123")
        );
        assert_eq!(normalize_numeric_id(" 123 ").as_deref(), Some("123"));
        assert_eq!(normalize_id_value(&json!(123)).as_deref(), Some("123"));
        assert_eq!(normalize_id_value(&json!(123.0)).as_deref(), Some("123"));
    }

    #[test]
    fn ids_without_trailing_digits_are_rejected() {
        assert_eq!(normalize_numeric_id("gid://shopify/ProductImage/"), None);
        assert_eq!(normalize_numeric_id(""), None);
        assert_eq!(normalize_id_value(&json!(-4)), None);
        assert_eq!(normalize_id_value(&json!(1.5)), None);
        assert_eq!(normalize_id_value(&json!(null)), None);
    }

    #[test]
    fn typed_ids_deserialize_from_strings_and_numbers() {
        let ids: Vec<ImageId> =
            serde_json::from_value(json!(["gid://shopify/ProductImage/9", 10])).expect("ids");
        assert_eq!(ids[0].as_str(), "9");
        assert_eq!(ids[1].to_string(), "10");
        assert!(serde_json::from_value::<VariantId>(json!(true)).is_err());
    }
}
