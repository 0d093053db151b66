//! Variant-change signals coming from the host page.
//!
//! Several signals may fire for one logical variant change (theme event,
//! hidden input mutation, URL rewrite). They all reduce to a variant id and
//! the tracker drops repeats of the last handled one.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::VariantId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariantSignal {
    /// Explicit variant-change notification from the theme.
    VariantChanged { variant_id: String },
    /// New value of the hidden form field carrying the selected variant.
    VariantInputChanged { value: String },
    /// The page URL changed; the variant may be in its query string.
    UrlChanged { url: String },
    /// The host re-rendered the product section; markup must be re-filtered.
    SectionReloaded,
}

/// Outcome of feeding a signal to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalDecision {
    Recompute(VariantId),
    /// Same variant as last time; nothing to do.
    Duplicate,
    /// The signal carried no usable variant id.
    Ignored,
}

/// Reads the variant id from `url`'s query parameter `param`.
///
/// Only the first occurrence counts; the value is percent-decoded and then
/// normalized like any other variant id.
#[must_use]
pub fn variant_id_from_url(url: &str, param: &str) -> Option<VariantId> {
    let query = url.split('#').next()?.split_once('?')?.1;
    query
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| *key == param)
        .and_then(|(_, value)| {
            let value = value.replace('+', " ");
            urlencoding::decode(&value)
                .ok()
                .and_then(|decoded| VariantId::parse(&decoded))
        })
}

/// Remembers the last handled variant so redundant signals are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSignalTracker {
    last_variant: Option<VariantId>,
    dedupe: bool,
}

impl VariantSignalTracker {
    #[must_use]
    pub fn new(dedupe: bool) -> Self {
        Self {
            last_variant: None,
            dedupe,
        }
    }

    #[must_use]
    pub fn last_variant(&self) -> Option<&VariantId> {
        self.last_variant.as_ref()
    }

    /// Records `variant` as handled regardless of deduplication.
    pub fn mark_handled(&mut self, variant: VariantId) {
        self.last_variant = Some(variant);
    }

    pub fn on_signal(&mut self, signal: &VariantSignal, query_param: &str) -> SignalDecision {
        let candidate = match signal {
            VariantSignal::VariantChanged { variant_id } => VariantId::parse(variant_id),
            VariantSignal::VariantInputChanged { value } => VariantId::parse(value),
            VariantSignal::UrlChanged { url } => variant_id_from_url(url, query_param),
            VariantSignal::SectionReloaded => {
                return match &self.last_variant {
                    Some(last) => SignalDecision::Recompute(last.clone()),
                    None => SignalDecision::Ignored,
                };
            }
        };

        let Some(variant) = candidate else {
            trace!(?signal, "variant signal without usable id");
            return SignalDecision::Ignored;
        };
        if self.dedupe && self.last_variant.as_ref() == Some(&variant) {
            trace!(variant = %variant, "duplicate variant signal");
            return SignalDecision::Duplicate;
        }
        self.last_variant = Some(variant.clone());
        SignalDecision::Recompute(variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_query_parameter_is_extracted_and_decoded() {
        let variant = variant_id_from_url(
            "https://shop.example/products/tee?foo=1&variant=4411%32#reviews",
            "variant",
        );
        assert_eq!(variant.as_ref().map(VariantId::as_str), Some("44112"));
        assert_eq!(
            variant_id_from_url("https://shop.example/products/tee", "variant"),
            None
        );
        assert_eq!(
            variant_id_from_url("https://shop.example/products/tee?variant=", "variant"),
            None
        );
    }

    #[test]
    fn repeated_signals_for_one_change_recompute_once() {
        let mut tracker = VariantSignalTracker::new(true);
        let first = tracker.on_signal(
            &VariantSignal::VariantChanged {
                variant_id: "gid://shopify/ProductVariant/10".to_owned(),
            },
            "variant",
        );
        let second = tracker.on_signal(
            &VariantSignal::VariantInputChanged {
                value: "10".to_owned(),
            },
            "variant",
        );
        let third = tracker.on_signal(
            &VariantSignal::UrlChanged {
                url: "/products/tee?variant=10".to_owned(),
            },
            "variant",
        );

        assert!(matches!(first, SignalDecision::Recompute(ref id) if id.as_str() == "10"));
        assert_eq!(second, SignalDecision::Duplicate);
        assert_eq!(third, SignalDecision::Duplicate);
    }

    #[test]
    fn section_reload_replays_the_last_variant() {
        let mut tracker = VariantSignalTracker::new(true);
        assert_eq!(
            tracker.on_signal(&VariantSignal::SectionReloaded, "variant"),
            SignalDecision::Ignored
        );
        tracker.mark_handled(VariantId::parse("5").expect("id"));
        assert!(matches!(
            tracker.on_signal(&VariantSignal::SectionReloaded, "variant"),
            SignalDecision::Recompute(ref id) if id.as_str() == "5"
        ));
    }
}
