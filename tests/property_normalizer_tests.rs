use proptest::prelude::*;
use serde_json::{Map, Value, json};
use variant_gallery::core::{
    ImageId, ImageSet, MappingKey, ProductOption, ProductVariant, Settings, VisibilityPlan,
    normalize_mapping, normalize_numeric_id,
};

const VALUES: [&str; 4] = ["Black", "Red", "Blue", "Green"];

fn color() -> ProductOption {
    ProductOption::new("Color", ["Black", "Red", "Blue"])
}

fn valid_images() -> ImageSet {
    (1..=6)
        .map(|id| ImageId::parse(&id.to_string()).expect("numeric id"))
        .collect()
}

fn raw_option_mapping(entries: &[(usize, Vec<u8>)]) -> Value {
    let mut body = Map::new();
    for (value_idx, images) in entries {
        let ids: Vec<Value> = images
            .iter()
            .map(|id| json!(format!("gid://shopify/ProductImage/{id}")))
            .collect();
        body.insert(VALUES[*value_idx].to_owned(), Value::Array(ids));
    }
    json!({"mode": "option", "optionName": "Color", "mapping": body})
}

fn raw_legacy_mapping(entries: &[(usize, Vec<u8>)]) -> (Value, Vec<ProductVariant>) {
    let mut body = Map::new();
    let mut variants = Vec::new();
    for (idx, (value_idx, images)) in entries.iter().enumerate() {
        let variant_id = format!("{}", 500 + idx);
        variants.push(ProductVariant::new(
            variant_id.clone(),
            [("Color", VALUES[*value_idx])],
        ));
        body.insert(
            variant_id,
            Value::Array(images.iter().map(|id| json!(id.to_string())).collect()),
        );
    }
    (Value::Object(body), variants)
}

fn entries_strategy() -> impl Strategy<Value = Vec<(usize, Vec<u8>)>> {
    prop::collection::vec(
        (0usize..VALUES.len(), prop::collection::vec(0u8..9, 0..5)),
        0..6,
    )
}

proptest! {
    #[test]
    fn numeric_id_normalization_is_idempotent(raw in "[a-zA-Z:/]{0,12}[0-9]{0,6}") {
        if let Some(normalized) = normalize_numeric_id(&raw) {
            prop_assert!(normalized.chars().all(|ch| ch.is_ascii_digit()));
            prop_assert_eq!(normalize_numeric_id(&normalized), Some(normalized.clone()));
        } else {
            prop_assert!(!raw.ends_with(|ch: char| ch.is_ascii_digit()));
        }
    }

    #[test]
    fn option_mapping_stays_inside_the_product_domain(entries in entries_strategy()) {
        let options = [color()];
        let images = valid_images();

        let mapping = normalize_mapping(&raw_option_mapping(&entries), &options, &[], &images);

        prop_assert_eq!(mapping.option_name.as_str(), "Color");
        for (value, ids) in &mapping.mapping {
            prop_assert!(options[0].has_value(value));
            prop_assert!(!ids.is_empty());
            prop_assert!(ids.iter().all(|id| images.contains(id)));
        }
    }

    #[test]
    fn normalization_is_idempotent(entries in entries_strategy(), legacy in any::<bool>()) {
        let options = [color()];
        let images = valid_images();
        let (raw, variants) = if legacy {
            raw_legacy_mapping(&entries)
        } else {
            (raw_option_mapping(&entries), Vec::new())
        };

        let once = normalize_mapping(&raw, &options, &variants, &images);
        let persisted = serde_json::to_value(&once).expect("serialize mapping");
        let twice = normalize_mapping(&persisted, &options, &variants, &images);

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn images_of_the_selected_value_are_always_visible(
        entries in entries_strategy(),
        selected in 0usize..3,
        hide_unassigned in any::<bool>()
    ) {
        let options = [color()];
        let images = valid_images();
        let mapping = normalize_mapping(&raw_option_mapping(&entries), &options, &[], &images);
        let settings = Settings::default().with_hide_unassigned_images(hide_unassigned);
        let key = MappingKey::Value(VALUES[selected].to_owned());

        let plan = VisibilityPlan::new(Some(&mapping), &key, &settings);
        let assigned = mapping.assigned_image_ids();

        match mapping.images_for(VALUES[selected]) {
            Some(allowed) => {
                for id in &images {
                    let expected = allowed.contains(id)
                        || (!assigned.contains(id) && !hide_unassigned);
                    prop_assert_eq!(plan.is_visible(Some(id)), expected);
                }
            }
            None => {
                prop_assert!(plan.is_fail_closed());
                prop_assert!(images.iter().all(|id| !plan.is_visible(Some(id))));
            }
        }
    }
}
