use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::{Map, Value, json};
use std::hint::black_box;
use variant_gallery::core::{
    ImageId, ImageIdentityIndex, ImageIdentityTable, ImageSet, ProductOption, ProductVariant,
    normalize_mapping,
};

const COLORS: usize = 40;
const IMAGES: usize = 400;

fn options() -> Vec<ProductOption> {
    vec![
        ProductOption::new("Color", (0..COLORS).map(|i| format!("Color {i}"))),
        ProductOption::new("Size", ["S", "M", "L", "XL"]),
    ]
}

fn valid_images() -> ImageSet {
    (0..IMAGES)
        .filter_map(|i| ImageId::parse(&format!("gid://shopify/ProductImage/{}", 10_000 + i)))
        .collect()
}

fn variants() -> Vec<ProductVariant> {
    (0..COLORS * 4)
        .map(|i| {
            ProductVariant::new(
                format!("gid://shopify/ProductVariant/{}", 50_000 + i),
                [
                    ("Color", format!("Color {}", i / 4)),
                    ("Size", ["S", "M", "L", "XL"][i % 4].to_owned()),
                ],
            )
        })
        .collect()
}

fn bench_option_mapping_normalize(c: &mut Criterion) {
    let options = options();
    let images = valid_images();
    let mut body = Map::new();
    for color in 0..COLORS {
        let ids: Vec<Value> = (0..IMAGES / COLORS + 2)
            .map(|k| json!(format!("gid://shopify/ProductImage/{}", 10_000 + color * 10 + k)))
            .collect();
        body.insert(format!("Color {color}"), Value::Array(ids));
    }
    let raw = json!({"mode": "option", "optionName": "Color", "mapping": body});

    c.bench_function("option_mapping_normalize_40x12", |b| {
        b.iter(|| {
            let _ = normalize_mapping(black_box(&raw), &options, &[], black_box(&images));
        })
    });
}

fn bench_legacy_migration(c: &mut Criterion) {
    let options = options();
    let images = valid_images();
    let variants = variants();
    let body: Map<String, Value> = variants
        .iter()
        .enumerate()
        .map(|(i, variant)| {
            let ids: Vec<Value> = (0..3).map(|k| json!(10_000 + (i * 2 + k) % IMAGES)).collect();
            (variant.id.clone(), Value::Array(ids))
        })
        .collect();
    let raw = Value::Object(body);

    c.bench_function("legacy_migration_160_variants", |b| {
        b.iter(|| {
            let _ = normalize_mapping(black_box(&raw), &options, &variants, black_box(&images));
        })
    });
}

fn bench_identity_resolution(c: &mut Criterion) {
    let table: ImageIdentityTable = valid_images()
        .into_iter()
        .map(|id| {
            let url = format!("https://cdn.shop.example/files/photo-{id}.jpg?v=1700000000");
            (id, url)
        })
        .collect();
    let rendered: Vec<String> = table
        .keys()
        .map(|id| format!("//cdn.shop.example/files/photo-{id}_1080x.jpg?v=1700000000&width=1080"))
        .collect();

    c.bench_function("identity_index_build_and_resolve_400", |b| {
        b.iter(|| {
            let index = ImageIdentityIndex::new(black_box(&table));
            let resolved = rendered
                .iter()
                .filter(|src| index.resolve(src).is_some())
                .count();
            black_box(resolved);
        })
    });
}

criterion_group!(
    benches,
    bench_option_mapping_normalize,
    bench_legacy_migration,
    bench_identity_resolution
);
criterion_main!(benches);
