use variant_gallery::core::{ImageId, ImageIdentityIndex, ImageIdentityTable, base_filename};

fn table(entries: &[(&str, &str)]) -> ImageIdentityTable {
    entries
        .iter()
        .map(|(id, url)| (ImageId::parse(id).expect("numeric id"), (*url).to_owned()))
        .collect()
}

#[test]
fn resized_urls_share_the_identity_key() {
    assert_eq!(
        base_filename("https://cdn.shop.example/files/a_800x.jpg?v=2").as_deref(),
        Some("a.jpg")
    );
    assert_eq!(
        base_filename("https://cdn.shop.example/files/a_400x600.jpg").as_deref(),
        Some("a.jpg")
    );
}

#[test]
fn rendered_sources_resolve_to_catalog_ids() {
    let index = ImageIdentityIndex::new(&table(&[
        ("10", "https://cdn.shop.example/files/front.jpg?v=1700000000"),
        ("11", "https://cdn.shop.example/files/back.png?v=1700000001"),
    ]));

    assert_eq!(index.len(), 2);
    assert_eq!(
        index
            .resolve("//cdn.shop.example/files/front_1080x.jpg?v=1700000000&width=1080")
            .map(ImageId::as_str),
        Some("10")
    );
    assert_eq!(
        index
            .resolve("https://cdn.shop.example/files/back_x320.png")
            .map(ImageId::as_str),
        Some("11")
    );
    assert_eq!(index.resolve("https://cdn.shop.example/files/side.jpg"), None);
}

#[test]
fn extension_is_part_of_the_identity() {
    let index = ImageIdentityIndex::new(&table(&[("10", "https://cdn.shop.example/files/a.jpg")]));

    assert!(index.resolve("https://cdn.shop.example/files/a_200x.webp").is_none());
}

#[test]
fn first_catalog_image_wins_a_filename_collision() {
    let index = ImageIdentityIndex::new(&table(&[
        ("10", "https://cdn.shop.example/files/a.jpg"),
        ("11", "https://cdn.shop.example/other/a_200x.jpg"),
        ("12", "https://cdn.shop.example/files/"),
    ]));

    assert_eq!(index.len(), 1);
    assert_eq!(
        index.resolve("https://cdn.shop.example/x/a_50x50.jpg").map(ImageId::as_str),
        Some("10")
    );
}
