use loop_gallery::catalogue::{GalleryItem, load_catalogue};
use loop_gallery::error::GalleryError;

#[test]
fn loads_yaml_catalogue() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.yaml");
    std::fs::write(
        &path,
        r#"
- id: p1
  label: Linen Shirt
  imageUrl: https://cdn.example.com/p1.jpg
  price: 1234.5
  soldCount: 4321
- id: p2
  label: Canvas Tote
  imageUrl: img/p2.png
"#,
    )
    .unwrap();

    let items = load_catalogue(&path).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].price_label().as_deref(), Some("$1,234.50"));
    assert_eq!(items[0].sold_label().as_deref(), Some("4,321 sold"));
    assert_eq!(
        items[1],
        GalleryItem::new("p2", "Canvas Tote", "img/p2.png")
    );
}

#[test]
fn loads_json_catalogue() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("categories.JSON");
    std::fs::write(
        &path,
        r#"[{"id": "c9", "label": "Outdoor", "imageUrl": "c9.webp", "soldCount": 12}]"#,
    )
    .unwrap();

    let items = load_catalogue(&path).unwrap();
    assert_eq!(
        items,
        vec![GalleryItem::new("c9", "Outdoor", "c9.webp").with_sold_count(12)]
    );
}

#[test]
fn empty_catalogue_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.yaml");
    std::fs::write(&path, "[]").unwrap();
    assert!(load_catalogue(&path).unwrap().is_empty());
}

#[test]
fn reports_missing_and_malformed_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = load_catalogue(dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(missing, GalleryError::CatalogueIo { .. }));

    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"[{"id": 3}]"#).unwrap();
    let malformed = load_catalogue(&path).unwrap_err();
    assert!(matches!(malformed, GalleryError::CatalogueParse { .. }));
    assert!(malformed.to_string().contains("bad.json"));
}
