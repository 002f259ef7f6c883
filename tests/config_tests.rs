use std::path::PathBuf;
use std::time::Duration;

use loop_gallery::catalogue::ItemKind;
use loop_gallery::config::Configuration;
use loop_gallery::gallery::ControllerOptions;

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
items-path: "/srv/catalogue/products.yaml"
item-kind: category
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.items_path, PathBuf::from("/srv/catalogue/products.yaml"));
    assert_eq!(cfg.item_kind, ItemKind::Category);
    assert!((cfg.gallery.bend - 3.0).abs() < f32::EPSILON);
    assert_eq!(cfg.physics.click_max_duration, Duration::from_millis(200));
}

#[test]
fn empty_document_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.items_path, PathBuf::from("items.yaml"));
    assert_eq!(cfg.item_kind, ItemKind::Product);
    assert_eq!(cfg.loader.max_concurrent, 4);
    assert!(!cfg.carousel.loop_items);
    assert!((cfg.carousel.drag_buffer_px - 40.0).abs() < f32::EPSILON);
}

#[test]
fn parse_humantime_durations() {
    let yaml = r#"
physics:
  click-max-duration: 150ms
  wheel-settle-delay: 1s
loader:
  request-timeout: 30s
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.physics.click_max_duration, Duration::from_millis(150));
    assert_eq!(cfg.physics.wheel_settle_delay, Duration::from_secs(1));
    assert_eq!(cfg.loader.request_timeout, Duration::from_secs(30));
}

#[test]
fn parse_gallery_style() {
    let yaml = r##"
gallery:
  bend: -2.5
  text-color: "#ff8800"
  border-radius: 0.1
  font: "italic 600 22px Noto Serif"
  shadow-color: "#102030"
"##;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert!((cfg.gallery.bend + 2.5).abs() < f32::EPSILON);
    assert_eq!(cfg.gallery.text_color, "#ff8800");
    assert_eq!(cfg.gallery.font, "italic 600 22px Noto Serif");
}

#[test]
fn carousel_loop_key() {
    let yaml = r#"
carousel:
  item-width-px: 240
  gap-px: 8
  velocity-threshold: 800
  loop: true
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert!(cfg.carousel.loop_items);
    assert!((cfg.carousel.item_width_px - 240.0).abs() < f32::EPSILON);
    assert!((cfg.carousel.velocity_threshold - 800.0).abs() < f32::EPSILON);
}

#[test]
fn unknown_keys_are_rejected() {
    let yaml = r#"
gallery:
  bendiness: 2
"#;
    assert!(serde_yaml::from_str::<Configuration>(yaml).is_err());
}

#[test]
fn validation_rejects_out_of_range_values() {
    for yaml in [
        "gallery:\n  border-radius: 1.0\n",
        "gallery:\n  text-color: \"white\"\n",
        "gallery:\n  font: \"DejaVu Sans\"\n",
        "physics:\n  ease: 0.0\n",
        "physics:\n  hover-smoothing: 1.5\n",
        "camera:\n  fov-degrees: 180\n",
        "loader:\n  max-concurrent: 0\n",
        "carousel:\n  item-width-px: 0\n",
        "items-path: \"\"\n",
    ] {
        let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.validated().is_err(), "accepted {yaml:?}");
    }
}

#[test]
fn load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        "items-path: items.json\nwindow:\n  title: Shop\n  width: 800\n  height: 600\n",
    )
    .unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap().validated().unwrap();
    assert_eq!(cfg.window.title, "Shop");
    assert_eq!((cfg.window.width, cfg.window.height), (800, 600));
    assert!(Configuration::from_yaml_file(dir.path().join("missing.yaml")).is_err());
}

#[test]
fn controller_options_follow_configuration() {
    let yaml = r#"
gallery:
  bend: 0
physics:
  ease: 0.2
  drag-sensitivity: 0.01
camera:
  distance: 12
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let options = ControllerOptions::from(&cfg);
    assert_eq!(options.bend, 0.0);
    assert!((options.ease - 0.2).abs() < f32::EPSILON);
    assert!((options.drag_sensitivity - 0.01).abs() < f32::EPSILON);
    assert!((options.camera_distance - 12.0).abs() < f32::EPSILON);
}
