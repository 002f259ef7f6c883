//! The GPU gallery and the layout carousel must agree on what a click is.

use std::time::{Duration, Instant};

use glam::Vec2;
use loop_gallery::carousel::{Carousel, CarouselRelease};
use loop_gallery::catalogue::GalleryItem;
use loop_gallery::config::Configuration;
use loop_gallery::gallery::camera::Screen;
use loop_gallery::gallery::pointer::ClickPolicy;
use loop_gallery::gallery::{ControllerOptions, GalleryController};
use rand::SeedableRng;
use rand::rngs::StdRng;

struct Gesture {
    travel: f32,
    held: Duration,
}

const GESTURES: [Gesture; 6] = [
    Gesture { travel: 0.0, held: Duration::from_millis(50) },
    Gesture { travel: 4.0, held: Duration::from_millis(120) },
    Gesture { travel: 5.0, held: Duration::from_millis(200) },
    Gesture { travel: 6.0, held: Duration::from_millis(50) },
    Gesture { travel: 0.0, held: Duration::from_millis(201) },
    Gesture { travel: 80.0, held: Duration::from_millis(400) },
];

fn gallery_clicks(cfg: &Configuration, gesture: &Gesture) -> bool {
    let items = (0..3)
        .map(|i| GalleryItem::new(format!("p{i}"), "Item", "x.png"))
        .collect();
    let mut rng = StdRng::seed_from_u64(3);
    let mut g = GalleryController::new(
        items,
        ControllerOptions::from(cfg),
        Screen::new(1600.0, 900.0),
        &mut rng,
    )
    .unwrap();
    let t0 = Instant::now();
    g.tick(t0);
    let start = Vec2::new(800.0, 450.0);
    let end = start + Vec2::new(gesture.travel, 0.0);
    g.pointer_down(start, t0);
    g.pointer_move(end);
    g.pointer_up(end, t0 + gesture.held).is_some()
}

fn carousel_clicks(cfg: &Configuration, gesture: &Gesture) -> bool {
    let policy = ClickPolicy {
        max_distance_px: cfg.physics.click_max_distance_px,
        max_duration: cfg.physics.click_max_duration,
    };
    let mut c = Carousel::new(5, cfg.carousel.clone(), policy);
    let t0 = Instant::now();
    let start = 100.0;
    let end = start + gesture.travel;
    c.press(start, t0);
    c.motion(end, t0 + gesture.held / 2);
    matches!(c.release(end, t0 + gesture.held), CarouselRelease::Click(_))
}

#[test]
fn both_variants_classify_gestures_alike() {
    let cfg = Configuration::default();
    let expected = [true, true, true, false, false, false];
    for (gesture, expected) in GESTURES.iter().zip(expected) {
        assert_eq!(gallery_clicks(&cfg, gesture), expected, "gallery, travel {}", gesture.travel);
        assert_eq!(carousel_clicks(&cfg, gesture), expected, "carousel, travel {}", gesture.travel);
    }
}
