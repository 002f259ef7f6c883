use std::path::Path;
use std::time::Duration;

use loop_gallery::config::LoaderSettings;
use loop_gallery::events::{ImageLoaded, LoadImage};
use loop_gallery::tasks::loader;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 120, 240, 255]));
    img.save(dir.join(name)).unwrap();
}

async fn collect(mut rx: mpsc::Receiver<ImageLoaded>) -> Vec<ImageLoaded> {
    let mut out = Vec::new();
    while let Some(loaded) = rx.recv().await {
        out.push(loaded);
    }
    out.sort_by(|a, b| a.url.cmp(&b.url));
    out
}

#[tokio::test]
async fn loads_local_images_and_joins_duplicate_urls() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "a.png", 4, 3);
    write_png(dir.path(), "b.png", 2, 2);

    let (req_tx, req_rx) = mpsc::channel(8);
    let (out_tx, out_rx) = mpsc::channel(8);
    for (item, url) in [(0, "a.png"), (1, "b.png"), (2, "a.png"), (3, "missing.png")] {
        req_tx
            .send(LoadImage {
                item,
                url: url.to_string(),
            })
            .await
            .unwrap();
    }
    drop(req_tx);

    loader::run(
        req_rx,
        out_tx,
        CancellationToken::new(),
        LoaderSettings::default(),
        dir.path().to_path_buf(),
    )
    .await
    .unwrap();

    let loaded = collect(out_rx).await;
    assert_eq!(loaded.len(), 2, "missing file produces no event");
    assert_eq!(loaded[0].url, "a.png");
    assert_eq!(loaded[0].items, vec![0, 2]);
    assert_eq!((loaded[0].image.width, loaded[0].image.height), (4, 3));
    assert_eq!(loaded[0].image.pixels.len(), 4 * 3 * 4);
    assert_eq!(loaded[1].url, "b.png");
    assert_eq!(loaded[1].items, vec![1]);
}

#[tokio::test]
async fn absolute_and_file_urls_are_read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "c.png", 64, 32);
    let absolute = dir.path().join("c.png");

    let (req_tx, req_rx) = mpsc::channel(4);
    let (out_tx, out_rx) = mpsc::channel(4);
    req_tx
        .send(LoadImage {
            item: 5,
            url: format!("file://{}", absolute.display()),
        })
        .await
        .unwrap();
    drop(req_tx);

    let settings = LoaderSettings {
        max_dimension: 16,
        ..LoaderSettings::default()
    };
    loader::run(req_rx, out_tx, CancellationToken::new(), settings, "/nonexistent".into())
        .await
        .unwrap();

    let loaded = collect(out_rx).await;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].items, vec![5]);
    assert_eq!((loaded[0].image.width, loaded[0].image.height), (16, 8));
}

#[tokio::test]
async fn cancellation_stops_the_loader() {
    let (_req_tx, req_rx) = mpsc::channel::<LoadImage>(4);
    let (out_tx, _out_rx) = mpsc::channel(4);
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(loader::run(
        req_rx,
        out_tx,
        cancel.clone(),
        LoaderSettings::default(),
        ".".into(),
    ));
    cancel.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("loader exits after cancellation")
        .unwrap();
    assert!(result.is_ok());
}
