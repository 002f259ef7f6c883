use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use image::imageops::FilterType;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::LoaderSettings;
use crate::events::{DecodedImage, ImageLoaded, LoadImage};

/// Where an item's image lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Http(String),
    File(PathBuf),
}

impl ImageSource {
    /// Classifies `url`. Relative paths resolve against `base_dir`.
    pub fn parse(url: &str, base_dir: &Path) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            bail!("empty image url");
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(Self::Http(url.to_string()));
        }
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(Self::File(PathBuf::from(path)));
        }
        if let Some((scheme, _)) = url.split_once("://") {
            bail!("unsupported image url scheme '{scheme}'");
        }
        let path = Path::new(url);
        Ok(Self::File(if path.is_relative() {
            base_dir.join(path)
        } else {
            path.to_path_buf()
        }))
    }
}

// Decodes to RGBA8, shrinking so neither side exceeds `max_dimension`.
fn decode_rgba8(bytes: &[u8], max_dimension: u32) -> Result<DecodedImage> {
    let img = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    let img = if img.width() > max_dimension || img.height() > max_dimension {
        img.resize(max_dimension, max_dimension, FilterType::Triangle)
    } else {
        img
    };
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

async fn fetch_bytes(client: &reqwest::Client, source: &ImageSource) -> Result<Vec<u8>> {
    match source {
        ImageSource::Http(url) => {
            let response = client.get(url).send().await?.error_for_status()?;
            Ok(response.bytes().await?.to_vec())
        }
        ImageSource::File(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
    }
}

async fn load(client: reqwest::Client, source: ImageSource, max_dimension: u32) -> Result<DecodedImage> {
    let bytes = fetch_bytes(&client, &source).await?;
    tokio::task::spawn_blocking(move || decode_rgba8(&bytes, max_dimension)).await?
}

/// Fetches and decodes item images:
/// - at most `max_concurrent` distinct URLs in flight;
/// - requests for a URL already in flight join it instead of fetching again;
/// - failures are logged and dropped, leaving the item on its placeholder.
///
/// Queued requests are taken before finished jobs are collected.
pub async fn run(
    mut requests: Receiver<LoadImage>,
    to_viewer: Sender<ImageLoaded>,
    cancel: CancellationToken,
    settings: LoaderSettings,
    base_dir: PathBuf,
) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(settings.request_timeout)
        .build()
        .context("failed to build http client")?;
    let max_in_flight = settings.max_concurrent.max(1);
    let mut in_flight: HashMap<String, Vec<usize>> = HashMap::new();
    let mut tasks: JoinSet<(String, Result<DecodedImage>)> = JoinSet::new();

    loop {
        select! {
            biased;

            _ = cancel.cancelled() => {
                debug!(pending = in_flight.len(), "image_loader_cancelled");
                tasks.abort_all();
                break;
            },

            Some(LoadImage { item, url }) = requests.recv(), if in_flight.len() < max_in_flight => {
                if let Some(waiting) = in_flight.get_mut(&url) {
                    waiting.push(item);
                    continue;
                }
                let source = match ImageSource::parse(&url, &base_dir) {
                    Ok(source) => source,
                    Err(err) => {
                        warn!(item, %url, error = %err, "image_load_failed");
                        continue;
                    }
                };
                in_flight.insert(url.clone(), vec![item]);
                let client = client.clone();
                let max_dimension = settings.max_dimension;
                tasks.spawn(async move {
                    let result = load(client, source, max_dimension).await;
                    (url, result)
                });
            }

            Some(join_res) = tasks.join_next() => {
                let Ok((url, result)) = join_res else {
                    continue;
                };
                let items = in_flight.remove(&url).unwrap_or_default();
                match result {
                    Ok(image) => {
                        debug!(%url, width = image.width, height = image.height, "image_loaded");
                        if to_viewer.send(ImageLoaded { items, url, image }).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(%url, ?items, error = %err, "image_load_failed");
                    }
                }
            }

            // Request channel closed and nothing left to join.
            else => break,
        }
    }
    Ok(())
}
