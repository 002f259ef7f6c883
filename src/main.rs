use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use loop_gallery::catalogue::{ItemKind, load_catalogue};
use loop_gallery::config::Configuration;
use loop_gallery::events::{ImageLoaded, LoadImage};
use loop_gallery::navigation::LogNavigator;
use loop_gallery::tasks;

#[derive(Debug, Parser)]
#[command(
    name = "loop-gallery",
    version,
    about = "Infinite-loop GPU item gallery"
)]
struct Args {
    /// Path to YAML config
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Item catalogue (YAML or JSON); overrides `items-path`
    #[arg(long, value_name = "FILE")]
    items: Option<PathBuf>,
    /// Collection the catalogue describes; overrides `item-kind`
    #[arg(long, value_name = "KIND")]
    kind: Option<ItemKind>,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(format!("loop_gallery={level}").parse()?)
        .add_directive("wgpu=warn".parse()?)
        .add_directive("winit=warn".parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        config,
        items,
        kind,
        verbose,
    } = Args::parse();
    init_tracing(verbose)?;

    let mut cfg = match config.as_ref() {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::default(),
    };
    if let Some(items) = items {
        cfg.items_path = items;
    }
    if let Some(kind) = kind {
        cfg.item_kind = kind;
    }
    let cfg = cfg.validated().context("invalid configuration values")?;
    tracing::debug!("configuration:\n{:#?}", cfg);

    let catalogue = load_catalogue(&cfg.items_path)
        .with_context(|| format!("failed to load items from {}", cfg.items_path.display()))?;
    tracing::info!(
        count = catalogue.len(),
        kind = ?cfg.item_kind,
        path = %cfg.items_path.display(),
        "catalogue_loaded"
    );
    let base_dir = cfg
        .items_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();

    let queue_depth = catalogue.len().max(1);
    let (to_load_tx, to_load_rx) = mpsc::channel::<LoadImage>(queue_depth); // Viewer -> Loader
    let (loaded_tx, loaded_rx) = mpsc::channel::<ImageLoaded>(queue_depth); // Loader -> Viewer

    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let mut tasks = JoinSet::new();

    tasks.spawn({
        let cancel = cancel.clone();
        let settings = cfg.loader.clone();
        async move {
            tasks::loader::run(to_load_rx, loaded_tx, cancel, settings, base_dir)
                .await
                .context("loader task failed")
        }
    });

    // Blocks until the window closes or cancellation fires.
    let viewer_result = tasks::viewer::run_windowed(
        cfg,
        catalogue,
        LogNavigator,
        loaded_rx,
        to_load_tx,
        cancel.clone(),
    )
    .context("viewer failed");
    cancel.cancel();

    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task error: {e:?}"),
            Err(e) => tracing::error!("join error: {e}"),
        }
    }

    viewer_result
}
