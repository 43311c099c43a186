use anyhow::Context;
use backdrop::config::Config;
use backdrop::trace::{parse_trace, sweep};
use backdrop::{Backdrop, HttpPathCache, PathCache, PathSource, Preferences};
use clap::Parser;
use dotgrid::{GridConfig, Viewport};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

const FRAME_INTERVAL_MS: u64 = 16;
const SWEEP_STEPS: usize = 120;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Initialization ---
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();
    let config = Config::parse();
    tracing::info!(config = ?config, "Backdrop starting with configuration");

    let grid = match &config.grid_config {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read grid config {}", path.display()))?;
            serde_json::from_slice::<GridConfig>(&bytes).context("Failed to parse grid config")?
        }
        None => GridConfig::default(),
    };
    grid.validate().context("Invalid grid config")?;

    let mut prefs = Preferences::load(&config.prefs)?;
    if config.dark_mode.is_some() || config.animations.is_some() {
        prefs.dark_mode = config.dark_mode.unwrap_or(prefs.dark_mode);
        prefs.animations = config.animations.unwrap_or(prefs.animations);
        prefs.save(&config.prefs)?;
        tracing::info!(prefs = ?prefs, "Saved preferences");
    }

    let viewport = Viewport::new(config.width, config.height);
    let timeout = Duration::from_millis(config.request_timeout_ms);
    let cache = HttpPathCache::new(&config.store_url, timeout, grid.variation_slots)?;

    if config.clear_cache {
        match cache.clear(Some(viewport)).await {
            Ok(cleared) => tracing::info!(%viewport, cleared, "Cleared cached paths"),
            Err(e) => tracing::warn!(error = %e, "Failed to clear cached paths"),
        }
    }

    // --- 2. Mount and load paths ---
    let source = PathSource::new(cache, Arc::new(grid), !config.no_store);
    let (backdrop, load) = Backdrop::mount(source, viewport, config.seed);
    load.await.context("Path loading task failed")?;
    tracing::info!(
        %viewport,
        origin = ?backdrop.origin(),
        hotspots = backdrop.hotspot_count(),
        paths = backdrop.path_count(),
        "Backdrop mounted"
    );

    // --- 3. Replay the pointer trace, one batch per frame ---
    let samples = match &config.trace {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read trace {}", path.display()))?;
            parse_trace(&text)?
        }
        None => sweep(config.width, config.height, SWEEP_STEPS),
    };

    let mut interval = tokio::time::interval(Duration::from_millis(FRAME_INTERVAL_MS));
    let mut changes = 0usize;
    for batch in samples.chunks(config.events_per_frame.max(1)) {
        for &(x, y) in batch {
            backdrop.pointer_moved(x, y);
        }
        interval.tick().await;
        if backdrop.frame() {
            changes += 1;
        }
    }
    tracing::info!(
        samples = samples.len(),
        changes,
        active = ?backdrop.active_ids(),
        "Trace replayed"
    );

    // --- 4. Render ---
    let svg = backdrop.render(&config.render_options(&prefs));
    tokio::fs::write(&config.out, svg)
        .await
        .with_context(|| format!("Failed to write {}", config.out.display()))?;
    tracing::info!(out = %config.out.display(), "Frame written");

    // Give the background upload one request's worth of time before exiting.
    if let Some(write) = backdrop.take_pending_write() {
        if tokio::time::timeout(timeout, write).await.is_err() {
            tracing::warn!("Path upload still pending at exit");
        }
    }

    Ok(())
}
