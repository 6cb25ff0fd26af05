//! Command implementations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use cloudcast::api::{AsyncReqwestClient, CloudcastClient, HttpError};
use cloudcast::auth::CredentialCache;
use cloudcast::config::Config;
use cloudcast::overlay::{
    LayerCache, OverlayError, OverlayKey, OverlaySource, PreloadCoordinator, PublishedLayers,
    RasterSource, SharedOverlayStatus,
};
use cloudcast::playback::PlaybackSpeed;
use cloudcast::session::CloudcastSession;
use cloudcast::timestep::{TimeStep, MAX_TIME_STEPS};
use cloudcast::variable::VariableId;

use crate::host::DiskHost;

/// CLI-level failures.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to create HTTP client: {0}")]
    Http(#[from] HttpError),

    #[error("{0}")]
    Overlay(#[from] OverlayError),

    #[error("step must be in 0..{max}", max = MAX_TIME_STEPS)]
    InvalidStep,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

type Engine = (
    Arc<CloudcastClient<AsyncReqwestClient>>,
    Arc<LayerCache<RasterSource<AsyncReqwestClient>>>,
);

/// Assemble the HTTP client, credential cache, API client, and layer cache
/// from configuration.
fn build_engine(config: &Config) -> Result<Engine, CliError> {
    let http = Arc::new(AsyncReqwestClient::new()?);
    let credentials = Arc::new(CredentialCache::new(
        Arc::clone(&http),
        config.token_source(),
    ));
    let client = Arc::new(CloudcastClient::new(
        http,
        credentials,
        &config.api.base_url,
    ));
    let source = Arc::new(RasterSource::new(Arc::clone(&client)));
    let cache = Arc::new(LayerCache::new(source));
    Ok((client, cache))
}

fn parse_step(step: u8) -> Result<TimeStep, CliError> {
    TimeStep::new(step).ok_or(CliError::InvalidStep)
}

/// `cloudcast info`: one-shot dataset metadata query.
pub async fn info(config: &Config) -> Result<(), CliError> {
    let (client, _) = build_engine(config)?;
    let info = client.fetch_data_info().await;

    println!("{}", style("Dataset").bold());
    println!("  initialized:  {}", info.best_time_display());
    println!("  available:    {}", if info.file_exists { "yes" } else { "no" });
    println!("  size:         {:.2} MB", info.file_size_mb);
    if !info.forecast_steps.is_empty() {
        println!("  steps:        {}", info.forecast_steps.len());
    }
    if !info.variables.is_empty() {
        println!("  variables:    {}", info.variables.join(", "));
    }
    if let Some(error) = &info.error {
        println!("  {} {}", style("error:").red(), error);
    }
    Ok(())
}

/// `cloudcast fetch`: one overlay to a PNG file.
pub async fn fetch(
    config: &Config,
    variable: VariableId,
    step: u8,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let step = parse_step(step)?;
    let (client, _) = build_engine(config)?;
    let source = RasterSource::new(client);

    let overlay = source.fetch_and_decode(OverlayKey::new(variable, step)).await?;

    let path = output.unwrap_or_else(|| PathBuf::from(format!("{}_{}.png", variable, step)));
    std::fs::write(&path, &overlay.image)?;

    println!(
        "{} {} {} -> {}",
        style("fetched").green(),
        variable,
        step.format_offset(),
        path.display()
    );
    for (label, (lon, lat)) in ["top-left", "top-right", "bottom-right", "bottom-left"]
        .iter()
        .zip(overlay.quad.corners())
    {
        println!("  {:<13} {:.4}, {:.4}", label, lon, lat);
    }
    Ok(())
}

/// `cloudcast preload`: populate every step of a variable, with a progress
/// bar fed from the shared pipeline status.
pub async fn preload(
    config: &Config,
    variable: VariableId,
    out: Option<PathBuf>,
) -> Result<(), CliError> {
    let (_, cache) = build_engine(config)?;
    let host = DiskHost::new(out)?;
    let layers = Arc::new(PublishedLayers::new(host));
    let status = SharedOverlayStatus::new();
    let preloader = PreloadCoordinator::new(Arc::clone(&cache), layers, Arc::clone(&status));

    let bar = progress_bar();
    let bar_status = Arc::clone(&status);
    let bar_handle = bar.clone();
    let watcher = tokio::spawn(async move {
        loop {
            if let Some(progress) = bar_status.snapshot().preload_progress {
                bar_handle.set_position(progress as u64);
                if progress >= 100.0 {
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    });

    preloader.preload_all(variable, TimeStep::ZERO).await;
    let _ = watcher.await;
    bar.finish_with_message("preload complete");

    let stats = cache.stats();
    println!(
        "{} {}/{} steps cached for {}",
        style("done:").green(),
        cache.cached_steps(variable),
        MAX_TIME_STEPS,
        variable
    );
    info!(hits = stats.hits, misses = stats.misses, "cache statistics");
    Ok(())
}

/// `cloudcast play`: preload then animate, until Ctrl-C or a frame limit.
pub async fn play(
    config: &Config,
    variable: VariableId,
    speed: PlaybackSpeed,
    out: Option<PathBuf>,
    frames: Option<u32>,
) -> Result<(), CliError> {
    let (client, _) = build_engine(config)?;
    let host = DiskHost::new(out)?;
    let session = Arc::new(CloudcastSession::new(client, host));
    session.select_variable(variable).await?;
    session.scheduler().set_speed(speed);

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    ctrlc::set_handler(move || ctrl_c_token.cancel()).expect("failed to set Ctrl-C handler");

    let run_session = Arc::clone(&session);
    let run_token = token.clone();
    let run = tokio::spawn(async move { run_session.run(run_token).await });

    session.toggle_play().await;
    if let Some(error) = session.status().snapshot().error {
        println!("{} {}", style("warning:").yellow(), error);
    }

    println!(
        "{} {} at {} ({} to stop)",
        style("playing").green(),
        variable,
        speed,
        style("Ctrl-C").bold()
    );

    let mut steps = session.scheduler().subscribe();
    let mut shown: u32 = 0;
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            changed = steps.changed() => {
                if changed.is_err() {
                    break;
                }
                let step = *steps.borrow_and_update();
                println!("  frame {:<2} {}", step, step.format_offset());
                shown += 1;
                if frames.is_some_and(|limit| shown >= limit) {
                    token.cancel();
                }
            }
        }
    }

    session.shutdown();
    let _ = run.await;
    println!("{}", style("stopped").dim());
    Ok(())
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:30}] {pos:>3}%")
            .expect("static progress template is valid")
            .progress_chars("=> "),
    );
    bar.set_message("preloading layers");
    bar
}
