use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_channel::bounded;
use blurbs::Result;
use blurbs::config::{CAPACITY_BOUNDS, Config};
use blurbs::content::{HttpContentSource, Substitution};
use blurbs::engine::Engine;
use blurbs::error::{ConfigError, Error as BlurbError};
use blurbs::surface::{Surface, VirtualSurface};
use blurbs::telemetry::init_tracing;
use tokio::signal;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::cli::Cli;
use super::reporter::run_reporter;

const DEFAULT_CONFIG: &str = "blurbs.toml";

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_filter.as_deref(), cli.json_logs)?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut config = Config::from_env_and_file(&config_path)?;

    if let Some(capacity) = cli.capacity {
        if !CAPACITY_BOUNDS.contains(&capacity) {
            return Err(BlurbError::from(ConfigError::InvalidField {
                field: "cli.capacity",
                message: format!(
                    "value must be between {} and {}",
                    CAPACITY_BOUNDS.start(),
                    CAPACITY_BOUNDS.end()
                ),
            }));
        }
        config.engine.capacity = capacity;
    }
    if cli.seed.is_some() {
        config.rng_seed = cli.seed;
    }

    let source = HttpContentSource::new(
        config.content.url.clone(),
        config.content.request_timeout,
        config.content.connect_timeout,
        cli.insecure,
    )?;
    let substitution = Substitution::new(&config.text.subject, &config.text.replacement)
        .map_err(|message| ConfigError::InvalidField {
            field: "text",
            message,
        })?;
    let layout = VirtualSurface::new(config.surface.viewport, config.surface.metrics);

    info!(
        config = %config_path.display(),
        url = %source.url(),
        capacity = config.engine.capacity,
        dry_run = cli.dry_run,
        "starting blurbs"
    );

    #[cfg(target_os = "linux")]
    if !cli.dry_run {
        let surface = super::desktop::DesktopSurface::new(
            layout,
            config.notify.appname.clone(),
            config.notify.icon.clone(),
        );
        return drive(surface, source, substitution, &config, &cli).await;
    }

    #[cfg(not(target_os = "linux"))]
    if !cli.dry_run {
        warn!("desktop notifications are only available on Linux, running headless");
    }

    drive(layout, source, substitution, &config, &cli).await
}

async fn drive<S: Surface>(
    surface: S,
    source: HttpContentSource,
    substitution: Substitution,
    config: &Config,
    cli: &Cli,
) -> Result<()> {
    let (tx, rx) = bounded(config.event_queue_bound);
    let reporter = tokio::spawn(run_reporter(rx, cli.dry_run));

    let mut engine = Engine::new(
        config.engine,
        surface,
        Arc::new(source),
        substitution,
        config.rng_seed,
    )
    .with_events(tx);
    engine.run(shutdown_signal(cli.run_for)).await;

    info!(active = engine.active_len(), "engine stopped");
    // Dropping the engine closes the event channel.
    drop(engine);

    match reporter.await {
        Ok(tally) => debug!(?tally, "reporter joined"),
        Err(err) => warn!(error = %err, "event reporter terminated unexpectedly"),
    }
    Ok(())
}

async fn shutdown_signal(run_for: Option<Duration>) {
    let deadline = async {
        match run_for {
            Some(limit) => sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    tokio::select! {
        res = signal::ctrl_c() => match res {
            Ok(()) => info!("shutdown signal received"),
            Err(err) => {
                warn!(error = %err, "cannot listen for Ctrl-C, waiting for the run duration");
                (&mut deadline).await;
            }
        },
        () = &mut deadline => info!(?run_for, "run duration elapsed"),
    }
}
