//! Daemon bootstrap and lifecycle.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use tokio::sync::watch;
use tracing::{error, info, warn};

use vigil_api::{ApiConfig, ApiServer, AppState};
use vigil_config::{
    Config, ConfigValidator, DeliveryConfig, OverlapMode, PathsConfig, StorageBackend,
    StorageConfig,
};
use vigil_core::{CheckRunner, DeliveryPolicy, EventProcessor, HandlerRegistry, OverlapPolicy, Scheduler};
use vigil_protocols::Storage;
use vigil_storage::{FileStorage, MemoryStorage};

use crate::register;

/// Run the daemon until SIGINT or SIGTERM.
pub(crate) async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting Vigil v{}", env!("CARGO_PKG_VERSION"));

    let validation = ConfigValidator::validate(&config);
    for warning in &validation.warnings {
        warn!("Config: {}: {}", warning.path, warning.message);
    }
    if !validation.is_valid() {
        for e in &validation.errors {
            error!("Config: {}", e);
        }
        bail!("invalid configuration ({} errors)", validation.errors.len());
    }

    ensure_folders(&config.paths)?;
    let storage = open_storage(&config.storage).await?;

    let registry = Arc::new(HandlerRegistry::new());
    register::register_console(&registry)?;
    register::register_handlers(&registry, &config.paths.handlers);
    let checks = register::bind_checks(&registry, &config.paths.checks);

    let processor = EventProcessor::new(storage.clone())
        .with_policy(delivery_policy(&config.delivery))
        .with_deadline(config.storage.operation_timeout());
    let runner = CheckRunner::new(&config.paths.commands, Arc::new(processor))
        .with_timeout(config.scheduler.command_timeout());
    let scheduler = Scheduler::new(Arc::new(runner))
        .with_overlap(overlap_policy(config.scheduler.overlap))
        .with_run_on_start(config.scheduler.run_on_start);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_task = tokio::spawn(Arc::new(scheduler).run(checks, shutdown_rx.clone()));

    let state = AppState::new(storage, registry)
        .with_storage_deadline(config.storage.operation_timeout());
    let server = ApiServer::new(
        ApiConfig::new(config.server.host.clone(), config.server.port),
        Arc::new(state),
    );
    info!("Starting API server on {}", server.addr());
    let mut api_task = tokio::spawn(async move { server.run(shutdown_rx).await });

    let early_exit = tokio::select! {
        signal = wait_for_signal() => {
            signal?;
            None
        }
        result = &mut api_task => Some(result),
    };

    info!("Shutting down");
    let _ = shutdown_tx.send(true);

    let api_result = match early_exit {
        Some(result) => result,
        None => api_task.await,
    };
    if let Err(e) = scheduler_task.await {
        error!("Scheduler task failed: {}", e);
    }

    match api_result {
        Ok(Ok(())) => {
            info!("Vigil stopped");
            Ok(())
        }
        Ok(Err(e)) => Err(anyhow!(e).context("API server failed")),
        Err(e) => Err(anyhow!(e).context("API server task failed")),
    }
}

/// Create the definition and command folders when missing.
pub(crate) fn ensure_folders(paths: &PathsConfig) -> anyhow::Result<()> {
    for dir in [&paths.checks, &paths.commands, &paths.handlers] {
        ensure_folder(dir)?;
    }
    Ok(())
}

fn ensure_folder(dir: &Path) -> anyhow::Result<()> {
    if !dir.is_dir() {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
        info!("Created folder {:?}", dir);
    }
    Ok(())
}

/// Build and initialize the configured storage backend.
///
/// Initialization is bounded only when a connect timeout is configured.
pub(crate) async fn open_storage(config: &StorageConfig) -> anyhow::Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::File => Arc::new(FileStorage::new(&config.path)),
    };

    match config.connect_timeout() {
        Some(deadline) => tokio::time::timeout(deadline, storage.init())
            .await
            .map_err(|_| anyhow!("storage not ready after {:?}", deadline))??,
        None => storage.init().await?,
    }

    info!("Storage ready ({:?} backend)", config.backend);
    Ok(storage)
}

pub(crate) fn delivery_policy(config: &DeliveryConfig) -> DeliveryPolicy {
    if config.deliver_all {
        DeliveryPolicy::All
    } else {
        DeliveryPolicy::Statuses(config.statuses.clone())
    }
}

fn overlap_policy(mode: OverlapMode) -> OverlapPolicy {
    match mode {
        OverlapMode::Allow => OverlapPolicy::Allow,
        OverlapMode::Skip => OverlapPolicy::Skip,
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;
    let mut interrupt = signal(SignalKind::interrupt()).context("installing SIGINT handler")?;

    tokio::select! {
        _ = terminate.recv() => info!("Received SIGTERM"),
        _ = interrupt.recv() => info!("Received SIGINT"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await.context("installing Ctrl+C handler")?;
    info!("Received Ctrl+C");
    Ok(())
}
