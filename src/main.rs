//! Vigil - check scheduler and incident notifier
//!
//! Main entry point for the Vigil daemon.

mod bootstrap;
mod cli;
mod register;

use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use vigil_config::{ConfigLoader, LogFormat, LoggingConfig};

use crate::cli::Cli;

fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    // RUST_LOG wins over the configured level
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let console = match config.format {
        LogFormat::Text => fmt::layer().with_target(true).with_ansi(true).boxed(),
        LogFormat::Json => fmt::layer().json().boxed(),
    };

    let file = match &config.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("vigil")
                .filename_suffix("log")
                .max_log_files(30)
                .build(dir)?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            // Keeps the writer thread alive until exit
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load_or_default(&cli.config)?;
    cli.apply(&mut config);

    init_tracing(&config.logging)?;
    tracing::info!("Configuration: {:?}", cli.config);

    bootstrap::run(config).await
}
