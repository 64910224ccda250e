use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use loglift::Config;
use loglift_core::config::SinkKind;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "loglift", about = "Tail an access log and ship parsed events to a sink")]
struct Cli {
    /// Config file (TOML). Defaults to ~/.config/loglift/config.toml if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Access log to follow; overrides `source.path`.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Where events go; overrides `sink.kind`.
    #[arg(long, value_enum)]
    sink: Option<SinkArg>,

    /// Output file for the line-protocol sink; overrides `sink.path`.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log at debug level (RUST_LOG still wins when set).
    #[arg(long)]
    debug: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SinkArg {
    Stdout,
    LineProtocol,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(file) = cli.file {
        config.source.path = file;
    }
    if let Some(sink) = cli.sink {
        config.sink.kind = match sink {
            SinkArg::Stdout => SinkKind::Stdout,
            SinkArg::LineProtocol => SinkKind::LineProtocol,
        };
    }
    if let Some(output) = cli.output {
        config.sink.path = Some(output);
    }

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let stats = loglift::run(&config, cancel).await?;
    tracing::info!(?stats, "loglift stopped");
    Ok(())
}

async fn cancel_on_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("shutdown requested, draining");
    cancel.cancel();
}
