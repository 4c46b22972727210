use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use eyre::{Result, WrapErr};
use log::{info, warn};

mod cli;

use cli::{Cli, Command};
use yt_transcript_mcp::config::Config;
use yt_transcript_mcp::mcp::{self, TranscriptServer};
use yt_transcript_mcp::resolver;
use yt_transcript_mcp::youtube::YoutubeBackend;

fn setup_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from(path),
        // the default file is optional; a broken one is reported and ignored
        None => Ok(Config::load().unwrap_or_else(|e| {
            warn!("Ignoring config file: {e:#}");
            Config::default()
        })),
    }
}

async fn serve(host: &str, port: u16, server: TranscriptServer) -> Result<()> {
    let app = mcp::router(server);

    let listener = mcp::bind(host, port)
        .await
        .wrap_err_with(|| format!("binding to {host}:{port}"))?;
    let addr = listener.local_addr().wrap_err("reading bound address")?;
    info!("MCP server listening on http://{addr}/mcp");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("running MCP server")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = load_config(&cli)?;

    // CLI flags take priority over the config file
    let host = cli.host.clone().unwrap_or_else(|| config.host().to_string());
    let port = cli.port.unwrap_or_else(|| config.port());
    let timeout = Duration::from_secs(cli.timeout.unwrap_or_else(|| config.request_timeout_secs()));

    let backend = Arc::new(YoutubeBackend::new(timeout).wrap_err("building HTTP client")?);

    match cli.command.clone().unwrap_or(Command::Serve) {
        Command::Serve => {
            let server = TranscriptServer::new(backend, config.default_languages());
            serve(&host, port, server).await
        }
        Command::Get {
            video,
            languages,
            no_timestamps,
        } => {
            let languages = languages.unwrap_or_else(|| config.default_languages().to_string());
            let result = resolver::get_transcript(backend.as_ref(), &video, &languages, !no_timestamps).await;
            println!("{}", result.to_json()?);
            if result.is_failure() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
