use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use labelkeeper::keeper::RetryPolicy;
use labelkeeper::{create_app, AppConfig, GithubAppCredentials, ServerState};

#[derive(clap::Parser)]
struct Opts {
    /// Path to the TOML configuration file.
    #[arg(long, env = "CONFIG_FILE")]
    config: PathBuf,

    /// Address on which the webhook server listens.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,
}

async fn server(state: ServerState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind to {addr}"))?;
    tracing::info!("Listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn try_main(opts: Opts) -> anyhow::Result<()> {
    let config = AppConfig::load(&opts.config)?;
    let credentials = GithubAppCredentials::new(
        config.github.app_id,
        config.private_key()?,
        config.github.api_url.as_ref().map(|url| url.to_string()),
    );
    let state = ServerState::new(
        credentials,
        config.webhook_secret(),
        RetryPolicy::from(&config.retry),
        config.queue,
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Cannot build tokio runtime")?;
    runtime.block_on(server(state, opts.bind))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts = Opts::parse();
    if let Err(error) = try_main(opts) {
        eprintln!("Error: {error:?}");
        std::process::exit(1);
    }
}
