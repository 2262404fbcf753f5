use anyhow::{Context, Result};
use babapoly_avatar_proxy::{router, ProxyConfig, DEFAULT_UPSTREAM_BASE, EDIT_AVATAR_PATH};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about = "Forward avatar requests to the Google image APIs")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "AVATAR_PROXY_LISTEN", default_value = "0.0.0.0:8787")]
    listen: SocketAddr,

    /// API key for the image service. Requests fail with 500 while unset.
    #[arg(long, env = "GOOGLE_AI_KEY", hide_env_values = true)]
    google_ai_key: Option<String>,

    /// Base URL the model endpoints are appended to.
    #[arg(long, env = "AVATAR_UPSTREAM_BASE", default_value = DEFAULT_UPSTREAM_BASE)]
    upstream_base: Url,

    /// Upstream request timeout in milliseconds.
    #[arg(long, env = "AVATAR_UPSTREAM_TIMEOUT_MS", default_value_t = 60_000)]
    timeout_ms: u64,

    /// Largest accepted request body.
    #[arg(long, env = "AVATAR_BODY_LIMIT_BYTES", default_value_t = 16 * 1024 * 1024)]
    body_limit_bytes: usize,
}

impl Args {
    fn config(&self) -> ProxyConfig {
        ProxyConfig {
            api_key: self.google_ai_key.clone(),
            upstream_base: self.upstream_base.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            body_limit_bytes: self.body_limit_bytes,
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = args.config();
    if config.api_key.is_none() {
        tracing::warn!("GOOGLE_AI_KEY is not set; every request will fail with 500");
    }
    let app = router(&config).context("failed to build upstream client")?;

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!(
        addr = %args.listen,
        path = EDIT_AVATAR_PATH,
        upstream = %config.upstream_base,
        "avatar proxy listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
