use std::sync::Arc;

use courier::config::Config;
use courier::http::connection::ConnectionSettings;
use courier::routes::Router;
use courier::server::Listener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    // A setup failure returns Err, which exits with status 1.
    let listener = Listener::bind(&cfg)?;
    let router = Arc::new(Router::new(&cfg.files_dir));

    tracing::info!(files_dir = %cfg.files_dir.display(), "Serving files");

    tokio::select! {
        _ = listener.run(router, ConnectionSettings::from(&cfg)) => {}

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
