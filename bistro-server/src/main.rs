use bistro_server::core::BoxError;
use bistro_server::{Config, Server};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bistro_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        env = %config.environment,
        backend = ?config.store_backend,
        "Starting bistro-server"
    );

    if let Err(e) = Server::new(config).run().await {
        tracing::error!("Server error: {e}");
        return Err(e);
    }
    Ok(())
}
