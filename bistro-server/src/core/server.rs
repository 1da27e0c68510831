//! HTTP server

use tokio::net::TcpListener;

use super::{AppState, BoxError, Config};
use crate::api;

pub struct Server {
    config: Config,
    state: Option<AppState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Serve a prepared state instead of building one from the config
    pub fn with_state(config: Config, state: AppState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Bind `0.0.0.0:{http_port}` and serve until Ctrl-C
    pub async fn run(self) -> Result<(), BoxError> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<(), BoxError> {
        let state = match self.state {
            Some(state) => state,
            None => AppState::from_config(&self.config).await?,
        };
        let app = api::build_app(state, &api::HttpSettings::from(&self.config));

        tracing::info!(
            addr = %listener.local_addr()?,
            env = %self.config.environment,
            "bistro-server listening"
        );

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
