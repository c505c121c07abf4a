//! Lobby server entry point.
//!
//! Loads the TOML configuration, applies command-line overrides, sets up
//! logging and runs the server until a termination signal arrives.

mod cli;
mod config;
mod logging;
mod signals;

use anyhow::Context;
use cli::CliArgs;
use config::AppConfig;
use lobby_server::LobbyServer;
use std::sync::Arc;
use tracing::{error, info};

/// The running application: resolved configuration plus the server it drives.
pub struct Application {
    config: AppConfig,
    server: Arc<LobbyServer>,
}

impl Application {
    /// Builds the application from command-line arguments.
    pub async fn new(args: CliArgs) -> anyhow::Result<Self> {
        // Load configuration first (before logging setup)
        let mut config = AppConfig::load_from_file(&args.config_path)
            .await
            .with_context(|| format!("failed to load {}", args.config_path.display()))?;

        if let Some(bind_address) = args.bind_address {
            config.server.bind_address = bind_address;
        }
        if let Some(query_address) = args.query_address {
            config.server.query_address = query_address;
            config.server.query_enabled = true;
        }
        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }
        if let Some(max_connections) = args.max_connections {
            config.server.max_connections = max_connections;
        }
        if args.json_logs {
            config.logging.json_format = true;
        }

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

        logging::setup_logging(&config.logging)?;

        let server = Arc::new(LobbyServer::new(config.to_server_config()?));
        info!(
            "📂 Config: {} | Lobby v{}",
            args.config_path.display(),
            env!("CARGO_PKG_VERSION")
        );

        Ok(Self { config, server })
    }

    /// Serves until a shutdown signal arrives or the server fails.
    pub async fn run(self) -> anyhow::Result<()> {
        info!("📋 Configuration Summary:");
        info!("  🌐 Bind address: {}", self.config.server.bind_address);
        if self.config.server.query_enabled {
            info!("  🔎 Query address: {}", self.config.server.query_address);
        } else {
            info!("  🔎 Query endpoint disabled");
        }
        info!("  👥 Max connections: {}", self.config.server.max_connections);
        info!(
            "  ⏱️ Handshake timeout: {}s",
            self.config.server.connection_timeout
        );

        let server = self.server.clone();
        let mut server_handle = tokio::spawn(async move { server.start().await });

        info!("🛑 Press Ctrl+C to gracefully shutdown");

        tokio::select! {
            result = &mut server_handle => {
                // the server only returns on its own when it failed to start
                return match result {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(e.into()),
                    Err(e) => Err(e.into()),
                };
            }
            signal = signals::wait_for_shutdown_signal() => {
                signal.context("failed to install signal handlers")?;
            }
        }

        info!("🛑 Shutdown signal received, initiating graceful shutdown...");
        self.server.shutdown().await?;
        server_handle.await??;

        info!(
            "✅ Lobby shutdown complete ({} sessions were still connected)",
            self.server.hub().connection_count().await
        );
        Ok(())
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let app = match Application::new(args).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("❌ Failed to start application: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app.run().await {
        error!("❌ Application error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
