//! Storage service.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!                 │                STORAGE SERVICE               │
//!                 │                                              │
//!   core ◀────────┼── registration ◀── lifecycle ──▶ plugin     │
//!  (POST/DELETE)  │    client           controller    (backend)  │
//!                 │                         ▲                    │
//!   core ─────────┼──▶ management API ──────┘                    │
//!  (change, ping, │                                              │
//!   shutdown)     │                                              │
//!                 └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use storage_service::config::loader::{check_config, read_config};
use storage_service::config::{ConfigError, ServiceConfig};
use storage_service::lifecycle::signals::spawn_signal_forwarder;
use storage_service::lifecycle::startup::ServiceRuntime;
use storage_service::lifecycle::Shutdown;
use storage_service::observability::{logging, metrics};
use storage_service::plugin::PluginRegistry;
use storage_service::registration::HttpTransport;

#[derive(Parser)]
#[command(name = "storage-service")]
#[command(about = "Storage service for the management core", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Service name to register under.
    #[arg(long)]
    name: Option<String>,

    /// Address advertised to the core.
    #[arg(long)]
    address: Option<String>,

    /// Service port advertised to the core.
    #[arg(long)]
    port: Option<u16>,

    /// Management core host.
    #[arg(long)]
    core_host: Option<String>,

    /// Management core port.
    #[arg(long)]
    core_port: Option<u16>,
}

impl Args {
    fn apply(&self, config: &mut ServiceConfig) {
        if let Some(name) = &self.name {
            config.service.name = name.clone();
        }
        if let Some(address) = &self.address {
            config.service.address = address.clone();
        }
        if let Some(port) = self.port {
            config.service.port = port;
        }
        if let Some(host) = &self.core_host {
            config.core.host = host.clone();
        }
        if let Some(port) = self.core_port {
            config.core.port = port;
        }
    }
}

/// Read the file, apply command-line overrides, then validate once.
fn resolve_config(args: &Args) -> Result<ServiceConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => ServiceConfig::default(),
    };
    args.apply(&mut config);
    check_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("storage-service: {}", e);
            std::process::exit(2);
        }
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!(
        name = %config.service.name,
        core = %format!("{}:{}", config.core.host, config.core.port),
        plugin = %config.storage.plugin,
        "storage-service v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let transport = match HttpTransport::new(&config.core) {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            tracing::error!(error = %e, "Failed to create core transport");
            std::process::exit(1);
        }
    };
    let loader = Arc::new(PluginRegistry::with_builtin());
    let shutdown = Shutdown::new();
    let runtime = match ServiceRuntime::bind(&config, loader, transport, shutdown.clone()).await {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Storage service failed");
            std::process::exit(1);
        }
    };
    let _signals = spawn_signal_forwarder(shutdown);
    if let Err(e) = runtime.run().await {
        tracing::error!(error = %e, "Storage service failed");
        std::process::exit(1);
    }

    tracing::info!("Shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_before_validation() {
        let path = std::env::temp_dir().join(format!(
            "storage-service-overrides-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[core]\nport = 0\n").unwrap();
        let path_arg = path.to_string_lossy().to_string();

        let rejected = resolve_config(&Args::parse_from(["storage-service", "--config", &path_arg]));
        assert!(matches!(rejected, Err(ConfigError::Validation(_))));

        let config = resolve_config(&Args::parse_from([
            "storage-service",
            "--config",
            &path_arg,
            "--core-port",
            "8082",
        ]))
        .unwrap();
        assert_eq!(config.core.port, 8082);

        std::fs::remove_file(&path).unwrap();
    }
}
