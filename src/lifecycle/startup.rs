//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the management API and advertise its port in the service record
//! - Serve the management API while the controller starts
//! - Run until shutdown is triggered, then shut the controller down
//!
//! # Design Decisions
//! - Fail fast: a failed `start` stops the management API and is returned
//! - Shutdown of the controller always runs once serving ends

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::ServiceConfig;
use crate::lifecycle::controller::{LifecycleError, ServiceController};
use crate::lifecycle::shutdown::Shutdown;
use crate::management::{setup_management_router, ManagementState};
use crate::plugin::PluginLoader;
use crate::registration::{RegistrationClient, Transport};

/// Errors that end the service process.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind management API on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Start(#[from] LifecycleError),

    #[error("management API failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// A bound, not yet started, service.
pub struct ServiceRuntime {
    listener: TcpListener,
    controller: Arc<ServiceController>,
    shutdown: Shutdown,
    shutdown_rx: broadcast::Receiver<()>,
}

fn management_url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

impl ServiceRuntime {
    /// Bind the management API and assemble the controller.
    pub async fn bind(
        config: &ServiceConfig,
        loader: Arc<dyn PluginLoader>,
        transport: Arc<dyn Transport>,
        shutdown: Shutdown,
    ) -> Result<Self, StartupError> {
        let address = config.management.bind_address.clone();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| StartupError::Bind {
                address: address.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| StartupError::Bind { address, source })?;

        let record = config
            .service_record()
            .with_management_port(local_addr.port());
        let registration = Arc::new(RegistrationClient::new(transport));
        let controller = Arc::new(ServiceController::new(
            config.storage.clone(),
            record,
            registration,
            loader,
        ));

        tracing::info!(
            address = %local_addr,
            url = %management_url(local_addr),
            "Management API bound, pass this url to storage-cli"
        );
        Ok(Self {
            listener,
            controller,
            shutdown_rx: shutdown.subscribe(),
            shutdown,
        })
    }

    /// Base URL of the management API, as `storage-cli --url` expects it.
    pub fn management_url(&self) -> std::io::Result<String> {
        self.management_addr().map(management_url)
    }

    pub fn management_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn controller(&self) -> Arc<ServiceController> {
        self.controller.clone()
    }

    /// Start the service and run until shutdown is triggered.
    pub async fn run(self) -> Result<(), StartupError> {
        let ServiceRuntime {
            listener,
            controller,
            shutdown,
            mut shutdown_rx,
        } = self;

        let state = ManagementState::new(controller.clone(), shutdown.clone(), Instant::now());
        let app = setup_management_router(state);
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await
        });

        if let Err(e) = controller.start().await {
            shutdown.trigger();
            let _ = server.await;
            return Err(StartupError::Start(e));
        }

        let served = server.await;
        tracing::info!("Management API stopped, shutting down");
        if let Err(e) = controller.shutdown().await {
            tracing::error!(error = %e, "Shutdown did not complete");
        }

        match served {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(StartupError::Serve(e)),
            Err(e) => Err(StartupError::Serve(std::io::Error::other(e.to_string()))),
        }
    }
}
