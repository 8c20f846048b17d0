//! Graceful shutdown.
//!
//! The coordinator moves through `Running -> Draining -> Stopped`. It is
//! driven by a root `CancellationToken`: once that fires, the server stops
//! accepting connections and in-flight requests get `grace_period` to finish.
//! If they don't, the server future is dropped and the remaining connection
//! tasks are aborted when the runtime shuts down.

use std::future::IntoFuture;
use std::time::Duration;
use thiserror::Error;
use tokio::signal;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Lifecycle phase of the listening server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPhase {
    Running,
    Draining,
    Stopped,
}

/// Anything other than a clean drain.
#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("In-flight requests did not finish within the {0:?} grace period")]
    GraceExpired(Duration),
}

pub struct ShutdownCoordinator {
    root: CancellationToken,
    grace_period: Duration,
    phase: watch::Sender<ShutdownPhase>,
}

impl ShutdownCoordinator {
    pub fn new(root: CancellationToken, grace_period: Duration) -> Self {
        let (phase, _) = watch::channel(ShutdownPhase::Running);
        Self {
            root,
            grace_period,
            phase,
        }
    }

    /// The root token; cancel it to start shutting down.
    pub fn root(&self) -> &CancellationToken {
        &self.root
    }

    pub fn phase(&self) -> ShutdownPhase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ShutdownPhase> {
        self.phase.subscribe()
    }

    /// Drives `server` until it stops.
    ///
    /// `server` must stop accepting connections and start draining when the
    /// root token fires, e.g.
    /// `axum::serve(listener, app).with_graceful_shutdown(root.cancelled_owned())`.
    pub async fn run<F>(&self, server: F) -> Result<(), ShutdownError>
    where
        F: IntoFuture<Output = std::io::Result<()>>,
    {
        let server = server.into_future();
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => {
                self.set_phase(ShutdownPhase::Stopped);
                return result.map_err(ShutdownError::from);
            }
            _ = self.root.cancelled() => {}
        }

        info!(
            grace_period_secs = self.grace_period.as_secs_f64(),
            "Server stopped accepting connections, draining"
        );
        self.set_phase(ShutdownPhase::Draining);

        let drained = tokio::time::timeout(self.grace_period, &mut server).await;
        self.set_phase(ShutdownPhase::Stopped);

        match drained {
            Ok(Ok(())) => {
                info!("Server shut down cleanly");
                Ok(())
            }
            Ok(Err(e)) => Err(ShutdownError::Server(e)),
            Err(_) => {
                error!("Grace period elapsed, terminating remaining requests");
                Err(ShutdownError::GraceExpired(self.grace_period))
            }
        }
    }

    fn set_phase(&self, phase: ShutdownPhase) {
        self.phase.send_replace(phase);
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
