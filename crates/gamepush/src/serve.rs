// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gamepush serve` command implementation.
//!
//! Builds the application, starts one loop per scheduled job and, when
//! enabled, the management HTTP surface. SIGINT/SIGTERM cancel a shared
//! token; job loops finish their current run before exiting.

use gamepush_config::GamepushConfig;
use gamepush_core::GamepushError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::app::App;
use crate::server::{self, AppState};

/// Runs the `gamepush serve` command until a shutdown signal arrives.
pub async fn run_serve(config: GamepushConfig) -> Result<(), GamepushError> {
    info!(name = %config.service.name, "starting gamepush serve");

    let shutdown = install_signal_handler();
    let app = App::build(&config, shutdown.clone()).await?;

    let job_handles = if config.schedule.enabled {
        for id in app.scheduler.job_ids() {
            if let Some(next) = app.scheduler.next_run(id) {
                info!(job = %id, next_run = %next, "job scheduled");
            }
        }
        app.scheduler.start()
    } else {
        info!("scheduler disabled by configuration");
        Vec::new()
    };

    let gateway = if config.gateway.enabled {
        let state = AppState::new(app.clone());
        let gateway_config = config.gateway.clone();
        let token = shutdown.clone();
        Some(tokio::spawn(async move {
            server::start_server(&gateway_config, state, token).await
        }))
    } else {
        debug!("gateway disabled by configuration");
        None
    };

    shutdown.cancelled().await;
    info!("shutdown requested, waiting for jobs to finish");

    for handle in job_handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "job loop ended abnormally");
        }
    }
    if let Some(handle) = gateway {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "gateway stopped with error"),
            Err(e) => warn!(error = %e, "gateway task ended abnormally"),
        }
    }

    app.db.close().await?;
    info!("gamepush stopped");
    Ok(())
}

/// Installs handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is received.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                        _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence when set.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gamepush={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn install_signal_handler_returns_token() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        token.cancel();
    }
}
