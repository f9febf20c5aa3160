mod config;
mod db;
mod error;
mod filter;
mod index;
mod ipc;
mod logging;
mod metrics;
mod model;
mod normalize;
mod repo;
mod seed;
mod service;
mod views;

use crate::config::AppConfig;
use crate::service::DataServices;
use anyhow::Context;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    logging::init_logging(&config.logging)?;

    let services = DataServices::from_config(&config)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = services.backend_kind().as_str(),
        "classtrackd ready"
    );

    let shutdown = CancellationToken::new();
    let state = Arc::new(ipc::AppState::new(config, services, shutdown.clone()));

    // One writer owns stdout so concurrent responses never interleave.
    let (tx, mut rx) = mpsc::unbounded_channel::<serde_json::Value>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(resp) = rx.recv().await {
            let mut line = serde_json::to_string(&resp)
                .unwrap_or_else(|_| "{\"ok\":false}".to_string());
            line.push('\n');
            if stdout.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = JoinSet::new();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(v)) => v,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let _ = tx.send(ipc::bad_json(e.to_string()));
                continue;
            }
        };

        debug!(id = %req.id, method = %req.method, "request");
        // Registered before spawning so a cancel on the next line finds it.
        let ticket = state.begin_request(&req.id);
        let state = Arc::clone(&state);
        let tx = tx.clone();
        tasks.spawn(async move {
            let id = req.id.clone();
            let resp = ipc::handle_request(&state, req, ticket.token.clone()).await;
            state.finish_request(&id, &ticket);
            let _ = tx.send(resp);
        });

        while let Some(done) = tasks.try_join_next() {
            if let Err(e) = done {
                warn!(error = %e, "request task failed");
            }
        }
    }

    shutdown.cancel();
    while let Some(done) = tasks.join_next().await {
        if let Err(e) = done {
            warn!(error = %e, "request task failed");
        }
    }
    drop(tx);
    let _ = writer.await;
    info!("stdin closed, exiting");
    Ok(())
}
