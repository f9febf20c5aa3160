use crate::config::AppConfig;
use crate::service::DataServices;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

struct Backend {
    services: Arc<DataServices>,
    workspace: Option<PathBuf>,
}

/// One registration in the in-flight table. Two live requests may share an
/// id; `seq` tells them apart.
pub struct InFlight {
    seq: u64,
    pub token: CancellationToken,
}

/// Shared by every request task.
pub struct AppState {
    pub config: AppConfig,
    backend: RwLock<Backend>,
    in_flight: Mutex<HashMap<String, Vec<(u64, CancellationToken)>>>,
    next_seq: AtomicU64,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: AppConfig, services: DataServices, shutdown: CancellationToken) -> Self {
        AppState {
            backend: RwLock::new(Backend {
                services: Arc::new(services),
                workspace: config.backend.path.clone(),
            }),
            config,
            in_flight: Mutex::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            shutdown,
        }
    }

    /// Requests keep the services they started with, even if the workspace
    /// is switched underneath them.
    pub async fn services(&self) -> Arc<DataServices> {
        Arc::clone(&self.backend.read().await.services)
    }

    pub async fn workspace(&self) -> Option<PathBuf> {
        self.backend.read().await.workspace.clone()
    }

    pub async fn swap_services(&self, services: DataServices, workspace: PathBuf) {
        let mut backend = self.backend.write().await;
        backend.services = Arc::new(services);
        backend.workspace = Some(workspace);
    }

    pub fn begin_request(&self, id: &str) -> InFlight {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let token = self.shutdown.child_token();
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id.to_string())
            .or_default()
            .push((seq, token.clone()));
        InFlight { seq, token }
    }

    /// Drops only this registration; a later request reusing the id stays
    /// cancellable.
    pub fn finish_request(&self, id: &str, ticket: &InFlight) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entries) = in_flight.get_mut(id) {
            entries.retain(|(seq, _)| *seq != ticket.seq);
            if entries.is_empty() {
                in_flight.remove(id);
            }
        }
    }

    /// Cancels every live request with this id. `false` when there is none.
    pub fn cancel_request(&self, id: &str) -> bool {
        let tokens: Vec<CancellationToken> = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(|entries| entries.iter().map(|(_, t)| t.clone()).collect())
            .unwrap_or_default();
        for t in &tokens {
            t.cancel();
        }
        !tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GradingPolicy;

    fn state() -> AppState {
        let config = AppConfig::from_file("definitely-not-a-classtrack-config").unwrap();
        AppState::new(
            config,
            DataServices::in_memory(None, GradingPolicy::default()),
            CancellationToken::new(),
        )
    }

    #[test]
    fn reused_id_stays_cancellable_after_the_first_finishes() {
        let state = state();
        let first = state.begin_request("7");
        let second = state.begin_request("7");

        state.finish_request("7", &first);
        assert!(state.cancel_request("7"));
        assert!(second.token.is_cancelled());
        assert!(!first.token.is_cancelled());

        state.finish_request("7", &second);
        assert!(!state.cancel_request("7"));
    }

    #[test]
    fn cancel_reaches_every_request_sharing_an_id() {
        let state = state();
        let a = state.begin_request("x");
        let b = state.begin_request("x");
        let other = state.begin_request("y");

        assert!(state.cancel_request("x"));
        assert!(a.token.is_cancelled());
        assert!(b.token.is_cancelled());
        assert!(!other.token.is_cancelled());
    }
}
