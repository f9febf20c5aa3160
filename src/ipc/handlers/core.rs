use crate::ipc::helpers::{get_required_str, respond, HandlerErr, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::service::DataServices;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

async fn handle_health(state: &AppState, _req: &Request) -> HandlerResult {
    let services = state.services().await;
    Ok(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "backend": services.backend_kind().as_str(),
        "workspacePath": state.workspace().await.map(|p| p.to_string_lossy().to_string()),
    }))
}

async fn handle_workspace_select(state: &AppState, req: &Request) -> HandlerResult {
    let path = PathBuf::from(get_required_str(&req.params, "path")?);
    let policy = state.services().await.policy();

    let opened = {
        let path = path.clone();
        tokio::task::spawn_blocking(move || DataServices::open_workspace(&path, policy)).await
    };
    let services = match opened {
        Ok(Ok(services)) => services,
        Ok(Err(e)) => {
            return Err(HandlerErr {
                code: "db_open_failed",
                message: format!("{e:#}"),
                details: None,
            })
        }
        Err(e) => {
            return Err(HandlerErr {
                code: "db_open_failed",
                message: e.to_string(),
                details: None,
            })
        }
    };

    state.swap_services(services, path.clone()).await;
    info!(workspace = %path.display(), "workspace selected");
    Ok(json!({ "workspacePath": path.to_string_lossy(), "backend": "hosted" }))
}

async fn handle_request_cancel(state: &AppState, req: &Request) -> HandlerResult {
    let target = get_required_str(&req.params, "requestId")?;
    let cancelled = state.cancel_request(&target);
    info!(request = %target, cancelled, "cancel requested");
    Ok(json!({ "cancelled": cancelled }))
}

pub async fn try_handle(state: &AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "health" => handle_health(state, req).await,
        "workspace.select" => handle_workspace_select(state, req).await,
        "request.cancel" => handle_request_cancel(state, req).await,
        _ => return None,
    };
    Some(respond(&req.id, result))
}
