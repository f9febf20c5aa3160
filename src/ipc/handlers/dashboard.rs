use crate::ipc::helpers::{respond, HandlerErr, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::views;
use tokio_util::sync::CancellationToken;

async fn handle_get(state: &AppState, req: &Request, cancel: &CancellationToken) -> HandlerResult {
    let top_n = match req.params.get("topN").and_then(|v| v.as_u64()) {
        Some(0) => return Err(HandlerErr::bad_params("params.topN must be at least 1")),
        Some(n) => n as usize,
        None => state.config.views.top_performers,
    };
    let roster = state.services().await.load_roster(cancel).await?;
    Ok(serde_json::to_value(views::dashboard(&roster, top_n))?)
}

pub async fn try_handle(
    state: &AppState,
    req: &Request,
    cancel: &CancellationToken,
) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "dashboard.get" => handle_get(state, req, cancel).await,
        _ => return None,
    };
    Some(respond(&req.id, result))
}
