use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;
use tokio_util::sync::CancellationToken;

pub async fn handle_request(
    state: &AppState,
    req: Request,
    cancel: CancellationToken,
) -> serde_json::Value {
    if let Some(resp) = handlers::core::try_handle(state, &req).await {
        return resp;
    }
    if let Some(resp) = handlers::dashboard::try_handle(state, &req, &cancel).await {
        return resp;
    }
    if let Some(resp) = handlers::students::try_handle(state, &req, &cancel).await {
        return resp;
    }
    if let Some(resp) = handlers::classes::try_handle(state, &req, &cancel).await {
        return resp;
    }
    if let Some(resp) = handlers::grades::try_handle(state, &req, &cancel).await {
        return resp;
    }
    if let Some(resp) = handlers::attendance::try_handle(state, &req, &cancel).await {
        return resp;
    }
    if let Some(resp) = handlers::assignments::try_handle(state, &req, &cancel).await {
        return resp;
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
