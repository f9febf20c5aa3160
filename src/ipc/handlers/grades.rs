use crate::ipc::helpers::{
    get_opt_str, get_patch, get_record, get_required_id, respond, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Grade;
use crate::service::{create_record, delete_record, update_record};
use crate::views;
use serde_json::json;
use tokio_util::sync::CancellationToken;

async fn handle_list(state: &AppState, req: &Request, cancel: &CancellationToken) -> HandlerResult {
    let subject = get_opt_str(&req.params, "subject");
    let class_filter = get_opt_str(&req.params, "classFilter");
    let roster = state.services().await.load_roster(cancel).await?;
    let view = views::grades_page(&roster, subject.as_deref(), class_filter.as_deref());
    Ok(serde_json::to_value(view)?)
}

async fn handle_create(state: &AppState, req: &Request) -> HandlerResult {
    let raw = get_record(&req.params)?;
    let services = state.services().await;
    let grade: Grade = create_record(services.grades.as_ref(), raw).await?;
    Ok(serde_json::to_value(grade)?)
}

async fn handle_update(state: &AppState, req: &Request) -> HandlerResult {
    let grade_id = get_required_id(&req.params, "gradeId")?;
    let patch = get_patch(&req.params)?;
    let services = state.services().await;
    let grade: Grade = update_record(services.grades.as_ref(), grade_id, &patch).await?;
    Ok(serde_json::to_value(grade)?)
}

async fn handle_delete(state: &AppState, req: &Request) -> HandlerResult {
    let grade_id = get_required_id(&req.params, "gradeId")?;
    let services = state.services().await;
    delete_record::<Grade, _>(services.grades.as_ref(), grade_id).await?;
    Ok(json!({ "deleted": true }))
}

pub async fn try_handle(
    state: &AppState,
    req: &Request,
    cancel: &CancellationToken,
) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "grades.list" => handle_list(state, req, cancel).await,
        "grades.create" => handle_create(state, req).await,
        "grades.update" => handle_update(state, req).await,
        "grades.delete" => handle_delete(state, req).await,
        _ => return None,
    };
    Some(respond(&req.id, result))
}
