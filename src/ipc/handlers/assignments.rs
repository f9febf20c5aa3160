use crate::filter::{AssignmentFilter, AssignmentSortKey};
use crate::ipc::helpers::{
    get_opt_date, get_opt_str, get_patch, get_record, get_required_f64, get_required_id,
    respond, today, HandlerErr, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Assignment;
use crate::service::delete_record;
use crate::views;
use serde_json::json;
use tokio_util::sync::CancellationToken;

async fn handle_list(state: &AppState, req: &Request, cancel: &CancellationToken) -> HandlerResult {
    let filter = AssignmentFilter {
        status: get_opt_str(&req.params, "status"),
        subject: get_opt_str(&req.params, "subject"),
        class_name: get_opt_str(&req.params, "classFilter")
            .or_else(|| get_opt_str(&req.params, "className")),
    };
    let sort = match get_opt_str(&req.params, "sortBy") {
        None => AssignmentSortKey::default(),
        Some(raw) => AssignmentSortKey::parse(&raw)
            .ok_or_else(|| HandlerErr::bad_params(format!("unknown sortBy: {}", raw)))?,
    };
    let today = today(&req.params)?;

    let roster = state.services().await.load_roster(cancel).await?;
    Ok(serde_json::to_value(views::assignments_page(
        &roster, &filter, sort, today,
    ))?)
}

async fn handle_create(state: &AppState, req: &Request) -> HandlerResult {
    let raw = get_record(&req.params)?;
    let assignment = state.services().await.create_assignment(raw).await?;
    Ok(serde_json::to_value(assignment)?)
}

async fn handle_update(state: &AppState, req: &Request) -> HandlerResult {
    let assignment_id = get_required_id(&req.params, "assignmentId")?;
    let patch = get_patch(&req.params)?;
    let assignment = state
        .services()
        .await
        .update_assignment(assignment_id, &patch)
        .await?;
    Ok(serde_json::to_value(assignment)?)
}

async fn handle_delete(state: &AppState, req: &Request) -> HandlerResult {
    let assignment_id = get_required_id(&req.params, "assignmentId")?;
    let services = state.services().await;
    delete_record::<Assignment, _>(services.assignments.as_ref(), assignment_id).await?;
    Ok(json!({ "deleted": true }))
}

async fn handle_submit(state: &AppState, req: &Request) -> HandlerResult {
    let assignment_id = get_required_id(&req.params, "assignmentId")?;
    let on = match get_opt_date(&req.params, "submissionDate")? {
        Some(d) => d,
        None => today(&req.params)?,
    };
    let assignment = state
        .services()
        .await
        .submit_assignment(assignment_id, on)
        .await?;
    Ok(serde_json::to_value(assignment)?)
}

async fn handle_grade(state: &AppState, req: &Request) -> HandlerResult {
    let assignment_id = get_required_id(&req.params, "assignmentId")?;
    let score = get_required_f64(&req.params, "score")?;
    let assignment = state
        .services()
        .await
        .grade_assignment(assignment_id, score)
        .await?;
    Ok(serde_json::to_value(assignment)?)
}

pub async fn try_handle(
    state: &AppState,
    req: &Request,
    cancel: &CancellationToken,
) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "assignments.list" => handle_list(state, req, cancel).await,
        "assignments.create" => handle_create(state, req).await,
        "assignments.update" => handle_update(state, req).await,
        "assignments.delete" => handle_delete(state, req).await,
        "assignments.submit" => handle_submit(state, req).await,
        "assignments.grade" => handle_grade(state, req).await,
        _ => return None,
    };
    Some(respond(&req.id, result))
}
