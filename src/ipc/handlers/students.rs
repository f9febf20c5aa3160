use crate::filter::{SortKey, StudentFilter};
use crate::ipc::helpers::{
    get_opt_str, get_patch, get_record, get_required_id, respond, today, HandlerErr,
    HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Entity, Student};
use crate::service::{create_record, delete_record, update_record};
use crate::views;
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn sort_key(req: &Request) -> Result<SortKey, HandlerErr> {
    match get_opt_str(&req.params, "sortBy") {
        None => Ok(SortKey::default()),
        Some(raw) => SortKey::parse(&raw)
            .ok_or_else(|| HandlerErr::bad_params(format!("unknown sortBy: {}", raw))),
    }
}

async fn handle_list(state: &AppState, req: &Request, cancel: &CancellationToken) -> HandlerResult {
    let filter = StudentFilter {
        search_term: get_opt_str(&req.params, "searchTerm"),
        class_filter: get_opt_str(&req.params, "classFilter"),
    };
    let sort = sort_key(req)?;
    let today = today(&req.params)?;

    let roster = state.services().await.load_roster(cancel).await?;
    Ok(serde_json::to_value(views::student_list(
        &roster, &filter, sort, today,
    ))?)
}

async fn handle_get(state: &AppState, req: &Request, cancel: &CancellationToken) -> HandlerResult {
    let student_id = get_required_id(&req.params, "studentId")?;
    let today = today(&req.params)?;
    let roster = state
        .services()
        .await
        .load_student(student_id, cancel)
        .await?;
    let view = views::student_detail(&roster, student_id, today)
        .ok_or_else(|| HandlerErr::not_found(Student::KIND, student_id))?;
    Ok(serde_json::to_value(view)?)
}

async fn handle_create(state: &AppState, req: &Request) -> HandlerResult {
    let raw = get_record(&req.params)?;
    let services = state.services().await;
    let student: Student = create_record(services.students.as_ref(), raw).await?;
    Ok(serde_json::to_value(student)?)
}

async fn handle_update(state: &AppState, req: &Request) -> HandlerResult {
    let student_id = get_required_id(&req.params, "studentId")?;
    let patch = get_patch(&req.params)?;
    let services = state.services().await;
    let student: Student = update_record(services.students.as_ref(), student_id, &patch).await?;
    Ok(serde_json::to_value(student)?)
}

async fn handle_delete(state: &AppState, req: &Request) -> HandlerResult {
    let student_id = get_required_id(&req.params, "studentId")?;
    let services = state.services().await;
    // Grades, attendance and assignments of the student are left in place.
    delete_record::<Student, _>(services.students.as_ref(), student_id).await?;
    Ok(json!({ "deleted": true }))
}

pub async fn try_handle(
    state: &AppState,
    req: &Request,
    cancel: &CancellationToken,
) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => handle_list(state, req, cancel).await,
        "students.get" => handle_get(state, req, cancel).await,
        "students.create" => handle_create(state, req).await,
        "students.update" => handle_update(state, req).await,
        "students.delete" => handle_delete(state, req).await,
        _ => return None,
    };
    Some(respond(&req.id, result))
}
