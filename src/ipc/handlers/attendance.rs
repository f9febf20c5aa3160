use crate::error::{ServiceError, ValidationError};
use crate::ipc::helpers::{
    get_opt_date, get_opt_id, get_opt_str, get_patch, get_required_date, get_required_id,
    get_required_str, respond, today, HandlerErr, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{AttendanceRecord, AttendanceStatus};
use crate::service::delete_record;
use crate::views::{self, MonthKey};
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn month_param(req: &Request) -> Result<MonthKey, HandlerErr> {
    match get_opt_str(&req.params, "month") {
        None => Ok(MonthKey::of(today(&req.params)?)),
        Some(raw) => MonthKey::parse(&raw)
            .ok_or_else(|| HandlerErr::bad_params("params.month must be yyyy-MM")),
    }
}

async fn handle_mark(state: &AppState, req: &Request) -> HandlerResult {
    let student_id = get_required_id(&req.params, "studentId")?;
    let date = get_required_date(&req.params, "date")?;
    let raw_status = get_required_str(&req.params, "status")?;
    let status = AttendanceStatus::parse(&raw_status).ok_or_else(|| {
        HandlerErr::from(ServiceError::from(ValidationError::invalid(
            "status",
            format!("unknown attendance status '{}'", raw_status),
        )))
    })?;
    let notes = get_opt_str(&req.params, "notes");

    let record = state
        .services()
        .await
        .mark_attendance(student_id, date, status, notes)
        .await?;
    Ok(serde_json::to_value(record)?)
}

async fn handle_mark_all_present(
    state: &AppState,
    req: &Request,
    cancel: &CancellationToken,
) -> HandlerResult {
    let date = match get_opt_date(&req.params, "date")? {
        Some(d) => d,
        None => today(&req.params)?,
    };
    let class_filter = get_opt_str(&req.params, "classFilter");
    let records = state
        .services()
        .await
        .mark_all_present(date, class_filter.as_deref(), cancel)
        .await?;
    Ok(json!({ "marked": records.len(), "records": records }))
}

async fn handle_daily(state: &AppState, req: &Request, cancel: &CancellationToken) -> HandlerResult {
    let date = match get_opt_date(&req.params, "date")? {
        Some(d) => d,
        None => today(&req.params)?,
    };
    let class_filter = get_opt_str(&req.params, "classFilter");
    let roster = state.services().await.load_roster(cancel).await?;
    Ok(serde_json::to_value(views::attendance_daily(
        &roster,
        date,
        class_filter.as_deref(),
    ))?)
}

async fn handle_monthly(
    state: &AppState,
    req: &Request,
    cancel: &CancellationToken,
) -> HandlerResult {
    let month = month_param(req)?;
    let class_filter = get_opt_str(&req.params, "classFilter");
    let roster = state.services().await.load_roster(cancel).await?;
    Ok(serde_json::to_value(views::attendance_monthly(
        &roster,
        month,
        class_filter.as_deref(),
    ))?)
}

async fn handle_calendar(
    state: &AppState,
    req: &Request,
    cancel: &CancellationToken,
) -> HandlerResult {
    let month = month_param(req)?;
    let student_id = get_opt_id(&req.params, "studentId")?;
    let roster = state.services().await.load_roster(cancel).await?;
    Ok(serde_json::to_value(views::attendance_calendar(
        &roster, month, student_id,
    ))?)
}

async fn handle_update(state: &AppState, req: &Request) -> HandlerResult {
    let attendance_id = get_required_id(&req.params, "attendanceId")?;
    let patch = get_patch(&req.params)?;
    let record = state
        .services()
        .await
        .update_attendance(attendance_id, &patch)
        .await?;
    Ok(serde_json::to_value(record)?)
}

async fn handle_delete(state: &AppState, req: &Request) -> HandlerResult {
    let attendance_id = get_required_id(&req.params, "attendanceId")?;
    let services = state.services().await;
    delete_record::<AttendanceRecord, _>(services.attendance.as_ref(), attendance_id).await?;
    Ok(json!({ "deleted": true }))
}

pub async fn try_handle(
    state: &AppState,
    req: &Request,
    cancel: &CancellationToken,
) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.mark" => handle_mark(state, req).await,
        "attendance.markAllPresent" => handle_mark_all_present(state, req, cancel).await,
        "attendance.daily" => handle_daily(state, req, cancel).await,
        "attendance.monthly" => handle_monthly(state, req, cancel).await,
        "attendance.calendar" => handle_calendar(state, req, cancel).await,
        "attendance.update" => handle_update(state, req).await,
        "attendance.delete" => handle_delete(state, req).await,
        _ => return None,
    };
    Some(respond(&req.id, result))
}
