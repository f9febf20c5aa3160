use crate::index::RelationshipIndex;
use crate::ipc::helpers::{get_patch, get_record, get_required_id, respond, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::model::Class;
use crate::service::{create_record, delete_record, update_record, DataServices};
use crate::views;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Stored counts are never served; count the roster instead.
async fn with_member_count(services: &DataServices, mut class: Class) -> Class {
    let students = match services.students.get_all().await {
        Ok(students) => students,
        Err(e) => {
            error!(error = %e, "student load failed while counting class members");
            Vec::new()
        }
    };
    let index = RelationshipIndex::build(&students, &[], &[], &[]);
    class.student_count = index.class_student_count(&class);
    class
}

async fn handle_list(state: &AppState, cancel: &CancellationToken) -> HandlerResult {
    let roster = state.services().await.load_roster(cancel).await?;
    Ok(json!({ "classes": views::class_list(&roster) }))
}

async fn handle_create(state: &AppState, req: &Request) -> HandlerResult {
    let raw = get_record(&req.params)?;
    let services = state.services().await;
    let class: Class = create_record(services.classes.as_ref(), raw).await?;
    Ok(serde_json::to_value(with_member_count(&services, class).await)?)
}

async fn handle_update(state: &AppState, req: &Request) -> HandlerResult {
    let class_id = get_required_id(&req.params, "classId")?;
    let patch = get_patch(&req.params)?;
    let services = state.services().await;
    let class: Class = update_record(services.classes.as_ref(), class_id, &patch).await?;
    Ok(serde_json::to_value(with_member_count(&services, class).await)?)
}

async fn handle_delete(state: &AppState, req: &Request) -> HandlerResult {
    let class_id = get_required_id(&req.params, "classId")?;
    let services = state.services().await;
    delete_record::<Class, _>(services.classes.as_ref(), class_id).await?;
    Ok(json!({ "deleted": true }))
}

pub async fn try_handle(
    state: &AppState,
    req: &Request,
    cancel: &CancellationToken,
) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "classes.list" => handle_list(state, cancel).await,
        "classes.create" => handle_create(state, req).await,
        "classes.update" => handle_update(state, req).await,
        "classes.delete" => handle_delete(state, req).await,
        _ => return None,
    };
    Some(respond(&req.id, result))
}
