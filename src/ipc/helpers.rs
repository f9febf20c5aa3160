use crate::ipc::error::ok;
use crate::model::RecordId;
use crate::normalize::parse_date;
use chrono::NaiveDate;
use serde_json::{Map, Value};

pub use crate::ipc::error::HandlerErr;

pub type HandlerResult = Result<Value, HandlerErr>;

pub fn respond(id: &str, result: HandlerResult) -> Value {
    match result {
        Ok(v) => ok(id, v),
        Err(e) => e.response(id),
    }
}

pub fn get_required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing params.{}", key)))
}

/// Filters treat empty strings as absent.
pub fn get_opt_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Ids arrive as numbers or numeric strings.
pub fn get_required_id(params: &Value, key: &str) -> Result<RecordId, HandlerErr> {
    get_opt_id(params, key)?.ok_or_else(|| HandlerErr::bad_params(format!("missing params.{}", key)))
}

pub fn get_opt_id(params: &Value, key: &str) -> Result<Option<RecordId>, HandlerErr> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| HandlerErr::bad_params(format!("params.{} must be an integer", key))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<RecordId>()
            .map(Some)
            .map_err(|_| HandlerErr::bad_params(format!("params.{} must be an integer", key))),
        Some(_) => Err(HandlerErr::bad_params(format!(
            "params.{} must be an integer",
            key
        ))),
    }
}

pub fn get_required_f64(params: &Value, key: &str) -> Result<f64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing params.{}", key)))
}

pub fn get_opt_date(params: &Value, key: &str) -> Result<Option<NaiveDate>, HandlerErr> {
    match get_opt_str(params, key) {
        None => Ok(None),
        Some(s) => parse_date(&s).map(Some).ok_or_else(|| {
            HandlerErr::bad_params(format!("params.{} must be a yyyy-MM-dd date", key))
        }),
    }
}

pub fn get_required_date(params: &Value, key: &str) -> Result<NaiveDate, HandlerErr> {
    get_opt_date(params, key)?
        .ok_or_else(|| HandlerErr::bad_params(format!("missing params.{}", key)))
}

/// Reference clock for derived labels. Callers may pin it with
/// `params.today`; otherwise it is the local date.
pub fn today(params: &Value) -> Result<NaiveDate, HandlerErr> {
    Ok(get_opt_date(params, "today")?.unwrap_or_else(|| chrono::Local::now().date_naive()))
}

pub fn get_patch(params: &Value) -> Result<Map<String, Value>, HandlerErr> {
    params
        .get("patch")
        .and_then(|v| v.as_object())
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params("missing params.patch"))
}

/// New records come in `params.record`, in either field naming.
pub fn get_record(params: &Value) -> Result<&Value, HandlerErr> {
    params
        .get("record")
        .filter(|v| v.is_object())
        .ok_or_else(|| HandlerErr::bad_params("missing params.record"))
}
