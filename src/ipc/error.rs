use crate::error::ServiceError;
use crate::model::RecordId;
use serde_json::{json, Value};

pub fn ok(id: &str, result: Value) -> Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

fn error_body(code: &str, message: String, details: Option<Value>) -> Value {
    let mut error = json!({
        "code": code,
        "message": message,
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    error
}

pub fn err(id: &str, code: &str, message: impl Into<String>, details: Option<Value>) -> Value {
    json!({
        "id": id,
        "ok": false,
        "error": error_body(code, message.into(), details),
    })
}

/// Reply to a line that did not parse; there is no id to echo.
pub fn bad_json(message: impl Into<String>) -> Value {
    json!({
        "ok": false,
        "error": error_body("bad_json", message.into(), None),
    })
}

/// A failed handler, before it is wrapped in an envelope.
pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        HandlerErr {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(kind: &str, id: RecordId) -> Self {
        HandlerErr {
            code: "not_found",
            message: format!("{} {} not found", kind, id),
            details: Some(json!({ "kind": kind, "id": id })),
        }
    }

    pub fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<ServiceError> for HandlerErr {
    fn from(e: ServiceError) -> Self {
        HandlerErr {
            code: e.code(),
            message: e.to_string(),
            details: e.details(),
        }
    }
}

impl From<serde_json::Error> for HandlerErr {
    fn from(e: serde_json::Error) -> Self {
        HandlerErr {
            code: "internal",
            message: format!("failed to encode result: {}", e),
            details: None,
        }
    }
}

