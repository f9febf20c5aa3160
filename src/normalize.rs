//! Raw backend records to canonical records, and back.
//!
//! Two naming conventions reach us: the mock arrays (`name`, `studentId`,
//! `class`, `totalMarks`, ...) and the hosted backend (`Name`,
//! `student_id_c`, `class_c`, `total_marks_c`, ...). Relationship fields show
//! up either as a bare key or as an embedded `{Id, Name}` object. Every field
//! is looked up by its canonical (serialized) name first, then by its
//! aliases, then by its hosted column name.

use crate::error::ValidationError;
use crate::metrics;
use crate::model::{
    Assignment, AssignmentStatus, AttendanceRecord, AttendanceStatus, Class, Entity, ExamType,
    Grade, RecordId, Student, Subject,
};
use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub key: &'static str,
    pub aliases: &'static [&'static str],
    /// Column name in the hosted backend. Empty when the field is not
    /// written generically.
    pub hosted: &'static str,
}

const fn field(
    key: &'static str,
    aliases: &'static [&'static str],
    hosted: &'static str,
) -> Field {
    Field {
        key,
        aliases,
        hosted,
    }
}

pub const STUDENT_FIELDS: &[Field] = &[
    field("id", &["Id"], ""),
    field("name", &["Name"], "Name"),
    field("studentCode", &["studentId"], "student_id_c"),
    field("classId", &[], ""),
    field("className", &[], ""),
    field("email", &[], "email_c"),
    field("phone", &[], "phone_c"),
    field("photo", &[], "photo_c"),
    field("dateOfBirth", &[], "date_of_birth_c"),
    field("enrollmentDate", &[], "enrollment_date_c"),
    field("guardianName", &[], "guardian_name_c"),
    field("guardianContact", &[], "guardian_contact_c"),
];

pub const CLASS_FIELDS: &[Field] = &[
    field("id", &["Id"], ""),
    field("name", &["Name"], "Name"),
    field("academicYear", &[], "academic_year_c"),
    field("studentCount", &[], "student_count_c"),
];

pub const GRADE_FIELDS: &[Field] = &[
    field("id", &["Id"], ""),
    field("studentId", &["student_c"], "student_id_c"),
    field("subject", &[], "subject_c"),
    field("examType", &[], "exam_type_c"),
    field("marks", &[], "marks_c"),
    field("totalMarks", &[], "total_marks_c"),
    field("percentage", &[], "percentage_c"),
    field("date", &[], "date_c"),
];

pub const ATTENDANCE_FIELDS: &[Field] = &[
    field("id", &["Id"], ""),
    field("studentId", &["student_c"], "student_id_c"),
    field("date", &[], "date_c"),
    field("status", &[], "status_c"),
    field("notes", &[], "notes_c"),
];

pub const ASSIGNMENT_FIELDS: &[Field] = &[
    field("id", &["Id"], ""),
    field("studentId", &["student_c"], "student_id_c"),
    field("title", &[], "title_c"),
    field("subject", &[], "subject_c"),
    field("dueDate", &[], "due_date_c"),
    field("submissionDate", &[], "submission_date_c"),
    field("status", &[], "status_c"),
    field("maxScore", &[], "max_score_c"),
    field("score", &[], "score_c"),
];

/// A relationship field reduced to its parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reference {
    pub id: Option<RecordId>,
    pub name: Option<String>,
}

pub trait Normalize: Entity + Sized {
    const FIELDS: &'static [Field];

    fn from_raw(raw: &Value) -> Result<Self, ValidationError>;

    fn to_hosted(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let canonical = serde_json::to_value(self)?;
        Ok(hosted_row(Self::FIELDS, &canonical))
    }

    /// Rename patch keys to canonical names, dropping unknown keys.
    fn canonical_patch(patch: &Map<String, Value>) -> Map<String, Value> {
        rename_keys(Self::FIELDS, patch)
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    let day = t.get(..10).unwrap_or(t);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

pub fn parse_reference(v: &Value, strings_are_ids: bool) -> Reference {
    match v {
        Value::Number(n) => Reference {
            id: number_to_id(n.as_f64()),
            name: None,
        },
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                return Reference::default();
            }
            match t.parse::<RecordId>() {
                Ok(id) if strings_are_ids => Reference {
                    id: Some(id),
                    name: None,
                },
                _ => Reference {
                    id: None,
                    name: Some(t.to_string()),
                },
            }
        }
        Value::Object(obj) => {
            let id = obj
                .get("Id")
                .or_else(|| obj.get("id"))
                .and_then(|v| parse_reference(v, true).id);
            let name = obj
                .get("Name")
                .or_else(|| obj.get("name"))
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            Reference { id, name }
        }
        _ => Reference::default(),
    }
}

fn number_to_id(n: Option<f64>) -> Option<RecordId> {
    let n = n?;
    if n.is_finite() && n.fract() == 0.0 {
        Some(n as RecordId)
    } else {
        None
    }
}

fn field_def(fields: &'static [Field], key: &str) -> Option<&'static Field> {
    fields.iter().find(|f| f.key == key)
}

fn rename_keys(fields: &'static [Field], patch: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (k, v) in patch {
        let known = fields
            .iter()
            .find(|f| f.key == k || f.aliases.contains(&k.as_str()) || f.hosted == k);
        match known {
            Some(f) if f.key == "id" => {}
            Some(f) => {
                out.insert(f.key.to_string(), v.clone());
            }
            None => debug!(key = %k, "ignoring unknown field in patch"),
        }
    }
    out
}

fn hosted_row(fields: &'static [Field], canonical: &Value) -> Map<String, Value> {
    let mut row = Map::new();
    for f in fields.iter().filter(|f| !f.hosted.is_empty()) {
        if let Some(v) = canonical.get(f.key) {
            row.insert(f.hosted.to_string(), v.clone());
        }
    }
    row
}

/// Field lookups over one raw record.
struct Raw<'a> {
    obj: Option<&'a Map<String, Value>>,
    fields: &'static [Field],
}

impl<'a> Raw<'a> {
    fn new(raw: &'a Value, fields: &'static [Field]) -> Self {
        Raw {
            obj: raw.as_object(),
            fields,
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        let obj = self.obj?;
        if let Some(v) = obj.get(key).filter(|v| !v.is_null()) {
            return Some(v);
        }
        let f = field_def(self.fields, key)?;
        f.aliases
            .iter()
            .chain(std::iter::once(&f.hosted))
            .filter(|name| !name.is_empty())
            .filter_map(|name| obj.get(*name))
            .find(|v| !v.is_null())
    }

    fn text(&self, key: &str) -> String {
        self.opt_text(key).unwrap_or_default()
    }

    fn opt_text(&self, key: &str) -> Option<String> {
        let s = match self.get(key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            v @ Value::Object(_) => parse_reference(v, false).name?,
            _ => return None,
        };
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    fn number(&self, key: &str) -> Option<f64> {
        let n = match self.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        n.filter(|n| n.is_finite())
    }

    fn reference(&self, key: &str, strings_are_ids: bool) -> Reference {
        self.get(key)
            .map(|v| parse_reference(v, strings_are_ids))
            .unwrap_or_default()
    }

    fn id(&self) -> RecordId {
        self.reference("id", true).id.unwrap_or(0)
    }

    fn date(&self, key: &'static str) -> Result<Option<NaiveDate>, ValidationError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => parse_date(s)
                .map(Some)
                .ok_or_else(|| ValidationError::invalid(key, format!("'{}' is not a yyyy-MM-dd date", s))),
            Some(_) => Err(ValidationError::invalid(key, "expected a date string")),
        }
    }

    fn owner(&self) -> Result<RecordId, ValidationError> {
        self.reference("studentId", true)
            .id
            .ok_or_else(|| ValidationError::missing("studentId"))
    }

    fn subject(&self) -> Result<Subject, ValidationError> {
        let raw = self
            .opt_text("subject")
            .ok_or_else(|| ValidationError::missing("subject"))?;
        Subject::parse(&raw)
            .ok_or_else(|| ValidationError::invalid("subject", format!("unknown subject '{}'", raw)))
    }
}

impl Normalize for Student {
    const FIELDS: &'static [Field] = STUDENT_FIELDS;

    fn from_raw(raw: &Value) -> Result<Self, ValidationError> {
        let r = Raw::new(raw, Self::FIELDS);
        let mut class_id = r.reference("classId", true).id;
        let mut class_name = r.opt_text("className");
        if let Some(v) = raw
            .get("class_c")
            .or_else(|| raw.get("class"))
            .filter(|v| !v.is_null())
        {
            let reference = parse_reference(v, false);
            class_id = class_id.or(reference.id);
            class_name = class_name.or(reference.name);
        }

        Ok(Student {
            id: r.id(),
            name: r.text("name"),
            student_code: r.text("studentCode"),
            class_id,
            class_name: class_name.unwrap_or_default(),
            email: r.text("email"),
            phone: r.text("phone"),
            photo: r.opt_text("photo"),
            date_of_birth: r.date("dateOfBirth")?,
            enrollment_date: r.date("enrollmentDate")?,
            guardian_name: r.text("guardianName"),
            guardian_contact: r.text("guardianContact"),
        })
    }

    fn to_hosted(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let canonical = serde_json::to_value(self)?;
        let mut row = hosted_row(Self::FIELDS, &canonical);
        let class = match self.class_id {
            Some(id) => json!({ "Id": id, "Name": self.class_name }),
            None if !self.class_name.is_empty() => Value::String(self.class_name.clone()),
            None => Value::Null,
        };
        row.insert("class_c".to_string(), class);
        Ok(row)
    }

    fn canonical_patch(patch: &Map<String, Value>) -> Map<String, Value> {
        let mut out = rename_keys(Self::FIELDS, patch);
        if let Some(v) = patch.get("class_c").or_else(|| patch.get("class")) {
            let reference = parse_reference(v, false);
            out.insert("classId".to_string(), json!(reference.id));
            out.insert(
                "className".to_string(),
                Value::String(reference.name.unwrap_or_default()),
            );
        }
        // A renamed class no longer matches the old id.
        if out.contains_key("className") && !out.contains_key("classId") {
            out.insert("classId".to_string(), Value::Null);
        }
        out
    }
}

impl Normalize for Class {
    const FIELDS: &'static [Field] = CLASS_FIELDS;

    fn from_raw(raw: &Value) -> Result<Self, ValidationError> {
        let r = Raw::new(raw, Self::FIELDS);
        Ok(Class {
            id: r.id(),
            name: r.text("name"),
            academic_year: r.text("academicYear"),
            student_count: r.number("studentCount").unwrap_or(0.0).max(0.0) as usize,
        })
    }
}

impl Normalize for Grade {
    const FIELDS: &'static [Field] = GRADE_FIELDS;

    fn from_raw(raw: &Value) -> Result<Self, ValidationError> {
        let r = Raw::new(raw, Self::FIELDS);
        let exam_type = match r.opt_text("examType") {
            None => ExamType::Assignment,
            Some(t) => ExamType::parse(&t).ok_or_else(|| {
                ValidationError::invalid("examType", format!("unknown exam type '{}'", t))
            })?,
        };
        let marks = r.number("marks").unwrap_or(0.0);
        let total_marks = r.number("totalMarks").unwrap_or(100.0);

        Ok(Grade {
            id: r.id(),
            student_id: r.owner()?,
            subject: r.subject()?,
            exam_type,
            marks,
            total_marks,
            // Stored percentages are never trusted.
            percentage: metrics::percentage(marks, total_marks),
            date: r.date("date")?,
        })
    }
}

impl Normalize for AttendanceRecord {
    const FIELDS: &'static [Field] = ATTENDANCE_FIELDS;

    fn from_raw(raw: &Value) -> Result<Self, ValidationError> {
        let r = Raw::new(raw, Self::FIELDS);
        let status = match r.opt_text("status") {
            None => AttendanceStatus::Present,
            Some(s) => AttendanceStatus::parse(&s).ok_or_else(|| {
                ValidationError::invalid("status", format!("unknown attendance status '{}'", s))
            })?,
        };
        Ok(AttendanceRecord {
            id: r.id(),
            student_id: r.owner()?,
            date: r.date("date")?.ok_or_else(|| ValidationError::missing("date"))?,
            status,
            notes: r.text("notes"),
        })
    }
}

impl Normalize for Assignment {
    const FIELDS: &'static [Field] = ASSIGNMENT_FIELDS;

    fn from_raw(raw: &Value) -> Result<Self, ValidationError> {
        let r = Raw::new(raw, Self::FIELDS);
        let status = match r.opt_text("status") {
            None => AssignmentStatus::Pending,
            Some(s) => AssignmentStatus::parse(&s).ok_or_else(|| {
                ValidationError::invalid("status", format!("unknown assignment status '{}'", s))
            })?,
        };
        let score = match status {
            AssignmentStatus::Graded => r.number("score"),
            _ => None,
        };
        Ok(Assignment {
            id: r.id(),
            student_id: r.owner()?,
            title: r.text("title"),
            subject: r.subject()?,
            due_date: r
                .date("dueDate")?
                .ok_or_else(|| ValidationError::missing("dueDate"))?,
            submission_date: r.date("submissionDate")?,
            status,
            max_score: r.number("maxScore").unwrap_or(100.0),
            score,
        })
    }
}

/// Normalize a batch of stored rows. Rows that cannot be represented are
/// logged and skipped so one bad row never hides the rest.
pub fn collect<T: Normalize>(rows: impl IntoIterator<Item = Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match T::from_raw(&row) {
            Ok(record) if record.id() > 0 => Some(record),
            Ok(_) => {
                warn!(kind = T::KIND, "skipping record without an id");
                None
            }
            Err(e) => {
                warn!(kind = T::KIND, error = %e, "skipping malformed record");
                None
            }
        })
        .collect()
}

/// `{...existing, ...patch}` over canonical names, then re-normalized so
/// derived fields (percentage, class id) stay consistent.
pub fn apply_patch<T: Normalize>(
    existing: &T,
    patch: &Map<String, Value>,
) -> Result<T, ValidationError> {
    let mut merged = match serde_json::to_value(existing) {
        Ok(Value::Object(m)) => m,
        _ => Map::new(),
    };
    for (k, v) in T::canonical_patch(patch) {
        merged.insert(k, v);
    }
    let mut record = T::from_raw(&Value::Object(merged))?;
    record.assign_id(existing.id());
    Ok(record)
}
