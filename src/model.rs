use crate::error::{TransitionError, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type RecordId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Mathematics,
    English,
    Science,
    History,
    Geography,
    Physics,
    Chemistry,
    Biology,
}

impl Subject {
    pub const ALL: [Subject; 8] = [
        Subject::Mathematics,
        Subject::English,
        Subject::Science,
        Subject::History,
        Subject::Geography,
        Subject::Physics,
        Subject::Chemistry,
        Subject::Biology,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Mathematics => "Mathematics",
            Subject::English => "English",
            Subject::Science => "Science",
            Subject::History => "History",
            Subject::Geography => "Geography",
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Biology => "Biology",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let t = raw.trim();
        Subject::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(t))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamType {
    Assignment,
    Quiz,
    #[serde(rename = "Mid-term")]
    MidTerm,
    Final,
    Project,
    Presentation,
}

impl ExamType {
    pub const ALL: [ExamType; 6] = [
        ExamType::Assignment,
        ExamType::Quiz,
        ExamType::MidTerm,
        ExamType::Final,
        ExamType::Project,
        ExamType::Presentation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExamType::Assignment => "Assignment",
            ExamType::Quiz => "Quiz",
            ExamType::MidTerm => "Mid-term",
            ExamType::Final => "Final",
            ExamType::Project => "Project",
            ExamType::Presentation => "Presentation",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let t = raw.trim();
        // "Midterm" and "Mid term" both show up in hand-entered rows.
        if t.eq_ignore_ascii_case("midterm") || t.eq_ignore_ascii_case("mid term") {
            return Some(ExamType::MidTerm);
        }
        ExamType::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(t))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            "late" => Some(AttendanceStatus::Late),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Submitted,
    Graded,
}

impl AssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Submitted => "submitted",
            AssignmentStatus::Graded => "graded",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(AssignmentStatus::Pending),
            "submitted" => Some(AssignmentStatus::Submitted),
            "graded" => Some(AssignmentStatus::Graded),
            _ => None,
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: RecordId,
    pub name: String,
    pub student_code: String,
    pub class_id: Option<RecordId>,
    pub class_name: String,
    pub email: String,
    pub phone: String,
    pub photo: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub enrollment_date: Option<NaiveDate>,
    pub guardian_name: String,
    pub guardian_contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: RecordId,
    pub name: String,
    pub academic_year: String,
    /// Filled from the roster on read; whatever the backend stored is ignored.
    pub student_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: RecordId,
    pub student_id: RecordId,
    pub subject: Subject,
    pub exam_type: ExamType,
    pub marks: f64,
    pub total_marks: f64,
    pub percentage: i64,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub student_id: RecordId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: RecordId,
    pub student_id: RecordId,
    pub title: String,
    pub subject: Subject,
    pub due_date: NaiveDate,
    pub submission_date: Option<NaiveDate>,
    pub status: AssignmentStatus,
    pub max_score: f64,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GradingPolicy {
    /// Some older flows graded work that was never submitted.
    pub allow_from_pending: bool,
}

impl Assignment {
    pub fn submit(&mut self, on: NaiveDate) -> Result<(), TransitionError> {
        if self.status != AssignmentStatus::Pending {
            return Err(TransitionError {
                from: self.status,
                action: "submit",
            });
        }
        self.submission_date = Some(on);
        self.status = AssignmentStatus::Submitted;
        Ok(())
    }

    pub fn grade(&mut self, score: f64, policy: GradingPolicy) -> Result<(), TransitionError> {
        let allowed = match self.status {
            AssignmentStatus::Submitted => true,
            AssignmentStatus::Pending => policy.allow_from_pending,
            AssignmentStatus::Graded => false,
        };
        if !allowed {
            return Err(TransitionError {
                from: self.status,
                action: "grade",
            });
        }
        self.score = Some(score);
        self.status = AssignmentStatus::Graded;
        Ok(())
    }
}

/// Persisted record kinds. `KIND` doubles as the backend table name.
pub trait Entity: Clone + Send + Sync + Serialize + 'static {
    const KIND: &'static str;

    fn id(&self) -> RecordId;

    fn assign_id(&mut self, id: RecordId);

    /// Owning student, for records that belong to one.
    fn owner(&self) -> Option<RecordId> {
        None
    }

    /// Calendar day the record is unique on, per owner.
    fn day(&self) -> Option<NaiveDate> {
        None
    }

    fn validate(&self) -> Result<(), ValidationError>;
}

impl Entity for Student {
    const KIND: &'static str = "students";

    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
        if self.student_code.trim().is_empty() {
            self.student_code = format!("ST{:03}", id);
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::missing("name"));
        }
        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(ValidationError::invalid("email", "must contain '@'"));
        }
        Ok(())
    }
}

impl Entity for Class {
    const KIND: &'static str = "classes";

    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::missing("name"));
        }
        Ok(())
    }
}

impl Entity for Grade {
    const KIND: &'static str = "grades";

    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn owner(&self) -> Option<RecordId> {
        Some(self.student_id)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !(self.total_marks > 0.0) {
            return Err(ValidationError::invalid("totalMarks", "must be greater than zero"));
        }
        if !(self.marks >= 0.0) || self.marks > self.total_marks {
            return Err(ValidationError::invalid(
                "marks",
                format!("must be between 0 and {}", self.total_marks),
            ));
        }
        Ok(())
    }
}

impl Entity for AttendanceRecord {
    const KIND: &'static str = "attendance";

    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn owner(&self) -> Option<RecordId> {
        Some(self.student_id)
    }

    fn day(&self) -> Option<NaiveDate> {
        Some(self.date)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Entity for Assignment {
    const KIND: &'static str = "assignments";

    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn owner(&self) -> Option<RecordId> {
        Some(self.student_id)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::missing("title"));
        }
        if !(self.max_score > 0.0) {
            return Err(ValidationError::invalid("maxScore", "must be greater than zero"));
        }
        match (self.status, self.score) {
            (AssignmentStatus::Graded, None) => Err(ValidationError::missing("score")),
            (AssignmentStatus::Graded, Some(s)) if !(s >= 0.0) || s > self.max_score => {
                Err(ValidationError::invalid(
                    "score",
                    format!("must be between 0 and {}", self.max_score),
                ))
            }
            (AssignmentStatus::Pending | AssignmentStatus::Submitted, Some(_)) => Err(
                ValidationError::invalid("score", "only graded assignments carry a score"),
            ),
            _ => Ok(()),
        }
    }
}
