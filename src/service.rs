//! The repositories a request works against, bundled once at startup and
//! handed to every handler.

use crate::config::{AppConfig, BackendKind};
use crate::error::{ServiceError, ValidationError};
use crate::filter::StudentFilter;
use crate::index::Roster;
use crate::model::{
    Assignment, AssignmentStatus, AttendanceRecord, AttendanceStatus, Class, Entity, Grade,
    GradingPolicy, RecordId, Student,
};
use crate::normalize::{self, Normalize};
use crate::repo::{
    AttendanceRepository, HostedBackend, MemoryRepository, Repository,
};
use crate::seed::Seed;
use anyhow::Context;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub struct DataServices {
    pub students: Arc<dyn Repository<Student>>,
    pub classes: Arc<dyn Repository<Class>>,
    pub grades: Arc<dyn Repository<Grade>>,
    pub attendance: Arc<dyn AttendanceRepository>,
    pub assignments: Arc<dyn Repository<Assignment>>,
    backend: BackendKind,
    policy: GradingPolicy,
}

/// Reads degrade to an empty collection; the failure is logged, never
/// surfaced as a partial error.
async fn fetch_all<T, R>(repo: &R) -> Vec<T>
where
    T: Entity,
    R: Repository<T> + ?Sized,
{
    match repo.get_all().await {
        Ok(rows) => rows,
        Err(e) => {
            error!(kind = T::KIND, error = %e, "load failed, showing an empty collection");
            Vec::new()
        }
    }
}

async fn fetch_owned<T, R>(repo: &R, student_id: RecordId) -> Vec<T>
where
    T: Entity,
    R: Repository<T> + ?Sized,
{
    match repo.get_by_student(student_id).await {
        Ok(rows) => rows,
        Err(e) => {
            error!(kind = T::KIND, student_id, error = %e, "load failed, showing an empty collection");
            Vec::new()
        }
    }
}

pub async fn create_record<T, R>(repo: &R, raw: &Value) -> Result<T, ServiceError>
where
    T: Normalize,
    R: Repository<T> + ?Sized,
{
    let record = T::from_raw(raw)?;
    record.validate()?;
    let created = repo.create(record).await?;
    debug!(kind = T::KIND, id = created.id(), "record created");
    Ok(created)
}

pub async fn update_record<T, R>(
    repo: &R,
    id: RecordId,
    patch: &Map<String, Value>,
) -> Result<T, ServiceError>
where
    T: Normalize,
    R: Repository<T> + ?Sized,
{
    let existing = repo
        .get_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound { kind: T::KIND, id })?;
    let record = normalize::apply_patch(&existing, patch)?;
    record.validate()?;
    store(repo, record).await
}

pub async fn delete_record<T, R>(repo: &R, id: RecordId) -> Result<(), ServiceError>
where
    T: Entity,
    R: Repository<T> + ?Sized,
{
    if repo.delete(id).await? {
        debug!(kind = T::KIND, id, "record deleted");
        Ok(())
    } else {
        Err(ServiceError::NotFound { kind: T::KIND, id })
    }
}

async fn store<T, R>(repo: &R, record: T) -> Result<T, ServiceError>
where
    T: Entity,
    R: Repository<T> + ?Sized,
{
    let id = record.id();
    repo.update(id, record)
        .await?
        .ok_or(ServiceError::NotFound { kind: T::KIND, id })
}

impl DataServices {
    pub fn new(
        students: Arc<dyn Repository<Student>>,
        classes: Arc<dyn Repository<Class>>,
        grades: Arc<dyn Repository<Grade>>,
        attendance: Arc<dyn AttendanceRepository>,
        assignments: Arc<dyn Repository<Assignment>>,
        backend: BackendKind,
        policy: GradingPolicy,
    ) -> Self {
        DataServices {
            students,
            classes,
            grades,
            attendance,
            assignments,
            backend,
            policy,
        }
    }

    pub fn in_memory(seed: Option<&Seed>, policy: GradingPolicy) -> Self {
        let seed = seed.cloned().unwrap_or_default();
        Self::new(
            Arc::new(MemoryRepository::<Student>::from_raw(seed.students)),
            Arc::new(MemoryRepository::<Class>::from_raw(seed.classes)),
            Arc::new(MemoryRepository::<Grade>::from_raw(seed.grades)),
            Arc::new(MemoryRepository::<AttendanceRecord>::from_raw(seed.attendance)),
            Arc::new(MemoryRepository::<Assignment>::from_raw(seed.assignments)),
            BackendKind::Memory,
            policy,
        )
    }

    pub fn hosted(backend: &HostedBackend, policy: GradingPolicy) -> Self {
        Self::new(
            Arc::new(backend.repository::<Student>()),
            Arc::new(backend.repository::<Class>()),
            Arc::new(backend.repository::<Grade>()),
            Arc::new(backend.repository::<AttendanceRecord>()),
            Arc::new(backend.repository::<Assignment>()),
            BackendKind::Hosted,
            policy,
        )
    }

    pub fn open_workspace(workspace: &Path, policy: GradingPolicy) -> anyhow::Result<Self> {
        let backend = HostedBackend::open(workspace)
            .with_context(|| format!("failed to open workspace {}", workspace.display()))?;
        info!(workspace = %backend.workspace().display(), "hosted backend ready");
        Ok(Self::hosted(&backend, policy))
    }

    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let policy = GradingPolicy {
            allow_from_pending: cfg.grading.allow_from_pending,
        };
        match cfg.backend.kind {
            BackendKind::Memory => {
                let seed = if cfg.backend.seed {
                    Some(Seed::bundled()?)
                } else {
                    None
                };
                Ok(Self::in_memory(seed.as_ref(), policy))
            }
            BackendKind::Hosted => {
                let path = cfg
                    .backend
                    .path
                    .as_deref()
                    .context("backend.path is required for the hosted backend")?;
                Self::open_workspace(path, policy)
            }
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend
    }

    pub fn policy(&self) -> GradingPolicy {
        self.policy
    }

    /// All five collections, fetched concurrently. A cancelled token wins
    /// over a load still in flight and nothing partial is returned.
    pub async fn load_roster(&self, cancel: &CancellationToken) -> Result<Roster, ServiceError> {
        let load = async {
            let (students, classes, grades, attendance, assignments) = futures::join!(
                fetch_all(self.students.as_ref()),
                fetch_all(self.classes.as_ref()),
                fetch_all(self.grades.as_ref()),
                fetch_all(self.attendance.as_ref()),
                fetch_all(self.assignments.as_ref()),
            );
            Roster {
                students,
                classes,
                grades,
                attendance,
                assignments,
            }
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ServiceError::Cancelled),
            roster = load => Ok(roster),
        }
    }

    /// One student and the records they own.
    pub async fn load_student(
        &self,
        student_id: RecordId,
        cancel: &CancellationToken,
    ) -> Result<Roster, ServiceError> {
        let load = async {
            let (student, grades, attendance, assignments) = futures::join!(
                self.students.get_by_id(student_id),
                fetch_owned(self.grades.as_ref(), student_id),
                fetch_owned(self.attendance.as_ref(), student_id),
                fetch_owned(self.assignments.as_ref(), student_id),
            );
            let student = student.unwrap_or_else(|e| {
                error!(student_id, error = %e, "student lookup failed");
                None
            });
            Roster {
                students: student.into_iter().collect(),
                classes: Vec::new(),
                grades,
                attendance,
                assignments,
            }
        };
        let roster = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ServiceError::Cancelled),
            roster = load => roster,
        };
        if roster.students.is_empty() {
            return Err(ServiceError::NotFound {
                kind: Student::KIND,
                id: student_id,
            });
        }
        Ok(roster)
    }

    pub async fn mark_attendance(
        &self,
        student_id: RecordId,
        date: NaiveDate,
        status: AttendanceStatus,
        notes: Option<String>,
    ) -> Result<AttendanceRecord, ServiceError> {
        if self.students.get_by_id(student_id).await?.is_none() {
            return Err(ServiceError::NotFound {
                kind: Student::KIND,
                id: student_id,
            });
        }
        let record = self
            .attendance
            .upsert_for_day(AttendanceRecord {
                id: 0,
                student_id,
                date,
                status,
                notes: notes.unwrap_or_default(),
            })
            .await?;
        debug!(student_id, %date, status = status.as_str(), id = record.id, "attendance marked");
        Ok(record)
    }

    /// Marks every student of the class who has no record for the day yet.
    /// Students already marked keep their status.
    pub async fn mark_all_present(
        &self,
        date: NaiveDate,
        class_filter: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<AttendanceRecord>, ServiceError> {
        let students = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ServiceError::Cancelled),
            loaded = fetch_all(self.students.as_ref()) => loaded,
        };

        let filter = StudentFilter {
            search_term: None,
            class_filter: class_filter.map(String::from),
        };
        let mut marked = Vec::new();
        for s in students.iter().filter(|s| filter.matches(s)) {
            // A mark that lands after the student load still wins.
            let inserted = self
                .attendance
                .insert_if_absent(AttendanceRecord {
                    id: 0,
                    student_id: s.id,
                    date,
                    status: AttendanceStatus::Present,
                    notes: String::new(),
                })
                .await?;
            marked.extend(inserted);
        }
        info!(%date, count = marked.len(), "marked unmarked students present");
        Ok(marked)
    }

    /// A record may not be moved onto a day its student already has.
    pub async fn update_attendance(
        &self,
        id: RecordId,
        patch: &Map<String, Value>,
    ) -> Result<AttendanceRecord, ServiceError> {
        let existing = self
            .attendance
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound {
                kind: AttendanceRecord::KIND,
                id,
            })?;
        let record = normalize::apply_patch(&existing, patch)?;
        record.validate()?;
        let clash = self
            .attendance
            .get_by_student(record.student_id)
            .await?
            .into_iter()
            .any(|r| r.id != id && r.date == record.date);
        if clash {
            return Err(ValidationError::invalid(
                "date",
                format!("student {} already has a record for {}", record.student_id, record.date),
            )
            .into());
        }
        store(self.attendance.as_ref(), record).await
    }

    /// Plain field edits. Status, score and submission date only move
    /// through `submit_assignment` / `grade_assignment`.
    pub async fn update_assignment(
        &self,
        id: RecordId,
        patch: &Map<String, Value>,
    ) -> Result<Assignment, ServiceError> {
        let existing = self
            .assignments
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound {
                kind: Assignment::KIND,
                id,
            })?;
        let record = normalize::apply_patch(&existing, patch)?;
        if record.status != existing.status {
            return Err(ValidationError::invalid(
                "status",
                "status changes go through submit or grade",
            )
            .into());
        }
        if record.score != existing.score {
            return Err(ValidationError::invalid("score", "scores are set by grading").into());
        }
        if record.submission_date != existing.submission_date {
            return Err(ValidationError::invalid(
                "submissionDate",
                "submission dates are set by submit",
            )
            .into());
        }
        record.validate()?;
        store(self.assignments.as_ref(), record).await
    }

    /// New work always starts out pending, unsubmitted and unscored.
    pub async fn create_assignment(&self, raw: &Value) -> Result<Assignment, ServiceError> {
        let record = Assignment::from_raw(raw)?;
        if record.status != AssignmentStatus::Pending {
            return Err(ValidationError::invalid(
                "status",
                "new assignments start as pending",
            )
            .into());
        }
        if record.submission_date.is_some() {
            return Err(ValidationError::invalid(
                "submissionDate",
                "submission dates are set by submit",
            )
            .into());
        }
        let scored = ["score", "score_c"]
            .iter()
            .any(|k| raw.get(*k).is_some_and(|v| !v.is_null()));
        if scored {
            return Err(ValidationError::invalid("score", "scores are set by grading").into());
        }
        record.validate()?;
        let created = self.assignments.create(record).await?;
        debug!(id = created.id, "assignment created");
        Ok(created)
    }

    pub async fn submit_assignment(
        &self,
        id: RecordId,
        on: NaiveDate,
    ) -> Result<Assignment, ServiceError> {
        let mut assignment = self.find_assignment(id).await?;
        assignment.submit(on)?;
        let stored = store(self.assignments.as_ref(), assignment).await?;
        info!(id, %on, "assignment submitted");
        Ok(stored)
    }

    pub async fn grade_assignment(&self, id: RecordId, score: f64) -> Result<Assignment, ServiceError> {
        let mut assignment = self.find_assignment(id).await?;
        if !score.is_finite() || score < 0.0 || score > assignment.max_score {
            return Err(ValidationError::invalid(
                "score",
                format!("must be between 0 and {}", assignment.max_score),
            )
            .into());
        }
        assignment.grade(score, self.policy)?;
        assignment.validate()?;
        let stored = store(self.assignments.as_ref(), assignment).await?;
        info!(id, score, "assignment graded");
        Ok(stored)
    }

    async fn find_assignment(&self, id: RecordId) -> Result<Assignment, ServiceError> {
        self.assignments
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound {
                kind: Assignment::KIND,
                id,
            })
    }
}
