use crate::index::RelationshipIndex;
use crate::model::{
    Assignment, AssignmentStatus, AttendanceRecord, AttendanceStatus, Grade, RecordId, Student,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Half-up rounding to a whole number: `Int(x + 0.5)`.
/// Every derived percentage goes through here so call sites cannot drift
/// between truncation and rounding.
pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

pub fn percentage(marks: f64, total_marks: f64) -> i64 {
    if total_marks > 0.0 {
        round_half_up(100.0 * marks / total_marks)
    } else {
        0
    }
}

pub fn average_grade(grades: &[Grade]) -> i64 {
    if grades.is_empty() {
        return 0;
    }
    let sum: i64 = grades.iter().map(|g| g.percentage).sum();
    round_half_up(sum as f64 / grades.len() as f64)
}

pub fn attendance_rate(records: &[AttendanceRecord]) -> i64 {
    if records.is_empty() {
        return 0;
    }
    let present = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count();
    round_half_up(100.0 * present as f64 / records.len() as f64)
}

pub fn assignment_completion(assignments: &[Assignment]) -> usize {
    assignments
        .iter()
        .filter(|a| {
            matches!(
                a.status,
                AssignmentStatus::Submitted | AssignmentStatus::Graded
            )
        })
        .count()
}

/// Overdue is derived, never stored: pending work past its due date.
pub fn is_overdue(assignment: &Assignment, today: NaiveDate) -> bool {
    assignment.status == AssignmentStatus::Pending && assignment.due_date < today
}

pub fn class_average(all_grades: &[Grade]) -> i64 {
    average_grade(all_grades)
}

pub fn class_attendance_rate(all_records: &[AttendanceRecord]) -> i64 {
    attendance_rate(all_records)
}

/// Bands are inclusive at the lower bound.
pub fn letter_grade(pct: i64) -> &'static str {
    match pct {
        p if p >= 90 => "A",
        p if p >= 80 => "B",
        p if p >= 70 => "C",
        p if p >= 60 => "D",
        _ => "F",
    }
}

pub fn status_label(assignment: &Assignment, today: NaiveDate) -> &'static str {
    if is_overdue(assignment, today) {
        return "Overdue";
    }
    match assignment.status {
        AssignmentStatus::Pending => "Pending",
        AssignmentStatus::Submitted => "Submitted",
        AssignmentStatus::Graded => "Graded",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Warning,
    Error,
}

pub fn performance_tone(pct: i64) -> Tone {
    if pct >= 80 {
        Tone::Success
    } else if pct >= 60 {
        Tone::Warning
    } else {
        Tone::Error
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentProgress {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub graded: usize,
}

pub fn assignment_progress(assignments: &[Assignment]) -> AssignmentProgress {
    AssignmentProgress {
        total: assignments.len(),
        completed: assignment_completion(assignments),
        pending: assignments
            .iter()
            .filter(|a| a.status == AssignmentStatus::Pending)
            .count(),
        graded: assignments
            .iter()
            .filter(|a| a.status == AssignmentStatus::Graded)
            .count(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub total: usize,
}

impl StatusCounts {
    pub fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Late => self.late += 1,
        }
        self.total += 1;
    }

    /// Same rule as `attendance_rate`, over counts already tallied.
    pub fn rate(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            round_half_up(100.0 * self.present as f64 / self.total as f64)
        }
    }
}

pub fn status_counts<'a, I>(records: I) -> StatusCounts
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut counts = StatusCounts::default();
    for r in records {
        counts.add(r.status);
    }
    counts
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentMetrics {
    pub average_grade: i64,
    pub attendance_rate: i64,
    pub completed_assignments: usize,
    pub total_assignments: usize,
}

pub fn student_metrics(index: &RelationshipIndex, student_id: RecordId) -> StudentMetrics {
    let assignments = index.assignments_for(student_id);
    StudentMetrics {
        average_grade: average_grade(index.grades_for(student_id)),
        attendance_rate: attendance_rate(index.attendance_for(student_id)),
        completed_assignments: assignment_completion(assignments),
        total_assignments: assignments.len(),
    }
}

pub fn metrics_by_student(
    students: &[Student],
    index: &RelationshipIndex,
) -> HashMap<RecordId, StudentMetrics> {
    students
        .iter()
        .map(|s| (s.id, student_metrics(index, s.id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExamType, Subject};

    fn grade(marks: f64, total: f64) -> Grade {
        Grade {
            id: 1,
            student_id: 1,
            subject: Subject::Mathematics,
            exam_type: ExamType::Quiz,
            marks,
            total_marks: total,
            percentage: percentage(marks, total),
            date: None,
        }
    }

    fn attendance(status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: 1,
            student_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            status,
            notes: String::new(),
        }
    }

    fn assignment(status: AssignmentStatus, due: &str) -> Assignment {
        Assignment {
            id: 1,
            student_id: 1,
            title: "Worksheet".into(),
            subject: Subject::Science,
            due_date: NaiveDate::parse_from_str(due, "%Y-%m-%d").unwrap(),
            submission_date: None,
            status,
            max_score: 100.0,
            score: None,
        }
    }

    #[test]
    fn round_half_up_matches_js_math_round() {
        assert_eq!(round_half_up(82.5), 83);
        assert_eq!(round_half_up(82.49), 82);
        assert_eq!(round_half_up(0.0), 0);
        assert_eq!(round_half_up(99.5), 100);
    }

    #[test]
    fn average_of_two_grades_rounds_half_up() {
        let grades = vec![grade(18.0, 20.0), grade(15.0, 20.0)];
        assert_eq!(grades[0].percentage, 90);
        assert_eq!(grades[1].percentage, 75);
        assert_eq!(average_grade(&grades), 83);
        assert_eq!(class_average(&grades), 83);
    }

    #[test]
    fn empty_inputs_yield_zero() {
        assert_eq!(average_grade(&[]), 0);
        assert_eq!(attendance_rate(&[]), 0);
        assert_eq!(assignment_completion(&[]), 0);
        assert_eq!(class_attendance_rate(&[]), 0);
        assert_eq!(percentage(5.0, 0.0), 0);
    }

    #[test]
    fn attendance_rate_counts_only_present() {
        let records = vec![
            attendance(AttendanceStatus::Present),
            attendance(AttendanceStatus::Present),
            attendance(AttendanceStatus::Absent),
            attendance(AttendanceStatus::Late),
        ];
        assert_eq!(attendance_rate(&records), 50);
        let counts = status_counts(&records);
        assert_eq!(counts.late, 1);
        assert_eq!(counts.rate(), 50);
    }

    #[test]
    fn letter_bands_are_inclusive_at_lower_bound() {
        assert_eq!(letter_grade(90), "A");
        assert_eq!(letter_grade(89), "B");
        assert_eq!(letter_grade(80), "B");
        assert_eq!(letter_grade(79), "C");
        assert_eq!(letter_grade(70), "C");
        assert_eq!(letter_grade(60), "D");
        assert_eq!(letter_grade(59), "F");
    }

    #[test]
    fn overdue_requires_pending_and_strictly_past_due() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let late = assignment(AssignmentStatus::Pending, "2024-01-01");
        assert!(is_overdue(&late, now));
        assert_eq!(status_label(&late, now), "Overdue");

        let due_today = assignment(AssignmentStatus::Pending, "2024-06-01");
        assert!(!is_overdue(&due_today, now));
        assert_eq!(status_label(&due_today, now), "Pending");

        let submitted = assignment(AssignmentStatus::Submitted, "2024-01-01");
        assert!(!is_overdue(&submitted, now));
        assert_eq!(status_label(&submitted, now), "Submitted");
    }

    #[test]
    fn completion_counts_submitted_and_graded() {
        let list = vec![
            assignment(AssignmentStatus::Pending, "2024-01-01"),
            assignment(AssignmentStatus::Submitted, "2024-01-01"),
            assignment(AssignmentStatus::Graded, "2024-01-01"),
        ];
        assert_eq!(assignment_completion(&list), 2);
        let p = assignment_progress(&list);
        assert_eq!((p.total, p.completed, p.pending, p.graded), (3, 2, 1, 1));
    }

    #[test]
    fn average_stays_within_bounds() {
        let grades: Vec<Grade> = (0..=20).map(|m| grade(m as f64, 20.0)).collect();
        let avg = average_grade(&grades);
        assert!((0..=100).contains(&avg));
        assert_eq!(avg, 50);
    }
}
