//! Page-ready view models. Every function recomputes from the roster it is
//! handed; nothing here caches.

use crate::filter::{self, AssignmentFilter, AssignmentSortKey, SortKey, StudentFilter};
use crate::index::{RelationshipIndex, Roster};
use crate::metrics::{self, AssignmentProgress, StatusCounts, StudentMetrics, Tone};
use crate::model::{
    Assignment, AssignmentStatus, AttendanceRecord, AttendanceStatus, Class, Grade, RecordId,
    Student,
};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

pub const DEFAULT_TOP_PERFORMERS: usize = 4;
const RECENT_ACTIVITY: usize = 5;
const RECENT_ENROLLMENT_DAYS: i64 = 30;

/// A calendar month, exchanged as `yyyy-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthKey {
    first: NaiveDate,
}

impl MonthKey {
    pub fn parse(raw: &str) -> Option<Self> {
        let t = raw.trim();
        let (y, m) = t.get(..7).unwrap_or(t).split_once('-')?;
        let first = NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1)?;
        Some(MonthKey { first })
    }

    pub fn of(day: NaiveDate) -> Self {
        MonthKey {
            first: day.with_day(1).unwrap_or(day),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        self.first
            .iter_days()
            .take_while(|d| d.month() == self.first.month())
            .collect()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day.year() == self.first.year() && day.month() == self.first.month()
    }

    pub fn label(&self) -> String {
        self.first.format("%Y-%m").to_string()
    }
}

fn display_number(x: f64) -> String {
    if x.fract() == 0.0 {
        format!("{}", x as i64)
    } else {
        format!("{}", x)
    }
}

fn members<'a>(students: &'a [Student], class_filter: Option<&str>) -> Vec<&'a Student> {
    let filter = StudentFilter {
        search_term: None,
        class_filter: class_filter.map(String::from),
    };
    students.iter().filter(|s| filter.matches(s)).collect()
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformerRow {
    #[serde(flatten)]
    pub student: Student,
    pub average_grade: i64,
    pub letter_grade: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub grade_id: RecordId,
    pub student_id: RecordId,
    pub message: String,
    pub percentage: i64,
    pub tone: Tone,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub total_students: usize,
    pub average_grade: i64,
    pub attendance_rate: i64,
    pub pending_assignments: usize,
    pub top_performers: Vec<PerformerRow>,
    pub recent_activity: Vec<ActivityItem>,
}

pub fn dashboard(roster: &Roster, top_n: usize) -> DashboardView {
    let index = roster.index();

    let mut ranked: Vec<(Student, i64)> = roster
        .students
        .iter()
        .map(|s| (s.clone(), metrics::average_grade(index.grades_for(s.id))))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let top_performers = ranked
        .into_iter()
        .take(top_n)
        .map(|(student, avg)| PerformerRow {
            student,
            average_grade: avg,
            letter_grade: metrics::letter_grade(avg),
        })
        .collect();

    let recent_activity = roster
        .grades
        .iter()
        .rev()
        .take(RECENT_ACTIVITY)
        .map(|g| ActivityItem {
            grade_id: g.id,
            student_id: g.student_id,
            message: format!(
                "{} received {}/{} in {}",
                index.student_name(g.student_id).unwrap_or("Unknown Student"),
                display_number(g.marks),
                display_number(g.total_marks),
                g.subject.as_str()
            ),
            percentage: g.percentage,
            tone: metrics::performance_tone(g.percentage),
            date: g.date,
        })
        .collect();

    DashboardView {
        total_students: roster.students.len(),
        average_grade: metrics::class_average(&roster.grades),
        attendance_rate: metrics::class_attendance_rate(&roster.attendance),
        pending_assignments: roster
            .assignments
            .iter()
            .filter(|a| a.status == AssignmentStatus::Pending)
            .count(),
        top_performers,
        recent_activity,
    }
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRow {
    #[serde(flatten)]
    pub student: Student,
    #[serde(flatten)]
    pub metrics: StudentMetrics,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListView {
    pub students: Vec<StudentRow>,
    pub total_students: usize,
    pub shown: usize,
    pub recent_enrollments: usize,
    pub classes: Vec<String>,
}

pub fn student_list(
    roster: &Roster,
    filter: &StudentFilter,
    sort: SortKey,
    today: NaiveDate,
) -> StudentListView {
    let index = roster.index();
    let by_student = metrics::metrics_by_student(&roster.students, &index);

    let mut shown = filter::filter_students(&roster.students, filter);
    filter::sort_students(&mut shown, sort, &by_student);

    let cutoff = today - Duration::days(RECENT_ENROLLMENT_DAYS);
    let recent_enrollments = roster
        .students
        .iter()
        .filter(|s| s.enrollment_date.is_some_and(|d| d > cutoff))
        .count();

    let students: Vec<StudentRow> = shown
        .into_iter()
        .map(|s| StudentRow {
            metrics: by_student.get(&s.id).copied().unwrap_or_default(),
            student: s,
        })
        .collect();

    StudentListView {
        shown: students.len(),
        students,
        total_students: roster.students.len(),
        recent_enrollments,
        classes: filter::unique_classes(&roster.students),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRow {
    #[serde(flatten)]
    pub grade: Grade,
    pub letter_grade: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRow {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub label: &'static str,
    pub overdue: bool,
    pub student_name: Option<String>,
}

impl AssignmentRow {
    fn new(assignment: Assignment, index: &RelationshipIndex, today: NaiveDate) -> Self {
        AssignmentRow {
            label: metrics::status_label(&assignment, today),
            overdue: metrics::is_overdue(&assignment, today),
            student_name: index.student_name(assignment.student_id).map(String::from),
            assignment,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetailView {
    pub student: Student,
    #[serde(flatten)]
    pub metrics: StudentMetrics,
    pub a_grades: usize,
    pub progress: AssignmentProgress,
    pub grades: Vec<GradeRow>,
    pub attendance: Vec<AttendanceRecord>,
    pub assignments: Vec<AssignmentRow>,
}

pub fn student_detail(
    roster: &Roster,
    student_id: RecordId,
    today: NaiveDate,
) -> Option<StudentDetailView> {
    let student = roster.student(student_id)?.clone();
    let index = roster.index();
    let grades = index.grades_for(student_id);
    let assignments = index.assignments_for(student_id);

    Some(StudentDetailView {
        metrics: metrics::student_metrics(&index, student_id),
        a_grades: grades.iter().filter(|g| g.percentage >= 90).count(),
        progress: metrics::assignment_progress(assignments),
        grades: grades
            .iter()
            .map(|g| GradeRow {
                letter_grade: metrics::letter_grade(g.percentage),
                grade: g.clone(),
            })
            .collect(),
        attendance: index.attendance_for(student_id).to_vec(),
        assignments: assignments
            .iter()
            .map(|a| AssignmentRow::new(a.clone(), &index, today))
            .collect(),
        student,
    })
}

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

/// Classes with their member count taken from the roster, never from the
/// stored counter.
pub fn class_list(roster: &Roster) -> Vec<Class> {
    let index = roster.index();
    roster
        .classes
        .iter()
        .map(|c| Class {
            student_count: index.class_student_count(c),
            ..c.clone()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Grades
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeStudentRow {
    pub student_id: RecordId,
    pub name: String,
    pub student_code: String,
    pub class_name: String,
    pub average_grade: i64,
    pub letter_grade: &'static str,
    pub grade_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradesPageView {
    pub subject: Option<String>,
    pub class_filter: Option<String>,
    pub class_average: i64,
    pub grade_count: usize,
    pub students: Vec<GradeStudentRow>,
    pub grades: Vec<GradeRow>,
    pub classes: Vec<String>,
}

pub fn grades_page(
    roster: &Roster,
    subject: Option<&str>,
    class_filter: Option<&str>,
) -> GradesPageView {
    let index = roster.index();
    let subject_grades = filter::filter_grades(&roster.grades, subject);

    let mut rows: Vec<GradeStudentRow> = members(&roster.students, class_filter)
        .into_iter()
        .map(|s| {
            let grades = index.grades_for(s.id);
            let avg = metrics::average_grade(grades);
            GradeStudentRow {
                student_id: s.id,
                name: s.name.clone(),
                student_code: s.student_code.clone(),
                class_name: s.class_name.clone(),
                average_grade: avg,
                letter_grade: metrics::letter_grade(avg),
                grade_count: grades.len(),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.average_grade.cmp(&a.average_grade));

    GradesPageView {
        subject: subject.map(String::from),
        class_filter: class_filter.map(String::from),
        class_average: metrics::class_average(&subject_grades),
        grade_count: subject_grades.len(),
        students: rows,
        grades: subject_grades
            .into_iter()
            .map(|g| GradeRow {
                letter_grade: metrics::letter_grade(g.percentage),
                grade: g,
            })
            .collect(),
        classes: filter::unique_classes(&roster.students),
    }
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentStats {
    pub total: usize,
    pub pending: usize,
    pub submitted: usize,
    pub graded: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentsPageView {
    pub assignments: Vec<AssignmentRow>,
    pub stats: AssignmentStats,
    pub classes: Vec<String>,
}

pub fn assignments_page(
    roster: &Roster,
    filter: &AssignmentFilter,
    sort: AssignmentSortKey,
    today: NaiveDate,
) -> AssignmentsPageView {
    let index = roster.index();

    let all = &roster.assignments;
    let count = |status| all.iter().filter(|a| a.status == status).count();
    let stats = AssignmentStats {
        total: all.len(),
        pending: count(AssignmentStatus::Pending),
        submitted: count(AssignmentStatus::Submitted),
        graded: count(AssignmentStatus::Graded),
        overdue: all.iter().filter(|a| metrics::is_overdue(a, today)).count(),
    };

    let mut shown = filter::filter_assignments(all, filter, &index);
    filter::sort_assignments(&mut shown, sort);

    AssignmentsPageView {
        assignments: shown
            .into_iter()
            .map(|a| AssignmentRow::new(a, &index, today))
            .collect(),
        stats,
        classes: filter::unique_classes(&roster.students),
    }
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRow {
    pub student_id: RecordId,
    pub name: String,
    pub student_code: String,
    pub class_name: String,
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
    pub attendance_rate: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAttendanceView {
    pub date: NaiveDate,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub not_marked: usize,
    pub total: usize,
    pub students: Vec<DailyRow>,
}

pub fn attendance_daily(
    roster: &Roster,
    day: NaiveDate,
    class_filter: Option<&str>,
) -> DailyAttendanceView {
    let index = roster.index();
    let students = members(&roster.students, class_filter);

    let mut counts = StatusCounts::default();
    let rows: Vec<DailyRow> = students
        .iter()
        .map(|s| {
            let record = index.attendance_on(s.id, day);
            if let Some(r) = record {
                counts.add(r.status);
            }
            DailyRow {
                student_id: s.id,
                name: s.name.clone(),
                student_code: s.student_code.clone(),
                class_name: s.class_name.clone(),
                status: record.map(|r| r.status),
                notes: record.map(|r| r.notes.clone()).filter(|n| !n.is_empty()),
                attendance_rate: metrics::attendance_rate(index.attendance_for(s.id)),
            }
        })
        .collect();

    DailyAttendanceView {
        date: day,
        present: counts.present,
        absent: counts.absent,
        late: counts.late,
        not_marked: students.len().saturating_sub(counts.total),
        total: students.len(),
        students: rows,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRow {
    pub student_id: RecordId,
    pub name: String,
    pub class_name: String,
    pub rate: i64,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAttendanceView {
    pub month: String,
    pub rate: i64,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub total_records: usize,
    pub students: Vec<MonthlyRow>,
}

pub fn attendance_monthly(
    roster: &Roster,
    month: MonthKey,
    class_filter: Option<&str>,
) -> MonthlyAttendanceView {
    let index = roster.index();
    let mut overall = StatusCounts::default();
    let rows: Vec<MonthlyRow> = members(&roster.students, class_filter)
        .into_iter()
        .map(|s| {
            let counts = metrics::status_counts(
                index
                    .attendance_for(s.id)
                    .iter()
                    .filter(|r| month.contains(r.date)),
            );
            overall.present += counts.present;
            overall.absent += counts.absent;
            overall.late += counts.late;
            overall.total += counts.total;
            MonthlyRow {
                student_id: s.id,
                name: s.name.clone(),
                class_name: s.class_name.clone(),
                rate: counts.rate(),
                counts,
            }
        })
        .collect();

    MonthlyAttendanceView {
        month: month.label(),
        rate: overall.rate(),
        present: overall.present,
        absent: overall.absent,
        late: overall.late,
        total_records: overall.total,
        students: rows,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day: u32,
    pub weekday: &'static str,
    pub weekend: bool,
    pub status: Option<AttendanceStatus>,
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarView {
    pub month: String,
    pub student_id: Option<RecordId>,
    /// Column of the first day in a Sunday-first grid.
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

fn weekday_label(w: Weekday) -> &'static str {
    match w {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}

pub fn attendance_calendar(
    roster: &Roster,
    month: MonthKey,
    student_id: Option<RecordId>,
) -> CalendarView {
    let records: Vec<&AttendanceRecord> = roster
        .attendance
        .iter()
        .filter(|r| month.contains(r.date))
        .filter(|r| student_id.map_or(true, |id| r.student_id == id))
        .collect();

    let days = month
        .days()
        .into_iter()
        .map(|d| {
            let on_day = records.iter().copied().filter(|r| r.date == d);
            let counts = metrics::status_counts(on_day.clone());
            CalendarDay {
                date: d,
                day: d.day(),
                weekday: weekday_label(d.weekday()),
                weekend: matches!(d.weekday(), Weekday::Sat | Weekday::Sun),
                status: student_id.and_then(|_| on_day.map(|r| r.status).next()),
                counts,
            }
        })
        .collect();

    CalendarView {
        month: month.label(),
        student_id,
        leading_blanks: month.first_day().weekday().num_days_from_sunday(),
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExamType, Subject};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn student(id: RecordId, name: &str, class: &str) -> Student {
        Student {
            id,
            name: name.into(),
            student_code: format!("ST{:03}", id),
            class_id: None,
            class_name: class.into(),
            email: String::new(),
            phone: String::new(),
            photo: None,
            date_of_birth: None,
            enrollment_date: None,
            guardian_name: String::new(),
            guardian_contact: String::new(),
        }
    }

    fn grade(id: RecordId, student_id: RecordId, marks: f64, total: f64) -> Grade {
        Grade {
            id,
            student_id,
            subject: if id % 2 == 0 { Subject::Mathematics } else { Subject::English },
            exam_type: ExamType::Quiz,
            marks,
            total_marks: total,
            percentage: metrics::percentage(marks, total),
            date: None,
        }
    }

    fn mark(id: RecordId, student_id: RecordId, date: &str, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id,
            student_id,
            date: day(date),
            status,
            notes: String::new(),
        }
    }

    fn roster() -> Roster {
        Roster {
            students: vec![
                student(1, "Ana", "10-A"),
                student(2, "Ben", "10-A"),
                student(3, "Cy", "10-B"),
                student(4, "Di", "10-B"),
                student(5, "Ed", "10-B"),
            ],
            classes: vec![Class {
                id: 1,
                name: "10-A".into(),
                academic_year: "2024".into(),
                student_count: 0,
            }],
            grades: vec![
                grade(1, 1, 18.0, 20.0),
                grade(2, 1, 15.0, 20.0),
                grade(3, 2, 50.0, 100.0),
                grade(4, 3, 95.0, 100.0),
                grade(5, 4, 7.5, 10.0),
                grade(6, 9, 1.0, 2.0),
            ],
            attendance: vec![
                mark(1, 1, "2024-03-01", AttendanceStatus::Present),
                mark(2, 2, "2024-03-01", AttendanceStatus::Absent),
                mark(3, 3, "2024-03-01", AttendanceStatus::Late),
                mark(4, 1, "2024-03-04", AttendanceStatus::Present),
                mark(5, 1, "2024-04-02", AttendanceStatus::Absent),
            ],
            assignments: vec![],
        }
    }

    #[test]
    fn dashboard_ranks_and_reports_recent_grades() {
        let view = dashboard(&roster(), DEFAULT_TOP_PERFORMERS);
        assert_eq!(view.total_students, 5);
        let top: Vec<RecordId> = view.top_performers.iter().map(|p| p.student.id).collect();
        assert_eq!(top, vec![3, 1, 4, 2]);
        assert_eq!(view.top_performers[1].average_grade, 83);

        assert_eq!(view.recent_activity.len(), 5);
        assert_eq!(view.recent_activity[0].grade_id, 6);
        assert_eq!(
            view.recent_activity[0].message,
            "Unknown Student received 1/2 in Mathematics"
        );
        assert_eq!(view.recent_activity[1].message, "Di received 7.5/10 in English");
        assert_eq!(view.recent_activity[1].tone, Tone::Warning);
        assert_eq!(view.recent_activity[2].tone, Tone::Success);
    }

    #[test]
    fn daily_counts_only_students_in_the_class() {
        let view = attendance_daily(&roster(), day("2024-03-01"), Some("10-A"));
        assert_eq!((view.present, view.absent, view.late), (1, 1, 0));
        assert_eq!(view.not_marked, 0);
        assert_eq!(view.total, 2);

        let view = attendance_daily(&roster(), day("2024-03-01"), Some("all"));
        assert_eq!(view.not_marked, 2);
        assert_eq!(view.total, 5);
        assert_eq!(view.students[0].attendance_rate, 67);
    }

    #[test]
    fn monthly_view_limits_records_to_the_month() {
        let month = MonthKey::parse("2024-03").unwrap();
        let view = attendance_monthly(&roster(), month, None);
        assert_eq!(view.total_records, 4);
        assert_eq!(view.rate, 50);
        let ana = &view.students[0];
        assert_eq!(ana.counts.present, 2);
        assert_eq!(ana.rate, 100);
    }

    #[test]
    fn calendar_covers_every_day_of_the_month() {
        let month = MonthKey::parse("2024-02").unwrap();
        let view = attendance_calendar(&roster(), month, Some(1));
        assert_eq!(view.days.len(), 29);
        // 2024-02-01 was a Thursday.
        assert_eq!(view.leading_blanks, 4);
        assert_eq!(view.days[0].weekday, "Thu");
        assert!(view.days[2].weekend);

        let march = attendance_calendar(&roster(), MonthKey::parse("2024-03").unwrap(), Some(1));
        assert_eq!(march.days[0].status, Some(AttendanceStatus::Present));
        assert_eq!(march.days[1].status, None);

        let everyone = attendance_calendar(&roster(), MonthKey::parse("2024-03").unwrap(), None);
        assert_eq!(everyone.days[0].status, None);
        assert_eq!(everyone.days[0].counts.total, 3);
    }

    #[test]
    fn month_key_rejects_garbage() {
        assert!(MonthKey::parse("2024-13").is_none());
        assert!(MonthKey::parse("march").is_none());
        assert_eq!(MonthKey::parse("2024-03-15").map(|m| m.label()), Some("2024-03".into()));
    }

    #[test]
    fn grades_page_filters_subject_and_class() {
        let view = grades_page(&roster(), Some("Mathematics"), Some("10-B"));
        assert_eq!(view.grade_count, 3);
        assert_eq!(view.class_average, 73);
        let ids: Vec<RecordId> = view.students.iter().map(|r| r.student_id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
        assert_eq!(view.students[0].letter_grade, "A");
        assert_eq!(view.students[2].letter_grade, "F");
    }

    #[test]
    fn class_counts_come_from_the_roster() {
        let classes = class_list(&roster());
        assert_eq!(classes[0].student_count, 2);
    }

    #[test]
    fn student_detail_reports_missing_student() {
        assert!(student_detail(&roster(), 77, day("2024-06-01")).is_none());
        let view = student_detail(&roster(), 1, day("2024-06-01")).unwrap();
        assert_eq!(view.metrics.average_grade, 83);
        assert_eq!(view.a_grades, 1);
        assert_eq!(view.attendance.len(), 3);
    }

    #[test]
    fn recent_enrollments_look_back_thirty_days() {
        let mut r = roster();
        r.students[0].enrollment_date = Some(day("2024-05-20"));
        r.students[1].enrollment_date = Some(day("2024-05-03"));
        r.students[3].enrollment_date = Some(day("2024-05-02"));
        r.students[2].enrollment_date = Some(day("2024-05-01"));
        let view = student_list(&r, &StudentFilter::default(), SortKey::Name, day("2024-06-01"));
        assert_eq!(view.recent_enrollments, 2);
        assert_eq!(view.shown, 5);
        assert_eq!(view.classes, vec!["10-A", "10-B"]);
    }
}
