use crate::index::RelationshipIndex;
use crate::metrics::StudentMetrics;
use crate::model::{Assignment, AssignmentStatus, Grade, RecordId, Student, Subject};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Treat `""` and `"all"` (any case) as "no filter".
fn active(v: Option<&str>) -> Option<&str> {
    v.map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentFilter {
    pub search_term: Option<String>,
    pub class_filter: Option<String>,
}

impl StudentFilter {
    pub fn matches(&self, s: &Student) -> bool {
        if let Some(term) = self.search_term.as_deref().map(str::trim) {
            if !term.is_empty() {
                let needle = term.to_lowercase();
                let hit = [&s.name, &s.student_code, &s.class_name, &s.email]
                    .iter()
                    .any(|h| h.to_lowercase().contains(&needle));
                if !hit {
                    return false;
                }
            }
        }
        match active(self.class_filter.as_deref()) {
            Some(class) => s.class_name == class,
            None => true,
        }
    }
}

pub fn filter_students(students: &[Student], filter: &StudentFilter) -> Vec<Student> {
    students
        .iter()
        .filter(|s| filter.matches(s))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Name,
    StudentId,
    Class,
    Grade,
    Attendance,
}

impl SortKey {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "name" => Some(SortKey::Name),
            "studentId" | "studentCode" => Some(SortKey::StudentId),
            "class" | "className" => Some(SortKey::Class),
            "grade" | "averageGrade" => Some(SortKey::Grade),
            "attendance" | "attendanceRate" => Some(SortKey::Attendance),
            _ => None,
        }
    }
}

/// Case-folded order first, raw order as the tie-break, so "adams" and
/// "Adams" sit together but still order deterministically.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Stable: equal keys keep their input order.
pub fn sort_students(
    students: &mut [Student],
    key: SortKey,
    metrics: &HashMap<RecordId, StudentMetrics>,
) {
    let m = |s: &Student| metrics.get(&s.id).copied().unwrap_or_default();
    match key {
        SortKey::Name => students.sort_by(|a, b| locale_compare(&a.name, &b.name)),
        SortKey::StudentId => {
            students.sort_by(|a, b| locale_compare(&a.student_code, &b.student_code))
        }
        SortKey::Class => students.sort_by(|a, b| locale_compare(&a.class_name, &b.class_name)),
        SortKey::Grade => students.sort_by(|a, b| m(b).average_grade.cmp(&m(a).average_grade)),
        SortKey::Attendance => {
            students.sort_by(|a, b| m(b).attendance_rate.cmp(&m(a).attendance_rate))
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignmentFilter {
    pub status: Option<String>,
    pub subject: Option<String>,
    pub class_name: Option<String>,
}

pub fn filter_assignments(
    assignments: &[Assignment],
    filter: &AssignmentFilter,
    index: &RelationshipIndex,
) -> Vec<Assignment> {
    let status = active(filter.status.as_deref()).map(AssignmentStatus::parse);
    let subject = active(filter.subject.as_deref()).map(Subject::parse);
    let members = active(filter.class_name.as_deref()).map(|c| index.students_in_class(c));

    assignments
        .iter()
        .filter(|a| match status {
            // An unrecognised status matches nothing rather than everything.
            Some(wanted) => wanted == Some(a.status),
            None => true,
        })
        .filter(|a| match subject {
            Some(wanted) => wanted == Some(a.subject),
            None => true,
        })
        .filter(|a| match &members {
            Some(ids) => ids.contains(&a.student_id),
            None => true,
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssignmentSortKey {
    #[default]
    DueDate,
    Title,
    Subject,
    Status,
}

impl AssignmentSortKey {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "dueDate" => Some(AssignmentSortKey::DueDate),
            "title" => Some(AssignmentSortKey::Title),
            "subject" => Some(AssignmentSortKey::Subject),
            "status" => Some(AssignmentSortKey::Status),
            _ => None,
        }
    }
}

pub fn sort_assignments(assignments: &mut [Assignment], key: AssignmentSortKey) {
    match key {
        AssignmentSortKey::DueDate => assignments.sort_by_key(|a| a.due_date),
        AssignmentSortKey::Title => assignments.sort_by(|a, b| locale_compare(&a.title, &b.title)),
        AssignmentSortKey::Subject => {
            assignments.sort_by(|a, b| a.subject.as_str().cmp(b.subject.as_str()))
        }
        AssignmentSortKey::Status => {
            assignments.sort_by(|a, b| a.status.as_str().cmp(b.status.as_str()))
        }
    }
}

pub fn filter_grades(grades: &[Grade], subject: Option<&str>) -> Vec<Grade> {
    match active(subject) {
        None => grades.to_vec(),
        Some(raw) => {
            let wanted = Subject::parse(raw);
            grades
                .iter()
                .filter(|g| wanted == Some(g.subject))
                .cloned()
                .collect()
        }
    }
}

pub fn unique_classes(students: &[Student]) -> Vec<String> {
    let set: BTreeSet<&str> = students
        .iter()
        .map(|s| s.class_name.trim())
        .filter(|c| !c.is_empty())
        .collect();
    let mut out: Vec<String> = set.into_iter().map(String::from).collect();
    out.sort_by(|a, b| locale_compare(a, b));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExamType;
    use chrono::NaiveDate;

    fn student(id: RecordId, name: &str, class: &str, email: &str) -> Student {
        Student {
            id,
            name: name.into(),
            student_code: format!("ST{:03}", id),
            class_id: None,
            class_name: class.into(),
            email: email.into(),
            phone: String::new(),
            photo: None,
            date_of_birth: None,
            enrollment_date: None,
            guardian_name: String::new(),
            guardian_contact: String::new(),
        }
    }

    fn roster() -> Vec<Student> {
        vec![
            student(1, "Zoe Park", "10-A", "zoe@school.edu"),
            student(2, "adam Li", "10-B", "adam@school.edu"),
            student(3, "Adam Li", "10-A", "adam.li@school.edu"),
            student(4, "Bea Cruz", "9-C", "bea@mail.com"),
        ]
    }

    fn assignment(id: RecordId, student_id: RecordId, status: AssignmentStatus, due: u32) -> Assignment {
        Assignment {
            id,
            student_id,
            title: format!("Task {}", id),
            subject: if id % 2 == 0 { Subject::Physics } else { Subject::English },
            due_date: NaiveDate::from_ymd_opt(2024, 5, due).unwrap(),
            submission_date: None,
            status,
            max_score: 10.0,
            score: None,
        }
    }

    #[test]
    fn search_matches_any_field_case_insensitively() {
        let filter = StudentFilter {
            search_term: Some("  SCHOOL.edu ".into()),
            class_filter: None,
        };
        assert_eq!(filter_students(&roster(), &filter).len(), 3);

        let filter = StudentFilter {
            search_term: Some("st004".into()),
            class_filter: None,
        };
        let hits = filter_students(&roster(), &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Bea Cruz");
    }

    #[test]
    fn search_and_class_filters_compose() {
        let filter = StudentFilter {
            search_term: Some("adam".into()),
            class_filter: Some("10-A".into()),
        };
        let hits = filter_students(&roster(), &filter);
        assert_eq!(hits.iter().map(|s| s.id).collect::<Vec<_>>(), vec![3]);

        let all = StudentFilter {
            search_term: Some(String::new()),
            class_filter: Some("all".into()),
        };
        assert_eq!(filter_students(&roster(), &all).len(), 4);
    }

    #[test]
    fn filtering_is_idempotent() {
        let filter = StudentFilter {
            search_term: Some("a".into()),
            class_filter: Some("10-A".into()),
        };
        let once = filter_students(&roster(), &filter);
        let twice = filter_students(&once, &filter);
        assert_eq!(once, twice);
    }

    #[test]
    fn name_sort_is_case_folded_and_stable() {
        let mut a = roster();
        sort_students(&mut a, SortKey::Name, &HashMap::new());
        let names: Vec<&str> = a.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Adam Li", "adam Li", "Bea Cruz", "Zoe Park"]);

        let mut b = a.clone();
        sort_students(&mut b, SortKey::Name, &HashMap::new());
        assert_eq!(a, b);
    }

    #[test]
    fn grade_sort_is_descending_with_ties_in_input_order() {
        let metrics: HashMap<RecordId, StudentMetrics> = [(1, 70), (2, 90), (3, 70), (4, 85)]
            .into_iter()
            .map(|(id, avg)| {
                (
                    id,
                    StudentMetrics {
                        average_grade: avg,
                        ..Default::default()
                    },
                )
            })
            .collect();
        let mut list = roster();
        sort_students(&mut list, SortKey::Grade, &metrics);
        assert_eq!(list.iter().map(|s| s.id).collect::<Vec<_>>(), vec![2, 4, 1, 3]);
    }

    #[test]
    fn assignment_class_filter_goes_through_the_index() {
        let students = roster();
        let assignments = vec![
            assignment(1, 1, AssignmentStatus::Pending, 3),
            assignment(2, 2, AssignmentStatus::Pending, 1),
            assignment(3, 3, AssignmentStatus::Graded, 2),
            assignment(4, 3, AssignmentStatus::Pending, 4),
        ];
        let index = RelationshipIndex::build(&students, &[], &[], &assignments);
        let filter = AssignmentFilter {
            status: Some("pending".into()),
            subject: Some("all".into()),
            class_name: Some("10-A".into()),
        };
        let hits = filter_assignments(&assignments, &filter, &index);
        assert_eq!(hits.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 4]);

        let bogus = AssignmentFilter {
            status: Some("archived".into()),
            ..Default::default()
        };
        assert!(filter_assignments(&assignments, &bogus, &index).is_empty());
    }

    #[test]
    fn assignments_sort_by_due_date() {
        let mut list = vec![
            assignment(1, 1, AssignmentStatus::Pending, 3),
            assignment(2, 1, AssignmentStatus::Pending, 1),
            assignment(3, 1, AssignmentStatus::Pending, 2),
        ];
        sort_assignments(&mut list, AssignmentSortKey::DueDate);
        assert_eq!(list.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2, 3, 1]);
        sort_assignments(&mut list, AssignmentSortKey::Subject);
        assert_eq!(list[0].subject, Subject::English);
    }

    #[test]
    fn grade_filter_and_class_options() {
        let g = |id, subject| Grade {
            id,
            student_id: 1,
            subject,
            exam_type: ExamType::Quiz,
            marks: 1.0,
            total_marks: 2.0,
            percentage: 50,
            date: None,
        };
        let grades = vec![g(1, Subject::Biology), g(2, Subject::English)];
        assert_eq!(filter_grades(&grades, Some("biology")).len(), 1);
        assert_eq!(filter_grades(&grades, Some("all")).len(), 2);
        assert_eq!(filter_grades(&grades, None).len(), 2);

        assert_eq!(unique_classes(&roster()), vec!["10-A", "10-B", "9-C"]);
    }
}
