use crate::model::{Assignment, AttendanceRecord, Class, Grade, RecordId, Student};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// One request's worth of normalized collections.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub students: Vec<Student>,
    pub classes: Vec<Class>,
    pub grades: Vec<Grade>,
    pub attendance: Vec<AttendanceRecord>,
    pub assignments: Vec<Assignment>,
}

impl Roster {
    pub fn index(&self) -> RelationshipIndex {
        RelationshipIndex::build(
            &self.students,
            &self.grades,
            &self.attendance,
            &self.assignments,
        )
    }

    pub fn student(&self, id: RecordId) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }
}

/// Foreign-key lookups over a roster. Buckets keep input order.
#[derive(Debug, Clone, Default)]
pub struct RelationshipIndex {
    grades: HashMap<RecordId, Vec<Grade>>,
    attendance: HashMap<RecordId, Vec<AttendanceRecord>>,
    assignments: HashMap<RecordId, Vec<Assignment>>,
    by_class_name: HashMap<String, HashSet<RecordId>>,
    by_class_id: HashMap<RecordId, HashSet<RecordId>>,
    names: HashMap<RecordId, String>,
}

fn bucket<T: Clone>(records: &[T], key: impl Fn(&T) -> RecordId) -> HashMap<RecordId, Vec<T>> {
    let mut out: HashMap<RecordId, Vec<T>> = HashMap::new();
    for r in records {
        out.entry(key(r)).or_default().push(r.clone());
    }
    out
}

impl RelationshipIndex {
    pub fn build(
        students: &[Student],
        grades: &[Grade],
        attendance: &[AttendanceRecord],
        assignments: &[Assignment],
    ) -> Self {
        let mut by_class_name: HashMap<String, HashSet<RecordId>> = HashMap::new();
        let mut by_class_id: HashMap<RecordId, HashSet<RecordId>> = HashMap::new();
        let mut names = HashMap::new();
        for s in students {
            names.insert(s.id, s.name.clone());
            if !s.class_name.is_empty() {
                by_class_name
                    .entry(s.class_name.clone())
                    .or_default()
                    .insert(s.id);
            }
            if let Some(class_id) = s.class_id {
                by_class_id.entry(class_id).or_default().insert(s.id);
            }
        }

        RelationshipIndex {
            grades: bucket(grades, |g| g.student_id),
            attendance: bucket(attendance, |a| a.student_id),
            assignments: bucket(assignments, |a| a.student_id),
            by_class_name,
            by_class_id,
            names,
        }
    }

    pub fn grades_for(&self, student_id: RecordId) -> &[Grade] {
        self.grades.get(&student_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn attendance_for(&self, student_id: RecordId) -> &[AttendanceRecord] {
        self.attendance
            .get(&student_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn assignments_for(&self, student_id: RecordId) -> &[Assignment] {
        self.assignments
            .get(&student_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn attendance_on(&self, student_id: RecordId, day: NaiveDate) -> Option<&AttendanceRecord> {
        self.attendance_for(student_id).iter().find(|r| r.date == day)
    }

    pub fn students_in_class(&self, class_name: &str) -> HashSet<RecordId> {
        self.by_class_name
            .get(class_name)
            .cloned()
            .unwrap_or_default()
    }

    /// Students linked either by class id or, for rows that only carry a
    /// display name, by class name.
    pub fn class_student_count(&self, class: &Class) -> usize {
        let mut members = self.students_in_class(&class.name);
        if let Some(by_id) = self.by_class_id.get(&class.id) {
            members.extend(by_id.iter().copied());
        }
        members.len()
    }

    pub fn student_name(&self, student_id: RecordId) -> Option<&str> {
        self.names.get(&student_id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttendanceStatus, ExamType, Subject};

    fn student(id: RecordId, class_id: Option<RecordId>, class_name: &str) -> Student {
        Student {
            id,
            name: format!("Student {}", id),
            student_code: format!("ST{:03}", id),
            class_id,
            class_name: class_name.to_string(),
            email: String::new(),
            phone: String::new(),
            photo: None,
            date_of_birth: None,
            enrollment_date: None,
            guardian_name: String::new(),
            guardian_contact: String::new(),
        }
    }

    fn grade(id: RecordId, student_id: RecordId) -> Grade {
        Grade {
            id,
            student_id,
            subject: Subject::History,
            exam_type: ExamType::Final,
            marks: 7.0,
            total_marks: 10.0,
            percentage: 70,
            date: None,
        }
    }

    #[test]
    fn buckets_preserve_input_order() {
        let students = vec![student(1, None, "9-A")];
        let grades = vec![grade(10, 1), grade(11, 2), grade(12, 1)];
        let index = RelationshipIndex::build(&students, &grades, &[], &[]);
        let ids: Vec<RecordId> = index.grades_for(1).iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![10, 12]);
        assert_eq!(index.grades_for(2).len(), 1);
    }

    #[test]
    fn unknown_student_yields_empty_slices() {
        let index = RelationshipIndex::build(&[], &[], &[], &[]);
        assert!(index.grades_for(42).is_empty());
        assert!(index.attendance_for(42).is_empty());
        assert!(index.assignments_for(42).is_empty());
        assert!(index.students_in_class("10-A").is_empty());
        assert_eq!(index.student_name(42), None);
    }

    #[test]
    fn class_count_merges_id_and_name_links() {
        let students = vec![
            student(1, Some(3), "10-A"),
            student(2, None, "10-A"),
            student(3, Some(3), ""),
            student(4, Some(4), "10-B"),
        ];
        let index = RelationshipIndex::build(&students, &[], &[], &[]);
        let class = Class {
            id: 3,
            name: "10-A".into(),
            academic_year: "2024-2025".into(),
            student_count: 99,
        };
        assert_eq!(index.class_student_count(&class), 3);
        assert_eq!(index.students_in_class("10-B").len(), 1);
    }

    #[test]
    fn attendance_on_finds_the_day() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let rec = AttendanceRecord {
            id: 1,
            student_id: 7,
            date: day,
            status: AttendanceStatus::Late,
            notes: String::new(),
        };
        let index = RelationshipIndex::build(&[], &[], &[rec], &[]);
        assert_eq!(
            index.attendance_on(7, day).map(|r| r.status),
            Some(AttendanceStatus::Late)
        );
        assert!(index.attendance_on(7, day.succ_opt().unwrap()).is_none());
    }
}
