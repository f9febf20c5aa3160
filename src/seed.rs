//! Demo roster bundled into the binary, in the mock services' field naming.

use anyhow::Context;
use serde_json::Value;

const STUDENTS: &str = include_str!("../fixtures/seed/students.json");
const CLASSES: &str = include_str!("../fixtures/seed/classes.json");
const GRADES: &str = include_str!("../fixtures/seed/grades.json");
const ATTENDANCE: &str = include_str!("../fixtures/seed/attendance.json");
const ASSIGNMENTS: &str = include_str!("../fixtures/seed/assignments.json");

#[derive(Debug, Clone, Default)]
pub struct Seed {
    pub students: Vec<Value>,
    pub classes: Vec<Value>,
    pub grades: Vec<Value>,
    pub attendance: Vec<Value>,
    pub assignments: Vec<Value>,
}

fn rows(name: &str, text: &str) -> anyhow::Result<Vec<Value>> {
    serde_json::from_str(text).with_context(|| format!("seed fixture {} is not a JSON array", name))
}

impl Seed {
    pub fn bundled() -> anyhow::Result<Self> {
        Ok(Seed {
            students: rows("students", STUDENTS)?,
            classes: rows("classes", CLASSES)?,
            grades: rows("grades", GRADES)?,
            attendance: rows("attendance", ATTENDANCE)?,
            assignments: rows("assignments", ASSIGNMENTS)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assignment, AttendanceRecord, Class, Grade, Student};
    use crate::normalize::collect;

    #[test]
    fn bundled_rows_all_normalize() {
        let seed = Seed::bundled().expect("seed");
        assert_eq!(collect::<Student>(seed.students.clone()).len(), seed.students.len());
        assert_eq!(collect::<Class>(seed.classes.clone()).len(), seed.classes.len());
        assert_eq!(collect::<Grade>(seed.grades.clone()).len(), seed.grades.len());
        assert_eq!(
            collect::<AttendanceRecord>(seed.attendance.clone()).len(),
            seed.attendance.len()
        );
        assert_eq!(
            collect::<Assignment>(seed.assignments.clone()).len(),
            seed.assignments.len()
        );
    }
}
