use std::collections::BTreeSet;

use serde::Serialize;

use super::domain::{CoopRecord, CoopRecordStatus, Student};

/// Coordinator dashboard summary over the records visible to one faculty
/// member. Built strictly from scope-filtered data, so an out-of-department
/// coordinator sees zeroes rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DepartmentReport {
    pub department: String,
    pub students_in_department: usize,
    pub coop_students: usize,
    pub active: usize,
    pub summaries_awaiting_review: usize,
    pub approved_awaiting_grade: usize,
    pub graded: usize,
}

pub(crate) fn build_report(
    department: &str,
    students: &[Student],
    records: &[CoopRecord],
) -> DepartmentReport {
    let mut report = DepartmentReport {
        department: department.to_string(),
        students_in_department: students.len(),
        ..DepartmentReport::default()
    };

    let mut coop_students = BTreeSet::new();
    for record in records {
        coop_students.insert(&record.student);
        match record.status {
            CoopRecordStatus::Active => report.active += 1,
            CoopRecordStatus::SummarySubmitted => report.summaries_awaiting_review += 1,
            CoopRecordStatus::Approved => report.approved_awaiting_grade += 1,
            CoopRecordStatus::Graded => report.graded += 1,
        }
    }
    report.coop_students = coop_students.len();

    report
}
