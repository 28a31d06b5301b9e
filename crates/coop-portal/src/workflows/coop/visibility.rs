use super::domain::{FacultyCoordinator, Student};

/// Department-scoped visibility predicate for faculty actors.
///
/// Applied uniformly at every coordinator read and write entry point, and
/// evaluated fresh on each call — department assignments may change between
/// requests, so the result is never cached.
pub fn can_access(coordinator: &FacultyCoordinator, student: &Student) -> bool {
    coordinator.department == student.department
}
