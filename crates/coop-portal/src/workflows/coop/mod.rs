//! Co-op program decision and workflow engine.
//!
//! Everything with real decision logic lives here: the eligibility
//! evaluator, the application and co-op record state machines, the
//! department-scoped visibility predicate, and the selection notification
//! hook. Rendering, sessions, and storage are external collaborators
//! reached through the traits in [`repository`].

pub mod domain;
pub(crate) mod eligibility;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationStatus, CoopMetrics, CoopRecord, CoopRecordId,
    CoopRecordStatus, EligibilityId, Employer, EmployerId, FacultyCoordinator, FacultyId, Grade,
    InvalidGrade, JobPosting, MetricKind, PostingId, Student, StudentId,
};
pub use eligibility::{
    EligibilityAssessment, EligibilityConfig, EligibilityEngine, EligibilityRecord,
    EligibilityVerdict, InvalidMetric, MetricCheck, ValidatedMetrics,
};
pub use report::DepartmentReport;
pub use repository::{
    ApplicantSelected, NotificationError, NotificationPublisher, RecordStore, RepositoryError,
};
pub use router::{coop_router, ApplicationView, CoopRecordView, EligibilityView, StudentView};
pub use service::{CoopError, CoopProgramService};
pub use visibility::can_access;
