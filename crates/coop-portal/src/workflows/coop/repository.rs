use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, CoopRecord, CoopRecordId, CoopRecordStatus,
    Employer, EmployerId, FacultyCoordinator, FacultyId, JobPosting, PostingId, Student, StudentId,
};
use super::eligibility::EligibilityRecord;

/// Durable record store abstraction so the workflow engine can be exercised
/// in isolation from any concrete database.
///
/// Every state-machine transition goes through the `transition_*` methods,
/// which are compare-and-set per record: the store must refuse the write
/// with [`RepositoryError::StaleState`] when the record's current state no
/// longer matches `expected`. That is what keeps two rapid employer clicks
/// from double-selecting one application.
pub trait RecordStore: Send + Sync {
    // directory
    fn student(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError>;
    fn update_student(&self, student: Student) -> Result<(), RepositoryError>;
    fn students_in_department(&self, department: &str) -> Result<Vec<Student>, RepositoryError>;
    fn employer(&self, id: &EmployerId) -> Result<Option<Employer>, RepositoryError>;
    fn posting(&self, id: &PostingId) -> Result<Option<JobPosting>, RepositoryError>;
    fn faculty(&self, id: &FacultyId) -> Result<Option<FacultyCoordinator>, RepositoryError>;
    fn coordinator_for_department(
        &self,
        department: &str,
    ) -> Result<Option<FacultyCoordinator>, RepositoryError>;

    // applications
    fn insert_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn application_for(
        &self,
        student: &StudentId,
        posting: &PostingId,
    ) -> Result<Option<Application>, RepositoryError>;
    fn transition_application(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: Application,
    ) -> Result<Application, RepositoryError>;
    fn selected_count(&self, posting: &PostingId) -> Result<u32, RepositoryError>;

    // eligibility audit log (append-only)
    fn append_eligibility(
        &self,
        record: EligibilityRecord,
    ) -> Result<EligibilityRecord, RepositoryError>;
    fn latest_eligibility(
        &self,
        student: &StudentId,
    ) -> Result<Option<EligibilityRecord>, RepositoryError>;

    // co-op records
    fn insert_coop_record(&self, record: CoopRecord) -> Result<CoopRecord, RepositoryError>;
    fn coop_record(&self, id: &CoopRecordId) -> Result<Option<CoopRecord>, RepositoryError>;
    fn transition_coop_record(
        &self,
        id: &CoopRecordId,
        expected: CoopRecordStatus,
        next: CoopRecord,
    ) -> Result<CoopRecord, RepositoryError>;
    fn coop_records_for_students(
        &self,
        students: &[StudentId],
    ) -> Result<Vec<CoopRecord>, RepositoryError>;
}

/// Error enumeration for record store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("stored state no longer matches the expected state")]
    StaleState,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Event published when an employer selects an applicant. Carries the
/// eligibility flag so the notification policy ("mail eligible selected
/// students") lives in the consumer rather than in the workflow engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantSelected {
    pub application: ApplicationId,
    pub student: StudentId,
    pub eligible: bool,
    pub details: BTreeMap<String, String>,
}

/// Trait describing the best-effort outbound notification hook (simulated
/// e-mail). Delivery is fire-and-forget: implementations may fail, and the
/// workflow engine never lets such a failure roll back a transition.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, event: ApplicantSelected) -> Result<(), NotificationError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
