use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Datelike, Utc};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, CoopRecord, CoopRecordId, CoopRecordStatus,
    EligibilityId, EmployerId, FacultyId, Grade, PostingId, Student, StudentId,
};
use super::eligibility::{EligibilityConfig, EligibilityEngine, EligibilityRecord};
use super::report::{self, DepartmentReport};
use super::repository::{
    ApplicantSelected, NotificationPublisher, RecordStore, RepositoryError,
};
use super::visibility;

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ELIGIBILITY_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static COOP_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_id(prefix: &str, sequence: &AtomicU64) -> String {
    let seq = sequence.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{seq:04}", Utc::now().year())
}

/// Service composing the record store, the eligibility engine, and the
/// notification hook into the co-op program's decision and workflow engine.
///
/// Every operation checks, in order: referenced entities exist, the actor
/// owns or is scoped to the target, inputs are well formed, and the
/// requested transition is legal — before any mutation. Permission is
/// checked ahead of transition legality so an unauthorized actor cannot
/// probe a record's state through the error it receives.
pub struct CoopProgramService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    engine: EligibilityEngine,
}

impl<S, N> CoopProgramService<S, N>
where
    S: RecordStore + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, config: EligibilityConfig) -> Self {
        Self {
            store,
            notifier,
            engine: EligibilityEngine::new(config),
        }
    }

    /// Run the eligibility rule on demand and persist the outcome as a new
    /// audit record.
    pub fn evaluate_eligibility(
        &self,
        student_id: &StudentId,
    ) -> Result<EligibilityRecord, CoopError> {
        let student = self
            .store
            .student(student_id)?
            .ok_or(CoopError::NotFound("student"))?;

        let assessment = self
            .engine
            .evaluate(&student.metrics)
            .map_err(|err| CoopError::InvalidInput(err.to_string()))?;

        let record = EligibilityRecord::from_assessment(
            EligibilityId(next_id("ELG", &ELIGIBILITY_SEQUENCE)),
            student.id,
            &assessment,
            Utc::now(),
        );
        Ok(self.store.append_eligibility(record)?)
    }

    /// Create the `Pending` application for a (student, posting) pair.
    pub fn apply_to_posting(
        &self,
        student_id: &StudentId,
        posting_id: &PostingId,
    ) -> Result<Application, CoopError> {
        let student = self
            .store
            .student(student_id)?
            .ok_or(CoopError::NotFound("student"))?;
        let posting = self
            .store
            .posting(posting_id)?
            .ok_or(CoopError::NotFound("job posting"))?;

        if self
            .store
            .application_for(&student.id, &posting.id)?
            .is_some()
        {
            return Err(CoopError::InvalidInput(
                "an application for this posting already exists".to_string(),
            ));
        }

        let application = Application {
            id: ApplicationId(next_id("APP", &APPLICATION_SEQUENCE)),
            student: student.id,
            posting: posting.id,
            status: ApplicationStatus::Pending,
            applied_at: Utc::now(),
            decided_at: None,
        };
        Ok(self.store.insert_application(application)?)
    }

    /// Employer selects an applicant: `Pending -> Selected`, snapshotting an
    /// eligibility verdict, opening the co-op record, and publishing the
    /// selection event. Eligibility informs but never blocks the selection.
    pub fn select_applicant(
        &self,
        employer_id: &EmployerId,
        application_id: &ApplicationId,
    ) -> Result<Application, CoopError> {
        let application = self
            .store
            .application(application_id)?
            .ok_or(CoopError::NotFound("application"))?;
        let employer = self
            .store
            .employer(employer_id)?
            .ok_or(CoopError::NotFound("employer"))?;
        let posting = self
            .store
            .posting(&application.posting)?
            .ok_or(CoopError::NotFound("job posting"))?;

        if posting.employer != employer.id {
            return Err(CoopError::PermissionDenied(
                "only the employer that owns the posting may decide its applications".to_string(),
            ));
        }

        let student = self
            .store
            .student(&application.student)?
            .ok_or(CoopError::NotFound("student"))?;

        // Fail fast on malformed metrics before any state is touched, so a
        // successful selection always leaves exactly one eligibility record.
        let assessment = self
            .engine
            .evaluate(&student.metrics)
            .map_err(|err| CoopError::InvalidInput(err.to_string()))?;

        if application.status != ApplicationStatus::Pending {
            return Err(CoopError::InvalidTransition(format!(
                "application is already {}",
                application.status.label()
            )));
        }
        if self.store.selected_count(&posting.id)? >= posting.slots {
            return Err(CoopError::InvalidTransition(
                "job posting has no remaining capacity".to_string(),
            ));
        }

        let now = Utc::now();
        let mut selected = application.clone();
        selected.status = ApplicationStatus::Selected;
        selected.decided_at = Some(now);
        let selected =
            self.store
                .transition_application(application_id, ApplicationStatus::Pending, selected)?;

        let eligibility = EligibilityRecord::from_assessment(
            EligibilityId(next_id("ELG", &ELIGIBILITY_SEQUENCE)),
            student.id.clone(),
            &assessment,
            now,
        );
        let eligible = eligibility.is_eligible();
        self.store.append_eligibility(eligibility)?;

        let coordinator = self
            .store
            .coordinator_for_department(&student.department)?
            .map(|coordinator| coordinator.id);
        let record = CoopRecord {
            id: CoopRecordId(next_id("COOP", &COOP_SEQUENCE)),
            application: selected.id.clone(),
            student: student.id.clone(),
            posting: posting.id.clone(),
            coordinator,
            status: CoopRecordStatus::Active,
            summary: None,
            summary_submitted_at: None,
            grade: None,
            updated_at: now,
        };
        self.store.insert_coop_record(record)?;

        let mut details = BTreeMap::new();
        details.insert("recipient".to_string(), student.email.clone());
        details.insert("student".to_string(), student.name.clone());
        details.insert("position".to_string(), posting.title.clone());
        details.insert("company".to_string(), employer.company_name.clone());
        let event = ApplicantSelected {
            application: selected.id.clone(),
            student: student.id.clone(),
            eligible,
            details,
        };
        if let Err(err) = self.notifier.publish(event) {
            tracing::warn!(
                error = %err,
                application = %selected.id.0,
                "selection notification dropped"
            );
        }

        Ok(selected)
    }

    /// Employer rejects an applicant: `Pending -> Rejected`, no side effects.
    pub fn reject_applicant(
        &self,
        employer_id: &EmployerId,
        application_id: &ApplicationId,
    ) -> Result<Application, CoopError> {
        let application = self
            .store
            .application(application_id)?
            .ok_or(CoopError::NotFound("application"))?;
        let employer = self
            .store
            .employer(employer_id)?
            .ok_or(CoopError::NotFound("employer"))?;
        let posting = self
            .store
            .posting(&application.posting)?
            .ok_or(CoopError::NotFound("job posting"))?;

        if posting.employer != employer.id {
            return Err(CoopError::PermissionDenied(
                "only the employer that owns the posting may decide its applications".to_string(),
            ));
        }
        if application.status != ApplicationStatus::Pending {
            return Err(CoopError::InvalidTransition(format!(
                "application is already {}",
                application.status.label()
            )));
        }

        let mut rejected = application;
        rejected.status = ApplicationStatus::Rejected;
        rejected.decided_at = Some(Utc::now());
        Ok(self.store.transition_application(
            application_id,
            ApplicationStatus::Pending,
            rejected,
        )?)
    }

    /// Student declares interest in co-op credit for a selected experience.
    /// Requires an `Eligible` verdict on file for the student.
    pub fn declare_interest(
        &self,
        student_id: &StudentId,
        record_id: &CoopRecordId,
    ) -> Result<CoopRecord, CoopError> {
        let record = self
            .store
            .coop_record(record_id)?
            .ok_or(CoopError::NotFound("co-op record"))?;
        if record.student != *student_id {
            return Err(CoopError::PermissionDenied(
                "only the student who owns the co-op record may declare interest".to_string(),
            ));
        }
        let mut student = self
            .store
            .student(student_id)?
            .ok_or(CoopError::NotFound("student"))?;

        let eligible = self
            .store
            .latest_eligibility(student_id)?
            .map(|latest| latest.is_eligible())
            .unwrap_or(false);
        if !eligible {
            return Err(CoopError::InvalidTransition(
                "co-op credit requires an eligible evaluation on file".to_string(),
            ));
        }

        if !student.credit_interest {
            student.credit_interest = true;
            self.store.update_student(student)?;
        }
        Ok(record)
    }

    /// Student submits (or resubmits) the work summary. Resubmission is a
    /// self-loop on `SummarySubmitted` that replaces the stored content.
    pub fn submit_summary(
        &self,
        student_id: &StudentId,
        record_id: &CoopRecordId,
        content: &str,
    ) -> Result<CoopRecord, CoopError> {
        let record = self
            .store
            .coop_record(record_id)?
            .ok_or(CoopError::NotFound("co-op record"))?;
        if record.student != *student_id {
            return Err(CoopError::PermissionDenied(
                "only the student who owns the co-op record may submit its summary".to_string(),
            ));
        }
        let student = self
            .store
            .student(student_id)?
            .ok_or(CoopError::NotFound("student"))?;

        let content = content.trim();
        if content.is_empty() {
            return Err(CoopError::InvalidInput(
                "summary content must not be empty".to_string(),
            ));
        }
        if !student.credit_interest {
            return Err(CoopError::InvalidTransition(
                "co-op credit interest has not been declared".to_string(),
            ));
        }
        match record.status {
            CoopRecordStatus::Active | CoopRecordStatus::SummarySubmitted => {}
            other => {
                return Err(CoopError::InvalidTransition(format!(
                    "summary cannot be submitted while the record is {}",
                    other.label()
                )))
            }
        }

        let now = Utc::now();
        let mut next = record.clone();
        next.status = CoopRecordStatus::SummarySubmitted;
        next.summary = Some(content.to_string());
        next.summary_submitted_at = Some(now);
        next.updated_at = now;
        Ok(self
            .store
            .transition_coop_record(record_id, record.status, next)?)
    }

    /// Department coordinator approves a submitted summary.
    pub fn approve_summary(
        &self,
        faculty_id: &FacultyId,
        record_id: &CoopRecordId,
    ) -> Result<CoopRecord, CoopError> {
        let record = self
            .store
            .coop_record(record_id)?
            .ok_or(CoopError::NotFound("co-op record"))?;
        let faculty = self
            .store
            .faculty(faculty_id)?
            .ok_or(CoopError::NotFound("faculty coordinator"))?;
        let student = self
            .store
            .student(&record.student)?
            .ok_or(CoopError::NotFound("student"))?;

        if !visibility::can_access(&faculty, &student) {
            return Err(CoopError::PermissionDenied(
                "co-op records are visible only to the coordinator of the student's department"
                    .to_string(),
            ));
        }
        if record.status != CoopRecordStatus::SummarySubmitted {
            return Err(CoopError::InvalidTransition(format!(
                "summary cannot be approved while the record is {}",
                record.status.label()
            )));
        }

        let mut next = record.clone();
        next.status = CoopRecordStatus::Approved;
        next.coordinator = Some(faculty.id);
        next.updated_at = Utc::now();
        Ok(self
            .store
            .transition_coop_record(record_id, record.status, next)?)
    }

    /// Department coordinator assigns the final grade. `Graded` is terminal;
    /// the record is immutable afterwards.
    pub fn assign_grade(
        &self,
        faculty_id: &FacultyId,
        record_id: &CoopRecordId,
        grade: Grade,
    ) -> Result<CoopRecord, CoopError> {
        let record = self
            .store
            .coop_record(record_id)?
            .ok_or(CoopError::NotFound("co-op record"))?;
        let faculty = self
            .store
            .faculty(faculty_id)?
            .ok_or(CoopError::NotFound("faculty coordinator"))?;
        let student = self
            .store
            .student(&record.student)?
            .ok_or(CoopError::NotFound("student"))?;

        if !visibility::can_access(&faculty, &student) {
            return Err(CoopError::PermissionDenied(
                "co-op records are visible only to the coordinator of the student's department"
                    .to_string(),
            ));
        }
        if record.status != CoopRecordStatus::Approved {
            return Err(CoopError::InvalidTransition(format!(
                "a grade cannot be assigned while the record is {}",
                record.status.label()
            )));
        }

        let mut next = record.clone();
        next.status = CoopRecordStatus::Graded;
        next.grade = Some(grade);
        next.coordinator = Some(faculty.id);
        next.updated_at = Utc::now();
        Ok(self
            .store
            .transition_coop_record(record_id, record.status, next)?)
    }

    /// Students visible to one coordinator: exactly those in the
    /// coordinator's department. An out-of-scope coordinator sees an empty
    /// list, not an error.
    pub fn list_visible_students(
        &self,
        faculty_id: &FacultyId,
    ) -> Result<Vec<Student>, CoopError> {
        let faculty = self
            .store
            .faculty(faculty_id)?
            .ok_or(CoopError::NotFound("faculty coordinator"))?;

        let mut students = self.store.students_in_department(&faculty.department)?;
        students.retain(|student| visibility::can_access(&faculty, student));
        students.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(students)
    }

    /// Dashboard counts over the records visible to one coordinator.
    pub fn department_report(
        &self,
        faculty_id: &FacultyId,
    ) -> Result<DepartmentReport, CoopError> {
        let faculty = self
            .store
            .faculty(faculty_id)?
            .ok_or(CoopError::NotFound("faculty coordinator"))?;
        let students = self.list_visible_students(faculty_id)?;
        let ids: Vec<StudentId> = students.iter().map(|student| student.id.clone()).collect();
        let records = self.store.coop_records_for_students(&ids)?;
        Ok(report::build_report(&faculty.department, &students, &records))
    }

    /// Fetch one co-op record for status views.
    pub fn coop_record(&self, record_id: &CoopRecordId) -> Result<CoopRecord, CoopError> {
        self.store
            .coop_record(record_id)?
            .ok_or(CoopError::NotFound("co-op record"))
    }

    /// Fetch one application for status views.
    pub fn application(&self, application_id: &ApplicationId) -> Result<Application, CoopError> {
        self.store
            .application(application_id)?
            .ok_or(CoopError::NotFound("application"))
    }
}

/// Error raised by the co-op program service. The four categories mirror
/// what the web layer reports to callers; store infrastructure failures pass
/// through as `Store`.
#[derive(Debug, thiserror::Error)]
pub enum CoopError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Store(RepositoryError),
}

impl From<RepositoryError> for CoopError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::StaleState => CoopError::InvalidTransition(
                "record state changed while the command was in flight".to_string(),
            ),
            RepositoryError::NotFound => CoopError::NotFound("record"),
            other => CoopError::Store(other),
        }
    }
}
