use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::workflows::coop::domain::{
    Application, ApplicationId, ApplicationStatus, CoopMetrics, CoopRecord, CoopRecordId,
    CoopRecordStatus, Employer, EmployerId, FacultyCoordinator, FacultyId, JobPosting, PostingId,
    Student, StudentId,
};
use crate::workflows::coop::eligibility::{EligibilityConfig, EligibilityEngine, EligibilityRecord};
use crate::workflows::coop::repository::{
    ApplicantSelected, NotificationError, NotificationPublisher, RecordStore, RepositoryError,
};
use crate::workflows::coop::service::CoopProgramService;

pub(super) const CS_DEPARTMENT: &str = "Computer Science";
pub(super) const EE_DEPARTMENT: &str = "Electrical Engineering";

pub(super) fn eligible_student() -> Student {
    Student {
        id: StudentId("STU-2025-0001".to_string()),
        name: "Maya Torres".to_string(),
        email: "maya.torres@university.edu".to_string(),
        department: CS_DEPARTMENT.to_string(),
        major: "Software Engineering".to_string(),
        metrics: CoopMetrics {
            gpa: Some(3.2),
            internship_weeks: Some(10),
            work_hours: Some(160),
        },
        credit_interest: true,
    }
}

pub(super) fn short_hours_student() -> Student {
    Student {
        id: StudentId("STU-2025-0002".to_string()),
        name: "Dev Patel".to_string(),
        email: "dev.patel@university.edu".to_string(),
        department: CS_DEPARTMENT.to_string(),
        major: "Computer Science".to_string(),
        metrics: CoopMetrics {
            gpa: Some(3.0),
            internship_weeks: Some(8),
            work_hours: Some(100),
        },
        credit_interest: true,
    }
}

pub(super) fn ee_student() -> Student {
    Student {
        id: StudentId("STU-2025-0003".to_string()),
        name: "Lena Fischer".to_string(),
        email: "lena.fischer@university.edu".to_string(),
        department: EE_DEPARTMENT.to_string(),
        major: "Electrical Engineering".to_string(),
        metrics: CoopMetrics {
            gpa: Some(3.5),
            internship_weeks: Some(12),
            work_hours: Some(200),
        },
        credit_interest: false,
    }
}

pub(super) fn robotics_employer() -> Employer {
    Employer {
        id: EmployerId("EMP-2025-0001".to_string()),
        company_name: "Prairie Robotics".to_string(),
        email: "recruiting@prairierobotics.example".to_string(),
    }
}

pub(super) fn analytics_employer() -> Employer {
    Employer {
        id: EmployerId("EMP-2025-0002".to_string()),
        company_name: "Cedar Analytics".to_string(),
        email: "jobs@cedaranalytics.example".to_string(),
    }
}

pub(super) fn controls_posting() -> JobPosting {
    JobPosting {
        id: PostingId("POS-2025-0001".to_string()),
        employer: robotics_employer().id,
        title: "Controls Intern".to_string(),
        slots: 2,
    }
}

pub(super) fn single_slot_posting() -> JobPosting {
    JobPosting {
        id: PostingId("POS-2025-0002".to_string()),
        employer: robotics_employer().id,
        title: "Test Engineering Intern".to_string(),
        slots: 1,
    }
}

pub(super) fn data_posting() -> JobPosting {
    JobPosting {
        id: PostingId("POS-2025-0003".to_string()),
        employer: analytics_employer().id,
        title: "Data Intern".to_string(),
        slots: 1,
    }
}

pub(super) fn cs_coordinator() -> FacultyCoordinator {
    FacultyCoordinator {
        id: FacultyId("FAC-2025-0001".to_string()),
        name: "Dr. Rosa Alvarez".to_string(),
        email: "ralvarez@university.edu".to_string(),
        department: CS_DEPARTMENT.to_string(),
    }
}

pub(super) fn ee_coordinator() -> FacultyCoordinator {
    FacultyCoordinator {
        id: FacultyId("FAC-2025-0002".to_string()),
        name: "Dr. Jonas Brandt".to_string(),
        email: "jbrandt@university.edu".to_string(),
        department: EE_DEPARTMENT.to_string(),
    }
}

pub(super) fn eligibility_config() -> EligibilityConfig {
    EligibilityConfig::default()
}

pub(super) fn eligibility_engine() -> EligibilityEngine {
    EligibilityEngine::new(eligibility_config())
}

pub(super) fn build_service() -> (
    CoopProgramService<MemoryStore, MemoryNotifier>,
    Arc<MemoryStore>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(MemoryStore::default());
    seed_directory(&store);
    let notifier = Arc::new(MemoryNotifier::default());
    let service = CoopProgramService::new(store.clone(), notifier.clone(), eligibility_config());
    (service, store, notifier)
}

pub(super) fn seed_directory(store: &MemoryStore) {
    store.seed_student(eligible_student());
    store.seed_student(short_hours_student());
    store.seed_student(ee_student());
    store.seed_employer(robotics_employer());
    store.seed_employer(analytics_employer());
    store.seed_posting(controls_posting());
    store.seed_posting(single_slot_posting());
    store.seed_posting(data_posting());
    store
        .seed_faculty(cs_coordinator())
        .expect("one coordinator per department");
    store
        .seed_faculty(ee_coordinator())
        .expect("one coordinator per department");
}

/// Apply and select in one step, returning the application and the co-op
/// record the selection opened.
pub(super) fn select_into_coop(
    service: &CoopProgramService<MemoryStore, MemoryNotifier>,
    store: &MemoryStore,
    student: &Student,
    posting: &JobPosting,
    employer: &Employer,
) -> (Application, CoopRecord) {
    let application = service
        .apply_to_posting(&student.id, &posting.id)
        .expect("application created");
    let selected = service
        .select_applicant(&employer.id, &application.id)
        .expect("selection succeeds");
    let record = store
        .coop_record_for_application(&selected.id)
        .expect("co-op record created");
    (selected, record)
}

#[derive(Default)]
struct StoreInner {
    students: HashMap<StudentId, Student>,
    employers: HashMap<EmployerId, Employer>,
    postings: HashMap<PostingId, JobPosting>,
    faculty: HashMap<FacultyId, FacultyCoordinator>,
    applications: HashMap<ApplicationId, Application>,
    eligibility: Vec<EligibilityRecord>,
    coop_records: HashMap<CoopRecordId, CoopRecord>,
}

/// In-memory record store with compare-and-set transitions, mirroring the
/// isolation the durable store provides in production.
#[derive(Default)]
pub(super) struct MemoryStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    pub(super) fn seed_student(&self, student: Student) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.students.insert(student.id.clone(), student);
    }

    pub(super) fn seed_employer(&self, employer: Employer) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.employers.insert(employer.id.clone(), employer);
    }

    pub(super) fn seed_posting(&self, posting: JobPosting) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.postings.insert(posting.id.clone(), posting);
    }

    /// Seed a coordinator, honoring the one-per-department uniqueness
    /// constraint the durable store enforces.
    pub(super) fn seed_faculty(
        &self,
        coordinator: FacultyCoordinator,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner
            .faculty
            .values()
            .any(|existing| existing.department == coordinator.department)
        {
            return Err(RepositoryError::Conflict);
        }
        inner.faculty.insert(coordinator.id.clone(), coordinator);
        Ok(())
    }

    pub(super) fn remove_faculty(&self, id: &FacultyId) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.faculty.remove(id);
    }

    pub(super) fn coop_record_for_application(
        &self,
        application: &ApplicationId,
    ) -> Option<CoopRecord> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner
            .coop_records
            .values()
            .find(|record| record.application == *application)
            .cloned()
    }

    pub(super) fn eligibility_records(&self) -> Vec<EligibilityRecord> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner.eligibility.clone()
    }

    pub(super) fn coop_record_count(&self) -> usize {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner.coop_records.len()
    }
}

impl RecordStore for MemoryStore {
    fn student(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.students.get(id).cloned())
    }

    fn update_student(&self, student: Student) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if !inner.students.contains_key(&student.id) {
            return Err(RepositoryError::NotFound);
        }
        inner.students.insert(student.id.clone(), student);
        Ok(())
    }

    fn students_in_department(&self, department: &str) -> Result<Vec<Student>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .students
            .values()
            .filter(|student| student.department == department)
            .cloned()
            .collect())
    }

    fn employer(&self, id: &EmployerId) -> Result<Option<Employer>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.employers.get(id).cloned())
    }

    fn posting(&self, id: &PostingId) -> Result<Option<JobPosting>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.postings.get(id).cloned())
    }

    fn faculty(&self, id: &FacultyId) -> Result<Option<FacultyCoordinator>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.faculty.get(id).cloned())
    }

    fn coordinator_for_department(
        &self,
        department: &str,
    ) -> Result<Option<FacultyCoordinator>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .faculty
            .values()
            .find(|coordinator| coordinator.department == department)
            .cloned())
    }

    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner.applications.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        if inner.applications.values().any(|existing| {
            existing.student == application.student && existing.posting == application.posting
        }) {
            return Err(RepositoryError::Conflict);
        }
        inner
            .applications
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.applications.get(id).cloned())
    }

    fn application_for(
        &self,
        student: &StudentId,
        posting: &PostingId,
    ) -> Result<Option<Application>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .applications
            .values()
            .find(|application| application.student == *student && application.posting == *posting)
            .cloned())
    }

    fn transition_application(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: Application,
    ) -> Result<Application, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let current = inner.applications.get(id).ok_or(RepositoryError::NotFound)?;
        if current.status != expected {
            return Err(RepositoryError::StaleState);
        }
        inner.applications.insert(id.clone(), next.clone());
        Ok(next)
    }

    fn selected_count(&self, posting: &PostingId) -> Result<u32, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .applications
            .values()
            .filter(|application| {
                application.posting == *posting
                    && application.status == ApplicationStatus::Selected
            })
            .count() as u32)
    }

    fn append_eligibility(
        &self,
        record: EligibilityRecord,
    ) -> Result<EligibilityRecord, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.eligibility.push(record.clone());
        Ok(record)
    }

    fn latest_eligibility(
        &self,
        student: &StudentId,
    ) -> Result<Option<EligibilityRecord>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .eligibility
            .iter()
            .rev()
            .find(|record| record.student == *student)
            .cloned())
    }

    fn insert_coop_record(&self, record: CoopRecord) -> Result<CoopRecord, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner.coop_records.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        inner.coop_records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn coop_record(&self, id: &CoopRecordId) -> Result<Option<CoopRecord>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.coop_records.get(id).cloned())
    }

    fn transition_coop_record(
        &self,
        id: &CoopRecordId,
        expected: CoopRecordStatus,
        next: CoopRecord,
    ) -> Result<CoopRecord, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let current = inner.coop_records.get(id).ok_or(RepositoryError::NotFound)?;
        if current.status != expected {
            return Err(RepositoryError::StaleState);
        }
        inner.coop_records.insert(id.clone(), next.clone());
        Ok(next)
    }

    fn coop_records_for_students(
        &self,
        students: &[StudentId],
    ) -> Result<Vec<CoopRecord>, RepositoryError> {
        let wanted: HashSet<&StudentId> = students.iter().collect();
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .coop_records
            .values()
            .filter(|record| wanted.contains(&record.student))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    events: Mutex<Vec<ApplicantSelected>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<ApplicantSelected> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryNotifier {
    fn publish(&self, event: ApplicantSelected) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(event);
        Ok(())
    }
}

/// Notifier whose transport always fails, for checking that selections never
/// roll back on notification errors.
pub(super) struct FailingNotifier;

impl NotificationPublisher for FailingNotifier {
    fn publish(&self, _event: ApplicantSelected) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay offline".to_string()))
    }
}
