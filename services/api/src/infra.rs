use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use coop_portal::workflows::coop::{
    ApplicantSelected, Application, ApplicationId, ApplicationStatus, CoopMetrics, CoopRecord,
    CoopRecordId, CoopRecordStatus, EligibilityConfig, EligibilityRecord, Employer, EmployerId,
    FacultyCoordinator, FacultyId, JobPosting, NotificationError, NotificationPublisher,
    PostingId, RecordStore, RepositoryError, Student, StudentId,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn default_eligibility_config() -> EligibilityConfig {
    EligibilityConfig::default()
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

/// In-memory record store backing the demo and the standalone server. A
/// deployment would swap this for the university's durable store; the trait
/// keeps compare-and-set semantics either way.
#[derive(Default)]
pub(crate) struct InMemoryRecordStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryRecordStore {
    pub(crate) fn seed_student(&self, student: Student) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.students.insert(student.id.clone(), student);
    }

    pub(crate) fn seed_employer(&self, employer: Employer) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.employers.insert(employer.id.clone(), employer);
    }

    pub(crate) fn seed_posting(&self, posting: JobPosting) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.postings.insert(posting.id.clone(), posting);
    }

    pub(crate) fn seed_faculty(
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

    pub(crate) fn coop_record_for_application(
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

    pub(crate) fn eligibility_records(&self) -> Vec<EligibilityRecord> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner.eligibility.clone()
    }

    pub(crate) fn all_coop_records(&self) -> Vec<CoopRecord> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut records: Vec<CoopRecord> = inner.coop_records.values().cloned().collect();
        records.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        records
    }
}

impl RecordStore for InMemoryRecordStore {
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

/// Simulated campus mail relay. Renders the congratulation e-mail to stdout
/// for eligible selections and drops everything else, matching the portal's
/// "notify eligible selected students" policy.
#[derive(Default)]
pub(crate) struct ConsoleMailer;

impl NotificationPublisher for ConsoleMailer {
    fn publish(&self, event: ApplicantSelected) -> Result<(), NotificationError> {
        if !event.eligible {
            return Ok(());
        }

        let unknown = String::new();
        let recipient = event.details.get("recipient").unwrap_or(&unknown);
        let student = event.details.get("student").unwrap_or(&unknown);
        let position = event.details.get("position").unwrap_or(&unknown);
        let company = event.details.get("company").unwrap_or(&unknown);

        println!("========== EMAIL SENT ==========");
        println!("To: {recipient}");
        println!("Subject: Co-op Portal: you have been selected and are eligible");
        println!("Body:");
        println!("Hello {student},");
        println!("You have been selected for the position '{position}' at {company}.");
        println!("Our records show you meet the eligibility requirements for co-op credit.");
        println!("If you would like co-op credit, please log in and indicate your interest.");
        println!("================================");
        Ok(())
    }
}

pub(crate) fn seed_demo_directory(store: &InMemoryRecordStore) {
    store.seed_student(Student {
        id: StudentId("STU-2025-0001".to_string()),
        name: "Maya Torres".to_string(),
        email: "maya.torres@university.edu".to_string(),
        department: "Computer Science".to_string(),
        major: "Software Engineering".to_string(),
        metrics: CoopMetrics {
            gpa: Some(3.2),
            internship_weeks: Some(10),
            work_hours: Some(160),
        },
        credit_interest: true,
    });
    store.seed_student(Student {
        id: StudentId("STU-2025-0002".to_string()),
        name: "Dev Patel".to_string(),
        email: "dev.patel@university.edu".to_string(),
        department: "Computer Science".to_string(),
        major: "Computer Science".to_string(),
        metrics: CoopMetrics {
            gpa: Some(3.0),
            internship_weeks: Some(8),
            work_hours: Some(100),
        },
        credit_interest: true,
    });
    store.seed_student(Student {
        id: StudentId("STU-2025-0003".to_string()),
        name: "Lena Fischer".to_string(),
        email: "lena.fischer@university.edu".to_string(),
        department: "Electrical Engineering".to_string(),
        major: "Electrical Engineering".to_string(),
        metrics: CoopMetrics {
            gpa: Some(3.5),
            internship_weeks: Some(12),
            work_hours: Some(200),
        },
        credit_interest: false,
    });

    store.seed_employer(Employer {
        id: EmployerId("EMP-2025-0001".to_string()),
        company_name: "Prairie Robotics".to_string(),
        email: "recruiting@prairierobotics.example".to_string(),
    });
    store.seed_employer(Employer {
        id: EmployerId("EMP-2025-0002".to_string()),
        company_name: "Cedar Analytics".to_string(),
        email: "jobs@cedaranalytics.example".to_string(),
    });

    store.seed_posting(JobPosting {
        id: PostingId("POS-2025-0001".to_string()),
        employer: EmployerId("EMP-2025-0001".to_string()),
        title: "Controls Intern".to_string(),
        slots: 2,
    });
    store.seed_posting(JobPosting {
        id: PostingId("POS-2025-0002".to_string()),
        employer: EmployerId("EMP-2025-0002".to_string()),
        title: "Data Intern".to_string(),
        slots: 1,
    });

    store
        .seed_faculty(FacultyCoordinator {
            id: FacultyId("FAC-2025-0001".to_string()),
            name: "Dr. Rosa Alvarez".to_string(),
            email: "ralvarez@university.edu".to_string(),
            department: "Computer Science".to_string(),
        })
        .expect("one coordinator per department");
    store
        .seed_faculty(FacultyCoordinator {
            id: FacultyId("FAC-2025-0002".to_string()),
            name: "Dr. Jonas Brandt".to_string(),
            email: "jbrandt@university.edu".to_string(),
            department: "Electrical Engineering".to_string(),
        })
        .expect("one coordinator per department");
}
