use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    Application, ApplicationId, CoopRecord, CoopRecordId, EmployerId, FacultyId, Grade, PostingId,
    Student, StudentId,
};
use super::eligibility::EligibilityRecord;
use super::repository::{NotificationPublisher, RecordStore};
use super::service::{CoopError, CoopProgramService};

/// Router builder exposing the co-op decision and workflow operations to the
/// (excluded) web layer. Actor identity arrives in the request body or path;
/// the identity/session provider in front of this API is out of scope.
pub fn coop_router<S, N>(service: Arc<CoopProgramService<S, N>>) -> Router
where
    S: RecordStore + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/coop/students/:student_id/eligibility",
            post(evaluate_handler::<S, N>),
        )
        .route("/api/v1/coop/applications", post(apply_handler::<S, N>))
        .route(
            "/api/v1/coop/applications/:application_id",
            get(application_handler::<S, N>),
        )
        .route(
            "/api/v1/coop/applications/:application_id/select",
            post(select_handler::<S, N>),
        )
        .route(
            "/api/v1/coop/applications/:application_id/reject",
            post(reject_handler::<S, N>),
        )
        .route(
            "/api/v1/coop/records/:record_id",
            get(record_handler::<S, N>),
        )
        .route(
            "/api/v1/coop/records/:record_id/interest",
            post(interest_handler::<S, N>),
        )
        .route(
            "/api/v1/coop/records/:record_id/summary",
            post(summary_handler::<S, N>),
        )
        .route(
            "/api/v1/coop/records/:record_id/approve",
            post(approve_handler::<S, N>),
        )
        .route(
            "/api/v1/coop/records/:record_id/grade",
            post(grade_handler::<S, N>),
        )
        .route(
            "/api/v1/coop/faculty/:faculty_id/students",
            get(visible_students_handler::<S, N>),
        )
        .route(
            "/api/v1/coop/faculty/:faculty_id/report",
            get(report_handler::<S, N>),
        )
        .with_state(service)
}

/// Wire view of an application.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub application_id: String,
    pub student_id: String,
    pub posting_id: String,
    pub status: &'static str,
    pub applied_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

impl From<Application> for ApplicationView {
    fn from(application: Application) -> Self {
        Self {
            application_id: application.id.0,
            student_id: application.student.0,
            posting_id: application.posting.0,
            status: application.status.label(),
            applied_at: application.applied_at,
            decided_at: application.decided_at,
        }
    }
}

/// Wire view of a co-op record. Summary content is reduced to a presence
/// flag; the full text stays inside the record store.
#[derive(Debug, Clone, Serialize)]
pub struct CoopRecordView {
    pub record_id: String,
    pub application_id: String,
    pub student_id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinator_id: Option<String>,
    pub summary_submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<&'static str>,
    pub updated_at: DateTime<Utc>,
}

impl From<CoopRecord> for CoopRecordView {
    fn from(record: CoopRecord) -> Self {
        Self {
            record_id: record.id.0,
            application_id: record.application.0,
            student_id: record.student.0,
            status: record.status.label(),
            coordinator_id: record.coordinator.map(|id| id.0),
            summary_submitted: record.summary.is_some(),
            grade: record.grade.map(Grade::label),
            updated_at: record.updated_at,
        }
    }
}

/// Wire view of an eligibility evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct EligibilityView {
    pub record_id: String,
    pub student_id: String,
    pub verdict: &'static str,
    pub failed_metrics: Vec<&'static str>,
    pub gpa: f32,
    pub internship_weeks: u32,
    pub work_hours: u32,
    pub evaluated_at: DateTime<Utc>,
}

impl From<EligibilityRecord> for EligibilityView {
    fn from(record: EligibilityRecord) -> Self {
        Self {
            record_id: record.id.0,
            student_id: record.student.0,
            verdict: record.verdict.label(),
            failed_metrics: record
                .failed_metrics
                .iter()
                .map(|metric| metric.label())
                .collect(),
            gpa: record.metrics.gpa,
            internship_weeks: record.metrics.internship_weeks,
            work_hours: record.metrics.work_hours,
            evaluated_at: record.evaluated_at,
        }
    }
}

/// Wire view of a student directory entry.
#[derive(Debug, Clone, Serialize)]
pub struct StudentView {
    pub student_id: String,
    pub name: String,
    pub department: String,
    pub major: String,
    pub credit_interest: bool,
}

impl From<Student> for StudentView {
    fn from(student: Student) -> Self {
        Self {
            student_id: student.id.0,
            name: student.name,
            department: student.department,
            major: student.major,
            credit_interest: student.credit_interest,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApplyRequest {
    student_id: String,
    posting_id: String,
}

#[derive(Debug, Deserialize)]
struct EmployerDecisionRequest {
    employer_id: String,
}

#[derive(Debug, Deserialize)]
struct InterestRequest {
    student_id: String,
}

#[derive(Debug, Deserialize)]
struct SummaryRequest {
    student_id: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApproveRequest {
    faculty_id: String,
}

#[derive(Debug, Deserialize)]
struct GradeRequest {
    faculty_id: String,
    grade: String,
}

fn error_response(err: CoopError) -> Response {
    let status = match &err {
        CoopError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CoopError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        CoopError::InvalidTransition(_) => StatusCode::CONFLICT,
        CoopError::NotFound(_) => StatusCode::NOT_FOUND,
        CoopError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = axum::Json(json!({ "error": err.to_string() }));
    (status, body).into_response()
}

async fn evaluate_handler<S, N>(
    State(service): State<Arc<CoopProgramService<S, N>>>,
    Path(student_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationPublisher + 'static,
{
    match service.evaluate_eligibility(&StudentId(student_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(EligibilityView::from(record))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn apply_handler<S, N>(
    State(service): State<Arc<CoopProgramService<S, N>>>,
    axum::Json(request): axum::Json<ApplyRequest>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationPublisher + 'static,
{
    match service.apply_to_posting(
        &StudentId(request.student_id),
        &PostingId(request.posting_id),
    ) {
        Ok(application) => (
            StatusCode::CREATED,
            axum::Json(ApplicationView::from(application)),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

async fn application_handler<S, N>(
    State(service): State<Arc<CoopProgramService<S, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationPublisher + 'static,
{
    match service.application(&ApplicationId(application_id)) {
        Ok(application) => {
            (StatusCode::OK, axum::Json(ApplicationView::from(application))).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn select_handler<S, N>(
    State(service): State<Arc<CoopProgramService<S, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<EmployerDecisionRequest>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationPublisher + 'static,
{
    match service.select_applicant(
        &EmployerId(request.employer_id),
        &ApplicationId(application_id),
    ) {
        Ok(application) => {
            (StatusCode::OK, axum::Json(ApplicationView::from(application))).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn reject_handler<S, N>(
    State(service): State<Arc<CoopProgramService<S, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<EmployerDecisionRequest>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationPublisher + 'static,
{
    match service.reject_applicant(
        &EmployerId(request.employer_id),
        &ApplicationId(application_id),
    ) {
        Ok(application) => {
            (StatusCode::OK, axum::Json(ApplicationView::from(application))).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn record_handler<S, N>(
    State(service): State<Arc<CoopProgramService<S, N>>>,
    Path(record_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationPublisher + 'static,
{
    match service.coop_record(&CoopRecordId(record_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(CoopRecordView::from(record))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn interest_handler<S, N>(
    State(service): State<Arc<CoopProgramService<S, N>>>,
    Path(record_id): Path<String>,
    axum::Json(request): axum::Json<InterestRequest>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationPublisher + 'static,
{
    match service.declare_interest(&StudentId(request.student_id), &CoopRecordId(record_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(CoopRecordView::from(record))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn summary_handler<S, N>(
    State(service): State<Arc<CoopProgramService<S, N>>>,
    Path(record_id): Path<String>,
    axum::Json(request): axum::Json<SummaryRequest>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationPublisher + 'static,
{
    match service.submit_summary(
        &StudentId(request.student_id),
        &CoopRecordId(record_id),
        &request.content,
    ) {
        Ok(record) => (StatusCode::OK, axum::Json(CoopRecordView::from(record))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn approve_handler<S, N>(
    State(service): State<Arc<CoopProgramService<S, N>>>,
    Path(record_id): Path<String>,
    axum::Json(request): axum::Json<ApproveRequest>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationPublisher + 'static,
{
    match service.approve_summary(&FacultyId(request.faculty_id), &CoopRecordId(record_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(CoopRecordView::from(record))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn grade_handler<S, N>(
    State(service): State<Arc<CoopProgramService<S, N>>>,
    Path(record_id): Path<String>,
    axum::Json(request): axum::Json<GradeRequest>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationPublisher + 'static,
{
    let grade: Grade = match request.grade.parse() {
        Ok(grade) => grade,
        Err(err) => {
            return error_response(CoopError::InvalidInput(format!("{err}")));
        }
    };
    match service.assign_grade(&FacultyId(request.faculty_id), &CoopRecordId(record_id), grade) {
        Ok(record) => (StatusCode::OK, axum::Json(CoopRecordView::from(record))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn visible_students_handler<S, N>(
    State(service): State<Arc<CoopProgramService<S, N>>>,
    Path(faculty_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationPublisher + 'static,
{
    match service.list_visible_students(&FacultyId(faculty_id)) {
        Ok(students) => {
            let views: Vec<StudentView> = students.into_iter().map(StudentView::from).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn report_handler<S, N>(
    State(service): State<Arc<CoopProgramService<S, N>>>,
    Path(faculty_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
    N: NotificationPublisher + 'static,
{
    match service.department_report(&FacultyId(faculty_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}
