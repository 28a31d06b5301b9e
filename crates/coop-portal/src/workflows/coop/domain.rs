use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifier wrapper for registered students (`STU-2025-0001` format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub String);

/// Identifier wrapper for employer accounts (`EMP-…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployerId(pub String);

/// Identifier wrapper for job postings (`POS-…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostingId(pub String);

/// Identifier wrapper for faculty co-op coordinators (`FAC-…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacultyId(pub String);

/// Identifier wrapper for submitted applications (`APP-…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for eligibility evaluations (`ELG-…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EligibilityId(pub String);

/// Identifier wrapper for co-op experience records (`COOP-…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoopRecordId(pub String);

/// Raw co-op metrics as recorded on the student profile.
///
/// Values stay optional and signed so that the eligibility engine — not the
/// storage layer — decides what counts as malformed. A metric that was never
/// recorded is `None`; the engine rejects it instead of treating it as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoopMetrics {
    pub gpa: Option<f32>,
    pub internship_weeks: Option<i32>,
    pub work_hours: Option<i32>,
}

/// Student profile snapshot used across the co-op workflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub department: String,
    pub major: String,
    pub metrics: CoopMetrics,
    /// Set once the student declares interest in receiving co-op credit;
    /// gates the summary-submission transition.
    pub credit_interest: bool,
}

/// Employer account owning zero or more job postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employer {
    pub id: EmployerId,
    pub company_name: String,
    pub email: String,
}

/// Advertised position a student can apply to. Only the ownership reference
/// and remaining capacity matter to the workflow engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: PostingId,
    pub employer: EmployerId,
    pub title: String,
    pub slots: u32,
}

/// Faculty co-op coordinator. At most one active coordinator exists per
/// department; the record store enforces that as a uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyCoordinator {
    pub id: FacultyId,
    pub name: String,
    pub email: String,
    pub department: String,
}

/// Lifecycle states of an application. `Selected` and `Rejected` are
/// terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Selected,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Selected | ApplicationStatus::Rejected
        )
    }
}

/// A student's application to one posting. Exactly one exists per
/// (student, posting) pair; applications are never deleted, only terminally
/// stated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub student: StudentId,
    pub posting: PostingId,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

/// Lifecycle states of a co-op experience record. `Graded` is terminal and
/// immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoopRecordStatus {
    Active,
    SummarySubmitted,
    Approved,
    Graded,
}

impl CoopRecordStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CoopRecordStatus::Active => "active",
            CoopRecordStatus::SummarySubmitted => "summary_submitted",
            CoopRecordStatus::Approved => "approved",
            CoopRecordStatus::Graded => "graded",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, CoopRecordStatus::Graded)
    }
}

/// Letter grade assigned by the faculty coordinator once a summary has been
/// approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    pub const fn label(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
        }
    }
}

/// Raised when a grade value outside the A–E scale is supplied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("grade must be a letter between A and E (found {0:?})")]
pub struct InvalidGrade(pub String);

impl FromStr for Grade {
    type Err = InvalidGrade;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "A" | "a" => Ok(Grade::A),
            "B" | "b" => Ok(Grade::B),
            "C" | "c" => Ok(Grade::C),
            "D" | "d" => Ok(Grade::D),
            "E" | "e" => Ok(Grade::E),
            other => Err(InvalidGrade(other.to_string())),
        }
    }
}

/// The co-op experience record created when an application is selected.
/// Retained forever; terminal states are kept for the academic audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoopRecord {
    pub id: CoopRecordId,
    pub application: ApplicationId,
    pub student: StudentId,
    pub posting: PostingId,
    /// The unique coordinator of the student's department at creation time.
    /// `None` when the department had no coordinator; such records cannot be
    /// approved or graded until one exists.
    pub coordinator: Option<FacultyId>,
    pub status: CoopRecordStatus,
    pub summary: Option<String>,
    pub summary_submitted_at: Option<DateTime<Utc>>,
    pub grade: Option<Grade>,
    pub updated_at: DateTime<Utc>,
}

/// The three objective metrics the eligibility rule examines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Gpa,
    InternshipWeeks,
    WorkHours,
}

impl MetricKind {
    pub const fn label(self) -> &'static str {
        match self {
            MetricKind::Gpa => "gpa",
            MetricKind::InternshipWeeks => "internship_weeks",
            MetricKind::WorkHours => "work_hours",
        }
    }
}
