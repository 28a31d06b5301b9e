mod config;
mod rules;

pub use config::EligibilityConfig;

use super::domain::{CoopMetrics, EligibilityId, MetricKind, StudentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stateless evaluator applying the eligibility thresholds to a student's
/// recorded metrics.
///
/// The evaluation is pure and side-effect free so it can be re-run on demand
/// (eligibility preview) as well as automatically when an employer selects
/// an applicant.
pub struct EligibilityEngine {
    config: EligibilityConfig,
}

impl EligibilityEngine {
    pub fn new(config: EligibilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    /// Validate raw student metrics, rejecting absent, negative, or
    /// out-of-range values instead of coercing them to zero.
    pub fn validate(&self, raw: &CoopMetrics) -> Result<ValidatedMetrics, InvalidMetric> {
        let gpa = raw.gpa.ok_or(InvalidMetric::Missing(MetricKind::Gpa))?;
        if !gpa.is_finite() || !(0.0..=4.0).contains(&gpa) {
            return Err(InvalidMetric::GpaOutOfRange { found: gpa });
        }

        let internship_weeks = raw
            .internship_weeks
            .ok_or(InvalidMetric::Missing(MetricKind::InternshipWeeks))?;
        if internship_weeks < 0 {
            return Err(InvalidMetric::Negative {
                metric: MetricKind::InternshipWeeks,
                found: internship_weeks,
            });
        }

        let work_hours = raw
            .work_hours
            .ok_or(InvalidMetric::Missing(MetricKind::WorkHours))?;
        if work_hours < 0 {
            return Err(InvalidMetric::Negative {
                metric: MetricKind::WorkHours,
                found: work_hours,
            });
        }

        Ok(ValidatedMetrics {
            gpa,
            internship_weeks: internship_weeks as u32,
            work_hours: work_hours as u32,
        })
    }

    /// Classify a student's metrics, returning the verdict together with the
    /// per-metric check trail.
    pub fn evaluate(&self, raw: &CoopMetrics) -> Result<EligibilityAssessment, InvalidMetric> {
        let metrics = self.validate(raw)?;
        let checks = rules::run_checks(&metrics, &self.config);
        let failed_metrics: Vec<MetricKind> = checks
            .iter()
            .filter(|check| !check.passed)
            .map(|check| check.metric)
            .collect();
        let verdict = if failed_metrics.is_empty() {
            EligibilityVerdict::Eligible
        } else {
            EligibilityVerdict::NotEligible
        };

        Ok(EligibilityAssessment {
            metrics,
            verdict,
            failed_metrics,
            checks,
        })
    }
}

/// Metrics after validation, as the evaluator and the audit record see them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidatedMetrics {
    pub gpa: f32,
    pub internship_weeks: u32,
    pub work_hours: u32,
}

/// Verdict of one eligibility evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityVerdict {
    Eligible,
    NotEligible,
}

impl EligibilityVerdict {
    pub const fn label(self) -> &'static str {
        match self {
            EligibilityVerdict::Eligible => "eligible",
            EligibilityVerdict::NotEligible => "not_eligible",
        }
    }
}

/// One metric's contribution to a verdict, kept so students can see exactly
/// which requirement failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCheck {
    pub metric: MetricKind,
    pub passed: bool,
    pub note: String,
}

/// Output of a single evaluation before it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityAssessment {
    pub metrics: ValidatedMetrics,
    pub verdict: EligibilityVerdict,
    pub failed_metrics: Vec<MetricKind>,
    pub checks: Vec<MetricCheck>,
}

/// Persisted snapshot of one evaluation. Immutable once created; a fresh
/// evaluation appends a new record rather than rewriting history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityRecord {
    pub id: EligibilityId,
    pub student: StudentId,
    pub metrics: ValidatedMetrics,
    pub verdict: EligibilityVerdict,
    pub failed_metrics: Vec<MetricKind>,
    pub checks: Vec<MetricCheck>,
    pub evaluated_at: DateTime<Utc>,
}

impl EligibilityRecord {
    pub fn from_assessment(
        id: EligibilityId,
        student: StudentId,
        assessment: &EligibilityAssessment,
        evaluated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            student,
            metrics: assessment.metrics,
            verdict: assessment.verdict,
            failed_metrics: assessment.failed_metrics.clone(),
            checks: assessment.checks.clone(),
            evaluated_at,
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.verdict == EligibilityVerdict::Eligible
    }
}

/// Validation errors raised before any evaluation takes place.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidMetric {
    #[error("{} has not been recorded for this student", .0.label())]
    Missing(MetricKind),
    #[error("{} cannot be negative (found {found})", .metric.label())]
    Negative { metric: MetricKind, found: i32 },
    #[error("gpa must be a finite value between 0.0 and 4.0 (found {found})")]
    GpaOutOfRange { found: f32 },
}
