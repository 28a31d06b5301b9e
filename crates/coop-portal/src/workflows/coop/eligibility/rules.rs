use super::super::domain::MetricKind;
use super::config::EligibilityConfig;
use super::{MetricCheck, ValidatedMetrics};

pub(crate) fn run_checks(
    metrics: &ValidatedMetrics,
    config: &EligibilityConfig,
) -> Vec<MetricCheck> {
    let mut checks = Vec::with_capacity(3);

    let gpa_passed = metrics.gpa >= config.minimum_gpa;
    checks.push(MetricCheck {
        metric: MetricKind::Gpa,
        passed: gpa_passed,
        note: if gpa_passed {
            format!(
                "gpa {:.2} meets minimum {:.2}",
                metrics.gpa, config.minimum_gpa
            )
        } else {
            format!(
                "gpa {:.2} below minimum {:.2}",
                metrics.gpa, config.minimum_gpa
            )
        },
    });

    let weeks_passed = metrics.internship_weeks >= config.minimum_internship_weeks;
    checks.push(MetricCheck {
        metric: MetricKind::InternshipWeeks,
        passed: weeks_passed,
        note: if weeks_passed {
            format!(
                "{} week(s) of internship meets minimum {}",
                metrics.internship_weeks, config.minimum_internship_weeks
            )
        } else {
            format!(
                "{} week(s) of internship below minimum {}",
                metrics.internship_weeks, config.minimum_internship_weeks
            )
        },
    });

    let hours_passed = metrics.work_hours >= config.minimum_work_hours;
    checks.push(MetricCheck {
        metric: MetricKind::WorkHours,
        passed: hours_passed,
        note: if hours_passed {
            format!(
                "{} work hour(s) meets minimum {}",
                metrics.work_hours, config.minimum_work_hours
            )
        } else {
            format!(
                "{} work hour(s) below minimum {}",
                metrics.work_hours, config.minimum_work_hours
            )
        },
    });

    checks
}
