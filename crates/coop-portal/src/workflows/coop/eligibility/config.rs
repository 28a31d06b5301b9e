use serde::{Deserialize, Serialize};

/// Threshold configuration for the co-op eligibility rule.
///
/// All three thresholds are inclusive: a student sitting exactly on a
/// boundary passes that metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityConfig {
    pub minimum_gpa: f32,
    pub minimum_internship_weeks: u32,
    pub minimum_work_hours: u32,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            minimum_gpa: 2.0,
            minimum_internship_weeks: 7,
            minimum_work_hours: 140,
        }
    }
}
