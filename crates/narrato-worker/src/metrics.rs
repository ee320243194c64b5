//! Job metrics.
//!
//! Recorded through the `metrics` facade; the API binary installs the
//! Prometheus recorder. Without a recorder these calls are no-ops.

use std::time::Duration;

use metrics::{counter, histogram};

pub mod names {
    pub const JOBS_COMPLETED_TOTAL: &str = "narrato_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "narrato_jobs_failed_total";
    pub const STAGE_DURATION_SECONDS: &str = "narrato_stage_duration_seconds";
    pub const NOTIFICATIONS_FAILED_TOTAL: &str = "narrato_notifications_failed_total";
}

pub fn record_stage_duration(stage: &'static str, elapsed: Duration) {
    histogram!(names::STAGE_DURATION_SECONDS, "stage" => stage).record(elapsed.as_secs_f64());
}

pub fn record_job_completed() {
    counter!(names::JOBS_COMPLETED_TOTAL).increment(1);
}

pub fn record_job_failed(stage: &'static str) {
    counter!(names::JOBS_FAILED_TOTAL, "stage" => stage).increment(1);
}

pub fn record_notification_failed() {
    counter!(names::NOTIFICATIONS_FAILED_TOTAL).increment(1);
}
