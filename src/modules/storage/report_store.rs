use async_trait::async_trait;
use chrono::Timelike;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{CreateReport, Report, ReportStatus};

/// Persistence strategy for reports.
///
/// Implementations assign the report id, creation timestamp and initial
/// status. Listing order is implementation-defined; callers sort.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Short name used in logs
    fn backend_name(&self) -> &'static str;

    async fn add_report(&self, report: CreateReport) -> Result<Report>;

    async fn list_by_apartment(&self, apartment_id: &str) -> Result<Vec<Report>>;

    async fn list_all(&self) -> Result<Vec<Report>>;

    /// Returns `false` when no report carries `report_id`; nothing is
    /// written in that case.
    async fn update_status(&self, report_id: i64, status: ReportStatus) -> Result<bool>;
}

/// Current local time truncated to whole seconds
pub fn now_timestamp() -> chrono::NaiveDateTime {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Id that follows `last`, refusing to wrap around
pub fn next_id_after(last: i64) -> Result<i64> {
    last.checked_add(1)
        .ok_or_else(|| AppError::Internal(format!("Report id {} has no successor", last)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_after() {
        assert_eq!(next_id_after(0).unwrap(), 1);
        assert_eq!(next_id_after(41).unwrap(), 42);
        assert!(matches!(next_id_after(i64::MAX), Err(AppError::Internal(_))));
    }
}
