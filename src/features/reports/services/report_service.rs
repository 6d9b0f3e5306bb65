use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{Report, ReportDraft, ReportStatus};
use crate::modules::storage::{now_timestamp, PhotoStore, PhotoUpload, ReportStore};
use crate::shared::validation::timestamped_photo_name;

/// A photo as received from the browser, before it is renamed and stored
#[derive(Debug, Clone)]
pub struct IncomingPhoto {
    pub original_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Service for report operations
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    photos: Arc<dyn PhotoStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStore>, photos: Arc<dyn PhotoStore>) -> Self {
        Self { store, photos }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Persist a completed draft.
    ///
    /// A draft without details is refused before any photo is stored. A
    /// photo that cannot be stored is dropped with a warning; the report is
    /// still saved without it.
    pub async fn submit(&self, draft: ReportDraft, photo: Option<IncomingPhoto>) -> Result<Report> {
        if !draft.is_complete() {
            return Err(incomplete_draft());
        }

        let photo_ref = match photo {
            Some(photo) => self.store_photo(photo).await,
            None => None,
        };

        let create = draft.finish(photo_ref).ok_or_else(incomplete_draft)?;
        let report = self.store.add_report(create).await?;
        info!(
            "Report #{} submitted for apartment {} via {} backend",
            report.id,
            report.apartment_id,
            self.backend_name()
        );
        Ok(report)
    }

    async fn store_photo(&self, photo: IncomingPhoto) -> Option<String> {
        let upload = PhotoUpload {
            file_name: timestamped_photo_name(&photo.original_name, now_timestamp()),
            content_type: photo.content_type,
            data: photo.data,
        };

        match self.photos.store(upload).await {
            Ok(reference) => Some(reference),
            Err(e) => {
                warn!("Photo could not be stored, continuing without it: {}", e);
                None
            }
        }
    }

    /// Reports of one apartment, newest first
    pub async fn list_for_apartment(&self, apartment_id: &str) -> Result<Vec<Report>> {
        let mut reports = self.store.list_by_apartment(apartment_id).await?;
        sort_newest_first(&mut reports);
        Ok(reports)
    }

    /// Reports of every apartment, newest first, optionally restricted to
    /// one status. The filter is compared verbatim against the status name.
    pub async fn list_all(&self, status_filter: Option<&str>) -> Result<Vec<Report>> {
        let mut reports = self.store.list_all().await?;
        if let Some(status) = status_filter {
            reports.retain(|r| r.status.as_str() == status);
        }
        sort_newest_first(&mut reports);
        Ok(reports)
    }

    /// Change a report's status. Returns `false` when the status is unknown,
    /// the report does not exist, or the backend failed.
    pub async fn update_status(&self, report_id: i64, status: &str) -> bool {
        let Ok(status) = status.parse::<ReportStatus>() else {
            warn!("Rejected status '{}' for report #{}", status, report_id);
            return false;
        };

        match self.store.update_status(report_id, status).await {
            Ok(updated) => updated,
            Err(e) => {
                error!("Failed to update status of report #{}: {}", report_id, e);
                false
            }
        }
    }
}

fn incomplete_draft() -> AppError {
    AppError::BadRequest("Report details have not been filled in".to_string())
}

fn sort_newest_first(reports: &mut [Report]) {
    reports.sort_by(|a, b| b.id.cmp(&a.id));
}
