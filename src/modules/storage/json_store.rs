//! File-backed report store.
//!
//! The whole data set is one JSON document: a running id counter plus, per
//! apartment, its display name and ordered report list. Every mutation is a
//! read-modify-write of the document.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::report_store::{next_id_after, now_timestamp, ReportStore};
use crate::core::error::Result;
use crate::features::apartments::models::ApartmentDirectory;
use crate::features::reports::models::{CreateReport, Report, ReportStatus};

/// On-disk layout of the data file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportDocument {
    #[serde(default)]
    pub last_report_id: i64,
    #[serde(default)]
    pub apartments: BTreeMap<String, ApartmentReports>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApartmentReports {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub reports: Vec<Report>,
}

pub struct JsonFileStore {
    path: PathBuf,
    directory: ApartmentDirectory,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, directory: ApartmentDirectory) -> Self {
        Self {
            path: path.into(),
            directory,
            write_lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Document with an empty entry for every known apartment
    fn seeded_document(&self) -> ReportDocument {
        let apartments = self
            .directory
            .all()
            .iter()
            .map(|a| {
                (
                    a.id.clone(),
                    ApartmentReports {
                        name: a.name.clone(),
                        reports: Vec::new(),
                    },
                )
            })
            .collect();

        ReportDocument {
            last_report_id: 0,
            apartments,
        }
    }

    async fn load(&self) -> Result<ReportDocument> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Data file {} missing, starting empty", self.path.display());
                Ok(self.seeded_document())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write through a sibling temp file so readers never see a torn document
    async fn save(&self, doc: &ReportDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let raw = serde_json::to_string_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ReportStore for JsonFileStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn add_report(&self, report: CreateReport) -> Result<Report> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.load().await?;
        let id = next_id_after(doc.last_report_id)?;
        let report = report.into_report(id, now_timestamp());

        let directory = &self.directory;
        doc.apartments
            .entry(report.apartment_id.clone())
            .or_insert_with(|| ApartmentReports {
                name: directory.name_of(&report.apartment_id),
                reports: Vec::new(),
            })
            .reports
            .push(report.clone());
        doc.last_report_id = id;

        self.save(&doc).await?;

        info!(
            "Report #{} saved for apartment {} ({})",
            id,
            report.apartment_id,
            self.path.display()
        );
        Ok(report)
    }

    async fn list_by_apartment(&self, apartment_id: &str) -> Result<Vec<Report>> {
        let doc = self.load().await?;
        Ok(doc
            .apartments
            .get(apartment_id)
            .map(|a| a.reports.clone())
            .unwrap_or_default())
    }

    async fn list_all(&self) -> Result<Vec<Report>> {
        let doc = self.load().await?;
        Ok(doc
            .apartments
            .into_values()
            .flat_map(|a| a.reports)
            .collect())
    }

    async fn update_status(&self, report_id: i64, status: ReportStatus) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.load().await?;
        let Some(report) = doc
            .apartments
            .values_mut()
            .flat_map(|a| a.reports.iter_mut())
            .find(|r| r.id == report_id)
        else {
            debug!("Report #{} not found, status unchanged", report_id);
            return Ok(false);
        };

        report.status = status;
        self.save(&doc).await?;

        info!("Report #{} status set to {}", report_id, status);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::features::reports::models::{IssueType, Priority};
    use crate::shared::constants::APARTMENTS;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::new(
            dir.path().join("data").join("reports.json"),
            ApartmentDirectory::from_roster(APARTMENTS),
        )
    }

    fn new_report(apartment_id: &str) -> CreateReport {
        CreateReport {
            apartment_id: apartment_id.to_string(),
            room: "kitchen".into(),
            issue_type: IssueType::Broken,
            item: "oven".into(),
            description: Sentence(3..8).fake(),
            priority: Priority::High,
            photo: None,
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.list_all().await.unwrap().is_empty());
        assert!(store.list_by_apartment("1").await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_add_assigns_sequential_ids() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let first = store.add_report(new_report("1")).await.unwrap();
        let second = store.add_report(new_report("2")).await.unwrap();
        let third = store.add_report(new_report("1")).await.unwrap();

        assert_eq!((first.id, second.id, third.id), (1, 2, 3));
        assert_eq!(first.status, ReportStatus::Received);
        assert_eq!(store.list_by_apartment("1").await.unwrap().len(), 2);
        assert_eq!(store.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_document_layout_on_disk() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let created = store.add_report(new_report("7")).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["last_report_id"], 1);
        assert_eq!(value["apartments"]["7"]["name"], "אגוז");
        let stored = &value["apartments"]["7"]["reports"][0];
        assert_eq!(stored["id"], 1);
        assert_eq!(stored["status"], "received");
        assert_eq!(stored["description"], created.description.as_str());
        // every roster apartment is present, even without reports
        assert_eq!(value["apartments"].as_object().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_exhausted_id_counter_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(
            store.path(),
            format!(r#"{{"last_report_id": {}, "apartments": {{}}}}"#, i64::MAX),
        )
        .unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        let result = store.add_report(new_report("1")).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_status() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let report = store.add_report(new_report("3")).await.unwrap();

        assert!(store.update_status(report.id, ReportStatus::Processing).await.unwrap());

        let reports = store.list_by_apartment("3").await.unwrap();
        assert_eq!(reports[0].status, ReportStatus::Processing);
    }

    #[tokio::test]
    async fn test_update_unknown_report_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.add_report(new_report("3")).await.unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        assert!(!store.update_status(99, ReportStatus::Done).await.unwrap());

        let after = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_concurrent_adds_in_process_get_distinct_ids() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(store_in(&dir));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .add_report(new_report(&((i % 3) + 1).to_string()))
                        .await
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort();
        assert_eq!(ids, (1..=8).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_reads_legacy_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports.json");
        std::fs::write(
            &path,
            r#"{
                "last_report_id": 5,
                "apartments": {
                    "2": {"name": "דפנה", "reports": [
                        {"id": 5, "apartment_id": "2", "created_at": "2024-01-02 10:00:00",
                         "room": "bedroom", "issue_type": "missing", "item": "lamp",
                         "description": "", "priority": "low", "photo_filename": null,
                         "status": "done"}
                    ]}
                }
            }"#,
        )
        .unwrap();

        let store = JsonFileStore::new(&path, ApartmentDirectory::from_roster(APARTMENTS));
        let reports = store.list_by_apartment("2").await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, ReportStatus::Done);

        let next = store.add_report(new_report("2")).await.unwrap();
        assert_eq!(next.id, 6);
    }
}
