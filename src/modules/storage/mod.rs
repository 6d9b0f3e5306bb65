//! Storage module for reports and their photos
//!
//! Provides the `ReportStore` seam with a local JSON-file and a spreadsheet
//! implementation, and the `PhotoStore` seam with local and Drive-hosted
//! implementations.

mod json_store;
mod photo_store;
mod report_store;
mod sheets_store;

pub use json_store::JsonFileStore;
pub use photo_store::{DrivePhotoStore, LocalPhotoStore, PhotoStore, PhotoUpload};
pub use report_store::{now_timestamp, ReportStore};
pub use sheets_store::SheetsReportStore;
