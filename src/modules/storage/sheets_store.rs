//! Spreadsheet-backed report store.
//!
//! Each report is one row of the sheet, starting at row 2:
//!
//! | A  | B         | C         | D    | E          | F           | G        | H      | I     | J    |
//! |----|-----------|-----------|------|------------|-------------|----------|--------|-------|------|
//! | id | apartment | timestamp | room | issue type | description | priority | status | photo | item |
//!
//! Column F stores the item and the free-text description joined as
//! `"<item> - <description>"` for people reading the sheet. Column J keeps
//! the item on its own so the pair can be split back exactly. Rows without
//! column J are split on the first separator.
//!
//! Ids are derived from the last row's id, so two concurrent submissions
//! can be handed the same id.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::report_store::{next_id_after, now_timestamp, ReportStore};
use crate::core::error::Result;
use crate::features::reports::models::{timestamp, CreateReport, Report, ReportStatus};
use crate::modules::google::SheetsClient;
use crate::shared::constants::TIMESTAMP_FORMAT;

const COLUMN_COUNT: usize = 10;
const FIRST_DATA_ROW: usize = 2;
const STATUS_COLUMN: &str = "H";
const DESCRIPTION_SEPARATOR: &str = " - ";

pub struct SheetsReportStore {
    client: SheetsClient,
    sheet_name: String,
}

impl SheetsReportStore {
    pub fn new(client: SheetsClient, sheet_name: &str) -> Self {
        Self {
            client,
            sheet_name: sheet_name.to_string(),
        }
    }

    fn range(&self, cells: &str) -> String {
        format!("{}!{}", self.sheet_name, cells)
    }

    async fn read_rows(&self) -> Result<Vec<Report>> {
        let rows = self.client.get_values(&self.range("A2:J")).await?;
        Ok(rows.into_iter().filter_map(parse_row).collect())
    }

    /// Last row's id + 1, or 1 for an empty sheet
    async fn next_report_id(&self) -> Result<i64> {
        let ids = self.client.get_values(&self.range("A2:A")).await?;
        let last = ids
            .iter()
            .rev()
            .find_map(|row| row.first().and_then(|cell| parse_id(cell)));
        last.map_or(Ok(1), next_id_after)
    }
}

#[async_trait]
impl ReportStore for SheetsReportStore {
    fn backend_name(&self) -> &'static str {
        "sheets"
    }

    async fn add_report(&self, report: CreateReport) -> Result<Report> {
        let id = self.next_report_id().await?;
        let report = report.into_report(id, now_timestamp());

        self.client
            .append_row(&self.range("A2"), to_row(&report))
            .await?;

        info!(
            "Report #{} appended to sheet {} for apartment {}",
            id, self.sheet_name, report.apartment_id
        );
        Ok(report)
    }

    async fn list_by_apartment(&self, apartment_id: &str) -> Result<Vec<Report>> {
        let mut reports = self.read_rows().await?;
        reports.retain(|r| r.apartment_id == apartment_id);
        Ok(reports)
    }

    async fn list_all(&self) -> Result<Vec<Report>> {
        self.read_rows().await
    }

    async fn update_status(&self, report_id: i64, status: ReportStatus) -> Result<bool> {
        let ids = self.client.get_values(&self.range("A2:A")).await?;

        let Some(offset) = ids
            .iter()
            .position(|row| row.first().and_then(|cell| parse_id(cell)) == Some(report_id))
        else {
            return Ok(false);
        };

        let row_number = offset + FIRST_DATA_ROW;
        self.client
            .update_values(
                &self.range(&format!("{}{}", STATUS_COLUMN, row_number)),
                vec![vec![json!(status.as_str())]],
            )
            .await?;

        info!("Report #{} (row {}) status set to {}", report_id, row_number, status);
        Ok(true)
    }
}

/// Integer id from a cell. Whole floats such as `3.0` are accepted as long
/// as they fit in an `i64`.
fn parse_id(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if let Ok(id) = cell.parse::<i64>() {
        return Some(id);
    }

    let value = cell.parse::<f64>().ok()?;
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

/// Join item and description into the single description cell.
///
/// An empty item still gets the separator so the description is never
/// mistaken for an item.
fn compose_description(item: &str, description: &str) -> String {
    if description.is_empty() {
        item.to_string()
    } else {
        format!("{}{}{}", item, DESCRIPTION_SEPARATOR, description)
    }
}

/// Recover item and description from column F and, when present, column J
fn split_description(cell: &str, item_cell: &str) -> (String, String) {
    if !item_cell.is_empty() {
        let description = match cell.strip_prefix(item_cell) {
            Some("") => "",
            Some(rest) => rest.strip_prefix(DESCRIPTION_SEPARATOR).unwrap_or(cell),
            None => cell,
        };
        return (item_cell.to_string(), description.to_string());
    }

    match cell.split_once(DESCRIPTION_SEPARATOR) {
        Some((item, description)) => (item.to_string(), description.to_string()),
        None => (cell.to_string(), String::new()),
    }
}

fn to_row(report: &Report) -> Vec<Value> {
    vec![
        json!(report.id),
        json!(report.apartment_id),
        json!(report.created_at.format(TIMESTAMP_FORMAT).to_string()),
        json!(report.room),
        json!(report.issue_type.as_str()),
        json!(compose_description(&report.item, &report.description)),
        json!(report.priority.as_str()),
        json!(report.status.as_str()),
        json!(report.photo.clone().unwrap_or_default()),
        json!(report.item),
    ]
}

/// Parse one sheet row, padding short rows. Rows without a usable id or
/// timestamp are skipped; unknown enum values fall back to defaults.
fn parse_row(mut row: Vec<String>) -> Option<Report> {
    if row.len() < COLUMN_COUNT {
        row.resize(COLUMN_COUNT, String::new());
    }

    let id = parse_id(&row[0])?;
    let created_at = match timestamp::parse(&row[2]) {
        Ok(ts) => ts,
        Err(e) => {
            warn!("Skipping report #{}: bad timestamp '{}': {}", id, row[2], e);
            return None;
        }
    };
    let (item, description) = split_description(&row[5], &row[9]);
    let photo = Some(row[8].trim().to_string()).filter(|p| !p.is_empty());

    Some(Report {
        id,
        apartment_id: row[1].trim().to_string(),
        created_at,
        room: row[3].clone(),
        issue_type: row[4].parse().unwrap_or_default(),
        item,
        description,
        priority: row[6].parse().unwrap_or_default(),
        photo,
        status: row[7].parse().unwrap_or_default(),
    })
}
