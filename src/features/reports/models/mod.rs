mod draft;
mod report;

pub use draft::ReportDraft;
pub use report::{timestamp, CreateReport, IssueType, Priority, Report, ReportStatus};
