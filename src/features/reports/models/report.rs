use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Report lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Received,
    Processing,
    Done,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 3] = [Self::Received, Self::Processing, Self::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Received => "received",
            ReportStatus::Processing => "processing",
            ReportStatus::Done => "done",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "received" => Ok(Self::Received),
            "processing" => Ok(Self::Processing),
            "done" => Ok(Self::Done),
            other => Err(format!("Unknown report status '{}'", other)),
        }
    }
}

/// Kind of problem being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Broken,
    Missing,
    #[default]
    Other,
}

impl IssueType {
    pub const ALL: [IssueType; 3] = [Self::Broken, Self::Missing, Self::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Broken => "broken",
            IssueType::Missing => "missing",
            IssueType::Other => "other",
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "broken" => Ok(Self::Broken),
            "missing" => Ok(Self::Missing),
            "other" => Ok(Self::Other),
            other => Err(format!("Unknown issue type '{}'", other)),
        }
    }
}

/// How urgently the tenant wants the issue handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::Low, Self::Normal, Self::High, Self::Urgent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(format!("Unknown priority '{}'", other)),
        }
    }
}

/// A persisted maintenance report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub apartment_id: String,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    pub room: String,
    pub issue_type: IssueType,
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    /// Local filename or hosted URL of the attached photo
    #[serde(default, rename = "photo_filename")]
    pub photo: Option<String>,
    #[serde(default)]
    pub status: ReportStatus,
}

/// Data for creating a new report; the store assigns id, timestamp and status
#[derive(Debug, Clone, PartialEq)]
pub struct CreateReport {
    pub apartment_id: String,
    pub room: String,
    pub issue_type: IssueType,
    pub item: String,
    pub description: String,
    pub priority: Priority,
    pub photo: Option<String>,
}

impl CreateReport {
    pub fn into_report(self, id: i64, created_at: NaiveDateTime) -> Report {
        Report {
            id,
            apartment_id: self.apartment_id,
            created_at,
            room: self.room,
            issue_type: self.issue_type,
            item: self.item,
            description: self.description,
            priority: self.priority,
            photo: self.photo,
            status: ReportStatus::Received,
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS` serde representation for report timestamps
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::shared::constants::TIMESTAMP_FORMAT;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
    }
}
