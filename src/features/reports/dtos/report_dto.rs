use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::features::reports::models::{IssueType, Priority, Report};

/// Form body of the first wizard step
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct Step1Form {
    #[validate(length(min = 1, message = "Room is required"))]
    pub room: String,

    #[validate(length(min = 1, message = "Issue type is required"))]
    pub issue_type: String,
}

impl Step1Form {
    /// Room and issue type, or `None` when either is missing or the issue
    /// type is not one of the known values
    pub fn parse(&self) -> Option<(String, IssueType)> {
        self.validate().ok()?;

        let room = self.room.trim();
        if room.is_empty() {
            return None;
        }
        let issue_type = self.issue_type.trim().parse().ok()?;

        Some((room.to_string(), issue_type))
    }
}

/// Form body of the second wizard step
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct Step2Form {
    #[validate(length(min = 1, message = "Item is required"))]
    pub item: String,

    pub description: String,

    #[validate(length(min = 1, message = "Priority is required"))]
    pub priority: String,
}

/// Validated answers of the second step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step2Values {
    pub item: String,
    pub description: String,
    pub priority: Priority,
}

impl Step2Form {
    /// Item, description and priority, or `None` when item or priority is
    /// missing. An unknown priority counts as missing.
    pub fn parse(&self) -> Option<Step2Values> {
        self.validate().ok()?;

        let item = self.item.trim();
        if item.is_empty() {
            return None;
        }
        let priority = self.priority.trim().parse().ok()?;

        Some(Step2Values {
            item: item.to_string(),
            description: self.description.trim().to_string(),
            priority,
        })
    }
}

/// Status change posted from the dashboard or the all-reports view
#[derive(Debug, Clone, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub status: String,
    /// Filter active on the all-reports view, echoed back into the redirect
    #[serde(default)]
    pub filter: Option<String>,
}

/// Query string of the all-reports view
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllReportsQuery {
    pub status: Option<String>,
}

impl AllReportsQuery {
    /// Active status filter; empty means none
    pub fn filter(&self) -> Option<&str> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Report row as shown on the all-reports view
#[derive(Debug, Clone, Serialize)]
pub struct ReportViewDto {
    #[serde(flatten)]
    pub report: Report,
    pub apartment_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step1_requires_both_fields() {
        let form = Step1Form {
            room: "kitchen".into(),
            issue_type: String::new(),
        };
        assert!(form.parse().is_none());

        let form = Step1Form {
            room: "   ".into(),
            issue_type: "broken".into(),
        };
        assert!(form.parse().is_none());

        let form = Step1Form {
            room: "kitchen".into(),
            issue_type: "broken".into(),
        };
        assert_eq!(form.parse(), Some(("kitchen".to_string(), IssueType::Broken)));
    }

    #[test]
    fn test_step1_rejects_unknown_issue_type() {
        let form = Step1Form {
            room: "kitchen".into(),
            issue_type: "haunted".into(),
        };
        assert!(form.parse().is_none());
    }

    #[test]
    fn test_step2_description_is_optional() {
        let form = Step2Form {
            item: " faucet ".into(),
            description: String::new(),
            priority: "urgent".into(),
        };
        let values = form.parse().unwrap();
        assert_eq!(values.item, "faucet");
        assert_eq!(values.description, "");
        assert_eq!(values.priority, Priority::Urgent);
    }

    #[test]
    fn test_step2_requires_known_priority() {
        let form = Step2Form {
            item: "faucet".into(),
            description: "drips".into(),
            priority: "whenever".into(),
        };
        assert!(form.parse().is_none());

        let form = Step2Form {
            item: "faucet".into(),
            description: "drips".into(),
            priority: String::new(),
        };
        assert!(form.parse().is_none());
    }

    #[test]
    fn test_all_reports_query_filter() {
        let query = AllReportsQuery {
            status: Some(String::new()),
        };
        assert_eq!(query.filter(), None);

        let query = AllReportsQuery {
            status: Some("done".into()),
        };
        assert_eq!(query.filter(), Some("done"));
        assert_eq!(AllReportsQuery::default().filter(), None);
    }
}
