use serde::{Deserialize, Serialize};

use super::report::{CreateReport, IssueType, Priority};

/// Values collected by the second wizard step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftDetails {
    pub item: String,
    pub description: String,
    pub priority: Priority,
}

/// A report being assembled across the wizard steps.
///
/// Lives only in the session; it becomes a [`CreateReport`] when the last
/// step is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub apartment_id: String,
    pub room: String,
    pub issue_type: IssueType,
    pub details: Option<DraftDetails>,
}

impl ReportDraft {
    /// Begin a draft from the first step's answers
    pub fn start(apartment_id: &str, room: &str, issue_type: IssueType) -> Self {
        Self {
            apartment_id: apartment_id.to_string(),
            room: room.to_string(),
            issue_type,
            details: None,
        }
    }

    pub fn belongs_to(&self, apartment_id: &str) -> bool {
        self.apartment_id == apartment_id
    }

    pub fn set_details(&mut self, item: &str, description: &str, priority: Priority) {
        self.details = Some(DraftDetails {
            item: item.to_string(),
            description: description.to_string(),
            priority,
        });
    }

    /// Both content steps have been answered
    pub fn is_complete(&self) -> bool {
        self.details.is_some()
    }

    /// Close the draft into a report ready to be persisted.
    ///
    /// Returns `None` while the details step is still unanswered.
    pub fn finish(self, photo: Option<String>) -> Option<CreateReport> {
        let details = self.details?;

        Some(CreateReport {
            apartment_id: self.apartment_id,
            room: self.room,
            issue_type: self.issue_type,
            item: details.item,
            description: details.description,
            priority: details.priority,
            photo,
        })
    }
}
