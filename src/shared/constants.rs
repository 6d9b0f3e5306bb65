/// Apartments served by this deployment, as `(id, display name)` pairs
pub const APARTMENTS: &[(&str, &str)] = &[
    ("1", "רותם"),
    ("2", "דפנה"),
    ("3", "ארז"),
    ("4", "אורן"),
    ("5", "מוריה"),
    ("6", "זקיף מוריה"),
    ("7", "אגוז"),
    ("8", "מלונית אגוז"),
    ("9", "ורד"),
    ("10", "מלונית ורד"),
    ("11", "אקליפטוס"),
    ("12", "זקיף אקליפטוס"),
];

/// Rooms offered by the first wizard step
pub const ROOMS: &[&str] = &[
    "kitchen",
    "living_room",
    "bedroom",
    "bathroom",
    "balcony",
    "hallway",
    "other",
];

/// Timestamp format used for persisted reports
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Suffix format appended to uploaded photo names
pub const PHOTO_SUFFIX_FORMAT: &str = "%Y%m%d%H%M%S";

// =============================================================================
// FLASH MESSAGES
// =============================================================================

pub const MSG_UNKNOWN_APARTMENT: &str = "Apartment does not exist";
pub const MSG_FILL_ALL_FIELDS: &str = "Please fill in all fields";
pub const MSG_FILL_REQUIRED_FIELDS: &str = "Please fill in all required fields";
pub const MSG_DRAFT_MISSING: &str = "The report was not completed, please start again.";
pub const MSG_STATUS_UPDATED: &str = "Status updated!";
pub const MSG_STATUS_FAILED: &str = "Failed to update the status";
pub const MSG_SUBMIT_FAILED: &str = "The report could not be saved, please try again.";
pub const MSG_DETAILS_MISSING: &str = "Please describe the problem before adding a photo.";
pub const MSG_UPLOAD_FAILED: &str = "The photo could not be uploaded, it may be too large.";
