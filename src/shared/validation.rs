use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::shared::constants::PHOTO_SUFFIX_FORMAT;

lazy_static! {
    /// Characters allowed to survive filename sanitization
    /// - Kept: ASCII letters, digits, `_`, `.`, `-`
    /// - Dropped: everything else, including spaces left over after joining
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.\-]").unwrap();
}

/// Device names Windows refuses as plain filenames
const WINDOWS_DEVICE_FILES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Reduce an uploaded filename to a safe, flat ASCII name.
///
/// May return an empty string when nothing usable remains.
pub fn secure_filename(filename: &str) -> String {
    // NFKD splits accented letters into base letter plus combining mark
    let ascii: String = filename.nfkd().filter(|c| c.is_ascii()).collect();
    let flattened = ascii.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    let stem = trimmed.split('.').next().unwrap_or_default();
    if WINDOWS_DEVICE_FILES.contains(&stem.to_uppercase().as_str()) {
        return format!("_{}", trimmed);
    }

    trimmed.to_string()
}

/// Build the on-disk name for an uploaded photo: sanitized stem, a
/// `_YYYYMMDDHHMMSS` suffix, then the original extension.
pub fn timestamped_photo_name(original: &str, now: NaiveDateTime) -> String {
    let safe = match secure_filename(original) {
        name if name.is_empty() => "photo".to_string(),
        name => name,
    };

    let (stem, ext) = match safe.rfind('.') {
        Some(idx) if idx > 0 => safe.split_at(idx),
        _ => (safe.as_str(), ""),
    };

    format!("{}_{}{}", stem, now.format(PHOTO_SUFFIX_FORMAT), ext)
}
