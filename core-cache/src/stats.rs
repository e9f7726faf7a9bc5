//! Cache statistics and size formatting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::CacheMetadata;

/// Snapshot of cache usage, suitable for direct display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cached lessons
    pub total_lessons: usize,

    /// Total estimated size in bytes
    pub total_size_bytes: u64,

    /// Capacity ceiling in bytes
    pub max_size_bytes: u64,

    /// Total size, human-readable ("2.17 KB")
    pub total_size: String,

    /// Capacity ceiling, human-readable ("50 MB")
    pub max_size: String,

    /// `round(100 * total / max)`
    pub usage_percentage: u32,

    /// When the most recent eviction pass completed, if any
    pub last_cleanup: Option<DateTime<Utc>>,
}

impl CacheStats {
    pub(crate) fn from_metadata(metadata: &CacheMetadata) -> Self {
        Self {
            total_lessons: metadata.lesson_count as usize,
            total_size_bytes: metadata.total_size,
            max_size_bytes: metadata.max_size,
            total_size: format_bytes(metadata.total_size),
            max_size: format_bytes(metadata.max_size),
            usage_percentage: usage_percentage(metadata.total_size, metadata.max_size),
            last_cleanup: metadata.last_cleanup,
        }
    }
}

fn usage_percentage(total: u64, max: u64) -> u32 {
    if max == 0 {
        return 0;
    }

    ((total as f64 / max as f64) * 100.0).round() as u32
}

/// Format a byte count with binary units (B/KB/MB/GB), at most two decimal
/// places, trailing zeros trimmed.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let mut formatted = format!("{:.2}", value);
    if formatted.contains('.') {
        while formatted.ends_with('0') {
            formatted.pop();
        }
        if formatted.ends_with('.') {
            formatted.pop();
        }
    }

    format!("{} {}", formatted, UNITS[unit])
}
