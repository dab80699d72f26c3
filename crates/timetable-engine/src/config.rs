//! Engine settings shared by the calendar views.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::{Result, TimetableError};

/// Campus timezone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Asia/Dhaka";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// IANA timezone slot times are interpreted in.
    pub timezone: String,
    /// Week offsets around the anchor date the calendar view materializes.
    pub window_weeks: Vec<i32>,
    /// Weekly occurrences emitted per entry for semester export.
    pub semester_weeks: u32,
    /// Rows per page in tabular listings.
    pub page_size: usize,
    pub dst_policy: DstPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            timezone: DEFAULT_TIMEZONE.to_string(),
            window_weeks: vec![-1, 0, 1],
            semester_weeks: 14,
            page_size: 10,
            dst_policy: DstPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Parse the configured timezone.
    ///
    /// # Errors
    /// Returns `TimetableError::InvalidTimezone` if it is not an IANA identifier.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| TimetableError::InvalidTimezone(self.timezone.clone()))
    }

    pub fn validate(&self) -> Result<()> {
        self.tz()?;
        if self.window_weeks.is_empty() {
            return Err(TimetableError::InvalidConfig(
                "window_weeks must name at least one week offset".to_string(),
            ));
        }
        if self.semester_weeks == 0 {
            return Err(TimetableError::InvalidConfig(
                "semester_weeks must be at least 1".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(TimetableError::InvalidConfig(
                "page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
