//! Error types for timetable-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimetableError {
    #[error("Unknown day code: {0}")]
    UnknownDayCode(String),

    #[error("Invalid time slot: {0} (expected 1..=7)")]
    InvalidTimeSlot(u8),

    #[error("Slot {0} cannot start an extended block (expected 1, 3 or 5)")]
    NotExtendedStart(u8),

    #[error("Page {page} out of range (1..={total_pages})")]
    PageOutOfRange { page: usize, total_pages: usize },

    #[error("Page size must be at least 1")]
    InvalidPageSize,

    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("Invalid RRULE: {0}")]
    InvalidRule(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Expansion error: {0}")]
    Expansion(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dataset parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TimetableError>;
