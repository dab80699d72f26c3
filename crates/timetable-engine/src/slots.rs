//! The fixed catalogue of daily teaching slots.
//!
//! Seven standard slots run from 08:00 to 19:30 with ten-minute breaks. An
//! extended block covers two consecutive slots and may only start at slot 1, 3
//! or 5; slot 7 is never its first half.

use std::fmt;

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimetableError};

/// Number of standard slots in a teaching day.
pub const SLOT_COUNT: u8 = 7;

/// Length of a standard slot in minutes (1h 30m).
pub const STANDARD_MINUTES: i64 = 90;

/// Length of an extended block in minutes (3h 10m, two slots plus the break).
pub const EXTENDED_MINUTES: i64 = 190;

/// Start and end of each slot, in minutes after midnight.
const SLOT_BOUNDS: [(u16, u16); SLOT_COUNT as usize] = [
    (8 * 60, 9 * 60 + 30),
    (9 * 60 + 40, 11 * 60 + 10),
    (11 * 60 + 20, 12 * 60 + 50),
    (13 * 60, 14 * 60 + 30),
    (14 * 60 + 40, 16 * 60 + 10),
    (16 * 60 + 20, 17 * 60 + 50),
    (18 * 60, 19 * 60 + 30),
];

/// A validated slot id in `1..=7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotId(u8);

impl SlotId {
    /// Every slot id in catalogue order.
    pub fn all() -> impl Iterator<Item = SlotId> {
        (1..=SLOT_COUNT).map(SlotId)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position, for indexing grid rows.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// Whether an extended block may begin at this slot.
    pub fn is_extended_start(self) -> bool {
        matches!(self.0, 1 | 3 | 5)
    }

    /// The following slot, or `None` after slot 7.
    pub fn next(self) -> Option<SlotId> {
        (self.0 < SLOT_COUNT).then(|| SlotId(self.0 + 1))
    }
}

impl TryFrom<u8> for SlotId {
    type Error = TimetableError;

    fn try_from(value: u8) -> Result<Self> {
        if (1..=SLOT_COUNT).contains(&value) {
            Ok(SlotId(value))
        } else {
            Err(TimetableError::InvalidTimeSlot(value))
        }
    }
}

impl From<SlotId> for u8 {
    fn from(slot: SlotId) -> u8 {
        slot.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the slot catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub id: SlotId,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    /// `"08:00 AM"`
    pub fn start_label(&self) -> String {
        clock_label(self.start)
    }

    /// `"09:30 AM"`
    pub fn end_label(&self) -> String {
        clock_label(self.end)
    }

    /// `"08:00 AM - 09:30 AM"`
    pub fn label(&self) -> String {
        format!("{} - {}", self.start_label(), self.end_label())
    }
}

/// An extended block: two consecutive slots rendered as one interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtendedSlot {
    pub first: TimeSlot,
    pub second: TimeSlot,
}

impl ExtendedSlot {
    pub fn start(&self) -> NaiveTime {
        self.first.start
    }

    pub fn end(&self) -> NaiveTime {
        self.second.end
    }

    /// `"08:00 AM - 11:10 AM"`
    pub fn label(&self) -> String {
        format!("{} - {}", self.first.start_label(), self.second.end_label())
    }
}

/// Duration tag attached to a rendered block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DurationTag {
    Standard,
    Extended,
}

impl DurationTag {
    pub fn minutes(self) -> i64 {
        match self {
            DurationTag::Standard => STANDARD_MINUTES,
            DurationTag::Extended => EXTENDED_MINUTES,
        }
    }
}

impl fmt::Display for DurationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationTag::Standard => f.write_str("1h 30m"),
            DurationTag::Extended => f.write_str("3h 10m"),
        }
    }
}

/// Look up a standard slot. Total because `SlotId` is already validated.
pub fn slot(id: SlotId) -> TimeSlot {
    let (start, end) = SLOT_BOUNDS[id.index()];
    TimeSlot {
        id,
        start: time_of_day(start),
        end: time_of_day(end),
    }
}

/// The whole catalogue, in order.
pub fn catalogue() -> Vec<TimeSlot> {
    SlotId::all().map(slot).collect()
}

/// Look up the extended block starting at `start`.
///
/// # Errors
/// Returns `TimetableError::NotExtendedStart` unless `start` is 1, 3 or 5.
pub fn extended(start: SlotId) -> Result<ExtendedSlot> {
    let (first, second) = extended_pair(start)?;
    Ok(ExtendedSlot {
        first: slot(first),
        second: slot(second),
    })
}

/// The two slot ids an extended block starting at `start` consumes.
pub fn extended_pair(start: SlotId) -> Result<(SlotId, SlotId)> {
    match start.next() {
        Some(second) if start.is_extended_start() => Ok((start, second)),
        _ => Err(TimetableError::NotExtendedStart(start.get())),
    }
}

fn time_of_day(minutes: u16) -> NaiveTime {
    NaiveTime::default() + Duration::minutes(i64::from(minutes))
}

fn clock_label(time: NaiveTime) -> String {
    time.format("%I:%M %p").to_string()
}
