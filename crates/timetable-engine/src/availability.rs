//! Room availability for a concrete date and slot.
//!
//! A standing class always wins: if any recurring entry for the room covers the
//! date's weekday at that slot, the room is OCCUPIED regardless of bookings.
//! Otherwise bookings for the exact (room, date, slot) decide: any APPROVED
//! booking makes it OCCUPIED, else any PENDING booking makes it PENDING.
//! REJECTED bookings are ignored.
//!
//! Compressed codes never cover Friday, so Friday slots can only be taken by
//! literal-day entries or bookings.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Booking, BookingStatus, ClassType, Room, ScheduleEntry};
use crate::slots::SlotId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Available,
    Pending,
    Occupied,
}

/// What produced a non-available verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reason {
    #[serde(rename = "Class Scheduled")]
    ClassScheduled,
    #[serde(rename = "Booked")]
    Booked,
    #[serde(rename = "Pending Request")]
    PendingRequest,
}

/// A verdict with the record that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub verdict: Verdict,
    pub reason: Option<Reason>,
    /// Id of the schedule entry or booking responsible, if any.
    pub source_id: Option<u32>,
}

impl Resolution {
    fn available() -> Self {
        Resolution {
            verdict: Verdict::Available,
            reason: None,
            source_id: None,
        }
    }
}

/// Decide whether `room_id` is free on `date` at `slot`.
pub fn resolve(
    room_id: u32,
    date: NaiveDate,
    slot: SlotId,
    entries: &[ScheduleEntry],
    bookings: &[Booking],
) -> Verdict {
    resolve_with_reason(room_id, date, slot, entries, bookings).verdict
}

/// Like [`resolve`], also reporting which record decided the verdict.
pub fn resolve_with_reason(
    room_id: u32,
    date: NaiveDate,
    slot: SlotId,
    entries: &[ScheduleEntry],
    bookings: &[Booking],
) -> Resolution {
    if let Some(entry) = recurring_occupant(room_id, date, slot, entries) {
        return Resolution {
            verdict: Verdict::Occupied,
            reason: Some(Reason::ClassScheduled),
            source_id: Some(entry.id),
        };
    }

    let mut pending = None;
    for booking in bookings.iter().filter(|b| b.holds(room_id, date, slot)) {
        match booking.status {
            BookingStatus::Approved => {
                return Resolution {
                    verdict: Verdict::Occupied,
                    reason: Some(Reason::Booked),
                    source_id: Some(booking.id),
                };
            }
            BookingStatus::Pending => {
                pending.get_or_insert(booking.id);
            }
            BookingStatus::Rejected => {}
        }
    }

    match pending {
        Some(booking_id) => Resolution {
            verdict: Verdict::Pending,
            reason: Some(Reason::PendingRequest),
            source_id: Some(booking_id),
        },
        None => Resolution::available(),
    }
}

/// The recurring entry holding `room_id` on `date`'s weekday at `slot`.
pub fn recurring_occupant<'a>(
    room_id: u32,
    date: NaiveDate,
    slot: SlotId,
    entries: &'a [ScheduleEntry],
) -> Option<&'a ScheduleEntry> {
    let weekday = date.weekday();
    entries.iter().find(|entry| {
        entry.room_id == room_id && entry.time_slot_id == slot && entry.day.matches(weekday)
    })
}

/// One row of the booking page's room list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomAvailability {
    pub id: u32,
    pub room_number: String,
    #[serde(rename = "type")]
    pub room_type: ClassType,
    pub capacity: u32,
    pub status: Verdict,
    pub reason: Option<Reason>,
}

/// Resolve every room (optionally only those of `room_type`) for one date and
/// slot, in the order `rooms` are given.
pub fn list_room_availability(
    rooms: &[Room],
    date: NaiveDate,
    slot: SlotId,
    room_type: Option<ClassType>,
    entries: &[ScheduleEntry],
    bookings: &[Booking],
) -> Vec<RoomAvailability> {
    let rows: Vec<RoomAvailability> = rooms
        .iter()
        .filter(|room| room_type.is_none_or(|wanted| room.room_type == wanted))
        .map(|room| {
            let resolution = resolve_with_reason(room.id, date, slot, entries, bookings);
            RoomAvailability {
                id: room.id,
                room_number: room.room_number.clone(),
                room_type: room.room_type,
                capacity: room.capacity,
                status: resolution.verdict,
                reason: resolution.reason,
            }
        })
        .collect();

    debug!(
        %date,
        slot = slot.get(),
        rooms = rows.len(),
        free = rows.iter().filter(|r| r.status == Verdict::Available).count(),
        "resolved room availability"
    );
    rows
}
