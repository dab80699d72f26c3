//! Validation for booking requests and admin approval.

use serde::Serialize;
use thiserror::Error;

use crate::availability;
use crate::model::{Booking, BookingStatus, ScheduleEntry};

/// Why a booking request or approval is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingRejection {
    #[error("Reason is mandatory for booking requests.")]
    MissingReason,

    #[error("Room is already occupied by a class at this time (entry {entry_id}).")]
    OccupiedByClass { entry_id: u32 },

    #[error("Room is already booked or has a pending request at this time (booking {booking_id}).")]
    AlreadyRequested { booking_id: u32 },

    #[error("Cannot approve: room is already booked (booking {booking_id}).")]
    AlreadyBooked { booking_id: u32 },
}

/// Check a new request before it is stored as PENDING.
///
/// Refused when the reason is blank, when a recurring class covers the slot on
/// that weekday, or when a PENDING or APPROVED booking already holds the same
/// room, date and slot.
pub fn check_request(
    request: &Booking,
    entries: &[ScheduleEntry],
    bookings: &[Booking],
) -> Result<(), BookingRejection> {
    if request.reason.trim().is_empty() {
        return Err(BookingRejection::MissingReason);
    }

    occupied_by_class(request, entries)?;

    let existing = bookings.iter().find(|b| {
        b.id != request.id
            && b.is_live()
            && b.holds(request.room_id, request.booking_date, request.time_slot_id)
    });
    match existing {
        Some(b) => Err(BookingRejection::AlreadyRequested { booking_id: b.id }),
        None => Ok(()),
    }
}

/// Check that `booking` may move to APPROVED.
///
/// Other PENDING requests for the same slot do not block approval; another
/// APPROVED booking does.
pub fn check_approval(
    booking: &Booking,
    entries: &[ScheduleEntry],
    bookings: &[Booking],
) -> Result<(), BookingRejection> {
    occupied_by_class(booking, entries)?;

    let approved = bookings.iter().find(|b| {
        b.id != booking.id
            && b.status == BookingStatus::Approved
            && b.holds(booking.room_id, booking.booking_date, booking.time_slot_id)
    });
    match approved {
        Some(b) => Err(BookingRejection::AlreadyBooked { booking_id: b.id }),
        None => Ok(()),
    }
}

fn occupied_by_class(booking: &Booking, entries: &[ScheduleEntry]) -> Result<(), BookingRejection> {
    match availability::recurring_occupant(
        booking.room_id,
        booking.booking_date,
        booking.time_slot_id,
        entries,
    ) {
        Some(entry) => Err(BookingRejection::OccupiedByClass { entry_id: entry.id }),
        None => Ok(()),
    }
}
