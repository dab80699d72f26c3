//! # timetable-engine
//!
//! Turns a compact recurring university timetable into concrete calendar facts.
//!
//! Schedule entries name a room, a slot (one of seven fixed daily intervals)
//! and a day code: either a compressed weekday pair used by theory courses
//! (`ST`, `MW`, `RA`) or a literal weekday used by labs and bookings. Extended
//! courses occupy two consecutive slots stored as two entries. Everything here
//! is a pure function of the records passed in; nothing is cached.
//!
//! ## Modules
//!
//! - [`slots`] — The fixed slot catalogue and extended-block lookup
//! - [`day_code`] — Compressed and literal day codes → weekdays
//! - [`merger`] — Collapse extended entry pairs into single blocks
//! - [`grid`] — Day × slot occupancy matrix for one room
//! - [`availability`] — AVAILABLE / PENDING / OCCUPIED for a date and slot
//! - [`booking`] — Booking request and approval checks
//! - [`materialize`] — Recurring classes and bookings → dated instances
//! - [`recurrence`] — Weekly RRULE export and semester expansion
//! - [`conflict`] — Room and teacher double-booking detection
//! - [`rules`] — Course type / day code / slot consistency
//! - [`sort`] — Multi-key stable sort and pagination
//! - [`batch`] — Settle-all bulk outcomes and request sequencing
//! - [`config`] — Engine settings
//! - [`dst`] — Local slot times → UTC
//! - [`model`] — Records read from the persistence layer
//! - [`error`] — Error types

pub mod availability;
pub mod batch;
pub mod booking;
pub mod config;
pub mod conflict;
pub mod day_code;
pub mod dst;
pub mod error;
pub mod grid;
pub mod materialize;
pub mod merger;
pub mod model;
pub mod recurrence;
pub mod rules;
pub mod slots;
pub mod sort;

pub use availability::{list_room_availability, resolve, Verdict};
pub use config::EngineConfig;
pub use conflict::{find_room_conflicts, find_teacher_conflicts};
pub use day_code::DayCode;
pub use error::TimetableError;
pub use grid::{Cell, OccupancyGrid};
pub use materialize::{CalendarEventInstance, EventKind, Materializer};
pub use merger::{merge_blocks, Block};
pub use model::{Booking, BookingStatus, Catalog, Course, Dataset, Room, ScheduleEntry, Section};
pub use slots::SlotId;
pub use sort::{paginate, sort_rows, toggle_key, Direction, SortKey, SortKeys};
