//! Project recurring classes and one-off bookings onto concrete dates.
//!
//! For every week offset in the window, the anchor date is shifted by whole
//! weeks and each recurring block is placed on every weekday its day code
//! names within that Sunday-based week. Bookings already have a real date and
//! are emitted once, whatever the window.
//!
//! Extended pairs go through [`merger::merge_blocks`] first and yield a single
//! 3h 10m instance per weekday instead of two back-to-back ones.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::config::EngineConfig;
use crate::dst::{self, DstPolicy};
use crate::error::Result;
use crate::merger::{self, Block};
use crate::model::{Booking, BookingStatus, Catalog, ScheduleEntry};
use crate::slots;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Class,
    Booking,
}

/// One dated calendar event. Built fresh on every call and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEventInstance {
    /// Unique per call: `class-{entry}-w{offset}-d{weekday}` or `booking-{id}`.
    pub id: String,
    /// The schedule entry or booking this instance was projected from.
    pub source_id: u32,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub kind: EventKind,
    pub room_id: u32,
}

/// Projects entries into dated instances in one timezone.
#[derive(Debug, Clone)]
pub struct Materializer<'a> {
    catalog: &'a Catalog,
    tz: Tz,
    dst_policy: DstPolicy,
}

impl<'a> Materializer<'a> {
    pub fn new(catalog: &'a Catalog, tz: Tz) -> Self {
        Materializer {
            catalog,
            tz,
            dst_policy: DstPolicy::default(),
        }
    }

    /// # Errors
    /// Returns `TimetableError::InvalidTimezone` if the configured zone is unknown.
    pub fn from_config(catalog: &'a Catalog, config: &EngineConfig) -> Result<Self> {
        Ok(Materializer {
            catalog,
            tz: config.tz()?,
            dst_policy: config.dst_policy,
        })
    }

    pub fn with_dst_policy(mut self, policy: DstPolicy) -> Self {
        self.dst_policy = policy;
        self
    }

    /// Materialize `entries` over `window` (week offsets from `anchor`) plus
    /// every APPROVED booking at its own date.
    ///
    /// A repeated offset is projected once. Output is ordered by start time,
    /// then id.
    pub fn materialize(
        &self,
        entries: &[ScheduleEntry],
        bookings: &[Booking],
        anchor: NaiveDate,
        window: &[i32],
    ) -> Vec<CalendarEventInstance> {
        let blocks = merger::merge_blocks(entries, self.catalog).blocks;
        let offsets: BTreeSet<i32> = window.iter().copied().collect();
        let mut instances = Vec::new();

        for &offset in &offsets {
            let week_start = week_start(anchor + Duration::weeks(i64::from(offset)));
            for block in &blocks {
                for &weekday in block.entry.day.expand() {
                    let date = week_start + Duration::days(i64::from(weekday.num_days_from_sunday()));
                    if let Some(instance) = self.class_instance(block, date, offset, weekday) {
                        instances.push(instance);
                    }
                }
            }
        }

        instances.extend(
            bookings
                .iter()
                .filter(|booking| booking.status == BookingStatus::Approved)
                .filter_map(|booking| self.booking_instance(booking)),
        );

        instances.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        debug!(
            %anchor,
            weeks = offsets.len(),
            instances = instances.len(),
            "materialized calendar window"
        );
        instances
    }

    fn class_instance(
        &self,
        block: &Block,
        date: NaiveDate,
        offset: i32,
        weekday: Weekday,
    ) -> Option<CalendarEventInstance> {
        let (start, end) = block_times(block);
        let (start, end) = self.span(date, start, end)?;
        Some(CalendarEventInstance {
            id: format!(
                "class-{}-w{}-d{}",
                block.entry.id,
                offset,
                weekday.num_days_from_sunday()
            ),
            source_id: block.entry.id,
            title: self.catalog.class_title(block.entry.section_id),
            start,
            end,
            kind: EventKind::Class,
            room_id: block.entry.room_id,
        })
    }

    fn booking_instance(&self, booking: &Booking) -> Option<CalendarEventInstance> {
        let slot = slots::slot(booking.time_slot_id);
        let (start, end) = self.span(booking.booking_date, slot.start, slot.end)?;
        Some(CalendarEventInstance {
            id: format!("booking-{}", booking.id),
            source_id: booking.id,
            title: format!("Booking: {}", booking.reason),
            start,
            end,
            kind: EventKind::Booking,
            room_id: booking.room_id,
        })
    }

    fn span(
        &self,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start_utc = dst::localize(date.and_time(start), self.tz, self.dst_policy)?;
        Some((start_utc, start_utc + (end - start)))
    }
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

fn block_times(block: &Block) -> (NaiveTime, NaiveTime) {
    let first = slots::slot(block.anchor_slot());
    match &block.second {
        Some(second) => (first.start, slots::slot(second.time_slot_id).end),
        None => (first.start, first.end),
    }
}
