//! Tests for projecting recurring entries and bookings into dated instances.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use timetable_engine::config::EngineConfig;
use timetable_engine::dst::{localize, DstPolicy};
use timetable_engine::materialize::week_start;
use timetable_engine::model::{
    Booking, BookingStatus, ClassType, Course, DurationMode, ScheduleEntry, Section,
};
use timetable_engine::{Catalog, EventKind, Materializer, SlotId};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn slot(n: u8) -> SlotId {
    SlotId::try_from(n).unwrap()
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn entry(id: u32, section_id: u32, day: &str, slot_id: u8) -> ScheduleEntry {
    ScheduleEntry {
        id,
        section_id,
        room_id: 1,
        day: day.parse().unwrap(),
        time_slot_id: slot(slot_id),
    }
}

fn booking(id: u32, on: &str, slot_id: u8, status: BookingStatus) -> Booking {
    let booking_date = date(on);
    Booking {
        id,
        user_id: None,
        room_id: 1,
        booking_date,
        day: booking_date.weekday(),
        time_slot_id: slot(slot_id),
        status,
        reason: "Thesis defense".to_string(),
    }
}

fn catalog() -> Catalog {
    Catalog::new(
        &[
            Section { id: 1, section_number: 1, course_id: 1, teacher_id: None },
            Section { id: 7, section_number: 7, course_id: 2, teacher_id: None },
        ],
        &[
            Course {
                id: 1,
                code: "CSE311".to_string(),
                title: "Database Systems".to_string(),
                credits: 3,
                course_type: ClassType::Theory,
                duration_mode: DurationMode::Standard,
            },
            Course {
                id: 2,
                code: "CSE311L".to_string(),
                title: "Database Systems Lab".to_string(),
                credits: 1,
                course_type: ClassType::Lab,
                duration_mode: DurationMode::Extended,
            },
        ],
    )
}

fn dhaka() -> Tz {
    "Asia/Dhaka".parse().unwrap()
}

const ANCHOR: &str = "2026-10-14";
const WINDOW: [i32; 3] = [-1, 0, 1];

// ── Recurring classes ───────────────────────────────────────────────────────

#[test]
fn st_entry_yields_six_instances_over_three_weeks() {
    let catalog = catalog();
    let materializer = Materializer::new(&catalog, dhaka());
    let events = materializer.materialize(&[entry(1, 1, "ST", 1)], &[], date(ANCHOR), &WINDOW);

    assert_eq!(events.len(), 6);
    assert!(events.iter().all(|e| e.kind == EventKind::Class));

    let dates: Vec<NaiveDate> = events
        .iter()
        .map(|e| e.start.with_timezone(&dhaka()).date_naive())
        .collect();
    assert_eq!(
        dates,
        vec![
            date("2026-10-04"),
            date("2026-10-06"),
            date("2026-10-11"),
            date("2026-10-13"),
            date("2026-10-18"),
            date("2026-10-20"),
        ]
    );
}

#[test]
fn instances_carry_slot_times_in_campus_timezone() {
    let catalog = catalog();
    let events = Materializer::new(&catalog, dhaka()).materialize(
        &[entry(1, 1, "MW", 1)],
        &[],
        date(ANCHOR),
        &[0],
    );

    // 08:00-09:30 Asia/Dhaka (UTC+6) on Monday 2026-10-12.
    assert_eq!(events[0].start, Utc.with_ymd_and_hms(2026, 10, 12, 2, 0, 0).unwrap());
    assert_eq!(events[0].end, Utc.with_ymd_and_hms(2026, 10, 12, 3, 30, 0).unwrap());
    assert_eq!(events[0].title, "CSE311 - Database Systems");
}

#[test]
fn instance_ids_are_unique_and_keyed_by_week_and_weekday() {
    let catalog = catalog();
    let entries = vec![entry(1, 1, "ST", 1), entry(2, 1, "RA", 3)];
    let events = Materializer::new(&catalog, dhaka()).materialize(&entries, &[], date(ANCHOR), &WINDOW);

    let ids: HashSet<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), events.len());
    assert!(ids.contains("class-1-w-1-d0"));
    assert!(ids.contains("class-2-w1-d6"));
}

#[test]
fn repeated_week_offsets_are_projected_once() {
    let catalog = catalog();
    let events = Materializer::new(&catalog, dhaka()).materialize(
        &[entry(1, 1, "ST", 1)],
        &[],
        date(ANCHOR),
        &[0, 0, 1, 0],
    );

    let ids: HashSet<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(events.len(), 4);
    assert_eq!(ids.len(), 4);
}

#[test]
fn extended_pair_becomes_one_long_instance_per_week() {
    let catalog = catalog();
    let entries = vec![entry(10, 7, "Monday", 1), entry(11, 7, "Monday", 2)];
    let events = Materializer::new(&catalog, dhaka()).materialize(&entries, &[], date(ANCHOR), &WINDOW);

    assert_eq!(events.len(), 3);
    for event in &events {
        assert_eq!((event.end - event.start).num_minutes(), 190);
        assert_eq!(event.source_id, 10);
    }
}

#[test]
fn empty_window_projects_no_classes() {
    let catalog = catalog();
    let events = Materializer::new(&catalog, dhaka()).materialize(&[entry(1, 1, "ST", 1)], &[], date(ANCHOR), &[]);
    assert!(events.is_empty());
}

#[test]
fn new_anchor_replaces_previous_output() {
    let catalog = catalog();
    let materializer = Materializer::new(&catalog, dhaka());
    let entries = vec![entry(1, 1, "MW", 2)];

    let this_week = materializer.materialize(&entries, &[], date(ANCHOR), &[0]);
    let next_week = materializer.materialize(&entries, &[], date("2026-10-21"), &[0]);

    assert_eq!(this_week.len(), 2);
    assert_eq!(next_week.len(), 2);
    assert!(next_week.iter().all(|e| e.start > this_week[1].start));
}

// ── Bookings ────────────────────────────────────────────────────────────────

#[test]
fn booking_yields_exactly_one_instance_whatever_the_window() {
    let catalog = catalog();
    let materializer = Materializer::new(&catalog, dhaka());
    let bookings = vec![booking(5, "2026-12-01", 4, BookingStatus::Approved)];

    for window in [&[0][..], &WINDOW[..], &[-3, -2, -1, 0, 1, 2, 3][..]] {
        let events = materializer.materialize(&[], &bookings, date(ANCHOR), window);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Booking);
        assert_eq!(events[0].id, "booking-5");
        assert_eq!(events[0].title, "Booking: Thesis defense");
    }
}

#[test]
fn only_approved_bookings_are_materialized() {
    let catalog = catalog();
    let bookings = vec![
        booking(1, "2026-10-16", 1, BookingStatus::Pending),
        booking(2, "2026-10-16", 2, BookingStatus::Rejected),
        booking(3, "2026-10-16", 3, BookingStatus::Approved),
    ];
    let events = Materializer::new(&catalog, dhaka()).materialize(&[], &bookings, date(ANCHOR), &WINDOW);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].source_id, 3);
}

#[test]
fn output_is_sorted_by_start() {
    let catalog = catalog();
    let entries = vec![entry(1, 1, "RA", 7), entry(2, 1, "ST", 1)];
    let bookings = vec![booking(3, "2026-10-16", 1, BookingStatus::Approved)];
    let events = Materializer::new(&catalog, dhaka()).materialize(&entries, &bookings, date(ANCHOR), &WINDOW);

    assert_eq!(events.len(), 13);
    for pair in events.windows(2) {
        assert!(pair[0].start <= pair[1].start);
    }
}

// ── Week arithmetic & timezone handling ─────────────────────────────────────

#[test]
fn weeks_start_on_sunday() {
    assert_eq!(week_start(date("2026-10-14")), date("2026-10-11"));
    assert_eq!(week_start(date("2026-10-11")), date("2026-10-11"));
    assert_eq!(week_start(date("2026-10-17")).weekday(), Weekday::Sun);
}

#[test]
fn materializer_reads_timezone_from_config() {
    let catalog = catalog();
    let config = EngineConfig {
        timezone: "UTC".to_string(),
        ..EngineConfig::default()
    };
    let events = Materializer::from_config(&catalog, &config)
        .unwrap()
        .materialize(&[entry(1, 1, "MW", 1)], &[], date(ANCHOR), &[0]);
    assert_eq!(events[0].start, Utc.with_ymd_and_hms(2026, 10, 12, 8, 0, 0).unwrap());

    let bad = EngineConfig {
        timezone: "Mars/Olympus".to_string(),
        ..EngineConfig::default()
    };
    assert!(Materializer::from_config(&catalog, &bad).is_err());
}

#[test]
fn dst_gap_follows_policy() {
    let tz: Tz = "America/New_York".parse().unwrap();
    let in_gap = date("2026-03-08").and_hms_opt(2, 30, 0).unwrap();

    assert_eq!(localize(in_gap, tz, DstPolicy::Skip), None);
    assert_eq!(
        localize(in_gap, tz, DstPolicy::ShiftForward),
        Some(Utc.with_ymd_and_hms(2026, 3, 8, 7, 30, 0).unwrap())
    );
}
