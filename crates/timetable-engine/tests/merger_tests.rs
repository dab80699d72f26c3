//! Tests for extended-pair merging.

use std::collections::HashMap;

use timetable_engine::merger::{merge_blocks, AnomalyKind};
use timetable_engine::model::{DurationMode, ScheduleEntry};
use timetable_engine::slots::DurationTag;
use timetable_engine::{DayCode, SlotId};

fn entry(id: u32, section_id: u32, day: &str, slot: u8) -> ScheduleEntry {
    ScheduleEntry {
        id,
        section_id,
        room_id: 1,
        day: day.parse().unwrap(),
        time_slot_id: SlotId::try_from(slot).unwrap(),
    }
}

fn modes(pairs: &[(u32, DurationMode)]) -> HashMap<u32, DurationMode> {
    pairs.iter().copied().collect()
}

#[test]
fn extended_pair_collapses_into_one_block() {
    let entries = vec![entry(10, 7, "Monday", 1), entry(11, 7, "Monday", 2)];
    let outcome = merge_blocks(&entries, &modes(&[(7, DurationMode::Extended)]));

    assert_eq!(outcome.blocks.len(), 1);
    let block = &outcome.blocks[0];
    assert!(block.is_extended());
    assert_eq!(block.anchor_slot().get(), 1);
    assert_eq!(block.label, "08:00 AM - 11:10 AM");
    assert_eq!(block.duration, DurationTag::Extended);
    assert_eq!(block.second.as_ref().map(|e| e.id), Some(11));
    assert_eq!(outcome.consumed_ids(), vec![11]);
    assert!(outcome.anomalies.is_empty());
}

#[test]
fn input_order_does_not_matter() {
    let entries = vec![entry(11, 7, "Monday", 2), entry(10, 7, "Monday", 1)];
    let outcome = merge_blocks(&entries, &modes(&[(7, DurationMode::Extended)]));

    assert_eq!(outcome.blocks.len(), 1);
    assert_eq!(outcome.blocks[0].entry.id, 10);
}

#[test]
fn missing_second_half_degrades_to_single_block() {
    let entries = vec![entry(10, 7, "Monday", 3)];
    let outcome = merge_blocks(&entries, &modes(&[(7, DurationMode::Extended)]));

    assert_eq!(outcome.blocks.len(), 1);
    assert!(!outcome.blocks[0].is_extended());
    assert_eq!(outcome.blocks[0].label, "11:20 AM - 12:50 PM");
    assert_eq!(outcome.anomalies.len(), 1);
    assert_eq!(outcome.anomalies[0].kind, AnomalyKind::MissingSecondHalf);
    assert_eq!(outcome.anomalies[0].entry_id, 10);
}

#[test]
fn orphan_second_half_is_reported_not_dropped() {
    let entries = vec![entry(11, 7, "Monday", 2)];
    let outcome = merge_blocks(&entries, &modes(&[(7, DurationMode::Extended)]));

    assert_eq!(outcome.entry_count(), 1);
    assert_eq!(outcome.anomalies[0].kind, AnomalyKind::MissingFirstHalf);
}

#[test]
fn standard_entries_pass_through_unchanged() {
    let entries = vec![entry(1, 3, "ST", 1), entry(2, 3, "ST", 2)];
    let outcome = merge_blocks(&entries, &modes(&[]));

    assert_eq!(outcome.blocks.len(), 2);
    assert!(outcome.blocks.iter().all(|b| !b.is_extended()));
    assert!(outcome.blocks.iter().all(|b| b.duration == DurationTag::Standard));
    assert_eq!(outcome.blocks[0].entry, entries[0]);
}

#[test]
fn siblings_must_share_section_day_and_room() {
    let mut other_room = entry(13, 7, "Monday", 2);
    other_room.room_id = 2;
    let entries = vec![
        entry(10, 7, "Monday", 1),
        entry(11, 8, "Monday", 2),
        entry(12, 7, "Tuesday", 2),
        other_room,
    ];
    let outcome = merge_blocks(
        &entries,
        &modes(&[(7, DurationMode::Extended), (8, DurationMode::Standard)]),
    );

    assert!(outcome.blocks.iter().all(|b| !b.is_extended()));
    assert_eq!(outcome.blocks.len(), 4);
}

#[test]
fn even_start_slots_never_merge() {
    let entries = vec![entry(10, 7, "Monday", 2), entry(11, 7, "Monday", 3)];
    let outcome = merge_blocks(&entries, &modes(&[(7, DurationMode::Extended)]));

    assert_eq!(outcome.blocks.len(), 2);
    assert!(outcome.blocks.iter().all(|b| !b.is_extended()));
    assert_eq!(outcome.anomalies.len(), 2);
}

#[test]
fn every_entry_appears_exactly_once() {
    let entries = vec![
        entry(1, 7, "Monday", 1),
        entry(2, 7, "Monday", 2),
        entry(3, 7, "Wednesday", 5),
        entry(4, 9, "MW", 4),
        entry(5, 7, "Saturday", 6),
        entry(6, 7, "Wednesday", 6),
    ];
    let outcome = merge_blocks(
        &entries,
        &modes(&[(7, DurationMode::Extended), (9, DurationMode::Standard)]),
    );

    let mut seen: Vec<u32> = outcome
        .blocks
        .iter()
        .flat_map(|b| std::iter::once(b.entry.id).chain(b.second.as_ref().map(|e| e.id)))
        .collect();
    seen.sort();
    assert_eq!(seen, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(outcome.entry_count(), entries.len());
    assert_eq!(outcome.consumed_ids(), vec![2, 6]);
    assert_eq!(outcome.anomalies.len(), 1, "only Saturday slot 6 is orphaned");
}

#[test]
fn blocks_are_ordered_by_anchor_slot() {
    let entries = vec![entry(3, 1, "RA", 6), entry(1, 2, "RA", 2), entry(2, 3, "RA", 4)];
    let outcome = merge_blocks(&entries, &modes(&[]));
    let slots: Vec<u8> = outcome.blocks.iter().map(|b| b.anchor_slot().get()).collect();
    assert_eq!(slots, vec![2, 4, 6]);
    assert_eq!(outcome.blocks[0].entry.day, DayCode::ThursdaySaturday);
}
