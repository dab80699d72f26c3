//! Tests for the room occupancy grid.

use chrono::Weekday;
use timetable_engine::find_room_conflicts;
use timetable_engine::model::{ClassType, Course, DurationMode, Room, ScheduleEntry, Section};
use timetable_engine::{Catalog, Cell, OccupancyGrid, SlotId};

fn slot(n: u8) -> SlotId {
    SlotId::try_from(n).unwrap()
}

fn entry(id: u32, section_id: u32, room_id: u32, day: &str, slot_id: u8) -> ScheduleEntry {
    ScheduleEntry {
        id,
        section_id,
        room_id,
        day: day.parse().unwrap(),
        time_slot_id: slot(slot_id),
    }
}

fn course(id: u32, code: &str, course_type: ClassType, mode: DurationMode) -> Course {
    Course {
        id,
        code: code.to_string(),
        title: format!("{code} title"),
        credits: 3,
        course_type,
        duration_mode: mode,
    }
}

fn section(id: u32, course_id: u32) -> Section {
    Section {
        id,
        section_number: id,
        course_id,
        teacher_id: None,
    }
}

/// Section 7 is an extended lab, section 8 a standard theory course.
fn catalog() -> Catalog {
    Catalog::new(
        &[section(7, 1), section(8, 2)],
        &[
            course(1, "CSE115L", ClassType::Lab, DurationMode::Extended),
            course(2, "CSE115", ClassType::Theory, DurationMode::Standard),
        ],
    )
}

fn nac614() -> Room {
    Room {
        id: 614,
        room_number: "NAC614".to_string(),
        capacity: 40,
        room_type: ClassType::Lab,
    }
}

#[test]
fn extended_lab_spans_two_rows_in_nac614() {
    let room = nac614();
    let entries = vec![entry(1, 7, room.id, "Monday", 1), entry(2, 7, room.id, "Monday", 2)];

    assert!(find_room_conflicts(&entries).is_empty());
    let grid = OccupancyGrid::build(room.id, &entries, &catalog());

    match grid.cell(Weekday::Mon, slot(1)) {
        Cell::Occupied { block, is_extended } => {
            assert!(*is_extended);
            assert_eq!(block.label, "08:00 AM - 11:10 AM");
        }
        other => panic!("expected merged block, got {other:?}"),
    }
    assert_eq!(grid.cell(Weekday::Mon, slot(2)), &Cell::Skip);
    assert!(grid.cell(Weekday::Mon, slot(3)).is_empty());
    assert!(grid.contested().is_empty());
}

#[test]
fn compressed_code_fills_both_weekdays() {
    let entries = vec![entry(1, 8, 1, "MW", 4)];
    let grid = OccupancyGrid::build(1, &entries, &catalog());

    assert!(grid.cell(Weekday::Mon, slot(4)).block().is_some());
    assert!(grid.cell(Weekday::Wed, slot(4)).block().is_some());
    assert!(grid.cell(Weekday::Tue, slot(4)).is_empty());
    assert_eq!(grid.occupied_count(), 2);
}

#[test]
fn standard_blocks_are_not_extended() {
    let entries = vec![entry(1, 8, 1, "ST", 1), entry(2, 8, 1, "ST", 2)];
    let grid = OccupancyGrid::build(1, &entries, &catalog());

    for s in [1, 2] {
        match grid.cell(Weekday::Sun, slot(s)) {
            Cell::Occupied { is_extended, .. } => assert!(!is_extended),
            other => panic!("expected standard block, got {other:?}"),
        }
    }
}

#[test]
fn other_rooms_are_ignored() {
    let entries = vec![entry(1, 8, 2, "MW", 1)];
    let grid = OccupancyGrid::build(1, &entries, &catalog());
    assert_eq!(grid.occupied_count(), 0);
}

#[test]
fn unknown_room_yields_empty_grid() {
    let grid = OccupancyGrid::build(999, &[entry(1, 8, 1, "RA", 3)], &catalog());
    for day in timetable_engine::day_code::WEEK_DAYS {
        assert!(grid.column(day).iter().all(Cell::is_empty));
    }
}

#[test]
fn friday_is_inert_and_unreachable_by_compressed_codes() {
    let entries: Vec<ScheduleEntry> = ["ST", "MW", "RA"]
        .iter()
        .enumerate()
        .map(|(i, code)| entry(i as u32, 8, 1, code, 1))
        .collect();
    let grid = OccupancyGrid::build(1, &entries, &catalog());

    assert!(OccupancyGrid::is_inert(Weekday::Fri));
    assert!(grid.cell(Weekday::Fri, slot(1)).is_empty());
    assert_eq!(grid.occupied_count(), 6);
}

#[test]
fn unpaired_extended_entry_renders_single_row() {
    let entries = vec![entry(1, 7, 1, "Saturday", 5)];
    let grid = OccupancyGrid::build(1, &entries, &catalog());

    match grid.cell(Weekday::Sat, slot(5)) {
        Cell::Occupied { is_extended, .. } => assert!(!is_extended),
        other => panic!("expected single block, got {other:?}"),
    }
    assert!(grid.cell(Weekday::Sat, slot(6)).is_empty());
    assert_eq!(grid.anomalies().len(), 1);
}

#[test]
fn double_claimed_cell_is_exposed_not_repaired() {
    let entries = vec![entry(1, 8, 1, "MW", 2), entry(2, 7, 1, "Monday", 2)];

    let conflicts = find_room_conflicts(&entries);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].entry_ids, vec![1, 2]);

    let grid = OccupancyGrid::build(1, &entries, &catalog());
    assert_eq!(grid.cell(Weekday::Mon, slot(2)).block().map(|b| b.entry.id), Some(1));
    assert_eq!(grid.contested().len(), 1);
    assert_eq!(grid.contested()[0].entry_id, 2);
}

#[test]
fn extended_pair_losing_its_anchor_cell_reports_both_halves() {
    let entries = vec![
        entry(1, 8, 1, "Monday", 1),
        entry(2, 7, 1, "Monday", 1),
        entry(3, 7, 1, "Monday", 2),
    ];
    let grid = OccupancyGrid::build(1, &entries, &catalog());

    assert_eq!(grid.cell(Weekday::Mon, slot(1)).block().map(|b| b.entry.id), Some(1));
    assert!(grid.cell(Weekday::Mon, slot(2)).is_empty());

    let contested: Vec<(u8, u32)> = grid
        .contested()
        .iter()
        .map(|c| (c.slot.get(), c.entry_id))
        .collect();
    assert_eq!(contested, vec![(1, 2), (2, 3)]);
}
