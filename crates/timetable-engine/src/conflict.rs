//! Detect double-booked rooms and teachers in the recurring timetable.
//!
//! Entries are compared on expanded weekdays, so `MW` at slot 2 collides with
//! a literal `Monday` at slot 2 in the same room. The occupancy grid assumes
//! these checks come back empty.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::Serialize;
use tracing::warn;

use crate::model::{Catalog, ScheduleEntry};
use crate::slots::SlotId;

/// Two or more entries holding one room at the same weekday and slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomConflict {
    pub room_id: u32,
    pub day: Weekday,
    pub slot: SlotId,
    pub entry_ids: Vec<u32>,
}

/// One teacher scheduled twice at the same weekday and slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherConflict {
    pub teacher_id: u32,
    pub day: Weekday,
    pub slot: SlotId,
    pub entry_ids: Vec<u32>,
}

/// Find every (room, weekday, slot) claimed by more than one entry.
///
/// Results are ordered by room, weekday (Sunday first) and slot.
pub fn find_room_conflicts(entries: &[ScheduleEntry]) -> Vec<RoomConflict> {
    group_by_weekday_slot(entries, |entry| Some(entry.room_id))
        .into_iter()
        .map(|((room_id, day, slot), entry_ids)| {
            warn!(room_id, ?day, slot = slot.get(), ?entry_ids, "room conflict");
            RoomConflict {
                room_id,
                day,
                slot,
                entry_ids,
            }
        })
        .collect()
}

/// Find every (teacher, weekday, slot) claimed by more than one entry.
///
/// Sections with no assigned teacher are skipped.
pub fn find_teacher_conflicts(entries: &[ScheduleEntry], catalog: &Catalog) -> Vec<TeacherConflict> {
    group_by_weekday_slot(entries, |entry| {
        catalog
            .section(entry.section_id)
            .and_then(|section| section.teacher_id)
    })
    .into_iter()
    .map(|((teacher_id, day, slot), entry_ids)| {
        warn!(teacher_id, ?day, slot = slot.get(), ?entry_ids, "teacher conflict");
        TeacherConflict {
            teacher_id,
            day,
            slot,
            entry_ids,
        }
    })
    .collect()
}

fn group_by_weekday_slot(
    entries: &[ScheduleEntry],
    owner: impl Fn(&ScheduleEntry) -> Option<u32>,
) -> Vec<((u32, Weekday, SlotId), Vec<u32>)> {
    let mut groups: BTreeMap<(u32, u32, SlotId), (Weekday, Vec<u32>)> = BTreeMap::new();

    for entry in entries {
        let Some(owner_id) = owner(entry) else {
            continue;
        };
        for &day in entry.day.expand() {
            groups
                .entry((owner_id, day.num_days_from_sunday(), entry.time_slot_id))
                .or_insert_with(|| (day, Vec::new()))
                .1
                .push(entry.id);
        }
    }

    groups
        .into_iter()
        .filter(|(_, (_, ids))| ids.len() > 1)
        .map(|((owner_id, _, slot), (day, ids))| ((owner_id, day, slot), ids))
        .collect()
}
