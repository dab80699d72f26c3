//! Day × slot occupancy matrix for one room.
//!
//! Columns are the seven weekdays, Sunday first; Friday is present but
//! conventionally rendered inert. Rows are the seven slots. Extended blocks
//! occupy their anchor cell with `is_extended` set and mark the cell below as
//! [`Cell::Skip`].
//!
//! The builder is read-only. Two sections claiming one cell is a room conflict
//! that must be prevented upstream; here the first claimant wins the cell and
//! the rest are listed in [`OccupancyGrid::contested`].

use chrono::Weekday;
use serde::Serialize;
use tracing::{debug, warn};

use crate::day_code::WEEK_DAYS;
use crate::merger::{self, Block, MergeAnomaly};
use crate::model::{DurationLookup, ScheduleEntry};
use crate::slots::{SlotId, SLOT_COUNT};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cell {
    Empty,
    /// Covered by the extended block in the row above; render nothing.
    Skip,
    Occupied {
        block: Block,
        is_extended: bool,
    },
}

impl Cell {
    pub fn block(&self) -> Option<&Block> {
        match self {
            Cell::Occupied { block, .. } => Some(block),
            _ => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Cell::Skip)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// A cell claimed by more than one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContestedCell {
    pub day: Weekday,
    pub slot: SlotId,
    pub entry_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyGrid {
    pub room_id: u32,
    /// `cells[day][slot]`, indexed by weekday-from-Sunday and zero-based slot.
    cells: Vec<Vec<Cell>>,
    contested: Vec<ContestedCell>,
    anomalies: Vec<MergeAnomaly>,
}

impl OccupancyGrid {
    /// Build the grid for `room_id` from the full entry list.
    ///
    /// Entries for other rooms are ignored, so an unknown room yields an empty
    /// grid rather than an error.
    pub fn build(room_id: u32, entries: &[ScheduleEntry], modes: &impl DurationLookup) -> Self {
        let room_entries: Vec<ScheduleEntry> = entries
            .iter()
            .filter(|entry| entry.room_id == room_id)
            .cloned()
            .collect();
        let outcome = merger::merge_blocks(&room_entries, modes);

        let mut grid = OccupancyGrid {
            room_id,
            cells: vec![vec![Cell::Empty; usize::from(SLOT_COUNT)]; WEEK_DAYS.len()],
            contested: Vec::new(),
            anomalies: outcome.anomalies,
        };

        for block in outcome.blocks {
            for &day in block.entry.day.expand() {
                grid.place(day, &block);
            }
        }

        debug!(
            room_id,
            entries = room_entries.len(),
            contested = grid.contested.len(),
            "built occupancy grid"
        );
        grid
    }

    fn place(&mut self, day: Weekday, block: &Block) {
        let column = day_index(day);
        let anchor = block.anchor_slot();

        if self.cells[column][anchor.index()].is_empty() {
            self.cells[column][anchor.index()] = Cell::Occupied {
                block: block.clone(),
                is_extended: block.is_extended(),
            };
        } else {
            // The block is not drawn, so its second half is contested too.
            self.contest(day, anchor, block.entry.id);
            if let Some(second) = &block.second {
                self.contest(day, second.time_slot_id, second.id);
            }
            return;
        }

        if let Some(second) = &block.second {
            let covered = second.time_slot_id;
            if self.cells[column][covered.index()].is_empty() {
                self.cells[column][covered.index()] = Cell::Skip;
            } else {
                self.contest(day, covered, second.id);
            }
        }
    }

    fn contest(&mut self, day: Weekday, slot: SlotId, entry_id: u32) {
        warn!(
            room_id = self.room_id,
            ?day,
            slot = slot.get(),
            entry_id,
            "room conflict: cell already claimed"
        );
        self.contested.push(ContestedCell { day, slot, entry_id });
    }

    pub fn cell(&self, day: Weekday, slot: SlotId) -> &Cell {
        &self.cells[day_index(day)][slot.index()]
    }

    /// One weekday's column, slot 1 first.
    pub fn column(&self, day: Weekday) -> &[Cell] {
        &self.cells[day_index(day)]
    }

    /// Friday is shown but disabled in the grid.
    pub fn is_inert(day: Weekday) -> bool {
        day == Weekday::Fri
    }

    pub fn contested(&self) -> &[ContestedCell] {
        &self.contested
    }

    pub fn anomalies(&self) -> &[MergeAnomaly] {
        &self.anomalies
    }

    pub fn occupied_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.block().is_some())
            .count()
    }
}

fn day_index(day: Weekday) -> usize {
    day.num_days_from_sunday() as usize
}
