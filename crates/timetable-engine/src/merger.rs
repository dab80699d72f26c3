//! Collapse extended-duration entry pairs into single blocks.
//!
//! An extended course is stored as two schedule entries: one at an odd start
//! slot (1, 3 or 5) and its sibling at the next slot, both with the same
//! section, room and day code. Every view that renders or projects entries goes
//! through [`merge_blocks`] so the pairing rule lives in one place.
//!
//! Every input entry ends up in exactly one place: as its own block, or as the
//! `second` half of a merged block.

use serde::Serialize;
use tracing::warn;

use crate::model::{DurationLookup, DurationMode, ScheduleEntry};
use crate::slots::{self, DurationTag, SlotId};

/// A renderable unit: one standard entry, or an extended pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    /// The entry the block is anchored at (the first slot for a pair).
    pub entry: ScheduleEntry,
    /// The sibling entry consumed by an extended pair.
    pub second: Option<ScheduleEntry>,
    /// `"08:00 AM - 11:10 AM"` for a pair, the single slot label otherwise.
    pub label: String,
    pub duration: DurationTag,
}

impl Block {
    pub fn is_extended(&self) -> bool {
        self.second.is_some()
    }

    pub fn anchor_slot(&self) -> SlotId {
        self.entry.time_slot_id
    }

    /// Slots this block covers, anchor first.
    pub fn slots(&self) -> Vec<SlotId> {
        let mut covered = vec![self.entry.time_slot_id];
        if let Some(second) = &self.second {
            covered.push(second.time_slot_id);
        }
        covered
    }

    fn standalone(entry: &ScheduleEntry) -> Block {
        Block {
            entry: entry.clone(),
            second: None,
            label: slots::slot(entry.time_slot_id).label(),
            duration: DurationTag::Standard,
        }
    }
}

/// Why an extended entry was emitted on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyKind {
    /// First half at slot 1/3/5 with no sibling at the next slot.
    MissingSecondHalf,
    /// An extended entry at an even slot or slot 7 with no first half before it.
    MissingFirstHalf,
}

/// A non-fatal data inconsistency found while merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeAnomaly {
    pub entry_id: u32,
    pub section_id: u32,
    pub kind: AnomalyKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeOutcome {
    /// Blocks ordered by anchor slot, then entry id.
    pub blocks: Vec<Block>,
    pub anomalies: Vec<MergeAnomaly>,
}

impl MergeOutcome {
    /// Number of input entries accounted for (merged pairs count twice).
    pub fn entry_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| if block.is_extended() { 2 } else { 1 })
            .sum()
    }

    /// Ids of entries folded into another block and never rendered themselves.
    pub fn consumed_ids(&self) -> Vec<u32> {
        self.blocks
            .iter()
            .filter_map(|block| block.second.as_ref().map(|e| e.id))
            .collect()
    }
}

/// Pair up extended entries and pass standard entries through.
///
/// `entries` may span several rooms and day codes; siblings must match on
/// section, room and day code. An extended entry whose sibling is missing is
/// emitted unmerged and recorded in [`MergeOutcome::anomalies`].
pub fn merge_blocks(entries: &[ScheduleEntry], modes: &impl DurationLookup) -> MergeOutcome {
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by_key(|&i| (entries[i].time_slot_id, entries[i].id));

    let mut consumed = vec![false; entries.len()];
    let mut outcome = MergeOutcome::default();

    for &i in &order {
        if consumed[i] {
            continue;
        }
        consumed[i] = true;
        let entry = &entries[i];

        if modes.duration_mode(entry.section_id) != DurationMode::Extended {
            outcome.blocks.push(Block::standalone(entry));
            continue;
        }

        let pairing = slots::extended(entry.time_slot_id).ok().and_then(|span| {
            let partner = order.iter().copied().find(|&j| {
                !consumed[j] && is_sibling(entry, &entries[j], span.second.id)
            })?;
            Some((span, partner))
        });

        match pairing {
            Some((span, j)) => {
                consumed[j] = true;
                outcome.blocks.push(Block {
                    entry: entry.clone(),
                    second: Some(entries[j].clone()),
                    label: span.label(),
                    duration: DurationTag::Extended,
                });
            }
            None => {
                let kind = if entry.time_slot_id.is_extended_start() {
                    AnomalyKind::MissingSecondHalf
                } else {
                    AnomalyKind::MissingFirstHalf
                };
                warn!(
                    entry_id = entry.id,
                    section_id = entry.section_id,
                    slot = entry.time_slot_id.get(),
                    ?kind,
                    "extended entry has no sibling; rendering it alone"
                );
                outcome.anomalies.push(MergeAnomaly {
                    entry_id: entry.id,
                    section_id: entry.section_id,
                    kind,
                });
                outcome.blocks.push(Block::standalone(entry));
            }
        }
    }

    outcome
}

fn is_sibling(first: &ScheduleEntry, candidate: &ScheduleEntry, slot: SlotId) -> bool {
    candidate.time_slot_id == slot
        && candidate.section_id == first.section_id
        && candidate.room_id == first.room_id
        && candidate.day == first.day
}
