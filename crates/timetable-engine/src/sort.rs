//! Multi-column sorting and page windowing for tabular listings.
//!
//! Sort state is an ordered map of field → direction; position is priority.
//! [`SortKeys::toggle`] is the only way to change it and follows the header
//! click convention: a plain click sorts by that column alone (or flips it if
//! it already is the only key), a modifier click flips an existing key in
//! place or appends a new lowest-priority key.

use std::cmp::Ordering;
use std::hash::Hash;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::day_code::DayCode;
use crate::error::{Result, TimetableError};
use crate::model::{Dataset, Room};
use crate::slots::SlotId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for Direction {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            other => Err(TimetableError::UnknownSortField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortKey<F> {
    pub field: F,
    pub direction: Direction,
}

impl<F: FromStr<Err = TimetableError>> FromStr for SortKey<F> {
    type Err = TimetableError;

    /// `"room"` or `"room:desc"`.
    fn from_str(s: &str) -> Result<Self> {
        let (field, direction) = match s.split_once(':') {
            Some((field, direction)) => (field, direction.parse()?),
            None => (s, Direction::Asc),
        };
        Ok(SortKey {
            field: field.trim().parse()?,
            direction,
        })
    }
}

/// Ordered sort keys, highest priority first.
#[derive(Debug, Clone)]
pub struct SortKeys<F: Hash + Eq> {
    keys: IndexMap<F, Direction>,
}

impl<F: Hash + Eq + Copy> SortKeys<F> {
    pub fn new() -> Self {
        SortKeys {
            keys: IndexMap::new(),
        }
    }

    pub fn single(field: F, direction: Direction) -> Self {
        let mut keys = IndexMap::new();
        keys.insert(field, direction);
        SortKeys { keys }
    }

    /// Build from a priority list. A repeated field keeps its first position
    /// and takes the last direction given.
    pub fn from_keys(keys: impl IntoIterator<Item = SortKey<F>>) -> Self {
        let mut map = IndexMap::new();
        for key in keys {
            map.insert(key.field, key.direction);
        }
        SortKeys { keys: map }
    }

    pub fn direction(&self, field: F) -> Option<Direction> {
        self.keys.get(&field).copied()
    }

    /// Zero-based priority of `field`, if it is a key.
    pub fn priority(&self, field: F) -> Option<usize> {
        self.keys.get_index_of(&field)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SortKey<F>> + '_ {
        self.keys.iter().map(|(&field, &direction)| SortKey { field, direction })
    }

    /// Apply a header click on `clicked`.
    pub fn toggle(&mut self, clicked: F, append: bool) {
        if append {
            match self.keys.get_mut(&clicked) {
                Some(direction) => *direction = direction.flipped(),
                None => {
                    self.keys.insert(clicked, Direction::Asc);
                }
            }
            return;
        }

        let direction = match self.keys.get(&clicked) {
            Some(current) if self.keys.len() == 1 => current.flipped(),
            _ => Direction::Asc,
        };
        self.keys.clear();
        self.keys.insert(clicked, direction);
    }
}

impl<F: Hash + Eq + Copy> Default for SortKeys<F> {
    fn default() -> Self {
        SortKeys::new()
    }
}

impl<F: Hash + Eq + Copy> PartialEq for SortKeys<F> {
    /// Order-sensitive, unlike `IndexMap`'s own equality.
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<F: Hash + Eq + Copy> Eq for SortKeys<F> {}

/// Non-mutating form of [`SortKeys::toggle`].
pub fn toggle_key<F: Hash + Eq + Copy>(current: &SortKeys<F>, clicked: F, append: bool) -> SortKeys<F> {
    let mut next = current.clone();
    next.toggle(clicked, append);
    next
}

/// A row that can be compared column by column.
pub trait SortableRow {
    type Field: Hash + Eq + Copy;

    fn compare_field(&self, other: &Self, field: Self::Field) -> Ordering;
}

/// Stable in-place sort by `keys` in priority order. Rows equal under every
/// key keep their relative order.
pub fn sort_rows<R: SortableRow>(rows: &mut [R], keys: &SortKeys<R::Field>) {
    rows.sort_by(|a, b| {
        keys.iter()
            .map(|key| key.direction.apply(a.compare_field(b, key.field)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

/// Number of pages for `total` rows; an empty listing still has page 1.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size).max(1)
}

/// Caller-side guard: bring `page` into `1..=total_pages`.
pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(total, page_size))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<'a, R> {
    pub items: &'a [R],
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// The `page`-th (1-indexed) window of `rows`.
///
/// # Errors
/// `TimetableError::InvalidPageSize` for a zero page size and
/// `TimetableError::PageOutOfRange` outside `1..=total_pages`. Callers clamp
/// with [`clamp_page`] first; nothing is clamped here.
pub fn paginate<R>(rows: &[R], page: usize, page_size: usize) -> Result<Page<'_, R>> {
    if page_size == 0 {
        return Err(TimetableError::InvalidPageSize);
    }
    let total = rows.len();
    let pages = total_pages(total, page_size);
    if page == 0 || page > pages {
        return Err(TimetableError::PageOutOfRange {
            page,
            total_pages: pages,
        });
    }

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);
    Ok(Page {
        items: &rows[start..end],
        page,
        page_size,
        total,
        total_pages: pages,
    })
}

/// Columns of the schedule management table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleField {
    Code,
    Section,
    Faculty,
    Day,
    Slot,
    Room,
    Availability,
}

impl FromStr for ScheduleField {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "code" | "course" => Ok(ScheduleField::Code),
            "section" => Ok(ScheduleField::Section),
            "faculty" | "teacher" => Ok(ScheduleField::Faculty),
            "day" => Ok(ScheduleField::Day),
            "slot" => Ok(ScheduleField::Slot),
            "room" => Ok(ScheduleField::Room),
            "availability" | "capacity" => Ok(ScheduleField::Availability),
            other => Err(TimetableError::UnknownSortField(other.to_string())),
        }
    }
}

/// A flattened schedule entry as the management table lists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRow {
    pub entry_id: u32,
    pub code: String,
    pub section: u32,
    /// Teacher initial, `"TBA"` when unassigned.
    pub faculty: String,
    pub day: DayCode,
    pub slot: SlotId,
    pub room: String,
    /// Room capacity.
    pub availability: u32,
}

impl ScheduleRow {
    /// One row per schedule entry, in dataset order.
    pub fn from_dataset(dataset: &Dataset) -> Vec<ScheduleRow> {
        let catalog = dataset.catalog();
        dataset
            .schedules
            .iter()
            .map(|entry| {
                let room = dataset.rooms.iter().find(|room| room.id == entry.room_id);
                ScheduleRow {
                    entry_id: entry.id,
                    code: catalog
                        .course_for_section(entry.section_id)
                        .map(|course| course.code.clone())
                        .unwrap_or_default(),
                    section: catalog
                        .section(entry.section_id)
                        .map(|section| section.section_number)
                        .unwrap_or_default(),
                    faculty: catalog
                        .teacher_for_section(entry.section_id)
                        .map(|teacher| teacher.initial.clone())
                        .unwrap_or_else(|| "TBA".to_string()),
                    day: entry.day,
                    slot: entry.time_slot_id,
                    room: room.map(|r| r.room_number.clone()).unwrap_or_default(),
                    availability: room.map(|r| r.capacity).unwrap_or_default(),
                }
            })
            .collect()
    }
}

impl SortableRow for ScheduleRow {
    type Field = ScheduleField;

    fn compare_field(&self, other: &Self, field: ScheduleField) -> Ordering {
        match field {
            ScheduleField::Code => self.code.cmp(&other.code),
            ScheduleField::Section => self.section.cmp(&other.section),
            ScheduleField::Faculty => self.faculty.cmp(&other.faculty),
            ScheduleField::Day => self.day.cmp(&other.day),
            ScheduleField::Slot => self.slot.cmp(&other.slot),
            ScheduleField::Room => self.room.cmp(&other.room),
            ScheduleField::Availability => self.availability.cmp(&other.availability),
        }
    }
}

/// Columns of the room management table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomField {
    RoomNumber,
    Capacity,
    Type,
}

impl FromStr for RoomField {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "room_number" | "room" => Ok(RoomField::RoomNumber),
            "capacity" => Ok(RoomField::Capacity),
            "type" => Ok(RoomField::Type),
            other => Err(TimetableError::UnknownSortField(other.to_string())),
        }
    }
}

impl SortableRow for Room {
    type Field = RoomField;

    fn compare_field(&self, other: &Self, field: RoomField) -> Ordering {
        match field {
            RoomField::RoomNumber => self.room_number.cmp(&other.room_number),
            RoomField::Capacity => self.capacity.cmp(&other.capacity),
            RoomField::Type => self.room_type.cmp(&other.room_type),
        }
    }
}
