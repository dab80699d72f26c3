//! Timetable records as read from the persistence layer.
//!
//! The engine never owns or mutates these. They deserialize directly from the
//! JSON the portal's API returns, and [`Catalog`] indexes sections and courses
//! so the views can ask "what course is section 7" without re-scanning.

use std::collections::HashMap;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::day_code::{self, DayCode};
use crate::error::Result;
use crate::slots::SlotId;

/// Course kind. Rooms carry the same tag: a LAB course belongs in a LAB room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassType {
    Theory,
    Lab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DurationMode {
    /// One slot, 1h 30m.
    #[default]
    Standard,
    /// Two consecutive slots, 3h 10m.
    Extended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: u32,
    pub room_number: String,
    pub capacity: u32,
    #[serde(rename = "type")]
    pub room_type: ClassType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: u32,
    pub code: String,
    pub title: String,
    pub credits: u8,
    #[serde(rename = "type")]
    pub course_type: ClassType,
    #[serde(default)]
    pub duration_mode: DurationMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: u32,
    pub section_number: u32,
    pub course_id: u32,
    /// `None` while the teacher is still TBA.
    #[serde(default)]
    pub teacher_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: u32,
    pub initial: String,
    #[serde(default)]
    pub name: String,
}

/// One recurring allocation of a section to a room, day code and slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: u32,
    pub section_id: u32,
    pub room_id: u32,
    pub day: DayCode,
    pub time_slot_id: SlotId,
}

/// A one-off room request for a single calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: u32,
    #[serde(default)]
    pub user_id: Option<u32>,
    pub room_id: u32,
    pub booking_date: NaiveDate,
    /// Weekday of `booking_date`, stored alongside it by the booking form.
    #[serde(with = "day_code::weekday_serde")]
    pub day: Weekday,
    pub time_slot_id: SlotId,
    #[serde(default)]
    pub status: BookingStatus,
    pub reason: String,
}

impl Booking {
    /// Whether this booking still holds its slot (PENDING or APPROVED).
    pub fn is_live(&self) -> bool {
        self.status != BookingStatus::Rejected
    }

    pub fn holds(&self, room_id: u32, date: NaiveDate, slot: SlotId) -> bool {
        self.room_id == room_id && self.booking_date == date && self.time_slot_id == slot
    }
}

/// Answers which duration mode a section's course runs in.
pub trait DurationLookup {
    fn duration_mode(&self, section_id: u32) -> DurationMode;
}

impl DurationLookup for HashMap<u32, DurationMode> {
    fn duration_mode(&self, section_id: u32) -> DurationMode {
        self.get(&section_id).copied().unwrap_or_default()
    }
}

/// Sections and courses indexed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sections: HashMap<u32, Section>,
    courses: HashMap<u32, Course>,
    teachers: HashMap<u32, Teacher>,
}

impl Catalog {
    pub fn new(sections: &[Section], courses: &[Course]) -> Self {
        Catalog {
            sections: sections.iter().map(|s| (s.id, s.clone())).collect(),
            courses: courses.iter().map(|c| (c.id, c.clone())).collect(),
            teachers: HashMap::new(),
        }
    }

    pub fn with_teachers(mut self, teachers: &[Teacher]) -> Self {
        self.teachers = teachers.iter().map(|t| (t.id, t.clone())).collect();
        self
    }

    pub fn section(&self, section_id: u32) -> Option<&Section> {
        self.sections.get(&section_id)
    }

    pub fn course_for_section(&self, section_id: u32) -> Option<&Course> {
        self.section(section_id)
            .and_then(|section| self.courses.get(&section.course_id))
    }

    pub fn teacher_for_section(&self, section_id: u32) -> Option<&Teacher> {
        self.section(section_id)
            .and_then(|section| section.teacher_id)
            .and_then(|teacher_id| self.teachers.get(&teacher_id))
    }

    /// `"CSE115L - Programming Language I Lab"`, or `"Section 7"` when the
    /// course is unknown.
    pub fn class_title(&self, section_id: u32) -> String {
        match self.course_for_section(section_id) {
            Some(course) => format!("{} - {}", course.code, course.title),
            None => format!("Section {}", section_id),
        }
    }
}

impl DurationLookup for Catalog {
    /// Unknown sections are treated as standard.
    fn duration_mode(&self, section_id: u32) -> DurationMode {
        self.course_for_section(section_id)
            .map(|course| course.duration_mode)
            .unwrap_or_default()
    }
}

/// Everything the views read, as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub schedules: Vec<ScheduleEntry>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

impl Dataset {
    /// Parse a dataset from JSON.
    ///
    /// # Errors
    /// Returns `TimetableError::Json` on malformed input, including unknown day
    /// codes and out-of-range slot ids.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(&self.sections, &self.courses).with_teachers(&self.teachers)
    }

    pub fn room_by_number(&self, room_number: &str) -> Option<&Room> {
        self.rooms
            .iter()
            .find(|room| room.room_number.eq_ignore_ascii_case(room_number))
    }
}
