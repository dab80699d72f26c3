//! Consistency rules between a course and its schedule entries.
//!
//! Theory courses use compressed day codes; labs use literal weekdays. Extended
//! courses must start at slot 1, 3 or 5. Friday entries are legal (Friday
//! bookings exist) but are never produced by a compressed code.

use serde::Serialize;

use crate::day_code::DayCode;
use crate::model::{Catalog, ClassType, DurationMode, ScheduleEntry};

impl ClassType {
    /// Day codes the scheduler assigns for this course type. Lab days exclude
    /// Friday.
    pub fn allowed_day_codes(self) -> &'static [DayCode] {
        match self {
            ClassType::Theory => &DayCode::COMPRESSED,
            ClassType::Lab => &[
                DayCode::Sunday,
                DayCode::Monday,
                DayCode::Tuesday,
                DayCode::Wednesday,
                DayCode::Thursday,
                DayCode::Saturday,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryViolation {
    /// A lab course scheduled with a compressed day code.
    CompressedDayForLab,
    /// A theory course scheduled on a literal weekday.
    LiteralDayForTheory,
    /// An extended course whose entry sits at slot 7.
    ExtendedAtLastSlot,
    /// The entry's section or course is not in the catalog.
    UnknownSection,
}

/// Check one entry against its course.
///
/// Friday literal entries are not a violation; see [`is_friday`].
pub fn validate_entry(entry: &ScheduleEntry, catalog: &Catalog) -> Vec<EntryViolation> {
    let Some(course) = catalog.course_for_section(entry.section_id) else {
        return vec![EntryViolation::UnknownSection];
    };

    let mut violations = Vec::new();
    match (course.course_type, entry.day.is_compressed()) {
        (ClassType::Lab, true) => violations.push(EntryViolation::CompressedDayForLab),
        (ClassType::Theory, false) if entry.day != DayCode::Friday => {
            violations.push(EntryViolation::LiteralDayForTheory)
        }
        _ => {}
    }
    if course.duration_mode == DurationMode::Extended && entry.time_slot_id.next().is_none() {
        violations.push(EntryViolation::ExtendedAtLastSlot);
    }
    violations
}

/// Friday entries come only from literal days.
pub fn is_friday(entry: &ScheduleEntry) -> bool {
    entry.day == DayCode::Friday
}
