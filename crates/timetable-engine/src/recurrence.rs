//! Semester export: schedule entries as weekly RRULEs.
//!
//! External calendars receive each class as one recurring event
//! (`FREQ=WEEKLY;COUNT=28;BYDAY=SU,TU`) instead of per-week copies. The same
//! rule is expanded here with the `rrule` crate so the export can be checked
//! against the occupancy views.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use rrule::RRuleSet;
use serde::Serialize;

use crate::day_code::DayCode;
use crate::error::{Result, TimetableError};
use crate::model::DurationMode;
use crate::slots::{self, SlotId};

/// A single expanded occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// One entry's recurrence in export form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemesterRule {
    /// `FREQ=WEEKLY;COUNT=..;BYDAY=..`
    pub rrule: String,
    /// First occurrence, local time.
    pub dtstart: NaiveDateTime,
    pub duration_minutes: i64,
    pub timezone: String,
}

/// RFC 5545 BYDAY list for a day code, e.g. `"SU,TU"`.
pub fn byday(day: DayCode) -> String {
    day.expand()
        .iter()
        .map(|weekday| match weekday {
            chrono::Weekday::Mon => "MO",
            chrono::Weekday::Tue => "TU",
            chrono::Weekday::Wed => "WE",
            chrono::Weekday::Thu => "TH",
            chrono::Weekday::Fri => "FR",
            chrono::Weekday::Sat => "SA",
            chrono::Weekday::Sun => "SU",
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Weekly RRULE for a day code, with an optional COUNT.
pub fn to_rrule(day: DayCode, count: Option<u32>) -> String {
    match count {
        Some(c) => format!("FREQ=WEEKLY;COUNT={};BYDAY={}", c, byday(day)),
        None => format!("FREQ=WEEKLY;BYDAY={}", byday(day)),
    }
}

/// The first date on or after `from` that `day` covers.
pub fn first_occurrence(day: DayCode, from: NaiveDate) -> NaiveDate {
    (0..7)
        .map(|n| from + Duration::days(n))
        .find(|date| day.matches(date.weekday()))
        .unwrap_or(from)
}

/// Build the export rule for an entry over `weeks` teaching weeks.
///
/// # Errors
/// Returns `TimetableError::Expansion` if `weeks * |days|` overflows.
pub fn semester_rule(
    day: DayCode,
    slot: SlotId,
    mode: DurationMode,
    semester_start: NaiveDate,
    weeks: u32,
    tz: Tz,
) -> Result<SemesterRule> {
    let (start, duration_minutes) = slot_span(slot, mode);
    Ok(SemesterRule {
        rrule: to_rrule(day, Some(occurrence_count(day, weeks)?)),
        dtstart: first_occurrence(day, semester_start).and_time(start),
        duration_minutes,
        timezone: tz.name().to_string(),
    })
}

fn occurrence_count(day: DayCode, weeks: u32) -> Result<u32> {
    weeks
        .checked_mul(day.expand().len() as u32)
        .ok_or_else(|| TimetableError::Expansion(format!("{} weeks is too many", weeks)))
}

/// Expand an entry's weekly recurrence across a semester.
///
/// `exdates` are holiday dates; occurrences on them are dropped and not made
/// up later, so the result may be shorter than `weeks * |days|`.
///
/// # Errors
/// Returns `TimetableError::InvalidRule` if the generated rule fails to parse
/// and `TimetableError::Expansion` if the occurrence count does not fit.
pub fn expand_semester(
    day: DayCode,
    slot: SlotId,
    mode: DurationMode,
    semester_start: NaiveDate,
    weeks: u32,
    tz: Tz,
    exdates: &[NaiveDate],
) -> Result<Vec<Occurrence>> {
    if weeks == 0 {
        return Ok(Vec::new());
    }
    let rule = semester_rule(day, slot, mode, semester_start, weeks, tz)?;
    let count = occurrence_count(day, weeks)?;
    // `.all(limit)` counts before EXDATE filtering.
    let limit = u16::try_from(count.saturating_add(exdates.len() as u32))
        .map_err(|_| TimetableError::Expansion(format!("{} occurrences is too many", count)))?;

    let mut rrule_text = format!(
        "DTSTART;TZID={}:{}\nRRULE:{}",
        rule.timezone,
        ical_local(rule.dtstart),
        rule.rrule
    );

    if !exdates.is_empty() {
        let start_time = rule.dtstart.time();
        let exdate_icals: Vec<String> = exdates
            .iter()
            .map(|date| ical_local(date.and_time(start_time)))
            .collect();
        rrule_text.push_str(&format!(
            "\nEXDATE;TZID={}:{}",
            rule.timezone,
            exdate_icals.join(",")
        ));
    }

    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| TimetableError::InvalidRule(format!("{}", e)))?;

    let duration = Duration::minutes(rule.duration_minutes);
    let mut occurrences: Vec<Occurrence> = rrule_set
        .all(limit)
        .dates
        .into_iter()
        .map(|dt| {
            let start: DateTime<Utc> = dt.with_timezone(&Utc);
            Occurrence {
                start,
                end: start + duration,
            }
        })
        .collect();
    occurrences.truncate(count as usize);

    Ok(occurrences)
}

fn slot_span(slot: SlotId, mode: DurationMode) -> (chrono::NaiveTime, i64) {
    let first = slots::slot(slot);
    match (mode, slots::extended(slot)) {
        (DurationMode::Extended, Ok(block)) => (block.start(), slots::EXTENDED_MINUTES),
        _ => (first.start, slots::STANDARD_MINUTES),
    }
}

fn ical_local(dt: NaiveDateTime) -> String {
    dt.format("%Y%m%dT%H%M%S").to_string()
}
