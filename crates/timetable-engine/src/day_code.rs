//! Day codes: compressed weekday pairs for theory courses, literal weekdays for
//! labs and bookings.
//!
//! | Code | Weekdays            |
//! |------|---------------------|
//! | `ST` | Sunday, Tuesday     |
//! | `MW` | Monday, Wednesday   |
//! | `RA` | Thursday, Saturday  |
//!
//! Friday is never part of a compressed code. Weeks run Sunday to Saturday.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimetableError};

/// Grid column order, Sunday first.
pub const WEEK_DAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Single-letter column headers in [`WEEK_DAYS`] order.
pub const DAY_LETTERS: [char; 7] = ['S', 'M', 'T', 'W', 'R', 'F', 'A'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayCode {
    #[serde(rename = "ST")]
    SundayTuesday,
    #[serde(rename = "MW")]
    MondayWednesday,
    #[serde(rename = "RA")]
    ThursdaySaturday,
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayCode {
    pub const COMPRESSED: [DayCode; 3] = [
        DayCode::SundayTuesday,
        DayCode::MondayWednesday,
        DayCode::ThursdaySaturday,
    ];

    /// The weekdays this code denotes, in week order.
    pub fn expand(self) -> &'static [Weekday] {
        match self {
            DayCode::SundayTuesday => &[Weekday::Sun, Weekday::Tue],
            DayCode::MondayWednesday => &[Weekday::Mon, Weekday::Wed],
            DayCode::ThursdaySaturday => &[Weekday::Thu, Weekday::Sat],
            DayCode::Sunday => &[Weekday::Sun],
            DayCode::Monday => &[Weekday::Mon],
            DayCode::Tuesday => &[Weekday::Tue],
            DayCode::Wednesday => &[Weekday::Wed],
            DayCode::Thursday => &[Weekday::Thu],
            DayCode::Friday => &[Weekday::Fri],
            DayCode::Saturday => &[Weekday::Sat],
        }
    }

    pub fn matches(self, weekday: Weekday) -> bool {
        self.expand().contains(&weekday)
    }

    pub fn is_compressed(self) -> bool {
        matches!(
            self,
            DayCode::SundayTuesday | DayCode::MondayWednesday | DayCode::ThursdaySaturday
        )
    }

    /// The literal code for a single weekday.
    pub fn literal(weekday: Weekday) -> DayCode {
        match weekday {
            Weekday::Sun => DayCode::Sunday,
            Weekday::Mon => DayCode::Monday,
            Weekday::Tue => DayCode::Tuesday,
            Weekday::Wed => DayCode::Wednesday,
            Weekday::Thu => DayCode::Thursday,
            Weekday::Fri => DayCode::Friday,
            Weekday::Sat => DayCode::Saturday,
        }
    }

    /// The compressed code containing `weekday`, if any. `None` for Friday.
    pub fn compressed_for(weekday: Weekday) -> Option<DayCode> {
        DayCode::COMPRESSED
            .into_iter()
            .find(|code| code.matches(weekday))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayCode::SundayTuesday => "ST",
            DayCode::MondayWednesday => "MW",
            DayCode::ThursdaySaturday => "RA",
            DayCode::Sunday => "Sunday",
            DayCode::Monday => "Monday",
            DayCode::Tuesday => "Tuesday",
            DayCode::Wednesday => "Wednesday",
            DayCode::Thursday => "Thursday",
            DayCode::Friday => "Friday",
            DayCode::Saturday => "Saturday",
        }
    }
}

impl FromStr for DayCode {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self> {
        let code = match s.trim() {
            "ST" => DayCode::SundayTuesday,
            "MW" => DayCode::MondayWednesday,
            "RA" => DayCode::ThursdaySaturday,
            "Sunday" => DayCode::Sunday,
            "Monday" => DayCode::Monday,
            "Tuesday" => DayCode::Tuesday,
            "Wednesday" => DayCode::Wednesday,
            "Thursday" => DayCode::Thursday,
            "Friday" => DayCode::Friday,
            "Saturday" => DayCode::Saturday,
            other => return Err(TimetableError::UnknownDayCode(other.to_string())),
        };
        Ok(code)
    }
}

impl fmt::Display for DayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Full English weekday name (`"Monday"`); chrono's `Display` gives `"Mon"`.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    DayCode::literal(weekday).as_str()
}

/// Serde adapter storing a `Weekday` as its full name.
pub mod weekday_serde {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DayCode;

    pub fn serialize<S: Serializer>(weekday: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(super::weekday_name(*weekday))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let code: DayCode = raw.parse().map_err(serde::de::Error::custom)?;
        match code.expand() {
            [weekday] => Ok(*weekday),
            _ => Err(serde::de::Error::custom(format!(
                "expected a literal weekday, got {raw}"
            ))),
        }
    }
}
