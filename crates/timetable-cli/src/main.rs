//! `timetable` CLI: room grids, availability, calendars and listings from a
//! timetable dataset.
//!
//! ## Usage
//!
//! ```sh
//! # Weekly occupancy grid for one room
//! timetable -d data.json grid --room NAC614
//!
//! # Which rooms are free on a date and slot
//! timetable -d data.json availability --date 2026-10-14 --slot 2 --room-type LAB
//!
//! # Classes and approved bookings around a date, as JSON
//! timetable -d data.json calendar --anchor 2026-10-14 --weeks=-1,0,1
//!
//! # Double-booked rooms and teachers (exit code 1 when any are found)
//! timetable -d data.json conflicts
//!
//! # Sorted, paginated schedule listing
//! timetable -d data.json sort --table schedules --key code --key room:desc --page 1
//!
//! # Weekly recurrence rules for a semester
//! timetable -d data.json export --semester-start 2026-10-04 --weeks 14
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process;
use timetable_engine::availability::{self, RoomAvailability};
use timetable_engine::conflict::{RoomConflict, TeacherConflict};
use timetable_engine::day_code::{self, WEEK_DAYS};
use timetable_engine::model::{ClassType, DurationMode};
use timetable_engine::recurrence;
use timetable_engine::rules::{self, EntryViolation};
use timetable_engine::slots;
use timetable_engine::sort::{clamp_page, RoomField, ScheduleField, ScheduleRow};
use timetable_engine::{
    find_room_conflicts, find_teacher_conflicts, list_room_availability, merge_blocks, paginate,
    sort_rows, Booking, Catalog, Cell, Dataset, EngineConfig, Materializer, OccupancyGrid,
    ScheduleEntry, SlotId, SortKey, SortKeys,
};
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "timetable",
    version,
    about = "University timetable grids, availability and calendars"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Dataset JSON with rooms, courses, sections, teachers, schedules and bookings
    #[arg(short, long, global = true, default_value = "data.json")]
    data: PathBuf,

    /// Engine settings as TOML (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the day × slot occupancy grid for one room
    Grid {
        /// Room number, e.g. NAC614
        #[arg(long)]
        room: String,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Resolve AVAILABLE / PENDING / OCCUPIED for a date and slot
    Availability {
        #[arg(long)]
        date: NaiveDate,
        /// Slot id, 1-7
        #[arg(long, value_parser = parse_slot)]
        slot: SlotId,
        /// Only this room
        #[arg(long)]
        room: Option<String>,
        /// Only rooms of this type
        #[arg(long, value_enum)]
        room_type: Option<RoomType>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Materialize classes and approved bookings around an anchor date
    Calendar {
        #[arg(long)]
        anchor: NaiveDate,
        /// Comma-separated week offsets (overrides the configured window)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        weeks: Option<Vec<i32>>,
        /// Only this room
        #[arg(long)]
        room: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Report double-booked rooms and teachers and course rule violations
    Conflicts {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Sort and paginate a management table
    Sort {
        #[arg(long, value_enum, default_value_t = Table::Schedules)]
        table: Table,
        /// Sort key as `field` or `field:desc`; repeat for lower priorities
        #[arg(long = "key")]
        keys: Vec<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Rows per page (overrides the configured page size)
        #[arg(long)]
        page_size: Option<usize>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Export each class as a weekly recurrence over a semester
    Export {
        #[arg(long)]
        semester_start: NaiveDate,
        /// Teaching weeks (overrides the configured semester length)
        #[arg(long)]
        weeks: Option<u32>,
        /// Holiday dates to skip; repeat for several
        #[arg(long = "exdate")]
        exdates: Vec<NaiveDate>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoomType {
    Theory,
    Lab,
}

impl From<RoomType> for ClassType {
    fn from(value: RoomType) -> Self {
        match value {
            RoomType::Theory => ClassType::Theory,
            RoomType::Lab => ClassType::Lab,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Table {
    Schedules,
    Rooms,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let dataset = load_dataset(&cli.data)?;
    let catalog = dataset.catalog();

    match cli.command {
        Commands::Grid { room, format } => {
            let grid = match dataset.room_by_number(&room) {
                Some(known) => OccupancyGrid::build(known.id, &dataset.schedules, &catalog),
                None => {
                    warn!(room = %room, "unknown room, showing an empty grid");
                    OccupancyGrid::build(0, &[], &catalog)
                }
            };
            match format {
                Format::Json => print_json(&grid_json(&grid, &catalog))?,
                Format::Text => print!("{}", render_grid(&room, &grid, &catalog)),
            }
        }
        Commands::Availability {
            date,
            slot,
            room,
            room_type,
            format,
        } => {
            let rooms = match room {
                Some(number) => match dataset.room_by_number(&number) {
                    Some(known) => vec![known.clone()],
                    None => {
                        warn!(room = %number, "unknown room, nothing to resolve");
                        Vec::new()
                    }
                },
                None => dataset.rooms.clone(),
            };
            let rows = list_room_availability(
                &rooms,
                date,
                slot,
                room_type.map(ClassType::from),
                &dataset.schedules,
                &dataset.bookings,
            );
            match format {
                Format::Json => print_json(&rows)?,
                Format::Text => print!("{}", render_availability(date, slot, &rows)?),
            }
        }
        Commands::Calendar {
            anchor,
            weeks,
            room,
            format,
        } => {
            let window = weeks.unwrap_or_else(|| config.window_weeks.clone());
            let (entries, bookings): (Vec<ScheduleEntry>, Vec<Booking>) = match room {
                Some(number) => {
                    let room = dataset
                        .room_by_number(&number)
                        .with_context(|| format!("Unknown room: {}", number))?;
                    (
                        dataset
                            .schedules
                            .iter()
                            .filter(|e| e.room_id == room.id)
                            .cloned()
                            .collect(),
                        dataset
                            .bookings
                            .iter()
                            .filter(|b| b.room_id == room.id)
                            .cloned()
                            .collect(),
                    )
                }
                None => (dataset.schedules.clone(), dataset.bookings.clone()),
            };

            let materializer = Materializer::from_config(&catalog, &config)
                .context("Invalid timezone in configuration")?;
            let instances = materializer.materialize(&entries, &bookings, anchor, &window);
            match format {
                Format::Json => print_json(&instances)?,
                Format::Text => {
                    let tz = config.tz()?;
                    for instance in &instances {
                        println!(
                            "{}  {}  {}",
                            instance.start.with_timezone(&tz).format("%a %Y-%m-%d %H:%M"),
                            instance.end.with_timezone(&tz).format("%H:%M"),
                            instance.title
                        );
                    }
                }
            }
        }
        Commands::Conflicts { format } => {
            let rooms = find_room_conflicts(&dataset.schedules);
            let teachers = find_teacher_conflicts(&dataset.schedules, &catalog);
            let violations: Vec<(u32, EntryViolation)> = dataset
                .schedules
                .iter()
                .flat_map(|entry| {
                    rules::validate_entry(entry, &catalog)
                        .into_iter()
                        .map(move |violation| (entry.id, violation))
                })
                .collect();

            match format {
                Format::Json => print_json(&json!({
                    "rooms": rooms,
                    "teachers": teachers,
                    "violations": violations
                        .iter()
                        .map(|(entry_id, violation)| json!({"entry_id": entry_id, "violation": violation}))
                        .collect::<Vec<_>>(),
                }))?,
                Format::Text => print!("{}", render_conflicts(&rooms, &teachers, &violations, &dataset)?),
            }

            if !rooms.is_empty() || !teachers.is_empty() || !violations.is_empty() {
                process::exit(1);
            }
        }
        Commands::Sort {
            table,
            keys,
            page,
            page_size,
            format,
        } => {
            let page_size = page_size.unwrap_or(config.page_size);
            match table {
                Table::Schedules => {
                    let mut rows = ScheduleRow::from_dataset(&dataset);
                    sort_rows(&mut rows, &parse_keys::<ScheduleField>(&keys)?);
                    let page = clamp(page, rows.len(), page_size);
                    let window = paginate(&rows, page, page_size).context("Failed to paginate schedules")?;
                    match format {
                        Format::Json => print_json(&window)?,
                        Format::Text => {
                            for row in window.items {
                                println!(
                                    "{:<10} {:>3}  {:<6} {:<10} {}  {:<8} {:>4}",
                                    row.code, row.section, row.faculty, row.day, row.slot, row.room, row.availability
                                );
                            }
                            println!("page {} of {} ({} rows)", window.page, window.total_pages, window.total);
                        }
                    }
                }
                Table::Rooms => {
                    let mut rooms = dataset.rooms.clone();
                    sort_rows(&mut rooms, &parse_keys::<RoomField>(&keys)?);
                    let page = clamp(page, rooms.len(), page_size);
                    let window = paginate(&rooms, page, page_size).context("Failed to paginate rooms")?;
                    match format {
                        Format::Json => print_json(&window)?,
                        Format::Text => {
                            for room in window.items {
                                println!(
                                    "{:<10} {:<7} {:>4}",
                                    room.room_number,
                                    name_of(&room.room_type)?,
                                    room.capacity
                                );
                            }
                            println!("page {} of {} ({} rows)", window.page, window.total_pages, window.total);
                        }
                    }
                }
            }
        }
        Commands::Export {
            semester_start,
            weeks,
            exdates,
        } => {
            let weeks = weeks.unwrap_or(config.semester_weeks);
            let tz = config.tz()?;
            let blocks = merge_blocks(&dataset.schedules, &catalog).blocks;
            let mut exported = Vec::with_capacity(blocks.len());
            for block in &blocks {
                let mode = if block.is_extended() {
                    DurationMode::Extended
                } else {
                    DurationMode::Standard
                };
                let day = block.entry.day;
                let slot = block.anchor_slot();
                let rule = recurrence::semester_rule(day, slot, mode, semester_start, weeks, tz)
                    .with_context(|| format!("Failed to export entry {}", block.entry.id))?;
                let occurrences = recurrence::expand_semester(
                    day,
                    slot,
                    mode,
                    semester_start,
                    weeks,
                    tz,
                    &exdates,
                )
                .with_context(|| format!("Failed to expand entry {}", block.entry.id))?;
                exported.push(json!({
                    "entry_id": block.entry.id,
                    "title": catalog.class_title(block.entry.section_id),
                    "rule": rule,
                    "occurrences": occurrences,
                }));
            }
            print_json(&exported)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: EngineConfig = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    debug!(path = %path.display(), timezone = %config.timezone, "loaded config");
    Ok(config)
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset: {}", path.display()))?;
    let dataset = Dataset::from_json(&text)
        .with_context(|| format!("Failed to parse dataset: {}", path.display()))?;
    debug!(
        rooms = dataset.rooms.len(),
        schedules = dataset.schedules.len(),
        bookings = dataset.bookings.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

fn parse_slot(raw: &str) -> std::result::Result<SlotId, String> {
    let n: u8 = raw.parse().map_err(|_| format!("'{}' is not a slot number", raw))?;
    SlotId::try_from(n).map_err(|e| e.to_string())
}

fn parse_keys<F>(raw: &[String]) -> Result<SortKeys<F>>
where
    F: std::str::FromStr<Err = timetable_engine::TimetableError> + std::hash::Hash + Eq + Copy,
{
    let keys = raw
        .iter()
        .map(|key| key.parse::<SortKey<F>>().with_context(|| format!("Invalid sort key: {}", key)))
        .collect::<Result<Vec<_>>>()?;
    Ok(SortKeys::from_keys(keys))
}

fn clamp(page: usize, total: usize, page_size: usize) -> usize {
    let clamped = clamp_page(page, total, page_size);
    if clamped != page {
        warn!(requested = page, page = clamped, "page out of range, showing nearest page");
    }
    clamped
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

/// The serialized name of a unit enum variant, e.g. `"OCCUPIED"`.
fn name_of<T: Serialize>(value: &T) -> Result<String> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(name) => Ok(name),
        other => Ok(other.to_string()),
    }
}

fn cell_text(cell: &Cell, inert: bool, catalog: &Catalog) -> String {
    match cell {
        Cell::Occupied { block, is_extended } => {
            let code = catalog
                .course_for_section(block.entry.section_id)
                .map(|course| course.code.clone())
                .unwrap_or_else(|| format!("S{}", block.entry.section_id));
            if *is_extended {
                format!("{}+", code)
            } else {
                code
            }
        }
        Cell::Skip => "|".to_string(),
        Cell::Empty if inert => "x".to_string(),
        Cell::Empty => "-".to_string(),
    }
}

fn render_grid(room_number: &str, grid: &OccupancyGrid, catalog: &Catalog) -> String {
    let mut out = format!("{}\n{:<22}", room_number, "");
    for (day, letter) in WEEK_DAYS.iter().zip(day_code::DAY_LETTERS) {
        let header = if OccupancyGrid::is_inert(*day) {
            format!("({})", letter)
        } else {
            letter.to_string()
        };
        out.push_str(&format!("{:<10}", header));
    }
    out.push('\n');

    for slot in SlotId::all() {
        out.push_str(&format!("{} {:<20}", slot, slots::slot(slot).label()));
        for &day in WEEK_DAYS.iter() {
            let text = cell_text(grid.cell(day, slot), OccupancyGrid::is_inert(day), catalog);
            out.push_str(&format!("{:<10}", text));
        }
        out.push('\n');
    }

    for contested in grid.contested() {
        out.push_str(&format!(
            "conflict: entry {} on {} slot {}\n",
            contested.entry_id,
            day_code::weekday_name(contested.day),
            contested.slot
        ));
    }
    out
}

fn grid_json(grid: &OccupancyGrid, catalog: &Catalog) -> serde_json::Value {
    let days: Vec<serde_json::Value> = WEEK_DAYS
        .iter()
        .map(|&day| {
            let cells: Vec<serde_json::Value> = grid
                .column(day)
                .iter()
                .map(|cell| match cell {
                    Cell::Occupied { block, is_extended } => json!({
                        "state": "OCCUPIED",
                        "entry_id": block.entry.id,
                        "title": catalog.class_title(block.entry.section_id),
                        "label": block.label,
                        "duration": block.duration.to_string(),
                        "is_extended": is_extended,
                    }),
                    other => json!(other),
                })
                .collect();
            json!({
                "day": day_code::weekday_name(day),
                "inert": OccupancyGrid::is_inert(day),
                "cells": cells,
            })
        })
        .collect();

    json!({
        "room_id": grid.room_id,
        "days": days,
        "contested": grid.contested(),
        "anomalies": grid.anomalies(),
    })
}

fn render_availability(date: NaiveDate, slot: SlotId, rows: &[RoomAvailability]) -> Result<String> {
    let mut out = format!(
        "{} ({}) slot {} {}\n",
        date,
        day_code::weekday_name(chrono::Datelike::weekday(&date)),
        slot,
        slots::slot(slot).label()
    );
    for row in rows {
        let reason = match row.reason {
            Some(reason) => name_of(&reason)?,
            None => String::new(),
        };
        out.push_str(&format!(
            "{:<10} {:<7} {:>4}  {:<10} {}\n",
            row.room_number,
            name_of(&row.room_type)?,
            row.capacity,
            name_of(&row.status)?,
            reason
        ));
    }
    if rows.is_empty() {
        out.push_str("no rooms match\n");
    }
    let free = rows
        .iter()
        .filter(|row| row.status == availability::Verdict::Available)
        .count();
    debug!(free, total = rows.len(), "availability listed");
    Ok(out)
}

fn render_conflicts(
    rooms: &[RoomConflict],
    teachers: &[TeacherConflict],
    violations: &[(u32, EntryViolation)],
    dataset: &Dataset,
) -> Result<String> {
    let mut out = String::new();
    for conflict in rooms {
        let room = dataset
            .rooms
            .iter()
            .find(|room| room.id == conflict.room_id)
            .map(|room| room.room_number.clone())
            .unwrap_or_else(|| format!("room {}", conflict.room_id));
        out.push_str(&format!(
            "room {} {} slot {}: entries {:?}\n",
            room,
            day_code::weekday_name(conflict.day),
            conflict.slot,
            conflict.entry_ids
        ));
    }
    for conflict in teachers {
        let teacher = dataset
            .teachers
            .iter()
            .find(|teacher| teacher.id == conflict.teacher_id)
            .map(|teacher| teacher.initial.clone())
            .unwrap_or_else(|| format!("teacher {}", conflict.teacher_id));
        out.push_str(&format!(
            "teacher {} {} slot {}: entries {:?}\n",
            teacher,
            day_code::weekday_name(conflict.day),
            conflict.slot,
            conflict.entry_ids
        ));
    }
    for (entry_id, violation) in violations {
        out.push_str(&format!("entry {}: {}\n", entry_id, name_of(violation)?));
    }
    if out.is_empty() {
        out.push_str("no conflicts\n");
    }
    Ok(out)
}
