#![allow(clippy::cast_possible_truncation)] // intensity levels index a 5-element table

use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDate, Utc};

use liftmark_core::db::{KvStore, SqliteKvStore};
use liftmark_core::heatmap::{
    calendar_grid, current_streak, fit_columns, intensity, CalendarCell, DAYS_PER_WEEK,
};

use crate::cli::StatsCommands;
use crate::commands::common::open_database;
use crate::error::CliError;

/// Storage key for the per-day workout session counts.
pub const SESSIONS_STORAGE_KEY: &str = "workout_sessions";

const DEFAULT_COLUMNS: usize = 24;
const WEEK_LABEL_WIDTH: u32 = 3;
const CELL_WIDTH: u32 = 2;

const DAY_LABELS: [&str; DAYS_PER_WEEK] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];
const LEVEL_GLYPHS: [char; 5] = ['\u{b7}', '\u{2591}', '\u{2592}', '\u{2593}', '\u{2588}'];

pub fn run_stats(command: StatsCommands, db_path: &Path) -> Result<(), CliError> {
    match command {
        StatsCommands::Record { date } => run_record(date.as_deref(), db_path),
        StatsCommands::Show { columns, width } => run_show(columns, width, db_path),
    }
}

fn run_record(date: Option<&str>, db_path: &Path) -> Result<(), CliError> {
    let date = match date {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| CliError::InvalidDate(raw.trim().to_string()))?,
        None => Utc::now().date_naive(),
    };

    let db = open_database(db_path)?;
    let storage = SqliteKvStore::new(db.connection());

    let mut sessions = load_sessions(&storage);
    *sessions.entry(date).or_insert(0) += 1;
    save_sessions(&storage, &sessions)?;

    println!("Recorded session on {date}");
    Ok(())
}

fn run_show(columns: Option<usize>, width: Option<u32>, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path)?;
    let sessions = load_sessions(&SqliteKvStore::new(db.connection()));

    let today = Utc::now().date_naive();
    let columns = columns.unwrap_or_else(|| {
        width.map_or(DEFAULT_COLUMNS, |width| {
            fit_columns(width, WEEK_LABEL_WIDTH, CELL_WIDTH)
        })
    });

    let grid = calendar_grid(&sessions, today, columns);
    for line in render_grid_lines(&grid) {
        println!("{line}");
    }

    let total: u32 = sessions.values().sum();
    println!();
    println!(
        "Current streak: {} day(s), {} session(s) total",
        current_streak(&sessions, today),
        total
    );
    Ok(())
}

fn render_grid_lines(grid: &[Vec<Option<CalendarCell>>]) -> Vec<String> {
    let mut lines = Vec::with_capacity(DAYS_PER_WEEK);

    for (row, label) in DAY_LABELS.iter().enumerate() {
        let mut line = format!("{label} ");
        for week in grid {
            match week.get(row).copied().flatten() {
                Some(cell) => line.push(LEVEL_GLYPHS[intensity(cell.value) as usize]),
                None => line.push(' '),
            }
            line.push(' ');
        }
        lines.push(line.trim_end().to_string());
    }

    lines
}

fn load_sessions<S: KvStore>(storage: &S) -> HashMap<NaiveDate, u32> {
    let raw = match storage.get(SESSIONS_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return HashMap::new(),
        Err(error) => {
            tracing::warn!("Failed to read session log: {error}");
            return HashMap::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(sessions) => sessions,
        Err(error) => {
            tracing::warn!("Discarding unparseable session log: {error}");
            HashMap::new()
        }
    }
}

fn save_sessions<S: KvStore>(
    storage: &S,
    sessions: &HashMap<NaiveDate, u32>,
) -> Result<(), CliError> {
    let payload = serde_json::to_string(sessions)?;
    storage.set(SESSIONS_STORAGE_KEY, &payload)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftmark_core::db::MemoryKvStore;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn sessions_round_trip_through_storage() {
        let storage = MemoryKvStore::new();
        let mut sessions = HashMap::new();
        sessions.insert(date(2025, 6, 3), 2);
        sessions.insert(date(2025, 6, 4), 1);

        save_sessions(&storage, &sessions).unwrap();
        assert_eq!(load_sessions(&storage), sessions);
    }

    #[test]
    fn corrupt_session_log_reads_as_empty() {
        let storage = MemoryKvStore::new();
        storage.set(SESSIONS_STORAGE_KEY, "not json").unwrap();
        assert!(load_sessions(&storage).is_empty());
    }

    #[test]
    fn render_grid_lines_has_one_row_per_weekday() {
        let mut sessions = HashMap::new();
        sessions.insert(date(2025, 6, 3), 2);

        let grid = calendar_grid(&sessions, date(2025, 6, 4), 4);
        let lines = render_grid_lines(&grid);

        assert_eq!(lines.len(), DAYS_PER_WEEK);
        assert!(lines[0].starts_with("Su"));
        // Tuesday row carries the medium-intensity glyph
        assert!(lines[2].contains(LEVEL_GLYPHS[2]));
    }
}
