//! Workout-session calendar bucketing
//!
//! Buckets per-day session counts into the week/column grid the session
//! heatmap renders, and computes the user's current streak.

use chrono::{Datelike, Days, NaiveDate};
use std::collections::HashMap;

pub const DAYS_PER_WEEK: usize = 7;
pub const MIN_COLUMNS: usize = 10;
pub const MAX_COLUMNS: usize = 53;
pub const MAX_INTENSITY: u32 = 4;

/// One day cell in the calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    /// Session count for that day, zero when none recorded
    pub value: u32,
    /// 1-based month, for month-boundary labels
    pub month: u32,
}

/// Bucket per-day session counts into a `columns x 7` week grid.
///
/// Rows run Sunday..Saturday; the last column is the week containing
/// `until` and earlier columns walk back one week each. Cells after
/// `until` are `None`.
#[must_use]
pub fn calendar_grid(
    values: &HashMap<NaiveDate, u32>,
    until: NaiveDate,
    columns: usize,
) -> Vec<Vec<Option<CalendarCell>>> {
    let last_weekend = end_of_week(until);
    let mut grid = Vec::with_capacity(columns);

    for column in 0..columns {
        let mut week = Vec::with_capacity(DAYS_PER_WEEK);
        for row in 0..DAYS_PER_WEEK {
            let days_back = (columns - column - 1) * DAYS_PER_WEEK + (DAYS_PER_WEEK - 1 - row);
            let cell = last_weekend
                .checked_sub_days(Days::new(days_back as u64))
                .filter(|date| *date <= until)
                .map(|date| CalendarCell {
                    date,
                    value: values.get(&date).copied().unwrap_or(0),
                    month: date.month(),
                });
            week.push(cell);
        }
        grid.push(week);
    }

    grid
}

/// Number of grid columns that fit a container width, clamped to the
/// product bounds.
#[must_use]
pub fn fit_columns(width: u32, label_width: u32, cell_width: u32) -> usize {
    if cell_width == 0 {
        return MIN_COLUMNS;
    }
    let available = width.saturating_sub(label_width) / cell_width;
    (available as usize).clamp(MIN_COLUMNS, MAX_COLUMNS)
}

/// Intensity level for a day's session count, capped at `MAX_INTENSITY`.
#[must_use]
pub const fn intensity(value: u32) -> u32 {
    if value > MAX_INTENSITY {
        MAX_INTENSITY
    } else {
        value
    }
}

/// Consecutive days with at least one session, counting back from `today`.
///
/// A rest day today does not break the streak; the count then starts from
/// yesterday.
#[must_use]
pub fn current_streak(values: &HashMap<NaiveDate, u32>, today: NaiveDate) -> u32 {
    let has_session = |date: NaiveDate| values.get(&date).copied().unwrap_or(0) > 0;

    let mut cursor = if has_session(today) {
        today
    } else {
        match today.checked_sub_days(Days::new(1)) {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };

    let mut streak = 0;
    while has_session(cursor) {
        streak += 1;
        let Some(previous) = cursor.checked_sub_days(Days::new(1)) else {
            break;
        };
        cursor = previous;
    }

    streak
}

/// Saturday of the week containing `date`.
fn end_of_week(date: NaiveDate) -> NaiveDate {
    let days_until_saturday = 6 - date.weekday().num_days_from_sunday();
    date.checked_add_days(Days::new(u64::from(days_until_saturday)))
        .unwrap_or(date)
}
