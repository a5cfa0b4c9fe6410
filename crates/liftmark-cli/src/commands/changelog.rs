use std::path::Path;

use liftmark_core::db::SqliteKvStore;
use liftmark_core::release_notes::{ChangelogTracker, ReleaseNote};

use crate::commands::common::open_database;
use crate::error::CliError;

/// Shipped release notes, newest first.
const RELEASE_NOTES: [(&str, &str); 3] = [
    ("Workout session heatmap and streaks", "2025-07-18"),
    ("Favorites sync across devices", "2025-06-02"),
    ("Heart-rate zone calculator", "2025-04-29"),
];

fn release_notes() -> Vec<ReleaseNote> {
    RELEASE_NOTES
        .iter()
        .map(|(title, date)| ReleaseNote {
            title: (*title).to_string(),
            date: (*date).to_string(),
        })
        .collect()
}

pub fn run_changelog(mark_seen: bool, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path)?;
    let tracker = ChangelogTracker::new(SqliteKvStore::new(db.connection()));
    let notes = release_notes();

    if tracker.has_new_release_notes(&notes) {
        println!("New since you last looked:");
    } else {
        println!("Release notes:");
    }
    for note in &notes {
        println!("{}  {}", note.date, note.title);
    }

    if mark_seen {
        tracker.mark_seen();
        println!();
        println!("Marked as seen.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftmark_core::release_notes::has_new_release_notes;

    #[test]
    fn shipped_notes_are_newest_first() {
        let notes = release_notes();
        assert!(!notes.is_empty());
        let dates: Vec<&str> = notes.iter().map(|note| note.date.as_str()).collect();
        let mut sorted = dates.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
    }

    #[test]
    fn unseen_changelog_badges() {
        assert!(has_new_release_notes(&release_notes(), None));
    }
}
