use std::env;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use liftmark_core::db::Database;

use crate::auth::{AuthService, AuthSession};
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("LIFTMARK_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("liftmark")
        .join("liftmark.db")
}

pub fn open_database(path: &Path) -> Result<Database, CliError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    Ok(Database::open(path)?)
}

/// Everything needed to talk to the remote favorites service.
pub struct RemoteContext {
    pub api_base_url: String,
    pub session: AuthSession,
}

/// Resolve the configured profile into a signed-in remote context.
///
/// `None` when the profile is unconfigured or signed out; favorites then
/// stay a local-only concern until the next `auth login`.
pub async fn resolve_remote_context(
    global_profile: Option<&str>,
) -> Result<Option<RemoteContext>, CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    let Some(profile) = config.profile(&profile_name) else {
        return Ok(None);
    };
    let Some(api_base_url) = profile.api_base_url() else {
        return Ok(None);
    };

    let service = AuthService::new(&profile_name, &api_base_url)
        .map_err(|error| CliError::Auth(error.to_string()))?;
    let Some(session) = service
        .restore_session()
        .await
        .map_err(|error| CliError::Auth(error.to_string()))?
    else {
        return Ok(None);
    };

    Ok(Some(RemoteContext {
        api_base_url,
        session,
    }))
}

pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(timestamp).num_milliseconds().max(0);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}
