use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::projector::DEFAULT_GOAL;
use crate::utils::dates::parse_date;

fn default_goal() -> i32 {
    DEFAULT_GOAL
}
fn default_tick_rate_ms() -> u64 {
    500
}
fn default_calendar_days() -> u32 {
    14
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceConfig {
    /// Goal for new subjects and for the overall figure.
    #[serde(default = "default_goal")]
    pub default_goal: i32,
    /// First day of term, `YYYY-MM-DD`. The calendar starts here when set.
    #[serde(default)]
    pub semester_start: Option<String>,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            default_goal: default_goal(),
            semester_start: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuiConfig {
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_calendar_days")]
    pub calendar_days: u32,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
            calendar_days: default_calendar_days(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub attendance: AttendanceConfig,
    #[serde(default)]
    pub tui: TuiConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "lastminute")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("lastminute.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    /// First calendar day shown for a view ending at `end`: the semester
    /// start when it is set and not after `end`, else `calendar_days` back.
    pub fn calendar_start(&self, end: NaiveDate) -> NaiveDate {
        let fallback = end - Duration::days(self.tui.calendar_days.max(1) as i64 - 1);
        match self.attendance.semester_start.as_deref().map(parse_date) {
            Some(Ok(start)) if start <= end => start,
            Some(Err(e)) => {
                log::warn!("Ignoring semester_start: {}", e);
                fallback
            }
            _ => fallback,
        }
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.attendance.default_goal, 75);
        assert_eq!(config.tui.calendar_days, 14);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.attendance.default_goal = 80;
        config.attendance.semester_start = Some("2026-07-20".to_string());
        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[attendance]\ndefault_goal = 60\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.attendance.default_goal, 60);
        assert_eq!(config.attendance.semester_start, None);
        assert_eq!(config.tui.tick_rate_ms, 500);
    }

    #[test]
    fn calendar_start_prefers_semester_start() {
        let end = NaiveDate::from_ymd_opt(2026, 8, 20).unwrap();
        let mut config = AppConfig::default();
        assert_eq!(config.calendar_start(end), NaiveDate::from_ymd_opt(2026, 8, 7).unwrap());

        config.attendance.semester_start = Some("2026-07-20".to_string());
        assert_eq!(config.calendar_start(end), NaiveDate::from_ymd_opt(2026, 7, 20).unwrap());

        config.attendance.semester_start = Some("2026-09-01".to_string());
        assert_eq!(config.calendar_start(end), NaiveDate::from_ymd_opt(2026, 8, 7).unwrap());

        config.attendance.semester_start = Some("soon".to_string());
        assert_eq!(config.calendar_start(end), NaiveDate::from_ymd_opt(2026, 8, 7).unwrap());
    }
}
