//! Persisted user preferences: a small SQLite key-value table.

use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// SQLite database file.
const DB_FILE: &str = "prefs.db";

/// Key holding the theme flag ("true" / "false").
pub const DARK_MODE_KEY: &str = "darkMode";

/// Color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Interpret a stored flag. Anything but "true" is light.
    pub fn from_flag(flag: Option<&str>) -> Theme {
        match flag {
            Some("true") => Theme::Dark,
            Some("false") | None => Theme::Light,
            Some(other) => {
                log::warn!("Ignoring malformed {} value '{}'", DARK_MODE_KEY, other);
                Theme::Light
            }
        }
    }

    pub fn as_flag(&self) -> &'static str {
        if self.is_dark() { "true" } else { "false" }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Preference storage handle.
pub struct Preferences {
    db: Connection,
}

impl Preferences {
    /// Open (creating if needed) the preferences database in `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).context("Failed to create data directory")?;
        let db = Connection::open(dir.join(DB_FILE)).context("Failed to open preferences database")?;
        let prefs = Self { db };
        prefs.init_schema()?;
        Ok(prefs)
    }

    /// Preferences that vanish with the process.
    pub fn in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let prefs = Self { db };
        prefs.init_schema()?;
        Ok(prefs)
    }

    fn init_schema(&self) -> Result<()> {
        self.db
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS prefs (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
            "#,
            )
            .context("Failed to initialize schema")?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.db
            .query_row("SELECT value FROM prefs WHERE key = ?", params![key], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to read preference {}", key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .execute(
                "INSERT OR REPLACE INTO prefs (key, value) VALUES (?, ?)",
                params![key, value],
            )
            .with_context(|| format!("Failed to write preference {}", key))?;
        Ok(())
    }

    pub fn theme(&self) -> Result<Theme> {
        let flag = self.get(DARK_MODE_KEY)?;
        Ok(Theme::from_flag(flag.as_deref()))
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.set(DARK_MODE_KEY, theme.as_flag())
    }

    /// Flip the theme and return the new one.
    pub fn toggle_theme(&self) -> Result<Theme> {
        let theme = self.theme()?.toggled();
        self.set_theme(theme)?;
        log::info!("Theme set to {}", theme);
        Ok(theme)
    }
}
