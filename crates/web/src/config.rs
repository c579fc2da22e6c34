use anyhow::{Context, Result, bail};
use chrono::FixedOffset;

/// UTC+05:30
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Without a database URL records are kept in memory
    pub database_url: Option<String>,
    /// Comma-separated `department:key` pairs
    pub api_keys: String,
    pub utc_offset_minutes: i32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            utc_offset_minutes: match std::env::var("UTC_OFFSET_MINUTES") {
                Ok(value) => value
                    .parse()
                    .context("UTC_OFFSET_MINUTES must be a number of minutes")?,
                Err(_) => DEFAULT_UTC_OFFSET_MINUTES,
            },
        })
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        match FixedOffset::east_opt(self.utc_offset_minutes * 60) {
            Some(offset) => Ok(offset),
            None => bail!(
                "UTC_OFFSET_MINUTES out of range: {}",
                self.utc_offset_minutes
            ),
        }
    }
}
