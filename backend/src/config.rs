use std::env;

use anyhow::{bail, Context};
use chrono::FixedOffset;

use crate::services::calendar::Calendar;

const MAX_OFFSET_MINUTES: i32 = 24 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    /// Offset applied before truncating timestamps to calendar days.
    pub stats_utc_offset_minutes: i32,

    pub ip_hash_salt: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let stats_utc_offset_minutes: i32 = env::var("STATS_UTC_OFFSET_MINUTES")
            .unwrap_or_else(|_| "0".into())
            .parse()
            .context("STATS_UTC_OFFSET_MINUTES must be a number")?;
        if stats_utc_offset_minutes.abs() >= MAX_OFFSET_MINUTES {
            bail!("STATS_UTC_OFFSET_MINUTES must be within +/- 24 hours");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".into())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .context("PORT must be a number")?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            // In dev, also allow LAN access (e.g. testing from another device)
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            stats_utc_offset_minutes,
            ip_hash_salt: env::var("IP_HASH_SALT").unwrap_or_default(),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn calendar(&self) -> Calendar {
        // Range is checked in from_env, so this only falls back for hand-built configs.
        FixedOffset::east_opt(self.stats_utc_offset_minutes * 60)
            .map(Calendar::new)
            .unwrap_or_else(Calendar::utc)
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: String::new(),
            database_max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            cors_extra_origins: Vec::new(),
            stats_utc_offset_minutes: 0,
            ip_hash_salt: "test-salt".into(),
        }
    }
}
