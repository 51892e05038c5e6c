//! Configuration constants and environment loading for the stats engine
//!
//! This module manages all runtime configuration:
//! - Upstream API location, timeout and season
//! - Freshness windows per resource kind
//! - Team view cost controls (key player counts, fetch concurrency)
//! - Upstream circuit breaker settings

use crate::cache::ResourceKind;
use crate::clients::breaker::BreakerConfig;
use chrono::Datelike;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default base URL of the MLB Stats API
pub const DEFAULT_API_BASE: &str = "https://statsapi.mlb.com/api/v1";

/// Default per-call upstream timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default bound on concurrent sub-fetches while building one team view
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

/// Batters and pitchers that get live stats in a team view
pub const DEFAULT_KEY_BATTERS: usize = 5;
pub const DEFAULT_KEY_PITCHERS: usize = 3;

/// Rolling windows shown for every player, in days
pub const ROLLING_WINDOWS: [u32; 3] = [7, 10, 21];

/// Freshness windows in seconds
pub const DEFAULT_TTL_SCHEDULE_SECS: u64 = 180; // games change minute-to-minute
pub const DEFAULT_TTL_ROSTER_SECS: u64 = 86_400; // rosters rarely change
pub const DEFAULT_TTL_PLAYER_ROLLING_SECS: u64 = 21_600;
pub const DEFAULT_TTL_PLAYER_SEASON_SECS: u64 = 43_200;
pub const DEFAULT_TTL_TEAM_SEASON_SECS: u64 = 21_600;

/// Resource kind -> freshness window. The single place freshness policy lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlTable {
    pub schedule: Duration,
    pub roster: Duration,
    pub player_rolling: Duration,
    pub player_season: Duration,
    pub team_season: Duration,
}

impl Default for TtlTable {
    fn default() -> Self {
        Self {
            schedule: Duration::from_secs(DEFAULT_TTL_SCHEDULE_SECS),
            roster: Duration::from_secs(DEFAULT_TTL_ROSTER_SECS),
            player_rolling: Duration::from_secs(DEFAULT_TTL_PLAYER_ROLLING_SECS),
            player_season: Duration::from_secs(DEFAULT_TTL_PLAYER_SEASON_SECS),
            team_season: Duration::from_secs(DEFAULT_TTL_TEAM_SEASON_SECS),
        }
    }
}

impl TtlTable {
    pub fn ttl(&self, kind: ResourceKind) -> Duration {
        match kind {
            ResourceKind::Schedule => self.schedule,
            ResourceKind::Roster => self.roster,
            ResourceKind::PlayerRolling => self.player_rolling,
            ResourceKind::PlayerSeason => self.player_season,
            ResourceKind::TeamSeason => self.team_season,
        }
    }

    /// Load TTL overrides from environment variables
    pub fn from_env() -> Self {
        let secs = |name: &str, default: u64| Duration::from_secs(env_or(name, default));
        Self {
            schedule: secs("TTL_SCHEDULE_SECS", DEFAULT_TTL_SCHEDULE_SECS),
            roster: secs("TTL_ROSTER_SECS", DEFAULT_TTL_ROSTER_SECS),
            player_rolling: secs("TTL_PLAYER_ROLLING_SECS", DEFAULT_TTL_PLAYER_ROLLING_SECS),
            player_season: secs("TTL_PLAYER_SEASON_SECS", DEFAULT_TTL_PLAYER_SEASON_SECS),
            team_season: secs("TTL_TEAM_SEASON_SECS", DEFAULT_TTL_TEAM_SEASON_SECS),
        }
    }
}

/// Cost controls for building a team view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamViewConfig {
    pub key_batters: usize,
    pub key_pitchers: usize,
    pub windows: Vec<u32>,
    pub max_concurrent_fetches: usize,
}

impl Default for TeamViewConfig {
    fn default() -> Self {
        Self {
            key_batters: DEFAULT_KEY_BATTERS,
            key_pitchers: DEFAULT_KEY_PITCHERS,
            windows: ROLLING_WINDOWS.to_vec(),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api_base: String,
    pub http_timeout: Duration,
    pub season: i32,
    pub ttl: TtlTable,
    pub team_view: TeamViewConfig,
    pub breaker: BreakerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            season: chrono::Local::now().year(),
            ttl: TtlTable::default(),
            team_view: TeamViewConfig::default(),
            breaker: BreakerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_base = env::var("MLB_API_BASE")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base);

        let team_view = TeamViewConfig {
            key_batters: env_or("MLB_KEY_BATTERS", DEFAULT_KEY_BATTERS),
            key_pitchers: env_or("MLB_KEY_PITCHERS", DEFAULT_KEY_PITCHERS),
            windows: ROLLING_WINDOWS.to_vec(),
            max_concurrent_fetches: env_or("MLB_MAX_CONCURRENT_FETCHES", DEFAULT_MAX_CONCURRENT_FETCHES)
                .max(1),
        };

        Self {
            api_base,
            http_timeout: Duration::from_secs(env_or(
                "MLB_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            season: env_or("MLB_SEASON", defaults.season),
            ttl: TtlTable::from_env(),
            team_view,
            breaker: load_breaker_config(),
        }
    }
}

/// Load upstream circuit breaker configuration from environment
pub fn load_breaker_config() -> BreakerConfig {
    let defaults = BreakerConfig::default();
    BreakerConfig {
        failure_threshold: env_or("MLB_CB_FAILURE_THRESHOLD", defaults.failure_threshold),
        recovery_timeout: Duration::from_secs(env_or(
            "MLB_CB_RECOVERY_TIMEOUT_SECS",
            defaults.recovery_timeout.as_secs(),
        )),
        success_threshold: defaults.success_threshold,
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
