//! Upstream data sources.
//!
//! Defines the `StatsSource` trait that the engine fetches through, so the
//! live MLB client and test doubles are interchangeable.

use crate::error::FetchFailure;
use crate::models::{GameLogRecord, GameSummary, Roster, SeasonTotals, StatFamily, TeamStatsSummary};
use async_trait::async_trait;
use chrono::NaiveDate;

pub mod breaker;
pub mod mlb;

pub use breaker::{BreakerConfig, BreakerState, UpstreamBreaker};
pub use mlb::MlbStatsClient;

/// Parameters of a game-log (rolling window) request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLogQuery {
    pub player_id: u64,
    pub family: StatFamily,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub season: i32,
}

/// One upstream call per logical resource. Implementations own no cache and
/// never retry; every failure surfaces to the caller as a `FetchFailure`.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Games scheduled for a date
    async fn fetch_schedule(&self, date: NaiveDate) -> Result<Vec<GameSummary>, FetchFailure>;

    /// Current roster, split into batters and pitchers
    async fn fetch_roster(&self, team_id: u32) -> Result<Roster, FetchFailure>;

    /// Per-game splits in a date range; empty when the player has not appeared
    async fn fetch_game_logs(&self, query: &GameLogQuery) -> Result<Vec<GameLogRecord>, FetchFailure>;

    /// The single season aggregate record, if the player has one
    async fn fetch_season_totals(
        &self,
        player_id: u64,
        family: StatFamily,
        season: i32,
    ) -> Result<Option<SeasonTotals>, FetchFailure>;

    /// Team season stats for both families
    async fn fetch_team_stats(&self, team_id: u32, season: i32) -> Result<TeamStatsSummary, FetchFailure>;

    /// Source name for logging
    fn source_name(&self) -> &str;
}
