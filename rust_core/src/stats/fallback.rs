//! Rolling-window-first stat resolution for one player.
//!
//! Two states, visited at most once each per call:
//! 1. `Rolling`: aggregate the game logs of the trailing N-day window.
//! 2. `SeasonFallback`: entered on zero splits or a failed fetch; aggregate
//!    the (cached) season totals instead.
//!
//! If the season path fails too, the all-zero stat line for the family is
//! returned. Resolution never fails: the worst outcome for a player is zeros.

use super::aggregate;
use crate::cache::{MemoCache, ResourceKey, ResourceKind};
use crate::clients::{GameLogQuery, StatsSource};
use crate::config::TtlTable;
use crate::error::FetchFailure;
use crate::models::{DerivedStats, SeasonTotals, StatFamily};
use chrono::{Days, NaiveDate};
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackState {
    Rolling,
    /// `rolling_failed` is set when the window fetch errored rather than
    /// coming back empty.
    SeasonFallback { rolling_failed: bool },
}

/// Where a resolved stat line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    Rolling,
    Season,
    /// Both paths answered, neither had data for the player
    NoData,
    /// A fetch failed and no stats were found; the zeros are not a real answer
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub stats: DerivedStats,
    pub from: ResolvedFrom,
}

impl Resolution {
    fn zero(family: StatFamily, from: ResolvedFrom) -> Self {
        Self {
            stats: DerivedStats::zero(family),
            from,
        }
    }

    /// Whether this result may be memoized. Failure-driven zeros may not.
    pub fn is_cacheable(&self) -> bool {
        self.from != ResolvedFrom::Failed
    }
}

enum RollingMiss {
    NoSplits,
    Failed(FetchFailure),
}

pub struct FallbackPolicy<'a> {
    source: &'a dyn StatsSource,
    cache: &'a MemoCache,
    ttl: &'a TtlTable,
    season: i32,
}

impl<'a> FallbackPolicy<'a> {
    pub fn new(source: &'a dyn StatsSource, cache: &'a MemoCache, ttl: &'a TtlTable, season: i32) -> Self {
        Self {
            source,
            cache,
            ttl,
            season,
        }
    }

    pub async fn resolve(&self, player_id: u64, family: StatFamily, window_days: u32) -> Resolution {
        let mut state = FallbackState::Rolling;
        loop {
            state = match state {
                FallbackState::Rolling => match self.rolling(player_id, family, window_days).await {
                    Ok(stats) => {
                        return Resolution {
                            stats,
                            from: ResolvedFrom::Rolling,
                        }
                    }
                    Err(RollingMiss::NoSplits) => {
                        warn!(
                            "No {}-day {} stats found for player {}, using season totals",
                            window_days, family, player_id
                        );
                        FallbackState::SeasonFallback { rolling_failed: false }
                    }
                    Err(RollingMiss::Failed(e)) => {
                        error!(
                            "Error fetching {}-day {} stats for player {}: {}",
                            window_days, family, player_id, e
                        );
                        FallbackState::SeasonFallback { rolling_failed: true }
                    }
                },
                FallbackState::SeasonFallback { rolling_failed } => {
                    return self.season_or_zero(player_id, family, rolling_failed).await
                }
            };
        }
    }

    async fn rolling(
        &self,
        player_id: u64,
        family: StatFamily,
        window_days: u32,
    ) -> Result<DerivedStats, RollingMiss> {
        let end = self.cache.clock().today();
        let query = GameLogQuery {
            player_id,
            family,
            start: window_start(end, window_days),
            end,
            season: self.season,
        };

        let records = self
            .source
            .fetch_game_logs(&query)
            .await
            .map_err(RollingMiss::Failed)?;
        if records.is_empty() {
            return Err(RollingMiss::NoSplits);
        }
        Ok(aggregate::aggregate(family, &records))
    }

    async fn season_or_zero(&self, player_id: u64, family: StatFamily, rolling_failed: bool) -> Resolution {
        match self.season_totals(player_id, family).await {
            Ok(Some(totals)) => Resolution {
                stats: aggregate::season(family, &totals),
                from: ResolvedFrom::Season,
            },
            Ok(None) if rolling_failed => {
                warn!(
                    "No season {} stats for player {} and the window fetch failed",
                    family, player_id
                );
                Resolution::zero(family, ResolvedFrom::Failed)
            }
            Ok(None) => {
                debug!("No season {} stats for player {}", family, player_id);
                Resolution::zero(family, ResolvedFrom::NoData)
            }
            Err(e) => {
                error!(
                    "Error fetching season {} stats for player {}: {}",
                    family, player_id, e
                );
                Resolution::zero(family, ResolvedFrom::Failed)
            }
        }
    }

    /// Season totals through the cache, keyed by player, family and season.
    pub async fn season_totals(
        &self,
        player_id: u64,
        family: StatFamily,
    ) -> Result<Option<SeasonTotals>, FetchFailure> {
        let key = ResourceKey::PlayerSeason {
            player_id,
            family,
            season: self.season,
        };
        self.cache
            .get_or_compute(key, self.ttl.ttl(ResourceKind::PlayerSeason), || {
                self.source.fetch_season_totals(player_id, family, self.season)
            })
            .await
    }
}

/// First day of a trailing window ending on `end`.
pub fn window_start(end: NaiveDate, window_days: u32) -> NaiveDate {
    end.checked_sub_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MIN)
}
