//! Core-to-caller surface of the stats engine.
//!
//! `StatsService` owns the memo cache and the upstream source and is built
//! once per process, then shared by reference. Every lookup goes through the
//! cache with the TTL its resource kind is given in the [`TtlTable`].
//!
//! Nothing here returns an error. Schedule and roster failures come back
//! empty, which callers must read as "unknown"; stats failures come back as
//! the all-zero stat line. Failure results are never cached.
//!
//! [`TtlTable`]: crate::config::TtlTable

use crate::cache::{CacheStats, Clock, MemoCache, ResourceKey, ResourceKind, SystemClock};
use crate::clients::StatsSource;
use crate::config::EngineConfig;
use crate::models::{DerivedStats, GameSummary, GameView, Roster, StatFamily, TeamStatsSummary, TeamView};
use crate::stats::{aggregate, FallbackPolicy, Resolution};
use crate::view::TeamAggregate;
use std::sync::Arc;
use tracing::{error, info};

pub struct StatsService {
    source: Arc<dyn StatsSource>,
    cache: MemoCache,
    config: EngineConfig,
}

impl std::fmt::Debug for StatsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsService")
            .field("source", &self.source.source_name())
            .field("cache", &self.cache)
            .field("season", &self.config.season)
            .finish()
    }
}

impl StatsService {
    pub fn new(source: Arc<dyn StatsSource>, config: EngineConfig) -> Self {
        Self::with_clock(source, config, Arc::new(SystemClock))
    }

    pub fn with_clock(source: Arc<dyn StatsSource>, config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            cache: MemoCache::with_clock(clock),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &MemoCache {
        &self.cache
    }

    fn fallback(&self) -> FallbackPolicy<'_> {
        FallbackPolicy::new(
            self.source.as_ref(),
            &self.cache,
            &self.config.ttl,
            self.config.season,
        )
    }

    /// Today's games. Empty on failure.
    pub async fn get_todays_games(&self) -> Vec<GameSummary> {
        let date = self.cache.clock().today();
        let result = self
            .cache
            .get_or_compute(
                ResourceKey::Schedule { date },
                self.config.ttl.ttl(ResourceKind::Schedule),
                || self.source.fetch_schedule(date),
            )
            .await;

        result.unwrap_or_else(|e| {
            error!("Error fetching today's games: {}", e);
            Vec::new()
        })
    }

    /// Team roster. Empty on failure.
    pub async fn get_team_roster(&self, team_id: u32) -> Roster {
        let result = self
            .cache
            .get_or_compute(
                ResourceKey::Roster { team_id },
                self.config.ttl.ttl(ResourceKind::Roster),
                || self.source.fetch_roster(team_id),
            )
            .await;

        result.unwrap_or_else(|e| {
            error!("Error fetching roster for team {}: {}", team_id, e);
            Roster::default()
        })
    }

    /// Team season stats. Zeros on failure.
    pub async fn get_team_stats(&self, team_id: u32, season: i32) -> TeamStatsSummary {
        let result = self
            .cache
            .get_or_compute(
                ResourceKey::TeamSeason { team_id, season },
                self.config.ttl.ttl(ResourceKind::TeamSeason),
                || self.source.fetch_team_stats(team_id, season),
            )
            .await;

        result.unwrap_or_else(|e| {
            error!("Error fetching team stats for {}: {}", team_id, e);
            TeamStatsSummary::default()
        })
    }

    /// Rolling stats for a player over the trailing `window_days`, falling back
    /// to season totals, then to zeros.
    pub async fn get_player_stats(&self, player_id: u64, family: StatFamily, window_days: u32) -> DerivedStats {
        let key = ResourceKey::PlayerRolling {
            player_id,
            family,
            window_days,
        };
        let result: Result<DerivedStats, Resolution> = self
            .cache
            .get_or_compute(key, self.config.ttl.ttl(ResourceKind::PlayerRolling), || async {
                let resolution = self.fallback().resolve(player_id, family, window_days).await;
                if resolution.is_cacheable() {
                    Ok(resolution.stats)
                } else {
                    Err(resolution)
                }
            })
            .await;

        match result {
            Ok(stats) => stats,
            Err(resolution) => resolution.stats,
        }
    }

    /// Season stats for a player. Zeros when unavailable.
    pub async fn get_season_stats(&self, player_id: u64, family: StatFamily) -> DerivedStats {
        match self.fallback().season_totals(player_id, family).await {
            Ok(Some(totals)) => aggregate::season(family, &totals),
            Ok(None) => DerivedStats::zero(family),
            Err(e) => {
                error!("Error fetching season stats for player {}: {}", player_id, e);
                DerivedStats::zero(family)
            }
        }
    }

    /// Compose a team view from an already fetched roster and team stats.
    pub async fn build_team_view(&self, team_id: u32, roster: &Roster, team_stats: &TeamStatsSummary) -> TeamView {
        TeamAggregate::new(self).build(team_id, roster, team_stats).await
    }

    /// Fetch roster and team stats concurrently, then build the view.
    pub async fn get_team_view(&self, team_id: u32) -> TeamView {
        let (roster, team_stats) = tokio::join!(
            self.get_team_roster(team_id),
            self.get_team_stats(team_id, self.config.season)
        );
        self.build_team_view(team_id, &roster, &team_stats).await
    }

    /// Both sides of a matchup.
    pub async fn get_game_view(&self, home_id: u32, away_id: u32) -> GameView {
        info!("Loading details for {} @ {}", away_id, home_id);
        let (home, away) = tokio::join!(self.get_team_view(home_id), self.get_team_view(away_id));
        GameView { home, away }
    }

    /// Administrative reset: drop every cached entry now.
    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Cache cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
