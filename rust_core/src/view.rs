//! Team view construction.
//!
//! Only the first few batters and pitchers in roster order get live stats;
//! everyone else gets the all-zero placeholder without a fetch, so the cost
//! of a view is bounded no matter how large the roster is. Live lookups run
//! concurrently, bounded by `TeamViewConfig::max_concurrent_fetches`.

use crate::config::TeamViewConfig;
use crate::models::{DerivedStats, PlayerView, Roster, RosterEntry, TeamStatsSummary, TeamView};
use crate::service::StatsService;
use crate::stats::rolling_team_stats;
use crate::teams::team_name;
use futures_util::stream::{self, StreamExt};
use std::collections::BTreeMap;
use tracing::info;

pub struct TeamAggregate<'a> {
    service: &'a StatsService,
    config: &'a TeamViewConfig,
}

impl<'a> TeamAggregate<'a> {
    pub fn new(service: &'a StatsService) -> Self {
        Self {
            service,
            config: &service.config().team_view,
        }
    }

    pub async fn build(&self, team_id: u32, roster: &Roster, team_stats: &TeamStatsSummary) -> TeamView {
        let name = team_name(team_id);
        info!("Building team data for {}", name);

        let batters = self.player_views(&roster.batters, self.config.key_batters).await;
        let pitchers = self.player_views(&roster.pitchers, self.config.key_pitchers).await;

        let lineup: Vec<PlayerView> = batters.iter().filter(|p| p.live).cloned().collect();
        let key_pitchers: Vec<PlayerView> = pitchers.iter().filter(|p| p.live).cloned().collect();

        let mut team_stats_by_window = BTreeMap::new();
        let mut rolling_by_window = BTreeMap::new();
        for &window in &self.config.windows {
            team_stats_by_window.insert(window, team_stats.clone());
            rolling_by_window.insert(window, rolling_team_stats(&lineup, &key_pitchers, window));
        }

        // Approximation: the first pitcher listed, not a real probable-starter lookup
        let starter = pitchers.first().cloned();

        info!(
            "Team data built for {}: {} key players loaded",
            name,
            lineup.len() + key_pitchers.len()
        );

        TeamView {
            team_id,
            name,
            lineup,
            batters,
            pitchers,
            starter,
            team_stats: team_stats_by_window,
            rolling_team_stats: rolling_by_window,
        }
    }

    /// Views for one side of the roster, in roster order. The first `key_count`
    /// entries are fetched live, the rest get placeholders.
    async fn player_views(&self, entries: &[RosterEntry], key_count: usize) -> Vec<PlayerView> {
        let split = key_count.min(entries.len());
        let (key, rest) = entries.split_at(split);

        let mut views: Vec<PlayerView> = stream::iter(key)
            .map(|entry| self.live_view(entry))
            .buffered(self.config.max_concurrent_fetches.max(1))
            .collect()
            .await;

        views.extend(rest.iter().map(|entry| self.placeholder_view(entry)));
        views
    }

    async fn live_view(&self, entry: &RosterEntry) -> PlayerView {
        info!("Getting stats for key {:?}: {}", entry.role, entry.name);
        let family = entry.role.stat_family();

        let mut stats = BTreeMap::new();
        for &window in &self.config.windows {
            let line = self.service.get_player_stats(entry.id, family, window).await;
            stats.insert(window, line);
        }

        PlayerView {
            entry: entry.clone(),
            stats,
            live: true,
        }
    }

    fn placeholder_view(&self, entry: &RosterEntry) -> PlayerView {
        let family = entry.role.stat_family();
        PlayerView {
            entry: entry.clone(),
            stats: self
                .config
                .windows
                .iter()
                .map(|&window| (window, DerivedStats::zero(family)))
                .collect(),
            live: false,
        }
    }
}
