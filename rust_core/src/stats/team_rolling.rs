//! Team stats over a rolling window, rolled up from player stat lines.
//!
//! Only batters with at-bats and pitchers with recorded outs in the window
//! count, so placeholders and idle players do not dilute the per-player
//! averages.

use super::aggregate::{format_fixed2, format_rate3, ratio, HittingTotals, PitchingTotals};
use super::innings::Innings;
use crate::models::{DerivedStats, PlayerView, RollingTeamStats};

pub fn rolling_team_stats(batters: &[PlayerView], pitchers: &[PlayerView], window_days: u32) -> RollingTeamStats {
    let mut hitting = HittingTotals::default();
    let mut counted_batters = 0u32;
    for stats in window_stats(batters, window_days).filter_map(DerivedStats::as_hitting) {
        if stats.ab == 0 {
            continue;
        }
        hitting.ab = hitting.ab.saturating_add(stats.ab);
        hitting.h = hitting.h.saturating_add(stats.h);
        hitting.hr = hitting.hr.saturating_add(stats.hr);
        hitting.bb = hitting.bb.saturating_add(stats.bb);
        hitting.so = hitting.so.saturating_add(stats.so);
        hitting.rbi = hitting.rbi.saturating_add(stats.rbi);
        hitting.tb = hitting.tb.saturating_add(stats.tb);
        counted_batters += 1;
    }

    let mut pitching = PitchingTotals::default();
    let mut counted_pitchers = 0u32;
    for stats in window_stats(pitchers, window_days).filter_map(DerivedStats::as_pitching) {
        if stats.outs == 0 {
            continue;
        }
        pitching.innings = pitching.innings + Innings::from_outs(stats.outs);
        pitching.er = pitching.er.saturating_add(stats.er);
        pitching.h = pitching.h.saturating_add(stats.h);
        pitching.bb = pitching.bb.saturating_add(stats.bb);
        pitching.k = pitching.k.saturating_add(stats.k);
        counted_pitchers += 1;
    }

    RollingTeamStats {
        avg: format_rate3(hitting.avg()),
        obp: format_rate3(hitting.obp()),
        slg: format_rate3(hitting.slg()),
        hr: hitting.hr.to_string(),
        era: format_fixed2(pitching.era()),
        whip: format_fixed2(pitching.whip()),
        avg_hits: format!("{:.1}", ratio(hitting.h as f64, counted_batters as f64)),
        avg_k: format!("{:.1}", ratio(pitching.k as f64, counted_pitchers as f64)),
    }
}

fn window_stats(players: &[PlayerView], window_days: u32) -> impl Iterator<Item = &DerivedStats> {
    players
        .iter()
        .filter_map(move |player| player.stats.get(&window_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DerivedHittingStats, DerivedPitchingStats, Role, RosterEntry};
    use std::collections::BTreeMap;

    fn player(id: u64, role: Role, window: u32, stats: DerivedStats) -> PlayerView {
        let mut by_window = BTreeMap::new();
        by_window.insert(window, stats);
        PlayerView {
            entry: RosterEntry {
                id,
                name: format!("Player {}", id),
                position: "X".to_string(),
                jersey_number: String::new(),
                role,
            },
            stats: by_window,
            live: true,
        }
    }

    fn batter(id: u64, ab: u32, h: u32, bb: u32, hr: u32, tb: u32) -> PlayerView {
        player(
            id,
            Role::Batter,
            7,
            DerivedStats::Hitting(DerivedHittingStats {
                ab,
                h,
                bb,
                hr,
                tb,
                ..Default::default()
            }),
        )
    }

    fn pitcher(id: u64, outs: u32, er: u32, h: u32, bb: u32, k: u32) -> PlayerView {
        player(
            id,
            Role::Pitcher,
            7,
            DerivedStats::Pitching(DerivedPitchingStats {
                outs,
                er,
                h,
                bb,
                k,
                ..Default::default()
            }),
        )
    }

    #[test]
    fn test_team_rollup() {
        let batters = vec![
            batter(1, 20, 6, 3, 2, 12),
            batter(2, 10, 2, 1, 0, 3),
            batter(3, 0, 0, 0, 0, 0), // idle, not counted
        ];
        let pitchers = vec![pitcher(10, 27, 3, 7, 3, 10), pitcher(11, 0, 0, 0, 0, 0)];

        let stats = rolling_team_stats(&batters, &pitchers, 7);
        assert_eq!(stats.avg, ".267");
        assert_eq!(stats.obp, ".353");
        assert_eq!(stats.slg, ".500");
        assert_eq!(stats.hr, "2");
        assert_eq!(stats.era, "3.00");
        assert_eq!(stats.whip, "1.11");
        assert_eq!(stats.avg_hits, "4.0");
        assert_eq!(stats.avg_k, "10.0");
    }

    #[test]
    fn test_rollup_saturates_huge_counts() {
        let batters = vec![
            batter(1, u32::MAX, 3_000_000_000, 3_000_000_000, 0, 0),
            batter(2, 10, 3_000_000_000, 1, 0, 0),
        ];
        let pitchers = vec![
            pitcher(10, 3, 0, 3_000_000_000, 3_000_000_000, 0),
            pitcher(11, 3, 0, u32::MAX, 0, 0),
        ];

        let stats = rolling_team_stats(&batters, &pitchers, 7);
        assert!(stats.obp.parse::<f64>().unwrap() > 0.0);
        assert!(stats.whip.parse::<f64>().unwrap() > 1.0e9);
        assert_eq!(stats.era, "0.00");
    }

    #[test]
    fn test_missing_window_is_default() {
        let batters = vec![batter(1, 20, 6, 3, 2, 12)];
        assert_eq!(rolling_team_stats(&batters, &[], 21), RollingTeamStats::default());
        assert_eq!(rolling_team_stats(&[], &[], 7), RollingTeamStats::default());
    }
}
