//! Pure reducers from raw stat records to derived stat lines.
//!
//! The rolling path sums a window of game logs; the season path passes a
//! single season-totals record through the same reducer. All sums are over
//! integers (innings as outs), so the result does not depend on input order.

use super::innings::Innings;
use crate::models::{
    DerivedHittingStats, DerivedPitchingStats, DerivedStats, GameLogRecord, SeasonTotals,
    StatFamily,
};
use std::slice;
use tracing::warn;

/// `numerator / denominator`, or 0 when the denominator is zero.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Batting-style rate to three places with the leading zero dropped: ".300", "1.025".
pub fn format_rate3(value: f64) -> String {
    let rendered = format!("{:.3}", value);
    match rendered.strip_prefix("0.") {
        Some(fraction) => format!(".{}", fraction),
        None => rendered,
    }
}

/// Pitching-style rate to two places: "3.86", "0.00".
pub fn format_fixed2(value: f64) -> String {
    format!("{:.2}", value)
}

// ============================================================================
// Hitting
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HittingTotals {
    pub ab: u32,
    pub h: u32,
    pub hr: u32,
    pub rbi: u32,
    pub bb: u32,
    pub so: u32,
    pub tb: u32,
}

impl HittingTotals {
    pub fn add_record(&mut self, record: &GameLogRecord) {
        self.ab = self.ab.saturating_add(record.at_bats);
        self.h = self.h.saturating_add(record.hits);
        self.hr = self.hr.saturating_add(record.home_runs);
        self.rbi = self.rbi.saturating_add(record.rbi);
        self.bb = self.bb.saturating_add(record.walks);
        self.so = self.so.saturating_add(record.strikeouts);
        self.tb = self.tb.saturating_add(record.total_bases);
    }

    pub fn avg(&self) -> f64 {
        ratio(self.h as f64, self.ab as f64)
    }

    pub fn obp(&self) -> f64 {
        ratio(
            f64::from(self.h) + f64::from(self.bb),
            f64::from(self.ab) + f64::from(self.bb),
        )
    }

    pub fn slg(&self) -> f64 {
        ratio(self.tb as f64, self.ab as f64)
    }

    pub fn derive(&self) -> DerivedHittingStats {
        let obp = self.obp();
        let slg = self.slg();
        DerivedHittingStats {
            avg: format_rate3(self.avg()),
            obp: format_rate3(obp),
            slg: format_rate3(slg),
            ops: format_rate3(obp + slg),
            ab: self.ab,
            h: self.h,
            hr: self.hr,
            rbi: self.rbi,
            bb: self.bb,
            so: self.so,
            tb: self.tb,
        }
    }
}

/// Rolling reducer for hitting game logs.
pub fn aggregate_hitting(records: &[GameLogRecord]) -> DerivedHittingStats {
    let mut totals = HittingTotals::default();
    for record in records {
        totals.add_record(record);
    }
    totals.derive()
}

pub fn season_hitting(totals: &SeasonTotals) -> DerivedHittingStats {
    aggregate_hitting(slice::from_ref(totals))
}

// ============================================================================
// Pitching
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PitchingTotals {
    pub innings: Innings,
    pub h: u32,
    pub er: u32,
    pub bb: u32,
    pub k: u32,
    pub hr: u32,
    pub sv: u32,
    pub gs: u32,
}

impl PitchingTotals {
    pub fn add_record(&mut self, record: &GameLogRecord) {
        let innings = match Innings::parse(&record.innings_pitched) {
            Some(innings) => innings,
            None => {
                if !record.innings_pitched.is_empty() {
                    warn!(
                        "Unreadable innings pitched '{}', counting as 0",
                        record.innings_pitched
                    );
                }
                Innings::ZERO
            }
        };

        self.innings = self.innings + innings;
        self.h = self.h.saturating_add(record.hits);
        self.er = self.er.saturating_add(record.earned_runs);
        self.bb = self.bb.saturating_add(record.walks);
        self.k = self.k.saturating_add(record.strikeouts);
        self.hr = self.hr.saturating_add(record.home_runs);
        self.sv = self.sv.saturating_add(record.saves);
        self.gs = self.gs.saturating_add(record.games_started);
    }

    pub fn era(&self) -> f64 {
        ratio(self.er as f64 * 9.0, self.innings.as_f64())
    }

    pub fn whip(&self) -> f64 {
        ratio(f64::from(self.bb) + f64::from(self.h), self.innings.as_f64())
    }

    pub fn derive(&self) -> DerivedPitchingStats {
        DerivedPitchingStats {
            era: format_fixed2(self.era()),
            whip: format_fixed2(self.whip()),
            k: self.k,
            bb: self.bb,
            ip: self.innings.to_decimal_string(),
            h: self.h,
            hr: self.hr,
            sv: self.sv,
            gs: self.gs,
            er: self.er,
            outs: self.innings.outs(),
        }
    }
}

/// Rolling reducer for pitching game logs.
pub fn aggregate_pitching(records: &[GameLogRecord]) -> DerivedPitchingStats {
    let mut totals = PitchingTotals::default();
    for record in records {
        totals.add_record(record);
    }
    totals.derive()
}

pub fn season_pitching(totals: &SeasonTotals) -> DerivedPitchingStats {
    aggregate_pitching(slice::from_ref(totals))
}

// ============================================================================
// Family dispatch
// ============================================================================

pub fn aggregate(family: StatFamily, records: &[GameLogRecord]) -> DerivedStats {
    match family {
        StatFamily::Hitting => DerivedStats::Hitting(aggregate_hitting(records)),
        StatFamily::Pitching => DerivedStats::Pitching(aggregate_pitching(records)),
    }
}

pub fn season(family: StatFamily, totals: &SeasonTotals) -> DerivedStats {
    aggregate(family, slice::from_ref(totals))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batting(ab: u32, h: u32, hr: u32, rbi: u32, bb: u32, so: u32, tb: u32) -> GameLogRecord {
        GameLogRecord {
            at_bats: ab,
            hits: h,
            home_runs: hr,
            rbi,
            walks: bb,
            strikeouts: so,
            total_bases: tb,
            ..Default::default()
        }
    }

    fn pitching(ip: &str, h: u32, er: u32, bb: u32, k: u32) -> GameLogRecord {
        GameLogRecord {
            innings_pitched: ip.to_string(),
            hits: h,
            earned_runs: er,
            walks: bb,
            strikeouts: k,
            ..Default::default()
        }
    }

    #[test]
    fn test_format_rate3() {
        assert_eq!(format_rate3(0.3), ".300");
        assert_eq!(format_rate3(0.0), ".000");
        assert_eq!(format_rate3(9.0 / 23.0), ".391");
        assert_eq!(format_rate3(1.025), "1.025");
        assert_eq!(format_rate3(2.0), "2.000");
    }

    #[test]
    fn test_avg_exact() {
        for ab in 0..40u32 {
            for h in 0..=ab {
                let stats = aggregate_hitting(&[batting(ab, h, 0, 0, 0, 0, h)]);
                let expected = if ab > 0 {
                    format_rate3(h as f64 / ab as f64)
                } else {
                    ".000".to_string()
                };
                assert_eq!(stats.avg, expected);
                assert_eq!(stats.avg.split('.').nth(1).map(str::len), Some(3));
            }
        }
    }

    #[test]
    fn test_hitting_window_totals() {
        // Three games summing to AB=20, H=6, HR=2, RBI=5, BB=3, SO=4, TB=12
        let games = vec![
            batting(8, 3, 1, 2, 1, 1, 6),
            batting(7, 2, 1, 3, 1, 2, 5),
            batting(5, 1, 0, 0, 1, 1, 1),
        ];
        let stats = aggregate_hitting(&games);
        assert_eq!(stats.avg, ".300");
        assert_eq!(stats.obp, ".391");
        assert_eq!(stats.slg, ".600");
        assert_eq!(stats.ops, ".991");
        assert_eq!(
            (stats.ab, stats.h, stats.hr, stats.rbi, stats.bb, stats.so),
            (20, 6, 2, 5, 3, 4)
        );
    }

    #[test]
    fn test_ops_is_obp_plus_slg() {
        let games = vec![batting(11, 4, 1, 2, 2, 3, 9), batting(4, 1, 0, 0, 1, 0, 2)];
        let stats = aggregate_hitting(&games);
        let obp: f64 = stats.obp.parse().unwrap();
        let slg: f64 = stats.slg.parse().unwrap();
        let ops: f64 = stats.ops.parse().unwrap();
        assert!((ops - (obp + slg)).abs() <= 0.0011);
    }

    #[test]
    fn test_hitting_zero_denominators() {
        let stats = aggregate_hitting(&[batting(0, 0, 0, 0, 0, 0, 0)]);
        assert_eq!(stats, DerivedHittingStats::default());

        // Walks only: OBP defined, AVG/SLG not
        let walks = aggregate_hitting(&[batting(0, 0, 0, 0, 2, 0, 0)]);
        assert_eq!(walks.avg, ".000");
        assert_eq!(walks.obp, "1.000");
        assert_eq!(walks.slg, ".000");
        assert_eq!(walks.ops, "1.000");
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(aggregate_hitting(&[]), DerivedHittingStats::default());
        assert_eq!(aggregate_pitching(&[]), DerivedPitchingStats::default());
    }

    #[test]
    fn test_pitching_thirds_summed() {
        let stats = aggregate_pitching(&[pitching("5.2", 4, 2, 1, 6), pitching("3.1", 3, 1, 2, 4)]);
        assert_eq!(stats.ip, "9.0");
        assert_eq!(stats.outs, 27);
        assert_eq!(stats.era, "3.00");
        assert_eq!(stats.whip, "1.11");
        assert_eq!((stats.k, stats.bb, stats.h, stats.er), (10, 3, 7, 3));
    }

    #[test]
    fn test_pitching_zero_innings() {
        let stats = aggregate_pitching(&[pitching("0.0", 3, 3, 2, 0)]);
        assert_eq!(stats.era, "0.00");
        assert_eq!(stats.whip, "0.00");
        assert_eq!(stats.ip, "0.0");
        assert_eq!(stats.er, 3);
    }

    #[test]
    fn test_bad_innings_does_not_void_window() {
        let stats = aggregate_pitching(&[pitching("6.7", 1, 1, 0, 3), pitching("3.0", 2, 1, 1, 2)]);
        assert_eq!(stats.ip, "3.0");
        assert_eq!(stats.k, 5);
        assert_eq!(stats.era, "6.00");
    }

    #[test]
    fn test_order_independent() {
        let hitting = vec![
            batting(4, 2, 1, 3, 0, 1, 5),
            batting(3, 0, 0, 0, 1, 2, 0),
            batting(5, 3, 0, 1, 0, 0, 4),
        ];
        let mut reversed = hitting.clone();
        reversed.reverse();
        assert_eq!(aggregate_hitting(&hitting), aggregate_hitting(&reversed));

        let pitching_logs = vec![
            pitching("6.1", 5, 2, 1, 7),
            pitching("0.2", 1, 1, 1, 0),
            pitching("2.0", 0, 0, 0, 3),
        ];
        let mut rotated = pitching_logs.clone();
        rotated.rotate_left(1);
        assert_eq!(aggregate_pitching(&pitching_logs), aggregate_pitching(&rotated));
    }

    #[test]
    fn test_season_passthrough() {
        let totals = SeasonTotals {
            at_bats: 412,
            hits: 118,
            home_runs: 31,
            rbi: 88,
            walks: 61,
            strikeouts: 97,
            total_bases: 241,
            ..Default::default()
        };
        let stats = season_hitting(&totals);
        assert_eq!((stats.ab, stats.h, stats.hr, stats.rbi), (412, 118, 31, 88));
        assert_eq!(stats.avg, ".286");

        let arm = SeasonTotals {
            innings_pitched: "123.1".to_string(),
            earned_runs: 45,
            hits: 101,
            walks: 30,
            ..Default::default()
        };
        let stats = season_pitching(&arm);
        assert_eq!(stats.ip, "123.3");
        assert_eq!(stats.era, "3.28");
    }

    #[test]
    fn test_huge_counts_do_not_overflow() {
        let hitting = aggregate_hitting(&[
            batting(10, 3_000_000_000, 0, 0, 3_000_000_000, 0, 0),
            batting(u32::MAX, 1, 0, 0, 1, 0, 0),
        ]);
        assert_eq!(hitting.ab, u32::MAX);
        assert_eq!(hitting.bb, 3_000_000_001);
        assert!(hitting.obp.parse::<f64>().unwrap() > 0.0);

        let arm = aggregate_pitching(&[
            pitching("1.0", 3_000_000_000, 0, 3_000_000_000, 0),
            pitching("1.0", u32::MAX, 0, 0, 0),
        ]);
        assert_eq!(arm.h, u32::MAX);
        assert_eq!(arm.ip, "2.0");
        assert!(arm.whip.parse::<f64>().unwrap() > 1.0e9);
    }

    #[test]
    fn test_family_dispatch() {
        let record = batting(4, 1, 0, 0, 0, 1, 1);
        assert_eq!(aggregate(StatFamily::Hitting, &[record.clone()]).family(), StatFamily::Hitting);
        assert_eq!(season(StatFamily::Pitching, &record).family(), StatFamily::Pitching);
    }
}
