// Shared models for the Diamond stats engine
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Stat families & roster roles
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatFamily {
    Hitting,
    Pitching,
}

impl StatFamily {
    /// Value of the upstream `group` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatFamily::Hitting => "hitting",
            StatFamily::Pitching => "pitching",
        }
    }
}

impl std::fmt::Display for StatFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Batter,
    Pitcher,
}

impl Role {
    /// Derive the role from the upstream position-type field ("Pitcher", "Infielder", ...).
    pub fn from_position_type(position_type: &str) -> Self {
        if position_type == "Pitcher" {
            Role::Pitcher
        } else {
            Role::Batter
        }
    }

    pub fn stat_family(&self) -> StatFamily {
        match self {
            Role::Batter => StatFamily::Hitting,
            Role::Pitcher => StatFamily::Pitching,
        }
    }
}

// ============================================================================
// Schedule
// ============================================================================

/// Hours behind UTC used when rendering start times (Eastern daylight time).
const DISPLAY_UTC_OFFSET_HOURS: i32 = -4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: u64,
    pub away_team: String,
    pub home_team: String,
    pub away_id: u32,
    pub home_id: u32,
    /// Detailed state, lowercased ("scheduled", "in progress", "postponed", ...)
    pub status: String,
    /// Raw RFC 3339 start time; empty when the upstream omits it
    pub game_time: String,
    pub venue: String,
}

impl GameSummary {
    pub fn start_time(&self) -> Option<DateTime<FixedOffset>> {
        if self.game_time.is_empty() {
            return None;
        }
        DateTime::parse_from_rfc3339(&self.game_time).ok()
    }

    pub fn is_postponed(&self) -> bool {
        self.status.contains("postponed") || self.status.contains("suspended")
    }

    /// Start time as shown to users, e.g. "07:05 PM ET".
    pub fn display_time(&self) -> String {
        if self.is_postponed() {
            return "Postponed".to_string();
        }
        let offset = match FixedOffset::east_opt(DISPLAY_UTC_OFFSET_HOURS * 3600) {
            Some(offset) => offset,
            None => return "TBD".to_string(),
        };
        match self.start_time() {
            Some(start) => start.with_timezone(&offset).format("%I:%M %p ET").to_string(),
            None => "TBD".to_string(),
        }
    }
}

// ============================================================================
// Roster
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: u64,
    pub name: String,
    pub position: String,
    pub jersey_number: String,
    pub role: Role,
}

/// Team roster split by role, each side in upstream roster order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub batters: Vec<RosterEntry>,
    pub pitchers: Vec<RosterEntry>,
}

impl Roster {
    pub fn from_entries(entries: impl IntoIterator<Item = RosterEntry>) -> Self {
        let mut roster = Roster::default();
        for entry in entries {
            match entry.role {
                Role::Batter => roster.batters.push(entry),
                Role::Pitcher => roster.pitchers.push(entry),
            }
        }
        roster
    }

    pub fn len(&self) -> usize {
        self.batters.len() + self.pitchers.len()
    }

    /// An empty roster means "unknown", not "confirmed no players".
    pub fn is_empty(&self) -> bool {
        self.batters.is_empty() && self.pitchers.is_empty()
    }
}

// ============================================================================
// Raw stat records
// ============================================================================

/// One game's raw counting stats for one player. Season totals share the shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLogRecord {
    pub at_bats: u32,
    pub hits: u32,
    pub home_runs: u32,
    pub rbi: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub total_bases: u32,
    /// Thirds notation: "6.1" is six innings and one out
    pub innings_pitched: String,
    pub earned_runs: u32,
    pub saves: u32,
    pub games_started: u32,
}

pub type SeasonTotals = GameLogRecord;

// ============================================================================
// Derived stats
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedHittingStats {
    pub avg: String,
    pub obp: String,
    pub slg: String,
    pub ops: String,
    pub ab: u32,
    pub h: u32,
    pub hr: u32,
    pub rbi: u32,
    pub bb: u32,
    pub so: u32,
    /// Total bases, kept so team rollups never reconstruct it from SLG
    pub tb: u32,
}

impl Default for DerivedHittingStats {
    fn default() -> Self {
        Self {
            avg: ".000".to_string(),
            obp: ".000".to_string(),
            slg: ".000".to_string(),
            ops: ".000".to_string(),
            ab: 0,
            h: 0,
            hr: 0,
            rbi: 0,
            bb: 0,
            so: 0,
            tb: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedPitchingStats {
    pub era: String,
    pub whip: String,
    pub k: u32,
    pub bb: u32,
    /// Decimal innings to one place ("9.0", "6.3"), not thirds notation
    pub ip: String,
    pub h: u32,
    pub hr: u32,
    pub sv: u32,
    pub gs: u32,
    pub er: u32,
    /// Exact innings as outs recorded
    pub outs: u32,
}

impl Default for DerivedPitchingStats {
    fn default() -> Self {
        Self {
            era: "0.00".to_string(),
            whip: "0.00".to_string(),
            k: 0,
            bb: 0,
            ip: "0.0".to_string(),
            h: 0,
            hr: 0,
            sv: 0,
            gs: 0,
            er: 0,
            outs: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DerivedStats {
    Hitting(DerivedHittingStats),
    Pitching(DerivedPitchingStats),
}

impl DerivedStats {
    /// The all-zero placeholder for a family.
    pub fn zero(family: StatFamily) -> Self {
        match family {
            StatFamily::Hitting => DerivedStats::Hitting(DerivedHittingStats::default()),
            StatFamily::Pitching => DerivedStats::Pitching(DerivedPitchingStats::default()),
        }
    }

    pub fn family(&self) -> StatFamily {
        match self {
            DerivedStats::Hitting(_) => StatFamily::Hitting,
            DerivedStats::Pitching(_) => StatFamily::Pitching,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == DerivedStats::zero(self.family())
    }

    pub fn as_hitting(&self) -> Option<&DerivedHittingStats> {
        match self {
            DerivedStats::Hitting(stats) => Some(stats),
            DerivedStats::Pitching(_) => None,
        }
    }

    pub fn as_pitching(&self) -> Option<&DerivedPitchingStats> {
        match self {
            DerivedStats::Pitching(stats) => Some(stats),
            DerivedStats::Hitting(_) => None,
        }
    }
}

// ============================================================================
// Team-level stats
// ============================================================================

/// Season-level team stats as reported by the upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct TeamStatsSummary {
    pub avg: String,
    pub obp: String,
    pub slg: String,
    pub hr: String,
    pub era: String,
    pub whip: String,
    pub sv: String,
}

impl Default for TeamStatsSummary {
    fn default() -> Self {
        Self {
            avg: ".000".to_string(),
            obp: ".000".to_string(),
            slg: ".000".to_string(),
            hr: "0".to_string(),
            era: "0.00".to_string(),
            whip: "0.00".to_string(),
            sv: "0".to_string(),
        }
    }
}

/// Team stats over a rolling window, rolled up from the key players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RollingTeamStats {
    pub avg: String,
    pub obp: String,
    pub slg: String,
    pub hr: String,
    pub era: String,
    pub whip: String,
    pub avg_hits: String,
    pub avg_k: String,
}

impl Default for RollingTeamStats {
    fn default() -> Self {
        Self {
            avg: ".000".to_string(),
            obp: ".000".to_string(),
            slg: ".000".to_string(),
            hr: "0".to_string(),
            era: "0.00".to_string(),
            whip: "0.00".to_string(),
            avg_hits: "0.0".to_string(),
            avg_k: "0.0".to_string(),
        }
    }
}

// ============================================================================
// View models
// ============================================================================

/// A roster member with stats keyed by window length in days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    #[serde(flatten)]
    pub entry: RosterEntry,
    pub stats: BTreeMap<u32, DerivedStats>,
    /// False for members given the all-zero placeholder without a fetch
    pub live: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamView {
    pub team_id: u32,
    pub name: String,
    /// Key batters, the ones carrying live stats
    pub lineup: Vec<PlayerView>,
    pub batters: Vec<PlayerView>,
    pub pitchers: Vec<PlayerView>,
    /// First pitcher in roster order; an approximation, not a probable-starter lookup
    pub starter: Option<PlayerView>,
    pub team_stats: BTreeMap<u32, TeamStatsSummary>,
    pub rolling_team_stats: BTreeMap<u32, RollingTeamStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameView {
    pub home: TeamView,
    pub away: TeamView,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, role: Role) -> RosterEntry {
        RosterEntry {
            id,
            name: format!("Player {}", id),
            position: if role == Role::Pitcher { "P" } else { "SS" }.to_string(),
            jersey_number: id.to_string(),
            role,
        }
    }

    fn game(status: &str, game_time: &str) -> GameSummary {
        GameSummary {
            id: 1,
            away_team: "Boston Red Sox".to_string(),
            home_team: "New York Yankees".to_string(),
            away_id: 111,
            home_id: 147,
            status: status.to_string(),
            game_time: game_time.to_string(),
            venue: "Yankee Stadium".to_string(),
        }
    }

    #[test]
    fn test_role_from_position_type() {
        assert_eq!(Role::from_position_type("Pitcher"), Role::Pitcher);
        assert_eq!(Role::from_position_type("Infielder"), Role::Batter);
        assert_eq!(Role::from_position_type("Two-Way Player"), Role::Batter);
        assert_eq!(Role::from_position_type(""), Role::Batter);
    }

    #[test]
    fn test_roster_split_preserves_order() {
        let roster = Roster::from_entries(vec![
            entry(1, Role::Batter),
            entry(2, Role::Pitcher),
            entry(3, Role::Batter),
            entry(4, Role::Pitcher),
        ]);
        let batter_ids: Vec<u64> = roster.batters.iter().map(|e| e.id).collect();
        let pitcher_ids: Vec<u64> = roster.pitchers.iter().map(|e| e.id).collect();
        assert_eq!(batter_ids, vec![1, 3]);
        assert_eq!(pitcher_ids, vec![2, 4]);
        assert_eq!(roster.len(), 4);
        assert!(Roster::default().is_empty());
    }

    #[test]
    fn test_zero_stats() {
        let hitting = DerivedStats::zero(StatFamily::Hitting);
        assert!(hitting.is_zero());
        assert_eq!(hitting.as_hitting().unwrap().avg, ".000");

        let pitching = DerivedStats::zero(StatFamily::Pitching);
        let p = pitching.as_pitching().unwrap();
        assert_eq!(p.era, "0.00");
        assert_eq!(p.ip, "0.0");
        assert_eq!(pitching.family(), StatFamily::Pitching);
    }

    #[test]
    fn test_display_time() {
        assert_eq!(game("scheduled", "2025-07-04T23:05:00Z").display_time(), "07:05 PM ET");
        assert_eq!(game("scheduled", "").display_time(), "TBD");
        assert_eq!(game("scheduled", "not a time").display_time(), "TBD");
        assert_eq!(
            game("postponed", "2025-07-04T23:05:00Z").display_time(),
            "Postponed"
        );
    }

    #[test]
    fn test_postponed_detection() {
        assert!(game("postponed", "").is_postponed());
        assert!(game("suspended: rain", "").is_postponed());
        assert!(!game("in progress", "").is_postponed());
    }

    #[test]
    fn test_team_stats_serialize_uppercase() {
        let json = serde_json::to_value(TeamStatsSummary::default()).unwrap();
        assert_eq!(json["AVG"], ".000");
        assert_eq!(json["WHIP"], "0.00");

        let rolling = serde_json::to_value(RollingTeamStats::default()).unwrap();
        assert_eq!(rolling["AVG_HITS"], "0.0");
    }
}
