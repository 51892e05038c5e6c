//! MLB team directory.
//!
//! Static id -> name table for the 30 clubs, keyed by stats-API team id.

/// A single MLB club.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamInfo {
    /// Stats-API team id
    pub id: u32,
    pub name: &'static str,
    pub abbreviation: &'static str,
}

/// Static directory of all MLB clubs.
pub static MLB_TEAMS: &[TeamInfo] = &[
    // American League
    TeamInfo { id: 108, name: "Los Angeles Angels", abbreviation: "LAA" },
    TeamInfo { id: 110, name: "Baltimore Orioles", abbreviation: "BAL" },
    TeamInfo { id: 111, name: "Boston Red Sox", abbreviation: "BOS" },
    TeamInfo { id: 114, name: "Cleveland Guardians", abbreviation: "CLE" },
    TeamInfo { id: 116, name: "Detroit Tigers", abbreviation: "DET" },
    TeamInfo { id: 117, name: "Houston Astros", abbreviation: "HOU" },
    TeamInfo { id: 118, name: "Kansas City Royals", abbreviation: "KC" },
    TeamInfo { id: 133, name: "Athletics", abbreviation: "ATH" },
    TeamInfo { id: 136, name: "Seattle Mariners", abbreviation: "SEA" },
    TeamInfo { id: 139, name: "Tampa Bay Rays", abbreviation: "TB" },
    TeamInfo { id: 140, name: "Texas Rangers", abbreviation: "TEX" },
    TeamInfo { id: 141, name: "Toronto Blue Jays", abbreviation: "TOR" },
    TeamInfo { id: 142, name: "Minnesota Twins", abbreviation: "MIN" },
    TeamInfo { id: 145, name: "Chicago White Sox", abbreviation: "CWS" },
    TeamInfo { id: 147, name: "New York Yankees", abbreviation: "NYY" },
    // National League
    TeamInfo { id: 109, name: "Arizona Diamondbacks", abbreviation: "AZ" },
    TeamInfo { id: 112, name: "Chicago Cubs", abbreviation: "CHC" },
    TeamInfo { id: 113, name: "Cincinnati Reds", abbreviation: "CIN" },
    TeamInfo { id: 115, name: "Colorado Rockies", abbreviation: "COL" },
    TeamInfo { id: 119, name: "Los Angeles Dodgers", abbreviation: "LAD" },
    TeamInfo { id: 120, name: "Washington Nationals", abbreviation: "WSH" },
    TeamInfo { id: 121, name: "New York Mets", abbreviation: "NYM" },
    TeamInfo { id: 134, name: "Pittsburgh Pirates", abbreviation: "PIT" },
    TeamInfo { id: 135, name: "San Diego Padres", abbreviation: "SD" },
    TeamInfo { id: 137, name: "San Francisco Giants", abbreviation: "SF" },
    TeamInfo { id: 138, name: "St. Louis Cardinals", abbreviation: "STL" },
    TeamInfo { id: 143, name: "Philadelphia Phillies", abbreviation: "PHI" },
    TeamInfo { id: 144, name: "Atlanta Braves", abbreviation: "ATL" },
    TeamInfo { id: 146, name: "Miami Marlins", abbreviation: "MIA" },
    TeamInfo { id: 158, name: "Milwaukee Brewers", abbreviation: "MIL" },
];

pub fn get_team(team_id: u32) -> Option<&'static TeamInfo> {
    MLB_TEAMS.iter().find(|t| t.id == team_id)
}

/// Display name for a team id; unknown ids render as "Team {id}".
pub fn team_name(team_id: u32) -> String {
    get_team(team_id)
        .map(|t| t.name.to_string())
        .unwrap_or_else(|| format!("Team {}", team_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_known_team() {
        assert_eq!(team_name(147), "New York Yankees");
        assert_eq!(get_team(111).unwrap().abbreviation, "BOS");
    }

    #[test]
    fn test_unknown_team() {
        assert_eq!(team_name(999), "Team 999");
        assert!(get_team(999).is_none());
    }

    #[test]
    fn test_thirty_unique_clubs() {
        assert_eq!(MLB_TEAMS.len(), 30);
        let ids: HashSet<u32> = MLB_TEAMS.iter().map(|t| t.id).collect();
        let names: HashSet<&str> = MLB_TEAMS.iter().map(|t| t.name).collect();
        assert_eq!(ids.len(), 30);
        assert_eq!(names.len(), 30);
    }
}
