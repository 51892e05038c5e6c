//! MLB Stats API client
//!
//! Fetches schedules, rosters, player stats (game logs and season totals) and
//! team season stats. Only the fields the aggregator needs are read; a field
//! that is missing defaults to zero/empty, and a field that is present but
//! unreadable is defaulted with a warning, so one malformed game log never
//! voids the rest of the window.

use super::breaker::UpstreamBreaker;
use super::{GameLogQuery, StatsSource};
use crate::cache::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::FetchFailure;
use crate::models::{
    GameLogRecord, GameSummary, Role, Roster, RosterEntry, SeasonTotals, StatFamily,
    TeamStatsSummary,
};
use crate::stats::aggregate::{format_fixed2, format_rate3};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// MLB sport id in the stats API
const SPORT_ID_MLB: &str = "1";

#[derive(Clone)]
pub struct MlbStatsClient {
    client: Client,
    base_url: String,
    breaker: Arc<UpstreamBreaker>,
}

impl std::fmt::Debug for MlbStatsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MlbStatsClient")
            .field("base_url", &self.base_url)
            .field("breaker_state", &self.breaker.state())
            .finish()
    }
}

impl MlbStatsClient {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Client whose breaker reads time from `clock`.
    pub fn with_clock(config: &EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.http_timeout)
                .user_agent("diamond/0.1")
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            breaker: Arc::new(UpstreamBreaker::new("mlb-stats", config.breaker.clone(), clock)),
        }
    }

    /// GET `path` and return the JSON object body, guarded by the breaker.
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, FetchFailure> {
        self.breaker.admit()?;

        let url = format!("{}{}", self.base_url, path);
        let result = self.request(&url, query).await;
        self.breaker.observe(&result);
        result
    }

    async fn request(&self, url: &str, query: &[(&str, String)]) -> Result<Value, FetchFailure> {
        debug!("GET {} {:?}", url, query);

        let response = self.client.get(url).query(query).send().await?;
        if let Some(failure) = FetchFailure::from_status(url, response.status()) {
            return Err(failure);
        }
        let body: Value = response.json().await?;

        if !body.is_object() {
            return Err(FetchFailure::format(url, "response body is not a JSON object"));
        }
        Ok(body)
    }
}

#[async_trait]
impl StatsSource for MlbStatsClient {
    async fn fetch_schedule(&self, date: NaiveDate) -> Result<Vec<GameSummary>, FetchFailure> {
        info!("Fetching games for {}", date);
        let query = [
            ("sportId", SPORT_ID_MLB.to_string()),
            ("date", date.format(DATE_FORMAT).to_string()),
            ("hydrate", "team,venue".to_string()),
        ];
        let body = self.get_json("/schedule", &query).await?;
        let games = parse_schedule(&body);
        for game in &games {
            info!("Game: {} @ {}", game.away_team, game.home_team);
        }
        Ok(games)
    }

    async fn fetch_roster(&self, team_id: u32) -> Result<Roster, FetchFailure> {
        info!("Fetching roster for team {}", team_id);
        let path = format!("/teams/{}/roster", team_id);
        let body = self
            .get_json(&path, &[("hydrate", "person".to_string())])
            .await?;
        let roster = parse_roster(&body).map_err(|reason| FetchFailure::format(&path, reason))?;
        info!(
            "Roster for team {}: {} batters, {} pitchers",
            team_id,
            roster.batters.len(),
            roster.pitchers.len()
        );
        Ok(roster)
    }

    async fn fetch_game_logs(&self, query: &GameLogQuery) -> Result<Vec<GameLogRecord>, FetchFailure> {
        let path = format!("/people/{}/stats", query.player_id);
        let params = [
            ("stats", "gameLog".to_string()),
            ("group", query.family.as_str().to_string()),
            ("startDate", query.start.format(DATE_FORMAT).to_string()),
            ("endDate", query.end.format(DATE_FORMAT).to_string()),
            ("season", query.season.to_string()),
        ];
        let body = self.get_json(&path, &params).await?;
        Ok(parse_stat_splits(&body))
    }

    async fn fetch_season_totals(
        &self,
        player_id: u64,
        family: StatFamily,
        season: i32,
    ) -> Result<Option<SeasonTotals>, FetchFailure> {
        let path = format!("/people/{}/stats", player_id);
        let params = [
            ("stats", "season".to_string()),
            ("group", family.as_str().to_string()),
            ("season", season.to_string()),
        ];
        let body = self.get_json(&path, &params).await?;
        Ok(parse_stat_splits(&body).into_iter().next())
    }

    async fn fetch_team_stats(&self, team_id: u32, season: i32) -> Result<TeamStatsSummary, FetchFailure> {
        let path = format!("/teams/{}/stats", team_id);
        let params = [
            ("stats", "season".to_string()),
            ("group", "hitting,pitching".to_string()),
            ("season", season.to_string()),
        ];
        let body = self.get_json(&path, &params).await?;
        let stats = parse_team_stats(&body);
        info!("Team {} stats: {:?}", team_id, stats);
        Ok(stats)
    }

    fn source_name(&self) -> &str {
        "mlb-stats-api"
    }
}

// ============================================================================
// Field extraction
// ============================================================================

/// Integer from a JSON number or numeric string.
fn json_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Float from a JSON number or numeric string (".245" included).
fn json_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Counting stat: absent -> 0 silently, present but unreadable -> 0 with a warning.
fn count(stat: &Value, field: &str) -> u32 {
    let value = &stat[field];
    if value.is_null() {
        return 0;
    }
    json_u32(value).unwrap_or_else(|| {
        warn!("Partial stat data: '{}' = {} unreadable, using 0", field, value);
        0
    })
}

fn rate(stat: &Value, field: &str) -> f64 {
    let value = &stat[field];
    if value.is_null() {
        return 0.0;
    }
    json_f64(value).unwrap_or_else(|| {
        warn!("Partial stat data: '{}' = {} unreadable, using 0", field, value);
        0.0
    })
}

// ============================================================================
// Response parsing
// ============================================================================

pub fn parse_schedule(body: &Value) -> Vec<GameSummary> {
    let games = match body["dates"][0]["games"].as_array() {
        Some(games) => games,
        None => return Vec::new(),
    };

    games
        .iter()
        .filter_map(|game| {
            let id = match game["gamePk"].as_u64() {
                Some(id) => id,
                None => {
                    warn!("Skipping schedule entry without gamePk");
                    return None;
                }
            };
            let away = &game["teams"]["away"]["team"];
            let home = &game["teams"]["home"]["team"];

            Some(GameSummary {
                id,
                away_team: json_string(&away["name"]),
                home_team: json_string(&home["name"]),
                away_id: json_u32(&away["id"]).unwrap_or(0),
                home_id: json_u32(&home["id"]).unwrap_or(0),
                status: json_string(&game["status"]["detailedState"]).to_lowercase(),
                game_time: json_string(&game["gameDate"]),
                venue: json_string(&game["venue"]["name"]),
            })
        })
        .collect()
}

pub fn parse_roster(body: &Value) -> Result<Roster, String> {
    let players = body["roster"]
        .as_array()
        .ok_or_else(|| "missing 'roster' array".to_string())?;

    let entries = players.iter().filter_map(|player| {
        let person = &player["person"];
        let id = match person["id"].as_u64() {
            Some(id) => id,
            None => {
                warn!("Skipping roster entry without person id");
                return None;
            }
        };
        let position = &player["position"];

        Some(RosterEntry {
            id,
            name: json_string(&person["fullName"]),
            position: json_string(&position["abbreviation"]),
            jersey_number: json_string(&player["jerseyNumber"]),
            role: Role::from_position_type(position["type"].as_str().unwrap_or_default()),
        })
    });

    Ok(Roster::from_entries(entries))
}

/// Splits of the first stats block; empty when there are none.
pub fn parse_stat_splits(body: &Value) -> Vec<GameLogRecord> {
    match body["stats"][0]["splits"].as_array() {
        Some(splits) => splits.iter().map(|split| parse_stat_line(&split["stat"])).collect(),
        None => Vec::new(),
    }
}

pub fn parse_stat_line(stat: &Value) -> GameLogRecord {
    let innings_pitched = match &stat["inningsPitched"] {
        Value::Null => String::new(),
        other => json_string(other),
    };

    GameLogRecord {
        at_bats: count(stat, "atBats"),
        hits: count(stat, "hits"),
        home_runs: count(stat, "homeRuns"),
        rbi: count(stat, "rbi"),
        walks: count(stat, "baseOnBalls"),
        strikeouts: count(stat, "strikeOuts"),
        total_bases: count(stat, "totalBases"),
        innings_pitched,
        earned_runs: count(stat, "earnedRuns"),
        saves: count(stat, "saves"),
        games_started: count(stat, "gamesStarted"),
    }
}

pub fn parse_team_stats(body: &Value) -> TeamStatsSummary {
    let mut summary = TeamStatsSummary::default();

    let groups = match body["stats"].as_array() {
        Some(groups) => groups,
        None => return summary,
    };

    for group in groups {
        let stat = &group["splits"][0]["stat"];
        if !stat.is_object() {
            continue;
        }
        match group["group"]["displayName"].as_str() {
            Some("hitting") => {
                summary.avg = format_rate3(rate(stat, "avg"));
                summary.obp = format_rate3(rate(stat, "obp"));
                summary.slg = format_rate3(rate(stat, "slg"));
                summary.hr = count(stat, "homeRuns").to_string();
            }
            Some("pitching") => {
                summary.era = format_fixed2(rate(stat, "era"));
                summary.whip = format_fixed2(rate(stat, "whip"));
                summary.sv = count(stat, "saves").to_string();
            }
            _ => {}
        }
    }

    summary
}
