//! ViewBuilder Rust Service
//!
//! Builds matchup views for today's MLB games and writes them to stdout as
//! JSON, one game per line. With `VIEW_REFRESH_SECS` set it keeps running and
//! rebuilds on that interval, serving repeat lookups from the shared cache.

use anyhow::Result;
use diamond_core::models::GameSummary;
use diamond_core::{EngineConfig, MlbStatsClient, StatsService};
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting ViewBuilder Rust Service...");

    let config = EngineConfig::from_env();
    info!(
        "Config: api={} season={} key_batters={} key_pitchers={} max_concurrent={}",
        config.api_base,
        config.season,
        config.team_view.key_batters,
        config.team_view.key_pitchers,
        config.team_view.max_concurrent_fetches
    );

    let client = MlbStatsClient::new(&config);
    let service = StatsService::new(Arc::new(client), config);

    let refresh = env::var("VIEW_REFRESH_SECS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    loop {
        run_cycle(&service).await?;

        let Some(interval) = refresh else {
            break;
        };
        let stats = service.cache_stats();
        info!(
            "Cache: {} entries, {} hits, {} misses. Next refresh in {}s",
            stats.entries,
            stats.hits,
            stats.misses,
            interval.as_secs()
        );
        tokio::time::sleep(interval).await;
    }

    Ok(())
}

async fn run_cycle(service: &StatsService) -> Result<()> {
    let games = service.get_todays_games().await;
    if games.is_empty() {
        warn!("No games found for today (or the schedule is unavailable)");
        return Ok(());
    }
    info!("Found {} games today", games.len());

    for game in &games {
        if game.is_postponed() {
            info!("Skipping postponed game {} @ {}", game.away_team, game.home_team);
            continue;
        }
        let view = service.get_game_view(game.home_id, game.away_id).await;
        let line = serde_json::json!({
            "game": summary_json(game),
            "home": view.home,
            "away": view.away,
        });
        println!("{}", serde_json::to_string(&line)?);
    }
    Ok(())
}

fn summary_json(game: &GameSummary) -> serde_json::Value {
    serde_json::json!({
        "id": game.id,
        "matchup": format!("{} @ {}", game.away_team, game.home_team),
        "time": game.display_time(),
        "venue": game.venue,
        "status": game.status,
    })
}
