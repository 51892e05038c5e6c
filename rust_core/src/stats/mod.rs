//! Stat derivation: innings notation, reducers, fallback resolution and team rollups.

pub mod aggregate;
pub mod fallback;
pub mod innings;
pub mod team_rolling;

pub use aggregate::{aggregate, aggregate_hitting, aggregate_pitching, season, season_hitting, season_pitching};
pub use fallback::{FallbackPolicy, FallbackState, Resolution, ResolvedFrom};
pub use innings::Innings;
pub use team_rolling::rolling_team_stats;
