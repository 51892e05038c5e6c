//! Diamond Core - MLB stats caching and aggregation.
//!
//! This crate provides:
//! - A TTL memo cache keyed by typed resource keys
//! - An MLB Stats API client behind the `StatsSource` seam
//! - Rolling-window stat derivation with a season-totals fallback
//! - Team view assembly with bounded, concurrent player lookups
//!
//! `StatsService` is the entry point for callers.

pub mod cache;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod stats;
pub mod teams;
pub mod view;

pub use cache::{CacheStats, Clock, ManualClock, MemoCache, ResourceKey, ResourceKind, SystemClock};
pub use clients::{GameLogQuery, MlbStatsClient, StatsSource};
pub use config::{EngineConfig, TeamViewConfig, TtlTable};
pub use error::FetchFailure;
pub use service::StatsService;
