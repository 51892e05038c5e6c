//! Tiered memoizing cache in front of the upstream API.
//!
//! Every cached computation is identified by a [`ResourceKey`]; the caller
//! supplies the freshness window (normally from [`crate::config::TtlTable`])
//! and a producer. Entries expire lazily: an expired entry is dropped on the
//! next lookup of its key, there is no background sweep.
//!
//! Producer failures are never stored, so a failing upstream call is retried
//! on the next request instead of being frozen for the whole TTL.
//!
//! Concurrent misses on the same key may both run the producer; the later
//! write wins. The entry map lock is never held across an await, so a reader
//! sees either the previous entry or the complete new one.

use crate::models::StatFamily;
use chrono::{Local, NaiveDate};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Kinds of cacheable resources, each with its own freshness window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Schedule,
    Roster,
    PlayerRolling,
    PlayerSeason,
    TeamSeason,
}

/// Cache identity: two keys are equal iff kind and every parameter match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Schedule {
        date: NaiveDate,
    },
    Roster {
        team_id: u32,
    },
    PlayerRolling {
        player_id: u64,
        family: StatFamily,
        window_days: u32,
    },
    PlayerSeason {
        player_id: u64,
        family: StatFamily,
        season: i32,
    },
    TeamSeason {
        team_id: u32,
        season: i32,
    },
}

impl ResourceKey {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceKey::Schedule { .. } => ResourceKind::Schedule,
            ResourceKey::Roster { .. } => ResourceKind::Roster,
            ResourceKey::PlayerRolling { .. } => ResourceKind::PlayerRolling,
            ResourceKey::PlayerSeason { .. } => ResourceKind::PlayerSeason,
            ResourceKey::TeamSeason { .. } => ResourceKind::TeamSeason,
        }
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Time source for freshness checks and "today" for date-windowed fetches.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn today(&self) -> NaiveDate;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
    today: Mutex<NaiveDate>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            today: Mutex::new(today),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.elapsed.lock() += by;
    }

    pub fn set_today(&self, today: NaiveDate) {
        *self.today.lock() = today;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.elapsed.lock()
    }

    fn today(&self) -> NaiveDate {
        *self.today.lock()
    }
}

// ============================================================================
// Cache
// ============================================================================

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    computed_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.computed_at) < self.ttl
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Process-local memo cache shared by every fetch and aggregation path.
pub struct MemoCache {
    entries: Mutex<HashMap<ResourceKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for MemoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoCache")
            .field("stats", &self.stats())
            .finish()
    }
}

impl Default for MemoCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Return the fresh value for `key`, or run `producer` and store its success.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: ResourceKey,
        ttl: Duration,
        producer: F,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get::<T>(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Cache hit for {:?}", key);
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("Cache miss for {:?}", key);

        let value = producer().await?;
        self.insert(key, value.clone(), ttl);
        Ok(value)
    }

    /// Fresh value for `key`, evicting it if it has expired.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, key: &ResourceKey) -> Option<T> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        let entry = entries.get(key)?;
        if !entry.is_fresh(now) {
            entries.remove(key);
            return None;
        }

        let cached = entry.value.downcast_ref::<T>().cloned();
        if cached.is_none() {
            warn!("Cached value for {:?} has an unexpected type; recomputing", key);
            entries.remove(key);
        }
        cached
    }

    pub fn insert<T: Send + Sync + 'static>(&self, key: ResourceKey, value: T, ttl: Duration) {
        let entry = CacheEntry {
            value: Arc::new(value),
            computed_at: self.clock.now(),
            ttl,
        };
        self.entries.lock().insert(key, entry);
    }

    /// Drop every entry immediately. Hit/miss counters are kept.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let dropped = entries.len();
        entries.clear();
        debug!("Cache cleared: dropped {} entries", dropped);
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
