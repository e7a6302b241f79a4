//! Per-day, per-account stats cache.
//!
//! Entries are keyed by `(today, account)`, so a lookup on any other date
//! misses. Uses [`moka`] with a one-day TTL and a capacity bound, so entries
//! for past days age out on their own. Writers call [`StatsCache::invalidate`]
//! for the affected account.

use std::collections::HashMap;
use std::time::Duration;

use moka::sync::Cache;

use super::HabitStats;
use crate::calendar::LocalDate;

/// Maximum number of cached `(day, account)` entries.
const MAX_CACHE_ENTRIES: u64 = 256;

/// One calendar day.
const ENTRY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

type Entry = HashMap<String, HabitStats>;

#[derive(Debug, Clone)]
pub struct StatsCache {
    entries: Cache<(LocalDate, String), Entry>,
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsCache {
    pub fn new() -> Self {
        let entries = Cache::builder()
            .max_capacity(MAX_CACHE_ENTRIES)
            .time_to_live(ENTRY_TTL)
            .support_invalidation_closures()
            .build();
        Self { entries }
    }

    /// Look up cached stats. Returns `Some(stats)` on hit, `None` on miss.
    pub fn get(&self, today: LocalDate, account: &str) -> Option<Entry> {
        self.entries.get(&(today, account.to_string()))
    }

    pub fn put(&self, today: LocalDate, account: &str, stats: Entry) {
        self.entries.insert((today, account.to_string()), stats);
    }

    /// Forget everything cached for `account`, whatever the day.
    pub fn invalidate(&self, account: &str) {
        let account = account.to_string();
        if let Err(err) = self
            .entries
            .invalidate_entries_if(move |(_, owner), _| *owner == account)
        {
            // Fall back to dropping every account.
            tracing::warn!(error = %err, "stats cache predicate rejected, clearing");
            self.entries.invalidate_all();
        }
    }

    /// Forget every account. Used when global inputs such as holidays change.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}
