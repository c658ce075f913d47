use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TOTAL_API: &str = "total_api";
pub const BPA_I: &str = "bpa_i";
pub const BPA_C: &str = "bpa_c";
pub const REMOVED: &str = "removed";

/// Snapshot of named counters shown while a run is in progress
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiveStats(BTreeMap<String, u64>);

impl LiveStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: u64) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    /// Missing keys read as 0
    pub fn get(&self, key: &str) -> u64 {
        self.0.get(key).copied().unwrap_or(0)
    }
}

impl<K: Into<String>> FromIterator<(K, u64)> for LiveStats {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        LiveStats(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Holds the latest [`LiveStats`] snapshot; updates replace, never merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveStatsProjection {
    snapshot: Option<LiveStats>,
}

impl LiveStatsProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, stats: LiveStats) {
        self.snapshot = Some(stats);
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }

    pub fn snapshot(&self) -> Option<&LiveStats> {
        self.snapshot.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Reads 0 when absent or when the key is missing
    pub fn get(&self, key: &str) -> u64 {
        self.snapshot.as_ref().map(|s| s.get(key)).unwrap_or(0)
    }

    /// Display form: `-` while absent
    pub fn display(&self, key: &str) -> String {
        match &self.snapshot {
            Some(stats) => stats.get(key).to_string(),
            None => "-".to_string(),
        }
    }
}
