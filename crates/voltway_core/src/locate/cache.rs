//! Time-boxed cache for station search results. An explicit service object
//! injected into the locator rather than a module-level singleton; staleness
//! only affects ranking freshness, never correctness.

use std::hash::{Hash, Hasher};

use fxhash::{FxHashMap, FxHasher64};
use jiff::Timestamp;
use parking_lot::RwLock;

use crate::trip::{CriticalPoint, StationCandidate};

const DEFAULT_TTL_MS: i64 = 60 * 60 * 1000;

struct CacheEntry {
    stations: Vec<StationCandidate>,
    stored_at_ms: i64,
}

pub struct StationSearchCache {
    entries: RwLock<FxHashMap<u64, CacheEntry>>,
    ttl_ms: i64,
}

impl Default for StationSearchCache {
    fn default() -> Self {
        StationSearchCache::new(DEFAULT_TTL_MS)
    }
}

impl StationSearchCache {
    pub fn new(ttl_ms: i64) -> Self {
        StationSearchCache {
            entries: RwLock::new(FxHashMap::default()),
            ttl_ms,
        }
    }

    pub fn get(&self, key: u64, now: Timestamp) -> Option<Vec<StationCandidate>> {
        let entries = self.entries.read();
        let entry = entries.get(&key)?;
        if now.as_millisecond() - entry.stored_at_ms >= self.ttl_ms {
            return None;
        }
        Some(entry.stations.clone())
    }

    pub fn insert(&self, key: u64, stations: Vec<StationCandidate>, now: Timestamp) {
        self.entries.write().insert(
            key,
            CacheEntry {
                stations,
                stored_at_ms: now.as_millisecond(),
            },
        );
    }
}

/// Search results are keyed by the critical points and the detour radius;
/// identical requests within the TTL short-circuit every search strategy.
pub fn search_key(critical_points: &[CriticalPoint], max_detour_km: f64) -> u64 {
    let mut hasher = FxHasher64::default();
    critical_points.len().hash(&mut hasher);
    for point in critical_points {
        point.segment_index.hash(&mut hasher);
        hasher.write_u64(point.point.lat.to_bits());
        hasher.write_u64(point.point.lng.to_bits());
    }
    hasher.write_u64(max_detour_km.to_bits());
    hasher.finish()
}
