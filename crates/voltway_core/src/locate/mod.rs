//! Multi-strategy candidate station search with graceful degradation.
//!
//! Strategies run in a fixed order; each adds to the result set and the
//! chain stops as soon as the stopping predicate (enough candidates) is
//! satisfied. A time-boxed cache keyed by the critical points and detour
//! radius short-circuits the whole chain.

pub mod cache;
pub mod ranking;

use fxhash::FxHashSet;
use jiff::Timestamp;
use tracing::{debug, info};

use crate::providers::StationDirectory;
use crate::trip::{Amenity, CriticalPoint, RankingStrategy, Segment, StationCandidate};

pub use cache::{search_key, StationSearchCache};
pub use ranking::rank_stations;

/// Stopping predicate: strategies keep running until this many candidates
/// have been collected.
const MINIMUM_ACCEPTABLE: usize = 5;
const MAX_CANDIDATES: usize = 30;
const CRITICAL_POINT_LIMIT: usize = 15;
const ROUTE_SAMPLE_LIMIT: usize = 10;
const SCAN_LOAD_LIMIT: usize = 100;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SearchStrategy {
    CriticalPoints,
    RouteSamples,
    GreatCircleScan,
}

const STRATEGY_ORDER: [SearchStrategy; 3] = [
    SearchStrategy::CriticalPoints,
    SearchStrategy::RouteSamples,
    SearchStrategy::GreatCircleScan,
];

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub stations: Vec<StationCandidate>,
    pub total_found: usize,
    pub from_cache: bool,
}

pub struct CandidateLocator<'a, S: StationDirectory> {
    directory: &'a S,
    cache: &'a StationSearchCache,
}

impl<'a, S: StationDirectory> CandidateLocator<'a, S> {
    pub fn new(directory: &'a S, cache: &'a StationSearchCache) -> Self {
        CandidateLocator { directory, cache }
    }

    pub fn find_candidates(
        &self,
        segments: &[Segment],
        critical_points: &[CriticalPoint],
        max_detour_km: f64,
        amenity_filter: &[Amenity],
        strategy: RankingStrategy,
        now: Timestamp,
    ) -> SearchOutcome {
        let key = search_key(critical_points, max_detour_km);
        if let Some(stations) = self.cache.get(key, now) {
            debug!(candidates = stations.len(), "station search served from cache");
            return SearchOutcome {
                total_found: stations.len(),
                stations,
                from_cache: true,
            };
        }

        let mut results: Vec<StationCandidate> = Vec::new();
        let mut seen: FxHashSet<String> = FxHashSet::default();

        for search in STRATEGY_ORDER {
            if self.strategy_applies(search, critical_points, &results) {
                let found = self.run_strategy(search, segments, critical_points, max_detour_km);
                debug!(?search, found = found.len(), "search strategy pass");
                for station in found {
                    if seen.insert(station.id.clone()) {
                        results.push(station);
                    }
                }
            }
            if results.len() >= MINIMUM_ACCEPTABLE {
                break;
            }
        }

        if !amenity_filter.is_empty() {
            results.retain(|station| {
                amenity_filter
                    .iter()
                    .any(|amenity| station.amenities.contains(amenity))
            });
        }

        let total_found = results.len();
        rank_stations(&mut results, critical_points, strategy);
        results.truncate(MAX_CANDIDATES);

        info!(
            candidates = results.len(),
            total_found,
            operational = self.directory.count_operational(),
            "station search complete"
        );

        self.cache.insert(key, results.clone(), now);
        SearchOutcome {
            stations: results,
            total_found,
            from_cache: false,
        }
    }

    fn strategy_applies(
        &self,
        search: SearchStrategy,
        critical_points: &[CriticalPoint],
        results: &[StationCandidate],
    ) -> bool {
        match search {
            SearchStrategy::CriticalPoints => !critical_points.is_empty(),
            SearchStrategy::RouteSamples => {
                critical_points.is_empty() || results.len() < MINIMUM_ACCEPTABLE
            }
            SearchStrategy::GreatCircleScan => results.is_empty(),
        }
    }

    fn run_strategy(
        &self,
        search: SearchStrategy,
        segments: &[Segment],
        critical_points: &[CriticalPoint],
        max_detour_km: f64,
    ) -> Vec<StationCandidate> {
        match search {
            SearchStrategy::CriticalPoints => {
                let radius_m = max_detour_km * 1000.0 * 2.0;
                critical_points
                    .iter()
                    .flat_map(|critical| {
                        self.directory
                            .find_near(critical.point, radius_m, None, CRITICAL_POINT_LIMIT)
                    })
                    .collect()
            }
            SearchStrategy::RouteSamples => {
                let radius_m = max_detour_km * 1000.0 * 3.0;
                route_samples(segments)
                    .into_iter()
                    .flat_map(|point| {
                        self.directory
                            .find_near(point, radius_m, None, ROUTE_SAMPLE_LIMIT)
                    })
                    .collect()
            }
            SearchStrategy::GreatCircleScan => {
                let Some(start) = segments.first() else {
                    return Vec::new();
                };
                let mut stations: Vec<(f64, StationCandidate)> = self
                    .directory
                    .load_operational(SCAN_LOAD_LIMIT)
                    .into_iter()
                    .map(|station| {
                        let km = start.point.haversine_distance(&station.point) / 1000.0;
                        (km, station)
                    })
                    .filter(|(km, _)| *km <= max_detour_km * 3.0)
                    .collect();
                stations.sort_by(|a, b| a.0.total_cmp(&b.0));
                stations
                    .into_iter()
                    .take(MAX_CANDIDATES)
                    .map(|(_, station)| station)
                    .collect()
            }
        }
    }
}

/// Start, midpoint, and end of the route.
fn route_samples(segments: &[Segment]) -> Vec<crate::geo::GeoPoint> {
    match segments {
        [] => Vec::new(),
        [only] => vec![only.point],
        _ => vec![
            segments[0].point,
            segments[segments.len() / 2].point,
            segments[segments.len() - 1].point,
        ],
    }
}
