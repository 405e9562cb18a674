//! Collaborator contracts consumed by the planning pipeline. The engine
//! never talks to a road network, weather feed, traffic feed, or station
//! database directly; implementations of these traits do.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::conditions::{Traffic, Weather};
use crate::geo::GeoPoint;
use crate::trip::{Amenity, StationCandidate};

/// A road-network route between two points, as returned by an external
/// routing provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteData {
    pub coordinates: Vec<GeoPoint>,
    pub distance_m: f64,
    pub duration_sec: f64,
}

pub trait RouteProvider {
    fn route(
        &self,
        origin: geo_types::Point,
        destination: geo_types::Point,
    ) -> impl Future<Output = anyhow::Result<RouteData>>;
}

/// Time-indexed weather and traffic lookups. Failures are recovered locally
/// by the enricher (ideal weather, predicted traffic), never propagated.
pub trait ConditionProvider {
    fn weather(&self, point: GeoPoint, at: Timestamp) -> impl Future<Output = anyhow::Result<Weather>>;
    fn traffic(&self, point: GeoPoint, at: Timestamp) -> impl Future<Output = anyhow::Result<Traffic>>;
}

/// Geospatial charging-station lookups. Implementations return operational
/// stations only, ordered by distance from the query point.
pub trait StationDirectory {
    fn find_near(
        &self,
        point: GeoPoint,
        radius_m: f64,
        filter: Option<&[Amenity]>,
        limit: usize,
    ) -> Vec<StationCandidate>;

    /// Bounded load used by the brute-force search fallback.
    fn load_operational(&self, limit: usize) -> Vec<StationCandidate>;

    fn count_operational(&self) -> usize;
}
