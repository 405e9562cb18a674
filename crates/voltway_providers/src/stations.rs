//! In-memory station directory over an R-tree. Radius queries run against
//! squared haversine distances, matching the `GeoPoint` spatial convention.

use rstar::{AABB, Envelope, PointDistance, RTree, RTreeObject};
use tracing::info;

use voltway_core::geo::{GeoPoint, haversine_distance};
use voltway_core::providers::StationDirectory;
use voltway_core::trip::{Amenity, StationCandidate};

struct IndexedStation(StationCandidate);

impl RTreeObject for IndexedStation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.0.point.lng, self.0.point.lat])
    }
}

impl PointDistance for IndexedStation {
    fn distance_2(&self, point: &<Self::Envelope as Envelope>::Point) -> f64 {
        haversine_distance(self.0.point.lat, self.0.point.lng, point[1], point[0]).powi(2)
    }
}

pub struct InMemoryStationDirectory {
    tree: RTree<IndexedStation>,
}

impl InMemoryStationDirectory {
    pub fn new(stations: Vec<StationCandidate>) -> Self {
        info!(stations = stations.len(), "indexing station directory");
        let tree = RTree::bulk_load(stations.into_iter().map(IndexedStation).collect());
        InMemoryStationDirectory { tree }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

fn matches_filter(station: &StationCandidate, filter: Option<&[Amenity]>) -> bool {
    filter.is_none_or(|wanted| wanted.iter().all(|amenity| station.amenities.contains(amenity)))
}

impl StationDirectory for InMemoryStationDirectory {
    fn find_near(
        &self,
        point: GeoPoint,
        radius_m: f64,
        filter: Option<&[Amenity]>,
        limit: usize,
    ) -> Vec<StationCandidate> {
        let mut found: Vec<&StationCandidate> = self
            .tree
            .locate_within_distance([point.lng, point.lat], radius_m * radius_m)
            .map(|indexed| &indexed.0)
            .filter(|station| station.is_operational && matches_filter(station, filter))
            .collect();
        found.sort_by(|a, b| {
            a.point
                .haversine_distance(&point)
                .total_cmp(&b.point.haversine_distance(&point))
        });
        found.into_iter().take(limit).cloned().collect()
    }

    fn load_operational(&self, limit: usize) -> Vec<StationCandidate> {
        self.tree
            .iter()
            .map(|indexed| &indexed.0)
            .filter(|station| station.is_operational)
            .take(limit)
            .cloned()
            .collect()
    }

    fn count_operational(&self) -> usize {
        self.tree
            .iter()
            .filter(|indexed| indexed.0.is_operational)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str, lat: f64, lng: f64, operational: bool) -> StationCandidate {
        StationCandidate {
            id: id.into(),
            name: format!("Station {id}"),
            point: GeoPoint::new(lat, lng),
            power_kw: 50.0,
            number_of_chargers: 2,
            amenities: vec![Amenity::Washroom],
            is_operational: operational,
            score: 0.0,
        }
    }

    fn directory() -> InMemoryStationDirectory {
        InMemoryStationDirectory::new(vec![
            station("close", 48.01, 2.0, true),
            station("closer", 48.005, 2.0, true),
            station("far", 48.5, 2.0, true),
            station("down", 48.002, 2.0, false),
        ])
    }

    #[test]
    fn radius_query_returns_nearest_first() {
        let found = directory().find_near(GeoPoint::new(48.0, 2.0), 5_000.0, None, 10);
        let ids: Vec<&str> = found.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["closer", "close"]);
    }

    #[test]
    fn non_operational_stations_are_hidden() {
        let found = directory().find_near(GeoPoint::new(48.0, 2.0), 5_000.0, None, 10);
        assert!(found.iter().all(|s| s.id != "down"));
        assert_eq!(directory().count_operational(), 3);
    }

    #[test]
    fn amenity_filter_is_a_conjunction() {
        let with_washroom = directory().find_near(
            GeoPoint::new(48.0, 2.0),
            5_000.0,
            Some(&[Amenity::Washroom]),
            10,
        );
        assert_eq!(with_washroom.len(), 2);

        let with_hotel = directory().find_near(
            GeoPoint::new(48.0, 2.0),
            5_000.0,
            Some(&[Amenity::Washroom, Amenity::Hotel]),
            10,
        );
        assert!(with_hotel.is_empty());
    }

    #[test]
    fn limit_caps_the_result() {
        let found = directory().find_near(GeoPoint::new(48.0, 2.0), 100_000.0, None, 1);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "closer");
    }
}
