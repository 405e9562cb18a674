//! End-to-end planning through `TripPlanner` with scripted providers.

use voltway_core::conditions::{Traffic, Weather};
use voltway_core::geo::GeoPoint;
use voltway_core::providers::{ConditionProvider, RouteData, RouteProvider, StationDirectory};
use voltway_core::pipeline::{TripPlanner, TripRequest};
use voltway_core::trip::{
    Amenity, DestinationRecommendation, PlannerKind, StationCandidate, TripPolicy, VehicleProfile,
};

/// Straight-line "road network": interpolates points every 2 km between the
/// endpoints and reports the great-circle length.
struct StraightLineRoute;

impl RouteProvider for StraightLineRoute {
    async fn route(
        &self,
        origin: geo_types::Point,
        destination: geo_types::Point,
    ) -> anyhow::Result<RouteData> {
        let from = GeoPoint::from(origin);
        let to = GeoPoint::from(destination);
        let distance_m = from.haversine_distance(&to);
        let steps = (distance_m / 2_000.0).ceil().max(1.0) as usize;

        let coordinates = (0..=steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                GeoPoint::new(
                    from.lat + (to.lat - from.lat) * t,
                    from.lng + (to.lng - from.lng) * t,
                )
            })
            .collect();

        Ok(RouteData {
            coordinates,
            distance_m,
            duration_sec: distance_m / 1000.0 / 90.0 * 3600.0,
        })
    }
}

struct ClearConditions;

impl ConditionProvider for ClearConditions {
    async fn weather(&self, _point: GeoPoint, _at: jiff::Timestamp) -> anyhow::Result<Weather> {
        Ok(Weather::ideal())
    }

    async fn traffic(&self, _point: GeoPoint, _at: jiff::Timestamp) -> anyhow::Result<Traffic> {
        Ok(Traffic::free_flow())
    }
}

struct FixedDirectory {
    stations: Vec<StationCandidate>,
}

impl StationDirectory for FixedDirectory {
    fn find_near(
        &self,
        point: GeoPoint,
        radius_m: f64,
        filter: Option<&[Amenity]>,
        limit: usize,
    ) -> Vec<StationCandidate> {
        let mut matches: Vec<StationCandidate> = self
            .stations
            .iter()
            .filter(|s| s.is_operational && s.point.haversine_distance(&point) <= radius_m)
            .filter(|s| {
                filter.is_none_or(|wanted| wanted.iter().all(|a| s.amenities.contains(a)))
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            a.point
                .haversine_distance(&point)
                .total_cmp(&b.point.haversine_distance(&point))
        });
        matches.truncate(limit);
        matches
    }

    fn load_operational(&self, limit: usize) -> Vec<StationCandidate> {
        self.stations
            .iter()
            .filter(|s| s.is_operational)
            .take(limit)
            .cloned()
            .collect()
    }

    fn count_operational(&self) -> usize {
        self.stations.iter().filter(|s| s.is_operational).count()
    }
}

fn station(id: &str, lat: f64, lng: f64, power_kw: f64) -> StationCandidate {
    StationCandidate {
        id: id.into(),
        name: format!("Station {id}"),
        point: GeoPoint::new(lat, lng),
        power_kw,
        number_of_chargers: 4,
        amenities: vec![Amenity::Washroom, Amenity::Cafe],
        is_operational: true,
        score: 0.0,
    }
}

fn policy() -> TripPolicy {
    TripPolicy {
        departure: Some("2026-03-02T09:00:00Z".parse().unwrap()),
        ..TripPolicy::default()
    }
}

#[tokio::test]
async fn short_trip_needs_no_charging() {
    let planner = TripPlanner::new(
        StraightLineRoute,
        ClearConditions,
        FixedDirectory { stations: vec![] },
    );
    let request = TripRequest {
        origin: GeoPoint::new(48.0, 2.0),
        destination: GeoPoint::new(48.3, 2.0),
        vehicle: VehicleProfile {
            battery_capacity_kwh: 60.0,
            degradation_percent: 0.0,
            consumption_kwh_per_km: 0.15,
            max_charge_power_kw: 50.0,
        },
        policy: policy(),
    };

    let plan = planner.plan_trip(&request).await.unwrap();

    assert!(!plan.charging_required);
    assert!(plan.charging_stops.is_empty());
    assert_eq!(plan.planner, "direct");
    assert!(plan.distance_km > 30.0 && plan.distance_km < 36.0);
    assert!(plan.battery.meets_destination_requirement);
    assert!(matches!(
        plan.battery.recommendation,
        DestinationRecommendation::Surplus { .. }
    ));
    // Clear conditions: no delay, every enriched segment reports free flow.
    assert_eq!(plan.traffic.total_delay_min, 0.0);
    assert!(plan.eta > plan.computed_at.checked_sub(jiff::SignedDuration::from_hours(24)).unwrap());
}

#[tokio::test]
async fn long_trip_plans_charging_stops() {
    // Roughly 334 km due north at 0.2 kWh/km against a 75 kWh pack: the 15%
    // reserve pushes the requirement past the pack, so a stop is mandatory.
    let planner = TripPlanner::new(
        StraightLineRoute,
        ClearConditions,
        FixedDirectory {
            stations: vec![
                station("mid", 50.4, 2.0, 150.0),
                station("late", 50.7, 2.0, 50.0),
            ],
        },
    );
    let request = TripRequest {
        origin: GeoPoint::new(48.0, 2.0),
        destination: GeoPoint::new(51.0, 2.0),
        vehicle: VehicleProfile {
            battery_capacity_kwh: 75.0,
            degradation_percent: 0.0,
            consumption_kwh_per_km: 0.2,
            max_charge_power_kw: 150.0,
        },
        policy: policy(),
    };

    let plan = planner.plan_trip(&request).await.unwrap();

    assert!(plan.charging_required);
    assert!(!plan.charging_stops.is_empty());
    assert_eq!(plan.planner, "greedy-lookahead");
    assert!(plan.charging_time_min > 0.0);
    assert!(plan.segments.iter().any(|s| s.is_charging_stop()));
    assert!(plan.battery.meets_destination_requirement);
    assert!(plan.battery.total_charged_kwh > 0.0);
    // Total time includes the charge on top of the drive.
    let drive_min = plan.segments.last().unwrap().cumulative_time_min;
    assert!((plan.total_time_min - drive_min - plan.charging_time_min).abs() < 1e-6);
}

#[tokio::test]
async fn constrained_planner_is_honored() {
    let planner = TripPlanner::new(
        StraightLineRoute,
        ClearConditions,
        FixedDirectory {
            stations: vec![station("mid", 50.4, 2.0, 150.0)],
        },
    );
    let request = TripRequest {
        origin: GeoPoint::new(48.0, 2.0),
        destination: GeoPoint::new(51.0, 2.0),
        vehicle: VehicleProfile {
            battery_capacity_kwh: 75.0,
            degradation_percent: 0.0,
            consumption_kwh_per_km: 0.2,
            max_charge_power_kw: 150.0,
        },
        policy: TripPolicy {
            planner: PlannerKind::Constrained,
            ..policy()
        },
    };

    let plan = planner.plan_trip(&request).await.unwrap();

    assert_eq!(plan.planner, "constrained-path");
    assert!(!plan.charging_stops.is_empty());
    assert!(plan.battery.meets_destination_requirement);
}

#[tokio::test]
async fn missing_stations_fail_with_no_candidates() {
    let planner = TripPlanner::new(
        StraightLineRoute,
        ClearConditions,
        FixedDirectory { stations: vec![] },
    );
    let request = TripRequest {
        origin: GeoPoint::new(48.0, 2.0),
        destination: GeoPoint::new(51.0, 2.0),
        vehicle: VehicleProfile {
            battery_capacity_kwh: 75.0,
            degradation_percent: 0.0,
            consumption_kwh_per_km: 0.2,
            max_charge_power_kw: 150.0,
        },
        policy: policy(),
    };

    let err = planner.plan_trip(&request).await.unwrap_err();
    assert_eq!(err.code(), "NO_CANDIDATES");
}

#[tokio::test]
async fn invalid_request_is_rejected_before_routing() {
    let planner = TripPlanner::new(
        StraightLineRoute,
        ClearConditions,
        FixedDirectory { stations: vec![] },
    );
    let request = TripRequest {
        origin: GeoPoint::new(48.0, 2.0),
        destination: GeoPoint::new(48.0, 2.0),
        vehicle: VehicleProfile {
            battery_capacity_kwh: 60.0,
            degradation_percent: 0.0,
            consumption_kwh_per_km: 0.15,
            max_charge_power_kw: 50.0,
        },
        policy: policy(),
    };

    let err = planner.plan_trip(&request).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
}
