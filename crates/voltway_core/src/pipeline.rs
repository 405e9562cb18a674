//! The planning pipeline. Owns the provider handles and runs a request
//! through segmentation, enrichment, simulation, charging analysis, station
//! search, stop planning, route mutation, and finalization.

use jiff::Timestamp;
use tracing::{info, warn};

use crate::analyze::analyze_charging_needs;
use crate::enrich::enrich_segments;
use crate::error::PlanningError;
use crate::finalize::{FinalizeInputs, finalize_trip};
use crate::geo::GeoPoint;
use crate::locate::{CandidateLocator, StationSearchCache};
use crate::mutate::insert_charging_stops;
use crate::planner::{
    ChargingPlanner, ConstrainedPathPlanner, GreedyLookaheadPlanner, PlanContext, PlanError,
};
use crate::providers::{ConditionProvider, RouteProvider, StationDirectory};
use crate::segmenter::build_segments;
use crate::simulate::simulate_consumption;
use crate::trip::{ChargingStop, PlannerKind, TripPlan, TripPolicy, VehicleProfile};

/// En-route reserve added on top of the trip consumption when deciding
/// whether charging is needed, as a fraction of usable capacity.
const SAFETY_BUFFER_FRACTION: f64 = 0.15;

#[derive(Debug, Clone)]
pub struct TripRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub vehicle: VehicleProfile,
    pub policy: TripPolicy,
}

pub struct TripPlanner<R, C, S> {
    route_provider: R,
    conditions: C,
    stations: S,
    cache: StationSearchCache,
}

impl<R, C, S> TripPlanner<R, C, S>
where
    R: RouteProvider,
    C: ConditionProvider,
    S: StationDirectory,
{
    pub fn new(route_provider: R, conditions: C, stations: S) -> Self {
        TripPlanner {
            route_provider,
            conditions,
            stations,
            cache: StationSearchCache::default(),
        }
    }

    pub async fn plan_trip(&self, request: &TripRequest) -> Result<TripPlan, PlanningError> {
        validate(request)?;

        let vehicle = &request.vehicle;
        let policy = &request.policy;
        let capacity_kwh = vehicle.usable_capacity_kwh();
        let initial_battery_kwh = policy.initial_battery_kwh(capacity_kwh).min(capacity_kwh);
        let min_destination_kwh = policy.min_destination_percent / 100.0 * capacity_kwh;
        let departure = policy.departure.unwrap_or_else(Timestamp::now);

        let route = self
            .route_provider
            .route(request.origin.into(), request.destination.into())
            .await
            .map_err(PlanningError::RouteProvider)?;
        if route.coordinates.len() < 2 {
            return Err(PlanningError::InvalidInput(
                "route has fewer than two coordinates".into(),
            ));
        }

        let total_distance_km = route.distance_m / 1000.0;
        let mut segments = build_segments(
            &route.coordinates,
            policy.segment_length_m,
            vehicle.consumption_kwh_per_km,
            vehicle.degradation_percent,
            total_distance_km,
        );
        if segments.is_empty() {
            return Err(PlanningError::InvalidInput(
                "route could not be segmented".into(),
            ));
        }
        info!(
            segments = segments.len(),
            distance_km = format_args!("{total_distance_km:.1}"),
            "route segmented"
        );

        enrich_segments(&self.conditions, &mut segments, departure).await;
        let mut outcome = simulate_consumption(&mut segments, capacity_kwh, initial_battery_kwh);

        let analysis = analyze_charging_needs(
            outcome.total_consumption_kwh,
            initial_battery_kwh,
            capacity_kwh * SAFETY_BUFFER_FRACTION,
            min_destination_kwh,
        );

        let mut charging_stops: Vec<ChargingStop> = Vec::new();
        let mut planner_name = "direct";
        if analysis.charging_required {
            let locator = CandidateLocator::new(&self.stations, &self.cache);
            let search = locator.find_candidates(
                &segments,
                &outcome.critical_points,
                policy.max_detour_km,
                &policy.amenity_filter,
                policy.strategy,
                departure,
            );
            if search.stations.is_empty() {
                return Err(PlanningError::NoCandidates {
                    detour_km: policy.max_detour_km,
                });
            }

            let context = PlanContext {
                segments: &segments,
                stations: &search.stations,
                critical_points: &outcome.critical_points,
                capacity_kwh,
                initial_battery_kwh,
                min_destination_kwh,
                consumption_kwh_per_km: vehicle.consumption_kwh_per_km,
            };
            (charging_stops, planner_name) =
                run_planner(policy.planner, &context, policy.max_detour_km)?;
        }

        if !charging_stops.is_empty() {
            insert_charging_stops(&mut segments, &charging_stops, capacity_kwh);
            outcome = simulate_consumption(&mut segments, capacity_kwh, initial_battery_kwh);
        }

        Ok(finalize_trip(
            &self.stations,
            FinalizeInputs {
                segments,
                charging_stops,
                outcome: &outcome,
                charging_required: analysis.charging_required,
                urgency: analysis.urgency,
                capacity_kwh,
                initial_battery_kwh,
                min_destination_kwh,
                departure,
                planner: planner_name,
            },
        ))
    }
}

/// Runs the requested planner; an infeasible constrained search falls back
/// to the greedy planner rather than failing the request.
fn run_planner(
    kind: PlannerKind,
    context: &PlanContext<'_>,
    max_detour_km: f64,
) -> Result<(Vec<ChargingStop>, &'static str), PlanningError> {
    let greedy = GreedyLookaheadPlanner;
    match kind {
        PlannerKind::Greedy => Ok((lift(greedy.plan(context), max_detour_km)?, greedy.name())),
        PlannerKind::Constrained => {
            let constrained = ConstrainedPathPlanner;
            match constrained.plan(context) {
                Ok(stops) => Ok((stops, constrained.name())),
                Err(PlanError::Infeasible) => {
                    warn!("constrained search infeasible, falling back to greedy");
                    Ok((lift(greedy.plan(context), max_detour_km)?, greedy.name()))
                }
                Err(PlanError::Unreachable(diagnostics)) => {
                    Err(PlanningError::UnreachableCharging(*diagnostics))
                }
            }
        }
    }
}

/// The greedy planner only ever fails with `Unreachable`; `Infeasible` is a
/// constrained-search outcome handled by the fallback above. Should one leak
/// through anyway it reads as an empty search at the policy detour radius.
fn lift(
    result: crate::planner::PlanResult,
    max_detour_km: f64,
) -> Result<Vec<ChargingStop>, PlanningError> {
    result.map_err(|err| match err {
        PlanError::Unreachable(diagnostics) => PlanningError::UnreachableCharging(*diagnostics),
        PlanError::Infeasible => PlanningError::NoCandidates {
            detour_km: max_detour_km,
        },
    })
}

fn validate(request: &TripRequest) -> Result<(), PlanningError> {
    if !request.origin.is_valid() || !request.destination.is_valid() {
        return Err(PlanningError::InvalidInput(
            "origin or destination coordinates out of range".into(),
        ));
    }
    if request.origin == request.destination {
        return Err(PlanningError::InvalidInput(
            "origin and destination are the same point".into(),
        ));
    }

    let vehicle = &request.vehicle;
    if vehicle.battery_capacity_kwh <= 0.0 {
        return Err(PlanningError::VehicleConfig(
            "battery capacity must be positive".into(),
        ));
    }
    if vehicle.consumption_kwh_per_km <= 0.0 {
        return Err(PlanningError::VehicleConfig(
            "consumption per km must be positive".into(),
        ));
    }
    if !(0.0..100.0).contains(&vehicle.degradation_percent) {
        return Err(PlanningError::VehicleConfig(
            "degradation must be between 0 and 100 percent".into(),
        ));
    }
    if vehicle.max_charge_power_kw <= 0.0 {
        return Err(PlanningError::VehicleConfig(
            "charge power must be positive".into(),
        ));
    }

    let policy = &request.policy;
    if policy.segment_length_m <= 0.0 {
        return Err(PlanningError::InvalidInput(
            "segment length must be positive".into(),
        ));
    }
    if policy.max_detour_km <= 0.0 {
        return Err(PlanningError::InvalidInput(
            "max detour must be positive".into(),
        ));
    }
    if !(0.0..=100.0).contains(&policy.min_destination_percent) {
        return Err(PlanningError::InvalidInput(
            "destination battery requirement must be between 0 and 100 percent".into(),
        ));
    }
    if !(0.0..=100.0).contains(&policy.initial_charge_percent) {
        return Err(PlanningError::InvalidInput(
            "initial charge must be between 0 and 100 percent".into(),
        ));
    }
    if policy.initial_charge_kwh.is_some_and(|kwh| kwh <= 0.0) {
        return Err(PlanningError::InvalidInput(
            "initial charge must be positive".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TripRequest {
        TripRequest {
            origin: GeoPoint::new(48.0, 2.0),
            destination: GeoPoint::new(48.5, 2.0),
            vehicle: VehicleProfile {
                battery_capacity_kwh: 60.0,
                degradation_percent: 0.0,
                consumption_kwh_per_km: 0.15,
                max_charge_power_kw: 50.0,
            },
            policy: TripPolicy::default(),
        }
    }

    #[test]
    fn validation_accepts_a_sane_request() {
        assert!(validate(&request()).is_ok());
    }

    #[test]
    fn validation_rejects_bad_coordinates() {
        let mut bad = request();
        bad.origin = GeoPoint::new(91.0, 2.0);
        let err = validate(&bad).unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[test]
    fn validation_rejects_identical_endpoints() {
        let mut bad = request();
        bad.destination = bad.origin;
        assert_eq!(validate(&bad).unwrap_err().code(), "INVALID_INPUT");
    }

    #[test]
    fn validation_rejects_broken_vehicle() {
        let mut bad = request();
        bad.vehicle.battery_capacity_kwh = 0.0;
        assert_eq!(validate(&bad).unwrap_err().code(), "VEHICLE_CONFIG");

        let mut bad = request();
        bad.vehicle.degradation_percent = 100.0;
        assert_eq!(validate(&bad).unwrap_err().code(), "VEHICLE_CONFIG");
    }

    #[test]
    fn infeasible_plan_reports_the_policy_detour_radius() {
        let err = lift(Err(PlanError::Infeasible), 7.5).unwrap_err();
        match err {
            PlanningError::NoCandidates { detour_km } => {
                assert!((detour_km - 7.5).abs() < 1e-9);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn validation_rejects_out_of_range_policy() {
        let mut bad = request();
        bad.policy.min_destination_percent = 120.0;
        assert_eq!(validate(&bad).unwrap_err().code(), "INVALID_INPUT");

        let mut bad = request();
        bad.policy.initial_charge_kwh = Some(0.0);
        assert_eq!(validate(&bad).unwrap_err().code(), "INVALID_INPUT");
    }
}
