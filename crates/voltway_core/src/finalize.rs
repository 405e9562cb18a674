//! Assembles the finished `TripPlan` from the simulated route: totals, ETA,
//! battery analysis with a destination recommendation, traffic summary, and
//! user-facing warnings.

use jiff::{SignedDuration, Timestamp};
use tracing::info;

use crate::conditions::TrafficLevel;
use crate::providers::StationDirectory;
use crate::simulate::SimulationOutcome;
use crate::trip::{
    BatteryAnalysis, ChargingStop, ChargingUrgency, DestinationRecommendation, NearbyStation,
    Segment, TrafficSummary, TripPlan,
};

/// Search radius for "charge near your destination" suggestions.
const DESTINATION_SEARCH_RADIUS_M: f64 = 25_000.0;
const DESTINATION_SUGGESTIONS: usize = 3;

/// Assumed charger power when estimating the overall top-up time.
const REFERENCE_CHARGER_KW: f64 = 50.0;

pub struct FinalizeInputs<'a> {
    pub segments: Vec<Segment>,
    pub charging_stops: Vec<ChargingStop>,
    pub outcome: &'a SimulationOutcome,
    pub charging_required: bool,
    pub urgency: ChargingUrgency,
    pub capacity_kwh: f64,
    pub initial_battery_kwh: f64,
    pub min_destination_kwh: f64,
    pub departure: Timestamp,
    pub planner: &'a str,
}

pub fn finalize_trip<S: StationDirectory>(directory: &S, inputs: FinalizeInputs<'_>) -> TripPlan {
    let FinalizeInputs {
        segments,
        charging_stops,
        outcome,
        charging_required,
        urgency,
        capacity_kwh,
        initial_battery_kwh,
        min_destination_kwh,
        departure,
        planner,
    } = inputs;

    let distance_km = segments
        .last()
        .map(|s| s.cumulative_distance_km)
        .unwrap_or(0.0);
    let drive_min = segments
        .last()
        .map(|s| s.cumulative_time_min)
        .unwrap_or(0.0);
    let charging_time_min: f64 = charging_stops.iter().map(|s| s.charge_time_min).sum();
    let total_time_min = drive_min + charging_time_min;
    let traffic_delay_min: f64 = segments.iter().map(|s| s.traffic_delay_min).sum();

    let eta = departure
        .checked_add(SignedDuration::from_millis(
            (total_time_min * 60_000.0) as i64,
        ))
        .unwrap_or(departure);

    let battery = battery_analysis(
        directory,
        &segments,
        &charging_stops,
        outcome,
        capacity_kwh,
        initial_battery_kwh,
        min_destination_kwh,
    );
    let traffic = traffic_summary(&segments, distance_km, drive_min, traffic_delay_min);
    let warnings = collect_warnings(&battery, outcome, charging_required, &charging_stops);

    info!(
        distance_km = format_args!("{distance_km:.1}"),
        total_time_min = format_args!("{total_time_min:.0}"),
        charging_stops = charging_stops.len(),
        final_battery_percent = format_args!("{:.1}", outcome.final_battery_percent),
        planner,
        "trip plan finalized"
    );

    TripPlan {
        distance_km,
        total_time_min,
        charging_time_min,
        traffic_delay_min,
        eta,
        charging_required,
        charging_urgency: urgency,
        segments,
        charging_stops,
        battery,
        traffic,
        warnings,
        planner: planner.to_string(),
        computed_at: Timestamp::now(),
    }
}

fn battery_analysis<S: StationDirectory>(
    directory: &S,
    segments: &[Segment],
    charging_stops: &[ChargingStop],
    outcome: &SimulationOutcome,
    capacity_kwh: f64,
    initial_battery_kwh: f64,
    min_destination_kwh: f64,
) -> BatteryAnalysis {
    let final_kwh = outcome.final_battery_kwh;
    let shortfall_kwh = min_destination_kwh - final_kwh;
    let meets_requirement = shortfall_kwh <= 1e-6;

    let recommendation = if meets_requirement {
        DestinationRecommendation::Surplus {
            surplus_kwh: -shortfall_kwh,
            surplus_percent: -shortfall_kwh / capacity_kwh * 100.0,
        }
    } else {
        let destination = segments.last().map(|s| s.point).unwrap_or_default();
        let nearby_stations = directory
            .find_near(
                destination,
                DESTINATION_SEARCH_RADIUS_M,
                None,
                DESTINATION_SUGGESTIONS,
            )
            .into_iter()
            .map(|station| NearbyStation {
                distance_km: station.point.haversine_distance(&destination) / 1000.0,
                estimated_time_min: shortfall_kwh / station.power_kw * 60.0,
                station_id: station.id,
                name: station.name,
                point: station.point,
                power_kw: station.power_kw,
            })
            .collect();
        DestinationRecommendation::Charge {
            shortfall_kwh,
            shortfall_percent: shortfall_kwh / capacity_kwh * 100.0,
            charge_to_percent: min_destination_kwh / capacity_kwh * 100.0,
            estimated_time_min: shortfall_kwh / REFERENCE_CHARGER_KW * 60.0,
            nearby_stations,
            reason: format!(
                "arrival charge {:.1}% is below the requested {:.1}% minimum",
                final_kwh / capacity_kwh * 100.0,
                min_destination_kwh / capacity_kwh * 100.0
            ),
        }
    };

    BatteryAnalysis {
        initial_kwh: initial_battery_kwh,
        initial_percent: initial_battery_kwh / capacity_kwh * 100.0,
        final_kwh,
        final_percent: outcome.final_battery_percent,
        min_percent: outcome.min_battery_percent,
        critical_points: outcome.critical_points.clone(),
        total_consumed_kwh: outcome.total_consumption_kwh,
        total_charged_kwh: charging_stops.iter().map(|s| s.charge_added_kwh).sum(),
        required_at_destination_kwh: min_destination_kwh,
        required_at_destination_percent: min_destination_kwh / capacity_kwh * 100.0,
        meets_destination_requirement: meets_requirement,
        recommendation,
    }
}

fn traffic_summary(
    segments: &[Segment],
    distance_km: f64,
    drive_min: f64,
    total_delay_min: f64,
) -> TrafficSummary {
    let mut summary = TrafficSummary {
        total_delay_min,
        ..TrafficSummary::default()
    };
    for segment in segments {
        let Some(traffic) = &segment.traffic else {
            continue;
        };
        match traffic.level {
            TrafficLevel::Severe => summary.severe_segments += 1,
            TrafficLevel::Heavy => summary.heavy_segments += 1,
            TrafficLevel::Moderate => summary.moderate_segments += 1,
            TrafficLevel::Light => summary.light_segments += 1,
            TrafficLevel::Free => summary.free_segments += 1,
        }
    }
    if drive_min > 0.0 {
        summary.average_speed_kmh = distance_km / (drive_min / 60.0);
    }
    summary
}

fn collect_warnings(
    battery: &BatteryAnalysis,
    outcome: &SimulationOutcome,
    charging_required: bool,
    charging_stops: &[ChargingStop],
) -> Vec<String> {
    let mut warnings = Vec::new();
    if !battery.meets_destination_requirement {
        if let DestinationRecommendation::Charge { shortfall_kwh, .. } = &battery.recommendation {
            warnings.push(format!(
                "arriving {shortfall_kwh:.1} kWh below the destination requirement; plan a top-up near the destination"
            ));
        }
    }
    if outcome.min_battery_percent < 10.0 {
        warnings.push(format!(
            "battery projected to drop to {:.1}% en route",
            outcome.min_battery_percent
        ));
    }
    if charging_required && charging_stops.is_empty() {
        warnings.push("charging is required but no stop could be planned".into());
    }
    warnings
}
