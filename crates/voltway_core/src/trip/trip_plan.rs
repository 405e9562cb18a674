use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

use super::charging_stop::ChargingStop;
use super::critical_point::CriticalPoint;
use super::segment::Segment;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargingUrgency {
    None,
    Moderate,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyStation {
    pub station_id: String,
    pub name: String,
    pub point: GeoPoint,
    pub distance_km: f64,
    pub power_kw: f64,
    pub estimated_time_min: f64,
}

/// How the trip ends relative to the requested minimum battery at the
/// destination. A shortfall is not a planning failure; it is reported as a
/// recommendation on an otherwise successful plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DestinationRecommendation {
    Charge {
        shortfall_kwh: f64,
        shortfall_percent: f64,
        charge_to_percent: f64,
        estimated_time_min: f64,
        nearby_stations: Vec<NearbyStation>,
        reason: String,
    },
    Surplus {
        surplus_kwh: f64,
        surplus_percent: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryAnalysis {
    pub initial_kwh: f64,
    pub initial_percent: f64,
    pub final_kwh: f64,
    pub final_percent: f64,
    pub min_percent: f64,
    pub critical_points: Vec<CriticalPoint>,
    pub total_consumed_kwh: f64,
    pub total_charged_kwh: f64,
    pub required_at_destination_kwh: f64,
    pub required_at_destination_percent: f64,
    pub meets_destination_requirement: bool,
    pub recommendation: DestinationRecommendation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficSummary {
    pub total_delay_min: f64,
    pub average_speed_kmh: f64,
    pub severe_segments: usize,
    pub heavy_segments: usize,
    pub moderate_segments: usize,
    pub light_segments: usize,
    pub free_segments: usize,
}

/// The complete result of one planning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub distance_km: f64,
    pub total_time_min: f64,
    pub charging_time_min: f64,
    pub traffic_delay_min: f64,
    pub eta: Timestamp,
    pub charging_required: bool,
    pub charging_urgency: ChargingUrgency,
    pub segments: Vec<Segment>,
    pub charging_stops: Vec<ChargingStop>,
    pub battery: BatteryAnalysis,
    pub traffic: TrafficSummary,
    pub warnings: Vec<String>,
    pub planner: String,
    pub computed_at: Timestamp,
}
