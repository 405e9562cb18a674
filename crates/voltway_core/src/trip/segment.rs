use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::conditions::{Traffic, Weather};
use crate::geo::GeoPoint;

/// Payload attached to a synthetic charging segment spliced into the route.
/// Battery percentages here are the mutator's provisional estimates; the
/// post-insertion simulation pass overwrites the segment's battery fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargingVisit {
    pub station_id: String,
    pub station_name: String,
    pub charge_time_min: f64,
    pub charge_added_percent: f64,
    pub battery_on_arrival_percent: f64,
    pub battery_on_departure_percent: f64,
}

/// One adaptive-length slice of the route. Created by the segmenter and
/// mutated in place by the enricher, the consumption simulator, and the
/// route mutator; never persisted beyond a single planning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    pub point: GeoPoint,
    pub distance_m: f64,
    pub duration_sec: f64,
    pub expected_consumption_kwh: f64,
    pub cumulative_distance_km: f64,
    pub cumulative_time_min: f64,
    pub eta: Option<Timestamp>,
    pub battery_level_percent: f64,
    pub battery_level_kwh: f64,
    pub weather: Option<Weather>,
    pub weather_penalty: f64,
    pub traffic: Option<Traffic>,
    pub traffic_delay_min: f64,
    pub charging: Option<ChargingVisit>,
}

impl Segment {
    pub fn new(index: usize, point: GeoPoint, distance_m: f64) -> Self {
        Segment {
            index,
            point,
            distance_m,
            duration_sec: 0.0,
            expected_consumption_kwh: 0.0,
            cumulative_distance_km: 0.0,
            cumulative_time_min: 0.0,
            eta: None,
            battery_level_percent: 0.0,
            battery_level_kwh: 0.0,
            weather: None,
            weather_penalty: 0.0,
            traffic: None,
            traffic_delay_min: 0.0,
            charging: None,
        }
    }

    pub fn is_charging_stop(&self) -> bool {
        self.charging.is_some()
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }
}
