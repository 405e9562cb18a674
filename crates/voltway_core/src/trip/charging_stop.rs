use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A planned, ordered visit to a candidate station. Produced by a
/// `ChargingPlanner`; consumed by the route mutator, which splices a
/// charging segment into the route at `segment_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargingStop {
    pub station_id: String,
    pub station_name: String,
    pub point: GeoPoint,
    pub segment_index: usize,
    pub power_kw: f64,
    pub charge_added_kwh: f64,
    pub charge_time_min: f64,
    pub battery_before_kwh: f64,
    pub battery_after_kwh: f64,
    pub detour_km: f64,
}
