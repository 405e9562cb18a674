use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriticalPriority {
    High,
    Critical,
}

/// A route location where the projected battery crosses the low-charge
/// threshold. Weighted during station ranking; `Critical` means the battery
/// is projected to run out before this point.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CriticalPoint {
    pub segment_index: usize,
    pub point: GeoPoint,
    pub battery_percent: f64,
    pub battery_kwh: f64,
    pub distance_from_start_km: f64,
    pub priority: CriticalPriority,
}
