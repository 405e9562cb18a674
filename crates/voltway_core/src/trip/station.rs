use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Amenity {
    Food,
    Washroom,
    Medical,
    Hotel,
    Wifi,
    Parking,
    Cafe,
    Restaurant,
    Fuel,
    Atm,
    /// Station advertises free charging; rewarded by the cost strategy.
    Free,
}

/// A charging location eligible for detour consideration. The directory
/// adapter produces the canonical struct; the locator annotates `score`
/// while ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationCandidate {
    pub id: String,
    pub name: String,
    pub point: GeoPoint,
    #[serde(default = "default_power")]
    pub power_kw: f64,
    #[serde(default = "default_chargers")]
    pub number_of_chargers: u32,
    #[serde(default)]
    pub amenities: Vec<Amenity>,
    #[serde(default = "default_operational")]
    pub is_operational: bool,
    #[serde(default)]
    pub score: f64,
}

fn default_power() -> f64 {
    50.0
}

fn default_chargers() -> u32 {
    1
}

fn default_operational() -> bool {
    true
}
