use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::station::Amenity;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingStrategy {
    Time,
    Cost,
    #[default]
    Hybrid,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannerKind {
    Constrained,
    #[default]
    Greedy,
}

/// Caller-supplied planning policy. Serde defaults mirror the request
/// defaults of the public planning API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPolicy {
    #[serde(default = "default_segment_length")]
    pub segment_length_m: f64,
    #[serde(default = "default_max_detour")]
    pub max_detour_km: f64,
    #[serde(default)]
    pub amenity_filter: Vec<Amenity>,
    #[serde(default)]
    pub strategy: RankingStrategy,
    #[serde(default)]
    pub planner: PlannerKind,
    #[serde(default = "default_min_destination")]
    pub min_destination_percent: f64,
    #[serde(default = "default_initial_charge")]
    pub initial_charge_percent: f64,
    /// Overrides `initial_charge_percent` when set.
    #[serde(default)]
    pub initial_charge_kwh: Option<f64>,
    /// Trip start time; `None` means now.
    #[serde(default)]
    pub departure: Option<Timestamp>,
}

fn default_segment_length() -> f64 {
    200.0
}

fn default_max_detour() -> f64 {
    5.0
}

fn default_min_destination() -> f64 {
    20.0
}

fn default_initial_charge() -> f64 {
    100.0
}

impl Default for TripPolicy {
    fn default() -> Self {
        TripPolicy {
            segment_length_m: default_segment_length(),
            max_detour_km: default_max_detour(),
            amenity_filter: Vec::new(),
            strategy: RankingStrategy::default(),
            planner: PlannerKind::default(),
            min_destination_percent: default_min_destination(),
            initial_charge_percent: default_initial_charge(),
            initial_charge_kwh: None,
            departure: None,
        }
    }
}

impl TripPolicy {
    pub fn initial_battery_kwh(&self, usable_capacity_kwh: f64) -> f64 {
        self.initial_charge_kwh
            .unwrap_or(usable_capacity_kwh * self.initial_charge_percent / 100.0)
    }
}
