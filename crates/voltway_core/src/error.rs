use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::GeoPoint;

/// A candidate that could not be reached with the battery available at the
/// point of failure; part of the `UnreachableCharging` diagnostic payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnreachableCandidate {
    pub station_id: String,
    pub name: String,
    pub distance_km: f64,
    pub required_kwh: f64,
}

/// Structured diagnostics for a fatal planning infeasibility: the vehicle
/// cannot reach any candidate station from its simulated position without
/// dropping below the safety floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnreachableCharging {
    pub battery_kwh: f64,
    pub battery_percent: f64,
    pub position: GeoPoint,
    pub segment_index: usize,
    pub nearest_candidates: Vec<UnreachableCandidate>,
    pub recommendation: String,
}

impl std::fmt::Display for UnreachableCharging {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no reachable charging station with {:.1} kWh ({:.1}%) remaining at segment {}: {}",
            self.battery_kwh, self.battery_percent, self.segment_index, self.recommendation
        )
    }
}

#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid vehicle configuration: {0}")]
    VehicleConfig(String),

    #[error("route provider failed: {0}")]
    RouteProvider(#[source] anyhow::Error),

    #[error("no charging stations found within {detour_km} km detour radius")]
    NoCandidates { detour_km: f64 },

    #[error("{0}")]
    UnreachableCharging(UnreachableCharging),
}

impl PlanningError {
    /// Stable machine-readable code for the caller-facing payload.
    pub fn code(&self) -> &'static str {
        match self {
            PlanningError::InvalidInput(_) => "INVALID_INPUT",
            PlanningError::VehicleConfig(_) => "VEHICLE_CONFIG",
            PlanningError::RouteProvider(_) => "ROUTE_PROVIDER",
            PlanningError::NoCandidates { .. } => "NO_CANDIDATES",
            PlanningError::UnreachableCharging(_) => "UNREACHABLE_CHARGING",
        }
    }
}
