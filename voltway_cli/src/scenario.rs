//! Scenario file loading. A scenario bundles everything one planning
//! request needs: endpoints, vehicle, policy, and the station inventory.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use voltway_core::geo::GeoPoint;
use voltway_core::pipeline::TripRequest;
use voltway_core::trip::{StationCandidate, TripPolicy, VehicleProfile};

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub vehicle: VehicleProfile,
    #[serde(default)]
    pub policy: TripPolicy,
    #[serde(default)]
    pub stations: Vec<StationCandidate>,
}

impl Scenario {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let scenario: Scenario = serde_json::from_str(&raw)
            .with_context(|| format!("parsing scenario {}", path.display()))?;
        Ok(scenario)
    }

    pub fn request(&self) -> TripRequest {
        TripRequest {
            origin: self.origin,
            destination: self.destination,
            vehicle: self.vehicle.clone(),
            policy: self.policy.clone(),
        }
    }
}
