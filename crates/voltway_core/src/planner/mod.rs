//! Charging-stop planning. Two interchangeable strategies sit behind the
//! `ChargingPlanner` trait and share one result contract: an ordered list
//! of provably reachable stops, or a structured failure.

pub mod constrained;
pub mod greedy;

use thiserror::Error;

use crate::error::UnreachableCharging;
use crate::trip::{ChargingStop, CriticalPoint, Segment, StationCandidate};

pub use constrained::ConstrainedPathPlanner;
pub use greedy::GreedyLookaheadPlanner;

/// Minimum battery that must remain on arrival anywhere, charging stations
/// included, as a fraction of usable capacity.
pub const SAFETY_FLOOR_FRACTION: f64 = 0.05;

/// Fast-charging sweet spot; planned charges never target more than this.
pub const TARGET_CHARGE_FRACTION: f64 = 0.8;

/// Detour consumption carries a 20% buffer for the off-route legs.
pub const DETOUR_CONSUMPTION_BUFFER: f64 = 1.2;

#[derive(Debug, Error)]
pub enum PlanError {
    /// The state-space search exhausted every state without reaching the
    /// destination. Recoverable by falling back to another strategy.
    #[error("no feasible path through the charging graph")]
    Infeasible,

    /// No candidate is reachable from the vehicle's current state. Fatal
    /// for the request; carries the diagnostic payload.
    #[error("{0}")]
    Unreachable(Box<UnreachableCharging>),
}

pub type PlanResult = Result<Vec<ChargingStop>, PlanError>;

pub struct PlanContext<'a> {
    pub segments: &'a [Segment],
    pub stations: &'a [StationCandidate],
    pub critical_points: &'a [CriticalPoint],
    pub capacity_kwh: f64,
    pub initial_battery_kwh: f64,
    pub min_destination_kwh: f64,
    pub consumption_kwh_per_km: f64,
}

impl PlanContext<'_> {
    pub fn safety_floor_kwh(&self) -> f64 {
        self.capacity_kwh * SAFETY_FLOOR_FRACTION
    }

    pub fn total_consumption_kwh(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.expected_consumption_kwh)
            .sum()
    }
}

pub trait ChargingPlanner {
    fn name(&self) -> &'static str;

    fn plan(&self, ctx: &PlanContext<'_>) -> PlanResult;
}

/// Nearest segment to `target` at or after `from_index`, with its
/// great-circle distance in km. Returns `None` for an empty tail.
pub(crate) fn nearest_segment_from(
    segments: &[Segment],
    from_index: usize,
    target: crate::geo::GeoPoint,
) -> Option<(usize, f64)> {
    segments
        .iter()
        .skip(from_index)
        .map(|segment| {
            (
                segment.index,
                segment.point.haversine_distance(&target) / 1000.0,
            )
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
