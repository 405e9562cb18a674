pub mod charging_stop;
pub mod critical_point;
pub mod policy;
pub mod segment;
pub mod station;
pub mod trip_plan;
pub mod vehicle;

pub use charging_stop::ChargingStop;
pub use critical_point::{CriticalPoint, CriticalPriority};
pub use policy::{PlannerKind, RankingStrategy, TripPolicy};
pub use segment::{ChargingVisit, Segment};
pub use station::{Amenity, StationCandidate};
pub use trip_plan::{
    BatteryAnalysis, ChargingUrgency, DestinationRecommendation, NearbyStation, TrafficSummary,
    TripPlan,
};
pub use vehicle::VehicleProfile;
