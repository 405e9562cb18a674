//! Offline provider implementations for the planning engine: a synthetic
//! road network, deterministic condition prediction, and an in-memory
//! spatial station directory.

pub mod conditions;
pub mod route;
pub mod stations;

pub use conditions::PredictedConditions;
pub use route::GreatCircleRouteProvider;
pub use stations::InMemoryStationDirectory;
