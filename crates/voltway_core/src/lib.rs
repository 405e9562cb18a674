//! Energy-constrained trip planning for electric vehicles.

pub mod analyze;
pub mod conditions;
pub mod enrich;
pub mod error;
pub mod finalize;
pub mod geo;
pub mod locate;
pub mod mutate;
pub mod pipeline;
pub mod planner;
pub mod providers;
pub mod segmenter;
pub mod simulate;
pub mod trip;

pub use error::PlanningError;
pub use pipeline::{TripPlanner, TripRequest};
pub use trip::TripPlan;
