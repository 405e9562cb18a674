//! Decides whether charging is required for the trip and how urgently.

use serde::Serialize;
use tracing::info;

use crate::trip::ChargingUrgency;

#[derive(Debug, Clone, Serialize)]
pub struct ChargingAnalysis {
    pub charging_required: bool,
    pub urgency: ChargingUrgency,
    pub deficit_kwh: f64,
    pub required_kwh: f64,
    pub estimated_stops: u32,
}

/// Required energy is the larger of "trip plus safety buffer" and "trip plus
/// destination requirement"; charging is required when the initial charge
/// falls short of it.
pub fn analyze_charging_needs(
    total_consumption_kwh: f64,
    initial_battery_kwh: f64,
    safety_buffer_kwh: f64,
    min_destination_kwh: f64,
) -> ChargingAnalysis {
    let required_kwh = (total_consumption_kwh + safety_buffer_kwh)
        .max(total_consumption_kwh + min_destination_kwh);
    let net_kwh = initial_battery_kwh - required_kwh;
    let charging_required = net_kwh < 0.0;

    let urgency = if !charging_required {
        ChargingUrgency::None
    } else if net_kwh < -initial_battery_kwh * 0.5 {
        ChargingUrgency::Critical
    } else if net_kwh < -initial_battery_kwh * 0.25 {
        ChargingUrgency::High
    } else {
        ChargingUrgency::Moderate
    };

    let deficit_kwh = (-net_kwh).max(0.0);
    let estimated_stops = if charging_required {
        (deficit_kwh / (initial_battery_kwh * 0.7)).ceil() as u32
    } else {
        0
    };

    info!(
        consumption_kwh = format_args!("{total_consumption_kwh:.1}"),
        required_kwh = format_args!("{required_kwh:.1}"),
        initial_kwh = format_args!("{initial_battery_kwh:.1}"),
        deficit_kwh = format_args!("{deficit_kwh:.1}"),
        charging_required,
        ?urgency,
        "charging analysis"
    );

    ChargingAnalysis {
        charging_required,
        urgency,
        deficit_kwh,
        required_kwh,
        estimated_stops,
    }
}
