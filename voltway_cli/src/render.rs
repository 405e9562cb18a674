//! Table rendering for plan results.

use comfy_table::{Cell, Table, presets::UTF8_FULL};

use voltway_core::TripPlan;
use voltway_core::trip::DestinationRecommendation;

pub fn summary_table(plan: &TripPlan) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("Distance"),
        Cell::new(format!("{:.1} km", plan.distance_km)),
    ]);
    table.add_row(vec![
        Cell::new("Total time"),
        Cell::new(format!("{:.0} min", plan.total_time_min)),
    ]);
    table.add_row(vec![
        Cell::new("Charging time"),
        Cell::new(format!("{:.0} min", plan.charging_time_min)),
    ]);
    table.add_row(vec![
        Cell::new("Traffic delay"),
        Cell::new(format!("{:.0} min", plan.traffic_delay_min)),
    ]);
    table.add_row(vec![Cell::new("ETA"), Cell::new(plan.eta.to_string())]);
    table.add_row(vec![
        Cell::new("Final battery"),
        Cell::new(format!(
            "{:.1} kWh ({:.0}%)",
            plan.battery.final_kwh, plan.battery.final_percent
        )),
    ]);
    table.add_row(vec![Cell::new("Planner"), Cell::new(&plan.planner)]);
    table
}

pub fn stops_table(plan: &TripPlan) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Station", "Segment", "Detour", "Charge", "Time", "Battery",
    ]);
    for stop in &plan.charging_stops {
        table.add_row(vec![
            Cell::new(&stop.station_name),
            Cell::new(stop.segment_index),
            Cell::new(format!("{:.1} km", stop.detour_km)),
            Cell::new(format!("{:.1} kWh", stop.charge_added_kwh)),
            Cell::new(format!("{:.0} min", stop.charge_time_min)),
            Cell::new(format!(
                "{:.1} -> {:.1} kWh",
                stop.battery_before_kwh, stop.battery_after_kwh
            )),
        ]);
    }
    table
}

pub fn recommendation_line(plan: &TripPlan) -> String {
    match &plan.battery.recommendation {
        DestinationRecommendation::Surplus {
            surplus_kwh,
            surplus_percent,
        } => format!(
            "Arrives with {surplus_kwh:.1} kWh ({surplus_percent:.0}%) above the requested minimum."
        ),
        DestinationRecommendation::Charge {
            shortfall_kwh,
            estimated_time_min,
            nearby_stations,
            reason,
            ..
        } => {
            let mut line = format!(
                "Short {shortfall_kwh:.1} kWh at the destination ({reason}); about {estimated_time_min:.0} min of charging needed."
            );
            if let Some(nearest) = nearby_stations.first() {
                line.push_str(&format!(
                    " Nearest option: {} ({:.1} km away).",
                    nearest.name, nearest.distance_km
                ));
            }
            line
        }
    }
}
