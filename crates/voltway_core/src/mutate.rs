//! Splices planned charging stops into the segment list as synthetic
//! charging segments. The result is re-simulated by the caller, so battery
//! fields on the inserted segments are provisional.

use tracing::debug;

use crate::trip::{ChargingStop, ChargingVisit, Segment};

/// Inserts one charging segment per stop, directly after the route segment
/// nearest the station. `cumulative_time_min` stays drive-only; charging
/// time is carried by the visit payload and summed by the finalizer.
pub fn insert_charging_stops(
    segments: &mut Vec<Segment>,
    stops: &[ChargingStop],
    capacity_kwh: f64,
) {
    for stop in stops {
        let Some(anchor) = nearest_route_segment(segments, stop) else {
            continue;
        };

        let neighbor = &segments[anchor];
        let mut charging_segment = Segment::new(0, stop.point, stop.detour_km * 1000.0);
        charging_segment.duration_sec = stop.charge_time_min * 60.0;
        // Copied from the neighbor so cumulative distance stays monotonic.
        charging_segment.cumulative_distance_km = neighbor.cumulative_distance_km;
        charging_segment.cumulative_time_min = neighbor.cumulative_time_min;
        charging_segment.eta = neighbor.eta;
        charging_segment.charging = Some(ChargingVisit {
            station_id: stop.station_id.clone(),
            station_name: stop.station_name.clone(),
            charge_time_min: stop.charge_time_min,
            charge_added_percent: stop.charge_added_kwh / capacity_kwh * 100.0,
            battery_on_arrival_percent: stop.battery_before_kwh / capacity_kwh * 100.0,
            battery_on_departure_percent: stop.battery_after_kwh / capacity_kwh * 100.0,
        });

        debug!(
            station = %stop.station_id,
            after_segment = anchor,
            "splicing charging segment into route"
        );
        segments.insert(anchor + 1, charging_segment);
    }

    for (index, segment) in segments.iter_mut().enumerate() {
        segment.index = index;
    }
}

/// Planned stop positions reference pre-insertion indices, which shift as
/// segments are spliced in, so each stop is re-anchored by proximity over
/// the non-charging segments.
fn nearest_route_segment(segments: &[Segment], stop: &ChargingStop) -> Option<usize> {
    segments
        .iter()
        .enumerate()
        .filter(|(_, segment)| !segment.is_charging_stop())
        .map(|(i, segment)| (i, segment.point.haversine_distance(&stop.point)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}
