//! Forward battery simulation over the final segment order. Re-run after
//! charging stops are spliced in; the only fields it writes are the
//! per-segment battery levels, so repeated runs are idempotent.

use serde::Serialize;

use crate::trip::{CriticalPoint, CriticalPriority, Segment};

/// Battery percent under which a point is recorded as critical.
const CRITICAL_BATTERY_PERCENT: f64 = 30.0;
const MAX_CRITICAL_POINTS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutcome {
    pub total_consumption_kwh: f64,
    pub usage_percent: f64,
    pub min_battery_percent: f64,
    pub final_battery_kwh: f64,
    pub final_battery_percent: f64,
    pub critical_points: Vec<CriticalPoint>,
    /// Consumption accumulated up to and including each segment.
    pub cumulative_consumption_kwh: Vec<f64>,
}

pub fn simulate_consumption(
    segments: &mut [Segment],
    capacity_kwh: f64,
    initial_battery_kwh: f64,
) -> SimulationOutcome {
    let mut battery_kwh = initial_battery_kwh;
    let mut total_consumption = 0.0;
    let mut min_battery_percent = 100.0;
    let mut critical_points = Vec::new();
    let mut cumulative = Vec::with_capacity(segments.len());

    for segment in segments.iter_mut() {
        if let Some(visit) = &segment.charging {
            let charge_kwh = visit.charge_added_percent / 100.0 * capacity_kwh;
            battery_kwh = (battery_kwh + charge_kwh).min(capacity_kwh);
        } else {
            let consumption = segment.expected_consumption_kwh;
            battery_kwh -= consumption;
            total_consumption += consumption;

            let battery_percent = (battery_kwh / capacity_kwh * 100.0).max(0.0);
            if battery_percent < min_battery_percent {
                min_battery_percent = battery_percent;
            }

            if battery_percent < CRITICAL_BATTERY_PERCENT
                && critical_points.len() < MAX_CRITICAL_POINTS
            {
                critical_points.push(CriticalPoint {
                    segment_index: segment.index,
                    point: segment.point,
                    battery_percent,
                    battery_kwh,
                    distance_from_start_km: segment.cumulative_distance_km,
                    priority: if battery_kwh < 0.0 {
                        CriticalPriority::Critical
                    } else {
                        CriticalPriority::High
                    },
                });
            }
        }

        segment.battery_level_percent = (battery_kwh / capacity_kwh * 100.0).max(0.0);
        segment.battery_level_kwh = battery_kwh;
        cumulative.push(total_consumption);
    }

    SimulationOutcome {
        total_consumption_kwh: total_consumption,
        usage_percent: total_consumption / capacity_kwh * 100.0,
        min_battery_percent,
        final_battery_kwh: battery_kwh,
        final_battery_percent: battery_kwh / capacity_kwh * 100.0,
        critical_points,
        cumulative_consumption_kwh: cumulative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::trip::ChargingVisit;

    fn plain_segment(index: usize, consumption_kwh: f64) -> Segment {
        let mut segment = Segment::new(index, GeoPoint::new(48.0, 2.0), 1_000.0);
        segment.expected_consumption_kwh = consumption_kwh;
        segment.cumulative_distance_km = index as f64;
        segment
    }

    fn charging_segment(index: usize, charge_percent: f64) -> Segment {
        let mut segment = Segment::new(index, GeoPoint::new(48.0, 2.0), 0.0);
        segment.charging = Some(ChargingVisit {
            station_id: "st-1".into(),
            station_name: "Test Station".into(),
            charge_time_min: 30.0,
            charge_added_percent: charge_percent,
            battery_on_arrival_percent: 0.0,
            battery_on_departure_percent: 0.0,
        });
        segment
    }

    #[test]
    fn battery_decreases_and_totals_add_up() {
        let mut segments: Vec<Segment> = (0..10).map(|i| plain_segment(i, 0.5)).collect();
        let outcome = simulate_consumption(&mut segments, 60.0, 60.0);

        assert!((outcome.total_consumption_kwh - 5.0).abs() < 1e-9);
        assert!((outcome.final_battery_kwh - 55.0).abs() < 1e-9);
        assert_eq!(outcome.cumulative_consumption_kwh.len(), 10);
        for segment in &segments {
            assert!(segment.battery_level_kwh <= 60.0);
            assert!(segment.battery_level_kwh >= 0.0);
        }
    }

    #[test]
    fn charging_segment_credits_battery_capped_at_capacity() {
        let mut segments = vec![
            plain_segment(0, 10.0),
            charging_segment(1, 90.0),
            plain_segment(2, 5.0),
        ];
        let outcome = simulate_consumption(&mut segments, 60.0, 30.0);

        // 30 - 10 = 20, +90% of 60 = 54 capped at 60, -5 = 55
        assert!((segments[1].battery_level_kwh - 60.0).abs() < 1e-9);
        assert!((outcome.final_battery_kwh - 55.0).abs() < 1e-9);
        // Charging never counts as consumption.
        assert!((outcome.total_consumption_kwh - 15.0).abs() < 1e-9);
    }

    #[test]
    fn records_bounded_critical_points_below_threshold() {
        // 60 kWh pack starting at 20 kWh (33%); every 2 kWh segment pushes
        // it further under the 30% line.
        let mut segments: Vec<Segment> = (0..12).map(|i| plain_segment(i, 2.0)).collect();
        let outcome = simulate_consumption(&mut segments, 60.0, 20.0);

        assert!(!outcome.critical_points.is_empty());
        assert!(outcome.critical_points.len() <= 5);
        for point in &outcome.critical_points {
            assert!(point.battery_percent < 30.0);
        }
        // The cap stops recording before the projection goes negative, so
        // every recorded point is still High priority.
        assert_eq!(
            outcome.critical_points.last().unwrap().priority,
            CriticalPriority::High
        );
    }

    #[test]
    fn negative_projection_is_flagged_critical() {
        let mut segments: Vec<Segment> = (0..4).map(|i| plain_segment(i, 3.0)).collect();
        let outcome = simulate_consumption(&mut segments, 60.0, 5.0);
        assert!(outcome.final_battery_kwh < 0.0);
        assert!(outcome
            .critical_points
            .iter()
            .any(|p| p.priority == CriticalPriority::Critical));
    }

    #[test]
    fn resimulation_is_idempotent() {
        let mut segments = vec![
            plain_segment(0, 8.0),
            charging_segment(1, 40.0),
            plain_segment(2, 8.0),
        ];
        let first = simulate_consumption(&mut segments, 60.0, 25.0);
        let snapshot: Vec<(f64, f64)> = segments
            .iter()
            .map(|s| (s.battery_level_kwh, s.battery_level_percent))
            .collect();

        let second = simulate_consumption(&mut segments, 60.0, 25.0);
        let after: Vec<(f64, f64)> = segments
            .iter()
            .map(|s| (s.battery_level_kwh, s.battery_level_percent))
            .collect();

        assert_eq!(snapshot, after);
        assert_eq!(first.final_battery_kwh, second.final_battery_kwh);
        assert_eq!(first.total_consumption_kwh, second.total_consumption_kwh);
    }
}
