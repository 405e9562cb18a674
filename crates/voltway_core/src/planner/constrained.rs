//! Optimal charging-stop search. Models the trip as a forward DAG over the
//! departure point, every candidate station projected onto the route, and
//! the destination, then runs Dijkstra over `(node, battery)` states with
//! the battery quantized to 0.1 kWh. Cost is total time including charging,
//! so the cheapest settled destination state is the fastest feasible plan.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use fxhash::FxHashMap;
use tracing::debug;

use crate::trip::ChargingStop;

use super::{
    ChargingPlanner, DETOUR_CONSUMPTION_BUFFER, PlanContext, PlanError, PlanResult,
    nearest_segment_from,
};

/// Charging at a station always adds this much beyond the bare edge need,
/// so quantization error can never starve the next leg.
const CHARGE_BUFFER_KWH: f64 = 5.0;

const MAX_DETOUR_KM: f64 = 20.0;

/// Off-route legs are assumed driven at roughly 60 km/h, so a detour
/// kilometre costs about a minute.
const DETOUR_MIN_PER_KM: f64 = 1.0;

pub struct ConstrainedPathPlanner;

#[derive(Clone, Copy, PartialEq)]
enum NodeKind {
    Start,
    Station(usize),
    End,
}

struct Node {
    kind: NodeKind,
    /// Offset into the consumption prefix sums; 0 is before the first
    /// segment, `segments.len()` is the destination.
    pos: usize,
    detour_km: f64,
}

/// `(node index, battery quantized to 0.1 kWh)`.
type StateKey = (usize, i64);

struct HeapState {
    time_min: f64,
    node: usize,
    battery_kwh: f64,
}

impl PartialEq for HeapState {
    fn eq(&self, other: &Self) -> bool {
        self.time_min == other.time_min
    }
}
impl Eq for HeapState {}
impl PartialOrd for HeapState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on time.
        other.time_min.total_cmp(&self.time_min)
    }
}

struct PrevEntry {
    prev: StateKey,
    charge_kwh: f64,
    battery_before_kwh: f64,
}

fn quantize(battery_kwh: f64) -> i64 {
    (battery_kwh * 10.0).round() as i64
}

impl ChargingPlanner for ConstrainedPathPlanner {
    fn name(&self) -> &'static str {
        "constrained-path"
    }

    fn plan(&self, ctx: &PlanContext<'_>) -> PlanResult {
        let n = ctx.segments.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        // Prefix sums over on-route consumption and drive time.
        let mut prefix_kwh = vec![0.0; n + 1];
        let mut prefix_min = vec![0.0; n + 1];
        for (i, segment) in ctx.segments.iter().enumerate() {
            prefix_kwh[i + 1] = prefix_kwh[i] + segment.expected_consumption_kwh;
            prefix_min[i + 1] = prefix_min[i] + segment.duration_sec / 60.0;
        }

        let mut nodes = vec![Node {
            kind: NodeKind::Start,
            pos: 0,
            detour_km: 0.0,
        }];
        for (station_index, station) in ctx.stations.iter().enumerate() {
            let Some((segment_index, detour_km)) =
                nearest_segment_from(ctx.segments, 0, station.point)
            else {
                continue;
            };
            if detour_km > MAX_DETOUR_KM {
                continue;
            }
            nodes.push(Node {
                kind: NodeKind::Station(station_index),
                pos: segment_index + 1,
                detour_km,
            });
        }
        nodes.push(Node {
            kind: NodeKind::End,
            pos: n,
            detour_km: 0.0,
        });
        nodes.sort_by(|a, b| a.pos.cmp(&b.pos).then(node_order(a).cmp(&node_order(b))));
        let end = nodes.len() - 1;

        let floor_kwh = ctx.safety_floor_kwh();
        let mut best_time: FxHashMap<StateKey, f64> = FxHashMap::default();
        let mut prev: FxHashMap<StateKey, PrevEntry> = FxHashMap::default();
        let mut heap = BinaryHeap::new();

        let start_index = nodes.iter().position(|node| node.kind == NodeKind::Start);
        let Some(start_index) = start_index else {
            return Err(PlanError::Infeasible);
        };
        best_time.insert((start_index, quantize(ctx.initial_battery_kwh)), 0.0);
        heap.push(HeapState {
            time_min: 0.0,
            node: start_index,
            battery_kwh: ctx.initial_battery_kwh,
        });

        let mut settled_end: Option<StateKey> = None;
        while let Some(state) = heap.pop() {
            let key = (state.node, quantize(state.battery_kwh));
            if best_time
                .get(&key)
                .is_some_and(|&t| state.time_min > t + 1e-9)
            {
                continue;
            }
            if state.node == end {
                settled_end = Some(key);
                break;
            }
            let from = &nodes[state.node];

            for (to_index, to) in nodes.iter().enumerate().skip(state.node + 1) {
                if to.pos < from.pos {
                    continue;
                }
                let on_route_kwh = prefix_kwh[to.pos] - prefix_kwh[from.pos];
                let detour_km = from.detour_km + to.detour_km;
                let energy_kwh =
                    on_route_kwh + detour_km * ctx.consumption_kwh_per_km * DETOUR_CONSUMPTION_BUFFER;
                let drive_min =
                    prefix_min[to.pos] - prefix_min[from.pos] + detour_km * DETOUR_MIN_PER_KM;
                let arrival_req = match to.kind {
                    NodeKind::End => ctx.min_destination_kwh,
                    _ => floor_kwh,
                };

                let (charge_kwh, charge_min) = match from.kind {
                    NodeKind::Station(station_index) => {
                        let need =
                            energy_kwh + arrival_req + CHARGE_BUFFER_KWH - state.battery_kwh;
                        let charge = need
                            .max(0.0)
                            .min(ctx.capacity_kwh - state.battery_kwh)
                            .max(0.0);
                        let power_kw = ctx.stations[station_index].power_kw;
                        (charge, charge / power_kw * 60.0)
                    }
                    _ => (0.0, 0.0),
                };

                let arrival_kwh = state.battery_kwh + charge_kwh - energy_kwh;
                if arrival_kwh < arrival_req - 1e-9 {
                    continue;
                }

                let next_key = (to_index, quantize(arrival_kwh));
                let next_time = state.time_min + drive_min + charge_min;
                if best_time
                    .get(&next_key)
                    .is_none_or(|&t| next_time < t - 1e-9)
                {
                    best_time.insert(next_key, next_time);
                    prev.insert(
                        next_key,
                        PrevEntry {
                            prev: key,
                            charge_kwh,
                            battery_before_kwh: state.battery_kwh,
                        },
                    );
                    heap.push(HeapState {
                        time_min: next_time,
                        node: to_index,
                        battery_kwh: arrival_kwh,
                    });
                }
            }
        }

        let Some(mut cursor) = settled_end else {
            debug!(
                stations = ctx.stations.len(),
                "state space exhausted without reaching the destination"
            );
            return Err(PlanError::Infeasible);
        };

        let mut stops: Vec<ChargingStop> = Vec::new();
        while let Some(entry) = prev.get(&cursor) {
            let (from_node, _) = entry.prev;
            if let NodeKind::Station(station_index) = nodes[from_node].kind
                && entry.charge_kwh > 0.0
            {
                let station = &ctx.stations[station_index];
                stops.push(ChargingStop {
                    station_id: station.id.clone(),
                    station_name: station.name.clone(),
                    point: station.point,
                    segment_index: nodes[from_node].pos.saturating_sub(1),
                    power_kw: station.power_kw,
                    charge_added_kwh: entry.charge_kwh,
                    charge_time_min: entry.charge_kwh / station.power_kw * 60.0,
                    battery_before_kwh: entry.battery_before_kwh,
                    battery_after_kwh: entry.battery_before_kwh + entry.charge_kwh,
                    detour_km: nodes[from_node].detour_km,
                });
            }
            cursor = entry.prev;
        }
        stops.reverse();
        Ok(stops)
    }
}

fn node_order(node: &Node) -> u8 {
    match node.kind {
        NodeKind::Start => 0,
        NodeKind::Station(_) => 1,
        NodeKind::End => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::test_fixtures::{route, station_on_route};
    use crate::trip::{Segment, StationCandidate};

    fn ctx<'a>(
        segments: &'a [Segment],
        stations: &'a [StationCandidate],
        capacity_kwh: f64,
        initial_battery_kwh: f64,
        min_destination_kwh: f64,
    ) -> PlanContext<'a> {
        PlanContext {
            segments,
            stations,
            critical_points: &[],
            capacity_kwh,
            initial_battery_kwh,
            min_destination_kwh,
            consumption_kwh_per_km: 0.2,
        }
    }

    #[test]
    fn direct_path_wins_when_feasible() {
        let segments = route(10, 5.0, 0.75);
        let stations = vec![station_on_route("a", &segments, 5)];
        let context = ctx(&segments, &stations, 60.0, 60.0, 12.0);

        let stops = ConstrainedPathPlanner.plan(&context).unwrap();
        assert!(stops.is_empty());
    }

    #[test]
    fn single_charge_covers_the_deficit() {
        // 400 km at 2 kWh per 10 km segment: 80 kWh total against 30 initial.
        let segments = route(40, 10.0, 2.0);
        let stations = vec![station_on_route("mid", &segments, 12)];
        let context = ctx(&segments, &stations, 75.0, 30.0, 10.0);

        let stops = ConstrainedPathPlanner.plan(&context).unwrap();
        assert_eq!(stops.len(), 1);
        let stop = &stops[0];
        assert_eq!(stop.station_id, "mid");
        assert_eq!(stop.segment_index, 12);
        // Arrives with 4 kWh, must leave with 54 (remaining) + 10 (arrival
        // requirement) + 5 (buffer): a 65 kWh charge.
        assert!((stop.battery_before_kwh - 4.0).abs() < 0.2);
        assert!((stop.charge_added_kwh - 65.0).abs() < 0.2);
        assert!(stop.battery_after_kwh <= context.capacity_kwh + 1e-9);
    }

    #[test]
    fn prefers_the_faster_charger() {
        let segments = route(40, 10.0, 2.0);
        let mut slow = station_on_route("slow", &segments, 12);
        slow.power_kw = 50.0;
        let fast = station_on_route("fast", &segments, 11);
        let stations = [slow, fast];
        let context = ctx(&segments, &stations, 75.0, 30.0, 10.0);

        let stops = ConstrainedPathPlanner.plan(&context).unwrap();
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].station_id, "fast");
    }

    #[test]
    fn unreachable_station_means_infeasible() {
        // 5 kWh covers 25 km; the only station sits at 80 km.
        let segments = route(10, 5.0, 1.0);
        let stations = vec![station_on_route("far", &segments, 7)];
        let context = ctx(&segments, &stations, 60.0, 5.0, 10.0);

        let err = ConstrainedPathPlanner.plan(&context).unwrap_err();
        assert!(matches!(err, PlanError::Infeasible));
    }

    #[test]
    fn charge_never_exceeds_pack_capacity() {
        // Deficit so large one station cannot cover it within the pack.
        let segments = route(60, 10.0, 2.0);
        let stations = vec![
            station_on_route("a", &segments, 10),
            station_on_route("b", &segments, 35),
        ];
        let context = ctx(&segments, &stations, 60.0, 30.0, 5.0);

        let stops = ConstrainedPathPlanner.plan(&context).unwrap();
        assert!(stops.len() >= 2);
        for stop in &stops {
            assert!(stop.battery_after_kwh <= 60.0 + 1e-9);
        }
    }
}
