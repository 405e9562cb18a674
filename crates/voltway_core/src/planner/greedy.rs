//! Look-ahead greedy planner. Walks the route front to back, and every time
//! the remaining charge cannot carry the vehicle to the destination it picks
//! the best-scoring reachable candidate, charges toward the fast-charging
//! target, and resumes from the stop's segment.

use tracing::{debug, warn};

use crate::error::{UnreachableCandidate, UnreachableCharging};
use crate::trip::{ChargingStop, Segment, StationCandidate};

use super::{
    ChargingPlanner, DETOUR_CONSUMPTION_BUFFER, PlanContext, PlanError, PlanResult,
    TARGET_CHARGE_FRACTION, nearest_segment_from,
};

const MAX_STOPS: usize = 3;
const MAX_DETOUR_KM: f64 = 20.0;
const NEAREST_DIAGNOSTICS: usize = 3;

/// Stops whose computed charge falls below this are not worth the visit.
const MIN_CHARGE_KWH: f64 = 1e-6;

pub struct GreedyLookaheadPlanner;

struct Pick {
    station_index: usize,
    segment_index: usize,
    detour_km: f64,
    arrival_kwh: f64,
    score: f64,
}

impl ChargingPlanner for GreedyLookaheadPlanner {
    fn name(&self) -> &'static str {
        "greedy-lookahead"
    }

    fn plan(&self, ctx: &PlanContext<'_>) -> PlanResult {
        let total_distance_km = ctx
            .segments
            .last()
            .map(|s| s.cumulative_distance_km)
            .unwrap_or(0.0);
        let floor_kwh = ctx.safety_floor_kwh();

        let mut stops: Vec<ChargingStop> = Vec::new();
        let mut passed: Vec<String> = Vec::new();
        let mut battery_kwh = ctx.initial_battery_kwh;
        let mut from_index = 0usize;

        for attempt in 0..MAX_STOPS {
            if destination_reachable(ctx, from_index, battery_kwh) {
                break;
            }

            let used: Vec<&str> = stops
                .iter()
                .map(|s| s.station_id.as_str())
                .chain(passed.iter().map(String::as_str))
                .collect();
            let pick = select_stop(
                ctx,
                from_index,
                battery_kwh,
                floor_kwh,
                total_distance_km,
                attempt,
                &used,
            );

            let Some(pick) = pick else {
                if stops.is_empty() {
                    return Err(PlanError::Unreachable(Box::new(unreachable_diagnostics(
                        ctx, from_index, battery_kwh, floor_kwh,
                    ))));
                }
                // Later stops may be unreachable even though earlier ones
                // were planned; report the shortfall instead of failing.
                warn!(
                    planned_stops = stops.len(),
                    battery_kwh = format_args!("{battery_kwh:.1}"),
                    "no further reachable station, returning partial plan"
                );
                break;
            };

            let station = &ctx.stations[pick.station_index];
            let charge = charge_amount(ctx, pick.segment_index, pick.arrival_kwh, pick.detour_km);
            if charge <= MIN_CHARGE_KWH {
                // Arrival is already at or above the fast-charging target, so
                // a visit here would add nothing. Pass the station without
                // detouring and look further along the route.
                debug!(
                    station = %station.id,
                    arrival_kwh = format_args!("{:.1}", pick.arrival_kwh),
                    "arrival above charge target, passing station"
                );
                passed.push(station.id.clone());
                battery_kwh = pick.arrival_kwh + detour_energy_kwh(ctx, pick.detour_km);
                from_index = pick.segment_index + 1;
                continue;
            }
            let charge_time_min = charge / station.power_kw * 60.0;

            debug!(
                station = %station.id,
                segment = pick.segment_index,
                detour_km = format_args!("{:.1}", pick.detour_km),
                charge_kwh = format_args!("{charge:.1}"),
                score = format_args!("{:.0}", pick.score),
                "selected charging stop"
            );

            stops.push(ChargingStop {
                station_id: station.id.clone(),
                station_name: station.name.clone(),
                point: station.point,
                segment_index: pick.segment_index,
                power_kw: station.power_kw,
                charge_added_kwh: charge,
                charge_time_min,
                battery_before_kwh: pick.arrival_kwh,
                battery_after_kwh: pick.arrival_kwh + charge,
                detour_km: pick.detour_km,
            });

            // Resume past the stop, paying for the return leg to the route.
            battery_kwh =
                pick.arrival_kwh + charge - detour_energy_kwh(ctx, pick.detour_km);
            from_index = pick.segment_index + 1;
        }

        Ok(stops)
    }
}

/// True when the battery carries the vehicle from `from_index` to the end
/// without going flat and still meets the destination requirement.
fn destination_reachable(ctx: &PlanContext<'_>, from_index: usize, battery_kwh: f64) -> bool {
    let mut remaining = battery_kwh;
    for segment in &ctx.segments[from_index.min(ctx.segments.len())..] {
        remaining -= segment.expected_consumption_kwh;
        if remaining < 0.0 {
            return false;
        }
    }
    // Charges are sized to land exactly on the requirement, so the
    // comparison needs slack for accumulated rounding.
    remaining >= ctx.min_destination_kwh - 1e-6
}

fn detour_energy_kwh(ctx: &PlanContext<'_>, detour_km: f64) -> f64 {
    detour_km * ctx.consumption_kwh_per_km * DETOUR_CONSUMPTION_BUFFER
}

/// Battery on arrival at the station nearest `segment_index`, starting from
/// `battery_kwh` at `from_index` and paying the outbound detour leg.
fn arrival_kwh(
    ctx: &PlanContext<'_>,
    from_index: usize,
    segment_index: usize,
    battery_kwh: f64,
    detour_km: f64,
) -> f64 {
    let on_route: f64 = ctx.segments[from_index..=segment_index]
        .iter()
        .map(|s| s.expected_consumption_kwh)
        .sum();
    battery_kwh - on_route - detour_energy_kwh(ctx, detour_km)
}

fn select_stop(
    ctx: &PlanContext<'_>,
    from_index: usize,
    battery_kwh: f64,
    floor_kwh: f64,
    total_distance_km: f64,
    attempt: usize,
    used: &[&str],
) -> Option<Pick> {
    // Each successive stop is nudged further along the route so that stops
    // spread out instead of clustering at the first shortfall.
    let ideal_position = (0.4 + 0.2 * attempt as f64).min(0.9);

    let mut best: Option<Pick> = None;
    for (station_index, station) in ctx.stations.iter().enumerate() {
        if used.contains(&station.id.as_str()) {
            continue;
        }
        let Some((segment_index, detour_km)) =
            nearest_segment_from(ctx.segments, from_index, station.point)
        else {
            continue;
        };
        if detour_km > MAX_DETOUR_KM {
            continue;
        }
        let arrival = arrival_kwh(ctx, from_index, segment_index, battery_kwh, detour_km);
        if arrival < floor_kwh {
            continue;
        }

        let score = score_candidate(
            station,
            &ctx.segments[segment_index],
            total_distance_km,
            ideal_position,
            detour_km,
            arrival,
            ctx.capacity_kwh,
        );

        if best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(Pick {
                station_index,
                segment_index,
                detour_km,
                arrival_kwh: arrival,
                score,
            });
        }
    }
    best
}

fn score_candidate(
    station: &StationCandidate,
    segment: &Segment,
    total_distance_km: f64,
    ideal_position: f64,
    detour_km: f64,
    arrival_kwh: f64,
    capacity_kwh: f64,
) -> f64 {
    let position = if total_distance_km > 0.0 {
        segment.cumulative_distance_km / total_distance_km
    } else {
        0.0
    };
    let position_score = 100.0 - (position - ideal_position).abs() * 200.0;
    let detour_score = (100.0 - detour_km * 5.0).max(0.0);
    let power_score = station.power_kw / 50.0 * 30.0;
    let margin_score = (arrival_kwh / capacity_kwh * 100.0).min(50.0);

    position_score + detour_score + power_score + margin_score + station.score
}

/// Charge enough to finish the trip with the destination requirement, but
/// never past the fast-charging target or the pack itself.
fn charge_amount(
    ctx: &PlanContext<'_>,
    segment_index: usize,
    arrival_kwh: f64,
    detour_km: f64,
) -> f64 {
    let remaining: f64 = ctx.segments[segment_index + 1..]
        .iter()
        .map(|s| s.expected_consumption_kwh)
        .sum();
    let needed =
        remaining + detour_energy_kwh(ctx, detour_km) + ctx.min_destination_kwh - arrival_kwh;

    let to_target = (ctx.capacity_kwh * TARGET_CHARGE_FRACTION - arrival_kwh).max(0.0);
    let headroom = ctx.capacity_kwh - arrival_kwh;

    needed.max(0.0).min(to_target.max(0.0)).min(headroom)
}

fn unreachable_diagnostics(
    ctx: &PlanContext<'_>,
    from_index: usize,
    battery_kwh: f64,
    floor_kwh: f64,
) -> UnreachableCharging {
    // Walk forward to where the battery first hits the floor; that is the
    // position the driver would actually strand at.
    let mut remaining = battery_kwh;
    let mut stall_index = from_index.min(ctx.segments.len().saturating_sub(1));
    for segment in &ctx.segments[from_index.min(ctx.segments.len())..] {
        if remaining - segment.expected_consumption_kwh < floor_kwh {
            stall_index = segment.index;
            break;
        }
        remaining -= segment.expected_consumption_kwh;
        stall_index = segment.index;
    }
    let position = ctx
        .segments
        .get(stall_index)
        .map(|s| s.point)
        .unwrap_or_default();

    let mut nearest: Vec<UnreachableCandidate> = ctx
        .stations
        .iter()
        .map(|station| {
            let distance_km = station.point.haversine_distance(&position) / 1000.0;
            UnreachableCandidate {
                station_id: station.id.clone(),
                name: station.name.clone(),
                distance_km,
                required_kwh: distance_km
                    * ctx.consumption_kwh_per_km
                    * DETOUR_CONSUMPTION_BUFFER,
            }
        })
        .collect();
    nearest.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearest.truncate(NEAREST_DIAGNOSTICS);

    UnreachableCharging {
        battery_kwh: remaining,
        battery_percent: remaining / ctx.capacity_kwh * 100.0,
        position,
        segment_index: stall_index,
        nearest_candidates: nearest,
        recommendation: "charge before departure or start from a higher state of charge".into(),
    }
}
