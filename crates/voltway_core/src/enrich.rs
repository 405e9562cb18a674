//! Folds time-indexed weather and traffic into the segment sequence.
//!
//! Segments are processed in fixed-size batches: lookups within a batch fan
//! out concurrently, batches resolve strictly in order, and the running
//! arrival-time clock only advances once a batch has resolved. Every lookup
//! in a batch is keyed by the batch-start predicted arrival time; the clock
//! is not re-synchronized mid-batch, which is an accepted approximation.

use futures::future::join_all;
use jiff::{SignedDuration, Timestamp};
use tracing::warn;

use crate::conditions::{
    predicted_traffic, traffic_battery_impact, traffic_delay_min, Traffic, Weather,
};
use crate::providers::ConditionProvider;
use crate::trip::Segment;

const BATCH_SIZE: usize = 10;

fn advance(start: Timestamp, minutes: f64) -> Timestamp {
    start
        .checked_add(SignedDuration::from_millis((minutes * 60_000.0) as i64))
        .unwrap_or(start)
}

async fn lookup<C: ConditionProvider>(
    provider: &C,
    segment: &Segment,
    at: Timestamp,
) -> (Weather, Traffic) {
    let weather = match provider.weather(segment.point, at).await {
        Ok(weather) => weather,
        Err(error) => {
            warn!(segment = segment.index, %error, "weather lookup failed, assuming ideal conditions");
            Weather::ideal()
        }
    };
    let traffic = match provider.traffic(segment.point, at).await {
        Ok(traffic) => traffic,
        Err(error) => {
            warn!(segment = segment.index, %error, "traffic lookup failed, using time-of-day prediction");
            predicted_traffic(at)
        }
    };
    (weather, traffic)
}

/// Rewrites each segment's duration, consumption, cumulative clock, and ETA
/// from the looked-up conditions. Guarantees that segment N's ETA reflects
/// the resolved (not estimated) duration of every earlier segment.
pub async fn enrich_segments<C: ConditionProvider>(
    provider: &C,
    segments: &mut [Segment],
    departure: Timestamp,
) {
    let mut clock_min = 0.0;

    for batch in segments.chunks_mut(BATCH_SIZE) {
        let batch_arrival = advance(departure, clock_min);
        let lookups = join_all(
            batch
                .iter()
                .map(|segment| lookup(provider, segment, batch_arrival)),
        )
        .await;

        for (segment, (weather, traffic)) in batch.iter_mut().zip(lookups) {
            let distance_km = segment.distance_km();
            let speed_kmh = if traffic.speed_kmh > 0.0 {
                traffic.speed_kmh
            } else {
                60.0
            };

            let base_duration_min = distance_km / speed_kmh * 60.0;
            let delay_min = traffic_delay_min(&traffic, distance_km, base_duration_min);
            segment.duration_sec = (base_duration_min + delay_min) * 60.0;
            segment.traffic_delay_min = delay_min;

            segment.weather_penalty = weather.penalty();
            let weather_adjusted = segment.expected_consumption_kwh * (1.0 + segment.weather_penalty);
            segment.expected_consumption_kwh = traffic_battery_impact(&traffic, weather_adjusted);

            segment.weather = Some(weather);
            segment.traffic = Some(traffic);

            clock_min += segment.duration_sec / 60.0;
            segment.cumulative_time_min = clock_min;
            segment.eta = Some(advance(departure, clock_min));
        }
    }
}
