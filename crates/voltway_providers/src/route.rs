//! Synthetic routing over the great circle between two points. Stands in
//! for a road-network router when none is configured; the polyline is the
//! geodesic sampled at a fixed spacing.

use tracing::debug;

use voltway_core::geo::GeoPoint;
use voltway_core::providers::{RouteData, RouteProvider};

pub struct GreatCircleRouteProvider {
    pub speed_kmh: f64,
    pub sample_spacing_m: f64,
}

impl Default for GreatCircleRouteProvider {
    fn default() -> Self {
        GreatCircleRouteProvider {
            speed_kmh: 90.0,
            sample_spacing_m: 500.0,
        }
    }
}

impl RouteProvider for GreatCircleRouteProvider {
    async fn route(
        &self,
        origin: geo_types::Point,
        destination: geo_types::Point,
    ) -> anyhow::Result<RouteData> {
        let from = GeoPoint::from(origin);
        let to = GeoPoint::from(destination);
        let distance_m = from.haversine_distance(&to);
        if distance_m == 0.0 {
            anyhow::bail!("origin and destination coincide");
        }

        let steps = (distance_m / self.sample_spacing_m).ceil().max(1.0) as usize;
        let coordinates: Vec<GeoPoint> = (0..=steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                GeoPoint::new(
                    from.lat + (to.lat - from.lat) * t,
                    from.lng + (to.lng - from.lng) * t,
                )
            })
            .collect();

        debug!(
            distance_km = format_args!("{:.1}", distance_m / 1000.0),
            points = coordinates.len(),
            "synthesized great-circle route"
        );

        Ok(RouteData {
            coordinates,
            distance_m,
            duration_sec: distance_m / 1000.0 / self.speed_kmh * 3600.0,
        })
    }
}
