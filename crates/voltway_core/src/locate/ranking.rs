//! Static candidate ranking. Scores proximity to critical points (critical
//! priority weighted double), charger power, amenities, and charger count,
//! with a strategy-specific bonus on top.

use crate::trip::{Amenity, CriticalPoint, CriticalPriority, RankingStrategy, StationCandidate};

pub fn rank_stations(
    stations: &mut Vec<StationCandidate>,
    critical_points: &[CriticalPoint],
    strategy: RankingStrategy,
) {
    for station in stations.iter_mut() {
        let mut score = 0.0;

        for critical in critical_points {
            let distance_km = station.point.haversine_distance(&critical.point) / 1000.0;
            let weight = if critical.priority == CriticalPriority::Critical {
                2.0
            } else {
                1.0
            };
            score += (10.0 - distance_km.min(10.0)) * weight;
        }

        score += station.power_kw / 50.0 * 5.0;
        score += station.amenities.len() as f64 * 2.0;
        score += (station.number_of_chargers.min(5)) as f64 * 3.0;

        match strategy {
            RankingStrategy::Time => score += station.power_kw / 10.0,
            RankingStrategy::Cost => {
                if station.amenities.contains(&Amenity::Free) {
                    score += 20.0;
                }
            }
            RankingStrategy::Hybrid => {}
        }

        station.score = score;
    }

    stations.sort_by(|a, b| b.score.total_cmp(&a.score));
}
