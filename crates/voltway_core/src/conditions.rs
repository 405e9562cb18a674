//! Weather and traffic condition types, the penalty rules applied during
//! enrichment, and the deterministic time-of-day prediction used whenever a
//! live lookup is unavailable or fails.

use jiff::civil::Weekday;
use jiff::tz::TimeZone;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Cold,
    Hot,
    Rain,
    Snow,
    Fog,
    Wind,
    Ideal,
}

impl WeatherCondition {
    /// Extra energy consumption as a fraction of base consumption.
    pub fn penalty(&self) -> f64 {
        match self {
            WeatherCondition::Cold | WeatherCondition::Hot => 0.15,
            WeatherCondition::Rain => 0.12,
            WeatherCondition::Snow => 0.20,
            WeatherCondition::Fog => 0.08,
            WeatherCondition::Wind => 0.05,
            WeatherCondition::Ideal => 0.0,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            WeatherCondition::Cold => "#0000FF",
            WeatherCondition::Hot => "#FF4500",
            WeatherCondition::Rain | WeatherCondition::Snow => "#1E90FF",
            WeatherCondition::Fog | WeatherCondition::Wind => "#A9A9A9",
            WeatherCondition::Ideal => "#00FF00",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub condition: WeatherCondition,
    pub temp_c: f64,
}

impl Weather {
    pub fn ideal() -> Self {
        Weather {
            condition: WeatherCondition::Ideal,
            temp_c: 25.0,
        }
    }

    pub fn penalty(&self) -> f64 {
        self.condition.penalty()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLevel {
    Free,
    Light,
    Moderate,
    Heavy,
    Severe,
}

impl TrafficLevel {
    pub fn color(&self) -> &'static str {
        match self {
            TrafficLevel::Free => "#00FF00",
            TrafficLevel::Light => "#90EE90",
            TrafficLevel::Moderate => "#FFFF00",
            TrafficLevel::Heavy => "#FF0000",
            TrafficLevel::Severe => "#8B0000",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Traffic {
    pub level: TrafficLevel,
    pub speed_kmh: f64,
    pub free_flow_speed_kmh: f64,
    pub congestion_factor: f64,
    pub delay_minutes_per_km: Option<f64>,
    /// Extra battery consumption as a fraction of base consumption.
    pub battery_penalty: f64,
}

impl Traffic {
    pub fn free_flow() -> Self {
        Traffic {
            level: TrafficLevel::Free,
            speed_kmh: 58.0,
            free_flow_speed_kmh: 60.0,
            congestion_factor: 1.0,
            delay_minutes_per_km: Some(0.0),
            battery_penalty: 0.0,
        }
    }
}

/// Stop-and-go driving below 30 km/h adds a further 15% on top of the
/// congestion penalty.
pub fn traffic_battery_impact(traffic: &Traffic, base_consumption_kwh: f64) -> f64 {
    let speed_penalty = if traffic.speed_kmh < 30.0 { 0.15 } else { 0.0 };
    base_consumption_kwh * (1.0 + traffic.battery_penalty + speed_penalty)
}

pub fn traffic_delay_min(traffic: &Traffic, segment_distance_km: f64, base_duration_min: f64) -> f64 {
    match traffic.delay_minutes_per_km {
        Some(delay_per_km) if delay_per_km > 0.0 => delay_per_km * segment_distance_km,
        _ => base_duration_min * (traffic.congestion_factor - 1.0).max(0.0),
    }
}

/// Historical time-of-day / day-of-week traffic pattern. This is the local
/// fallback for failed or absent live lookups; it is deterministic so that a
/// degraded plan is reproducible.
pub fn predicted_traffic(at: Timestamp) -> Traffic {
    let local = at.to_zoned(TimeZone::UTC);
    let hour = local.hour();
    let weekend = matches!(local.weekday(), Weekday::Saturday | Weekday::Sunday);

    if weekend {
        if (10..=14).contains(&hour) {
            return Traffic {
                level: TrafficLevel::Moderate,
                speed_kmh: 45.0,
                free_flow_speed_kmh: 60.0,
                congestion_factor: 1.15,
                delay_minutes_per_km: Some(0.5),
                battery_penalty: 0.08,
            };
        }
        return Traffic {
            level: TrafficLevel::Free,
            speed_kmh: 55.0,
            free_flow_speed_kmh: 60.0,
            congestion_factor: 1.05,
            delay_minutes_per_km: Some(0.0),
            battery_penalty: 0.0,
        };
    }

    match hour {
        7..=10 => Traffic {
            level: TrafficLevel::Heavy,
            speed_kmh: 25.0,
            free_flow_speed_kmh: 60.0,
            congestion_factor: 1.40,
            delay_minutes_per_km: Some(1.5),
            battery_penalty: 0.22,
        },
        17..=21 => Traffic {
            level: TrafficLevel::Heavy,
            speed_kmh: 22.0,
            free_flow_speed_kmh: 60.0,
            congestion_factor: 1.50,
            delay_minutes_per_km: Some(2.0),
            battery_penalty: 0.25,
        },
        11..=16 => Traffic {
            level: TrafficLevel::Moderate,
            speed_kmh: 40.0,
            free_flow_speed_kmh: 60.0,
            congestion_factor: 1.20,
            delay_minutes_per_km: Some(0.8),
            battery_penalty: 0.12,
        },
        22.. | ..=6 => Traffic {
            level: TrafficLevel::Free,
            speed_kmh: 58.0,
            free_flow_speed_kmh: 60.0,
            congestion_factor: 1.0,
            delay_minutes_per_km: Some(0.0),
            battery_penalty: 0.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(iso: &str) -> Timestamp {
        iso.parse().unwrap()
    }

    #[test]
    fn weekday_rush_hour_is_heavy() {
        // 2026-01-07 is a Wednesday; 08:30 UTC is morning rush.
        let traffic = predicted_traffic(ts("2026-01-07T08:30:00Z"));
        assert_eq!(traffic.level, TrafficLevel::Heavy);
        assert!(traffic.battery_penalty > 0.2);
    }

    #[test]
    fn weekend_night_is_free_flow() {
        // 2026-01-10 is a Saturday.
        let traffic = predicted_traffic(ts("2026-01-10T02:00:00Z"));
        assert_eq!(traffic.level, TrafficLevel::Free);
        assert_eq!(traffic.battery_penalty, 0.0);
    }

    #[test]
    fn low_speed_adds_stop_and_go_penalty() {
        let traffic = predicted_traffic(ts("2026-01-07T08:30:00Z"));
        assert!(traffic.speed_kmh < 30.0);
        let adjusted = traffic_battery_impact(&traffic, 1.0);
        assert!((adjusted - (1.0 + traffic.battery_penalty + 0.15)).abs() < 1e-9);
    }

    #[test]
    fn delay_prefers_per_km_figure() {
        let traffic = Traffic {
            delay_minutes_per_km: Some(1.5),
            ..Traffic::free_flow()
        };
        assert!((traffic_delay_min(&traffic, 2.0, 10.0) - 3.0).abs() < 1e-9);

        let congested = Traffic {
            delay_minutes_per_km: None,
            congestion_factor: 1.2,
            ..Traffic::free_flow()
        };
        assert!((traffic_delay_min(&congested, 2.0, 10.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn weather_penalties_by_condition() {
        assert_eq!(WeatherCondition::Snow.penalty(), 0.20);
        assert_eq!(WeatherCondition::Ideal.penalty(), 0.0);
        assert_eq!(Weather::ideal().penalty(), 0.0);
    }
}
