//! Deterministic condition provider backed by the historical traffic
//! pattern and a coarse seasonal weather model. Used when no live weather
//! or traffic feed is configured, and as the reproducible test provider.

use jiff::Timestamp;
use jiff::tz::TimeZone;

use voltway_core::conditions::{Traffic, Weather, WeatherCondition, predicted_traffic};
use voltway_core::geo::GeoPoint;
use voltway_core::providers::ConditionProvider;

#[derive(Default)]
pub struct PredictedConditions;

/// Month and hemisphere pick the condition; anything mild maps to ideal.
fn seasonal_weather(point: GeoPoint, at: Timestamp) -> Weather {
    let month = at.to_zoned(TimeZone::UTC).month();
    let northern = point.lat >= 0.0;
    let winter = if northern {
        matches!(month, 12 | 1 | 2)
    } else {
        matches!(month, 6 | 7 | 8)
    };
    let summer = if northern {
        matches!(month, 6 | 7 | 8)
    } else {
        matches!(month, 12 | 1 | 2)
    };

    let extreme_latitude = point.lat.abs() > 55.0;
    if winter && extreme_latitude {
        return Weather {
            condition: WeatherCondition::Snow,
            temp_c: -5.0,
        };
    }
    if winter {
        return Weather {
            condition: WeatherCondition::Cold,
            temp_c: 2.0,
        };
    }
    if summer && point.lat.abs() < 35.0 {
        return Weather {
            condition: WeatherCondition::Hot,
            temp_c: 36.0,
        };
    }
    Weather::ideal()
}

impl ConditionProvider for PredictedConditions {
    async fn weather(&self, point: GeoPoint, at: Timestamp) -> anyhow::Result<Weather> {
        Ok(seasonal_weather(point, at))
    }

    async fn traffic(&self, _point: GeoPoint, at: Timestamp) -> anyhow::Result<Traffic> {
        Ok(predicted_traffic(at))
    }
}
