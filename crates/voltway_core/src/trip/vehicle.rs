use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleProfile {
    pub battery_capacity_kwh: f64,
    #[serde(default)]
    pub degradation_percent: f64,
    pub consumption_kwh_per_km: f64,
    #[serde(default = "default_charge_power")]
    pub max_charge_power_kw: f64,
}

fn default_charge_power() -> f64 {
    50.0
}

impl VehicleProfile {
    /// Pack capacity after degradation; every battery computation in the
    /// pipeline works against this figure, not the nameplate capacity.
    pub fn usable_capacity_kwh(&self) -> f64 {
        self.battery_capacity_kwh * (1.0 - self.degradation_percent / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degradation_reduces_usable_capacity() {
        let vehicle = VehicleProfile {
            battery_capacity_kwh: 60.0,
            degradation_percent: 10.0,
            consumption_kwh_per_km: 0.15,
            max_charge_power_kw: 50.0,
        };
        assert!((vehicle.usable_capacity_kwh() - 54.0).abs() < 1e-9);
    }
}
