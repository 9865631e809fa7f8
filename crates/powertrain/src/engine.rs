use serde::{Deserialize, Serialize};
use simcore::{require_positive, ConfigError, Curve};

/// Crankshaft torque source described by two speed-indexed maps.
///
/// `full_throttle` is the net torque at wide open throttle and
/// `closed_throttle` the (usually negative) pumping and friction torque with the
/// pedal released. Both are indexed by crank speed in rad/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    /// Crank and flywheel inertia (kg·m²)
    pub inertia: f64,
    pub full_throttle: Curve,
    pub closed_throttle: Curve,
}

impl Default for EngineParams {
    fn default() -> Self {
        EngineParams {
            inertia: 0.25,
            full_throttle: Curve::from_table(&[
                [0.0, 180.0],
                [100.0, 230.0],
                [200.0, 260.0],
                [350.0, 270.0],
                [500.0, 250.0],
                [600.0, 200.0],
                [680.0, 0.0],
            ]),
            closed_throttle: Curve::from_table(&[
                [0.0, 0.0],
                [100.0, -10.0],
                [300.0, -25.0],
                [700.0, -50.0],
            ]),
        }
    }
}

impl EngineParams {
    /// Crank torque for the given speed and throttle position.
    pub fn torque(&self, crank_omega: f64, throttle: f64) -> f64 {
        let throttle = throttle.clamp(0.0, 1.0);
        throttle * self.full_throttle.eval(crank_omega)
            + (1.0 - throttle) * self.closed_throttle.eval(crank_omega)
    }

    /// Crank speed derivative given the load torque drawn by the converter pump.
    pub fn crank_acceleration(&self, engine_torque: f64, load_torque: f64) -> f64 {
        (engine_torque - load_torque) / self.inertia
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("engine.inertia", self.inertia)?;
        if self.closed_throttle.max_y() > self.full_throttle.max_y() {
            return Err(ConfigError::invalid(
                "engine.closed_throttle",
                "closed-throttle torque exceeds the full-throttle map",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_throttle_blends_maps() {
        let engine = EngineParams::default();
        assert_abs_diff_eq!(engine.torque(200.0, 1.0), 260.0);
        assert_abs_diff_eq!(engine.torque(300.0, 0.0), -25.0);
        // closed-throttle map reads -17.5 at 200 rad/s
        assert_abs_diff_eq!(engine.torque(200.0, 0.5), 0.5 * 260.0 + 0.5 * -17.5, epsilon = 1e-9);
    }

    #[test]
    fn test_stalled_engine_without_throttle_makes_no_torque() {
        let engine = EngineParams::default();
        assert_eq!(engine.torque(0.0, 0.0), 0.0);
        assert!(engine.torque(0.0, 0.2) > 0.0);
    }

    #[test]
    fn test_map_held_beyond_redline() {
        let engine = EngineParams::default();
        assert_abs_diff_eq!(engine.torque(900.0, 1.0), 0.0);
        assert_abs_diff_eq!(engine.torque(900.0, 0.0), -50.0);
    }

    #[test]
    fn test_out_of_range_throttle_is_clamped() {
        let engine = EngineParams::default();
        assert_abs_diff_eq!(engine.torque(100.0, 1.7), engine.torque(100.0, 1.0));
        assert_abs_diff_eq!(engine.torque(100.0, -0.3), engine.torque(100.0, 0.0));
    }

    #[test]
    fn test_crank_acceleration() {
        let engine = EngineParams {
            inertia: 0.5,
            ..Default::default()
        };
        assert_abs_diff_eq!(engine.crank_acceleration(100.0, 40.0), 120.0);
    }

    #[test]
    fn test_validate_rejects_zero_inertia() {
        let engine = EngineParams {
            inertia: 0.0,
            ..Default::default()
        };
        assert!(engine.validate().is_err());
        assert!(EngineParams::default().validate().is_ok());
    }
}
