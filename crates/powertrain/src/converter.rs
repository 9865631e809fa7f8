//! Hydrodynamic torque converter between crank and gearbox input.
//!
//! The pump absorbs `(ω_e / K(sr))²` from the engine, where `K` is the capacity
//! factor and `sr = ω_turbine / ω_e` the speed ratio. The turbine delivers that
//! torque multiplied by the torque ratio `TR(sr)`, which is above one while the
//! converter slips and falls to one at the coupling point.

use serde::{Deserialize, Serialize};
use simcore::{ConfigError, Curve};

/// Crank speeds below this are treated as a stopped pump.
const PUMP_STOPPED: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterParams {
    /// Capacity factor `K(sr)` in rad/s per √(N·m)
    pub capacity_factor: Curve,
    /// Torque multiplication `TR(sr)`
    pub torque_ratio: Curve,
}

impl Default for ConverterParams {
    fn default() -> Self {
        ConverterParams {
            capacity_factor: Curve::from_table(&[
                [0.0, 14.0],
                [0.5, 15.0],
                [0.7, 17.0],
                [0.8, 20.0],
                [0.87, 27.0],
                [0.92, 45.0],
                [0.96, 90.0],
                [1.0, 250.0],
            ]),
            torque_ratio: Curve::from_table(&[[0.0, 2.0], [0.5, 1.5], [0.85, 1.0], [1.0, 1.0]]),
        }
    }
}

/// Torques and speeds across the converter for one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coupling {
    pub speed_ratio: f64,
    /// Torque absorbed from the crank by the pump
    pub input_torque: f64,
    /// Torque delivered by the turbine to the gearbox
    pub output_torque: f64,
    pub output_omega: f64,
}

impl ConverterParams {
    /// Speed ratio clamped to `[0, 1]`; zero when the pump is not turning.
    pub fn speed_ratio(&self, crank_omega: f64, turbine_omega: f64) -> f64 {
        if crank_omega <= PUMP_STOPPED {
            return 0.0;
        }
        (turbine_omega / crank_omega).clamp(0.0, 1.0)
    }

    pub fn couple(&self, crank_omega: f64, turbine_omega: f64) -> Coupling {
        let speed_ratio = self.speed_ratio(crank_omega, turbine_omega);
        if crank_omega <= PUMP_STOPPED {
            return Coupling {
                speed_ratio,
                output_omega: turbine_omega,
                ..Default::default()
            };
        }

        let input_torque = (crank_omega / self.capacity_factor.eval(speed_ratio)).powi(2);
        Coupling {
            speed_ratio,
            input_torque,
            output_torque: self.torque_ratio.eval(speed_ratio) * input_torque,
            output_omega: turbine_omega,
        }
    }

    /// Gearbox in neutral: the turbine has nothing to react against and spins
    /// with the pump, so no torque crosses the converter.
    pub fn free_wheel(&self, crank_omega: f64) -> Coupling {
        Coupling {
            speed_ratio: if crank_omega > PUMP_STOPPED { 1.0 } else { 0.0 },
            output_omega: crank_omega,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity_factor.min_y() <= 0.0 {
            return Err(ConfigError::invalid(
                "torque_converter.capacity_factor",
                "capacity factor must stay positive",
            ));
        }
        if self.torque_ratio.min_y() <= 0.0 {
            return Err(ConfigError::invalid(
                "torque_converter.torque_ratio",
                "torque ratio must stay positive",
            ));
        }
        Ok(())
    }
}
