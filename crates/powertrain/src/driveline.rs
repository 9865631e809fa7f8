//! Driveline - couples the gearbox output shaft to the road wheels
//!
//! Provides:
//! - Overall ratio and efficiency between turbine and wheels
//! - Drive torque split across axles
//! - Wheel spin integration with brake torque

use serde::{Deserialize, Serialize};
use simcore::{ConfigError, WheelId, WHEEL_COUNT};

/// Which wheels receive drive torque.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DriveLayout {
    FrontWheel,
    RearWheel,
    /// Fixed split with `front_bias` of the torque going to the front axle
    AllWheel { front_bias: f64 },
}

impl Default for DriveLayout {
    fn default() -> Self {
        DriveLayout::RearWheel
    }
}

impl DriveLayout {
    /// Fraction of total drive torque per wheel; sums to one.
    pub fn split(&self) -> [f64; WHEEL_COUNT] {
        let front = match self {
            DriveLayout::FrontWheel => 1.0,
            DriveLayout::RearWheel => 0.0,
            DriveLayout::AllWheel { front_bias } => front_bias.clamp(0.0, 1.0),
        };
        WheelId::ALL.map(|wheel| if wheel.is_front() { 0.5 * front } else { 0.5 * (1.0 - front) })
    }

    /// Torque-weighted mean spin of the driven wheels, i.e. the speed seen by the
    /// differential output.
    pub fn axle_omega(&self, wheel_omega: &[f64; WHEEL_COUNT]) -> f64 {
        self.split().iter().zip(wheel_omega).map(|(s, w)| s * w).sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let DriveLayout::AllWheel { front_bias } = self {
            if !(0.0..=1.0).contains(front_bias) {
                return Err(ConfigError::invalid(
                    "drive.front_bias",
                    format!("must lie in [0, 1], got {front_bias}"),
                ));
            }
        }
        Ok(())
    }
}

/// Gear train between the converter turbine (side A) and the driven axle (side B).
///
/// `ratio = ω_turbine / ω_axle`; torque crosses as `T_axle = T_turbine · ratio · efficiency`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Driveline {
    pub ratio: f64,
    pub efficiency: f64,
}

impl Driveline {
    pub fn new(ratio: f64, efficiency: f64) -> Self {
        Driveline { ratio, efficiency }
    }

    /// Total axle torque for a turbine torque.
    pub fn turbine_to_axle_torque(&self, turbine_torque: f64) -> f64 {
        turbine_torque * self.ratio * self.efficiency
    }

    pub fn axle_to_turbine_omega(&self, axle_omega: f64) -> f64 {
        axle_omega * self.ratio
    }

    /// Drive torque at each wheel for a turbine torque.
    pub fn wheel_torques(&self, turbine_torque: f64, layout: &DriveLayout) -> [f64; WHEEL_COUNT] {
        let total = self.turbine_to_axle_torque(turbine_torque);
        layout.split().map(|share| share * total)
    }
}

/// Wheel spin rotating against tire reaction and brakes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSpin {
    /// Wheel and half-shaft inertia (kg·m²)
    pub inertia: f64,
    /// Brake torque at full pedal (N·m)
    pub max_brake_torque: f64,
}

impl WheelSpin {
    /// Spin rate after one step of `J·ω̇ = T_drive − fx·r_dyn` followed by braking.
    ///
    /// Brake torque opposes the spin direction and can bring the wheel to rest
    /// within the step but never reverse it.
    pub fn advance(&self, omega: f64, drive_torque: f64, fx: f64, r_dyn: f64, brake: f64, dt: f64) -> f64 {
        let omega = omega + dt * (drive_torque - fx * r_dyn) / self.inertia;

        let brake_step = dt * brake.clamp(0.0, 1.0) * self.max_brake_torque / self.inertia;
        if omega.abs() <= brake_step {
            0.0
        } else {
            omega - brake_step * omega.signum()
        }
    }
}
