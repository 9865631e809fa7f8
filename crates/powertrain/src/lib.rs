//! Engine, torque converter, automatic gearbox and driveline.

pub mod converter;
pub mod driveline;
pub mod engine;
pub mod gearbox;

use log::debug;
use serde::{Deserialize, Serialize};
use simcore::{require_non_negative, require_positive, ConfigError, Gear, PowertrainModel, SimContext, SimError, SimState, WHEEL_COUNT};

pub use converter::{ConverterParams, Coupling};
pub use driveline::{DriveLayout, Driveline, WheelSpin};
pub use engine::EngineParams;
pub use gearbox::{checked_gear, next_gear, GearboxParams, ShiftPoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowertrainParams {
    pub engine: EngineParams,
    pub torque_converter: ConverterParams,
    pub gearbox: GearboxParams,
    pub drive: DriveLayout,
    /// Spin inertia of each road wheel (kg·m²)
    pub wheel_inertia: f64,
    /// Brake torque per wheel at full pedal (N·m)
    pub max_brake_torque: f64,
}

impl Default for PowertrainParams {
    fn default() -> Self {
        PowertrainParams {
            engine: EngineParams::default(),
            torque_converter: ConverterParams::default(),
            gearbox: GearboxParams::default(),
            drive: DriveLayout::default(),
            wheel_inertia: 1.2,
            max_brake_torque: 3000.0,
        }
    }
}

impl PowertrainParams {
    pub fn with_drive(mut self, drive: DriveLayout) -> Self {
        self.drive = drive;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.torque_converter.validate()?;
        self.gearbox.validate()?;
        self.drive.validate()?;
        require_positive("wheel_inertia", self.wheel_inertia)?;
        require_non_negative("max_brake_torque", self.max_brake_torque)?;
        Ok(())
    }
}

/// Steps crank speed, converter, gear selection and wheel spin.
///
/// Expects the tire forces of the current step to be in `state.tires` already;
/// it writes back wheel spin rates and the drive torque per wheel.
#[derive(Debug, Clone, Default)]
pub struct Powertrain {
    pub params: PowertrainParams,
}

impl Powertrain {
    pub fn new(params: PowertrainParams) -> Self {
        Powertrain { params }
    }

    fn wheel_spin(&self) -> WheelSpin {
        WheelSpin {
            inertia: self.params.wheel_inertia,
            max_brake_torque: self.params.max_brake_torque,
        }
    }
}

impl PowertrainModel for Powertrain {
    fn step_powertrain(&self, ctx: SimContext, state: &mut SimState) -> Result<(), SimError> {
        let params = &self.params;
        let controls = state.controls;
        let vehicle = &mut state.vehicle;

        let gear = if vehicle.time_in_gear >= params.gearbox.shift_delay {
            next_gear(vehicle.gear, vehicle.crank_omega, controls.throttle, &params.gearbox)?
        } else {
            vehicle.gear
        };
        if gear != vehicle.gear {
            debug!(
                "t = {:.3} s: shift {} -> {} at {:.1} rad/s",
                ctx.t, vehicle.gear, gear, vehicle.crank_omega
            );
            vehicle.gear = gear;
            vehicle.time_in_gear = 0.0;
        } else {
            vehicle.time_in_gear += ctx.dt;
        }

        let driveline = Driveline::new(params.gearbox.overall_ratio(gear), params.gearbox.efficiency);
        let wheel_omega: [f64; WHEEL_COUNT] = state.tires.map(|tire| tire.omega);
        let turbine_omega = driveline.axle_to_turbine_omega(params.drive.axle_omega(&wheel_omega));

        let coupling = if gear == Gear::Neutral {
            params.torque_converter.free_wheel(vehicle.crank_omega)
        } else {
            params.torque_converter.couple(vehicle.crank_omega, turbine_omega)
        };
        let engine_torque = params.engine.torque(vehicle.crank_omega, controls.throttle);
        let crank_accel = params.engine.crank_acceleration(engine_torque, coupling.input_torque);

        vehicle.crank_omega = (vehicle.crank_omega + ctx.dt * crank_accel).max(0.0);
        vehicle.engine_torque = engine_torque;
        vehicle.tc_input_torque = coupling.input_torque;
        vehicle.tc_output_torque = coupling.output_torque;
        vehicle.tc_output_omega = coupling.output_omega;
        vehicle.speed_ratio = coupling.speed_ratio;
        vehicle.wheel_torque = driveline.turbine_to_axle_torque(coupling.output_torque);

        let drive_torques = driveline.wheel_torques(coupling.output_torque, &params.drive);
        let spin = self.wheel_spin();
        for (tire, drive_torque) in state.tires.iter_mut().zip(drive_torques) {
            tire.drive_torque = drive_torque;
            tire.omega = spin.advance(tire.omega, drive_torque, tire.fx, tire.r_dyn, controls.brake, ctx.dt);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use simcore::DriverControls;

    fn ctx() -> SimContext {
        SimContext { dt: 0.001, t: 0.0 }
    }

    fn state_with(controls: DriverControls) -> SimState {
        let mut state = SimState {
            controls,
            ..Default::default()
        };
        for tire in state.tires.iter_mut() {
            tire.r_dyn = 0.32;
        }
        state
    }

    #[test]
    fn test_rest_is_an_equilibrium() {
        let powertrain = Powertrain::default();
        let mut state = state_with(DriverControls::default());

        for _ in 0..1000 {
            powertrain.step_powertrain(ctx(), &mut state).unwrap();
        }

        assert_eq!(state.vehicle.crank_omega, 0.0);
        assert_eq!(state.vehicle.gear, Gear::Forward(1));
        for tire in &state.tires {
            assert_eq!(tire.omega, 0.0);
            assert_eq!(tire.drive_torque, 0.0);
        }
    }

    #[test]
    fn test_throttle_spins_up_engine_and_rear_wheels() {
        let powertrain = Powertrain::default();
        let mut state = state_with(DriverControls::new(0.0, 1.0, 0.0));

        for _ in 0..20 {
            powertrain.step_powertrain(ctx(), &mut state).unwrap();
        }

        assert!(state.vehicle.crank_omega > 0.0);
        // converter still near stall, so it multiplies torque
        assert!(state.vehicle.speed_ratio < 0.5);
        assert!(state.vehicle.tc_output_torque > state.vehicle.tc_input_torque);
        assert!(state.tires[2].omega > 0.0);
        assert_abs_diff_eq!(state.tires[2].omega, state.tires[3].omega);
        assert_eq!(state.tires[0].omega, 0.0);
        assert_eq!(state.tires[0].drive_torque, 0.0);
    }

    #[test]
    fn test_wheel_torque_matches_converter_output() {
        let powertrain = Powertrain::default();
        let mut state = state_with(DriverControls::new(0.0, 1.0, 0.0));
        state.vehicle.crank_omega = 200.0;

        powertrain.step_powertrain(ctx(), &mut state).unwrap();

        let gearbox = &powertrain.params.gearbox;
        let expected = state.vehicle.tc_output_torque * gearbox.overall_ratio(Gear::Forward(1)) * gearbox.efficiency;
        assert_abs_diff_eq!(state.vehicle.wheel_torque, expected, epsilon = 1e-9);
        let total: f64 = state.tires.iter().map(|t| t.drive_torque).sum();
        assert_abs_diff_eq!(total, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_neutral_delivers_no_torque() {
        let powertrain = Powertrain::default();
        let mut state = state_with(DriverControls::new(0.0, 1.0, 0.0));
        state.vehicle.gear = Gear::Neutral;

        for _ in 0..2000 {
            powertrain.step_powertrain(ctx(), &mut state).unwrap();
        }

        assert_eq!(state.vehicle.gear, Gear::Neutral);
        // unloaded engine runs up to where the full-throttle map reaches zero
        assert!(state.vehicle.crank_omega > 650.0, "crank {}", state.vehicle.crank_omega);
        assert!(state.vehicle.crank_omega <= 680.0 + 1e-6);
        assert_eq!(state.vehicle.tc_input_torque, 0.0);
        assert_eq!(state.vehicle.tc_output_torque, 0.0);
        assert_eq!(state.vehicle.speed_ratio, 1.0);
        assert!(state.tires.iter().all(|t| t.omega == 0.0));
    }

    #[test]
    fn test_reverse_drives_wheels_backwards() {
        let powertrain = Powertrain::default();
        let mut state = state_with(DriverControls::new(0.0, 0.5, 0.0));
        state.vehicle.gear = Gear::Reverse;

        for _ in 0..200 {
            powertrain.step_powertrain(ctx(), &mut state).unwrap();
        }

        assert!(state.tires[2].omega < 0.0);
        assert!(state.vehicle.wheel_torque < 0.0);
    }

    #[test]
    fn test_upshift_on_high_crank_speed() {
        let powertrain = Powertrain::default();
        let mut state = state_with(DriverControls::new(0.0, 1.0, 0.0));
        state.vehicle.crank_omega = 620.0;
        state.vehicle.time_in_gear = 1.0;

        powertrain.step_powertrain(ctx(), &mut state).unwrap();
        assert_eq!(state.vehicle.gear, Gear::Forward(2));
        assert_eq!(state.vehicle.time_in_gear, 0.0);

        // held in second until the shift delay has passed
        state.vehicle.crank_omega = 620.0;
        powertrain.step_powertrain(ctx(), &mut state).unwrap();
        assert_eq!(state.vehicle.gear, Gear::Forward(2));
    }

    #[test]
    fn test_brakes_stop_free_wheels() {
        let powertrain = Powertrain::default();
        let mut state = state_with(DriverControls::new(0.0, 0.0, 1.0));
        for tire in state.tires.iter_mut() {
            tire.omega = 5.0;
        }

        for _ in 0..10 {
            powertrain.step_powertrain(ctx(), &mut state).unwrap();
        }

        assert!(state.tires.iter().all(|t| t.omega == 0.0));
    }

    #[test]
    fn test_all_wheel_layout() {
        let powertrain = Powertrain::new(PowertrainParams::default().with_drive(DriveLayout::AllWheel { front_bias: 0.5 }));
        let mut state = state_with(DriverControls::new(0.0, 1.0, 0.0));

        for _ in 0..100 {
            powertrain.step_powertrain(ctx(), &mut state).unwrap();
        }

        assert!(state.tires.iter().all(|t| t.omega > 0.0));
        assert_abs_diff_eq!(state.tires[0].drive_torque, state.tires[2].drive_torque, epsilon = 1e-9);
    }

    #[test]
    fn test_params_round_trip_json() {
        let params = PowertrainParams::default();
        let text = serde_json::to_string(&params).unwrap();
        let back: PowertrainParams = serde_json::from_str(&text).unwrap();
        assert_eq!(back, params);

        let partial: PowertrainParams = serde_json::from_str(r#"{"wheel_inertia": 2.0}"#).unwrap();
        assert_eq!(partial.wheel_inertia, 2.0);
        assert_eq!(partial.gearbox, GearboxParams::default());
        assert!(partial.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_wheel_inertia() {
        let params = PowertrainParams {
            wheel_inertia: -1.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
