//! Fixed-step driver coupling the tires, the powertrain and the vehicle body.

use std::time::{Duration, Instant};

use control::DriverInput;
use log::info;
use mechanics::{
    apply_contact, check_state, normal_loads, vehicle_to_tire_frame, SanityBounds, TMeasyParams, TMeasyTire,
    VehicleBody,
};
use powertrain::{checked_gear, Powertrain};
use simcore::{
    ConfigError, DriverControls, MechanicsModel, PowertrainModel, SimClock, SimError, SimState, WheelId,
};

use crate::config::VehicleParams;
use crate::output::{OutputRecord, OutputSink};

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub steps: u64,
    pub records: u64,
    pub end_time: f64,
    /// Wall-clock time spent in the integration loop
    pub elapsed: Duration,
}

/// One vehicle simulation. Owns its clock and state; independent simulators
/// share nothing.
pub struct Simulator {
    body: VehicleBody,
    tires: TMeasyTire,
    powertrain: Powertrain,
    bounds: SanityBounds,
    clock: SimClock,
    state: SimState,
    output_interval: u64,
}

impl Simulator {
    /// A simulator with the vehicle at rest in first gear and the engine stopped.
    ///
    /// Both parameter sets are validated first, so a bad step size or mass is
    /// rejected here rather than inside the loop.
    pub fn new(vehicle: &VehicleParams, tire: &TMeasyParams) -> Result<Self, ConfigError> {
        vehicle.validate()?;
        tire.validate()?;

        let mut sim = Simulator {
            body: VehicleBody::new(vehicle.chassis.clone()),
            tires: TMeasyTire::new(tire.clone()),
            powertrain: Powertrain::new(vehicle.powertrain.clone()),
            bounds: SanityBounds::default(),
            clock: SimClock::new(vehicle.step),
            state: SimState::default(),
            output_interval: 1,
        };
        sim.settle_tires();
        Ok(sim)
    }

    /// Starts the vehicle rolling straight ahead at `u0` with free-rolling wheels.
    pub fn with_initial_speed(mut self, u0: f64) -> Self {
        self.state.vehicle.u = u0;
        self.settle_tires();
        self
    }

    /// Starts in the requested gear (-1 reverse, 0 neutral, k forward).
    pub fn with_gear(mut self, gear: i32) -> Result<Self, SimError> {
        self.state.vehicle.gear = checked_gear(gear, &self.powertrain.params.gearbox)?;
        Ok(self)
    }

    /// Emit an output record every `every` steps.
    pub fn with_output_interval(mut self, every: u64) -> Self {
        self.output_interval = every.max(1);
        self
    }

    pub fn with_bounds(mut self, bounds: SanityBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn t(&self) -> f64 {
        self.clock.t()
    }

    pub fn record(&self) -> OutputRecord {
        OutputRecord::from_state(self.clock.t(), &self.state)
    }

    /// Loads, radii and free-rolling spin from the current body state.
    fn settle_tires(&mut self) {
        let params = &self.tires.params;
        let loads = normal_loads(&self.state.vehicle, &self.body.params);
        let u = self.state.vehicle.u;

        for wheel in WheelId::ALL {
            let fz = loads[wheel.index()];
            let tire = self.state.tire_mut(wheel);
            tire.fz = fz;
            tire.r_stat = params.loaded_radius(wheel, fz).unwrap_or(params.min_radius());
            tire.r_dyn = (2.0 * params.unloaded_radius + tire.r_stat) / 3.0;
            tire.omega = u / tire.r_dyn;
        }
    }

    /// Advance every model by one step under `controls`.
    pub fn step(&mut self, controls: DriverControls) -> Result<(), SimError> {
        let ctx = self.clock.context();
        self.state.controls = controls.clamped();

        let contacts = vehicle_to_tire_frame(&self.state.vehicle, &self.body.params, &self.state.controls);
        apply_contact(&mut self.state.tires, &contacts);

        self.tires.step_physics(ctx, &mut self.state)?;
        self.powertrain.step_powertrain(ctx, &mut self.state)?;
        self.body.step_physics(ctx, &mut self.state)?;

        self.clock.advance();
        check_state(&self.state, &self.bounds, self.clock.t())
    }

    /// Runs until `end_time`, sampling `input` at the start of each step.
    ///
    /// The initial state is recorded first, then every `output_interval`
    /// steps. The first fault stops the run and is returned.
    pub fn run(
        &mut self,
        end_time: f64,
        input: &DriverInput,
        sink: &mut dyn OutputSink,
    ) -> Result<RunSummary, SimError> {
        let first_step = self.clock.step();
        let mut records = 0;
        info!(
            "running to t = {end_time} s with step {} s ({} steps)",
            self.clock.dt(),
            self.clock.steps_until(end_time).saturating_sub(first_step)
        );

        let started = Instant::now();
        if first_step % self.output_interval == 0 {
            sink.record(&self.record())?;
            records += 1;
        }

        while !self.clock.reached(end_time) {
            self.step(input.sample(self.clock.t()))?;
            if self.clock.step() % self.output_interval == 0 {
                sink.record(&self.record())?;
                records += 1;
            }
        }
        sink.finish()?;

        let summary = RunSummary {
            steps: self.clock.step() - first_step,
            records,
            end_time: self.clock.t(),
            elapsed: started.elapsed(),
        };
        let v = &self.state.vehicle;
        info!(
            "finished at t = {:.3} s: u = {:.3} m/s, gear {}, {} records in {} ms",
            summary.end_time,
            v.u,
            v.gear,
            summary.records,
            summary.elapsed.as_millis()
        );
        Ok(summary)
    }
}
