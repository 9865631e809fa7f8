use serde::{Deserialize, Serialize};
use simcore::{
    require_non_negative, require_positive, ConfigError, MechanicsModel, SimContext, SimError,
    SimState, VehicleState, WheelId, WHEEL_COUNT,
};

use crate::frame::{tire_to_vehicle_frame, BodyForces};

/// Physical configuration of the chassis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChassisParams {
    /// Total vehicle mass in kg.
    pub mass: f64,
    /// Sprung mass taking part in roll, in kg.
    pub sprung_mass: f64,
    /// Moment of inertia about the vertical axis (yaw) in kg*m^2.
    pub yaw_inertia: f64,
    /// Moment of inertia of the sprung mass about the roll axis in kg*m^2.
    pub roll_inertia: f64,
    /// Distance from the centre of gravity to the front axle (m).
    pub cg_to_front: f64,
    /// Distance from the centre of gravity to the rear axle (m).
    pub cg_to_rear: f64,
    /// Height of the centre of gravity above ground (m).
    pub cg_height: f64,
    /// Height of the roll axis above ground (m).
    pub roll_centre_height: f64,
    pub track_front: f64,
    pub track_rear: f64,
    /// Roll stiffness of the front/rear suspension (N*m/rad).
    pub roll_stiffness_front: f64,
    pub roll_stiffness_rear: f64,
    /// Roll damping of the front/rear suspension (N*m*s/rad).
    pub roll_damping_front: f64,
    pub roll_damping_rear: f64,
    /// Road wheel angle at full steering command (rad).
    pub max_steer: f64,
    /// Drag coefficient times frontal area (m^2).
    pub drag_area: f64,
    pub air_density: f64,
    pub gravity: f64,
}

impl Default for ChassisParams {
    fn default() -> Self {
        // Mid-size sedan
        ChassisParams {
            mass: 1500.0,
            sprung_mass: 1300.0,
            yaw_inertia: 2500.0,
            roll_inertia: 500.0,
            cg_to_front: 1.2,
            cg_to_rear: 1.5,
            cg_height: 0.55,
            roll_centre_height: 0.1,
            track_front: 1.6,
            track_rear: 1.6,
            roll_stiffness_front: 45_000.0,
            roll_stiffness_rear: 35_000.0,
            roll_damping_front: 3_500.0,
            roll_damping_rear: 2_500.0,
            max_steer: 0.6,
            drag_area: 0.7,
            air_density: 1.225,
            gravity: 9.81,
        }
    }
}

impl ChassisParams {
    pub fn wheelbase(&self) -> f64 {
        self.cg_to_front + self.cg_to_rear
    }

    /// Contact point position relative to the centre of gravity [x forward, y left].
    pub fn wheel_position(&self, wheel: WheelId) -> [f64; 2] {
        let (x, track) = if wheel.is_front() {
            (self.cg_to_front, self.track_front)
        } else {
            (-self.cg_to_rear, self.track_rear)
        };
        let y = if wheel.is_left() { 0.5 * track } else { -0.5 * track };
        [x, y]
    }

    /// Height of the sprung centre of mass above the roll axis.
    pub fn roll_arm(&self) -> f64 {
        self.cg_height - self.roll_centre_height
    }

    pub fn with_mass(mut self, mass: f64, sprung_mass: f64) -> Self {
        self.mass = mass;
        self.sprung_mass = sprung_mass;
        self
    }

    pub fn with_drag_area(mut self, drag_area: f64) -> Self {
        self.drag_area = drag_area;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("mass", self.mass)?;
        require_positive("sprung_mass", self.sprung_mass)?;
        if self.sprung_mass > self.mass {
            return Err(ConfigError::invalid("sprung_mass", "exceeds total mass"));
        }
        require_positive("yaw_inertia", self.yaw_inertia)?;
        require_positive("roll_inertia", self.roll_inertia)?;
        require_positive("cg_to_front", self.cg_to_front)?;
        require_positive("cg_to_rear", self.cg_to_rear)?;
        require_positive("cg_height", self.cg_height)?;
        require_non_negative("roll_centre_height", self.roll_centre_height)?;
        if self.roll_centre_height >= self.cg_height {
            return Err(ConfigError::invalid(
                "roll_centre_height",
                "must lie below the centre of gravity",
            ));
        }
        require_positive("track_front", self.track_front)?;
        require_positive("track_rear", self.track_rear)?;
        require_positive("roll_stiffness_front", self.roll_stiffness_front)?;
        require_positive("roll_stiffness_rear", self.roll_stiffness_rear)?;
        require_non_negative("roll_damping_front", self.roll_damping_front)?;
        require_non_negative("roll_damping_rear", self.roll_damping_rear)?;
        require_non_negative("max_steer", self.max_steer)?;
        require_non_negative("drag_area", self.drag_area)?;
        require_non_negative("air_density", self.air_density)?;
        require_positive("gravity", self.gravity)?;

        let roll_stiffness = self.roll_stiffness_front + self.roll_stiffness_rear;
        let overturning = self.sprung_mass * self.gravity * self.roll_arm();
        if roll_stiffness <= overturning {
            return Err(ConfigError::invalid(
                "roll_stiffness_front",
                format!("total roll stiffness {roll_stiffness} cannot hold the gravity roll moment {overturning:.1}"),
            ));
        }
        Ok(())
    }
}

/// Vertical wheel loads with static axle split, longitudinal transfer from the
/// last longitudinal acceleration and lateral transfer through the roll
/// suspension and roll centres. Loads are never negative.
pub fn normal_loads(state: &VehicleState, params: &ChassisParams) -> [f64; WHEEL_COUNT] {
    let l = params.wheelbase();
    let weight = params.mass * params.gravity;

    let front_static = 0.5 * weight * params.cg_to_rear / l;
    let rear_static = 0.5 * weight * params.cg_to_front / l;

    let long_transfer = 0.5 * params.mass * params.cg_height * state.longitudinal_acceleration() / l;

    let ay = state.lateral_acceleration();
    let front_lateral = (params.roll_stiffness_front * state.phi
        + params.roll_damping_front * state.wx
        + params.sprung_mass * ay * params.roll_centre_height * params.cg_to_rear / l)
        / params.track_front;
    let rear_lateral = (params.roll_stiffness_rear * state.phi
        + params.roll_damping_rear * state.wx
        + params.sprung_mass * ay * params.roll_centre_height * params.cg_to_front / l)
        / params.track_rear;

    [
        (front_static - long_transfer - front_lateral).max(0.0),
        (front_static - long_transfer + front_lateral).max(0.0),
        (rear_static + long_transfer - rear_lateral).max(0.0),
        (rear_static + long_transfer + rear_lateral).max(0.0),
    ]
}

/// The vehicle body model: planar motion plus roll, integrated with explicit Euler.
#[derive(Debug, Clone, Default)]
pub struct VehicleBody {
    pub params: ChassisParams,
}

impl VehicleBody {
    pub fn new(params: ChassisParams) -> Self {
        VehicleBody { params }
    }

    fn drag(&self, u: f64) -> f64 {
        0.5 * self.params.air_density * self.params.drag_area * u * u.abs()
    }

    /// Advance the body states by one step from the net vehicle-frame forces.
    pub fn advance(&self, dt: f64, state: &mut VehicleState, forces: &BodyForces) {
        let p = &self.params;

        // Body-frame accelerations with the rotating-frame terms
        let udot = state.v * state.wz + (forces.fx - self.drag(state.u)) / p.mass;
        let vdot = -state.u * state.wz + forces.fy / p.mass;
        let wzdot = forces.mz / p.yaw_inertia;

        // Roll: damped oscillator driven by lateral acceleration of the sprung mass
        let lateral_acceleration = vdot + state.u * state.wz;
        let arm = p.roll_arm();
        let roll_stiffness = p.roll_stiffness_front + p.roll_stiffness_rear;
        let roll_damping = p.roll_damping_front + p.roll_damping_rear;
        let wxdot = (p.sprung_mass * lateral_acceleration * arm
            + p.sprung_mass * p.gravity * arm * state.phi
            - roll_stiffness * state.phi
            - roll_damping * state.wx)
            / p.roll_inertia;

        let (sin_psi, cos_psi) = state.psi.sin_cos();
        state.x += (state.u * cos_psi - state.v * sin_psi) * dt;
        state.y += (state.u * sin_psi + state.v * cos_psi) * dt;
        state.psi += state.wz * dt;
        state.phi += state.wx * dt;

        state.u += udot * dt;
        state.v += vdot * dt;
        state.wz += wzdot * dt;
        state.wx += wxdot * dt;

        state.udot = udot;
        state.vdot = vdot;
    }
}

impl MechanicsModel for VehicleBody {
    fn step_physics(&self, ctx: SimContext, state: &mut SimState) -> Result<(), SimError> {
        let forces = tire_to_vehicle_frame(&state.tires, &self.params);
        self.advance(ctx.dt, &mut state.vehicle, &forces);
        Ok(())
    }
}

/// Largest magnitudes a healthy state may reach.
#[derive(Debug, Clone, Copy)]
pub struct SanityBounds {
    pub speed: f64,
    pub yaw_rate: f64,
    pub roll: f64,
    pub wheel_omega: f64,
    pub crank_omega: f64,
}

impl Default for SanityBounds {
    fn default() -> Self {
        SanityBounds {
            speed: 150.0,
            yaw_rate: 20.0,
            roll: 1.0,
            wheel_omega: 2_000.0,
            crank_omega: 2_000.0,
        }
    }
}

fn bounded(t: f64, quantity: &'static str, value: f64, limit: f64) -> Result<(), SimError> {
    if value.is_finite() && value.abs() <= limit {
        Ok(())
    } else {
        Err(SimError::Divergence { t, quantity, value })
    }
}

/// Checks a post-step state against `bounds`; any NaN or runaway value is a
/// [`SimError::Divergence`].
pub fn check_state(state: &SimState, bounds: &SanityBounds, t: f64) -> Result<(), SimError> {
    let v = &state.vehicle;
    bounded(t, "x", v.x, f64::MAX)?;
    bounded(t, "y", v.y, f64::MAX)?;
    bounded(t, "psi", v.psi, f64::MAX)?;
    bounded(t, "u", v.u, bounds.speed)?;
    bounded(t, "v", v.v, bounds.speed)?;
    bounded(t, "wz", v.wz, bounds.yaw_rate)?;
    bounded(t, "phi", v.phi, bounds.roll)?;
    bounded(t, "wx", v.wx, f64::MAX)?;
    bounded(t, "crank_omega", v.crank_omega, bounds.crank_omega)?;
    for tire in &state.tires {
        bounded(t, "wheel_omega", tire.omega, bounds.wheel_omega)?;
        bounded(t, "fx", tire.fx, f64::MAX)?;
        bounded(t, "fy", tire.fy, f64::MAX)?;
    }
    Ok(())
}
