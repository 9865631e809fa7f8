use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SimError;

pub const WHEEL_COUNT: usize = 4;

// Wheel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WheelId {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl WheelId {
    pub const ALL: [WheelId; WHEEL_COUNT] = [
        WheelId::FrontLeft,
        WheelId::FrontRight,
        WheelId::RearLeft,
        WheelId::RearRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_front(self) -> bool {
        matches!(self, WheelId::FrontLeft | WheelId::FrontRight)
    }

    pub fn is_left(self) -> bool {
        matches!(self, WheelId::FrontLeft | WheelId::RearLeft)
    }
}

impl fmt::Display for WheelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WheelId::FrontLeft => "front-left",
            WheelId::FrontRight => "front-right",
            WheelId::RearLeft => "rear-left",
            WheelId::RearRight => "rear-right",
        };
        f.write_str(s)
    }
}

// Driver Inputs
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriverControls {
    /// Normalised steering command, positive turns left [-1, 1]
    pub steering: f64,
    /// Throttle pedal [0, 1]
    pub throttle: f64,
    /// Brake pedal [0, 1]
    pub brake: f64,
}

impl DriverControls {
    pub fn new(steering: f64, throttle: f64, brake: f64) -> Self {
        DriverControls { steering, throttle, brake }.clamped()
    }

    pub fn clamped(self) -> Self {
        DriverControls {
            steering: self.steering.clamp(-1.0, 1.0),
            throttle: self.throttle.clamp(0.0, 1.0),
            brake: self.brake.clamp(0.0, 1.0),
        }
    }
}

// Tire Traits
#[derive(Debug, Clone, Copy, Default)]
pub struct TMeasyState {
    /// Wheel spin rate (rad/s)
    pub omega: f64,
    /// Normal load on the contact patch (N)
    pub fz: f64,
    /// Static loaded radius (m)
    pub r_stat: f64,
    /// Dynamic rolling radius (m)
    pub r_dyn: f64,
    /// Contact point velocity along the wheel heading (m/s)
    pub vx: f64,
    /// Contact point velocity perpendicular to the wheel heading (m/s)
    pub vy: f64,
    /// Road wheel steer angle (rad)
    pub steer: f64,
    pub kinematic_slip_x: f64,
    pub kinematic_slip_y: f64,
    /// Relaxed (transient) longitudinal slip
    pub slip_x: f64,
    /// Relaxed (transient) lateral slip
    pub slip_y: f64,
    pub fx: f64,
    pub fy: f64,
    /// Drive torque delivered to this wheel on the last step (N·m)
    pub drive_torque: f64,
    /// Set once the loaded radius had to be clamped; keeps the warning to one per wheel
    pub degenerate: bool,
}

// Powertrain Traits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gear {
    Reverse,
    Neutral,
    /// Forward gear, 1-based
    Forward(u8),
}

impl Gear {
    /// Signed gear number as written to output (-1 reverse, 0 neutral).
    pub fn number(self) -> i32 {
        match self {
            Gear::Reverse => -1,
            Gear::Neutral => 0,
            Gear::Forward(k) => k as i32,
        }
    }
}

impl Default for Gear {
    fn default() -> Self {
        Gear::Forward(1)
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gear::Reverse => f.write_str("R"),
            Gear::Neutral => f.write_str("N"),
            Gear::Forward(k) => write!(f, "{k}"),
        }
    }
}

// Body Traits
#[derive(Debug, Clone, Copy, Default)]
pub struct VehicleState {
    pub x: f64,
    pub y: f64,
    /// Heading (yaw angle)
    pub psi: f64,
    /// Roll angle, positive rolls the right side down
    pub phi: f64,
    /// Body-frame longitudinal velocity
    pub u: f64,
    /// Body-frame lateral velocity
    pub v: f64,
    pub wz: f64,
    pub wx: f64,
    /// Last body-frame derivatives, used for load transfer on the next step
    pub udot: f64,
    pub vdot: f64,

    pub gear: Gear,
    /// Time since the last gear change (s)
    pub time_in_gear: f64,
    pub crank_omega: f64,
    pub engine_torque: f64,
    pub tc_input_torque: f64,
    pub tc_output_torque: f64,
    pub tc_output_omega: f64,
    pub speed_ratio: f64,
    /// Total drive torque delivered to the wheels on the last step
    pub wheel_torque: f64,
}

impl VehicleState {
    pub fn with_speed(mut self, u: f64) -> Self {
        self.u = u;
        self
    }

    pub fn with_gear(mut self, gear: Gear) -> Self {
        self.gear = gear;
        self
    }

    /// Longitudinal acceleration in the inertial sense (rotating-frame term removed).
    pub fn longitudinal_acceleration(&self) -> f64 {
        self.udot - self.v * self.wz
    }

    /// Lateral acceleration in the inertial sense (centripetal term included).
    pub fn lateral_acceleration(&self) -> f64 {
        self.vdot + self.u * self.wz
    }
}

// General Traits
#[derive(Debug, Clone, Copy, Default)]
pub struct SimState {
    pub vehicle: VehicleState,
    pub tires: [TMeasyState; WHEEL_COUNT],
    pub controls: DriverControls,
}

impl SimState {
    pub fn tire(&self, wheel: WheelId) -> &TMeasyState {
        &self.tires[wheel.index()]
    }

    pub fn tire_mut(&mut self, wheel: WheelId) -> &mut TMeasyState {
        &mut self.tires[wheel.index()]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SimContext {
    pub dt: f64,
    pub t: f64,
}

pub trait MechanicsModel {
    fn step_physics(&self, ctx: SimContext, state: &mut SimState) -> Result<(), SimError>;
}

pub trait PowertrainModel {
    fn step_powertrain(&self, ctx: SimContext, state: &mut SimState) -> Result<(), SimError>;
}
