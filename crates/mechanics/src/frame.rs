//! Transforms between the vehicle body frame and the four tire frames.
//!
//! The body frame has x forward, y left and z up. Each tire frame is the body
//! frame rotated about z by the wheel's steer angle and translated to the
//! contact point.

use nalgebra::{Rotation2, Vector2};
use simcore::{DriverControls, TMeasyState, VehicleState, WheelId, WHEEL_COUNT};

use crate::vehicle::{normal_loads, ChassisParams};

/// Contact-point kinematics and load of one wheel, expressed in its tire frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactKinematics {
    pub vx: f64,
    pub vy: f64,
    pub steer: f64,
    pub fz: f64,
}

/// Net tire forces on the body, in the vehicle frame at the centre of gravity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyForces {
    pub fx: f64,
    pub fy: f64,
    /// Yaw moment about the centre of gravity
    pub mz: f64,
}

/// Road wheel angles for a steering command. Rear wheels are never steered.
pub fn steer_angles(controls: &DriverControls, params: &ChassisParams) -> [f64; WHEEL_COUNT] {
    let front = controls.steering * params.max_steer;
    WheelId::ALL.map(|wheel| if wheel.is_front() { front } else { 0.0 })
}

/// Rotate a vehicle-frame vector into a tire frame steered by `steer`.
pub fn to_tire_frame(vector: Vector2<f64>, steer: f64) -> Vector2<f64> {
    Rotation2::new(steer).inverse() * vector
}

/// Rotate a tire-frame vector back into the vehicle frame; inverse of [`to_tire_frame`].
pub fn to_vehicle_frame(vector: Vector2<f64>, steer: f64) -> Vector2<f64> {
    Rotation2::new(steer) * vector
}

/// Contact velocities and loads of all four wheels for the current body state.
///
/// The contact point velocity is the body velocity plus the yaw-rate lever arm
/// `wz x r`, rotated by the negative steer angle into the tire frame.
pub fn vehicle_to_tire_frame(
    state: &VehicleState,
    params: &ChassisParams,
    controls: &DriverControls,
) -> [ContactKinematics; WHEEL_COUNT] {
    let loads = normal_loads(state, params);
    let steer = steer_angles(controls, params);

    WheelId::ALL.map(|wheel| {
        let i = wheel.index();
        let [rx, ry] = params.wheel_position(wheel);
        let contact_velocity = Vector2::new(state.u - state.wz * ry, state.v + state.wz * rx);
        let local = to_tire_frame(contact_velocity, steer[i]);

        ContactKinematics {
            vx: local.x,
            vy: local.y,
            steer: steer[i],
            fz: loads[i],
        }
    })
}

/// Write contact kinematics into the tire states ahead of the tire step.
pub fn apply_contact(tires: &mut [TMeasyState; WHEEL_COUNT], contacts: &[ContactKinematics; WHEEL_COUNT]) {
    for (tire, contact) in tires.iter_mut().zip(contacts) {
        tire.vx = contact.vx;
        tire.vy = contact.vy;
        tire.steer = contact.steer;
        tire.fz = contact.fz;
    }
}

/// Sum the four tire forces into net body force and yaw moment.
///
/// Each `(fx, fy)` pair is rotated back by its steer angle; the moment uses
/// `r x F = rx * Fy - ry * Fx`.
pub fn tire_to_vehicle_frame(tires: &[TMeasyState; WHEEL_COUNT], params: &ChassisParams) -> BodyForces {
    let mut net = BodyForces::default();

    for wheel in WheelId::ALL {
        let tire = &tires[wheel.index()];
        let force = to_vehicle_frame(Vector2::new(tire.fx, tire.fy), tire.steer);
        let [rx, ry] = params.wheel_position(wheel);

        net.fx += force.x;
        net.fy += force.y;
        net.mz += rx * force.y - ry * force.x;
    }

    net
}
