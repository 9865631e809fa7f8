pub mod frame;
pub mod tire;
pub mod vehicle;

pub use frame::{apply_contact, tire_to_vehicle_frame, vehicle_to_tire_frame, BodyForces, ContactKinematics};
pub use tire::{tire_advance, SlipCurve, TMeasyParams, TMeasyTire};
pub use vehicle::{check_state, normal_loads, ChassisParams, SanityBounds, VehicleBody};
