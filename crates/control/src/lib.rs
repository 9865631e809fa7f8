//! Driver commands for the vehicle simulator
//!
//! This crate provides:
//! - Loading of driver input tables from text files
//! - Time interpolation of steering, throttle and brake

pub mod driver_input;

pub use driver_input::{DriverEntry, DriverInput};
