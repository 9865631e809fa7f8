//! Simulation driver, parameter files and output for the vehicle simulator.

pub mod config;
pub mod output;
pub mod simulator;

pub use config::{load_tire_params, load_vehicle_params, VehicleParams};
pub use output::{CsvSink, OutputRecord, OutputSink};
pub use simulator::{RunSummary, Simulator};
