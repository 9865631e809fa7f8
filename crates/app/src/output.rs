//! Per-step output records and the sinks that receive them.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use simcore::{SimError, SimState, WheelId, WHEEL_COUNT};

/// Column names, in the order written by [`CsvSink`].
pub const COLUMNS: [&str; 21] = [
    "time",
    "x",
    "y",
    "u",
    "v",
    "phi",
    "psi",
    "wx",
    "wz",
    "wlf",
    "wrf",
    "wlr",
    "wrr",
    "spl_tor",
    "current_gear",
    "engine_omega",
    "engine_torque",
    "tc_inp_tor",
    "tc_out_tor",
    "tc_out_omg",
    "tc_sr",
];

/// Snapshot of the quantities written for one output step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutputRecord {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub u: f64,
    pub v: f64,
    pub phi: f64,
    pub psi: f64,
    pub wx: f64,
    pub wz: f64,
    /// Wheel spin rates in `lf, rf, lr, rr` order
    pub wheel_omega: [f64; WHEEL_COUNT],
    /// Drive torque applied at each wheel
    pub wheel_torque: [f64; WHEEL_COUNT],
    pub current_gear: i32,
    pub engine_omega: f64,
    pub engine_torque: f64,
    pub tc_input_torque: f64,
    pub tc_output_torque: f64,
    pub tc_output_omega: f64,
    pub tc_speed_ratio: f64,
}

impl OutputRecord {
    pub fn from_state(time: f64, state: &SimState) -> Self {
        let v = &state.vehicle;
        OutputRecord {
            time,
            x: v.x,
            y: v.y,
            u: v.u,
            v: v.v,
            phi: v.phi,
            psi: v.psi,
            wx: v.wx,
            wz: v.wz,
            wheel_omega: WheelId::ALL.map(|w| state.tire(w).omega),
            wheel_torque: WheelId::ALL.map(|w| state.tire(w).drive_torque),
            current_gear: v.gear.number(),
            engine_omega: v.crank_omega,
            engine_torque: v.engine_torque,
            tc_input_torque: v.tc_input_torque,
            tc_output_torque: v.tc_output_torque,
            tc_output_omega: v.tc_output_omega,
            tc_speed_ratio: v.speed_ratio,
        }
    }

    /// Torque shown in the `spl_tor` column: total drive torque per wheel.
    pub fn applied_torque(&self) -> f64 {
        self.wheel_torque.iter().sum::<f64>() / WHEEL_COUNT as f64
    }
}

/// Receives output records while a run progresses.
pub trait OutputSink {
    fn record(&mut self, record: &OutputRecord) -> Result<(), SimError>;

    /// Called once after the last record.
    fn finish(&mut self) -> Result<(), SimError> {
        Ok(())
    }
}

impl OutputSink for Vec<OutputRecord> {
    fn record(&mut self, record: &OutputRecord) -> Result<(), SimError> {
        self.push(*record);
        Ok(())
    }
}

/// Comma separated text with a header row.
pub struct CsvSink<W: Write> {
    writer: W,
    header_written: bool,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        CsvSink {
            writer,
            header_written: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl CsvSink<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let file = File::create(path)?;
        Ok(CsvSink::new(BufWriter::new(file)))
    }
}

impl<W: Write> OutputSink for CsvSink<W> {
    fn record(&mut self, r: &OutputRecord) -> Result<(), SimError> {
        if !self.header_written {
            writeln!(self.writer, "{}", COLUMNS.join(","))?;
            self.header_written = true;
        }

        let [wlf, wrf, wlr, wrr] = r.wheel_omega;
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            r.time,
            r.x,
            r.y,
            r.u,
            r.v,
            r.phi,
            r.psi,
            r.wx,
            r.wz,
            wlf,
            wrf,
            wlr,
            wrr,
            r.applied_torque(),
            r.current_gear,
            r.engine_omega,
            r.engine_torque,
            r.tc_input_torque,
            r.tc_output_torque,
            r.tc_output_omega,
            r.tc_speed_ratio,
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SimError> {
        self.writer.flush()?;
        Ok(())
    }
}
