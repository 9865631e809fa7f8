//! Driver input time series
//!
//! A run is driven by a table of `(time, steering, throttle, brake)` samples.
//! Between samples the commands are interpolated linearly; before the first and
//! after the last sample they hold the boundary value.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use simcore::{ConfigError, DriverControls};

/// One row of the driver input table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriverEntry {
    pub time: f64,
    pub steering: f64,
    pub throttle: f64,
    pub brake: f64,
}

impl DriverEntry {
    pub fn new(time: f64, steering: f64, throttle: f64, brake: f64) -> Self {
        DriverEntry {
            time,
            steering,
            throttle,
            brake,
        }
    }

    fn controls(&self) -> DriverControls {
        DriverControls::new(self.steering, self.throttle, self.brake)
    }
}

/// Time-ordered driver commands, immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverInput {
    entries: Vec<DriverEntry>,
}

impl DriverInput {
    /// Builds a series from entries, sorting them by time and clamping each
    /// command to its range. Times must be finite and distinct.
    pub fn from_entries(mut entries: Vec<DriverEntry>) -> Result<Self, ConfigError> {
        if let Some(bad) = entries.iter().find(|e| !e.time.is_finite()) {
            return Err(ConfigError::invalid(
                "driver_input.time",
                format!("non-finite time {}", bad.time),
            ));
        }
        entries.sort_by(|a, b| a.time.total_cmp(&b.time));
        if let Some(w) = entries.windows(2).find(|w| w[0].time == w[1].time) {
            return Err(ConfigError::invalid(
                "driver_input.time",
                format!("duplicate sample at t = {}", w[0].time),
            ));
        }

        let entries = entries
            .into_iter()
            .map(|e| {
                let c = e.controls();
                DriverEntry::new(e.time, c.steering, c.throttle, c.brake)
            })
            .collect();
        Ok(DriverInput { entries })
    }

    /// Constant commands for the whole run.
    pub fn constant(controls: DriverControls) -> Self {
        let c = controls.clamped();
        DriverInput {
            entries: vec![DriverEntry::new(0.0, c.steering, c.throttle, c.brake)],
        }
    }

    /// Parses whitespace-separated `time steering throttle brake` lines.
    /// Blank lines and lines starting with `#` are skipped.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut entries = Vec::new();

        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields = line
                .split_whitespace()
                .map(|field| {
                    field.parse::<f64>().map_err(|err| ConfigError::MalformedInput {
                        line: i + 1,
                        reason: format!("`{field}`: {err}"),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let [time, steering, throttle, brake] = fields[..] else {
                return Err(ConfigError::MalformedInput {
                    line: i + 1,
                    reason: format!("expected 4 columns, found {}", fields.len()),
                });
            };
            entries.push(DriverEntry::new(time, steering, throttle, brake));
        }

        Self::from_entries(entries)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let input = Self::parse(&text)?;
        debug!("loaded {} driver input samples from {}", input.len(), path.display());
        Ok(input)
    }

    pub fn entries(&self) -> &[DriverEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time of the last sample, or zero for an empty series.
    pub fn end_time(&self) -> f64 {
        self.entries.last().map_or(0.0, |e| e.time)
    }

    /// Commands at time `t`.
    pub fn sample(&self, t: f64) -> DriverControls {
        let (first, last) = match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return DriverControls::default(),
        };
        if t <= first.time {
            return first.controls();
        }
        if t >= last.time {
            return last.controls();
        }

        let hi = self.entries.partition_point(|e| e.time <= t);
        let (a, b) = (&self.entries[hi - 1], &self.entries[hi]);
        let frac = (t - a.time) / (b.time - a.time);
        let lerp = |x: f64, y: f64| x + frac * (y - x);

        DriverControls::new(
            lerp(a.steering, b.steering),
            lerp(a.throttle, b.throttle),
            lerp(a.brake, b.brake),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Write;

    fn ramp() -> DriverInput {
        DriverInput::from_entries(vec![
            DriverEntry::new(0.0, 0.0, 0.0, 0.0),
            DriverEntry::new(1.0, 0.5, 1.0, 0.0),
            DriverEntry::new(3.0, -0.5, 0.0, 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_sample_interpolates() {
        let input = ramp();
        let c = input.sample(0.5);
        assert_abs_diff_eq!(c.steering, 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(c.throttle, 0.5, epsilon = 1e-12);

        let c = input.sample(2.0);
        assert_abs_diff_eq!(c.steering, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.throttle, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(c.brake, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_hits_knots_exactly() {
        let input = ramp();
        assert_eq!(input.sample(1.0), DriverControls::new(0.5, 1.0, 0.0));
    }

    #[test]
    fn test_sample_holds_ends() {
        let input = ramp();
        assert_eq!(input.sample(-4.0), DriverControls::default());
        assert_eq!(input.sample(100.0), DriverControls::new(-0.5, 0.0, 1.0));
        assert_abs_diff_eq!(input.end_time(), 3.0);
    }

    #[test]
    fn test_empty_series_samples_zero() {
        let input = DriverInput::default();
        assert!(input.is_empty());
        assert_eq!(input.sample(1.0), DriverControls::default());
    }

    #[test]
    fn test_entries_are_sorted_and_clamped() {
        let input = DriverInput::from_entries(vec![
            DriverEntry::new(2.0, 3.0, 1.5, -1.0),
            DriverEntry::new(0.0, 0.0, 0.0, 0.0),
        ])
        .unwrap();

        assert_eq!(input.entries()[0].time, 0.0);
        assert_eq!(input.entries()[1], DriverEntry::new(2.0, 1.0, 1.0, 0.0));
    }

    #[test]
    fn test_rejects_duplicate_times() {
        let result = DriverInput::from_entries(vec![
            DriverEntry::new(1.0, 0.0, 0.0, 0.0),
            DriverEntry::new(1.0, 0.1, 0.0, 0.0),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = "# time steering throttle brake\n\n0.0 0.0 0.0 0.0\n  1.0\t0.1  0.8 0.0\n";
        let input = DriverInput::parse(text).unwrap();
        assert_eq!(input.len(), 2);
        assert_abs_diff_eq!(input.sample(1.0).throttle, 0.8);
    }

    #[test]
    fn test_parse_reports_line_numbers() {
        let err = DriverInput::parse("0 0 0 0\n1 0 zero 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedInput { line: 2, .. }));

        let err = DriverInput::parse("0 0 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedInput { line: 1, .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0.0 0.0 0.0 0.0").unwrap();
        writeln!(file, "2.0 0.0 1.0 0.0").unwrap();

        let input = DriverInput::load(file.path()).unwrap();
        assert_abs_diff_eq!(input.sample(1.0).throttle, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_load_missing_file() {
        let err = DriverInput::load("/nonexistent/driver/input.txt").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_constant() {
        let input = DriverInput::constant(DriverControls::new(0.0, 1.0, 0.0));
        assert_eq!(input.sample(12.0).throttle, 1.0);
    }
}
