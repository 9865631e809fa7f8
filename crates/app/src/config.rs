//! JSON parameter files.
//!
//! Every field has a default, so a file only needs the values that differ from
//! the built-in mid-size sedan. Parameters are validated before a run starts.

use std::fs;
use std::path::Path;

use log::debug;
use mechanics::{ChassisParams, TMeasyParams};
use powertrain::PowertrainParams;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use simcore::{require_positive, ConfigError};

/// Everything about the vehicle except its tires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    /// Integration step (s), shared by the body, tire and powertrain models
    pub step: f64,
    pub chassis: ChassisParams,
    pub powertrain: PowertrainParams,
}

impl Default for VehicleParams {
    fn default() -> Self {
        VehicleParams {
            step: 1e-3,
            chassis: ChassisParams::default(),
            powertrain: PowertrainParams::default(),
        }
    }
}

impl VehicleParams {
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("step", self.step)?;
        self.chassis.validate()?;
        self.powertrain.validate()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_vehicle_params(path: impl AsRef<Path>) -> Result<VehicleParams, ConfigError> {
    let path = path.as_ref();
    let params: VehicleParams = read_json(path)?;
    params.validate()?;
    debug!("loaded vehicle parameters from {}", path.display());
    Ok(params)
}

pub fn load_tire_params(path: impl AsRef<Path>) -> Result<TMeasyParams, ConfigError> {
    let path = path.as_ref();
    let params: TMeasyParams = read_json(path)?;
    params.validate()?;
    debug!("loaded tire parameters from {}", path.display());
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn json_file(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_vehicle_file_uses_defaults() {
        let file = json_file(r#"{"step": 0.0005, "chassis": {"mass": 1800.0, "sprung_mass": 1600.0}}"#);
        let params = load_vehicle_params(file.path()).unwrap();

        assert_eq!(params.step, 0.0005);
        assert_eq!(params.chassis.mass, 1800.0);
        assert_eq!(params.chassis.cg_to_front, ChassisParams::default().cg_to_front);
        assert_eq!(params.powertrain, PowertrainParams::default());
    }

    #[test]
    fn test_invalid_vehicle_values_are_rejected() {
        let file = json_file(r#"{"step": -0.001}"#);
        let err = load_vehicle_params(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "step"));

        let file = json_file(r#"{"powertrain": {"gearbox": {"forward_ratios": []}}}"#);
        assert!(matches!(load_vehicle_params(file.path()), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_bad_curve_is_a_parse_error() {
        let file = json_file(r#"{"powertrain": {"engine": {"full_throttle": [[100.0, 1.0], [0.0, 2.0]]}}}"#);
        assert!(matches!(load_vehicle_params(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_malformed_json() {
        let file = json_file("{ not json");
        assert!(matches!(load_tire_params(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_tire_params("/nonexistent/tire.json"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_tire_file() {
        let file = json_file(r#"{"unloaded_radius": 0.35, "road_friction": 0.9}"#);
        let params = load_tire_params(file.path()).unwrap();
        assert_eq!(params.unloaded_radius, 0.35);
        assert_eq!(params.road_friction, 0.9);
        assert_eq!(params.nominal_load, TMeasyParams::default().nominal_load);
    }

    #[test]
    fn test_defaults_validate() {
        assert!(VehicleParams::default().validate().is_ok());
    }
}
