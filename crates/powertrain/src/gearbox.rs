//! Automatic gearbox: ratios, shift schedule and the gear state machine.

use log::warn;
use serde::{Deserialize, Serialize};
use simcore::{require_non_negative, require_positive, ConfigError, Gear, SimError};

/// Crank speeds (rad/s) that trigger shifts out of one forward gear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShiftPoint {
    /// Upshift speed with the throttle closed
    pub upshift_light: f64,
    /// Upshift speed at full throttle
    pub upshift_full: f64,
    pub downshift: f64,
}

impl ShiftPoint {
    pub fn new(downshift: f64, upshift_light: f64, upshift_full: f64) -> Self {
        ShiftPoint {
            upshift_light,
            upshift_full,
            downshift,
        }
    }

    /// Upshift speed interpolated on throttle position.
    pub fn upshift_speed(&self, throttle: f64) -> f64 {
        let throttle = throttle.clamp(0.0, 1.0);
        self.upshift_light + throttle * (self.upshift_full - self.upshift_light)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GearboxParams {
    /// Forward ratios, first gear first
    pub forward_ratios: Vec<f64>,
    /// Magnitude of the reverse ratio; the sign is applied by [`GearboxParams::ratio`]
    pub reverse_ratio: f64,
    pub final_drive: f64,
    /// Mechanical efficiency from turbine to wheels
    pub efficiency: f64,
    /// One entry per forward gear
    pub shift_points: Vec<ShiftPoint>,
    /// Minimum time spent in a gear before the next shift (s)
    pub shift_delay: f64,
}

impl Default for GearboxParams {
    fn default() -> Self {
        let forward_ratios = vec![3.5, 2.1, 1.4, 1.0, 0.75];
        let shift_points = vec![ShiftPoint::new(150.0, 250.0, 580.0); forward_ratios.len()];
        GearboxParams {
            forward_ratios,
            reverse_ratio: 3.2,
            final_drive: 3.5,
            efficiency: 0.92,
            shift_points,
            shift_delay: 0.5,
        }
    }
}

impl GearboxParams {
    pub fn gear_count(&self) -> usize {
        self.forward_ratios.len()
    }

    /// Gearbox ratio of `gear`, signed so reverse turns the wheels backwards.
    pub fn ratio(&self, gear: Gear) -> f64 {
        match gear {
            Gear::Reverse => -self.reverse_ratio,
            Gear::Neutral => 0.0,
            Gear::Forward(k) => self
                .forward_ratios
                .get(usize::from(k).wrapping_sub(1))
                .copied()
                .unwrap_or(0.0),
        }
    }

    /// Gearbox ratio times final drive.
    pub fn overall_ratio(&self, gear: Gear) -> f64 {
        self.ratio(gear) * self.final_drive
    }

    /// Gear for a signed gear number (-1 reverse, 0 neutral, k forward).
    pub fn select(&self, requested: i32) -> Result<Gear, SimError> {
        match requested {
            -1 => Ok(Gear::Reverse),
            0 => Ok(Gear::Neutral),
            k if k >= 1 && (k as usize) <= self.gear_count() => Ok(Gear::Forward(k as u8)),
            _ => Err(SimError::InvalidGearTransition {
                requested,
                gears: self.gear_count(),
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.forward_ratios.is_empty() {
            return Err(ConfigError::invalid(
                "gearbox.forward_ratios",
                "at least one forward gear is required",
            ));
        }
        if self.forward_ratios.len() > u8::MAX as usize {
            return Err(ConfigError::invalid("gearbox.forward_ratios", "too many gears"));
        }
        for (i, ratio) in self.forward_ratios.iter().enumerate() {
            require_positive(&format!("gearbox.forward_ratios[{i}]"), *ratio)?;
        }
        require_positive("gearbox.reverse_ratio", self.reverse_ratio)?;
        require_positive("gearbox.final_drive", self.final_drive)?;
        require_non_negative("gearbox.shift_delay", self.shift_delay)?;
        if !(self.efficiency > 0.0 && self.efficiency <= 1.0) {
            return Err(ConfigError::invalid(
                "gearbox.efficiency",
                format!("must lie in (0, 1], got {}", self.efficiency),
            ));
        }
        if self.shift_points.len() != self.forward_ratios.len() {
            return Err(ConfigError::invalid(
                "gearbox.shift_points",
                format!(
                    "expected {} entries, one per forward gear, got {}",
                    self.forward_ratios.len(),
                    self.shift_points.len()
                ),
            ));
        }
        for (i, point) in self.shift_points.iter().enumerate() {
            if !(point.downshift >= 0.0
                && point.downshift < point.upshift_light
                && point.upshift_light <= point.upshift_full)
            {
                return Err(ConfigError::invalid(
                    format!("gearbox.shift_points[{i}]"),
                    "expected 0 <= downshift < upshift_light <= upshift_full",
                ));
            }
        }
        Ok(())
    }
}

/// Resolve a requested gear number.
///
/// Out-of-range requests are a programming error: debug builds report
/// [`SimError::InvalidGearTransition`], release builds clamp into range and warn.
pub fn checked_gear(requested: i32, gearbox: &GearboxParams) -> Result<Gear, SimError> {
    match gearbox.select(requested) {
        Ok(gear) => Ok(gear),
        Err(err) if cfg!(debug_assertions) => Err(err),
        Err(err) => {
            let clamped = requested.clamp(-1, gearbox.gear_count() as i32);
            warn!("{err}; using gear {clamped}");
            gearbox.select(clamped)
        }
    }
}

/// Next gear given the crank speed and throttle at the start of a step.
///
/// Reverse and Neutral are held. A forward gear moves up one when the crank
/// exceeds the throttle-dependent upshift speed and down one when it drops
/// below the downshift speed; at most one shift happens per call.
pub fn next_gear(
    gear: Gear,
    crank_omega: f64,
    throttle: f64,
    gearbox: &GearboxParams,
) -> Result<Gear, SimError> {
    let k = match gear {
        Gear::Forward(k) => i32::from(k),
        held => return Ok(held),
    };
    let Some(point) = usize::try_from(k - 1).ok().and_then(|i| gearbox.shift_points.get(i)) else {
        return checked_gear(k, gearbox);
    };

    let requested = if (k as usize) < gearbox.gear_count() && crank_omega > point.upshift_speed(throttle) {
        k + 1
    } else if k > 1 && crank_omega < point.downshift {
        k - 1
    } else {
        k
    };
    checked_gear(requested, gearbox)
}
