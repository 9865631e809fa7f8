//! TMeasy tire model
//!
//! Semi-empirical handling tire after Rill. Each wheel carries two transient
//! slip states that relax towards the kinematic slip over a relaxation length.
//! The relaxed slips are combined into a single normalised slip and mapped to a
//! force magnitude through a characteristic curve built from initial stiffness,
//! peak and sliding friction. All characteristic data is given at the nominal
//! load and at twice the nominal load and interpolated linearly in load.
//!
//! Near standstill the relaxed slips stop being meaningful, so the force is
//! blended into a slip-velocity damping force capped at the peak force.

use log::warn;
use serde::{Deserialize, Serialize};

use simcore::{
    require_non_negative, require_positive, ConfigError, MechanicsModel, SimContext, SimError,
    SimState, TMeasyState, WheelId,
};

/// Relaxed slips are held inside this band; the characteristic is flat well before it.
const SLIP_SATURATION: f64 = 2.0;
/// Keeps the rational part of the characteristic curve free of poles.
const MAX_SHAPE_FACTOR: f64 = 3.99;
const MIN_SHAPE_FACTOR: f64 = 1e-6;
const MIN_LOAD: f64 = 1e-3;

/// Force-vs-slip characteristic in one direction, given at `[pn, 2*pn]`.
///
/// Friction and stiffness values are coefficients per unit normal load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlipCurve {
    /// Initial slope dF/ds divided by load
    pub stiffness: [f64; 2],
    pub peak_friction: [f64; 2],
    pub peak_slip: [f64; 2],
    pub slide_friction: [f64; 2],
    pub slide_slip: [f64; 2],
}

impl SlipCurve {
    pub fn longitudinal() -> Self {
        SlipCurve {
            stiffness: [30.0, 25.0],
            peak_friction: [1.0, 0.95],
            peak_slip: [0.10, 0.12],
            slide_friction: [0.80, 0.75],
            slide_slip: [0.60, 0.80],
        }
    }

    pub fn lateral() -> Self {
        SlipCurve {
            stiffness: [20.0, 18.0],
            peak_friction: [0.95, 0.90],
            peak_slip: [0.15, 0.17],
            slide_friction: [0.80, 0.75],
            slide_slip: [0.80, 1.00],
        }
    }

    /// Characteristic in force units at normal load `fz`.
    pub fn at_load(&self, fz: f64, nominal_load: f64, friction_scale: f64) -> CurvePoint {
        let q = fz / nominal_load - 1.0;
        let lerp = |v: [f64; 2]| v[0] + (v[1] - v[0]) * q;

        let fm = lerp(self.peak_friction).max(0.0) * friction_scale * fz;
        let fs = (lerp(self.slide_friction).max(0.0) * friction_scale * fz).min(fm);
        let sm = lerp(self.peak_slip).max(1e-4);
        let ss = lerp(self.slide_slip).max(sm + 1e-4);
        let df0 = lerp(self.stiffness).max(1e-6) * fz;

        CurvePoint { df0, fm, sm, fs, ss }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        for i in 0..2 {
            require_positive(&format!("{name}.stiffness[{i}]"), self.stiffness[i])?;
            require_positive(&format!("{name}.peak_friction[{i}]"), self.peak_friction[i])?;
            require_positive(&format!("{name}.peak_slip[{i}]"), self.peak_slip[i])?;
            require_non_negative(&format!("{name}.slide_friction[{i}]"), self.slide_friction[i])?;

            if self.slide_friction[i] > self.peak_friction[i] {
                return Err(ConfigError::invalid(
                    format!("{name}.slide_friction[{i}]"),
                    "sliding friction exceeds peak friction",
                ));
            }
            if self.slide_slip[i] <= self.peak_slip[i] {
                return Err(ConfigError::invalid(
                    format!("{name}.slide_slip[{i}]"),
                    "sliding slip must be larger than peak slip",
                ));
            }
            let shape = self.stiffness[i] * self.peak_slip[i] / self.peak_friction[i];
            if shape >= 4.0 {
                return Err(ConfigError::invalid(
                    format!("{name}.stiffness[{i}]"),
                    format!("stiffness * peak_slip / peak_friction = {shape:.3} must stay below 4"),
                ));
            }
        }
        Ok(())
    }
}

/// Characteristic curve data at one load, in force units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    /// Initial slope (N per unit slip)
    pub df0: f64,
    /// Peak force (N)
    pub fm: f64,
    /// Slip at peak force
    pub sm: f64,
    /// Sliding force (N)
    pub fs: f64,
    /// Slip where full sliding starts
    pub ss: f64,
}

/// Tire parameters shared by all four wheels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TMeasyParams {
    /// Unloaded radius (m)
    pub unloaded_radius: f64,
    /// Vertical stiffness (N/m)
    pub vertical_stiffness: f64,
    /// Nominal load `pn` the characteristic data refers to (N)
    pub nominal_load: f64,
    pub longitudinal: SlipCurve,
    pub lateral: SlipCurve,
    /// Longitudinal relaxation length (m), zero disables the transient lag
    pub relaxation_length_x: f64,
    /// Lateral relaxation length (m)
    pub relaxation_length_y: f64,
    /// Road friction scale applied to peak and sliding friction (1.0 = nominal surface)
    pub road_friction: f64,
    /// Added to the transport velocity so slips stay finite at standstill (m/s)
    pub velocity_floor: f64,
    /// Lower bound on the loaded radius as a fraction of the unloaded radius
    pub min_radius_fraction: f64,
    /// Contact speed below which the low-speed damping force takes over (m/s), zero disables it
    pub low_speed_threshold: f64,
    /// Slip velocity at which the low-speed force reaches the peak force (m/s)
    pub damping_slip_velocity: f64,
}

impl Default for TMeasyParams {
    fn default() -> Self {
        TMeasyParams {
            unloaded_radius: 0.33,
            vertical_stiffness: 250_000.0,
            nominal_load: 4000.0,
            longitudinal: SlipCurve::longitudinal(),
            lateral: SlipCurve::lateral(),
            relaxation_length_x: 0.3,
            relaxation_length_y: 0.3,
            road_friction: 1.0,
            velocity_floor: 0.1,
            min_radius_fraction: 0.5,
            low_speed_threshold: 1.0,
            damping_slip_velocity: 0.5,
        }
    }
}

impl TMeasyParams {
    pub fn with_road_friction(mut self, scale: f64) -> Self {
        self.road_friction = scale;
        self
    }

    pub fn with_relaxation_lengths(mut self, longitudinal: f64, lateral: f64) -> Self {
        self.relaxation_length_x = longitudinal;
        self.relaxation_length_y = lateral;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("unloaded_radius", self.unloaded_radius)?;
        require_positive("vertical_stiffness", self.vertical_stiffness)?;
        require_positive("nominal_load", self.nominal_load)?;
        require_non_negative("relaxation_length_x", self.relaxation_length_x)?;
        require_non_negative("relaxation_length_y", self.relaxation_length_y)?;
        require_positive("road_friction", self.road_friction)?;
        require_positive("velocity_floor", self.velocity_floor)?;
        require_positive("min_radius_fraction", self.min_radius_fraction)?;
        require_non_negative("low_speed_threshold", self.low_speed_threshold)?;
        require_positive("damping_slip_velocity", self.damping_slip_velocity)?;
        if self.min_radius_fraction > 1.0 {
            return Err(ConfigError::invalid("min_radius_fraction", "must not exceed 1"));
        }
        self.longitudinal.validate("longitudinal")?;
        self.lateral.validate("lateral")
    }

    /// Static loaded radius from the linear vertical spring.
    ///
    /// Fails with [`SimError::DegenerateTireState`] when the deflection would
    /// reach or pass the wheel centre.
    pub fn loaded_radius(&self, wheel: WheelId, fz: f64) -> Result<f64, SimError> {
        let radius = self.unloaded_radius - fz / self.vertical_stiffness;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SimError::DegenerateTireState { wheel, radius });
        }
        Ok(radius.clamp(self.min_radius(), self.unloaded_radius))
    }

    pub fn min_radius(&self) -> f64 {
        self.min_radius_fraction * self.unloaded_radius
    }

    /// Peak longitudinal and lateral force at load `fz`; the axes of the friction ellipse.
    pub fn peak_forces(&self, fz: f64) -> (f64, f64) {
        let cx = self.longitudinal.at_load(fz, self.nominal_load, self.road_friction);
        let cy = self.lateral.at_load(fz, self.nominal_load, self.road_friction);
        (cx.fm, cy.fm)
    }
}

/// Characteristic curve: rational rise to the peak, smooth blend down to the
/// sliding force, then constant.
pub fn characteristic(s: f64, c: &CurvePoint) -> f64 {
    if s <= 0.0 || c.fm <= 0.0 {
        return 0.0;
    }

    if s <= c.sm {
        let sn = s / c.sm;
        let shape = (c.df0 * c.sm / c.fm).clamp(MIN_SHAPE_FACTOR, MAX_SHAPE_FACTOR);
        c.fm * shape * sn / (1.0 + sn * (sn + shape - 2.0))
    } else if s < c.ss {
        let sigma = (s - c.sm) / (c.ss - c.sm);
        c.fm - (c.fm - c.fs) * sigma * sigma * (3.0 - 2.0 * sigma)
    } else {
        c.fs
    }
}

/// Combined-slip force from the relaxed slips.
///
/// Both slips are normalised so that the peaks of the two directions line up,
/// then a single characteristic is evaluated along the combined slip direction.
pub fn combined_forces(sx: f64, sy: f64, cx: &CurvePoint, cy: &CurvePoint) -> (f64, f64) {
    let x_ratio = cx.fm / cx.df0;
    let y_ratio = cy.fm / cy.df0;
    let sx_hat = cx.sm / (cx.sm + cy.sm) + x_ratio / (x_ratio + y_ratio);
    let sy_hat = cy.sm / (cx.sm + cy.sm) + y_ratio / (x_ratio + y_ratio);

    let sxn = sx / sx_hat;
    let syn = sy / sy_hat;
    let s = sxn.hypot(syn);
    if !(s > 1e-12) {
        return (0.0, 0.0);
    }
    let cos = sxn / s;
    let sin = syn / s;

    let combined = CurvePoint {
        df0: (cx.df0 * sx_hat * cos).hypot(cy.df0 * sy_hat * sin),
        fm: (cx.fm * cos).hypot(cy.fm * sin),
        sm: (cx.sm / sx_hat * cos).hypot(cy.sm / sy_hat * sin),
        fs: (cx.fs * cos).hypot(cy.fs * sin),
        ss: (cx.ss / sx_hat * cos).hypot(cy.ss / sy_hat * sin),
    };

    let f = characteristic(s, &combined);
    (f * cos, f * sin)
}

/// Scale both components by the same factor so the force lies inside the
/// friction ellipse with semi-axes `fx_max`, `fy_max`.
pub fn elliptically_scale_forces(fx: f64, fy: f64, fx_max: f64, fy_max: f64) -> (f64, f64) {
    if fx_max <= 0.0 || fy_max <= 0.0 {
        return (0.0, 0.0);
    }
    let combined = (fx / fx_max).hypot(fy / fy_max);
    if combined > 1.0 {
        (fx / combined, fy / combined)
    } else {
        (fx, fy)
    }
}

/// Weight of the low-speed force: one at standstill, zero from `threshold` up.
fn low_speed_weight(speed: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 {
        return 0.0;
    }
    let x = (speed / threshold).clamp(0.0, 1.0);
    1.0 - x * x * (3.0 - 2.0 * x)
}

fn relax(current: f64, target: f64, transport_velocity: f64, relaxation_length: f64, dt: f64) -> f64 {
    let relaxed = if relaxation_length <= 0.0 {
        target
    } else {
        // Explicit update, gain capped at one so a large step cannot overshoot
        let gain = (dt * transport_velocity / relaxation_length).min(1.0);
        current + gain * (target - current)
    };
    relaxed.clamp(-SLIP_SATURATION, SLIP_SATURATION)
}

/// Advance one wheel by one step.
///
/// Expects `fz`, `vx`, `vy` and `steer` to have been written by the frame
/// transform for this step. Updates radii, slips and `fx`/`fy`; the spin rate
/// is left to the powertrain.
pub fn tire_advance(wheel: WheelId, tire: &mut TMeasyState, params: &TMeasyParams, dt: f64) {
    let fz = tire.fz.max(0.0);

    tire.r_stat = match params.loaded_radius(wheel, fz) {
        Ok(radius) => radius,
        Err(err) => {
            if !tire.degenerate {
                warn!("{err}; clamping to {:.4} m", params.min_radius());
                tire.degenerate = true;
            }
            params.min_radius()
        }
    };
    tire.r_dyn = (2.0 * params.unloaded_radius + tire.r_stat) / 3.0;

    let surface_speed = tire.omega * tire.r_dyn;
    let transport_velocity = tire.vx.abs().max(surface_speed.abs()) + params.velocity_floor;

    tire.kinematic_slip_x = ((surface_speed - tire.vx) / transport_velocity)
        .clamp(-SLIP_SATURATION, SLIP_SATURATION);
    tire.kinematic_slip_y = (-tire.vy / transport_velocity).clamp(-SLIP_SATURATION, SLIP_SATURATION);

    tire.slip_x = relax(
        tire.slip_x,
        tire.kinematic_slip_x,
        transport_velocity,
        params.relaxation_length_x,
        dt,
    );
    tire.slip_y = relax(
        tire.slip_y,
        tire.kinematic_slip_y,
        transport_velocity,
        params.relaxation_length_y,
        dt,
    );

    if fz < MIN_LOAD {
        tire.fx = 0.0;
        tire.fy = 0.0;
        return;
    }

    let cx = params.longitudinal.at_load(fz, params.nominal_load, params.road_friction);
    let cy = params.lateral.at_load(fz, params.nominal_load, params.road_friction);
    let (mut fx, mut fy) = combined_forces(tire.slip_x, tire.slip_y, &cx, &cy);

    let weight = low_speed_weight(tire.vx.hypot(tire.vy), params.low_speed_threshold);
    if weight > 0.0 {
        let damped_x = (cx.fm / params.damping_slip_velocity * (surface_speed - tire.vx)).clamp(-cx.fm, cx.fm);
        let damped_y = (-cy.fm / params.damping_slip_velocity * tire.vy).clamp(-cy.fm, cy.fm);
        fx += weight * (damped_x - fx);
        fy += weight * (damped_y - fy);
    }
    let (fx, fy) = elliptically_scale_forces(fx, fy, cx.fm, cy.fm);

    tire.fx = fx;
    tire.fy = fy;
}

/// The four TMeasy tires of the vehicle, sharing one parameter set.
#[derive(Debug, Clone, Default)]
pub struct TMeasyTire {
    pub params: TMeasyParams,
}

impl TMeasyTire {
    pub fn new(params: TMeasyParams) -> Self {
        TMeasyTire { params }
    }
}

impl MechanicsModel for TMeasyTire {
    #[cfg(not(feature = "parallel"))]
    fn step_physics(&self, ctx: SimContext, state: &mut SimState) -> Result<(), SimError> {
        for wheel in WheelId::ALL {
            tire_advance(wheel, state.tire_mut(wheel), &self.params, ctx.dt);
        }
        Ok(())
    }

    #[cfg(feature = "parallel")]
    fn step_physics(&self, ctx: SimContext, state: &mut SimState) -> Result<(), SimError> {
        use rayon::prelude::*;

        // Wheels own disjoint state; the join at the end of for_each is the barrier
        state.tires[..]
            .par_iter_mut()
            .zip(WheelId::ALL[..].par_iter())
            .for_each(|(tire, &wheel)| tire_advance(wheel, tire, &self.params, ctx.dt));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn loaded_tire(fz: f64, vx: f64, vy: f64, omega: f64) -> TMeasyState {
        TMeasyState {
            fz,
            vx,
            vy,
            omega,
            ..Default::default()
        }
    }

    #[test]
    fn test_free_rolling_tire_has_no_force() {
        let params = TMeasyParams::default();
        let r_stat = params.loaded_radius(WheelId::FrontLeft, 4000.0).unwrap();
        let r_dyn = (2.0 * params.unloaded_radius + r_stat) / 3.0;
        let mut tire = loaded_tire(4000.0, 10.0, 0.0, 10.0 / r_dyn);

        for _ in 0..100 {
            tire_advance(WheelId::FrontLeft, &mut tire, &params, 0.001);
        }
        assert_abs_diff_eq!(tire.fx, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(tire.fy, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_drive_slip_pushes_forward_and_lateral_slip_opposes_motion() {
        let params = TMeasyParams::default().with_relaxation_lengths(0.0, 0.0);
        let mut tire = loaded_tire(4000.0, 10.0, -0.5, 40.0);
        tire_advance(WheelId::RearLeft, &mut tire, &params, 0.001);

        assert!(tire.fx > 0.0, "fx = {}", tire.fx);
        assert!(tire.fy > 0.0, "fy = {}", tire.fy);
    }

    #[test]
    fn test_relaxation_lags_kinematic_slip() {
        let params = TMeasyParams::default();
        let mut tire = loaded_tire(4000.0, 10.0, 1.0, 10.0 / 0.32);
        tire_advance(WheelId::FrontRight, &mut tire, &params, 0.001);

        // gain = dt * vt / L ~ 0.033
        assert!(tire.slip_y.abs() < tire.kinematic_slip_y.abs());
        assert!(tire.slip_y < 0.0);

        for _ in 0..2000 {
            tire_advance(WheelId::FrontRight, &mut tire, &params, 0.001);
        }
        assert_abs_diff_eq!(tire.slip_y, tire.kinematic_slip_y, epsilon = 1e-9);
    }

    #[test]
    fn test_characteristic_shape() {
        let c = SlipCurve::longitudinal().at_load(4000.0, 4000.0, 1.0);
        assert_abs_diff_eq!(c.fm, 4000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.fs, 3200.0, epsilon = 1e-9);

        assert_abs_diff_eq!(characteristic(c.sm, &c), c.fm, epsilon = 1e-9);
        assert_abs_diff_eq!(characteristic(c.ss, &c), c.fs, epsilon = 1e-9);
        assert_abs_diff_eq!(characteristic(5.0, &c), c.fs, epsilon = 1e-9);

        // initial slope matches the stiffness
        let s = 1e-6;
        assert_abs_diff_eq!(characteristic(s, &c) / s, c.df0, epsilon = c.df0 * 1e-3);

        for i in 0..=1000 {
            let s = i as f64 * 0.002;
            assert!(characteristic(s, &c) <= c.fm + 1e-9);
        }
    }

    #[test]
    fn test_load_interpolation_hits_reference_points() {
        let curve = SlipCurve::lateral();
        let at_pn = curve.at_load(4000.0, 4000.0, 1.0);
        let at_2pn = curve.at_load(8000.0, 4000.0, 1.0);
        assert_abs_diff_eq!(at_pn.fm, 0.95 * 4000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(at_2pn.fm, 0.90 * 8000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(at_2pn.sm, 0.17, epsilon = 1e-12);

        let scaled = curve.at_load(4000.0, 4000.0, 0.5);
        assert_abs_diff_eq!(scaled.fm, 0.5 * at_pn.fm, epsilon = 1e-9);
    }

    #[test]
    fn test_combined_force_stays_inside_friction_ellipse() {
        let params = TMeasyParams::default();
        let slips = [-2.0, -1.0, -0.4, -0.15, -0.05, 0.0, 0.03, 0.1, 0.2, 0.5, 1.2, 2.0];

        for &fz in &[500.0, 2000.0, 4000.0, 7000.0, 12000.0] {
            let (fx_max, fy_max) = params.peak_forces(fz);
            let cx = params.longitudinal.at_load(fz, params.nominal_load, params.road_friction);
            let cy = params.lateral.at_load(fz, params.nominal_load, params.road_friction);
            for &sx in &slips {
                for &sy in &slips {
                    let (fx, fy) = combined_forces(sx, sy, &cx, &cy);
                    let (fx, fy) = elliptically_scale_forces(fx, fy, cx.fm, cy.fm);

                    let ellipse = (fx / fx_max).hypot(fy / fy_max);
                    assert!(ellipse <= 1.0 + 1e-9, "ellipse {ellipse} at fz={fz} sx={sx} sy={sy}");
                    assert!(fx.hypot(fy) <= fx_max.max(fy_max) * (1.0 + 1e-9));
                }
            }
        }
    }

    #[test]
    fn test_advanced_tire_respects_friction_limit() {
        let params = TMeasyParams::default().with_road_friction(0.9);
        let fz = 3500.0;
        let (fx_max, fy_max) = params.peak_forces(fz);

        for &(vx, vy, omega) in &[
            (0.0, 0.0, 50.0),
            (20.0, -3.0, 0.0),
            (5.0, 5.0, 100.0),
            (-4.0, 1.0, 10.0),
            (0.0, 2.0, 0.0),
        ] {
            let mut tire = loaded_tire(fz, vx, vy, omega);
            for _ in 0..500 {
                tire_advance(WheelId::RearRight, &mut tire, &params, 0.001);
                assert!((tire.fx / fx_max).hypot(tire.fy / fy_max) <= 1.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_force_direction_preserved_by_ellipse_scaling() {
        let (fx, fy) = elliptically_scale_forces(3000.0, 4000.0, 2000.0, 2000.0);
        assert_abs_diff_eq!(fx / fy, 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(fx.hypot(fy), 2000.0, epsilon = 1e-9);

        let (fx, fy) = elliptically_scale_forces(100.0, -50.0, 2000.0, 2000.0);
        assert_eq!((fx, fy), (100.0, -50.0));
    }

    #[test]
    fn test_loaded_radius_and_degenerate_clamp() {
        let params = TMeasyParams::default();
        let r = params.loaded_radius(WheelId::FrontLeft, 2500.0).unwrap();
        assert_abs_diff_eq!(r, 0.33 - 0.01, epsilon = 1e-12);

        // unloaded wheel never grows past r0
        let r = params.loaded_radius(WheelId::FrontLeft, -1000.0).unwrap();
        assert_abs_diff_eq!(r, 0.33);

        let err = params.loaded_radius(WheelId::RearLeft, 1.0e6).unwrap_err();
        assert!(matches!(err, SimError::DegenerateTireState { wheel: WheelId::RearLeft, .. }));

        let mut tire = loaded_tire(1.0e6, 1.0, 0.0, 0.0);
        tire_advance(WheelId::RearLeft, &mut tire, &params, 0.001);
        assert!(tire.degenerate);
        assert_abs_diff_eq!(tire.r_stat, params.min_radius());
        assert!(tire.r_dyn > 0.0 && tire.r_dyn <= params.unloaded_radius);
    }

    #[test]
    fn test_standstill_is_finite() {
        let params = TMeasyParams::default();
        let mut tire = loaded_tire(4000.0, 0.0, 0.0, 0.0);
        tire_advance(WheelId::FrontLeft, &mut tire, &params, 0.001);
        assert_eq!(tire.fx, 0.0);
        assert_eq!(tire.fy, 0.0);
        assert!(tire.kinematic_slip_x.is_finite());
    }

    #[test]
    fn test_low_speed_force_damps_slip_velocity() {
        let params = TMeasyParams::default();
        let (fx_max, _) = params.peak_forces(4000.0);

        // locked wheel creeping forward after a stop with a sliding slip history
        let mut tire = loaded_tire(4000.0, 0.05, 0.0, 0.0);
        tire.slip_x = -1.0;
        tire_advance(WheelId::FrontLeft, &mut tire, &params, 0.001);
        assert!(tire.fx < 0.0);
        assert!(tire.fx.abs() < 0.2 * fx_max, "fx = {}", tire.fx);

        // at rest the stale slip history produces no force
        let mut tire = loaded_tire(4000.0, 0.0, 0.0, 0.0);
        tire.slip_x = -1.0;
        tire_advance(WheelId::FrontLeft, &mut tire, &params, 0.001);
        assert_eq!(tire.fx, 0.0);
    }

    #[test]
    fn test_low_speed_weight() {
        assert_eq!(low_speed_weight(0.0, 1.0), 1.0);
        assert_eq!(low_speed_weight(1.0, 1.0), 0.0);
        assert_eq!(low_speed_weight(5.0, 1.0), 0.0);
        assert_abs_diff_eq!(low_speed_weight(0.5, 1.0), 0.5);
        assert_eq!(low_speed_weight(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_unloaded_wheel_has_no_force() {
        let params = TMeasyParams::default();
        let mut tire = loaded_tire(0.0, 10.0, 2.0, 0.0);
        tire_advance(WheelId::FrontLeft, &mut tire, &params, 0.001);
        assert_eq!((tire.fx, tire.fy), (0.0, 0.0));
    }

    #[test]
    fn test_default_params_validate() {
        assert!(TMeasyParams::default().validate().is_ok());

        let mut bad = TMeasyParams::default();
        bad.longitudinal.slide_slip = [0.05, 0.8];
        assert!(bad.validate().is_err());

        let mut bad = TMeasyParams::default();
        bad.lateral.stiffness = [40.0, 18.0];
        assert!(bad.validate().is_err());
    }
}
