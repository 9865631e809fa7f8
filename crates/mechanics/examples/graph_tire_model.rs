use mechanics::tire::{tire_advance, TMeasyParams};
use plotters::prelude::*;
use simcore::{TMeasyState, WheelId};

const LOADS: [f64; 3] = [2000.0, 4000.0, 8000.0];
const COLORS: [RGBColor; 3] = [BLUE, RED, GREEN];

fn draw_series(
    filename: &str,
    title: &str,
    x_label: &str,
    y_label: &str,
    series: &[(String, Vec<(f64, f64)>)],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(filename, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let points = || series.iter().flat_map(|(_, s)| s.iter().copied());
    let x_min = points().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_max = points().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let y_min = points().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let y_max = points().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("Arial", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart.configure_mesh().x_desc(x_label).y_desc(y_label).draw()?;

    for ((label, data), color) in series.iter().zip(COLORS) {
        chart
            .draw_series(LineSeries::new(data.iter().copied(), &color))?
            .label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));
    }

    chart.configure_series_labels().border_style(&BLACK).draw()?;

    root.present()?;
    Ok(())
}

/// Steady-state force for a contact velocity and spin, without relaxation lag.
fn steady_force(params: &TMeasyParams, fz: f64, vx: f64, vy: f64, slip_ratio: f64) -> (f64, f64) {
    let r_stat = params.unloaded_radius - fz / params.vertical_stiffness;
    let r_dyn = (2.0 * params.unloaded_radius + r_stat) / 3.0;
    let mut tire = TMeasyState {
        fz,
        vx,
        vy,
        omega: (slip_ratio + 1.0) * vx / r_dyn,
        ..Default::default()
    };
    tire_advance(WheelId::FrontLeft, &mut tire, params, 0.001);
    (tire.fx, tire.fy)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let params = TMeasyParams::default().with_relaxation_lengths(0.0, 0.0);
    let vx = 10.0;

    // 1) Lateral force vs slip angle at zero slip ratio
    let lateral: Vec<_> = LOADS
        .iter()
        .map(|&fz| {
            let data = (-30..=30)
                .map(|d| {
                    let alpha = f64::from(d).to_radians();
                    (f64::from(d), steady_force(&params, fz, vx, -alpha.tan() * vx, 0.0).1)
                })
                .collect();
            (format!("Fz = {fz} N"), data)
        })
        .collect();

    draw_series(
        "lateral_vs_slip_angle.png",
        "Lateral Force vs Slip Angle",
        "Slip Angle [deg]",
        "Lateral Force Fy [N]",
        &lateral,
    )?;

    // 2) Longitudinal force vs slip ratio at zero slip angle
    let n = 301;
    let longitudinal: Vec<_> = LOADS
        .iter()
        .map(|&fz| {
            let data = (0..n)
                .map(|i| {
                    let kappa = -0.5 + i as f64 / (n - 1) as f64;
                    (kappa, steady_force(&params, fz, vx, 0.0, kappa).0)
                })
                .collect();
            (format!("Fz = {fz} N"), data)
        })
        .collect();

    draw_series(
        "longitudinal_vs_slip_ratio.png",
        "Longitudinal Force vs Slip Ratio",
        "Slip Ratio [-]",
        "Longitudinal Force Fx [N]",
        &longitudinal,
    )?;

    println!("Wrote plots: lateral_vs_slip_angle.png, longitudinal_vs_slip_ratio.png");

    Ok(())
}
