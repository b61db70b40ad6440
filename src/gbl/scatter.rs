//! Highland multiple-scattering model
//!
//! Scattering kicks enter the fit as precision (inverse variance) values.
//! Sensors are thin scatterers with the full kick at the plane; each air
//! gap is approximated by two discrete kicks that together carry the gap's
//! scattering variance.

use nalgebra::Vector2;

/// Fractional positions of the two air-gap scatterers within a gap.
pub const AIR_SPLIT: (f64, f64) = (0.21, 0.79);

/// Highland RMS scattering angle (rad) for a single scatterer of thickness
/// `x_over_x0`, with the logarithmic correction evaluated on the track's
/// total traversed budget `total_x_over_x0`.
pub fn highland_theta(beam_energy_gev: f64, x_over_x0: f64, total_x_over_x0: f64) -> f64 {
    debug_assert!(beam_energy_gev > 0.0);
    if x_over_x0 <= 0.0 {
        return 0.0;
    }
    let total = total_x_over_x0.max(x_over_x0);
    0.0136 / beam_energy_gev * x_over_x0.sqrt() * (1.0 + 0.038 * total.ln())
}

/// Precision of a thin (sensor) scatterer: 1/theta^2 on both axes.
pub fn thin_scatterer_precision(theta: f64) -> Vector2<f64> {
    let p = 1.0 / (theta * theta);
    Vector2::new(p, p)
}

/// Precision of one of the two air-gap kicks: the gap variance theta^2 is
/// split evenly, so each kick carries variance theta^2 / 2.
pub fn thick_scatterer_precision(theta_gap: f64) -> Vector2<f64> {
    let p = 2.0 / (theta_gap * theta_gap);
    Vector2::new(p, p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highland_reference_value() {
        // 0.68 permille of X0 (50 um silicon) at 4 GeV, total budget 5 permille:
        // theta = 0.0136/4 * sqrt(6.8e-4) * (1 + 0.038 ln(5e-3))
        let theta = highland_theta(4.0, 6.8e-4, 5.0e-3);
        let expected = 0.0136 / 4.0 * (6.8e-4_f64).sqrt() * (1.0 + 0.038 * (5.0e-3_f64).ln());
        assert!((theta - expected).abs() < 1e-15);
        assert!(theta > 0.0);
    }

    #[test]
    fn test_theta_scales_inversely_with_energy() {
        let t2 = highland_theta(2.0, 1e-3, 1e-2);
        let t4 = highland_theta(4.0, 1e-3, 1e-2);
        assert!((t2 / t4 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_budget_gives_zero_theta() {
        assert_eq!(highland_theta(4.0, 0.0, 1e-2), 0.0);
    }

    #[test]
    fn test_air_kicks_sum_to_gap_variance() {
        let theta = 1e-4;
        let p = thick_scatterer_precision(theta);
        // Two kicks of variance 1/p each must add up to theta^2.
        let total_variance = 2.0 / p.x;
        assert!((total_variance - theta * theta).abs() < 1e-20);
    }

    #[test]
    fn test_thin_precision() {
        let p = thin_scatterer_precision(2e-4);
        assert!((p.x - 1.0 / 4e-8).abs() < 1e-3);
        assert_eq!(p.x, p.y);
    }
}
