//! Tests for the analysis layer: flow-density reductions, curve fitting
//! through the collaborator traits, and peak location

use traffic_simulator_core_rs::analysis::{density, flow, split_by_regime};
use traffic_simulator_core_rs::{
    CurveFitter, CurveModel, FitError, GoldenSectionMinimizer, LeastSquaresFitter, Minimizer,
    Polynomial, SimulationParams, SlowdownProbability, SweepAxis, SweepConfig, SweepDriver,
};

#[test]
fn test_density_and_flow_conversions() {
    assert_eq!(density(30, 100), 0.3);
    assert_eq!(density(100, 100), 1.0);

    // 10 vehicles covering 3 cells each over 99 transitions
    assert_eq!(flow(2970, 100, 100), 0.297);
    assert_eq!(flow(0, 50, 10), 0.0);
}

#[test]
fn test_line_fit_recovers_exact_slope() {
    let x: Vec<f64> = (0..12).map(f64::from).collect();
    let y: Vec<f64> = x.iter().map(|xi| 1.5 * xi - 2.0).collect();

    let params = LeastSquaresFitter::default()
        .fit(&Polynomial::new(1), &x, &y)
        .unwrap();
    assert!((params[0] + 2.0).abs() < 1e-8);
    assert!((params[1] - 1.5).abs() < 1e-8);
}

#[test]
fn test_constant_model_fits_the_mean() {
    let y = [3.0, 4.0, 5.0];
    let params = LeastSquaresFitter::default()
        .fit(&Polynomial::new(0), &[1.0, 2.0, 3.0], &y)
        .unwrap();
    assert!((params[0] - 4.0).abs() < 1e-8);
}

#[test]
fn test_quintic_recovery_on_unit_interval() {
    let model = Polynomial::new(5);
    let truth = [0.1, 3.0, -1.0, 2.0, -4.0, 1.5];
    let x: Vec<f64> = (0..=20).map(|i| f64::from(i) / 20.0).collect();
    let y: Vec<f64> = x.iter().map(|&xi| model.eval(xi, &truth)).collect();

    let params = LeastSquaresFitter::default().fit(&model, &x, &y).unwrap();
    for (fitted, expected) in params.iter().zip(&truth) {
        assert!(
            (fitted - expected).abs() < 1e-8,
            "{} vs {}",
            fitted,
            expected
        );
    }
}

#[test]
fn test_wide_range_quintic_needs_rescaling() {
    // Raw vehicle counts in the hundreds make the quintic normal
    // equations numerically singular; mapping x onto [0, 1] first makes
    // the same fit routine succeed.
    let model = Polynomial::new(5);
    let x: Vec<f64> = (0..=20).map(|i| 55.0 + 22.5 * f64::from(i)).collect();
    let y: Vec<f64> = x
        .iter()
        .map(|&xi| {
            let t = (xi - 55.0) / 450.0;
            model.eval(t, &[0.1, 3.0, -1.0, 2.0, -4.0, 1.5])
        })
        .collect();

    let fitter = LeastSquaresFitter::default();
    assert_eq!(fitter.fit(&model, &x, &y), Err(FitError::SingularSystem));

    let rescaled: Vec<f64> = x.iter().map(|&xi| (xi - 55.0) / 450.0).collect();
    let params = fitter.fit(&model, &rescaled, &y).unwrap();
    for (&xi, &yi) in rescaled.iter().zip(&y) {
        assert!((model.eval(xi, &params) - yi).abs() < 1e-8);
    }
}

#[test]
fn test_negated_objective_finds_fitted_peak() {
    // Fit a downward parabola, then locate its maximum by minimizing the
    // negated model. y = x(1 - x) peaks at 1/2.
    let model = Polynomial::new(2);
    let x: Vec<f64> = (0..=10).map(|i| f64::from(i) / 10.0).collect();
    let y: Vec<f64> = x.iter().map(|&xi| xi * (1.0 - xi)).collect();

    let params = LeastSquaresFitter::default().fit(&model, &x, &y).unwrap();
    let argmax = GoldenSectionMinimizer::default()
        .minimize(&|t| -model.eval(t, &params), 0.2)
        .unwrap();
    assert!((argmax - 0.5).abs() < 1e-6, "peak at {}", argmax);
}

#[test]
fn test_regime_split_of_deterministic_diagram() {
    // Without random slowdown the diagram is a clean triangle: flow
    // rises with density on the free-flow side of the split and falls
    // on the congested side.
    let base = SimulationParams::new(100, 200, 3, 1, 31415)
        .with_slow_probability(SlowdownProbability::never());
    let config = SweepConfig {
        base,
        axis: SweepAxis::VehicleCount(vec![10, 20, 25, 40, 60, 80]),
    };

    let points = SweepDriver::new(config).run().flow_density_points();
    let (free_flow, congested) = split_by_regime(&points, 3);

    // Critical density 1/4: the 0.25 point lands on the free-flow side
    assert_eq!(free_flow.len(), 3);
    assert_eq!(congested.len(), 3);

    assert!(free_flow.windows(2).all(|p| p[0].flow < p[1].flow));
    assert!(congested.windows(2).all(|p| p[0].flow > p[1].flow));
}
