//! Integration tests for market snapshots, surface construction and solvers.

use approx::assert_relative_eq;
use proptest::prelude::*;

use pricer_core::market_data::{
    continuous_rate, MarketEnvironment, SurfaceInterpolation, VolQuote, VolSurfaceBuilder,
    VolatilitySurface,
};
use pricer_core::math::solvers::{BoxBounds, BrentSolver, LevenbergMarquardtSolver};

// ================================================================
// Surface construction feeding a market environment
// ================================================================

fn scattered_quotes() -> Vec<VolQuote> {
    vec![
        VolQuote::new(80.0, 0.25, 0.32),
        VolQuote::new(100.0, 0.25, 0.25),
        VolQuote::new(120.0, 0.25, 0.27),
        VolQuote::new(80.0, 1.0, 0.29),
        VolQuote::new(120.0, 1.0, 0.24),
        VolQuote::new(100.0, 2.0, 0.21),
    ]
}

#[test]
fn test_built_surface_drives_environment() {
    let surface = VolSurfaceBuilder::new().build(&scattered_quotes()).unwrap();
    assert_eq!(surface.strikes(), &[80.0, 100.0, 120.0]);
    assert_eq!(surface.expiries(), &[0.25, 1.0, 2.0]);
    assert!(surface.nodes().all(|v| v.is_finite() && v > 0.0));

    let env = MarketEnvironment::new(100.0, continuous_rate(0.03), 0.01, surface).unwrap();
    assert_relative_eq!(env.volatility_for(100.0, 0.25).unwrap(), 0.25, epsilon = 1e-12);
    assert_relative_eq!(env.volatility_for(120.0, 1.0).unwrap(), 0.24, epsilon = 1e-12);

    // Flat extrapolation beyond the grid
    let far = env.volatility_for(200.0, 5.0).unwrap();
    assert!(far.is_finite() && far > 0.0);
}

#[test]
fn test_surface_bump_is_parallel() {
    let surface = VolSurfaceBuilder::new()
        .interpolation(SurfaceInterpolation::Bilinear)
        .build(&scattered_quotes())
        .unwrap();
    let env = MarketEnvironment::new(100.0, 0.03, 0.0, surface).unwrap();
    let bumped = env.bump_volatility(0.01).unwrap();

    for &(k, t) in &[(80.0, 0.25), (100.0, 1.0), (110.0, 1.5)] {
        let base = env.volatility_for(k, t).unwrap();
        let up = bumped.volatility_for(k, t).unwrap();
        assert_relative_eq!(up - base, 0.01, epsilon = 1e-12);
    }
}

#[test]
fn test_builder_rejects_extrapolation_when_disabled() {
    let surface = VolSurfaceBuilder::new()
        .allow_extrapolation(false)
        .build(&scattered_quotes())
        .unwrap();
    assert!(surface.volatility(60.0, 1.0).is_err());
    assert!(surface.volatility(100.0, 1.0).is_ok());
}

// ================================================================
// Solvers
// ================================================================

#[test]
fn test_brent_inverts_black_scholes_like_function() {
    // Monotone in sigma like an option price
    let target = 0.2_f64.sqrt();
    let f = |sigma: f64| sigma.sqrt() - target;
    let root = BrentSolver::with_defaults().find_root(f, 1e-7, 4.0).unwrap();
    assert_relative_eq!(root, 0.2, epsilon = 1e-8);
}

#[test]
fn test_levenberg_marquardt_bounded_fit() {
    let strikes = [80.0, 90.0, 100.0, 110.0, 120.0];
    let observed: Vec<f64> = strikes.iter().map(|k| 0.2 + 0.001 * (k - 100.0)).collect();
    let residuals = |p: &[f64]| -> Vec<f64> {
        strikes
            .iter()
            .zip(&observed)
            .map(|(k, obs)| p[0] + p[1] * (k - 100.0) - obs)
            .collect()
    };

    let bounds = BoxBounds::new(vec![1e-4, -1.0], vec![5.0, 1.0]).unwrap();
    let result = LevenbergMarquardtSolver::with_defaults()
        .with_bounds(bounds)
        .solve(residuals, vec![0.5, 0.0])
        .unwrap();

    assert!(result.converged);
    assert_relative_eq!(result.params[0], 0.2, epsilon = 1e-8);
    assert_relative_eq!(result.params[1], 0.001, epsilon = 1e-8);
}

// ================================================================
// Properties
// ================================================================

proptest! {
    #[test]
    fn prop_bumps_never_mutate_baseline(
        spot in 1.0_f64..1000.0,
        rate in -0.02_f64..0.1,
        sigma in 0.01_f64..1.0,
        shift in 0.0_f64..0.5,
    ) {
        let env = MarketEnvironment::flat(spot, rate, 0.0, sigma).unwrap();
        let _ = env.bump_spot(shift).unwrap();
        let _ = env.bump_rate(shift).unwrap();
        let _ = env.bump_volatility(shift).unwrap();
        prop_assert_eq!(env.spot(), spot);
        prop_assert_eq!(env.rate(), rate);
        prop_assert_eq!(env.volatility_for(100.0, 1.0).unwrap(), sigma);
    }

    #[test]
    fn prop_total_variance_surface_is_positive(
        v1 in 0.05_f64..0.8,
        v2 in 0.05_f64..0.8,
        v3 in 0.05_f64..0.8,
        k in 50.0_f64..150.0,
        t in 0.01_f64..3.0,
    ) {
        let quotes = [
            VolQuote::new(90.0, 0.5, v1),
            VolQuote::new(110.0, 0.5, v2),
            VolQuote::new(100.0, 1.5, v3),
        ];
        let surface = VolSurfaceBuilder::new().build(&quotes).unwrap();
        let vol = surface.volatility(k, t).unwrap();
        prop_assert!(vol.is_finite() && vol > 0.0);
    }

    #[test]
    fn prop_forward_matches_discount_ratio(
        spot in 1.0_f64..1000.0,
        rate in -0.02_f64..0.1,
        q in 0.0_f64..0.08,
        t in 0.01_f64..5.0,
    ) {
        let env = MarketEnvironment::flat(spot, rate, q, 0.2).unwrap();
        let ratio = spot * env.dividend_discount(t) / env.discount_factor(t);
        prop_assert!((env.forward(t) - ratio).abs() <= 1e-9 * ratio);
    }
}
