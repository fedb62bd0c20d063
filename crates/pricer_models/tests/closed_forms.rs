//! Property tests for the Black-Scholes-Merton closed forms and payoffs.

use approx::assert_relative_eq;
use pricer_models::analytical::{geometric_asian_price, AsianSampling, BlackScholes};
use pricer_models::instruments::{
    Averaging, BarrierType, Instrument, InstrumentKind, OptionType, PathPayoff,
};
use proptest::prelude::*;

// ============================================================================
// Reference values
// ============================================================================

#[test]
fn test_reference_scenario() {
    let bs = BlackScholes::new(100.0, 0.05, 0.0, 0.2).unwrap();
    let call = Instrument::new(InstrumentKind::EuropeanCall, 100.0, 1.0).unwrap();
    let price = bs.price(call.option_type(), call.strike(), call.maturity());
    assert_relative_eq!(price, 10.4506, epsilon = 1e-3);
}

#[test]
fn test_geometric_asian_below_vanilla() {
    let bs = BlackScholes::new(100.0, 0.03, 0.0, 0.3).unwrap();
    for fixings in [4, 12, 52] {
        let asian = geometric_asian_price(
            &bs,
            OptionType::Call,
            100.0,
            1.0,
            AsianSampling::Discrete { fixings },
        )
        .unwrap();
        assert!(asian > 0.0);
        assert!(asian < bs.price_call(100.0, 1.0));
    }
}

#[test]
fn test_exotic_payoffs_are_non_negative() {
    let payoffs = [
        PathPayoff::Asian {
            option_type: OptionType::Put,
            averaging: Averaging::Geometric,
        },
        PathPayoff::Barrier {
            option_type: OptionType::Call,
            barrier_type: BarrierType::DownOut,
            barrier: 80.0,
        },
    ];
    let path = [100.0, 85.0, 79.0, 120.0];
    for payoff in payoffs {
        let instrument = Instrument::exotic(payoff, 100.0, 1.0).unwrap();
        assert!(instrument.payoff_on_path(&path) >= 0.0);
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_put_call_parity(
        spot in 20.0..200.0_f64,
        strike in 20.0..200.0_f64,
        rate in -0.02..0.10_f64,
        q in 0.0..0.08_f64,
        vol in 0.05..0.8_f64,
        t in 0.05..5.0_f64,
    ) {
        let bs = BlackScholes::new(spot, rate, q, vol).unwrap();
        let lhs = bs.price_call(strike, t) - bs.price_put(strike, t);
        let rhs = spot * (-q * t).exp() - strike * (-rate * t).exp();
        prop_assert!((lhs - rhs).abs() < 1e-6 * (1.0 + spot + strike));
    }

    #[test]
    fn prop_prices_and_vanilla_greeks_well_signed(
        spot in 20.0..200.0_f64,
        strike in 20.0..200.0_f64,
        vol in 0.05..0.8_f64,
        t in 0.05..5.0_f64,
    ) {
        let bs = BlackScholes::new(spot, 0.03, 0.01, vol).unwrap();
        for option_type in [OptionType::Call, OptionType::Put] {
            let greeks = bs.greeks(option_type, strike, t);
            prop_assert!(bs.price(option_type, strike, t) >= 0.0);
            prop_assert!(greeks.gamma >= 0.0);
            prop_assert!(greeks.vega >= 0.0);
            match option_type {
                OptionType::Call => prop_assert!((0.0..=1.0).contains(&greeks.delta)),
                OptionType::Put => prop_assert!((-1.0..=0.0).contains(&greeks.delta)),
            }
        }
    }

    #[test]
    fn prop_call_at_least_discounted_forward_intrinsic(
        spot in 50.0..150.0_f64,
        strike in 50.0..150.0_f64,
        t in 0.1..3.0_f64,
    ) {
        let bs = BlackScholes::new(spot, 0.04, 0.0, 0.25).unwrap();
        let lower = (spot - strike * (-0.04 * t).exp()).max(0.0);
        prop_assert!(bs.price_call(strike, t) >= lower - 1e-4);
    }
}
