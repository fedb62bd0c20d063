//! Engine settings loaded from a TOML file drive every component.

use pricer_core::market_data::MarketEnvironment;
use pricer_models::instruments::{Instrument, OptionType};
use pricer_optimiser::calibration::{CalibrationTarget, ParameterBounds, VolatilityModel};
use pricer_optimiser::settings::{EngineSettings, SettingsError};
use pricer_pricing::{GreeksSource, Pricer, PricingMethod};

const SETTINGS: &str = r#"
lattice_steps = 400

[monte_carlo]
n_paths = 5000
n_steps = 12
seed = 11
antithetic = true

[greeks]
use_analytical = false
parallel = false

[calibrator]
optimiser = "nelder_mead"
parallel = false

[calibrator.nelder_mead]
max_iterations = 400
tolerance = 1e-9

[implied_vol]
accuracy = 1e-8
lattice_steps = 300
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn write_settings(name: &str, contents: &str) -> std::path::PathBuf {
    let file = format!("pricer_optimiser_{}_{name}.toml", std::process::id());
    let path = std::env::temp_dir().join(file);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_components_follow_file_settings() {
    init_tracing();
    let path = write_settings("components", SETTINGS);
    let settings = EngineSettings::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let env = MarketEnvironment::flat(100.0, 0.05, 0.0, 0.2).unwrap();
    let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();

    let mc = settings.monte_carlo_pricer().unwrap();
    assert_eq!(mc.seed(), 11);
    let priced = mc.price(&call, &env).unwrap();
    assert_eq!(priced.diagnostic("paths"), Some(5000.0));
    assert_eq!(priced.diagnostic("antithetic"), Some(1.0));

    let lattice = settings.lattice_pricer();
    let priced = lattice.price(&call, &env).unwrap();
    assert_eq!(priced.diagnostic("steps"), Some(400.0));

    let greeks = settings
        .greeks_engine()
        .unwrap()
        .compute(&lattice, &call, &env)
        .unwrap();
    assert_eq!(greeks.source, GreeksSource::FiniteDifference);
    assert_eq!(greeks.method, PricingMethod::Lattice);

    assert_eq!(settings.implied_vol_solver().unwrap().config().lattice_steps, 300);
}

#[test]
fn test_calibrator_from_settings() {
    init_tracing();
    let settings = EngineSettings::from_toml_str(SETTINGS).unwrap();
    let calibrator = settings.calibrator().unwrap();
    assert!(!calibrator.config().parallel);

    let base = MarketEnvironment::flat(100.0, 0.05, 0.0, 0.2).unwrap();
    let truth = VolatilityModel::Flat.environment(&base, &[0.31]).unwrap();
    let lattice = settings.lattice_pricer();
    let quotes = [95.0, 105.0].map(|k| {
        let put = Instrument::american(OptionType::Put, k, 1.0).unwrap();
        (put, lattice.price(&put, &truth).unwrap().price)
    });
    let target = CalibrationTarget::from_prices(quotes).unwrap();

    let result = calibrator
        .calibrate(
            &target,
            &lattice,
            &base,
            &VolatilityModel::Flat,
            &[0.2],
            &[ParameterBounds::new(0.05, 1.0).unwrap()],
        )
        .unwrap();
    assert!(result.converged);
    assert!((result.parameters[0] - 0.31).abs() < 1e-4);
}

#[test]
fn test_invalid_file_is_reported() {
    let path = write_settings("invalid", "[implied_vol]\nmin_vol = 5.0\n");
    let err = EngineSettings::from_file(&path).unwrap_err();
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(err, SettingsError::Invalid(_)));
}
