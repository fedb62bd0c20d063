//! Greeks engine.
//!
//! Closed-form sensitivities come from the pricer when it has them
//! ([`Pricer::analytical_greeks`](crate::Pricer::analytical_greeks)); every
//! other method is differentiated by central finite differences over
//! revalued scenarios that reuse the same pricer object.

mod config;
mod engine;
mod result;

pub use config::GreeksConfig;
pub use engine::GreeksEngine;
pub use result::{GreekSet, GreeksSource};
