//! Closed-form pricing of European vanillas.

mod pricer;

pub use pricer::AnalyticalPricer;
