//! Recombining binomial trees with early exercise.

mod binomial;

pub use binomial::{BinomialTreePricer, DEFAULT_TREE_STEPS};
