//! Payoff definitions.
//!
//! Vanilla payoffs depend on the terminal price only. [`PathPayoff`] covers
//! the trajectory-dependent contracts priced by simulation: Asian averages,
//! knock-in/knock-out barriers and lookbacks. Every payoff is non-negative.

use std::fmt;

use super::PathObserver;

/// Call or put.
///
/// # Examples
/// ```
/// use pricer_models::instruments::OptionType;
///
/// assert_eq!(OptionType::Call.intrinsic(110.0, 100.0), 10.0);
/// assert_eq!(OptionType::Put.intrinsic(110.0, 100.0), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionType {
    /// Right to buy: max(S - K, 0)
    Call,
    /// Right to sell: max(K - S, 0)
    Put,
}

impl OptionType {
    /// Exercise value at `spot` for `strike`.
    #[inline]
    pub fn intrinsic(self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    /// +1 for calls, -1 for puts.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Returns whether this is a call.
    #[inline]
    pub fn is_call(self) -> bool {
        matches!(self, OptionType::Call)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

/// Averaging rule for Asian payoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Averaging {
    /// Arithmetic mean of the fixings
    Arithmetic,
    /// Geometric mean of the fixings
    Geometric,
}

/// Barrier direction and effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BarrierType {
    /// Activates when the path reaches the barrier from below
    UpIn,
    /// Deactivates when the path reaches the barrier from below
    UpOut,
    /// Activates when the path reaches the barrier from above
    DownIn,
    /// Deactivates when the path reaches the barrier from above
    DownOut,
}

impl BarrierType {
    /// Returns true if this is an "up" barrier (uses path maximum).
    #[inline]
    pub fn is_up(self) -> bool {
        matches!(self, BarrierType::UpIn | BarrierType::UpOut)
    }

    /// Returns true if this is an "in" barrier (knock-in).
    #[inline]
    pub fn is_in(self) -> bool {
        matches!(self, BarrierType::UpIn | BarrierType::DownIn)
    }

    /// The barrier with the opposite effect (in ↔ out).
    #[inline]
    pub fn complement(self) -> Self {
        match self {
            BarrierType::UpIn => BarrierType::UpOut,
            BarrierType::UpOut => BarrierType::UpIn,
            BarrierType::DownIn => BarrierType::DownOut,
            BarrierType::DownOut => BarrierType::DownIn,
        }
    }
}

/// Lookback strike convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LookbackType {
    /// Fixed strike: max(S_max - K, 0) or max(K - S_min, 0)
    Fixed,
    /// Floating strike: S_T - S_min or S_max - S_T
    Floating,
}

/// Trajectory-dependent payoff.
///
/// # Examples
/// ```
/// use pricer_models::instruments::{Averaging, OptionType, PathObserver, PathPayoff};
///
/// let asian = PathPayoff::Asian {
///     option_type: OptionType::Call,
///     averaging: Averaging::Arithmetic,
/// };
/// let mut observer = PathObserver::starting_at(100.0);
/// for s in [102.0, 106.0, 110.0] {
///     observer.observe(s);
/// }
/// assert!((asian.evaluate(&observer, 100.0) - 6.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathPayoff {
    /// Option on the average of the fixings.
    Asian {
        /// Call or put on the average
        option_type: OptionType,
        /// Arithmetic or geometric average
        averaging: Averaging,
    },
    /// Vanilla payoff switched on or off by a barrier.
    Barrier {
        /// Call or put at maturity
        option_type: OptionType,
        /// Direction and effect
        barrier_type: BarrierType,
        /// Barrier level
        barrier: f64,
    },
    /// Option on the path extreme.
    Lookback {
        /// Call or put
        option_type: OptionType,
        /// Fixed or floating strike
        lookback_type: LookbackType,
    },
}

impl PathPayoff {
    /// Payout for the statistics in `observer`.
    pub fn evaluate(&self, observer: &PathObserver, strike: f64) -> f64 {
        match *self {
            PathPayoff::Asian {
                option_type,
                averaging,
            } => {
                let average = match averaging {
                    Averaging::Arithmetic => observer.arithmetic_average(),
                    Averaging::Geometric => observer.geometric_average(),
                };
                option_type.intrinsic(average, strike)
            }
            PathPayoff::Barrier {
                option_type,
                barrier_type,
                barrier,
            } => {
                let touched = if barrier_type.is_up() {
                    observer.maximum() >= barrier
                } else {
                    observer.minimum() <= barrier
                };
                if touched == barrier_type.is_in() {
                    option_type.intrinsic(observer.terminal(), strike)
                } else {
                    0.0
                }
            }
            PathPayoff::Lookback {
                option_type,
                lookback_type,
            } => match (lookback_type, option_type) {
                (LookbackType::Fixed, OptionType::Call) => (observer.maximum() - strike).max(0.0),
                (LookbackType::Fixed, OptionType::Put) => (strike - observer.minimum()).max(0.0),
                (LookbackType::Floating, OptionType::Call) => {
                    (observer.terminal() - observer.minimum()).max(0.0)
                }
                (LookbackType::Floating, OptionType::Put) => {
                    (observer.maximum() - observer.terminal()).max(0.0)
                }
            },
        }
    }

    /// Call or put.
    #[inline]
    pub fn option_type(&self) -> OptionType {
        match *self {
            PathPayoff::Asian { option_type, .. }
            | PathPayoff::Barrier { option_type, .. }
            | PathPayoff::Lookback { option_type, .. } => option_type,
        }
    }

    /// Short label used in error context.
    pub fn name(&self) -> &'static str {
        match self {
            PathPayoff::Asian {
                averaging: Averaging::Arithmetic,
                ..
            } => "ArithmeticAsian",
            PathPayoff::Asian {
                averaging: Averaging::Geometric,
                ..
            } => "GeometricAsian",
            PathPayoff::Barrier { .. } => "Barrier",
            PathPayoff::Lookback {
                lookback_type: LookbackType::Fixed,
                ..
            } => "FixedLookback",
            PathPayoff::Lookback {
                lookback_type: LookbackType::Floating,
                ..
            } => "FloatingLookback",
        }
    }
}
