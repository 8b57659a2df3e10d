// Semiring and semifield traits, plus runtime selection of the numeric semirings.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::{LogSemiring, RealSemiring, TropicalSemiring, WfaError};

/// An algebraic weight domain `(K, add, multiply, zero, one)`.
///
/// Implementations must satisfy the semiring axioms: `add` and `multiply` are
/// associative, `add` is commutative, `multiply` distributes over `add`, `zero`
/// and `one` are the respective identities and `zero` annihilates under
/// `multiply`.
///
/// The three property methods describe the instance to the algorithms. The
/// shortest-distance algorithm terminates on cyclic automata only when the
/// semiring is k-closed (or a tolerant convergence condition is used).
pub trait Semiring {
    type Weight: Clone + PartialEq + fmt::Debug;

    /// Product of two weights (extending a path).
    fn multiply(&self, x1: &Self::Weight, x2: &Self::Weight) -> Self::Weight;

    /// Sum of two weights (combining alternative paths).
    fn add(&self, x1: &Self::Weight, x2: &Self::Weight) -> Self::Weight;

    /// Multiplicative identity.
    fn one(&self) -> Self::Weight;

    /// Additive identity.
    fn zero(&self) -> Self::Weight;

    /// `add(x, x) == x` for every `x`.
    fn is_idempotent(&self) -> bool;

    /// `multiply(x, y) == multiply(y, x)` for every `x`, `y`.
    fn is_commutative(&self) -> bool;

    /// Adding a weight to itself `k + 1` times equals adding it `k` times.
    fn is_k_closed(&self, k: usize) -> bool;

    /// Total order ranking weights: `Less` means "better".
    fn compare(&self, x1: &Self::Weight, x2: &Self::Weight) -> Ordering;

    /// Whether `x` equals this semiring's zero.
    fn is_zero(&self, x: &Self::Weight) -> bool {
        *x == self.zero()
    }
}

/// A semiring in which every non-zero weight has a multiplicative inverse.
pub trait Semifield: Semiring {
    fn inverse(&self, x: &Self::Weight) -> Self::Weight;

    /// `inverse(x1) * x2`.
    fn divide(&self, x1: &Self::Weight, x2: &Self::Weight) -> Self::Weight {
        self.multiply(&self.inverse(x1), x2)
    }
}

impl<S: Semiring + ?Sized> Semiring for &S {
    type Weight = S::Weight;

    fn multiply(&self, x1: &Self::Weight, x2: &Self::Weight) -> Self::Weight {
        (**self).multiply(x1, x2)
    }

    fn add(&self, x1: &Self::Weight, x2: &Self::Weight) -> Self::Weight {
        (**self).add(x1, x2)
    }

    fn one(&self) -> Self::Weight {
        (**self).one()
    }

    fn zero(&self) -> Self::Weight {
        (**self).zero()
    }

    fn is_idempotent(&self) -> bool {
        (**self).is_idempotent()
    }

    fn is_commutative(&self) -> bool {
        (**self).is_commutative()
    }

    fn is_k_closed(&self, k: usize) -> bool {
        (**self).is_k_closed(k)
    }

    fn compare(&self, x1: &Self::Weight, x2: &Self::Weight) -> Ordering {
        (**self).compare(x1, x2)
    }
}

impl<S: Semifield + ?Sized> Semifield for &S {
    fn inverse(&self, x: &Self::Weight) -> Self::Weight {
        (**self).inverse(x)
    }
}

/// One of the `f64`-valued semirings, selected at runtime by name.
///
/// Parsing accepts `tropical`, `log` and `real` (case-insensitive); anything
/// else is rejected with [`WfaError::UnknownSemiring`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericSemiring {
    Tropical(TropicalSemiring),
    Log(LogSemiring),
    Real(RealSemiring),
}

impl NumericSemiring {
    /// The identifier this semiring parses from.
    pub fn name(&self) -> &'static str {
        match self {
            NumericSemiring::Tropical(_) => "tropical",
            NumericSemiring::Log(_) => "log",
            NumericSemiring::Real(_) => "real",
        }
    }
}

impl FromStr for NumericSemiring {
    type Err = WfaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tropical" => Ok(NumericSemiring::Tropical(TropicalSemiring)),
            "log" => Ok(NumericSemiring::Log(LogSemiring)),
            "real" => Ok(NumericSemiring::Real(RealSemiring)),
            _ => Err(WfaError::UnknownSemiring(s.to_string())),
        }
    }
}

impl fmt::Display for NumericSemiring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! dispatch {
    ($self:expr, $sr:ident => $body:expr) => {
        match $self {
            NumericSemiring::Tropical($sr) => $body,
            NumericSemiring::Log($sr) => $body,
            NumericSemiring::Real($sr) => $body,
        }
    };
}

impl Semiring for NumericSemiring {
    type Weight = f64;

    fn multiply(&self, x1: &f64, x2: &f64) -> f64 {
        dispatch!(self, sr => sr.multiply(x1, x2))
    }

    fn add(&self, x1: &f64, x2: &f64) -> f64 {
        dispatch!(self, sr => sr.add(x1, x2))
    }

    fn one(&self) -> f64 {
        dispatch!(self, sr => sr.one())
    }

    fn zero(&self) -> f64 {
        dispatch!(self, sr => sr.zero())
    }

    fn is_idempotent(&self) -> bool {
        dispatch!(self, sr => sr.is_idempotent())
    }

    fn is_commutative(&self) -> bool {
        dispatch!(self, sr => sr.is_commutative())
    }

    fn is_k_closed(&self, k: usize) -> bool {
        dispatch!(self, sr => sr.is_k_closed(k))
    }

    fn compare(&self, x1: &f64, x2: &f64) -> Ordering {
        dispatch!(self, sr => sr.compare(x1, x2))
    }
}

impl Semifield for NumericSemiring {
    fn inverse(&self, x: &f64) -> f64 {
        dispatch!(self, sr => sr.inverse(x))
    }
}
