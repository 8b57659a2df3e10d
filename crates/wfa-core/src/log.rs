// Log semiring: soft-min via log-sum-exp over f64.

use std::cmp::Ordering;

use crate::{Semifield, Semiring};

/// The log semiring `(R ∪ {+∞}, ⊕_log, +, +∞, 0)` where
/// `x1 ⊕_log x2 = -ln(e^-x1 + e^-x2)`.
///
/// Weights are negative log probabilities. The sum is computed literally, so
/// at the extremes (`±∞`, `1e308`) it follows IEEE-754 semantics without any
/// rescaling. Not idempotent and not k-closed for any `k`: shortest distances on
/// cyclic automata need a tolerant convergence condition. Smaller weights rank
/// first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LogSemiring;

impl Semiring for LogSemiring {
    type Weight = f64;

    fn multiply(&self, x1: &f64, x2: &f64) -> f64 {
        x1 + x2
    }

    fn add(&self, x1: &f64, x2: &f64) -> f64 {
        -((-x1).exp() + (-x2).exp()).ln()
    }

    fn one(&self) -> f64 {
        0.0
    }

    fn zero(&self) -> f64 {
        f64::INFINITY
    }

    fn is_idempotent(&self) -> bool {
        false
    }

    fn is_commutative(&self) -> bool {
        true
    }

    fn is_k_closed(&self, _k: usize) -> bool {
        false
    }

    fn compare(&self, x1: &f64, x2: &f64) -> Ordering {
        x1.total_cmp(x2)
    }
}

impl Semifield for LogSemiring {
    fn inverse(&self, x: &f64) -> f64 {
        -x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_negative_log_of_probability_sum() {
        let sr = LogSemiring;
        let p = 0.25_f64;
        let q = 0.5_f64;
        let sum = sr.add(&-p.ln(), &-q.ln());
        assert!((sum - -(p + q).ln()).abs() < 1e-12);
    }

    #[test]
    fn zero_is_identity_for_add() {
        let sr = LogSemiring;
        assert_eq!(sr.add(&sr.zero(), &1.5), 1.5);
        assert_eq!(sr.add(&sr.zero(), &sr.zero()), f64::INFINITY);
    }

    #[test]
    fn extremes_follow_ieee() {
        let sr = LogSemiring;
        // e^-1e308 underflows to 0, so the sum is -ln(0) = +inf
        assert_eq!(sr.add(&1e308, &1e308), f64::INFINITY);
        // e^1e308 overflows to +inf, so the sum is -inf
        assert_eq!(sr.add(&-1e308, &0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn properties() {
        let sr = LogSemiring;
        assert!(!sr.is_idempotent());
        assert!(sr.is_commutative());
        assert!(!sr.is_k_closed(3));
    }
}
