// Real semiring: (+, *) over non-negative f64.

use std::cmp::Ordering;

use crate::{Semifield, Semiring};

/// The real semiring `(R+, +, *, 0, 1)`.
///
/// Shortest distances over this semiring are total probability masses. Not
/// idempotent and not k-closed for any `k`. Larger weights rank first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RealSemiring;

impl Semiring for RealSemiring {
    type Weight = f64;

    fn multiply(&self, x1: &f64, x2: &f64) -> f64 {
        x1 * x2
    }

    fn add(&self, x1: &f64, x2: &f64) -> f64 {
        x1 + x2
    }

    fn one(&self) -> f64 {
        1.0
    }

    fn zero(&self) -> f64 {
        0.0
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
        x2.total_cmp(x1)
    }
}

impl Semifield for RealSemiring {
    fn inverse(&self, x: &f64) -> f64 {
        1.0 / x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations() {
        let sr = RealSemiring;
        assert_eq!(sr.add(&0.25, &0.5), 0.75);
        assert_eq!(sr.multiply(&0.25, &0.5), 0.125);
        assert_eq!(sr.inverse(&4.0), 0.25);
    }

    #[test]
    fn larger_ranks_first() {
        assert_eq!(RealSemiring.compare(&0.9, &0.1), Ordering::Less);
    }
}
