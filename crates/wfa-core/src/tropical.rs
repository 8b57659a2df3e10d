// Tropical semiring: (min, +) over f64.

use std::cmp::Ordering;

use crate::{Semifield, Semiring};

/// The tropical semiring `(R ∪ {+∞}, min, +, +∞, 0)`.
///
/// Shortest distances over this semiring are classic shortest path lengths.
/// It is a commutative semifield, idempotent and k-closed for every `k`.
/// Smaller weights rank first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TropicalSemiring;

impl Semiring for TropicalSemiring {
    type Weight = f64;

    fn multiply(&self, x1: &f64, x2: &f64) -> f64 {
        x1 + x2
    }

    fn add(&self, x1: &f64, x2: &f64) -> f64 {
        x1.min(*x2)
    }

    fn one(&self) -> f64 {
        0.0
    }

    fn zero(&self) -> f64 {
        f64::INFINITY
    }

    fn is_idempotent(&self) -> bool {
        true
    }

    fn is_commutative(&self) -> bool {
        true
    }

    fn is_k_closed(&self, _k: usize) -> bool {
        true
    }

    fn compare(&self, x1: &f64, x2: &f64) -> Ordering {
        x1.total_cmp(x2)
    }
}

impl Semifield for TropicalSemiring {
    fn inverse(&self, x: &f64) -> f64 {
        -x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations() {
        let sr = TropicalSemiring;
        assert_eq!(sr.multiply(&3.0, &4.0), 7.0);
        assert_eq!(sr.add(&3.0, &4.0), 3.0);
        assert_eq!(sr.zero(), f64::INFINITY);
        assert_eq!(sr.one(), 0.0);
    }

    #[test]
    fn zero_annihilates() {
        let sr = TropicalSemiring;
        assert_eq!(sr.multiply(&sr.zero(), &5.0), f64::INFINITY);
        assert_eq!(sr.add(&sr.zero(), &5.0), 5.0);
    }

    #[test]
    fn ascending_order() {
        let sr = TropicalSemiring;
        assert_eq!(sr.compare(&1.0, &2.0), Ordering::Less);
        assert_eq!(sr.compare(&f64::INFINITY, &2.0), Ordering::Greater);
    }

    #[test]
    fn inverse_cancels() {
        let sr = TropicalSemiring;
        assert_eq!(sr.multiply(&sr.inverse(&2.5), &2.5), sr.one());
        assert_eq!(sr.divide(&2.0, &5.0), 3.0);
    }
}
