// Boolean semiring: reachability weights.

use std::cmp::Ordering;

use crate::{Semifield, Semiring};

/// The Boolean semiring `({false, true}, or, and, false, true)`.
///
/// Shortest distances over this semiring answer "is there a path". It is a
/// commutative semifield, idempotent and k-closed for every `k`. `true` ranks
/// before `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BooleanSemiring;

impl Semiring for BooleanSemiring {
    type Weight = bool;

    fn multiply(&self, x1: &bool, x2: &bool) -> bool {
        *x1 && *x2
    }

    fn add(&self, x1: &bool, x2: &bool) -> bool {
        *x1 || *x2
    }

    fn one(&self) -> bool {
        true
    }

    fn zero(&self) -> bool {
        false
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

    fn compare(&self, x1: &bool, x2: &bool) -> Ordering {
        x2.cmp(x1)
    }
}

impl Semifield for BooleanSemiring {
    fn inverse(&self, _x: &bool) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations() {
        let sr = BooleanSemiring;
        assert!(sr.add(&false, &true));
        assert!(!sr.multiply(&false, &true));
        assert!(sr.one());
        assert!(!sr.zero());
    }

    #[test]
    fn properties() {
        let sr = BooleanSemiring;
        assert!(sr.is_idempotent());
        assert!(sr.is_commutative());
        for k in 0..16 {
            assert!(sr.is_k_closed(k));
        }
    }

    #[test]
    fn true_ranks_first() {
        assert_eq!(BooleanSemiring.compare(&true, &false), Ordering::Less);
        assert_eq!(BooleanSemiring.compare(&false, &false), Ordering::Equal);
    }
}
