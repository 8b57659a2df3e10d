// K-tropical semiring: the k best path weights (and optionally paths) over a base semiring.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::{PathWeight, Semiring};

/// A k-best list: at most `k` path weights sorted best first.
pub type KTropicalWeight<W, T> = Vec<PathWeight<W, T>>;

/// Semiring of k-best lists over a base semiring `S`.
///
/// `add` merges two lists and keeps the `k` best entries; `multiply` combines
/// every pair of entries and keeps the `k` best products. Sorting is stable, so
/// entries of equal weight keep the order in which they were produced. `zero`
/// is the empty list and `one` is a single empty path weighing `base.one()`.
///
/// When `store_path` is set, products link the path chains of their operands
/// so every entry can be turned back into a transition sequence with
/// [`PathWeight::transitions`]. `T` is the transition identifier type of the
/// automaton the paths run through.
pub struct KTropicalSemiring<S, T> {
    k: usize,
    store_path: bool,
    base: S,
    _transition: PhantomData<fn() -> T>,
}

impl<S, T> KTropicalSemiring<S, T> {
    pub fn new(k: usize, store_path: bool, base: S) -> Self {
        Self {
            k,
            store_path,
            base,
            _transition: PhantomData,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn stores_path(&self) -> bool {
        self.store_path
    }

    /// The semiring the path weights are drawn from.
    pub fn base(&self) -> &S {
        &self.base
    }
}

impl<S: Clone, T> Clone for KTropicalSemiring<S, T> {
    fn clone(&self) -> Self {
        Self::new(self.k, self.store_path, self.base.clone())
    }
}

impl<S: fmt::Debug, T> fmt::Debug for KTropicalSemiring<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KTropicalSemiring")
            .field("k", &self.k)
            .field("store_path", &self.store_path)
            .field("base", &self.base)
            .finish()
    }
}

impl<S, T> KTropicalSemiring<S, T>
where
    S: Semiring,
    T: Clone,
{
    /// Sort best first and keep the `k` best entries.
    fn truncate(&self, mut entries: KTropicalWeight<S::Weight, T>) -> KTropicalWeight<S::Weight, T> {
        entries.sort_by(|a, b| self.base.compare(a.weight(), b.weight()));
        entries.truncate(self.k);
        entries
    }

    /// Concatenate the path of `left` with the path of `right`.
    ///
    /// The nodes of `right`'s chain are re-linked on top of `left`'s chain.
    /// Intermediate nodes get the cumulative weight `left ⊗ node`, the new
    /// tail gets `weight`.
    fn join(
        &self,
        left: &PathWeight<S::Weight, T>,
        right: &PathWeight<S::Weight, T>,
        weight: S::Weight,
    ) -> PathWeight<S::Weight, T> {
        if right.is_empty_path() {
            return left.clone().with_weight(weight);
        }

        let mut nodes: Vec<&PathWeight<S::Weight, T>> = right
            .chain()
            .filter(|node| !node.is_empty_path())
            .collect();
        nodes.reverse();

        let mut previous = if left.is_empty_path() {
            None
        } else {
            Some(Rc::new(left.clone()))
        };
        let Some((last, init)) = nodes.split_last() else {
            return left.clone().with_weight(weight);
        };
        for node in init {
            let cumulative = self.base.multiply(left.weight(), node.weight());
            previous = Some(Rc::new(PathWeight::new(
                previous,
                cumulative,
                node.transition().cloned(),
            )));
        }
        PathWeight::new(previous, weight, last.transition().cloned())
    }
}

impl<S, T> Semiring for KTropicalSemiring<S, T>
where
    S: Semiring,
    T: Clone + PartialEq + fmt::Debug,
{
    type Weight = KTropicalWeight<S::Weight, T>;

    fn multiply(&self, x1: &Self::Weight, x2: &Self::Weight) -> Self::Weight {
        let mut products = Vec::with_capacity(x1.len() * x2.len());
        for pw1 in x1 {
            for pw2 in x2 {
                let weight = self.base.multiply(pw1.weight(), pw2.weight());
                if self.store_path {
                    products.push(self.join(pw1, pw2, weight));
                } else {
                    products.push(PathWeight::empty(weight));
                }
            }
        }
        self.truncate(products)
    }

    fn add(&self, x1: &Self::Weight, x2: &Self::Weight) -> Self::Weight {
        let merged: Vec<_> = x1.iter().chain(x2).cloned().collect();
        self.truncate(merged)
    }

    fn one(&self) -> Self::Weight {
        vec![PathWeight::empty(self.base.one())]
    }

    fn zero(&self) -> Self::Weight {
        Vec::new()
    }

    fn is_idempotent(&self) -> bool {
        self.k < 2
    }

    fn is_commutative(&self) -> bool {
        !self.store_path
    }

    fn is_k_closed(&self, k: usize) -> bool {
        k + 1 >= self.k
    }

    fn compare(&self, x1: &Self::Weight, x2: &Self::Weight) -> Ordering {
        let zero = self.base.zero();
        let w1 = x1.first().map_or(&zero, |pw| pw.weight());
        let w2 = x2.first().map_or(&zero, |pw| pw.weight());
        self.base.compare(w1, w2)
    }

    fn is_zero(&self, x: &Self::Weight) -> bool {
        x.is_empty()
    }
}
