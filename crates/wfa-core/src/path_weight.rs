// Reversed linked path records used by the k-tropical semiring.

use std::rc::Rc;

/// One node of a path, linked to the node before it.
///
/// A chain of `PathWeight`s describes a path through an automaton read from
/// its last transition back to its first. `weight` is the cumulative weight of
/// the whole chain up to and including this node. Prefixes are shared through
/// `Rc`, so many k-best entries extending the same prefix store it once.
///
/// A node without a transition is the empty path. Zero-weight paths are never
/// represented by a node: they are simply absent from a k-best list.
#[derive(Debug, Clone, PartialEq)]
pub struct PathWeight<W, T> {
    previous: Option<Rc<PathWeight<W, T>>>,
    transition: Option<T>,
    weight: W,
}

impl<W, T> PathWeight<W, T> {
    /// Create a node extending `previous` with `transition`.
    pub fn new(previous: Option<Rc<PathWeight<W, T>>>, weight: W, transition: Option<T>) -> Self {
        Self {
            previous,
            transition,
            weight,
        }
    }

    /// The empty path carrying `weight`.
    pub fn empty(weight: W) -> Self {
        Self {
            previous: None,
            transition: None,
            weight,
        }
    }

    /// A single-transition path with no predecessor.
    pub fn single(weight: W, transition: T) -> Self {
        Self {
            previous: None,
            transition: Some(transition),
            weight,
        }
    }

    pub fn weight(&self) -> &W {
        &self.weight
    }

    pub fn transition(&self) -> Option<&T> {
        self.transition.as_ref()
    }

    pub fn previous(&self) -> Option<&Rc<PathWeight<W, T>>> {
        self.previous.as_ref()
    }

    /// Whether this node denotes the empty path.
    pub fn is_empty_path(&self) -> bool {
        self.transition.is_none()
    }

    /// Replace the transition of this node.
    pub fn with_transition(mut self, transition: T) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Replace the weight of this node, keeping its chain.
    pub fn with_weight(self, weight: W) -> Self {
        Self {
            previous: self.previous,
            transition: self.transition,
            weight,
        }
    }

    /// Iterate over the chain from this node back to the head.
    pub fn chain(&self) -> Chain<'_, W, T> {
        Chain { next: Some(self) }
    }
}

impl<W, T: Clone> PathWeight<W, T> {
    /// The transitions of the path, first transition first.
    pub fn transitions(&self) -> Vec<T> {
        let mut transitions: Vec<T> = self
            .chain()
            .filter_map(|node| node.transition.clone())
            .collect();
        transitions.reverse();
        transitions
    }
}

/// Iterator over a path chain, tail first.
pub struct Chain<'a, W, T> {
    next: Option<&'a PathWeight<W, T>>,
}

impl<'a, W, T> Iterator for Chain<'a, W, T> {
    type Item = &'a PathWeight<W, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.previous.as_deref();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_are_reconstructed_head_first() {
        let first = Rc::new(PathWeight::single(2.0, "a"));
        let second = Rc::new(PathWeight::new(Some(first), 5.0, Some("b")));
        let third = PathWeight::new(Some(second), 6.0, Some("c"));
        assert_eq!(third.transitions(), vec!["a", "b", "c"]);
        assert_eq!(*third.weight(), 6.0);
        assert_eq!(third.chain().count(), 3);
    }

    #[test]
    fn empty_path_has_no_transitions() {
        let empty: PathWeight<f64, u32> = PathWeight::empty(0.0);
        assert!(empty.is_empty_path());
        assert!(empty.transitions().is_empty());
    }

    #[test]
    fn shared_prefix() {
        let prefix = Rc::new(PathWeight::single(1.0, 10u32));
        let left = PathWeight::new(Some(Rc::clone(&prefix)), 3.0, Some(11));
        let right = PathWeight::new(Some(Rc::clone(&prefix)), 4.0, Some(12));
        assert_eq!(Rc::strong_count(&prefix), 3);
        assert_eq!(left.transitions(), vec![10, 11]);
        assert_eq!(right.transitions(), vec![10, 12]);
    }

    #[test]
    fn equality_includes_transition() {
        let a = PathWeight::single(1.0, 1u32);
        let b = PathWeight::single(1.0, 2u32);
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }
}
