use std::cell::OnceCell;

use wfa_core::{Semifield, Semiring};

use crate::{Automaton, ReverselyAccessibleAutomaton, TopologicalOrder, Weight};

/// State or transition drawn from one of two operands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Either<L, R> {
    First(L),
    Second(R),
}

/// Paths of either operand, optionally scaled per operand.
///
/// The initial states of both operands stay initial. A weighted union
/// multiplies the initial weights of the first operand by `first_weight` and
/// those of the second by `second_weight`.
pub struct Union<A: Automaton, B: Automaton> {
    first: A,
    second: B,
    weights: Option<(Weight<A>, Weight<A>)>,
    order: OnceCell<Option<TopologicalOrder<Either<A::State, B::State>>>>,
}

impl<A, B> Union<A, B>
where
    A: Automaton,
    B: Automaton<Label = A::Label, Semiring = A::Semiring>,
{
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            weights: None,
            order: OnceCell::new(),
        }
    }

    pub fn weighted(first: A, second: B, first_weight: Weight<A>, second_weight: Weight<A>) -> Self {
        Self {
            first,
            second,
            weights: Some((first_weight, second_weight)),
            order: OnceCell::new(),
        }
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<A, B> Union<A, B>
where
    A: Automaton,
    A::Semiring: Semifield,
    B: Automaton<Label = A::Label, Semiring = A::Semiring>,
{
    /// Both operands weighted by `(one + one)^-1`, e.g. one half each over
    /// the real semiring.
    pub fn uniform(first: A, second: B) -> Self {
        let semiring = first.semiring();
        let one = semiring.one();
        let half = semiring.inverse(&semiring.add(&one, &one));
        Self::weighted(first, second, half.clone(), half)
    }
}

impl<A, B> Automaton for Union<A, B>
where
    A: Automaton,
    B: Automaton<Label = A::Label, Semiring = A::Semiring>,
{
    type State = Either<A::State, B::State>;
    type Transition = Either<A::Transition, B::Transition>;
    type Label = A::Label;
    type Semiring = A::Semiring;

    fn semiring(&self) -> &A::Semiring {
        self.first.semiring()
    }

    fn initial_states(&self) -> Vec<Self::State> {
        let first = self.first.initial_states().into_iter().map(Either::First);
        let second = self.second.initial_states().into_iter().map(Either::Second);
        first.chain(second).collect()
    }

    fn initial_weight(&self, state: &Self::State) -> Weight<A> {
        let (weight, scale) = match state {
            Either::First(s) => (self.first.initial_weight(s), self.weights.as_ref().map(|w| &w.0)),
            Either::Second(s) => (self.second.initial_weight(s), self.weights.as_ref().map(|w| &w.1)),
        };
        match scale {
            Some(scale) => self.semiring().multiply(scale, &weight),
            None => weight,
        }
    }

    fn final_weight(&self, state: &Self::State) -> Weight<A> {
        match state {
            Either::First(s) => self.first.final_weight(s),
            Either::Second(s) => self.second.final_weight(s),
        }
    }

    fn transitions_out(&self, state: &Self::State) -> Vec<Self::Transition> {
        match state {
            Either::First(s) => self
                .first
                .transitions_out(s)
                .into_iter()
                .map(Either::First)
                .collect(),
            Either::Second(s) => self
                .second
                .transitions_out(s)
                .into_iter()
                .map(Either::Second)
                .collect(),
        }
    }

    fn source(&self, transition: &Self::Transition) -> Self::State {
        match transition {
            Either::First(t) => Either::First(self.first.source(t)),
            Either::Second(t) => Either::Second(self.second.source(t)),
        }
    }

    fn target(&self, transition: &Self::Transition) -> Self::State {
        match transition {
            Either::First(t) => Either::First(self.first.target(t)),
            Either::Second(t) => Either::Second(self.second.target(t)),
        }
    }

    fn label(&self, transition: &Self::Transition) -> Option<A::Label> {
        match transition {
            Either::First(t) => self.first.label(t),
            Either::Second(t) => self.second.label(t),
        }
    }

    fn transition_weight(&self, transition: &Self::Transition) -> Weight<A> {
        match transition {
            Either::First(t) => self.first.transition_weight(t),
            Either::Second(t) => self.second.transition_weight(t),
        }
    }

    fn topological_order(&self) -> Option<&TopologicalOrder<Self::State>> {
        self.order
            .get_or_init(|| {
                let first = self.first.topological_order()?;
                let second = self.second.topological_order()?;
                Some(first.chain(
                    second,
                    |s| Either::First(s.clone()),
                    |s| Either::Second(s.clone()),
                ))
            })
            .as_ref()
    }
}

impl<A, B> ReverselyAccessibleAutomaton for Union<A, B>
where
    A: ReverselyAccessibleAutomaton,
    B: ReverselyAccessibleAutomaton<Label = A::Label, Semiring = A::Semiring>,
{
    fn final_states(&self) -> Vec<Self::State> {
        let first = self.first.final_states().into_iter().map(Either::First);
        let second = self.second.final_states().into_iter().map(Either::Second);
        first.chain(second).collect()
    }

    fn transitions_in(&self, state: &Self::State) -> Vec<Self::Transition> {
        match state {
            Either::First(s) => self
                .first
                .transitions_in(s)
                .into_iter()
                .map(Either::First)
                .collect(),
            Either::Second(s) => self
                .second
                .transitions_in(s)
                .into_iter()
                .map(Either::Second)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VecAutomaton;
    use wfa_core::RealSemiring;

    fn single(label: char, weight: f64) -> VecAutomaton<char, RealSemiring> {
        let mut a = VecAutomaton::new(RealSemiring);
        a.add_states(2);
        a.set_initial(0).unwrap();
        a.set_final(1).unwrap();
        a.add_transition(0, 1, label, weight).unwrap();
        a
    }

    #[test]
    fn keeps_both_operands() {
        let (a, b) = (single('a', 0.5), single('b', 0.25));
        let u = Union::new(&a, &b);
        assert_eq!(u.initial_states(), vec![Either::First(0), Either::Second(0)]);
        assert_eq!(u.initial_weight(&Either::Second(0)), 1.0);
        let t = u.transitions_out(&Either::Second(0));
        assert_eq!(t, vec![Either::Second(0)]);
        assert_eq!(u.label(&t[0]), Some('b'));
        assert_eq!(u.target(&t[0]), Either::Second(1));
        assert_eq!(u.final_states(), vec![Either::First(1), Either::Second(1)]);
    }

    #[test]
    fn uniform_union_halves_initial_weights() {
        let (a, b) = (single('a', 0.5), single('b', 0.25));
        let u = Union::uniform(&a, &b);
        assert_eq!(u.initial_weight(&Either::First(0)), 0.5);
        assert_eq!(u.initial_weight(&Either::Second(0)), 0.5);
    }

    #[test]
    fn order_places_first_operand_first() {
        let (a, b) = (single('a', 0.5), single('b', 0.25));
        let u = Union::new(&a, &b);
        let order = u.topological_order().unwrap();
        assert_eq!(order.rank(&Either::First(1)), Some(1));
        assert_eq!(order.rank(&Either::Second(0)), Some(2));
    }
}
