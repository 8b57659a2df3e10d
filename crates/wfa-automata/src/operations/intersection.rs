use wfa_core::Semiring;

use crate::{Automaton, Weight};

/// Transition of an [`AcceptorIntersection`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IntersectionTransition<S1, S2, T1, T2> {
    /// Both operands read the same label.
    Both(T1, T2),
    /// Epsilon in the first operand; the second stays in its state.
    First(T1, S2),
    /// Epsilon in the second operand; the first stays in its state.
    Second(S1, T2),
}

/// Strings accepted by both operands, weighted by the product of their
/// weights.
///
/// States are pairs of operand states. Labelled transitions move both
/// operands on the same label; an epsilon transition of either operand moves
/// that operand alone. When both operands have epsilon transitions, paths
/// interleaving them in different orders are all kept, so the weight of a
/// string is only exact over idempotent semirings in that case.
pub struct AcceptorIntersection<A, B> {
    first: A,
    second: B,
}

impl<A, B> AcceptorIntersection<A, B>
where
    A: Automaton,
    B: Automaton<Label = A::Label, Semiring = A::Semiring>,
{
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A, B> Automaton for AcceptorIntersection<A, B>
where
    A: Automaton,
    B: Automaton<Label = A::Label, Semiring = A::Semiring>,
{
    type State = (A::State, B::State);
    type Transition = IntersectionTransition<A::State, B::State, A::Transition, B::Transition>;
    type Label = A::Label;
    type Semiring = A::Semiring;

    fn semiring(&self) -> &A::Semiring {
        self.first.semiring()
    }

    fn initial_states(&self) -> Vec<Self::State> {
        let second = self.second.initial_states();
        self.first
            .initial_states()
            .into_iter()
            .flat_map(|p| second.iter().map(move |q| (p.clone(), q.clone())))
            .collect()
    }

    fn initial_weight(&self, (p, q): &Self::State) -> Weight<A> {
        self.semiring()
            .multiply(&self.first.initial_weight(p), &self.second.initial_weight(q))
    }

    fn final_weight(&self, (p, q): &Self::State) -> Weight<A> {
        self.semiring()
            .multiply(&self.first.final_weight(p), &self.second.final_weight(q))
    }

    fn transitions_out(&self, (p, q): &Self::State) -> Vec<Self::Transition> {
        let second_out = self.second.transitions_out(q);
        let mut transitions = Vec::new();
        for t1 in self.first.transitions_out(p) {
            match self.first.label(&t1) {
                None => transitions.push(IntersectionTransition::First(t1, q.clone())),
                Some(label) => {
                    for t2 in &second_out {
                        if self.second.label(t2).as_ref() == Some(&label) {
                            transitions.push(IntersectionTransition::Both(t1.clone(), t2.clone()));
                        }
                    }
                }
            }
        }
        for t2 in second_out {
            if self.second.label(&t2).is_none() {
                transitions.push(IntersectionTransition::Second(p.clone(), t2));
            }
        }
        transitions
    }

    fn source(&self, transition: &Self::Transition) -> Self::State {
        match transition {
            IntersectionTransition::Both(t1, t2) => (self.first.source(t1), self.second.source(t2)),
            IntersectionTransition::First(t1, q) => (self.first.source(t1), q.clone()),
            IntersectionTransition::Second(p, t2) => (p.clone(), self.second.source(t2)),
        }
    }

    fn target(&self, transition: &Self::Transition) -> Self::State {
        match transition {
            IntersectionTransition::Both(t1, t2) => (self.first.target(t1), self.second.target(t2)),
            IntersectionTransition::First(t1, q) => (self.first.target(t1), q.clone()),
            IntersectionTransition::Second(p, t2) => (p.clone(), self.second.target(t2)),
        }
    }

    fn label(&self, transition: &Self::Transition) -> Option<A::Label> {
        match transition {
            IntersectionTransition::Both(t1, _) => self.first.label(t1),
            IntersectionTransition::First(..) | IntersectionTransition::Second(..) => None,
        }
    }

    fn transition_weight(&self, transition: &Self::Transition) -> Weight<A> {
        match transition {
            IntersectionTransition::Both(t1, t2) => self.semiring().multiply(
                &self.first.transition_weight(t1),
                &self.second.transition_weight(t2),
            ),
            IntersectionTransition::First(t1, _) => self.first.transition_weight(t1),
            IntersectionTransition::Second(_, t2) => self.second.transition_weight(t2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VecAutomaton;
    use wfa_core::TropicalSemiring;

    fn word(labels: &str, weight: f64) -> VecAutomaton<char, TropicalSemiring> {
        let mut a = VecAutomaton::new(TropicalSemiring);
        let n = labels.chars().count();
        a.add_states(n + 1);
        a.set_initial(0).unwrap();
        a.set_final(n).unwrap();
        for (i, c) in labels.chars().enumerate() {
            a.add_transition(i, i + 1, c, weight).unwrap();
        }
        a
    }

    #[test]
    fn common_word_is_kept() {
        let (a, b) = (word("ab", 1.0), word("ab", 2.0));
        let i = AcceptorIntersection::new(&a, &b);
        assert_eq!(i.initial_states(), vec![(0, 0)]);
        let out = i.transitions_out(&(0, 0));
        assert_eq!(out, vec![IntersectionTransition::Both(0, 0)]);
        assert_eq!(i.transition_weight(&out[0]), 3.0);
        assert_eq!(i.target(&out[0]), (1, 1));
        assert_eq!(i.final_weight(&(2, 2)), 0.0);
    }

    #[test]
    fn mismatched_labels_block() {
        let (a, b) = (word("ab", 1.0), word("ac", 1.0));
        let i = AcceptorIntersection::new(&a, &b);
        assert!(i.transitions_out(&(1, 1)).is_empty());
    }

    #[test]
    fn epsilon_moves_one_side() {
        let mut a = word("a", 1.0);
        let extra = a.add_state();
        a.add_epsilon_transition(1, extra, 0.5).unwrap();
        let b = word("a", 1.0);
        let i = AcceptorIntersection::new(&a, &b);
        let out = i.transitions_out(&(1, 1));
        assert_eq!(out, vec![IntersectionTransition::First(1, 1)]);
        assert_eq!(i.target(&out[0]), (extra, 1));
        assert_eq!(i.label(&out[0]), None);
    }
}
