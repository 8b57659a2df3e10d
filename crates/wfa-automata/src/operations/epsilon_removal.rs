use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::{HashMap, HashSet};
use tracing::trace;
use wfa_core::Semiring;

use crate::convergence::{ConvergenceCondition, ExactConvergence};
use crate::operations::single_initial_state::{SingleInitialState, StartState};
use crate::queue::DefaultQueue;
use crate::{Automaton, Distances, ReverselyAccessibleAutomaton, ShortestDistance, TopologicalOrder, Weight};

/// The operand restricted to its epsilon transitions, with `root` as its
/// only initial state.
struct EpsilonSubgraph<'a, A: Automaton> {
    operand: &'a A,
    root: &'a A::State,
}

impl<A: Automaton> Automaton for EpsilonSubgraph<'_, A> {
    type State = A::State;
    type Transition = A::Transition;
    type Label = A::Label;
    type Semiring = A::Semiring;

    fn semiring(&self) -> &A::Semiring {
        self.operand.semiring()
    }

    fn initial_states(&self) -> Vec<A::State> {
        vec![self.root.clone()]
    }

    fn initial_weight(&self, state: &A::State) -> Weight<A> {
        let semiring = self.operand.semiring();
        if state == self.root {
            semiring.one()
        } else {
            semiring.zero()
        }
    }

    fn final_weight(&self, state: &A::State) -> Weight<A> {
        self.operand.final_weight(state)
    }

    fn transitions_out(&self, state: &A::State) -> Vec<A::Transition> {
        self.operand
            .transitions_out(state)
            .into_iter()
            .filter(|t| self.operand.label(t).is_none())
            .collect()
    }

    fn source(&self, transition: &A::Transition) -> A::State {
        self.operand.source(transition)
    }

    fn target(&self, transition: &A::Transition) -> A::State {
        self.operand.target(transition)
    }

    fn label(&self, transition: &A::Transition) -> Option<A::Label> {
        self.operand.label(transition)
    }

    fn transition_weight(&self, transition: &A::Transition) -> Weight<A> {
        self.operand.transition_weight(transition)
    }

    fn topological_order(&self) -> Option<&TopologicalOrder<A::State>> {
        self.operand.topological_order()
    }
}

/// A labelled operand transition taken from a state of the epsilon closure
/// of `source`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EpsilonFreeTransition<S, T> {
    pub source: S,
    pub transition: T,
}

/// The operand without epsilon transitions, accepting the same weighted
/// language.
///
/// From a state `p`, every labelled transition `t` leaving a state `q` of the
/// epsilon closure of `p` becomes a transition from `p` weighted
/// `d(p, q) ⊗ w(t)`, where `d` is the epsilon shortest distance. The final
/// weight of `p` is `⊕ d(p, q) ⊗ final(q)` over the closure. Closures are
/// computed with [`ShortestDistance`] on first use and cached.
///
/// On epsilon cycles the closure only terminates over k-closed semirings or
/// with a tolerant convergence condition, see [`with_convergence`](Self::with_convergence).
pub struct EpsilonRemoval<A: Automaton, C = ExactConvergence> {
    operand: A,
    convergence: C,
    closures: RefCell<HashMap<A::State, Rc<Distances<A>>>>,
}

impl<A: Automaton> EpsilonRemoval<A> {
    pub fn new(operand: A) -> Self {
        Self::with_convergence(operand, ExactConvergence)
    }
}

impl<A: Automaton, C> EpsilonRemoval<A, C> {
    pub fn with_convergence(operand: A, convergence: C) -> Self {
        Self {
            operand,
            convergence,
            closures: RefCell::new(HashMap::new()),
        }
    }

    pub fn operand(&self) -> &A {
        &self.operand
    }
}

impl<A, C> EpsilonRemoval<A, C>
where
    A: Automaton,
    C: ConvergenceCondition<Weight<A>> + Clone,
{
    /// Epsilon distances from `state` to every state of its closure.
    ///
    /// The search starts from a fresh state entering `state` with weight one,
    /// so epsilon cycles back through `state` add to its own distance.
    fn closure(&self, state: &A::State) -> Rc<Distances<A>> {
        if let Some(closure) = self.closures.borrow().get(state) {
            return Rc::clone(closure);
        }
        let rooted = SingleInitialState::new(EpsilonSubgraph {
            operand: &self.operand,
            root: state,
        });
        let queue = DefaultQueue::for_automaton(&rooted);
        let distances: Distances<A> = ShortestDistance::new()
            .with_convergence(self.convergence.clone())
            .compute_with_queue(&rooted, &StartState::Start, queue)
            .into_iter()
            .filter_map(|(q, weight)| match q {
                StartState::Start => None,
                StartState::Inner(q) => Some((q, weight)),
            })
            .collect();
        trace!(?state, size = distances.len(), "epsilon closure");
        let closure = Rc::new(distances);
        self.closures
            .borrow_mut()
            .insert(state.clone(), Rc::clone(&closure));
        closure
    }
}

impl<A, C> Automaton for EpsilonRemoval<A, C>
where
    A: Automaton,
    C: ConvergenceCondition<Weight<A>> + Clone,
{
    type State = A::State;
    type Transition = EpsilonFreeTransition<A::State, A::Transition>;
    type Label = A::Label;
    type Semiring = A::Semiring;

    fn semiring(&self) -> &A::Semiring {
        self.operand.semiring()
    }

    fn initial_states(&self) -> Vec<A::State> {
        self.operand.initial_states()
    }

    fn initial_weight(&self, state: &A::State) -> Weight<A> {
        self.operand.initial_weight(state)
    }

    fn final_weight(&self, state: &A::State) -> Weight<A> {
        let semiring = self.semiring();
        self.closure(state)
            .iter()
            .fold(semiring.zero(), |total, (q, d)| {
                let exit = self.operand.final_weight(q);
                if semiring.is_zero(&exit) {
                    total
                } else {
                    semiring.add(&total, &semiring.multiply(d, &exit))
                }
            })
    }

    fn transitions_out(&self, state: &A::State) -> Vec<Self::Transition> {
        let closure = self.closure(state);
        closure
            .keys()
            .flat_map(|q| self.operand.transitions_out(q))
            .filter(|t| self.operand.label(t).is_some())
            .map(|transition| EpsilonFreeTransition {
                source: state.clone(),
                transition,
            })
            .collect()
    }

    fn source(&self, transition: &Self::Transition) -> A::State {
        transition.source.clone()
    }

    fn target(&self, transition: &Self::Transition) -> A::State {
        self.operand.target(&transition.transition)
    }

    fn label(&self, transition: &Self::Transition) -> Option<A::Label> {
        self.operand.label(&transition.transition)
    }

    fn transition_weight(&self, transition: &Self::Transition) -> Weight<A> {
        let semiring = self.semiring();
        let via = self.operand.source(&transition.transition);
        let distance = self
            .closure(&transition.source)
            .get(&via)
            .cloned()
            .unwrap_or_else(|| semiring.zero());
        semiring.multiply(&distance, &self.operand.transition_weight(&transition.transition))
    }

    fn topological_order(&self) -> Option<&TopologicalOrder<A::State>> {
        self.operand.topological_order()
    }
}

impl<A, C> EpsilonRemoval<A, C>
where
    A: ReverselyAccessibleAutomaton,
    C: ConvergenceCondition<Weight<A>> + Clone,
{
    /// States whose epsilon closure contains one of `states`, `states` included.
    fn epsilon_ancestors(&self, states: Vec<A::State>) -> Vec<A::State> {
        let mut seen: HashSet<A::State> = states.iter().cloned().collect();
        let mut ancestors = states.clone();
        let mut stack = states;
        while let Some(state) = stack.pop() {
            for t in self.operand.transitions_in(&state) {
                if self.operand.label(&t).is_some() {
                    continue;
                }
                let source = self.operand.source(&t);
                if seen.insert(source.clone()) {
                    ancestors.push(source.clone());
                    stack.push(source);
                }
            }
        }
        ancestors
    }
}

impl<A, C> ReverselyAccessibleAutomaton for EpsilonRemoval<A, C>
where
    A: ReverselyAccessibleAutomaton,
    C: ConvergenceCondition<Weight<A>> + Clone,
{
    fn final_states(&self) -> Vec<A::State> {
        let semiring = self.semiring();
        self.epsilon_ancestors(self.operand.final_states())
            .into_iter()
            .filter(|p| !semiring.is_zero(&self.final_weight(p)))
            .collect()
    }

    fn transitions_in(&self, state: &A::State) -> Vec<Self::Transition> {
        let mut transitions = Vec::new();
        for t in self.operand.transitions_in(state) {
            if self.operand.label(&t).is_none() {
                continue;
            }
            let via = self.operand.source(&t);
            for source in self.epsilon_ancestors(vec![via]) {
                transitions.push(EpsilonFreeTransition {
                    source,
                    transition: t.clone(),
                });
            }
        }
        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convergence::ToleranceConvergence;
    use crate::VecAutomaton;
    use wfa_core::{RealSemiring, TropicalSemiring};

    /// 0 -eps/1-> 1 -a/2-> 2, 0 -b/5-> 2, 2 final with weight 0.5.
    fn with_epsilon() -> VecAutomaton<char, TropicalSemiring> {
        let mut a = VecAutomaton::new(TropicalSemiring);
        a.add_states(3);
        a.set_initial(0).unwrap();
        a.set_final_weight(2, 0.5).unwrap();
        a.add_epsilon_transition(0, 1, 1.0).unwrap();
        a.add_transition(1, 2, 'a', 2.0).unwrap();
        a.add_transition(0, 2, 'b', 5.0).unwrap();
        a
    }

    #[test]
    fn epsilon_transitions_are_folded_into_labelled_ones() {
        let a = with_epsilon();
        let e = EpsilonRemoval::new(&a);
        let mut out: Vec<(Option<char>, f64, usize)> = e
            .transitions_out(&0)
            .iter()
            .map(|t| (e.label(t), e.transition_weight(t), e.target(t)))
            .collect();
        out.sort_by(|x, y| x.0.cmp(&y.0));
        assert_eq!(out, vec![(Some('a'), 3.0, 2), (Some('b'), 5.0, 2)]);
        assert!(e.transitions_out(&0).iter().all(|t| e.label(t).is_some()));
    }

    #[test]
    fn final_weight_reaches_through_epsilon() {
        let mut a = with_epsilon();
        a.set_final_weight(1, 4.0).unwrap();
        let e = EpsilonRemoval::new(&a);
        assert_eq!(e.final_weight(&0), 5.0);
        assert_eq!(e.final_weight(&1), 4.0);
    }

    #[test]
    fn reverse_access_matches_forward() {
        let mut a = with_epsilon();
        a.set_final_weight(1, 4.0).unwrap();
        let e = EpsilonRemoval::new(&a);
        let mut finals = e.final_states();
        finals.sort_unstable();
        assert_eq!(finals, vec![0, 1, 2]);

        let incoming = e.transitions_in(&2);
        assert_eq!(incoming.len(), 3);
        for t in &incoming {
            assert!(e.transitions_out(&t.source).contains(t));
        }
    }

    #[test]
    fn epsilon_cycle_over_real_weights() {
        let mut a = VecAutomaton::new(RealSemiring);
        a.add_states(2);
        a.set_initial(0).unwrap();
        a.set_final(1).unwrap();
        a.add_epsilon_transition(0, 0, 0.5).unwrap();
        a.add_transition(0, 1, 'x', 1.0).unwrap();
        let e = EpsilonRemoval::with_convergence(&a, ToleranceConvergence::new(1e-12));
        let out = e.transitions_out(&0);
        assert_eq!(out.len(), 1);
        // 1 + 0.5 + 0.25 + ...
        assert!((e.transition_weight(&out[0]) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn epsilon_cycle_counts_wherever_it_sits() {
        let mut on_source = VecAutomaton::new(RealSemiring);
        on_source.add_states(2);
        on_source.set_initial(0).unwrap();
        on_source.set_final(1).unwrap();
        on_source.add_epsilon_transition(0, 0, 0.5).unwrap();
        on_source.add_transition(0, 1, 'x', 1.0).unwrap();

        let mut on_successor = VecAutomaton::new(RealSemiring);
        on_successor.add_states(3);
        on_successor.set_initial(0).unwrap();
        on_successor.set_final(2).unwrap();
        on_successor.add_epsilon_transition(0, 1, 1.0).unwrap();
        on_successor.add_epsilon_transition(1, 1, 0.5).unwrap();
        on_successor.add_transition(1, 2, 'x', 1.0).unwrap();

        for weight in [
            crate::paths::string_weight(&on_source, &['x']),
            crate::paths::string_weight(&on_successor, &['x']),
        ] {
            assert!((weight - 2.0).abs() < 1e-9, "got {weight}");
        }
    }

    #[test]
    fn final_weight_through_cycle_on_source() {
        let mut a = VecAutomaton::<char, _>::new(RealSemiring);
        a.add_states(2);
        a.set_initial(0).unwrap();
        a.set_final_weight(0, 0.5).unwrap();
        a.add_epsilon_transition(0, 1, 0.5).unwrap();
        a.add_epsilon_transition(1, 0, 1.0).unwrap();
        let e = EpsilonRemoval::new(&a);
        // (1 + 0.5 + 0.25 + ...) * 0.5
        assert!((e.final_weight(&0) - 1.0).abs() < 1e-9);
    }
}
