use tracing::debug;
use wfa_core::{Semifield, Semiring};

use crate::convergence::{ConvergenceCondition, ExactConvergence};
use crate::operations::single_initial_state::StartState;
use crate::operations::{Reverse, SingleInitialState};
use crate::queue::DefaultQueue;
use crate::{Automaton, Distances, ReverselyAccessibleAutomaton, ShortestDistance, TopologicalOrder, Weight};

/// Weight pushing towards the initial states.
///
/// With `V(q)` the shortest distance from `q` to the final states, weights
/// are reweighted as
///
/// - `initial'(q) = initial(q) ⊗ V(q)`
/// - `w'(t) = V(source)⁻¹ ⊗ w(t) ⊗ V(target)`
/// - `final'(q) = V(q)⁻¹ ⊗ final(q)`
///
/// which leaves the weight of every complete path unchanged and makes the
/// outgoing weights of each state sum to one. `V` is computed when the push
/// is constructed, by a shortest-distance run on the reversed operand.
/// States from which no final state is reachable keep zero weights.
pub struct Push<A: Automaton> {
    operand: A,
    potentials: Distances<A>,
}

impl<A> Push<A>
where
    A: ReverselyAccessibleAutomaton,
    A::Semiring: Semifield,
{
    pub fn new(operand: A) -> Self {
        Self::with_convergence(operand, ExactConvergence)
    }

    pub fn with_convergence<C>(operand: A, convergence: C) -> Self
    where
        C: ConvergenceCondition<Weight<A>>,
    {
        let reversed = SingleInitialState::new(Reverse::new(&operand));
        let queue = DefaultQueue::for_automaton(&reversed);
        let distances = ShortestDistance::new()
            .with_convergence(convergence)
            .compute_with_queue(&reversed, &StartState::Start, queue);
        let potentials: Distances<A> = distances
            .into_iter()
            .filter_map(|(state, weight)| match state {
                StartState::Start => None,
                StartState::Inner(s) => Some((s, weight)),
            })
            .collect();
        debug!(states = potentials.len(), "computed push potentials");
        Self { operand, potentials }
    }

    pub fn operand(&self) -> &A {
        &self.operand
    }

    /// Shortest distance from `state` to the final states.
    pub fn potential(&self, state: &A::State) -> Weight<A> {
        self.potentials
            .get(state)
            .cloned()
            .unwrap_or_else(|| self.operand.semiring().zero())
    }
}

impl<A> Automaton for Push<A>
where
    A: ReverselyAccessibleAutomaton,
    A::Semiring: Semifield,
{
    type State = A::State;
    type Transition = A::Transition;
    type Label = A::Label;
    type Semiring = A::Semiring;

    fn semiring(&self) -> &A::Semiring {
        self.operand.semiring()
    }

    fn initial_states(&self) -> Vec<A::State> {
        self.operand.initial_states()
    }

    fn initial_weight(&self, state: &A::State) -> Weight<A> {
        self.semiring()
            .multiply(&self.operand.initial_weight(state), &self.potential(state))
    }

    fn final_weight(&self, state: &A::State) -> Weight<A> {
        let semiring = self.semiring();
        let potential = self.potential(state);
        if semiring.is_zero(&potential) {
            return semiring.zero();
        }
        semiring.divide(&potential, &self.operand.final_weight(state))
    }

    fn transitions_out(&self, state: &A::State) -> Vec<A::Transition> {
        self.operand.transitions_out(state)
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
        let semiring = self.semiring();
        let from = self.potential(&self.operand.source(transition));
        if semiring.is_zero(&from) {
            return semiring.zero();
        }
        let to = self.potential(&self.operand.target(transition));
        let weight = semiring.multiply(&self.operand.transition_weight(transition), &to);
        semiring.divide(&from, &weight)
    }

    fn topological_order(&self) -> Option<&TopologicalOrder<A::State>> {
        self.operand.topological_order()
    }
}

impl<A> ReverselyAccessibleAutomaton for Push<A>
where
    A: ReverselyAccessibleAutomaton,
    A::Semiring: Semifield,
{
    fn final_states(&self) -> Vec<A::State> {
        self.operand.final_states()
    }

    fn transitions_in(&self, state: &A::State) -> Vec<A::Transition> {
        self.operand.transitions_in(state)
    }
}
