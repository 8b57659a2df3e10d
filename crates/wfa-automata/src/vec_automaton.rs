// Mutable, index-based automaton with optional JSON loading.

use std::cell::OnceCell;
use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wfa_core::{Semiring, WfaError};

use crate::{Automaton, ReverselyAccessibleAutomaton, TopologicalOrder};

#[derive(Debug, Clone)]
struct Edge<L, W> {
    source: usize,
    target: usize,
    label: Option<L>,
    weight: W,
}

/// An automaton stored as adjacency vectors.
///
/// States and transitions are dense `usize` indices handed out by
/// [`add_state`](Self::add_state) and [`add_transition`](Self::add_transition).
/// Weights start at the semiring's zero, so a fresh state is neither initial
/// nor final. A topological order is computed on first request and dropped
/// whenever a transition is added.
///
/// # Panics
///
/// [`Automaton::source`], [`Automaton::target`], [`Automaton::label`] and
/// [`Automaton::transition_weight`] panic on a transition index this
/// automaton did not hand out.
pub struct VecAutomaton<L, S: Semiring> {
    semiring: S,
    initial_weights: Vec<S::Weight>,
    final_weights: Vec<S::Weight>,
    edges: Vec<Edge<L, S::Weight>>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    order: OnceCell<Option<TopologicalOrder<usize>>>,
}

impl<L, S: Semiring> VecAutomaton<L, S> {
    fn edge(&self, transition: usize) -> &Edge<L, S::Weight> {
        match self.edges.get(transition) {
            Some(edge) => edge,
            None => panic!(
                "unknown transition {transition}: automaton has {} transitions",
                self.edges.len()
            ),
        }
    }

    pub fn new(semiring: S) -> Self {
        Self {
            semiring,
            initial_weights: Vec::new(),
            final_weights: Vec::new(),
            edges: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            order: OnceCell::new(),
        }
    }

    pub fn add_state(&mut self) -> usize {
        let state = self.initial_weights.len();
        self.initial_weights.push(self.semiring.zero());
        self.final_weights.push(self.semiring.zero());
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        self.order = OnceCell::new();
        state
    }

    /// Add `n` states, returning the first new index.
    pub fn add_states(&mut self, n: usize) -> usize {
        let first = self.num_states();
        for _ in 0..n {
            self.add_state();
        }
        first
    }

    pub fn num_states(&self) -> usize {
        self.initial_weights.len()
    }

    pub fn num_transitions(&self) -> usize {
        self.edges.len()
    }

    fn check(&self, state: usize) -> Result<(), WfaError> {
        if state < self.num_states() {
            Ok(())
        } else {
            Err(WfaError::UnknownState {
                state,
                count: self.num_states(),
            })
        }
    }

    pub fn set_initial_weight(&mut self, state: usize, weight: S::Weight) -> Result<(), WfaError> {
        self.check(state)?;
        self.initial_weights[state] = weight;
        Ok(())
    }

    pub fn set_final_weight(&mut self, state: usize, weight: S::Weight) -> Result<(), WfaError> {
        self.check(state)?;
        self.final_weights[state] = weight;
        Ok(())
    }

    /// Make `state` initial with weight one.
    pub fn set_initial(&mut self, state: usize) -> Result<(), WfaError> {
        let one = self.semiring.one();
        self.set_initial_weight(state, one)
    }

    /// Make `state` final with weight one.
    pub fn set_final(&mut self, state: usize) -> Result<(), WfaError> {
        let one = self.semiring.one();
        self.set_final_weight(state, one)
    }

    pub fn add_transition(
        &mut self,
        source: usize,
        target: usize,
        label: L,
        weight: S::Weight,
    ) -> Result<usize, WfaError> {
        self.push_edge(source, target, Some(label), weight)
    }

    pub fn add_epsilon_transition(
        &mut self,
        source: usize,
        target: usize,
        weight: S::Weight,
    ) -> Result<usize, WfaError> {
        self.push_edge(source, target, None, weight)
    }

    fn push_edge(
        &mut self,
        source: usize,
        target: usize,
        label: Option<L>,
        weight: S::Weight,
    ) -> Result<usize, WfaError> {
        self.check(source)?;
        self.check(target)?;
        let id = self.edges.len();
        self.edges.push(Edge {
            source,
            target,
            label,
            weight,
        });
        self.outgoing[source].push(id);
        self.incoming[target].push(id);
        self.order = OnceCell::new();
        Ok(id)
    }

    /// Kahn's algorithm over all states; `None` when a cycle exists.
    fn compute_order(&self) -> Option<TopologicalOrder<usize>> {
        let n = self.num_states();
        let mut in_degree: Vec<usize> = self.incoming.iter().map(Vec::len).collect();
        let mut ready: VecDeque<usize> = (0..n).filter(|&s| in_degree[s] == 0).collect();
        let mut sequence = Vec::with_capacity(n);

        while let Some(state) = ready.pop_front() {
            sequence.push(state);
            for &edge in &self.outgoing[state] {
                let target = self.edges[edge].target;
                in_degree[target] -= 1;
                if in_degree[target] == 0 {
                    ready.push_back(target);
                }
            }
        }

        if sequence.len() < n {
            debug!(states = n, ordered = sequence.len(), "automaton is cyclic");
            return None;
        }
        Some(TopologicalOrder::from_sequence(sequence))
    }
}

impl<L, S> fmt::Debug for VecAutomaton<L, S>
where
    S: Semiring + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VecAutomaton")
            .field("semiring", &self.semiring)
            .field("states", &self.num_states())
            .field("transitions", &self.num_transitions())
            .finish()
    }
}

impl<L, S> Automaton for VecAutomaton<L, S>
where
    L: Clone + Eq + Hash + fmt::Debug,
    S: Semiring,
{
    type State = usize;
    type Transition = usize;
    type Label = L;
    type Semiring = S;

    fn semiring(&self) -> &S {
        &self.semiring
    }

    fn initial_states(&self) -> Vec<usize> {
        (0..self.num_states())
            .filter(|&s| !self.semiring.is_zero(&self.initial_weights[s]))
            .collect()
    }

    fn initial_weight(&self, state: &usize) -> S::Weight {
        self.initial_weights
            .get(*state)
            .cloned()
            .unwrap_or_else(|| self.semiring.zero())
    }

    fn final_weight(&self, state: &usize) -> S::Weight {
        self.final_weights
            .get(*state)
            .cloned()
            .unwrap_or_else(|| self.semiring.zero())
    }

    fn transitions_out(&self, state: &usize) -> Vec<usize> {
        self.outgoing.get(*state).cloned().unwrap_or_default()
    }

    fn source(&self, transition: &usize) -> usize {
        self.edge(*transition).source
    }

    fn target(&self, transition: &usize) -> usize {
        self.edge(*transition).target
    }

    fn label(&self, transition: &usize) -> Option<L> {
        self.edge(*transition).label.clone()
    }

    fn transition_weight(&self, transition: &usize) -> S::Weight {
        self.edge(*transition).weight.clone()
    }

    fn topological_order(&self) -> Option<&TopologicalOrder<usize>> {
        self.order.get_or_init(|| self.compute_order()).as_ref()
    }
}

impl<L, S> ReverselyAccessibleAutomaton for VecAutomaton<L, S>
where
    L: Clone + Eq + Hash + fmt::Debug,
    S: Semiring,
{
    fn final_states(&self) -> Vec<usize> {
        (0..self.num_states())
            .filter(|&s| !self.semiring.is_zero(&self.final_weights[s]))
            .collect()
    }

    fn transitions_in(&self, state: &usize) -> Vec<usize> {
        self.incoming.get(*state).cloned().unwrap_or_default()
    }
}

/// Serializable description of a [`VecAutomaton`].
///
/// ```json
/// {
///   "states": 3,
///   "initial": [[0, 0.0]],
///   "final": [[2, 0.0]],
///   "transitions": [
///     { "source": 0, "target": 1, "label": "a", "weight": 2.0 },
///     { "source": 1, "target": 2, "weight": 3.0 }
///   ]
/// }
/// ```
///
/// A transition without `label` is an epsilon transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomatonDescription<L, W> {
    pub states: usize,
    #[serde(default)]
    pub initial: Vec<(usize, W)>,
    #[serde(default, rename = "final")]
    pub finals: Vec<(usize, W)>,
    #[serde(default)]
    pub transitions: Vec<TransitionDescription<L, W>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDescription<L, W> {
    pub source: usize,
    pub target: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<L>,
    pub weight: W,
}

impl<L, W> AutomatonDescription<L, W> {
    /// Build the automaton over `semiring`, rejecting out-of-range states.
    pub fn build<S>(self, semiring: S) -> Result<VecAutomaton<L, S>, WfaError>
    where
        S: Semiring<Weight = W>,
    {
        let mut automaton = VecAutomaton::new(semiring);
        automaton.add_states(self.states);
        for (state, weight) in self.initial {
            automaton.set_initial_weight(state, weight)?;
        }
        for (state, weight) in self.finals {
            automaton.set_final_weight(state, weight)?;
        }
        for t in self.transitions {
            automaton.push_edge(t.source, t.target, t.label, t.weight)?;
        }
        debug!(
            states = automaton.num_states(),
            transitions = automaton.num_transitions(),
            "built automaton from description"
        );
        Ok(automaton)
    }
}
