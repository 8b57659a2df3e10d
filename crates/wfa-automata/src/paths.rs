// Distances to final states, k best paths and string weights.

use hashbrown::HashMap;
use tracing::debug;
use wfa_core::{KTropicalWeight, Semiring};

use crate::operations::{
    EndState, EndTransition, EpsilonRemoval, KTropicalSemiringConversion, SingleFinalState,
    SingleInitialState, StartState, StartTransition,
};
use crate::queue::{DefaultQueue, KTropicalQueue};
use crate::{Automaton, Distances, ShortestDistance, Weight};

/// A sequence of transitions with its total weight, initial and final
/// weights included.
#[derive(Debug, Clone, PartialEq)]
pub struct Path<T, W> {
    pub transitions: Vec<T>,
    pub weight: W,
}

impl<T, W> Path<T, W> {
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Labels read along the path, epsilons skipped.
    pub fn labels<A>(&self, automaton: &A) -> Vec<A::Label>
    where
        A: Automaton<Transition = T>,
    {
        self.transitions
            .iter()
            .filter_map(|t| automaton.label(t))
            .collect()
    }
}

pub fn is_final_state<A: Automaton>(automaton: &A, state: &A::State) -> bool {
    !automaton
        .semiring()
        .is_zero(&automaton.final_weight(state))
}

/// Distance of every reachable state from the initial states, initial
/// weights included.
pub fn shortest_distances<A: Automaton>(automaton: &A) -> Distances<A> {
    let rooted = SingleInitialState::new(automaton);
    let queue = DefaultQueue::for_automaton(&rooted);
    ShortestDistance::new()
        .compute_with_queue(&rooted, &StartState::Start, queue)
        .into_iter()
        .filter_map(|(state, weight)| match state {
            StartState::Start => None,
            StartState::Inner(s) => Some((s, weight)),
        })
        .collect()
}

/// Sum of the weights of all accepted paths.
///
/// Over the Boolean semiring this is `true` exactly when the automaton
/// accepts some string.
pub fn total_weight<A: Automaton>(automaton: &A) -> Weight<A> {
    let semiring = automaton.semiring();
    shortest_distances(automaton)
        .iter()
        .fold(semiring.zero(), |total, (state, distance)| {
            let exit = automaton.final_weight(state);
            if semiring.is_zero(&exit) {
                total
            } else {
                semiring.add(&total, &semiring.multiply(distance, &exit))
            }
        })
}

/// The `k` best distances from `source` to every reachable state, each with
/// the path that produced it.
///
/// The search stops as soon as some final state has been settled `k` times,
/// so lists of states that are not on the way to it may be incomplete.
pub fn k_shortest_distances<A>(
    automaton: &A,
    source: &A::State,
    k: usize,
) -> HashMap<A::State, KTropicalWeight<Weight<A>, A::Transition>>
where
    A: Automaton,
    A::Semiring: Clone,
{
    let lifted = KTropicalSemiringConversion::new(automaton, k);
    ShortestDistance::new().compute_with_queue(&lifted, source, KTropicalQueue::new())
}

/// The `k` best accepted paths, best first.
///
/// Path weights include initial and final weights. Fewer than `k` paths are
/// returned when the automaton accepts fewer. Weights are expected to be
/// monotone under the semiring's order (non-negative costs in the tropical
/// semiring): the search stops once the `k` best have been settled.
pub fn k_best_paths<A>(automaton: &A, k: usize) -> Vec<Path<A::Transition, Weight<A>>>
where
    A: Automaton,
    A::Semiring: Clone,
{
    // Initial and final weights become transitions from one start state and
    // into one end state, which the k-best search then runs between.
    let bounded = SingleFinalState::new(SingleInitialState::new(automaton));
    let lifted = KTropicalSemiringConversion::new(&bounded, k);
    let mut distances = ShortestDistance::new().compute_with_queue(
        &lifted,
        &EndState::Inner(StartState::Start),
        KTropicalQueue::new(),
    );
    let best = distances.remove(&EndState::End).unwrap_or_default();
    debug!(k, found = best.len(), "k best paths");

    best.into_iter()
        .map(|entry| Path {
            transitions: entry
                .transitions()
                .into_iter()
                .filter_map(|t| match t {
                    EndTransition::Inner(StartTransition::Inner(t)) => Some(t),
                    EndTransition::Inner(StartTransition::Enter(_)) | EndTransition::Exit(_) => None,
                })
                .collect(),
            weight: entry.weight().clone(),
        })
        .collect()
}

/// Weight the automaton assigns to reading `labels` from an initial state to
/// a final state, over all matching paths. Epsilon transitions are followed
/// freely.
pub fn string_weight<A: Automaton>(automaton: &A, labels: &[A::Label]) -> Weight<A> {
    let semiring = automaton.semiring();
    let epsilon_free = EpsilonRemoval::new(automaton);

    let mut current: HashMap<A::State, Weight<A>> = HashMap::new();
    for state in epsilon_free.initial_states() {
        let weight = epsilon_free.initial_weight(&state);
        let entry = current.entry(state).or_insert_with(|| semiring.zero());
        *entry = semiring.add(entry, &weight);
    }

    for label in labels {
        let mut next: HashMap<A::State, Weight<A>> = HashMap::new();
        for (state, weight) in &current {
            for t in epsilon_free.transitions_out(state) {
                if epsilon_free.label(&t).as_ref() != Some(label) {
                    continue;
                }
                let carried = semiring.multiply(weight, &epsilon_free.transition_weight(&t));
                let entry = next
                    .entry(epsilon_free.target(&t))
                    .or_insert_with(|| semiring.zero());
                *entry = semiring.add(entry, &carried);
            }
        }
        if next.is_empty() {
            return semiring.zero();
        }
        current = next;
    }

    current
        .iter()
        .fold(semiring.zero(), |total, (state, weight)| {
            semiring.add(
                &total,
                &semiring.multiply(weight, &epsilon_free.final_weight(state)),
            )
        })
}
