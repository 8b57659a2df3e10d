// Generic single-source shortest distance over an arbitrary semiring.

use tracing::{debug, trace};
use wfa_core::{Semiring, WfaError};

use crate::convergence::{ConvergenceCondition, ExactConvergence};
use crate::queue::{DefaultQueueFactory, QueueFactory, StateQueue};
use crate::weight_filter::{DefaultWeightFilter, FilterResult, WeightFilter};
use crate::{Automaton, Distances, Weight};

/// Mohri's generic single-source shortest-distance algorithm.
///
/// For every state `q` reachable from `source` the result holds the sum, over
/// all paths from `source` to `q`, of the path weights. Each state carries a
/// tentative distance and a residual: the weight added to its distance since
/// it was last relaxed. Popping a state pushes its residual along every
/// outgoing transition; a successor whose distance changes is re-queued.
///
/// The queue discipline, the weight filter and the convergence test are
/// pluggable. With the defaults the algorithm is exact on acyclic automata
/// and on cyclic automata over k-closed semirings. Non-k-closed semirings on
/// cyclic automata need a tolerant convergence condition to terminate.
///
/// ```
/// use wfa_automata::{ShortestDistance, VecAutomaton};
/// use wfa_core::TropicalSemiring;
///
/// let mut a = VecAutomaton::new(TropicalSemiring);
/// a.add_states(2);
/// a.add_transition(0, 1, 'x', 3.0)?;
/// let distances = ShortestDistance::new().compute(&a, &0)?;
/// assert_eq!(distances[&1], 3.0);
/// # Ok::<(), wfa_core::WfaError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestDistance<Q = DefaultQueueFactory, F = DefaultWeightFilter, C = ExactConvergence> {
    queue_factory: Q,
    weight_filter: F,
    convergence: C,
}

impl ShortestDistance {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<Q, F, C> ShortestDistance<Q, F, C> {
    pub fn with_queue_factory<Q2>(self, queue_factory: Q2) -> ShortestDistance<Q2, F, C> {
        ShortestDistance {
            queue_factory,
            weight_filter: self.weight_filter,
            convergence: self.convergence,
        }
    }

    pub fn with_weight_filter<F2>(self, weight_filter: F2) -> ShortestDistance<Q, F2, C> {
        ShortestDistance {
            queue_factory: self.queue_factory,
            weight_filter,
            convergence: self.convergence,
        }
    }

    pub fn with_convergence<C2>(self, convergence: C2) -> ShortestDistance<Q, F, C2> {
        ShortestDistance {
            queue_factory: self.queue_factory,
            weight_filter: self.weight_filter,
            convergence,
        }
    }

    pub fn queue_factory(&self) -> &Q {
        &self.queue_factory
    }

    /// Distances from `source` to every reachable state.
    ///
    /// Fails only if the queue factory rejects the automaton.
    pub fn compute<A>(&self, automaton: &A, source: &A::State) -> Result<Distances<A>, WfaError>
    where
        A: Automaton,
        Q: QueueFactory<A>,
        F: WeightFilter<A::State, A::Transition, Weight<A>>,
        C: ConvergenceCondition<Weight<A>>,
    {
        let queue = self.queue_factory.create_queue(automaton)?;
        Ok(self.compute_with_queue(automaton, source, queue))
    }

    /// Run the algorithm with an already constructed queue.
    pub fn compute_with_queue<A, S>(&self, automaton: &A, source: &A::State, mut queue: S) -> Distances<A>
    where
        A: Automaton,
        S: StateQueue<A>,
        F: WeightFilter<A::State, A::Transition, Weight<A>>,
        C: ConvergenceCondition<Weight<A>>,
    {
        let semiring = automaton.semiring();
        let mut distances = Distances::<A>::default();
        let mut residuals = Distances::<A>::default();

        debug!(?source, "computing shortest distances");
        distances.insert(source.clone(), semiring.one());
        residuals.insert(source.clone(), semiring.one());
        queue.insert(automaton, source.clone(), &distances);

        let mut pops = 0usize;
        'search: while let Some(state) = queue.pop(automaton) {
            pops += 1;
            let residual = residuals
                .remove(&state)
                .unwrap_or_else(|| semiring.zero());

            match self.weight_filter.filter_state(&state, &residual) {
                FilterResult::Continue => {}
                FilterResult::Skip => continue,
                FilterResult::Stop => break,
            }

            for transition in automaton.transitions_out(&state) {
                let next = automaton.target(&transition);
                let carried = semiring.multiply(&residual, &automaton.transition_weight(&transition));

                let previous = distances
                    .get(&next)
                    .cloned()
                    .unwrap_or_else(|| semiring.zero());
                let candidate = self
                    .weight_filter
                    .filter_weight(semiring.add(&previous, &carried));

                match self.weight_filter.filter_transition(
                    &state,
                    &residual,
                    &transition,
                    &next,
                    &candidate,
                ) {
                    FilterResult::Continue => {}
                    FilterResult::Skip => continue,
                    FilterResult::Stop => break 'search,
                }

                if self.convergence.converged(&previous, &candidate) {
                    continue;
                }

                trace!(?state, ?next, "relaxed");
                distances.insert(next.clone(), candidate);
                let pending = residuals
                    .get(&next)
                    .cloned()
                    .unwrap_or_else(|| semiring.zero());
                residuals.insert(next.clone(), semiring.add(&pending, &carried));
                queue.remove(automaton, &next);
                queue.insert(automaton, next, &distances);
            }
        }

        // The empty path always reaches the source with weight one.
        distances.insert(source.clone(), semiring.one());
        debug!(states = distances.len(), pops, "shortest distances computed");
        distances
    }
}
