// Queue disciplines for the shortest-distance algorithm.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;

use hashbrown::HashMap;
use tracing::debug;
use wfa_core::{KTropicalSemiring, Semiring, WfaError};

use crate::heap::IndexedHeap;
use crate::{Automaton, Distances, Weight};

/// Worklist of states whose tentative distance changed.
///
/// The shortest-distance algorithm removes a state before re-inserting it
/// whenever its distance changes, so a queue may compute a state's priority
/// once, at insertion time, from the distances it is handed.
pub trait StateQueue<A: Automaton> {
    fn insert(&mut self, automaton: &A, state: A::State, distances: &Distances<A>);

    fn remove(&mut self, automaton: &A, state: &A::State);

    fn pop(&mut self, automaton: &A) -> Option<A::State>;

    fn is_empty(&self) -> bool;
}

/// Creates a fresh queue for each shortest-distance run.
pub trait QueueFactory<A: Automaton> {
    type Queue: StateQueue<A>;

    fn create_queue(&self, automaton: &A) -> Result<Self::Queue, WfaError>;
}

/// Pops states in topological order.
///
/// Every state is then popped once, after all its predecessors, which makes
/// the algorithm exact on acyclic automata over any semiring.
pub struct TopologicalQueue<S> {
    heap: IndexedHeap<S, usize>,
}

impl<S: Clone + Eq + Hash> TopologicalQueue<S> {
    fn new() -> Self {
        Self {
            heap: IndexedHeap::new(),
        }
    }
}

impl<A> StateQueue<A> for TopologicalQueue<A::State>
where
    A: Automaton,
{
    fn insert(&mut self, automaton: &A, state: A::State, _distances: &Distances<A>) {
        let rank = automaton
            .topological_order()
            .and_then(|order| order.rank(&state))
            .unwrap_or(usize::MAX);
        self.heap.push(state, rank, usize::cmp);
    }

    fn remove(&mut self, _automaton: &A, state: &A::State) {
        self.heap.remove(state, usize::cmp);
    }

    fn pop(&mut self, _automaton: &A) -> Option<A::State> {
        self.heap.pop(usize::cmp).map(|(state, _)| state)
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Fails unless the automaton provides a topological order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologicalQueueFactory;

impl<A: Automaton> QueueFactory<A> for TopologicalQueueFactory {
    type Queue = TopologicalQueue<A::State>;

    fn create_queue(&self, automaton: &A) -> Result<Self::Queue, WfaError> {
        if automaton.topological_order().is_none() {
            return Err(WfaError::MissingTopologicalOrder);
        }
        Ok(TopologicalQueue::new())
    }
}

/// Compare two optional weights, absent weights last.
fn compare_keys<S: Semiring>(semiring: &S, k1: &Option<S::Weight>, k2: &Option<S::Weight>) -> Ordering {
    match (k1, k2) {
        (Some(w1), Some(w2)) => semiring.compare(w1, w2),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Pops the state with the best tentative distance first (Dijkstra order).
pub struct ShortestFirstQueue<S, W> {
    heap: IndexedHeap<S, Option<W>>,
}

impl<S: Clone + Eq + Hash, W> ShortestFirstQueue<S, W> {
    fn new() -> Self {
        Self {
            heap: IndexedHeap::new(),
        }
    }
}

impl<A> StateQueue<A> for ShortestFirstQueue<A::State, Weight<A>>
where
    A: Automaton,
{
    fn insert(&mut self, automaton: &A, state: A::State, distances: &Distances<A>) {
        let key = distances.get(&state).cloned();
        let semiring = automaton.semiring();
        self.heap
            .push(state, key, |k1, k2| compare_keys(semiring, k1, k2));
    }

    fn remove(&mut self, automaton: &A, state: &A::State) {
        let semiring = automaton.semiring();
        self.heap
            .remove(state, |k1, k2| compare_keys(semiring, k1, k2));
    }

    fn pop(&mut self, automaton: &A) -> Option<A::State> {
        let semiring = automaton.semiring();
        self.heap
            .pop(|k1, k2| compare_keys(semiring, k1, k2))
            .map(|(state, _)| state)
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestFirstQueueFactory;

impl<A: Automaton> QueueFactory<A> for ShortestFirstQueueFactory {
    type Queue = ShortestFirstQueue<A::State, Weight<A>>;

    fn create_queue(&self, _automaton: &A) -> Result<Self::Queue, WfaError> {
        Ok(ShortestFirstQueue::new())
    }
}

/// Shortest-first queue for k-tropical weights.
///
/// A state popped `n` times so far is keyed by the `n`-th entry of its k-best
/// list (clamped to the list's last entry), so each pop of a state is ordered
/// by the next path through it that is still unsettled. Once a final state
/// has been popped `k` times the search has found the k best paths into it
/// and the queue is cleared.
pub struct KTropicalQueue<S, W> {
    heap: IndexedHeap<S, Option<W>>,
    extractions: HashMap<S, usize>,
}

impl<S: Clone + Eq + Hash, W> KTropicalQueue<S, W> {
    pub fn new() -> Self {
        Self {
            heap: IndexedHeap::new(),
            extractions: HashMap::new(),
        }
    }
}

impl<S: Clone + Eq + Hash, W> Default for KTropicalQueue<S, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, B, T> StateQueue<A> for KTropicalQueue<A::State, B::Weight>
where
    A: Automaton<Semiring = KTropicalSemiring<B, T>>,
    B: Semiring,
    T: Clone + PartialEq + fmt::Debug,
{
    fn insert(&mut self, automaton: &A, state: A::State, distances: &Distances<A>) {
        let semiring = automaton.semiring();
        let extracted = self.extractions.get(&state).copied().unwrap_or(0);
        let key = distances.get(&state).and_then(|entries| {
            let last = entries.len().checked_sub(1)?;
            let index = extracted.min(semiring.k().saturating_sub(1)).min(last);
            entries.get(index).map(|pw| pw.weight().clone())
        });
        let base = semiring.base();
        self.heap
            .push(state, key, |k1, k2| compare_keys(base, k1, k2));
    }

    fn remove(&mut self, automaton: &A, state: &A::State) {
        let base = automaton.semiring().base();
        self.heap
            .remove(state, |k1, k2| compare_keys(base, k1, k2));
    }

    fn pop(&mut self, automaton: &A) -> Option<A::State> {
        let semiring = automaton.semiring();
        let base = semiring.base();
        let (state, _) = self.heap.pop(|k1, k2| compare_keys(base, k1, k2))?;

        let extracted = self.extractions.entry(state.clone()).or_insert(0);
        *extracted += 1;
        if *extracted == semiring.k() && !semiring.is_zero(&automaton.final_weight(&state)) {
            debug!(?state, k = semiring.k(), "final state settled k times, clearing queue");
            self.heap.clear();
        }
        Some(state)
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KTropicalQueueFactory;

impl<A, B, T> QueueFactory<A> for KTropicalQueueFactory
where
    A: Automaton<Semiring = KTropicalSemiring<B, T>>,
    B: Semiring,
    T: Clone + PartialEq + fmt::Debug,
{
    type Queue = KTropicalQueue<A::State, B::Weight>;

    fn create_queue(&self, _automaton: &A) -> Result<Self::Queue, WfaError> {
        Ok(KTropicalQueue::new())
    }
}

/// Topological when the automaton knows an order, shortest-first otherwise.
pub enum DefaultQueue<S, W> {
    Topological(TopologicalQueue<S>),
    ShortestFirst(ShortestFirstQueue<S, W>),
}

impl<S: Clone + Eq + Hash, W> DefaultQueue<S, W> {
    /// The queue the default factory picks for `automaton`.
    pub fn for_automaton<A>(automaton: &A) -> Self
    where
        A: Automaton<State = S>,
    {
        if automaton.topological_order().is_some() {
            DefaultQueue::Topological(TopologicalQueue::new())
        } else {
            DefaultQueue::ShortestFirst(ShortestFirstQueue::new())
        }
    }

    pub fn is_topological(&self) -> bool {
        matches!(self, DefaultQueue::Topological(_))
    }
}

impl<A> StateQueue<A> for DefaultQueue<A::State, Weight<A>>
where
    A: Automaton,
{
    fn insert(&mut self, automaton: &A, state: A::State, distances: &Distances<A>) {
        match self {
            DefaultQueue::Topological(q) => StateQueue::<A>::insert(q, automaton, state, distances),
            DefaultQueue::ShortestFirst(q) => StateQueue::<A>::insert(q, automaton, state, distances),
        }
    }

    fn remove(&mut self, automaton: &A, state: &A::State) {
        match self {
            DefaultQueue::Topological(q) => StateQueue::<A>::remove(q, automaton, state),
            DefaultQueue::ShortestFirst(q) => StateQueue::<A>::remove(q, automaton, state),
        }
    }

    fn pop(&mut self, automaton: &A) -> Option<A::State> {
        match self {
            DefaultQueue::Topological(q) => StateQueue::<A>::pop(q, automaton),
            DefaultQueue::ShortestFirst(q) => StateQueue::<A>::pop(q, automaton),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            DefaultQueue::Topological(q) => q.heap.is_empty(),
            DefaultQueue::ShortestFirst(q) => q.heap.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultQueueFactory;

impl<A: Automaton> QueueFactory<A> for DefaultQueueFactory {
    type Queue = DefaultQueue<A::State, Weight<A>>;

    fn create_queue(&self, automaton: &A) -> Result<Self::Queue, WfaError> {
        Ok(DefaultQueue::for_automaton(automaton))
    }
}
