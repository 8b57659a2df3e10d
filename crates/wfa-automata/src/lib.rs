//! Lazy weighted finite-state automata over arbitrary semirings.
//!
//! An [`Automaton`] is a graph whose states and transitions are produced on
//! demand. Operations such as [`EpsilonRemoval`], [`Determinization`] or
//! [`Union`] wrap their operands and compute the result only as far as it is
//! explored, memoizing what they compute. The shortest-distance engine and
//! the path utilities explore from the initial states, so the reachable part
//! of an expression tree of operations is all that is ever built.
//!
//! # Architecture
//!
//! - [`automaton`] -- `Automaton` / `ReverselyAccessibleAutomaton` traits, topological orders
//! - [`vec_automaton`] -- Mutable adjacency-list automaton and its JSON description
//! - [`shortest_distance`] -- Generic single-source shortest distance
//! - [`queue`] -- Queue disciplines (topological, shortest-first, k-tropical)
//! - [`weight_filter`] -- Pruning hooks for the search
//! - [`convergence`] -- Exact and tolerance-based convergence tests
//! - [`operations`] -- Lazy operations on automata
//! - [`paths`] -- Distances to final states, k best paths, string weights
//!
//! # Example
//!
//! ```
//! use wfa_automata::{paths, VecAutomaton};
//! use wfa_core::TropicalSemiring;
//!
//! let mut a = VecAutomaton::new(TropicalSemiring);
//! a.add_states(3);
//! a.set_initial(0)?;
//! a.set_final(2)?;
//! a.add_transition(0, 1, 'a', 2.0)?;
//! a.add_transition(1, 2, 'b', 3.0)?;
//! a.add_transition(0, 2, 'c', 10.0)?;
//!
//! let best = paths::k_best_paths(&a, 2);
//! assert_eq!(best[0].weight, 5.0);
//! assert_eq!(best[0].labels(&a), vec!['a', 'b']);
//! assert_eq!(best[1].weight, 10.0);
//! # Ok::<(), wfa_core::WfaError>(())
//! ```

pub mod automaton;
pub mod convergence;
mod heap;
pub mod operations;
pub mod paths;
pub mod queue;
pub mod shortest_distance;
pub mod vec_automaton;
pub mod weight_filter;

pub use automaton::{Automaton, ReverselyAccessibleAutomaton, TopologicalOrder};
pub use convergence::{ConvergenceCondition, ExactConvergence, ToleranceConvergence};
pub use operations::{
    AcceptorIntersection, Closure, Concatenation, Determinization, EmptyString, EpsilonRemoval,
    KTropicalSemiringConversion, Push, Reverse, SemiringConversion, SingleFinalState, SingleInitialState,
    Union,
};
pub use paths::Path;
pub use queue::{
    DefaultQueueFactory, KTropicalQueueFactory, QueueFactory, ShortestFirstQueueFactory, StateQueue,
    TopologicalQueueFactory,
};
pub use shortest_distance::ShortestDistance;
pub use vec_automaton::{AutomatonDescription, TransitionDescription, VecAutomaton};
pub use weight_filter::{DefaultWeightFilter, FilterResult, PathWeightFilter, WeightFilter};

pub use wfa_core::WfaError;

/// Weight type of an automaton's semiring.
pub type Weight<A> = <<A as Automaton>::Semiring as wfa_core::Semiring>::Weight;

/// Distance of each reached state.
pub type Distances<A> = hashbrown::HashMap<<A as Automaton>::State, Weight<A>>;
