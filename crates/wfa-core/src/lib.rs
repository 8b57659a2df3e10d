//! Semirings and path weights for weighted finite-state automata.
//!
//! This crate holds the algebraic leaves of the `wfa` workspace: the weight
//! domains every automaton draws its weights from, and the linked path records
//! the k-tropical semiring uses to remember which transitions produced a weight.
//!
//! # Architecture
//!
//! - [`semiring`] -- `Semiring` / `Semifield` traits and named selection
//! - [`boolean`] -- Boolean semiring (reachability)
//! - [`tropical`] -- Tropical semiring (min, +)
//! - [`log`] -- Log semiring (soft-min, +)
//! - [`real`] -- Real semiring (+, *)
//! - [`path_weight`] -- Reversed linked path records with shared prefixes
//! - [`k_tropical`] -- k best path weights over any base semiring

pub mod boolean;
pub mod k_tropical;
pub mod log;
pub mod path_weight;
pub mod real;
pub mod semiring;
pub mod tropical;

pub use boolean::BooleanSemiring;
pub use k_tropical::{KTropicalSemiring, KTropicalWeight};
pub use log::LogSemiring;
pub use path_weight::PathWeight;
pub use real::RealSemiring;
pub use semiring::{NumericSemiring, Semifield, Semiring};
pub use tropical::TropicalSemiring;

/// Error type shared by the `wfa` crates.
///
/// Every variant is a contract violation detected when an object is
/// constructed, never while an automaton is being traversed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WfaError {
    #[error("automaton does not provide a topological order")]
    MissingTopologicalOrder,
    #[error("unknown semiring: {0}")]
    UnknownSemiring(String),
    #[error("unknown state {state}: automaton has {count} states")]
    UnknownState { state: usize, count: usize },
}
