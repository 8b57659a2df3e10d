//! Lazy operations on automata.
//!
//! Every operation is a struct wrapping its operands and implementing
//! [`Automaton`] itself, so operations nest freely. Nothing is computed until
//! the result is explored. Operands are taken by value; pass `&a` to keep
//! using `a` afterwards.

mod closure;
mod concatenation;
mod conversion;
mod determinization;
mod empty_string;
mod epsilon_removal;
mod intersection;
mod push;
mod reverse;
mod single_final_state;
pub(crate) mod single_initial_state;
mod union;

pub use closure::{Closure, ClosureTransition};
pub use concatenation::{ConcatTransition, Concatenation};
pub use conversion::{
    log_to_real, real_to_log, real_to_tropical, to_unweighted, to_weighted, Converter,
    KTropicalSemiringConversion, SemiringConversion,
};
pub use determinization::{Determinization, SubsetTransition};
pub use empty_string::{EmptyString, EmptyStringState};
pub use epsilon_removal::{EpsilonFreeTransition, EpsilonRemoval};
pub use intersection::{AcceptorIntersection, IntersectionTransition};
pub use push::Push;
pub use reverse::Reverse;
pub use single_final_state::{EndState, EndTransition, SingleFinalState};
pub use single_initial_state::{SingleInitialState, StartState, StartTransition};
pub use union::{Either, Union};

use wfa_core::Semifield;

use crate::{Automaton, ReverselyAccessibleAutomaton, Weight};

pub fn epsilon_removal<A: Automaton>(operand: A) -> EpsilonRemoval<A> {
    EpsilonRemoval::new(operand)
}

pub fn determinize<A>(operand: A) -> Determinization<A>
where
    A: Automaton,
    A::Semiring: Semifield,
{
    Determinization::new(operand)
}

/// Epsilon removal followed by determinization.
pub fn determinize_epsilon_removed<A>(operand: A) -> Determinization<EpsilonRemoval<A>>
where
    A: Automaton,
    A::Semiring: Semifield,
{
    Determinization::epsilon_removed(operand)
}

pub fn push<A>(operand: A) -> Push<A>
where
    A: ReverselyAccessibleAutomaton,
    A::Semiring: Semifield,
{
    Push::new(operand)
}

pub fn reverse<A: ReverselyAccessibleAutomaton>(operand: A) -> Reverse<A> {
    Reverse::new(operand)
}

pub fn single_initial_state<A: Automaton>(operand: A) -> SingleInitialState<A> {
    SingleInitialState::new(operand)
}

pub fn single_final_state<A: Automaton>(operand: A) -> SingleFinalState<A> {
    SingleFinalState::new(operand)
}

pub fn union<A, B>(first: A, second: B) -> Union<A, B>
where
    A: Automaton,
    B: Automaton<Label = A::Label, Semiring = A::Semiring>,
{
    Union::new(first, second)
}

pub fn concat<A, B>(first: A, second: B) -> Concatenation<A, B>
where
    A: Automaton,
    B: Automaton<Label = A::Label, Semiring = A::Semiring>,
{
    Concatenation::new(first, second)
}

pub fn closure<A: Automaton>(operand: A) -> Closure<A> {
    Closure::new(operand)
}

/// One or more repetitions: the operand followed by its closure.
pub fn kleene_plus<A: Automaton>(operand: &A) -> Concatenation<&A, Closure<&A>> {
    Concatenation::new(operand, Closure::new(operand))
}

/// The operand or the empty string.
pub fn optional<A>(operand: A) -> Union<A, EmptyString<A::Semiring, A::Label>>
where
    A: Automaton,
    A::Semiring: Clone,
{
    let empty = EmptyString::new(operand.semiring().clone());
    Union::new(operand, empty)
}

/// The operand or the empty string, weighted `operand_weight` and
/// `empty_weight` respectively.
pub fn weighted_optional<A>(
    operand: A,
    operand_weight: Weight<A>,
    empty_weight: Weight<A>,
) -> Union<A, EmptyString<A::Semiring, A::Label>>
where
    A: Automaton,
    A::Semiring: Clone,
{
    let empty = EmptyString::new(operand.semiring().clone());
    Union::weighted(operand, empty, operand_weight, empty_weight)
}

/// One or more repetitions, each further repetition weighted `cont` and
/// stopping weighted `stop`, as in [`weighted_closure`].
pub fn weighted_kleene_plus<A: Automaton>(
    operand: &A,
    stop: Weight<A>,
    cont: Weight<A>,
) -> Concatenation<&A, Closure<&A>> {
    Concatenation::new(operand, Closure::weighted(operand, stop, cont))
}

pub fn intersect<A, B>(first: A, second: B) -> AcceptorIntersection<A, B>
where
    A: Automaton,
    B: Automaton<Label = A::Label, Semiring = A::Semiring>,
{
    AcceptorIntersection::new(first, second)
}

/// Lift into the k-tropical semiring, recording paths.
pub fn to_k_tropical<A>(operand: A, k: usize) -> KTropicalSemiringConversion<A>
where
    A: Automaton,
    A::Semiring: Clone,
{
    KTropicalSemiringConversion::new(operand, k)
}

/// Union weighted so each operand contributes `(one + one)⁻¹` of its weight.
pub fn uniform_union<A, B>(first: A, second: B) -> Union<A, B>
where
    A: Automaton,
    A::Semiring: Semifield,
    B: Automaton<Label = A::Label, Semiring = A::Semiring>,
{
    Union::uniform(first, second)
}

pub fn weighted_closure<A: Automaton>(operand: A, stop: Weight<A>, cont: Weight<A>) -> Closure<A> {
    Closure::weighted(operand, stop, cont)
}
