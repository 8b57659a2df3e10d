use wfa_core::{
    BooleanSemiring, KTropicalSemiring, LogSemiring, PathWeight, RealSemiring, Semiring, TropicalSemiring,
};

use crate::{Automaton, ReverselyAccessibleAutomaton, TopologicalOrder, Weight};

/// The operand with every weight mapped into another semiring.
///
/// `convert` receives the operand's semiring along with each weight. The
/// mapping should be a semiring morphism (preserve `zero`, `one`, `add` and
/// `multiply`) for the converted automaton to mean the same thing.
pub struct SemiringConversion<A, S, F> {
    operand: A,
    semiring: S,
    convert: F,
}

impl<A, S, F> SemiringConversion<A, S, F>
where
    A: Automaton,
    S: Semiring,
    F: Fn(&A::Semiring, &Weight<A>) -> S::Weight,
{
    pub fn new(operand: A, semiring: S, convert: F) -> Self {
        Self {
            operand,
            semiring,
            convert,
        }
    }

    pub fn operand(&self) -> &A {
        &self.operand
    }

    fn convert(&self, weight: &Weight<A>) -> S::Weight {
        (self.convert)(self.operand.semiring(), weight)
    }
}

impl<A, S, F> Automaton for SemiringConversion<A, S, F>
where
    A: Automaton,
    S: Semiring,
    F: Fn(&A::Semiring, &Weight<A>) -> S::Weight,
{
    type State = A::State;
    type Transition = A::Transition;
    type Label = A::Label;
    type Semiring = S;

    fn semiring(&self) -> &S {
        &self.semiring
    }

    fn initial_states(&self) -> Vec<A::State> {
        self.operand
            .initial_states()
            .into_iter()
            .filter(|q| !self.semiring.is_zero(&self.initial_weight(q)))
            .collect()
    }

    fn initial_weight(&self, state: &A::State) -> S::Weight {
        self.convert(&self.operand.initial_weight(state))
    }

    fn final_weight(&self, state: &A::State) -> S::Weight {
        self.convert(&self.operand.final_weight(state))
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

    fn transition_weight(&self, transition: &A::Transition) -> S::Weight {
        self.convert(&self.operand.transition_weight(transition))
    }

    fn topological_order(&self) -> Option<&TopologicalOrder<A::State>> {
        self.operand.topological_order()
    }
}

impl<A, S, F> ReverselyAccessibleAutomaton for SemiringConversion<A, S, F>
where
    A: ReverselyAccessibleAutomaton,
    S: Semiring,
    F: Fn(&A::Semiring, &Weight<A>) -> S::Weight,
{
    fn final_states(&self) -> Vec<A::State> {
        self.operand
            .final_states()
            .into_iter()
            .filter(|q| !self.semiring.is_zero(&self.final_weight(q)))
            .collect()
    }

    fn transitions_in(&self, state: &A::State) -> Vec<A::Transition> {
        self.operand.transitions_in(state)
    }
}

/// The operand lifted into the k-tropical semiring over its own semiring.
///
/// A weight `w` becomes the one-entry list `[w]`; transition weights also
/// record the transition, so k-best distances over the result carry the
/// paths that produced them. Zero weights become the empty list.
pub struct KTropicalSemiringConversion<A: Automaton> {
    operand: A,
    semiring: KTropicalSemiring<A::Semiring, A::Transition>,
}

impl<A> KTropicalSemiringConversion<A>
where
    A: Automaton,
    A::Semiring: Clone,
{
    pub fn new(operand: A, k: usize) -> Self {
        let semiring = KTropicalSemiring::new(k, true, operand.semiring().clone());
        Self { operand, semiring }
    }

    pub fn operand(&self) -> &A {
        &self.operand
    }
}

impl<A: Automaton> KTropicalSemiringConversion<A> {
    fn lift(&self, weight: Weight<A>) -> Weight<Self> {
        if self.operand.semiring().is_zero(&weight) {
            Vec::new()
        } else {
            vec![PathWeight::empty(weight)]
        }
    }
}

impl<A: Automaton> Automaton for KTropicalSemiringConversion<A> {
    type State = A::State;
    type Transition = A::Transition;
    type Label = A::Label;
    type Semiring = KTropicalSemiring<A::Semiring, A::Transition>;

    fn semiring(&self) -> &Self::Semiring {
        &self.semiring
    }

    fn initial_states(&self) -> Vec<A::State> {
        self.operand.initial_states()
    }

    fn initial_weight(&self, state: &A::State) -> Weight<Self> {
        self.lift(self.operand.initial_weight(state))
    }

    fn final_weight(&self, state: &A::State) -> Weight<Self> {
        self.lift(self.operand.final_weight(state))
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

    fn transition_weight(&self, transition: &A::Transition) -> Weight<Self> {
        self.lift(self.operand.transition_weight(transition))
            .into_iter()
            .map(|pw| pw.with_transition(transition.clone()))
            .collect()
    }

    fn topological_order(&self) -> Option<&TopologicalOrder<A::State>> {
        self.operand.topological_order()
    }
}

impl<A: ReverselyAccessibleAutomaton> ReverselyAccessibleAutomaton for KTropicalSemiringConversion<A> {
    fn final_states(&self) -> Vec<A::State> {
        self.operand.final_states()
    }

    fn transitions_in(&self, state: &A::State) -> Vec<A::Transition> {
        self.operand.transitions_in(state)
    }
}

/// Conversion function between two semirings, as a plain function pointer.
pub type Converter<S1, W1, W2> = fn(&S1, &W1) -> W2;

/// Boolean weights as real numbers: `true` is one, `false` zero.
pub fn to_weighted<A>(operand: A) -> SemiringConversion<A, RealSemiring, Converter<A::Semiring, bool, f64>>
where
    A: Automaton,
    A::Semiring: Semiring<Weight = bool>,
{
    let convert: Converter<A::Semiring, bool, f64> = |_, w| if *w { 1.0 } else { 0.0 };
    SemiringConversion::new(operand, RealSemiring, convert)
}

/// Forget weights: every non-zero weight becomes `true`.
pub fn to_unweighted<A>(operand: A) -> SemiringConversion<A, BooleanSemiring, Converter<A::Semiring, Weight<A>, bool>>
where
    A: Automaton,
{
    let convert: Converter<A::Semiring, Weight<A>, bool> = |semiring, w| !semiring.is_zero(w);
    SemiringConversion::new(operand, BooleanSemiring, convert)
}

/// Negative log probabilities to probabilities: `w ↦ e^(-w)`.
pub fn log_to_real<A>(operand: A) -> SemiringConversion<A, RealSemiring, Converter<A::Semiring, f64, f64>>
where
    A: Automaton,
    A::Semiring: Semiring<Weight = f64>,
{
    let convert: Converter<A::Semiring, f64, f64> = |_, w| (-w).exp();
    SemiringConversion::new(operand, RealSemiring, convert)
}

/// Probabilities to negative log probabilities: `w ↦ -ln(w)`.
pub fn real_to_log<A>(operand: A) -> SemiringConversion<A, LogSemiring, Converter<A::Semiring, f64, f64>>
where
    A: Automaton,
    A::Semiring: Semiring<Weight = f64>,
{
    let convert: Converter<A::Semiring, f64, f64> = |_, w| -w.ln();
    SemiringConversion::new(operand, LogSemiring, convert)
}

/// Probabilities to tropical costs: `w ↦ -ln(w)`, keeping only the best path
/// instead of summing over paths.
pub fn real_to_tropical<A>(operand: A) -> SemiringConversion<A, TropicalSemiring, Converter<A::Semiring, f64, f64>>
where
    A: Automaton,
    A::Semiring: Semiring<Weight = f64>,
{
    let convert: Converter<A::Semiring, f64, f64> = |_, w| -w.ln();
    SemiringConversion::new(operand, TropicalSemiring, convert)
}
