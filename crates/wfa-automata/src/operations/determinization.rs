use std::cell::{OnceCell, RefCell};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;

use hashbrown::{DefaultHashBuilder, HashMap};
use tracing::debug;
use wfa_core::{Semifield, Semiring};

use crate::operations::EpsilonRemoval;
use crate::{Automaton, Weight};

/// A weighted subset: operand states paired with residual weights.
type Subset<S, W> = Vec<(S, W)>;

/// Transition of a [`Determinization`]: the `index`-th transition leaving
/// subset `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubsetTransition {
    pub source: usize,
    pub index: usize,
}

struct Expansion<L, W> {
    label: Option<L>,
    weight: W,
    target: usize,
}

/// Interned subsets, looked up by an order-independent hash of their states.
struct SubsetTable<S, W> {
    subsets: Vec<Subset<S, W>>,
    by_hash: HashMap<u64, Vec<usize>>,
    hasher: DefaultHashBuilder,
}

impl<S: Clone + Eq + Hash, W: PartialEq> SubsetTable<S, W> {
    fn new() -> Self {
        Self {
            subsets: Vec::new(),
            by_hash: HashMap::new(),
            hasher: DefaultHashBuilder::default(),
        }
    }

    fn key(&self, subset: &Subset<S, W>) -> u64 {
        subset
            .iter()
            .map(|(state, _)| self.hasher.hash_one(state))
            .fold(0u64, u64::wrapping_add)
    }

    fn same(a: &Subset<S, W>, b: &Subset<S, W>) -> bool {
        a.len() == b.len()
            && a.iter()
                .all(|(s, w)| b.iter().any(|(t, v)| s == t && w == v))
    }

    /// Id of `subset`, adding it if unseen. The flag is `true` for new subsets.
    fn intern(&mut self, subset: Subset<S, W>) -> (usize, bool) {
        let key = self.key(&subset);
        let candidates = self.by_hash.entry(key).or_default();
        if let Some(&id) = candidates
            .iter()
            .find(|&&id| Self::same(&self.subsets[id], &subset))
        {
            return (id, false);
        }
        let id = self.subsets.len();
        candidates.push(id);
        self.subsets.push(subset);
        (id, true)
    }
}

/// Weighted subset construction over a semifield.
///
/// Each state of the result is a subset of operand states with residual
/// weights. For a subset `P` and a label `a`, the new transition weighs
/// `w' = ⊕ v_q ⊗ w(t)` over all `a`-transitions `t` leaving members `(q, v_q)`,
/// and the target subset gives each reached state `r` the residual
/// `w'⁻¹ ⊗ ⊕ v_q ⊗ w(t)`. Subsets are numbered in the order they are
/// discovered, the initial subset being `0`.
///
/// Epsilon transitions are treated as one more label; determinize an
/// epsilon-free operand (see [`Determinization::epsilon_removed`]) to get a
/// deterministic result. The construction terminates only when the operand
/// has the twins property.
pub struct Determinization<A: Automaton> {
    operand: A,
    table: RefCell<SubsetTable<A::State, Weight<A>>>,
    initial: OnceCell<Option<Weight<A>>>,
    expansions: RefCell<HashMap<usize, Rc<Vec<Expansion<A::Label, Weight<A>>>>>>,
}

impl<A> Determinization<A>
where
    A: Automaton,
    A::Semiring: Semifield,
{
    pub fn new(operand: A) -> Self {
        Self {
            operand,
            table: RefCell::new(SubsetTable::new()),
            initial: OnceCell::new(),
            expansions: RefCell::new(HashMap::new()),
        }
    }

    pub fn operand(&self) -> &A {
        &self.operand
    }

    /// The operand's states and residual weights in subset `id`.
    pub fn subset(&self, id: usize) -> Option<Subset<A::State, Weight<A>>> {
        self.initial_total();
        self.table.borrow().subsets.get(id).cloned()
    }

    /// Number of subsets discovered so far.
    pub fn discovered(&self) -> usize {
        self.initial_total();
        self.table.borrow().subsets.len()
    }

    /// Total initial weight; interns the initial subset as `0` on first call.
    fn initial_total(&self) -> Option<&Weight<A>> {
        self.initial
            .get_or_init(|| {
                let semiring = self.operand.semiring();
                let members: Subset<A::State, Weight<A>> = self
                    .operand
                    .initial_states()
                    .into_iter()
                    .map(|q| {
                        let w = self.operand.initial_weight(&q);
                        (q, w)
                    })
                    .filter(|(_, w)| !semiring.is_zero(w))
                    .collect();
                if members.is_empty() {
                    return None;
                }
                let total = members
                    .iter()
                    .fold(semiring.zero(), |acc, (_, w)| semiring.add(&acc, w));
                let residuals = members
                    .into_iter()
                    .map(|(q, w)| {
                        let residual = semiring.divide(&total, &w);
                        (q, residual)
                    })
                    .collect();
                self.table.borrow_mut().intern(residuals);
                Some(total)
            })
            .as_ref()
    }

    fn expand(&self, id: usize) -> Rc<Vec<Expansion<A::Label, Weight<A>>>> {
        if let Some(expansion) = self.expansions.borrow().get(&id) {
            return Rc::clone(expansion);
        }
        let semiring = self.operand.semiring();
        let Some(members) = self.table.borrow().subsets.get(id).cloned() else {
            return Rc::new(Vec::new());
        };

        // Per label, in first-seen order: total weight and weighted targets.
        let mut labels: Vec<Option<A::Label>> = Vec::new();
        let mut groups: HashMap<Option<A::Label>, (Weight<A>, Subset<A::State, Weight<A>>)> =
            HashMap::new();
        for (q, v) in &members {
            for t in self.operand.transitions_out(q) {
                let weight = semiring.multiply(v, &self.operand.transition_weight(&t));
                if semiring.is_zero(&weight) {
                    continue;
                }
                let label = self.operand.label(&t);
                let target = self.operand.target(&t);
                let (total, targets) = groups.entry(label.clone()).or_insert_with(|| {
                    labels.push(label);
                    (semiring.zero(), Vec::new())
                });
                *total = semiring.add(total, &weight);
                match targets.iter_mut().find(|(r, _)| *r == target) {
                    Some((_, w)) => *w = semiring.add(w, &weight),
                    None => targets.push((target, weight)),
                }
            }
        }

        let mut expansion = Vec::with_capacity(labels.len());
        for label in labels {
            let Some((total, targets)) = groups.remove(&label) else {
                continue;
            };
            if semiring.is_zero(&total) {
                continue;
            }
            let residuals: Subset<A::State, Weight<A>> = targets
                .into_iter()
                .map(|(r, w)| {
                    let residual = semiring.divide(&total, &w);
                    (r, residual)
                })
                .filter(|(_, w)| !semiring.is_zero(w))
                .collect();
            let size = residuals.len();
            let (target, new) = self.table.borrow_mut().intern(residuals);
            if new {
                debug!(id = target, size, "new subset");
            }
            expansion.push(Expansion {
                label,
                weight: total,
                target,
            });
        }

        let expansion = Rc::new(expansion);
        self.expansions
            .borrow_mut()
            .insert(id, Rc::clone(&expansion));
        expansion
    }

    fn arc<R>(&self, transition: &SubsetTransition, f: impl FnOnce(&Expansion<A::Label, Weight<A>>) -> R) -> Option<R> {
        self.expand(transition.source).get(transition.index).map(f)
    }
}

impl<A> Determinization<EpsilonRemoval<A>>
where
    A: Automaton,
    A::Semiring: Semifield,
{
    /// Remove epsilon transitions first, then determinize.
    pub fn epsilon_removed(operand: A) -> Self {
        Self::new(EpsilonRemoval::new(operand))
    }
}

impl<A> Automaton for Determinization<A>
where
    A: Automaton,
    A::Semiring: Semifield,
{
    type State = usize;
    type Transition = SubsetTransition;
    type Label = A::Label;
    type Semiring = A::Semiring;

    fn semiring(&self) -> &A::Semiring {
        self.operand.semiring()
    }

    fn initial_states(&self) -> Vec<usize> {
        match self.initial_total() {
            Some(_) => vec![0],
            None => Vec::new(),
        }
    }

    fn initial_weight(&self, state: &usize) -> Weight<A> {
        match (state, self.initial_total()) {
            (0, Some(total)) => total.clone(),
            _ => self.semiring().zero(),
        }
    }

    fn final_weight(&self, state: &usize) -> Weight<A> {
        let semiring = self.semiring();
        let Some(members) = self.subset(*state) else {
            return semiring.zero();
        };
        members.iter().fold(semiring.zero(), |acc, (q, v)| {
            semiring.add(&acc, &semiring.multiply(v, &self.operand.final_weight(q)))
        })
    }

    fn transitions_out(&self, state: &usize) -> Vec<SubsetTransition> {
        self.initial_total();
        (0..self.expand(*state).len())
            .map(|index| SubsetTransition {
                source: *state,
                index,
            })
            .collect()
    }

    fn source(&self, transition: &SubsetTransition) -> usize {
        transition.source
    }

    fn target(&self, transition: &SubsetTransition) -> usize {
        self.arc(transition, |arc| arc.target)
            .unwrap_or(transition.source)
    }

    fn label(&self, transition: &SubsetTransition) -> Option<A::Label> {
        self.arc(transition, |arc| arc.label.clone()).flatten()
    }

    fn transition_weight(&self, transition: &SubsetTransition) -> Weight<A> {
        self.arc(transition, |arc| arc.weight.clone())
            .unwrap_or_else(|| self.semiring().zero())
    }
}
