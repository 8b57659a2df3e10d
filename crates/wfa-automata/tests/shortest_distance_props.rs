//! Property-based tests against brute force on small random automata:
//! - shortest distances agree with Bellman-Ford relaxation
//! - the best path weighs the total weight
//! - k best paths agree with full path enumeration on acyclic automata and
//!   with enumeration up to a weight bound on cyclic ones
//! - epsilon removal and determinization keep every string weight, over the
//!   tropical semiring and over the real semiring with epsilon loops

use proptest::prelude::*;
use wfa_automata::operations;
use wfa_automata::paths::{k_best_paths, shortest_distances, string_weight, total_weight};
use wfa_automata::{Automaton, VecAutomaton};
use wfa_core::{RealSemiring, TropicalSemiring};

const INF: f64 = f64::INFINITY;

#[derive(Debug, Clone)]
struct Graph {
    states: usize,
    initial: Vec<(usize, u8)>,
    finals: Vec<(usize, u8)>,
    edges: Vec<(usize, usize, Option<char>, u8)>,
}

impl Graph {
    fn build(&self) -> VecAutomaton<char, TropicalSemiring> {
        let mut a = VecAutomaton::new(TropicalSemiring);
        a.add_states(self.states);
        for &(s, w) in &self.initial {
            a.set_initial_weight(s, f64::from(w)).unwrap();
        }
        for &(s, w) in &self.finals {
            a.set_final_weight(s, f64::from(w)).unwrap();
        }
        for &(s, t, label, w) in &self.edges {
            match label {
                Some(c) => a.add_transition(s, t, c, f64::from(w)).unwrap(),
                None => a.add_epsilon_transition(s, t, f64::from(w)).unwrap(),
            };
        }
        a
    }

    /// Initial weights as stored: later entries overwrite earlier ones.
    fn lambda(&self) -> Vec<f64> {
        let mut weights = vec![INF; self.states];
        for &(s, w) in &self.initial {
            weights[s] = f64::from(w);
        }
        weights
    }

    fn rho(&self) -> Vec<f64> {
        let mut weights = vec![INF; self.states];
        for &(s, w) in &self.finals {
            weights[s] = f64::from(w);
        }
        weights
    }

    fn bellman_ford(&self) -> Vec<f64> {
        let mut dist = self.lambda();
        for _ in 0..self.states {
            for &(s, t, _, w) in &self.edges {
                dist[t] = dist[t].min(dist[s] + f64::from(w));
            }
        }
        dist
    }

    /// Every accepted path as (labels, weight). Only terminates on acyclic
    /// graphs.
    fn accepted_paths(&self) -> Vec<(String, f64)> {
        let (lambda, rho) = (self.lambda(), self.rho());
        let mut out = Vec::new();
        let mut stack: Vec<(usize, String, f64)> = (0..self.states)
            .filter(|&s| lambda[s] < INF)
            .map(|s| (s, String::new(), lambda[s]))
            .collect();
        while let Some((state, labels, weight)) = stack.pop() {
            if rho[state] < INF {
                out.push((labels.clone(), weight + rho[state]));
            }
            for &(s, t, label, w) in &self.edges {
                if s == state {
                    let mut next = labels.clone();
                    next.extend(label);
                    stack.push((t, next, weight + f64::from(w)));
                }
            }
        }
        out
    }

    /// Weights of every accepted path weighing at most `bound`. Terminates
    /// on cyclic graphs as long as every edge weighs at least one.
    fn path_weights_up_to(&self, bound: f64) -> Vec<f64> {
        let (lambda, rho) = (self.lambda(), self.rho());
        let mut out = Vec::new();
        let mut stack: Vec<(usize, f64)> = (0..self.states)
            .filter(|&s| lambda[s] <= bound)
            .map(|s| (s, lambda[s]))
            .collect();
        while let Some((state, weight)) = stack.pop() {
            if weight + rho[state] <= bound {
                out.push(weight + rho[state]);
            }
            for &(s, t, _, w) in &self.edges {
                let next = weight + f64::from(w);
                if s == state && next <= bound {
                    stack.push((t, next));
                }
            }
        }
        out
    }

    fn string_weight(&self, string: &str) -> f64 {
        self.accepted_paths()
            .into_iter()
            .filter(|(labels, _)| labels == string)
            .map(|(_, w)| w)
            .fold(INF, f64::min)
    }
}

fn label() -> impl Strategy<Value = Option<char>> {
    prop_oneof![Just(Some('a')), Just(Some('b')), Just(None)]
}

fn graph() -> impl Strategy<Value = Graph> {
    (2usize..7).prop_flat_map(|states| {
        (
            prop::collection::vec((0..states, 0u8..5), 1..3),
            prop::collection::vec((0..states, 0u8..5), 1..3),
            prop::collection::vec((0..states, 0..states, label(), 0u8..10), 0..12),
        )
            .prop_map(move |(initial, finals, edges)| Graph {
                states,
                initial,
                finals,
                edges,
            })
    })
}

/// Same shape, with every edge pointing from a lower to a higher state.
fn acyclic_graph() -> impl Strategy<Value = Graph> {
    graph().prop_map(|mut g| {
        g.edges = g
            .edges
            .into_iter()
            .filter(|(s, t, _, _)| s != t)
            .map(|(s, t, label, w)| (s.min(t), s.max(t), label, w))
            .collect();
        g
    })
}

/// Edge weights of at least one, so cyclic paths grow without bound.
fn positive_graph() -> impl Strategy<Value = Graph> {
    (2usize..6).prop_flat_map(|states| {
        (
            prop::collection::vec((0..states, 0u8..3), 1..3),
            prop::collection::vec((0..states, 0u8..3), 1..3),
            prop::collection::vec((0..states, 0..states, label(), 1u8..4), 0..8),
        )
            .prop_map(move |(initial, finals, edges)| Graph {
                states,
                initial,
                finals,
                edges,
            })
    })
}

/// Probabilistic automaton: forward edges between distinct states plus at
/// most one epsilon self-loop per state. Weights are multiples of 1/4.
#[derive(Debug, Clone)]
struct RealGraph {
    states: usize,
    initial: Vec<(usize, u8)>,
    finals: Vec<(usize, u8)>,
    edges: Vec<(usize, usize, Option<char>, u8)>,
    loops: Vec<Option<u8>>,
}

fn quarter(w: u8) -> f64 {
    f64::from(w) / 4.0
}

impl RealGraph {
    fn build(&self) -> VecAutomaton<char, RealSemiring> {
        let mut a = VecAutomaton::new(RealSemiring);
        a.add_states(self.states);
        for &(s, w) in &self.initial {
            a.set_initial_weight(s, quarter(w)).unwrap();
        }
        for &(s, w) in &self.finals {
            a.set_final_weight(s, quarter(w)).unwrap();
        }
        for &(s, t, label, w) in &self.edges {
            match label {
                Some(c) => a.add_transition(s, t, c, quarter(w)).unwrap(),
                None => a.add_epsilon_transition(s, t, quarter(w)).unwrap(),
            };
        }
        for (s, w) in self.loops.iter().enumerate() {
            if let Some(w) = *w {
                a.add_epsilon_transition(s, s, quarter(w)).unwrap();
            }
        }
        a
    }

    fn weights(&self, entries: &[(usize, u8)]) -> Vec<f64> {
        let mut weights = vec![0.0; self.states];
        for &(s, w) in entries {
            weights[s] = quarter(w);
        }
        weights
    }

    /// Sum over any number of turns around the self-loop of `state`.
    fn star(&self, state: usize) -> f64 {
        match self.loops[state] {
            Some(w) => 1.0 / (1.0 - quarter(w)),
            None => 1.0,
        }
    }

    /// Sum of the weights of all paths reading `string`, loops folded in
    /// through `star`.
    fn string_weight(&self, string: &str) -> f64 {
        let (lambda, rho) = (self.weights(&self.initial), self.weights(&self.finals));
        let mut total = 0.0;
        let mut stack: Vec<(usize, String, f64)> = (0..self.states)
            .filter(|&s| lambda[s] > 0.0)
            .map(|s| (s, String::new(), lambda[s] * self.star(s)))
            .collect();
        while let Some((state, labels, weight)) = stack.pop() {
            if labels == string {
                total += weight * rho[state];
            }
            for &(s, t, label, w) in &self.edges {
                if s == state {
                    let mut next = labels.clone();
                    next.extend(label);
                    if string.starts_with(next.as_str()) {
                        stack.push((t, next, weight * quarter(w) * self.star(t)));
                    }
                }
            }
        }
        total
    }
}

fn real_graph() -> impl Strategy<Value = RealGraph> {
    (2usize..6).prop_flat_map(|states| {
        (
            prop::collection::vec((0..states, 1u8..5), 1..3),
            prop::collection::vec((0..states, 1u8..5), 1..3),
            prop::collection::vec((0..states, 0..states, label(), 1u8..5), 0..10),
            prop::collection::vec(prop::option::of(1u8..3), states),
        )
            .prop_map(move |(initial, finals, edges, loops)| RealGraph {
                states,
                initial,
                finals,
                edges: edges
                    .into_iter()
                    .filter(|(s, t, _, _)| s != t)
                    .map(|(s, t, label, w)| (s.min(t), s.max(t), label, w))
                    .collect(),
                loops,
            })
    })
}

fn close(expected: f64, actual: f64) -> bool {
    (expected - actual).abs() <= 1e-9 * expected.abs().max(1.0)
}

fn strings(max_len: usize) -> Vec<String> {
    let mut all = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max_len {
        frontier = frontier
            .iter()
            .flat_map(|s| ['a', 'b'].map(|c| format!("{s}{c}")))
            .collect();
        all.extend(frontier.iter().cloned());
    }
    all
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn distances_match_bellman_ford(g in graph()) {
        let a = g.build();
        let d = shortest_distances(&a);
        let expected = g.bellman_ford();
        for (state, want) in expected.iter().enumerate() {
            let got = d.get(&state).copied().unwrap_or(INF);
            prop_assert_eq!(got, *want, "state {}", state);
        }
    }

    #[test]
    fn best_path_weighs_total(g in graph()) {
        let a = g.build();
        let (dist, rho) = (g.bellman_ford(), g.rho());
        let total = dist.iter().zip(&rho).map(|(d, r)| d + r).fold(INF, f64::min);
        prop_assert_eq!(total_weight(&a), total);

        let best = k_best_paths(&a, 1);
        if total < INF {
            prop_assert_eq!(best.len(), 1);
            prop_assert_eq!(best[0].weight, total);
        } else {
            prop_assert!(best.is_empty());
        }
    }

    #[test]
    fn k_best_paths_are_consistent(g in graph()) {
        let a = g.build();
        let (lambda, rho) = (g.lambda(), g.rho());
        let paths = k_best_paths(&a, 3);
        prop_assert!(paths.len() <= 3);
        for pair in paths.windows(2) {
            prop_assert!(pair[0].weight <= pair[1].weight);
        }
        for path in &paths {
            if path.is_empty() {
                prop_assert!((0..g.states).any(|s| lambda[s] + rho[s] == path.weight));
                continue;
            }
            for pair in path.transitions.windows(2) {
                prop_assert_eq!(a.target(&pair[0]), a.source(&pair[1]));
            }
            let first = a.source(&path.transitions[0]);
            let last = a.target(&path.transitions[path.len() - 1]);
            let along: f64 = path.transitions.iter().map(|t| a.transition_weight(t)).sum();
            prop_assert_eq!(lambda[first] + along + rho[last], path.weight);
        }
    }

    #[test]
    fn k_best_paths_match_enumeration(g in acyclic_graph()) {
        let a = g.build();
        let mut all: Vec<f64> = g.accepted_paths().into_iter().map(|(_, w)| w).collect();
        all.sort_by(f64::total_cmp);
        all.truncate(3);
        let found: Vec<f64> = k_best_paths(&a, 3).iter().map(|p| p.weight).collect();
        prop_assert_eq!(found, all);
    }

    #[test]
    fn string_weights_match_enumeration(g in acyclic_graph()) {
        let a = g.build();
        for s in strings(3) {
            let labels: Vec<char> = s.chars().collect();
            prop_assert_eq!(string_weight(&a, &labels), g.string_weight(&s), "string {:?}", s);
        }
    }

    #[test]
    fn determinization_keeps_string_weights(g in acyclic_graph()) {
        let a = g.build();
        let d = operations::determinize_epsilon_removed(&a);
        for s in strings(3) {
            let labels: Vec<char> = s.chars().collect();
            prop_assert_eq!(string_weight(&d, &labels), g.string_weight(&s), "string {:?}", s);
        }
    }

    #[test]
    fn k_best_paths_match_bounded_enumeration(g in positive_graph()) {
        const BOUND: f64 = 6.0;
        let a = g.build();
        let mut all = g.path_weights_up_to(BOUND);
        all.sort_by(f64::total_cmp);
        all.truncate(3);
        let found: Vec<f64> = k_best_paths(&a, 3)
            .iter()
            .map(|p| p.weight)
            .filter(|&w| w <= BOUND)
            .collect();
        prop_assert_eq!(found, all);
    }

    #[test]
    fn epsilon_removal_keeps_real_string_weights(g in real_graph()) {
        let a = g.build();
        let e = operations::epsilon_removal(&a);
        for s in strings(2) {
            let labels: Vec<char> = s.chars().collect();
            let want = g.string_weight(&s);
            let direct = string_weight(&a, &labels);
            let removed = string_weight(&e, &labels);
            prop_assert!(close(want, direct), "string {:?}: expected {}, got {}", s, want, direct);
            prop_assert!(close(want, removed), "string {:?}: expected {}, got {} after removal", s, want, removed);
        }
    }
}
