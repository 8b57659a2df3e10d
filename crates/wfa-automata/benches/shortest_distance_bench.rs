// Criterion benchmarks for wfa-automata.
//
// The automata are generated deterministically: a layered lattice where every
// state links to the next layer with weights drawn from a fixed arithmetic
// pattern, plus a cyclic variant with back edges.
//
// Run:
//   cargo bench -p wfa-automata

use criterion::{Criterion, criterion_group, criterion_main};
use wfa_automata::{
    ShortestDistance, ShortestFirstQueueFactory, TopologicalQueueFactory, VecAutomaton, operations,
    paths,
};
use wfa_core::{RealSemiring, TropicalSemiring};

// ---------------------------------------------------------------------------
// Automaton generation
// ---------------------------------------------------------------------------

const LAYERS: usize = 40;
const WIDTH: usize = 8;

fn weight(i: usize, j: usize) -> f64 {
    ((i * 7 + j * 13) % 17) as f64 + 1.0
}

/// `LAYERS` layers of `WIDTH` states, each state linked to three states of
/// the next layer. Labels cycle through `a`, `b` and `c`.
fn lattice() -> VecAutomaton<char, TropicalSemiring> {
    let mut a = VecAutomaton::new(TropicalSemiring);
    let first = a.add_states(LAYERS * WIDTH + 1);
    let last = first + LAYERS * WIDTH;
    a.set_initial(first).expect("initial");
    a.set_final(last).expect("final");
    for s in 0..WIDTH {
        a.add_transition(first, 1 + s, 'a', weight(0, s)).expect("edge");
    }
    for layer in 0..LAYERS - 1 {
        for s in 0..WIDTH {
            let from = 1 + layer * WIDTH + s;
            for step in 0..3 {
                let to = 1 + (layer + 1) * WIDTH + (s + step) % WIDTH;
                let label = ['a', 'b', 'c'][step];
                a.add_transition(from, to, label, weight(from, to)).expect("edge");
            }
        }
    }
    for s in 0..WIDTH {
        let from = 1 + (LAYERS - 1) * WIDTH + s;
        a.add_epsilon_transition(from, last, weight(from, last)).expect("edge");
    }
    a
}

/// The lattice with a back edge from every fourth layer.
fn cyclic() -> VecAutomaton<char, TropicalSemiring> {
    let mut a = lattice();
    for layer in (4..LAYERS).step_by(4) {
        let from = 1 + layer * WIDTH;
        a.add_transition(from, from - 3 * WIDTH, 'z', 5.0).expect("edge");
    }
    a
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_shortest_distance(c: &mut Criterion) {
    let a = lattice();
    let topological = ShortestDistance::new().with_queue_factory(TopologicalQueueFactory);
    let shortest_first = ShortestDistance::new().with_queue_factory(ShortestFirstQueueFactory);

    c.bench_function("sd_lattice_topological", |b| {
        b.iter(|| std::hint::black_box(topological.compute(&a, &0).expect("ordered")));
    });
    c.bench_function("sd_lattice_shortest_first", |b| {
        b.iter(|| std::hint::black_box(shortest_first.compute(&a, &0).expect("queue")));
    });

    let looping = cyclic();
    c.bench_function("sd_cyclic_default", |b| {
        b.iter(|| std::hint::black_box(paths::shortest_distances(&looping)));
    });
}

fn bench_k_best(c: &mut Criterion) {
    let a = lattice();
    for k in [1, 10, 50] {
        c.bench_function(&format!("k_best_paths_{k}"), |b| {
            b.iter(|| std::hint::black_box(paths::k_best_paths(&a, k)));
        });
    }
}

fn bench_operations(c: &mut Criterion) {
    let a = lattice();
    let word: Vec<char> = "abcabcabcabcabcabcabcabcabcabcabcabcabca".chars().collect();

    c.bench_function("string_weight_lattice", |b| {
        b.iter(|| std::hint::black_box(paths::string_weight(&a, &word)));
    });

    // Fresh views each iteration so the memoized expansions are measured.
    c.bench_function("determinize_string_weight", |b| {
        b.iter(|| {
            let d = operations::determinize_epsilon_removed(&a);
            std::hint::black_box(paths::string_weight(&d, &word))
        });
    });

    let probabilities = operations::to_weighted(operations::to_unweighted(&a));
    c.bench_function("total_weight_real", |b| {
        b.iter(|| std::hint::black_box(paths::total_weight(&probabilities)));
    });

    let mut real = VecAutomaton::new(RealSemiring);
    real.add_states(2);
    real.set_initial(0).expect("initial");
    real.set_final(1).expect("final");
    real.add_transition(0, 1, 'x', 0.5).expect("edge");
    real.add_transition(1, 1, 'x', 0.5).expect("edge");
    c.bench_function("push_real_loop", |b| {
        b.iter(|| std::hint::black_box(operations::push(&real).potential(&0)));
    });
}

criterion_group!(benches, bench_shortest_distance, bench_k_best, bench_operations);
criterion_main!(benches);
