// Print the k best paths of an automaton described in JSON.
//
//   cargo run -p wfa-automata --example k_best -- tests/fixtures/tropical_ambiguous.json 3
//
// The file holds an object with a "semiring" name and an "automaton"
// description, as the test fixtures do. Without arguments a small built-in
// automaton is used.
use std::fs;

use wfa_automata::{AutomatonDescription, paths};
use wfa_core::{NumericSemiring, WfaError};

const BUILT_IN: &str = r#"{
  "semiring": "tropical",
  "automaton": {
    "states": 3,
    "initial": [[0, 0.0]],
    "final": [[2, 0.0]],
    "transitions": [
      { "source": 0, "target": 1, "label": "a", "weight": 2.0 },
      { "source": 1, "target": 2, "label": "b", "weight": 3.0 },
      { "source": 0, "target": 2, "label": "c", "weight": 10.0 }
    ]
  }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let json = match args.next() {
        Some(path) => fs::read_to_string(&path)?,
        None => BUILT_IN.to_string(),
    };
    let k: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(2);

    let value: serde_json::Value = serde_json::from_str(&json)?;
    let semiring: NumericSemiring = value["semiring"]
        .as_str()
        .ok_or(WfaError::UnknownSemiring("<missing>".to_string()))?
        .parse()?;
    let description: AutomatonDescription<char, f64> =
        serde_json::from_value(value["automaton"].clone())?;
    let automaton = description.build(semiring)?;

    println!(
        "{} states, {} transitions, semiring {}",
        automaton.num_states(),
        automaton.num_transitions(),
        semiring
    );
    println!("total weight: {}", paths::total_weight(&automaton));

    for (rank, path) in paths::k_best_paths(&automaton, k).iter().enumerate() {
        let labels: String = path.labels(&automaton).into_iter().collect();
        println!(
            "{:>3}. {:<12} weight {:<10} transitions {:?}",
            rank + 1,
            if labels.is_empty() { "<eps>" } else { labels.as_str() },
            path.weight,
            path.transitions
        );
    }
    Ok(())
}
