use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use gridfill::{FillOptions, Filler, Grid, ValueHeuristic, VariableHeuristic, WordIndex};

const WORDS: &[&str] = &[
    "ace", "act", "add", "ado", "age", "ago", "aid", "ail", "aim", "air", "ale", "ant", "ape",
    "arc", "are", "ark", "arm", "art", "ash", "ate", "bad", "bag", "bat", "bed", "bee", "cab",
    "cat", "cod", "cot", "dab", "den", "doe", "dot", "ear", "eat", "ebb", "eel", "ego", "elf",
    "era", "eve", "ewe", "oak", "oar", "oat", "odd", "ode", "one", "ore", "owe", "rat", "red",
    "roe", "sea", "see", "set", "tab", "tan", "tea", "tee", "ten", "toe", "ton", "tot",
    "area", "bead", "bear", "cede", "dare", "dead", "dear", "earn", "east", "eats", "edit",
    "idea", "near", "neat", "node", "note", "oats", "odes", "rate", "read", "rest", "seat",
    "sect", "send", "stab", "star", "tear", "teen", "test", "toes", "tone",
];

fn grids() -> Vec<(&'static str, Grid)> {
    vec![
        ("3x3 open", Grid::from_template("   \n   \n   ").unwrap()),
        ("4x4 open", Grid::from_template("    \n    \n    \n    ").unwrap()),
        ("5x5 corners", Grid::from_template("#   #\n     \n     \n     \n#   #").unwrap()),
    ]
}

fn bench_variable_heuristics(c: &mut Criterion) {
    let index = WordIndex::build(WORDS);
    let mut group = c.benchmark_group("fill - variable heuristic");

    for (name, grid) in grids() {
        let heuristics =
            [VariableHeuristic::Degree, VariableHeuristic::Mrv, VariableHeuristic::FirstUnfilled];
        for heuristic in heuristics {
            let options = FillOptions { variable_heuristic: heuristic, ..FillOptions::default() };
            group.bench_function(format!("{} - {:?}", name, heuristic), |b| {
                b.iter(|| {
                    let mut filler = Filler::new(options.clone());
                    black_box(filler.fill(black_box(&grid), &index).is_ok())
                })
            });
        }
    }

    group.finish();
}

fn bench_propagation(c: &mut Criterion) {
    let index = WordIndex::build(WORDS);
    let mut group = c.benchmark_group("fill - propagation");

    for (name, grid) in grids() {
        for arc_consistency in [true, false] {
            let options = FillOptions { arc_consistency, ..FillOptions::default() };
            group.bench_function(format!("{} - arc consistency {}", name, arc_consistency), |b| {
                b.iter(|| {
                    let mut filler = Filler::new(options.clone());
                    black_box(filler.fill(black_box(&grid), &index).is_ok())
                })
            });
        }

        let options = FillOptions {
            value_heuristic: ValueHeuristic::LeastConstraining { sample: Some(8) },
            ..FillOptions::default()
        };
        group.bench_function(format!("{} - lcv", name), |b| {
            b.iter(|| {
                let mut filler = Filler::new(options.clone());
                black_box(filler.fill(black_box(&grid), &index).is_ok())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_variable_heuristics, bench_propagation);
criterion_main!(benches);
