use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use gridfill::{
    parse_grids, parse_word_list, FillFailure, FillOptions, Filler, ValueHeuristic,
    VariableHeuristic, WordIndex,
};

/// Fill crossword grids from a word list.
#[derive(Parser, Debug)]
#[command(name = "gridfill", version, about)]
struct Cli {
    /// Word list with one word per line.
    #[arg(short, long)]
    words: PathBuf,

    /// Grid templates separated by empty lines: # for blocks, spaces or . for open cells.
    #[arg(short, long)]
    grids: PathBuf,

    /// Only fill the grid with this (zero-indexed) position in the file.
    #[arg(short, long)]
    puzzle: Option<usize>,

    /// Only prune the slots crossing each assignment instead of maintaining full arc consistency.
    #[arg(long, default_value_t = false)]
    no_arc_consistency: bool,

    /// How to choose the next slot to fill.
    #[arg(long, value_enum, default_value_t = VariableHeuristic::Degree)]
    heuristic: VariableHeuristic,

    /// Try least-constraining words first.
    #[arg(long, default_value_t = false)]
    lcv: bool,

    /// Only score this many randomly chosen candidates per slot when using --lcv.
    #[arg(long, requires = "lcv")]
    lcv_sample: Option<usize>,

    /// Seed for sampling and shuffling.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Shuffle the word list before filling.
    #[arg(long, default_value_t = false)]
    shuffle: bool,
}

impl Cli {
    fn fill_options(&self) -> FillOptions {
        FillOptions {
            arc_consistency: !self.no_arc_consistency,
            variable_heuristic: self.heuristic,
            value_heuristic: if self.lcv {
                ValueHeuristic::LeastConstraining { sample: self.lcv_sample }
            } else {
                ValueHeuristic::Natural
            },
            seed: self.seed,
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut words = parse_word_list(&fs::read_to_string(&cli.words)?)?;
    if cli.shuffle {
        fastrand::Rng::with_seed(cli.seed).shuffle(&mut words);
    }
    let grids = parse_grids(&fs::read_to_string(&cli.grids)?)?;

    let index = WordIndex::build(&words);
    let mut filler = Filler::new(cli.fill_options());

    for (idx, grid) in grids.iter().enumerate() {
        if cli.puzzle.map_or(false, |puzzle| puzzle != idx) {
            continue;
        }

        println!("==== Grid {} ====", idx);
        match filler.fill(grid, &index) {
            Ok(result) => {
                println!("{}", result.grid);
                println!("{:?}", result.statistics);
            }
            Err(FillFailure::NoCandidates { slot }) => println!("no fill: no words fit {:?}", slot),
            Err(FillFailure::Unsolvable { statistics }) => {
                println!("no fill: the word list can't fill this grid");
                println!("{:?}", statistics);
            }
            Err(err @ FillFailure::Aborted { .. }) => println!("{}", err),
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
