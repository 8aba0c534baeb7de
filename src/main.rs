//! rasp CLI — run the equivalence task.
//!
//! Usage:
//!   rasp demo --max-num 10
//!   rasp gen --inputs 5
//!   rasp bench

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::time::Instant;

use rasp::equivalence::equivalence;
use rasp::generate::{self, GenConfig};
use rasp::types::{Batch, Token, TokenRoles};

#[derive(Parser)]
#[command(name = "rasp", version, about = "rasp — attention-style sequence primitives and the equivalence task")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the task over prompts with 0..N inputs and check every result
    Demo {
        /// Number of prompts (input counts 0 through N-1)
        #[arg(long, default_value = "10")]
        max_num: usize,
        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Emit a JSON report instead of the step log
        #[arg(long)]
        json: bool,
    },
    /// Generate one sequence from a prompt with the given input count
    Gen {
        /// Number of input tokens in the prompt
        #[arg(short, long)]
        inputs: usize,
        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Step budget for the run
        #[arg(long, default_value = "256")]
        max_steps: usize,
    },
    /// Run built-in benchmark
    Bench {
        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { max_num, seed, json } => cmd_demo(max_num, seed, json),
        Commands::Gen { inputs, seed, max_steps } => cmd_gen(inputs, seed, max_steps),
        Commands::Bench { seed } => cmd_bench(seed),
    }
}

#[derive(Serialize)]
struct PromptReport {
    n_inputs: usize,
    prompt: Vec<Token>,
    sequence: Vec<Token>,
    steps: usize,
    ok: bool,
}

#[derive(Serialize)]
struct DemoReport {
    seed: u64,
    max_num: usize,
    roles: TokenRoles,
    prompts: Vec<PromptReport>,
    failures: usize,
}

fn cmd_demo(max_num: usize, seed: u64, json: bool) {
    let roles = TokenRoles::default();
    // The longest prompt in the sweep needs max_num steps to finish.
    let config = GenConfig {
        max_steps: GenConfig::default().max_steps.max(max_num),
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut reports = Vec::with_capacity(max_num);
    let mut failures = 0usize;

    for n in 0..max_num {
        let prompt = generate::prompt_with_inputs(n, &roles, &mut rng);
        let run = match generate::generate(&prompt, &roles, &config, &mut rng) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };

        if !json {
            println!("{}\n", run);
        }

        let ok = match generate::check_equivalence(&run.sequence, n, &roles) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("[demo] n={}: {}", n, e);
                failures += 1;
                false
            }
        };
        reports.push(PromptReport {
            n_inputs: n,
            prompt,
            sequence: run.sequence,
            steps: run.steps.len(),
            ok,
        });
    }

    if json {
        let report = DemoReport {
            seed,
            max_num,
            roles,
            prompts: reports,
            failures,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        eprintln!(
            "[demo] {}/{} sequences passed the equivalence check",
            max_num - failures,
            max_num
        );
    }
    if failures > 0 {
        std::process::exit(1);
    }
}

fn cmd_gen(inputs: usize, seed: u64, max_steps: usize) {
    let roles = TokenRoles::default();
    let config = GenConfig { max_steps };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let prompt = generate::prompt_with_inputs(inputs, &roles, &mut rng);
    eprintln!(
        "[gen] prompt with {} inputs: {}",
        inputs,
        generate::fmt_tokens(&prompt)
    );

    let run = match generate::generate(&prompt, &roles, &config, &mut rng) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", generate::fmt_tokens(&run.sequence));
    eprintln!(
        "[gen] emitted {} tokens in {} steps",
        run.emitted().len(),
        run.steps.len()
    );

    if let Err(e) = generate::check_equivalence(&run.sequence, inputs, &roles) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    eprintln!("[gen] equivalence check passed");
}

fn cmd_bench(seed: u64) {
    println!("=== rasp benchmark ===\n");

    let roles = TokenRoles::default();

    // 1. Whole-grid transform at growing context lengths
    println!("[1] equivalence transform (one prediction per position)");
    for n in [4, 16, 64, 256] {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let prompt = generate::prompt_with_inputs(n, &roles, &mut rng);
        let x = Batch::single(prompt);

        let start = Instant::now();
        let iters = 2_000;
        for _ in 0..iters {
            std::hint::black_box(equivalence(&x, &roles, &mut rng).unwrap());
        }
        let us = start.elapsed().as_secs_f64() / iters as f64 * 1e6;
        println!("  len={:>4}: {:.3} us", x.cols, us);
    }

    // 2. End-to-end generation
    println!("\n[2] generation (prompt to end-marker)");
    for n in [1, 4, 16, 64] {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let prompt = generate::prompt_with_inputs(n, &roles, &mut rng);
        let config = GenConfig::default();

        let start = Instant::now();
        let iters = 200;
        for _ in 0..iters {
            std::hint::black_box(generate::generate(&prompt, &roles, &config, &mut rng).unwrap());
        }
        let us = start.elapsed().as_secs_f64() / iters as f64 * 1e6;
        println!("  inputs={:>3}: {:.3} us", n, us);
    }

    println!("\n=== Done ===");
}
