// src/bin/mrl_cli.rs
use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::fmt::Display;
use std::io::{self, Read};
use std::path::PathBuf;

use mrl_quantiles::mrl::frontends::{
    mode_to_str, parse_dist_str, parse_mode_str, parse_numbers, validate_probe, ParseError,
};
use mrl_quantiles::quality::trials::{run_trials, TrialConfig};
use mrl_quantiles::{geometry_covering, Geometry, Summary, SummaryMode, SummaryOptions};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Exact,
    Sampled,
}
impl Mode {
    fn into_summary_mode(
        self,
        initial_rate: Option<u64>,
        growth: Option<u64>,
        max_rate: Option<u64>,
    ) -> Result<SummaryMode, ParseError> {
        let name = match self {
            Mode::Exact => "exact",
            Mode::Sampled => "sampled",
        };
        parse_mode_str(Some(name), initial_rate, growth, max_rate)
    }
}

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Summarise numbers from stdin (or --input) and print `phi<TAB>estimate` per --phi
    Quantile {
        /// phi in [0,1]; repeat or comma-separate for several
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        phi: Vec<f64>,

        /// Read numbers from this file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,

        /// JSON SummaryOptions; flags below override its fields
        #[arg(long)]
        config: Option<PathBuf>,

        /// Elements per buffer
        #[arg(short = 'k', long)]
        capacity: Option<usize>,

        /// Number of buffers
        #[arg(short = 'b', long)]
        buffers: Option<usize>,

        #[arg(long, value_enum)]
        mode: Option<Mode>,

        /// Sampled mode: starting rate
        #[arg(long)]
        initial_rate: Option<u64>,

        /// Sampled mode: rate multiplier per collapse
        #[arg(long)]
        growth: Option<u64>,

        /// Sampled mode: ceiling for the rate
        #[arg(long)]
        max_rate: Option<u64>,

        #[arg(long)]
        seed: Option<u64>,
    },
    /// Repeat summaries over synthetic data and compare against exact quantiles
    Experiment {
        #[arg(long, default_value_t = 0.5)]
        phi: f64,

        #[arg(long, default_value_t = 10)]
        runs: usize,

        /// Error target used to pick (b, k) from the preset table, and the
        /// significance level of the t-test
        #[arg(short = 'e', long, default_value_t = 0.01)]
        epsilon: f64,

        #[arg(short = 'n', long, default_value_t = 100_000)]
        n: usize,

        /// uniform | normal | bimodal | poisson | random
        #[arg(short = 'd', long, default_value = "normal")]
        dist: String,

        /// Poisson rate
        #[arg(long, default_value_t = 5.0)]
        lambda: f64,

        /// `random` dataset: lower end of the linspace
        #[arg(long, default_value_t = 0.0)]
        start: f64,

        /// `random` dataset: upper end of the linspace
        #[arg(long, default_value_t = 10.0)]
        end: f64,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Override the preset capacity (requires -b)
        #[arg(short = 'k', long, requires = "buffers")]
        capacity: Option<usize>,

        /// Override the preset buffer count (requires -k)
        #[arg(short = 'b', long, requires = "capacity")]
        buffers: Option<usize>,

        #[arg(long, value_enum, default_value_t = Mode::Exact)]
        mode: Mode,

        #[arg(long)]
        initial_rate: Option<u64>,

        #[arg(long)]
        growth: Option<u64>,

        #[arg(long)]
        max_rate: Option<u64>,
    },
    /// Print the preset geometry for an error target and input length
    Geometry {
        #[arg(short = 'e', long)]
        epsilon: f64,

        #[arg(short = 'n', long)]
        n: u64,
    },
}

/// Invalid arguments exit with 2, like clap's own usage errors.
fn usage_error(msg: impl Display) -> ! {
    eprintln!("{msg}");
    std::process::exit(2);
}

fn read_input(path: Option<&PathBuf>) -> Result<String, Box<dyn Error>> {
    match path {
        Some(p) => Ok(std::fs::read_to_string(p)?),
        None => {
            let mut s = String::new();
            io::stdin().read_to_string(&mut s)?;
            Ok(s)
        }
    }
}

fn load_options(path: Option<&PathBuf>) -> Result<SummaryOptions, Box<dyn Error>> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)?;
            match serde_json::from_str(&text) {
                Ok(opts) => Ok(opts),
                Err(e) => usage_error(format!("invalid config {}: {e}", p.display())),
            }
        }
        None => Ok(SummaryOptions::default()),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_quantile(
    phis: Vec<f64>,
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    capacity: Option<usize>,
    buffers: Option<usize>,
    mode: Option<Mode>,
    initial_rate: Option<u64>,
    growth: Option<u64>,
    max_rate: Option<u64>,
    seed: Option<u64>,
) -> Result<(), Box<dyn Error>> {
    for &phi in &phis {
        if let Err(e) = validate_probe(phi) {
            usage_error(e);
        }
    }

    let mut opts = load_options(config.as_ref())?;
    if let Some(k) = capacity {
        opts.capacity = k;
    }
    if let Some(b) = buffers {
        opts.buffers = b;
    }
    if let Some(s) = seed {
        opts.seed = s;
    }
    opts.mode = match (mode, opts.mode) {
        (Some(m), _) => m
            .into_summary_mode(initial_rate, growth, max_rate)
            .unwrap_or_else(|e| usage_error(e)),
        (None, SummaryMode::Sampled(p)) => Mode::Sampled
            .into_summary_mode(
                Some(initial_rate.unwrap_or(p.initial_rate)),
                Some(growth.unwrap_or(p.growth)),
                Some(max_rate.unwrap_or(p.max_rate)),
            )
            .unwrap_or_else(|e| usage_error(e)),
        (None, exact) => exact,
    };
    if let Err(e) = opts.validate() {
        usage_error(e);
    }

    let text = read_input(input.as_ref())?;
    let xs = parse_numbers(&text).unwrap_or_else(|e| usage_error(e));
    log::debug!(
        "quantile: {} values, k={}, b={}, mode={:?}",
        xs.len(),
        opts.capacity,
        opts.buffers,
        opts.mode
    );

    let summary = Summary::with_options(opts)?.consume(xs)?;
    let estimates = summary.quantiles(&phis)?;
    for (phi, v) in phis.iter().zip(estimates.iter()) {
        println!("{phi}\t{v}");
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.cmd {
        Cmd::Quantile {
            phi,
            input,
            config,
            capacity,
            buffers,
            mode,
            initial_rate,
            growth,
            max_rate,
            seed,
        } => cmd_quantile(
            phi,
            input,
            config,
            capacity,
            buffers,
            mode,
            initial_rate,
            growth,
            max_rate,
            seed,
        )?,
        Cmd::Experiment {
            phi,
            runs,
            epsilon,
            n,
            dist,
            lambda,
            start,
            end,
            seed,
            capacity,
            buffers,
            mode,
            initial_rate,
            growth,
            max_rate,
        } => {
            let phi = validate_probe(phi).unwrap_or_else(|e| usage_error(e));
            let dist =
                parse_dist_str(&dist, lambda, start, end).unwrap_or_else(|e| usage_error(e));
            let mode = mode
                .into_summary_mode(initial_rate, growth, max_rate)
                .unwrap_or_else(|e| usage_error(e));
            let geometry = match (capacity, buffers) {
                (Some(k), Some(b)) => Geometry::new(b, k),
                _ => geometry_covering(epsilon, n as u64).unwrap_or_else(|e| usage_error(e)),
            };
            if runs == 0 {
                usage_error("--runs must be >= 1");
            }

            println!(
                "dataset={} n={} runs={} phi={} b={} k={} mode={}",
                dist.name(),
                n,
                runs,
                phi,
                geometry.buffers,
                geometry.capacity,
                mode_to_str(mode)
            );
            let summary = run_trials(&TrialConfig {
                dist,
                n,
                geometry,
                mode,
                phi,
                runs,
                seed,
            })?;

            println!("mean estimate\t{}", summary.mean_estimate);
            println!("mean exact\t{}", summary.mean_exact);
            println!("max rank error\t{:.6}", summary.max_rank_err);
            println!("mean rank error\t{:.6}", summary.mean_rank_err);
            match summary.welch {
                Some(w) => {
                    println!("welch t\t{:.6}", w.t);
                    println!("welch df\t{:.3}", w.df);
                    println!("p-value\t{:.6}", w.p_value);
                    if w.p_value < epsilon {
                        println!("equal means rejected at alpha={epsilon}");
                    } else {
                        println!("equal means not rejected at alpha={epsilon}");
                    }
                }
                None => println!("welch t\tn/a (need >= 2 runs with non-zero variance)"),
            }
        }
        Cmd::Geometry { epsilon, n } => {
            let g = geometry_covering(epsilon, n).unwrap_or_else(|e| usage_error(e));
            println!("b={}\tk={}\tmemory={}", g.buffers, g.capacity, g.memory());
        }
    }
    Ok(())
}
