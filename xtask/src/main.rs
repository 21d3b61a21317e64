use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the lane pairing workspace",
    long_about = "A unified CLI for running the lane crawl demo, tests, benchmarks,\n\
                  and CI checks in the lane pairing workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the built-in Chicago -> Atlanta lane and print the pairs
    Demo {
        /// JSON city snapshot to load instead of the built-in fixture
        #[arg(long, env = "LANE_CITIES")]
        cities: Option<String>,
        /// JSON crawl config to load instead of the defaults
        #[arg(long, env = "LANE_CONFIG")]
        config: Option<String>,
    },
    /// Run lane_core unit, integration and property tests
    Test {
        /// Only run this integration test target (e.g. property_tests)
        #[arg(long)]
        target: Option<String>,
    },
    /// Run Criterion benchmarks
    Bench,
    /// Compare benchmarks: stash changes, create baseline, restore, compare
    BenchCompare,
    /// Run CI checks (fmt, clippy, tests, demo, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build and run the demo crawl
    Examples,
    /// Run benchmarks
    Bench,
    /// Run check + examples + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn spawn(program: &str, args: &[&str]) -> ExitStatus {
    eprintln!("+ {program} {}", args.join(" "));
    Command::new(program)
        .args(args)
        .status()
        .unwrap_or_else(|error| {
            eprintln!("failed to execute {program}: {error}");
            exit(1);
        })
}

fn run(program: &str, args: &[&str]) {
    let status = spawn(program, args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_cargo(args: &[&str]) {
    run("cargo", args);
}

fn run_git(args: &[&str]) {
    run("git", args);
}

fn run_demo(cities: Option<&str>, config: Option<&str>) {
    let mut args = vec![
        "run",
        "-p",
        "lane_core",
        "--example",
        "lane_crawl",
        "--release",
    ];
    if let Some(cities) = cities {
        args.extend(["--", cities]);
        if let Some(config) = config {
            args.push(config);
        }
    } else if config.is_some() {
        eprintln!("--config requires --cities");
        exit(2);
    }
    run_cargo(&args);
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test lane_core");
    run_cargo(&["test", "-p", "lane_core"]);
}

fn ci_examples() {
    step("Run lane_crawl (Chicago -> Atlanta)");
    run_demo(None, None);
}

fn ci_bench() {
    step("Run benchmarks");
    run_cargo(&["bench", "--package", "lane_core", "--bench", "performance"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { cities, config } => {
            run_demo(cities.as_deref(), config.as_deref());
        }
        Commands::Test { target } => match target.as_deref() {
            Some(target) => run_cargo(&["test", "-p", "lane_core", "--test", target]),
            None => run_cargo(&["test", "-p", "lane_core"]),
        },
        Commands::Bench => {
            run_cargo(&["bench", "--package", "lane_core", "--bench", "performance"]);
        }
        Commands::BenchCompare => {
            let baseline_dir = Path::new("target/criterion");
            if baseline_dir.exists() {
                step("Removing existing benchmark data");
                if let Err(error) = std::fs::remove_dir_all(baseline_dir) {
                    eprintln!("failed to remove target/criterion: {error}");
                    exit(1);
                }
            }

            step("Stashing current changes");
            run_git(&[
                "stash",
                "push",
                "-m",
                "Temporary stash for benchmark comparison",
            ]);

            step("Running benchmark to create baseline");
            run_cargo(&[
                "bench",
                "--package",
                "lane_core",
                "--bench",
                "performance",
                "--",
                "--save-baseline",
                "main",
            ]);

            step("Reapplying changes");
            run_git(&["stash", "pop"]);

            step("Running benchmark comparing against baseline");
            run_cargo(&[
                "bench",
                "--package",
                "lane_core",
                "--bench",
                "performance",
                "--",
                "--baseline",
                "main",
            ]);

            eprintln!("\nDone! Check the output above to see performance comparison.");
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Examples => ci_examples(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_examples();
                    ci_bench();
                }
            }
            eprintln!("\nCI job passed.");
        }
    }
}
