use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use colored::Colorize;

use crate::cli::Cli;
use crate::discovery::collect_scenario_files;
use crate::execution::run_suite;
use crate::stats::print_analysis;

/// Runs the suite and returns the number of failed scenarios.
pub fn run() -> usize {
    let cli = Cli::parse();
    let start = Instant::now();

    let files = collect_scenario_files(&cli.path);
    println!(
        "{} {} scenarios...\n",
        "Running".bold().cyan(),
        files.len()
    );

    let summary = run_suite(&cli.path, &files, cli.dispatch, cli.verbose, cli.analyze);
    print_totals(
        summary.passed,
        summary.failed,
        summary.skipped,
        start.elapsed().as_secs_f64(),
    );

    if cli.analyze {
        print_analysis(&summary.analysis);
    }

    if summary.failed > 0 && !cli.verbose {
        print_failure_sample(&summary.failures);
    }
    summary.failed
}

fn print_totals(passed: usize, failed: usize, skipped: usize, elapsed_secs: f64) {
    println!("\n{}", "=".repeat(60));
    println!(
        "Passed: {} | Failed: {} | Skipped: {}",
        passed.to_string().green().bold(),
        failed.to_string().red().bold(),
        skipped.to_string().yellow().bold()
    );
    println!("Completed in {:.2}s", elapsed_secs);
    println!("{}", "=".repeat(60));
}

fn print_failure_sample(failures: &[(PathBuf, String)]) {
    let max_rows = 10;
    let shown = failures.len().min(max_rows);

    println!("\n{}", "Sample failures:".red().bold());
    for (path, reason) in failures.iter().take(shown) {
        println!("  {} - {}", path.display(), reason.replace('\n', "; "));
    }
    if failures.len() > shown {
        println!(
            "  ... and {} more (use --verbose for all)",
            failures.len() - shown
        );
    }
}
