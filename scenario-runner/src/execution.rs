use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use colored::Colorize;
use deferred_core::DispatchMode;
use deferred_core::errors::format_panic;
use rayon::prelude::*;

use crate::runner::{CaseResult, run_scenario_source};
use crate::stats::Analysis;

pub struct SuiteSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: Vec<(PathBuf, String)>,
    pub analysis: Analysis,
}

pub fn run_suite(
    root: &Path,
    files: &[PathBuf],
    dispatch: Option<DispatchMode>,
    verbose: bool,
    analyze: bool,
) -> SuiteSummary {
    // Runtimes are single-threaded; each case builds its own on its worker.
    let records: Vec<_> = files
        .par_iter()
        .map(|path| run_case(path, dispatch))
        .collect();
    let mut summary = SuiteSummary {
        passed: 0,
        failed: 0,
        skipped: 0,
        failures: Vec::new(),
        analysis: Analysis::default(),
    };

    for record in records {
        if analyze {
            summary.analysis.record(root, &record.path, &record.result);
        }
        apply_record(&mut summary, &record.path, &record.result, verbose);
    }

    summary
}

struct CaseRecord {
    path: PathBuf,
    result: CaseResult,
}

fn run_case(path: &Path, dispatch: Option<DispatchMode>) -> CaseRecord {
    let source = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            return CaseRecord {
                path: path.to_path_buf(),
                result: CaseResult::Skipped(format!("failed to read scenario: {err}")),
            };
        }
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| run_scenario_source(&source, dispatch)))
        .unwrap_or_else(|payload| {
            CaseResult::Failed(format!("panic while running scenario: {}", format_panic(payload)))
        });

    CaseRecord {
        path: path.to_path_buf(),
        result,
    }
}

fn apply_record(summary: &mut SuiteSummary, path: &Path, result: &CaseResult, verbose: bool) {
    match result {
        CaseResult::Passed => {
            summary.passed += 1;
            if verbose {
                println!("{} {}", "PASS".green(), path.display());
            }
        }
        CaseResult::Failed(reason) => {
            summary.failed += 1;
            if verbose {
                println!("{} {} - {}", "FAIL".red(), path.display(), reason);
            }
            summary.failures.push((path.to_path_buf(), reason.clone()));
        }
        CaseResult::Skipped(reason) => {
            summary.skipped += 1;
            if verbose {
                println!("{} {} - {}", "SKIP".yellow(), path.display(), reason);
            }
        }
    }
}
