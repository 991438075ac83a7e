use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::Path;

use colored::Colorize;

use crate::runner::CaseResult;

#[derive(Default, Clone, Copy)]
pub struct SectionStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Per-directory totals plus the most frequent failure reasons.
#[derive(Default)]
pub struct Analysis {
    pub sections: BTreeMap<String, SectionStats>,
    pub failure_messages: BTreeMap<String, usize>,
}

impl Analysis {
    pub fn record(&mut self, root: &Path, path: &Path, result: &CaseResult) {
        let stats = self.sections.entry(section_of(root, path)).or_default();
        stats.total += 1;
        match result {
            CaseResult::Passed => stats.passed += 1,
            CaseResult::Failed(reason) => {
                stats.failed += 1;
                let first_line = reason.lines().next().unwrap_or_default().trim().to_string();
                *self.failure_messages.entry(first_line).or_insert(0) += 1;
            }
            CaseResult::Skipped(_) => stats.skipped += 1,
        }
    }
}

fn section_of(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    match rel.parent().map(|parent| parent.to_string_lossy().to_string()) {
        Some(parent) if !parent.is_empty() => parent,
        _ => "(root)".to_string(),
    }
}

pub fn print_analysis(analysis: &Analysis) {
    println!("\n{}", "Analysis (--analyze)".bold().cyan());
    for (name, stats) in &analysis.sections {
        println!(
            "  {:28} {:>4} scenarios | pass {:>6} | fail {:>4} | skip {:>4}",
            name,
            stats.total,
            rate(stats.passed, stats.total),
            stats.failed,
            stats.skipped
        );
    }

    let mut failures: Vec<_> = analysis.failure_messages.iter().collect();
    failures.sort_by_key(|(_, count)| Reverse(**count));
    if failures.is_empty() {
        return;
    }
    println!("\n{}", "Most common failure messages:".bold());
    for (message, count) in failures.into_iter().take(10) {
        println!("  {:>4}x {}", count, message);
    }
}

fn rate(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        return "n/a".to_string();
    }
    format!("{:.1}%", numerator as f64 * 100.0 / denominator as f64)
}
