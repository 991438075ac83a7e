use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Scenario files under `root`, in a stable order. Directories whose name
/// starts with `_` hold fixtures and are skipped.
pub fn collect_scenario_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| is_scenario_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

fn is_scenario_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
        && !is_excluded(path)
}

fn is_excluded(path: &Path) -> bool {
    path.components().any(|part| {
        let text = part.as_os_str().to_string_lossy();
        text.len() > 1 && text.starts_with('_')
    })
}
