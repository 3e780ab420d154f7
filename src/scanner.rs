use crate::policy::Policy;
use std::cell::Cell;
use std::path::PathBuf;
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

/// Statistics collected during scanning.
#[derive(Debug, Default, Clone)]
pub(crate) struct ScanStats {
    /// Directories descended into, root included
    pub dirs_visited: usize,

    /// Directories pruned by the policy
    pub dirs_pruned: usize,

    /// Files rejected by the hidden-file or extension rule
    pub files_rejected: usize,

    /// Walk errors encountered
    pub errors: usize,
}

/// Walks the project tree and collects candidate paths.
pub(crate) struct Scanner {
    root_dir: PathBuf,
    policy: Policy,
    excluded_paths: Vec<PathBuf>,
}

impl Scanner {
    /// Creates a scanner for `root_dir` governed by `policy`.
    pub(crate) const fn new(root_dir: PathBuf, policy: Policy) -> Self {
        Self {
            root_dir,
            policy,
            excluded_paths: Vec::new(),
        }
    }

    /// Never reports these exact paths as candidates.
    pub(crate) fn exclude_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.excluded_paths.extend(paths);
        self
    }

    /// Scans the root directory and returns candidates in document order.
    ///
    /// Pruned directories are never opened. Walk errors are logged and
    /// skipped; they never abort the scan.
    pub(crate) fn scan(&self) -> Vec<PathBuf> {
        let mut stats = ScanStats::default();
        let mut candidates = Vec::new();
        let pruned = Cell::new(0usize);

        debug!("Starting scan of {}", self.root_dir.display());

        let walker = WalkDir::new(&self.root_dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let keep = self.keep_entry(entry);
                if !keep {
                    pruned.set(pruned.get() + 1);
                }
                keep
            });

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Walk error: {}", e);
                    stats.errors += 1;
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                stats.dirs_visited += 1;
                continue;
            }
            if !file_type.is_file() {
                trace!("Skipping non-regular entry: {}", entry.path().display());
                continue;
            }

            let path = entry.path();
            if self.excluded_paths.iter().any(|p| p == path) {
                trace!("Skipping output file: {}", path.display());
                continue;
            }
            if self.policy.admits_file(path) {
                trace!("Candidate: {}", path.display());
                candidates.push(entry.into_path());
            } else {
                stats.files_rejected += 1;
            }
        }

        stats.dirs_pruned = pruned.get();

        sort_candidates(&mut candidates);

        debug!(
            "Scan complete: {} candidates, {} dirs visited, {} pruned, {} files rejected, {} errors",
            candidates.len(),
            stats.dirs_visited,
            stats.dirs_pruned,
            stats.files_rejected,
            stats.errors
        );

        candidates
    }

    fn keep_entry(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        if self.policy.prunes_dir(&name) {
            debug!("Pruning directory: {}", entry.path().display());
            return false;
        }
        true
    }
}

/// Sorts by the case-folded path string; equal keys keep traversal order.
pub(crate) fn sort_candidates(candidates: &mut [PathBuf]) {
    candidates.sort_by_key(|p| p.to_string_lossy().to_lowercase());
}
