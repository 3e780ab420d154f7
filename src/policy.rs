//! Directory exclusion and extension allow-list rules.
//!
//! A [`Policy`] is built once per run from the default tables below, adjusted
//! by the caller's overrides, and then only queried.

use std::collections::HashSet;
use std::path::Path;

/// Directory names that are never descended into.
const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    ".idea",
    ".vs",
    ".vscode",
    ".godot",
    ".import",
    ".cache",
    "target",
    "node_modules",
    "dist",
    "build",
    "out",
    "__pycache__",
];

/// Extensions considered text or code.
const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    // Godot
    ".gd", ".tres", ".cfg", ".ini", ".shader", ".gdshader",
    // Rust
    ".rs", ".toml", ".md",
    // C / C++
    ".h", ".hpp", ".c", ".cpp", ".cc", ".cxx",
    // Web / tooling
    ".json", ".yml", ".yaml", ".js", ".ts", ".html", ".css",
    // Scripts
    ".py", ".ps1", ".bat", ".sh", ".zsh",
    // Misc text
    ".txt", ".csv", ".gitattributes", ".gitignore", ".editorconfig",
];

/// Dotfiles that bypass the hidden-file rule.
const ALWAYS_VISIBLE_EXTENSIONS: &[&str] = &[".gitignore", ".gitattributes", ".editorconfig"];

/// Combined directory-exclusion and extension-allow configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    excluded_dirs: HashSet<String>,
    allowed_extensions: HashSet<String>,
    include_hidden: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| (*s).to_string()).collect(),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            include_hidden: false,
        }
    }
}

impl Policy {
    /// Builds a policy from the defaults and the caller's overrides.
    ///
    /// `extra_dirs` is added to the default exclusions. A non-empty
    /// `only_extensions` replaces the default allow-list entirely.
    #[must_use]
    pub fn with_overrides<D, E>(extra_dirs: D, only_extensions: E, include_hidden: bool) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let mut policy = Self {
            include_hidden,
            ..Self::default()
        };

        policy
            .excluded_dirs
            .extend(extra_dirs.into_iter().map(|d| d.as_ref().to_string()));

        let only: HashSet<String> = only_extensions
            .into_iter()
            .filter_map(|e| normalize_extension(e.as_ref()))
            .collect();
        if !only.is_empty() {
            policy.allowed_extensions = only;
        }

        policy
    }

    /// Returns true if a directory with this name must not be descended into.
    #[must_use]
    pub fn prunes_dir(&self, name: &str) -> bool {
        if self.excluded_dirs.contains(name) {
            return true;
        }
        !self.include_hidden && name.starts_with('.')
    }

    /// Applies the hidden-file rule and then the extension rule to a file.
    #[must_use]
    pub fn admits_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let extension = extension_of(path);

        if !self.include_hidden && name.starts_with('.') {
            let always_visible = extension
                .as_deref()
                .is_some_and(|ext| ALWAYS_VISIBLE_EXTENSIONS.contains(&ext));
            if !always_visible {
                return false;
            }
        }

        self.allows_extension(path)
    }

    /// Returns true if the file's extension is on the allow-list.
    #[must_use]
    pub fn allows_extension(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.allowed_extensions.contains(&ext))
    }
}

/// Returns the lower-cased, dot-prefixed extension of `path`.
///
/// A name made of a leading dot and no other dot (`.gitignore`) is its own
/// extension. Names without a dot, or ending in one, have none.
#[must_use]
pub fn extension_of(path: &Path) -> Option<String> {
    match path.extension() {
        Some(ext) if !ext.is_empty() => Some(format!(".{}", ext.to_string_lossy().to_lowercase())),
        Some(_) => None,
        None => {
            let name = path.file_name()?.to_string_lossy();
            (name.len() > 1 && name.starts_with('.')).then(|| name.to_lowercase())
        }
    }
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        Some(lower)
    } else {
        Some(format!(".{lower}"))
    }
}
