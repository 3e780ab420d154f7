use crate::error::{Error, Result};
use crate::policy::Policy;
use std::path::{Path, PathBuf};

const DEFAULT_OUTPUT_PATH: &str = "project_context.md";
const DEFAULT_MAX_FILE_KB: u64 = 512;

/// Configuration for one collation run.
///
/// Use [`Config::builder()`] to construct a new configuration. Paths held by a
/// built configuration are absolute: the root is canonicalized and the output
/// path is resolved against the current directory.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Root directory of the project to collate
    pub root_dir: PathBuf,

    /// Where the Markdown document is written
    pub output_path: PathBuf,

    /// Per-file size ceiling in KB
    pub max_file_kb: u64,

    /// Consider hidden files and directories
    pub include_hidden: bool,

    /// Directory names excluded on top of the defaults
    pub extra_excluded_dirs: Vec<String>,

    /// When non-empty, replaces the default extension allow-list
    pub only_extensions: Vec<String>,

    /// Render without writing the document
    pub dry_run: bool,

    /// Optional path for a JSON run summary
    pub summary_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use project_context::Config;
    ///
    /// let config = Config::builder()
    ///     .root_dir("./my-project")
    ///     .max_file_kb(256)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Root directory doesn't exist
    /// - Root path is not a directory
    /// - The size ceiling is zero
    pub fn validate(&self) -> Result<()> {
        if !self.root_dir.exists() {
            return Err(Error::root_not_found(&self.root_dir));
        }

        if !self.root_dir.is_dir() {
            return Err(Error::config(format!(
                "Root path is not a directory: {}",
                self.root_dir.display()
            )));
        }

        if self.max_file_kb == 0 {
            return Err(Error::config("max_file_kb must be greater than 0"));
        }

        if self.output_path.is_dir() {
            return Err(Error::config(format!(
                "Output path is a directory: {}",
                self.output_path.display()
            )));
        }

        Ok(())
    }

    /// Per-file size ceiling in bytes.
    #[must_use]
    pub const fn max_bytes(&self) -> u64 {
        self.max_file_kb.saturating_mul(1024)
    }

    /// Builds the inclusion policy for this run.
    #[must_use]
    pub fn policy(&self) -> Policy {
        Policy::with_overrides(
            &self.extra_excluded_dirs,
            &self.only_extensions,
            self.include_hidden,
        )
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    root_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
    max_file_kb: Option<u64>,
    include_hidden: bool,
    extra_excluded_dirs: Vec<String>,
    only_extensions: Vec<String>,
    dry_run: bool,
    summary_path: Option<PathBuf>,
}

impl ConfigBuilder {
    /// Sets the root directory to scan.
    #[must_use]
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(path.into());
        self
    }

    /// Sets the output document path.
    #[must_use]
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Sets the per-file size ceiling in KB.
    #[must_use]
    pub fn max_file_kb(mut self, kb: u64) -> Self {
        self.max_file_kb = Some(kb);
        self
    }

    /// Enables or disables hidden files and directories.
    #[must_use]
    pub fn include_hidden(mut self, enabled: bool) -> Self {
        self.include_hidden = enabled;
        self
    }

    /// Adds directory names to the default exclusions.
    #[must_use]
    pub fn extra_excluded_dirs(mut self, names: Vec<String>) -> Self {
        self.extra_excluded_dirs = names;
        self
    }

    /// Restricts candidates to these extensions (`.rs`, `rs` and `.RS` are equivalent).
    #[must_use]
    pub fn only_extensions(mut self, extensions: Vec<String>) -> Self {
        self.only_extensions = extensions;
        self
    }

    /// Enables dry run mode (no file writes).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Writes a JSON run summary to `path`.
    #[must_use]
    pub fn summary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.summary_path = Some(path.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or a path cannot be resolved.
    pub fn build(self) -> Result<Config> {
        let mut config = Config {
            root_dir: self.root_dir.unwrap_or_else(|| PathBuf::from(".")),
            output_path: self
                .output_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            max_file_kb: self.max_file_kb.unwrap_or(DEFAULT_MAX_FILE_KB),
            include_hidden: self.include_hidden,
            extra_excluded_dirs: self.extra_excluded_dirs,
            only_extensions: self.only_extensions,
            dry_run: self.dry_run,
            summary_path: self.summary_path,
        };

        config.validate()?;

        config.root_dir = config
            .root_dir
            .canonicalize()
            .map_err(|e| Error::io(&config.root_dir, e))?;
        config.output_path = absolutize(&config.output_path)?;
        config.summary_path = config.summary_path.as_deref().map(absolutize).transpose()?;

        Ok(config)
    }
}

/// Makes `path` absolute, canonicalizing its parent when that exists so the
/// result compares equal to paths produced by walking a canonical root.
fn absolutize(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| Error::io(".", e))?
            .join(path)
    };

    let resolved = absolute
        .parent()
        .zip(absolute.file_name())
        .and_then(|(parent, name)| parent.canonicalize().ok().map(|p| p.join(name)));
    Ok(resolved.unwrap_or(absolute))
}
