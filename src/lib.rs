//! # project-context
//!
//! Collates a project's text source files into a single Markdown document,
//! one heading and fenced code block per file, for sharing with humans or
//! language models.
//!
//! ## Quick Start
//!
//! ```no_run
//! use project_context::{Config, Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .root_dir("./my-project")
//!     .output_path("project_context.md")
//!     .max_file_kb(512)
//!     .build()?;
//!
//! let summary = Pipeline::new(config)?.run()?;
//! println!("{} files included", summary.included_count);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! A run is a single synchronous pass in two phases:
//! 1. **Scanner**: Walks the tree once, pruning excluded directories, and
//!    returns every candidate file sorted case-insensitively
//! 2. **Loader**: Skips oversized and binary-looking files, decodes the rest
//! 3. **Assembler**: Renders header, table of contents, file sections and footer
//! 4. **Writer**: Persists the document atomically

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod document;
mod error;
mod file;
mod language;
mod pipeline;
mod policy;
mod scanner;
mod writer;

pub use config::{Config, ConfigBuilder};
pub use document::{Document, DocumentAssembler, human_kilobytes};
pub use error::{Error, Result};
pub use file::{ContentLoader, InclusionOutcome, is_probably_binary};
pub use language::LanguageTable;
pub use pipeline::{Pipeline, RunSummary};
pub use policy::{Policy, extension_of};

/// Runs the complete collation with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Root directory doesn't exist or is not a directory
/// - The output document cannot be written
///
/// # Examples
///
/// ```no_run
/// use project_context::{Config, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder().root_dir(".").build()?;
///
/// run(config)?;
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config) -> Result<RunSummary> {
    Pipeline::new(config)?.run()
}
