//! Markdown rendering of the collated project.
//!
//! The document has four parts in fixed order: a header with run metadata, a
//! table of contents listing every candidate, one fenced section per included
//! file, and a footer with the outcome counters. Given the same tree and the
//! same options the output is byte-identical.

use crate::{
    file::{ContentLoader, InclusionOutcome},
    language::LanguageTable,
    pipeline::RunSummary,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

const TITLE: &str = "# Project Context Collation";

/// Rendered document together with the counters gathered while rendering it.
#[derive(Debug, Clone)]
pub struct Document {
    /// Complete Markdown text
    pub text: String,

    /// Counters for the run
    pub summary: RunSummary,
}

/// Renders candidates into a single Markdown document.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    root_dir: PathBuf,
    output_path: PathBuf,
    max_file_kb: u64,
    languages: LanguageTable,
}

impl DocumentAssembler {
    /// Creates an assembler for files under `root_dir`.
    #[must_use]
    pub fn new(
        root_dir: PathBuf,
        output_path: PathBuf,
        max_file_kb: u64,
        languages: LanguageTable,
    ) -> Self {
        Self {
            root_dir,
            output_path,
            max_file_kb,
            languages,
        }
    }

    /// Renders the document for `candidates`, which must already be in
    /// document order.
    ///
    /// The table of contents lists every candidate whose size can still be
    /// read; each candidate is then loaded once through `loader` and either
    /// rendered or counted as skipped.
    #[must_use]
    pub fn assemble(&self, candidates: &[PathBuf], loader: &ContentLoader) -> Document {
        let mut summary = RunSummary::new(self.root_dir.clone(), self.output_path.clone());
        summary.scanned_count = candidates.len();

        let mut out = String::new();
        self.render_header(&mut out, candidates.len());
        self.render_toc(&mut out, candidates);

        for path in candidates {
            let outcome = loader.load(path);
            summary.record(&outcome);

            if let InclusionOutcome::Included { text, .. } = outcome {
                self.render_file(&mut out, path, &text);
            }
        }

        render_footer(&mut out, &summary);

        Document { text: out, summary }
    }

    fn render_header(&self, out: &mut String, scanned: usize) {
        out.push_str(TITLE);
        out.push_str("\n\n");
        out.push_str(&format!("- Root: `{}`\n", self.root_dir.display()));
        out.push_str(&format!(
            "- File count scanned (pre-size/binary filter): {scanned}\n"
        ));
        out.push_str(&format!(
            "- Max file size included: {} KB\n",
            self.max_file_kb
        ));
    }

    fn render_toc(&self, out: &mut String, candidates: &[PathBuf]) {
        out.push_str("\n## Table of Contents\n\n");

        for path in candidates {
            match fs::metadata(path) {
                Ok(metadata) => out.push_str(&format!(
                    "- `{}` ({})\n",
                    self.relative(path).display(),
                    human_kilobytes(metadata.len())
                )),
                Err(e) => debug!("Omitting {} from contents: {}", path.display(), e),
            }
        }

        out.push_str("\n---\n\n");
    }

    fn render_file(&self, out: &mut String, path: &Path, text: &str) {
        trace!("Rendering {}", path.display());

        out.push_str(&format!(
            "===== FILE: {} =====\n\n",
            self.relative(path).display()
        ));
        match self.languages.tag_for(path) {
            Some(tag) => out.push_str(&format!("```{tag}\n")),
            None => out.push_str("```\n"),
        }
        out.push_str(text.trim_end_matches('\n'));
        out.push_str("\n```\n\n");
    }

    fn relative(&self, path: &Path) -> PathBuf {
        pathdiff::diff_paths(path, &self.root_dir).unwrap_or_else(|| path.to_path_buf())
    }
}

fn render_footer(out: &mut String, summary: &RunSummary) {
    out.push_str("\n---\n");
    out.push_str(&format!("Included files: {}\n", summary.included_count));
    out.push_str(&format!("Skipped (too large): {}\n", summary.skipped_for_size));
    out.push_str(&format!(
        "Skipped (binary/non-text): {}\n",
        summary.skipped_as_binary
    ));
}

/// Formats a byte count as kilobytes with one decimal place.
#[must_use]
pub fn human_kilobytes(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}
