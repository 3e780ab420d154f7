use crate::{
    config::Config,
    document::DocumentAssembler,
    error::Result,
    file::{ContentLoader, InclusionOutcome},
    language::LanguageTable,
    scanner::Scanner,
    writer::Writer,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Counters accumulated during one run.
///
/// After a completed run `included_count + skipped_for_size +
/// skipped_as_binary == scanned_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Candidates found before size and binary filtering
    pub scanned_count: usize,

    /// Files rendered into the document
    pub included_count: usize,

    /// Files over the size ceiling
    pub skipped_for_size: usize,

    /// Files that looked binary or could not be read
    pub skipped_as_binary: usize,

    /// Resolved root directory
    pub root_dir: PathBuf,

    /// Resolved output document path
    pub output_path: PathBuf,
}

impl RunSummary {
    /// Creates an empty summary for a run over `root_dir`.
    #[must_use]
    pub const fn new(root_dir: PathBuf, output_path: PathBuf) -> Self {
        Self {
            scanned_count: 0,
            included_count: 0,
            skipped_for_size: 0,
            skipped_as_binary: 0,
            root_dir,
            output_path,
        }
    }

    /// Counts one candidate's outcome.
    pub fn record(&mut self, outcome: &InclusionOutcome) {
        match outcome {
            InclusionOutcome::Included { .. } => self.included_count += 1,
            InclusionOutcome::SkippedTooLarge => self.skipped_for_size += 1,
            InclusionOutcome::SkippedBinaryOrUnreadable => self.skipped_as_binary += 1,
        }
    }

    /// Total number of skipped candidates.
    #[must_use]
    pub const fn skipped_count(&self) -> usize {
        self.skipped_for_size + self.skipped_as_binary
    }
}

/// Main pipeline orchestrator: discover, then load and render, then write.
pub struct Pipeline {
    config: Config,
    scanner: Scanner,
    loader: ContentLoader,
    assembler: DocumentAssembler,
    writer: Writer,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let writer = Writer::new(&config);
        let scanner = Scanner::new(config.root_dir.clone(), config.policy())
            .exclude_paths(writer.owned_paths());
        let loader = ContentLoader::new(config.max_bytes());
        let assembler = DocumentAssembler::new(
            config.root_dir.clone(),
            config.output_path.clone(),
            config.max_file_kb,
            LanguageTable::default(),
        );

        Ok(Self {
            config,
            scanner,
            loader,
            assembler,
            writer,
        })
    }

    /// Executes the complete pipeline and returns the run summary.
    ///
    /// # Process
    ///
    /// 1. **Scan**: Collects and sorts every candidate path
    /// 2. **Render**: Loads each candidate and assembles the document
    /// 3. **Write**: Persists the document, and the JSON summary if requested
    ///
    /// Unreadable or binary files never fail the run.
    ///
    /// # Errors
    ///
    /// Returns an error if the document or summary cannot be written.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use project_context::{Config, Pipeline};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder().root_dir(".").build()?;
    ///
    /// let summary = Pipeline::new(config)?.run()?;
    /// println!("Included {} files", summary.included_count);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(root_dir = %self.config.root_dir.display()))]
    pub fn run(self) -> Result<RunSummary> {
        let start_time = Instant::now();

        info!("Stage 1/3: Scanning project...");
        let candidates = self.scanner.scan();
        info!("✓ Found {} candidate files", candidates.len());

        info!("Stage 2/3: Rendering document...");
        let document = self.assembler.assemble(&candidates, &self.loader);
        let summary = document.summary;
        info!(
            "✓ Included {} files ({} too large, {} binary or unreadable)",
            summary.included_count, summary.skipped_for_size, summary.skipped_as_binary
        );

        if self.config.dry_run {
            warn!("Dry run mode enabled - skipping file writes");
        } else {
            info!("Stage 3/3: Writing output...");
            self.writer.write_document(&document.text)?;
            if let Some(summary_path) = &self.config.summary_path {
                self.writer.write_summary(summary_path, &summary)?;
            }
        }

        info!(
            "✓ Pipeline completed in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::fs;

    fn config_for(root: &std::path::Path, output: &std::path::Path) -> Config {
        Config::builder()
            .root_dir(root)
            .output_path(output)
            .build()
            .unwrap()
    }

    #[test]
    fn test_end_to_end_two_python_files() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.py").write_str("print(42)\n").unwrap();
        temp.child("b.py").touch().unwrap();
        let output = temp.path().join("project_context.md");

        let summary = Pipeline::new(config_for(temp.path(), &output))
            .unwrap()
            .run()
            .unwrap();
        let text = fs::read_to_string(&output).unwrap();

        assert_eq!(text.matches("```python\n").count(), 2);
        assert!(text.contains("===== FILE: a.py =====\n\n```python\nprint(42)\n```\n"));
        assert!(text.contains("===== FILE: b.py =====\n\n```python\n\n```\n"));
        assert!(text.ends_with(
            "Included files: 2\nSkipped (too large): 0\nSkipped (binary/non-text): 0\n"
        ));
        assert_eq!(summary.included_count, 2);
        assert_eq!(summary.scanned_count, 2);
    }

    #[test]
    fn test_counters_balance() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src/main.rs").write_str("fn main() {}").unwrap();
        temp.child("big.txt").write_binary(&vec![b'a'; 600 * 1024]).unwrap();
        temp.child("data.json").write_binary(b"{\"a\":\0}").unwrap();
        temp.child("node_modules/dep/index.js").write_binary(&[0u8; 4]).unwrap();
        let output = temp.path().join("out.md");

        let summary = Pipeline::new(config_for(temp.path(), &output))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(summary.scanned_count, 3);
        assert_eq!(summary.included_count, 1);
        assert_eq!(summary.skipped_for_size, 1);
        assert_eq!(summary.skipped_as_binary, 1);
        assert_eq!(
            summary.included_count + summary.skipped_count(),
            summary.scanned_count
        );

        let text = fs::read_to_string(&output).unwrap();
        assert!(!text.contains("node_modules"));
        assert!(!text.contains("===== FILE: big.txt"));
        assert!(!text.contains("===== FILE: data.json"));
    }

    #[test]
    fn test_runs_are_byte_identical() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("b.txt").write_str("b").unwrap();
        temp.child("A.md").write_str("# A").unwrap();
        temp.child("src/lib.rs").write_str("pub fn f() {}\n").unwrap();
        temp.child(".gitignore").write_str("target\n").unwrap();
        let output = temp.path().join("project_context.md");

        Pipeline::new(config_for(temp.path(), &output))
            .unwrap()
            .run()
            .unwrap();
        let first = fs::read(&output).unwrap();

        // the previous output now lives inside the tree and must not leak in
        Pipeline::new(config_for(temp.path(), &output))
            .unwrap()
            .run()
            .unwrap();
        let second = fs::read(&output).unwrap();

        assert_eq!(first, second);
        assert!(!String::from_utf8(second).unwrap().contains("===== FILE: project_context.md"));
    }

    #[test]
    fn test_only_extensions_excludes_default_types() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("Cargo.toml").write_str("[package]\n").unwrap();
        temp.child("src/lib.rs").write_str("pub fn f() {}\n").unwrap();
        let output = temp.path().join("doc.md");

        let config = Config::builder()
            .root_dir(temp.path())
            .output_path(&output)
            .only_extensions(vec![".rs".to_string()])
            .build()
            .unwrap();
        let summary = Pipeline::new(config).unwrap().run().unwrap();

        assert_eq!(summary.scanned_count, 1);
        assert!(!fs::read_to_string(&output).unwrap().contains("Cargo.toml"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("main.rs").write_str("fn main() {}").unwrap();
        let output = temp.path().join("doc.md");
        let summary_path = temp.path().join("summary.json");

        let config = Config::builder()
            .root_dir(temp.path())
            .output_path(&output)
            .summary_path(&summary_path)
            .dry_run(true)
            .build()
            .unwrap();
        let summary = Pipeline::new(config).unwrap().run().unwrap();

        assert_eq!(summary.included_count, 1);
        assert!(!output.exists());
        assert!(!summary_path.exists());
    }

    #[test]
    fn test_summary_json_is_written() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("main.rs").write_str("fn main() {}").unwrap();
        let output = temp.path().join("doc.md");
        let summary_path = temp.path().join("summary.json");

        let config = Config::builder()
            .root_dir(temp.path())
            .output_path(&output)
            .summary_path(&summary_path)
            .build()
            .unwrap();
        Pipeline::new(config).unwrap().run().unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
        assert_eq!(json["scanned_count"], 1);
        assert_eq!(json["included_count"], 1);
        assert_eq!(json["skipped_for_size"], 0);
    }

    #[test]
    fn test_record_counts_each_outcome() {
        let mut summary = RunSummary::new(PathBuf::from("/p"), PathBuf::from("/p/out.md"));
        summary.record(&InclusionOutcome::Included {
            text: String::new(),
            size: 0,
        });
        summary.record(&InclusionOutcome::SkippedTooLarge);
        summary.record(&InclusionOutcome::SkippedBinaryOrUnreadable);
        summary.record(&InclusionOutcome::SkippedBinaryOrUnreadable);

        assert_eq!(summary.included_count, 1);
        assert_eq!(summary.skipped_for_size, 1);
        assert_eq!(summary.skipped_as_binary, 2);
        assert_eq!(summary.skipped_count(), 3);
    }
}
