use crate::{
    config::Config,
    error::{Error, Result},
    pipeline::RunSummary,
};
use std::{
    ffi::OsString,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Persists the rendered document and the optional run summary.
pub(crate) struct Writer {
    output_path: PathBuf,
    summary_path: Option<PathBuf>,
}

impl Writer {
    /// Creates a new writer from configuration.
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            output_path: config.output_path.clone(),
            summary_path: config.summary_path.clone(),
        }
    }

    /// Paths this writer creates, which must never be collated themselves.
    pub(crate) fn owned_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.output_path.clone(), temp_path_for(&self.output_path)];
        if let Some(summary_path) = &self.summary_path {
            paths.push(temp_path_for(summary_path));
            paths.push(summary_path.clone());
        }
        paths
    }

    /// Writes the document to the configured output path.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// file cannot be written.
    pub(crate) fn write_document(&self, content: &str) -> Result<()> {
        write_file_atomic(&self.output_path, content)?;
        info!("Wrote document to {}", self.output_path.display());
        Ok(())
    }

    /// Writes a pretty-printed JSON summary of the run.
    ///
    /// # Errors
    ///
    /// Returns an error if the summary cannot be serialized or written.
    pub(crate) fn write_summary(&self, path: &Path, summary: &RunSummary) -> Result<()> {
        let json = serde_json::to_string_pretty(summary)?;
        write_file_atomic(path, &json)?;
        info!("Wrote summary to {}", path.display());
        Ok(())
    }
}

/// Temporary sibling used while writing `path`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes a file atomically.
///
/// # Process
///
/// 1. Creates the parent directory if missing
/// 2. Writes content to a temporary sibling file
/// 3. Syncs the temporary file to disk
/// 4. Renames the temporary file over the target path
///
/// A failure at any step leaves the previous target untouched.
fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_path = temp_path_for(path);
    let mut temp_file = fs::File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    drop(temp_file);

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn create_test_config(root: &Path, output: &Path) -> Config {
        Config::builder()
            .root_dir(root)
            .output_path(output)
            .build()
            .unwrap()
    }

    #[test]
    fn test_writer_creates_parent_directory() {
        let temp = assert_fs::TempDir::new().unwrap();
        let output = temp.path().join("docs").join("context.md");

        let writer = Writer::new(&create_test_config(temp.path(), &output));
        writer.write_document("# hello\n").unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "# hello\n");
    }

    #[test]
    fn test_writer_replaces_existing_file_without_leftovers() {
        let temp = assert_fs::TempDir::new().unwrap();
        let existing = temp.child("context.md");
        existing.write_str("old content").unwrap();

        let writer = Writer::new(&create_test_config(temp.path(), existing.path()));
        writer.write_document("new content").unwrap();

        existing.assert("new content");
        assert!(!temp.child("context.md.tmp").exists());
    }

    #[test]
    fn test_writer_writes_summary() {
        let temp = assert_fs::TempDir::new().unwrap();
        let output = temp.path().join("context.md");
        let summary_path = temp.path().join("summary.json");

        let writer = Writer::new(&create_test_config(temp.path(), &output));
        let mut summary = RunSummary::new(temp.path().to_path_buf(), output.clone());
        summary.scanned_count = 3;
        summary.included_count = 3;
        writer.write_summary(&summary_path, &summary).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
        assert_eq!(json["scanned_count"], 3);
        assert_eq!(json["skipped_as_binary"], 0);
    }

    #[test]
    fn test_owned_paths() {
        let temp = assert_fs::TempDir::new().unwrap();
        let output = temp.path().join("context.md");

        let config = Config::builder()
            .root_dir(temp.path())
            .output_path(&output)
            .summary_path(temp.path().join("summary.json"))
            .build()
            .unwrap();
        let owned = Writer::new(&config).owned_paths();

        assert!(owned.contains(&config.output_path));
        assert!(owned.iter().any(|p| p.ends_with("context.md.tmp")));
        assert!(owned.iter().any(|p| p.ends_with("summary.json")));
    }

    #[test]
    fn test_temp_path_for() {
        assert_eq!(
            temp_path_for(Path::new("/out/project_context.md")),
            PathBuf::from("/out/project_context.md.tmp")
        );
    }
}
