use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tracing::debug;

const SAMPLE_BYTES: usize = 8192;
const CONTROL_RATIO_THRESHOLD: f64 = 0.30;

/// Result of evaluating one candidate file for inclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InclusionOutcome {
    /// The file is included with its decoded text.
    Included {
        /// File content, UTF-8 with invalid sequences replaced and line
        /// endings normalized to `\n`
        text: String,
        /// Size on disk in bytes
        size: u64,
    },

    /// The file exceeds the configured size ceiling.
    SkippedTooLarge,

    /// The file looks binary, or could not be stat'ed or read.
    SkippedBinaryOrUnreadable,
}

impl InclusionOutcome {
    /// Returns true if the file made it into the document.
    #[must_use]
    pub const fn is_included(&self) -> bool {
        matches!(self, Self::Included { .. })
    }
}

/// Determines if a file is probably binary by sampling its first 8 KB.
///
/// # Algorithm
///
/// 1. A NUL byte anywhere in the sample means binary
/// 2. An empty sample means text
/// 3. Otherwise the file is binary when more than 30% of the sample are
///    control bytes (below 9, or between 13 and 32 exclusive)
///
/// Any IO failure counts as binary.
#[must_use]
pub fn is_probably_binary(path: &Path) -> bool {
    match read_sample(path) {
        Ok(sample) => sample_looks_binary(&sample),
        Err(e) => {
            debug!("Treating {} as binary, sample failed: {}", path.display(), e);
            true
        }
    }
}

fn read_sample(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut sample = Vec::with_capacity(SAMPLE_BYTES);
    file.take(SAMPLE_BYTES as u64).read_to_end(&mut sample)?;
    Ok(sample)
}

fn sample_looks_binary(sample: &[u8]) -> bool {
    if memchr::memchr(0, sample).is_some() {
        return true;
    }
    if sample.is_empty() {
        return false;
    }

    let control_count = sample
        .iter()
        .filter(|&&b| b < 9 || (13 < b && b < 32))
        .count();
    let control_ratio = control_count as f64 / sample.len() as f64;

    control_ratio > CONTROL_RATIO_THRESHOLD
}

/// Converts `\r\n` and lone `\r` line endings to `\n`.
fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Decides inclusion for candidate files and loads their text.
#[derive(Debug, Clone, Copy)]
pub struct ContentLoader {
    max_bytes: u64,
}

impl ContentLoader {
    /// Creates a loader that skips files larger than `max_bytes`.
    #[must_use]
    pub const fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Evaluates one candidate.
    ///
    /// The size check runs first so oversized files are never opened. Failures
    /// at any step map to [`InclusionOutcome::SkippedBinaryOrUnreadable`].
    #[must_use]
    pub fn load(&self, path: &Path) -> InclusionOutcome {
        let size = match fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                debug!("Cannot stat {}: {}", path.display(), e);
                return InclusionOutcome::SkippedBinaryOrUnreadable;
            }
        };

        if size > self.max_bytes {
            debug!("Skipping {} ({} bytes > {})", path.display(), size, self.max_bytes);
            return InclusionOutcome::SkippedTooLarge;
        }

        if is_probably_binary(path) {
            debug!("Skipping binary file: {}", path.display());
            return InclusionOutcome::SkippedBinaryOrUnreadable;
        }

        match fs::read(path) {
            Ok(bytes) => InclusionOutcome::Included {
                text: normalize_newlines(&String::from_utf8_lossy(&bytes)),
                size,
            },
            Err(e) => {
                debug!("Cannot read {}: {}", path.display(), e);
                InclusionOutcome::SkippedBinaryOrUnreadable
            }
        }
    }
}
