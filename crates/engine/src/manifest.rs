//! The concat-demuxer manifest.
//!
//! One record per timeline entry, in play order: a `file` line for every
//! entry, plus a `duration` hint for image-derived segments. Videos carry
//! no hint; the concat step relies on their encoded length.

use std::io;
use std::path::{Path, PathBuf};

/// One manifest record.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestEntry {
    /// An image-derived segment with its requested duration.
    Segment {
        path: PathBuf,
        duration_secs: f64,
    },
    /// A video clip referenced by its original path, unmodified.
    Video { path: PathBuf },
}

/// Render entries into the concat-demuxer text format.
pub fn render_manifest(entries: &[ManifestEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        match entry {
            ManifestEntry::Segment {
                path,
                duration_secs,
            } => {
                out.push_str(&format!(
                    "file '{}'\nduration {duration_secs}\n",
                    escape_concat_path(path)
                ));
            }
            ManifestEntry::Video { path } => {
                out.push_str(&format!("file '{}'\n", escape_concat_path(path)));
            }
        }
    }
    out
}

/// Write the manifest file that drives final concatenation.
pub fn write_manifest(path: &Path, entries: &[ManifestEntry]) -> io::Result<()> {
    std::fs::write(path, render_manifest(entries))
}

/// Escape a path for a single-quoted concat-demuxer string.
///
/// The demuxer has no in-string escape; a literal quote is written by
/// closing the string, emitting an escaped quote, and reopening it.
fn escape_concat_path(path: &Path) -> String {
    path.display().to_string().replace('\'', r"'\''")
}
