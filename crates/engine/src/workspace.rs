//! Per-run scratch workspace for segments and the manifest.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// What to do with the scratch directory when a compile run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Delete only after a fully successful run; keep failed-run artifacts
    /// on disk for postmortem inspection.
    OnSuccessOnly,
    /// Delete regardless of outcome.
    Always,
}

/// A fresh, uniquely named scratch directory for one compile run.
///
/// Every run gets its own directory, so concurrent runs never write into
/// each other's workspace.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: TempDir,
    policy: CleanupPolicy,
}

impl ScratchWorkspace {
    /// Create a workspace under the system temp directory.
    pub fn create(policy: CleanupPolicy) -> io::Result<Self> {
        Self::create_in(policy, None)
    }

    /// Create a workspace under `root`, or the system temp directory if
    /// `root` is `None`.
    pub fn create_in(policy: CleanupPolicy, root: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("slidereel-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        tracing::debug!(workspace = %dir.path().display(), "Created scratch workspace");
        Ok(Self { dir, policy })
    }

    /// Path of the workspace directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Derive a uniquely named segment path for an image source.
    ///
    /// The fresh suffix avoids collisions when the same source is compiled
    /// repeatedly or appears twice in one timeline.
    pub fn segment_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("segment");
        self.dir
            .path()
            .join(format!("{stem}_{}.mp4", uuid::Uuid::new_v4()))
    }

    /// Path of the manifest file inside the workspace.
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.path().join("manifest.txt")
    }

    /// End the run, applying the cleanup policy.
    ///
    /// Returns the retained directory path when artifacts are kept for
    /// inspection, `None` when the directory was deleted.
    pub fn finish(self, success: bool) -> io::Result<Option<PathBuf>> {
        if success || self.policy == CleanupPolicy::Always {
            let path = self.dir.path().to_path_buf();
            self.dir.close()?;
            tracing::debug!(workspace = %path.display(), "Deleted scratch workspace");
            Ok(None)
        } else {
            let path = self.dir.keep();
            tracing::info!(workspace = %path.display(), "Retained scratch workspace for inspection");
            Ok(Some(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_deletes_workspace() {
        let ws = ScratchWorkspace::create(CleanupPolicy::OnSuccessOnly).unwrap();
        let path = ws.path().to_path_buf();
        assert!(path.is_dir());

        let retained = ws.finish(true).unwrap();
        assert!(retained.is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_failure_retains_workspace() {
        let ws = ScratchWorkspace::create(CleanupPolicy::OnSuccessOnly).unwrap();
        let path = ws.path().to_path_buf();

        let retained = ws.finish(false).unwrap();
        assert_eq!(retained.as_deref(), Some(path.as_path()));
        assert!(path.is_dir());

        std::fs::remove_dir_all(&path).ok();
    }

    #[test]
    fn test_always_policy_deletes_on_failure() {
        let ws = ScratchWorkspace::create(CleanupPolicy::Always).unwrap();
        let path = ws.path().to_path_buf();

        let retained = ws.finish(false).unwrap();
        assert!(retained.is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_segment_paths_are_unique_per_call() {
        let ws = ScratchWorkspace::create(CleanupPolicy::Always).unwrap();
        let source = Path::new("/media/photo.png");

        let a = ws.segment_path(source);
        let b = ws.segment_path(source);
        assert_ne!(a, b);
        assert!(a.starts_with(ws.path()));
        assert!(a.file_name().unwrap().to_str().unwrap().starts_with("photo_"));
        assert!(a.extension().unwrap() == "mp4");
    }

    #[test]
    fn test_create_in_uses_given_root() {
        let root = tempfile::tempdir().unwrap();
        let ws = ScratchWorkspace::create_in(CleanupPolicy::Always, Some(root.path())).unwrap();
        assert!(ws.path().starts_with(root.path()));
    }
}
