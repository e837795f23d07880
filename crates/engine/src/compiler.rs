//! The timeline compiler: validation, per-item conversion, manifest
//! assembly, concatenation, and workspace cleanup.

use std::path::PathBuf;
use std::time::Duration;

use slidereel_timeline::Timeline;

use crate::command::{concat_args, image_segment_args, Resolution};
use crate::manifest::{write_manifest, ManifestEntry};
use crate::runner::{InvocationLog, ProcessRunner, DEFAULT_TIMEOUT};
use crate::workspace::{CleanupPolicy, ScratchWorkspace};

/// One compile run's inputs. Constructed per invocation, never reused.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// Snapshot of the timeline, treated as immutable for the run.
    pub timeline: Timeline,

    /// Where the final concatenated video is written.
    pub output_path: PathBuf,

    /// Target resolution as `WIDTHxHEIGHT`, e.g. "1280x720".
    pub resolution: String,

    /// Target frame rate, e.g. "30".
    pub frame_rate: String,
}

/// A successful compile.
#[derive(Debug, Clone)]
pub struct CompiledOutput {
    /// The final output file.
    pub output_path: PathBuf,

    /// How many image segments were encoded along the way.
    pub segments_encoded: usize,
}

/// Why a compile run failed.
///
/// Failure variants produced after subprocess work began embed the retained
/// scratch-workspace path in their message so failed-run artifacts can be
/// inspected.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Rejected before any subprocess was launched.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A specific item's conversion subprocess failed or timed out.
    #[error("failed to convert '{item}': {message}")]
    ItemProcessing { item: PathBuf, message: String },

    /// The final assembly subprocess failed or timed out.
    #[error("concatenation failed: {message}")]
    Concatenation { message: String },

    /// Scratch directory or manifest I/O failed.
    #[error("workspace error: {message}")]
    Workspace { message: String },

    /// The compile task itself could not complete.
    #[error("compile task failed: {message}")]
    Internal { message: String },
}

/// Knobs for a [`TimelineCompiler`].
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Transcoding tool location.
    pub ffmpeg: PathBuf,

    /// Where invocation records are appended.
    pub invocation_log: PathBuf,

    /// Wall-clock limit per subprocess invocation.
    pub timeout: Duration,

    /// Scratch-workspace cleanup policy.
    pub cleanup: CleanupPolicy,

    /// Parent directory for scratch workspaces; system temp when `None`.
    pub scratch_root: Option<PathBuf>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            invocation_log: PathBuf::from("ffmpeg_log.txt"),
            timeout: DEFAULT_TIMEOUT,
            cleanup: CleanupPolicy::OnSuccessOnly,
            scratch_root: None,
        }
    }
}

/// Compiles a timeline into one concatenated video.
///
/// Each run gets its own scratch workspace, so a compiler instance can be
/// shared and runs do not interfere; callers are still expected to issue
/// one compile at a time per output path.
#[derive(Debug, Clone)]
pub struct TimelineCompiler {
    options: CompilerOptions,
}

impl TimelineCompiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    /// Compile the request off the caller's executor thread.
    ///
    /// The pipeline is strictly linear and fail-fast: the first failing
    /// step aborts the run, no retries, no partial-output salvage. Every
    /// failure path returns a value; nothing escapes as a panic.
    pub async fn compile(&self, request: CompileRequest) -> Result<CompiledOutput, CompileError> {
        let options = self.options.clone();
        tokio::task::spawn_blocking(move || compile_blocking(&options, &request))
            .await
            .map_err(|e| CompileError::Internal {
                message: e.to_string(),
            })?
    }
}

fn compile_blocking(
    options: &CompilerOptions,
    request: &CompileRequest,
) -> Result<CompiledOutput, CompileError> {
    let resolution = validate(request)?;

    tracing::info!(
        items = request.timeline.len(),
        resolution = %resolution,
        frame_rate = %request.frame_rate,
        output = %request.output_path.display(),
        "Starting timeline compile"
    );

    let runner = ProcessRunner::new(
        options.ffmpeg.clone(),
        InvocationLog::new(options.invocation_log.clone()),
    )
    .with_timeout(options.timeout);

    let workspace = ScratchWorkspace::create_in(options.cleanup, options.scratch_root.as_deref())
        .map_err(|e| CompileError::Workspace {
            message: format!("failed to create scratch workspace: {e}"),
        })?;

    let mut entries = Vec::with_capacity(request.timeline.len());
    let mut segments_encoded = 0usize;

    for item in &request.timeline {
        if item.is_image() {
            let segment = workspace.segment_path(&item.path);
            tracing::info!(
                image = %item.path.display(),
                duration_secs = item.duration_secs,
                segment = %segment.display(),
                "Converting image to segment"
            );

            let args = image_segment_args(
                &item.path,
                item.duration_secs,
                resolution,
                &request.frame_rate,
                &segment,
            );
            if let Err(e) = runner.run(&args) {
                let retained = keep_for_inspection(workspace);
                return Err(CompileError::ItemProcessing {
                    item: item.path.clone(),
                    message: with_retained(e.to_string(), retained),
                });
            }

            entries.push(ManifestEntry::Segment {
                path: segment,
                duration_secs: item.duration_secs,
            });
            segments_encoded += 1;
        } else {
            tracing::debug!(video = %item.path.display(), "Adding video to manifest");
            entries.push(ManifestEntry::Video {
                path: item.path.clone(),
            });
        }
    }

    let manifest = workspace.manifest_path();
    if let Err(e) = write_manifest(&manifest, &entries) {
        let retained = keep_for_inspection(workspace);
        return Err(CompileError::Workspace {
            message: with_retained(
                format!("failed to write manifest {}: {e}", manifest.display()),
                retained,
            ),
        });
    }

    tracing::info!(manifest = %manifest.display(), entries = entries.len(), "Concatenating");
    let args = concat_args(&manifest, &request.output_path, &request.frame_rate);
    if let Err(e) = runner.run(&args) {
        // A failed concat can leave a truncated output behind; a failed
        // run must not present a usable-looking file.
        std::fs::remove_file(&request.output_path).ok();
        let retained = keep_for_inspection(workspace);
        return Err(CompileError::Concatenation {
            message: with_retained(e.to_string(), retained),
        });
    }

    match std::fs::metadata(&request.output_path) {
        Ok(meta) if meta.len() > 0 => {}
        _ => {
            let retained = keep_for_inspection(workspace);
            return Err(CompileError::Concatenation {
                message: with_retained(
                    format!(
                        "transcoder reported success but output {} is missing or empty",
                        request.output_path.display()
                    ),
                    retained,
                ),
            });
        }
    }

    if let Err(e) = workspace.finish(true) {
        // The output is already complete; a leftover scratch dir is not
        // worth failing the run over.
        tracing::warn!(error = %e, "Failed to delete scratch workspace");
    }

    tracing::info!(
        output = %request.output_path.display(),
        segments_encoded,
        "Timeline compile finished"
    );
    Ok(CompiledOutput {
        output_path: request.output_path.clone(),
        segments_encoded,
    })
}

/// Fail-fast input checks, all before any subprocess is launched.
fn validate(request: &CompileRequest) -> Result<Resolution, CompileError> {
    let invalid = |message: String| CompileError::InvalidInput { message };

    if request.timeline.is_empty() {
        return Err(invalid("timeline is empty; add at least one item".into()));
    }

    let resolution: Resolution = request
        .resolution
        .parse()
        .map_err(|e: crate::command::ParseResolutionError| invalid(e.to_string()))?;

    match request.frame_rate.trim().parse::<f64>() {
        Ok(rate) if rate > 0.0 => {}
        _ => {
            return Err(invalid(format!(
                "invalid frame rate '{}': expected a positive number",
                request.frame_rate
            )));
        }
    }

    // Durations are enforced at the editing boundary; re-check defensively
    // before handing them to the transcoder.
    for item in &request.timeline {
        if !(item.duration_secs > 0.0) {
            return Err(invalid(format!(
                "item '{}' has non-positive duration {}",
                item.path.display(),
                item.duration_secs
            )));
        }
    }

    if let Some(parent) = request.output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(invalid(format!(
                "output directory {} does not exist",
                parent.display()
            )));
        }
    }

    Ok(resolution)
}

fn keep_for_inspection(workspace: ScratchWorkspace) -> Option<PathBuf> {
    workspace.finish(false).ok().flatten()
}

fn with_retained(message: String, retained: Option<PathBuf>) -> String {
    match retained {
        Some(path) => format!("{message}; scratch workspace retained at {}", path.display()),
        None => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidereel_timeline::MediaItem;
    use std::path::Path;

    fn request(timeline: Timeline, output: &Path) -> CompileRequest {
        CompileRequest {
            timeline,
            output_path: output.to_path_buf(),
            resolution: "1280x720".to_string(),
            frame_rate: "30".to_string(),
        }
    }

    #[test]
    fn test_validate_rejects_empty_timeline() {
        let req = request(Timeline::new(), Path::new("out.mp4"));
        let err = validate(&req).unwrap_err();
        assert!(matches!(err, CompileError::InvalidInput { .. }));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_validate_rejects_malformed_resolution() {
        let mut timeline = Timeline::new();
        timeline.push(MediaItem::image("a.png", 2.0));
        let mut req = request(timeline, Path::new("out.mp4"));

        req.resolution = "abc".to_string();
        assert!(matches!(
            validate(&req),
            Err(CompileError::InvalidInput { .. })
        ));

        req.resolution = "1280".to_string();
        assert!(matches!(
            validate(&req),
            Err(CompileError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_frame_rate() {
        let mut timeline = Timeline::new();
        timeline.push(MediaItem::image("a.png", 2.0));
        let mut req = request(timeline, Path::new("out.mp4"));

        req.frame_rate = "fast".to_string();
        assert!(matches!(
            validate(&req),
            Err(CompileError::InvalidInput { .. })
        ));

        req.frame_rate = "0".to_string();
        assert!(matches!(
            validate(&req),
            Err(CompileError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_missing_output_directory() {
        let mut timeline = Timeline::new();
        timeline.push(MediaItem::image("a.png", 2.0));
        let req = request(timeline, Path::new("/nonexistent/dir/out.mp4"));
        let err = validate(&req).unwrap_err();
        assert!(err.to_string().contains("output directory"));
    }

    #[test]
    fn test_validate_accepts_sane_request() {
        let mut timeline = Timeline::new();
        timeline.push(MediaItem::image("a.png", 2.0));
        timeline.push(MediaItem::video("b.mp4", 10.0));
        let req = request(timeline, Path::new("out.mp4"));
        let resolution = validate(&req).unwrap();
        assert_eq!(resolution.width, 1280);
        assert_eq!(resolution.height, 720);
    }
}
