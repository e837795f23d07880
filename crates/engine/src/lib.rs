//! Slidereel Compile Engine
//!
//! Turns an ordered timeline of still images and video clips into one
//! concatenated output video by driving an external transcoding tool
//! (ffmpeg) through a sequence of subprocess invocations:
//!
//! - **command:** Pure argument-list construction for segment conversion
//!   and concatenation
//! - **runner:** Subprocess execution with concurrent output draining,
//!   a wall-clock timeout, and a persistent invocation log
//! - **probe:** Video duration lookup via ffprobe, with a fixed fallback
//! - **workspace:** Per-run scratch directory for segments and the manifest
//! - **manifest:** The concat-demuxer list that drives final assembly
//! - **compiler:** The orchestrator tying the pieces together
//!
//! The engine never touches pixel or sample data itself; it only builds
//! commands and files for the external tool and inspects its exit status.

pub mod command;
pub mod compiler;
pub mod manifest;
pub mod probe;
pub mod runner;
pub mod workspace;

pub use command::Resolution;
pub use compiler::{CompileError, CompileRequest, CompiledOutput, CompilerOptions, TimelineCompiler};
pub use probe::{DurationProbe, FfprobeDurationProbe, FixedDurationProbe, FALLBACK_DURATION_SECS};
pub use runner::{InvocationLog, InvocationRecord, ProcessRunner, RunError};
pub use workspace::{CleanupPolicy, ScratchWorkspace};
