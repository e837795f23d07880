//! Video duration probing via the external metadata tool.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Duration reported when probing fails for any reason.
pub const FALLBACK_DURATION_SECS: f64 = 5.0;

/// Default wall-clock limit for one probe invocation.
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Polling interval while waiting for the probe process to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Strategy for looking up a video's duration.
///
/// Probing is non-fatal by design: implementations always return a usable
/// duration and never error, so a missing or broken probing tool degrades
/// to the fallback value instead of aborting the pipeline.
pub trait DurationProbe {
    /// Duration of `path` in seconds.
    fn probe(&self, path: &Path) -> f64;
}

/// A probe that always returns the same duration. Useful in tests and
/// offline environments.
#[derive(Debug, Clone, Copy)]
pub struct FixedDurationProbe(pub f64);

impl DurationProbe for FixedDurationProbe {
    fn probe(&self, _path: &Path) -> f64 {
        self.0
    }
}

/// Probes duration by invoking ffprobe and parsing its single-value output.
#[derive(Debug, Clone)]
pub struct FfprobeDurationProbe {
    executable: PathBuf,
    timeout: Duration,
}

impl FfprobeDurationProbe {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn try_probe(&self, path: &Path) -> Result<f64, ProbeFailure> {
        let mut child = Command::new(&self.executable)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ProbeFailure::Launch(e.to_string()))?;

        // Drain stdout off-thread so a chatty tool cannot stall on a full
        // pipe while we wait for it.
        let mut stdout = child.stdout.take().ok_or(ProbeFailure::NoOutput)?;
        let reader = std::thread::spawn(move || {
            let mut buf = String::new();
            stdout.read_to_string(&mut buf).map(|_| buf)
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        child.kill().ok();
                        child.wait().ok();
                        reader.join().ok();
                        return Err(ProbeFailure::Timeout(self.timeout.as_secs()));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    reader.join().ok();
                    return Err(ProbeFailure::Launch(e.to_string()));
                }
            }
        };

        let output = reader
            .join()
            .map_err(|_| ProbeFailure::NoOutput)?
            .map_err(|e| ProbeFailure::Launch(e.to_string()))?;

        if !status.success() {
            return Err(ProbeFailure::Exit(status.code().unwrap_or(-1)));
        }

        output
            .trim()
            .parse::<f64>()
            .map_err(|_| ProbeFailure::Unparseable(output.trim().to_string()))
    }
}

impl DurationProbe for FfprobeDurationProbe {
    fn probe(&self, path: &Path) -> f64 {
        match self.try_probe(path) {
            Ok(duration) if duration > 0.0 => duration,
            Ok(duration) => {
                tracing::warn!(
                    path = %path.display(),
                    duration,
                    "Probe reported non-positive duration, using fallback"
                );
                FALLBACK_DURATION_SECS
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Duration probe failed, using fallback"
                );
                FALLBACK_DURATION_SECS
            }
        }
    }
}

/// Reasons a probe attempt can fail. Internal only; every failure maps to
/// the fallback duration.
#[derive(Debug, thiserror::Error)]
enum ProbeFailure {
    #[error("failed to launch probe: {0}")]
    Launch(String),
    #[error("probe timed out after {0}s")]
    Timeout(u64),
    #[error("probe exited with status {0}")]
    Exit(i32),
    #[error("unparseable probe output '{0}'")]
    Unparseable(String),
    #[error("probe produced no output")]
    NoOutput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_probe_returns_value() {
        let probe = FixedDurationProbe(7.25);
        assert!((probe.probe(Path::new("any.mp4")) - 7.25).abs() < 1e-9);
    }

    #[test]
    fn test_missing_tool_falls_back() {
        let probe = FfprobeDurationProbe::new("/nonexistent/ffprobe");
        let duration = probe.probe(Path::new("clip.mp4"));
        assert!((duration - FALLBACK_DURATION_SECS).abs() < 1e-9);
    }

    #[cfg(unix)]
    #[test]
    fn test_parses_bare_numeric_output() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("fake-ffprobe");
        std::fs::write(&fake, "#!/bin/sh\nprintf '12.5\\n'\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let probe = FfprobeDurationProbe::new(&fake);
        assert!((probe.probe(Path::new("clip.mp4")) - 12.5).abs() < 1e-9);
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_falls_back() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("fake-ffprobe");
        std::fs::write(&fake, "#!/bin/sh\nexit 2\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let probe = FfprobeDurationProbe::new(&fake);
        assert!((probe.probe(Path::new("clip.mp4")) - FALLBACK_DURATION_SECS).abs() < 1e-9);
    }

    #[cfg(unix)]
    #[test]
    fn test_unparseable_output_falls_back() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("fake-ffprobe");
        std::fs::write(&fake, "#!/bin/sh\nprintf 'N/A\\n'\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let probe = FfprobeDurationProbe::new(&fake);
        assert!((probe.probe(Path::new("clip.mp4")) - FALLBACK_DURATION_SECS).abs() < 1e-9);
    }

    #[cfg(unix)]
    #[test]
    fn test_hung_tool_is_killed_and_falls_back() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("fake-ffprobe");
        std::fs::write(&fake, "#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let probe =
            FfprobeDurationProbe::new(&fake).with_timeout(Duration::from_millis(200));
        let started = Instant::now();
        let duration = probe.probe(Path::new("clip.mp4"));
        assert!((duration - FALLBACK_DURATION_SECS).abs() < 1e-9);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
