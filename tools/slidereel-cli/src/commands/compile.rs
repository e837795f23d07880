//! Compile a timeline into one concatenated video.

use std::path::PathBuf;
use std::time::Duration;

use slidereel_common::AppConfig;
use slidereel_engine::{CleanupPolicy, CompileRequest, CompilerOptions, TimelineCompiler};
use slidereel_timeline::Timeline;

pub async fn run(
    file: PathBuf,
    output: PathBuf,
    resolution: Option<String>,
    fps: Option<String>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let timeline =
        Timeline::load(&file).map_err(|e| anyhow::anyhow!("Failed to load timeline: {e}"))?;

    let resolution = resolution.unwrap_or_else(|| config.compile.resolution.clone());
    let frame_rate = fps.unwrap_or_else(|| config.compile.frame_rate.clone());

    println!("Compiling timeline: {}", file.display());
    println!("  Items: {}", timeline.len());
    println!("  Output: {}", output.display());
    println!("  Resolution: {resolution} @ {frame_rate}fps");

    let compiler = TimelineCompiler::new(CompilerOptions {
        ffmpeg: config.tools.ffmpeg.clone(),
        invocation_log: config.invocation_log.clone(),
        timeout: Duration::from_secs(config.compile.subprocess_timeout_secs),
        cleanup: CleanupPolicy::OnSuccessOnly,
        scratch_root: None,
    });

    let request = CompileRequest {
        timeline,
        output_path: output,
        resolution,
        frame_rate,
    };

    match compiler.compile(request).await {
        Ok(result) => {
            println!(
                "Compile complete: {} ({} image segment(s) encoded)",
                result.output_path.display(),
                result.segments_encoded
            );
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Compile failed: {e}\nInvocation log: {}",
            config.invocation_log.display()
        )),
    }
}
