//! Check that the external tools can be spawned.

use std::path::Path;
use std::process::{Command, Stdio};

use slidereel_common::AppConfig;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Slidereel System Check");
    println!("{}", "=".repeat(50));

    let ffmpeg_ok = tool_responds(&config.tools.ffmpeg);
    let ffprobe_ok = tool_responds(&config.tools.ffprobe);

    report("Transcoder (ffmpeg)", &config.tools.ffmpeg, ffmpeg_ok);
    report("Prober (ffprobe)", &config.tools.ffprobe, ffprobe_ok);
    println!("Invocation log: {}", config.invocation_log.display());

    println!();
    if ffmpeg_ok && ffprobe_ok {
        println!("All external tools are available. Slidereel is ready.");
        Ok(())
    } else if ffmpeg_ok {
        // Probing failures fall back to a default duration, so a missing
        // ffprobe degrades rather than blocks.
        println!("ffprobe is missing; video durations will use the fallback value.");
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "ffmpeg is not spawnable; compiling will fail. Install it or set its path in the config."
        ))
    }
}

fn report(label: &str, path: &Path, ok: bool) {
    if ok {
        println!("[OK] {label}: {}", path.display());
    } else {
        println!("[MISSING] {label}: {}", path.display());
    }
}

/// Whether spawning `<tool> -version` succeeds.
fn tool_responds(path: &Path) -> bool {
    Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
