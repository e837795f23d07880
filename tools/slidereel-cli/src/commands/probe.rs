//! Print a media file's probed duration.

use std::path::PathBuf;

use slidereel_common::AppConfig;
use slidereel_engine::{DurationProbe, FfprobeDurationProbe, FALLBACK_DURATION_SECS};

pub fn run(media: PathBuf, config: &AppConfig) -> anyhow::Result<()> {
    if !media.is_file() {
        return Err(anyhow::anyhow!("No such file: {}", media.display()));
    }

    let probe = FfprobeDurationProbe::new(&config.tools.ffprobe);
    let duration = probe.probe(&media);

    println!("{duration}");
    if (duration - FALLBACK_DURATION_SECS).abs() < f64::EPSILON {
        eprintln!("note: this may be the fallback value; run with --verbose for probe details");
    }

    Ok(())
}
