//! Append media items to a timeline.

use std::path::PathBuf;

use slidereel_common::AppConfig;
use slidereel_engine::{DurationProbe, FfprobeDurationProbe};
use slidereel_timeline::{MediaItem, MediaKind, Timeline};

pub fn run(
    file: PathBuf,
    media: Vec<PathBuf>,
    force_image: bool,
    force_video: bool,
    duration: Option<f64>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    if media.is_empty() {
        return Err(anyhow::anyhow!("No media files given"));
    }

    if let Some(d) = duration {
        if d <= 0.0 {
            return Err(anyhow::anyhow!("Duration must be greater than zero"));
        }
    }

    let mut timeline =
        Timeline::load(&file).map_err(|e| anyhow::anyhow!("Failed to load timeline: {e}"))?;

    let probe = FfprobeDurationProbe::new(&config.tools.ffprobe);

    for path in media {
        if !path.is_file() {
            return Err(anyhow::anyhow!("No such file: {}", path.display()));
        }

        let kind = if force_image {
            MediaKind::Image
        } else if force_video {
            MediaKind::Video
        } else {
            MediaKind::from_path(&path).ok_or_else(|| {
                anyhow::anyhow!(
                    "Cannot classify {} by extension; pass --image or --video",
                    path.display()
                )
            })?
        };

        let item = match kind {
            MediaKind::Image => {
                let secs = duration.unwrap_or(config.compile.image_duration_secs);
                MediaItem::image(&path, secs)
            }
            MediaKind::Video => {
                let secs = probe.probe(&path);
                MediaItem::video(&path, secs)
            }
        };

        println!(
            "Added {:?} {} ({:.1}s)",
            item.kind,
            item.path.display(),
            item.duration_secs
        );
        timeline.push(item);
    }

    timeline
        .save(&file)
        .map_err(|e| anyhow::anyhow!("Failed to save timeline: {e}"))?;

    println!(
        "Timeline now holds {} item(s), ~{:.1}s total",
        timeline.len(),
        timeline.total_duration_secs()
    );
    Ok(())
}
