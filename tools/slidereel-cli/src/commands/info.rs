//! Show a timeline's items in play order.

use std::path::PathBuf;

use slidereel_timeline::Timeline;

pub fn run(file: PathBuf) -> anyhow::Result<()> {
    let timeline =
        Timeline::load(&file).map_err(|e| anyhow::anyhow!("Failed to load timeline: {e}"))?;

    println!("Timeline: {}", file.display());
    if timeline.is_empty() {
        println!("  (empty)");
        return Ok(());
    }

    for (index, item) in timeline.iter().enumerate() {
        println!(
            "  {:>3}. [{}] {} ({:.1}s)",
            index + 1,
            if item.is_image() { "image" } else { "video" },
            item.path.display(),
            item.duration_secs
        );
    }
    println!();
    println!(
        "{} item(s), ~{:.1}s total",
        timeline.len(),
        timeline.total_duration_secs()
    );

    Ok(())
}
