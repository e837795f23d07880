//! Create a new empty timeline file.

use std::path::PathBuf;

use slidereel_timeline::Timeline;

pub fn run(file: PathBuf) -> anyhow::Result<()> {
    if file.exists() {
        return Err(anyhow::anyhow!(
            "Refusing to overwrite existing file: {}",
            file.display()
        ));
    }

    Timeline::new()
        .save(&file)
        .map_err(|e| anyhow::anyhow!("Failed to create timeline: {e}"))?;

    println!("Created empty timeline: {}", file.display());
    Ok(())
}
