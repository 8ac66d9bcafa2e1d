// Builtin cursor compiler, used as `cursor-forge compile`. Reads a
// descriptor whose names are png paths and writes one Xcursor file.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use super::xcursor_writer::{XcursorImage, to_x11};
use crate::model::descriptor::parse_descriptor;

pub fn compile_descriptor(descriptor: &Path, output: &Path) -> Result<usize> {
    let content = fs::read_to_string(descriptor)
        .with_context(|| format!("Failed to read {}", descriptor.display()))?;
    let records = parse_descriptor(descriptor, &content)?;
    if records.is_empty() {
        bail!("{} lists no images", descriptor.display());
    }

    let mut images = Vec::with_capacity(records.len());
    for record in &records {
        let image = image::open(&record.icon_name)
            .with_context(|| format!("Failed to load {}", record.icon_name))?
            .to_rgba8();
        images.push(XcursorImage {
            nominal_size: record.base_size,
            hotspot: (record.hot_x, record.hot_y),
            delay: record.delay_ms,
            image,
        });
    }

    let data = to_x11(&images).with_context(|| format!("Failed to encode {}", output.display()))?;

    let parent = output.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;
    let mut scratch = tempfile::NamedTempFile::new_in(parent)?;
    std::io::Write::write_all(&mut scratch, &data)?;
    scratch
        .persist(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(images.len())
}
