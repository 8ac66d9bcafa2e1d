// Resolution matrix expansion: every frame of every cursor at every target DPI

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ForgeError;
use crate::model::cursor::{CursorDefinition, ExpandedFrame};
use crate::model::descriptor::{FrameRecord, load_descriptor};
use crate::model::resolution::{ResolutionTarget, scale_hotspot};

/// Where the bitmap for `icon` at `dpi` lives. Depends only on the pair, so
/// cursors sharing an icon share its bitmaps.
pub fn png_output_path(icon_build: &Path, icon: &str, dpi: u32) -> PathBuf {
    icon_build.join(format!("{}_{}.png", icon, dpi))
}

pub struct Expander<'a> {
    pub resolutions: &'a [ResolutionTarget],
    pub svgs: &'a BTreeMap<String, PathBuf>,
    pub icon_build: &'a Path,
}

impl Expander<'_> {
    pub fn expand(
        &self,
        name: &str,
        src_path: &Path,
        records: &[FrameRecord],
    ) -> Result<CursorDefinition, ForgeError> {
        let mut frames = Vec::with_capacity(records.len() * self.resolutions.len());

        for target in self.resolutions {
            for record in records {
                let svg_path = self.svgs.get(&record.icon_name).ok_or_else(|| {
                    ForgeError::UnknownIcon {
                        cursor: name.to_string(),
                        icon: record.icon_name.clone(),
                    }
                })?;

                let (scaled_hot_x, scaled_hot_y) =
                    scale_hotspot(record.base_size, target.size, record.hot_x, record.hot_y);

                frames.push(ExpandedFrame {
                    dpi: target.dpi,
                    scaled_size: target.size,
                    scaled_hot_x,
                    scaled_hot_y,
                    svg_path: svg_path.clone(),
                    png_path: png_output_path(self.icon_build, &record.icon_name, target.dpi),
                    delay_ms: record.delay_ms,
                });
            }
        }

        Ok(CursorDefinition {
            name: name.to_string(),
            src_path: src_path.to_path_buf(),
            frames,
        })
    }

    /// Loads and expands every descriptor. The first malformed descriptor or
    /// unknown icon aborts.
    pub fn load_all(&self, cursor_paths: &[PathBuf]) -> Result<Vec<CursorDefinition>> {
        let mut cursors = Vec::with_capacity(cursor_paths.len());
        for path in cursor_paths {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .ok_or_else(|| anyhow::anyhow!("Invalid cursor path: {}", path.display()))?;
            let records = load_descriptor(path)?;
            cursors.push(self.expand(&name, path, &records)?);
        }
        Ok(cursors)
    }
}
