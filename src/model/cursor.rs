use std::path::PathBuf;

use super::descriptor::format_descriptor_line;
use crate::event::Failure;

/// A frame of a cursor at one target resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandedFrame {
    pub dpi: u32,
    pub scaled_size: u32,
    pub scaled_hot_x: u32,
    pub scaled_hot_y: u32,
    pub svg_path: PathBuf,
    pub png_path: PathBuf,
    pub delay_ms: u32,
}

impl ExpandedFrame {
    pub fn raster_task(&self) -> RasterTask {
        RasterTask {
            svg_path: self.svg_path.clone(),
            png_path: self.png_path.clone(),
            dpi: self.dpi,
        }
    }

    pub fn descriptor_line(&self) -> String {
        format_descriptor_line(
            self.scaled_size,
            self.scaled_hot_x,
            self.scaled_hot_y,
            &self.png_path.to_string_lossy(),
            self.delay_ms,
        )
    }
}

/// A logical cursor with every frame expanded across all resolutions,
/// ordered by resolution first, then by frame.
#[derive(Clone, Debug, Default)]
pub struct CursorDefinition {
    pub name: String,
    pub src_path: PathBuf,
    pub frames: Vec<ExpandedFrame>,
}

impl CursorDefinition {
    pub fn to_descriptor(&self) -> String {
        self.frames
            .iter()
            .map(ExpandedFrame::descriptor_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn info(&self) -> String {
        format!(
            "{} ({} frames) - Src: {}",
            self.name,
            self.frames.len(),
            self.src_path.display()
        )
    }
}

/// One svg -> png conversion. Two tasks with the same `png_path` are the
/// same unit of work.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RasterTask {
    pub svg_path: PathBuf,
    pub png_path: PathBuf,
    pub dpi: u32,
}

/// Outcome of compiling one cursor: the artifact path, or why it is missing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildResult {
    pub name: String,
    pub outcome: Result<PathBuf, Failure>,
}

impl BuildResult {
    pub fn is_built(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(dpi: u32, size: u32, png: &str, delay_ms: u32) -> ExpandedFrame {
        ExpandedFrame {
            dpi,
            scaled_size: size,
            scaled_hot_x: 1,
            scaled_hot_y: 2,
            svg_path: PathBuf::from("src/svg/wait.svg"),
            png_path: PathBuf::from(png),
            delay_ms,
        }
    }

    #[test]
    fn test_to_descriptor_joins_lines_without_trailing_newline() {
        let cursor = CursorDefinition {
            name: "wait".to_string(),
            src_path: PathBuf::from("src/cursor/wait.cursor"),
            frames: vec![
                frame(90, 24, "build/icons/wait_90.png", 0),
                frame(120, 30, "build/icons/wait_120.png", 60),
            ],
        };

        assert_eq!(
            cursor.to_descriptor(),
            "24 1 2 build/icons/wait_90.png\n30 1 2 build/icons/wait_120.png 60"
        );
    }

    #[test]
    fn test_raster_task_identity() {
        let a = frame(90, 24, "build/icons/wait_90.png", 0).raster_task();
        let b = frame(90, 24, "build/icons/wait_90.png", 80).raster_task();
        assert_eq!(a, b);
    }
}
