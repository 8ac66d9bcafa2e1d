// Raster task planning. The filesystem is the cache: a task whose png already
// exists is considered done, whatever the state of its svg.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::model::cursor::{CursorDefinition, RasterTask};

#[derive(Debug, Clone, Default)]
pub struct RasterPlan {
    pub pending: Vec<RasterTask>,
    pub satisfied: Vec<PathBuf>,
}

impl RasterPlan {
    pub fn total(&self) -> usize {
        self.pending.len() + self.satisfied.len()
    }
}

/// Every distinct task across all cursors, keyed by output path, in first
/// occurrence order.
pub fn unique_tasks(cursors: &[CursorDefinition]) -> Vec<RasterTask> {
    let mut seen = HashSet::new();
    cursors
        .iter()
        .flat_map(|c| c.frames.iter())
        .filter(|f| seen.insert(f.png_path.clone()))
        .map(|f| f.raster_task())
        .collect()
}

pub fn plan_raster_tasks(cursors: &[CursorDefinition]) -> RasterPlan {
    let mut plan = RasterPlan::default();
    for task in unique_tasks(cursors) {
        if task.png_path.exists() {
            plan.satisfied.push(task.png_path);
        } else {
            plan.pending.push(task);
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cursor::ExpandedFrame;
    use std::fs;
    use std::path::Path;

    fn frame(png: &Path, dpi: u32) -> ExpandedFrame {
        ExpandedFrame {
            dpi,
            scaled_size: 24,
            scaled_hot_x: 0,
            scaled_hot_y: 0,
            svg_path: PathBuf::from("arrow.svg"),
            png_path: png.to_path_buf(),
            delay_ms: 0,
        }
    }

    fn cursor(name: &str, frames: Vec<ExpandedFrame>) -> CursorDefinition {
        CursorDefinition {
            name: name.to_string(),
            src_path: PathBuf::from(format!("{}.cursor", name)),
            frames,
        }
    }

    #[test]
    fn test_shared_icon_is_scheduled_once() {
        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("arrow_90.png");
        let own = dir.path().join("hand_90.png");

        let cursors = vec![
            cursor("left_ptr", vec![frame(&shared, 90)]),
            cursor("pointer", vec![frame(&shared, 90), frame(&own, 90)]),
        ];

        let plan = plan_raster_tasks(&cursors);
        let outputs: Vec<_> = plan.pending.iter().map(|t| t.png_path.clone()).collect();
        assert_eq!(outputs, vec![shared, own]);
        assert!(plan.satisfied.is_empty());
    }

    #[test]
    fn test_existing_outputs_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let done = dir.path().join("arrow_90.png");
        let todo = dir.path().join("arrow_120.png");
        fs::write(&done, b"png").unwrap();

        let cursors = vec![cursor("left_ptr", vec![frame(&done, 90), frame(&todo, 120)])];
        let plan = plan_raster_tasks(&cursors);

        assert_eq!(plan.satisfied, vec![done]);
        assert_eq!(plan.pending.len(), 1);
        assert_eq!(plan.pending[0].png_path, todo);
        assert_eq!(plan.total(), 2);
    }
}
