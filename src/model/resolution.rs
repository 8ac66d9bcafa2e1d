use serde::{Deserialize, Serialize};

/// One rasterization target: the export DPI and the pixel edge length the
/// cursor has at that DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionTarget {
    pub dpi: u32,
    pub size: u32,
}

impl ResolutionTarget {
    pub const fn new(dpi: u32, size: u32) -> Self {
        Self { dpi, size }
    }
}

pub const DEFAULT_RESOLUTIONS: [ResolutionTarget; 8] = [
    ResolutionTarget::new(90, 24),
    ResolutionTarget::new(120, 30),
    ResolutionTarget::new(160, 40),
    ResolutionTarget::new(180, 45),
    ResolutionTarget::new(200, 50),
    ResolutionTarget::new(220, 55),
    ResolutionTarget::new(240, 60),
    ResolutionTarget::new(320, 80),
];

pub fn default_resolutions() -> Vec<ResolutionTarget> {
    DEFAULT_RESOLUTIONS.to_vec()
}

/// Scales a hotspot from `base_size` to `target_size`, rounding half to even
/// (2.5 -> 2, 3.5 -> 4).
pub fn scale_hotspot(base_size: u32, target_size: u32, hot_x: u32, hot_y: u32) -> (u32, u32) {
    let scale = target_size as f64 / base_size as f64;
    let scale_one = |v: u32| (v as f64 * scale).round_ties_even() as u32;
    (scale_one(hot_x), scale_one(hot_y))
}
