use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ForgeError;
use crate::model::resolution::{ResolutionTarget, default_resolutions};

pub const CONFIG_FILE_NAME: &str = "cursor-forge.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub theme_name: String,
    pub workers: usize,
    pub queue_timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raster_timeout_secs: Option<u64>,
    /// Argv template; `{input}`, `{output}`, `{dpi}` and `{self}` are substituted.
    pub rasterizer: Vec<String>,
    /// Argv template; `{descriptor}`, `{output}` and `{self}` are substituted.
    pub compiler: Vec<String>,
    pub install: bool,
    #[serde(default = "default_resolutions")]
    pub resolutions: Vec<ResolutionTarget>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src"),
            build_dir: PathBuf::from("build"),
            dist_dir: PathBuf::from("dist"),
            theme_name: "Numix-HIDPI".to_string(),
            workers: 8,
            queue_timeout_ms: 5000,
            raster_timeout_secs: None,
            rasterizer: default_rasterizer(),
            compiler: default_compiler(),
            install: false,
            resolutions: default_resolutions(),
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

pub fn default_rasterizer() -> Vec<String> {
    argv(&["inkscape", "{input}", "-o", "{output}", "--export-dpi", "{dpi}"])
}

pub fn default_compiler() -> Vec<String> {
    argv(&["xcursorgen", "{descriptor}", "{output}"])
}

pub fn builtin_rasterizer() -> Vec<String> {
    argv(&["{self}", "rasterize", "{input}", "{output}", "--dpi", "{dpi}"])
}

pub fn builtin_compiler() -> Vec<String> {
    argv(&["{self}", "compile", "{descriptor}", "{output}"])
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&content).map_err(|source| ForgeError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config
            .validate()
            .with_context(|| format!("In config {}", path.display()))?;
        Ok(config)
    }

    /// Every resolution needs a nonzero size, and a DPI may appear only once
    /// since bitmaps are keyed by icon and DPI.
    pub fn validate(&self) -> Result<(), ForgeError> {
        if self.resolutions.is_empty() {
            return Err(ForgeError::InvalidResolutions {
                reason: "at least one resolution is required".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for target in &self.resolutions {
            if target.size == 0 {
                return Err(ForgeError::InvalidResolutions {
                    reason: format!("size for {} dpi must be greater than zero", target.dpi),
                });
            }
            if !seen.insert(target.dpi) {
                return Err(ForgeError::InvalidResolutions {
                    reason: format!("{} dpi is listed more than once", target.dpi),
                });
            }
        }
        Ok(())
    }

    /// Loads `cursor-forge.toml` from `root` when present, otherwise the
    /// defaults. Relative directories are resolved against `root`.
    pub fn load_for_root(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let candidate = root.join(CONFIG_FILE_NAME);
                if candidate.exists() {
                    Self::load_from_file(&candidate)?
                } else {
                    Self::default()
                }
            }
        };
        config.rebase(root);
        Ok(config)
    }

    pub fn rebase(&mut self, root: &Path) {
        for dir in [&mut self.source_dir, &mut self.build_dir, &mut self.dist_dir] {
            if dir.is_relative() {
                *dir = root.join(&*dir);
            }
        }
    }

    pub fn use_builtin_tools(&mut self) {
        self.rasterizer = builtin_rasterizer();
        self.compiler = builtin_compiler();
    }

    pub fn queue_timeout(&self) -> Duration {
        Duration::from_millis(self.queue_timeout_ms)
    }

    pub fn raster_timeout(&self) -> Option<Duration> {
        self.raster_timeout_secs.map(Duration::from_secs)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }

    pub fn paths(&self) -> ThemePaths {
        ThemePaths::new(self)
    }
}

/// Every directory and file location the build touches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemePaths {
    pub cursor_src: PathBuf,
    pub svg_src: PathBuf,
    pub theme_src: PathBuf,
    pub alias_file: PathBuf,
    pub build_dir: PathBuf,
    pub cursor_build: PathBuf,
    pub icon_build: PathBuf,
    pub dist_dir: PathBuf,
    pub cursor_dist: PathBuf,
}

impl ThemePaths {
    fn new(config: &Config) -> Self {
        let dist_dir = config.dist_dir.join(&config.theme_name);
        Self {
            cursor_src: config.source_dir.join("cursor"),
            svg_src: config.source_dir.join("svg"),
            theme_src: config.source_dir.join("theme"),
            alias_file: config.source_dir.join("aliases"),
            build_dir: config.build_dir.clone(),
            cursor_build: config.build_dir.join("cursor"),
            icon_build: config.build_dir.join("icons"),
            cursor_dist: dist_dir.join("cursors"),
            dist_dir,
        }
    }
}
