// Output directory layout, theme metadata and installation

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};

use super::fs_ops::{copy_dir_all, ensure_dir, remove_dir_if_exists};
use crate::config::ThemePaths;
use crate::model::theme::IndexTheme;

pub fn prepare_dirs(paths: &ThemePaths) -> Result<()> {
    for dir in [
        &paths.dist_dir,
        &paths.cursor_dist,
        &paths.build_dir,
        &paths.cursor_build,
        &paths.icon_build,
    ] {
        ensure_dir(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}

/// Copies the theme's `*.theme` files next to `cursors/`. Without any, an
/// `index.theme` is generated so the directory is still a usable theme.
pub fn write_theme_files(theme_files: &[PathBuf], dist_dir: &Path, theme_name: &str) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if theme_files.is_empty() {
        let dest = dist_dir.join("index.theme");
        fs::write(&dest, IndexTheme::for_theme(theme_name).render())
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        written.push(dest);
        return Ok(written);
    }

    for src in theme_files {
        let name = src
            .file_name()
            .ok_or_else(|| anyhow!("Invalid theme file path: {}", src.display()))?;
        let dest = dist_dir.join(name);
        fs::copy(src, &dest)
            .with_context(|| format!("Failed to copy {} to {}", src.display(), dest.display()))?;
        written.push(dest);
    }
    Ok(written)
}

/// Copies the finished theme into `<icons_root>/<theme_name>`, replacing any
/// previous install.
pub fn install_theme(dist_dir: &Path, icons_root: &Path, theme_name: &str) -> Result<PathBuf> {
    let target = icons_root.join(theme_name);
    if target == dist_dir {
        return Ok(target);
    }

    remove_dir_if_exists(&target)
        .with_context(|| format!("Failed to remove old install at {}", target.display()))?;
    copy_dir_all(dist_dir, &target)
        .with_context(|| format!("Failed to install theme to {}", target.display()))?;
    Ok(target)
}

pub fn user_icons_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(".icons"))
}

/// Removes build intermediates and the assembled theme.
pub fn clean(paths: &ThemePaths) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for dir in [&paths.build_dir, &paths.dist_dir] {
        if remove_dir_if_exists(dir).with_context(|| format!("Failed to remove {}", dir.display()))? {
            removed.push(dir.clone());
        }
    }
    Ok(removed)
}
