// Source discovery: cursor descriptors, svg icons and theme index files

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ThemePaths;

#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub cursors: Vec<PathBuf>,
    /// Icon name (file stem) -> svg path.
    pub svgs: BTreeMap<String, PathBuf>,
    pub theme_files: Vec<PathBuf>,
}

pub fn discover(paths: &ThemePaths) -> Result<Sources> {
    let cursors = files_with_extension(&paths.cursor_src, "cursor")?;
    let svgs = files_with_extension(&paths.svg_src, "svg")?
        .into_iter()
        .filter_map(|path| {
            let stem = path.file_stem()?.to_str()?.to_string();
            Some((stem, path))
        })
        .collect();
    let theme_files = files_with_extension(&paths.theme_src, "theme")?;

    Ok(Sources {
        cursors,
        svgs,
        theme_files,
    })
}

/// Lists the regular files directly inside `dir` with the given extension,
/// sorted by path. The extension match is case-sensitive. A missing
/// directory yields an empty list.
pub fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(file_ext) = path.extension() {
            if file_ext == ext {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    Ok(files)
}
