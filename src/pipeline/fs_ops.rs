use std::fs;
use std::io;
use std::os::unix::fs as unix_fs;
use std::path::Path;

pub fn ensure_dir<P: AsRef<Path>>(p: P) -> io::Result<()> {
    if !p.as_ref().exists() {
        fs::create_dir_all(&p)?;
    }
    Ok(())
}

/// Recursively copies `src` into `dst`, recreating symlinks as symlinks.
pub fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let ty = entry.file_type()?;
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_dir_all(&entry.path(), &dst_path)?;
        } else if ty.is_symlink() {
            let target = fs::read_link(entry.path())?;
            unix_fs::symlink(target, dst_path)?;
        } else {
            fs::copy(entry.path(), dst_path)?;
        }
    }

    Ok(())
}

/// Removes a directory tree if it exists.
pub fn remove_dir_if_exists(p: &Path) -> io::Result<bool> {
    match fs::remove_dir_all(p) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
