// Alias symlinks inside the cursors directory

use crossbeam_channel::Sender;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::os::unix::fs as unix_fs;
use std::path::Path;

use crate::event::{BuildMsg, Failure};
use crate::model::alias::AliasMap;
use crate::model::cursor::BuildResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Created,
    Unchanged,
    Replaced,
    /// A real file already carries the alias name; it is left alone.
    Conflict,
}

/// Points `link` at `target` (relative), reusing a correct existing link.
pub fn ensure_symlink(target: &str, link: &Path) -> io::Result<LinkState> {
    match fs::symlink_metadata(link) {
        Ok(meta) if meta.file_type().is_symlink() => {
            if fs::read_link(link)? == Path::new(target) {
                return Ok(LinkState::Unchanged);
            }
            fs::remove_file(link)?;
            unix_fs::symlink(target, link)?;
            Ok(LinkState::Replaced)
        }
        Ok(_) => Ok(LinkState::Conflict),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            unix_fs::symlink(target, link)?;
            Ok(LinkState::Created)
        }
        Err(e) => Err(e),
    }
}

fn remove_symlink(link: &Path) -> io::Result<()> {
    match fs::symlink_metadata(link) {
        Ok(meta) if meta.file_type().is_symlink() => fs::remove_file(link),
        _ => Ok(()),
    }
}

/// An alias must name an entry directly inside the cursors directory.
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/')
}

/// Links every alias of a built cursor. Aliases of cursors that did not build
/// are reported and any old link under that name is removed. A single alias
/// that cannot be linked is recorded and skipped.
pub fn link_aliases(
    aliases: &AliasMap,
    results: &[BuildResult],
    cursor_dist: &Path,
    events: &Sender<BuildMsg>,
) -> usize {
    let built: HashSet<&str> = results
        .iter()
        .filter(|r| r.is_built())
        .map(|r| r.name.as_str())
        .collect();

    let link_failed = |cursor: &str, alias: &str, reason: String| {
        let _ = events.send(BuildMsg::Failed(Failure::AliasLink {
            cursor: cursor.to_string(),
            alias: alias.to_string(),
            reason,
        }));
    };

    let mut linked = 0;
    for (cursor, names) in aliases.iter() {
        let cursor_built = built.contains(cursor.as_str());

        for alias in names {
            if !is_plain_name(alias) {
                link_failed(cursor, alias, "alias must be a plain file name".to_string());
                continue;
            }
            let link = cursor_dist.join(alias);

            if !cursor_built {
                let _ = events.send(BuildMsg::Failed(Failure::Alias {
                    cursor: cursor.clone(),
                    alias: alias.clone(),
                }));
                if let Err(e) = remove_symlink(&link) {
                    let _ = events.send(BuildMsg::Warning(format!(
                        "Failed to remove stale alias {}: {}",
                        alias, e
                    )));
                }
                continue;
            }

            let state = match ensure_symlink(cursor, &link) {
                Ok(state) => state,
                Err(e) => {
                    link_failed(cursor, alias, e.to_string());
                    continue;
                }
            };

            if state == LinkState::Conflict {
                let _ = events.send(BuildMsg::Warning(format!(
                    "Alias {} for {} clashes with an existing file, leaving it",
                    alias, cursor
                )));
                continue;
            }

            linked += 1;
            let _ = events.send(BuildMsg::AliasLinked {
                cursor: cursor.clone(),
                alias: alias.clone(),
            });
        }
    }

    linked
}
