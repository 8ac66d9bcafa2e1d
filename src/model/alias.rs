use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::ForgeError;

/// Canonical cursor name -> alias names, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AliasMap {
    pub symlinks: BTreeMap<String, Vec<String>>,
}

impl AliasMap {
    pub fn add(&mut self, cursor: String, alias: String) {
        self.symlinks.entry(cursor).or_default().push(alias);
    }

    pub fn alias_count(&self) -> usize {
        self.symlinks.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.symlinks.iter()
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self, ForgeError> {
        let mut map = Self::default();
        for (idx, line) in content.lines().enumerate() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                [] => continue,
                [cursor, alias] => map.add(cursor.to_string(), alias.to_string()),
                _ => {
                    return Err(ForgeError::MalformedAlias {
                        path: path.to_path_buf(),
                        line: idx + 1,
                        content: line.to_string(),
                    });
                }
            }
        }
        Ok(map)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read alias file {}", path.display()))?;
        Ok(Self::parse(path, &content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    impl AliasMap {
        fn get_symlinks(&self, cursor: &str) -> Vec<String> {
            self.symlinks.get(cursor).cloned().unwrap_or_default()
        }
    }

    #[test]
    fn test_parse_groups_aliases_by_cursor() {
        let content = "left_ptr arrow\npointer hand1\nleft_ptr default\n\npointer hand2\n";
        let map = AliasMap::parse(Path::new("aliases"), content).unwrap();

        assert_eq!(map.get_symlinks("left_ptr"), vec!["arrow", "default"]);
        assert_eq!(map.get_symlinks("pointer"), vec!["hand1", "hand2"]);
        assert!(map.get_symlinks("text").is_empty());
        assert_eq!(map.alias_count(), 4);
    }

    #[test]
    fn test_parse_rejects_malformed_line() {
        let err = AliasMap::parse(Path::new("aliases"), "left_ptr arrow\nlonely\n").unwrap_err();
        assert!(matches!(err, ForgeError::MalformedAlias { line: 2, .. }));
    }
}
