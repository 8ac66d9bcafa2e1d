// Cursor descriptor (.cursor) loading and writing
//
// One frame per line: `<size> <hot_x> <hot_y> <name> [<delay_ms>]`

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::error::ForgeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRecord {
    pub base_size: u32,
    pub hot_x: u32,
    pub hot_y: u32,
    pub icon_name: String,
    pub delay_ms: u32,
}

pub fn load_descriptor(path: &Path) -> Result<Vec<FrameRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read descriptor {}", path.display()))?;
    Ok(parse_descriptor(path, &content)?)
}

/// Parses descriptor text. `path` is only used for error messages.
pub fn parse_descriptor(path: &Path, content: &str) -> Result<Vec<FrameRecord>, ForgeError> {
    let mut frames = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        let malformed = |reason: String| ForgeError::MalformedDescriptor {
            path: path.to_path_buf(),
            line: idx + 1,
            reason,
            content: line.to_string(),
        };

        if parts.len() != 4 && parts.len() != 5 {
            return Err(malformed(format!(
                "expected 4 or 5 fields, found {}",
                parts.len()
            )));
        }

        let number = |field: &str, value: &str| -> Result<u32, ForgeError> {
            value
                .parse::<u32>()
                .map_err(|_| malformed(format!("{} is not a non-negative integer: {:?}", field, value)))
        };

        let base_size = number("size", parts[0])?;
        if base_size == 0 {
            return Err(malformed("size must be greater than zero".to_string()));
        }

        frames.push(FrameRecord {
            base_size,
            hot_x: number("hot_x", parts[1])?,
            hot_y: number("hot_y", parts[2])?,
            icon_name: parts[3].to_string(),
            delay_ms: match parts.get(4) {
                Some(delay) => number("delay", delay)?,
                None => 0,
            },
        });
    }

    Ok(frames)
}

/// Formats one descriptor line. A zero delay is left off, matching the
/// four-field form the loader accepts.
pub fn format_descriptor_line(size: u32, hot_x: u32, hot_y: u32, image: &str, delay_ms: u32) -> String {
    let line = format!("{} {} {} {}", size, hot_x, hot_y, image);
    if delay_ms > 0 {
        format!("{} {}", line, delay_ms)
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn parse(content: &str) -> Result<Vec<FrameRecord>, ForgeError> {
        parse_descriptor(Path::new("test.cursor"), content)
    }

    #[test]
    fn test_parse_four_and_five_field_lines() {
        let frames = parse("24 2 3 left_ptr\n24 12 12 wait-01 50\n").unwrap();
        assert_eq!(
            frames,
            vec![
                FrameRecord {
                    base_size: 24,
                    hot_x: 2,
                    hot_y: 3,
                    icon_name: "left_ptr".to_string(),
                    delay_ms: 0,
                },
                FrameRecord {
                    base_size: 24,
                    hot_x: 12,
                    hot_y: 12,
                    icon_name: "wait-01".to_string(),
                    delay_ms: 50,
                },
            ]
        );
    }

    #[test]
    fn test_parse_preserves_order_and_skips_blank_lines() {
        let content = "\n24 0 0 a 10\n\n   \n24 0 0 b 10\n24 0 0 c 10";
        let names: Vec<String> = parse(content)
            .unwrap()
            .into_iter()
            .map(|f| f.icon_name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let err = parse("24 2 3 left_ptr\n24 2 left_ptr\n").unwrap_err();
        match err {
            ForgeError::MalformedDescriptor { path, line, .. } => {
                assert_eq!(path, PathBuf::from("test.cursor"));
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(parse("24 1 1 a 10 extra").is_err());
    }

    #[test]
    fn test_parse_rejects_non_numeric_and_zero_size() {
        assert!(parse("big 1 1 a").is_err());
        assert!(parse("24 -1 1 a").is_err());
        assert!(parse("0 1 1 a").is_err());
    }

    #[test]
    fn test_load_descriptor_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pointer.cursor");
        fs::write(&path, "32 10 4 pointer\n").unwrap();

        let frames = load_descriptor(&path).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].base_size, 32);

        assert!(load_descriptor(&dir.path().join("missing.cursor")).is_err());
    }

    #[test]
    fn test_format_descriptor_line() {
        assert_eq!(format_descriptor_line(30, 2, 2, "build/icons/a_120.png", 0), "30 2 2 build/icons/a_120.png");
        assert_eq!(format_descriptor_line(30, 2, 2, "a.png", 40), "30 2 2 a.png 40");
    }
}
