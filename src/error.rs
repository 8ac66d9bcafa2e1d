use std::path::PathBuf;

/// Build-definition errors. Any of these stops the whole run before (or
/// instead of) producing a partial theme.
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    #[error("{}:{line}: malformed descriptor line ({reason}): {content:?}", path.display())]
    MalformedDescriptor {
        path: PathBuf,
        line: usize,
        reason: String,
        content: String,
    },
    #[error("cursor {cursor}: unable to match icon {icon:?} to a discovered svg")]
    UnknownIcon { cursor: String, icon: String },
    #[error("{}:{line}: malformed alias line, expected `<cursor> <alias>`: {content:?}", path.display())]
    MalformedAlias {
        path: PathBuf,
        line: usize,
        content: String,
    },
    #[error("invalid {tool} command: {reason}")]
    InvalidToolCommand { tool: &'static str, reason: String },
    #[error("invalid resolutions: {reason}")]
    InvalidResolutions { reason: String },
    #[error("config error in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// True when the error chain carries a [`ForgeError`], i.e. the run was
/// stopped by a broken build definition rather than by plain I/O.
pub fn is_definition_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.downcast_ref::<ForgeError>().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_error_detected_through_context() {
        let err = anyhow::Error::new(ForgeError::UnknownIcon {
            cursor: "left_ptr".to_string(),
            icon: "arrow".to_string(),
        })
        .context("expanding cursors");

        assert!(is_definition_error(&err));
        assert!(!is_definition_error(&anyhow::anyhow!("disk full")));
    }

    #[test]
    fn test_descriptor_message_names_file_and_line() {
        let err = ForgeError::MalformedDescriptor {
            path: PathBuf::from("src/cursor/wait.cursor"),
            line: 3,
            reason: "expected 4 or 5 fields, found 2".to_string(),
            content: "24 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("src/cursor/wait.cursor:3:"));
        assert!(msg.contains("found 2"));
    }
}
