use std::fmt;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildMsg {
    // Stage headers
    Stage(String),
    StageDone(String),

    // Raster work
    TaskSkipped(PathBuf),
    TaskRasterized { dpi: u32, svg_path: PathBuf, png_path: PathBuf },
    RasterProgress(usize, usize),

    // Compilation and aliasing
    CursorCompiled(String),
    AliasLinked { cursor: String, alias: String },

    // General
    Failed(Failure),
    LogMessage(String),
    Warning(String),
}

/// A recorded, non-fatal failure. The run keeps going but exits nonzero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Failure {
    Raster {
        svg_path: PathBuf,
        png_path: PathBuf,
        dpi: u32,
        reason: String,
    },
    CursorSkipped {
        cursor: String,
        reason: String,
    },
    Compile {
        cursor: String,
        reason: String,
    },
    Alias {
        cursor: String,
        alias: String,
    },
    AliasLink {
        cursor: String,
        alias: String,
        reason: String,
    },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Raster {
                svg_path,
                png_path,
                dpi,
                reason,
            } => write!(
                f,
                "Error converting svg {} -> {} at {} dpi: {}",
                svg_path.display(),
                png_path.display(),
                dpi,
                reason
            ),
            Failure::CursorSkipped { cursor, reason } => {
                write!(f, "Skipping cursor {}: {}", cursor, reason)
            }
            Failure::Compile { cursor, reason } => {
                write!(f, "Error building {}: {}", cursor, reason)
            }
            Failure::Alias { cursor, alias } => {
                write!(f, "Could not find cursor {} for alias {}", cursor, alias)
            }
            Failure::AliasLink {
                cursor,
                alias,
                reason,
            } => write!(f, "Could not link alias {} to {}: {}", alias, cursor, reason),
        }
    }
}
