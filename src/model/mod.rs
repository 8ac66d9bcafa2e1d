pub mod alias;
pub mod cursor;
pub mod descriptor;
pub mod resolution;
pub mod theme;

pub use alias::AliasMap;
pub use cursor::{BuildResult, CursorDefinition, ExpandedFrame, RasterTask};
pub use descriptor::FrameRecord;
pub use resolution::ResolutionTarget;
