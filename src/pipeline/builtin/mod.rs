pub mod svg_render;
pub mod xcursor_writer;
pub mod xcursorgen;

pub use svg_render::rasterize_file;
pub use xcursorgen::compile_descriptor;
