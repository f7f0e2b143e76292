//! View module
//!
//! HTML rendering of the directory page.

pub mod renderer;

pub use renderer::render_page;
