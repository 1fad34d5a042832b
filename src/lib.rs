// ABOUTME: Library module for the reveal-slides program.
// ABOUTME: Converts Markdown documents into reveal.js HTML slideshows.

use std::fs;
use std::path::Path;

// Reexport modules
pub mod assets;
pub mod config;
pub mod directives;
pub mod errors;
pub mod options;
pub mod parse;
pub mod render;
pub mod resources;
pub mod transforms;
pub mod tree;
pub mod utils;

// Reexport common types and functions
pub use config::Config;
pub use directives::DirectiveRegistry;
pub use errors::{Result, SlidesError};
pub use parse::Parser;
pub use render::{render, write_html_to_file, RenderConfig};
pub use resources::ResourceFile;
pub use tree::{DocTree, NodeId};

/// Convert a Markdown source string to a reveal.js slideshow document.
pub fn convert(source: &str, registry: &DirectiveRegistry, config: &RenderConfig) -> Result<String> {
    let mut tree = Parser::new(registry).parse(source);
    transforms::apply(&mut tree);
    render(&tree, config)
}

/// Convert a Markdown file to a reveal.js slideshow document.
pub fn convert_file(
    input: &Path,
    registry: &DirectiveRegistry,
    config: &RenderConfig,
) -> Result<String> {
    utils::validate_file_exists(input)?;
    let source = fs::read_to_string(input)?;
    convert(&source, registry, config)
}

#[cfg(test)]
mod tests;
