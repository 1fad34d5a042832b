// ABOUTME: Configuration module for the reveal-slides application
// ABOUTME: Provides default settings and environment variable handling

use std::env;
use std::path::PathBuf;

use crate::render::RenderConfig;
use crate::resources::ResourceFile;

/// Global configuration for the application
pub struct Config {
    pub reveal_dir: PathBuf,
    pub theme: String,
    pub hljs_style: String,
    pub reveal_tag: String,
    pub language: String,
    pub embed_stylesheets: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reveal_dir: PathBuf::from("ui"),
            theme: "beige".to_string(),
            hljs_style: "github".to_string(),
            reveal_tag: "master".to_string(),
            language: "en".to_string(),
            embed_stylesheets: false,
        }
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            reveal_dir: env::var("REVEAL_SLIDES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.reveal_dir),
            theme: env::var("REVEAL_SLIDES_THEME").unwrap_or(defaults.theme),
            hljs_style: env::var("REVEAL_SLIDES_HLJS").unwrap_or(defaults.hljs_style),
            reveal_tag: env::var("REVEAL_SLIDES_TAG").unwrap_or(defaults.reveal_tag),
            language: env::var("REVEAL_SLIDES_LANG").unwrap_or(defaults.language),
            embed_stylesheets: env::var("REVEAL_SLIDES_EMBED_CSS")
                .map(|value| value.to_lowercase() != "false")
                .unwrap_or(defaults.embed_stylesheets),
        }
    }

    /// Get a render configuration with defaults from this config
    #[allow(clippy::too_many_arguments)]
    pub fn get_render_config(
        &self,
        theme: Option<String>,
        hljs_style: Option<String>,
        reveal_dir: Option<PathBuf>,
        stylesheets: Vec<String>,
        embed_stylesheets: bool,
        provision_assets: bool,
        mathjax_download: Option<String>,
    ) -> RenderConfig {
        RenderConfig {
            theme: theme.unwrap_or_else(|| self.theme.clone()),
            hljs_style: hljs_style.unwrap_or_else(|| self.hljs_style.clone()),
            reveal_dir: reveal_dir.unwrap_or_else(|| self.reveal_dir.clone()),
            stylesheets: stylesheets
                .iter()
                .map(|path| ResourceFile::new(path))
                .collect(),
            embed_stylesheets: embed_stylesheets || self.embed_stylesheets,
            language: self.language.clone(),
            provision_assets,
            reveal_tag: self.reveal_tag.clone(),
            mathjax_download,
        }
    }
}
