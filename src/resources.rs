// ABOUTME: Stylesheet resource handling for the reveal-slides application
// ABOUTME: Local and remote stylesheets can be linked or embedded in the output

use std::fs;
use std::path::Path;
use std::time::Duration;

use log::info;
use reqwest::blocking::Client;

use crate::errors::{Result, SlidesError};

/// An extra stylesheet named on the command line or by a `configure::`
/// directive; either a local file path or a URL.
#[derive(Debug, Clone)]
pub struct ResourceFile {
    pub path: String,
    pub is_remote: bool,
}

impl ResourceFile {
    pub fn new(path: &str) -> Self {
        let is_remote = path.starts_with("http://") || path.starts_with("https://");
        Self {
            path: path.to_string(),
            is_remote,
        }
    }

    /// The stylesheet text. Remote resources are fetched once, with no
    /// retries; local resources are read from the filesystem.
    pub fn content(&self) -> Result<String> {
        if self.is_remote {
            info!("Fetching remote stylesheet: {}", self.path);
            let client = Client::builder()
                .timeout(Duration::from_secs(10))
                .build()?;
            let response = client.get(&self.path).send()?;
            if !response.status().is_success() {
                return Err(SlidesError::DownloadError {
                    url: self.path.clone(),
                    status: response.status().as_u16(),
                });
            }
            Ok(response.text()?)
        } else {
            info!("Reading local stylesheet: {}", self.path);
            let path = Path::new(&self.path);
            if !path.exists() {
                return Err(SlidesError::PathNotFoundError(path.to_path_buf()));
            }
            Ok(fs::read_to_string(path)?)
        }
    }

    /// A `<link>` tag referencing the stylesheet by path.
    pub fn link_tag(&self) -> String {
        format!(r#"<link rel="stylesheet" href="{}">"#, self.path)
    }

    /// A `<style>` tag with the stylesheet content inlined.
    pub fn style_tag(&self) -> Result<String> {
        Ok(format!("<style>{}</style>", self.content()?))
    }
}
