// ABOUTME: Asset provisioning for the reveal-slides application
// ABOUTME: Downloads reveal.js and MathJax archives and installs bundled hljs styles

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use glob::glob;
use log::info;
use reqwest::blocking::Client;
use zip::ZipArchive;

use crate::errors::{Result, SlidesError};
use crate::utils::ensure_directory_exists;

const REVEAL_ARCHIVE_URL: &str = "https://github.com/hakimel/reveal.js/archive";
const MATHJAX_ARCHIVE_URL: &str = "https://github.com/mathjax/MathJax/archive";

/// The bundled highlight.js styles, modified for reveal.js compatibility.
/// reveal.css sets `font: inherit` on spans, which defeats font-style and
/// font-weight changes unless the selectors carry the .reveal class.
/// github is the most readable light style, obsidian the best dark one.
pub const HLJS_STYLES: &[(&str, &str)] = &[
    ("atom-one-dark", include_str!("../assets/hljs/atom-one-dark.css")),
    ("atom-one-light", include_str!("../assets/hljs/atom-one-light.css")),
    ("default", include_str!("../assets/hljs/default.css")),
    ("github", include_str!("../assets/hljs/github.css")),
    ("obsidian", include_str!("../assets/hljs/obsidian.css")),
    ("solarized-dark", include_str!("../assets/hljs/solarized-dark.css")),
    ("solarized-light", include_str!("../assets/hljs/solarized-light.css")),
    ("zenburn", include_str!("../assets/hljs/zenburn.css")),
];

/// Ensure a local copy of the reveal.js assets (and optionally MathJax)
/// exists under `path`. Idempotent: each piece is skipped when already
/// present, so a provisioned directory costs no network traffic.
pub fn setup(path: &Path, reveal_tag: &str, mathjax: Option<&str>) -> Result<()> {
    if !path.join("js").join("reveal.js").exists() {
        download_reveal(path, reveal_tag)?;
    }
    let hljs = path.join("hljs");
    if !hljs.exists() {
        copy_hljs_styles(&hljs)?;
    }
    if let Some(tag) = mathjax {
        if !has_mathjax(path) {
            download_mathjax(path, tag)?;
        }
    }
    Ok(())
}

/// True if a MathJax directory already sits under the assets directory.
pub fn has_mathjax(path: &Path) -> bool {
    let pattern = format!("{}/MathJax*", path.display());
    glob(&pattern)
        .map(|paths| paths.flatten().next().is_some())
        .unwrap_or(false)
}

/// Fetch and unpack the reveal.js release archive, renaming any stale
/// target directory aside rather than deleting it.
pub fn download_reveal(path: &Path, tag: &str) -> Result<()> {
    let url = format!("{}/{}.zip", REVEAL_ARCHIVE_URL, tag);
    info!("Downloading reveal.js from {}", url);
    let bytes = fetch_archive(&url)?;
    let parent = parent_dir(path);
    ensure_directory_exists(&parent)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    archive.extract(&parent)?;
    if path.exists() {
        let aside = rename_aside(path)?;
        info!("Renamed stale {:?} to {:?}", path, aside);
    }
    let extracted = parent.join(format!("reveal.js-{}", tag));
    if !extracted.exists() {
        return Err(SlidesError::ArchiveError(format!(
            "archive did not contain reveal.js-{}",
            tag
        )));
    }
    fs::rename(&extracted, path)?;
    info!("reveal.js installed at {:?}", path);
    Ok(())
}

/// Fetch and unpack the MathJax archive under the assets directory, where
/// it unpacks as MathJax-<tag>.
pub fn download_mathjax(path: &Path, tag: &str) -> Result<()> {
    let url = format!("{}/{}.zip", MATHJAX_ARCHIVE_URL, tag);
    info!("Downloading MathJax from {}", url);
    let bytes = fetch_archive(&url)?;
    ensure_directory_exists(path)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    archive.extract(path)?;
    info!("MathJax installed under {:?}", path);
    Ok(())
}

/// Install the bundled highlight.js styles into `dest`, skipping any file
/// already present.
pub fn copy_hljs_styles(dest: &Path) -> Result<()> {
    ensure_directory_exists(dest)?;
    for (name, css) in HLJS_STYLES {
        let file = dest.join(format!("{}.css", name));
        if file.is_file() {
            continue;
        }
        fs::write(&file, css)?;
    }
    Ok(())
}

/// Move an existing directory to the first unused of `<path>-old`,
/// `<path>-old0`, `<path>-old1`, … and return the new name.
pub fn rename_aside(path: &Path) -> Result<PathBuf> {
    let base = path.display().to_string();
    let mut aside = PathBuf::from(format!("{}-old", base));
    let mut counter = 0;
    while aside.exists() {
        aside = PathBuf::from(format!("{}-old{}", base, counter));
        counter += 1;
    }
    fs::rename(path, &aside)?;
    Ok(aside)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// One blocking fetch of a zip archive; failures are fatal to the run.
fn fetch_archive(url: &str) -> Result<Vec<u8>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(120))
        .build()?;
    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(SlidesError::DownloadError {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }
    Ok(response.bytes()?.to_vec())
}
