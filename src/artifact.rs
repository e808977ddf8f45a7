//! Node image files.
//!
//! Every node image lives at `<dir>/node{id}.svg` and every legend swatch at
//! `<dir>/legend{i}.svg`. The DOT document references them by path, so the
//! directory must outlive the document's rendering.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};
use crate::output::SvgEncoder;

/// A written image and its size in points, as read back from its header.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// File location.
    pub path: PathBuf,
    /// Width in points.
    pub width: f32,
    /// Height in points.
    pub height: f32,
}

/// Directory that receives the images of one render.
#[derive(Debug, Clone)]
pub struct ArtifactDir {
    root: PathBuf,
}

impl ArtifactDir {
    /// Use `root`, creating it if needed. Relative paths are anchored at the
    /// current directory so the DOT document stays valid wherever it is rendered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory cannot be created.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()?.join(root)
        };
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Location of node `id`'s image.
    #[must_use]
    pub fn node_path(&self, id: usize) -> PathBuf {
        self.root.join(format!("node{id}.svg"))
    }

    /// Location of legend swatch `i`.
    #[must_use]
    pub fn legend_path(&self, i: usize) -> PathBuf {
        self.root.join(format!("legend{i}.svg"))
    }

    /// Write `svg` to `path` and read its dimensions back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on write failure or [`Error::ArtifactMetadata`]
    /// if the written header cannot be parsed.
    pub fn write(&self, path: PathBuf, svg: &SvgEncoder) -> Result<Artifact> {
        svg.write_to_file(&path)?;
        let (width, height) = svg_shape(&path)?;
        debug!("wrote {} ({width}x{height}pt)", path.display());
        Ok(Artifact { path, width, height })
    }
}

/// `(width, height)` in points from the `<svg ...>` header line of a file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and
/// [`Error::ArtifactMetadata`] if no header with both sizes is found.
pub fn svg_shape(path: impl AsRef<Path>) -> Result<(f32, f32)> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let metadata_error = |reason: &str| Error::ArtifactMetadata {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let header = content
        .lines()
        .find(|line| line.starts_with("<svg "))
        .ok_or_else(|| metadata_error("no <svg> header line"))?;

    let mut width = None;
    let mut height = None;
    for arg in header["<svg ".len()..].split_whitespace() {
        let Some((key, value)) = arg.split_once('=') else {
            continue;
        };
        let value = value.trim_end_matches('>').trim_end_matches('/').trim_matches('"');
        let value = value.strip_suffix("pt").unwrap_or(value);
        match key {
            "width" => width = value.parse::<f32>().ok(),
            "height" => height = value.parse::<f32>().ok(),
            _ => {}
        }
    }

    match (width, height) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(metadata_error("header lacks numeric width and height")),
    }
}

/// Node id encoded in an image file name (`node{id}.svg`).
#[must_use]
pub fn node_id_from_path(path: impl AsRef<Path>) -> Option<usize> {
    path.as_ref()
        .file_name()?
        .to_str()?
        .strip_prefix("node")?
        .strip_suffix(".svg")?
        .parse()
        .ok()
}
