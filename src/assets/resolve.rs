use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    assets::{PreparedImage, decode::decode_image},
    foundation::error::{CardError, CardResult},
};

/// Resolves a document- or store-relative path to a decoded image.
///
/// Art and background paths go through the same resolver; hosts with several
/// resource roots plug in their own implementation.
pub trait ImageResolver {
    fn load(&mut self, path: &str) -> CardResult<PreparedImage>;
}

/// Loads images from files below a root directory.
#[derive(Clone, Debug)]
pub struct FsImageResolver {
    root: PathBuf,
}

impl FsImageResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute location of `path` below the root.
    pub fn locate(&self, path: &str) -> CardResult<PathBuf> {
        let norm = normalize_rel_path(path)?;
        Ok(self.root.join(Path::new(&norm)))
    }
}

impl ImageResolver for FsImageResolver {
    fn load(&mut self, path: &str) -> CardResult<PreparedImage> {
        let abs = self.locate(path)?;
        tracing::debug!(path, resolved = %abs.display(), "load image");
        let bytes = std::fs::read(&abs).map_err(|e| {
            CardError::resource(format!("read image '{}': {e}", abs.display()))
        })?;
        decode_image(&bytes).map_err(|e| match e {
            CardError::Resource(msg) => CardError::resource(format!("image '{path}': {msg}")),
            other => other,
        })
    }
}

/// Images keyed by path, registered up front (tests, embedding hosts).
#[derive(Clone, Debug, Default)]
pub struct MemoryImageResolver {
    images: HashMap<String, PreparedImage>,
    loads: Vec<String>,
}

impl MemoryImageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, image: PreparedImage) {
        self.images.insert(path.into(), image);
    }

    /// Paths requested so far, in request order.
    pub fn loads(&self) -> &[String] {
        &self.loads
    }
}

impl ImageResolver for MemoryImageResolver {
    fn load(&mut self, path: &str) -> CardResult<PreparedImage> {
        self.loads.push(path.to_string());
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| CardError::resource(format!("unknown image '{path}'")))
    }
}

/// Normalize and validate root-relative resource paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> CardResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(CardError::resource(format!(
            "resource path '{source}' must be relative"
        )));
    }
    if s.is_empty() {
        return Err(CardError::resource("resource path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CardError::resource(format!(
                "resource path '{source}' must not contain '..'"
            )));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CardError::resource(format!(
            "resource path '{source}' must contain a file name"
        )));
    }

    Ok(out.join("/"))
}
