//! Asset sources for model weights.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Read-only source of named model assets.
///
/// Names use forward slashes (`Models/blazeface.param`) regardless of platform.
pub trait AssetSource: Send + Sync {
    /// Read an asset's full contents.
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Check whether an asset exists.
    fn exists(&self, name: &str) -> bool {
        self.read(name).is_ok()
    }
}

/// Assets stored under a directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an asset name below the root, rejecting escapes.
    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("asset name escapes root: {name}"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl AssetSource for DirAssets {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(name)?)
    }

    fn exists(&self, name: &str) -> bool {
        self.resolve(name).map(|p| p.is_file()).unwrap_or(false)
    }
}

/// In-memory assets.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(name.into(), contents.into());
        self
    }
}

impl AssetSource for MemoryAssets {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))
    }

    fn exists(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }
}
