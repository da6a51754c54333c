use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::{MarionetteError, Result};

/// Resolves texture names against a base directory and remembers the
/// result, so repeated references in one model resolve once.
///
/// Resolution only checks that the file exists; decoding is left to the
/// render backend.
#[derive(Debug)]
pub struct TextureCache {
    base_dir: PathBuf,
    resolved: HashMap<String, PathBuf>,
}

impl TextureCache {
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            resolved: HashMap::new(),
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolves a required texture. Missing files are an import error.
    pub fn resolve(&mut self, name: &str) -> Result<PathBuf> {
        if let Some(path) = self.resolved.get(name) {
            return Ok(path.clone());
        }
        let path = self.base_dir.join(name);
        if !path.is_file() {
            return Err(MarionetteError::TextureNotFound(
                path.display().to_string(),
            ));
        }
        self.resolved.insert(name.to_string(), path.clone());
        Ok(path)
    }

    /// Resolves an optional companion texture, `None` when absent on disk.
    pub fn resolve_optional(&mut self, name: &str) -> Option<PathBuf> {
        self.resolve(name).ok()
    }

    /// Companion normal-map name for a texture: `skin.png` pairs with
    /// `skin_normal.png`.
    #[must_use]
    pub fn normal_map_name(texture_name: &str) -> String {
        let path = Path::new(texture_name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        let with_suffix = match path.extension() {
            Some(ext) => format!("{stem}_normal.{}", ext.to_string_lossy()),
            None => format!("{stem}_normal"),
        };
        match parent {
            Some(parent) => parent.join(with_suffix).to_string_lossy().into_owned(),
            None => with_suffix,
        }
    }
}
