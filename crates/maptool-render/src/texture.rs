//! Terrain texture catalog and lookup by index.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

/// Handle of a loaded texture.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct TextureId(pub usize);

/// Errors from scanning the texture directory.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to list texture directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves the selected texture index to a texture.
pub trait TextureLookup {
    fn texture(&self, index: usize) -> Option<TextureId>;
}

/// Texture files available in a directory, sorted by file name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextureCatalog {
    dir: PathBuf,
    names: Vec<String>,
}

impl TextureCatalog {
    /// List regular files in `dir`. Subdirectories are skipped.
    pub fn scan(dir: &Path) -> Result<Self, TextureError> {
        let read_err = |source| TextureError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            if entry.file_type().map_err(read_err)?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            } else {
                debug!("skipping non-file texture entry {:?}", entry.path());
            }
        }
        names.sort();
        info!("found {} textures in {}", names.len(), dir.display());
        Ok(Self {
            dir: dir.to_path_buf(),
            names,
        })
    }

    pub fn from_names(dir: impl Into<PathBuf>, names: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            names,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index of the texture with this file name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Full path of the texture at `index`.
    pub fn path(&self, index: usize) -> Option<PathBuf> {
        self.names.get(index).map(|name| self.dir.join(name))
    }
}

/// Textures registered for rendering, one id per catalog entry.
#[derive(Clone, Debug, Default)]
pub struct TextureManager {
    catalog: TextureCatalog,
}

impl TextureManager {
    pub fn new(catalog: TextureCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &TextureCatalog {
        &self.catalog
    }
}

impl TextureLookup for TextureManager {
    fn texture(&self, index: usize) -> Option<TextureId> {
        (index < self.catalog.len()).then_some(TextureId(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_lists_files_sorted_and_skips_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sand.png"), b"").unwrap();
        std::fs::write(dir.path().join("grass.png"), b"").unwrap();
        std::fs::create_dir(dir.path().join("unused")).unwrap();

        let catalog = TextureCatalog::scan(dir.path()).unwrap();
        assert_eq!(catalog.names(), ["grass.png", "sand.png"]);
        assert_eq!(catalog.position("sand.png"), Some(1));
        assert_eq!(catalog.path(0), Some(dir.path().join("grass.png")));
        assert_eq!(catalog.path(2), None);
    }

    #[test]
    fn test_scan_missing_dir_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = TextureCatalog::scan(&dir.path().join("missing"));
        assert!(matches!(result, Err(TextureError::ReadDir { .. })));
    }

    #[test]
    fn test_lookup_by_index() {
        let manager = TextureManager::new(TextureCatalog::from_names(
            "Data/Textures",
            vec!["a.png".into(), "b.png".into()],
        ));
        assert_eq!(manager.texture(1), Some(TextureId(1)));
        assert_eq!(manager.texture(2), None);
    }
}
