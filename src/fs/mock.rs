// src/fs/mock.rs

use super::FileSystem;
use anyhow::{Result, anyhow};
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory filesystem for tests.
///
/// Paths are normalised lexically (`.` and `..` are resolved) and may be
/// redirected with [`MockFileSystem::add_link`], which is how tests model two
/// different spellings that refer to the same file.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    links: Arc<Mutex<HashMap<PathBuf, PathBuf>>>,
    read_only: Arc<Mutex<HashSet<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = self.resolve(path.as_ref());
        let mut files = self.files.lock().unwrap();
        files.insert(path, content.into());
    }

    /// Make `link` resolve to `target`, like a symlink.
    pub fn add_link(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        let link = normalize(link.as_ref());
        let target = normalize(target.as_ref());
        self.links.lock().unwrap().insert(link, target);
    }

    /// Make every write or append to `path` fail, like a read-only file.
    pub fn deny_writes(&self, path: impl AsRef<Path>) {
        let path = self.resolve(path.as_ref());
        self.read_only.lock().unwrap().insert(path);
    }

    /// Snapshot of a file's contents, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let path = self.resolve(path.as_ref());
        self.files.lock().unwrap().get(&path).cloned()
    }

    pub fn read_to_string(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let content = self
            .contents(path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;
        String::from_utf8(content).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        let normalized = normalize(path);
        let links = self.links.lock().unwrap();
        links.get(&normalized).cloned().unwrap_or(normalized)
    }

    fn check_writable(&self, path: &Path) -> Result<()> {
        if self.read_only.lock().unwrap().contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        Ok(())
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

impl FileSystem for MockFileSystem {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.check_writable(&self.resolve(path))?;
        self.add_file(path, contents);
        Ok(())
    }

    fn append(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let path = self.resolve(path);
        self.check_writable(&path)?;
        let mut files = self.files.lock().unwrap();
        files.entry(path).or_default().extend_from_slice(contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let path = self.resolve(path);
        self.files.lock().unwrap().contains_key(&path)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let resolved = self.resolve(path);
        if self.files.lock().unwrap().contains_key(&resolved) {
            Ok(resolved)
        } else {
            Err(anyhow!("File not found: {:?}", path))
        }
    }
}
