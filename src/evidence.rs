use crate::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory that collects the screenshots of one run.
///
/// Checkpoint names map to fixed relative paths (`<dir>/<name>.png`) and are
/// overwritten on each run, so repeated runs against an unchanged target
/// produce the same set of files.
#[derive(Debug)]
pub struct EvidenceDir {
    root: PathBuf,
    captures: Vec<PathBuf>,
}

impl EvidenceDir {
    /// Open (and create if missing) an evidence directory.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            captures: Vec::new(),
        })
    }

    /// Path a checkpoint name resolves to.
    pub fn resolve(&self, name: &str) -> PathBuf {
        if name.ends_with(".png") {
            self.root.join(name)
        } else {
            self.root.join(format!("{}.png", name))
        }
    }

    /// Write a capture, overwriting any previous run's file.
    pub fn capture(&mut self, name: &str, png: &[u8]) -> Result<PathBuf> {
        let path = self.resolve(name);
        std::fs::write(&path, png)?;
        info!("captured {} ({} bytes)", path.display(), png.len());
        self.captures.push(path.clone());
        Ok(path)
    }

    /// Files written so far, in capture order.
    pub fn captures(&self) -> &[PathBuf] {
        &self.captures
    }

    /// Consume the directory handle, keeping the capture inventory.
    pub fn into_captures(self) -> Vec<PathBuf> {
        self.captures
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
