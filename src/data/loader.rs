use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use walkdir::WalkDir;

use super::model::PropellerDataset;
use super::parser::parse_propeller;

// ---------------------------------------------------------------------------
// File listing
// ---------------------------------------------------------------------------

/// Supplies the propeller data files to load.
pub trait FileSource {
    fn files(&self) -> Result<Vec<PathBuf>>;
}

/// Every regular file below a directory, sorted by path.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirSource { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSource for DirSource {
    fn files(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            anyhow::bail!("{} is not a directory", self.root.display());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.with_context(|| format!("walking {}", self.root.display()))?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

impl FileSource for Vec<PathBuf> {
    fn files(&self) -> Result<Vec<PathBuf>> {
        Ok(self.clone())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read and parse a single propeller file.
pub fn load_file(path: &Path) -> Result<PropellerDataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_propeller(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Load every file the source lists, in listing order.
///
/// Files that fail to read or parse are logged and skipped.
pub fn load_all(source: &dyn FileSource) -> Result<Vec<PropellerDataset>> {
    let files = source.files()?;
    let mut datasets = Vec::with_capacity(files.len());

    for path in &files {
        match load_file(path) {
            Ok(dataset) if dataset.is_empty() => {
                warn!("Skipping {}: no RPM tables found", path.display());
            }
            Ok(dataset) => datasets.push(dataset),
            Err(err) => warn!("Skipping {}: {err:#}", path.display()),
        }
    }

    info!(
        "Organized {} of {} propeller data files.",
        datasets.len(),
        files.len()
    );
    Ok(datasets)
}
