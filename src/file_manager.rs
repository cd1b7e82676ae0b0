use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};

use crate::error::SortError;

/// Owns a temporary directory holding the intermediate files of one sort.
///
/// The directory and everything created inside it is removed when the manager is dropped, on
/// success and on every error path alike.
#[derive(Debug)]
pub struct FileManager {
    dir: TempDir,
    files: Vec<PathBuf>,
}

impl FileManager {
    pub fn new_in(parent: &Path, prefix: &str) -> Result<FileManager, SortError> {
        let dir = Builder::new()
            .prefix(prefix)
            .tempdir_in(parent)?;
        Ok(
            FileManager {
                dir,
                files: Vec::new(),
            }
        )
    }

    /// Create a new empty file inside the managed directory and return its path
    pub fn create_temp_file(&mut self, prefix: &str) -> Result<PathBuf, SortError> {
        let (_, path) = Builder::new()
            .prefix(prefix)
            .suffix(".bin")
            .tempfile_in(self.dir.path())?
            .keep()
            .map_err(|e| SortError::Io(e.error))?;
        self.files.push(path.clone());
        Ok(path)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Files created so far
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Remove the managed directory now, reporting failures that dropping would ignore
    pub fn delete(self) -> Result<(), SortError> {
        log::debug!("Remove {} with {} intermediate files", self.path().to_string_lossy(), self.files().len());
        self.dir.close()?;
        Ok(())
    }
}
