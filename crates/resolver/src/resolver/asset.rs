//! Read and write handles for resolved assets.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{ResolverError, Result};

/// Read-only view over an asset's bytes.
///
/// The buffer is shared; cloning an `Asset` never copies the data.
#[derive(Clone, Debug)]
pub struct Asset {
    path: PathBuf,
    data: Arc<[u8]>,
}

impl Asset {
    pub fn new(path: impl Into<PathBuf>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }

    /// Read the whole file at `path`.
    pub fn read_from(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| ResolverError::io(path, e))?;
        Ok(Self::new(path, bytes))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn buffer(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    /// Copy up to `buf.len()` bytes starting at `offset`; returns the count copied.
    pub fn read(&self, buf: &mut [u8], offset: usize) -> usize {
        if offset >= self.data.len() {
            return 0;
        }
        let count = buf.len().min(self.data.len() - offset);
        buf[..count].copy_from_slice(&self.data[offset..offset + count]);
        count
    }

    /// The contents as UTF-8 text.
    pub fn text(&self) -> std::result::Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.data)
    }
}

/// How an existing file is treated when opened for writing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WriteMode {
    /// Keep existing contents; writes overwrite in place.
    Update,
    /// Discard existing contents.
    Replace,
}

/// Positional write handle over a plain file.
#[derive(Debug)]
pub struct WritableAsset {
    path: PathBuf,
    file: File,
}

impl WritableAsset {
    /// Open `path` for writing, creating parent directories as needed.
    pub fn open(path: &Path, mode: WriteMode) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ResolverError::io(parent, e))?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true);
        match mode {
            WriteMode::Replace => options.truncate(true),
            WriteMode::Update => options.read(true).truncate(false),
        };

        let file = options.open(path).map_err(|e| ResolverError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all of `data` at `offset`; returns the byte count written.
    pub fn write(&mut self, data: &[u8], offset: u64) -> Result<usize> {
        self.file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| self.file.write_all(data))
            .map_err(|e| ResolverError::io(&self.path, e))?;
        Ok(data.len())
    }

    /// Flush to disk and release the handle.
    pub fn close(mut self) -> Result<()> {
        self.file
            .flush()
            .and_then(|_| self.file.sync_all())
            .map_err(|e| ResolverError::io(&self.path, e))
    }
}
