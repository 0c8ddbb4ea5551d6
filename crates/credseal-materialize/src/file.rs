// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Writing plaintext to uniquely named, owner-only temporary files.

use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use credseal_config::model::MaterializerConfig;
use credseal_core::MaterializationError;
use tracing::{debug, warn};

use crate::scope::ScopeKey;

/// Process-wide suffix counter; separates calls within the same nanosecond.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Attempts at finding an unused name before giving up.
const MAX_NAME_ATTEMPTS: usize = 16;

/// Creates credential files in one dedicated directory.
#[derive(Debug, Clone)]
pub struct Materializer {
    directory: PathBuf,
    extension: String,
}

impl Materializer {
    pub fn new(directory: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &MaterializerConfig) -> Self {
        Self::new(&config.directory, &config.file_extension)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write plaintext to a new file and return its owning handle.
    ///
    /// The directory is created on first use (`0700` on unix) and the file is
    /// created exclusively (`0600` on unix). A write failure removes the
    /// partial file before returning.
    pub fn materialize(
        &self,
        plaintext: &[u8],
        scope: &ScopeKey,
    ) -> Result<TempCredentialFile, MaterializationError> {
        let directory =
            std::path::absolute(&self.directory).map_err(|source| MaterializationError::CreateDir {
                path: self.directory.clone(),
                source,
            })?;
        create_private_dir(&directory)?;

        let mut last_path = directory.clone();
        for _ in 0..MAX_NAME_ATTEMPTS {
            let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
            let path = directory.join(self.file_name(scope, seq));
            match create_exclusive(&path) {
                Ok(mut file) => {
                    // The handle owns the path from here on, so any failure
                    // below removes the partial file on drop.
                    let handle = TempCredentialFile::new(path);
                    file.write_all(plaintext)
                        .and_then(|()| file.sync_all())
                        .map_err(|source| MaterializationError::Write {
                            path: handle.path.clone(),
                            source,
                        })?;
                    debug!(
                        operation = scope.operation(),
                        path = %handle.path.display(),
                        "materialized credential file"
                    );
                    return Ok(handle);
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    last_path = path;
                }
                Err(source) => return Err(MaterializationError::Write { path, source }),
            }
        }

        Err(MaterializationError::Write {
            path: last_path,
            source: io::Error::new(
                io::ErrorKind::AlreadyExists,
                "no unused credential file name found",
            ),
        })
    }

    fn file_name(&self, scope: &ScopeKey, seq: u64) -> String {
        let stem = scope.file_stem(seq);
        if self.extension.is_empty() {
            stem
        } else {
            format!("{stem}.{}", self.extension)
        }
    }
}

/// A materialized credential file, deleted when released or dropped.
///
/// `Created -> InUse -> Released` is encoded in ownership: [`release`]
/// consumes the handle, so a released file cannot be used again.
///
/// [`release`]: TempCredentialFile::release
#[derive(Debug)]
pub struct TempCredentialFile {
    path: PathBuf,
    released: bool,
}

impl TempCredentialFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    /// Absolute path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file. A file that is already gone counts as released.
    pub fn release(mut self) -> Result<(), MaterializationError> {
        self.released = true;
        remove_if_present(&self.path)
    }
}

impl Drop for TempCredentialFile {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = remove_if_present(&self.path) {
            warn!(error = %err, "failed to remove credential file on drop");
        }
    }
}

fn remove_if_present(path: &Path) -> Result<(), MaterializationError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(MaterializationError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn create_private_dir(directory: &Path) -> Result<(), MaterializationError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
        .create(directory)
        .map_err(|source| MaterializationError::CreateDir {
            path: directory.to_path_buf(),
            source,
        })
}

fn create_exclusive(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}
