//! Whole-file reads and atomic writes for document sessions

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}: is a directory")]
    Directory { path: PathBuf },
    #[error("{path}: cannot open {kind} files")]
    SpecialFile { path: PathBuf, kind: &'static str },
    #[error("invalid path: {0}")]
    InvalidPath(PathBuf),
}

impl PersistError {
    fn io(path: &Path, source: io::Error) -> Self {
        PersistError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Refuse anything that is not a regular file (or not yet a file at all)
pub fn validate_path(path: &Path) -> Result<PathBuf, PersistError> {
    if path.as_os_str().is_empty() || path.file_name().is_none() {
        return Err(PersistError::InvalidPath(path.to_path_buf()));
    }
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(path.to_path_buf()),
        Err(err) => return Err(PersistError::io(path, err)),
    };
    if metadata.is_dir() {
        return Err(PersistError::Directory {
            path: path.to_path_buf(),
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        let ft = metadata.file_type();
        let kind = if ft.is_char_device() {
            Some("character device")
        } else if ft.is_block_device() {
            Some("block device")
        } else if ft.is_fifo() {
            Some("FIFO")
        } else if ft.is_socket() {
            Some("socket")
        } else {
            None
        };
        if let Some(kind) = kind {
            return Err(PersistError::SpecialFile {
                path: path.to_path_buf(),
                kind,
            });
        }
    }

    Ok(path.to_path_buf())
}

/// Read a whole file as text. Invalid UTF-8 is replaced, not rejected.
pub fn open(path: &Path) -> Result<String, PersistError> {
    let path = validate_path(path)?;
    let bytes = fs::read(&path).map_err(|e| PersistError::io(&path, e))?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(target: "persistence", path = %path.display(), "lossy_utf8_decode");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    };
    tracing::info!(target: "persistence", path = %path.display(), bytes = text.len(), "file_opened");
    Ok(text)
}

/// Write `text` to `path` through a temp file in the same directory
pub fn save(path: &Path, text: &str) -> Result<(), PersistError> {
    let path = validate_path(path)?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut temp = NamedTempFile::new_in(&parent).map_err(|e| PersistError::io(&parent, e))?;
    temp.write_all(text.as_bytes())
        .and_then(|_| temp.flush())
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| PersistError::io(&path, e))?;
    temp.persist(&path)
        .map_err(|e| PersistError::io(&path, e.error))?;

    tracing::info!(target: "persistence", path = %path.display(), bytes = text.len(), "file_saved");
    Ok(())
}
