//! Persisted embedding artifacts.
//!
//! The binary matrix is authoritative; the JSON mirror (`text -> vector`) is
//! a debugging and lookup aid. Both are written to a temp file and renamed
//! into place, so readers see either the old file or the complete new one.

pub mod error;
pub mod mmap;
mod model;


pub use error::{StorageError, StorageResult};
pub use model::{ArchivedEmbeddingMatrix, EmbeddingMatrix};

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use rkyv::rancor::Error as RkyvError;
use rkyv::to_bytes;

use self::mmap::{AlignedMmapBuilder, MmapError, MmapFileHandle};

const TEMP_SUFFIX: &str = "tmp";

/// Text-keyed mirror of a corpus' embeddings.
pub type EmbeddingMirror = BTreeMap<String, Vec<f32>>;

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn temp_path_for(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

fn ensure_parent(path: &Path) -> StorageResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    Ok(())
}

/// Serializes `matrix` to `path`. Returns the artifact size in bytes.
pub fn write_matrix(path: &Path, matrix: &EmbeddingMatrix) -> StorageResult<usize> {
    ensure_parent(path)?;

    let bytes =
        to_bytes::<RkyvError>(matrix).map_err(|e| StorageError::Serialization(e.to_string()))?;

    let temp_path = temp_path_for(path);
    let handle = AlignedMmapBuilder::new(&temp_path)
        .write_readonly(&bytes)
        .map_err(|e| match e {
            MmapError::Io(source) => StorageError::Io {
                path: temp_path.clone(),
                source,
            },
            other => StorageError::Serialization(other.to_string()),
        })?;

    let written = handle.len();
    drop(handle);

    fs::rename(&temp_path, path).map_err(io_err(path))?;
    Ok(written)
}

/// Reads and validates the matrix at `path`.
///
/// Any file that exists but does not decode into a well-shaped matrix is
/// [`StorageError::Corrupt`].
pub fn read_matrix(path: &Path) -> StorageResult<EmbeddingMatrix> {
    if !path.exists() {
        return Err(StorageError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let corrupt = |reason: String| StorageError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };

    let handle = match MmapFileHandle::open(path) {
        Ok(h) => h,
        Err(MmapError::Io(source)) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
        Err(e) => return Err(corrupt(e.to_string())),
    };

    let matrix: EmbeddingMatrix = handle.deserialize().map_err(|e| corrupt(e.to_string()))?;
    matrix.check_shape().map_err(corrupt)?;

    Ok(matrix)
}

/// Writes the JSON mirror.
pub fn write_mirror(path: &Path, mirror: &EmbeddingMirror) -> StorageResult<()> {
    ensure_parent(path)?;

    let temp_path = temp_path_for(path);
    {
        let file = File::create(&temp_path).map_err(io_err(&temp_path))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, mirror)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        writer.flush().map_err(io_err(&temp_path))?;
    }

    fs::rename(&temp_path, path).map_err(io_err(path))?;
    Ok(())
}

/// Reads the JSON mirror.
pub fn read_mirror(path: &Path) -> StorageResult<EmbeddingMirror> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StorageError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(io_err(path)(e)),
    };

    serde_json::from_reader(BufReader::new(file)).map_err(|e| StorageError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Removes `path` if present. Returns whether a file was removed.
pub fn remove_if_exists(path: &Path) -> StorageResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_err(path)(e)),
    }
}
