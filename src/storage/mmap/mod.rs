pub mod error;


pub use error::{MmapError, MmapResult};

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;
use rkyv::api::high::{HighDeserializer, HighValidator, from_bytes};
use rkyv::bytecheck::CheckBytes;
use rkyv::rancor::Error as RkyvError;
use rkyv::{Archive, Deserialize};

pub const RKYV_ALIGNMENT: usize = 16;

/// Shared read-only mapping of a persisted artifact.
///
/// Clones share one mapping. The file must not be rewritten in place while a
/// handle is alive; writers replace it with a rename instead.
#[derive(Clone)]
pub struct MmapFileHandle {
    inner: Arc<Mmap>,
    path: Arc<std::path::PathBuf>,
}

impl std::fmt::Debug for MmapFileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmapFileHandle")
            .field("path", &self.path)
            .field("len", &self.len())
            .field("strong_count", &self.strong_count())
            .finish()
    }
}

impl MmapFileHandle {
    pub fn open<P: AsRef<Path>>(path: P) -> MmapResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let metadata = file.metadata()?;
        if metadata.len() == 0 {
            return Err(MmapError::EmptyFile);
        }

        // SAFETY: We ensure the file exists and is readable.
        // The Arc wrapper provides thread-safe shared access.
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Self {
            inner: Arc::new(mmap),
            path: Arc::new(path.to_path_buf()),
        })
    }

    pub fn as_slice(&self) -> &[u8] {
        self.inner.deref()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Validates the mapped bytes and deserializes an owned `T`.
    pub fn deserialize<T>(&self) -> MmapResult<T>
    where
        T: Archive,
        T::Archived: for<'a> CheckBytes<HighValidator<'a, RkyvError>>
            + Deserialize<T, HighDeserializer<RkyvError>>,
    {
        let data = self.as_slice();

        if !(data.as_ptr() as usize).is_multiple_of(RKYV_ALIGNMENT) {
            return Err(MmapError::AlignmentError {
                offset: 0,
                alignment: RKYV_ALIGNMENT,
            });
        }

        from_bytes::<T, RkyvError>(data).map_err(|e| MmapError::ValidationFailed(e.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Writes bytes to a file and maps it read-only.
pub struct AlignedMmapBuilder {
    path: std::path::PathBuf,
}

impl AlignedMmapBuilder {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn write_readonly(self, data: &[u8]) -> MmapResult<MmapFileHandle> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;

        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        MmapFileHandle::open(&self.path)
    }
}
