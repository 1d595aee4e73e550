//! Physical file backend for memory-mapped I/O.
//!
//! This module provides the [`crate::file::physical::Physical`] backend that implements the
//! [`crate::file::Backend`] trait for files on disk. The file is mapped read-only into the
//! process's address space, so the PE decoders get random access to any offset without an
//! upfront copy of the whole image.
//!
//! The mapping lives as long as the [`crate::File`] that owns it. Modifying the file on disk
//! while it is mapped is undefined behaviour on most platforms; callers that cannot rule this
//! out should read the file themselves and use [`crate::File::from_mem`].

use super::Backend;
use crate::{
    Error::{FileError, Truncated},
    Result,
};

use memmap2::Mmap;
use std::{fs, path::Path};

/// A file backend that uses memory-mapped I/O for efficient access to files on disk.
///
/// All access operations include bounds checking to ensure memory safety.
#[derive(Debug)]
pub struct Physical {
    /// Memory-mapped file data
    data: Mmap,
}

impl Physical {
    /// Create a new physical file backend by memory-mapping the specified file.
    ///
    /// # Arguments
    /// * `path` - Path to the PE file on disk. Accepts `&Path`, `&str`, `String`, or `PathBuf`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = fs::File::open(path).map_err(FileError)?;

        // SAFETY: the mapping is read-only and never handed out beyond the lifetime of `Physical`.
        let mmap = unsafe { Mmap::map(&file) }.map_err(FileError)?;

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let truncated = Truncated {
            offset,
            needed: len,
            available: self.data.len(),
        };

        let Some(offset_end) = offset.checked_add(len) else {
            return Err(truncated);
        };

        if offset_end > self.data.len() {
            return Err(truncated);
        }

        Ok(&self.data[offset..offset_end])
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("pescope_{}_{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn physical() {
        let mut contents = vec![0u8; 512];
        contents[0] = b'M';
        contents[1] = b'Z';
        contents[12..17].copy_from_slice(&[0xFF, 0xFF, 0x00, 0x00, 0xB8]);
        let path = temp_file("physical.bin", &contents);

        let physical = Physical::new(&path).unwrap();

        assert_eq!(physical.len(), 512);
        assert_eq!(physical.data()[0], 0x4D);
        assert_eq!(physical.data()[1], 0x5A);
        assert_eq!(
            physical.data_slice(12, 5).unwrap(),
            &[0xFF, 0xFF, 0x00, 0x00, 0xB8]
        );
        assert!(physical.data_slice(usize::MAX, 1).is_err());
        assert!(physical.data_slice(511, 2).is_err());
        assert_eq!(physical.data_slice(512, 0).unwrap().len(), 0);

        drop(physical);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_physical_invalid_file_path() {
        let result = Physical::new(PathBuf::from("/nonexistent/path/to/file.dll"));
        match result {
            Err(FileError(io_error)) => {
                assert_eq!(io_error.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected FileError"),
        }
    }

    #[test]
    fn test_physical_empty_file() {
        let path = temp_file("empty.bin", b"");

        let physical = Physical::new(&path).unwrap();
        assert_eq!(physical.len(), 0);
        assert!(physical.data_slice(0, 1).is_err());
        let empty_slice: &[u8] = &[];
        assert_eq!(physical.data_slice(0, 0).unwrap(), empty_slice);

        drop(physical);
        std::fs::remove_file(&path).unwrap();
    }
}
