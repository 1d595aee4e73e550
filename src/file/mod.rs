//! PE file abstraction and decode pipeline.
//!
//! This module owns the raw bytes of an image and runs every decoder in [`crate::pe`] over them,
//! producing a [`crate::file::File`] that exposes the decoded structures through accessors.
//!
//! # Key Components
//!
//! ## Core Types
//! - [`crate::file::File`] - The decoded image together with its raw bytes
//! - [`crate::file::Backend`] - Trait for different data sources (disk files, memory buffers)
//!
//! ## Parsing Infrastructure
//! - [`crate::file::parser::Parser`] - Cursor over a byte slice used by all decoders
//! - [`crate::file::io`] - Low-level little-endian reads
//!
//! ## Backend Implementations
//! - [`crate::file::physical::Physical`] - Memory-mapped file backend for disk access
//! - [`crate::file::memory::Memory`] - In-memory buffer backend
//!
//! # Decode Order
//!
//! 1. PE signature at the offset stored at `0x3C`
//! 2. COFF file header
//! 3. Optional header (PE32 or PE32+, selected by magic)
//! 4. Data directory table, directly after the optional header's fixed fields
//! 5. Section table, directly after the data directory table
//! 6. Import, base relocation and debug directories, resolved through the section table
//!
//! Every step either succeeds or aborts the load; there is no partially decoded [`File`].
//! Directories without a decoder are recorded as [`crate::pe::Unsupported`] markers instead.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pescope::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("C:/Windows/System32/notepad.exe"))?;
//! println!("Image base: 0x{:x}", file.imagebase());
//!
//! for import in file.imports() {
//!     println!("{}: {} entries", import.directory.name, import.lookup_entries.len());
//! }
//! # Ok::<(), pescope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! A [`File`] is immutable after construction and is `Send + Sync`.

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::{fmt, io::Read, path::Path};

use crate::{
    pe::{
        constants::{DATA_DIRECTORY_SIZE, FILE_HEADER_SIZE},
        directory::DirectoryContents,
        header::{file_header_offset, FileHeader},
        AddressSpace, BaseRelocBlock, DataDirectories, DataDirectory, DataDirectoryType,
        DebugEntry, ImportEntry, OptionalHeader, SectionHeader, Unsupported,
    },
    Error::{Empty, FileError, Truncated},
    Result,
};
use memory::Memory;
use physical::Physical;

/// Backend trait for file data sources.
///
/// This trait abstracts over the source of PE data, allowing for both in-memory and on-disk
/// representations. All implementations must be thread-safe.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Truncated`] if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// A decoded PE image.
///
/// Owns the raw bytes through a [`Backend`] and every structure decoded from them. Decoded
/// values never borrow from the buffer; the buffer is kept for [`File::read_data`] and
/// friends.
///
/// # Examples
///
/// ```rust,no_run
/// use pescope::{pe::DataDirectoryType, File};
///
/// let data = std::fs::read("app.exe")?;
/// let file = File::from_mem(data)?;
///
/// println!("{} sections", file.sections().len());
/// if let Some(debug) = file.directory(DataDirectoryType::Debug) {
///     println!("debug directory at 0x{:x}", debug.virtual_address);
/// }
/// for entry in file.debug_entries() {
///     println!("{:?}", entry.data);
/// }
/// # Ok::<(), pescope::Error>(())
/// ```
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
    header: FileHeader,
    optional_header: OptionalHeader,
    directories: DataDirectories,
    sections: Vec<SectionHeader>,
    contents: DirectoryContents,
}

impl File {
    /// Loads and decodes a PE file from the given path.
    ///
    /// The file is memory-mapped for the lifetime of the returned [`File`].
    ///
    /// # Arguments
    ///
    /// * `file` - Path to the PE file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped,
    /// [`crate::Error::Empty`] for a zero-length file, or any decode error.
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Reads `reader` to its end and decodes the collected bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if reading fails, otherwise the errors of
    /// [`File::from_mem`].
    pub fn from_reader(mut reader: impl Read) -> Result<File> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).map_err(FileError)?;

        Self::from_mem(data)
    }

    /// Decodes a PE file that is already in memory.
    ///
    /// # Arguments
    ///
    /// * `data` - The bytes of the PE file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Empty`] for an empty buffer, or any decode error.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    /// Internal loader for any backend.
    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        let bytes = data.data();

        let header_offset = file_header_offset(bytes)?;
        let header = FileHeader::read(tail(bytes, header_offset)?)?;

        let optional_offset = header_offset + FILE_HEADER_SIZE;
        let optional_header = OptionalHeader::read(tail(bytes, optional_offset)?)?;

        let directories_offset = optional_offset + optional_header.fixed_size();
        let directories = DataDirectories::read(
            tail(bytes, directories_offset)?,
            optional_header.number_of_rva_and_sizes,
        )?;

        let sections_offset = directories_offset + directories.len() * DATA_DIRECTORY_SIZE;
        let sections =
            SectionHeader::read_table(tail(bytes, sections_offset)?, header.number_of_sections)?;

        log::debug!(
            "{} image, {} sections, {} data directories",
            if optional_header.is_64bit() {
                "PE32+"
            } else {
                "PE32"
            },
            sections.len(),
            directories.len()
        );

        let space = AddressSpace::new(bytes, &sections, optional_header.image_base);
        let contents =
            DirectoryContents::decode(&directories, &space, bytes, optional_header.is_64bit())?;

        Ok(File {
            data: Box::new(data),
            header,
            optional_header,
            directories,
            sections,
            contents,
        })
    }

    /// Returns the total size of the loaded file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the file has a length of zero.
    ///
    /// A successfully loaded [`File`] is never empty; this exists for API symmetry with
    /// [`File::len`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the raw bytes of the file.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns a slice of the file data at the given offset and length.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Truncated`] if the requested range is out of bounds.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }

    /// The COFF file header
    #[must_use]
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// The optional header
    #[must_use]
    pub fn optional_header(&self) -> &OptionalHeader {
        &self.optional_header
    }

    /// The data directory table, including absent slots
    #[must_use]
    pub fn directories(&self) -> &DataDirectories {
        &self.directories
    }

    /// Returns the data directory of the given kind, if the table declares it and it is
    /// present.
    #[must_use]
    pub fn directory(&self, kind: DataDirectoryType) -> Option<&DataDirectory> {
        self.directories.get(kind)
    }

    /// The section table, in file order
    #[must_use]
    pub fn sections(&self) -> &[SectionHeader] {
        &self.sections
    }

    /// Returns the first section whose name equals `name`.
    #[must_use]
    pub fn section_by_name(&self, name: &str) -> Option<&SectionHeader> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Returns the first section that maps `rva`.
    #[must_use]
    pub fn section_containing(&self, rva: u64) -> Option<&SectionHeader> {
        self.address_space().section_for(rva, 1)
    }

    /// Decoded import descriptors, in table order
    #[must_use]
    pub fn imports(&self) -> &[ImportEntry] {
        &self.contents.imports
    }

    /// Decoded base relocation blocks, in table order
    #[must_use]
    pub fn relocations(&self) -> &[BaseRelocBlock] {
        &self.contents.relocations
    }

    /// Decoded debug directory entries, in table order
    #[must_use]
    pub fn debug_entries(&self) -> &[DebugEntry] {
        &self.contents.debug
    }

    /// Directories and debug payloads that were present but not decoded
    #[must_use]
    pub fn unsupported(&self) -> &[Unsupported] {
        &self.contents.unsupported
    }

    /// Returns an [`AddressSpace`] for resolving RVAs against this file's sections.
    #[must_use]
    pub fn address_space(&self) -> AddressSpace<'_> {
        AddressSpace::new(
            self.data.data(),
            &self.sections,
            self.optional_header.image_base,
        )
    }

    /// Reads `len` bytes at `rva`.
    ///
    /// # Errors
    ///
    /// See [`AddressSpace::read_data`].
    pub fn read_data(&self, rva: u64, len: usize) -> Result<&[u8]> {
        self.address_space().read_data(rva, len)
    }

    /// Reads `len` bytes at the absolute virtual address `va`.
    ///
    /// # Errors
    ///
    /// See [`AddressSpace::read_data_va`].
    pub fn read_data_va(&self, va: u64, len: usize) -> Result<&[u8]> {
        self.address_space().read_data_va(va, len)
    }

    /// Converts an RVA to a file offset.
    ///
    /// # Errors
    ///
    /// See [`AddressSpace::rva_to_offset`].
    pub fn rva_to_offset(&self, rva: u64) -> Result<usize> {
        self.address_space().rva_to_offset(rva)
    }

    /// The preferred load address
    #[must_use]
    pub fn imagebase(&self) -> u64 {
        self.optional_header.image_base
    }

    /// `true` for PE32+ images
    #[must_use]
    pub fn is_64bit(&self) -> bool {
        self.optional_header.is_64bit()
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("len", &self.len())
            .field("header", &self.header)
            .field("optional_header", &self.optional_header)
            .field("directories", &self.directories)
            .field("sections", &self.sections)
            .field("imports", &self.contents.imports)
            .field("relocations", &self.contents.relocations)
            .field("debug", &self.contents.debug)
            .field("unsupported", &self.contents.unsupported)
            .finish()
    }
}

/// Returns everything from `offset` to the end of `data`.
fn tail(data: &[u8], offset: usize) -> Result<&[u8]> {
    data.get(offset..).ok_or(Truncated {
        offset,
        needed: 1,
        available: data.len(),
    })
}
