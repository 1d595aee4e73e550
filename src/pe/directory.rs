//! The data directory table and the dispatcher that decodes its contents.
//!
//! The optional header ends with up to 16 `{rva, size}` slots whose meaning is fixed by
//! position ([`DataDirectoryType`]). Slots that are entirely zero are absent. The import, base
//! relocation and debug directories are decoded; every other present slot is recorded as an
//! [`Unsupported`] marker and decoding carries on with the remaining slots.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pescope::{pe::DataDirectoryType, File};
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("kernel32.dll"))?;
//! for (kind, directory) in file.directories().iter() {
//!     println!("{:<24} rva=0x{:08x} size=0x{:x}", kind, directory.virtual_address, directory.size);
//! }
//!
//! if let Some(debug) = file.directory(DataDirectoryType::Debug) {
//!     println!("{} debug descriptors", debug.size / 28);
//! }
//! # Ok::<(), pescope::Error>(())
//! ```

use strum::{EnumCount, EnumIter, FromRepr};

use crate::{
    file::parser::Parser,
    pe::{
        address::AddressSpace,
        constants::{DebugType, DATA_DIRECTORY_SIZE, MAX_DATA_DIRECTORIES},
        debug::{read_debug_entries, DebugData, DebugEntry},
        import::{read_imports, ImportEntry},
        reloc::{read_relocations, BaseRelocBlock},
    },
    Result,
};

/// Meaning of a data directory slot, by position
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, FromRepr, strum::Display,
)]
#[repr(usize)]
pub enum DataDirectoryType {
    /// Export table
    ExportTable = 0,
    /// Import table
    ImportTable = 1,
    /// Resource table
    ResourceTable = 2,
    /// Exception table
    ExceptionTable = 3,
    /// Attribute certificate table
    CertificateTable = 4,
    /// Base relocation table
    BaseRelocationTable = 5,
    /// Debug data
    Debug = 6,
    /// Reserved, must be zero
    Architecture = 7,
    /// Global pointer register value
    GlobalPtr = 8,
    /// Thread local storage table
    TlsTable = 9,
    /// Load configuration table
    LoadConfigTable = 10,
    /// Bound import table
    BoundImport = 11,
    /// Import address table
    ImportAddressTable = 12,
    /// Delay import descriptor
    DelayImportDescriptor = 13,
    /// CLR runtime header
    ClrRuntimeHeader = 14,
    /// Reserved, must be zero
    Reserved = 15,
}

/// One `{rva, size}` slot of the data directory table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataDirectory {
    /// RVA of the table
    pub virtual_address: u32,
    /// Size of the table in bytes
    pub size: u32,
}

impl DataDirectory {
    /// Create a `DataDirectory` from a sequence of bytes
    ///
    /// # Arguments
    /// * 'data' - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if fewer than 8 bytes are available.
    pub fn read(data: &[u8]) -> Result<DataDirectory> {
        let mut parser = Parser::new(data);

        Ok(DataDirectory {
            virtual_address: parser.read_le::<u32>()?,
            size: parser.read_le::<u32>()?,
        })
    }

    /// Returns `true` if both the RVA and the size are zero, i.e. the slot is absent
    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.virtual_address == 0 && self.size == 0
    }
}

/// The data directory table, holding between 0 and 16 slots
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataDirectories {
    entries: Vec<DataDirectory>,
}

impl DataDirectories {
    /// Decodes `count` consecutive slots
    ///
    /// # Arguments
    /// * 'data'  - The byte slice starting at the first slot
    /// * 'count' - `number_of_rva_and_sizes` from the optional header
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `count` exceeds 16, or
    /// [`crate::Error::Truncated`] if the table runs past the end of the data.
    pub fn read(data: &[u8], count: u32) -> Result<DataDirectories> {
        if count as usize > MAX_DATA_DIRECTORIES {
            return Err(malformed_error!(
                "Data directory count {} exceeds the maximum of {}",
                count,
                MAX_DATA_DIRECTORIES
            ));
        }

        let mut parser = Parser::new(data);
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            entries.push(DataDirectory::read(parser.read_bytes(DATA_DIRECTORY_SIZE)?)?);
        }

        Ok(DataDirectories { entries })
    }

    /// Returns the number of slots in the table
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no slots
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the slot for `kind`, or `None` if the table is too short to hold it or the
    /// slot is absent
    #[must_use]
    pub fn get(&self, kind: DataDirectoryType) -> Option<&DataDirectory> {
        self.entries
            .get(kind as usize)
            .filter(|directory| !directory.is_absent())
    }

    /// Iterates over all slots, absent ones included, with their meaning
    pub fn iter(&self) -> impl Iterator<Item = (DataDirectoryType, &DataDirectory)> {
        self.entries.iter().enumerate().filter_map(|(index, directory)| {
            DataDirectoryType::from_repr(index).map(|kind| (kind, directory))
        })
    }
}

/// A recognised part of the image that is not decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    /// A present data directory of a kind without a decoder
    Directory {
        /// The slot's meaning
        kind: DataDirectoryType,
        /// The slot's contents
        directory: DataDirectory,
    },
    /// A debug directory entry whose payload type has no decoder
    DebugType {
        /// Position of the entry in the debug directory
        index: usize,
        /// The payload type
        debug_type: DebugType,
    },
}

/// Everything decoded from the data directories
#[derive(Debug, Clone, Default)]
pub struct DirectoryContents {
    /// Imported modules
    pub imports: Vec<ImportEntry>,
    /// Base relocation blocks
    pub relocations: Vec<BaseRelocBlock>,
    /// Debug directory entries
    pub debug: Vec<DebugEntry>,
    /// Directories and debug payloads that were recognised but not decoded
    pub unsupported: Vec<Unsupported>,
}

impl DirectoryContents {
    /// Routes every present data directory to its decoder
    ///
    /// # Arguments
    /// * 'directories' - The decoded data directory table
    /// * 'space'       - The image's address space
    /// * 'file'        - The complete file buffer
    /// * 'is_64bit'    - `true` for PE32+ images
    ///
    /// # Errors
    /// Returns the first error raised by the import, relocation or debug decoders.
    /// Undecoded kinds are not errors.
    pub fn decode(
        directories: &DataDirectories,
        space: &AddressSpace<'_>,
        file: &[u8],
        is_64bit: bool,
    ) -> Result<DirectoryContents> {
        let mut contents = DirectoryContents::default();

        for (kind, directory) in directories.iter() {
            if directory.is_absent() {
                continue;
            }

            log::debug!(
                "Directory {}: rva=0x{:x} size=0x{:x}",
                kind,
                directory.virtual_address,
                directory.size
            );

            match kind {
                DataDirectoryType::ImportTable => {
                    contents.imports = read_imports(space, directory.virtual_address, is_64bit)?;
                }
                DataDirectoryType::BaseRelocationTable => {
                    contents.relocations =
                        read_relocations(space, directory.virtual_address, directory.size)?;
                }
                DataDirectoryType::Debug => {
                    contents.debug =
                        read_debug_entries(space, file, directory.virtual_address, directory.size)?;

                    for (index, entry) in contents.debug.iter().enumerate() {
                        if entry.data == DebugData::Unsupported {
                            log::warn!(
                                "Debug entry {} has unsupported type {}",
                                index,
                                entry.directory.debug_type
                            );
                            contents.unsupported.push(Unsupported::DebugType {
                                index,
                                debug_type: entry.directory.debug_type,
                            });
                        }
                    }
                }
                // Includes the resource table, whose tree decoder is a future extension
                _ => {
                    log::warn!("Directory {} is not supported", kind);
                    contents.unsupported.push(Unsupported::Directory {
                        kind,
                        directory: *directory,
                    });
                }
            }
        }

        Ok(contents)
    }
}
