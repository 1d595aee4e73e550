//! Import table decoding.
//!
//! The import directory is an array of 20-byte descriptors, one per imported module, ended by
//! an all-zero descriptor. Each descriptor names the module and points to two parallel thunk
//! arrays: the import lookup table (INT) and the import address table (IAT). On disk both hold
//! the same entries, each either an ordinal or the RVA of a hint/name record, and both arrays
//! end with a zero thunk. Thunks are 4 bytes wide in PE32 images and 8 bytes wide in PE32+.
//!
//! None of the sequences carries a length; a sequence that reaches the end of its containing
//! section before its terminator is rejected with [`crate::Error::MalformedSentinel`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use pescope::{pe::IntEntry, File};
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("notepad.exe"))?;
//! for import in file.imports() {
//!     println!("{}", import.directory.name);
//!     for entry in &import.lookup_entries {
//!         match entry {
//!             IntEntry::Ordinal(ordinal) => println!("  #{}", ordinal),
//!             IntEntry::Name(name) => println!("  {} (hint {})", name.name, name.hint),
//!         }
//!     }
//! }
//! # Ok::<(), pescope::Error>(())
//! ```

use chrono::{DateTime, Utc};

use crate::{
    file::parser::Parser,
    pe::{
        address::AddressSpace, bitfield::Thunk, constants::IMPORT_DESCRIPTOR_SIZE,
        header::timestamp,
    },
    Error, Result,
};

/// One import directory descriptor, with the module name resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDirectory {
    /// RVA of the import lookup table, zero if absent
    pub import_lookup_table_rva: u32,
    /// Binding time stamp, zero (the epoch) until the image is bound
    pub time_date_stamp: DateTime<Utc>,
    /// Index of the first forwarder reference
    pub forwarder_chain: u32,
    /// RVA of the module name
    pub name_rva: u32,
    /// The module name
    pub name: String,
    /// RVA of the import address table
    pub import_address_table_rva: u32,
}

/// A hint/name record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    /// Index into the exporting module's name table, tried first when binding
    pub hint: u16,
    /// Name of the imported symbol
    pub name: String,
}

/// One decoded entry of an import lookup or address table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntEntry {
    /// Import by ordinal
    Ordinal(u16),
    /// Import by name
    Name(NameEntry),
}

/// One imported module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    /// The module's descriptor
    pub directory: ImportDirectory,
    /// Entries of the import lookup table
    pub lookup_entries: Vec<IntEntry>,
    /// Entries of the import address table
    pub address_entries: Vec<IntEntry>,
}

/// Decodes the import table starting at `rva`.
///
/// # Arguments
/// * `space`    - The image's address space
/// * `rva`      - RVA of the first import descriptor
/// * `is_64bit` - `true` for PE32+ images, selecting 8-byte thunks
///
/// # Errors
/// Returns [`crate::Error::MalformedSentinel`] if a descriptor list, thunk list or name runs
/// off the end of its section, [`crate::Error::AddressOutOfRange`] if any referenced RVA is not
/// mapped, or [`crate::Error::Truncated`] if referenced section data lies past the end of the
/// file.
pub fn read_imports(
    space: &AddressSpace<'_>,
    rva: u32,
    is_64bit: bool,
) -> Result<Vec<ImportEntry>> {
    let mut parser = Parser::new(space.read_tail(u64::from(rva))?);
    let mut imports = Vec::new();

    loop {
        if parser.remaining() < IMPORT_DESCRIPTOR_SIZE {
            return Err(Error::MalformedSentinel {
                rva: u64::from(rva),
            });
        }

        let import_lookup_table_rva = parser.read_le::<u32>()?;
        let time_date_stamp = parser.read_le::<u32>()?;
        let forwarder_chain = parser.read_le::<u32>()?;
        let name_rva = parser.read_le::<u32>()?;
        let import_address_table_rva = parser.read_le::<u32>()?;

        if import_lookup_table_rva == 0
            && time_date_stamp == 0
            && forwarder_chain == 0
            && name_rva == 0
            && import_address_table_rva == 0
        {
            break;
        }

        let directory = ImportDirectory {
            import_lookup_table_rva,
            time_date_stamp: timestamp(time_date_stamp),
            forwarder_chain,
            name_rva,
            name: space.read_cstring(u64::from(name_rva))?,
            import_address_table_rva,
        };

        let lookup_entries = read_thunks(space, import_lookup_table_rva, is_64bit)?;
        let address_entries = read_thunks(space, import_address_table_rva, is_64bit)?;

        log::debug!(
            "Import '{}': {} lookup entries, {} address entries",
            directory.name,
            lookup_entries.len(),
            address_entries.len()
        );

        imports.push(ImportEntry {
            directory,
            lookup_entries,
            address_entries,
        });
    }

    Ok(imports)
}

/// Decodes the zero-terminated thunk array at `rva`; a zero `rva` yields no entries.
fn read_thunks(space: &AddressSpace<'_>, rva: u32, is_64bit: bool) -> Result<Vec<IntEntry>> {
    if rva == 0 {
        return Ok(Vec::new());
    }

    let width = if is_64bit { 8 } else { 4 };
    let mut parser = Parser::new(space.read_tail(u64::from(rva))?);
    let mut entries = Vec::new();

    loop {
        if parser.remaining() < width {
            return Err(Error::MalformedSentinel {
                rva: u64::from(rva),
            });
        }

        let raw = parser.read_le_dyn(is_64bit)?;
        if raw == 0 {
            break;
        }

        let entry = match Thunk::decode(raw, is_64bit) {
            Thunk::Ordinal(ordinal) => IntEntry::Ordinal(ordinal),
            Thunk::NameRva(name_rva) => IntEntry::Name(read_name_entry(space, name_rva)?),
        };
        entries.push(entry);
    }

    Ok(entries)
}

/// Resolves a hint/name record: a 2-byte hint followed by a NUL-terminated name.
fn read_name_entry(space: &AddressSpace<'_>, rva: u64) -> Result<NameEntry> {
    if rva > u64::from(u32::MAX) {
        return Err(Error::AddressOutOfRange { rva, len: 2 });
    }

    let mut parser = Parser::new(space.read_data(rva, 2)?);

    Ok(NameEntry {
        hint: parser.read_le::<u16>()?,
        name: space.read_cstring(rva + 2)?,
    })
}
