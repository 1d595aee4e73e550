//! The optional header in its PE32 and PE32+ variants.
//!
//! The layout is selected by the leading magic value alone: `0x10B` is PE32 and carries a
//! `BaseOfData` field plus 32-bit image base and stack/heap sizes, `0x20B` is PE32+ and drops
//! `BaseOfData` while widening those five fields to 64 bits. Both decode into the same
//! [`OptionalHeader`], with the variable-width fields held as `u64` and `base_of_data` present
//! only for PE32.
//!
//! The data directory table immediately follows the fixed fields and is decoded separately by
//! [`crate::pe::DataDirectories::read`].

use crate::{
    file::parser::Parser,
    pe::{
        constants::{Subsystem, PE32PLUS_MAGIC, PE32_MAGIC},
        flags::DllCharacteristics,
    },
    Error, Result,
};

/// Size of the fixed PE32 optional header fields, magic included.
pub const PE32_FIXED_SIZE: usize = 96;
/// Size of the fixed PE32+ optional header fields, magic included.
pub const PE32PLUS_FIXED_SIZE: usize = 112;

/// The optional header, unified over PE32 and PE32+
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalHeader {
    /// `0x10B` for PE32, `0x20B` for PE32+
    pub magic: u16,
    /// Linker major version
    pub major_linker_version: u8,
    /// Linker minor version
    pub minor_linker_version: u8,
    /// Sum of the sizes of all code sections
    pub size_of_code: u32,
    /// Sum of the sizes of all initialized data sections
    pub size_of_initialized_data: u32,
    /// Sum of the sizes of all uninitialized data sections
    pub size_of_uninitialized_data: u32,
    /// RVA of the entry point, zero if there is none
    pub address_of_entry_point: u32,
    /// RVA of the start of the code section
    pub base_of_code: u32,
    /// RVA of the start of the data section, PE32 only
    pub base_of_data: Option<u32>,
    /// Preferred load address
    pub image_base: u64,
    /// Alignment of sections in memory
    pub section_alignment: u32,
    /// Alignment of section data in the file
    pub file_alignment: u32,
    /// Required operating system major version
    pub major_operating_system_version: u16,
    /// Required operating system minor version
    pub minor_operating_system_version: u16,
    /// Image major version
    pub major_image_version: u16,
    /// Image minor version
    pub minor_image_version: u16,
    /// Subsystem major version
    pub major_subsystem_version: u16,
    /// Subsystem minor version
    pub minor_subsystem_version: u16,
    /// Reserved, must be zero
    pub win32_version_value: u32,
    /// Size of the image in memory, headers included
    pub size_of_image: u32,
    /// Combined size of all headers, rounded up to the file alignment
    pub size_of_headers: u32,
    /// Image checksum
    pub check_sum: u32,
    /// Subsystem required to run the image
    pub subsystem: Subsystem,
    /// DLL characteristics
    pub dll_characteristics: DllCharacteristics,
    /// Stack reserve size
    pub size_of_stack_reserve: u64,
    /// Stack commit size
    pub size_of_stack_commit: u64,
    /// Heap reserve size
    pub size_of_heap_reserve: u64,
    /// Heap commit size
    pub size_of_heap_commit: u64,
    /// Reserved, must be zero
    pub loader_flags: u32,
    /// Number of data directory entries that follow
    pub number_of_rva_and_sizes: u32,
}

impl OptionalHeader {
    /// Create an `OptionalHeader` from a sequence of bytes
    ///
    /// # Arguments
    /// * 'data' - The byte slice from which this object shall be created, starting at the magic
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidMagic`] if the magic is neither PE32 nor PE32+, or
    /// [`crate::Error::Truncated`] if the data ends inside the fixed fields.
    pub fn read(data: &[u8]) -> Result<OptionalHeader> {
        let mut parser = Parser::new(data);

        let magic = parser.read_le::<u16>()?;
        let is_64bit = match magic {
            PE32_MAGIC => false,
            PE32PLUS_MAGIC => true,
            _ => return Err(Error::InvalidMagic(magic)),
        };

        Ok(OptionalHeader {
            magic,
            major_linker_version: parser.read_le::<u8>()?,
            minor_linker_version: parser.read_le::<u8>()?,
            size_of_code: parser.read_le::<u32>()?,
            size_of_initialized_data: parser.read_le::<u32>()?,
            size_of_uninitialized_data: parser.read_le::<u32>()?,
            address_of_entry_point: parser.read_le::<u32>()?,
            base_of_code: parser.read_le::<u32>()?,
            base_of_data: if is_64bit {
                None
            } else {
                Some(parser.read_le::<u32>()?)
            },
            image_base: parser.read_le_dyn(is_64bit)?,
            section_alignment: parser.read_le::<u32>()?,
            file_alignment: parser.read_le::<u32>()?,
            major_operating_system_version: parser.read_le::<u16>()?,
            minor_operating_system_version: parser.read_le::<u16>()?,
            major_image_version: parser.read_le::<u16>()?,
            minor_image_version: parser.read_le::<u16>()?,
            major_subsystem_version: parser.read_le::<u16>()?,
            minor_subsystem_version: parser.read_le::<u16>()?,
            win32_version_value: parser.read_le::<u32>()?,
            size_of_image: parser.read_le::<u32>()?,
            size_of_headers: parser.read_le::<u32>()?,
            check_sum: parser.read_le::<u32>()?,
            subsystem: Subsystem::from(parser.read_le::<u16>()?),
            dll_characteristics: DllCharacteristics::from_bits_retain(parser.read_le::<u16>()?),
            size_of_stack_reserve: parser.read_le_dyn(is_64bit)?,
            size_of_stack_commit: parser.read_le_dyn(is_64bit)?,
            size_of_heap_reserve: parser.read_le_dyn(is_64bit)?,
            size_of_heap_commit: parser.read_le_dyn(is_64bit)?,
            loader_flags: parser.read_le::<u32>()?,
            number_of_rva_and_sizes: parser.read_le::<u32>()?,
        })
    }

    /// Returns `true` for PE32+ images
    #[must_use]
    pub fn is_64bit(&self) -> bool {
        self.magic == PE32PLUS_MAGIC
    }

    /// Size of the fixed fields in bytes; the data directory table starts at this offset
    #[must_use]
    pub fn fixed_size(&self) -> usize {
        if self.is_64bit() {
            PE32PLUS_FIXED_SIZE
        } else {
            PE32_FIXED_SIZE
        }
    }
}
