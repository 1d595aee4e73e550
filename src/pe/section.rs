//! The section table.

use crate::{
    file::parser::Parser,
    pe::{constants::SECTION_HEADER_SIZE, flags::SectionFlags},
    Result,
};

/// One 40-byte record of the section table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    /// Section name, at most 8 bytes with trailing NULs removed
    pub name: String,
    /// Size of the section in memory
    pub virtual_size: u32,
    /// RVA of the first byte of the section
    pub virtual_address: u32,
    /// Size of the initialized data on disk
    pub size_of_raw_data: u32,
    /// File offset of the initialized data
    pub pointer_to_raw_data: u32,
    /// File offset of the COFF relocations (object files)
    pub pointer_to_relocations: u32,
    /// File offset of the COFF line numbers (deprecated)
    pub pointer_to_linenumbers: u32,
    /// Number of COFF relocations
    pub number_of_relocations: u16,
    /// Number of COFF line numbers
    pub number_of_linenumbers: u16,
    /// Section characteristics
    pub characteristics: SectionFlags,
}

impl SectionHeader {
    /// Create a `SectionHeader` from a sequence of bytes
    ///
    /// # Arguments
    /// * 'data' - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if fewer than 40 bytes are available.
    pub fn read(data: &[u8]) -> Result<SectionHeader> {
        let mut parser = Parser::new(data);

        let raw_name = parser.read_bytes(8)?;
        let name_len = raw_name.iter().position(|&b| b == 0).unwrap_or(8);

        Ok(SectionHeader {
            name: String::from_utf8_lossy(&raw_name[..name_len]).into_owned(),
            virtual_size: parser.read_le::<u32>()?,
            virtual_address: parser.read_le::<u32>()?,
            size_of_raw_data: parser.read_le::<u32>()?,
            pointer_to_raw_data: parser.read_le::<u32>()?,
            pointer_to_relocations: parser.read_le::<u32>()?,
            pointer_to_linenumbers: parser.read_le::<u32>()?,
            number_of_relocations: parser.read_le::<u16>()?,
            number_of_linenumbers: parser.read_le::<u16>()?,
            characteristics: SectionFlags::from_bits_retain(parser.read_le::<u32>()?),
        })
    }

    /// Decodes `count` consecutive section headers
    ///
    /// # Arguments
    /// * 'data'  - The byte slice starting at the first section header
    /// * 'count' - The number of sections declared in the file header
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if the table runs past the end of the data.
    pub fn read_table(data: &[u8], count: u16) -> Result<Vec<SectionHeader>> {
        let mut parser = Parser::new(data);
        let mut sections = Vec::with_capacity(usize::from(count));

        for _ in 0..count {
            let record = parser.read_bytes(SECTION_HEADER_SIZE)?;
            sections.push(SectionHeader::read(record)?);
        }

        Ok(sections)
    }

    /// Returns `true` if `[rva, rva + len)` lies within the section's file-backed range.
    ///
    /// The mapped range is `[virtual_address, virtual_address + size_of_raw_data)`; a read may
    /// end exactly on its last byte.
    #[must_use]
    pub fn contains(&self, rva: u64, len: u64) -> bool {
        let start = u64::from(self.virtual_address);
        let end = start + u64::from(self.size_of_raw_data);

        match rva.checked_add(len) {
            Some(read_end) => rva >= start && read_end <= end,
            None => false,
        }
    }
}
