//! PE signature location and the COFF file header.
//!
//! An image starts with an MS-DOS stub whose 4-byte field at `0x3C` points to the `PE\0\0`
//! signature. The 20-byte COFF file header follows the signature directly, and the optional
//! header follows the file header.

use chrono::{DateTime, TimeZone, Utc};

use crate::{
    file::{io::read_le_at, parser::Parser},
    pe::{
        constants::{MachineType, PE_POINTER_OFFSET, PE_SIGNATURE},
        flags::Characteristics,
    },
    Error, Result,
};

/// Converts a raw seconds-since-epoch header field to an absolute UTC time.
pub(crate) fn timestamp(seconds: u32) -> DateTime<Utc> {
    Utc.timestamp_opt(i64::from(seconds), 0)
        .single()
        .unwrap_or_default()
}

/// Locates and validates the PE signature.
///
/// Returns the file offset of the COFF file header, i.e. the byte right after `PE\0\0`.
///
/// # Arguments
/// * `data` - The complete image
///
/// # Errors
/// Returns [`crate::Error::Truncated`] if the pointer or the signature lie beyond the end of
/// the data, or [`crate::Error::InvalidSignature`] if the signature does not match.
pub fn file_header_offset(data: &[u8]) -> Result<usize> {
    let mut pointer_offset = PE_POINTER_OFFSET;
    let signature_offset = read_le_at::<u32>(data, &mut pointer_offset)? as usize;

    let mut parser = Parser::new(data);
    parser.seek(signature_offset)?;

    let signature = parser.read_bytes(PE_SIGNATURE.len())?;
    if signature != PE_SIGNATURE {
        let mut found = [0_u8; 4];
        found.copy_from_slice(signature);
        return Err(Error::InvalidSignature { found });
    }

    Ok(parser.pos())
}

/// The COFF file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Target CPU
    pub machine: MachineType,
    /// Number of section table entries
    pub number_of_sections: u16,
    /// Time the image was created by the linker
    pub time_date_stamp: DateTime<Utc>,
    /// File offset of the COFF symbol table, zero if absent
    pub pointer_to_symbol_table: u32,
    /// Number of COFF symbol table entries
    pub number_of_symbols: u32,
    /// Size of the optional header in bytes
    pub size_of_optional_header: u16,
    /// Image attributes
    pub characteristics: Characteristics,
}

impl FileHeader {
    /// Create a `FileHeader` from a sequence of bytes
    ///
    /// # Arguments
    /// * 'data' - The byte slice from which this object shall be created, starting right after
    ///   the PE signature
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if fewer than 20 bytes are available.
    pub fn read(data: &[u8]) -> Result<FileHeader> {
        let mut parser = Parser::new(data);

        Ok(FileHeader {
            machine: MachineType::from(parser.read_le::<u16>()?),
            number_of_sections: parser.read_le::<u16>()?,
            time_date_stamp: timestamp(parser.read_le::<u32>()?),
            pointer_to_symbol_table: parser.read_le::<u32>()?,
            number_of_symbols: parser.read_le::<u32>()?,
            size_of_optional_header: parser.read_le::<u16>()?,
            characteristics: Characteristics::from_bits_retain(parser.read_le::<u16>()?),
        })
    }
}
