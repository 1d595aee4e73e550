//! Decoders for packed integer fields.
//!
//! Three PE structures pack several values into one integer: import thunks (ordinal flag in
//! the top bit), base relocation entries (type nibble and 12-bit page offset) and the FPO
//! attribute byte. These functions unpack them into named fields; nothing past this module
//! sees the packed form.

use crate::pe::constants::{FrameType, RelocationType};

/// Top bit of a PE32 import thunk, set for imports by ordinal.
pub const ORDINAL_FLAG32: u64 = 0x8000_0000;
/// Top bit of a PE32+ import thunk, set for imports by ordinal.
pub const ORDINAL_FLAG64: u64 = 0x8000_0000_0000_0000;

/// An unpacked import lookup or address table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thunk {
    /// Import by ordinal, the low 16 bits of the entry
    Ordinal(u16),
    /// Import by name; RVA of the hint/name record
    NameRva(u64),
}

impl Thunk {
    /// Unpacks a thunk read with the image's native width.
    ///
    /// For PE32 the ordinal flag is bit 31 and the name RVA the low 31 bits; for PE32+ the flag
    /// is bit 63 and the name RVA the low 63 bits. Ordinal entries keep only the low 16 bits,
    /// the padding bits in between are ignored.
    ///
    /// # Arguments
    /// * `raw`      - The entry, widened to `u64`
    /// * `is_64bit` - `true` for PE32+ images
    #[must_use]
    pub fn decode(raw: u64, is_64bit: bool) -> Self {
        let flag = if is_64bit {
            ORDINAL_FLAG64
        } else {
            ORDINAL_FLAG32
        };

        if raw & flag != 0 {
            Thunk::Ordinal((raw & 0xFFFF) as u16)
        } else {
            Thunk::NameRva(raw & (flag - 1))
        }
    }
}

/// Unpacks a base relocation entry into its type (top 4 bits) and page offset (low 12 bits).
#[must_use]
pub fn decode_reloc_entry(raw: u16) -> (RelocationType, u16) {
    (RelocationType::from((raw >> 12) as u8), raw & 0x0FFF)
}

/// The unpacked attribute byte of an FPO record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FpoAttributes {
    /// Number of registers saved by the prolog, bits 0-2
    pub saved_registers: u8,
    /// The function uses structured exception handling, bit 3
    pub has_seh: bool,
    /// EBP has been allocated, bit 4
    pub uses_bp: bool,
    /// Reserved, bit 5
    pub reserved: u8,
    /// Frame type, bits 6-7
    pub frame: FrameType,
}

impl From<u8> for FpoAttributes {
    fn from(value: u8) -> Self {
        FpoAttributes {
            saved_registers: value & 0x07,
            has_seh: value & 0x08 != 0,
            uses_bp: value & 0x10 != 0,
            reserved: (value & 0x20) >> 5,
            frame: FrameType::from((value & 0xC0) >> 6),
        }
    }
}
