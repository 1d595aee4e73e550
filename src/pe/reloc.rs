//! Base relocation table decoding.
//!
//! The table is a sequence of blocks, each covering one 4 KiB page: an 8-byte header holding
//! the page RVA and the block size (header included), followed by 2-byte entries. Every entry
//! packs a relocation type into its top four bits and an offset into the page into its low
//! twelve bits. The sequence is bounded only by the directory size.

use crate::{
    file::parser::Parser,
    pe::{
        address::AddressSpace,
        bitfield::decode_reloc_entry,
        constants::{RelocationType, RELOC_BLOCK_HEADER_SIZE},
    },
    Error, Result,
};

/// One entry of a base relocation block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseRelocEntry {
    /// Kind of fixup to apply
    pub kind: RelocationType,
    /// Offset into the block's page
    pub offset: u16,
}

impl BaseRelocEntry {
    /// RVA the fixup applies to, given the page RVA of the containing block
    #[must_use]
    pub fn rva(&self, page_rva: u32) -> u32 {
        page_rva.wrapping_add(u32::from(self.offset))
    }
}

/// One page's worth of base relocations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseRelocBlock {
    /// RVA of the page the entries apply to
    pub page_rva: u32,
    /// Size of the block in bytes, header included
    pub block_size: u32,
    /// The relocation entries, in table order
    pub entries: Vec<BaseRelocEntry>,
}

impl BaseRelocBlock {
    /// Decode all blocks in `data`, which must hold exactly the relocation directory
    ///
    /// # Arguments
    /// * 'data' - The bytes of the relocation directory
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if a block header or body does not fit in the
    /// remaining data or a body has an odd length, and [`crate::Error::Malformed`] if a block
    /// claims to be smaller than its own header.
    pub fn read_all(data: &[u8]) -> Result<Vec<BaseRelocBlock>> {
        let mut parser = Parser::new(data);
        let mut blocks = Vec::new();

        while parser.has_more_data() {
            let page_rva = parser.read_le::<u32>()?;
            let block_size = parser.read_le::<u32>()?;

            let Some(body_size) = (block_size as usize).checked_sub(RELOC_BLOCK_HEADER_SIZE) else {
                return Err(malformed_error!(
                    "Relocation block at offset {} has size {} - smaller than its header",
                    parser.pos() - RELOC_BLOCK_HEADER_SIZE,
                    block_size
                ));
            };

            if body_size % 2 != 0 {
                return Err(Error::Truncated {
                    offset: parser.pos() + body_size - 1,
                    needed: 2,
                    available: data.len(),
                });
            }

            let body = parser.read_bytes(body_size)?;
            let mut body_parser = Parser::new(body);
            let mut entries = Vec::with_capacity(body_size / 2);

            while body_parser.has_more_data() {
                let (kind, offset) = decode_reloc_entry(body_parser.read_le::<u16>()?);
                entries.push(BaseRelocEntry { kind, offset });
            }

            blocks.push(BaseRelocBlock {
                page_rva,
                block_size,
                entries,
            });
        }

        Ok(blocks)
    }
}

/// Decodes the base relocation directory at `rva` spanning `size` bytes.
///
/// # Errors
/// Returns the errors of [`AddressSpace::read_data`] for the directory range, plus those of
/// [`BaseRelocBlock::read_all`].
pub fn read_relocations(
    space: &AddressSpace<'_>,
    rva: u32,
    size: u32,
) -> Result<Vec<BaseRelocBlock>> {
    let data = space.read_data(u64::from(rva), size as usize)?;
    let blocks = BaseRelocBlock::read_all(data)?;

    log::debug!("Decoded {} base relocation blocks", blocks.len());
    Ok(blocks)
}
