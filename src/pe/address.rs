//! Resolution of relative virtual addresses to file bytes.
//!
//! Once the section table is decoded, every RVA an image refers to can be mapped back to the
//! bytes on disk. A section maps the RVA range `[virtual_address, virtual_address +
//! size_of_raw_data)` onto the file range starting at `pointer_to_raw_data`. A request is
//! served by the first section, in table order, that fully contains it; a request ending
//! exactly on a section's last byte is contained. Requests that straddle two sections, fall
//! into the zero-filled tail beyond `size_of_raw_data`, or hit no section at all fail with
//! [`crate::Error::AddressOutOfRange`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use pescope::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("kernel32.dll"))?;
//!
//! let entry_point = u64::from(file.optional_header().address_of_entry_point);
//! let code = file.read_data(entry_point, 16)?;
//! println!("Entry point bytes: {:02x?}", code);
//! # Ok::<(), pescope::Error>(())
//! ```

use crate::{pe::section::SectionHeader, Error, Result};

/// A read-only view of an image's address space, backed by the raw file buffer and the
/// section table.
#[derive(Debug, Clone, Copy)]
pub struct AddressSpace<'a> {
    data: &'a [u8],
    sections: &'a [SectionHeader],
    image_base: u64,
}

impl<'a> AddressSpace<'a> {
    /// Create a new address space
    ///
    /// # Arguments
    /// * 'data'       - The complete file buffer
    /// * 'sections'   - The decoded section table
    /// * 'image_base' - The preferred load address, used by [`AddressSpace::read_data_va`]
    #[must_use]
    pub fn new(data: &'a [u8], sections: &'a [SectionHeader], image_base: u64) -> Self {
        AddressSpace {
            data,
            sections,
            image_base,
        }
    }

    /// Returns the first section that fully contains `[rva, rva + len)`.
    #[must_use]
    pub fn section_for(&self, rva: u64, len: usize) -> Option<&'a SectionHeader> {
        self.sections
            .iter()
            .find(|section| section.contains(rva, len as u64))
    }

    /// Converts an RVA to a file offset.
    ///
    /// # Errors
    /// Returns [`crate::Error::AddressOutOfRange`] if no section maps the RVA.
    pub fn rva_to_offset(&self, rva: u64) -> Result<usize> {
        let section = self
            .section_for(rva, 1)
            .ok_or(Error::AddressOutOfRange { rva, len: 1 })?;

        Ok(section.pointer_to_raw_data as usize
            + (rva - u64::from(section.virtual_address)) as usize)
    }

    /// Returns the `len` bytes starting at `rva`.
    ///
    /// # Errors
    /// Returns [`crate::Error::AddressOutOfRange`] if no single section contains the range, or
    /// [`crate::Error::Truncated`] if the containing section's data lies past the end of the
    /// file.
    pub fn read_data(&self, rva: u64, len: usize) -> Result<&'a [u8]> {
        let section = self.section_for(rva, len).ok_or(Error::AddressOutOfRange {
            rva,
            len: len as u64,
        })?;

        let offset = section.pointer_to_raw_data as usize
            + (rva - u64::from(section.virtual_address)) as usize;

        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(Error::Truncated {
                offset,
                needed: len,
                available: self.data.len(),
            })
    }

    /// Returns the `len` bytes starting at the absolute virtual address `va`.
    ///
    /// # Errors
    /// Returns [`crate::Error::AddressOutOfRange`] if `va` lies below the image base, plus the
    /// errors of [`AddressSpace::read_data`].
    pub fn read_data_va(&self, va: u64, len: usize) -> Result<&'a [u8]> {
        let rva = va.checked_sub(self.image_base).ok_or(Error::AddressOutOfRange {
            rva: va,
            len: len as u64,
        })?;

        self.read_data(rva, len)
    }

    /// Returns the bytes from `rva` up to the end of the section containing it.
    ///
    /// Sentinel-terminated sequences are walked over this slice; running off its end means the
    /// terminator is missing.
    ///
    /// # Errors
    /// Returns [`crate::Error::AddressOutOfRange`] if no section maps the RVA, or
    /// [`crate::Error::Truncated`] if the section's data lies past the end of the file.
    pub fn read_tail(&self, rva: u64) -> Result<&'a [u8]> {
        // A section that maps the first byte wins over one that merely ends at `rva`
        let section = self
            .section_for(rva, 1)
            .or_else(|| self.section_for(rva, 0))
            .ok_or(Error::AddressOutOfRange { rva, len: 0 })?;

        let end = u64::from(section.virtual_address) + u64::from(section.size_of_raw_data);
        self.read_data(rva, (end - rva) as usize)
    }

    /// Reads the NUL-terminated string at `rva`.
    ///
    /// Bytes that are not valid UTF-8 are replaced with `U+FFFD`.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedSentinel`] if no NUL occurs before the end of the
    /// containing section, plus the errors of [`AddressSpace::read_tail`].
    pub fn read_cstring(&self, rva: u64) -> Result<String> {
        let tail = self.read_tail(rva)?;

        match tail.iter().position(|&b| b == 0) {
            Some(nul) => Ok(String::from_utf8_lossy(&tail[..nul]).into_owned()),
            None => Err(Error::MalformedSentinel { rva }),
        }
    }
}
