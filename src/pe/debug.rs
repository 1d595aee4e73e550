//! Debug directory decoding.
//!
//! The debug directory is a packed array of 28-byte descriptors; its length is the directory
//! size divided by 28, with no terminator. Each descriptor locates a payload, either by RVA or,
//! when the RVA is zero, by raw file offset, and tags it with a [`DebugType`]. Three payload
//! formats are decoded:
//!
//! - **CodeView**: a 16-byte header followed by the path of the external symbol file. PDB 7.0
//!   records, recognised by their `RSDS` signature, carry a GUID instead and decode to
//!   [`DebugData::Rsds`].
//! - **FPO**: an array of 16-byte frame pointer omission records.
//! - **Misc**: kept verbatim.
//!
//! Every other type is retained as [`DebugData::Unsupported`] with its descriptor intact.

use chrono::{DateTime, Utc};

use crate::{
    file::parser::Parser,
    pe::{
        address::AddressSpace,
        bitfield::FpoAttributes,
        constants::{DebugType, FrameType, DEBUG_DIRECTORY_SIZE, FPO_DATA_SIZE},
        header::timestamp,
    },
    Error, Result,
};

/// Signature of a PDB 7.0 CodeView record, `RSDS` read as a little-endian `u32`
pub const CODEVIEW_RSDS_SIGNATURE: u32 = 0x5344_5352;

/// One 28-byte debug directory descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugDirectory {
    /// Reserved, must be zero
    pub characteristics: u32,
    /// Time the debug data was created
    pub time_date_stamp: DateTime<Utc>,
    /// Major version of the debug data format
    pub major_version: u16,
    /// Minor version of the debug data format
    pub minor_version: u16,
    /// Format of the payload
    pub debug_type: DebugType,
    /// Size of the payload
    pub size_of_data: u32,
    /// RVA of the payload, zero if it is not mapped
    pub address_of_raw_data: u32,
    /// File offset of the payload
    pub pointer_to_raw_data: u32,
}

impl DebugDirectory {
    /// Create a `DebugDirectory` from a sequence of bytes
    ///
    /// # Arguments
    /// * 'data' - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if fewer than 28 bytes are available.
    pub fn read(data: &[u8]) -> Result<DebugDirectory> {
        let mut parser = Parser::new(data);

        Ok(DebugDirectory {
            characteristics: parser.read_le::<u32>()?,
            time_date_stamp: timestamp(parser.read_le::<u32>()?),
            major_version: parser.read_le::<u16>()?,
            minor_version: parser.read_le::<u16>()?,
            debug_type: DebugType::from(parser.read_le::<u32>()?),
            size_of_data: parser.read_le::<u32>()?,
            address_of_raw_data: parser.read_le::<u32>()?,
            pointer_to_raw_data: parser.read_le::<u32>()?,
        })
    }
}

/// A CodeView record with a 16-byte header and a symbol file path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeViewInfo {
    /// Format signature, e.g. `NB10`
    pub signature: u32,
    /// Offset of the debug information inside the symbol file
    pub offset: u32,
    /// Time the symbol file was created
    pub time_date_stamp: DateTime<Utc>,
    /// Incremented on every rebuild of the symbol file
    pub age: u32,
    /// Path of the external symbol file
    pub pdb_path: String,
}

/// A PDB 7.0 (`RSDS`) CodeView record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsdsInfo {
    /// Identifier matching the image to its symbol file
    pub guid: uguid::Guid,
    /// Incremented on every rebuild of the symbol file
    pub age: u32,
    /// Path of the external symbol file
    pub pdb_path: String,
}

/// One FPO record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FpoData {
    /// Offset of the first byte of the function code
    pub start_offset: u32,
    /// Number of bytes in the function
    pub function_size: u32,
    /// Size of the local variables in bytes
    pub locals_size: u64,
    /// Size of the parameters in bytes
    pub params_size: u32,
    /// Number of bytes in the function prolog
    pub prolog_size: u8,
    /// Number of registers saved
    pub saved_registers: u8,
    /// The function uses structured exception handling
    pub has_seh: bool,
    /// EBP has been allocated
    pub uses_bp: bool,
    /// Reserved
    pub reserved: u8,
    /// Frame type
    pub frame: FrameType,
}

impl FpoData {
    /// Create a `FpoData` from a sequence of bytes
    ///
    /// Local and parameter sizes are stored on disk in 4-byte units and returned in bytes.
    ///
    /// # Arguments
    /// * 'data' - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if fewer than 16 bytes are available.
    pub fn read(data: &[u8]) -> Result<FpoData> {
        let mut parser = Parser::new(data);

        let start_offset = parser.read_le::<u32>()?;
        let function_size = parser.read_le::<u32>()?;
        let locals = parser.read_le::<u32>()?;
        let params = parser.read_le::<u16>()?;
        let prolog_size = parser.read_le::<u8>()?;
        let attributes = FpoAttributes::from(parser.read_le::<u8>()?);

        Ok(FpoData {
            start_offset,
            function_size,
            locals_size: u64::from(locals) * 4,
            params_size: u32::from(params) * 4,
            prolog_size,
            saved_registers: attributes.saved_registers,
            has_seh: attributes.has_seh,
            uses_bp: attributes.uses_bp,
            reserved: attributes.reserved,
            frame: attributes.frame,
        })
    }
}

/// The decoded payload of a debug directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugData {
    /// CodeView record with an explicit header
    CodeView(CodeViewInfo),
    /// PDB 7.0 CodeView record
    Rsds(RsdsInfo),
    /// Frame pointer omission records
    Fpo(Vec<FpoData>),
    /// Miscellaneous data, kept verbatim
    Misc(Vec<u8>),
    /// A payload type that is not decoded
    Unsupported,
}

/// A debug directory descriptor together with its decoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugEntry {
    /// The descriptor
    pub directory: DebugDirectory,
    /// The payload
    pub data: DebugData,
}

/// Decodes the debug directory at `rva` spanning `size` bytes.
///
/// # Arguments
/// * `space` - The image's address space
/// * `file`  - The complete file buffer, for payloads located by file offset
/// * `rva`   - RVA of the first descriptor
/// * `size`  - Directory size in bytes
///
/// # Errors
/// Returns [`crate::Error::Truncated`] if `size` is not a multiple of 28 or a payload or
/// record is cut short, and the errors of [`AddressSpace::read_data`] for unmapped ranges.
pub fn read_debug_entries<'a>(
    space: &AddressSpace<'a>,
    file: &'a [u8],
    rva: u32,
    size: u32,
) -> Result<Vec<DebugEntry>> {
    let data = space.read_data(u64::from(rva), size as usize)?;

    let count = data.len() / DEBUG_DIRECTORY_SIZE;
    if data.len() % DEBUG_DIRECTORY_SIZE != 0 {
        return Err(Error::Truncated {
            offset: count * DEBUG_DIRECTORY_SIZE,
            needed: DEBUG_DIRECTORY_SIZE,
            available: data.len(),
        });
    }

    let mut entries = Vec::with_capacity(count);
    for record in data.chunks_exact(DEBUG_DIRECTORY_SIZE) {
        let directory = DebugDirectory::read(record)?;

        let decoded = match directory.debug_type {
            DebugType::CodeView => read_codeview(read_payload(space, file, &directory)?)?,
            DebugType::Fpo => DebugData::Fpo(read_fpo(read_payload(space, file, &directory)?)?),
            DebugType::Misc => DebugData::Misc(read_payload(space, file, &directory)?.to_vec()),
            _ => DebugData::Unsupported,
        };

        entries.push(DebugEntry {
            directory,
            data: decoded,
        });
    }

    log::debug!("Decoded {} debug directory entries", entries.len());
    Ok(entries)
}

/// Locates a payload by RVA, or by file offset when the RVA is zero.
fn read_payload<'a>(
    space: &AddressSpace<'a>,
    file: &'a [u8],
    directory: &DebugDirectory,
) -> Result<&'a [u8]> {
    let len = directory.size_of_data as usize;

    if directory.address_of_raw_data != 0 {
        return space.read_data(u64::from(directory.address_of_raw_data), len);
    }

    let offset = directory.pointer_to_raw_data as usize;
    offset
        .checked_add(len)
        .and_then(|end| file.get(offset..end))
        .ok_or(Error::Truncated {
            offset,
            needed: len,
            available: file.len(),
        })
}

fn read_codeview(payload: &[u8]) -> Result<DebugData> {
    let mut parser = Parser::new(payload);
    let signature = parser.read_le::<u32>()?;

    if signature == CODEVIEW_RSDS_SIGNATURE {
        let mut guid = [0_u8; 16];
        guid.copy_from_slice(parser.read_bytes(16)?);

        return Ok(DebugData::Rsds(RsdsInfo {
            guid: uguid::Guid::from_bytes(guid),
            age: parser.read_le::<u32>()?,
            pdb_path: parser.read_cstring(),
        }));
    }

    Ok(DebugData::CodeView(CodeViewInfo {
        signature,
        offset: parser.read_le::<u32>()?,
        time_date_stamp: timestamp(parser.read_le::<u32>()?),
        age: parser.read_le::<u32>()?,
        pdb_path: parser.read_cstring(),
    }))
}

fn read_fpo(payload: &[u8]) -> Result<Vec<FpoData>> {
    if payload.len() % FPO_DATA_SIZE != 0 {
        return Err(Error::Truncated {
            offset: payload.len() - payload.len() % FPO_DATA_SIZE,
            needed: FPO_DATA_SIZE,
            available: payload.len(),
        });
    }

    payload
        .chunks_exact(FPO_DATA_SIZE)
        .map(FpoData::read)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pe::{flags::SectionFlags, section::SectionHeader};

    fn rdata(virtual_address: u32, size: u32, raw_offset: u32) -> SectionHeader {
        SectionHeader {
            name: ".rdata".to_string(),
            virtual_size: size,
            virtual_address,
            size_of_raw_data: size,
            pointer_to_raw_data: raw_offset,
            pointer_to_relocations: 0,
            pointer_to_linenumbers: 0,
            number_of_relocations: 0,
            number_of_linenumbers: 0,
            characteristics: SectionFlags::MEM_READ,
        }
    }

    fn descriptor(debug_type: u32, size: u32, rva: u32, offset: u32) -> Vec<u8> {
        let mut record = Vec::with_capacity(DEBUG_DIRECTORY_SIZE);
        record.extend_from_slice(&0_u32.to_le_bytes());
        record.extend_from_slice(&0x5F00_0000_u32.to_le_bytes());
        record.extend_from_slice(&0_u16.to_le_bytes());
        record.extend_from_slice(&0_u16.to_le_bytes());
        record.extend_from_slice(&debug_type.to_le_bytes());
        record.extend_from_slice(&size.to_le_bytes());
        record.extend_from_slice(&rva.to_le_bytes());
        record.extend_from_slice(&offset.to_le_bytes());
        record
    }

    #[test]
    fn directory() {
        #[rustfmt::skip]
        let directory_bytes = [
            0x00, 0x00, 0x00, 0x00, // characteristics
            0x00, 0x00, 0x00, 0x5F, // time_date_stamp
            0x00, 0x00,             // major_version
            0x00, 0x00,             // minor_version
            0x02, 0x00, 0x00, 0x00, // debug_type
            0x30, 0x00, 0x00, 0x00, // size_of_data
            0x00, 0x21, 0x00, 0x00, // address_of_raw_data
            0x00, 0x05, 0x00, 0x00, // pointer_to_raw_data
        ];

        let directory = DebugDirectory::read(&directory_bytes).unwrap();

        assert_eq!(directory.time_date_stamp.timestamp(), 0x5F00_0000);
        assert_eq!(directory.debug_type, DebugType::CodeView);
        assert_eq!(directory.size_of_data, 0x30);
        assert_eq!(directory.address_of_raw_data, 0x2100);
        assert_eq!(directory.pointer_to_raw_data, 0x500);
    }

    #[test]
    fn codeview_nb10() {
        #[rustfmt::skip]
        let payload = [
            0x4E, 0x42, 0x31, 0x30, // signature
            0x00, 0x00, 0x00, 0x00, // offset
            0x00, 0x00, 0x00, 0x5F, // time_date_stamp
            0x03, 0x00, 0x00, 0x00, // age
            b'a', b'.', b'p', b'd', b'b', 0x00, 0xCC, 0xCC,
        ];

        let DebugData::CodeView(info) = read_codeview(&payload).unwrap() else {
            panic!("Expected CodeView");
        };

        assert_eq!(info.signature, 0x3031_424E);
        assert_eq!(info.offset, 0);
        assert_eq!(info.time_date_stamp.timestamp(), 0x5F00_0000);
        assert_eq!(info.age, 3);
        // Bytes after the terminator are ignored
        assert_eq!(info.pdb_path, "a.pdb");
    }

    #[test]
    fn codeview_without_terminator() {
        let mut payload = vec![0_u8; 16];
        payload.extend_from_slice(b"x.pdb");

        let DebugData::CodeView(info) = read_codeview(&payload).unwrap() else {
            panic!("Expected CodeView");
        };
        assert_eq!(info.pdb_path, "x.pdb");
    }

    #[test]
    fn codeview_rsds() {
        #[rustfmt::skip]
        let payload = [
            0x52, 0x53, 0x44, 0x53, // signature
            0x8e, 0x90, 0x37, 0xd4, 0xe6, 0x65, 0x7c, 0x48, // guid
            0x97, 0x35, 0x7b, 0xdf, 0xf6, 0x99, 0xbe, 0xa5,
            0x01, 0x00, 0x00, 0x00, // age
            b'C', b':', b'\\', b'k', b'.', b'p', b'd', b'b', 0x00,
        ];

        let DebugData::Rsds(info) = read_codeview(&payload).unwrap() else {
            panic!("Expected RSDS");
        };

        assert_eq!(info.guid, uguid::guid!("d437908e-65e6-487c-9735-7bdff699bea5"));
        assert_eq!(info.age, 1);
        assert_eq!(info.pdb_path, "C:\\k.pdb");
    }

    #[test]
    fn codeview_truncated() {
        assert!(matches!(
            read_codeview(&[0x4E, 0x42, 0x31, 0x30, 0x00]),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn fpo() {
        #[rustfmt::skip]
        let payload = [
            0x00, 0x10, 0x00, 0x00, // start_offset
            0x40, 0x00, 0x00, 0x00, // function_size
            0x05, 0x00, 0x00, 0x00, // locals
            0x03, 0x00,             // params
            0x06,                   // prolog_size
            0b0101_1010,            // attributes
        ];

        let records = read_fpo(&payload).unwrap();
        assert_eq!(records.len(), 1);

        let record = records[0];
        assert_eq!(record.start_offset, 0x1000);
        assert_eq!(record.function_size, 0x40);
        assert_eq!(record.locals_size, 20);
        assert_eq!(record.params_size, 12);
        assert_eq!(record.prolog_size, 6);
        assert_eq!(record.saved_registers, 2);
        assert!(record.has_seh);
        assert!(record.uses_bp);
        assert_eq!(record.reserved, 0);
        assert_eq!(record.frame, FrameType::Trap);
    }

    #[test]
    fn fpo_partial_record() {
        assert!(read_fpo(&[]).unwrap().is_empty());
        assert!(matches!(
            read_fpo(&[0_u8; 20]),
            Err(Error::Truncated { offset: 16, .. })
        ));
    }

    #[test]
    fn entries() {
        let mut data = vec![0_u8; 0x200];

        // Debug directory at RVA 0x1000 (file offset 0x00)
        let mut directory = descriptor(4, 4, 0x1100, 0);
        directory.extend(descriptor(3, 16, 0, 0x180));
        directory.extend(descriptor(16, 0, 0, 0));
        data[..directory.len()].copy_from_slice(&directory);

        // Misc payload, mapped
        data[0x100..0x104].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        // FPO payload, located by file offset only
        data[0x180..0x184].copy_from_slice(&0x2000_u32.to_le_bytes());

        let sections = vec![rdata(0x1000, 0x180, 0)];
        let space = AddressSpace::new(&data, &sections, 0);

        let entries = read_debug_entries(&space, &data, 0x1000, 3 * 28).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].directory.debug_type, DebugType::Misc);
        assert_eq!(entries[0].data, DebugData::Misc(vec![0xDE, 0xAD, 0xBE, 0xEF]));
        let DebugData::Fpo(records) = &entries[1].data else {
            panic!("Expected FPO");
        };
        assert_eq!(records[0].start_offset, 0x2000);
        assert_eq!(entries[2].directory.debug_type, DebugType::Repro);
        assert_eq!(entries[2].data, DebugData::Unsupported);
    }

    #[test]
    fn entries_partial_descriptor() {
        let data = vec![0_u8; 0x100];
        let sections = vec![rdata(0x1000, 0x100, 0)];
        let space = AddressSpace::new(&data, &sections, 0);

        assert!(matches!(
            read_debug_entries(&space, &data, 0x1000, 30),
            Err(Error::Truncated { offset: 28, .. })
        ));
    }

    #[test]
    fn payload_past_end_of_file() {
        let mut data = vec![0_u8; 0x100];
        data[..28].copy_from_slice(&descriptor(4, 0x10, 0, 0xF8));
        let sections = vec![rdata(0x1000, 0x100, 0)];
        let space = AddressSpace::new(&data, &sections, 0);

        assert!(matches!(
            read_debug_entries(&space, &data, 0x1000, 28),
            Err(Error::Truncated { offset: 0xF8, .. })
        ));
    }
}
