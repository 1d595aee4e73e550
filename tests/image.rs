//! Integration tests for the public entry points.
//!
//! The sample is a hand-assembled PE32+ image with an import, a base relocation block, an RSDS
//! debug record and two directories that are present but not decoded.

use std::{io::Cursor, path::PathBuf};

use pescope::{pe::RelocationType, prelude::*};

const GUID: [u8; 16] = [
    0x10, 0x32, 0x54, 0x76, 0x98, 0xBA, 0xDC, 0xFE, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF,
];
const PDB_PATH: &[u8] = b"C:\\build\\app.pdb\0";

fn put(data: &mut [u8], offset: usize, bytes: &[u8]) {
    data[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn put_u16(data: &mut [u8], offset: usize, value: u16) {
    put(data, offset, &value.to_le_bytes());
}

fn put_u32(data: &mut [u8], offset: usize, value: u32) {
    put(data, offset, &value.to_le_bytes());
}

fn put_u64(data: &mut [u8], offset: usize, value: u64) {
    put(data, offset, &value.to_le_bytes());
}

fn section(data: &mut [u8], offset: usize, name: &[u8], rva: u32, raw: u32, flags: u32) {
    put(data, offset, name);
    put_u32(data, offset + 8, 0x200);
    put_u32(data, offset + 12, rva);
    put_u32(data, offset + 16, 0x200);
    put_u32(data, offset + 20, raw);
    put_u32(data, offset + 36, flags);
}

/// Three sections: .text at 0x1000, .rdata at 0x2000, .reloc at 0x3000, 0x200 bytes each.
fn sample_image() -> Vec<u8> {
    let mut image = vec![0_u8; 0x800];

    put(&mut image, 0, b"MZ");
    put_u32(&mut image, 0x3C, 0x80);
    put(&mut image, 0x80, b"PE\0\0");

    // COFF file header
    put_u16(&mut image, 0x84, 0x8664);
    put_u16(&mut image, 0x86, 3);
    put_u32(&mut image, 0x88, 0x6500_0000);
    put_u16(&mut image, 0x94, 0xF0);
    put_u16(&mut image, 0x96, 0x0022);

    // Optional header, PE32+
    put_u16(&mut image, 0x98, 0x20B);
    put_u32(&mut image, 0xA8, 0x1000);
    put_u32(&mut image, 0xAC, 0x1000);
    put_u64(&mut image, 0xB0, 0x0001_4000_0000);
    put_u32(&mut image, 0xB8, 0x1000);
    put_u32(&mut image, 0xBC, 0x200);
    put_u32(&mut image, 0xD0, 0x4000);
    put_u32(&mut image, 0xD4, 0x200);
    put_u16(&mut image, 0xDC, 3);
    put_u16(&mut image, 0xDE, 0x8160);
    put_u64(&mut image, 0xE0, 0x10_0000);
    put_u64(&mut image, 0xE8, 0x1000);
    put_u64(&mut image, 0xF0, 0x10_0000);
    put_u64(&mut image, 0xF8, 0x1000);
    put_u32(&mut image, 0x104, 16);

    // Data directories: import, exception, base relocation, debug, IAT
    for (index, rva, size) in [
        (1, 0x2000, 0x28),
        (3, 0x1000, 0x0C),
        (5, 0x3000, 0x0C),
        (6, 0x2100, 0x1C),
        (12, 0x2060, 0x18),
    ] {
        put_u32(&mut image, 0x108 + index * 8, rva);
        put_u32(&mut image, 0x10C + index * 8, size);
    }

    section(&mut image, 0x188, b".text", 0x1000, 0x200, 0x6000_0020);
    section(&mut image, 0x1B0, b".rdata", 0x2000, 0x400, 0x4000_0040);
    section(&mut image, 0x1D8, b".reloc", 0x3000, 0x600, 0x4200_0040);

    // .text
    put(&mut image, 0x200, &[0x48, 0x83, 0xEC, 0x28, 0xC3]);

    // .rdata: one import descriptor followed by the sentinel
    put_u32(&mut image, 0x400, 0x2040);
    put_u32(&mut image, 0x40C, 0x2080);
    put_u32(&mut image, 0x410, 0x2060);
    for table in [0x440, 0x460] {
        put_u64(&mut image, table, 0x20A0);
        put_u64(&mut image, table + 8, 0x8000_0000_0000_0010);
    }
    put(&mut image, 0x480, b"USER32.dll\0");
    put_u16(&mut image, 0x4A0, 0x0215);
    put(&mut image, 0x4A2, b"MessageBoxW\0");

    // .rdata: debug directory with one CodeView entry
    put_u32(&mut image, 0x504, 0x6500_0000);
    put_u32(&mut image, 0x50C, 2);
    put_u32(&mut image, 0x510, (24 + PDB_PATH.len()) as u32);
    put_u32(&mut image, 0x514, 0x2120);
    put_u32(&mut image, 0x518, 0x520);
    put(&mut image, 0x520, b"RSDS");
    put(&mut image, 0x524, &GUID);
    put_u32(&mut image, 0x534, 3);
    put(&mut image, 0x538, PDB_PATH);

    // .reloc
    put_u32(&mut image, 0x600, 0x1000);
    put_u32(&mut image, 0x604, 0x0C);
    put_u16(&mut image, 0x608, 0xA010);

    image
}

fn verify_file(file: &File) {
    assert_eq!(file.len(), 0x800);
    assert!(file.is_64bit());
    assert_eq!(file.imagebase(), 0x0001_4000_0000);

    let header = file.header();
    assert_eq!(header.machine, MachineType::Amd64);
    assert_eq!(header.number_of_sections, 3);
    assert_eq!(header.time_date_stamp.timestamp(), 0x6500_0000);
    assert!(header
        .characteristics
        .contains(Characteristics::LARGE_ADDRESS_AWARE));

    let optional = file.optional_header();
    assert_eq!(optional.magic, 0x20B);
    assert_eq!(optional.base_of_data, None);
    assert_eq!(optional.subsystem, Subsystem::WindowsCui);
    assert!(optional
        .dll_characteristics
        .contains(DllCharacteristics::NX_COMPAT));
    assert_eq!(optional.number_of_rva_and_sizes, 16);

    let names: Vec<&str> = file.sections().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, [".text", ".rdata", ".reloc"]);
    assert!(file.sections()[0]
        .characteristics
        .contains(SectionFlags::MEM_EXECUTE));
    assert_eq!(
        file.read_data(0x1000, 5).unwrap(),
        &[0x48, 0x83, 0xEC, 0x28, 0xC3]
    );

    assert_eq!(file.imports().len(), 1);
    let import = &file.imports()[0];
    assert_eq!(import.directory.name, "USER32.dll");
    assert_eq!(import.directory.import_address_table_rva, 0x2060);
    assert_eq!(
        import.lookup_entries,
        [
            IntEntry::Name(NameEntry {
                hint: 0x0215,
                name: "MessageBoxW".to_string(),
            }),
            IntEntry::Ordinal(0x10),
        ]
    );
    assert_eq!(import.lookup_entries, import.address_entries);

    assert_eq!(file.relocations().len(), 1);
    let block = &file.relocations()[0];
    assert_eq!(block.page_rva, 0x1000);
    assert_eq!(block.entries.len(), 2);
    assert_eq!(block.entries[0].kind, RelocationType::Dir64);
    assert_eq!(block.entries[0].rva(block.page_rva), 0x1010);

    assert_eq!(file.debug_entries().len(), 1);
    let debug = &file.debug_entries()[0];
    assert_eq!(debug.directory.debug_type, DebugType::CodeView);
    match &debug.data {
        DebugData::Rsds(info) => {
            assert_eq!(info.guid.to_bytes(), GUID);
            assert_eq!(info.age, 3);
            assert_eq!(info.pdb_path, "C:\\build\\app.pdb");
        }
        other => panic!("unexpected debug payload: {other:?}"),
    }

    let skipped: Vec<DataDirectoryType> = file
        .unsupported()
        .iter()
        .filter_map(|marker| match marker {
            Unsupported::Directory { kind, .. } => Some(*kind),
            Unsupported::DebugType { .. } => None,
        })
        .collect();
    assert_eq!(
        skipped,
        [
            DataDirectoryType::ExceptionTable,
            DataDirectoryType::ImportAddressTable
        ]
    );
}

#[test]
fn load_buffer() {
    let file = File::from_mem(sample_image()).unwrap();

    verify_file(&file);
}

#[test]
fn load_reader() {
    let file = File::from_reader(Cursor::new(sample_image())).unwrap();

    verify_file(&file);
}

#[test]
fn load_file() {
    let path = std::env::temp_dir().join(format!("pescope_{}_sample.exe", std::process::id()));
    std::fs::write(&path, sample_image()).unwrap();

    let result = File::from_file(&path);
    std::fs::remove_file(&path).unwrap();

    verify_file(&result.unwrap());
}

#[test]
fn load_missing_file() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/does_not_exist.exe");

    assert!(matches!(File::from_file(&path), Err(Error::FileError(_))));
}

#[test]
fn load_empty() {
    assert!(matches!(File::from_mem(Vec::new()), Err(Error::Empty)));
    assert!(matches!(
        File::from_reader(Cursor::new(Vec::new())),
        Err(Error::Empty)
    ));
}

#[test]
fn load_not_pe() {
    let mut image = sample_image();
    put(&mut image, 0x80, b"PX\0\0");

    match File::from_mem(image) {
        Err(Error::InvalidSignature { found }) => assert_eq!(&found, b"PX\0\0"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn load_pointer_past_end() {
    let mut image = sample_image();
    put_u32(&mut image, 0x3C, 0x10_0000);

    assert!(matches!(
        File::from_mem(image),
        Err(Error::Truncated { .. })
    ));
}

#[test]
fn load_unknown_magic() {
    let mut image = sample_image();
    put_u16(&mut image, 0x98, 0x107);

    assert!(matches!(
        File::from_mem(image),
        Err(Error::InvalidMagic(0x107))
    ));
}

#[test]
fn load_truncated_image() {
    let mut image = sample_image();
    image.truncate(0x600);

    // The relocation section now lies past the end of the file
    assert!(matches!(
        File::from_mem(image),
        Err(Error::Truncated { .. })
    ));
}

#[test]
fn load_unterminated_imports() {
    let mut image = sample_image();
    // Move the descriptor list to the last 16 bytes of .rdata
    put_u32(&mut image, 0x110, 0x21F0);

    assert!(matches!(
        File::from_mem(image),
        Err(Error::MalformedSentinel { rva: 0x21F0 })
    ));
}
