use std::path::Path;

use pescope::{
    pe::{flag_names, DebugData, IntEntry, Unsupported},
    File,
};

use crate::output::{or_dash, Align, TabWriter};

/// Prints the compact overview selected by `--summary`.
pub fn print(path: &Path, file: &File) {
    let header = file.header();
    let optional = file.optional_header();

    println!("{}", path.display());
    println!(
        "  Format:          {}",
        if file.is_64bit() { "PE32+" } else { "PE32" }
    );
    println!("  Machine:         {}", header.machine);
    println!("  Timestamp:       {}", header.time_date_stamp);
    println!(
        "  Characteristics: {}",
        flag_names(&header.characteristics)
    );
    println!("  Subsystem:       {}", optional.subsystem);
    println!(
        "  DLL flags:       {}",
        flag_names(&optional.dll_characteristics)
    );
    println!("  Image base:      0x{:x}", file.imagebase());
    println!("  Entry point:     0x{:08x}", optional.address_of_entry_point);
    println!("  Size:            {} bytes", file.len());

    print_sections(file);
    print_imports(file);

    if !file.relocations().is_empty() {
        let entries: usize = file
            .relocations()
            .iter()
            .map(|block| block.entries.len())
            .sum();
        println!(
            "\nBase relocations: {} blocks, {} entries",
            file.relocations().len(),
            entries
        );
    }

    print_debug(file);
    print_unsupported(file);
    println!();
}

fn print_sections(file: &File) {
    if file.sections().is_empty() {
        println!("\nSections: none");
        return;
    }

    println!("\nSections:");
    let mut tw = TabWriter::new(vec![
        ("Name", Align::Left),
        ("RVA", Align::Right),
        ("VSize", Align::Right),
        ("RawPtr", Align::Right),
        ("RawSize", Align::Right),
        ("Flags", Align::Left),
    ])
    .indent("  ");
    for section in file.sections() {
        tw.row(vec![
            section.name.clone(),
            format!("0x{:08x}", section.virtual_address),
            format!("0x{:x}", section.virtual_size),
            format!("0x{:x}", section.pointer_to_raw_data),
            format!("0x{:x}", section.size_of_raw_data),
            flag_names(&section.characteristics),
        ]);
    }
    tw.print();
}

fn print_imports(file: &File) {
    if file.imports().is_empty() {
        return;
    }

    println!("\nImports:");
    for import in file.imports() {
        let functions: Vec<String> = import
            .lookup_entries
            .iter()
            .map(|entry| match entry {
                IntEntry::Ordinal(ordinal) => format!("#{ordinal}"),
                IntEntry::Name(name) => name.name.clone(),
            })
            .collect();
        println!("  {}: {}", import.directory.name, functions.join(", "));
    }
}

fn print_debug(file: &File) {
    if file.debug_entries().is_empty() {
        return;
    }

    println!("\nDebug:");
    let mut tw = TabWriter::new(vec![
        ("Type", Align::Left),
        ("Size", Align::Right),
        ("Details", Align::Left),
    ])
    .indent("  ");
    for entry in file.debug_entries() {
        let details = match &entry.data {
            DebugData::CodeView(info) => Some(format!("{} (age {})", info.pdb_path, info.age)),
            DebugData::Rsds(info) => Some(format!(
                "{} {{{}}} (age {})",
                info.pdb_path, info.guid, info.age
            )),
            DebugData::Fpo(records) => Some(format!("{} records", records.len())),
            DebugData::Misc(bytes) => Some(format!("{} bytes", bytes.len())),
            DebugData::Unsupported => None,
        };
        tw.row(vec![
            entry.directory.debug_type.to_string(),
            entry.directory.size_of_data.to_string(),
            or_dash(details),
        ]);
    }
    tw.print();
}

fn print_unsupported(file: &File) {
    if file.unsupported().is_empty() {
        return;
    }

    println!("\nNot decoded:");
    for marker in file.unsupported() {
        match marker {
            Unsupported::Directory { kind, directory } => println!(
                "  directory {kind} at 0x{:08x} ({} bytes)",
                directory.virtual_address, directory.size
            ),
            Unsupported::DebugType { index, debug_type } => {
                println!("  debug entry {index} of type {debug_type}")
            }
        }
    }
}
