//! Benchmarks for whole-image decoding.
//!
//! The image is a synthetic PE32 with one `.reloc` section holding 64 blocks of 255 entries
//! each, so the relocation decoder dominates.

extern crate pescope;

use criterion::{criterion_group, criterion_main, Criterion};
use pescope::{pe::BaseRelocBlock, File};
use std::hint::black_box;

const BLOCKS: u32 = 64;
const ENTRIES: u32 = 255;

fn put(data: &mut [u8], offset: usize, bytes: &[u8]) {
    data[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn reloc_blocks() -> Vec<u8> {
    let mut data = Vec::new();
    for block in 0..BLOCKS {
        let size = 8 + ENTRIES * 2 + 2;
        data.extend_from_slice(&(0x1000 * (block + 1)).to_le_bytes());
        data.extend_from_slice(&size.to_le_bytes());
        for entry in 0..ENTRIES {
            let raw = 0x3000 | ((entry * 16) as u16 & 0x0FFF);
            data.extend_from_slice(&raw.to_le_bytes());
        }
        data.extend_from_slice(&0_u16.to_le_bytes());
    }
    data
}

fn reloc_image() -> Vec<u8> {
    let relocs = reloc_blocks();
    let raw_size = relocs.len().next_multiple_of(0x200);
    let mut image = vec![0_u8; 0x200 + raw_size];

    put(&mut image, 0, b"MZ");
    put(&mut image, 0x3C, &0x40_u32.to_le_bytes());
    put(&mut image, 0x40, b"PE\0\0");
    put(&mut image, 0x44, &0x014C_u16.to_le_bytes());
    put(&mut image, 0x46, &1_u16.to_le_bytes());
    put(&mut image, 0x54, &0xE0_u16.to_le_bytes());
    put(&mut image, 0x58, &0x010B_u16.to_le_bytes());
    put(&mut image, 0x74, &0x0040_0000_u32.to_le_bytes());
    put(&mut image, 0xB4, &16_u32.to_le_bytes());

    // Base relocation directory
    put(&mut image, 0xB8 + 5 * 8, &0x1000_u32.to_le_bytes());
    put(&mut image, 0xBC + 5 * 8, &(relocs.len() as u32).to_le_bytes());

    // Section table at 0x138
    put(&mut image, 0x138, b".reloc");
    put(&mut image, 0x140, &(raw_size as u32).to_le_bytes());
    put(&mut image, 0x144, &0x1000_u32.to_le_bytes());
    put(&mut image, 0x148, &(raw_size as u32).to_le_bytes());
    put(&mut image, 0x14C, &0x200_u32.to_le_bytes());

    put(&mut image, 0x200, &relocs);
    image
}

fn bench_reloc_blocks(c: &mut Criterion) {
    let data = reloc_blocks();

    c.bench_function("reloc_read_all", |b| {
        b.iter(|| {
            let blocks = BaseRelocBlock::read_all(black_box(&data)).unwrap();
            black_box(blocks)
        });
    });
}

fn bench_file_from_mem(c: &mut Criterion) {
    let image = reloc_image();

    c.bench_function("file_from_mem", |b| {
        b.iter(|| {
            let file = File::from_mem(black_box(image.clone())).unwrap();
            black_box(file.relocations().len())
        });
    });
}

criterion_group!(benches, bench_reloc_blocks, bench_file_from_mem);
criterion_main!(benches);
