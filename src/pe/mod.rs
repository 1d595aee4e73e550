//! PE/COFF structure decoding.
//!
//! This module holds the decoders for every structure [`crate::File`] extracts from an image,
//! leaf-first:
//!
//! - [`crate::pe::bitfield`] - Unpacking of packed integer fields (import thunks, relocation
//!   entries, FPO attributes)
//! - [`crate::pe::constants`] - Enumerated constants and fixed record sizes
//! - [`crate::pe::flags`] - Characteristics, DLL characteristics and section flag groups
//! - [`crate::pe::header`] - PE signature and COFF file header
//! - [`crate::pe::optional`] - PE32 / PE32+ optional header
//! - [`crate::pe::section`] - Section table
//! - [`crate::pe::address`] - RVA resolution over the section table
//! - [`crate::pe::directory`] - Data directory table and content dispatch
//! - [`crate::pe::import`], [`crate::pe::reloc`], [`crate::pe::debug`] - Directory contents
//!
//! All decoders read from borrowed byte slices and return owned values; nothing decoded keeps
//! a reference into the input.

pub mod address;
pub mod bitfield;
pub mod constants;
pub mod debug;
pub mod directory;
pub mod flags;
pub mod header;
pub mod import;
pub mod optional;
pub mod reloc;
pub mod section;

pub use address::AddressSpace;
pub use constants::{DebugType, FrameType, MachineType, RelocationType, Subsystem};
pub use debug::{CodeViewInfo, DebugData, DebugDirectory, DebugEntry, FpoData, RsdsInfo};
pub use directory::{DataDirectories, DataDirectory, DataDirectoryType, Unsupported};
pub use flags::{flag_names, Characteristics, DllCharacteristics, SectionFlags};
pub use header::FileHeader;
pub use import::{ImportDirectory, ImportEntry, IntEntry, NameEntry};
pub use optional::OptionalHeader;
pub use reloc::{BaseRelocBlock, BaseRelocEntry};
pub use section::SectionHeader;
