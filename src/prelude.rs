//! # pescope Prelude
//!
//! The types most programs need to load a PE image and walk its decoded contents. Import it
//! with `use pescope::prelude::*;`.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all pescope operations
pub use crate::Error;

/// The result type used throughout pescope
pub use crate::Result;

/// Decoded PE image and the byte cursor
pub use crate::{File, Parser};

// ================================================================================================
// Headers and Sections
// ================================================================================================

pub use crate::pe::{FileHeader, OptionalHeader, SectionHeader};

pub use crate::pe::{flag_names, Characteristics, DllCharacteristics, SectionFlags};

pub use crate::pe::{MachineType, Subsystem};

// ================================================================================================
// Data Directories
// ================================================================================================

pub use crate::pe::{AddressSpace, DataDirectory, DataDirectoryType, Unsupported};

pub use crate::pe::{ImportEntry, IntEntry, NameEntry};

pub use crate::pe::{BaseRelocBlock, BaseRelocEntry, RelocationType};

pub use crate::pe::{DebugData, DebugEntry, DebugType, FpoData, RsdsInfo};
