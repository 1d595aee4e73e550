//! Bit-flag groups of the COFF file header, the optional header and section headers.
//!
//! All three groups keep unknown bits when decoded from raw values (`from_bits_retain`), so a
//! flag group always converts back to the exact value found in the image.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Image characteristics from the COFF file header
    pub struct Characteristics: u16 {
        /// Base relocations have been removed
        const RELOCS_STRIPPED = 0x0001;
        /// The image is valid and can be run
        const EXECUTABLE_IMAGE = 0x0002;
        /// COFF line numbers have been removed (deprecated)
        const LINE_NUMS_STRIPPED = 0x0004;
        /// COFF local symbols have been removed (deprecated)
        const LOCAL_SYMS_STRIPPED = 0x0008;
        /// Aggressively trim working set (obsolete)
        const AGGRESSIVE_WS_TRIM = 0x0010;
        /// Application can handle addresses above 2 GB
        const LARGE_ADDRESS_AWARE = 0x0020;
        /// Reserved for future use
        const RESERVED_0040 = 0x0040;
        /// Little endian (deprecated)
        const BYTES_REVERSED_LO = 0x0080;
        /// Machine is based on a 32-bit-word architecture
        const MACHINE_32BIT = 0x0100;
        /// Debugging information has been removed
        const DEBUG_STRIPPED = 0x0200;
        /// Copy to swap file when run from removable media
        const REMOVABLE_RUN_FROM_SWAP = 0x0400;
        /// Copy to swap file when run from network media
        const NET_RUN_FROM_SWAP = 0x0800;
        /// System file, not a user program
        const SYSTEM = 0x1000;
        /// Dynamic-link library
        const DLL = 0x2000;
        /// Uniprocessor machines only
        const UP_SYSTEM_ONLY = 0x4000;
        /// Big endian (deprecated)
        const BYTES_REVERSED_HI = 0x8000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// DLL characteristics from the optional header
    pub struct DllCharacteristics: u16 {
        /// Reserved, must be zero
        const RESERVED_0001 = 0x0001;
        /// Reserved, must be zero
        const RESERVED_0002 = 0x0002;
        /// Reserved, must be zero
        const RESERVED_0004 = 0x0004;
        /// Reserved, must be zero
        const RESERVED_0008 = 0x0008;
        /// Handles a high entropy 64-bit address space
        const HIGH_ENTROPY_VA = 0x0020;
        /// Can be relocated at load time
        const DYNAMIC_BASE = 0x0040;
        /// Code integrity checks are enforced
        const FORCE_INTEGRITY = 0x0080;
        /// NX compatible
        const NX_COMPAT = 0x0100;
        /// Isolation aware, but do not isolate
        const NO_ISOLATION = 0x0200;
        /// Does not use structured exception handling
        const NO_SEH = 0x0400;
        /// Do not bind the image
        const NO_BIND = 0x0800;
        /// Must execute in an AppContainer
        const APPCONTAINER = 0x1000;
        /// WDM driver
        const WDM_DRIVER = 0x2000;
        /// Supports Control Flow Guard
        const GUARD_CF = 0x4000;
        /// Terminal Server aware
        const TERMINAL_SERVER_AWARE = 0x8000;
    }
}

/// Bitmask of the alignment field inside [`SectionFlags`]
pub const SECTION_ALIGN_MASK: u32 = 0x00F0_0000;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Section characteristics from a section header
    ///
    /// Bits `0x00F00000` hold a 4-bit alignment value rather than independent flags; use
    /// [`SectionFlags::alignment`] to read it.
    pub struct SectionFlags: u32 {
        /// Do not pad to the next boundary (object files, obsolete)
        const TYPE_NO_PAD = 0x0000_0008;
        /// Contains executable code
        const CNT_CODE = 0x0000_0020;
        /// Contains initialized data
        const CNT_INITIALIZED_DATA = 0x0000_0040;
        /// Contains uninitialized data
        const CNT_UNINITIALIZED_DATA = 0x0000_0080;
        /// Reserved
        const LNK_OTHER = 0x0000_0100;
        /// Contains comments or other information (object files)
        const LNK_INFO = 0x0000_0200;
        /// Not part of the image (object files)
        const LNK_REMOVE = 0x0000_0800;
        /// COMDAT data (object files)
        const LNK_COMDAT = 0x0000_1000;
        /// Data referenced through the global pointer
        const GPREL = 0x0000_8000;
        /// Reserved
        const MEM_16BIT = 0x0002_0000;
        /// Reserved
        const MEM_LOCKED = 0x0004_0000;
        /// Reserved
        const MEM_PRELOAD = 0x0008_0000;
        /// Contains extended relocations
        const LNK_NRELOC_OVFL = 0x0100_0000;
        /// Can be discarded as needed
        const MEM_DISCARDABLE = 0x0200_0000;
        /// Cannot be cached
        const MEM_NOT_CACHED = 0x0400_0000;
        /// Not pageable
        const MEM_NOT_PAGED = 0x0800_0000;
        /// Can be shared in memory
        const MEM_SHARED = 0x1000_0000;
        /// Can be executed as code
        const MEM_EXECUTE = 0x2000_0000;
        /// Can be read
        const MEM_READ = 0x4000_0000;
        /// Can be written to
        const MEM_WRITE = 0x8000_0000;
    }
}

impl SectionFlags {
    /// Returns the data alignment encoded in the section flags, in bytes.
    ///
    /// `None` if the alignment field is zero (no alignment specified) or holds the undefined
    /// value `0xF`.
    #[must_use]
    pub fn alignment(&self) -> Option<u32> {
        match (self.bits() & SECTION_ALIGN_MASK) >> 20 {
            0 | 0xF => None,
            exponent => Some(1 << (exponent - 1)),
        }
    }
}

/// Joins the names of all set, named flags with `" | "`.
///
/// Bits without a name (unknown bits, the section alignment field) are ignored. An empty set
/// renders as an empty string.
///
/// ```rust
/// use pescope::pe::{flag_names, Characteristics};
///
/// let flags = Characteristics::EXECUTABLE_IMAGE | Characteristics::DLL;
/// assert_eq!(flag_names(&flags), "EXECUTABLE_IMAGE | DLL");
/// ```
pub fn flag_names<F: bitflags::Flags>(flags: &F) -> String {
    flags
        .iter_names()
        .map(|(name, _)| name)
        .collect::<Vec<_>>()
        .join(" | ")
}
