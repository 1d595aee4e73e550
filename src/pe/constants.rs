//! Enumerated PE/COFF constants.
//!
//! Every enumeration here converts from its raw on-disk integer with [`From`] and back with
//! [`From`] on the raw type, so decoded headers never lose information. Value spaces that are
//! open (machine types, subsystems, debug and relocation types) carry an `Unknown(raw)`
//! fallback; the two-bit FPO frame type is closed. Human-readable names come from
//! [`strum::Display`].
//!
//! # Examples
//!
//! ```rust
//! use pescope::pe::MachineType;
//!
//! assert_eq!(MachineType::from(0x8664), MachineType::Amd64);
//! assert_eq!(MachineType::Amd64.to_string(), "AMD64");
//! assert_eq!(u16::from(MachineType::from(0x1234)), 0x1234);
//! ```

/// Offset of the 4-byte pointer to the PE signature inside the MS-DOS stub.
pub const PE_POINTER_OFFSET: usize = 0x3C;
/// The PE signature, `PE\0\0`.
pub const PE_SIGNATURE: [u8; 4] = *b"PE\0\0";
/// Optional header magic of 32-bit images.
pub const PE32_MAGIC: u16 = 0x10B;
/// Optional header magic of 64-bit images.
pub const PE32PLUS_MAGIC: u16 = 0x20B;

/// Size of the COFF file header.
pub const FILE_HEADER_SIZE: usize = 20;
/// Size of one data directory slot.
pub const DATA_DIRECTORY_SIZE: usize = 8;
/// Maximum number of data directory slots.
pub const MAX_DATA_DIRECTORIES: usize = 16;
/// Size of one section table record.
pub const SECTION_HEADER_SIZE: usize = 40;
/// Size of one import directory descriptor.
pub const IMPORT_DESCRIPTOR_SIZE: usize = 20;
/// Size of one debug directory descriptor.
pub const DEBUG_DIRECTORY_SIZE: usize = 28;
/// Size of one FPO record.
pub const FPO_DATA_SIZE: usize = 16;
/// Size of a base relocation block header.
pub const RELOC_BLOCK_HEADER_SIZE: usize = 8;

/// Generates a fieldless enumeration over a raw integer, with an `Unknown(raw)` fallback and
/// lossless conversions in both directions.
macro_rules! raw_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $raw:ty {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
            /// A value the format does not define
            Unknown($raw),
        }

        impl From<$raw> for $name {
            fn from(value: $raw) -> Self {
                match value {
                    $($value => $name::$variant,)+
                    other => $name::Unknown(other),
                }
            }
        }

        impl From<$name> for $raw {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $value,)+
                    $name::Unknown(other) => other,
                }
            }
        }
    };
}

raw_enum! {
    /// Target CPU of an image, from the COFF file header.
    pub enum MachineType: u16 {
        /// Applicable to any machine type
        #[strum(to_string = "Any")]
        Any = 0x0000,
        /// Intel 386 or later
        #[strum(to_string = "I386")]
        I386 = 0x014C,
        /// MIPS little endian
        #[strum(to_string = "R4000")]
        R4000 = 0x0166,
        /// MIPS little-endian WCE v2
        #[strum(to_string = "WCEMIPSv2")]
        WceMipsV2 = 0x0169,
        /// Hitachi SH3
        #[strum(to_string = "SH3")]
        Sh3 = 0x01A2,
        /// Hitachi SH3 DSP
        #[strum(to_string = "SH3DSP")]
        Sh3Dsp = 0x01A3,
        /// Hitachi SH4
        #[strum(to_string = "SH4")]
        Sh4 = 0x01A6,
        /// Hitachi SH5
        #[strum(to_string = "SH5")]
        Sh5 = 0x01A8,
        /// ARM little endian
        #[strum(to_string = "ARM")]
        Arm = 0x01C0,
        /// Thumb
        #[strum(to_string = "Thumb")]
        Thumb = 0x01C2,
        /// ARM Thumb-2 little endian
        #[strum(to_string = "ARMNT")]
        ArmNt = 0x01C4,
        /// Matsushita AM33
        #[strum(to_string = "AM33")]
        Am33 = 0x01D3,
        /// Power PC little endian
        #[strum(to_string = "PowerPC")]
        PowerPc = 0x01F0,
        /// Power PC with floating point support
        #[strum(to_string = "PowerPCFP")]
        PowerPcFp = 0x01F1,
        /// Intel Itanium
        #[strum(to_string = "IA64")]
        Ia64 = 0x0200,
        /// MIPS16
        #[strum(to_string = "MIPS16")]
        Mips16 = 0x0266,
        /// MIPS with FPU
        #[strum(to_string = "MIPSFPU")]
        MipsFpu = 0x0366,
        /// MIPS16 with FPU
        #[strum(to_string = "MIPSFPU16")]
        MipsFpu16 = 0x0466,
        /// EFI byte code
        #[strum(to_string = "EBC")]
        Ebc = 0x0EBC,
        /// RISC-V 32-bit address space
        #[strum(to_string = "RISCV32")]
        RiscV32 = 0x5032,
        /// RISC-V 64-bit address space
        #[strum(to_string = "RISCV64")]
        RiscV64 = 0x5064,
        /// RISC-V 128-bit address space
        #[strum(to_string = "RISCV128")]
        RiscV128 = 0x5128,
        /// x64
        #[strum(to_string = "AMD64")]
        Amd64 = 0x8664,
        /// Mitsubishi M32R little endian
        #[strum(to_string = "M32R")]
        M32r = 0x9041,
        /// ARM64 little endian
        #[strum(to_string = "ARM64")]
        Arm64 = 0xAA64,
    }
}

raw_enum! {
    /// Subsystem required to run an image, from the optional header.
    pub enum Subsystem: u16 {
        /// No subsystem specified
        Unspecified = 0,
        /// Device drivers and native Windows processes
        Native = 1,
        /// Windows graphical user interface
        WindowsGui = 2,
        /// Windows character subsystem
        WindowsCui = 3,
        /// OS/2 character subsystem
        Os2Cui = 5,
        /// Posix character subsystem
        PosixCui = 7,
        /// Native Win9x driver
        NativeWindows = 8,
        /// Windows CE
        WindowsCeGui = 9,
        /// EFI application
        EfiApplication = 10,
        /// EFI driver with boot services
        EfiBootServiceDriver = 11,
        /// EFI driver with run-time services
        EfiRuntimeDriver = 12,
        /// EFI ROM image
        EfiRom = 13,
        /// XBOX
        Xbox = 14,
        /// Windows boot application
        WindowsBootApplication = 16,
    }
}

raw_enum! {
    /// Format of the data a debug directory entry points to.
    pub enum DebugType: u32 {
        /// Ignored by all tools
        Unspecified = 0,
        /// COFF line numbers, symbol table and string table
        Coff = 1,
        /// Visual C++ debug information
        CodeView = 2,
        /// Frame pointer omission information
        Fpo = 3,
        /// Location of a DBG file
        Misc = 4,
        /// Copy of the `.pdata` section
        Exception = 5,
        /// Fixup information
        Fixup = 6,
        /// Mapping from image RVAs to source RVAs
        OMapToSrc = 7,
        /// Mapping from source RVAs to image RVAs
        OMapFromSrc = 8,
        /// Reserved for Borland
        Borland = 9,
        /// Reserved
        Reserved10 = 10,
        /// Reserved
        Clsid = 11,
        /// PE determinism or reproducibility
        Repro = 16,
    }
}

raw_enum! {
    /// Kind of fixup a base relocation entry requests.
    ///
    /// Types 5 and 7 are interpreted according to the machine type (MIPS, ARM, Thumb, RISC-V).
    pub enum RelocationType: u8 {
        /// Skipped; pads a block
        Absolute = 0,
        /// High 16 bits of the delta
        High = 1,
        /// Low 16 bits of the delta
        Low = 2,
        /// All 32 bits of the delta
        HighLow = 3,
        /// High 16 bits of the delta, adjusted by the following slot
        HighAdj = 4,
        /// Machine specific: MIPS jump address, ARM MOV32, RISC-V HIGH20
        MachineSpecific5 = 5,
        /// Reserved
        Reserved6 = 6,
        /// Machine specific: Thumb MOV32, RISC-V LOW12I
        MachineSpecific7 = 7,
        /// RISC-V low 12 bits, S-type
        RiscVLow12S = 8,
        /// MIPS16 jump address
        MipsJmpAddr16 = 9,
        /// All 64 bits of the delta
        Dir64 = 10,
    }
}

/// Frame kind of an FPO record.
///
/// Decoded from the top two bits of the FPO flag byte, so every value is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum FrameType {
    /// Frame pointer omitted
    #[strum(to_string = "FPO")]
    Fpo,
    /// Trap frame
    Trap,
    /// Task state segment frame
    #[strum(to_string = "TSS")]
    Tss,
    /// Standard EBP frame
    #[strum(to_string = "NonFPO")]
    NonFpo,
}

impl From<u8> for FrameType {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => FrameType::Fpo,
            1 => FrameType::Trap,
            2 => FrameType::Tss,
            _ => FrameType::NonFpo,
        }
    }
}

impl From<FrameType> for u8 {
    fn from(value: FrameType) -> Self {
        match value {
            FrameType::Fpo => 0,
            FrameType::Trap => 1,
            FrameType::Tss => 2,
            FrameType::NonFpo => 3,
        }
    }
}
