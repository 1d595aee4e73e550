use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every variant is a hard failure: decoding stops at the point of occurrence and no partial
/// [`crate::File`] is produced. Directories and debug payloads that are recognised but not
/// decoded are not errors; they are recorded as [`crate::pe::Unsupported`] markers on the
/// decoded file instead.
///
/// # Error Categories
///
/// ## Structural Errors
/// - [`Error::InvalidSignature`] - The `PE\0\0` marker is missing at the header pointer
/// - [`Error::InvalidMagic`] - The optional header magic is neither PE32 nor PE32+
/// - [`Error::Truncated`] - Fewer bytes remain than a fixed-size record requires
/// - [`Error::AddressOutOfRange`] - An RVA range is not covered by a single section
/// - [`Error::MalformedSentinel`] - A zero-terminated sequence runs off the end of its section
/// - [`Error::Malformed`] - Field values that contradict each other
///
/// ## Input Errors
/// - [`Error::Empty`] - Empty input provided
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// # Examples
///
/// ```rust,no_run
/// use pescope::{Error, File};
/// use std::path::Path;
///
/// match File::from_file(Path::new("kernel32.dll")) {
///     Ok(file) => println!("{} sections", file.sections().len()),
///     Err(Error::InvalidSignature { found }) => eprintln!("Not a PE image: {:02x?}", found),
///     Err(Error::AddressOutOfRange { rva, len }) => {
///         eprintln!("Dangling reference to RVA 0x{:x} ({} bytes)", rva, len)
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The four bytes at the offset stored at `0x3C` are not `PE\0\0`.
    #[error("Invalid PE signature - expected \"PE\\0\\0\", found {found:02x?}")]
    InvalidSignature {
        /// The bytes found where the signature was expected
        found: [u8; 4],
    },

    /// The optional header magic is neither `0x10B` (PE32) nor `0x20B` (PE32+).
    #[error("Invalid optional header magic - expected 0x010B or 0x020B, got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Fewer bytes remain than a fixed-size record requires.
    ///
    /// The offset is relative to the buffer being decoded, which is either the whole file or a
    /// directory's byte range resolved through the address space.
    #[error("Truncated input - needed {needed} bytes at offset 0x{offset:x}, {available} available")]
    Truncated {
        /// Offset at which the read was attempted
        offset: usize,
        /// Number of bytes the read required
        needed: usize,
        /// Number of bytes the buffer holds in total
        available: usize,
    },

    /// The requested `[rva, rva + len)` range is not fully contained in a single section.
    #[error("Address out of range - RVA 0x{rva:x} ({len} bytes) is not mapped by any section")]
    AddressOutOfRange {
        /// Relative virtual address of the request
        rva: u64,
        /// Length of the request in bytes
        len: u64,
    },

    /// A zero-terminated sequence reached the end of its containing section before the
    /// terminating record.
    #[error("Malformed sentinel - sequence at RVA 0x{rva:x} is not terminated within its section")]
    MalformedSentinel {
        /// Relative virtual address where the unterminated sequence starts
        rva: u64,
    },

    /// The file is damaged and could not be parsed.
    ///
    /// This error indicates field values that contradict each other or the format, such as a
    /// data directory count above 16 or a relocation block smaller than its own header. The
    /// error includes the source location where the malformation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while opening, mapping or reading the input.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}
