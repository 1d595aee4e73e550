// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # pescope
//!
//! A cross-platform decoder for Windows PE/COFF executables, written in pure Rust.
//!
//! `pescope` reads a PE32 or PE32+ image and decodes its headers, section table and the
//! contents of the import, base relocation and debug directories into owned, immutable values.
//! It never needs Windows, never executes anything, and never writes.
//!
//! ## Features
//!
//! - **Headers** - COFF file header and both optional header variants, unified into one type
//! - **Sections** - Section table with RVA resolution and bounds-checked reads
//! - **Imports** - Modules, lookup and address tables, hints, names and ordinals
//! - **Relocations** - Base relocation blocks with typed entries
//! - **Debug data** - CodeView (including RSDS / PDB 7.0), FPO and Misc payloads
//! - **Soft failure for the rest** - Directories without a decoder are recorded, not rejected
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pescope::prelude::*;
//!
//! let file = File::from_file(std::path::Path::new("app.exe"))?;
//!
//! println!("{} for {}", if file.is_64bit() { "PE32+" } else { "PE32" }, file.header().machine);
//! for section in file.sections() {
//!     println!("{:8} rva=0x{:08x} {}", section.name, section.virtual_address,
//!              flag_names(&section.characteristics));
//! }
//! for import in file.imports() {
//!     println!("{}", import.directory.name);
//! }
//! # Ok::<(), pescope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`crate::file`] - Data sources, the byte [`Parser`] and the assembled [`File`]
//! - [`crate::pe`] - One decoder per PE structure
//! - [`crate::Error`] - The single error type
//!
//! ## Error Handling
//!
//! Every decode failure is a hard error of type [`Error`] and aborts the load. Directories that
//! are present but have no decoder (resources, exceptions, TLS, ...) and debug entries of
//! unknown payload type are soft outcomes, available through [`File::unsupported`].
//!
//! ## Logging
//!
//! The library logs through the [`log`] facade: `debug` for decode decisions, `warn` for
//! unsupported directories and debug payloads. Install any logger to see them.

#[macro_use]
pub(crate) mod error;
pub mod file;
pub mod pe;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use pescope::prelude::*;
///
/// let file = File::from_file(std::path::Path::new("app.exe"))?;
/// for entry in file.debug_entries() {
///     if let DebugData::Rsds(info) = &entry.data {
///         println!("{} {}", info.guid, info.pdb_path);
///     }
/// }
/// # Ok::<(), pescope::Error>(())
/// ```
pub mod prelude;

/// `pescope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`].
///
/// # Example
///
/// ```rust,no_run
/// use pescope::{File, Result};
///
/// fn load(path: &str) -> Result<File> {
///     File::from_file(std::path::Path::new(path))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `pescope` Error type
///
/// # Examples
///
/// ```rust,no_run
/// use pescope::{Error, File};
///
/// match File::from_file(std::path::Path::new("app.exe")) {
///     Ok(file) => println!("{} sections", file.sections().len()),
///     Err(Error::InvalidSignature { found }) => println!("not a PE image: {:02x?}", found),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// Decoded PE image and the byte cursor used to decode it.
///
/// See [`file::File`] for the entry points and accessors.
pub use file::{parser::Parser, File};
