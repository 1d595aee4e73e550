//! Shared test infrastructure.
//!
//! Real-world PE files are not checked in; tests build the images they need with
//! [`ImageBuilder`].


pub use builders::*;
