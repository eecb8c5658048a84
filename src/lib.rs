//! Lossless reading and writing of Windows-style INI files.
//!
//! Comments, blank lines, indentation and each line's own terminator survive
//! a parse/serialize cycle untouched, while values can be read and written
//! through flat `section.key` paths.

pub mod ini;

pub use self::ini::*;
