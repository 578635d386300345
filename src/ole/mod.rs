//! Compound File Binary Format container and the workbook stored in it.

/// Little-endian field access
pub mod binary;

/// Byte string decoding for the BIFF codepages
pub mod codepage;

/// Constants for the CFBF on-disk layout
pub mod consts;

/// Container header, FAT, miniFAT and directory
mod file;

/// Legacy DOS/OEM code page tables
mod oem_tables;

/// Record sources over the workbook stream
mod stream;

/// Legacy Excel (.xls) workbook reader
pub mod xls;

#[cfg(test)]
pub(crate) mod fixtures;

pub use file::{OleFile, StreamExtent};
