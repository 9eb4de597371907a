//! Airpatch: binary delta patch application and payload decompression.
//!
//! The crate provides:
//! - Streaming bzip2 decompression with adaptive output growth (`decompress`)
//! - Delta patch application in the minibsdiff wire format (`patch`)
//! - The packer tooling's checksummed envelope (`pack`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use airpatch::{apply_patch, decompress};
//!
//! let original = std::fs::read("bundle.old")?;
//! let compressed_patch = std::fs::read("bundle.patch.bz2")?;
//!
//! let raw_patch = decompress(&compressed_patch)?;
//! let updated = apply_patch(&original, &raw_patch)?;
//! std::fs::write("bundle.new", &updated)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod decompress;
pub mod error;
pub mod io;
pub mod pack;
pub mod patch;

#[cfg(feature = "cli")]
pub mod cli;

pub use decompress::{DecompressOptions, decompress, decompress_with};
pub use error::{Error, Result};
pub use patch::{ApplyOptions, apply_patch, apply_patch_with};
