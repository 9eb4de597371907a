// File-level helpers around the in-memory cores.
//
// Inputs are read fully into memory (both cores are single-buffer
// operations) and outputs are written with `fs::write`. Each helper
// returns a stats struct including a SHA-256 of the output so callers
// can record what they installed.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::decompress::decompress;
use crate::error::Error as CoreError;
use crate::pack::{self, PackError};
use crate::patch::apply_patch;

/// Statistics returned by [`decompress_file`].
#[derive(Debug, Clone)]
pub struct DecompressStats {
    /// Compressed input size in bytes.
    pub input_size: u64,
    /// Decompressed output size in bytes.
    pub output_size: u64,
    /// SHA-256 of the written output.
    pub output_sha256: [u8; 32],
}

/// Statistics returned by [`apply_file`] and [`unpack_file`].
#[derive(Debug, Clone)]
pub struct ApplyStats {
    /// Original asset size in bytes.
    pub original_size: u64,
    /// Patch (or pack) input size in bytes.
    pub patch_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// SHA-256 of the written output.
    pub output_sha256: [u8; 32],
}

/// Error type for file helpers.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Pack(#[from] PackError),
}

fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Decompress a payload file to `output_path`.
pub fn decompress_file(input_path: &Path, output_path: &Path) -> Result<DecompressStats, IoError> {
    let input = fs::read(input_path)?;
    let output = decompress(&input)?;
    fs::write(output_path, &output)?;

    Ok(DecompressStats {
        input_size: input.len() as u64,
        output_size: output.len() as u64,
        output_sha256: sha256(&output),
    })
}

/// Apply a raw (already-decompressed) patch file to an original asset,
/// writing the reconstructed asset to `output_path`.
pub fn apply_file(
    original_path: &Path,
    patch_path: &Path,
    output_path: &Path,
) -> Result<ApplyStats, IoError> {
    let original = fs::read(original_path)?;
    let patch = fs::read(patch_path)?;
    let output = apply_patch(&original, &patch)?;
    fs::write(output_path, &output)?;

    Ok(ApplyStats {
        original_size: original.len() as u64,
        patch_size: patch.len() as u64,
        output_size: output.len() as u64,
        output_sha256: sha256(&output),
    })
}

/// Run the full pack pipeline from files: verify the envelope, decompress
/// the payload, and apply it against the original asset.
pub fn unpack_file(
    original_path: &Path,
    pack_path: &Path,
    output_path: &Path,
) -> Result<ApplyStats, IoError> {
    let original = fs::read(original_path)?;
    let pack_bytes = fs::read(pack_path)?;
    let output = pack::unpack(&original, &pack_bytes)?;
    fs::write(output_path, &output)?;

    Ok(ApplyStats {
        original_size: original.len() as u64,
        patch_size: pack_bytes.len() as u64,
        output_size: output.len() as u64,
        output_sha256: sha256(&output),
    })
}
