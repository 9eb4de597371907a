// The patch pack envelope.
//
// Patches travel inside a fixed 64-byte envelope written by the packer
// tooling, followed by the bzip2-compressed payload:
//
//   offset  len  field
//   0       1    pack format version (1 is the only supported value)
//   1       4    bundle version, u32 little-endian
//   5       32   SHA-256 over the envelope (with this field zeroed) and
//                the payload
//   37      27   reserved, zero
//   64      -    bzip2-compressed payload
//
// For an incremental pack the payload is a delta patch against the
// previous bundle; the bootstrap pack for new installs carries the full
// asset instead, so payload extraction is exposed separately from the
// full patch pipeline.

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::decompress::{DecompressOptions, decompress_with};
use crate::error::Error as CoreError;
use crate::patch::{ApplyOptions, apply_patch_with};

pub const PACK_HEADER_LEN: usize = 64;
pub const PACK_VERSION_SUPPORTED: u8 = 1;

const CHECKSUM_OFFSET: usize = 5; // pack version byte + u32 bundle version
const CHECKSUM_LEN: usize = 32;

/// Errors for envelope parsing, verification, and the unpack pipeline.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("pack of {0} bytes is shorter than the {PACK_HEADER_LEN}-byte header")]
    Truncated(usize),

    #[error("unsupported pack version {0}")]
    UnsupportedVersion(u8),

    #[error("pack checksum mismatch")]
    ChecksumMismatch,

    #[error("payload compression failed: {0}")]
    Compress(#[source] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type PackResult<T> = std::result::Result<T, PackError>;

/// Parsed envelope fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackHeader {
    pub pack_version: u8,
    pub bundle_version: u32,
    pub checksum: [u8; CHECKSUM_LEN],
}

impl PackHeader {
    /// Parse the envelope at the front of `pack`.
    pub fn parse(pack: &[u8]) -> PackResult<Self> {
        if pack.len() < PACK_HEADER_LEN {
            return Err(PackError::Truncated(pack.len()));
        }
        let pack_version = pack[0];
        if pack_version != PACK_VERSION_SUPPORTED {
            return Err(PackError::UnsupportedVersion(pack_version));
        }

        let mut version_bytes = [0u8; 4];
        version_bytes.copy_from_slice(&pack[1..CHECKSUM_OFFSET]);
        let mut checksum = [0u8; CHECKSUM_LEN];
        checksum.copy_from_slice(&pack[CHECKSUM_OFFSET..CHECKSUM_OFFSET + CHECKSUM_LEN]);

        Ok(Self {
            pack_version,
            bundle_version: u32::from_le_bytes(version_bytes),
            checksum,
        })
    }

    /// Verify the envelope digest against the full pack bytes.
    pub fn verify(&self, pack: &[u8]) -> PackResult<()> {
        if pack.len() < PACK_HEADER_LEN {
            return Err(PackError::Truncated(pack.len()));
        }
        if digest(pack) != self.checksum {
            return Err(PackError::ChecksumMismatch);
        }
        Ok(())
    }
}

/// SHA-256 over the envelope with a zeroed checksum field, then the payload.
fn digest(pack: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(&pack[..CHECKSUM_OFFSET]);
    hasher.update([0u8; CHECKSUM_LEN]);
    hasher.update(&pack[CHECKSUM_OFFSET + CHECKSUM_LEN..]);
    hasher.finalize().into()
}

/// Parse, verify, and decompress a pack, returning its raw payload.
///
/// This is the whole pipeline for a bootstrap pack, whose payload is the
/// full asset rather than a patch.
pub fn unpack_payload(pack: &[u8]) -> PackResult<Vec<u8>> {
    unpack_payload_with(pack, &DecompressOptions::default())
}

/// [`unpack_payload`] with explicit decompression tuning.
pub fn unpack_payload_with(pack: &[u8], opts: &DecompressOptions) -> PackResult<Vec<u8>> {
    let header = PackHeader::parse(pack)?;
    header.verify(pack)?;
    Ok(decompress_with(&pack[PACK_HEADER_LEN..], opts)?)
}

/// Full incremental pipeline: parse + verify the envelope, decompress the
/// payload, and apply it as a patch against `original`.
pub fn unpack(original: &[u8], pack: &[u8]) -> PackResult<Vec<u8>> {
    let raw_patch = unpack_payload(pack)?;
    Ok(apply_patch_with(
        original,
        &raw_patch,
        &ApplyOptions::default(),
    )?)
}

/// Wrap an already-generated raw payload into a pack envelope.
///
/// Compresses `payload` with bzip2 and stamps the envelope the same way
/// the packer tooling does.
pub fn write_pack(bundle_version: u32, payload: &[u8]) -> PackResult<Vec<u8>> {
    use bzip2::Compression;
    use bzip2::write::BzEncoder;
    use std::io::Write;

    let mut pack = vec![0u8; PACK_HEADER_LEN];
    pack[0] = PACK_VERSION_SUPPORTED;
    pack[1..CHECKSUM_OFFSET].copy_from_slice(&bundle_version.to_le_bytes());

    let mut encoder = BzEncoder::new(pack, Compression::default());
    encoder
        .write_all(payload)
        .and_then(|_| encoder.finish())
        .map(|mut pack| {
            let checksum = digest(&pack);
            pack[CHECKSUM_OFFSET..CHECKSUM_OFFSET + CHECKSUM_LEN].copy_from_slice(&checksum);
            pack
        })
        .map_err(PackError::Compress)
}
