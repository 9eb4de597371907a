#![allow(dead_code)] // each integration crate uses a different subset

// Shared fixture builders for the integration suites.
//
// The library deliberately does not generate diffs, so the tests carry a
// naive conformant generator: one diff run over the common length plus
// one extra run for the tail. Any conformant patcher must reconstruct the
// target from its output exactly.

use bzip2::Compression;
use bzip2::write::BzEncoder;
use std::io::Write;

pub const MAGIC: &[u8; 8] = b"MBSDIF43";

/// Encode a bsdiff sign-magnitude integer.
pub fn write_int(value: i64) -> [u8; 8] {
    let raw = if value < 0 {
        value.unsigned_abs() | 0x8000_0000_0000_0000
    } else {
        value as u64
    };
    raw.to_le_bytes()
}

/// Build a patch from explicit control triples and segment contents.
pub fn build_patch(new_size: i64, ctrl: &[(i64, i64, i64)], diff: &[u8], extra: &[u8]) -> Vec<u8> {
    let mut patch = Vec::from(*MAGIC);
    patch.extend_from_slice(&write_int(ctrl.len() as i64 * 24));
    patch.extend_from_slice(&write_int(diff.len() as i64));
    patch.extend_from_slice(&write_int(new_size));
    for &(add, copy, seek) in ctrl {
        patch.extend_from_slice(&write_int(add));
        patch.extend_from_slice(&write_int(copy));
        patch.extend_from_slice(&write_int(seek));
    }
    patch.extend_from_slice(diff);
    patch.extend_from_slice(extra);
    patch
}

/// Naive conformant diff: one diff run over the overlap, one extra run
/// for whatever the target adds beyond the original's length.
pub fn make_patch(old: &[u8], new: &[u8]) -> Vec<u8> {
    let overlap = old.len().min(new.len());
    let diff: Vec<u8> = (0..overlap).map(|i| new[i].wrapping_sub(old[i])).collect();
    let extra = &new[overlap..];

    if overlap == 0 && extra.is_empty() {
        return build_patch(0, &[], b"", b"");
    }
    build_patch(
        new.len() as i64,
        &[(overlap as i64, extra.len() as i64, 0)],
        &diff,
        extra,
    )
}

/// Compress with bzip2, the payload compression the pack format uses.
pub fn bz2(data: &[u8]) -> Vec<u8> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
