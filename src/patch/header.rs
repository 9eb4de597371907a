// Patch header and the bsdiff integer codec.
//
// The wire format is minibsdiff's: an 8-byte magic, three length fields,
// then the control, diff, and extra segments back to back.
//
//   offset  len  field
//   0       8    magic "MBSDIF43"
//   8       8    control segment length
//   16      8    diff segment length
//   24      8    new (target) size
//   32      -    control segment, diff segment, extra segment (to end)
//
// Integers are sign-magnitude: a 63-bit little-endian magnitude with the
// sign in the top bit of the last byte.

use crate::error::{Error, Result};

pub const MAGIC: &[u8; 8] = b"MBSDIF43";
pub const HEADER_LEN: usize = 32;

/// Parsed fixed-size patch header. The segment contents stay borrowed from
/// the patch buffer; see [`PatchHeader::segments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchHeader {
    pub ctrl_len: u64,
    pub diff_len: u64,
    pub new_size: u64,
}

impl PatchHeader {
    /// Parse and validate the header at the front of `patch`.
    pub fn parse(patch: &[u8]) -> Result<Self> {
        if patch.len() < HEADER_LEN {
            return Err(Error::PatchFormat(format!(
                "patch of {} bytes is shorter than the {HEADER_LEN}-byte header",
                patch.len()
            )));
        }
        if &patch[..8] != MAGIC {
            return Err(Error::PatchFormat("bad magic".into()));
        }

        let ctrl_len = read_int(&patch[8..16]);
        let diff_len = read_int(&patch[16..24]);
        let new_size = read_int(&patch[24..32]);
        if ctrl_len < 0 || diff_len < 0 || new_size < 0 {
            return Err(Error::PatchFormat("negative length in header".into()));
        }

        let header = Self {
            ctrl_len: ctrl_len as u64,
            diff_len: diff_len as u64,
            new_size: new_size as u64,
        };

        let segments_end = (HEADER_LEN as u64)
            .checked_add(header.ctrl_len)
            .and_then(|n| n.checked_add(header.diff_len));
        match segments_end {
            Some(end) if end <= patch.len() as u64 => Ok(header),
            _ => Err(Error::PatchFormat(
                "segment lengths exceed patch size".into(),
            )),
        }
    }

    /// Borrow the control, diff, and extra segments out of `patch`.
    ///
    /// `patch` must be the buffer this header was parsed from.
    pub fn segments<'a>(&self, patch: &'a [u8]) -> (&'a [u8], &'a [u8], &'a [u8]) {
        let ctrl_end = HEADER_LEN + self.ctrl_len as usize;
        let diff_end = ctrl_end + self.diff_len as usize;
        (
            &patch[HEADER_LEN..ctrl_end],
            &patch[ctrl_end..diff_end],
            &patch[diff_end..],
        )
    }
}

/// Decode a sign-magnitude integer from the first 8 bytes of `buf`.
pub(crate) fn read_int(buf: &[u8]) -> i64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[..8]);
    let raw = u64::from_le_bytes(bytes);
    let magnitude = (raw & 0x7fff_ffff_ffff_ffff) as i64;
    if raw >> 63 == 0 { magnitude } else { -magnitude }
}

/// Encode a sign-magnitude integer into 8 bytes.
#[cfg(test)]
pub(crate) fn write_int(value: i64) -> [u8; 8] {
    let raw = if value < 0 {
        value.unsigned_abs() | 0x8000_0000_0000_0000
    } else {
        value as u64
    };
    raw.to_le_bytes()
}
