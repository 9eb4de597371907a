// The patch-application primitive.
//
// Replays the control segment against the original buffer, writing into a
// caller-sized destination. The caller owns allocation policy: an
// undersized destination is reported back, not grown here.

use crate::error::{Error, Result};
use crate::patch::header::{PatchHeader, read_int};

/// Outcome of one application attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawApply {
    /// The full target was written; `0..n` of the destination is valid.
    Complete(usize),
    /// The destination cannot hold the target this patch encodes.
    Undersized { required: usize },
}

/// Control triples are three 8-byte integers each.
const CTRL_ENTRY_LEN: usize = 24;

/// Apply `patch` to `original`, writing the target into `out`.
pub(crate) fn apply_into(original: &[u8], patch: &[u8], out: &mut [u8]) -> Result<RawApply> {
    let header = PatchHeader::parse(patch)?;
    let new_size = usize::try_from(header.new_size)
        .map_err(|_| Error::PatchFormat("target size exceeds address space".into()))?;
    if out.len() < new_size {
        return Ok(RawApply::Undersized { required: new_size });
    }

    let (mut ctrl, mut diff, mut extra) = header.segments(patch);
    let mut old_pos: i64 = 0;
    let mut new_pos: usize = 0;

    while new_pos < new_size {
        if ctrl.len() < CTRL_ENTRY_LEN {
            return Err(Error::PatchFormat("control segment exhausted".into()));
        }
        let add_len = read_int(&ctrl[..8]);
        let copy_len = read_int(&ctrl[8..16]);
        let seek = read_int(&ctrl[16..24]);
        ctrl = &ctrl[CTRL_ENTRY_LEN..];

        if add_len < 0 || copy_len < 0 {
            return Err(Error::PatchFormat("negative control length".into()));
        }
        let add_len = add_len as usize;
        let copy_len = copy_len as usize;

        // Diff run: add diff bytes to the corresponding old bytes. Old
        // positions outside the original read as zero.
        if add_len > new_size - new_pos {
            return Err(Error::PatchFormat("diff run overflows target".into()));
        }
        if add_len > diff.len() {
            return Err(Error::PatchFormat("diff segment exhausted".into()));
        }
        let old_end = old_pos
            .checked_add(add_len as i64)
            .ok_or_else(|| Error::PatchFormat("old cursor overflow".into()))?;
        for (i, &d) in diff[..add_len].iter().enumerate() {
            let pos = old_pos + i as i64;
            let old_byte = if pos >= 0 && (pos as usize) < original.len() {
                original[pos as usize]
            } else {
                0
            };
            out[new_pos + i] = old_byte.wrapping_add(d);
        }
        diff = &diff[add_len..];
        new_pos += add_len;
        old_pos = old_end;

        // Extra run: verbatim bytes with no counterpart in the original.
        if copy_len > new_size - new_pos {
            return Err(Error::PatchFormat("extra run overflows target".into()));
        }
        if copy_len > extra.len() {
            return Err(Error::PatchFormat("extra segment exhausted".into()));
        }
        out[new_pos..new_pos + copy_len].copy_from_slice(&extra[..copy_len]);
        extra = &extra[copy_len..];
        new_pos += copy_len;

        old_pos = old_pos
            .checked_add(seek)
            .ok_or_else(|| Error::PatchFormat("old cursor overflow".into()))?;
    }

    Ok(RawApply::Complete(new_size))
}
