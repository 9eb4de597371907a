// Delta patch application (minibsdiff wire format).
//
// The public entry points own the allocation policy: the target size is
// encoded inside the patch, but rather than trusting it blindly the output
// starts at a heuristic (the patch size) and the primitive reports back
// when the destination is undersized, at which point the buffer grows and
// the application is retried against the same inputs.
//
// # Modules
//
// - `header` — fixed header parsing and the sign-magnitude integer codec
// - `raw`    — the application primitive writing into a caller-sized buffer

pub mod header;
mod raw;

pub use header::PatchHeader;

use log::debug;

use crate::error::{Error, Result};
use raw::RawApply;

/// Default bound on the reconstructed target. Growth past this fails with
/// `Error::ResourceExhausted`.
pub const DEFAULT_MAX_TARGET_SIZE: usize = 1 << 30; // 1 GiB

/// Tuning knobs for [`apply_patch_with`].
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Initial output allocation in bytes. `None` uses the patch size as a
    /// lower-bound heuristic. The choice only affects how many retries the
    /// grow loop takes, never the produced bytes.
    pub initial_capacity: Option<usize>,
    /// Hard bound on the reconstructed target.
    pub max_target_size: usize,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            initial_capacity: None,
            max_target_size: DEFAULT_MAX_TARGET_SIZE,
        }
    }
}

/// Reconstruct the target from `original` plus `patch`.
///
/// `patch` must have been generated against this same `original`; that
/// relationship is the caller's precondition. A patch for a different
/// original fails with [`Error::PatchFormat`] when it runs outside the
/// patch's own structure, but the format cannot detect every mismatch —
/// a patch that happens to stay in bounds reconstructs bytes that simply
/// are not any valid target. Structurally-invalid and incompatible
/// patches are deliberately not distinguished further.
pub fn apply_patch(original: &[u8], patch: &[u8]) -> Result<Vec<u8>> {
    apply_patch_with(original, patch, &ApplyOptions::default())
}

/// Apply with explicit buffer tuning.
pub fn apply_patch_with(original: &[u8], patch: &[u8], opts: &ApplyOptions) -> Result<Vec<u8>> {
    // A zero bound admits no target at all; reject it before the clamp
    // below would panic on an empty range.
    if opts.max_target_size == 0 {
        return Err(Error::ResourceExhausted { limit: 0 });
    }
    let initial = opts
        .initial_capacity
        .unwrap_or(patch.len())
        .clamp(1, opts.max_target_size);
    let mut out = alloc_zeroed(initial)?;

    loop {
        match raw::apply_into(original, patch, &mut out)? {
            RawApply::Complete(written) => {
                out.truncate(written);
                return Ok(out);
            }
            RawApply::Undersized { required } => {
                if required > opts.max_target_size {
                    return Err(Error::ResourceExhausted {
                        limit: opts.max_target_size,
                    });
                }
                let grown = out
                    .len()
                    .saturating_mul(2)
                    .max(required)
                    .min(opts.max_target_size);
                debug!(
                    "patch target buffer undersized: {} -> {grown} bytes",
                    out.len()
                );
                let additional = grown - out.len();
                out.try_reserve_exact(additional)
                    .map_err(|_| Error::Allocation {
                        requested: additional,
                    })?;
                out.resize(grown, 0);
            }
        }
    }
}

fn alloc_zeroed(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { requested: len })?;
    buf.resize(len, 0);
    Ok(buf)
}
