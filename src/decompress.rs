// Streaming bzip2 decompression with adaptive output growth.
//
// The decompressed size of a payload is not known up front, so the output
// buffer starts at a multiplicative heuristic of the input size and doubles
// whenever the decoder fills it. On stream end the buffer's logical length
// already equals the bytes produced, so the caller never sees trailing
// garbage from over-allocation.

use bzip2::{Decompress, Status};
use log::debug;

use crate::error::{Error, Result};

/// Initial output allocation, as a multiple of the input size. Typical
/// bzip2 ratios for asset payloads make one large up-front reservation
/// cheaper than many doubling steps.
const INITIAL_RATIO: usize = 130;

/// Default bound on decompressed output. Growth past this fails with
/// `Error::ResourceExhausted` instead of letting a corrupt or adversarial
/// stream balloon memory.
pub const DEFAULT_MAX_OUTPUT_SIZE: usize = 1 << 30; // 1 GiB

/// Tuning knobs for [`decompress_with`].
#[derive(Debug, Clone)]
pub struct DecompressOptions {
    /// Initial output allocation in bytes. `None` uses the input-size
    /// heuristic. The choice only affects how often the buffer grows,
    /// never the produced bytes.
    pub initial_capacity: Option<usize>,
    /// Hard bound on the output buffer.
    pub max_output_size: usize,
}

impl Default for DecompressOptions {
    fn default() -> Self {
        Self {
            initial_capacity: None,
            max_output_size: DEFAULT_MAX_OUTPUT_SIZE,
        }
    }
}

/// Decompress a complete bzip2 stream held in memory.
///
/// Returns the decompressed bytes, sized exactly. An empty input is the
/// degenerate stream and yields an empty buffer. Bytes following the end
/// of the first stream are ignored.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    decompress_with(input, &DecompressOptions::default())
}

/// Decompress with explicit buffer tuning.
pub fn decompress_with(input: &[u8], opts: &DecompressOptions) -> Result<Vec<u8>> {
    // A zero bound admits no output at all; reject it before the clamp
    // below would panic on an empty range.
    if opts.max_output_size == 0 {
        return Err(Error::ResourceExhausted { limit: 0 });
    }
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let initial = opts
        .initial_capacity
        .unwrap_or_else(|| input.len().saturating_mul(INITIAL_RATIO))
        .clamp(1, opts.max_output_size);

    let mut output = Vec::new();
    output
        .try_reserve_exact(initial)
        .map_err(|_| Error::Allocation { requested: initial })?;

    // Decoder state lives exactly as long as this call; Drop releases it
    // on every exit path.
    let mut stream = Decompress::new(false);

    loop {
        let consumed = stream.total_in() as usize;
        let produced = output.len();

        let status = stream
            .decompress_vec(&input[consumed..], &mut output)
            .map_err(|e| Error::Decompression(format!("corrupt bzip2 stream: {e}")))?;

        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::FlushOk | Status::RunOk | Status::FinishOk => {}
            Status::MemNeeded => {
                // BZ_MEM_ERROR: libbz2 could not obtain its internal
                // working memory. It reports no request size and the
                // stream is unrecoverable, so this is a stream failure;
                // `Allocation` covers caller-visible output reservations.
                return Err(Error::Decompression("decoder out of memory".into()));
            }
        }

        if output.len() == output.capacity() {
            grow(&mut output, opts.max_output_size)?;
        } else if stream.total_in() as usize == consumed && output.len() == produced {
            // Output space remains but the decoder made no progress: the
            // stream ended before its end-of-stream marker.
            return Err(Error::Decompression("truncated bzip2 stream".into()));
        }
    }

    Ok(output)
}

/// Double the buffer's capacity, clamped to `limit`.
fn grow(output: &mut Vec<u8>, limit: usize) -> Result<()> {
    let capacity = output.capacity();
    if capacity >= limit {
        return Err(Error::ResourceExhausted { limit });
    }

    let additional = capacity.min(limit - capacity);
    debug!(
        "decompression output full at {capacity} bytes, growing to {}",
        capacity + additional
    );
    output
        .try_reserve_exact(additional)
        .map_err(|_| Error::Allocation {
            requested: additional,
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzip2::Compression;
    use bzip2::write::BzEncoder;
    use std::io::Write;

    fn compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn roundtrip_text() {
        let data = b"The quick brown fox jumps over the lazy dog.";
        let out = decompress(&compress(data)).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn empty_input_yields_empty_buffer() {
        assert_eq!(decompress(b"").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn output_length_is_exact() {
        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let out = decompress(&compress(&data)).unwrap();
        assert_eq!(out.len(), data.len());
        assert_eq!(out, data);
    }

    #[test]
    fn tiny_initial_allocation_exercises_growth() {
        let data: Vec<u8> = (0..=255u8).cycle().take(65_536).collect();
        let opts = DecompressOptions {
            initial_capacity: Some(1),
            ..Default::default()
        };
        let out = decompress_with(&compress(&data), &opts).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn initial_allocation_does_not_change_output() {
        let data = b"initial allocation is a performance knob only".repeat(50);
        let compressed = compress(&data);
        let baseline = decompress(&compressed).unwrap();
        for initial in [1, 7, 64, 100_000] {
            let opts = DecompressOptions {
                initial_capacity: Some(initial),
                ..Default::default()
            };
            assert_eq!(decompress_with(&compressed, &opts).unwrap(), baseline);
        }
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let compressed = compress(&[0xAB; 4096]);
        let truncated = &compressed[..compressed.len() / 2];
        match decompress(truncated) {
            Err(Error::Decompression(_)) => {}
            other => panic!("expected Decompression error, got {other:?}"),
        }
    }

    #[test]
    fn garbage_input_is_rejected() {
        match decompress(b"this is not a bzip2 stream at all") {
            Err(Error::Decompression(_)) => {}
            other => panic!("expected Decompression error, got {other:?}"),
        }
    }

    #[test]
    fn output_bound_is_enforced() {
        // 1 MiB of zeros compresses far below 1 KiB, so the 130x heuristic
        // starts small and the bound trips during growth.
        let compressed = compress(&vec![0u8; 1 << 20]);
        let opts = DecompressOptions {
            initial_capacity: None,
            max_output_size: 4096,
        };
        match decompress_with(&compressed, &opts) {
            Err(Error::ResourceExhausted { limit: 4096 }) => {}
            other => panic!("expected ResourceExhausted, got {other:?}"),
        }
    }

    #[test]
    fn zero_output_bound_fails_cleanly() {
        let compressed = compress(b"data");
        let opts = DecompressOptions {
            initial_capacity: None,
            max_output_size: 0,
        };
        match decompress_with(&compressed, &opts) {
            Err(Error::ResourceExhausted { limit: 0 }) => {}
            other => panic!("expected ResourceExhausted, got {other:?}"),
        }
    }

    #[test]
    fn trailing_bytes_after_stream_end_are_ignored() {
        let data = b"payload";
        let mut compressed = compress(data);
        compressed.extend_from_slice(b"trailing junk");
        assert_eq!(decompress(&compressed).unwrap(), data);
    }
}
