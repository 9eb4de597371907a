#![no_main]
use airpatch::DecompressOptions;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must only ever produce Ok or Err, never a panic.
    // The bound keeps a lucky valid stream from allocating unboundedly.
    let opts = DecompressOptions {
        initial_capacity: None,
        max_output_size: 1 << 24,
    };
    let _ = airpatch::decompress_with(data, &opts);
});
