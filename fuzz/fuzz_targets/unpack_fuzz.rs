#![no_main]
use airpatch::DecompressOptions;
use airpatch::pack;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let opts = DecompressOptions {
        initial_capacity: None,
        max_output_size: 1 << 24,
    };

    // Header parse and checksum verification over arbitrary bytes.
    let _ = pack::unpack_payload_with(data, &opts);

    // The full original + pack pipeline.
    if data.len() >= 2 {
        let split = data.len() / 2;
        let (original, envelope) = data.split_at(split);
        let _ = pack::unpack(original, envelope);
    }
});
