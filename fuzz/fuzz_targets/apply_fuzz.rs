#![no_main]
use airpatch::ApplyOptions;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let opts = ApplyOptions {
        initial_capacity: None,
        max_target_size: 1 << 24,
    };

    // Fuzz the patcher with arbitrary bytes and an empty original.
    let _ = airpatch::apply_patch_with(&[], data, &opts);

    // Also fuzz with a non-empty original.
    if data.len() >= 2 {
        let split = data.len() / 2;
        let (original, patch) = data.split_at(split);
        let _ = airpatch::apply_patch_with(original, patch, &opts);
    }
});
