#![no_main]

use heapshape::aggregate::aggregate;
use heapshape::decode::decode_corpus;
use heapshape::window::WindowSizes;
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    // Arbitrary payloads must decode or fail cleanly, never panic
    if let Ok(corpus) = decode_corpus(data, Path::new("fuzz")) {
        let _ = aggregate("fuzz", &corpus, &WindowSizes::default());
    }
});
