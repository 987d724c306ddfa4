#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only failure mode of interest here is a panic or a hang; a parse
    // error is an entirely normal outcome for arbitrary bytes.
    let _ = edn_reader::parse(data);
});
