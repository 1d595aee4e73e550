#![no_main]

use libfuzzer_sys::fuzz_target;
use pescope::File;

fuzz_target!(|data: &[u8]| {
    let _ = File::from_mem(data.to_vec());
});
