#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Reply frames come straight off the socket; decoding must only ever
    // return Ok or Err.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = serde_json::from_str::<aether_types::QueryReply>(s);
    }
});
