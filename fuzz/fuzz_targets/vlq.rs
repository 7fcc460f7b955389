#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok((n, nbytes)) = ergo_txsign::vlq::read_vlq_bytes(data) else {
        return;
    };
    let prefix = &data[..nbytes];
    let mut enc = Vec::new();
    ergo_txsign::vlq::encode_vlq(n, &mut enc);
    if enc != prefix {
        panic!("non-minimal or mismatch: got={enc:02x?} want_prefix={prefix:02x?}");
    }
});
