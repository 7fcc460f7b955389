#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&bv, rest)) = data.split_first() else {
        return;
    };
    let Ok(vc) = ergo_txsign::VersionContext::for_block_version(bv) else {
        return;
    };
    let Ok(tx) = ergo_txsign::parse_unsigned_tx(rest, &vc) else {
        return;
    };
    let enc = ergo_txsign::bytes_to_sign(&tx).expect("re-encode");
    assert_eq!(enc, rest, "unsigned tx encoding not canonical");
});
