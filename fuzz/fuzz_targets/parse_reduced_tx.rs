#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&bv, rest)) = data.split_first() else {
        return;
    };
    let Ok(reduced) = ergo_txsign::parse_reduced_tx_for_block_version(rest, bv) else {
        return;
    };
    let enc = ergo_txsign::serialize_reduced_tx(&reduced).expect("re-encode");
    assert_eq!(enc, rest, "reduced tx encoding not canonical");
});
