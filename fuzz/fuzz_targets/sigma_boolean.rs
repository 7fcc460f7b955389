#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(sb) = ergo_txsign::sigma::parse_sigma_boolean_bytes(data) else {
        return;
    };
    let enc = ergo_txsign::sigma::sigma_boolean_bytes(&sb).expect("re-encode");
    assert_eq!(enc, data, "sigma boolean encoding not canonical");
    let _ = ergo_txsign::verify_cost::estimate_verification_cost(&sb);
});
