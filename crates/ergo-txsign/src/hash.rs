use sha3::{Digest, Sha3_256};

/// SHA3-256 over the concatenation of `parts`.
pub fn sha3_256_parts(parts: &[&[u8]]) -> [u8; 32] {
    let mut h = Sha3_256::new();
    for p in parts {
        h.update(p);
    }
    h.finalize().into()
}

pub fn sha3_256(b: &[u8]) -> [u8; 32] {
    sha3_256_parts(&[b])
}
