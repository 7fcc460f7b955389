use crate::error::TxError;
use crate::wire_read::Reader;

// Unsigned LEB128: seven payload bits per byte, high bit set on every byte
// except the last. A u64 never needs more than ten bytes.
const MAX_VLQ_BYTES: usize = 10;

pub(crate) fn read_vlq(r: &mut Reader<'_>) -> Result<(u64, usize), TxError> {
    let start = r.offset();
    let mut v: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        let b = r.read_u8()?;
        if shift == 63 && (b & 0x7e) != 0 {
            return Err(TxError::parse("VLQ overflows u64"));
        }
        v |= u64::from(b & 0x7f) << shift;
        if b & 0x80 == 0 {
            if b == 0 && shift > 0 {
                return Err(TxError::parse("non-minimal VLQ"));
            }
            break;
        }
        shift += 7;
        if r.offset() - start >= MAX_VLQ_BYTES {
            return Err(TxError::parse("VLQ too long"));
        }
    }
    Ok((v, r.offset() - start))
}

pub(crate) fn read_vlq_u16(r: &mut Reader<'_>) -> Result<u16, TxError> {
    let (v, _) = read_vlq(r)?;
    u16::try_from(v).map_err(|_| TxError::parse("VLQ value out of u16 range"))
}

pub(crate) fn read_vlq_u32(r: &mut Reader<'_>) -> Result<u32, TxError> {
    let (v, _) = read_vlq(r)?;
    u32::try_from(v).map_err(|_| TxError::parse("VLQ value out of u32 range"))
}

pub(crate) fn read_vlq_u64(r: &mut Reader<'_>) -> Result<u64, TxError> {
    read_vlq(r).map(|(v, _)| v)
}

pub fn read_vlq_bytes(b: &[u8]) -> Result<(u64, usize), TxError> {
    let mut r = Reader::new(b);
    read_vlq(&mut r)
}

pub fn encode_vlq(mut n: u64, out: &mut Vec<u8>) {
    while n >= 0x80 {
        out.push((n as u8 & 0x7f) | 0x80);
        n >>= 7;
    }
    out.push(n as u8);
}

/// Length prefix followed by the raw bytes.
pub(crate) fn encode_vlq_bytes(b: &[u8], out: &mut Vec<u8>) {
    encode_vlq(b.len() as u64, out);
    out.extend_from_slice(b);
}

pub(crate) fn read_vlq_len_bytes<'a>(r: &mut Reader<'a>) -> Result<&'a [u8], TxError> {
    let (len, _) = read_vlq(r)?;
    if len > r.remaining() as u64 {
        return Err(TxError::parse("length prefix exceeds input"));
    }
    r.read_bytes(len as usize)
}

#[cfg(kani)]
mod verification {
    use super::*;

    /// Decoding never panics on short inputs.
    #[kani::proof]
    #[kani::unwind(12)]
    fn verify_read_vlq_no_panic() {
        let b: [u8; 11] = kani::any();
        let _ = read_vlq_bytes(&b);
    }
}
