use core::fmt;

use crate::constants::{
    GROUP_ELEMENT_BYTES, MAX_SIGMA_DEPTH, SIGMA_OP_AND, SIGMA_OP_FALSE, SIGMA_OP_OR,
    SIGMA_OP_PROVE_DH_TUPLE, SIGMA_OP_PROVE_DLOG, SIGMA_OP_THRESHOLD, SIGMA_OP_TRUE,
};
use crate::error::TxError;
use crate::vlq::{encode_vlq, read_vlq_u16};
use crate::wire_read::Reader;

/// A compressed secp256k1 point. Only the encoding is checked here; curve
/// membership is the proving layer's concern.
///
/// Built only through [`EcPoint::new`], so every value has an encoding the
/// decoder accepts.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EcPoint([u8; GROUP_ELEMENT_BYTES]);

impl EcPoint {
    pub const IDENTITY: EcPoint = EcPoint([0u8; GROUP_ELEMENT_BYTES]);

    pub fn new(bytes: [u8; GROUP_ELEMENT_BYTES]) -> Result<Self, TxError> {
        match bytes[0] {
            0x02 | 0x03 => Ok(Self(bytes)),
            0x00 if bytes == [0u8; GROUP_ELEMENT_BYTES] => Ok(Self(bytes)),
            _ => Err(TxError::parse("invalid group element encoding")),
        }
    }

    /// Point with x coordinate `x` and an even y.
    pub fn from_even_x(x: &[u8; GROUP_ELEMENT_BYTES - 1]) -> Self {
        let mut bytes = [0x02; GROUP_ELEMENT_BYTES];
        bytes[1..].copy_from_slice(x);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; GROUP_ELEMENT_BYTES] {
        &self.0
    }
}

impl fmt::Debug for EcPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcPoint({})", hex::encode(self.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProveDlog {
    pub h: EcPoint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProveDhTuple {
    pub g: EcPoint,
    pub h: EcPoint,
    pub u: EcPoint,
    pub v: EcPoint,
}

/// The provable proposition an input's script reduces to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SigmaBoolean {
    TrivialProp(bool),
    ProveDlog(ProveDlog),
    ProveDhTuple(ProveDhTuple),
    Cand(Vec<SigmaBoolean>),
    Cor(Vec<SigmaBoolean>),
    Cthreshold { k: u16, children: Vec<SigmaBoolean> },
}

impl SigmaBoolean {
    pub fn is_trivially_true(&self) -> bool {
        matches!(self, SigmaBoolean::TrivialProp(true))
    }
}

pub fn sigma_boolean_bytes(sb: &SigmaBoolean) -> Result<Vec<u8>, TxError> {
    let mut out = Vec::new();
    write_sigma_boolean(sb, &mut out)?;
    Ok(out)
}

/// Writes `sb`, refusing anything `parse_sigma_boolean_bytes` would reject.
pub fn write_sigma_boolean(sb: &SigmaBoolean, out: &mut Vec<u8>) -> Result<(), TxError> {
    write_at_depth(sb, 0, out)
}

/// Checks the decoder's structural rules without encoding.
pub fn check_sigma_boolean(sb: &SigmaBoolean) -> Result<(), TxError> {
    check_at_depth(sb, 0)
}

fn check_at_depth(sb: &SigmaBoolean, depth: usize) -> Result<(), TxError> {
    if depth > MAX_SIGMA_DEPTH {
        return Err(TxError::parse("sigma boolean nesting too deep"));
    }
    let children = match sb {
        SigmaBoolean::TrivialProp(_)
        | SigmaBoolean::ProveDlog(_)
        | SigmaBoolean::ProveDhTuple(_) => return Ok(()),
        SigmaBoolean::Cand(c) | SigmaBoolean::Cor(c) => c,
        SigmaBoolean::Cthreshold { k, children } => {
            if usize::from(*k) > children.len() {
                return Err(TxError::parse("threshold exceeds child count"));
            }
            children
        }
    };
    if u16::try_from(children.len()).is_err() {
        return Err(TxError::parse("sigma connective has too many children"));
    }
    children
        .iter()
        .try_for_each(|child| check_at_depth(child, depth + 1))
}

fn write_at_depth(sb: &SigmaBoolean, depth: usize, out: &mut Vec<u8>) -> Result<(), TxError> {
    if depth > MAX_SIGMA_DEPTH {
        return Err(TxError::parse("sigma boolean nesting too deep"));
    }
    match sb {
        SigmaBoolean::TrivialProp(false) => out.push(SIGMA_OP_FALSE),
        SigmaBoolean::TrivialProp(true) => out.push(SIGMA_OP_TRUE),
        SigmaBoolean::ProveDlog(p) => {
            out.push(SIGMA_OP_PROVE_DLOG);
            out.extend_from_slice(&p.h.0);
        }
        SigmaBoolean::ProveDhTuple(p) => {
            out.push(SIGMA_OP_PROVE_DH_TUPLE);
            for point in [&p.g, &p.h, &p.u, &p.v] {
                out.extend_from_slice(&point.0);
            }
        }
        SigmaBoolean::Cand(children) => {
            out.push(SIGMA_OP_AND);
            write_children(children, depth, out)?;
        }
        SigmaBoolean::Cor(children) => {
            out.push(SIGMA_OP_OR);
            write_children(children, depth, out)?;
        }
        SigmaBoolean::Cthreshold { k, children } => {
            if usize::from(*k) > children.len() {
                return Err(TxError::parse("threshold exceeds child count"));
            }
            out.push(SIGMA_OP_THRESHOLD);
            encode_vlq(u64::from(*k), out);
            write_children(children, depth, out)?;
        }
    }
    Ok(())
}

fn write_children(
    children: &[SigmaBoolean],
    depth: usize,
    out: &mut Vec<u8>,
) -> Result<(), TxError> {
    let n = u16::try_from(children.len())
        .map_err(|_| TxError::parse("sigma connective has too many children"))?;
    encode_vlq(u64::from(n), out);
    for child in children {
        write_at_depth(child, depth + 1, out)?;
    }
    Ok(())
}

pub fn parse_sigma_boolean_bytes(b: &[u8]) -> Result<SigmaBoolean, TxError> {
    let mut r = Reader::new(b);
    let sb = read_sigma_boolean(&mut r)?;
    r.finish()?;
    Ok(sb)
}

pub(crate) fn read_sigma_boolean(r: &mut Reader<'_>) -> Result<SigmaBoolean, TxError> {
    read_at_depth(r, 0)
}

fn read_point(r: &mut Reader<'_>) -> Result<EcPoint, TxError> {
    EcPoint::new(r.read_array::<GROUP_ELEMENT_BYTES>()?)
}

fn read_at_depth(r: &mut Reader<'_>, depth: usize) -> Result<SigmaBoolean, TxError> {
    if depth > MAX_SIGMA_DEPTH {
        return Err(TxError::parse("sigma boolean nesting too deep"));
    }
    let op = r.read_u8()?;
    let sb = match op {
        SIGMA_OP_FALSE => SigmaBoolean::TrivialProp(false),
        SIGMA_OP_TRUE => SigmaBoolean::TrivialProp(true),
        SIGMA_OP_PROVE_DLOG => SigmaBoolean::ProveDlog(ProveDlog { h: read_point(r)? }),
        SIGMA_OP_PROVE_DH_TUPLE => SigmaBoolean::ProveDhTuple(ProveDhTuple {
            g: read_point(r)?,
            h: read_point(r)?,
            u: read_point(r)?,
            v: read_point(r)?,
        }),
        SIGMA_OP_AND => SigmaBoolean::Cand(read_children(r, depth)?),
        SIGMA_OP_OR => SigmaBoolean::Cor(read_children(r, depth)?),
        SIGMA_OP_THRESHOLD => {
            let k = read_vlq_u16(r)?;
            let children = read_children(r, depth)?;
            if usize::from(k) > children.len() {
                return Err(TxError::parse("threshold exceeds child count"));
            }
            SigmaBoolean::Cthreshold { k, children }
        }
        _ => return Err(TxError::parse("unknown sigma boolean opcode")),
    };
    Ok(sb)
}

fn read_children(r: &mut Reader<'_>, depth: usize) -> Result<Vec<SigmaBoolean>, TxError> {
    let n = read_vlq_u16(r)?;
    // Each child takes at least one byte.
    if usize::from(n) > r.remaining() {
        return Err(TxError::parse("sigma child count exceeds input"));
    }
    let mut children = Vec::with_capacity(usize::from(n));
    for _ in 0..n {
        children.push(read_at_depth(r, depth + 1)?);
    }
    Ok(children)
}
