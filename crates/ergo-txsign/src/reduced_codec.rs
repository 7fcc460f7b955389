//! Wire format of a reduced transaction:
//!
//! ```text
//! message_len  VLQ
//! message      bytes_to_sign of the unsigned transaction
//! per input    SigmaBoolean, VLQ u64 cumulative cost
//! total_cost   VLQ u32
//! ```
//!
//! The input count and the extensions are recovered from `message`.

use crate::capability::ReductionResult;
use crate::error::TxError;
use crate::params::VersionContext;
use crate::parse::parse_unsigned_tx;
use crate::reduce::{ReducedInputData, ReducedTransaction};
use crate::sigma::{read_sigma_boolean, write_sigma_boolean};
use crate::vlq::{encode_vlq, encode_vlq_bytes, read_vlq_len_bytes, read_vlq_u32, read_vlq_u64};
use crate::wire_read::Reader;

pub fn serialize_reduced_tx(reduced: &ReducedTransaction) -> Result<Vec<u8>, TxError> {
    let message = reduced.bytes_to_sign()?;
    let mut out = Vec::with_capacity(message.len() + 64);
    encode_vlq_bytes(&message, &mut out);
    for ri in reduced.reduced_inputs() {
        write_sigma_boolean(&ri.reduction_result.value, &mut out)?;
        encode_vlq(ri.reduction_result.cost, &mut out);
    }
    encode_vlq(u64::from(reduced.cost()), &mut out);
    Ok(out)
}

/// Decodes a reduced transaction. Trees inside the embedded message are
/// checked against `vc`.
pub fn parse_reduced_tx(b: &[u8], vc: &VersionContext) -> Result<ReducedTransaction, TxError> {
    let mut r = Reader::new(b);
    let message = read_vlq_len_bytes(&mut r)?;
    let unsigned_tx = parse_unsigned_tx(message, vc)?;

    let mut reduced_inputs = Vec::with_capacity(unsigned_tx.inputs.len());
    for input in &unsigned_tx.inputs {
        let value = read_sigma_boolean(&mut r)?;
        let cost = read_vlq_u64(&mut r)?;
        reduced_inputs.push(ReducedInputData {
            reduction_result: ReductionResult { value, cost },
            extension: input.extension.clone(),
        });
    }
    let cost = read_vlq_u32(&mut r)?;
    r.finish()?;

    ReducedTransaction::new(unsigned_tx, reduced_inputs, cost)
}

pub fn parse_reduced_tx_for_block_version(
    b: &[u8],
    block_version: u8,
) -> Result<ReducedTransaction, TxError> {
    let vc = VersionContext::for_block_version(block_version)?;
    parse_reduced_tx(b, &vc)
}
