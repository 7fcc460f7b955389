use std::collections::BTreeMap;

use crate::constants::{
    BOX_ID_BYTES, ERGO_TREE_SIZE_FLAG, ERGO_TREE_VERSION_MASK, MAX_REGISTERS, TOKEN_ID_BYTES,
};
use crate::encode::distinct_token_ids;
use crate::error::TxError;
use crate::params::VersionContext;
use crate::tokens::{Token, TokenId};
use crate::tx::{
    BoxId, Constant, ContextExtension, DataInput, ErgoBoxCandidate, ErgoTree, Input, ProverResult,
    SignedTransaction, UnsignedInput, UnsignedTransaction,
};
use crate::vlq::{read_vlq_len_bytes, read_vlq_u16, read_vlq_u32, read_vlq_u64};
use crate::wire_read::Reader;

pub fn parse_unsigned_tx(b: &[u8], vc: &VersionContext) -> Result<UnsignedTransaction, TxError> {
    let mut r = Reader::new(b);
    let tx = read_unsigned_tx(&mut r, vc)?;
    r.finish()?;
    Ok(tx)
}

pub fn parse_signed_tx(b: &[u8], vc: &VersionContext) -> Result<SignedTransaction, TxError> {
    let mut r = Reader::new(b);
    let (inputs, data_inputs, output_candidates) = read_tx_parts(&mut r, vc)?;
    r.finish()?;
    let inputs = inputs
        .into_iter()
        .map(|(box_id, proof, extension)| Input {
            box_id,
            spending_proof: ProverResult { proof, extension },
        })
        .collect();
    Ok(SignedTransaction {
        inputs,
        data_inputs,
        output_candidates,
    })
}

pub(crate) fn read_unsigned_tx(
    r: &mut Reader<'_>,
    vc: &VersionContext,
) -> Result<UnsignedTransaction, TxError> {
    let (inputs, data_inputs, output_candidates) = read_tx_parts(r, vc)?;
    let mut unsigned = Vec::with_capacity(inputs.len());
    for (box_id, proof, extension) in inputs {
        if !proof.is_empty() {
            return Err(TxError::parse("unsigned transaction input carries a proof"));
        }
        unsigned.push(UnsignedInput { box_id, extension });
    }
    Ok(UnsignedTransaction {
        inputs: unsigned,
        data_inputs,
        output_candidates,
    })
}

type RawInput = (BoxId, Vec<u8>, ContextExtension);

fn read_tx_parts(
    r: &mut Reader<'_>,
    vc: &VersionContext,
) -> Result<(Vec<RawInput>, Vec<DataInput>, Vec<ErgoBoxCandidate>), TxError> {
    let input_count = usize::from(read_vlq_u16(r)?);
    let mut inputs = Vec::with_capacity(input_count.min(r.remaining() / BOX_ID_BYTES));
    for _ in 0..input_count {
        let box_id = BoxId(r.read_array::<BOX_ID_BYTES>()?);
        let proof_len = usize::from(read_vlq_u16(r)?);
        let proof = r.read_bytes(proof_len)?.to_vec();
        let extension = read_extension(r)?;
        inputs.push((box_id, proof, extension));
    }

    let data_input_count = usize::from(read_vlq_u16(r)?);
    let mut data_inputs = Vec::with_capacity(data_input_count.min(r.remaining() / BOX_ID_BYTES));
    for _ in 0..data_input_count {
        data_inputs.push(DataInput {
            box_id: BoxId(r.read_array::<BOX_ID_BYTES>()?),
        });
    }

    let token_count = read_vlq_u32(r)? as usize;
    if token_count > r.remaining() / TOKEN_ID_BYTES {
        return Err(TxError::parse("token table exceeds input"));
    }
    let mut token_table = Vec::with_capacity(token_count);
    for _ in 0..token_count {
        token_table.push(TokenId(r.read_array::<TOKEN_ID_BYTES>()?));
    }

    let output_count = usize::from(read_vlq_u16(r)?);
    let mut outputs = Vec::with_capacity(output_count.min(r.remaining()));
    for _ in 0..output_count {
        outputs.push(read_candidate(r, &token_table, vc)?);
    }
    if !distinct_token_ids(&outputs).iter().eq(token_table.iter()) {
        return Err(TxError::parse("token table not canonical"));
    }

    Ok((inputs, data_inputs, outputs))
}

pub(crate) fn read_ergo_tree(r: &mut Reader<'_>, vc: &VersionContext) -> Result<ErgoTree, TxError> {
    let header = r.read_u8()?;
    if header & ERGO_TREE_SIZE_FLAG == 0 {
        return Err(TxError::parse("ergo tree without size flag"));
    }
    if !vc.accepts_tree_version(header & ERGO_TREE_VERSION_MASK) {
        return Err(TxError::parse("ergo tree version not activated"));
    }
    let body = read_vlq_len_bytes(r)?.to_vec();
    Ok(ErgoTree::from_parts(header, body))
}

pub(crate) fn read_extension(r: &mut Reader<'_>) -> Result<ContextExtension, TxError> {
    let n = r.read_u8()?;
    let mut values = BTreeMap::new();
    let mut prev: Option<u8> = None;
    for _ in 0..n {
        let key = r.read_u8()?;
        if prev.is_some_and(|p| key <= p) {
            return Err(TxError::parse("context extension keys not ascending"));
        }
        prev = Some(key);
        let value = read_vlq_len_bytes(r)?.to_vec();
        values.insert(key, Constant(value));
    }
    Ok(ContextExtension { values })
}

fn read_candidate(
    r: &mut Reader<'_>,
    token_table: &[TokenId],
    vc: &VersionContext,
) -> Result<ErgoBoxCandidate, TxError> {
    let value = read_vlq_u64(r)?;
    let ergo_tree = read_ergo_tree(r, vc)?;
    let creation_height = read_vlq_u32(r)?;

    let token_count = r.read_u8()?;
    let mut tokens = Vec::with_capacity(usize::from(token_count));
    for _ in 0..token_count {
        let idx = read_vlq_u32(r)? as usize;
        let id = *token_table
            .get(idx)
            .ok_or(TxError::parse("token index outside token table"))?;
        let amount = read_vlq_u64(r)?;
        tokens.push(Token { id, amount });
    }

    let register_count = usize::from(r.read_u8()?);
    if register_count > MAX_REGISTERS {
        return Err(TxError::parse("too many registers"));
    }
    let mut registers = Vec::with_capacity(register_count);
    for _ in 0..register_count {
        registers.push(Constant(read_vlq_len_bytes(r)?.to_vec()));
    }

    Ok(ErgoBoxCandidate {
        value,
        ergo_tree,
        creation_height,
        tokens,
        registers,
    })
}
