use indexmap::IndexSet;

use crate::constants::{MAX_EXTENSION_ENTRIES, MAX_REGISTERS, MAX_TOKENS_PER_BOX};
use crate::error::TxError;
use crate::tokens::TokenId;
use crate::tx::{
    BoxId, ContextExtension, DataInput, ErgoBoxCandidate, ErgoTree, SignedTransaction,
    UnsignedTransaction,
};
use crate::vlq::{encode_vlq, encode_vlq_bytes};

const EMPTY_PROOF: &[u8] = &[];

fn count_u16(n: usize, what: &'static str) -> Result<u64, TxError> {
    u16::try_from(n)
        .map(u64::from)
        .map_err(|_| TxError::StructuralMismatch(format!("{what} count {n} exceeds u16 range")))
}

pub fn write_ergo_tree(tree: &ErgoTree, out: &mut Vec<u8>) {
    out.push(tree.header());
    encode_vlq_bytes(tree.body(), out);
}

pub fn write_extension(ext: &ContextExtension, out: &mut Vec<u8>) -> Result<(), TxError> {
    if ext.values.len() > MAX_EXTENSION_ENTRIES {
        return Err(TxError::StructuralMismatch(
            "context extension has too many entries".into(),
        ));
    }
    out.push(ext.values.len() as u8);
    // BTreeMap iteration is ascending by key, which is the wire order.
    for (key, value) in &ext.values {
        out.push(*key);
        encode_vlq_bytes(&value.0, out);
    }
    Ok(())
}

/// Output-referenced token ids in first-seen order; outputs refer to tokens by
/// index into this table.
pub fn distinct_token_ids(outputs: &[ErgoBoxCandidate]) -> IndexSet<TokenId> {
    let mut set = IndexSet::new();
    for output in outputs {
        for token in &output.tokens {
            set.insert(token.id);
        }
    }
    set
}

fn write_candidate(
    c: &ErgoBoxCandidate,
    token_table: Option<&IndexSet<TokenId>>,
    out: &mut Vec<u8>,
) -> Result<(), TxError> {
    encode_vlq(c.value, out);
    write_ergo_tree(&c.ergo_tree, out);
    encode_vlq(u64::from(c.creation_height), out);

    if c.tokens.len() > MAX_TOKENS_PER_BOX {
        return Err(TxError::StructuralMismatch(
            "box holds too many tokens".into(),
        ));
    }
    out.push(c.tokens.len() as u8);
    for token in &c.tokens {
        match token_table {
            Some(table) => {
                let idx = table.get_index_of(&token.id).ok_or_else(|| {
                    TxError::StructuralMismatch(format!("token {} not in table", token.id))
                })?;
                encode_vlq(idx as u64, out);
            }
            None => out.extend_from_slice(token.id.as_bytes()),
        }
        encode_vlq(token.amount, out);
    }

    if c.registers.len() > MAX_REGISTERS {
        return Err(TxError::StructuralMismatch(
            "box holds too many registers".into(),
        ));
    }
    out.push(c.registers.len() as u8);
    for reg in &c.registers {
        encode_vlq_bytes(&reg.0, out);
    }
    Ok(())
}

/// Standalone candidate bytes (token ids inline), used for box ids.
pub fn box_candidate_bytes(c: &ErgoBoxCandidate) -> Result<Vec<u8>, TxError> {
    let mut out = Vec::new();
    write_candidate(c, None, &mut out)?;
    Ok(out)
}

fn write_tx<'a>(
    inputs: impl ExactSizeIterator<Item = (&'a BoxId, &'a [u8], &'a ContextExtension)>,
    data_inputs: &[DataInput],
    outputs: &[ErgoBoxCandidate],
) -> Result<Vec<u8>, TxError> {
    let mut out = Vec::new();

    encode_vlq(count_u16(inputs.len(), "input")?, &mut out);
    for (box_id, proof, extension) in inputs {
        out.extend_from_slice(&box_id.0);
        let proof_len = count_u16(proof.len(), "proof byte")?;
        encode_vlq(proof_len, &mut out);
        out.extend_from_slice(proof);
        write_extension(extension, &mut out)?;
    }

    encode_vlq(count_u16(data_inputs.len(), "data input")?, &mut out);
    for di in data_inputs {
        out.extend_from_slice(&di.box_id.0);
    }

    let token_table = distinct_token_ids(outputs);
    encode_vlq(token_table.len() as u64, &mut out);
    for id in &token_table {
        out.extend_from_slice(id.as_bytes());
    }

    encode_vlq(count_u16(outputs.len(), "output")?, &mut out);
    for c in outputs {
        write_candidate(c, Some(&token_table), &mut out)?;
    }
    Ok(out)
}

pub fn unsigned_tx_bytes(tx: &UnsignedTransaction) -> Result<Vec<u8>, TxError> {
    write_tx(
        tx.inputs
            .iter()
            .map(|i| (&i.box_id, EMPTY_PROOF, &i.extension)),
        &tx.data_inputs,
        &tx.output_candidates,
    )
}

pub fn signed_tx_bytes(tx: &SignedTransaction) -> Result<Vec<u8>, TxError> {
    write_tx(
        tx.inputs.iter().map(|i| {
            (
                &i.box_id,
                i.spending_proof.proof.as_slice(),
                &i.spending_proof.extension,
            )
        }),
        &tx.data_inputs,
        &tx.output_candidates,
    )
}

/// Bytes of the signed transaction with every proof emptied: the message its
/// proofs were made over.
pub fn bytes_to_sign_of_signed(tx: &SignedTransaction) -> Result<Vec<u8>, TxError> {
    write_tx(
        tx.inputs
            .iter()
            .map(|i| (&i.box_id, EMPTY_PROOF, &i.spending_proof.extension)),
        &tx.data_inputs,
        &tx.output_candidates,
    )
}
