use core::fmt;
use std::collections::BTreeMap;

use crate::constants::{
    BOX_ID_BYTES, ERGO_TREE_SIZE_FLAG, ERGO_TREE_VERSION_MASK, SIGMA_OP_PROVE_DLOG, TX_ID_BYTES,
};
use crate::error::TxError;
use crate::hash::{sha3_256, sha3_256_parts};
use crate::sigma::EcPoint;
use crate::tokens::Token;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(pub [u8; BOX_ID_BYTES]);

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TxId(pub [u8; TX_ID_BYTES]);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

// Body of a pay-to-public-key tree: SigmaProp constant holding ProveDlog.
pub const P2PK_BODY_PREFIX: [u8; 2] = [0x08, SIGMA_OP_PROVE_DLOG];

/// A spending script. The body is opaque to this crate; only the header's
/// version bits are interpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErgoTree {
    header: u8,
    body: Vec<u8>,
}

impl ErgoTree {
    pub fn new(version: u8, body: Vec<u8>) -> Result<Self, TxError> {
        if version > ERGO_TREE_VERSION_MASK {
            return Err(TxError::parse("ergo tree version out of range"));
        }
        Ok(Self {
            header: version | ERGO_TREE_SIZE_FLAG,
            body,
        })
    }

    pub(crate) fn from_parts(header: u8, body: Vec<u8>) -> Self {
        Self { header, body }
    }

    pub fn p2pk(pk: &EcPoint) -> Self {
        let mut body = Vec::with_capacity(P2PK_BODY_PREFIX.len() + pk.as_bytes().len());
        body.extend_from_slice(&P2PK_BODY_PREFIX);
        body.extend_from_slice(pk.as_bytes());
        Self {
            header: ERGO_TREE_SIZE_FLAG,
            body,
        }
    }

    pub fn header(&self) -> u8 {
        self.header
    }

    pub fn version(&self) -> u8 {
        self.header & ERGO_TREE_VERSION_MASK
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The public key of a pay-to-public-key tree.
    pub fn p2pk_key(&self) -> Option<EcPoint> {
        let rest = self.body.strip_prefix(&P2PK_BODY_PREFIX[..])?;
        let bytes: [u8; 33] = rest.try_into().ok()?;
        EcPoint::new(bytes).ok()
    }
}

/// An already-serialized typed constant (register value or context variable).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constant(pub Vec<u8>);

/// Context variables supplied by the spender of an input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContextExtension {
    pub values: BTreeMap<u8, Constant>,
}

impl ContextExtension {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErgoBoxCandidate {
    pub value: u64,
    pub ergo_tree: ErgoTree,
    pub creation_height: u32,
    pub tokens: Vec<Token>,
    /// R4..R9, densely packed from R4.
    pub registers: Vec<Constant>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErgoBox {
    pub box_id: BoxId,
    pub candidate: ErgoBoxCandidate,
    pub transaction_id: TxId,
    pub index: u16,
}

impl ErgoBox {
    /// Materialises output `index` of transaction `tx_id`.
    pub fn from_candidate(
        candidate: ErgoBoxCandidate,
        tx_id: TxId,
        index: u16,
    ) -> Result<Self, TxError> {
        let body = crate::encode::box_candidate_bytes(&candidate)?;
        let box_id = BoxId(sha3_256_parts(&[&body, &tx_id.0, &index.to_le_bytes()]));
        Ok(Self {
            box_id,
            candidate,
            transaction_id: tx_id,
            index,
        })
    }

    pub fn value(&self) -> u64 {
        self.candidate.value
    }

    pub fn ergo_tree(&self) -> &ErgoTree {
        &self.candidate.ergo_tree
    }

    pub fn tokens(&self) -> &[Token] {
        &self.candidate.tokens
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedInput {
    pub box_id: BoxId,
    pub extension: ContextExtension,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataInput {
    pub box_id: BoxId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProverResult {
    pub proof: Vec<u8>,
    pub extension: ContextExtension,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Input {
    pub box_id: BoxId,
    pub spending_proof: ProverResult,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub inputs: Vec<UnsignedInput>,
    pub data_inputs: Vec<DataInput>,
    pub output_candidates: Vec<ErgoBoxCandidate>,
}

impl UnsignedTransaction {
    /// The message every input's proof commits to.
    pub fn bytes_to_sign(&self) -> Result<Vec<u8>, TxError> {
        crate::encode::unsigned_tx_bytes(self)
    }

    pub fn id(&self) -> Result<TxId, TxError> {
        Ok(TxId(sha3_256(&self.bytes_to_sign()?)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    pub inputs: Vec<Input>,
    pub data_inputs: Vec<DataInput>,
    pub output_candidates: Vec<ErgoBoxCandidate>,
}

impl SignedTransaction {
    /// Same layout as the unsigned form, but with the spending proofs.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TxError> {
        crate::encode::signed_tx_bytes(self)
    }

    /// Proofs are not part of the id, so it matches the unsigned transaction's.
    pub fn id(&self) -> Result<TxId, TxError> {
        Ok(TxId(sha3_256(&crate::encode::bytes_to_sign_of_signed(
            self,
        )?)))
    }

    pub fn outputs(&self) -> Result<Vec<ErgoBox>, TxError> {
        let tx_id = self.id()?;
        self.output_candidates
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let index = u16::try_from(i)
                    .map_err(|_| TxError::StructuralMismatch("too many outputs".into()))?;
                ErgoBox::from_candidate(c.clone(), tx_id, index)
            })
            .collect()
    }
}
