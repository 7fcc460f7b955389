use std::collections::BTreeMap;

use crate::constants::{MAX_HEADERS_IN_CONTEXT, STATE_DIGEST_BYTES};
use crate::error::TxError;
use crate::params::VersionContext;
use crate::sigma::EcPoint;
use crate::tx::{Constant, ContextExtension, ErgoBox, UnsignedTransaction};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    pub id: [u8; 32],
    pub version: u8,
    pub parent_id: [u8; 32],
    pub height: u32,
    pub timestamp: u64,
    pub n_bits: u64,
    pub state_root: [u8; STATE_DIGEST_BYTES],
    pub miner_pk: EcPoint,
}

/// Fields of the block being assembled that are known before it is mined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreHeader {
    pub version: u8,
    pub parent_id: [u8; 32],
    pub height: u32,
    pub timestamp: u64,
    pub n_bits: u64,
    pub miner_pk: EcPoint,
    pub votes: [u8; 3],
}

/// Read-only snapshot of the chain the transaction is reduced against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateContext {
    last_headers: Vec<BlockHeader>,
    pre_header: PreHeader,
    previous_state_digest: [u8; STATE_DIGEST_BYTES],
}

impl StateContext {
    pub fn new(
        last_headers: Vec<BlockHeader>,
        pre_header: PreHeader,
        previous_state_digest: [u8; STATE_DIGEST_BYTES],
    ) -> Result<Self, TxError> {
        if last_headers.len() > MAX_HEADERS_IN_CONTEXT {
            return Err(TxError::StructuralMismatch(format!(
                "state context holds {} headers, at most {MAX_HEADERS_IN_CONTEXT} allowed",
                last_headers.len()
            )));
        }
        Ok(Self {
            last_headers,
            pre_header,
            previous_state_digest,
        })
    }

    /// Most recent first.
    pub fn last_headers(&self) -> &[BlockHeader] {
        &self.last_headers
    }

    pub fn pre_header(&self) -> &PreHeader {
        &self.pre_header
    }

    pub fn previous_state_digest(&self) -> &[u8; STATE_DIGEST_BYTES] {
        &self.previous_state_digest
    }

    /// Script versions implied by the pre-header's block version.
    pub fn version_context(&self) -> Result<VersionContext, TxError> {
        VersionContext::for_block_version(self.pre_header.version)
    }
}

/// Named compile-time constants visible to a script.
pub type ScriptEnv = BTreeMap<String, Constant>;

/// Everything a script reducer may look at while reducing one input.
#[derive(Clone, Copy, Debug)]
pub struct ReductionContext<'a> {
    pub previous_state_digest: &'a [u8; STATE_DIGEST_BYTES],
    pub headers: &'a [BlockHeader],
    pub pre_header: &'a PreHeader,
    pub boxes_to_spend: &'a [ErgoBox],
    pub data_boxes: &'a [ErgoBox],
    pub spending_transaction: &'a UnsignedTransaction,
    pub self_index: usize,
    pub extension: &'a ContextExtension,
    pub versions: VersionContext,
    pub cost_limit: u64,
    /// Running cost when this input's reduction starts; the reducer must
    /// report a total that includes it.
    pub init_cost: u64,
}

impl<'a> ReductionContext<'a> {
    pub fn self_box(&self) -> Option<&'a ErgoBox> {
        self.boxes_to_spend.get(self.self_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(height: u32) -> BlockHeader {
        BlockHeader {
            id: [height as u8; 32],
            version: 3,
            parent_id: [0u8; 32],
            height,
            timestamp: 0,
            n_bits: 0,
            state_root: [0u8; STATE_DIGEST_BYTES],
            miner_pk: EcPoint::IDENTITY,
        }
    }

    fn pre_header() -> PreHeader {
        PreHeader {
            version: 3,
            parent_id: [0u8; 32],
            height: 20,
            timestamp: 0,
            n_bits: 0,
            miner_pk: EcPoint::IDENTITY,
            votes: [0; 3],
        }
    }

    #[test]
    fn header_count_bounded() {
        let full: Vec<_> = (0..MAX_HEADERS_IN_CONTEXT as u32).rev().map(header).collect();
        let ctx = StateContext::new(full.clone(), pre_header(), [1u8; STATE_DIGEST_BYTES]).unwrap();
        assert_eq!(ctx.last_headers(), &full[..]);
        assert_eq!(ctx.pre_header().height, 20);
        assert_eq!(ctx.previous_state_digest(), &[1u8; STATE_DIGEST_BYTES]);
        assert_eq!(ctx.version_context().unwrap().activated_script_version, 2);

        let mut over = full;
        over.push(header(99));
        let err = StateContext::new(over, pre_header(), [0u8; STATE_DIGEST_BYTES]).unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::TxErrStructuralMismatch);
    }
}
