pub mod capability;
pub mod constants;
pub mod context;
pub mod cost;
#[cfg(any(test, feature = "dev-std"))]
pub mod dev;
mod encode;
pub mod error;
mod hash;
pub mod params;
mod parse;
pub mod reduce;
pub mod reduced_codec;
pub mod sigma;
pub mod sign;
pub mod tokens;
pub mod tx;
pub mod verify_cost;
pub mod vlq;
mod wire_read;

pub use capability::{
    DhTupleSecret, DlogSecret, Hint, HintKind, HintsBag, PrivateInput, Prover, ReductionResult,
    ScriptReducer, SecretBag, VerificationCostEstimator,
};
pub use context::{BlockHeader, PreHeader, ReductionContext, ScriptEnv, StateContext};
pub use cost::{add_cost_limited, CostAccumulator};
pub use encode::{box_candidate_bytes, signed_tx_bytes, unsigned_tx_bytes as bytes_to_sign};
pub use error::{ErrorCode, TxError};
pub use params::{BlockParameters, VersionContext};
pub use parse::{parse_signed_tx, parse_unsigned_tx};
pub use reduce::{ReducedInputData, ReducedTransaction, TransactionReducer};
pub use reduced_codec::{parse_reduced_tx, parse_reduced_tx_for_block_version, serialize_reduced_tx};
pub use sigma::{EcPoint, ProveDhTuple, ProveDlog, SigmaBoolean};
pub use sign::TransactionSigner;
pub use tokens::{validate_token_balance, BurnRequest, Token, TokenDelta, TokenId};
pub use tx::{
    BoxId, Constant, ContextExtension, DataInput, ErgoBox, ErgoBoxCandidate, ErgoTree, Input,
    ProverResult, SignedTransaction, TxId, UnsignedInput, UnsignedTransaction,
};
pub use verify_cost::SigmaVerificationCost;

#[cfg(test)]
mod tests;
