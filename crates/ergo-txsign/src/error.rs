use thiserror::Error;

use crate::tokens::TokenDelta;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    TxErrCostLimitExceeded,
    TxErrTokenBalance,
    TxErrStructuralMismatch,
    TxErrParse,
    TxErrScriptReduction,
    TxErrProving,
    TxErrParams,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::TxErrCostLimitExceeded => "TX_ERR_COST_LIMIT_EXCEEDED",
            ErrorCode::TxErrTokenBalance => "TX_ERR_TOKEN_BALANCE",
            ErrorCode::TxErrStructuralMismatch => "TX_ERR_STRUCTURAL_MISMATCH",
            ErrorCode::TxErrParse => "TX_ERR_PARSE",
            ErrorCode::TxErrScriptReduction => "TX_ERR_SCRIPT_REDUCTION",
            ErrorCode::TxErrProving => "TX_ERR_PROVING",
            ErrorCode::TxErrParams => "TX_ERR_PARAMS",
        }
    }
}

/// Every failure the reduce/sign/parse pipeline can report.
///
/// None of these are retried inside the crate; they always reach the caller of
/// the operation that produced them.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TxError {
    /// `current + delta` overflowed or exceeded `limit`.
    #[error("TX_ERR_COST_LIMIT_EXCEEDED: {current} + {delta} exceeds limit {limit}")]
    CostLimitExceeded { current: u64, delta: u64, limit: u64 },

    /// A per-item charge `count * unit` does not fit in a u64.
    #[error("TX_ERR_COST_LIMIT_EXCEEDED: {count} x {unit} overflows")]
    CostOverflow { count: u64, unit: u64 },

    #[error("TX_ERR_TOKEN_BALANCE: {msg}: {diff}")]
    TokenBalance { msg: &'static str, diff: TokenDelta },

    #[error("TX_ERR_STRUCTURAL_MISMATCH: {0}")]
    StructuralMismatch(String),

    #[error("TX_ERR_PARSE: {0}")]
    Parse(&'static str),

    #[error("TX_ERR_SCRIPT_REDUCTION: input {index}: {msg}")]
    ScriptReduction { index: usize, msg: String },

    #[error("TX_ERR_PROVING: input {index}: {msg}")]
    Proving { index: usize, msg: String },

    #[error("TX_ERR_PARAMS: {0}")]
    Params(String),
}

impl TxError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TxError::CostLimitExceeded { .. } | TxError::CostOverflow { .. } => {
                ErrorCode::TxErrCostLimitExceeded
            }
            TxError::TokenBalance { .. } => ErrorCode::TxErrTokenBalance,
            TxError::StructuralMismatch(_) => ErrorCode::TxErrStructuralMismatch,
            TxError::Parse(_) => ErrorCode::TxErrParse,
            TxError::ScriptReduction { .. } => ErrorCode::TxErrScriptReduction,
            TxError::Proving { .. } => ErrorCode::TxErrProving,
            TxError::Params(_) => ErrorCode::TxErrParams,
        }
    }

    pub(crate) fn parse(msg: &'static str) -> Self {
        TxError::Parse(msg)
    }
}
