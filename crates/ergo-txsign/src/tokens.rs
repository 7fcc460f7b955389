use core::fmt;

use indexmap::IndexMap;

use crate::constants::TOKEN_ID_BYTES;
use crate::error::TxError;
use crate::tx::{BoxId, ErgoBox, ErgoBoxCandidate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub [u8; TOKEN_ID_BYTES]);

impl TokenId {
    pub fn as_bytes(&self) -> &[u8; TOKEN_ID_BYTES] {
        &self.0
    }
}

impl From<BoxId> for TokenId {
    fn from(id: BoxId) -> Self {
        TokenId(id.0)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub id: TokenId,
    pub amount: u64,
}

impl Token {
    pub fn new(id: TokenId, amount: u64) -> Self {
        Self { id, amount }
    }
}

/// Net per-token amounts, in first-seen order.
pub type TokenAmounts = IndexMap<TokenId, i128>;

/// Per-token deltas attached to a token balance failure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenDelta(pub Vec<(TokenId, i128)>);

impl TokenDelta {
    fn from_amounts(m: &TokenAmounts) -> Self {
        TokenDelta(m.iter().map(|(id, v)| (*id, *v)).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TokenDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, (id, amount)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}: {amount:+}")?;
        }
        f.write_str("]")
    }
}

/// Tokens (and amounts) the caller explicitly allows the transaction to destroy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BurnRequest {
    pub tokens: Vec<Token>,
}

impl BurnRequest {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn accumulate<'a>(
    acc: &mut TokenAmounts,
    tokens: impl IntoIterator<Item = &'a Token>,
) -> Result<(), TxError> {
    for t in tokens {
        let slot = acc.entry(t.id).or_insert(0);
        *slot = slot
            .checked_add(i128::from(t.amount))
            .ok_or_else(|| TxError::StructuralMismatch("token amount overflow".into()))?;
    }
    Ok(())
}

pub fn sum_box_tokens(boxes: &[ErgoBox]) -> Result<TokenAmounts, TxError> {
    let mut acc = TokenAmounts::new();
    for b in boxes {
        accumulate(&mut acc, &b.candidate.tokens)?;
    }
    Ok(acc)
}

pub fn sum_candidate_tokens(candidates: &[ErgoBoxCandidate]) -> Result<TokenAmounts, TxError> {
    let mut acc = TokenAmounts::new();
    for c in candidates {
        accumulate(&mut acc, &c.tokens)?;
    }
    Ok(acc)
}

/// `a - b` per token, dropping entries that cancel out.
pub fn subtract_tokens(a: &TokenAmounts, b: &TokenAmounts) -> TokenAmounts {
    let mut out = TokenAmounts::new();
    for (id, v) in a {
        let rhs = b.get(id).copied().unwrap_or(0);
        out.insert(*id, v - rhs);
    }
    for (id, v) in b {
        if !a.contains_key(id) {
            out.insert(*id, -v);
        }
    }
    out.retain(|_, v| *v != 0);
    out
}

/// Enforces token conservation between the spent boxes and the outputs.
///
/// Burning needs a matching `burn` request; minting is limited to one token
/// whose id equals the id of the first spent box.
pub fn validate_token_balance(
    boxes_to_spend: &[ErgoBox],
    outputs: &[ErgoBoxCandidate],
    burn: Option<&BurnRequest>,
) -> Result<(), TxError> {
    let input_tokens = sum_box_tokens(boxes_to_spend)?;
    let output_tokens = sum_candidate_tokens(outputs)?;
    let first_input = boxes_to_spend.first().map(|b| b.box_id);
    check_token_balance(&input_tokens, &output_tokens, first_input, burn)
}

pub fn check_token_balance(
    input_tokens: &TokenAmounts,
    output_tokens: &TokenAmounts,
    first_input: Option<BoxId>,
    burn: Option<&BurnRequest>,
) -> Result<(), TxError> {
    let diff = subtract_tokens(output_tokens, input_tokens);
    if diff.is_empty() {
        return Ok(());
    }

    let (to_burn, to_mint): (TokenAmounts, TokenAmounts) =
        diff.iter().map(|(id, v)| (*id, *v)).partition(|(_, v)| *v < 0);

    if !to_burn.is_empty() {
        let Some(request) = burn.filter(|r| !r.is_empty()) else {
            log::debug!("token burn without a burn request: {:?}", to_burn);
            return Err(TxError::TokenBalance {
                msg: "burn not requested",
                diff: TokenDelta::from_amounts(&to_burn),
            });
        };
        let mut requested = TokenAmounts::new();
        accumulate(&mut requested, &request.tokens)?;
        let burned: TokenAmounts = to_burn.iter().map(|(id, v)| (*id, -v)).collect();
        let mismatch = subtract_tokens(&burned, &requested);
        if !mismatch.is_empty() {
            log::debug!("token burn differs from request: {:?}", mismatch);
            return Err(TxError::TokenBalance {
                msg: "tried to burn un-requested amount/token",
                diff: TokenDelta::from_amounts(&mismatch),
            });
        }
    }

    if !to_mint.is_empty() {
        if to_mint.len() > 1 {
            return Err(TxError::TokenBalance {
                msg: "only one token can be minted per transaction",
                diff: TokenDelta::from_amounts(&to_mint),
            });
        }
        let minted = to_mint.keys().next().copied();
        if minted.is_none() || minted != first_input.map(TokenId::from) {
            return Err(TxError::TokenBalance {
                msg: "minted token id must equal the first input box id",
                diff: TokenDelta::from_amounts(&to_mint),
            });
        }
    }

    Ok(())
}
