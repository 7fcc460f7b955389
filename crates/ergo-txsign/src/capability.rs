//! Narrow interfaces to the script interpreter and the sigma-protocol prover.
//!
//! Pipeline code depends only on these traits; the interpreter and the proof
//! system are supplied by the embedding application.

use core::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::context::{ReductionContext, ScriptEnv};
use crate::error::TxError;
use crate::sigma::{ProveDhTuple, ProveDlog, SigmaBoolean};
use crate::tx::ErgoTree;

/// A reduced proposition and the cumulative-inclusive cost after reducing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReductionResult {
    pub value: SigmaBoolean,
    pub cost: u64,
}

pub trait ScriptReducer {
    /// Reduces `tree` to a sigma proposition.
    ///
    /// `ctx.init_cost` is the running cost so far; the returned `cost` must
    /// include it. Fails with `TxError::CostLimitExceeded` once the total
    /// would pass `ctx.cost_limit`, at the latest before evaluation starts
    /// when the tree's complexity alone does not fit.
    fn reduce(
        &self,
        env: &ScriptEnv,
        tree: &ErgoTree,
        ctx: &ReductionContext<'_>,
    ) -> Result<ReductionResult, TxError>;
}

pub trait Prover {
    /// Produces the proof bytes for `proposition` over `message`.
    fn prove(
        &self,
        proposition: &SigmaBoolean,
        message: &[u8],
        secrets: &SecretBag,
        hints: &HintsBag,
    ) -> Result<Vec<u8>, String>;
}

pub trait VerificationCostEstimator {
    /// Cost of verifying a proof of `proposition`; depends only on its shape.
    fn estimate(&self, proposition: &SigmaBoolean) -> Result<u64, TxError>;
}

impl<T: ScriptReducer + ?Sized> ScriptReducer for &T {
    fn reduce(
        &self,
        env: &ScriptEnv,
        tree: &ErgoTree,
        ctx: &ReductionContext<'_>,
    ) -> Result<ReductionResult, TxError> {
        (**self).reduce(env, tree, ctx)
    }
}

impl<T: Prover + ?Sized> Prover for &T {
    fn prove(
        &self,
        proposition: &SigmaBoolean,
        message: &[u8],
        secrets: &SecretBag,
        hints: &HintsBag,
    ) -> Result<Vec<u8>, String> {
        (**self).prove(proposition, message, secrets, hints)
    }
}

impl<T: VerificationCostEstimator + ?Sized> VerificationCostEstimator for &T {
    fn estimate(&self, proposition: &SigmaBoolean) -> Result<u64, TxError> {
        (**self).estimate(proposition)
    }
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DlogSecret {
    w: [u8; 32],
    #[zeroize(skip)]
    image: ProveDlog,
}

impl DlogSecret {
    pub fn new(w: [u8; 32], image: ProveDlog) -> Self {
        Self { w, image }
    }

    pub fn secret_bytes(&self) -> &[u8; 32] {
        &self.w
    }

    pub fn image(&self) -> &ProveDlog {
        &self.image
    }
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DhTupleSecret {
    w: [u8; 32],
    #[zeroize(skip)]
    image: ProveDhTuple,
}

impl DhTupleSecret {
    pub fn new(w: [u8; 32], image: ProveDhTuple) -> Self {
        Self { w, image }
    }

    pub fn secret_bytes(&self) -> &[u8; 32] {
        &self.w
    }

    pub fn image(&self) -> &ProveDhTuple {
        &self.image
    }
}

#[derive(Clone)]
pub enum PrivateInput {
    Dlog(DlogSecret),
    DhTuple(DhTupleSecret),
}

/// Private key material held by a signer. Never serialized; `Debug` prints
/// only the number of secrets.
#[derive(Clone, Default)]
pub struct SecretBag {
    secrets: Vec<PrivateInput>,
}

impl SecretBag {
    pub fn new(secrets: Vec<PrivateInput>) -> Self {
        Self { secrets }
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    pub fn dlog_for(&self, image: &ProveDlog) -> Option<&DlogSecret> {
        self.secrets.iter().find_map(|s| match s {
            PrivateInput::Dlog(d) if d.image == *image => Some(d),
            _ => None,
        })
    }

    pub fn dh_tuple_for(&self, image: &ProveDhTuple) -> Option<&DhTupleSecret> {
        self.secrets.iter().find_map(|s| match s {
            PrivateInput::DhTuple(d) if d.image == *image => Some(d),
            _ => None,
        })
    }
}

impl fmt::Debug for SecretBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBag")
            .field("len", &self.secrets.len())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HintKind {
    RealCommitment,
    SimulatedCommitment,
    RealSecretProof,
    SimulatedSecretProof,
}

/// Non-secret material from other co-signers (commitments, partial proofs).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hint {
    pub image: SigmaBoolean,
    pub kind: HintKind,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HintsBag {
    pub hints: Vec<Hint>,
}

impl HintsBag {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn hints_for<'a>(&'a self, image: &'a SigmaBoolean) -> impl Iterator<Item = &'a Hint> {
        self.hints.iter().filter(move |h| h.image == *image)
    }
}
