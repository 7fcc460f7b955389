use crate::capability::{
    HintsBag, Prover, ScriptReducer, SecretBag, VerificationCostEstimator,
};
use crate::context::StateContext;
use crate::cost::{add_cost_limited, CostAccumulator};
use crate::error::TxError;
use crate::params::BlockParameters;
use crate::reduce::{ReducedTransaction, TransactionReducer};
use crate::reduced_codec::parse_reduced_tx;
use crate::tokens::BurnRequest;
use crate::tx::{ErgoBox, Input, ProverResult, SignedTransaction, UnsignedTransaction};
use crate::verify_cost::SigmaVerificationCost;

/// Proves reduced transactions with a fixed set of secrets.
///
/// The signer holds no mutable state, so one instance may serve concurrent
/// sign calls; each call keeps its own cost accumulator.
pub struct TransactionSigner<'a, P, E = SigmaVerificationCost> {
    params: BlockParameters,
    prover: P,
    secrets: &'a SecretBag,
    estimator: E,
}

impl<'a, P: Prover> TransactionSigner<'a, P> {
    pub fn new(params: BlockParameters, prover: P, secrets: &'a SecretBag) -> Self {
        Self {
            params,
            prover,
            secrets,
            estimator: SigmaVerificationCost,
        }
    }
}

impl<'a, P: Prover, E: VerificationCostEstimator> TransactionSigner<'a, P, E> {
    pub fn with_estimator<E2: VerificationCostEstimator>(
        self,
        estimator: E2,
    ) -> TransactionSigner<'a, P, E2> {
        TransactionSigner {
            params: self.params,
            prover: self.prover,
            secrets: self.secrets,
            estimator,
        }
    }

    /// Proves every reduced input and returns the signed transaction with the
    /// verification cost added on top of `base_cost`.
    pub fn sign_reduced(
        &self,
        reduced: &ReducedTransaction,
        base_cost: u64,
        hints: &HintsBag,
    ) -> Result<(SignedTransaction, u64), TxError> {
        let unsigned = reduced.unsigned_tx();
        log::trace!(
            "sign: {} inputs, base cost {base_cost}",
            unsigned.inputs.len()
        );
        let message = reduced.bytes_to_sign()?;
        let mut acc = CostAccumulator::new(base_cost, self.params.max_block_cost)?;

        let mut inputs = Vec::with_capacity(unsigned.inputs.len());
        for (index, (input, ri)) in unsigned
            .inputs
            .iter()
            .zip(reduced.reduced_inputs())
            .enumerate()
        {
            let proposition = &ri.reduction_result.value;
            let proof = self
                .prover
                .prove(proposition, &message, self.secrets, hints)
                .map_err(|msg| TxError::Proving { index, msg })?;
            acc.add(self.estimator.estimate(proposition)?)?;
            log::debug!("input {index} signed, running cost {}", acc.current());
            inputs.push(Input {
                box_id: input.box_id,
                spending_proof: ProverResult {
                    proof,
                    extension: ri.extension.clone(),
                },
            });
        }

        let tx = SignedTransaction {
            inputs,
            data_inputs: unsigned.data_inputs.clone(),
            output_candidates: unsigned.output_candidates.clone(),
        };
        Ok((tx, acc.spent()))
    }

    /// Offline entry point: decodes a serialized reduced transaction under
    /// the configured `block_version` and signs it.
    pub fn sign_reduced_bytes(
        &self,
        bytes: &[u8],
        base_cost: u64,
        hints: &HintsBag,
    ) -> Result<(SignedTransaction, u64), TxError> {
        let reduced = parse_reduced_tx(bytes, &self.params.version_context()?)?;
        self.sign_reduced(&reduced, base_cost, hints)
    }

    /// Reduces then signs. The signing phase starts where reduction ended, so
    /// both phases share one budget; the returned cost is relative to
    /// `base_cost` and covers both.
    #[allow(clippy::too_many_arguments)]
    pub fn sign<R: ScriptReducer>(
        &self,
        reducer: &TransactionReducer<R>,
        unsigned_tx: &UnsignedTransaction,
        boxes_to_spend: &[ErgoBox],
        data_boxes: &[ErgoBox],
        state_ctx: &StateContext,
        base_cost: u64,
        burn: Option<&BurnRequest>,
        hints: &HintsBag,
    ) -> Result<(SignedTransaction, u64), TxError> {
        let reduced = reducer.reduce(
            unsigned_tx,
            boxes_to_spend,
            data_boxes,
            state_ctx,
            base_cost,
            burn,
        )?;
        let reduce_cost = u64::from(reduced.cost());
        let sign_base = add_cost_limited(base_cost, reduce_cost, self.params.max_block_cost)?;
        let (tx, sign_cost) = self.sign_reduced(&reduced, sign_base, hints)?;
        let total = add_cost_limited(reduce_cost, sign_cost, u64::MAX)?;
        Ok((tx, total))
    }
}
