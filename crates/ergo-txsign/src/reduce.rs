use indexmap::IndexSet;

use crate::capability::{ReductionResult, ScriptReducer};
use crate::constants::INTERPRETER_INIT_COST;
use crate::context::{ReductionContext, ScriptEnv, StateContext};
use crate::cost::{add_cost_limited, mul_cost, CostAccumulator};
use crate::error::TxError;
use crate::params::BlockParameters;
use crate::sigma::check_sigma_boolean;
use crate::tokens::{validate_token_balance, BurnRequest, Token, TokenId};
use crate::tx::{ContextExtension, ErgoBox, ErgoBoxCandidate, UnsignedTransaction};

/// One input's reduced proposition, the cumulative cost reported after it,
/// and the extension that travels with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReducedInputData {
    pub reduction_result: ReductionResult,
    pub extension: ContextExtension,
}

/// An unsigned transaction whose inputs have all been reduced. Can be moved
/// to an offline signer and signed there without chain state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReducedTransaction {
    unsigned_tx: UnsignedTransaction,
    reduced_inputs: Vec<ReducedInputData>,
    cost: u32,
}

impl ReducedTransaction {
    /// Requires one reduced input per transaction input, each carrying that
    /// input's extension and a proposition the codec can write back.
    pub fn new(
        unsigned_tx: UnsignedTransaction,
        reduced_inputs: Vec<ReducedInputData>,
        cost: u32,
    ) -> Result<Self, TxError> {
        if reduced_inputs.len() != unsigned_tx.inputs.len() {
            return Err(TxError::StructuralMismatch(format!(
                "{} reduced inputs for {} transaction inputs",
                reduced_inputs.len(),
                unsigned_tx.inputs.len()
            )));
        }
        for (i, (ri, input)) in reduced_inputs.iter().zip(&unsigned_tx.inputs).enumerate() {
            if ri.extension != input.extension {
                return Err(TxError::StructuralMismatch(format!(
                    "reduced input {i} extension differs from transaction input"
                )));
            }
            check_sigma_boolean(&ri.reduction_result.value).map_err(|e| {
                TxError::StructuralMismatch(format!("reduced input {i} proposition: {e}"))
            })?;
        }
        Ok(Self {
            unsigned_tx,
            reduced_inputs,
            cost,
        })
    }

    pub fn unsigned_tx(&self) -> &UnsignedTransaction {
        &self.unsigned_tx
    }

    pub fn reduced_inputs(&self) -> &[ReducedInputData] {
        &self.reduced_inputs
    }

    /// Cost of the reduction, relative to the base cost it started from.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn bytes_to_sign(&self) -> Result<Vec<u8>, TxError> {
        self.unsigned_tx.bytes_to_sign()
    }
}

/// Fixed setup cost: interpreter init plus per-input, per-data-input and
/// per-output charges.
pub fn init_cost(params: &BlockParameters, tx: &UnsignedTransaction) -> Result<u64, TxError> {
    let mut cost = INTERPRETER_INIT_COST;
    for (count, unit) in [
        (tx.inputs.len(), params.input_cost),
        (tx.data_inputs.len(), params.data_input_cost),
        (tx.output_candidates.len(), params.output_cost),
    ] {
        cost = add_cost_limited(cost, mul_cost(count, unit)?, u64::MAX)?;
    }
    Ok(cost)
}

/// Charge for touching tokens: every token entry in the spent boxes and the
/// outputs, plus every distinct token id on each side.
pub fn token_access_cost(
    params: &BlockParameters,
    boxes_to_spend: &[ErgoBox],
    outputs: &[ErgoBoxCandidate],
) -> Result<u64, TxError> {
    fn side<'a>(tokens: impl Iterator<Item = &'a Token>) -> (usize, usize) {
        let mut entries = 0usize;
        let mut distinct: IndexSet<TokenId> = IndexSet::new();
        for t in tokens {
            entries += 1;
            distinct.insert(t.id);
        }
        (entries, distinct.len())
    }

    let (in_entries, in_distinct) = side(boxes_to_spend.iter().flat_map(|b| b.tokens()));
    let (out_entries, out_distinct) = side(outputs.iter().flat_map(|c| c.tokens.iter()));
    let unit = params.token_access_cost;

    let entries = mul_cost(in_entries + out_entries, unit)?;
    let distinct = mul_cost(in_distinct + out_distinct, unit)?;
    add_cost_limited(entries, distinct, u64::MAX)
}

fn check_inputs_match(
    tx: &UnsignedTransaction,
    boxes_to_spend: &[ErgoBox],
    data_boxes: &[ErgoBox],
) -> Result<(), TxError> {
    if tx.inputs.len() != boxes_to_spend.len() {
        return Err(TxError::StructuralMismatch(format!(
            "{} inputs but {} boxes to spend",
            tx.inputs.len(),
            boxes_to_spend.len()
        )));
    }
    if tx.data_inputs.len() != data_boxes.len() {
        return Err(TxError::StructuralMismatch(format!(
            "{} data inputs but {} data boxes",
            tx.data_inputs.len(),
            data_boxes.len()
        )));
    }
    for (i, (input, b)) in tx.inputs.iter().zip(boxes_to_spend).enumerate() {
        if input.box_id != b.box_id {
            return Err(TxError::StructuralMismatch(format!(
                "input {i} refers to box {} but box {} was supplied",
                input.box_id, b.box_id
            )));
        }
    }
    for (i, (di, b)) in tx.data_inputs.iter().zip(data_boxes).enumerate() {
        if di.box_id != b.box_id {
            return Err(TxError::StructuralMismatch(format!(
                "data input {i} refers to box {} but box {} was supplied",
                di.box_id, b.box_id
            )));
        }
    }
    Ok(())
}

/// Reduces every input script of a transaction to a sigma proposition under
/// the block cost limit.
pub struct TransactionReducer<R> {
    params: BlockParameters,
    reducer: R,
    env: ScriptEnv,
}

impl<R: ScriptReducer> TransactionReducer<R> {
    pub fn new(params: BlockParameters, reducer: R) -> Self {
        Self {
            params,
            reducer,
            env: ScriptEnv::new(),
        }
    }

    pub fn with_env(mut self, env: ScriptEnv) -> Self {
        self.env = env;
        self
    }

    pub fn params(&self) -> &BlockParameters {
        &self.params
    }

    /// Inputs are reduced strictly in order. Each input's context starts at
    /// the running cost, and the cost the reducer reports replaces it.
    pub fn reduce(
        &self,
        unsigned_tx: &UnsignedTransaction,
        boxes_to_spend: &[ErgoBox],
        data_boxes: &[ErgoBox],
        state_ctx: &StateContext,
        base_cost: u64,
        burn: Option<&BurnRequest>,
    ) -> Result<ReducedTransaction, TxError> {
        log::trace!(
            "reduce: {} inputs, {} data inputs, {} outputs, base cost {base_cost}",
            unsigned_tx.inputs.len(),
            unsigned_tx.data_inputs.len(),
            unsigned_tx.output_candidates.len()
        );
        check_inputs_match(unsigned_tx, boxes_to_spend, data_boxes)?;
        validate_token_balance(boxes_to_spend, &unsigned_tx.output_candidates, burn)?;
        let versions = state_ctx.version_context()?;

        let limit = self.params.max_block_cost;
        let mut acc = CostAccumulator::new(base_cost, limit)?;
        acc.add(init_cost(&self.params, unsigned_tx)?)?;
        acc.add(token_access_cost(
            &self.params,
            boxes_to_spend,
            &unsigned_tx.output_candidates,
        )?)?;

        let mut reduced_inputs = Vec::with_capacity(unsigned_tx.inputs.len());
        for (index, (input, input_box)) in unsigned_tx.inputs.iter().zip(boxes_to_spend).enumerate()
        {
            let ctx = ReductionContext {
                previous_state_digest: state_ctx.previous_state_digest(),
                headers: state_ctx.last_headers(),
                pre_header: state_ctx.pre_header(),
                boxes_to_spend,
                data_boxes,
                spending_transaction: unsigned_tx,
                self_index: index,
                extension: &input.extension,
                versions,
                cost_limit: limit,
                init_cost: acc.current(),
            };
            let result = self
                .reducer
                .reduce(&self.env, input_box.ergo_tree(), &ctx)?;
            check_sigma_boolean(&result.value).map_err(|e| TxError::ScriptReduction {
                index,
                msg: e.to_string(),
            })?;
            acc.advance_to(result.cost)?;
            log::debug!("input {index} reduced, running cost {}", acc.current());
            reduced_inputs.push(ReducedInputData {
                reduction_result: result,
                extension: input.extension.clone(),
            });
        }

        let spent = acc.spent();
        let cost = u32::try_from(spent).map_err(|_| TxError::CostLimitExceeded {
            current: base_cost,
            delta: spent,
            limit: base_cost.saturating_add(u64::from(u32::MAX)),
        })?;
        ReducedTransaction::new(unsigned_tx.clone(), reduced_inputs, cost)
    }
}
