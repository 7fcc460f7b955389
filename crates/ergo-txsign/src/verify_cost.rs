use crate::capability::VerificationCostEstimator;
use crate::constants::{
    PROVE_DH_TUPLE_VERIFY_COST, PROVE_DLOG_VERIFY_COST, SIGMA_CHILD_VERIFY_COST,
    SIGMA_NODE_VERIFY_COST,
};
use crate::cost::{add_cost_limited, mul_cost};
use crate::error::TxError;
use crate::sigma::SigmaBoolean;

/// Estimates verification cost from the proposition's shape alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SigmaVerificationCost;

impl VerificationCostEstimator for SigmaVerificationCost {
    fn estimate(&self, proposition: &SigmaBoolean) -> Result<u64, TxError> {
        estimate_verification_cost(proposition)
    }
}

pub fn estimate_verification_cost(sb: &SigmaBoolean) -> Result<u64, TxError> {
    match sb {
        SigmaBoolean::TrivialProp(_) => Ok(0),
        SigmaBoolean::ProveDlog(_) => Ok(PROVE_DLOG_VERIFY_COST),
        SigmaBoolean::ProveDhTuple(_) => Ok(PROVE_DH_TUPLE_VERIFY_COST),
        SigmaBoolean::Cand(children) | SigmaBoolean::Cor(children) => connective_cost(children),
        SigmaBoolean::Cthreshold { children, .. } => connective_cost(children),
    }
}

fn connective_cost(children: &[SigmaBoolean]) -> Result<u64, TxError> {
    let per_child = mul_cost(children.len(), SIGMA_CHILD_VERIFY_COST)?;
    let mut total = add_cost_limited(SIGMA_NODE_VERIFY_COST, per_child, u64::MAX)?;
    for child in children {
        total = add_cost_limited(total, estimate_verification_cost(child)?, u64::MAX)?;
    }
    Ok(total)
}
