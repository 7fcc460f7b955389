//! Deterministic stand-ins for the script interpreter and the prover.
//!
//! Trees are read as a constant sigma proposition (`0x08` followed by its
//! serialized form), which covers pay-to-public-key. Proofs are SHA3 digests
//! over the message, the proposition and the secrets used; they are not
//! sigma-protocol proofs.

use crate::capability::{
    DlogSecret, HintKind, HintsBag, Prover, ReductionResult, ScriptReducer, SecretBag,
};
use crate::context::{ReductionContext, ScriptEnv};
use crate::cost::add_cost_limited;
use crate::error::TxError;
use crate::hash::{sha3_256, sha3_256_parts};
use crate::sigma::{parse_sigma_boolean_bytes, sigma_boolean_bytes, EcPoint, ProveDlog, SigmaBoolean};
use crate::tx::ErgoTree;

const SIGMA_PROP_CONST_TAG: u8 = 0x08;
const DEV_PROOF_DOMAIN: &[u8] = b"ergo-txsign/dev-proof";

/// Tree whose body is the constant `prop`.
pub fn constant_tree(version: u8, prop: &SigmaBoolean) -> Result<ErgoTree, TxError> {
    let mut body = vec![SIGMA_PROP_CONST_TAG];
    body.extend_from_slice(&sigma_boolean_bytes(prop)?);
    ErgoTree::new(version, body)
}

/// Public image derived from `w`. Not a curve point.
pub fn dev_public_image(w: &[u8; 32]) -> EcPoint {
    EcPoint::from_even_x(&sha3_256(w))
}

pub fn dev_dlog_secret(w: [u8; 32]) -> DlogSecret {
    let h = dev_public_image(&w);
    DlogSecret::new(w, ProveDlog { h })
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DevScriptReducer {
    script_cost: u64,
}

impl DevScriptReducer {
    /// Each script charges `script_cost` on top of the context's init cost.
    pub fn new(script_cost: u64) -> Self {
        Self { script_cost }
    }
}

impl ScriptReducer for DevScriptReducer {
    fn reduce(
        &self,
        _env: &ScriptEnv,
        tree: &ErgoTree,
        ctx: &ReductionContext<'_>,
    ) -> Result<ReductionResult, TxError> {
        let cost = add_cost_limited(ctx.init_cost, self.script_cost, ctx.cost_limit)?;
        let value = match tree.body().split_first() {
            Some((&SIGMA_PROP_CONST_TAG, rest)) => {
                parse_sigma_boolean_bytes(rest).map_err(|e| TxError::ScriptReduction {
                    index: ctx.self_index,
                    msg: e.to_string(),
                })?
            }
            _ => {
                return Err(TxError::ScriptReduction {
                    index: ctx.self_index,
                    msg: "unsupported script".into(),
                })
            }
        };
        Ok(ReductionResult { value, cost })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DevProver;

impl DevProver {
    /// A leaf is proven by a local secret, or else by a co-signer's
    /// `RealSecretProof` hint for it.
    fn collect<'a>(
        sb: &'a SigmaBoolean,
        secrets: &'a SecretBag,
        hints: &'a HintsBag,
        used: &mut Vec<&'a [u8]>,
    ) -> bool {
        let local = match sb {
            SigmaBoolean::TrivialProp(b) => return *b,
            SigmaBoolean::ProveDlog(p) => secrets.dlog_for(p).map(|s| &s.secret_bytes()[..]),
            SigmaBoolean::ProveDhTuple(p) => {
                secrets.dh_tuple_for(p).map(|s| &s.secret_bytes()[..])
            }
            SigmaBoolean::Cand(children) => {
                return children
                    .iter()
                    .all(|c| Self::collect(c, secrets, hints, used))
            }
            SigmaBoolean::Cor(children) => {
                return Self::threshold(1, children, secrets, hints, used)
            }
            SigmaBoolean::Cthreshold { k, children } => {
                return Self::threshold(usize::from(*k), children, secrets, hints, used)
            }
        };
        let from_hint = || {
            hints
                .hints_for(sb)
                .find(|h| h.kind == HintKind::RealSecretProof)
                .map(|h| h.data.as_slice())
        };
        match local.or_else(from_hint) {
            Some(material) => {
                used.push(material);
                true
            }
            None => false,
        }
    }

    fn threshold<'a>(
        k: usize,
        children: &'a [SigmaBoolean],
        secrets: &'a SecretBag,
        hints: &'a HintsBag,
        used: &mut Vec<&'a [u8]>,
    ) -> bool {
        let mut proven = 0usize;
        for child in children {
            if proven == k {
                break;
            }
            let mark = used.len();
            if Self::collect(child, secrets, hints, used) {
                proven += 1;
            } else {
                used.truncate(mark);
            }
        }
        proven >= k
    }
}

impl Prover for DevProver {
    fn prove(
        &self,
        proposition: &SigmaBoolean,
        message: &[u8],
        secrets: &SecretBag,
        hints: &HintsBag,
    ) -> Result<Vec<u8>, String> {
        if proposition.is_trivially_true() {
            return Ok(Vec::new());
        }
        let mut used = Vec::new();
        if !Self::collect(proposition, secrets, hints, &mut used) {
            return Err("not enough secrets to prove proposition".into());
        }
        let prop_bytes = sigma_boolean_bytes(proposition).map_err(|e| e.to_string())?;
        let mut parts: Vec<&[u8]> = vec![DEV_PROOF_DOMAIN, message, prop_bytes.as_slice()];
        parts.extend(used);
        Ok(sha3_256_parts(&parts).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Hint, PrivateInput};

    #[test]
    fn p2pk_tree_reduces_to_prove_dlog() {
        let secret = dev_dlog_secret([7u8; 32]);
        let tree = ErgoTree::p2pk(&secret.image().h);
        let body = tree.body();
        assert_eq!(body[0], SIGMA_PROP_CONST_TAG);
        assert_eq!(
            parse_sigma_boolean_bytes(&body[1..]).unwrap(),
            SigmaBoolean::ProveDlog(*secret.image())
        );
    }

    #[test]
    fn prover_needs_matching_secret() {
        let secret = dev_dlog_secret([7u8; 32]);
        let prop = SigmaBoolean::ProveDlog(*secret.image());
        let empty = SecretBag::default();
        assert!(DevProver
            .prove(&prop, b"msg", &empty, &HintsBag::empty())
            .is_err());

        let bag = SecretBag::new(vec![PrivateInput::Dlog(secret)]);
        let a = DevProver.prove(&prop, b"msg", &bag, &HintsBag::empty()).unwrap();
        let b = DevProver.prove(&prop, b"msg", &bag, &HintsBag::empty()).unwrap();
        assert_eq!(a.len(), 32);
        assert_eq!(a, b);
        let c = DevProver.prove(&prop, b"other", &bag, &HintsBag::empty()).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn threshold_proven_with_k_secrets() {
        let s1 = dev_dlog_secret([1u8; 32]);
        let s2 = dev_dlog_secret([2u8; 32]);
        let s3 = dev_dlog_secret([3u8; 32]);
        let prop = SigmaBoolean::Cthreshold {
            k: 2,
            children: [&s1, &s2, &s3]
                .iter()
                .map(|s| SigmaBoolean::ProveDlog(*s.image()))
                .collect(),
        };
        let one = SecretBag::new(vec![PrivateInput::Dlog(s1.clone())]);
        assert!(DevProver
            .prove(&prop, b"m", &one, &HintsBag::empty())
            .is_err());
        let two = SecretBag::new(vec![PrivateInput::Dlog(s1), PrivateInput::Dlog(s3)]);
        assert!(DevProver
            .prove(&prop, b"m", &two, &HintsBag::empty())
            .is_ok());
    }

    #[test]
    fn trivial_true_has_empty_proof_and_false_fails() {
        let bag = SecretBag::default();
        assert_eq!(
            DevProver
                .prove(&SigmaBoolean::TrivialProp(true), b"m", &bag, &HintsBag::empty())
                .unwrap(),
            Vec::<u8>::new()
        );
        assert!(DevProver
            .prove(&SigmaBoolean::TrivialProp(false), b"m", &bag, &HintsBag::empty())
            .is_err());
    }

    #[test]
    fn co_signer_hint_stands_in_for_missing_secret() {
        let mine = dev_dlog_secret([1u8; 32]);
        let theirs = SigmaBoolean::ProveDlog(*dev_dlog_secret([2u8; 32]).image());
        let prop = SigmaBoolean::Cand(vec![SigmaBoolean::ProveDlog(*mine.image()), theirs.clone()]);
        let bag = SecretBag::new(vec![PrivateInput::Dlog(mine)]);
        assert!(DevProver
            .prove(&prop, b"m", &bag, &HintsBag::empty())
            .is_err());

        let hint = |kind, data: &[u8]| Hint {
            image: theirs.clone(),
            kind,
            data: data.to_vec(),
        };
        let commitment_only = HintsBag {
            hints: vec![hint(HintKind::RealCommitment, b"c")],
        };
        assert!(DevProver.prove(&prop, b"m", &bag, &commitment_only).is_err());

        let hints = HintsBag {
            hints: vec![
                hint(HintKind::RealCommitment, b"c"),
                hint(HintKind::RealSecretProof, b"partial"),
            ],
        };
        assert_eq!(hints.hints_for(&theirs).count(), 2);
        let a = DevProver.prove(&prop, b"m", &bag, &hints).unwrap();
        let other = HintsBag {
            hints: vec![hint(HintKind::RealSecretProof, b"other")],
        };
        let b = DevProver.prove(&prop, b"m", &bag, &other).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn secret_bag_debug_is_redacted() {
        let bag = SecretBag::new(vec![PrivateInput::Dlog(dev_dlog_secret([0xab; 32]))]);
        let s = format!("{bag:?}");
        assert_eq!(s, "SecretBag { len: 1 }");
    }
}
