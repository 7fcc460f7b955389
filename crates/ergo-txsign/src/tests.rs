use crate::capability::{DlogSecret, PrivateInput, SecretBag};
use crate::constants::*;
use crate::context::{PreHeader, StateContext};
use crate::dev::{constant_tree, dev_dlog_secret};
use crate::error::{ErrorCode, TxError};
use crate::params::VersionContext;
use crate::sigma::{EcPoint, SigmaBoolean};
use crate::tokens::{validate_token_balance, BurnRequest, Token, TokenId};
use crate::tx::{
    BoxId, Constant, ContextExtension, DataInput, ErgoBox, ErgoBoxCandidate, ErgoTree, Input,
    ProverResult, SignedTransaction, TxId, UnsignedInput, UnsignedTransaction,
};
use crate::vlq::{encode_vlq, read_vlq_bytes};
use crate::{bytes_to_sign, parse_signed_tx, parse_unsigned_tx, signed_tx_bytes};

pub(crate) fn secret(seed: u8) -> DlogSecret {
    dev_dlog_secret([seed; 32])
}

pub(crate) fn p2pk_tree(s: &DlogSecret) -> ErgoTree {
    ErgoTree::p2pk(&s.image().h)
}

pub(crate) fn true_tree() -> ErgoTree {
    constant_tree(0, &SigmaBoolean::TrivialProp(true)).unwrap()
}

pub(crate) fn candidate(value: u64, ergo_tree: ErgoTree, tokens: Vec<Token>) -> ErgoBoxCandidate {
    ErgoBoxCandidate {
        value,
        ergo_tree,
        creation_height: 100,
        tokens,
        registers: vec![],
    }
}

pub(crate) fn spendable(seed: u8, c: ErgoBoxCandidate) -> ErgoBox {
    ErgoBox::from_candidate(c, TxId([seed; 32]), 0).unwrap()
}

pub(crate) fn spend_all(boxes: &[ErgoBox], outputs: Vec<ErgoBoxCandidate>) -> UnsignedTransaction {
    UnsignedTransaction {
        inputs: boxes
            .iter()
            .map(|b| UnsignedInput {
                box_id: b.box_id,
                extension: ContextExtension::empty(),
            })
            .collect(),
        data_inputs: vec![],
        output_candidates: outputs,
    }
}

pub(crate) fn state_ctx(block_version: u8) -> StateContext {
    let pre_header = PreHeader {
        version: block_version,
        parent_id: [1u8; 32],
        height: 101,
        timestamp: 1_700_000_000_000,
        n_bits: 117_707_382,
        miner_pk: EcPoint::IDENTITY,
        votes: [0, 0, 0],
    };
    StateContext::new(vec![], pre_header, [0u8; STATE_DIGEST_BYTES]).unwrap()
}

pub(crate) fn bag(secrets: Vec<DlogSecret>) -> SecretBag {
    SecretBag::new(secrets.into_iter().map(PrivateInput::Dlog).collect())
}

fn token(b: u8, amount: u64) -> Token {
    Token::new(TokenId([b; 32]), amount)
}

fn ext(pairs: &[(u8, &[u8])]) -> ContextExtension {
    ContextExtension {
        values: pairs
            .iter()
            .map(|(k, v)| (*k, Constant(v.to_vec())))
            .collect(),
    }
}

fn sample_unsigned() -> UnsignedTransaction {
    let s = secret(1);
    UnsignedTransaction {
        inputs: vec![
            UnsignedInput {
                box_id: BoxId([0x11; 32]),
                extension: ContextExtension::empty(),
            },
            UnsignedInput {
                box_id: BoxId([0x22; 32]),
                extension: ext(&[(0, &[0x04, 0x02][..]), (5, &[0x0e, 0x01, 0xff][..])]),
            },
        ],
        data_inputs: vec![DataInput {
            box_id: BoxId([0x33; 32]),
        }],
        output_candidates: vec![
            ErgoBoxCandidate {
                registers: vec![Constant(vec![0x04, 0x0a])],
                ..candidate(1_000_000, p2pk_tree(&s), vec![token(9, 5), token(7, 1)])
            },
            candidate(1_100_000, true_tree(), vec![token(7, 2)]),
        ],
    }
}

// ---- vlq ----

#[test]
fn vlq_known_encodings() {
    for (n, bytes) in [
        (0u64, vec![0x00]),
        (127, vec![0x7f]),
        (128, vec![0x80, 0x01]),
        (300, vec![0xac, 0x02]),
    ] {
        let mut out = Vec::new();
        encode_vlq(n, &mut out);
        assert_eq!(out, bytes);
        assert_eq!(read_vlq_bytes(&bytes).unwrap(), (n, bytes.len()));
    }
    let mut max = Vec::new();
    encode_vlq(u64::MAX, &mut max);
    assert_eq!(max.len(), 10);
    assert_eq!(read_vlq_bytes(&max).unwrap().0, u64::MAX);
}

#[test]
fn vlq_rejects_non_canonical_and_overflow() {
    assert!(read_vlq_bytes(&[0x80, 0x00]).is_err());
    assert!(read_vlq_bytes(&[0x80]).is_err());
    let mut too_big = vec![0xff; 9];
    too_big.push(0x02);
    assert!(read_vlq_bytes(&too_big).is_err());
    let mut too_long = vec![0x80; 10];
    too_long.push(0x01);
    assert!(read_vlq_bytes(&too_long).is_err());
}

// ---- transaction encoding ----

#[test]
fn unsigned_tx_round_trip() {
    let tx = sample_unsigned();
    let vc = VersionContext::for_block_version(3).unwrap();
    let bytes = bytes_to_sign(&tx).unwrap();
    assert_eq!(parse_unsigned_tx(&bytes, &vc).unwrap(), tx);
}

#[test]
fn token_table_is_shared_by_outputs() {
    let tx = sample_unsigned();
    let bytes = bytes_to_sign(&tx).unwrap();
    // Token 7 appears in both outputs but only once on the wire.
    let id7 = [7u8; 32];
    let hits = bytes.windows(32).filter(|w| *w == id7).count();
    assert_eq!(hits, 1);
}

#[test]
fn signed_tx_round_trip_and_shared_id() {
    let unsigned = sample_unsigned();
    let signed = SignedTransaction {
        inputs: unsigned
            .inputs
            .iter()
            .enumerate()
            .map(|(i, input)| Input {
                box_id: input.box_id,
                spending_proof: ProverResult {
                    proof: vec![i as u8 + 1; 56],
                    extension: input.extension.clone(),
                },
            })
            .collect(),
        data_inputs: unsigned.data_inputs.clone(),
        output_candidates: unsigned.output_candidates.clone(),
    };
    let vc = VersionContext::for_block_version(3).unwrap();
    let bytes = signed_tx_bytes(&signed).unwrap();
    assert_eq!(parse_signed_tx(&bytes, &vc).unwrap(), signed);
    assert_eq!(signed.id().unwrap(), unsigned.id().unwrap());
    assert_ne!(bytes, bytes_to_sign(&unsigned).unwrap());
}

#[test]
fn unsigned_parse_rejects_proof_and_trailing_bytes() {
    let tx = sample_unsigned();
    let vc = VersionContext::for_block_version(3).unwrap();
    let mut bytes = bytes_to_sign(&tx).unwrap();
    bytes.push(0);
    assert_eq!(
        parse_unsigned_tx(&bytes, &vc).unwrap_err(),
        TxError::Parse("trailing bytes")
    );

    let signed = SignedTransaction {
        inputs: vec![Input {
            box_id: BoxId([1; 32]),
            spending_proof: ProverResult {
                proof: vec![0xaa],
                extension: ContextExtension::empty(),
            },
        }],
        data_inputs: vec![],
        output_candidates: vec![],
    };
    let bytes = signed_tx_bytes(&signed).unwrap();
    assert_eq!(
        parse_unsigned_tx(&bytes, &vc).unwrap_err().code(),
        ErrorCode::TxErrParse
    );
}

#[test]
fn parse_rejects_tree_version_above_activated() {
    let s = secret(2);
    let mut tx = sample_unsigned();
    tx.output_candidates[1].ergo_tree = ErgoTree::new(2, p2pk_tree(&s).body().to_vec()).unwrap();
    let bytes = bytes_to_sign(&tx).unwrap();
    let v2 = VersionContext::for_block_version(2).unwrap();
    let v3 = VersionContext::for_block_version(3).unwrap();
    assert!(parse_unsigned_tx(&bytes, &v2).is_err());
    assert_eq!(parse_unsigned_tx(&bytes, &v3).unwrap(), tx);
}

#[test]
fn parse_rejects_token_index_outside_table() {
    let tx = UnsignedTransaction {
        inputs: vec![],
        data_inputs: vec![],
        output_candidates: vec![candidate(1, true_tree(), vec![token(3, 1)])],
    };
    let mut bytes = bytes_to_sign(&tx).unwrap();
    // inputs(0) data inputs(0) table len(1) id(32) outputs(1) value(1)
    // tree(1 + 1 + 2) height(1) token count(1) -> token index
    let idx = 3 + 32 + 1 + 1 + 4 + 1 + 1;
    assert_eq!(bytes[idx], 0);
    bytes[idx] = 1;
    let vc = VersionContext::for_block_version(3).unwrap();
    assert_eq!(
        parse_unsigned_tx(&bytes, &vc).unwrap_err(),
        TxError::Parse("token index outside token table")
    );
}

#[test]
fn output_box_ids_bind_tx_and_index() {
    let c = candidate(5, true_tree(), vec![]);
    let a = ErgoBox::from_candidate(c.clone(), TxId([1; 32]), 0).unwrap();
    let b = ErgoBox::from_candidate(c.clone(), TxId([1; 32]), 1).unwrap();
    let d = ErgoBox::from_candidate(c, TxId([2; 32]), 0).unwrap();
    assert_ne!(a.box_id, b.box_id);
    assert_ne!(a.box_id, d.box_id);
}

#[test]
fn signed_outputs_carry_tx_id() {
    let unsigned = sample_unsigned();
    let signed = SignedTransaction {
        inputs: vec![],
        data_inputs: vec![],
        output_candidates: unsigned.output_candidates.clone(),
    };
    let outs = signed.outputs().unwrap();
    let id = signed.id().unwrap();
    assert_eq!(outs.len(), 2);
    assert!(outs.iter().all(|o| o.transaction_id == id));
    assert_eq!(outs[1].index, 1);
}

#[test]
fn ergo_tree_p2pk_key() {
    let s = secret(4);
    assert_eq!(p2pk_tree(&s).p2pk_key(), Some(s.image().h));
    assert_eq!(true_tree().p2pk_key(), None);
    assert!(ErgoTree::new(ERGO_TREE_VERSION_MASK + 1, vec![]).is_err());
}

// ---- token balance ----

#[test]
fn balanced_tokens_pass() {
    let inputs = vec![spendable(1, candidate(10, true_tree(), vec![token(1, 5), token(2, 3)]))];
    let outputs = vec![
        candidate(5, true_tree(), vec![token(2, 3), token(1, 2)]),
        candidate(5, true_tree(), vec![token(1, 3)]),
    ];
    validate_token_balance(&inputs, &outputs, None).unwrap();
}

#[test]
fn burn_requires_exact_request() {
    let inputs = vec![spendable(1, candidate(10, true_tree(), vec![token(1, 5)]))];
    let outputs = vec![candidate(10, true_tree(), vec![token(1, 2)])];

    let err = validate_token_balance(&inputs, &outputs, None).unwrap_err();
    match err {
        TxError::TokenBalance { msg, diff } => {
            assert_eq!(msg, "burn not requested");
            assert_eq!(diff.0, vec![(TokenId([1; 32]), -3)]);
        }
        other => panic!("unexpected error {other:?}"),
    }

    let empty = BurnRequest::default();
    assert!(validate_token_balance(&inputs, &outputs, Some(&empty)).is_err());

    let exact = BurnRequest::new(vec![token(1, 3)]);
    validate_token_balance(&inputs, &outputs, Some(&exact)).unwrap();

    let too_much = BurnRequest::new(vec![token(1, 4)]);
    let err = validate_token_balance(&inputs, &outputs, Some(&too_much)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::TxErrTokenBalance);

    let wrong = BurnRequest::new(vec![token(1, 3), token(8, 1)]);
    assert!(validate_token_balance(&inputs, &outputs, Some(&wrong)).is_err());
}

#[test]
fn mint_bound_to_first_input_id() {
    let inputs = vec![
        spendable(1, candidate(10, true_tree(), vec![])),
        spendable(2, candidate(10, true_tree(), vec![])),
    ];
    let first = TokenId::from(inputs[0].box_id);
    let second = TokenId::from(inputs[1].box_id);

    let ok = vec![candidate(20, true_tree(), vec![Token::new(first, 1_000)])];
    validate_token_balance(&inputs, &ok, None).unwrap();

    let wrong_id = vec![candidate(20, true_tree(), vec![Token::new(second, 1)])];
    let err = validate_token_balance(&inputs, &wrong_id, None).unwrap_err();
    assert!(matches!(
        err,
        TxError::TokenBalance {
            msg: "minted token id must equal the first input box id",
            ..
        }
    ));

    let two = vec![candidate(
        20,
        true_tree(),
        vec![Token::new(first, 1), Token::new(second, 1)],
    )];
    let err = validate_token_balance(&inputs, &two, None).unwrap_err();
    assert!(matches!(
        err,
        TxError::TokenBalance {
            msg: "only one token can be minted per transaction",
            ..
        }
    ));
}

#[test]
fn burn_and_mint_together() {
    let inputs = vec![spendable(1, candidate(10, true_tree(), vec![token(5, 2)]))];
    let minted = TokenId::from(inputs[0].box_id);
    let outputs = vec![candidate(10, true_tree(), vec![Token::new(minted, 1)])];
    let burn = BurnRequest::new(vec![token(5, 2)]);
    validate_token_balance(&inputs, &outputs, Some(&burn)).unwrap();
    assert!(validate_token_balance(&inputs, &outputs, None).is_err());
}

#[test]
fn token_delta_display() {
    let inputs = vec![spendable(1, candidate(10, true_tree(), vec![]))];
    let outputs = vec![candidate(10, true_tree(), vec![token(0xab, 4)])];
    let err = validate_token_balance(&inputs, &outputs, None).unwrap_err();
    let s = err.to_string();
    assert!(s.starts_with("TX_ERR_TOKEN_BALANCE: minted token id"));
    assert!(s.ends_with(&format!("[{}: +4]", hex::encode([0xab; 32]))));
}
