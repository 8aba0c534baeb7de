//! Equivalence transform unit tests.
//!
//! Tests last-position predictions on boundary histories, pre-trigger
//! randomness, post-trigger determinism, marker restarts, custom role
//! tables, and row independence.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rasp::equivalence::equivalence;
use rasp::types::{Batch, Token, TokenRoles};

// =========================================================================
// Helpers
// =========================================================================

fn predict(seq: &[Token], seed: u64) -> Vec<Token> {
    let roles = TokenRoles::default();
    let x = Batch::single(seq.to_vec());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    equivalence(&x, &roles, &mut rng).unwrap().row(0).to_vec()
}

fn last(seq: &[Token]) -> Token {
    let preds = predict(seq, 42);
    preds[preds.len() - 1]
}

// =========================================================================
// 1. Last-position predictions
// =========================================================================

#[test]
fn empty_input_span_predicts_the_end_marker() {
    assert_eq!(last(&[1, 7]), 2);
}

#[test]
fn open_input_predicts_a_response() {
    assert_eq!(last(&[1, 5, 7]), 3);
}

#[test]
fn balanced_history_predicts_the_end_marker() {
    assert_eq!(last(&[1, 5, 7, 3]), 2);
    assert_eq!(last(&[1, 5, 4, 7, 3, 3]), 2);
}

#[test]
fn unbalanced_history_keeps_predicting_responses() {
    assert_eq!(last(&[1, 5, 4, 7]), 3);
    assert_eq!(last(&[1, 5, 4, 7, 3]), 3);
    assert_eq!(last(&[1, 4, 4, 6, 7, 3]), 3);
}

#[test]
fn countables_before_a_later_marker_still_enter_the_balance() {
    // The validity gate rides the query, not the keys: a later marker
    // moves the anchor, but earlier countable tokens keep feeding the
    // mean. A balanced history still closes; an open one still owes.
    assert_eq!(last(&[1, 5, 7, 3, 1, 7]), 2);
    assert_eq!(last(&[1, 5, 7, 1, 7]), 3);
}

// =========================================================================
// 2. Grid structure
// =========================================================================

#[test]
fn predictions_share_the_input_shape() {
    let roles = TokenRoles::default();
    let x = Batch::single(vec![1, 5, 4, 7]);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let preds = equivalence(&x, &roles, &mut rng).unwrap();
    assert_eq!(preds.shape(), x.shape());
}

#[test]
fn pre_trigger_positions_predict_input_set_members() {
    let roles = TokenRoles::default();
    let preds = predict(&[1, 5, 4, 7], 9);
    for p in 0..3 {
        assert!(
            roles.is_inpt(preds[p]),
            "position {p} predicted {} outside the input set",
            preds[p]
        );
    }
}

#[test]
fn post_trigger_predictions_do_not_depend_on_the_seed() {
    let a = predict(&[1, 5, 4, 7, 3], 1);
    let b = predict(&[1, 5, 4, 7, 3], 999);
    // Trigger sits at position 3; from there on the draw is never used.
    assert_eq!(a[3..], b[3..]);
    assert_eq!(a[3..].to_vec(), vec![3, 3]);
}

// =========================================================================
// 3. Degenerate histories
// =========================================================================

#[test]
fn position_before_the_marker_predicts_the_end_marker() {
    // No countable position is visible from there, so the balance reads
    // exactly zero and the end-marker fires.
    let preds = predict(&[4, 1, 7], 3);
    assert_eq!(preds[0], 2);
}

#[test]
fn the_marker_position_itself_never_predicts_the_end_marker() {
    let roles = TokenRoles::default();
    let preds = predict(&[1, 7], 5);
    assert!(roles.is_inpt(preds[0]), "marker position predicted {}", preds[0]);
}

// =========================================================================
// 4. Custom role tables
// =========================================================================

#[test]
fn shifted_vocabulary_behaves_like_the_default() {
    let roles = TokenRoles::new(10, 20, vec![30], vec![40, 50], vec![70]);
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let open = Batch::single(vec![10, 40, 70]);
    let preds = equivalence(&open, &roles, &mut rng).unwrap();
    assert_eq!(preds.get(0, 2), 30);

    let closed = Batch::single(vec![10, 40, 70, 30]);
    let preds = equivalence(&closed, &roles, &mut rng).unwrap();
    assert_eq!(preds.get(0, 3), 20);
}

// =========================================================================
// 5. Batched rows
// =========================================================================

#[test]
fn rows_are_scored_independently() {
    let roles = TokenRoles::default();
    let x = Batch::from_rows(vec![vec![1, 5, 7, 3], vec![1, 4, 4, 7]]).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let preds = equivalence(&x, &roles, &mut rng).unwrap();
    // Row 0 is balanced, row 1 still owes two responses.
    assert_eq!(preds.get(0, 3), 2);
    assert_eq!(preds.get(1, 3), 3);
}
