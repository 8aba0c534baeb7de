//! The equivalence task.
//!
//! A sequence opens with a beginning-marker, carries input tokens up to
//! a trigger, and is then answered with exactly one response token per
//! input before an end-marker closes it. Under the default roles:
//!
//!   BOS INPT INPT TRIG RESP RESP EOS
//!    1    5    4    7    3    3    2
//!
//! `equivalence` scores one next-token prediction per position from the
//! running input/response balance. Generation only consumes the last
//! position's prediction; the earlier ones predict their own successors
//! so the whole grid stays inspectable.

use rand::Rng;

use crate::errors::Result;
use crate::ops::{self, equals};
use crate::types::{Batch, Token, TokenRoles};

/// Predict a next token for every position of every row in `x`.
///
/// The balance at a position averages +1 for response tokens and -1 for
/// input tokens over every countable position of its row. The validity
/// gate rides the query, not the keys: a position before the latest
/// beginning-marker reads an empty match (exactly 0.0), while valid
/// positions always average the whole row. A zero balance away from the
/// marker itself means the inputs are answered and the end-marker is
/// predicted; positions before the trigger predict a fresh input-set
/// draw; everything else predicts the canonical response token.
///
/// All three role sets must be populated, see [`TokenRoles::validate`].
pub fn equivalence<R: Rng>(
    x: &Batch<Token>,
    roles: &TokenRoles,
    rng: &mut R,
) -> Result<Batch<Token>> {
    let idx = ops::indices(x);

    // Anchors: the latest marker and latest trigger position per row.
    let start_idx = ops::kqv_max(x, &ops::full(x, roles.bos), &idx, equals)?;
    let trig_idx = ops::kqv_max(x, &ops::full(x, roles.trig_id()), &idx, equals)?;

    let pre_trig = ops::seq_map(&idx, &trig_idx, |i, t| i < t)?;
    let is_valid = ops::seq_map(&idx, &start_idx, |i, s| i >= s)?;

    let is_resp = ops::tok_map(x, |t| roles.is_resp(t));
    let is_inpt = ops::tok_map(x, |t| roles.is_inpt(t));
    let do_count = ops::tok_map(x, |t| roles.is_resp(t) || roles.is_inpt(t));

    // +1 per response, -1 per input; response wins if a token has both
    // roles.
    let vals: Batch<Token> = ops::select(&is_inpt, &ops::full(x, -1), &ops::full(x, 0))?;
    let vals = ops::select(&is_resp, &ops::full(x, 1), &vals)?;

    // Countable balance. The validity gate sits on the query side
    // only: a position before the marker matches nothing and reads
    // exactly 0.0; valid positions average over the whole row.
    let mean = ops::kqv_mean(&do_count, &is_valid, &vals, |k, q| k && q)?;
    let is_zero = ops::seq_map(&mean, &ops::full(&mean, 0.0), equals)?;
    let not_first = ops::seq_map(&idx, &start_idx, |i, s| i != s)?;
    let is_eos = ops::seq_map(&is_zero, &not_first, |z, n| z && n)?;

    // One fresh input-set draw per position, consulted only pre-trigger.
    let mut draws = Vec::with_capacity(x.rows * x.cols);
    for _ in 0..x.rows * x.cols {
        draws.push(roles.inpts[rng.gen_range(0..roles.inpts.len())]);
    }
    let rand_inpt = Batch::new(draws, x.rows, x.cols);

    let next = ops::select(&pre_trig, &rand_inpt, &ops::full(x, roles.resp_id()))?;
    ops::select(&is_eos, &ops::full(x, roles.eos), &next)
}
