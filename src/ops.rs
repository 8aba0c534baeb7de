//! Sequence primitives.
//!
//! Seven small operations over `Batch<T>` grids, each a whole-grid map
//! or reduction. `kqv_max` / `kqv_mean` are the attention step: every
//! query position i scans all key positions j in its own row, and the
//! values at matching positions are reduced to one output for i. The
//! rest are elementwise plumbing used to build predicates and masks.

use crate::errors::{RaspError, Result};
use crate::types::Batch;

/// Position numbers of `x`: every row becomes `0, 1, .., cols - 1`.
pub fn indices<T>(x: &Batch<T>) -> Batch<i32> {
    let mut data = Vec::with_capacity(x.rows * x.cols);
    for _ in 0..x.rows {
        for p in 0..x.cols {
            data.push(p as i32);
        }
    }
    Batch::new(data, x.rows, x.cols)
}

/// A grid shaped like `x` holding `value` at every position.
pub fn full<T, U: Copy>(x: &Batch<T>, value: U) -> Batch<U> {
    Batch::new(vec![value; x.rows * x.cols], x.rows, x.cols)
}

/// Plain equality, usable both as a `kqv` predicate and a `seq_map` func.
#[inline]
pub fn equals<T: PartialEq>(a: T, b: T) -> bool {
    a == b
}

/// Combine two same-shape grids elementwise with `func`.
pub fn seq_map<A, B, C, F>(x: &Batch<A>, y: &Batch<B>, func: F) -> Result<Batch<C>>
where
    A: Copy,
    B: Copy,
    F: Fn(A, B) -> C,
{
    if x.shape() != y.shape() {
        return Err(RaspError::ShapeMismatch {
            expected: x.shape(),
            got: y.shape(),
        });
    }
    let mut data = Vec::with_capacity(x.rows * x.cols);
    for i in 0..x.data.len() {
        data.push(func(x.data[i], y.data[i]));
    }
    Ok(Batch::new(data, x.rows, x.cols))
}

/// Map `func` over every position of one grid.
pub fn tok_map<A, B, F>(x: &Batch<A>, func: F) -> Batch<B>
where
    A: Copy,
    F: Fn(A) -> B,
{
    let mut data = Vec::with_capacity(x.rows * x.cols);
    for i in 0..x.data.len() {
        data.push(func(x.data[i]));
    }
    Batch::new(data, x.rows, x.cols)
}

/// Per-position branch: `if_true[i]` where `cond[i]` holds, else
/// `if_false[i]`.
pub fn select<T: Copy>(
    cond: &Batch<bool>,
    if_true: &Batch<T>,
    if_false: &Batch<T>,
) -> Result<Batch<T>> {
    if cond.shape() != if_true.shape() {
        return Err(RaspError::ShapeMismatch {
            expected: cond.shape(),
            got: if_true.shape(),
        });
    }
    if cond.shape() != if_false.shape() {
        return Err(RaspError::ShapeMismatch {
            expected: cond.shape(),
            got: if_false.shape(),
        });
    }
    let mut data = Vec::with_capacity(cond.data.len());
    for i in 0..cond.data.len() {
        data.push(if cond.data[i] {
            if_true.data[i]
        } else {
            if_false.data[i]
        });
    }
    Ok(Batch::new(data, cond.rows, cond.cols))
}

/// Attention with max reduction: output[i] is the largest `v[j]` over
/// the key positions j of the same row where `pred(k[j], q[i])` holds,
/// or `V::default()` when none match.
pub fn kqv_max<K, Q, V, P>(
    k: &Batch<K>,
    q: &Batch<Q>,
    v: &Batch<V>,
    pred: P,
) -> Result<Batch<V>>
where
    K: Copy,
    Q: Copy,
    V: Copy + Ord + Default,
    P: Fn(K, Q) -> bool,
{
    if k.shape() != q.shape() {
        return Err(RaspError::ShapeMismatch {
            expected: k.shape(),
            got: q.shape(),
        });
    }
    if k.shape() != v.shape() {
        return Err(RaspError::ShapeMismatch {
            expected: k.shape(),
            got: v.shape(),
        });
    }
    let mut data = Vec::with_capacity(q.rows * q.cols);
    for r in 0..q.rows {
        for i in 0..q.cols {
            let qi = q.get(r, i);
            let mut best: Option<V> = None;
            for j in 0..k.cols {
                if pred(k.get(r, j), qi) {
                    let vj = v.get(r, j);
                    best = match best {
                        Some(b) if b >= vj => Some(b),
                        _ => Some(vj),
                    };
                }
            }
            data.push(best.unwrap_or_default());
        }
    }
    Ok(Batch::new(data, q.rows, q.cols))
}

/// Attention with mean reduction: output[i] averages the `v[j]` over
/// matching key positions of the same row. An empty match yields
/// exactly 0.0, which downstream equality tests rely on.
pub fn kqv_mean<K, Q, V, P>(
    k: &Batch<K>,
    q: &Batch<Q>,
    v: &Batch<V>,
    pred: P,
) -> Result<Batch<f64>>
where
    K: Copy,
    Q: Copy,
    V: Copy + Into<f64>,
    P: Fn(K, Q) -> bool,
{
    if k.shape() != q.shape() {
        return Err(RaspError::ShapeMismatch {
            expected: k.shape(),
            got: q.shape(),
        });
    }
    if k.shape() != v.shape() {
        return Err(RaspError::ShapeMismatch {
            expected: k.shape(),
            got: v.shape(),
        });
    }
    let mut data = Vec::with_capacity(q.rows * q.cols);
    for r in 0..q.rows {
        for i in 0..q.cols {
            let qi = q.get(r, i);
            let mut sum = 0.0f64;
            let mut n = 0usize;
            for j in 0..k.cols {
                if pred(k.get(r, j), qi) {
                    sum += v.get(r, j).into();
                    n += 1;
                }
            }
            data.push(if n == 0 { 0.0 } else { sum / n as f64 });
        }
    }
    Ok(Batch::new(data, q.rows, q.cols))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kqv_max_defaults_to_zero_when_nothing_matches() {
        let k = Batch::single(vec![4, 5, 6]);
        let q = full(&k, 1);
        let v = indices(&k);
        let out = kqv_max(&k, &q, &v, equals).unwrap();
        assert_eq!(out.data, vec![0, 0, 0]);
    }

    #[test]
    fn kqv_mean_is_exactly_zero_when_nothing_matches() {
        let k = Batch::single(vec![false, false]);
        let q = Batch::single(vec![true, true]);
        let v = Batch::single(vec![5, 5]);
        let out = kqv_mean(&k, &q, &v, |k, q| k && q).unwrap();
        assert_eq!(out.data, vec![0.0, 0.0]);
    }
}
