//! Core types: token grids and role tables.
//!
//! Everything downstream operates on `Batch<T>`, a rectangular row-major
//! grid. Each row is one independent sequence; columns are positions.
//! `TokenRoles` names the special vocabulary entries (markers, inputs,
//! responses, triggers) that the equivalence task is written against.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{RaspError, Result};

/// Vocabulary entry. Small signed ints keep position arithmetic and
/// token values in one domain.
pub type Token = i32;

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// A rectangular batch of per-position values, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch<T> {
    pub data: Vec<T>,
    pub rows: usize,
    pub cols: usize,
}

impl<T> Batch<T> {
    /// Build from a flat buffer. Length must equal `rows * cols`.
    pub fn new(data: Vec<T>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols, "batch data length mismatch");
        Self { data, rows, cols }
    }

    /// Build from per-sequence rows, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let n_rows = rows.len();
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n_rows * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(RaspError::RaggedBatch {
                    row: i,
                    expected: cols,
                    got: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            data,
            rows: n_rows,
            cols,
        })
    }

    /// Wrap a single sequence as a one-row batch.
    pub fn single(seq: Vec<T>) -> Self {
        let cols = seq.len();
        Self {
            data: seq,
            rows: 1,
            cols,
        }
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Borrow row `r` as a slice of positions.
    #[inline]
    pub fn row(&self, r: usize) -> &[T] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }
}

impl<T: Copy> Batch<T> {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }
}

impl<T: fmt::Display> fmt::Display for Batch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Batch({}x{}", self.rows, self.cols)?;
        for r in 0..self.rows {
            let row: Vec<String> = self.row(r).iter().map(|v| v.to_string()).collect();
            write!(f, ", [{}]", row.join(" "))?;
        }
        write!(f, ")")
    }
}

// ---------------------------------------------------------------------------
// TokenRoles
// ---------------------------------------------------------------------------

/// The role table the equivalence task runs against.
///
/// `bos` opens every sequence, `eos` closes it, `trigs` members switch
/// the model from reading inputs to emitting responses, and each `inpts`
/// member must eventually be answered by one `resps` member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenRoles {
    pub bos: Token,
    pub eos: Token,
    pub resps: Vec<Token>,
    pub inpts: Vec<Token>,
    pub trigs: Vec<Token>,
}

impl Default for TokenRoles {
    fn default() -> Self {
        Self {
            bos: 1,
            eos: 2,
            resps: vec![3],
            inpts: vec![4, 5, 6],
            trigs: vec![7],
        }
    }
}

impl TokenRoles {
    /// Build a role table. Sets are sorted and deduplicated so that the
    /// canonical member of each set is stable.
    pub fn new(
        bos: Token,
        eos: Token,
        mut resps: Vec<Token>,
        mut inpts: Vec<Token>,
        mut trigs: Vec<Token>,
    ) -> Self {
        resps.sort_unstable();
        resps.dedup();
        inpts.sort_unstable();
        inpts.dedup();
        trigs.sort_unstable();
        trigs.dedup();
        Self {
            bos,
            eos,
            resps,
            inpts,
            trigs,
        }
    }

    #[inline]
    pub fn is_resp(&self, t: Token) -> bool {
        self.resps.contains(&t)
    }

    #[inline]
    pub fn is_inpt(&self, t: Token) -> bool {
        self.inpts.contains(&t)
    }

    #[inline]
    pub fn is_trig(&self, t: Token) -> bool {
        self.trigs.contains(&t)
    }

    /// Canonical response token: the smallest member of the set.
    #[inline]
    pub fn resp_id(&self) -> Token {
        self.resps.first().copied().unwrap_or(0)
    }

    /// Canonical trigger token: the smallest member of the set.
    #[inline]
    pub fn trig_id(&self) -> Token {
        self.trigs.first().copied().unwrap_or(0)
    }

    /// Check that every role is populated and no token carries two roles.
    pub fn validate(&self) -> Result<()> {
        if self.resps.is_empty() {
            return Err(RaspError::InvalidRoles("response set is empty".into()));
        }
        if self.inpts.is_empty() {
            return Err(RaspError::InvalidRoles("input set is empty".into()));
        }
        if self.trigs.is_empty() {
            return Err(RaspError::InvalidRoles("trigger set is empty".into()));
        }
        if self.bos == self.eos {
            return Err(RaspError::InvalidRoles(format!(
                "beginning-marker and end-marker share value {}",
                self.bos
            )));
        }
        for t in [self.bos, self.eos] {
            if self.is_resp(t) || self.is_inpt(t) || self.is_trig(t) {
                return Err(RaspError::InvalidRoles(format!(
                    "marker token {t} also appears in a role set"
                )));
            }
        }
        for &t in &self.resps {
            if self.is_inpt(t) || self.is_trig(t) {
                return Err(RaspError::InvalidRoles(format!(
                    "token {t} belongs to more than one role set"
                )));
            }
        }
        for &t in &self.inpts {
            if self.is_trig(t) {
                return Err(RaspError::InvalidRoles(format!(
                    "token {t} belongs to more than one role set"
                )));
            }
        }
        Ok(())
    }
}
