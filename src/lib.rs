//! rasp: attention-style sequence primitives.
//!
//! A small interpreter for restricted-attention programs over batched
//! token sequences, built from seven primitives (`indices`, `full`,
//! `equals`, `seq_map`, `tok_map`, `select`, and the `kqv` reductions).
//! On top of them sits the equivalence task, which answers every input
//! token with one response token, and a bounded autoregressive driver
//! that runs the task to its end-marker.
//!
//! Layering:
//! - `types`: `Batch<T>` grids and the `TokenRoles` vocabulary table
//! - `ops`: the primitives, all shape-checked
//! - `equivalence`: the task transform, one prediction per position
//! - `generate`: driver, prompt tooling, post-condition check

pub mod equivalence;
pub mod errors;
pub mod generate;
pub mod ops;
pub mod types;

pub use errors::{RaspError, Result};
pub use types::{Batch, Token, TokenRoles};
