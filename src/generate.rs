//! Autoregressive driver for the equivalence task.
//!
//! `generate` appends one predicted token at a time until the
//! end-marker arrives or the step budget runs out. Helpers cover the
//! other end of a run: building well-formed prompts, validating
//! user-supplied ones, and checking the finished sequence against the
//! one-response-per-input contract.

use std::fmt;

use rand::Rng;

use crate::equivalence::equivalence;
use crate::errors::{RaspError, Result};
use crate::types::{Batch, Token, TokenRoles};

// ---------------------------------------------------------------------------
// Configuration and results
// ---------------------------------------------------------------------------

/// Driver knobs.
#[derive(Clone, Debug)]
pub struct GenConfig {
    /// Hard cap on appended tokens per run. The loop errors instead of
    /// spinning when a sequence never reaches the end-marker.
    pub max_steps: usize,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self { max_steps: 256 }
    }
}

/// One appended token and the context length it was predicted from.
#[derive(Clone, Debug)]
pub struct GenStep {
    pub context_len: usize,
    pub token: Token,
}

/// A finished run: the prompt, the full sequence ending in the
/// end-marker, and the per-step trace.
#[derive(Clone, Debug)]
pub struct Generation {
    pub prompt: Vec<Token>,
    pub sequence: Vec<Token>,
    pub steps: Vec<GenStep>,
}

impl Generation {
    /// Tokens appended after the prompt.
    pub fn emitted(&self) -> &[Token] {
        &self.sequence[self.prompt.len()..]
    }
}

/// Render tokens the way the run log prints them: `[1 5 7]`.
pub fn fmt_tokens(tokens: &[Token]) -> String {
    let parts: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    format!("[{}]", parts.join(" "))
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "prompt: {}", fmt_tokens(&self.prompt))?;
        for step in &self.steps {
            writeln!(
                f,
                "{} -> {}",
                fmt_tokens(&self.sequence[..step.context_len]),
                step.token
            )?;
        }
        write!(f, "generation: {}", fmt_tokens(&self.sequence))
    }
}

// ---------------------------------------------------------------------------
// Prompt tooling
// ---------------------------------------------------------------------------

/// Build a prompt with `n` random input tokens: marker, inputs, trigger.
pub fn prompt_with_inputs<R: Rng>(n: usize, roles: &TokenRoles, rng: &mut R) -> Vec<Token> {
    let mut prompt = Vec::with_capacity(n + 2);
    prompt.push(roles.bos);
    for _ in 0..n {
        prompt.push(roles.inpts[rng.gen_range(0..roles.inpts.len())]);
    }
    prompt.push(roles.trigs[rng.gen_range(0..roles.trigs.len())]);
    prompt
}

/// Check the marker / inputs / trigger shape of a prompt.
pub fn validate_prompt(prompt: &[Token], roles: &TokenRoles) -> Result<()> {
    if prompt.len() < 2 {
        return Err(RaspError::MalformedPrompt(format!(
            "need at least a beginning-marker and a trigger, got {} tokens",
            prompt.len()
        )));
    }
    if prompt[0] != roles.bos {
        return Err(RaspError::MalformedPrompt(format!(
            "expected beginning-marker {} at position 0, found {}",
            roles.bos, prompt[0]
        )));
    }
    let last = prompt[prompt.len() - 1];
    if !roles.is_trig(last) {
        return Err(RaspError::MalformedPrompt(format!(
            "expected a trigger at the final position, found {last}"
        )));
    }
    for (p, &t) in prompt.iter().enumerate().take(prompt.len() - 1).skip(1) {
        if t == roles.bos {
            return Err(RaspError::MalformedPrompt(format!(
                "duplicate beginning-marker at position {p}"
            )));
        }
        if roles.is_trig(t) {
            return Err(RaspError::MalformedPrompt(format!(
                "duplicate trigger at position {p}"
            )));
        }
        if !roles.is_inpt(t) {
            return Err(RaspError::MalformedPrompt(format!(
                "non-input token {t} at position {p} before the trigger"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Run the task to completion on one prompt.
///
/// Each step re-scores the whole context and appends the last
/// position's prediction. Stops with the step that emits the
/// end-marker; exceeding `config.max_steps` is an error.
pub fn generate<R: Rng>(
    prompt: &[Token],
    roles: &TokenRoles,
    config: &GenConfig,
    rng: &mut R,
) -> Result<Generation> {
    roles.validate()?;
    validate_prompt(prompt, roles)?;

    let mut sequence = prompt.to_vec();
    let mut steps = Vec::new();
    for _ in 0..config.max_steps {
        let x = Batch::single(sequence.clone());
        let preds = equivalence(&x, roles, rng)?;
        let next = preds.get(0, preds.cols - 1);
        steps.push(GenStep {
            context_len: sequence.len(),
            token: next,
        });
        sequence.push(next);
        if next == roles.eos {
            return Ok(Generation {
                prompt: prompt.to_vec(),
                sequence,
                steps,
            });
        }
    }
    Err(RaspError::StepLimitExceeded {
        max_steps: config.max_steps,
    })
}

// ---------------------------------------------------------------------------
// Post-condition
// ---------------------------------------------------------------------------

/// Verify the equivalence contract on a finished sequence: one response
/// token per original input, closed by exactly one end-marker.
pub fn check_equivalence(sequence: &[Token], n_inputs: usize, roles: &TokenRoles) -> Result<()> {
    let resp_count = sequence.iter().filter(|&&t| roles.is_resp(t)).count();
    if resp_count != n_inputs {
        return Err(RaspError::PostconditionViolation(format!(
            "expected {n_inputs} response tokens, found {resp_count}"
        )));
    }
    match sequence.last() {
        Some(&t) if t == roles.eos => {}
        _ => {
            return Err(RaspError::PostconditionViolation(
                "sequence does not close with the end-marker".into(),
            ))
        }
    }
    let eos_count = sequence.iter().filter(|&&t| t == roles.eos).count();
    if eos_count != 1 {
        return Err(RaspError::PostconditionViolation(format!(
            "expected exactly one end-marker, found {eos_count}"
        )));
    }
    Ok(())
}
