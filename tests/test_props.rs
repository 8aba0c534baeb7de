//! Property tests for the equivalence pipeline.
//!
//! Random input counts, seeds, and vocabulary shifts; every run must
//! keep the one-response-per-input contract.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rasp::equivalence::equivalence;
use rasp::generate::{check_equivalence, generate, prompt_with_inputs, GenConfig};
use rasp::types::{Batch, TokenRoles};

proptest! {
    #[test]
    fn every_run_answers_each_input_once(n in 0usize..12, seed in 0u64..1_000) {
        let roles = TokenRoles::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let prompt = prompt_with_inputs(n, &roles, &mut rng);
        let run = generate(&prompt, &roles, &GenConfig::default(), &mut rng).unwrap();
        prop_assert!(check_equivalence(&run.sequence, n, &roles).is_ok());
        prop_assert_eq!(run.sequence.len(), prompt.len() + n + 1);
    }

    #[test]
    fn emitted_tokens_are_seed_independent(n in 0usize..8, s1 in 0u64..500, s2 in 500u64..1_000) {
        let roles = TokenRoles::default();
        let mut prompt_rng = ChaCha8Rng::seed_from_u64(n as u64);
        let prompt = prompt_with_inputs(n, &roles, &mut prompt_rng);

        let mut rng_a = ChaCha8Rng::seed_from_u64(s1);
        let mut rng_b = ChaCha8Rng::seed_from_u64(s2);
        let a = generate(&prompt, &roles, &GenConfig::default(), &mut rng_a).unwrap();
        let b = generate(&prompt, &roles, &GenConfig::default(), &mut rng_b).unwrap();
        prop_assert_eq!(a.sequence, b.sequence);
    }

    #[test]
    fn shifted_vocabularies_keep_the_contract(offset in 1i32..1_000, n in 0usize..8, seed in 0u64..500) {
        let roles = TokenRoles::new(
            offset,
            offset + 1,
            vec![offset + 2],
            vec![offset + 3, offset + 4, offset + 5],
            vec![offset + 6],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let prompt = prompt_with_inputs(n, &roles, &mut rng);
        let run = generate(&prompt, &roles, &GenConfig::default(), &mut rng).unwrap();
        prop_assert!(check_equivalence(&run.sequence, n, &roles).is_ok());
    }

    #[test]
    fn pre_trigger_predictions_stay_in_the_input_set(n in 1usize..8, seed in 0u64..1_000) {
        let roles = TokenRoles::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let prompt = prompt_with_inputs(n, &roles, &mut rng);
        let trig_at = prompt.len() - 1;
        let x = Batch::single(prompt);
        let preds = equivalence(&x, &roles, &mut rng).unwrap();
        for p in 0..trig_at {
            prop_assert!(roles.is_inpt(preds.get(0, p)));
        }
    }
}
