//! Configuration (§6, §12). `ProofOptions` is the single object the
//! orchestrator accepts; `validate` runs every §7 `ConfigError` check before
//! any proof bytes are produced.

use crate::errors::ConfigError;
use crate::fri::FriOptions;

#[derive(Clone, Debug)]
pub struct ProofOptions {
    /// log2 of the evaluation-domain blowup relative to the trace length.
    pub log_n_cosets: u8,
    pub fri: FriOptions,
    /// Parallel-for chunk size for composition evaluation (§5).
    pub constraint_polynomial_task_size: usize,
}

impl ProofOptions {
    pub fn blowup_factor(&self) -> usize {
        1usize << self.log_n_cosets
    }

    /// Validates internal consistency given the AIR's declared composition
    /// degree bound (§7 ConfigError: "FRI expected degree ≠ composition
    /// degree bound", blowup range, last-layer bound).
    pub fn validate(&self, composition_degree_bound: usize, trace_length: usize) -> Result<(), ConfigError> {
        if self.log_n_cosets == 0 || self.log_n_cosets > 10 {
            return Err(ConfigError::BlowupOutOfRange {
                log_n_cosets: self.log_n_cosets,
                min_required: 1,
            });
        }
        let min_blowup = composition_degree_bound.next_power_of_two() / trace_length.max(1);
        if self.blowup_factor() < min_blowup.max(1) {
            return Err(ConfigError::BlowupOutOfRange {
                log_n_cosets: self.log_n_cosets,
                min_required: min_blowup.max(1),
            });
        }

        let expected = self.fri.expected_degree_bound();
        if expected != composition_degree_bound {
            return Err(ConfigError::FriDegreeMismatch {
                expected,
                actual: composition_degree_bound,
            });
        }

        let last_layer_domain_size = (trace_length * self.blowup_factor()) >> self.fri.total_folding_log2();
        if self.fri.last_layer_degree_bound > last_layer_domain_size {
            return Err(ConfigError::LastLayerTooLarge {
                bound: self.fri.last_layer_degree_bound,
                domain_size: last_layer_domain_size,
            });
        }

        if !trace_length.is_power_of_two() || trace_length < 2 {
            return Err(ConfigError::InvalidTraceLength(trace_length));
        }

        let work_bits = self.fri.proof_of_work_bits;
        if work_bits != 0 && !(1..=40).contains(&work_bits) {
            return Err(ConfigError::ProofOfWorkBitsOutOfRange(work_bits));
        }

        // Every channel draw (query indices, and the FRI domain sizes they're
        // reinterpreted against) samples against an upper bound no larger
        // than the initial LDE domain size; bounding that one value bounds
        // them all (§4.6's `< 2^48` modulo-bias requirement).
        let lde_size = trace_length * self.blowup_factor();
        if lde_size as u64 >= (1u64 << 48) {
            return Err(ConfigError::UpperBoundTooLarge(lde_size as u64));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_options() -> ProofOptions {
        ProofOptions {
            log_n_cosets: 3,
            fri: FriOptions {
                fri_step_list: vec![0, 2, 1],
                last_layer_degree_bound: 16,
                n_queries: 30,
                proof_of_work_bits: 20,
            },
            constraint_polynomial_task_size: 256,
        }
    }

    #[test]
    fn rejects_blowup_of_zero() {
        let mut options = sample_options();
        options.log_n_cosets = 0;
        assert!(options.validate(16 * 8, 1024).is_err());
    }

    #[test]
    fn rejects_fri_degree_mismatch() {
        let options = sample_options();
        assert!(options.validate(999, 1024).is_err());
    }

    #[test]
    fn rejects_proof_of_work_bits_out_of_range() {
        let mut options = sample_options();
        options.fri.proof_of_work_bits = 41;
        assert!(matches!(
            options.validate(16 * 8, 1024),
            Err(ConfigError::ProofOfWorkBitsOutOfRange(41))
        ));
    }

    #[test]
    fn accepts_proof_of_work_bits_of_zero() {
        let mut options = sample_options();
        options.fri.proof_of_work_bits = 0;
        assert!(options.validate(16 * 8, 1024).is_ok());
    }
}
