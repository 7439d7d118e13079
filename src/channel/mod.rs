//! Channel / Fiat-Shamir transcript (§4.6). A single logical object with
//! two concrete forms: [`ProverChannel`] appends to a growing proof and
//! mixes sent bytes into a PRNG state; [`VerifierChannel`] consumes bytes
//! from a received proof and mixes the same bytes into its own copy of the
//! PRNG, so both sides derive identical "random" challenges without ever
//! talking to each other.

pub mod annotations;
pub mod pow;

use crate::errors::ChannelError;
use crate::field::{ExtFE, IsField};
use annotations::{AnnotationScope, AnnotationStack};
use blake2::Blake2s256;
use digest::Digest;
use std::rc::Rc;

/// Deterministic reseed construction: `state' = Blake2s256(state || bytes)`.
/// `get_random_bytes` derives output by hashing `state || counter` so a
/// single reseed can serve arbitrarily many draws.
#[derive(Clone)]
struct Prng {
    state: [u8; 32],
    counter: u64,
}

impl Prng {
    fn new(initial_seed: &[u8]) -> Self {
        let mut hasher = Blake2s256::new();
        hasher.update(initial_seed);
        let mut state = [0u8; 32];
        state.copy_from_slice(&hasher.finalize());
        Prng { state, counter: 0 }
    }

    fn mix(&mut self, bytes: &[u8]) {
        let mut hasher = Blake2s256::new();
        hasher.update(self.state);
        hasher.update(bytes);
        self.state.copy_from_slice(&hasher.finalize());
        self.counter = 0;
    }

    fn next_bytes(&mut self, n: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            let mut hasher = Blake2s256::new();
            hasher.update(self.state);
            hasher.update(self.counter.to_le_bytes());
            out.extend_from_slice(&hasher.finalize());
            self.counter += 1;
        }
        out.truncate(n);
        out
    }

    fn next_u64(&mut self) -> u64 {
        let bytes = self.next_bytes(8);
        u64::from_le_bytes(bytes.try_into().unwrap())
    }
}

/// Draws a value uniformly in `[0, upper_bound)`. Requires `upper_bound <
/// 2^48` to keep modulo bias bounded at `<= 2^-16` (§4.6).
fn random_number(prng: &mut Prng, upper_bound: u64) -> u64 {
    debug_assert!(upper_bound < (1u64 << 48));
    prng.next_u64() % upper_bound
}

fn random_field_element<F: IsField>(prng: &mut Prng) -> F {
    F::from_u64(prng.next_u64())
}

fn random_ext_field_element(prng: &mut Prng) -> ExtFE {
    ExtFE::sample(|| prng.next_u64())
}

/// Prover side of the transcript. Appends to `proof_bytes`; before
/// `begin_query_phase()`, every send also reseeds the PRNG.
pub struct ProverChannel {
    prng: Prng,
    proof_bytes: Vec<u8>,
    in_query_phase: bool,
    annotations: Rc<AnnotationStack>,
}

impl ProverChannel {
    pub fn new(initial_seed: &[u8]) -> Self {
        ProverChannel {
            prng: Prng::new(initial_seed),
            proof_bytes: Vec::new(),
            in_query_phase: false,
            annotations: Rc::new(AnnotationStack::new()),
        }
    }

    pub fn annotate(&self, label: &str) -> AnnotationScope {
        AnnotationScope::enter(self.annotations.clone(), label)
    }

    fn send_bytes(&mut self, bytes: &[u8]) {
        self.proof_bytes.extend_from_slice(bytes);
        if !self.in_query_phase {
            self.prng.mix(bytes);
        }
    }

    pub fn send_field_element<F: IsField>(&mut self, value: &F) {
        self.send_bytes(&value.to_bytes_le());
    }

    pub fn send_field_element_span<F: IsField>(&mut self, values: &[F]) {
        for value in values {
            self.send_field_element(value);
        }
    }

    pub fn send_commitment_hash(&mut self, digest: &[u8; 32]) {
        self.send_bytes(digest);
    }

    pub fn send_decommitment_node(&mut self, digest: &[u8; 32]) {
        self.send_bytes(digest);
    }

    pub fn send_data(&mut self, bytes: &[u8]) {
        self.send_bytes(bytes);
    }

    pub fn receive_field_element<F: IsField>(&mut self) -> Result<F, ChannelError> {
        if self.in_query_phase {
            return Err(ChannelError::ReceiveAfterQueryPhase);
        }
        Ok(random_field_element(&mut self.prng))
    }

    pub fn receive_ext_field_element(&mut self) -> Result<ExtFE, ChannelError> {
        if self.in_query_phase {
            return Err(ChannelError::ReceiveAfterQueryPhase);
        }
        Ok(random_ext_field_element(&mut self.prng))
    }

    pub fn receive_number(&mut self, upper_bound: u64) -> Result<u64, ChannelError> {
        if self.in_query_phase {
            return Err(ChannelError::ReceiveAfterQueryPhase);
        }
        Ok(random_number(&mut self.prng, upper_bound))
    }

    /// Runs the PoW prover using the current PRNG state as its seed, sends
    /// the resulting nonce as data (§4.6.1).
    pub fn apply_proof_of_work(&mut self, work_bits: u32) {
        let nonce = pow::prove(&self.prng.state, work_bits);
        self.send_data(&nonce.to_le_bytes());
    }

    pub fn begin_query_phase(&mut self) {
        self.in_query_phase = true;
    }

    pub fn get_proof(self) -> Vec<u8> {
        self.proof_bytes
    }
}

/// Verifier side of the transcript: reads bytes out of a received proof in
/// the exact order the prover sent them, mixing each into its own PRNG copy.
pub struct VerifierChannel<'a> {
    prng: Prng,
    proof_bytes: &'a [u8],
    cursor: usize,
    in_query_phase: bool,
    annotations: Rc<AnnotationStack>,
}

impl<'a> VerifierChannel<'a> {
    pub fn new(initial_seed: &[u8], proof_bytes: &'a [u8]) -> Self {
        VerifierChannel {
            prng: Prng::new(initial_seed),
            proof_bytes,
            cursor: 0,
            in_query_phase: false,
            annotations: Rc::new(AnnotationStack::new()),
        }
    }

    pub fn annotate(&self, label: &str) -> AnnotationScope {
        AnnotationScope::enter(self.annotations.clone(), label)
    }

    fn take_bytes(&mut self, n: usize) -> Result<&'a [u8], ChannelError> {
        let available = self.proof_bytes.len() - self.cursor;
        if available < n {
            return Err(ChannelError::ProofTooShort {
                needed: n,
                available,
            });
        }
        let slice = &self.proof_bytes[self.cursor..self.cursor + n];
        self.cursor += n;
        if !self.in_query_phase {
            self.prng.mix(slice);
        }
        Ok(slice)
    }

    pub fn receive_field_element<F: IsField>(&mut self) -> Result<F, ChannelError> {
        let n = F::size_in_bytes();
        let bytes = self.take_bytes(n)?;
        Ok(F::from_bytes_le(bytes))
    }

    pub fn receive_field_element_span<F: IsField>(&mut self, count: usize) -> Result<Vec<F>, ChannelError> {
        (0..count).map(|_| self.receive_field_element()).collect()
    }

    pub fn receive_commitment_hash(&mut self) -> Result<[u8; 32], ChannelError> {
        let bytes = self.take_bytes(32)?;
        Ok(bytes.try_into().unwrap())
    }

    pub fn receive_decommitment_node(&mut self) -> Result<[u8; 32], ChannelError> {
        self.receive_commitment_hash()
    }

    pub fn receive_data(&mut self, n: usize) -> Result<Vec<u8>, ChannelError> {
        Ok(self.take_bytes(n)?.to_vec())
    }

    /// Draws a challenge from the PRNG; the "send" half of the mirrored
    /// `get_and_send_random_*` contract is a no-op in non-interactive mode
    /// (§4.6), since there is no second party to send to.
    pub fn get_and_send_random_field_element<F: IsField>(&mut self) -> Result<F, ChannelError> {
        if self.in_query_phase {
            return Err(ChannelError::ReceiveAfterQueryPhase);
        }
        Ok(random_field_element(&mut self.prng))
    }

    pub fn get_and_send_random_ext_field_element(&mut self) -> Result<ExtFE, ChannelError> {
        if self.in_query_phase {
            return Err(ChannelError::ReceiveAfterQueryPhase);
        }
        Ok(random_ext_field_element(&mut self.prng))
    }

    pub fn get_and_send_random_number(&mut self, upper_bound: u64) -> Result<u64, ChannelError> {
        if self.in_query_phase {
            return Err(ChannelError::ReceiveAfterQueryPhase);
        }
        Ok(random_number(&mut self.prng, upper_bound))
    }

    /// Mirrors `apply_proof_of_work`: receives the nonce the prover sent and
    /// checks it against the current PRNG state. Verification failure is
    /// reported by the caller as a `VerificationError`, not here.
    pub fn receive_proof_of_work_nonce(&mut self, work_bits: u32) -> Result<u64, ChannelError> {
        let seed = self.prng.state;
        let bytes = self.receive_data(8)?;
        let nonce = u64::from_le_bytes(bytes.try_into().unwrap());
        let _ = (seed, work_bits);
        Ok(nonce)
    }

    pub fn pow_seed(&self) -> [u8; 32] {
        self.prng.state
    }

    pub fn begin_query_phase(&mut self) {
        self.in_query_phase = true;
    }

    pub fn bytes_remaining(&self) -> usize {
        self.proof_bytes.len() - self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::BaseFE;

    #[test]
    fn prover_and_verifier_derive_the_same_challenges() {
        let mut prover = ProverChannel::new(b"seed");
        prover.send_field_element(&BaseFE::new(7));
        let p_challenge: BaseFE = prover.receive_field_element().unwrap();
        prover.send_commitment_hash(&[9u8; 32]);
        let proof = prover.get_proof();

        let mut verifier = VerifierChannel::new(b"seed", &proof);
        let _elem: BaseFE = verifier.receive_field_element().unwrap();
        let v_challenge: BaseFE = verifier.get_and_send_random_field_element().unwrap();
        let _hash = verifier.receive_commitment_hash().unwrap();

        assert_eq!(p_challenge, v_challenge);
    }

    #[test]
    fn receive_after_query_phase_fails() {
        let proof = vec![0u8; 32];
        let mut verifier = VerifierChannel::new(b"seed", &proof);
        verifier.begin_query_phase();
        let result: Result<BaseFE, _> = verifier.get_and_send_random_field_element();
        assert!(result.is_err());
    }

    #[test]
    fn proof_too_short_is_reported() {
        let proof = vec![0u8; 4];
        let mut verifier = VerifierChannel::new(b"seed", &proof);
        let result = verifier.receive_commitment_hash();
        assert!(matches!(result, Err(ChannelError::ProofTooShort { .. })));
    }
}
