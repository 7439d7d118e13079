//! Proof-of-Work grinding (§4.6.1). Finds the *smallest* 8-byte nonce `nonce`
//! such that `H(H(MAGIC || seed || work_bits) || nonce)` has at least
//! `work_bits` leading zero bits, where `H` is Blake2s-256 with an explicit
//! length prefix. Minimality (not mere validity) is required so the output
//! is deterministic across thread counts, which Fiat-Shamir reproducibility
//! depends on.

use blake2::Blake2s256;
use digest::Digest;
use std::sync::atomic::{AtomicU64, Ordering};

/// Fixed domain-separation tag (§4.6.1).
const MAGIC: u64 = 0x0123456789ABCDED;

/// Nonces are searched in chunks of this size by each worker (§5).
const DEFAULT_LOG_CHUNK_SIZE: u32 = 20;

fn hash_len_prefixed(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2s256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

fn challenge(seed: &[u8], work_bits: u32) -> [u8; 32] {
    hash_len_prefixed(&[&MAGIC.to_le_bytes(), seed, &work_bits.to_le_bytes()])
}

fn leading_zero_bits(digest: &[u8; 32]) -> u32 {
    let mut count = 0u32;
    for byte in digest {
        if *byte == 0 {
            count += 8;
        } else {
            count += byte.leading_zeros();
            break;
        }
    }
    count
}

fn nonce_satisfies(challenge: &[u8; 32], nonce: u64, work_bits: u32) -> bool {
    let digest = hash_len_prefixed(&[challenge, &nonce.to_le_bytes()]);
    leading_zero_bits(&digest) >= work_bits
}

/// Runs the nonce search. `work_bits == 0` is a no-op: nonce `0` always
/// satisfies a zero-bit requirement (§8 boundary behavior).
pub fn prove(seed: &[u8], work_bits: u32) -> u64 {
    debug_assert!(
        (1..=40).contains(&work_bits) || work_bits == 0,
        "work_bits out of [0, 40] range; ProofOptions::validate should have rejected this already"
    );
    if work_bits == 0 {
        return 0;
    }
    let challenge = challenge(seed, work_bits);

    let log_chunk_size = DEFAULT_LOG_CHUNK_SIZE;
    let chunk_size = 1u64 << log_chunk_size;
    let next_chunk_to_search = AtomicU64::new(0);
    let lowest_nonce_found = AtomicU64::new(u64::MAX);

    let search_worker = || loop {
        // Once some worker has found a valid nonce, no chunk starting past
        // it can possibly contain a *smaller* valid nonce, so later workers
        // stop claiming new chunks.
        let found_so_far = lowest_nonce_found.load(Ordering::Acquire);
        let chunk_index = next_chunk_to_search.fetch_add(1, Ordering::AcqRel);
        let chunk_start = chunk_index * chunk_size;
        if found_so_far != u64::MAX && chunk_start >= found_so_far {
            break;
        }

        for offset in 0..chunk_size {
            let nonce = chunk_start + offset;
            if nonce_satisfies(&challenge, nonce, work_bits) {
                lowest_nonce_found.fetch_min(nonce, Ordering::AcqRel);
                break;
            }
        }
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        let n_threads = rayon::current_num_threads().max(1);
        (0..n_threads).into_par_iter().for_each(|_| search_worker());
    }
    #[cfg(not(feature = "parallel"))]
    {
        search_worker();
    }

    lowest_nonce_found.load(Ordering::Acquire)
}

/// Single-hash check; `work_bits == 0` always verifies (mirrors `prove`'s
/// no-op convention).
pub fn verify(seed: &[u8], work_bits: u32, nonce: u64) -> bool {
    if work_bits == 0 {
        return true;
    }
    let challenge = challenge(seed, work_bits);
    nonce_satisfies(&challenge, nonce, work_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bits_is_a_no_op() {
        let nonce = prove(b"seed", 0);
        assert_eq!(nonce, 0);
        assert!(verify(b"seed", 0, nonce));
    }

    #[test]
    fn found_nonce_verifies() {
        let seed = b"deterministic-seed";
        let nonce = prove(seed, 12);
        assert!(verify(seed, 12, nonce));
    }

    #[test]
    fn tampered_nonce_fails() {
        let seed = b"another-seed";
        let nonce = prove(seed, 10);
        assert!(!verify(seed, 10, nonce.wrapping_add(1)) || nonce == u64::MAX);
    }

    #[test]
    fn search_is_deterministic_across_calls() {
        let seed = b"repeatable";
        let a = prove(seed, 10);
        let b = prove(seed, 10);
        assert_eq!(a, b);
    }
}
