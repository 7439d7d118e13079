//! FRI low-degree test (§4.7). Proves that a committed oracle's evaluations
//! agree with a polynomial of bounded degree by iteratively folding onto
//! smaller domains, committing each, and finally sending a short directly
//! checkable tail polynomial.
//!
//! Rather than a binary-only fold (one halving per layer, one challenge per
//! halving), this version honors a configurable `fri_step_list`: layer `i`
//! may fold by any power-of-two factor `2^{fri_step_list[i]}` using a single
//! challenge, by interpolating each mini-coset with an inverse FFT and
//! evaluating the result at that challenge (§4.7).

pub mod prover;
pub mod verifier;

use crate::field::{BaseFE, ExtFE, IsField};
use crate::merkle_table::TableCommitment;

/// Per-layer folding configuration (§4.7 and §12).
#[derive(Clone, Debug)]
pub struct FriOptions {
    /// `fri_step_list[0]` may be 0 (no folding on the first layer);
    /// `fri_step_list[i>0] >= 1`.
    pub fri_step_list: Vec<u32>,
    pub last_layer_degree_bound: usize,
    pub n_queries: usize,
    pub proof_of_work_bits: u32,
}

impl FriOptions {
    pub fn total_folding_log2(&self) -> u32 {
        self.fri_step_list.iter().sum()
    }

    /// The expected degree bound implied by these parameters (§4.7
    /// invariant: must equal the composition oracle's degree bound).
    pub fn expected_degree_bound(&self) -> usize {
        self.last_layer_degree_bound * (1usize << self.total_folding_log2())
    }
}

/// One committed FRI layer: its evaluations (over a coset of `BaseFE`
/// points, values in `ExtFE`), the coset's generator/offset so query
/// indices can be reinterpreted at the next layer's domain size, and the
/// Merkle commitment to those evaluations, row-major by mini-coset.
pub struct FriLayer {
    pub evaluations: Vec<ExtFE>,
    pub domain_size: usize,
    pub coset_generator: BaseFE,
    pub coset_offset: BaseFE,
    pub commitment: TableCommitment<ExtFE>,
    /// Number of base-field points folded together per Merkle row at this
    /// layer (i.e. `2^{fri_step_list[next]}` when building the *next*
    /// layer's commitment; row width of this layer's own table is
    /// `2^{fri_step_list[this layer's own step]}`, tracked by the prover).
    pub row_width: usize,
}

/// The final layer: instead of a Merkle commitment, the prover sends the
/// tail polynomial's coefficients directly (§4.7 "Last layer").
#[derive(Clone, Debug)]
pub struct FriLastLayer {
    pub coefficients: Vec<ExtFE>,
    pub domain_size: usize,
    pub coset_generator: BaseFE,
    pub coset_offset: BaseFE,
}

impl FriLastLayer {
    pub fn eval_at_point(&self, point: ExtFE) -> ExtFE {
        self.coefficients
            .iter()
            .rev()
            .fold(ExtFE::zero(), |acc, c| acc * point + *c)
    }
}
