//! FRI verification, verifier side (§4.7). Mirrors the prover's commit and
//! query phases, substituting "receive" for "send", and checks that each
//! query's folded value is consistent across every layer down to the last.

use crate::channel::VerifierChannel;
use crate::errors::VerificationError;
use crate::field::{BaseFE, ExtFE, IsField};
use crate::merkle_table::verify_row;

use super::{FriLastLayer, FriOptions};

/// What the verifier learns about one committed layer during the commit
/// phase: its root, the challenge drawn for folding into the next layer
/// (`None` for the very last entry, which instead carries the tail
/// polynomial), and the coset parameters needed to recompute query indices.
pub struct VerifiedLayer {
    pub root: [u8; 32],
    pub alpha: Option<ExtFE>,
    pub domain_size: usize,
    pub coset_generator: BaseFE,
    pub coset_offset: BaseFE,
    pub row_width: usize,
}

pub fn commit_phase(
    channel: &mut VerifierChannel,
    options: &FriOptions,
    initial_domain_size: usize,
    initial_gen: BaseFE,
    initial_offset: BaseFE,
) -> Result<(Vec<VerifiedLayer>, FriLastLayer), VerificationError> {
    let _scope = channel.annotate("fri/commit");

    let mut domain_size = initial_domain_size;
    let mut gen = initial_gen;
    let mut offset = initial_offset;
    let mut layers = Vec::new();

    for (i, &step) in options.fri_step_list.iter().enumerate() {
        let root = channel
            .receive_commitment_hash()
            .map_err(|e| VerificationError::rejected(format!("fri layer {i} root: {e}")))?;

        if step == 0 && i == 0 {
            layers.push(VerifiedLayer {
                root,
                alpha: None,
                domain_size,
                coset_generator: gen,
                coset_offset: offset,
                row_width: 1,
            });
            continue;
        }

        let row_width = 1usize << step;
        let alpha = channel
            .get_and_send_random_ext_field_element()
            .map_err(|e| VerificationError::rejected(format!("fri layer {i} challenge: {e}")))?;
        layers.push(VerifiedLayer {
            root,
            alpha: Some(alpha),
            domain_size,
            coset_generator: gen,
            coset_offset: offset,
            row_width,
        });

        domain_size >>= step;
        gen = gen.pow(row_width as u64);
        offset = offset.pow(row_width as u64);
    }

    let mut coefficients = Vec::with_capacity(options.last_layer_degree_bound);
    for _ in 0..options.last_layer_degree_bound {
        let c = channel
            .receive_field_element::<ExtFE>()
            .map_err(|e| VerificationError::rejected(format!("fri last layer coefficient: {e}")))?;
        coefficients.push(c);
    }
    let last_layer = FriLastLayer {
        coefficients,
        domain_size,
        coset_generator: gen,
        coset_offset: offset,
    };

    Ok((layers, last_layer))
}

pub fn draw_query_indices(
    channel: &mut VerifierChannel,
    n_queries: usize,
    layer0_domain_size: usize,
) -> Result<Vec<usize>, VerificationError> {
    (0..n_queries)
        .map(|_| {
            channel
                .get_and_send_random_number(layer0_domain_size as u64)
                .map(|n| n as usize)
                .map_err(|e| VerificationError::rejected(format!("fri query index: {e}")))
        })
        .collect()
}

/// Receives and checks one query's full decommitment chain: layer 0's
/// opened row must match `expected_initial_value` (the caller's independent
/// recomputation of the DEEP combination from the trace/composition
/// openings, binding this chain to the committed trace/composition roots),
/// every layer's opened row must verify against its committed root, and
/// folding the previous layer's row at its challenge must reproduce the
/// value the next layer's row contains at the reduced index, down to the
/// last layer's directly evaluated polynomial.
pub fn verify_query(
    channel: &mut VerifierChannel,
    layers: &[VerifiedLayer],
    last_layer: &FriLastLayer,
    query_index: usize,
    expected_initial_value: ExtFE,
) -> Result<(), VerificationError> {
    let _scope = channel.annotate("fri/query");

    let mut index = query_index;
    let mut expected_value: Option<ExtFE> = Some(expected_initial_value);

    for (i, layer) in layers.iter().enumerate() {
        let row_width = layer.row_width.max(1);
        let row_index = index / row_width;
        let position_in_row = index % row_width;

        let row = channel
            .receive_field_element_span::<ExtFE>(row_width)
            .map_err(|e| VerificationError::rejected(format!("fri layer {i} row: {e}")))?;
        let proof_len = (layer.domain_size / row_width).next_power_of_two().trailing_zeros() as usize;
        let mut proof_nodes = Vec::with_capacity(proof_len);
        for _ in 0..proof_len {
            let node = channel
                .receive_decommitment_node()
                .map_err(|e| VerificationError::rejected(format!("fri layer {i} auth path: {e}")))?;
            proof_nodes.push(node);
        }
        let proof = lambdaworks_crypto::merkle_tree::proof::Proof { merkle_path: proof_nodes };
        if !verify_row(&layer.root, row_index, &row, &proof) {
            return Err(VerificationError::rejected(format!("fri layer {i} decommitment failed")));
        }

        if let Some(expected) = expected_value {
            if row[position_in_row] != expected {
                let reason = if i == 0 {
                    "fri layer 0 value inconsistent with the DEEP combination recomputed from the trace/composition openings".to_string()
                } else {
                    format!("fri layer {i} value inconsistent with previous layer's fold")
                };
                return Err(VerificationError::rejected(reason));
            }
        }

        if let Some(alpha) = layer.alpha {
            expected_value = Some(fold_row_at_point(&row, layer, row_index, alpha));
        } else {
            expected_value = None;
        }
        index = row_index;
    }

    if let Some(expected) = expected_value {
        let point = ExtFE::from_base(last_layer.coset_offset * last_layer.coset_generator.pow(index as u64));
        let actual = last_layer.eval_at_point(point);
        if actual != expected {
            return Err(VerificationError::rejected("fri last layer value mismatch"));
        }
    }
    Ok(())
}

/// Interpolates the opened row (a mini-coset's worth of values, at row
/// index `r` of `layer`'s pre-fold domain) and evaluates at `alpha`; must
/// match the prover's `fold_one_mini_coset` exactly (§4.7).
fn fold_row_at_point(row: &[ExtFE], layer: &VerifiedLayer, r: usize, alpha: ExtFE) -> ExtFE {
    let size_s = row.len();
    let bits = size_s.trailing_zeros();
    let mut bitrev = row.to_vec();
    for i in 0..size_s {
        let j = crate::fft::bit_reverse(i as u64, bits) as usize;
        if i < j {
            bitrev.swap(i, j);
        }
    }

    let m = layer.domain_size / size_s;
    let h = ExtFE::from_base(layer.coset_generator.pow(m as u64));
    let off_r = ExtFE::from_base(layer.coset_offset * layer.coset_generator.pow(r as u64));

    let mut coeffs = vec![ExtFE::zero(); size_s];
    crate::fft::ifft(&bitrev, &mut coeffs, h, off_r, true).expect("row size is a power of two");
    let size_inv = ExtFE::from_u64(size_s as u64).inv().unwrap();
    for c in coeffs.iter_mut() {
        *c = *c * size_inv;
    }
    coeffs.iter().rev().fold(ExtFE::zero(), |acc, c| acc * alpha + *c)
}
