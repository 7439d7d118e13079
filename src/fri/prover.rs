//! FRI commit and query phases, prover side (§4.7).

use crate::channel::ProverChannel;
use crate::errors::ConfigError;
use crate::fft::{bit_reverse, ifft};
use crate::field::{BaseFE, ExtFE, IsField};
use crate::merkle_table::TableCommitment;

use super::{FriLastLayer, FriLayer, FriOptions};

/// Interpolates the `2^step`-point mini-coset starting at natural index `r`
/// of a size-`domain_size` coset `(gen, offset)`, and evaluates the result
/// at `alpha` (§4.7: "the standard FRI combine").
fn fold_one_mini_coset(
    evaluations_natural: &[ExtFE],
    m: usize,
    r: usize,
    step: u32,
    gen: BaseFE,
    offset: BaseFE,
    alpha: ExtFE,
) -> ExtFE {
    let size_s = 1usize << step;
    let mini_natural: Vec<ExtFE> = (0..size_s).map(|t| evaluations_natural[r + t * m]).collect();

    let bits = step;
    let mut mini_bitrev = mini_natural;
    for i in 0..size_s {
        let j = bit_reverse(i as u64, bits) as usize;
        if i < j {
            mini_bitrev.swap(i, j);
        }
    }

    let h = ExtFE::from_base(gen.pow(m as u64));
    let off_r = ExtFE::from_base(offset * gen.pow(r as u64));

    let mut coeffs = vec![ExtFE::zero(); size_s];
    ifft(&mini_bitrev, &mut coeffs, h, off_r, true).expect("mini-coset size is a power of two");
    let size_inv = ExtFE::from_u64(size_s as u64).inv().unwrap();
    for c in coeffs.iter_mut() {
        *c = *c * size_inv;
    }
    coeffs.iter().rev().fold(ExtFE::zero(), |acc, c| acc * alpha + *c)
}

/// Folds a whole layer's evaluations (given in natural order) down by
/// `step` bits.
fn fold_layer(
    evaluations_natural: &[ExtFE],
    gen: BaseFE,
    offset: BaseFE,
    step: u32,
    alpha: ExtFE,
) -> Vec<ExtFE> {
    let n = evaluations_natural.len();
    let m = n >> step;
    (0..m)
        .map(|r| fold_one_mini_coset(evaluations_natural, m, r, step, gen, offset, alpha))
        .collect()
}

fn to_natural(evaluations_bitrev: &[ExtFE]) -> Vec<ExtFE> {
    let bits = evaluations_bitrev.len().trailing_zeros();
    let mut out = evaluations_bitrev.to_vec();
    for i in 0..out.len() {
        let j = bit_reverse(i as u64, bits) as usize;
        if i < j {
            out.swap(i, j);
        }
    }
    out
}

fn commit_rows(evaluations_natural: &[ExtFE], row_width: usize) -> TableCommitment<ExtFE> {
    let rows: Vec<Vec<ExtFE>> = evaluations_natural
        .chunks(row_width)
        .map(|chunk| chunk.to_vec())
        .collect();
    TableCommitment::commit(&rows)
}

/// Runs the full commit phase, sending one Merkle root per intermediate
/// layer and the last layer's coefficients, and returns every layer's
/// materialized evaluations (needed by the query phase for decommitment).
pub fn commit_phase(
    channel: &mut ProverChannel,
    options: &FriOptions,
    initial_evaluations_bitrev: &[ExtFE],
    initial_gen: BaseFE,
    initial_offset: BaseFE,
) -> Result<(Vec<FriLayer>, FriLastLayer), ConfigError> {
    let _scope = channel.annotate("fri/commit");

    let mut current = to_natural(initial_evaluations_bitrev);
    let mut gen = initial_gen;
    let mut offset = initial_offset;
    let mut layers = Vec::new();

    for (i, &step) in options.fri_step_list.iter().enumerate() {
        if step == 0 {
            // Layer 0 may skip folding entirely; just commit and continue.
            if i == 0 {
                let commitment = commit_rows(&current, 1);
                channel.send_commitment_hash(&commitment.root());
                layers.push(FriLayer {
                    evaluations: current.clone(),
                    domain_size: current.len(),
                    coset_generator: gen,
                    coset_offset: offset,
                    commitment,
                    row_width: 1,
                });
                continue;
            }
        }
        let row_width = 1usize << step;
        let commitment_before_fold = commit_rows(&current, row_width);
        channel.send_commitment_hash(&commitment_before_fold.root());
        layers.push(FriLayer {
            evaluations: current.clone(),
            domain_size: current.len(),
            coset_generator: gen,
            coset_offset: offset,
            commitment: commitment_before_fold,
            row_width,
        });

        let alpha = channel.receive_ext_field_element().expect("pre-query-phase receive");
        current = fold_layer(&current, gen, offset, step, alpha);
        gen = gen.pow(row_width as u64);
        offset = offset.pow(row_width as u64);
    }

    let last_layer = FriLastLayer {
        coefficients: {
            let bits = current.len().trailing_zeros();
            let mut bitrev = current.clone();
            for i in 0..bitrev.len() {
                let j = bit_reverse(i as u64, bits) as usize;
                if i < j {
                    bitrev.swap(i, j);
                }
            }
            let mut coeffs = vec![ExtFE::zero(); current.len()];
            ifft(
                &bitrev,
                &mut coeffs,
                ExtFE::from_base(gen),
                ExtFE::from_base(offset),
                true,
            )
            .expect("last layer size is a power of two");
            let n_inv = ExtFE::from_u64(current.len() as u64).inv().unwrap();
            for c in coeffs.iter_mut() {
                *c = *c * n_inv;
            }
            coeffs.truncate(options.last_layer_degree_bound);
            coeffs
        },
        domain_size: current.len(),
        coset_generator: gen,
        coset_offset: offset,
    };
    for c in &last_layer.coefficients {
        channel.send_field_element(c);
    }

    Ok((layers, last_layer))
}

/// Draws `n_queries` indices uniformly in `[0, layer0_domain_size)`, run
/// before `begin_query_phase()` per §4.6 ("channel draws n_queries
/// indices" happens as part of the last pre-query-phase exchange, PoW
/// aside).
pub fn draw_query_indices(channel: &mut ProverChannel, n_queries: usize, layer0_domain_size: usize) -> Vec<usize> {
    (0..n_queries)
        .map(|_| {
            channel
                .receive_number(layer0_domain_size as u64)
                .expect("pre-query-phase receive") as usize
        })
        .collect()
}

/// Decommits the row containing `row_index` for a single layer.
pub fn open_layer(layer: &FriLayer, row_index: usize) -> crate::merkle_table::TableCommitmentOpening<ExtFE> {
    let row_width = layer.row_width.max(1);
    let start = row_index * row_width;
    let row = layer.evaluations[start..start + row_width].to_vec();
    let proof = layer.commitment.open(&[row_index]).remove(0);
    crate::merkle_table::TableCommitmentOpening { row, proof }
}

/// Sends every layer's decommitment for one query index (§4.7: "the prover
/// decommits the mini-coset surrounding the query").
pub fn send_query_decommitments(channel: &mut ProverChannel, layers: &[FriLayer], query_index: usize) {
    let mut index = query_index;
    for layer in layers {
        let row_width = layer.row_width.max(1);
        let row_index = index / row_width;
        let opening = open_layer(layer, row_index);
        channel.send_field_element_span(&opening.row);
        for node in &opening.proof.merkle_path {
            channel.send_decommitment_node(node);
        }
        index = row_index;
    }
}
