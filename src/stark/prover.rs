//! STARK orchestrator, prover side (§4.8). Drives every component
//! (LDE manager, Merkle table commitment, composition polynomial, the
//! polynomial breaker, FRI) through the seven steps of the protocol in
//! order, all mediated by one [`ProverChannel`].

use log::info;

use crate::air::Air;
use crate::breaker;
use crate::channel::ProverChannel;
use crate::composition;
use crate::errors::ProvingError;
use crate::fft::bit_reverse;
use crate::field::{BaseFE, ExtFE, IsFFTField, IsField};
use crate::lde::LdeManager;
use crate::merkle_table::TableCommitment;

use super::config::ProofOptions;
use super::proof::StarkProof;

fn to_bitrev<T: Copy>(natural: &[T]) -> Vec<T> {
    let bits = natural.len().trailing_zeros();
    let mut out = natural.to_vec();
    for i in 0..out.len() {
        let j = bit_reverse(i as u64, bits) as usize;
        if i < j {
            out.swap(i, j);
        }
    }
    out
}

fn interpolate_coefficients(evals_natural: &[ExtFE], gen: BaseFE, offset: BaseFE) -> Vec<ExtFE> {
    let n = evals_natural.len();
    let bitrev = to_bitrev(evals_natural);
    let mut coeffs = vec![ExtFE::zero(); n];
    crate::fft::ifft(&bitrev, &mut coeffs, ExtFE::from_base(gen), ExtFE::from_base(offset), true)
        .expect("n is a power of two");
    let n_inv = ExtFE::from_u64(n as u64).inv().unwrap();
    for c in coeffs.iter_mut() {
        *c = *c * n_inv;
    }
    coeffs
}

/// Runs the prover end to end for one AIR instance and witness, producing a
/// proof (§4.8 steps 1-7).
pub fn prove<A: Air + Sync>(air: &A, trace: &[Vec<BaseFE>], options: &ProofOptions) -> Result<StarkProof, ProvingError> {
    air.validate_witness(trace)?;

    options.validate(air.composition_degree_bound(), air.trace_length())?;

    let trace_length = air.trace_length();
    let n_columns = air.n_columns();
    let blowup = options.blowup_factor();
    let lde_offset = BaseFE::generator();

    info!(
        "starting proof: trace_length={trace_length} n_columns={n_columns} blowup={blowup}"
    );

    // --- Step 1: commit on trace. ---
    let mut lde = LdeManager::<BaseFE>::new(trace_length, blowup, lde_offset)?;
    for col in 0..n_columns {
        let column_values: Vec<BaseFE> = (0..trace_length).map(|row| trace[row][col]).collect();
        lde.add_from_evaluations(&to_bitrev(&column_values))?;
    }

    let lde_size = lde.lde_domain().size();
    let trace_rows: Vec<Vec<BaseFE>> = (0..lde_size)
        .map(|i| (0..n_columns).map(|c| lde.eval_on_lde_domain(c, i)).collect())
        .collect();
    let trace_commitment = TableCommitment::commit(&trace_rows);

    let mut channel = ProverChannel::new(b"");
    {
        let _scope = channel.annotate("trace");
        channel.send_commitment_hash(&trace_commitment.root());
    }

    // --- Step 2: constraint coefficients. ---
    let random_coefficients: Vec<ExtFE> = (0..air.num_random_coefficients())
        .map(|_| channel.receive_ext_field_element())
        .collect::<Result<_, _>>()?;

    // --- Step 3 & 4: build and evaluate composition polynomial. ---
    let composition_evals = composition::eval_on_domain(air, &lde, air.mask(), &random_coefficients);

    // --- Step 5: OODS / DEEP. ---
    let k = air.composition_degree_bound() / trace_length;
    let composition_evals_bitrev = to_bitrev(&composition_evals);
    let parts = breaker::break_into_parts(
        &composition_evals_bitrev,
        ExtFE::from_base(lde.lde_domain().generator()),
        ExtFE::from_base(lde.lde_domain().offset()),
        k,
    )?;

    // Each h_i has degree < trace_length; interpolate its coefficients from
    // its values on the size-trace_length coset the breaker produced them
    // on (generator/offset raised to the k-th power, §4.8.1), then
    // re-extend each h_i across the *full* LDE domain so it can be
    // committed and later opened by FRI alongside the trace (its evaluation
    // domain coincides with `lde`'s; only its coefficient field differs:
    // ExtFE, not BaseFE).
    let part_coset_gen = lde.lde_domain().generator().pow(k as u64);
    let part_coset_offset = lde.lde_domain().offset().pow(k as u64);
    let part_coefficients: Vec<Vec<ExtFE>> = parts
        .iter()
        .map(|part| interpolate_coefficients(part, part_coset_gen, part_coset_offset))
        .collect();

    let mut composition_lde = LdeManager::<ExtFE>::new(trace_length, blowup, ExtFE::from_base(lde_offset))?;
    let mut composition_column_indices = Vec::with_capacity(k);
    for coeffs in &part_coefficients {
        composition_column_indices.push(composition_lde.add_from_coefficients(coeffs)?);
    }

    // Committed at the same size and indexing as the trace, so a single
    // query index opens a row from each table (§4.5, §4.8 step 6).
    let composition_rows: Vec<Vec<ExtFE>> = (0..lde_size)
        .map(|i| (0..k).map(|part| composition_lde.eval_on_lde_domain(part, i)).collect())
        .collect();
    let composition_commitment = TableCommitment::commit(&composition_rows);
    {
        let _scope = channel.annotate("composition_trace");
        channel.send_commitment_hash(&composition_commitment.root());
    }

    let z = channel.receive_ext_field_element()?;

    let mask = air.mask();
    let mask_values: Vec<ExtFE> = mask
        .iter()
        .map(|item| {
            let point = z * ExtFE::from_base(lde.trace_domain().generator().pow(item.row_offset as u64));
            eval_trace_at_ext_point(&lde, item.column, point)
        })
        .collect();
    for v in &mask_values {
        channel.send_field_element(v);
    }

    let z_frobenius = z.frobenius();
    let frobenius_values: Vec<ExtFE> = (0..n_columns)
        .map(|c| eval_trace_at_ext_point(&lde, c, z_frobenius))
        .collect();
    for v in &frobenius_values {
        channel.send_field_element(v);
    }

    let z_pow_k = z.pow(k as u64);
    let part_values_at_z_pow_k: Vec<ExtFE> = part_coefficients
        .iter()
        .map(|coeffs| coeffs.iter().rev().fold(ExtFE::zero(), |acc, c| acc * z_pow_k + *c))
        .collect();
    for v in &part_values_at_z_pow_k {
        channel.send_field_element(v);
    }

    // --- Step 6: second composition round (DEEP combination). ---
    let deep_coefficients: Vec<ExtFE> = (0..mask.len() + n_columns + k)
        .map(|_| channel.receive_ext_field_element())
        .collect::<Result<_, _>>()?;

    let deep_evals: Vec<ExtFE> = (0..lde_size)
        .map(|i| {
            let x = ExtFE::from_base(lde.lde_domain().point_at_natural_index(i));
            deep_combination_at_point(
                &lde,
                &composition_lde,
                &composition_column_indices,
                i,
                x,
                z,
                z_frobenius,
                z_pow_k,
                mask,
                &mask_values,
                &frobenius_values,
                &part_values_at_z_pow_k,
                &deep_coefficients,
            )
        })
        .collect();

    // --- Step 7: FRI on the second composition evaluation. ---
    let deep_evals_bitrev = to_bitrev(&deep_evals);
    let (layers, last_layer) = crate::fri::prover::commit_phase(
        &mut channel,
        &options.fri,
        &deep_evals_bitrev,
        lde.lde_domain().generator(),
        lde.lde_domain().offset(),
    )?;

    channel.apply_proof_of_work(options.fri.proof_of_work_bits);
    let query_indices = crate::fri::prover::draw_query_indices(&mut channel, options.fri.n_queries, lde_size);
    channel.begin_query_phase();
    for &q in &query_indices {
        // Bind the FRI-tested oracle back to the committed trace and
        // composition tables: decommit both at the same query index the
        // FRI chain is about to open, so the verifier can recompute this
        // query's DEEP value independently and check it against FRI layer
        // 0 before trusting the rest of the fold (§4.8 step 7, §4.5).
        let trace_opening = trace_commitment.open(&[q]).remove(0);
        channel.send_field_element_span(&trace_rows[q]);
        for node in &trace_opening.merkle_path {
            channel.send_decommitment_node(node);
        }

        let composition_opening = composition_commitment.open(&[q]).remove(0);
        channel.send_field_element_span(&composition_rows[q]);
        for node in &composition_opening.merkle_path {
            channel.send_decommitment_node(node);
        }

        crate::fri::prover::send_query_decommitments(&mut channel, &layers, q);
    }
    let _ = last_layer;

    Ok(StarkProof::from_bytes(channel.get_proof()))
}

fn eval_trace_at_ext_point(lde: &LdeManager<BaseFE>, column: usize, point: ExtFE) -> ExtFE {
    lde.coefficients(column)
        .iter()
        .rev()
        .fold(ExtFE::zero(), |acc, c| acc * point + ExtFE::from_base(*c))
}

#[allow(clippy::too_many_arguments)]
fn deep_combination_at_point(
    lde: &LdeManager<BaseFE>,
    composition_lde: &LdeManager<ExtFE>,
    composition_column_indices: &[usize],
    lde_index: usize,
    x: ExtFE,
    z: ExtFE,
    z_frobenius: ExtFE,
    z_pow_k: ExtFE,
    mask: &[crate::air::MaskItem],
    mask_values: &[ExtFE],
    frobenius_values: &[ExtFE],
    part_values_at_z_pow_k: &[ExtFE],
    coeffs: &[ExtFE],
) -> ExtFE {
    let trace_root = lde.trace_domain().generator();
    let mut acc = ExtFE::zero();
    let mut coeff_idx = 0;

    for (item, mask_value) in mask.iter().zip(mask_values.iter()) {
        let x_i = z * ExtFE::from_base(trace_root.pow(item.row_offset as u64));
        let column_value = ExtFE::from_base(lde.eval_on_lde_domain(item.column, lde_index));
        let num = column_value - *mask_value;
        let den = (x - x_i).inv().expect("query point is never an OODS point");
        acc += coeffs[coeff_idx] * num * den;
        coeff_idx += 1;
    }

    for (c, frob_value) in frobenius_values.iter().enumerate() {
        let column_value = ExtFE::from_base(lde.eval_on_lde_domain(c, lde_index));
        let num = column_value - *frob_value;
        let den = (x - z_frobenius).inv().expect("query point is never the Frobenius OODS point");
        acc += coeffs[coeff_idx] * num * den;
        coeff_idx += 1;
    }

    for (&part_idx, part_value) in composition_column_indices.iter().zip(part_values_at_z_pow_k.iter()) {
        let h_value = composition_lde.eval_on_lde_domain(part_idx, lde_index);
        let num = h_value - *part_value;
        let den = (x - z_pow_k).inv().expect("query point is never z^k");
        acc += coeffs[coeff_idx] * num * den;
        coeff_idx += 1;
    }

    acc
}
