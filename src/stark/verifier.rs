//! STARK orchestrator, verifier side (§4.8). Mirrors the prover step by
//! step, substituting "receive" for "send", then checks the OODS equation
//! and runs the FRI verifier.

use log::info;

use crate::air::Air;
use crate::channel::VerifierChannel;
use crate::errors::VerificationError;
use crate::field::{BaseFE, ExtFE, IsFFTField, IsField};
use crate::merkle_table::verify_row;

use super::config::ProofOptions;
use super::proof::StarkProof;

/// Verifies `proof` against `air` and `options`. Returns `Ok(())` on
/// acceptance; any rejection reason is carried in the error (§7:
/// `VerificationError`, never leaking details of the witness).
pub fn verify<A: Air>(air: &A, proof: &StarkProof, options: &ProofOptions) -> Result<(), VerificationError> {
    options
        .validate(air.composition_degree_bound(), air.trace_length())
        .map_err(|e| VerificationError::rejected(format!("config: {e}")))?;

    let trace_length = air.trace_length();
    let n_columns = air.n_columns();
    let blowup = options.blowup_factor();
    let lde_size = trace_length * blowup;
    let lde_offset = BaseFE::generator();
    let lde_generator = BaseFE::get_subgroup_generator(lde_size as u64)
        .ok_or_else(|| VerificationError::rejected("no subgroup of required order".to_string()))?;
    let trace_generator = BaseFE::get_subgroup_generator(trace_length as u64)
        .ok_or_else(|| VerificationError::rejected("no trace subgroup of required order".to_string()))?;

    info!("verifying proof: trace_length={trace_length} n_columns={n_columns} blowup={blowup}");

    let mut channel = VerifierChannel::new(b"", proof.as_bytes());

    let trace_root = {
        let _scope = channel.annotate("trace");
        channel
            .receive_commitment_hash()
            .map_err(|e| VerificationError::rejected(format!("trace root: {e}")))?
    };

    let random_coefficients: Vec<ExtFE> = (0..air.num_random_coefficients())
        .map(|_| {
            channel
                .get_and_send_random_ext_field_element()
                .map_err(|e| VerificationError::rejected(format!("random coefficient: {e}")))
        })
        .collect::<Result<_, _>>()?;

    let composition_root = {
        let _scope = channel.annotate("composition_trace");
        channel
            .receive_commitment_hash()
            .map_err(|e| VerificationError::rejected(format!("composition root: {e}")))?
    };

    let z = channel
        .get_and_send_random_ext_field_element()
        .map_err(|e| VerificationError::rejected(format!("oods point: {e}")))?;

    let mask = air.mask();
    let mask_values: Vec<ExtFE> = (0..mask.len())
        .map(|_| {
            channel
                .receive_field_element::<ExtFE>()
                .map_err(|e| VerificationError::rejected(format!("mask value: {e}")))
        })
        .collect::<Result<_, _>>()?;

    let z_frobenius = z.frobenius();
    let frobenius_values: Vec<ExtFE> = (0..n_columns)
        .map(|_| {
            channel
                .receive_field_element::<ExtFE>()
                .map_err(|e| VerificationError::rejected(format!("frobenius value: {e}")))
        })
        .collect::<Result<_, _>>()?;

    let k = air.composition_degree_bound() / trace_length;
    let part_values_at_z_pow_k: Vec<ExtFE> = (0..k)
        .map(|_| {
            channel
                .receive_field_element::<ExtFE>()
                .map_err(|e| VerificationError::rejected(format!("composition part value: {e}")))
        })
        .collect::<Result<_, _>>()?;

    // --- OODS check: H(z), recomputed from the mask values the prover sent,
    // must equal f(z) reconstructed from the k part values at z^k via the
    // breaker's inverse (§4.8.1, §4.8 step 5/6). By convention the AIR's
    // mask includes a `row_offset: 0` entry for every column a boundary
    // condition references, so those same mask values double as "the
    // trace's column values at z" the composition evaluator needs.
    let z_pow_k = z.pow(k as u64);
    let periodic_values: Vec<ExtFE> = air
        .periodic_columns()
        .iter()
        .map(|col| ExtFE::from_base(col.eval_at_row(0)))
        .collect();

    let mut trace_values_at_z = vec![ExtFE::zero(); n_columns];
    for (item, value) in mask.iter().zip(mask_values.iter()) {
        if item.row_offset == 0 {
            trace_values_at_z[item.column] = *value;
        }
    }

    let frame = crate::air::Frame { values: &mask_values };
    let evaluator = crate::composition::CompositionEvaluator {
        air,
        trace_root: trace_generator,
        random_coefficients: &random_coefficients,
    };
    let h_at_z = evaluator.eval_at_point(z, &frame, &periodic_values, &trace_values_at_z);
    let reconstructed = crate::breaker::eval_from_samples(&part_values_at_z_pow_k, z_pow_k);
    if h_at_z != reconstructed {
        return Err(VerificationError::rejected("oods equation failed".to_string()));
    }

    let deep_coefficients: Vec<ExtFE> = (0..mask.len() + n_columns + k)
        .map(|_| {
            channel
                .get_and_send_random_ext_field_element()
                .map_err(|e| VerificationError::rejected(format!("deep coefficient: {e}")))
        })
        .collect::<Result<_, _>>()?;

    // --- Step 7 mirror: FRI commit phase, then PoW, then queries. ---
    let (fri_layers, last_layer) = crate::fri::verifier::commit_phase(
        &mut channel,
        &options.fri,
        lde_size,
        lde_generator,
        lde_offset,
    )?;

    let pow_seed = channel.pow_seed();
    let nonce = channel
        .receive_proof_of_work_nonce(options.fri.proof_of_work_bits)
        .map_err(|e| VerificationError::rejected(format!("pow nonce: {e}")))?;
    if !crate::channel::pow::verify(&pow_seed, options.fri.proof_of_work_bits, nonce) {
        return Err(VerificationError::rejected("proof of work invalid".to_string()));
    }

    let query_indices = crate::fri::verifier::draw_query_indices(&mut channel, options.fri.n_queries, lde_size)?;
    channel.begin_query_phase();

    let k = part_values_at_z_pow_k.len();
    let proof_len = lde_size.trailing_zeros() as usize;

    for &q in &query_indices {
        // Mirror of `stark/prover.rs`'s query loop: receive and check the
        // trace and composition openings against the roots received at the
        // start, recompute the DEEP combination from them, and only then
        // let the FRI verifier check that the rest of the fold is
        // consistent with that recomputed value (§4.8 step 7, §4.5). Without
        // this, FRI would only prove that *some* low-degree oracle was
        // committed, not that it was derived from `trace_root`/`composition_root`.
        let trace_row: Vec<BaseFE> = channel
            .receive_field_element_span(n_columns)
            .map_err(|e| VerificationError::rejected(format!("trace row: {e}")))?;
        let trace_proof = read_merkle_proof(&mut channel, proof_len)?;
        if !verify_row(&trace_root, q, &trace_row, &trace_proof) {
            return Err(VerificationError::rejected("trace decommitment failed".to_string()));
        }

        let composition_row: Vec<ExtFE> = channel
            .receive_field_element_span(k)
            .map_err(|e| VerificationError::rejected(format!("composition row: {e}")))?;
        let composition_proof = read_merkle_proof(&mut channel, proof_len)?;
        if !verify_row(&composition_root, q, &composition_row, &composition_proof) {
            return Err(VerificationError::rejected("composition decommitment failed".to_string()));
        }

        let x = ExtFE::from_base(lde_offset * lde_generator.pow(q as u64));
        let deep_value = deep_combination_from_opened_values(
            trace_generator,
            &trace_row,
            &composition_row,
            x,
            z,
            z_frobenius,
            z_pow_k,
            mask,
            &mask_values,
            &frobenius_values,
            &part_values_at_z_pow_k,
            &deep_coefficients,
        );

        crate::fri::verifier::verify_query(&mut channel, &fri_layers, &last_layer, q, deep_value)?;
    }

    Ok(())
}

fn read_merkle_proof(
    channel: &mut VerifierChannel,
    proof_len: usize,
) -> Result<lambdaworks_crypto::merkle_tree::proof::Proof<[u8; 32]>, VerificationError> {
    let mut merkle_path = Vec::with_capacity(proof_len);
    for _ in 0..proof_len {
        let node = channel
            .receive_decommitment_node()
            .map_err(|e| VerificationError::rejected(format!("auth path node: {e}")))?;
        merkle_path.push(node);
    }
    Ok(lambdaworks_crypto::merkle_tree::proof::Proof { merkle_path })
}

/// Verifier-side twin of `stark/prover.rs`'s `deep_combination_at_point`:
/// same DEEP formula, but reading the trace/composition values out of one
/// already-verified opened row each rather than a full in-memory LDE (the
/// verifier never holds one, only these per-query openings).
#[allow(clippy::too_many_arguments)]
fn deep_combination_from_opened_values(
    trace_domain_generator: BaseFE,
    trace_row: &[BaseFE],
    composition_row: &[ExtFE],
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
    let mut acc = ExtFE::zero();
    let mut coeff_idx = 0;

    for (item, mask_value) in mask.iter().zip(mask_values.iter()) {
        let x_i = z * ExtFE::from_base(trace_domain_generator.pow(item.row_offset as u64));
        let column_value = ExtFE::from_base(trace_row[item.column]);
        let num = column_value - *mask_value;
        let den = (x - x_i).inv().expect("query point is never an OODS point");
        acc += coeffs[coeff_idx] * num * den;
        coeff_idx += 1;
    }

    for (c, frob_value) in frobenius_values.iter().enumerate() {
        let column_value = ExtFE::from_base(trace_row[c]);
        let num = column_value - *frob_value;
        let den = (x - z_frobenius).inv().expect("query point is never the Frobenius OODS point");
        acc += coeffs[coeff_idx] * num * den;
        coeff_idx += 1;
    }

    for (h_value, part_value) in composition_row.iter().zip(part_values_at_z_pow_k.iter()) {
        let num = *h_value - *part_value;
        let den = (x - z_pow_k).inv().expect("query point is never z^k");
        acc += coeffs[coeff_idx] * num * den;
        coeff_idx += 1;
    }

    acc
}
