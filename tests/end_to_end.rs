//! End-to-end round trip: prove and verify the reference boundary AIR
//! (§4.8, §8 scenario 1/2: trace_length=1024, n_columns=10, 20 boundary
//! conditions), then check that a tampered witness is rejected before any
//! proof bytes are produced and that a tampered proof is rejected by the
//! verifier.

use stark_core_prover::air::Air;
use stark_core_prover::examples::boundary::{BoundaryAir, BoundaryPublicInputs};
use stark_core_prover::field::BaseFE;
use stark_core_prover::fri::FriOptions;
use stark_core_prover::stark::config::ProofOptions;
use stark_core_prover::stark::{prover, verifier};

const TRACE_LENGTH: usize = 1024;
const N_COLUMNS: usize = 10;

fn step_coefficient(column: usize) -> BaseFE {
    BaseFE::new((column + 1) as u64)
}

fn sample_witness() -> (Vec<Vec<BaseFE>>, BoundaryPublicInputs) {
    let starts: Vec<BaseFE> = (0..N_COLUMNS).map(|c| BaseFE::new(c as u64)).collect();
    let steps: Vec<BaseFE> = (0..N_COLUMNS).map(step_coefficient).collect();
    let trace: Vec<Vec<BaseFE>> = (0..TRACE_LENGTH)
        .map(|row| {
            (0..N_COLUMNS)
                .map(|c| starts[c] + steps[c] * BaseFE::new(row as u64))
                .collect()
        })
        .collect();
    (trace, BoundaryPublicInputs { starts, steps })
}

fn sample_options() -> ProofOptions {
    ProofOptions {
        log_n_cosets: 3,
        fri: FriOptions {
            fri_step_list: vec![3, 3, 2],
            last_layer_degree_bound: 8,
            n_queries: 12,
            proof_of_work_bits: 12,
        },
        constraint_polynomial_task_size: 256,
    }
}

#[test]
fn proof_round_trips() {
    let (trace, public_inputs) = sample_witness();
    let air = BoundaryAir::new(TRACE_LENGTH, public_inputs);
    let options = sample_options();

    let proof = prover::prove(&air, &trace, &options).expect("proving a correct witness must succeed");
    assert!(!proof.is_empty());

    let air_for_verify = BoundaryAir::new(TRACE_LENGTH, {
        let starts: Vec<BaseFE> = (0..N_COLUMNS).map(|c| BaseFE::new(c as u64)).collect();
        let steps: Vec<BaseFE> = (0..N_COLUMNS).map(step_coefficient).collect();
        BoundaryPublicInputs { starts, steps }
    });
    verifier::verify(&air_for_verify, &proof, &options).expect("a correctly generated proof must verify");
}

#[test]
fn tampered_witness_is_rejected_before_proving() {
    let (mut trace, public_inputs) = sample_witness();
    trace[512][4] += BaseFE::new(1);
    let air = BoundaryAir::new(TRACE_LENGTH, public_inputs);
    let options = sample_options();

    let result = prover::prove(&air, &trace, &options);
    assert!(result.is_err());
}

#[test]
fn tampered_proof_bytes_are_rejected() {
    let (trace, public_inputs) = sample_witness();
    let air = BoundaryAir::new(TRACE_LENGTH, public_inputs);
    let options = sample_options();

    let proof = prover::prove(&air, &trace, &options).expect("proving a correct witness must succeed");
    let mut tampered_bytes = proof.into_bytes();
    let last = tampered_bytes.len() - 1;
    tampered_bytes[last] ^= 0xFF;
    let tampered_proof = stark_core_prover::stark::proof::StarkProof::from_bytes(tampered_bytes);

    let air_for_verify = BoundaryAir::new(TRACE_LENGTH, {
        let starts: Vec<BaseFE> = (0..N_COLUMNS).map(|c| BaseFE::new(c as u64)).collect();
        let steps: Vec<BaseFE> = (0..N_COLUMNS).map(step_coefficient).collect();
        BoundaryPublicInputs { starts, steps }
    });
    assert!(verifier::verify(&air_for_verify, &tampered_proof, &options).is_err());
}
