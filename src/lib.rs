//! Core IOP machinery of a non-interactive STARK prover/verifier: trace
//! commitment, the composition polynomial, out-of-domain sampling and DEEP,
//! and FRI, wired together by [`stark::prover::prove`] /
//! [`stark::verifier::verify`]. Concrete AIR instances — the constraint
//! systems being proved — live under [`examples`] and are otherwise treated
//! as pluggable implementations of [`air::Air`].

pub mod air;
pub mod breaker;
pub mod channel;
pub mod composition;
pub mod coset;
pub mod errors;
pub mod examples;
pub mod fft;
pub mod field;
pub mod fri;
pub mod lde;
pub mod merkle_table;
pub mod periodic_column;
pub mod stark;
