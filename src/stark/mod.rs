//! STARK orchestrator (§4.8): ties every component together behind two
//! entry points, [`prover::prove`] and [`verifier::verify`].

pub mod config;
pub mod proof;
pub mod prover;
pub mod verifier;
