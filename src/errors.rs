//! Error taxonomy (§7). Each enum below is one *kind* of failure, not a
//! single catch-all; callers match on the kind they can plausibly recover
//! from (none of them, per §7's propagation policy — every failure aborts
//! the protocol) versus the kind they must simply report.

use thiserror::Error;

/// FFT/IFFT and bit-reversal shape failures (§4.1).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("size {0} is not a power of two")]
    NotAPowerOfTwo(usize),
    #[error("input size {0} and output size {1} disagree")]
    SizeMismatch(usize, usize),
    #[error("coset generator or offset is zero")]
    ZeroGenerator,
}

/// Inconsistent parameters caught before any proof bytes are produced (§7).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("FRI expected degree bound {expected} does not match composition degree bound {actual}")]
    FriDegreeMismatch { expected: usize, actual: usize },
    #[error("blowup factor 2^{log_n_cosets} must be in [1, 1024] and >= the constraint degree {min_required}")]
    BlowupOutOfRange {
        log_n_cosets: u8,
        min_required: usize,
    },
    #[error("last_layer_degree_bound {bound} exceeds the last FRI layer's domain size {domain_size}")]
    LastLayerTooLarge { bound: usize, domain_size: usize },
    #[error("channel upper_bound {0} must be < 2^48")]
    UpperBoundTooLarge(u64),
    #[error("trace_length must be a power of two >= 2, got {0}")]
    InvalidTraceLength(usize),
    #[error("proof_of_work_bits {0} must be 0 or in [1, 40]")]
    ProofOfWorkBitsOutOfRange(u32),
}

/// Shape mismatches between a trace/config and the AIR that describes it
/// (§7).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("expected {expected} trace columns, found {found}")]
    ColumnCountMismatch { expected: usize, found: usize },
    #[error("expected {expected} random coefficients, found {found}")]
    RandomCoefficientCountMismatch { expected: usize, found: usize },
    #[error("mask references column {0} but the trace only has {1} columns")]
    MaskColumnOutOfRange(usize, usize),
    #[error("periodic column length {values_len} does not divide trace_length {trace_length}, or is not a power of two")]
    PeriodicColumnSize {
        values_len: usize,
        trace_length: usize,
    },
}

/// Misuse of the channel's send/receive state machine (§4.6). Indicates a
/// programming bug, not an adversarial input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("receive_* called after begin_query_phase()")]
    ReceiveAfterQueryPhase,
    #[error("proof bytes exhausted prematurely: needed {needed} more bytes, {available} available")]
    ProofTooShort { needed: usize, available: usize },
}

/// Verifier-side rejection (§7). Carries a short diagnostic that must never
/// leak details of the prover's secret witness.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("{0}")]
    Rejected(String),
}

impl VerificationError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        VerificationError::Rejected(msg.into())
    }
}

/// The AIR reports that a trace is not a valid witness for its constraints.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("given witness is not a correct preimage: {0}")]
pub struct WitnessError(pub String);

/// Top-level error returned by the prover.
#[derive(Debug, Error)]
pub enum ProvingError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error(transparent)]
    Witness(#[from] WitnessError),
}
