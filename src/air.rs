//! AIR (Algebraic Intermediate Representation) interface (§3). An AIR
//! describes one computation's transition and boundary constraints over a
//! trace of `n_columns` columns and `trace_length` rows; everything else in
//! this crate (composition polynomial, FRI, orchestrator) is generic over
//! `impl Air`.

use crate::errors::WitnessError;
use crate::field::{BaseFE, ExtFE, IsField};
use crate::periodic_column::PeriodicColumn;

/// One entry of an AIR's mask: reads column `column` at `row_offset` rows
/// ahead of the constraint's evaluation point (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskItem {
    pub column: usize,
    pub row_offset: usize,
}

/// A single boundary condition: column `column` must equal `value` at trace
/// row `row` (§3).
#[derive(Clone, Debug)]
pub struct BoundaryCondition {
    pub column: usize,
    pub row: usize,
    pub value: ExtFE,
}

/// A view into the trace at the rows a transition constraint's mask reads,
/// already gathered according to the AIR's `mask()` (§3: evaluation frame).
pub struct Frame<'a, F: IsField> {
    /// `values[i]` corresponds to `mask()[i]`.
    pub values: &'a [F],
}

impl<'a, F: IsField> Frame<'a, F> {
    pub fn get(&self, mask_index: usize) -> F {
        self.values[mask_index]
    }
}

/// Implemented once per computation (e.g. a Rescue hash chain, a Ziggy
/// signature check, §8). The orchestrator never constructs trace rows
/// itself; it only calls into an `Air` to validate a witness and evaluate
/// constraints.
pub trait Air {
    type PublicInputs;

    fn new(trace_length: usize, public_inputs: Self::PublicInputs) -> Self;

    fn trace_length(&self) -> usize;
    fn n_columns(&self) -> usize;

    /// Number of random coefficients the composition polynomial needs — one
    /// per transition constraint plus one per boundary condition, or
    /// whatever convention the concrete AIR's `eval_transition` /
    /// `eval_boundary` expects (§4.4).
    fn num_random_coefficients(&self) -> usize;

    /// Degree bound of the composition polynomial this AIR produces, used
    /// to size the evaluation domain and cross-check the FRI parameters
    /// (§4.4, §7 ConfigError).
    fn composition_degree_bound(&self) -> usize;

    /// The `(row_offset, column)` pairs every transition constraint reads
    /// (§3). The orchestrator evaluates one shared frame per trace position
    /// from this mask rather than letting each constraint read the trace
    /// directly.
    fn mask(&self) -> &[MaskItem];

    fn periodic_columns(&self) -> &[PeriodicColumn<BaseFE>] {
        &[]
    }

    /// Returns one value per transition constraint, evaluated at the trace
    /// position `frame` is centered on. A valid witness makes every entry
    /// zero at every trace position outside its constraint's exemption
    /// range.
    fn eval_transition(
        &self,
        frame: &Frame<ExtFE>,
        periodic_values: &[ExtFE],
        random_coefficients: &[ExtFE],
    ) -> ExtFE;

    fn boundary_conditions(&self) -> Vec<BoundaryCondition>;

    /// Checks a concrete witness against every constraint directly (no
    /// polynomial machinery), for the prover to fail fast with a
    /// `WitnessError` instead of producing a proof that will never verify
    /// (§7).
    fn validate_witness(&self, trace: &[Vec<BaseFE>]) -> Result<(), WitnessError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_get_reads_mask_aligned_value() {
        let values = [ExtFE::from_base(BaseFE::new(1)), ExtFE::from_base(BaseFE::new(2))];
        let frame = Frame { values: &values };
        assert_eq!(frame.get(1), values[1]);
    }
}
