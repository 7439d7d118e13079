//! Reference boundary AIR: `n_columns` independent arithmetic progressions,
//! each pinned at its first and last row by a boundary condition. This is
//! the simplest computation that exercises every piece of the orchestrator
//! (a real transition constraint, a full boundary-condition set, no
//! periodic columns) without hiding behind a cryptographic primitive.
//!
//! Column `c`'s recurrence is `trace[row+1][c] = trace[row][c] + step(c)`,
//! so the witness is an arithmetic sequence per column; the two boundary
//! conditions per column pin its first and last values.

use crate::air::{Air, BoundaryCondition, Frame, MaskItem};
use crate::errors::WitnessError;
use crate::field::{BaseFE, ExtFE, IsField};

/// Per-column starting value and common difference.
#[derive(Clone, Debug)]
pub struct BoundaryPublicInputs {
    pub starts: Vec<BaseFE>,
    pub steps: Vec<BaseFE>,
}

pub struct BoundaryAir {
    trace_length: usize,
    n_columns: usize,
    public_inputs: BoundaryPublicInputs,
    mask: Vec<MaskItem>,
}

fn step_coefficient(column: usize) -> BaseFE {
    BaseFE::new((column + 1) as u64)
}

impl Air for BoundaryAir {
    type PublicInputs = BoundaryPublicInputs;

    fn new(trace_length: usize, public_inputs: Self::PublicInputs) -> Self {
        let n_columns = public_inputs.starts.len();
        assert_eq!(n_columns, public_inputs.steps.len(), "starts/steps length mismatch");
        let mut mask = Vec::with_capacity(n_columns * 2);
        for column in 0..n_columns {
            mask.push(MaskItem { column, row_offset: 0 });
            mask.push(MaskItem { column, row_offset: 1 });
        }
        BoundaryAir {
            trace_length,
            n_columns,
            public_inputs,
            mask,
        }
    }

    fn trace_length(&self) -> usize {
        self.trace_length
    }

    fn n_columns(&self) -> usize {
        self.n_columns
    }

    fn num_random_coefficients(&self) -> usize {
        // mask.len() transition coefficients (one per column) plus one per
        // boundary condition (§4.4's convention, mirrored by `composition`).
        self.mask.len() + self.boundary_conditions().len()
    }

    fn composition_degree_bound(&self) -> usize {
        self.trace_length * 2
    }

    fn mask(&self) -> &[MaskItem] {
        &self.mask
    }

    fn eval_transition(
        &self,
        frame: &Frame<ExtFE>,
        _periodic_values: &[ExtFE],
        random_coefficients: &[ExtFE],
    ) -> ExtFE {
        let mut acc = ExtFE::zero();
        for column in 0..self.n_columns {
            let current = frame.get(2 * column);
            let next = frame.get(2 * column + 1);
            let step = ExtFE::from_base(step_coefficient(column));
            acc += random_coefficients[column] * (next - current - step);
        }
        acc
    }

    fn boundary_conditions(&self) -> Vec<BoundaryCondition> {
        let last_row = self.trace_length - 1;
        let mut out = Vec::with_capacity(self.n_columns * 2);
        for column in 0..self.n_columns {
            let start = self.public_inputs.starts[column];
            let step = step_coefficient(column);
            let last_value = start + step * BaseFE::new(last_row as u64);
            out.push(BoundaryCondition {
                column,
                row: 0,
                value: ExtFE::from_base(start),
            });
            out.push(BoundaryCondition {
                column,
                row: last_row,
                value: ExtFE::from_base(last_value),
            });
        }
        out
    }

    fn validate_witness(&self, trace: &[Vec<BaseFE>]) -> Result<(), WitnessError> {
        if trace.len() != self.trace_length {
            return Err(WitnessError(format!(
                "expected {} rows, found {}",
                self.trace_length,
                trace.len()
            )));
        }
        for (row_idx, row) in trace.iter().enumerate() {
            if row.len() != self.n_columns {
                return Err(WitnessError(format!(
                    "row {row_idx} has {} columns, expected {}",
                    row.len(),
                    self.n_columns
                )));
            }
        }
        for column in 0..self.n_columns {
            let step = step_coefficient(column);
            if trace[0][column] != self.public_inputs.starts[column] {
                return Err(WitnessError(format!("column {column} does not start at the declared value")));
            }
            for row in 0..self.trace_length - 1 {
                let expected = trace[row][column] + step;
                if trace[row + 1][column] != expected {
                    return Err(WitnessError(format!(
                        "column {column} breaks its arithmetic progression at row {row}"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trace(trace_length: usize, n_columns: usize) -> (Vec<Vec<BaseFE>>, BoundaryPublicInputs) {
        let starts: Vec<BaseFE> = (0..n_columns).map(|c| BaseFE::new(c as u64)).collect();
        let steps: Vec<BaseFE> = (0..n_columns).map(step_coefficient).collect();
        let trace: Vec<Vec<BaseFE>> = (0..trace_length)
            .map(|row| {
                (0..n_columns)
                    .map(|c| starts[c] + steps[c] * BaseFE::new(row as u64))
                    .collect()
            })
            .collect();
        (trace, BoundaryPublicInputs { starts, steps })
    }

    #[test]
    fn accepts_a_correct_arithmetic_witness() {
        let (trace, public_inputs) = sample_trace(16, 3);
        let air = BoundaryAir::new(16, public_inputs);
        assert!(air.validate_witness(&trace).is_ok());
    }

    #[test]
    fn rejects_a_single_tampered_cell() {
        let (mut trace, public_inputs) = sample_trace(16, 3);
        trace[5][1] += BaseFE::new(1);
        let air = BoundaryAir::new(16, public_inputs);
        assert!(air.validate_witness(&trace).is_err());
    }

    #[test]
    fn boundary_conditions_pin_first_and_last_row() {
        let (_, public_inputs) = sample_trace(1024, 10);
        let air = BoundaryAir::new(1024, public_inputs);
        let boundary = air.boundary_conditions();
        assert_eq!(boundary.len(), 20);
        assert!(boundary.iter().any(|bc| bc.row == 0));
        assert!(boundary.iter().any(|bc| bc.row == 1023));
    }
}
