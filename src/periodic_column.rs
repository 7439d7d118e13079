//! Periodic columns (§4.3). A periodic column repeats a short pattern of
//! `period` values across the whole trace; rather than storing or
//! polynomial-interpolating the full trace length, it supports O(1) lookups
//! by masking the index, and only expands into coset evaluations lazily
//! when the composition step actually needs them.

use crate::errors::ShapeError;
use crate::field::IsFFTField;

/// `values.len()` must be a power of two and must divide `trace_length`
/// (enforced at construction, §4.3 invariant).
#[derive(Clone, Debug)]
pub struct PeriodicColumn<F: IsFFTField> {
    values: Vec<F>,
    mask: usize,
    trace_length: usize,
}

impl<F: IsFFTField> PeriodicColumn<F> {
    pub fn new(values: Vec<F>, trace_length: usize) -> Result<Self, ShapeError> {
        let period = values.len();
        let valid = period > 0
            && period.is_power_of_two()
            && trace_length % period == 0;
        if !valid {
            return Err(ShapeError::PeriodicColumnSize {
                values_len: period,
                trace_length,
            });
        }
        Ok(PeriodicColumn {
            mask: period - 1,
            values,
            trace_length,
        })
    }

    pub fn period(&self) -> usize {
        self.values.len()
    }

    pub fn trace_length(&self) -> usize {
        self.trace_length
    }

    /// The value this column takes at trace row `index`, found in O(1) by
    /// masking the low bits (valid because `period` is a power of two).
    pub fn eval_at_row(&self, index: usize) -> F {
        self.values[index & self.mask]
    }

    /// Expands the column's repeating pattern to a full `trace_length`-sized
    /// vector in natural order, for callers that need it materialized (e.g.
    /// to feed the LDE manager like any other column).
    pub fn expand_to_trace_length(&self) -> Vec<F> {
        (0..self.trace_length)
            .map(|i| self.eval_at_row(i))
            .collect()
    }

    /// Returns the column's values restricted to one coset of an enlarged
    /// evaluation domain of `coset_size` points, given that coset's starting
    /// offset relative to the trace domain as a row-index stride. Since a
    /// periodic column's value only depends on `row mod period`, and cosets
    /// of the LDE domain interleave trace rows at a fixed `stride`, this
    /// reduces to repeating a `period`-sized block `coset_size / period`
    /// times starting at `coset_start_row & mask`.
    pub fn get_coset(&self, coset_start_row: usize, coset_size: usize, stride: usize) -> Vec<F> {
        (0..coset_size)
            .map(|i| {
                let row = coset_start_row + i * stride;
                self.eval_at_row(row)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::BaseFE;

    #[test]
    fn rejects_period_not_dividing_trace_length() {
        let values = vec![BaseFE::new(1), BaseFE::new(2), BaseFE::new(3)];
        assert!(PeriodicColumn::new(values, 16).is_err());
    }

    #[test]
    fn eval_at_row_wraps_around_period() {
        let values = vec![BaseFE::new(1), BaseFE::new(2), BaseFE::new(3), BaseFE::new(4)];
        let col = PeriodicColumn::new(values, 16).unwrap();
        assert_eq!(col.eval_at_row(0), col.eval_at_row(4));
        assert_eq!(col.eval_at_row(5), col.eval_at_row(9));
    }

    #[test]
    fn expand_matches_trace_length() {
        let values = vec![BaseFE::new(7), BaseFE::new(9)];
        let col = PeriodicColumn::new(values, 8).unwrap();
        assert_eq!(col.expand_to_trace_length().len(), 8);
    }
}
