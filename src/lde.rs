//! Low-Degree Extension manager (§4.2). Owns the trace domain and the larger
//! evaluation domain (`blowup_factor * trace_length` points split into
//! `n_cosets` disjoint cosets), and caches every column's bit-reversed LDE
//! so the composition step and the FRI commit phase can both reuse it
//! without recomputing an FFT.

use crate::coset::Coset;
use crate::errors::DomainError;
use crate::fft::{fft, ifft};
use crate::field::IsFFTField;

/// One column's cached low-degree extension: its evaluations over the
/// enlarged domain, stored bit-reversed, plus the coefficients it was built
/// from (kept for `get_evaluation_degree`, §4.2).
#[derive(Clone, Debug)]
struct CachedColumn<F: IsFFTField> {
    coefficients: Vec<F>,
    evaluations: Vec<F>,
}

/// Manages the low-degree extension of however many columns get registered
/// with it, all sharing one trace domain and one enlarged evaluation
/// domain split into `n_cosets` disjoint cosets of `trace_length` points
/// each (§4.2).
pub struct LdeManager<F: IsFFTField> {
    trace_domain: Coset<F>,
    lde_domain: Coset<F>,
    n_cosets: usize,
    columns: Vec<CachedColumn<F>>,
}

impl<F: IsFFTField> LdeManager<F> {
    /// `trace_length` and `blowup_factor` must both be powers of two;
    /// `n_cosets` is `blowup_factor` unless the caller wants evaluations
    /// split across fewer, larger cosets (§4.2 allows either).
    pub fn new(
        trace_length: usize,
        blowup_factor: usize,
        lde_offset: F,
    ) -> Result<Self, DomainError> {
        if !blowup_factor.is_power_of_two() {
            return Err(DomainError::NotAPowerOfTwo(blowup_factor));
        }
        let trace_domain = Coset::new(trace_length, F::one())?;
        let lde_domain = Coset::new(trace_length * blowup_factor, lde_offset)?;
        Ok(LdeManager {
            trace_domain,
            lde_domain,
            n_cosets: blowup_factor,
            columns: Vec::new(),
        })
    }

    pub fn trace_domain(&self) -> &Coset<F> {
        &self.trace_domain
    }

    pub fn lde_domain(&self) -> &Coset<F> {
        &self.lde_domain
    }

    pub fn n_cosets(&self) -> usize {
        self.n_cosets
    }

    pub fn blowup_factor(&self) -> usize {
        self.n_cosets
    }

    /// Registers a trace column given as evaluations over the trace domain
    /// (bit-reversed, matching `fft`'s `natural_output = true` output).
    /// Returns the new column's index.
    pub fn add_from_evaluations(&mut self, trace_evaluations_bitrev: &[F]) -> Result<usize, DomainError> {
        let n = self.trace_domain.size();
        if trace_evaluations_bitrev.len() != n {
            return Err(DomainError::SizeMismatch(trace_evaluations_bitrev.len(), n));
        }
        let mut coefficients = vec![F::zero(); n];
        ifft(
            trace_evaluations_bitrev,
            &mut coefficients,
            self.trace_domain.generator(),
            self.trace_domain.offset(),
            true,
        )?;
        let n_inv = F::from_u64(n as u64).inv().unwrap();
        for c in coefficients.iter_mut() {
            *c = *c * n_inv;
        }
        self.add_from_coefficients(&coefficients)
    }

    /// Registers a trace column given directly as monomial coefficients.
    pub fn add_from_coefficients(&mut self, coefficients: &[F]) -> Result<usize, DomainError> {
        let trace_size = self.trace_domain.size();
        if coefficients.len() > trace_size {
            return Err(DomainError::SizeMismatch(coefficients.len(), trace_size));
        }
        let mut padded = coefficients.to_vec();
        padded.resize(self.lde_domain.size(), F::zero());

        let mut evaluations = vec![F::zero(); self.lde_domain.size()];
        fft(
            &padded,
            &mut evaluations,
            self.lde_domain.generator(),
            self.lde_domain.offset(),
            true,
        )?;

        self.columns.push(CachedColumn {
            coefficients: coefficients.to_vec(),
            evaluations,
        });
        Ok(self.columns.len() - 1)
    }

    /// The cached evaluation of column `idx` at natural LDE index `i`.
    /// Evaluations are stored bit-reversed (§4.1's `natural_output = true`
    /// convention), so a natural index is translated on the way in.
    pub fn eval_on_lde_domain(&self, idx: usize, natural_index: usize) -> F {
        let bits = self.lde_domain.log2_size();
        let storage_index = crate::fft::bit_reverse(natural_index as u64, bits) as usize;
        self.columns[idx].evaluations[storage_index]
    }

    /// All evaluations of column `idx` restricted to coset `coset_index`
    /// (`0..n_cosets`), in natural order within that coset (§4.2:
    /// `eval_on_coset`).
    pub fn eval_on_coset(&self, idx: usize, coset_index: usize) -> Vec<F> {
        let trace_size = self.trace_domain.size();
        let bits = self.lde_domain.log2_size();
        (0..trace_size)
            .map(|i| {
                let natural = coset_index * trace_size + i;
                let storage = crate::fft::bit_reverse(natural as u64, bits) as usize;
                self.columns[idx].evaluations[storage]
            })
            .collect()
    }

    /// Direct (non-FFT) evaluation at an arbitrary out-of-domain point, via
    /// Horner's method over the cached coefficients (§4.2: `eval_at_points`,
    /// used for DEEP/OODS queries).
    pub fn eval_at_point(&self, idx: usize, point: F) -> F {
        self.columns[idx]
            .coefficients
            .iter()
            .rev()
            .fold(F::zero(), |acc, c| acc * point + *c)
    }

    /// The degree of the polynomial that column `idx` was built from, i.e.
    /// index of its highest nonzero coefficient (§4.2: `get_evaluation_degree`).
    pub fn get_evaluation_degree(&self, idx: usize) -> usize {
        self.columns[idx]
            .coefficients
            .iter()
            .rposition(|c| *c != F::zero())
            .unwrap_or(0)
    }

    pub fn coefficients(&self, idx: usize) -> &[F] {
        &self.columns[idx].coefficients
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::BaseFE;
    use crate::field::IsField;

    #[test]
    fn eval_on_coset_matches_direct_evaluation() {
        let mut mgr = LdeManager::<BaseFE>::new(8, 2, BaseFE::new(3)).unwrap();
        let coeffs: Vec<BaseFE> = (0..8u64).map(BaseFE::new).collect();
        let idx = mgr.add_from_coefficients(&coeffs).unwrap();

        let coset0 = mgr.eval_on_coset(idx, 0);
        let lde_domain = *mgr.lde_domain();
        for (i, v) in coset0.iter().enumerate() {
            let point = lde_domain.point_at_natural_index(i);
            assert_eq!(*v, mgr.eval_at_point(idx, point));
        }
    }

    #[test]
    fn degree_reports_highest_nonzero_coefficient() {
        let mut mgr = LdeManager::<BaseFE>::new(8, 2, BaseFE::new(3)).unwrap();
        let mut coeffs = vec![BaseFE::zero(); 8];
        coeffs[3] = BaseFE::new(9);
        let idx = mgr.add_from_coefficients(&coeffs).unwrap();
        assert_eq!(mgr.get_evaluation_degree(idx), 3);
    }
}
