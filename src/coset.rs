//! Cosets and evaluation domains (§3). A `Coset` names a shift of a
//! power-of-two multiplicative subgroup; an `EvaluationDomain` pairs a coset
//! with the concrete list of points it denotes, in the bit-reversed order
//! the rest of the crate's FFT machinery expects.

use crate::errors::DomainError;
use crate::field::IsFFTField;
use crate::fft::bit_reverse;

/// A shift `offset * <generator>` of the unique order-`size` subgroup of
/// `F*`. Two cosets are equal as *sets* iff their offsets differ by an
/// element of the subgroup; this type does not dedupe that, matching the
/// teacher's coset representation (§3: "Coset: identified by (offset, size)
/// pair, not by set value").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coset<F: IsFFTField> {
    size: usize,
    offset: F,
    generator: F,
}

impl<F: IsFFTField> Coset<F> {
    pub fn new(size: usize, offset: F) -> Result<Self, DomainError> {
        if size == 0 || !size.is_power_of_two() {
            return Err(DomainError::NotAPowerOfTwo(size));
        }
        let generator = F::get_subgroup_generator(size as u64).ok_or(DomainError::ZeroGenerator)?;
        Ok(Coset {
            size,
            offset,
            generator,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn offset(&self) -> F {
        self.offset
    }

    pub fn generator(&self) -> F {
        self.generator
    }

    pub fn log2_size(&self) -> u32 {
        self.size.trailing_zeros()
    }

    /// The point at natural index `i` (i.e. `offset * generator^i`), *not*
    /// the bit-reversed storage order `points()` returns.
    pub fn point_at_natural_index(&self, i: usize) -> F {
        self.offset * self.generator.pow(i as u64)
    }

    /// Every point of the coset, in the bit-reversed order an `fft` call
    /// with `natural_output = true` produces (§4.1).
    pub fn points_bit_reversed(&self) -> Vec<F> {
        let bits = self.log2_size();
        (0..self.size as u64)
            .map(|i| self.point_at_natural_index(bit_reverse(i, bits) as usize))
            .collect()
    }

    /// Every point of the coset, in natural order.
    pub fn points_natural(&self) -> Vec<F> {
        (0..self.size).map(|i| self.point_at_natural_index(i)).collect()
    }

    /// A coset of the same size shifted by `factor` (used to derive the LDE
    /// domain's cosets from the trace domain, §4.2).
    pub fn shifted_by(&self, factor: F) -> Self {
        Coset {
            size: self.size,
            offset: self.offset * factor,
            generator: self.generator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::BaseFE;
    use crate::field::IsField;

    #[test]
    fn points_bit_reversed_is_a_permutation_of_points_natural() {
        let coset = Coset::<BaseFE>::new(8, BaseFE::new(5)).unwrap();
        let mut natural = coset.points_natural();
        let mut rev = coset.points_bit_reversed();
        natural.sort_by_key(|f| f.value());
        rev.sort_by_key(|f| f.value());
        assert_eq!(natural, rev);
    }

    #[test]
    fn rejects_non_power_of_two_size() {
        assert!(Coset::<BaseFE>::new(7, BaseFE::one()).is_err());
    }
}
