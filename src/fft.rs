//! FFT / IFFT over a coset of a multiplicative subgroup, and bit-reversal
//! permutation (§4.1).
//!
//! A radix-2 iterative Cooley-Tukey transform: evaluation is always in the
//! forward direction (coefficients -> evaluations); `ifft` runs the inverse
//! butterfly network and leaves its output un-normalized (scaled by the
//! transform size), so callers that want coefficients proper must divide
//! by `n` themselves.

use crate::errors::DomainError;
use crate::field::IsFFTField;

/// Reverses the low `bits` bits of `n`. `bits == 0` is the identity.
pub fn bit_reverse(n: u64, bits: u32) -> u64 {
    if bits == 0 {
        return n;
    }
    n.reverse_bits() >> (64 - bits)
}

fn bit_reverse_permute_in_place<T: Copy>(v: &mut [T]) {
    let n = v.len();
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = bit_reverse(i as u64, bits) as usize;
        if i < j {
            v.swap(i, j);
        }
    }
}

/// In-place radix-2 DIT butterfly network. `v` must already hold its input
/// in bit-reversed order; on return it holds the transform in natural
/// order. `twiddle(step, k)` returns the twiddle factor for butterfly size
/// `2*step` at index `k` (`k < step`).
fn butterfly_network<F: IsFFTField>(v: &mut [F], root: F) {
    let n = v.len();
    let mut step = 1usize;
    while step < n {
        let half = step;
        step *= 2;
        let group_count = n / step;
        // twiddle base for this layer: a primitive `step`-th root of unity.
        let layer_root = root.pow((n / step) as u64);
        for group in 0..group_count {
            let mut w = F::one();
            let base = group * step;
            for k in 0..half {
                let u = v[base + k];
                let t = v[base + k + half] * w;
                v[base + k] = u + t;
                v[base + k + half] = u - t;
                w = w * layer_root;
            }
        }
    }
}

fn check_pow_two(n: usize) -> Result<u32, DomainError> {
    if n == 0 || !n.is_power_of_two() {
        return Err(DomainError::NotAPowerOfTwo(n));
    }
    Ok(n.trailing_zeros())
}

/// Scales coefficient `i` by `offset^i`, turning an evaluation over
/// `<gen>` into an evaluation over the coset `offset * <gen>`.
fn apply_coset_shift<F: IsFFTField>(coeffs: &mut [F], offset: F) {
    let mut pow = F::one();
    for c in coeffs.iter_mut() {
        *c = *c * pow;
        pow = pow * offset;
    }
}

/// `fft(src, dst, gen, offset, natural_output)`: evaluates the polynomial
/// given by `src` (coefficients) on the coset `offset * <gen>`, writing
/// into `dst`. `natural_output == true` means `src` holds coefficients in
/// bit-reversed order and `dst` receives evaluations in natural order;
/// `false` flips both conventions (§4.1).
pub fn fft<F: IsFFTField>(
    src: &[F],
    dst: &mut [F],
    gen: F,
    offset: F,
    natural_output: bool,
) -> Result<(), DomainError> {
    if src.len() != dst.len() {
        return Err(DomainError::SizeMismatch(src.len(), dst.len()));
    }
    check_pow_two(src.len())?;

    // Bring coefficients to natural order so the coset shift (which scales
    // coefficient `i` by `offset^i`) lines up with the true monomial index.
    let mut natural_coeffs: Vec<F> = src.to_vec();
    if natural_output {
        bit_reverse_permute_in_place(&mut natural_coeffs);
    }
    apply_coset_shift(&mut natural_coeffs, offset);

    // The butterfly network wants its input in bit-reversed order.
    let mut work = natural_coeffs;
    bit_reverse_permute_in_place(&mut work);
    butterfly_network(&mut work, gen);
    // `work` now holds evaluations in natural order.
    if !natural_output {
        bit_reverse_permute_in_place(&mut work);
    }
    dst.copy_from_slice(&work);
    Ok(())
}

/// Inverse transform. Output is un-normalized (scaled by `src.len()`);
/// callers that want coefficients proper must multiply by `n^{-1}`.
pub fn ifft<F: IsFFTField>(
    src: &[F],
    dst: &mut [F],
    gen: F,
    offset: F,
    natural_output: bool,
) -> Result<(), DomainError> {
    let inv_gen = gen.inv().ok_or(DomainError::ZeroGenerator)?;
    let inv_offset = offset.inv().ok_or(DomainError::ZeroGenerator)?;
    fft(src, dst, inv_gen, inv_offset, natural_output)
}

/// Performs only the first `n_layers` butterfly layers of an IFFT (used by
/// the polynomial breaker, §4.8.1). `src` is consumed in bit-reversed
/// order like a full `ifft` with `natural_output = false` would expect.
pub fn ifft_reverse_to_natural<F: IsFFTField>(
    src: &[F],
    gen: F,
    offset: F,
    n_layers: u32,
) -> Result<Vec<F>, DomainError> {
    check_pow_two(src.len())?;
    let inv_gen = gen.inv().ok_or(DomainError::ZeroGenerator)?;
    let inv_offset = offset.inv().ok_or(DomainError::ZeroGenerator)?;

    let mut work = src.to_vec();
    apply_coset_shift(&mut work, inv_offset);

    let n = work.len();
    let mut step = 1usize;
    let mut layers_done = 0u32;
    while step < n && layers_done < n_layers {
        let half = step;
        step *= 2;
        let group_count = n / step;
        let layer_root = inv_gen.pow((n / step) as u64);
        for group in 0..group_count {
            let mut w = F::one();
            let base = group * step;
            for k in 0..half {
                let u = work[base + k];
                let t = work[base + k + half] * w;
                work[base + k] = u + t;
                work[base + k + half] = u - t;
                w = w * layer_root;
            }
        }
        layers_done += 1;
    }
    Ok(work)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::BaseFE;
    use crate::field::IsField;

    fn poly_evaluate(coeffs: &[BaseFE], x: BaseFE) -> BaseFE {
        coeffs
            .iter()
            .rev()
            .fold(BaseFE::zero(), |acc, c| acc * x + *c)
    }

    #[test]
    fn bit_reverse_is_an_involution() {
        for bits in [0u32, 1, 2, 3, 4, 8] {
            for n in 0u64..(1 << bits.min(6)) {
                assert_eq!(bit_reverse(bit_reverse(n, bits), bits), n);
            }
        }
    }

    #[test]
    fn fft_matches_direct_evaluation() {
        let n = 8usize;
        let log_n = n.trailing_zeros();
        let gen = BaseFE::get_subgroup_generator(n as u64).unwrap();
        let offset = BaseFE::new(3);

        let coeffs: Vec<BaseFE> = (0..n as u64).map(BaseFE::new).collect();
        let mut bitrev_coeffs = coeffs.clone();
        bit_reverse_permute_in_place(&mut bitrev_coeffs);

        let mut evals = vec![BaseFE::zero(); n];
        fft(&bitrev_coeffs, &mut evals, gen, offset, true).unwrap();

        for i in 0..n {
            let x = offset * gen.pow(i as u64);
            assert_eq!(evals[i], poly_evaluate(&coeffs, x));
        }
        let _ = log_n;
    }
}
