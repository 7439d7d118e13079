//! Polynomial breaker (§4.8.1). A polynomial `f` of degree `< k*n`
//! evaluated on a coset of size `k*n` corresponds to `k` polynomials
//! `h_0, ..., h_{k-1}` of degree `< n` such that `f(x) = sum_i h_i(x^k) *
//! x^i`. `break_into_parts` extracts their evaluations on a single
//! size-`n` coset; `eval_from_samples` is the matching inverse, used by
//! the verifier to recombine an OODS sample without ever holding the h_i
//! explicitly.

use crate::errors::DomainError;
use crate::field::IsFFTField;
use crate::fft::ifft_reverse_to_natural;

/// `evaluations` must hold `f`'s values on a size-`k*n` coset
/// `offset * <gen>`, in the bit-reversed order `fft`'s `natural_output =
/// true` convention produces. Returns `k` vectors, each the evaluations of
/// one `h_i` on the size-`n` coset `offset^k * <gen^k>`, in natural order.
pub fn break_into_parts<F: IsFFTField>(
    evaluations: &[F],
    gen: F,
    offset: F,
    k: usize,
) -> Result<Vec<Vec<F>>, DomainError> {
    if k == 0 || !k.is_power_of_two() {
        return Err(DomainError::NotAPowerOfTwo(k));
    }
    let total = evaluations.len();
    if total % k != 0 {
        return Err(DomainError::SizeMismatch(total, k));
    }
    let n_layers = k.trailing_zeros();

    let partial = ifft_reverse_to_natural(evaluations, gen, offset, n_layers)?;
    let k_inv = F::from_u64(k as u64).inv().ok_or(DomainError::ZeroGenerator)?;
    let scaled: Vec<F> = partial.iter().map(|v| *v * k_inv).collect();

    // De-interleave: after `n_layers` layers the size-k*n buffer holds k
    // interleaved blocks of size n; block i's j-th entry is h_i's
    // coefficient-domain representative at slot j (still requires a
    // forward transform by the caller if coefficients rather than
    // evaluations are wanted — here we hand back evaluations directly by
    // reusing the already-transformed buffer, never materializing h_i's
    // coefficients separately).
    let n = total / k;
    let mut parts = vec![Vec::with_capacity(n); k];
    for (idx, value) in scaled.into_iter().enumerate() {
        parts[idx % k].push(value);
    }
    Ok(parts)
}

/// Inverse operation: given the `k` parts' values at `point^k` (as sampled
/// from an OODS query), reconstructs `f(point)` via Horner's method in `x`
/// (§4.8.1: `f(x) = sum_i h_i(x^k) * x^i`).
pub fn eval_from_samples<F: IsFFTField>(samples_at_point_pow_k: &[F], point: F) -> F {
    samples_at_point_pow_k
        .iter()
        .rev()
        .fold(F::zero(), |acc, h_i| acc * point + *h_i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::BaseFE;
    use crate::field::IsField;
    use crate::fft::fft;

    #[test]
    fn break_into_parts_has_k_parts_of_size_n() {
        let k = 2usize;
        let n = 4usize;
        let total = k * n;

        let coeffs: Vec<BaseFE> = (1..=total as u64).map(BaseFE::new).collect();
        let gen = BaseFE::get_subgroup_generator(total as u64).unwrap();
        let offset = BaseFE::new(3);

        let bits = (total as u64).trailing_zeros();
        let mut bitrev_coeffs = coeffs.clone();
        for i in 0..total {
            let j = crate::fft::bit_reverse(i as u64, bits) as usize;
            if i < j {
                bitrev_coeffs.swap(i, j);
            }
        }
        let mut evals = vec![BaseFE::zero(); total];
        fft(&bitrev_coeffs, &mut evals, gen, offset, true).unwrap();

        let parts = break_into_parts(&evals, gen, offset, k).unwrap();
        assert_eq!(parts.len(), k);
        for part in &parts {
            assert_eq!(part.len(), n);
        }
    }

    #[test]
    fn eval_from_samples_is_horner_in_x() {
        let h0 = BaseFE::new(3);
        let h1 = BaseFE::new(5);
        let x = BaseFE::new(7);
        assert_eq!(eval_from_samples(&[h0, h1], x), h0 + h1 * x);
    }

    fn poly_evaluate(coeffs: &[BaseFE], x: BaseFE) -> BaseFE {
        coeffs.iter().rev().fold(BaseFE::zero(), |acc, c| acc * x + *c)
    }

    /// `break_into_parts` and `eval_from_samples` must actually be inverses
    /// of each other (§4.8.1: `f(x) = sum_i h_i(x^k) * x^i`), not merely
    /// agree on shape. For `w` the `j`-th point of the size-`k*n` coset
    /// (`j < n`), `w^k` is exactly the `j`-th point of the size-`n` coset the
    /// parts live on, so `parts[i][j]` is `h_i(w^k)` and recombining them at
    /// `w` must reproduce `f(w)` evaluated directly from its coefficients.
    #[test]
    fn eval_from_samples_inverts_break_into_parts() {
        let k = 4usize;
        let n = 8usize;
        let total = k * n;

        let coeffs: Vec<BaseFE> = (1..=total as u64).map(BaseFE::new).collect();
        let gen = BaseFE::get_subgroup_generator(total as u64).unwrap();
        let offset = BaseFE::new(3);

        let bits = (total as u64).trailing_zeros();
        let mut bitrev_coeffs = coeffs.clone();
        for i in 0..total {
            let j = crate::fft::bit_reverse(i as u64, bits) as usize;
            if i < j {
                bitrev_coeffs.swap(i, j);
            }
        }
        let mut evals = vec![BaseFE::zero(); total];
        fft(&bitrev_coeffs, &mut evals, gen, offset, true).unwrap();

        let parts = break_into_parts(&evals, gen, offset, k).unwrap();

        for j in [0usize, 1, 3, n - 1] {
            let w = offset * gen.pow(j as u64);
            let samples: Vec<BaseFE> = parts.iter().map(|part| part[j]).collect();
            assert_eq!(eval_from_samples(&samples, w), poly_evaluate(&coeffs, w));
        }
    }
}
