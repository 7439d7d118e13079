//! Field algebra (§3). The base/extension field arithmetic itself can be
//! treated as an abstract black box; here it is pinned down to one concrete
//! FFT-friendly prime field (the Goldilocks field, `p = 2^64 - 2^32 + 1`,
//! 2-adicity 32) and its quadratic extension, so that the rest of the crate
//! (FFT, LDE, composition polynomial, FRI, channel) has something concrete
//! to close over.
//!
//! Everything downstream is written against the `IsField`/`IsFFTField`
//! traits rather than against `BaseFE`/`ExtFE` directly, so an AIR is
//! generic over whichever field implements them.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// `p = 2^64 - 2^32 + 1`.
pub const MODULUS: u64 = 0xFFFF_FFFF_0000_0001;

/// Quadratic non-residue used to build `ExtFE = BaseFE[x]/(x^2 - NON_RESIDUE)`.
const NON_RESIDUE: u64 = 7;

fn add_mod(a: u64, b: u64) -> u64 {
    let (sum, carry) = a.overflowing_add(b);
    let (reduced, underflow) = sum.overflowing_sub(MODULUS);
    if carry || !underflow {
        reduced
    } else {
        sum
    }
}

fn sub_mod(a: u64, b: u64) -> u64 {
    if a >= b {
        a - b
    } else {
        MODULUS - (b - a)
    }
}

fn mul_mod(a: u64, b: u64) -> u64 {
    (((a as u128) * (b as u128)) % (MODULUS as u128)) as u64
}

fn pow_mod(mut base: u64, mut exp: u64) -> u64 {
    let mut result = 1u64;
    base %= MODULUS;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base);
        }
        exp >>= 1;
        base = mul_mod(base, base);
    }
    result
}

/// Common operations every field element in this crate supports (§3).
pub trait IsField:
    Copy
    + Clone
    + fmt::Debug
    + PartialEq
    + Eq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    fn zero() -> Self;
    fn one() -> Self;
    /// Embeds a small unsigned integer (e.g. a domain size, used to
    /// normalize an IFFT) as a field element.
    fn from_u64(value: u64) -> Self;
    fn inv(&self) -> Option<Self>;
    fn pow(&self, exponent: u64) -> Self {
        let mut result = Self::one();
        let mut base = *self;
        let mut exponent = exponent;
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = result * base;
            }
            exponent >>= 1;
            base = base * base;
        }
        result
    }
    /// Canonical fixed-size little-endian encoding (§6).
    fn to_bytes_le(&self) -> Vec<u8>;
    fn size_in_bytes() -> usize;
    /// Inverse of `to_bytes_le`; `bytes.len()` must equal `size_in_bytes()`.
    fn from_bytes_le(bytes: &[u8]) -> Self;
}

/// Fields that additionally support FFT: a distinguished generator of the
/// full multiplicative group, and subgroup generators of every power-of-two
/// order dividing `p - 1` (§3).
pub trait IsFFTField: IsField {
    /// A generator of the full multiplicative group `F*`.
    fn generator() -> Self;
    /// An element of multiplicative order `n`. `n` must be a power of two
    /// dividing `p - 1`.
    fn get_subgroup_generator(n: u64) -> Option<Self>;
    fn two_adicity() -> u32;
}

/// `BaseFE`: the prime field `F_p`.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct BaseFE(u64);

impl BaseFE {
    pub fn new(value: u64) -> Self {
        BaseFE(value % MODULUS)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn from_le_array(bytes: &[u8; 8]) -> Self {
        BaseFE::new(u64::from_le_bytes(*bytes))
    }
}

impl fmt::Debug for BaseFE {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BaseFE({})", self.0)
    }
}

impl From<u64> for BaseFE {
    fn from(value: u64) -> Self {
        BaseFE::new(value)
    }
}

impl Add for BaseFE {
    type Output = BaseFE;
    fn add(self, rhs: Self) -> Self::Output {
        BaseFE(add_mod(self.0, rhs.0))
    }
}
impl Sub for BaseFE {
    type Output = BaseFE;
    fn sub(self, rhs: Self) -> Self::Output {
        BaseFE(sub_mod(self.0, rhs.0))
    }
}
impl Mul for BaseFE {
    type Output = BaseFE;
    fn mul(self, rhs: Self) -> Self::Output {
        BaseFE(mul_mod(self.0, rhs.0))
    }
}
impl Neg for BaseFE {
    type Output = BaseFE;
    fn neg(self) -> Self::Output {
        BaseFE(sub_mod(0, self.0))
    }
}
impl AddAssign for BaseFE {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl SubAssign for BaseFE {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
impl MulAssign for BaseFE {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}
impl Div for BaseFE {
    type Output = BaseFE;
    fn div(self, rhs: Self) -> Self::Output {
        self * rhs.inv().expect("division by zero field element")
    }
}

impl IsField for BaseFE {
    fn zero() -> Self {
        BaseFE(0)
    }
    fn one() -> Self {
        BaseFE(1)
    }
    fn from_u64(value: u64) -> Self {
        BaseFE::new(value)
    }
    fn inv(&self) -> Option<Self> {
        if self.0 == 0 {
            return None;
        }
        Some(BaseFE(pow_mod(self.0, MODULUS - 2)))
    }
    fn to_bytes_le(&self) -> Vec<u8> {
        self.0.to_le_bytes().to_vec()
    }
    fn size_in_bytes() -> usize {
        8
    }
    fn from_bytes_le(bytes: &[u8]) -> Self {
        let mut array = [0u8; 8];
        array.copy_from_slice(&bytes[..8]);
        BaseFE::from_le_array(&array)
    }
}

impl IsFFTField for BaseFE {
    fn generator() -> Self {
        BaseFE::new(7)
    }
    fn two_adicity() -> u32 {
        32
    }
    fn get_subgroup_generator(n: u64) -> Option<Self> {
        if !n.is_power_of_two() || n == 0 {
            return None;
        }
        let log2_n = n.trailing_zeros();
        if log2_n > Self::two_adicity() {
            return None;
        }
        // generator of the full 2-adic subgroup of order 2^two_adicity,
        // raised to the appropriate power to land on order n.
        let root_of_unity = BaseFE::new(0xabd0a6e8aa3d8a0e);
        let exponent = 1u64 << (Self::two_adicity() - log2_n);
        Some(root_of_unity.pow(exponent))
    }
}

/// `ExtFE`: the degree-2 extension `F_{p^2} = F_p[x]/(x^2 - NON_RESIDUE)`,
/// an element `a0 + a1*x` stored as `[a0, a1]`.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct ExtFE([BaseFE; 2]);

impl fmt::Debug for ExtFE {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtFE({:?}, {:?})", self.0[0], self.0[1])
    }
}

impl ExtFE {
    pub fn new(a0: BaseFE, a1: BaseFE) -> Self {
        ExtFE([a0, a1])
    }

    pub fn components(&self) -> (BaseFE, BaseFE) {
        (self.0[0], self.0[1])
    }

    /// The explicit `BaseFE -> ExtFE` embedding required by §3.
    pub fn from_base(value: BaseFE) -> Self {
        ExtFE([value, BaseFE::zero()])
    }

    /// Conjugation: raising to the `p`-th power. For a quadratic extension
    /// this is exactly the nontrivial element of `Gal(F_{p^2}/F_p)`, i.e.
    /// negating the non-base component.
    pub fn frobenius(&self) -> Self {
        ExtFE([self.0[0], -self.0[1]])
    }

    /// Draws a uniformly random extension-field element from a
    /// byte-consuming PRNG (§3: "Random sampling from a byte-consuming
    /// PRNG").
    pub fn sample(mut next_u64: impl FnMut() -> u64) -> Self {
        ExtFE([BaseFE::new(next_u64()), BaseFE::new(next_u64())])
    }
}

impl IsFFTField for ExtFE {
    fn generator() -> Self {
        ExtFE::from_base(BaseFE::generator())
    }
    fn two_adicity() -> u32 {
        BaseFE::two_adicity()
    }
    fn get_subgroup_generator(n: u64) -> Option<Self> {
        // A power-of-two-order subgroup generator of the base field, lifted
        // into the extension, still has the same order there: the
        // embedding is an injective ring homomorphism.
        BaseFE::get_subgroup_generator(n).map(ExtFE::from_base)
    }
}

impl From<BaseFE> for ExtFE {
    fn from(value: BaseFE) -> Self {
        ExtFE::from_base(value)
    }
}

fn non_residue() -> BaseFE {
    BaseFE::new(NON_RESIDUE)
}

impl Add for ExtFE {
    type Output = ExtFE;
    fn add(self, rhs: Self) -> Self::Output {
        ExtFE([self.0[0] + rhs.0[0], self.0[1] + rhs.0[1]])
    }
}
impl Sub for ExtFE {
    type Output = ExtFE;
    fn sub(self, rhs: Self) -> Self::Output {
        ExtFE([self.0[0] - rhs.0[0], self.0[1] - rhs.0[1]])
    }
}
impl Mul for ExtFE {
    type Output = ExtFE;
    fn mul(self, rhs: Self) -> Self::Output {
        let q = non_residue();
        ExtFE([
            self.0[0] * rhs.0[0] + self.0[1] * rhs.0[1] * q,
            self.0[0] * rhs.0[1] + self.0[1] * rhs.0[0],
        ])
    }
}
impl Neg for ExtFE {
    type Output = ExtFE;
    fn neg(self) -> Self::Output {
        ExtFE([-self.0[0], -self.0[1]])
    }
}
impl AddAssign for ExtFE {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl SubAssign for ExtFE {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
impl MulAssign for ExtFE {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}
impl Div for ExtFE {
    type Output = ExtFE;
    fn div(self, rhs: Self) -> Self::Output {
        self * rhs.inv().expect("division by zero field element")
    }
}

impl IsField for ExtFE {
    fn zero() -> Self {
        ExtFE([BaseFE::zero(), BaseFE::zero()])
    }
    fn one() -> Self {
        ExtFE([BaseFE::one(), BaseFE::zero()])
    }
    fn from_u64(value: u64) -> Self {
        ExtFE::from_base(BaseFE::new(value))
    }
    fn inv(&self) -> Option<Self> {
        // (a0 + a1 x)(a0 - a1 x) = a0^2 - a1^2 * non_residue
        let norm = self.0[0] * self.0[0] - self.0[1] * self.0[1] * non_residue();
        let norm_inv = norm.inv()?;
        Some(ExtFE([self.0[0] * norm_inv, -(self.0[1] * norm_inv)]))
    }
    fn to_bytes_le(&self) -> Vec<u8> {
        let mut bytes = self.0[0].to_bytes_le();
        bytes.extend(self.0[1].to_bytes_le());
        bytes
    }
    fn size_in_bytes() -> usize {
        16
    }
    fn from_bytes_le(bytes: &[u8]) -> Self {
        let a0 = BaseFE::from_bytes_le(&bytes[0..8]);
        let a1 = BaseFE::from_bytes_le(&bytes[8..16]);
        ExtFE([a0, a1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_inverse_round_trips() {
        let a = BaseFE::new(1234567);
        let inv = a.inv().unwrap();
        assert_eq!(a * inv, BaseFE::one());
    }

    #[test]
    fn ext_inverse_round_trips() {
        let a = ExtFE::new(BaseFE::new(3), BaseFE::new(5));
        let inv = a.inv().unwrap();
        assert_eq!(a * inv, ExtFE::one());
    }

    #[test]
    fn embedding_and_frobenius_fix_base_elements() {
        let a = BaseFE::new(42);
        let lifted = ExtFE::from_base(a);
        assert_eq!(lifted.frobenius(), lifted);
    }

    #[test]
    fn subgroup_generator_has_claimed_order() {
        let n = 1024u64;
        let g = BaseFE::get_subgroup_generator(n).unwrap();
        assert_eq!(g.pow(n), BaseFE::one());
        assert_ne!(g.pow(n / 2), BaseFE::one());
    }
}
