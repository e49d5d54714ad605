//! Backend implementations for different SIMD instruction sets
//!
//! Every backend implements [`Simd4fBackend`], the complete 4-lane kernel
//! contract. Exactly one of them is bound to [`crate::NativeBackend`] at build
//! time; the others that compile for the target stay nameable so the test
//! suite can hold each one to the same contract.
//!
//! # Safety
//!
//! All `unsafe` code is isolated within backend implementations. Only the raw
//! pointer load/store methods are `unsafe` to call; [`crate::Simd4`] wraps them
//! behind slice-checked methods.
//!
//! # Backends
//!
//! - `scalar`: Portable exact-formula implementation (no SIMD)
//! - `sse2`: x86_64 baseline SIMD (128-bit), estimate-and-refine reciprocal/rsqrt
//! - `neon`: AArch64 SIMD (128-bit), estimate-and-refine reciprocal/rsqrt/sqrt

pub mod refine;
pub mod scalar;

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
pub mod sse2;

#[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
pub mod neon;

use crate::Backend;

/// Sign-bit mask negating lanes 1 and 3
pub const SIGN_MASK_0101: [u32; 4] = [0x0000_0000, 0x8000_0000, 0x0000_0000, 0x8000_0000];

/// Sign-bit mask negating lanes 0 and 2
pub const SIGN_MASK_1010: [u32; 4] = [0x8000_0000, 0x0000_0000, 0x8000_0000, 0x0000_0000];

/// Sign-bit mask negating every lane
pub const SIGN_MASK_1111: [u32; 4] = [0x8000_0000; 4];

/// The 4-lane kernel contract
///
/// Lane order is fixed across implementations: position 0 = x, 1 = y,
/// 2 = z, 3 = w. Every operation is a pure function of its inputs.
///
/// Operations are exact unless documented otherwise. The reciprocal/sqrt
/// family is approximate on estimate-and-refine backends; see
/// [`crate::tolerance`] for the bounds each backend guarantees.
pub trait Simd4fBackend {
    /// Physical representation of four f32 lanes
    type Lane: Copy + Send + Sync + 'static;

    /// Which backend this is
    const KIND: Backend;

    // ---------------------------------------------------------------------
    // Construction & transfer
    // ---------------------------------------------------------------------

    /// Lanes `(x, y, z, w)`
    fn create(x: f32, y: f32, z: f32, w: f32) -> Self::Lane;

    /// All lanes `+0.0`
    fn zero() -> Self::Lane;

    /// All lanes equal to `v`
    fn splat(v: f32) -> Self::Lane;

    /// Broadcast lane 0
    fn splat_x(v: Self::Lane) -> Self::Lane;

    /// Broadcast lane 1
    fn splat_y(v: Self::Lane) -> Self::Lane;

    /// Broadcast lane 2
    fn splat_z(v: Self::Lane) -> Self::Lane;

    /// Broadcast lane 3
    fn splat_w(v: Self::Lane) -> Self::Lane;

    /// Load four floats from an unaligned buffer
    ///
    /// # Safety
    ///
    /// `ary` must be valid for reading 4 consecutive `f32` values.
    unsafe fn uload4(ary: *const f32) -> Self::Lane;

    /// Load three floats from an unaligned buffer, lane 3 = `+0.0`
    ///
    /// # Safety
    ///
    /// `ary` must be valid for reading 3 consecutive `f32` values.
    unsafe fn uload3(ary: *const f32) -> Self::Lane;

    /// Load two floats from an unaligned buffer, lanes 2 and 3 = `+0.0`
    ///
    /// # Safety
    ///
    /// `ary` must be valid for reading 2 consecutive `f32` values.
    unsafe fn uload2(ary: *const f32) -> Self::Lane;

    /// Store all four lanes to an unaligned buffer
    ///
    /// # Safety
    ///
    /// `ary` must be valid for writing 4 consecutive `f32` values.
    unsafe fn ustore4(v: Self::Lane, ary: *mut f32);

    /// Store lanes 0..3 to an unaligned buffer
    ///
    /// # Safety
    ///
    /// `ary` must be valid for writing 3 consecutive `f32` values.
    unsafe fn ustore3(v: Self::Lane, ary: *mut f32);

    /// Store lanes 0..2 to an unaligned buffer
    ///
    /// # Safety
    ///
    /// `ary` must be valid for writing 2 consecutive `f32` values.
    unsafe fn ustore2(v: Self::Lane, ary: *mut f32);

    // ---------------------------------------------------------------------
    // Arithmetic
    // ---------------------------------------------------------------------

    /// Per-lane `lhs + rhs`
    fn add(lhs: Self::Lane, rhs: Self::Lane) -> Self::Lane;

    /// Per-lane `lhs - rhs`
    fn sub(lhs: Self::Lane, rhs: Self::Lane) -> Self::Lane;

    /// Per-lane `lhs * rhs`
    fn mul(lhs: Self::Lane, rhs: Self::Lane) -> Self::Lane;

    /// Per-lane `lhs / rhs` (IEEE division on every backend)
    fn div(lhs: Self::Lane, rhs: Self::Lane) -> Self::Lane;

    /// Per-lane `m1 * m2 + a`, possibly fused
    fn madd(m1: Self::Lane, m2: Self::Lane, a: Self::Lane) -> Self::Lane;

    // ---------------------------------------------------------------------
    // Reciprocal & square root family
    // ---------------------------------------------------------------------

    /// Per-lane `1 / v`
    fn reciprocal(v: Self::Lane) -> Self::Lane;

    /// Per-lane `sqrt(v)`
    fn sqrt(v: Self::Lane) -> Self::Lane;

    /// Per-lane `1 / sqrt(v)`
    fn rsqrt(v: Self::Lane) -> Self::Lane;

    // ---------------------------------------------------------------------
    // Rearrangement & bit manipulation
    // ---------------------------------------------------------------------

    /// `(w, x, y, z)`
    fn shuffle_wxyz(v: Self::Lane) -> Self::Lane;

    /// `(z, w, x, y)`
    fn shuffle_zwxy(v: Self::Lane) -> Self::Lane;

    /// `(y, z, w, x)`
    fn shuffle_yzwx(v: Self::Lane) -> Self::Lane;

    /// `(a.z, a.w, b.z, b.w)`
    fn merge_high(a: Self::Lane, b: Self::Lane) -> Self::Lane;

    /// Reinterpret each lane as its `u32` bit pattern, XOR with `mask`, and
    /// reinterpret back.
    ///
    /// This is the single place a backend casts between float and integer
    /// views of a lane. The sign flips below only ever pass masks whose set
    /// bits are sign bits.
    fn xor_bits(v: Self::Lane, mask: [u32; 4]) -> Self::Lane;

    /// Lane 3 = `+0.0`
    fn zero_w(v: Self::Lane) -> Self::Lane;

    /// Lanes 2 and 3 = `+0.0`
    fn zero_zw(v: Self::Lane) -> Self::Lane;

    // ---------------------------------------------------------------------
    // Cross-lane primitives
    // ---------------------------------------------------------------------

    /// Cross product of lanes 0..2; lane 3 of the result is `+0.0`
    fn cross3(lhs: Self::Lane, rhs: Self::Lane) -> Self::Lane;

    /// Per-lane minimum (NaN handling is backend-defined)
    fn min(a: Self::Lane, b: Self::Lane) -> Self::Lane;

    /// Per-lane maximum (NaN handling is backend-defined)
    fn max(a: Self::Lane, b: Self::Lane) -> Self::Lane;

    /// Lane 0
    fn get_x(v: Self::Lane) -> f32;

    /// Lane 1
    fn get_y(v: Self::Lane) -> f32;

    /// Lane 2
    fn get_z(v: Self::Lane) -> f32;

    /// Lane 3
    fn get_w(v: Self::Lane) -> f32;

    // ---------------------------------------------------------------------
    // Derived operations, shared by every backend
    // ---------------------------------------------------------------------

    /// Negate lanes 1 and 3
    #[inline]
    fn flip_sign_0101(v: Self::Lane) -> Self::Lane {
        Self::xor_bits(v, SIGN_MASK_0101)
    }

    /// Negate lanes 0 and 2
    #[inline]
    fn flip_sign_1010(v: Self::Lane) -> Self::Lane {
        Self::xor_bits(v, SIGN_MASK_1010)
    }

    /// Negate every lane (`-(+0.0) == -0.0`, unlike `0 - v`)
    #[inline]
    fn negate(v: Self::Lane) -> Self::Lane {
        Self::xor_bits(v, SIGN_MASK_1111)
    }

    /// Horizontal sum `x + y + z + w`, splatted
    #[inline]
    fn sum(v: Self::Lane) -> Self::Lane {
        let s1 = Self::add(Self::splat_x(v), Self::splat_y(v));
        let s2 = Self::add(s1, Self::splat_z(v));
        Self::add(s2, Self::splat_w(v))
    }

    /// 4-lane dot product, splatted
    #[inline]
    fn dot4(lhs: Self::Lane, rhs: Self::Lane) -> Self::Lane {
        Self::sum(Self::mul(lhs, rhs))
    }

    /// Dot product of lanes 0..2, splatted
    #[inline]
    fn dot3(lhs: Self::Lane, rhs: Self::Lane) -> Self::Lane {
        let m = Self::mul(lhs, rhs);
        let s1 = Self::add(Self::splat_x(m), Self::splat_y(m));
        Self::add(s1, Self::splat_z(m))
    }

    /// Dot product of lanes 0..1, splatted
    #[inline]
    fn dot2(lhs: Self::Lane, rhs: Self::Lane) -> Self::Lane {
        let m = Self::mul(lhs, rhs);
        Self::add(Self::splat_x(m), Self::splat_y(m))
    }

    /// Euclidean length over 4 lanes, splatted
    #[inline]
    fn length4(v: Self::Lane) -> Self::Lane {
        Self::sqrt(Self::dot4(v, v))
    }

    /// Euclidean length over lanes 0..2, splatted
    #[inline]
    fn length3(v: Self::Lane) -> Self::Lane {
        Self::sqrt(Self::dot3(v, v))
    }

    /// Euclidean length over lanes 0..1, splatted
    #[inline]
    fn length2(v: Self::Lane) -> Self::Lane {
        Self::sqrt(Self::dot2(v, v))
    }

    /// Squared length over 4 lanes, splatted
    #[inline]
    fn length4_squared(v: Self::Lane) -> Self::Lane {
        Self::dot4(v, v)
    }

    /// Squared length over lanes 0..2, splatted
    #[inline]
    fn length3_squared(v: Self::Lane) -> Self::Lane {
        Self::dot3(v, v)
    }

    /// Squared length over lanes 0..1, splatted
    #[inline]
    fn length2_squared(v: Self::Lane) -> Self::Lane {
        Self::dot2(v, v)
    }

    /// `v / length4(v)`, through `rsqrt`
    #[inline]
    fn normalize4(v: Self::Lane) -> Self::Lane {
        Self::mul(v, Self::rsqrt(Self::dot4(v, v)))
    }

    /// `v / length3(v)`, through `rsqrt` (lane 3 is scaled too)
    #[inline]
    fn normalize3(v: Self::Lane) -> Self::Lane {
        Self::mul(v, Self::rsqrt(Self::dot3(v, v)))
    }

    /// `v / length2(v)`, through `rsqrt` (lanes 2 and 3 are scaled too)
    #[inline]
    fn normalize2(v: Self::Lane) -> Self::Lane {
        Self::mul(v, Self::rsqrt(Self::dot2(v, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_masks_only_touch_sign_bits() {
        for mask in [SIGN_MASK_0101, SIGN_MASK_1010, SIGN_MASK_1111] {
            for bits in mask {
                assert_eq!(bits & 0x7FFF_FFFF, 0);
            }
        }
    }

    #[test]
    fn test_sign_masks_are_complementary() {
        for i in 0..4 {
            assert_eq!(SIGN_MASK_0101[i] ^ SIGN_MASK_1010[i], SIGN_MASK_1111[i]);
        }
    }
}
