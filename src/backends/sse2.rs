//! SSE2 backend implementation (x86_64 baseline SIMD)
//!
//! This backend uses SSE2 intrinsics for 128-bit SIMD operations.
//! SSE2 is available on all x86_64 CPUs as a baseline requirement.
//!
//! # Precision
//!
//! `div` and `sqrt` map to the correctly rounded `divps` / `sqrtps`.
//! `reciprocal` and `rsqrt` start from the ~12-bit `rcpps` / `rsqrtps`
//! estimates and run the shared Newton-Raphson rounds from
//! [`super::refine`]. `rcpps` flushes subnormal results to zero, so lanes
//! whose reciprocal leaves the normal range are range-reduced first. At
//! `v = 0` the refined reciprocal is NaN (the first round computes
//! `inf * 0`), where the scalar backend returns `+inf`.
//!
//! `madd` is fused when the crate is built with the `fma` target feature.
//!
//! # Safety
//!
//! All SSE2 intrinsics are marked `unsafe` by Rust. SSE2 is part of the
//! x86_64 baseline, so every value-only intrinsic below is always executable;
//! only the pointer loads/stores carry caller obligations.

use std::arch::x86_64::*;

use super::refine::{
    self, EstimateRefine, RANGE_SCALE, RECIPROCAL_SCALE_DOWN_FROM, RECIPROCAL_SCALE_UP_BELOW,
};
use super::Simd4fBackend;
use crate::Backend;

// `_mm_shuffle_ps` immediates: two bits per destination lane holding the
// source lane index, destination lane 0 in the low bits.
const SPLAT_X: i32 = 0b00_00_00_00;
const SPLAT_Y: i32 = 0b01_01_01_01;
const SPLAT_Z: i32 = 0b10_10_10_10;
const SPLAT_W: i32 = 0b11_11_11_11;
const WXYZ: i32 = 0b10_01_00_11;
const ZWXY: i32 = 0b01_00_11_10;
const YZWX: i32 = 0b00_11_10_01;
const YZXW: i32 = 0b11_00_10_01;
const ZXYW: i32 = 0b11_01_00_10;

/// SSE2 backend (128-bit SIMD for x86_64)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sse2Backend;

impl EstimateRefine for __m128 {
    #[inline(always)]
    fn reciprocal_estimate(v: Self) -> Self {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_rcp_ps(v) }
    }

    #[inline(always)]
    fn reciprocal_step(estimate: Self, v: Self) -> Self {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_sub_ps(_mm_set1_ps(2.0), _mm_mul_ps(estimate, v)) }
    }

    #[inline(always)]
    fn rsqrt_estimate(v: Self) -> Self {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_rsqrt_ps(v) }
    }

    #[inline(always)]
    fn rsqrt_step(estimate2: Self, estimate: Self) -> Self {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe {
            let correction = _mm_sub_ps(_mm_set1_ps(3.0), _mm_mul_ps(estimate2, estimate));
            _mm_mul_ps(correction, _mm_set1_ps(0.5))
        }
    }

    #[inline(always)]
    fn mul(a: Self, b: Self) -> Self {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_mul_ps(a, b) }
    }

    // Comparisons against NaN are false, so NaN lanes keep a factor of 1.
    #[inline(always)]
    fn reciprocal_scale(v: Self) -> Self {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe {
            let magnitude = _mm_andnot_ps(_mm_set1_ps(-0.0), v);
            let large = _mm_cmpge_ps(magnitude, _mm_set1_ps(RECIPROCAL_SCALE_DOWN_FROM));
            let small = _mm_cmplt_ps(magnitude, _mm_set1_ps(RECIPROCAL_SCALE_UP_BELOW));
            let down = _mm_and_ps(large, _mm_set1_ps(1.0 / RANGE_SCALE));
            let up = _mm_and_ps(small, _mm_set1_ps(RANGE_SCALE));
            let unit = _mm_andnot_ps(_mm_or_ps(large, small), _mm_set1_ps(1.0));
            _mm_or_ps(_mm_or_ps(down, up), unit)
        }
    }
}

impl Simd4fBackend for Sse2Backend {
    type Lane = __m128;

    const KIND: Backend = Backend::SSE2;

    #[inline]
    fn create(x: f32, y: f32, z: f32, w: f32) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_setr_ps(x, y, z, w) }
    }

    #[inline]
    fn zero() -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_setzero_ps() }
    }

    #[inline]
    fn splat(v: f32) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_set1_ps(v) }
    }

    #[inline]
    fn splat_x(v: __m128) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_shuffle_ps::<SPLAT_X>(v, v) }
    }

    #[inline]
    fn splat_y(v: __m128) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_shuffle_ps::<SPLAT_Y>(v, v) }
    }

    #[inline]
    fn splat_z(v: __m128) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_shuffle_ps::<SPLAT_Z>(v, v) }
    }

    #[inline]
    fn splat_w(v: __m128) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_shuffle_ps::<SPLAT_W>(v, v) }
    }

    // SAFETY: Caller guarantees `ary` is readable for 4 floats; movups has
    // no alignment requirement.
    #[inline]
    unsafe fn uload4(ary: *const f32) -> __m128 {
        _mm_loadu_ps(ary)
    }

    // SAFETY: Caller guarantees `ary` is readable for 3 floats. Only three
    // scalar reads are issued so the fourth float is never touched.
    #[inline]
    unsafe fn uload3(ary: *const f32) -> __m128 {
        _mm_setr_ps(
            ary.read_unaligned(),
            ary.add(1).read_unaligned(),
            ary.add(2).read_unaligned(),
            0.0,
        )
    }

    // SAFETY: Caller guarantees `ary` is readable for 2 floats. movq reads
    // exactly 8 unaligned bytes and clears the upper half.
    #[inline]
    unsafe fn uload2(ary: *const f32) -> __m128 {
        _mm_castsi128_ps(_mm_loadl_epi64(ary.cast::<__m128i>()))
    }

    // SAFETY: Caller guarantees `ary` is writable for 4 floats.
    #[inline]
    unsafe fn ustore4(v: __m128, ary: *mut f32) {
        _mm_storeu_ps(ary, v);
    }

    // SAFETY: Caller guarantees `ary` is writable for 3 floats. movq writes
    // exactly 8 bytes; lane 2 goes out through a scalar write.
    #[inline]
    unsafe fn ustore3(v: __m128, ary: *mut f32) {
        _mm_storel_epi64(ary.cast::<__m128i>(), _mm_castps_si128(v));
        ary.add(2).write_unaligned(Self::get_z(v));
    }

    // SAFETY: Caller guarantees `ary` is writable for 2 floats.
    #[inline]
    unsafe fn ustore2(v: __m128, ary: *mut f32) {
        _mm_storel_epi64(ary.cast::<__m128i>(), _mm_castps_si128(v));
    }

    #[inline]
    fn add(lhs: __m128, rhs: __m128) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_add_ps(lhs, rhs) }
    }

    #[inline]
    fn sub(lhs: __m128, rhs: __m128) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_sub_ps(lhs, rhs) }
    }

    #[inline]
    fn mul(lhs: __m128, rhs: __m128) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_mul_ps(lhs, rhs) }
    }

    #[inline]
    fn div(lhs: __m128, rhs: __m128) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_div_ps(lhs, rhs) }
    }

    #[cfg(target_feature = "fma")]
    #[inline]
    fn madd(m1: __m128, m2: __m128, a: __m128) -> __m128 {
        // SAFETY: fma is statically enabled for this build
        unsafe { _mm_fmadd_ps(m1, m2, a) }
    }

    #[cfg(not(target_feature = "fma"))]
    #[inline]
    fn madd(m1: __m128, m2: __m128, a: __m128) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_add_ps(_mm_mul_ps(m1, m2), a) }
    }

    #[inline]
    fn reciprocal(v: __m128) -> __m128 {
        refine::reciprocal(v)
    }

    #[inline]
    fn sqrt(v: __m128) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_sqrt_ps(v) }
    }

    #[inline]
    fn rsqrt(v: __m128) -> __m128 {
        refine::rsqrt(v)
    }

    #[inline]
    fn shuffle_wxyz(v: __m128) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_shuffle_ps::<WXYZ>(v, v) }
    }

    #[inline]
    fn shuffle_zwxy(v: __m128) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_shuffle_ps::<ZWXY>(v, v) }
    }

    #[inline]
    fn shuffle_yzwx(v: __m128) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_shuffle_ps::<YZWX>(v, v) }
    }

    #[inline]
    fn merge_high(a: __m128, b: __m128) -> __m128 {
        // movhlps(b, a) = (a.z, a.w, b.z, b.w)
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_movehl_ps(b, a) }
    }

    #[inline]
    fn xor_bits(v: __m128, mask: [u32; 4]) -> __m128 {
        // SAFETY: sse2 is part of the x86_64 baseline; the casts are free
        // register reinterpretations.
        unsafe {
            let bits = _mm_setr_epi32(
                mask[0] as i32,
                mask[1] as i32,
                mask[2] as i32,
                mask[3] as i32,
            );
            _mm_xor_ps(v, _mm_castsi128_ps(bits))
        }
    }

    #[inline]
    fn zero_w(v: __m128) -> __m128 {
        // SAFETY: sse2 is part of the x86_64 baseline
        unsafe { _mm_and_ps(v, _mm_castsi128_ps(_mm_setr_epi32(-1, -1, -1, 0))) }
    }

    #[inline]
    fn zero_zw(v: __m128) -> __m128 {
        // movlhps(v, 0) = (v.x, v.y, 0, 0)
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_movelh_ps(v, _mm_setzero_ps()) }
    }

    #[inline]
    fn cross3(lhs: __m128, rhs: __m128) -> __m128 {
        let l = Self::zero_w(lhs);
        let r = Self::zero_w(rhs);
        // SAFETY: sse is part of the x86_64 baseline
        unsafe {
            let l_yzx = _mm_shuffle_ps::<YZXW>(l, l);
            let l_zxy = _mm_shuffle_ps::<ZXYW>(l, l);
            let r_yzx = _mm_shuffle_ps::<YZXW>(r, r);
            let r_zxy = _mm_shuffle_ps::<ZXYW>(r, r);
            _mm_sub_ps(_mm_mul_ps(l_yzx, r_zxy), _mm_mul_ps(l_zxy, r_yzx))
        }
    }

    // minps returns the second operand when either lane is NaN.
    #[inline]
    fn min(a: __m128, b: __m128) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_min_ps(a, b) }
    }

    #[inline]
    fn max(a: __m128, b: __m128) -> __m128 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_max_ps(a, b) }
    }

    #[inline]
    fn get_x(v: __m128) -> f32 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_cvtss_f32(v) }
    }

    #[inline]
    fn get_y(v: __m128) -> f32 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_cvtss_f32(_mm_shuffle_ps::<SPLAT_Y>(v, v)) }
    }

    #[inline]
    fn get_z(v: __m128) -> f32 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_cvtss_f32(_mm_movehl_ps(v, v)) }
    }

    #[inline]
    fn get_w(v: __m128) -> f32 {
        // SAFETY: sse is part of the x86_64 baseline
        unsafe { _mm_cvtss_f32(_mm_shuffle_ps::<SPLAT_W>(v, v)) }
    }
}
