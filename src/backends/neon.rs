//! ARM NEON backend implementation (AArch64 128-bit SIMD)
//!
//! This backend uses NEON intrinsics for 128-bit SIMD operations.
//! NEON is mandatory on AArch64, so every value-only intrinsic below is
//! always executable.
//!
//! # Precision
//!
//! `reciprocal`, `rsqrt` and `sqrt` never use the full-precision divide or
//! square root units: they refine `vrecpe` / `vrsqrte` estimates with the
//! `vrecps` / `vrsqrts` step instructions, using the round counts from
//! [`super::refine`]; lanes whose reciprocal leaves the normal range are
//! range-reduced around the estimate. `sqrt(v)` is `reciprocal(rsqrt(v))`, with `±0` lanes
//! passed through so `sqrt(±0) == ±0`; `sqrt(+inf)` is NaN on this backend.
//!
//! `div` uses `vdivq_f32` and is exact. `madd` is always fused.
//!
//! `min` / `max` propagate NaN from either operand.

use std::arch::aarch64::*;

use super::refine::{
    self, EstimateRefine, RANGE_SCALE, RECIPROCAL_SCALE_DOWN_FROM, RECIPROCAL_SCALE_UP_BELOW,
};
use super::Simd4fBackend;
use crate::Backend;

/// ARM NEON backend (128-bit SIMD)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeonBackend;

impl EstimateRefine for float32x4_t {
    #[inline(always)]
    fn reciprocal_estimate(v: Self) -> Self {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vrecpeq_f32(v) }
    }

    // vrecps computes 2 - a * b
    #[inline(always)]
    fn reciprocal_step(estimate: Self, v: Self) -> Self {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vrecpsq_f32(estimate, v) }
    }

    #[inline(always)]
    fn rsqrt_estimate(v: Self) -> Self {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vrsqrteq_f32(v) }
    }

    // vrsqrts computes (3 - a * b) / 2
    #[inline(always)]
    fn rsqrt_step(estimate2: Self, estimate: Self) -> Self {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vrsqrtsq_f32(estimate2, estimate) }
    }

    #[inline(always)]
    fn mul(a: Self, b: Self) -> Self {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vmulq_f32(a, b) }
    }

    #[inline(always)]
    fn reciprocal_scale(v: Self) -> Self {
        // SAFETY: neon is mandatory on aarch64
        unsafe {
            let magnitude = vabsq_f32(v);
            let large = vcgeq_f32(magnitude, vdupq_n_f32(RECIPROCAL_SCALE_DOWN_FROM));
            let small = vcltq_f32(magnitude, vdupq_n_f32(RECIPROCAL_SCALE_UP_BELOW));
            let scale = vbslq_f32(large, vdupq_n_f32(1.0 / RANGE_SCALE), vdupq_n_f32(1.0));
            vbslq_f32(small, vdupq_n_f32(RANGE_SCALE), scale)
        }
    }
}

impl NeonBackend {
    /// `(y, z, x, 0)`
    #[inline(always)]
    fn yzx0(v: float32x4_t) -> float32x4_t {
        Self::create(Self::get_y(v), Self::get_z(v), Self::get_x(v), 0.0)
    }

    /// `(z, x, y, 0)`
    #[inline(always)]
    fn zxy0(v: float32x4_t) -> float32x4_t {
        Self::create(Self::get_z(v), Self::get_x(v), Self::get_y(v), 0.0)
    }
}

impl Simd4fBackend for NeonBackend {
    type Lane = float32x4_t;

    const KIND: Backend = Backend::NEON;

    #[inline]
    fn create(x: f32, y: f32, z: f32, w: f32) -> float32x4_t {
        let d = [x, y, z, w];
        // SAFETY: `d` holds exactly four floats
        unsafe { vld1q_f32(d.as_ptr()) }
    }

    #[inline]
    fn zero() -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vdupq_n_f32(0.0) }
    }

    #[inline]
    fn splat(v: f32) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vdupq_n_f32(v) }
    }

    #[inline]
    fn splat_x(v: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vdupq_laneq_f32::<0>(v) }
    }

    #[inline]
    fn splat_y(v: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vdupq_laneq_f32::<1>(v) }
    }

    #[inline]
    fn splat_z(v: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vdupq_laneq_f32::<2>(v) }
    }

    #[inline]
    fn splat_w(v: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vdupq_laneq_f32::<3>(v) }
    }

    // SAFETY: Caller guarantees `ary` is readable for 4 floats; ld1 has no
    // alignment requirement beyond the element size.
    #[inline]
    unsafe fn uload4(ary: *const f32) -> float32x4_t {
        vld1q_f32(ary)
    }

    // SAFETY: Caller guarantees `ary` is readable for 3 floats.
    #[inline]
    unsafe fn uload3(ary: *const f32) -> float32x4_t {
        Self::create(
            ary.read_unaligned(),
            ary.add(1).read_unaligned(),
            ary.add(2).read_unaligned(),
            0.0,
        )
    }

    // SAFETY: Caller guarantees `ary` is readable for 2 floats; the 64-bit
    // ld1 reads exactly two.
    #[inline]
    unsafe fn uload2(ary: *const f32) -> float32x4_t {
        vcombine_f32(vld1_f32(ary), vdup_n_f32(0.0))
    }

    // SAFETY: Caller guarantees `ary` is writable for 4 floats.
    #[inline]
    unsafe fn ustore4(v: float32x4_t, ary: *mut f32) {
        vst1q_f32(ary, v);
    }

    // SAFETY: Caller guarantees `ary` is writable for 3 floats; lane 3 is
    // never written.
    #[inline]
    unsafe fn ustore3(v: float32x4_t, ary: *mut f32) {
        vst1_f32(ary, vget_low_f32(v));
        vst1q_lane_f32::<2>(ary.add(2), v);
    }

    // SAFETY: Caller guarantees `ary` is writable for 2 floats.
    #[inline]
    unsafe fn ustore2(v: float32x4_t, ary: *mut f32) {
        vst1_f32(ary, vget_low_f32(v));
    }

    #[inline]
    fn add(lhs: float32x4_t, rhs: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vaddq_f32(lhs, rhs) }
    }

    #[inline]
    fn sub(lhs: float32x4_t, rhs: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vsubq_f32(lhs, rhs) }
    }

    #[inline]
    fn mul(lhs: float32x4_t, rhs: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vmulq_f32(lhs, rhs) }
    }

    #[inline]
    fn div(lhs: float32x4_t, rhs: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vdivq_f32(lhs, rhs) }
    }

    #[inline]
    fn madd(m1: float32x4_t, m2: float32x4_t, a: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vfmaq_f32(a, m1, m2) }
    }

    #[inline]
    fn reciprocal(v: float32x4_t) -> float32x4_t {
        refine::reciprocal(v)
    }

    #[inline]
    fn sqrt(v: float32x4_t) -> float32x4_t {
        let approx = Self::reciprocal(Self::rsqrt(v));
        // SAFETY: neon is mandatory on aarch64
        unsafe {
            let is_zero = vceqq_f32(v, vdupq_n_f32(0.0));
            vbslq_f32(is_zero, v, approx)
        }
    }

    #[inline]
    fn rsqrt(v: float32x4_t) -> float32x4_t {
        refine::rsqrt(v)
    }

    #[inline]
    fn shuffle_wxyz(v: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vextq_f32::<3>(v, v) }
    }

    #[inline]
    fn shuffle_zwxy(v: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vextq_f32::<2>(v, v) }
    }

    #[inline]
    fn shuffle_yzwx(v: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vextq_f32::<1>(v, v) }
    }

    #[inline]
    fn merge_high(a: float32x4_t, b: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vcombine_f32(vget_high_f32(a), vget_high_f32(b)) }
    }

    #[inline]
    fn xor_bits(v: float32x4_t, mask: [u32; 4]) -> float32x4_t {
        // SAFETY: `mask` holds exactly four u32; the reinterprets are free
        // register casts.
        unsafe {
            let bits = vld1q_u32(mask.as_ptr());
            vreinterpretq_f32_u32(veorq_u32(vreinterpretq_u32_f32(v), bits))
        }
    }

    #[inline]
    fn zero_w(v: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vsetq_lane_f32::<3>(0.0, v) }
    }

    #[inline]
    fn zero_zw(v: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vcombine_f32(vget_low_f32(v), vdup_n_f32(0.0)) }
    }

    #[inline]
    fn cross3(lhs: float32x4_t, rhs: float32x4_t) -> float32x4_t {
        let l_yzx = Self::yzx0(lhs);
        let l_zxy = Self::zxy0(lhs);
        let r_yzx = Self::yzx0(rhs);
        let r_zxy = Self::zxy0(rhs);
        // vmls: a - b * c, unfused
        // SAFETY: neon is mandatory on aarch64
        unsafe { vmlsq_f32(vmulq_f32(l_yzx, r_zxy), l_zxy, r_yzx) }
    }

    #[inline]
    fn min(a: float32x4_t, b: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vminq_f32(a, b) }
    }

    #[inline]
    fn max(a: float32x4_t, b: float32x4_t) -> float32x4_t {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vmaxq_f32(a, b) }
    }

    #[inline]
    fn get_x(v: float32x4_t) -> f32 {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vgetq_lane_f32::<0>(v) }
    }

    #[inline]
    fn get_y(v: float32x4_t) -> f32 {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vgetq_lane_f32::<1>(v) }
    }

    #[inline]
    fn get_z(v: float32x4_t) -> f32 {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vgetq_lane_f32::<2>(v) }
    }

    #[inline]
    fn get_w(v: float32x4_t) -> f32 {
        // SAFETY: neon is mandatory on aarch64
        unsafe { vgetq_lane_f32::<3>(v) }
    }
}
