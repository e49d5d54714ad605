//! Scalar (non-SIMD) backend implementation
//!
//! This is the portable baseline implementation that works on all platforms.
//! Each lane is a named `f32` field and every operation is the plain scalar
//! formula, so this backend doubles as the numeric reference the SIMD
//! backends are checked against.
//!
//! # Precision
//!
//! Division, reciprocal and square root use native IEEE operations: results
//! are correctly rounded, `rsqrt` accumulates two roundings.

use std::ptr;

use bytemuck::{Pod, Zeroable};

use super::Simd4fBackend;
use crate::Backend;

/// Four `f32` lanes laid out as x, y, z, w
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct ScalarLane {
    /// Lane 0
    pub x: f32,
    /// Lane 1
    pub y: f32,
    /// Lane 2
    pub z: f32,
    /// Lane 3
    pub w: f32,
}

impl ScalarLane {
    #[inline(always)]
    const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    #[inline(always)]
    fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z), f(self.w))
    }

    #[inline(always)]
    fn zip(self, rhs: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        Self::new(
            f(self.x, rhs.x),
            f(self.y, rhs.y),
            f(self.z, rhs.z),
            f(self.w, rhs.w),
        )
    }
}

/// Scalar backend (portable, no SIMD)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScalarBackend;

impl Simd4fBackend for ScalarBackend {
    type Lane = ScalarLane;

    const KIND: Backend = Backend::Scalar;

    #[inline]
    fn create(x: f32, y: f32, z: f32, w: f32) -> ScalarLane {
        ScalarLane::new(x, y, z, w)
    }

    #[inline]
    fn zero() -> ScalarLane {
        ScalarLane::zeroed()
    }

    #[inline]
    fn splat(v: f32) -> ScalarLane {
        ScalarLane::new(v, v, v, v)
    }

    #[inline]
    fn splat_x(v: ScalarLane) -> ScalarLane {
        Self::splat(v.x)
    }

    #[inline]
    fn splat_y(v: ScalarLane) -> ScalarLane {
        Self::splat(v.y)
    }

    #[inline]
    fn splat_z(v: ScalarLane) -> ScalarLane {
        Self::splat(v.z)
    }

    #[inline]
    fn splat_w(v: ScalarLane) -> ScalarLane {
        Self::splat(v.w)
    }

    // SAFETY: Caller guarantees `ary` is readable for 4 floats.
    // read_unaligned places no alignment requirement on the buffer.
    #[inline]
    unsafe fn uload4(ary: *const f32) -> ScalarLane {
        bytemuck::cast(ptr::read_unaligned(ary.cast::<[f32; 4]>()))
    }

    // SAFETY: Caller guarantees `ary` is readable for 3 floats.
    #[inline]
    unsafe fn uload3(ary: *const f32) -> ScalarLane {
        ScalarLane::new(
            ary.read_unaligned(),
            ary.add(1).read_unaligned(),
            ary.add(2).read_unaligned(),
            0.0,
        )
    }

    // SAFETY: Caller guarantees `ary` is readable for 2 floats.
    #[inline]
    unsafe fn uload2(ary: *const f32) -> ScalarLane {
        ScalarLane::new(ary.read_unaligned(), ary.add(1).read_unaligned(), 0.0, 0.0)
    }

    // SAFETY: Caller guarantees `ary` is writable for 4 floats.
    #[inline]
    unsafe fn ustore4(v: ScalarLane, ary: *mut f32) {
        ptr::write_unaligned(ary.cast::<[f32; 4]>(), bytemuck::cast(v));
    }

    // SAFETY: Caller guarantees `ary` is writable for 3 floats; lane 3 is
    // never written.
    #[inline]
    unsafe fn ustore3(v: ScalarLane, ary: *mut f32) {
        ary.write_unaligned(v.x);
        ary.add(1).write_unaligned(v.y);
        ary.add(2).write_unaligned(v.z);
    }

    // SAFETY: Caller guarantees `ary` is writable for 2 floats.
    #[inline]
    unsafe fn ustore2(v: ScalarLane, ary: *mut f32) {
        ary.write_unaligned(v.x);
        ary.add(1).write_unaligned(v.y);
    }

    #[inline]
    fn add(lhs: ScalarLane, rhs: ScalarLane) -> ScalarLane {
        lhs.zip(rhs, |a, b| a + b)
    }

    #[inline]
    fn sub(lhs: ScalarLane, rhs: ScalarLane) -> ScalarLane {
        lhs.zip(rhs, |a, b| a - b)
    }

    #[inline]
    fn mul(lhs: ScalarLane, rhs: ScalarLane) -> ScalarLane {
        lhs.zip(rhs, |a, b| a * b)
    }

    #[inline]
    fn div(lhs: ScalarLane, rhs: ScalarLane) -> ScalarLane {
        lhs.zip(rhs, |a, b| a / b)
    }

    #[inline]
    fn madd(m1: ScalarLane, m2: ScalarLane, a: ScalarLane) -> ScalarLane {
        Self::add(Self::mul(m1, m2), a)
    }

    #[inline]
    fn reciprocal(v: ScalarLane) -> ScalarLane {
        v.map(|x| 1.0 / x)
    }

    #[inline]
    fn sqrt(v: ScalarLane) -> ScalarLane {
        v.map(f32::sqrt)
    }

    #[inline]
    fn rsqrt(v: ScalarLane) -> ScalarLane {
        v.map(|x| 1.0 / x.sqrt())
    }

    #[inline]
    fn shuffle_wxyz(v: ScalarLane) -> ScalarLane {
        ScalarLane::new(v.w, v.x, v.y, v.z)
    }

    #[inline]
    fn shuffle_zwxy(v: ScalarLane) -> ScalarLane {
        ScalarLane::new(v.z, v.w, v.x, v.y)
    }

    #[inline]
    fn shuffle_yzwx(v: ScalarLane) -> ScalarLane {
        ScalarLane::new(v.y, v.z, v.w, v.x)
    }

    #[inline]
    fn merge_high(a: ScalarLane, b: ScalarLane) -> ScalarLane {
        ScalarLane::new(a.z, a.w, b.z, b.w)
    }

    #[inline]
    fn xor_bits(v: ScalarLane, mask: [u32; 4]) -> ScalarLane {
        let bits: [u32; 4] = bytemuck::cast(v);
        bytemuck::cast([
            bits[0] ^ mask[0],
            bits[1] ^ mask[1],
            bits[2] ^ mask[2],
            bits[3] ^ mask[3],
        ])
    }

    #[inline]
    fn zero_w(v: ScalarLane) -> ScalarLane {
        ScalarLane::new(v.x, v.y, v.z, 0.0)
    }

    #[inline]
    fn zero_zw(v: ScalarLane) -> ScalarLane {
        ScalarLane::new(v.x, v.y, 0.0, 0.0)
    }

    #[inline]
    fn cross3(lhs: ScalarLane, rhs: ScalarLane) -> ScalarLane {
        ScalarLane::new(
            lhs.y * rhs.z - lhs.z * rhs.y,
            lhs.z * rhs.x - lhs.x * rhs.z,
            lhs.x * rhs.y - lhs.y * rhs.x,
            0.0,
        )
    }

    // Returns `b` when either lane is NaN, matching SSE `minps`.
    #[inline]
    fn min(a: ScalarLane, b: ScalarLane) -> ScalarLane {
        a.zip(b, |l, r| if l < r { l } else { r })
    }

    // Returns `b` when either lane is NaN, matching SSE `maxps`.
    #[inline]
    fn max(a: ScalarLane, b: ScalarLane) -> ScalarLane {
        a.zip(b, |l, r| if l > r { l } else { r })
    }

    #[inline]
    fn get_x(v: ScalarLane) -> f32 {
        v.x
    }

    #[inline]
    fn get_y(v: ScalarLane) -> f32 {
        v.y
    }

    #[inline]
    fn get_z(v: ScalarLane) -> f32 {
        v.z
    }

    #[inline]
    fn get_w(v: ScalarLane) -> f32 {
        v.w
    }
}
