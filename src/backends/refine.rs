//! Newton-Raphson refinement of hardware reciprocal / rsqrt estimates
//!
//! Vector units that lack (or avoid) full-precision divide and square root
//! offer a ~12-bit estimate instruction plus, on some targets, a dedicated
//! "step" instruction. Each refinement round roughly doubles the number of
//! correct bits:
//!
//! - reciprocal: `e' = e * (2 - v * e)`
//! - reciprocal square root: `e2 = e * v; e' = e * ((3 - e2 * e) / 2)`
//!
//! Backends supply the estimate and step primitives through [`EstimateRefine`];
//! the round counts live here so every backend refines the same way.
//!
//! Estimate instructions flush subnormal results to zero and overflow on
//! subnormal inputs, and no number of rounds recovers from either. The
//! refined [`reciprocal`] therefore moves lanes with `|v| >= 2^125` down by
//! [`RANGE_SCALE`] and subnormal lanes up by it, refines, and applies the
//! same factor to the result.

/// Refinement rounds applied to a reciprocal estimate
pub const RECIPROCAL_REFINE_STEPS: usize = 2;

/// Refinement rounds applied to a reciprocal-square-root estimate
///
/// Three rounds keep the result within f32 precision across the normal range.
pub const RSQRT_REFINE_STEPS: usize = 3;

/// Lanes with magnitude at or above this are scaled down before the
/// reciprocal estimate (`2^125`, so the estimate of `1 / v` stays normal)
pub const RECIPROCAL_SCALE_DOWN_FROM: f32 = 4.253_529_6e37;

/// Lanes with magnitude below this (the subnormals) are scaled up before the
/// reciprocal estimate
pub const RECIPROCAL_SCALE_UP_BELOW: f32 = f32::MIN_POSITIVE;

/// Power-of-two range reduction factor (`2^32`); multiplying by it or its
/// inverse is exact for every input it is applied to
pub const RANGE_SCALE: f32 = 4_294_967_296.0;

/// Estimate and step primitives of an estimate-and-refine backend
pub trait EstimateRefine: Copy {
    /// Low-precision `1 / v`
    fn reciprocal_estimate(v: Self) -> Self;

    /// Reciprocal correction factor `2 - estimate * v`
    fn reciprocal_step(estimate: Self, v: Self) -> Self;

    /// Low-precision `1 / sqrt(v)`
    fn rsqrt_estimate(v: Self) -> Self;

    /// Rsqrt correction factor `(3 - estimate2 * estimate) / 2`
    fn rsqrt_step(estimate2: Self, estimate: Self) -> Self;

    /// Per-lane product
    fn mul(a: Self, b: Self) -> Self;

    /// Per-lane range reduction factor for `reciprocal`: `1 / RANGE_SCALE`
    /// where `|v| >= RECIPROCAL_SCALE_DOWN_FROM`, `RANGE_SCALE` where
    /// `|v| < RECIPROCAL_SCALE_UP_BELOW`, `1` elsewhere (NaN included)
    fn reciprocal_scale(v: Self) -> Self;
}

/// Refined reciprocal with the default round count
///
/// `1 / v = s * (1 / (s * v))`, with `s` from [`EstimateRefine::reciprocal_scale`].
#[inline(always)]
pub fn reciprocal<L: EstimateRefine>(v: L) -> L {
    let scale = L::reciprocal_scale(v);
    let refined = reciprocal_with_steps(L::mul(v, scale), RECIPROCAL_REFINE_STEPS);
    L::mul(refined, scale)
}

/// Refined reciprocal square root with the default round count
#[inline(always)]
pub fn rsqrt<L: EstimateRefine>(v: L) -> L {
    rsqrt_with_steps(v, RSQRT_REFINE_STEPS)
}

/// Reciprocal estimate followed by `steps` Newton-Raphson rounds
#[inline(always)]
pub fn reciprocal_with_steps<L: EstimateRefine>(v: L, steps: usize) -> L {
    let mut estimate = L::reciprocal_estimate(v);
    for _ in 0..steps {
        estimate = L::mul(L::reciprocal_step(estimate, v), estimate);
    }
    estimate
}

/// Rsqrt estimate followed by `steps` Newton-Raphson rounds
#[inline(always)]
pub fn rsqrt_with_steps<L: EstimateRefine>(v: L, steps: usize) -> L {
    let mut estimate = L::rsqrt_estimate(v);
    for _ in 0..steps {
        let estimate2 = L::mul(estimate, v);
        estimate = L::mul(estimate, L::rsqrt_step(estimate2, estimate));
    }
    estimate
}
