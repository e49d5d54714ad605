//! Error bounds of the approximate operations, and the means to measure them
//!
//! Exact operations (arithmetic, shuffles, sign flips, loads/stores, min/max,
//! lane reads) agree bit-for-bit across backends. The reciprocal / sqrt family
//! does not: estimate-and-refine backends land within a few ulps of the
//! correctly rounded result. [`Tolerance`] documents the relative error each
//! backend guarantees over the domain given on [`RELATIVE_EPSILON`];
//! [`measure`] checks a backend against an `f64` reference.
//!
//! # Example
//!
//! ```
//! use simd4f::tolerance::{measure, ApproxOp, Tolerance};
//! use simd4f::{Backend, NativeBackend};
//!
//! let report = measure::<NativeBackend>(ApproxOp::Reciprocal, 1e-3, 1e3, 256).unwrap();
//! let bound = Tolerance::for_backend(Backend::native());
//! assert!(report.max_relative_error <= bound.for_op(ApproxOp::Reciprocal));
//! ```

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::backends::Simd4fBackend;
use crate::{Backend, Result, Simd4fError};

/// Relative error every backend guarantees for the approximate operations
///
/// `reciprocal` is covered for every finite, non-zero `v` whose reciprocal
/// is finite (`|v| > 2^-128`), either sign, including results that are
/// subnormal. `sqrt` and `rsqrt` are covered for finite, positive, normal
/// inputs.
pub const RELATIVE_EPSILON: f32 = 1e-5;

/// Approximate operations whose accuracy is backend-dependent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApproxOp {
    /// `1 / v`
    Reciprocal,
    /// `sqrt(v)`
    Sqrt,
    /// `1 / sqrt(v)`
    Rsqrt,
}

impl ApproxOp {
    /// Every approximate operation
    pub const ALL: [ApproxOp; 3] = [ApproxOp::Reciprocal, ApproxOp::Sqrt, ApproxOp::Rsqrt];

    fn apply<B: Simd4fBackend>(self, v: B::Lane) -> B::Lane {
        match self {
            ApproxOp::Reciprocal => B::reciprocal(v),
            ApproxOp::Sqrt => B::sqrt(v),
            ApproxOp::Rsqrt => B::rsqrt(v),
        }
    }

    fn reference(self, v: f64) -> f64 {
        match self {
            ApproxOp::Reciprocal => 1.0 / v,
            ApproxOp::Sqrt => v.sqrt(),
            ApproxOp::Rsqrt => 1.0 / v.sqrt(),
        }
    }
}

/// Maximum relative error per operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Exact operations (always 0.0: bit-identical across backends)
    pub exact: f32,
    /// `reciprocal`
    pub reciprocal: f32,
    /// `sqrt`
    pub sqrt: f32,
    /// `rsqrt`
    pub rsqrt: f32,
}

impl Default for Tolerance {
    /// The cross-backend contract: [`RELATIVE_EPSILON`] for every
    /// approximate operation
    fn default() -> Self {
        Self {
            exact: 0.0,
            reciprocal: RELATIVE_EPSILON,
            sqrt: RELATIVE_EPSILON,
            rsqrt: RELATIVE_EPSILON,
        }
    }
}

impl Tolerance {
    /// Zero tolerance everywhere
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            exact: 0.0,
            reciprocal: 0.0,
            sqrt: 0.0,
            rsqrt: 0.0,
        }
    }

    /// Bound a specific backend meets, over the domain documented on
    /// [`RELATIVE_EPSILON`]
    ///
    /// The scalar backend rounds once (twice for rsqrt), so it is held to a
    /// few machine epsilons. SSE2 computes sqrt natively but refines
    /// reciprocal/rsqrt estimates; NEON refines all three.
    #[must_use]
    pub const fn for_backend(backend: Backend) -> Self {
        const ROUNDED: f32 = 4.0 * f32::EPSILON;
        match backend {
            Backend::Scalar => Self {
                exact: 0.0,
                reciprocal: ROUNDED,
                sqrt: ROUNDED,
                rsqrt: ROUNDED,
            },
            Backend::SSE2 => Self {
                exact: 0.0,
                reciprocal: RELATIVE_EPSILON,
                sqrt: ROUNDED,
                rsqrt: RELATIVE_EPSILON,
            },
            Backend::NEON => Self {
                exact: 0.0,
                reciprocal: RELATIVE_EPSILON,
                sqrt: RELATIVE_EPSILON,
                rsqrt: RELATIVE_EPSILON,
            },
        }
    }

    /// Bound for one approximate operation
    #[must_use]
    pub const fn for_op(&self, op: ApproxOp) -> f32 {
        match op {
            ApproxOp::Reciprocal => self.reciprocal,
            ApproxOp::Sqrt => self.sqrt,
            ApproxOp::Rsqrt => self.rsqrt,
        }
    }
}

/// Outcome of a [`measure`] sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorReport {
    /// Which backend was measured
    pub backend: Backend,
    /// Which operation was measured
    pub op: ApproxOp,
    /// Largest `|result - reference| / |reference|` seen
    pub max_relative_error: f32,
    /// Input that produced `max_relative_error`
    pub worst_input: f32,
    /// Number of inputs evaluated
    pub samples: usize,
}

impl ErrorReport {
    /// Whether the sweep stayed within `bound`
    #[must_use]
    pub fn within(&self, bound: f32) -> bool {
        self.max_relative_error <= bound
    }
}

/// Sweep `samples` log-spaced inputs across `[low, high]` through `op` on
/// backend `B` and report the worst relative error against an `f64`
/// reference.
///
/// Inputs are evaluated four at a time; every lane of every evaluation is
/// checked, so a lane-ordering bug shows up as an error here too.
///
/// # Errors
///
/// Returns [`Simd4fError::InvalidSampleRange`] unless
/// `0 < low <= high`, both are finite, and `samples >= 1`.
#[cfg_attr(feature = "tracing", instrument(level = "debug", fields(backend = ?B::KIND)))]
pub fn measure<B: Simd4fBackend>(
    op: ApproxOp,
    low: f32,
    high: f32,
    samples: usize,
) -> Result<ErrorReport> {
    let valid = low > 0.0 && high.is_finite() && low <= high && samples > 0;
    if !valid {
        return Err(Simd4fError::InvalidSampleRange { low, high, samples });
    }

    let log_low = f64::from(low).ln();
    let log_span = f64::from(high).ln() - log_low;
    let input = |i: usize| -> f32 {
        if samples == 1 {
            return low;
        }
        let t = i as f64 / (samples - 1) as f64;
        ((log_low + t * log_span).exp() as f32).clamp(low, high)
    };

    let mut report = ErrorReport {
        backend: B::KIND,
        op,
        max_relative_error: 0.0,
        worst_input: low,
        samples,
    };

    let mut start = 0;
    while start < samples {
        let mut chunk = [low; 4];
        for (lane, slot) in chunk.iter_mut().enumerate() {
            *slot = input((start + lane).min(samples - 1));
        }

        // SAFETY: `chunk` holds exactly four floats
        let v = unsafe { B::uload4(chunk.as_ptr()) };
        let mut out = [0.0f32; 4];
        // SAFETY: `out` holds exactly four floats
        unsafe { B::ustore4(op.apply::<B>(v), out.as_mut_ptr()) };

        for (&x, &r) in chunk.iter().zip(&out) {
            let reference = op.reference(f64::from(x));
            let err = ((f64::from(r) - reference) / reference).abs() as f32;
            // NaN compares false, so check it explicitly
            if err.is_nan() || err > report.max_relative_error {
                report.max_relative_error = if err.is_nan() { f32::INFINITY } else { err };
                report.worst_input = x;
            }
        }
        start += 4;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        backend = ?report.backend,
        op = ?report.op,
        max_relative_error = report.max_relative_error,
        worst_input = report.worst_input,
        samples = report.samples,
        "measured approximation error"
    );

    Ok(report)
}
