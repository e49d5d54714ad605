//! simd4f: Portable 4-Lane f32 SIMD Kernel
//!
//! **simd4f** gives one set of 4-wide single-precision vector operations
//! (construction, loads/stores, shuffles, arithmetic, reciprocal and square
//! roots, cross product, reductions) with a backend per instruction set:
//!
//! 1. **Scalar** - portable, exact formulas (reference semantics)
//! 2. **SSE2** - x86_64 baseline SIMD
//! 3. **NEON** - AArch64 SIMD
//!
//! # Design Principles
//!
//! - **One contract, many backends**: every backend implements [`Simd4fBackend`]
//! - **Compile-time selection**: [`NativeBackend`] is fixed by the target, no runtime dispatch
//! - **Zero unsafe in public API**: raw-pointer transfers are isolated in backends
//! - **Documented approximation**: reciprocal/sqrt error bounds live in [`tolerance`]
//!
//! # Quick Start
//!
//! ```rust
//! use simd4f::Simd4f;
//!
//! let a = Simd4f::create(1.0, 0.0, 0.0, 0.0);
//! let b = Simd4f::create(0.0, 1.0, 0.0, 0.0);
//!
//! let c = a.cross3(b);
//! assert_eq!(c.to_array(), [0.0, 0.0, 1.0, 0.0]);
//! assert_eq!((a + b).dot4(a).x(), 1.0);
//! ```
//!
//! # Features
//!
//! - `force-scalar`: bind [`NativeBackend`] to the scalar backend on every target
//! - `tracing`: emit `tracing` events from [`tolerance::measure`]

pub mod backends;
pub mod error;
mod simd4;
pub mod tolerance;

pub use backends::Simd4fBackend;
pub use error::{Result, Simd4fError};
pub use simd4::Simd4;

/// Backend execution target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Scalar fallback (no SIMD)
    Scalar,
    /// SSE2 (x86_64 baseline)
    SSE2,
    /// ARM NEON
    NEON,
}

impl Backend {
    /// Backend bound to [`NativeBackend`] for this build
    #[must_use]
    pub const fn native() -> Self {
        <NativeBackend as Simd4fBackend>::KIND
    }

    /// Whether this backend computes reciprocal/rsqrt from a hardware
    /// estimate plus refinement rounds
    #[must_use]
    pub const fn is_refined(self) -> bool {
        matches!(self, Backend::SSE2 | Backend::NEON)
    }
}

/// Backend chosen for the build target
#[cfg(all(
    target_arch = "x86_64",
    target_feature = "sse2",
    not(feature = "force-scalar")
))]
pub type NativeBackend = backends::sse2::Sse2Backend;

/// Backend chosen for the build target
#[cfg(all(
    target_arch = "aarch64",
    target_feature = "neon",
    not(feature = "force-scalar")
))]
pub type NativeBackend = backends::neon::NeonBackend;

/// Backend chosen for the build target
#[cfg(any(
    feature = "force-scalar",
    not(any(
        all(target_arch = "x86_64", target_feature = "sse2"),
        all(target_arch = "aarch64", target_feature = "neon")
    ))
))]
pub type NativeBackend = backends::scalar::ScalarBackend;

/// Four f32 lanes on the native backend
pub type Simd4f = Simd4<NativeBackend>;
