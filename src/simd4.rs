//! 4-lane f32 value type over a statically chosen backend

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::backends::Simd4fBackend;
use crate::{Result, Simd4fError};

/// Four f32 lanes (x, y, z, w) computed by backend `B`
///
/// Most code should use the [`crate::Simd4f`] alias, which binds `B` to the
/// build's native backend. Naming another backend explicitly is useful for
/// checking it against the native one.
///
/// # Examples
///
/// ```
/// use simd4f::Simd4f;
///
/// let a = Simd4f::create(1.0, 2.0, 3.0, 4.0);
/// let b = Simd4f::splat(2.0);
/// let c = a * b + Simd4f::splat(1.0);
///
/// assert_eq!(c.to_array(), [3.0, 5.0, 7.0, 9.0]);
/// ```
pub struct Simd4<B: Simd4fBackend> {
    lane: B::Lane,
    _backend: PhantomData<fn() -> B>,
}

impl<B: Simd4fBackend> Clone for Simd4<B> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: Simd4fBackend> Copy for Simd4<B> {}

impl<B: Simd4fBackend> Simd4<B> {
    /// Wrap a raw backend lane
    #[inline]
    pub fn from_lane(lane: B::Lane) -> Self {
        Self {
            lane,
            _backend: PhantomData,
        }
    }

    /// The raw backend lane
    #[inline]
    pub fn lane(self) -> B::Lane {
        self.lane
    }

    /// Lanes `(x, y, z, w)`
    #[inline]
    pub fn create(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self::from_lane(B::create(x, y, z, w))
    }

    /// All lanes `+0.0`
    #[inline]
    pub fn zero() -> Self {
        Self::from_lane(B::zero())
    }

    /// All lanes equal to `v`
    #[inline]
    pub fn splat(v: f32) -> Self {
        Self::from_lane(B::splat(v))
    }

    /// Broadcast lane 0
    #[inline]
    pub fn splat_x(self) -> Self {
        Self::from_lane(B::splat_x(self.lane))
    }

    /// Broadcast lane 1
    #[inline]
    pub fn splat_y(self) -> Self {
        Self::from_lane(B::splat_y(self.lane))
    }

    /// Broadcast lane 2
    #[inline]
    pub fn splat_z(self) -> Self {
        Self::from_lane(B::splat_z(self.lane))
    }

    /// Broadcast lane 3
    #[inline]
    pub fn splat_w(self) -> Self {
        Self::from_lane(B::splat_w(self.lane))
    }

    // ---------------------------------------------------------------------
    // Transfer
    // ---------------------------------------------------------------------

    /// Load `ary[0..4]`
    ///
    /// # Panics
    ///
    /// Panics if `ary` holds fewer than 4 floats.
    #[inline]
    pub fn uload4(ary: &[f32]) -> Self {
        assert!(ary.len() >= 4, "uload4 needs 4 floats, got {}", ary.len());
        // SAFETY: length checked above
        Self::from_lane(unsafe { B::uload4(ary.as_ptr()) })
    }

    /// Load `ary[0..3]`, lane 3 = `+0.0`
    ///
    /// # Panics
    ///
    /// Panics if `ary` holds fewer than 3 floats.
    #[inline]
    pub fn uload3(ary: &[f32]) -> Self {
        assert!(ary.len() >= 3, "uload3 needs 3 floats, got {}", ary.len());
        // SAFETY: length checked above
        Self::from_lane(unsafe { B::uload3(ary.as_ptr()) })
    }

    /// Load `ary[0..2]`, lanes 2 and 3 = `+0.0`
    ///
    /// # Panics
    ///
    /// Panics if `ary` holds fewer than 2 floats.
    #[inline]
    pub fn uload2(ary: &[f32]) -> Self {
        assert!(ary.len() >= 2, "uload2 needs 2 floats, got {}", ary.len());
        // SAFETY: length checked above
        Self::from_lane(unsafe { B::uload2(ary.as_ptr()) })
    }

    /// Store all four lanes to `ary[0..4]`
    ///
    /// # Panics
    ///
    /// Panics if `ary` holds fewer than 4 floats.
    #[inline]
    pub fn ustore4(self, ary: &mut [f32]) {
        assert!(ary.len() >= 4, "ustore4 needs 4 floats, got {}", ary.len());
        // SAFETY: length checked above
        unsafe { B::ustore4(self.lane, ary.as_mut_ptr()) }
    }

    /// Store lanes 0..3 to `ary[0..3]`; `ary[3..]` is untouched
    ///
    /// # Panics
    ///
    /// Panics if `ary` holds fewer than 3 floats.
    #[inline]
    pub fn ustore3(self, ary: &mut [f32]) {
        assert!(ary.len() >= 3, "ustore3 needs 3 floats, got {}", ary.len());
        // SAFETY: length checked above
        unsafe { B::ustore3(self.lane, ary.as_mut_ptr()) }
    }

    /// Store lanes 0..2 to `ary[0..2]`; `ary[2..]` is untouched
    ///
    /// # Panics
    ///
    /// Panics if `ary` holds fewer than 2 floats.
    #[inline]
    pub fn ustore2(self, ary: &mut [f32]) {
        assert!(ary.len() >= 2, "ustore2 needs 2 floats, got {}", ary.len());
        // SAFETY: length checked above
        unsafe { B::ustore2(self.lane, ary.as_mut_ptr()) }
    }

    /// Checked [`Self::uload4`]
    ///
    /// # Errors
    ///
    /// Returns [`Simd4fError::BufferTooShort`] if `ary` holds fewer than 4 floats.
    pub fn try_uload4(ary: &[f32]) -> Result<Self> {
        check_len(ary.len(), 4)?;
        Ok(Self::uload4(ary))
    }

    /// Checked [`Self::uload3`]
    ///
    /// # Errors
    ///
    /// Returns [`Simd4fError::BufferTooShort`] if `ary` holds fewer than 3 floats.
    pub fn try_uload3(ary: &[f32]) -> Result<Self> {
        check_len(ary.len(), 3)?;
        Ok(Self::uload3(ary))
    }

    /// Checked [`Self::uload2`]
    ///
    /// # Errors
    ///
    /// Returns [`Simd4fError::BufferTooShort`] if `ary` holds fewer than 2 floats.
    pub fn try_uload2(ary: &[f32]) -> Result<Self> {
        check_len(ary.len(), 2)?;
        Ok(Self::uload2(ary))
    }

    /// Checked [`Self::ustore4`]
    ///
    /// # Errors
    ///
    /// Returns [`Simd4fError::BufferTooShort`] if `ary` holds fewer than 4
    /// floats; nothing is written in that case.
    pub fn try_ustore4(self, ary: &mut [f32]) -> Result<()> {
        check_len(ary.len(), 4)?;
        self.ustore4(ary);
        Ok(())
    }

    /// Checked [`Self::ustore3`]
    ///
    /// # Errors
    ///
    /// Returns [`Simd4fError::BufferTooShort`] if `ary` holds fewer than 3
    /// floats; nothing is written in that case.
    pub fn try_ustore3(self, ary: &mut [f32]) -> Result<()> {
        check_len(ary.len(), 3)?;
        self.ustore3(ary);
        Ok(())
    }

    /// Checked [`Self::ustore2`]
    ///
    /// # Errors
    ///
    /// Returns [`Simd4fError::BufferTooShort`] if `ary` holds fewer than 2
    /// floats; nothing is written in that case.
    pub fn try_ustore2(self, ary: &mut [f32]) -> Result<()> {
        check_len(ary.len(), 2)?;
        self.ustore2(ary);
        Ok(())
    }

    /// Lanes as `[x, y, z, w]`
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        let mut out = [0.0; 4];
        self.ustore4(&mut out);
        out
    }

    // ---------------------------------------------------------------------
    // Arithmetic
    // ---------------------------------------------------------------------

    /// `self * m + a`, possibly fused
    #[inline]
    pub fn madd(self, m: Self, a: Self) -> Self {
        Self::from_lane(B::madd(self.lane, m.lane, a.lane))
    }

    /// Per-lane `1 / self` (approximate on estimate-and-refine backends)
    #[inline]
    pub fn reciprocal(self) -> Self {
        Self::from_lane(B::reciprocal(self.lane))
    }

    /// Per-lane square root (approximate on estimate-and-refine backends)
    #[inline]
    pub fn sqrt(self) -> Self {
        Self::from_lane(B::sqrt(self.lane))
    }

    /// Per-lane `1 / sqrt(self)` (approximate on estimate-and-refine backends)
    #[inline]
    pub fn rsqrt(self) -> Self {
        Self::from_lane(B::rsqrt(self.lane))
    }

    // ---------------------------------------------------------------------
    // Rearrangement & bits
    // ---------------------------------------------------------------------

    /// `(w, x, y, z)`
    #[inline]
    pub fn shuffle_wxyz(self) -> Self {
        Self::from_lane(B::shuffle_wxyz(self.lane))
    }

    /// `(z, w, x, y)`
    #[inline]
    pub fn shuffle_zwxy(self) -> Self {
        Self::from_lane(B::shuffle_zwxy(self.lane))
    }

    /// `(y, z, w, x)`
    #[inline]
    pub fn shuffle_yzwx(self) -> Self {
        Self::from_lane(B::shuffle_yzwx(self.lane))
    }

    /// `(self.z, self.w, other.z, other.w)`
    #[inline]
    pub fn merge_high(self, other: Self) -> Self {
        Self::from_lane(B::merge_high(self.lane, other.lane))
    }

    /// Negate lanes 1 and 3
    #[inline]
    pub fn flip_sign_0101(self) -> Self {
        Self::from_lane(B::flip_sign_0101(self.lane))
    }

    /// Negate lanes 0 and 2
    #[inline]
    pub fn flip_sign_1010(self) -> Self {
        Self::from_lane(B::flip_sign_1010(self.lane))
    }

    /// Lane 3 = `+0.0`
    #[inline]
    pub fn zero_w(self) -> Self {
        Self::from_lane(B::zero_w(self.lane))
    }

    /// Lanes 2 and 3 = `+0.0`
    #[inline]
    pub fn zero_zw(self) -> Self {
        Self::from_lane(B::zero_zw(self.lane))
    }

    // ---------------------------------------------------------------------
    // Cross-lane
    // ---------------------------------------------------------------------

    /// Cross product of lanes 0..2, lane 3 = `+0.0`
    #[inline]
    pub fn cross3(self, rhs: Self) -> Self {
        Self::from_lane(B::cross3(self.lane, rhs.lane))
    }

    /// Per-lane minimum
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self::from_lane(B::min(self.lane, other.lane))
    }

    /// Per-lane maximum
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self::from_lane(B::max(self.lane, other.lane))
    }

    /// Lane 0
    #[inline]
    pub fn x(self) -> f32 {
        B::get_x(self.lane)
    }

    /// Lane 1
    #[inline]
    pub fn y(self) -> f32 {
        B::get_y(self.lane)
    }

    /// Lane 2
    #[inline]
    pub fn z(self) -> f32 {
        B::get_z(self.lane)
    }

    /// Lane 3
    #[inline]
    pub fn w(self) -> f32 {
        B::get_w(self.lane)
    }

    /// `x + y + z + w` in every lane
    #[inline]
    pub fn sum(self) -> Self {
        Self::from_lane(B::sum(self.lane))
    }

    /// 4-lane dot product in every lane
    #[inline]
    pub fn dot4(self, rhs: Self) -> Self {
        Self::from_lane(B::dot4(self.lane, rhs.lane))
    }

    /// Dot product of lanes 0..2 in every lane
    #[inline]
    pub fn dot3(self, rhs: Self) -> Self {
        Self::from_lane(B::dot3(self.lane, rhs.lane))
    }

    /// Dot product of lanes 0..1 in every lane
    #[inline]
    pub fn dot2(self, rhs: Self) -> Self {
        Self::from_lane(B::dot2(self.lane, rhs.lane))
    }

    /// 4-lane length in every lane
    #[inline]
    pub fn length4(self) -> Self {
        Self::from_lane(B::length4(self.lane))
    }

    /// Length of lanes 0..2 in every lane
    #[inline]
    pub fn length3(self) -> Self {
        Self::from_lane(B::length3(self.lane))
    }

    /// Length of lanes 0..1 in every lane
    #[inline]
    pub fn length2(self) -> Self {
        Self::from_lane(B::length2(self.lane))
    }

    /// Squared 4-lane length in every lane
    #[inline]
    pub fn length4_squared(self) -> Self {
        Self::from_lane(B::length4_squared(self.lane))
    }

    /// Squared length of lanes 0..2 in every lane
    #[inline]
    pub fn length3_squared(self) -> Self {
        Self::from_lane(B::length3_squared(self.lane))
    }

    /// Squared length of lanes 0..1 in every lane
    #[inline]
    pub fn length2_squared(self) -> Self {
        Self::from_lane(B::length2_squared(self.lane))
    }

    /// Unit-length over 4 lanes
    #[inline]
    pub fn normalize4(self) -> Self {
        Self::from_lane(B::normalize4(self.lane))
    }

    /// Unit-length over lanes 0..2
    #[inline]
    pub fn normalize3(self) -> Self {
        Self::from_lane(B::normalize3(self.lane))
    }

    /// Unit-length over lanes 0..1
    #[inline]
    pub fn normalize2(self) -> Self {
        Self::from_lane(B::normalize2(self.lane))
    }
}

fn check_len(actual: usize, required: usize) -> Result<()> {
    if actual < required {
        return Err(Simd4fError::BufferTooShort { required, actual });
    }
    Ok(())
}

impl<B: Simd4fBackend> Default for Simd4<B> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<B: Simd4fBackend> fmt::Debug for Simd4<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Simd4")
            .field(&B::KIND)
            .field(&self.to_array())
            .finish()
    }
}

/// Lane-wise IEEE equality (`NaN != NaN`, `-0.0 == +0.0`)
impl<B: Simd4fBackend> PartialEq for Simd4<B> {
    fn eq(&self, other: &Self) -> bool {
        self.to_array() == other.to_array()
    }
}

impl<B: Simd4fBackend> From<[f32; 4]> for Simd4<B> {
    #[inline]
    fn from(a: [f32; 4]) -> Self {
        Self::create(a[0], a[1], a[2], a[3])
    }
}

impl<B: Simd4fBackend> From<Simd4<B>> for [f32; 4] {
    #[inline]
    fn from(v: Simd4<B>) -> Self {
        v.to_array()
    }
}

impl<B: Simd4fBackend> TryFrom<&[f32]> for Simd4<B> {
    type Error = Simd4fError;

    /// Loads a 2-, 3- or 4-float slice, zero-filling the missing lanes
    fn try_from(ary: &[f32]) -> Result<Self> {
        match ary.len() {
            2 => Ok(Self::uload2(ary)),
            3 => Ok(Self::uload3(ary)),
            4 => Ok(Self::uload4(ary)),
            n => Err(Simd4fError::UnsupportedLength(n)),
        }
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident) => {
        impl<B: Simd4fBackend> $trait for Simd4<B> {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: Self) -> Self {
                Self::from_lane(B::$method(self.lane, rhs.lane))
            }
        }

        impl<B: Simd4fBackend> $trait<f32> for Simd4<B> {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: f32) -> Self {
                Self::from_lane(B::$method(self.lane, B::splat(rhs)))
            }
        }

        impl<B: Simd4fBackend> $trait<Simd4<B>> for f32 {
            type Output = Simd4<B>;

            #[inline]
            fn $method(self, rhs: Simd4<B>) -> Simd4<B> {
                Simd4::from_lane(B::$method(B::splat(self), rhs.lane))
            }
        }

        impl<B: Simd4fBackend> $assign_trait for Simd4<B> {
            #[inline]
            fn $assign_method(&mut self, rhs: Self) {
                *self = $trait::$method(*self, rhs);
            }
        }

        impl<B: Simd4fBackend> $assign_trait<f32> for Simd4<B> {
            #[inline]
            fn $assign_method(&mut self, rhs: f32) {
                *self = $trait::$method(*self, rhs);
            }
        }
    };
}

impl_binary_op!(Add, add, AddAssign, add_assign);
impl_binary_op!(Sub, sub, SubAssign, sub_assign);
impl_binary_op!(Mul, mul, MulAssign, mul_assign);
impl_binary_op!(Div, div, DivAssign, div_assign);

impl<B: Simd4fBackend> Neg for Simd4<B> {
    type Output = Self;

    /// Flips every sign bit, so `-zero()` is `-0.0` in each lane
    #[inline]
    fn neg(self) -> Self {
        Self::from_lane(B::negate(self.lane))
    }
}
