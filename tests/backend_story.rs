//! Backend Story Integration Tests
//!
//! Every backend that compiles for the target is held to the same contract:
//! exact operations agree bit-for-bit with the scalar backend, approximate
//! operations stay within the documented relative error.
//!
//! A new backend joins the story by adding one `backend_story!` line at the
//! bottom of this file.

use simd4f::backends::scalar::ScalarBackend;
use simd4f::tolerance::{measure, ApproxOp, Tolerance, RELATIVE_EPSILON};
use simd4f::{Simd4, Simd4fBackend};

const SAMPLES: [[f32; 4]; 6] = [
    [1.0, 2.0, 3.0, 4.0],
    [-1.5, 0.25, 1e-3, 7.75],
    [1e6, -1e-6, 3.5, -2.0],
    [0.1, 0.2, 0.3, 0.4],
    [-0.0, 0.0, -8.0, 12345.678],
    [f32::MAX / 4.0, f32::MIN_POSITIVE * 8.0, -0.75, 1.0 / 3.0],
];

fn bits(a: [f32; 4]) -> [u32; 4] {
    a.map(f32::to_bits)
}

fn to_scalar<B: Simd4fBackend>(v: Simd4<B>) -> Simd4<ScalarBackend> {
    Simd4::from(v.to_array())
}

/// Same bits, except any NaN matches any NaN
fn assert_same_lanes(got: [f32; 4], want: [f32; 4], what: &str) {
    for lane in 0..4 {
        let (g, w) = (got[lane], want[lane]);
        if w.is_nan() {
            assert!(g.is_nan(), "{what}: lane {lane} expected NaN, got {g}");
        } else {
            assert_eq!(
                g.to_bits(),
                w.to_bits(),
                "{what}: lane {lane} got {g}, expected {w}"
            );
        }
    }
}

fn assert_relative(got: f32, want: f64, bound: f32, what: &str) {
    let err = ((f64::from(got) - want) / want).abs() as f32;
    assert!(
        err <= bound,
        "{what}: got {got}, expected {want}, relative error {err} > {bound}"
    );
}

fn check_create_and_get<B: Simd4fBackend>() {
    let v = Simd4::<B>::create(1.0, 2.0, 3.0, 4.0);
    assert_eq!((v.x(), v.y(), v.z(), v.w()), (1.0, 2.0, 3.0, 4.0));
    assert_eq!(v.to_array(), [1.0, 2.0, 3.0, 4.0]);

    assert_eq!(bits(Simd4::<B>::zero().to_array()), [0; 4]);
    assert_eq!(Simd4::<B>::splat(2.5).to_array(), [2.5; 4]);

    assert_eq!(v.splat_x().to_array(), [1.0; 4]);
    assert_eq!(v.splat_y().to_array(), [2.0; 4]);
    assert_eq!(v.splat_z().to_array(), [3.0; 4]);
    assert_eq!(v.splat_w().to_array(), [4.0; 4]);
}

fn check_load_store<B: Simd4fBackend>() {
    let src = [1.0, -2.0, 3.5, -0.0, 99.0];

    assert_same_lanes(
        Simd4::<B>::uload4(&src).to_array(),
        [1.0, -2.0, 3.5, -0.0],
        "uload4",
    );
    assert_same_lanes(
        Simd4::<B>::uload3(&src).to_array(),
        [1.0, -2.0, 3.5, 0.0],
        "uload3",
    );
    assert_same_lanes(
        Simd4::<B>::uload2(&src).to_array(),
        [1.0, -2.0, 0.0, 0.0],
        "uload2",
    );

    // Unaligned source
    let offset = Simd4::<B>::uload4(&src[1..]);
    assert_eq!(offset.to_array()[..3], [-2.0, 3.5, -0.0]);
    assert_eq!(offset.w(), 99.0);

    let v = Simd4::<B>::create(5.0, 6.0, 7.0, 8.0);
    for (store, written) in [
        (Simd4::<B>::ustore4 as fn(Simd4<B>, &mut [f32]), 4),
        (Simd4::<B>::ustore3, 3),
        (Simd4::<B>::ustore2, 2),
    ] {
        let mut dst = [-1.0f32; 6];
        store(v, &mut dst[1..]);
        assert_eq!(dst[0], -1.0);
        for i in 0..written {
            assert_eq!(dst[1 + i], v.to_array()[i]);
        }
        for &untouched in &dst[1 + written..] {
            assert_eq!(untouched, -1.0);
        }
    }

    for sample in SAMPLES {
        let mut out = [0.0f32; 4];
        Simd4::<B>::uload4(&sample).ustore4(&mut out);
        assert_eq!(bits(out), bits(sample));
    }
}

fn check_exact_arithmetic<B: Simd4fBackend>() {
    for a in SAMPLES {
        for b in SAMPLES {
            let (va, vb) = (Simd4::<B>::from(a), Simd4::<B>::from(b));
            let (sa, sb) = (to_scalar(va), to_scalar(vb));

            assert_same_lanes((va + vb).to_array(), (sa + sb).to_array(), "add");
            assert_same_lanes((va - vb).to_array(), (sa - sb).to_array(), "sub");
            assert_same_lanes((va * vb).to_array(), (sa * sb).to_array(), "mul");
            assert_same_lanes((va / vb).to_array(), (sa / sb).to_array(), "div");
            assert_same_lanes(va.min(vb).to_array(), sa.min(sb).to_array(), "min");
            assert_same_lanes(va.max(vb).to_array(), sa.max(sb).to_array(), "max");
        }
    }
}

fn check_special_values_stay_in_their_lane<B: Simd4fBackend>() {
    let special = Simd4::<B>::create(f32::NAN, 2.0, f32::INFINITY, 4.0);
    let other = Simd4::<B>::create(1.0, 0.5, 1.0, -2.0);

    let sum = (special + other).to_array();
    assert!(sum[0].is_nan());
    assert_eq!(sum[1], 2.5);
    assert_eq!(sum[2], f32::INFINITY);
    assert_eq!(sum[3], 2.0);

    let quotient = (special / other).to_array();
    assert!(quotient[0].is_nan());
    assert_eq!(quotient[1], 4.0);
    assert_eq!(quotient[3], -2.0);

    let div_zero = (Simd4::<B>::create(1.0, -1.0, 0.0, 6.0)
        / Simd4::<B>::create(0.0, 0.0, 0.0, 3.0))
    .to_array();
    assert_eq!(div_zero[0], f32::INFINITY);
    assert_eq!(div_zero[1], f32::NEG_INFINITY);
    assert!(div_zero[2].is_nan());
    assert_eq!(div_zero[3], 2.0);
}

fn check_madd<B: Simd4fBackend>() {
    // Exactly representable products, so fused and unfused agree
    let m1 = Simd4::<B>::create(1.5, -2.0, 0.25, 8.0);
    let m2 = Simd4::<B>::create(2.0, 3.0, 4.0, 0.5);
    let a = Simd4::<B>::create(1.0, 1.0, 1.0, 1.0);
    assert_eq!(m1.madd(m2, a).to_array(), [4.0, -5.0, 2.0, 5.0]);
}

fn check_approximate_family<B: Simd4fBackend>() {
    for op in ApproxOp::ALL {
        let report = measure::<B>(op, 1e-6, 1e6, 2001).expect("valid range");
        assert!(
            report.within(RELATIVE_EPSILON),
            "{:?} {op:?}: {report:?}",
            B::KIND
        );
        let own = Tolerance::for_backend(B::KIND).for_op(op);
        assert!(report.within(own), "{:?} {op:?}: {report:?}", B::KIND);
    }

    // Lane independence for the approximate family
    let v = Simd4::<B>::create(4.0, 0.25, 100.0, 2.0);
    let recip = v.reciprocal().to_array();
    let root = v.sqrt().to_array();
    let rroot = v.rsqrt().to_array();
    for (lane, &x) in v.to_array().iter().enumerate() {
        let x = f64::from(x);
        assert_relative(recip[lane], 1.0 / x, RELATIVE_EPSILON, "reciprocal");
        assert_relative(root[lane], x.sqrt(), RELATIVE_EPSILON, "sqrt");
        assert_relative(rroot[lane], 1.0 / x.sqrt(), RELATIVE_EPSILON, "rsqrt");
    }

    let negative = Simd4::<B>::create(-4.0, -1e-6, -3.0, -123_456.7);
    assert_reciprocal_product(negative, "negative");
    let mixed = Simd4::<B>::create(-0.37, 2.5, -7.75e5, 1e-3);
    assert_reciprocal_product(mixed, "mixed sign");
}

/// `|reciprocal(v) * v - 1| < RELATIVE_EPSILON` in every lane
fn assert_reciprocal_product<B: Simd4fBackend>(v: Simd4<B>, what: &str) {
    let r = v.reciprocal().to_array();
    for (lane, &x) in v.to_array().iter().enumerate() {
        let err = (f64::from(r[lane]) * f64::from(x) - 1.0).abs();
        assert!(
            err < f64::from(RELATIVE_EPSILON),
            "{:?} {what}: reciprocal({x}) = {}, |r*v - 1| = {err}",
            B::KIND,
            r[lane]
        );
    }
}

fn check_approximate_edges<B: Simd4fBackend>() {
    let root = Simd4::<B>::create(0.0, -0.0, 1.0, -1.0).sqrt().to_array();
    assert_eq!(root[0].to_bits(), 0.0f32.to_bits());
    assert_eq!(root[1].to_bits(), (-0.0f32).to_bits());
    assert!(root[3].is_nan());

    let recip = Simd4::<B>::create(0.0, -0.0, 2.0, f32::NAN)
        .reciprocal()
        .to_array();
    assert!(!recip[0].is_finite());
    assert!(!recip[1].is_finite());
    assert!(recip[3].is_nan());

    let rroot = Simd4::<B>::create(0.0, -4.0, 1.0, f32::NAN).rsqrt().to_array();
    assert!(!rroot[0].is_finite());
    assert!(rroot[1].is_nan());
    assert!(rroot[3].is_nan());

    // Around 2^126 the reciprocal crosses into the subnormal range
    let two_126 = f32::from_bits(0x7E80_0000);
    let below = f32::from_bits(0x7E7F_FFFF);
    assert_reciprocal_product(Simd4::<B>::create(below, two_126, -two_126, 1e38), "near 2^126");
    assert_reciprocal_product(
        Simd4::<B>::create(3e38, -f32::MAX, f32::MAX, -9e37),
        "near f32::MAX",
    );
    // Subnormal inputs with a finite reciprocal
    assert_reciprocal_product(
        Simd4::<B>::create(
            f32::MIN_POSITIVE,
            f32::MIN_POSITIVE / 2.0,
            -f32::MIN_POSITIVE / 2.0,
            -f32::MIN_POSITIVE,
        ),
        "near 2^-126",
    );
}

fn check_shuffles<B: Simd4fBackend>() {
    let v = Simd4::<B>::create(1.0, 2.0, 3.0, 4.0);
    assert_eq!(v.shuffle_wxyz().to_array(), [4.0, 1.0, 2.0, 3.0]);
    assert_eq!(v.shuffle_zwxy().to_array(), [3.0, 4.0, 1.0, 2.0]);
    assert_eq!(v.shuffle_yzwx().to_array(), [2.0, 3.0, 4.0, 1.0]);

    let h = Simd4::<B>::create(5.0, 6.0, 7.0, 8.0);
    assert_eq!(v.merge_high(h).to_array(), [3.0, 4.0, 7.0, 8.0]);

    for sample in SAMPLES {
        let s = Simd4::<B>::from(sample);
        let wxyz = s.shuffle_wxyz().shuffle_wxyz().shuffle_wxyz().shuffle_wxyz();
        let yzwx = s.shuffle_yzwx().shuffle_yzwx().shuffle_yzwx().shuffle_yzwx();
        assert_eq!(bits(wxyz.to_array()), bits(sample));
        assert_eq!(bits(yzwx.to_array()), bits(sample));
        assert_eq!(bits(s.shuffle_zwxy().shuffle_zwxy().to_array()), bits(sample));
        assert_eq!(bits(s.shuffle_wxyz().shuffle_yzwx().to_array()), bits(sample));
    }
}

fn check_sign_and_masking<B: Simd4fBackend>() {
    let v = Simd4::<B>::create(1.0, -2.0, 0.0, -0.0);
    assert_same_lanes(v.flip_sign_0101().to_array(), [1.0, 2.0, 0.0, 0.0], "0101");
    assert_same_lanes(v.flip_sign_1010().to_array(), [-1.0, -2.0, -0.0, -0.0], "1010");
    assert_same_lanes((-v).to_array(), [-1.0, 2.0, -0.0, 0.0], "negate");

    let odd = Simd4::<B>::create(f32::NAN, -0.0, f32::INFINITY, f32::MIN_POSITIVE);
    for sample in SAMPLES.iter().copied().chain([odd.to_array()]) {
        let s = Simd4::<B>::from(sample);
        assert_eq!(bits(s.flip_sign_0101().flip_sign_0101().to_array()), bits(sample));
        assert_eq!(bits(s.flip_sign_1010().flip_sign_1010().to_array()), bits(sample));
        assert_eq!(bits((-(-s)).to_array()), bits(sample));
    }

    let w = Simd4::<B>::create(1.0, 2.0, 3.0, 4.0);
    assert_eq!(bits(w.zero_w().to_array()), bits([1.0, 2.0, 3.0, 0.0]));
    assert_eq!(bits(w.zero_zw().to_array()), bits([1.0, 2.0, 0.0, 0.0]));
}

fn check_cross3<B: Simd4fBackend>() {
    let x = Simd4::<B>::create(1.0, 0.0, 0.0, 0.0);
    let y = Simd4::<B>::create(0.0, 1.0, 0.0, 0.0);
    let z = Simd4::<B>::create(0.0, 0.0, 1.0, 0.0);
    assert_eq!(x.cross3(y).to_array(), [0.0, 0.0, 1.0, 0.0]);
    assert_eq!(y.cross3(z).to_array(), [1.0, 0.0, 0.0, 0.0]);
    assert_eq!(z.cross3(x).to_array(), [0.0, 1.0, 0.0, 0.0]);
    assert_eq!(y.cross3(x).to_array(), [0.0, 0.0, -1.0, 0.0]);

    for a in SAMPLES {
        let va = Simd4::<B>::from(a);
        let own = va.cross3(va).to_array();
        assert_eq!(own, [0.0; 4], "self cross of {a:?}");

        for b in SAMPLES {
            let vb = Simd4::<B>::from(b);
            let ab = va.cross3(vb).to_array();
            let ba = vb.cross3(va).to_array();
            assert_eq!(ab[3].to_bits(), 0.0f32.to_bits(), "lane 3 of {a:?} x {b:?}");
            for lane in 0..3 {
                if ab[lane].is_finite() {
                    assert_eq!(ab[lane], -ba[lane], "antisymmetry lane {lane}");
                }
            }
            assert_same_lanes(
                ab,
                to_scalar(va).cross3(to_scalar(vb)).to_array(),
                "cross3 vs scalar",
            );
        }
    }

    // Non-zero w lanes never leak into the result
    let a = Simd4::<B>::create(1.0, 2.0, 3.0, 100.0);
    let b = Simd4::<B>::create(4.0, 5.0, 6.0, -7.0);
    assert_eq!(a.cross3(b).to_array(), [-3.0, 6.0, -3.0, 0.0]);
}

fn check_reductions<B: Simd4fBackend>() {
    let v = Simd4::<B>::create(1.0, 2.0, 3.0, 4.0);
    let u = Simd4::<B>::create(5.0, 6.0, 7.0, 8.0);
    assert_eq!(v.sum().to_array(), [10.0; 4]);
    assert_eq!(v.dot4(u).to_array(), [70.0; 4]);
    assert_eq!(v.dot3(u).to_array(), [38.0; 4]);
    assert_eq!(v.dot2(u).to_array(), [17.0; 4]);
    assert_eq!(v.length4_squared().x(), 30.0);
    assert_eq!(v.length3_squared().x(), 14.0);
    assert_eq!(v.length2_squared().x(), 5.0);

    let p = Simd4::<B>::create(3.0, 4.0, 12.0, 84.0);
    assert_relative(p.length2().x(), 5.0, RELATIVE_EPSILON, "length2");
    assert_relative(p.length3().x(), 13.0, RELATIVE_EPSILON, "length3");
    assert_relative(p.length4().x(), 85.0, RELATIVE_EPSILON, "length4");

    let n = p.normalize3().to_array();
    assert_relative(n[0], 3.0 / 13.0, 2.0 * RELATIVE_EPSILON, "normalize3 x");
    assert_relative(n[2], 12.0 / 13.0, 2.0 * RELATIVE_EPSILON, "normalize3 z");
    assert_relative(p.normalize4().length4().x(), 1.0, 4.0 * RELATIVE_EPSILON, "normalize4");
    assert_relative(p.normalize2().length2().x(), 1.0, 4.0 * RELATIVE_EPSILON, "normalize2");
}

macro_rules! backend_story {
    ($name:ident, $backend:ty) => {
        mod $name {
            use super::*;

            #[test]
            fn test_create_and_get() {
                check_create_and_get::<$backend>();
            }

            #[test]
            fn test_load_store() {
                check_load_store::<$backend>();
            }

            #[test]
            fn test_exact_arithmetic_matches_scalar() {
                check_exact_arithmetic::<$backend>();
            }

            #[test]
            fn test_special_values_stay_in_their_lane() {
                check_special_values_stay_in_their_lane::<$backend>();
            }

            #[test]
            fn test_madd() {
                check_madd::<$backend>();
            }

            #[test]
            fn test_approximate_family_within_epsilon() {
                check_approximate_family::<$backend>();
            }

            #[test]
            fn test_approximate_edges() {
                check_approximate_edges::<$backend>();
            }

            #[test]
            fn test_shuffles() {
                check_shuffles::<$backend>();
            }

            #[test]
            fn test_sign_and_masking() {
                check_sign_and_masking::<$backend>();
            }

            #[test]
            fn test_cross3() {
                check_cross3::<$backend>();
            }

            #[test]
            fn test_reductions() {
                check_reductions::<$backend>();
            }
        }
    };
}

backend_story!(scalar, simd4f::backends::scalar::ScalarBackend);
backend_story!(native, simd4f::NativeBackend);

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
backend_story!(sse2, simd4f::backends::sse2::Sse2Backend);

#[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
backend_story!(neon, simd4f::backends::neon::NeonBackend);
