//! Property-based tests over randomly configured scans.

#![allow(missing_docs, clippy::tests_outside_test_module)]

use proptest::prelude::*;
use scanpoint::{
    CompoundGenerator, Excluder, Generator, Point, ScanGenerator, Serializable,
    generators::LineGenerator, roi::CircularRoi,
};

/// Build and prepare a compound scan; panics on invalid input.
fn prepared(
    generators: Vec<ScanGenerator>,
    excluders: Vec<Excluder>,
) -> CompoundGenerator {
    let mut g = CompoundGenerator::new(generators, excluders, vec![]).expect("valid scan");
    g.prepare_positions().expect("addressable scan");
    g.prepare_bounds();
    g
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Bounds of an increasing line bracket each position and tile the axis.
    #[test]
    fn line_bounds_bracket_positions(
        start in -100.0f64..100.0,
        span in 0.001f64..50.0,
        num in 1usize..40,
    ) {
        let mut g = LineGenerator::new("x", "mm", start, start + span, num).expect("valid line");
        g.prepare_positions();
        g.prepare_bounds();
        let points: Vec<Point> = g.iterator().expect("prepared").collect();
        prop_assert_eq!(points.len(), num);
        for p in &points {
            let (lo, pos, hi) = (p.lower()["x"], p.positions()["x"], p.upper()["x"]);
            prop_assert!(lo <= pos && pos <= hi, "{} {} {}", lo, pos, hi);
        }
        for pair in points.windows(2) {
            prop_assert_eq!(pair[0].upper()["x"], pair[1].lower()["x"]);
        }
    }

    /// Without excluders the scan size is the product of generator sizes.
    #[test]
    fn size_is_product(a in 1usize..8, b in 1usize..8, c in 1usize..8, snake in any::<bool>()) {
        let z = LineGenerator::new("z", "mm", 0.0, 1.0, a).expect("z");
        let y = LineGenerator::new("y", "mm", 0.0, 1.0, b).expect("y").alternating(snake);
        let x = LineGenerator::new("x", "mm", 0.0, 1.0, c).expect("x").alternating(snake);
        let g = prepared(vec![z.into(), y.into(), x.into()], vec![]);
        prop_assert_eq!(g.size().expect("prepared"), a * b * c);
        prop_assert_eq!(g.shape().expect("prepared"), &[a, b, c][..]);
        prop_assert_eq!(g.iterator().expect("prepared").count(), a * b * c);
    }

    /// Dense iteration and random access agree, and every surviving point
    /// satisfies the region.
    #[test]
    fn iteration_matches_random_access(
        ny in 1usize..10,
        nx in 1usize..10,
        cx in 0.0f64..4.0,
        cy in 0.0f64..4.0,
        r in 0.1f64..4.0,
        snake in any::<bool>(),
    ) {
        let y = LineGenerator::new("y", "mm", 0.0, 4.0, ny).expect("y");
        let x = LineGenerator::new("x", "mm", 0.0, 4.0, nx).expect("x").alternating(snake);
        let roi = CircularRoi::new([cx, cy], r).expect("circle");
        let excluder = Excluder::new(roi, ["x", "y"]).expect("excluder");
        let g = prepared(vec![y.into(), x.into()], vec![excluder.clone()]);
        let size = g.size().expect("prepared");
        prop_assert!(size <= ny * nx);
        let mut seen = 0;
        for (n, p) in g.iterator().expect("prepared").enumerate() {
            prop_assert_eq!(&g.point(n).expect("in range"), &p);
            prop_assert!(excluder.contains(p.positions()["x"], p.positions()["y"]));
            seen += 1;
        }
        prop_assert_eq!(seen, size);
    }

    /// Generators survive a trip through their dictionary form.
    #[test]
    fn line_round_trip(
        start in -10.0f64..10.0,
        stop in -10.0f64..10.0,
        num in 1usize..100,
        snake in any::<bool>(),
    ) {
        let g: ScanGenerator = LineGenerator::new("x", "mm", start, stop, num)
            .expect("valid line")
            .alternating(snake)
            .into();
        let decoded = ScanGenerator::from_dict(&g.to_dict()).expect("decodes");
        prop_assert_eq!(decoded.size(), num);
        prop_assert_eq!(decoded, g);
    }
}
