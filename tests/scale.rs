use choropleth::options::ClusteringMode;
use choropleth::palette::Color;
use choropleth::scale::{ScaleSpec, build_scale, kmeans_centers};

const MIN: Color = Color::rgb(0x79, 0x9c, 0xff);
const MAX: Color = Color::rgb(0x00, 0x2f, 0xb4);

fn spec(mode: ClusteringMode, steps: usize) -> ScaleSpec {
    ScaleSpec {
        mode,
        steps,
        min_color: MIN,
        max_color: MAX,
    }
}

fn approx_eq(a: &[f64], b: &[f64]) {
    assert_eq!(a.len(), b.len(), "{a:?} vs {b:?}");
    for (x, y) in a.iter().zip(b) {
        assert!((x - y).abs() < 1e-9, "{a:?} vs {b:?}");
    }
}

fn non_decreasing(limits: &[f64]) -> bool {
    limits.windows(2).all(|w| w[0] <= w[1])
}

#[test]
fn equidistant_five_steps_over_one_to_five() {
    let s = build_scale(&[1.0, 2.0, 3.0, 4.0, 5.0], spec(ClusteringMode::Equidistant, 5));
    approx_eq(&s.limits, &[1.0, 1.8, 2.6, 3.4, 4.2, 5.0]);
    assert_eq!(s.colors.len(), 5);
    assert_eq!(s.samples, 5);
}

#[test]
fn equidistant_limits_span_min_to_max() {
    let values = [12.0, -3.5, 7.25, 100.0, 42.0, 0.1];
    for steps in 1..=9 {
        let s = build_scale(&values, spec(ClusteringMode::Equidistant, steps));
        assert_eq!(s.limits.len(), steps + 1);
        assert!(non_decreasing(&s.limits));
        assert_eq!(s.limits[0], -3.5);
        assert_eq!(s.limits[steps], 100.0);
    }
}

#[test]
fn quantile_buckets_hold_similar_counts() {
    let values: Vec<f64> = (0..1000).map(|i| i as f64 * 0.37).collect();
    for steps in [2, 3, 4, 5, 7] {
        let s = build_scale(&values, spec(ClusteringMode::Quantile, steps));
        assert_eq!(s.limits.len(), steps + 1);
        assert!(non_decreasing(&s.limits));
        let mut counts = vec![0usize; steps];
        for v in &values {
            counts[s.bucket_of(*v)] += 1;
        }
        let expected = values.len() as f64 / steps as f64;
        for c in counts {
            assert!((c as f64 - expected).abs() <= 2.0, "steps={steps} count={c}");
        }
    }
}

#[test]
fn quantile_ignores_input_order() {
    let a = build_scale(&[5.0, 1.0, 4.0, 2.0, 3.0], spec(ClusteringMode::Quantile, 2));
    let b = build_scale(&[1.0, 2.0, 3.0, 4.0, 5.0], spec(ClusteringMode::Quantile, 2));
    assert_eq!(a.limits, b.limits);
    approx_eq(&a.limits, &[1.0, 3.0, 5.0]);
}

#[test]
fn kmeans_is_deterministic_and_spans_the_data() {
    let values = [1.0, 1.2, 0.9, 10.0, 10.5, 11.0, 50.0, 52.0, 49.0, 51.0];
    let first = build_scale(&values, spec(ClusteringMode::Kmeans, 3));
    for _ in 0..5 {
        let again = build_scale(&values, spec(ClusteringMode::Kmeans, 3));
        assert_eq!(first.limits, again.limits);
    }
    assert_eq!(first.limits.len(), 4);
    assert!(non_decreasing(&first.limits));
    assert_eq!(first.limits[0], 0.9);
    assert_eq!(first.limits[3], 52.0);
    assert_eq!(first.bucket_of(1.0), 0);
    assert_eq!(first.bucket_of(50.0), 2);
}

#[test]
fn kmeans_with_more_clusters_than_distinct_values() {
    let values = [2.0, 2.0, 8.0];
    let s = build_scale(&values, spec(ClusteringMode::Kmeans, 5));
    assert_eq!(s.limits.len(), 6);
    assert!(non_decreasing(&s.limits));
    assert_eq!(s.limits[0], 2.0);
    assert_eq!(s.limits[5], 8.0);
    assert_ne!(s.bucket_of(2.0), s.bucket_of(8.0));
}

#[test]
fn kmeans_centers_are_sorted() {
    let centers = kmeans_centers(&[1.0, 2.0, 3.0, 100.0, 101.0], 2);
    assert_eq!(centers.len(), 2);
    assert!(centers[0] < centers[1]);
    approx_eq(&centers, &[2.0, 100.5]);
}

#[test]
fn all_equal_values_collapse_to_one_point() {
    for mode in [
        ClusteringMode::Equidistant,
        ClusteringMode::Quantile,
        ClusteringMode::Kmeans,
    ] {
        let s = build_scale(&[4.0, 4.0, 4.0], spec(mode, 3));
        assert_eq!(s.limits, vec![4.0; 4], "{mode:?}");
        assert_eq!(s.colors.len(), 3);
        assert_eq!(s.bucket_of(4.0), 0, "{mode:?}");
    }
}

#[test]
fn no_values_yield_an_empty_scale() {
    let s = build_scale(&[], spec(ClusteringMode::Quantile, 4));
    assert!(s.is_empty());
    assert_eq!(s.limits, vec![0.0; 5]);
    assert_eq!(s.colors.len(), 4);
    assert_eq!(s.legend.len(), 4);
}

#[test]
fn non_finite_values_are_ignored() {
    let s = build_scale(
        &[f64::NAN, 1.0, f64::INFINITY, 3.0],
        spec(ClusteringMode::Equidistant, 2),
    );
    assert_eq!(s.samples, 2);
    approx_eq(&s.limits, &[1.0, 2.0, 3.0]);
}

#[test]
fn buckets_are_half_open_with_a_closed_top() {
    let s = build_scale(&[0.0, 10.0], spec(ClusteringMode::Equidistant, 2));
    approx_eq(&s.limits, &[0.0, 5.0, 10.0]);
    assert_eq!(s.bucket_of(0.0), 0);
    assert_eq!(s.bucket_of(4.999), 0);
    assert_eq!(s.bucket_of(5.0), 1);
    assert_eq!(s.bucket_of(10.0), 1);
    // Out of range values are clamped to the outer buckets.
    assert_eq!(s.bucket_of(-1.0), 0);
    assert_eq!(s.bucket_of(11.0), 1);
}

#[test]
fn repeated_quantile_limits_keep_values_in_the_lowest_bucket() {
    let s = build_scale(&[1.0, 1.0, 1.0, 1.0, 5.0], spec(ClusteringMode::Quantile, 4));
    assert_eq!(s.limits, vec![1.0, 1.0, 1.0, 1.0, 5.0]);
    assert_eq!(s.bucket_of(1.0), 0);
    assert_eq!(s.bucket_of(3.0), 3);
    assert_eq!(s.bucket_of(5.0), 3);
    assert_ne!(s.colors[s.bucket_of(1.0)], s.colors[s.bucket_of(5.0)]);
}

#[test]
fn repeated_interior_limit_between_distinct_ones() {
    // limits [0, 2, 2, 4]
    let s = build_scale(&[0.0, 2.0, 2.0, 2.0, 4.0], spec(ClusteringMode::Quantile, 3));
    approx_eq(&s.limits, &[0.0, 2.0, 2.0, 4.0]);
    assert_eq!(s.bucket_of(1.0), 0);
    assert_eq!(s.bucket_of(2.0), 0);
    assert_eq!(s.bucket_of(3.0), 2);
    assert_eq!(s.bucket_of(4.0), 2);
}

#[test]
fn legend_entries_follow_the_limits() {
    let s = build_scale(&[0.0, 10.0], spec(ClusteringMode::Equidistant, 2));
    assert_eq!(s.legend.len(), 2);
    assert_eq!(s.legend[0].color, MIN);
    assert_eq!(s.legend[1].color, MAX);
    assert_eq!((s.legend[0].from, s.legend[0].to), (0.0, 5.0));
    assert!(!s.legend[0].closed);
    assert!(s.legend[1].closed);
}
