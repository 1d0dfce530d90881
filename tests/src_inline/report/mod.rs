use super::*;

#[test]
fn test_quantiles() {
    let v = vec![1.0, 2.0, 3.0, 4.0, 5.0];
    assert_eq!(quantile_linear(&v, 0.5), 3.0);
    assert_eq!(quantile_linear(&v, 0.25), 2.0);
    assert_eq!(quantile_linear(&v, 0.75), 4.0);
    assert!(quantile_linear(&[], 0.5).is_nan());
}

#[test]
fn test_median_skips_nan() {
    assert_eq!(median(&[3.0, f64::NAN, 1.0, 2.0]), 2.0);
    assert_eq!(median(&[4.0, 1.0]), 2.5);
    assert!(median(&[f64::NAN]).is_nan());
}

#[test]
fn test_minmax() {
    let m = vec![vec![1.0, -2.0], vec![f64::NAN, 7.5]];
    assert_eq!(minmax(&m), Some((-2.0, 7.5)));
    assert_eq!(minmax(&[]), None);
    assert_eq!(format_f64_6(0.5), "0.500000");
}
