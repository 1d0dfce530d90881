use super::*;

fn one(bound: RangeBound) -> Vec<Option<RangeBound>> {
    vec![Some(bound)]
}

#[test]
fn test_percentile_interpolates() {
    assert_eq!(nan_percentile(&[1.0, 2.0, 3.0, 4.0, 5.0], 50.0), Some(3.0));
    assert_eq!(nan_percentile(&[1.0, 2.0, 3.0, 4.0], 50.0), Some(2.5));
    assert_eq!(nan_percentile(&[5.0, f64::NAN, 1.0], 100.0), Some(5.0));
    assert_eq!(nan_percentile(&[f64::NAN], 50.0), None);
}

#[test]
fn test_none_stays_none() {
    let values = [1.0, 2.0];
    assert_eq!(get_vmin_vmax(&[], &[None], 0, &values), (None, None));
}

#[test]
fn test_literal_and_percentile() {
    let values = [1.0, 2.0, 3.0, 4.0, 5.0];
    let (vmin, vmax) = get_vmin_vmax(
        &one(RangeBound::Literal(0.5)),
        &one(RangeBound::parse("p50")),
        0,
        &values,
    );
    assert_eq!(vmin, Some(0.5));
    assert_eq!(vmax, Some(3.0));
}

#[test]
fn test_single_bound_applies_to_every_panel() {
    let values = [1.0, 2.0];
    let vmax = one(RangeBound::Literal(7.0));
    assert_eq!(get_vmin_vmax(&[], &vmax, 3, &values).1, Some(7.0));
}

#[test]
fn test_per_panel_bounds_and_out_of_range_index() {
    let values = [1.0, 2.0];
    let vmax = vec![Some(RangeBound::Literal(1.0)), Some(RangeBound::Literal(2.0))];
    assert_eq!(get_vmin_vmax(&[], &vmax, 1, &values).1, Some(2.0));
    assert_eq!(get_vmin_vmax(&[], &vmax, 2, &values).1, None);
}

#[test]
fn test_reducer_bound() {
    let values = [1.0, 2.0, 6.0];
    let mean = one(RangeBound::reducer(|v| v.iter().sum::<f64>() / v.len() as f64));
    assert_eq!(get_vmin_vmax(&mean, &[], 0, &values).0, Some(3.0));

    let bad = one(RangeBound::reducer(|_| f64::NAN));
    assert_eq!(get_vmin_vmax(&bad, &[], 0, &values).0, None);
}

#[test]
fn test_malformed_bounds_become_none() {
    let values = [1.0, 2.0];
    for text in ["pabc", "abc", "p150", "inf"] {
        let bound = one(RangeBound::parse(text));
        assert_eq!(get_vmin_vmax(&bound, &[], 0, &values).0, None, "{text}");
    }
}
