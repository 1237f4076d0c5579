use aif_control::{Error, PolicyBatch, construct_policies};
use ndarray::{Array2, array};

#[test]
fn batch_size_is_product_of_controls_to_the_horizon() {
    for (num_states, horizon, expected) in [
        (vec![2, 2], 2, 16),
        (vec![3], 3, 27),
        (vec![2, 3], 2, 36),
        (vec![4, 1], 2, 16),
    ] {
        let policies = construct_policies(&num_states, None, horizon, None).unwrap();
        assert_eq!(policies.len(), expected, "num_states={num_states:?} horizon={horizon}");
    }
}

#[test]
fn explicit_full_control_set_equals_default() {
    for num_states in [vec![2, 2], vec![3, 2, 2], vec![5]] {
        let all: Vec<usize> = (0..num_states.len()).collect();
        for horizon in 1..=3 {
            let implicit = construct_policies(&num_states, None, horizon, None).unwrap();
            let explicit = construct_policies(&num_states, None, horizon, Some(&all)).unwrap();
            assert_eq!(implicit, explicit);
        }
    }
}

#[test]
fn every_policy_is_distinct() {
    let policies = construct_policies(&[2, 3], None, 2, None).unwrap();
    let mut seen: Vec<Vec<usize>> = policies.iter().map(|p| p.iter().copied().collect()).collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), policies.len());
}

#[test]
fn out_of_range_control_factor_is_rejected() {
    let err = construct_policies(&[2, 2], None, 1, Some(&[2])).unwrap_err();
    assert!(matches!(err, Error::DependencyOutOfRange { index: 2, .. }));
}

#[test]
fn hand_built_batches_are_validated_before_use() {
    let batch = PolicyBatch::from_policies(&[array![[0, 1]], array![[1, 3]]]).unwrap();
    let err = batch.validate_against(&[2, 2]).unwrap_err();
    assert!(matches!(
        err,
        Error::ActionOutOfRange {
            policy: 1,
            timestep: 0,
            factor: 1,
            action: 3,
            num_controls: 2
        }
    ));
    let mismatched = PolicyBatch::from_policies(&[Array2::zeros((1, 2)), Array2::zeros((2, 2))]);
    assert!(mismatched.is_err());
}

#[test]
fn batch_serialises_to_json_and_back() {
    let policies = construct_policies(&[2, 2], None, 2, None).unwrap();
    let json = serde_json::to_string(&policies).unwrap();
    let back: PolicyBatch = serde_json::from_str(&json).unwrap();
    assert_eq!(back, policies);
}
