use crate::Tree;

/// This function computes feature importances using the "gain" method, where a feature's importance is proportional to the sum of the improvement scores of the nodes that split on it. The importances sum to 1, or are all 0 if the tree has no splits.
pub fn compute_feature_importances(tree: &Tree) -> Vec<f64> {
	let mut feature_importances = vec![0.0; tree.n_features()];
	for node in tree.nodes().iter() {
		if let Some(split) = node.split {
			feature_importances[split.feature_index] += node.improvement_score;
		}
	}
	// Normalize the feature_importances.
	let total = feature_importances.iter().sum::<f64>();
	if total > 0.0 {
		for feature_importance in feature_importances.iter_mut() {
			*feature_importance /= total;
		}
	}
	feature_importances
}

#[test]
fn test_compute_feature_importances() {
	use crate::{compute_tree, ComputeTreeInput, ComputeTreeOptions, ObjectiveKind};
	use ndarray::prelude::*;
	// Feature 1 separates the targets best, then feature 0 separates what is left. Feature 2 is constant.
	let features = arr2(&[
		[0.0, 0.0, 1.0],
		[1.0, 0.0, 1.0],
		[0.0, 1.0, 1.0],
		[1.0, 1.0, 1.0],
	]);
	let targets = arr1(&[0.0, 2.0, 100.0, 102.0]);
	let tree = compute_tree(
		ComputeTreeInput {
			features: features.view(),
			targets: Some(targets.view()),
			curves: None,
		},
		&ComputeTreeOptions {
			objective: ObjectiveKind::SumOfSquares,
			min_node_size: 1,
			..Default::default()
		},
		&mut |_| {},
	)
	.unwrap();
	let feature_importances = compute_feature_importances(&tree);
	assert_eq!(feature_importances.len(), 3);
	assert!(feature_importances[1] > feature_importances[0]);
	assert!(feature_importances[0] > 0.0);
	assert_eq!(feature_importances[2], 0.0);
	assert!((feature_importances.iter().sum::<f64>() - 1.0).abs() < 1e-12);
}

#[test]
fn test_compute_feature_importances_no_splits() {
	use crate::{compute_tree, ComputeTreeInput, ComputeTreeOptions, ObjectiveKind};
	use ndarray::prelude::*;
	let features = arr2(&[[0.0], [1.0]]);
	let targets = arr1(&[5.0, 5.0]);
	let tree = compute_tree(
		ComputeTreeInput {
			features: features.view(),
			targets: Some(targets.view()),
			curves: None,
		},
		&ComputeTreeOptions {
			objective: ObjectiveKind::SumOfSquares,
			min_node_size: 1,
			..Default::default()
		},
		&mut |_| {},
	)
	.unwrap();
	assert_eq!(compute_feature_importances(&tree), vec![0.0]);
}
