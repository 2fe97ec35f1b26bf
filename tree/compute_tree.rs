#[cfg(feature = "timing")]
use crate::timing::Timing;
use crate::{
	node::{ComputeSplitOutcome, Node},
	objective::{weighted_score, Objective},
	ComputeTreeError, ComputeTreeOptions, ConfigurationError, ObjectiveKind,
};
use ndarray::prelude::*;
use rayon::prelude::*;

/// These are the inputs to [`compute_tree`](fn.compute_tree.html). `targets` is required by the sum of squares objective and `curves` by the ICE curves objective. Each needs one row per row of `features`.
#[derive(Clone, Copy, Debug)]
pub struct ComputeTreeInput<'a, 'b> {
	pub features: ArrayView2<'a, f32>,
	pub targets: Option<ArrayView1<'b, f32>>,
	pub curves: Option<ArrayView2<'b, f32>>,
}

/// This enum reports the progress of [`compute_tree`](fn.compute_tree.html).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ComputeTreeProgress {
	/// Every node at `depth` has been created and has decided whether to split.
	Level {
		depth: usize,
		n_nodes: usize,
		n_split: usize,
	},
}

/// A non fatal condition encountered during a build. The node it refers to was made a leaf.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Diagnostic {
	pub node_id: usize,
	pub kind: DiagnosticKind,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticKind {
	NonFiniteObjective { objective_value: f64 },
	NonFiniteImprovement { improvement: f64 },
}

/**
A `Tree` is stored as a `Vec` of [`Node`](struct.Node.html)s indexed by node id. The root has id 0. Nodes are created one level at a time, so the ids of each level are contiguous, and within a level the children of a node come in the order of their parents, left before right.
*/
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Tree {
	objective: ObjectiveKind,
	n_features: usize,
	nodes: Vec<Node>,
	levels: Vec<Vec<usize>>,
	diagnostics: Vec<Diagnostic>,
}

impl Tree {
	pub fn root(&self) -> &Node {
		&self.nodes[0]
	}

	pub fn node(&self, id: usize) -> Option<&Node> {
		self.nodes.get(id)
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Return the ids of the nodes at each depth.
	pub fn levels(&self) -> &[Vec<usize>] {
		&self.levels
	}

	/// This is the depth of the deepest node.
	pub fn depth(&self) -> usize {
		self.levels.len() - 1
	}

	pub fn objective(&self) -> ObjectiveKind {
		self.objective
	}

	pub fn n_features(&self) -> usize {
		self.n_features
	}

	pub fn diagnostics(&self) -> &[Diagnostic] {
		&self.diagnostics
	}

	pub fn leaves(&self) -> impl Iterator<Item = &Node> {
		self.nodes.iter().filter(|node| node.is_leaf())
	}

	/// Return the ids of the nodes that make up the partition of the observations at `depth`: every node at `depth` along with every leaf above it.
	pub fn partition_at_depth(&self, depth: usize) -> Vec<usize> {
		self.nodes
			.iter()
			.filter(|node| node.depth == depth || (node.depth < depth && node.is_leaf()))
			.map(|node| node.id)
			.collect()
	}

	/// Return the ids of the nodes that were split, ordered by decreasing improvement score. Ties are ordered by id.
	pub fn ranked_nodes(&self) -> Vec<usize> {
		let mut ids: Vec<usize> = self
			.nodes
			.iter()
			.filter(|node| node.split.is_some())
			.map(|node| node.id)
			.collect();
		ids.sort_by(|a, b| {
			self.nodes[*b]
				.improvement_score
				.total_cmp(&self.nodes[*a].improvement_score)
				.then_with(|| a.cmp(b))
		});
		ids
	}

	/// Compute the objective of a node's children weighted by their share of the node's observations, if the node has children.
	pub fn weighted_children_objective(&self, id: usize) -> Option<f64> {
		let children = self.nodes.get(id)?.children?;
		let left = &self.nodes[children.left];
		let right = &self.nodes[children.right];
		Some(weighted_score(
			left.objective_value,
			left.n_examples(),
			right.objective_value,
			right.n_examples(),
		))
	}

	/// Return the id of the leaf that an observation with the feature values in `row` falls into.
	pub fn find_leaf(&self, row: ArrayView1<f32>) -> usize {
		let mut node = self.root();
		while let (Some(children), Some(split)) = (node.children, node.split) {
			node = if row[split.feature_index] <= split.threshold {
				&self.nodes[children.left]
			} else {
				&self.nodes[children.right]
			};
		}
		node.id
	}

	pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
		serde_json::to_value(self)
	}
}

/**
Grow a tree. The root holds every observation. Growth proceeds one level at a time: every node at the current level that accepted a split creates its two children, then every new child decides whether to split, before the next level starts. Nodes within a level are processed in parallel. Growth stops when a level produces no splits or when the children reach `max_depth`, in which case they are made leaves without searching for a split.

Only invalid options or inputs are errors. A node whose objective is not finite is made a leaf and reported in [`Tree::diagnostics`](struct.Tree.html#method.diagnostics).
*/
pub fn compute_tree(
	input: ComputeTreeInput,
	options: &ComputeTreeOptions,
	update_progress: &mut dyn FnMut(ComputeTreeProgress),
) -> Result<Tree, ComputeTreeError> {
	options.validate()?;
	let features = input.features;
	let n_examples = features.nrows();
	if n_examples == 0 {
		return Err(ConfigurationError::NoObservations.into());
	}
	let objective = Objective::new(options.objective, n_examples, input.targets, input.curves)?;

	#[cfg(feature = "timing")]
	let timing = Timing::new();
	#[cfg(feature = "timing")]
	let start_total = std::time::Instant::now();

	let span = tracing::info_span!(
		"compute_tree",
		objective = %options.objective,
		n_examples,
		n_features = features.ncols(),
		max_depth = options.max_depth
	);
	let _enter = span.enter();

	let mut diagnostics: Vec<Diagnostic> = Vec::new();

	// Create the root and decide whether to split it.
	#[cfg(feature = "timing")]
	let start = std::time::Instant::now();
	let mut root = Node::new_root((0..n_examples).collect(), &objective);
	let outcome = root.compute_split(features, &objective, options, n_examples);
	record_outcome(&root, &outcome, &mut diagnostics);
	#[cfg(feature = "timing")]
	timing.compute_root.inc(start.elapsed());
	update_progress(ComputeTreeProgress::Level {
		depth: 0,
		n_nodes: 1,
		n_split: if root.split.is_some() { 1 } else { 0 },
	});
	let mut nodes = vec![root];
	let mut levels = vec![vec![0]];

	let mut level_start = 0;
	for depth in 0..options.max_depth {
		let span = tracing::debug_span!("level", depth = depth + 1);
		let _enter = span.enter();
		let level_end = nodes.len();

		// Assign ids to the children of every node at this level that accepted a split.
		let mut next_id = level_end;
		let left_child_ids: Vec<Option<usize>> = nodes[level_start..level_end]
			.iter()
			.map(|node| {
				if node.split.is_some() {
					let left_child_id = next_id;
					next_id += 2;
					Some(left_child_id)
				} else {
					None
				}
			})
			.collect();
		if next_id == level_end {
			break;
		}

		// Create the children.
		#[cfg(feature = "timing")]
		let start = std::time::Instant::now();
		let children = nodes[level_start..level_end]
			.par_iter_mut()
			.zip(left_child_ids.par_iter())
			.filter_map(|(node, left_child_id)| {
				let left_child_id = (*left_child_id)?;
				Some(node.compute_children(left_child_id, features, &objective))
			})
			.collect::<Result<Vec<_>, _>>()?;
		for (left, right) in children {
			nodes.push(left);
			nodes.push(right);
		}
		#[cfg(feature = "timing")]
		timing.compute_children.inc(start.elapsed());

		// Decide whether to split each child. Children at the maximum depth are leaves.
		#[cfg(feature = "timing")]
		let start = std::time::Instant::now();
		let child_depth = depth + 1;
		let outcomes: Vec<ComputeSplitOutcome> = if child_depth >= options.max_depth {
			nodes[level_end..].iter_mut().for_each(Node::stop);
			Vec::new()
		} else {
			nodes[level_end..]
				.par_iter_mut()
				.map(|node| node.compute_split(features, &objective, options, n_examples))
				.collect()
		};
		for (node, outcome) in nodes[level_end..].iter().zip(outcomes.iter()) {
			record_outcome(node, outcome, &mut diagnostics);
		}
		#[cfg(feature = "timing")]
		timing.compute_split.inc(start.elapsed());

		let level: Vec<usize> = (level_end..nodes.len()).collect();
		let n_split = nodes[level_end..]
			.iter()
			.filter(|node| node.split.is_some())
			.count();
		tracing::debug!(n_nodes = level.len(), n_split, "finished level");
		update_progress(ComputeTreeProgress::Level {
			depth: child_depth,
			n_nodes: level.len(),
			n_split,
		});
		levels.push(level);
		level_start = level_end;
	}

	#[cfg(feature = "timing")]
	{
		timing.total.inc(start_total.elapsed());
		tracing::info!(?timing, "compute_tree timing");
	}

	tracing::info!(
		n_nodes = nodes.len(),
		depth = levels.len() - 1,
		n_diagnostics = diagnostics.len(),
		"computed tree"
	);

	Ok(Tree {
		objective: options.objective,
		n_features: features.ncols(),
		nodes,
		levels,
		diagnostics,
	})
}

fn record_outcome(node: &Node, outcome: &ComputeSplitOutcome, diagnostics: &mut Vec<Diagnostic>) {
	match outcome {
		ComputeSplitOutcome::Accepted { split, improvement } => {
			tracing::debug!(
				node_id = node.id,
				feature_index = split.feature_index,
				threshold = split.threshold,
				improvement = *improvement,
				"accepted split"
			);
		}
		ComputeSplitOutcome::Rejected {
			improvement,
			required,
		} => {
			tracing::debug!(
				node_id = node.id,
				improvement = *improvement,
				required = *required,
				"rejected split"
			);
		}
		ComputeSplitOutcome::NoSplit(failure) => {
			tracing::trace!(node_id = node.id, reason = ?failure, "no split");
		}
		ComputeSplitOutcome::NumericAnomaly(kind) => {
			tracing::warn!(node_id = node.id, ?kind, "numeric anomaly, the node is a leaf");
			diagnostics.push(Diagnostic {
				node_id: node.id,
				kind: *kind,
			});
		}
		ComputeSplitOutcome::AlreadyStopped => {}
	}
}

#[cfg(test)]
fn compute_sum_of_squares_tree(
	features: ArrayView2<f32>,
	targets: ArrayView1<f32>,
	options: ComputeTreeOptions,
) -> Result<Tree, ComputeTreeError> {
	compute_tree(
		ComputeTreeInput {
			features,
			targets: Some(targets),
			curves: None,
		},
		&ComputeTreeOptions {
			objective: ObjectiveKind::SumOfSquares,
			..options
		},
		&mut |_| {},
	)
}

/// Generate observations whose curves have slope +1 or -1 depending on whether feature 1 is above 0.5, plus a small amount of noise that depends on feature 2.
#[cfg(test)]
fn random_ice_dataset(n_examples: usize, seed: u64) -> (Array2<f32>, Array2<f32>) {
	use rand::{Rng, SeedableRng};
	let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
	let n_features = 3;
	let n_grid_points = 5;
	let features = Array2::from_shape_fn((n_examples, n_features), |_| rng.gen::<f32>());
	let curves = Array2::from_shape_fn((n_examples, n_grid_points), |(i, g)| {
		let slope = if features[[i, 1]] > 0.5 { 1.0 } else { -1.0 };
		slope * g as f32 + 0.1 * features[[i, 2]]
	});
	(features, curves)
}

#[cfg(test)]
fn assert_tree_invariants(tree: &Tree, options: &ComputeTreeOptions, n_examples: usize) {
	let all_indices: Vec<usize> = (0..n_examples).collect();
	assert_eq!(tree.root().indices, all_indices);
	for depth in 0..=tree.depth() {
		// The nodes at this depth, along with the leaves above it, partition the observations.
		let mut indices: Vec<usize> = tree
			.partition_at_depth(depth)
			.iter()
			.flat_map(|id| tree.nodes()[*id].indices.iter().cloned())
			.collect();
		indices.sort_unstable();
		assert_eq!(indices, all_indices);
		for id in &tree.levels()[depth] {
			assert_eq!(tree.nodes()[*id].depth, depth);
		}
	}
	for node in tree.nodes() {
		assert!(node.depth <= options.max_depth);
		assert!(!node.indices.is_empty());
		assert!(node.objective_value >= 0.0);
		assert_eq!(node.split.is_some(), node.children.is_some());
		if node.stop_flag {
			assert!(node.children.is_none());
		}
		if let Some(children) = node.children {
			let left = &tree.nodes()[children.left];
			let right = &tree.nodes()[children.right];
			assert_eq!(left.parent_id, Some(node.id));
			assert_eq!(right.parent_id, Some(node.id));
			assert_eq!(left.depth, node.depth + 1);
			assert_eq!(left.parent_objective_value, node.objective_value);
			let mut indices: Vec<usize> = left
				.indices
				.iter()
				.chain(right.indices.iter())
				.cloned()
				.collect();
			indices.sort_unstable();
			let mut node_indices = node.indices.clone();
			node_indices.sort_unstable();
			assert_eq!(indices, node_indices);
			assert!(left.n_examples() >= options.min_node_size);
			assert!(right.n_examples() >= options.min_node_size);
		}
		if node.improvement_flag {
			let weighted = tree.weighted_children_objective(node.id).unwrap();
			assert!(
				node.objective_value - weighted
					>= options
						.improvement_threshold
						.required_improvement(node.objective_value)
			);
		}
	}
}

#[test]
fn test_split_at_midpoint() {
	let features = arr2(&[[0.0], [0.0], [1.0], [1.0]]);
	let targets = arr1(&[0.0, 0.0, 10.0, 10.0]);
	let options = ComputeTreeOptions {
		min_node_size: 1,
		..Default::default()
	};
	let tree = compute_sum_of_squares_tree(features.view(), targets.view(), options.clone()).unwrap();
	let root = tree.root();
	assert_eq!(root.objective_value, 100.0);
	assert!(root.improvement_flag);
	assert_eq!(root.split.unwrap().threshold, 0.5);
	let children = root.children.unwrap();
	let left = tree.node(children.left).unwrap();
	let right = tree.node(children.right).unwrap();
	assert_eq!(left.indices, vec![0, 1]);
	assert_eq!(right.indices, vec![2, 3]);
	assert_eq!(left.objective_value, 0.0);
	assert_eq!(right.objective_value, 0.0);
	assert!(left.stop_flag && right.stop_flag);
	assert_eq!(tree.nodes().len(), 3);
	assert_eq!(tree.levels(), &[vec![0], vec![1, 2]]);
	assert_tree_invariants(&tree, &options, 4);
}

#[test]
fn test_identical_targets() {
	let features = Array2::from_shape_fn((10, 2), |(i, j)| (i * (j + 1)) as f32);
	let targets = Array1::from_elem(10, 3.0);
	let options = ComputeTreeOptions {
		min_node_size: 1,
		..Default::default()
	};
	let tree = compute_sum_of_squares_tree(features.view(), targets.view(), options).unwrap();
	let root = tree.root();
	assert_eq!(root.objective_value, 0.0);
	assert!(root.stop_flag);
	assert!(root.children.is_none());
	assert_eq!(tree.nodes().len(), 1);
	assert_eq!(tree.depth(), 0);
}

#[test]
fn test_max_depth_one() {
	let features = Array2::from_shape_fn((16, 1), |(i, _)| i as f32);
	let targets = Array1::from_shape_fn(16, |i| (i * i) as f32);
	let options = ComputeTreeOptions {
		max_depth: 1,
		min_node_size: 1,
		..Default::default()
	};
	let tree = compute_sum_of_squares_tree(features.view(), targets.view(), options.clone()).unwrap();
	assert_eq!(tree.nodes().len(), 3);
	assert_eq!(tree.depth(), 1);
	for leaf in tree.leaves() {
		assert_eq!(leaf.depth, 1);
		assert!(leaf.stop_flag);
		assert!(leaf.split.is_none());
	}
	assert_tree_invariants(&tree, &options, 16);
}

#[test]
fn test_min_node_size_excludes_split() {
	let features = arr2(&[[0.0], [0.0], [1.0], [1.0], [1.0], [1.0]]);
	let targets = arr1(&[0.0, 0.0, 10.0, 10.0, 10.0, 10.0]);
	let options = ComputeTreeOptions {
		min_node_size: 5,
		..Default::default()
	};
	let tree = compute_sum_of_squares_tree(features.view(), targets.view(), options).unwrap();
	let root = tree.root();
	assert!(root.stop_flag);
	assert!(root.children.is_none());
	assert!(!root.improvement_flag);
}

#[test]
fn test_ice_curves_isolate_observation() {
	let features = arr2(&[[0.0], [0.0], [1.0]]);
	let curves = arr2(&[[1.0, 2.0, 3.0], [1.0, 2.0, 3.0], [9.0, 8.0, 7.0]]);
	let options = ComputeTreeOptions {
		objective: ObjectiveKind::IceCurves,
		min_node_size: 1,
		..Default::default()
	};
	let tree = compute_tree(
		ComputeTreeInput {
			features: features.view(),
			targets: None,
			curves: Some(curves.view()),
		},
		&options,
		&mut |_| {},
	)
	.unwrap();
	let root = tree.root();
	assert!(root.improvement_flag);
	let children = root.children.unwrap();
	let left = tree.node(children.left).unwrap();
	let right = tree.node(children.right).unwrap();
	assert_eq!(left.indices, vec![0, 1]);
	assert_eq!(right.indices, vec![2]);
	assert_eq!(left.objective_value, 0.0);
	assert_eq!(right.objective_value, 0.0);
	assert_tree_invariants(&tree, &options, 3);
}

#[test]
fn test_configuration_errors() {
	let features = arr2(&[[0.0], [1.0]]);
	let targets = arr1(&[0.0, 1.0]);
	let result = compute_sum_of_squares_tree(
		features.view(),
		targets.view(),
		ComputeTreeOptions {
			max_depth: 0,
			..Default::default()
		},
	);
	assert_eq!(
		result.err(),
		Some(ComputeTreeError::Configuration(ConfigurationError::MaxDepth(0)))
	);
	let result = compute_tree(
		ComputeTreeInput {
			features: features.view(),
			targets: Some(targets.view()),
			curves: None,
		},
		&ComputeTreeOptions {
			objective: ObjectiveKind::IceCurves,
			..Default::default()
		},
		&mut |_| {},
	);
	assert_eq!(
		result.err(),
		Some(ComputeTreeError::Configuration(ConfigurationError::MissingCurves))
	);
	let empty_features = Array2::<f32>::zeros((0, 1));
	let empty_targets = Array1::<f32>::zeros(0);
	let result = compute_sum_of_squares_tree(
		empty_features.view(),
		empty_targets.view(),
		Default::default(),
	);
	assert_eq!(
		result.err(),
		Some(ComputeTreeError::Configuration(ConfigurationError::NoObservations))
	);
}

#[test]
fn test_invariants_on_random_data() {
	let (features, curves) = random_ice_dataset(300, 42);
	for max_depth in 1..=4 {
		for &min_node_size in &[1, 5, 40] {
			let options = ComputeTreeOptions {
				objective: ObjectiveKind::IceCurves,
				max_depth,
				min_node_size,
				improvement_threshold: crate::ImprovementThreshold::Relative(0.01),
				..Default::default()
			};
			let tree = compute_tree(
				ComputeTreeInput {
					features: features.view(),
					targets: None,
					curves: Some(curves.view()),
				},
				&options,
				&mut |_| {},
			)
			.unwrap();
			assert_tree_invariants(&tree, &options, 300);
		}
	}
}

#[test]
fn test_interaction_feature_is_chosen_first() {
	let (features, curves) = random_ice_dataset(200, 7);
	let options = ComputeTreeOptions {
		objective: ObjectiveKind::IceCurves,
		..Default::default()
	};
	let tree = compute_tree(
		ComputeTreeInput {
			features: features.view(),
			targets: None,
			curves: Some(curves.view()),
		},
		&options,
		&mut |_| {},
	)
	.unwrap();
	let split = tree.root().split.unwrap();
	assert_eq!(split.feature_index, 1);
	assert!((split.threshold - 0.5).abs() < 0.05);
	assert_eq!(tree.ranked_nodes()[0], 0);
}

#[test]
fn test_determinism() {
	let (features, curves) = random_ice_dataset(250, 3);
	let options = ComputeTreeOptions {
		objective: ObjectiveKind::IceCurves,
		max_depth: 4,
		min_node_size: 5,
		split_candidates: crate::SplitCandidates::Quantiles { n_quantiles: 8 },
		..Default::default()
	};
	let input = ComputeTreeInput {
		features: features.view(),
		targets: None,
		curves: Some(curves.view()),
	};
	let a = compute_tree(input, &options, &mut |_| {}).unwrap();
	let b = compute_tree(input, &options, &mut |_| {}).unwrap();
	assert_eq!(a, b);
}

#[test]
fn test_early_stop_when_min_node_size_exceeds_half() {
	let (features, curves) = random_ice_dataset(20, 11);
	let options = ComputeTreeOptions {
		objective: ObjectiveKind::IceCurves,
		min_node_size: 11,
		..Default::default()
	};
	let tree = compute_tree(
		ComputeTreeInput {
			features: features.view(),
			targets: None,
			curves: Some(curves.view()),
		},
		&options,
		&mut |_| {},
	)
	.unwrap();
	assert!(tree.root().stop_flag);
	assert!(tree.root().children.is_none());
}

#[test]
fn test_numeric_anomaly_is_a_diagnostic() {
	// The curve of observation 3 contains a NaN, so the root cannot be scored.
	let features = arr2(&[[0.0], [0.0], [1.0], [1.0]]);
	let curves = arr2(&[[0.0, 0.0], [0.0, 0.0], [5.0, 5.0], [f32::NAN, 5.0]]);
	let options = ComputeTreeOptions {
		objective: ObjectiveKind::IceCurves,
		min_node_size: 1,
		..Default::default()
	};
	let tree = compute_tree(
		ComputeTreeInput {
			features: features.view(),
			targets: None,
			curves: Some(curves.view()),
		},
		&options,
		&mut |_| {},
	)
	.unwrap();
	assert_eq!(tree.nodes().len(), 1);
	assert!(tree.root().stop_flag);
	assert_eq!(tree.diagnostics().len(), 1);
	assert_eq!(tree.diagnostics()[0].node_id, 0);
}

#[test]
fn test_progress_and_queries() {
	let features = arr2(&[
		[0.0, 0.0],
		[0.0, 1.0],
		[1.0, 0.0],
		[1.0, 1.0],
		[0.0, 0.0],
		[0.0, 1.0],
		[1.0, 0.0],
		[1.0, 1.0],
	]);
	let targets = arr1(&[0.0, 1.0, 10.0, 20.0, 0.0, 1.0, 10.0, 20.0]);
	let options = ComputeTreeOptions {
		objective: ObjectiveKind::SumOfSquares,
		max_depth: 3,
		min_node_size: 1,
		..Default::default()
	};
	let mut progress = Vec::new();
	let tree = compute_tree(
		ComputeTreeInput {
			features: features.view(),
			targets: Some(targets.view()),
			curves: None,
		},
		&options,
		&mut |event| progress.push(event),
	)
	.unwrap();
	assert_eq!(
		progress,
		vec![
			ComputeTreeProgress::Level {
				depth: 0,
				n_nodes: 1,
				n_split: 1,
			},
			ComputeTreeProgress::Level {
				depth: 1,
				n_nodes: 2,
				n_split: 2,
			},
			ComputeTreeProgress::Level {
				depth: 2,
				n_nodes: 4,
				n_split: 0,
			},
		]
	);
	assert_eq!(tree.root().split.unwrap().feature_index, 0);
	assert_eq!(tree.leaves().count(), 4);
	assert_tree_invariants(&tree, &options, 8);
	// Every observation falls into the leaf that holds it.
	for leaf in tree.leaves() {
		for index in &leaf.indices {
			assert_eq!(tree.find_leaf(features.row(*index)), leaf.id);
		}
	}
	let json = tree.to_json().unwrap();
	assert_eq!(json["nodes"].as_array().unwrap().len(), 7);
	assert_eq!(json["objective"], "sum_of_squares");
	assert_eq!(json["nodes"][1]["parent_branch"], "left");
}

#[test]
fn test_compute_tree_borrows_from_separate_scopes() {
	let features = arr2(&[[0.0], [1.0], [2.0], [3.0]]);
	let features = features.view();
	let tree = {
		let targets = arr1(&[0.0, 0.0, 10.0, 10.0]);
		compute_tree(
			ComputeTreeInput {
				features,
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
		.unwrap()
	};
	// The features view outlives the targets it was paired with.
	assert_eq!(tree.find_leaf(features.row(3)), tree.find_leaf(features.row(2)));
	assert_eq!(tree.root().split.unwrap().threshold, 1.5);
}
