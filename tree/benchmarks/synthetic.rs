use anyhow::Result;
use clap::Parser;
use ndarray::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use repid_tree::ComputeTreeProgress;
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(about = "grow a tree on the ice curves of a synthetic model with one interaction")]
struct Options {
	#[clap(long, default_value = "1000", help = "the number of observations")]
	n_examples: usize,
	#[clap(long, default_value = "42", help = "the seed of the random number generator")]
	seed: u64,
	#[clap(short, long, help = "the path to a config file")]
	config: Option<PathBuf>,
}

/// The effect of feature 0 reverses with the sign of feature 1.
fn interaction_model(features: ArrayView2<f32>, mut predictions: ArrayViewMut1<f32>) {
	for (prediction, row) in predictions.iter_mut().zip(features.genrows()) {
		*prediction = row[0] * row[1].signum();
	}
}

fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();
	let options = Options::parse();

	let config = match &options.config {
		Some(path) => repid_tree::config::load_config(path)?,
		None => Default::default(),
	};
	let compute_tree_options = repid_tree::ComputeTreeOptions {
		objective: repid_tree::ObjectiveKind::IceCurves,
		..config.to_options()?
	};

	// Generate the data. Features 0 and 1 are uniform in [-1, 1], feature 2 is noise.
	let mut rng = StdRng::seed_from_u64(options.seed);
	let features = Array2::from_shape_fn((options.n_examples, 3), |_| {
		rng.gen::<f32>() * 2.0 - 1.0
	});

	// Compute the ice curves of feature 0.
	let grid = repid_tree::compute_grid(features.column(0), &config.to_grid_options())?;
	let effect = repid_tree::Effect {
		model: &interaction_model,
		feature_index: 0,
		grid,
		center: true,
	};
	let curves = repid_tree::compute_data_for_ice_splitting(&effect, features.view())?;

	// Grow the tree.
	let tree = repid_tree::compute_tree(
		repid_tree::ComputeTreeInput {
			features: features.view(),
			targets: None,
			curves: Some(curves.view()),
		},
		&compute_tree_options,
		&mut |progress| match progress {
			ComputeTreeProgress::Level {
				depth,
				n_nodes,
				n_split,
			} => tracing::info!(depth, n_nodes, n_split, "level"),
		},
	)?;

	let feature_importances = repid_tree::compute_feature_importances(&tree);
	let output = json!({
		"root_split": tree.root().split,
		"n_nodes": tree.nodes().len(),
		"depth": tree.depth(),
		"feature_importances": feature_importances,
	});
	println!("{}", output);
	Ok(())
}
