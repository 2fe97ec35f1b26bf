use num_traits::ToPrimitive;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Time spent in each phase of `compute_tree`, summed over all levels.
#[derive(Debug)]
pub struct Timing {
	pub compute_root: TimingDuration,
	pub compute_children: TimingDuration,
	pub compute_split: TimingDuration,
	pub total: TimingDuration,
}

pub struct TimingDuration(AtomicU64);

impl Timing {
	pub fn new() -> Timing {
		Timing {
			compute_root: TimingDuration::new(),
			compute_children: TimingDuration::new(),
			compute_split: TimingDuration::new(),
			total: TimingDuration::new(),
		}
	}
}

impl TimingDuration {
	pub fn new() -> Self {
		Self(AtomicU64::new(0))
	}
	pub fn get(&self) -> Duration {
		Duration::from_nanos(self.0.load(Ordering::Relaxed))
	}
	pub fn inc(&self, value: Duration) {
		let nanos = value.as_nanos().to_u64().unwrap_or(u64::MAX);
		self.0.fetch_add(nanos, Ordering::Relaxed);
	}
}

impl std::fmt::Debug for TimingDuration {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self.get())
	}
}
