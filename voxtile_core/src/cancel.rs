//! Cooperative cancellation of long-running operations.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A flag a host sets to ask a long-running operation to stop.
///
/// Operations poll the token at safe points and return early in a clean
/// state when it fires; any partial-state rollback is the caller's business
/// (typically via its undo history). Memoization caches are not invalidated
/// by a cancelled operation.
///
/// Cloning shares the flag.
#[derive(Clone, Default)]
pub struct CancelToken {
	flag: Arc<AtomicBool>,
}

impl CancelToken {
	pub fn new() -> CancelToken {
		CancelToken::default()
	}

	/// Ask the running operation to stop.
	pub fn cancel(&self) {
		self.flag.store(true, Ordering::Relaxed);
	}

	pub fn is_cancelled(&self) -> bool {
		self.flag.load(Ordering::Relaxed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clones_share_the_flag() {
		let a = CancelToken::new();
		let b = a.clone();
		assert!(!b.is_cancelled());
		a.cancel();
		assert!(b.is_cancelled());
	}
}
