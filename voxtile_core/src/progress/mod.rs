//! Progress reporting for long-running bulk operations.
//!
//! The engine itself never blocks on a UI; long operations drive a
//! [`Progress`] implementation so a host can surface them. The default
//! reporter logs coarse milestones through [`log`]; [`ProgressDrain`] only
//! counts and is used under test.

/// Interface driven by long-running operations.
pub trait Progress {
	/// Start (or restart) reporting a task of `total` steps.
	fn init(&mut self, message: &str, total: u64);

	/// Absolute position within the task.
	fn set_position(&mut self, value: u64);

	/// Advance the position by `value`.
	fn inc(&mut self, value: u64);

	/// Mark the task finished.
	fn finish(&mut self);
}

/// A reporter that swallows everything, tracking only the position.
#[derive(Default)]
pub struct ProgressDrain {
	pub position: u64,
	pub total: u64,
	pub finished: bool,
}

impl ProgressDrain {
	pub fn new() -> ProgressDrain {
		ProgressDrain::default()
	}
}

impl Progress for ProgressDrain {
	fn init(&mut self, _message: &str, total: u64) {
		self.total = total;
		self.position = 0;
		self.finished = false;
	}

	fn set_position(&mut self, value: u64) {
		self.position = value;
	}

	fn inc(&mut self, value: u64) {
		self.position += value;
	}

	fn finish(&mut self) {
		self.position = self.total;
		self.finished = true;
	}
}

/// A reporter that logs every ~10% step at debug level.
pub struct ProgressLog {
	message: String,
	position: u64,
	total: u64,
	last_decile: u64,
}

impl ProgressLog {
	pub fn new() -> ProgressLog {
		ProgressLog {
			message: String::new(),
			position: 0,
			total: 0,
			last_decile: 0,
		}
	}

	fn report(&mut self) {
		if self.total == 0 {
			return;
		}
		let decile = self.position * 10 / self.total;
		if decile > self.last_decile {
			self.last_decile = decile;
			log::debug!("{}: {}%", self.message, decile * 10);
		}
	}
}

impl Default for ProgressLog {
	fn default() -> ProgressLog {
		ProgressLog::new()
	}
}

impl Progress for ProgressLog {
	fn init(&mut self, message: &str, total: u64) {
		self.message = message.to_string();
		self.position = 0;
		self.total = total;
		self.last_decile = 0;
		log::debug!("{message}: started ({total} steps)");
	}

	fn set_position(&mut self, value: u64) {
		self.position = value;
		self.report();
	}

	fn inc(&mut self, value: u64) {
		self.position += value;
		self.report();
	}

	fn finish(&mut self) {
		self.position = self.total;
		log::debug!("{}: done", self.message);
	}
}

/// The default reporter: a silent drain under test, a logger otherwise.
pub fn get_progress(message: &str, total: u64) -> Box<dyn Progress> {
	#[cfg(test)]
	let mut progress = ProgressDrain::new();
	#[cfg(not(test))]
	let mut progress = ProgressLog::new();
	progress.init(message, total);
	Box::new(progress)
}
