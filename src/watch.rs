use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::time::Interval;

/// What woke the watch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
	Timer,
	Manual,
}

/// Refresh trigger for watch mode: a periodic timer plus a line-based
/// input, so hitting Enter refreshes immediately.
pub struct RefreshTrigger<R> {
	interval: Interval,
	lines: Lines<R>,
	input_open: bool,
}

impl<R: AsyncBufRead + Unpin> RefreshTrigger<R> {
	pub fn new(period: Duration, input: R) -> RefreshTrigger<R> {
		// No immediate first tick; the first timed wake is one period out
		let start = tokio::time::Instant::now() + period;
		RefreshTrigger {
			interval: tokio::time::interval_at(start, period),
			lines: input.lines(),
			input_open: true,
		}
	}

	/// Wait for the next wake: the periodic tick, or a line on the input.
	///
	/// A manual wake postpones the following tick by a full period. Input
	/// EOF and read errors drop the trigger back to timer-only operation.
	pub async fn wait(&mut self) -> Wake {
		loop {
			tokio::select! {
				_ = self.interval.tick() => return Wake::Timer,
				line = self.lines.next_line(), if self.input_open => match line {
					Ok(Some(_)) => {
						self.interval.reset();
						return Wake::Manual;
					}
					_ => self.input_open = false,
				},
			}
		}
	}
}
