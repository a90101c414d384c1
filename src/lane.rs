use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::warn;

use crate::api::{ApiClient, DetectError};
use crate::model::{DetectionCategory, ResultRecord};

/// Events emitted by lane runs
#[derive(Debug)]
pub enum LaneEvent {
	/// The lane is about to issue its request; the category is now detecting
	Started {
		category: DetectionCategory,
		run: u64,
	},
	/// The lane settled, one way or the other
	Settled {
		category: DetectionCategory,
		run: u64,
		outcome: LaneOutcome,
		elapsed: Duration,
	},
}

/// How a lane run ended
#[derive(Debug)]
pub enum LaneOutcome {
	Complete(ResultRecord),
	Failed(DetectError),
}

impl LaneOutcome {
	/// Whether a response body was received and decoded.
	///
	/// The query counter advances exactly when this holds: backend-reported
	/// failures count, transport faults and unreadable bodies do not.
	pub fn parsed_response(&self) -> bool {
		match self {
			LaneOutcome::Complete(_) => true,
			LaneOutcome::Failed(DetectError::Backend(_)) => true,
			LaneOutcome::Failed(_) => false,
		}
	}
}

/// A single run of one detection category.
///
/// The lane only talks to the world through its event sender; faults are
/// converted into the Settled outcome and never propagate.
pub struct Lane {
	category: DetectionCategory,
	run: u64,
	client: ApiClient,
	events: mpsc::UnboundedSender<LaneEvent>,
}

impl Lane {
	pub fn new(
		category: DetectionCategory,
		run: u64,
		client: ApiClient,
		events: mpsc::UnboundedSender<LaneEvent>,
	) -> Lane {
		Lane {
			category,
			run,
			client,
			events,
		}
	}

	/// Execute the lane: emit Started, perform the request, emit Settled.
	///
	/// Send errors are ignored; a receiver that stopped listening is not the
	/// lane's problem.
	pub async fn run(self) {
		let _ = self.events.send(LaneEvent::Started {
			category: self.category,
			run: self.run,
		});

		let started = Instant::now();
		let outcome = match self.detect().await {
			Ok(record) => LaneOutcome::Complete(record),
			Err(err) => {
				warn!("{} detection failed: {}", self.category.label(), err);
				LaneOutcome::Failed(err)
			}
		};
		let elapsed = started.elapsed();

		let _ = self.events.send(LaneEvent::Settled {
			category: self.category,
			run: self.run,
			outcome,
			elapsed,
		});
	}

	async fn detect(&self) -> Result<ResultRecord, DetectError> {
		match self.category {
			DetectionCategory::Ip => self.client.ip().await.map(ResultRecord::Ip),
			DetectionCategory::Resolver => {
				self.client.resolver().await.map(ResultRecord::Resolver)
			}
			DetectionCategory::Edns => self.client.edns().await.map(ResultRecord::Edns),
			DetectionCategory::Security => {
				self.client.security().await.map(ResultRecord::Security)
			}
		}
	}
}
