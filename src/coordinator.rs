use tokio::sync::mpsc;
use tracing::debug;

use crate::api::ApiClient;
use crate::binder;
use crate::lane::{Lane, LaneEvent, LaneOutcome};
use crate::model::{DetectionCategory, DetectionSnapshot, LaneState};
use crate::output::Reporter;
use crate::view::Document;

/// Owns the document, the result snapshot and the query counter, and
/// orchestrates concurrent lane runs.
pub struct Coordinator {
	client: ApiClient,
	document: Document,
	snapshot: DetectionSnapshot,
	queries: u64,
	next_run: u64,
	latest_run: [u64; 4],
}

impl Coordinator {
	pub fn new(client: ApiClient) -> Coordinator {
		Coordinator {
			client,
			document: Document::new(),
			snapshot: DetectionSnapshot::default(),
			queries: 0,
			next_run: 0,
			latest_run: [0; 4],
		}
	}

	/// Launch all four lanes concurrently and apply their events until every
	/// lane has settled.
	///
	/// Lanes absorb their own faults, so this always runs to completion; one
	/// failing category never blocks or aborts the others.
	pub async fn run_all(&mut self, reporter: &Reporter) {
		let (tx, mut rx) = mpsc::unbounded_channel();

		for category in DetectionCategory::ALL {
			self.next_run += 1;
			let run = self.next_run;
			self.latest_run[category as usize] = run;
			let lane = Lane::new(category, run, self.client.clone(), tx.clone());
			tokio::spawn(lane.run());
		}
		// The channel closes once every lane has dropped its sender
		drop(tx);

		while let Some(event) = rx.recv().await {
			self.apply(event, reporter);
		}
	}

	/// Re-run every lane; identical semantics to the startup run.
	pub async fn refresh(&mut self, reporter: &Reporter) {
		self.run_all(reporter).await;
	}

	/// Apply one lane event to the document, snapshot and counter.
	///
	/// Result and status writes from a superseded run are dropped: re-entrant
	/// invocation is resolved by run identifier, and the latest launch wins.
	/// The query counter advances for every parsed response, superseded or not.
	fn apply(&mut self, event: LaneEvent, reporter: &Reporter) {
		match event {
			LaneEvent::Started { category, run } => {
				if run != self.latest_run[category as usize] {
					return;
				}
				self.document.set_status(category, LaneState::Detecting);
				reporter.lane_started(category);
			}
			LaneEvent::Settled { category, run, outcome, elapsed } => {
				// The counter tracks every parsed response, including ones
				// from a superseded run whose result is dropped below
				if outcome.parsed_response() {
					self.queries += 1;
					self.document.set_queries(self.queries);
				}

				if run != self.latest_run[category as usize] {
					debug!(
						"dropping stale result for {} (run {})",
						category.label(), run,
					);
					return;
				}

				match outcome {
					LaneOutcome::Complete(record) => {
						debug_assert_eq!(record.category(), category);
						binder::bind_record(&mut self.document, &record, elapsed);
						self.snapshot.store(record);
						self.document.set_status(category, LaneState::Complete);
						reporter.lane_settled(category, LaneState::Complete, elapsed, None);
					}
					LaneOutcome::Failed(err) => {
						binder::bind_failure(&mut self.document, category);
						self.document.set_status(category, LaneState::Error);
						reporter.lane_settled(category, LaneState::Error, elapsed, Some(&err));
					}
				}
			}
		}
	}

	pub fn document(&self) -> &Document {
		&self.document
	}

	pub fn document_mut(&mut self) -> &mut Document {
		&mut self.document
	}

	pub fn snapshot(&self) -> &DetectionSnapshot {
		&self.snapshot
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use std::time::Duration;

	use serde_json::json;
	use wiremock::matchers::{method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	use crate::model::{IpRecord, ResultRecord};
	use crate::view::{CopyTarget, NodeId, Tone};

	async fn mount(server: &MockServer, endpoint: &str, status: u16, body: serde_json::Value) {
		Mock::given(method("GET"))
			.and(path(endpoint))
			.respond_with(ResponseTemplate::new(status).set_body_json(body))
			.mount(server)
			.await;
	}

	async fn mount_healthy(server: &MockServer) {
		mount(server, "/api/autolookup/ip", 200, json!({
			"ipv4": "93.184.216.34",
			"ipv6": "2606:2800:220:1::1946",
		})).await;
		mount(server, "/api/autolookup/resolver", 200, json!({
			"provider": "Cloudflare DNS",
			"resolver_ip": "172.68.1.1",
		})).await;
		mount(server, "/api/autolookup/edns", 200, json!({
			"enabled": false,
		})).await;
		mount(server, "/api/autolookup/security", 200, json!({
			"dnssec": true,
			"doh": true,
			"dot": true,
			"score": 85,
		})).await;
	}

	fn coordinator_for(uri: &str) -> Coordinator {
		let client = ApiClient::new(uri, Duration::from_secs(2)).unwrap();
		Coordinator::new(client)
	}

	#[tokio::test]
	async fn test_run_all_settles_every_lane() {
		let server = MockServer::start().await;
		mount_healthy(&server).await;

		let reporter = Reporter::new(true);
		let mut coordinator = coordinator_for(&server.uri());
		coordinator.run_all(&reporter).await;

		for category in DetectionCategory::ALL {
			assert_eq!(coordinator.document().status(category), LaneState::Complete);
		}
		assert_eq!(coordinator.queries, 4);
		assert_eq!(coordinator.document().queries(), 4);

		let snapshot = coordinator.snapshot();
		assert_eq!(snapshot.ip.as_ref().unwrap().ipv4.as_deref(), Some("93.184.216.34"));
		assert_eq!(
			snapshot.resolver.as_ref().unwrap().provider.as_deref(),
			Some("Cloudflare DNS"),
		);
		assert!(snapshot.edns.is_some());
		assert_eq!(snapshot.security.as_ref().unwrap().score, Some(85));

		let doc = coordinator.document();
		assert_eq!(doc.node(NodeId::Ipv4).text, "93.184.216.34");
		assert!(doc.copy_control(CopyTarget::Ipv4).visible);
		assert_eq!(doc.node(NodeId::EdnsSubnet).text, "Not exposed");
		assert_eq!(doc.node(NodeId::SecurityScore).text, "85/100 - Excellent");
		assert_eq!(doc.node(NodeId::SecurityScore).tone, Tone::Success);
	}

	#[tokio::test]
	async fn test_one_failing_lane_is_isolated() {
		let server = MockServer::start().await;
		mount(&server, "/api/autolookup/ip", 200, json!({
			"ipv4": "93.184.216.34",
		})).await;
		mount(&server, "/api/autolookup/resolver", 200, json!({
			"provider": "Quad9",
			"resolver_ip": "9.9.9.9",
		})).await;
		mount(&server, "/api/autolookup/edns", 200, json!({
			"enabled": false,
		})).await;
		mount(&server, "/api/autolookup/security", 500, json!({
			"error": "security check crashed",
		})).await;

		let reporter = Reporter::new(true);
		let mut coordinator = coordinator_for(&server.uri());
		coordinator.run_all(&reporter).await;

		let doc = coordinator.document();
		assert_eq!(doc.status(DetectionCategory::Ip), LaneState::Complete);
		assert_eq!(doc.status(DetectionCategory::Resolver), LaneState::Complete);
		assert_eq!(doc.status(DetectionCategory::Edns), LaneState::Complete);
		assert_eq!(doc.status(DetectionCategory::Security), LaneState::Error);

		assert_eq!(doc.node(NodeId::SecurityDnssec).text, "Detection failed");
		assert_eq!(doc.node(NodeId::SecurityScore).text, "N/A");
		// Sibling lanes keep their results
		assert_eq!(doc.node(NodeId::Ipv4).text, "93.184.216.34");
		assert!(coordinator.snapshot().security.is_none());

		// A backend-reported failure still parsed a response, so it counts
		assert_eq!(coordinator.queries, 4);
	}

	#[tokio::test]
	async fn test_unparseable_lane_does_not_count() {
		let server = MockServer::start().await;
		mount(&server, "/api/autolookup/ip", 200, json!({
			"ipv4": "93.184.216.34",
		})).await;
		mount(&server, "/api/autolookup/resolver", 200, json!({
			"provider": "Quad9",
		})).await;
		Mock::given(method("GET"))
			.and(path("/api/autolookup/edns"))
			.respond_with(ResponseTemplate::new(200).set_body_string("<!doctype html>"))
			.mount(&server)
			.await;
		mount(&server, "/api/autolookup/security", 200, json!({
			"dnssec": false,
		})).await;

		let reporter = Reporter::new(true);
		let mut coordinator = coordinator_for(&server.uri());
		coordinator.run_all(&reporter).await;

		assert_eq!(
			coordinator.document().status(DetectionCategory::Edns),
			LaneState::Error,
		);
		assert_eq!(coordinator.queries, 3);
	}

	#[tokio::test]
	async fn test_no_lane_is_left_idle_or_detecting() {
		let server = MockServer::start().await;
		// Every endpoint stalls past the client timeout, so all four lanes
		// settle as errors without a single parsed response
		for category in DetectionCategory::ALL {
			Mock::given(method("GET"))
				.and(path(category.endpoint()))
				.respond_with(
					ResponseTemplate::new(200)
						.set_body_json(json!({}))
						.set_delay(Duration::from_secs(5)),
				)
				.mount(&server)
				.await;
		}

		let client = ApiClient::new(&server.uri(), Duration::from_millis(100)).unwrap();
		let reporter = Reporter::new(true);
		let mut coordinator = Coordinator::new(client);
		coordinator.run_all(&reporter).await;

		for category in DetectionCategory::ALL {
			let state = coordinator.document().status(category);
			assert!(
				state == LaneState::Complete || state == LaneState::Error,
				"lane {} ended in {:?}", category.label(), state,
			);
		}
		assert_eq!(coordinator.queries, 0);
	}

	#[tokio::test]
	async fn test_refresh_overwrites_previous_results() {
		let server = MockServer::start().await;
		mount(&server, "/api/autolookup/ip", 200, json!({
			"ipv4": "1.1.1.1",
			"ipv6": "2606:4700::1111",
		})).await;
		mount(&server, "/api/autolookup/resolver", 200, json!({
			"provider": "Old Provider",
			"resolver_ip": "8.8.8.8",
		})).await;
		mount(&server, "/api/autolookup/edns", 200, json!({
			"enabled": true,
			"subnet": "203.0.113.0/24",
			"privacy_impact": "High - your network is visible",
		})).await;
		mount(&server, "/api/autolookup/security", 200, json!({
			"dnssec": true,
			"score": 85,
		})).await;

		let reporter = Reporter::new(true);
		let mut coordinator = coordinator_for(&server.uri());
		coordinator.run_all(&reporter).await;

		assert!(coordinator.document().copy_control(CopyTarget::Ipv6).visible);
		assert!(coordinator.document().copy_control(CopyTarget::EdnsSubnet).visible);
		assert_eq!(coordinator.queries, 4);

		// Second pass returns thinner results; nothing may survive the rerun
		server.reset().await;
		mount(&server, "/api/autolookup/ip", 200, json!({
			"ipv4": "2.2.2.2",
		})).await;
		mount(&server, "/api/autolookup/resolver", 200, json!({})).await;
		mount(&server, "/api/autolookup/edns", 200, json!({
			"enabled": false,
		})).await;
		mount(&server, "/api/autolookup/security", 200, json!({
			"dnssec": false,
			"score": 40,
		})).await;

		coordinator.refresh(&reporter).await;

		let snapshot = coordinator.snapshot();
		let ip = snapshot.ip.as_ref().unwrap();
		assert_eq!(ip.ipv4.as_deref(), Some("2.2.2.2"));
		assert!(ip.ipv6.is_none());
		assert!(snapshot.edns.as_ref().unwrap().subnet.is_none());

		let doc = coordinator.document();
		assert_eq!(doc.node(NodeId::Ipv4).text, "2.2.2.2");
		assert_eq!(doc.node(NodeId::Ipv6).text, "Not available");
		assert!(!doc.copy_control(CopyTarget::Ipv6).visible);
		assert_eq!(doc.node(NodeId::EdnsSubnet).text, "Not exposed");
		assert!(!doc.copy_control(CopyTarget::EdnsSubnet).visible);
		assert_eq!(doc.node(NodeId::ResolverProvider).text, "Unknown");
		assert_eq!(doc.node(NodeId::SecurityScore).text, "40/100 - Needs improvement");

		assert_eq!(coordinator.queries, 8);
	}

	#[tokio::test]
	async fn test_stale_settle_counts_query_but_drops_result() {
		let client = ApiClient::new("http://127.0.0.1:1", Duration::from_millis(100)).unwrap();
		let reporter = Reporter::new(true);
		let mut coordinator = Coordinator::new(client);

		// Run 2 is the latest launch for the IP lane
		coordinator.latest_run[DetectionCategory::Ip as usize] = 2;

		let stale = ResultRecord::Ip(IpRecord {
			ipv4: Some("9.9.9.9".to_string()),
			..Default::default()
		});
		coordinator.apply(
			LaneEvent::Settled {
				category: DetectionCategory::Ip,
				run: 1,
				outcome: LaneOutcome::Complete(stale),
				elapsed: Duration::from_millis(10),
			},
			&reporter,
		);

		// The superseded run parsed a response, so it counts; its result
		// and status must not land
		assert_eq!(coordinator.queries, 1);
		assert_eq!(coordinator.document().queries(), 1);
		assert!(coordinator.snapshot().ip.is_none());
		assert_eq!(coordinator.document().status(DetectionCategory::Ip), LaneState::Idle);

		// The latest run still applies
		let current = ResultRecord::Ip(IpRecord {
			ipv4: Some("4.4.4.4".to_string()),
			..Default::default()
		});
		coordinator.apply(
			LaneEvent::Settled {
				category: DetectionCategory::Ip,
				run: 2,
				outcome: LaneOutcome::Complete(current),
				elapsed: Duration::from_millis(10),
			},
			&reporter,
		);

		assert_eq!(
			coordinator.snapshot().ip.as_ref().unwrap().ipv4.as_deref(),
			Some("4.4.4.4"),
		);
		assert_eq!(coordinator.queries, 2);
		assert_eq!(
			coordinator.document().status(DetectionCategory::Ip),
			LaneState::Complete,
		);
	}
}
