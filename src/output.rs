use std::time::{Duration, Instant};

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use crate::api::DetectError;
use crate::model::{DetectionCategory, DetectionSnapshot, LaneState};
use crate::view::{CopyTarget, Document, NodeId, Tone};

/// Print a summary of the run configuration before the first pass.
pub fn print_config_summary(base_url: &str, timeout_ms: u64, watch: Option<u64>) {
	println!("DNS Auto Lookup");
	println!("===============");
	println!("Service:        {}", base_url);
	println!("Timeout:        {} ms", timeout_ms);
	if let Some(secs) = watch {
		println!("Watch:          every {} s (press Enter to refresh)", secs);
	}
	println!();
}

/// Per-lane progress lines; silenced for --quiet and --json runs
pub struct Reporter {
	quiet: bool,
}

impl Reporter {
	pub fn new(quiet: bool) -> Reporter {
		Reporter { quiet }
	}

	pub fn lane_started(&self, category: DetectionCategory) {
		if self.quiet {
			return;
		}
		println!("  {:<10} {}", category.label(), category.progress_label());
	}

	pub fn lane_settled(
		&self,
		category: DetectionCategory,
		state: LaneState,
		elapsed: Duration,
		fault: Option<&DetectError>,
	) {
		if self.quiet {
			return;
		}
		match fault {
			None => println!(
				"  {:<10} {} ({} ms)",
				category.label(), state.as_str(), elapsed.as_millis(),
			),
			Some(err) => println!(
				"  {:<10} {}: {}",
				category.label(), state.as_str(), err,
			),
		}
	}
}

/// Print the document as a table, one row per value node.
pub fn print_document(document: &Document) {
	let now = Instant::now();
	let mut table = Table::new();
	table.load_preset(UTF8_FULL);
	table.set_content_arrangement(ContentArrangement::Dynamic);
	table.set_header(vec!["Check", "Status", "Field", "Value"]);

	for category in DetectionCategory::ALL {
		let state = document.status(category);
		let mut first = true;
		for id in NodeId::ALL {
			if id.category() != category {
				continue;
			}
			let node = document.node(id);

			let mut text = node.text.clone();
			if let Some(target) = CopyTarget::for_node(id) {
				if document.copy_control(target).ack_active(now) {
					text.push_str("  ✓ copied");
				}
			}

			let mut value_cell = Cell::new(text);
			if let Some(color) = tone_color(node.tone) {
				value_cell = value_cell.fg(color);
			}

			let (check_cell, status_cell) = if first {
				let mut status = Cell::new(state.as_str());
				if let Some(color) = status_color(state) {
					status = status.fg(color);
				}
				(Cell::new(category.label()), status)
			} else {
				(Cell::new(""), Cell::new(""))
			};
			first = false;

			table.add_row(vec![
				check_cell,
				status_cell,
				Cell::new(id.display_label()),
				value_cell,
			]);
		}
	}

	println!("{table}");
	println!("Queries issued: {}", document.queries());
}

fn tone_color(tone: Tone) -> Option<Color> {
	match tone {
		Tone::Neutral => None,
		Tone::Success => Some(Color::Green),
		Tone::Warning => Some(Color::Yellow),
		Tone::Error => Some(Color::Red),
	}
}

fn status_color(state: LaneState) -> Option<Color> {
	match state {
		LaneState::Idle => None,
		LaneState::Detecting => Some(Color::Yellow),
		LaneState::Complete => Some(Color::Green),
		LaneState::Error => Some(Color::Red),
	}
}

/// Shape the document for machine consumers: per-category status, node
/// text/tone, copy-control state, the raw records, and the query counter.
pub fn render_json(document: &Document, snapshot: &DetectionSnapshot) -> serde_json::Value {
	let now = Instant::now();
	let mut lanes = serde_json::Map::new();
	for category in DetectionCategory::ALL {
		let mut nodes = serde_json::Map::new();
		for id in NodeId::ALL {
			if id.category() != category {
				continue;
			}
			let node = document.node(id);
			let mut entry = serde_json::json!({
				"text": node.text,
				"tone": node.tone.as_str(),
			});
			if let Some(target) = CopyTarget::for_node(id) {
				let control = document.copy_control(target);
				entry["copyable"] = serde_json::Value::Bool(control.visible);
				entry["acknowledged"] = serde_json::Value::Bool(control.ack_active(now));
			}
			nodes.insert(id.key().to_string(), entry);
		}
		lanes.insert(
			category.label().to_string(),
			serde_json::json!({
				"status": document.status(category).as_str(),
				"nodes": nodes,
			}),
		);
	}

	serde_json::json!({
		"queries": document.queries(),
		"lanes": lanes,
		"records": snapshot,
	})
}

pub fn print_json(document: &Document, snapshot: &DetectionSnapshot) -> Result<()> {
	let value = render_json(document, snapshot);
	println!("{}", serde_json::to_string_pretty(&value)?);
	Ok(())
}
