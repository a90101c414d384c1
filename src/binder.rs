use std::time::Duration;

use crate::model::{
	DetectionCategory, EdnsRecord, IpRecord, ResolverRecord, ResultRecord, SecurityRecord,
};
use crate::view::{CopyTarget, Document, NodeId, Tone};

/// Resolver responsiveness band derived from the measured round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedBand {
	Healthy,
	Degraded,
	Poor,
}

impl SpeedBand {
	/// Classify a round trip in milliseconds: <50 healthy, <200 degraded,
	/// everything slower poor
	pub fn classify(elapsed_ms: u64) -> SpeedBand {
		if elapsed_ms < 50 {
			SpeedBand::Healthy
		} else if elapsed_ms < 200 {
			SpeedBand::Degraded
		} else {
			SpeedBand::Poor
		}
	}

	pub fn tone(&self) -> Tone {
		match self {
			SpeedBand::Healthy => Tone::Success,
			SpeedBand::Degraded => Tone::Warning,
			SpeedBand::Poor => Tone::Error,
		}
	}
}

/// Security posture tier derived from the 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
	Excellent,
	Good,
	NeedsImprovement,
}

impl ScoreTier {
	/// Bucket a score: >=80 excellent, >=60 good, below that needs improvement
	pub fn classify(score: u8) -> ScoreTier {
		if score >= 80 {
			ScoreTier::Excellent
		} else if score >= 60 {
			ScoreTier::Good
		} else {
			ScoreTier::NeedsImprovement
		}
	}

	pub fn label(&self) -> &'static str {
		match self {
			ScoreTier::Excellent => "Excellent",
			ScoreTier::Good => "Good",
			ScoreTier::NeedsImprovement => "Needs improvement",
		}
	}

	pub fn tone(&self) -> Tone {
		match self {
			ScoreTier::Excellent => Tone::Success,
			ScoreTier::Good => Tone::Warning,
			ScoreTier::NeedsImprovement => Tone::Error,
		}
	}
}

/// Empty strings from the backend count as absent values
fn present(value: &Option<String>) -> Option<&str> {
	value.as_deref().filter(|v| !v.is_empty())
}

/// Apply a settled record to the document nodes of its category
pub fn bind_record(doc: &mut Document, record: &ResultRecord, elapsed: Duration) {
	match record {
		ResultRecord::Ip(r) => bind_ip(doc, r),
		ResultRecord::Resolver(r) => bind_resolver(doc, r, elapsed),
		ResultRecord::Edns(r) => bind_edns(doc, r),
		ResultRecord::Security(r) => bind_security(doc, r),
	}
}

pub fn bind_ip(doc: &mut Document, record: &IpRecord) {
	match present(&record.ipv4) {
		Some(addr) => {
			doc.set_node(NodeId::Ipv4, addr, Tone::Success);
			doc.set_copy_visible(CopyTarget::Ipv4, true);
		}
		None => {
			doc.set_node(NodeId::Ipv4, "Not available", Tone::Neutral);
			doc.set_copy_visible(CopyTarget::Ipv4, false);
		}
	}
	match present(&record.ipv6) {
		Some(addr) => {
			doc.set_node(NodeId::Ipv6, addr, Tone::Success);
			doc.set_copy_visible(CopyTarget::Ipv6, true);
		}
		None => {
			doc.set_node(NodeId::Ipv6, "Not available", Tone::Neutral);
			doc.set_copy_visible(CopyTarget::Ipv6, false);
		}
	}
}

pub fn bind_resolver(doc: &mut Document, record: &ResolverRecord, elapsed: Duration) {
	let provider = present(&record.provider).unwrap_or("Unknown");
	doc.set_node(NodeId::ResolverProvider, provider, Tone::Neutral);

	match present(&record.resolver_ip) {
		Some(ip) => {
			doc.set_node(NodeId::ResolverIp, ip, Tone::Success);
			doc.set_copy_visible(CopyTarget::ResolverIp, true);
		}
		None => {
			doc.set_node(NodeId::ResolverIp, "Unknown", Tone::Neutral);
			doc.set_copy_visible(CopyTarget::ResolverIp, false);
		}
	}

	let ms = (elapsed.as_secs_f64() * 1000.0).round() as u64;
	let band = SpeedBand::classify(ms);
	doc.set_node(NodeId::ResolverSpeed, format!("{}ms", ms), band.tone());
}

pub fn bind_edns(doc: &mut Document, record: &EdnsRecord) {
	if record.enabled {
		doc.set_node(NodeId::EdnsEnabled, "Enabled", Tone::Success);
	} else {
		doc.set_node(NodeId::EdnsEnabled, "Disabled", Tone::Neutral);
	}

	match present(&record.subnet) {
		Some(subnet) => {
			doc.set_node(NodeId::EdnsSubnet, subnet, Tone::Neutral);
			doc.set_copy_visible(CopyTarget::EdnsSubnet, true);
		}
		None => {
			// No subnet exposure is the good outcome
			doc.set_node(NodeId::EdnsSubnet, "Not exposed", Tone::Success);
			doc.set_copy_visible(CopyTarget::EdnsSubnet, false);
		}
	}

	match present(&record.privacy_impact) {
		Some(text) => {
			let tone = privacy_tone(text);
			doc.set_node(NodeId::EdnsPrivacy, text, tone);
		}
		None => doc.set_node(NodeId::EdnsPrivacy, "Good", Tone::Success),
	}
}

/// Tone for a privacy-impact description: "High" is bad, "Medium" borderline
fn privacy_tone(text: &str) -> Tone {
	if text.contains("High") {
		Tone::Error
	} else if text.contains("Medium") {
		Tone::Warning
	} else {
		Tone::Success
	}
}

pub fn bind_security(doc: &mut Document, record: &SecurityRecord) {
	if record.dnssec {
		doc.set_node(NodeId::SecurityDnssec, "Validated", Tone::Success);
	} else {
		doc.set_node(NodeId::SecurityDnssec, "Not validated", Tone::Warning);
	}

	bind_tri_state(doc, NodeId::SecurityDoh, record.doh);
	bind_tri_state(doc, NodeId::SecurityDot, record.dot);

	let score = record.score.unwrap_or(0);
	let tier = ScoreTier::classify(score);
	doc.set_node(
		NodeId::SecurityScore,
		format!("{}/100 - {}", score, tier.label()),
		tier.tone(),
	);
}

/// DoH and DoT support is tri-state: confirmed, absent, or undetermined
fn bind_tri_state(doc: &mut Document, id: NodeId, value: Option<bool>) {
	match value {
		Some(true) => doc.set_node(id, "Available", Tone::Success),
		Some(false) => doc.set_node(id, "Not available", Tone::Error),
		None => doc.set_node(id, "Unknown", Tone::Warning),
	}
}

/// Render a category's failure presentation: value nodes read
/// "Detection failed", auxiliary nodes "N/A", copy controls hidden
pub fn bind_failure(doc: &mut Document, category: DetectionCategory) {
	match category {
		DetectionCategory::Ip => {
			doc.set_node(NodeId::Ipv4, "Detection failed", Tone::Error);
			doc.set_node(NodeId::Ipv6, "Detection failed", Tone::Error);
			doc.set_copy_visible(CopyTarget::Ipv4, false);
			doc.set_copy_visible(CopyTarget::Ipv6, false);
		}
		DetectionCategory::Resolver => {
			doc.set_node(NodeId::ResolverProvider, "Detection failed", Tone::Error);
			doc.set_node(NodeId::ResolverIp, "Detection failed", Tone::Error);
			doc.set_node(NodeId::ResolverSpeed, "N/A", Tone::Neutral);
			doc.set_copy_visible(CopyTarget::ResolverIp, false);
		}
		DetectionCategory::Edns => {
			doc.set_node(NodeId::EdnsEnabled, "Detection failed", Tone::Error);
			doc.set_node(NodeId::EdnsSubnet, "Detection failed", Tone::Error);
			doc.set_node(NodeId::EdnsPrivacy, "N/A", Tone::Neutral);
			doc.set_copy_visible(CopyTarget::EdnsSubnet, false);
		}
		DetectionCategory::Security => {
			doc.set_node(NodeId::SecurityDnssec, "Detection failed", Tone::Error);
			doc.set_node(NodeId::SecurityDoh, "Detection failed", Tone::Error);
			doc.set_node(NodeId::SecurityDot, "Detection failed", Tone::Error);
			doc.set_node(NodeId::SecurityScore, "N/A", Tone::Neutral);
		}
	}
}
