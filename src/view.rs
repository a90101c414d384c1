use std::time::{Duration, Instant};

use crate::model::{DetectionCategory, LaneState};

/// How long a copy acknowledgement stays visible
pub const ACK_WINDOW: Duration = Duration::from_secs(2);

/// Visual tone of a value node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
	Neutral,
	Success,
	Warning,
	Error,
}

impl Tone {
	pub fn as_str(&self) -> &'static str {
		match self {
			Tone::Neutral => "neutral",
			Tone::Success => "success",
			Tone::Warning => "warning",
			Tone::Error => "error",
		}
	}
}

/// Identifies one value node in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeId {
	Ipv4,
	Ipv6,
	ResolverProvider,
	ResolverIp,
	ResolverSpeed,
	EdnsEnabled,
	EdnsSubnet,
	EdnsPrivacy,
	SecurityDnssec,
	SecurityDoh,
	SecurityDot,
	SecurityScore,
}

impl NodeId {
	pub const ALL: [NodeId; 12] = [
		NodeId::Ipv4,
		NodeId::Ipv6,
		NodeId::ResolverProvider,
		NodeId::ResolverIp,
		NodeId::ResolverSpeed,
		NodeId::EdnsEnabled,
		NodeId::EdnsSubnet,
		NodeId::EdnsPrivacy,
		NodeId::SecurityDnssec,
		NodeId::SecurityDoh,
		NodeId::SecurityDot,
		NodeId::SecurityScore,
	];

	/// The lane that owns this node
	pub fn category(&self) -> DetectionCategory {
		match self {
			NodeId::Ipv4 | NodeId::Ipv6 => DetectionCategory::Ip,
			NodeId::ResolverProvider | NodeId::ResolverIp | NodeId::ResolverSpeed => {
				DetectionCategory::Resolver
			}
			NodeId::EdnsEnabled | NodeId::EdnsSubnet | NodeId::EdnsPrivacy => {
				DetectionCategory::Edns
			}
			NodeId::SecurityDnssec
			| NodeId::SecurityDoh
			| NodeId::SecurityDot
			| NodeId::SecurityScore => DetectionCategory::Security,
		}
	}

	/// Stable key used in the JSON dump; matches the wire field name where
	/// one exists
	pub fn key(&self) -> &'static str {
		match self {
			NodeId::Ipv4 => "ipv4",
			NodeId::Ipv6 => "ipv6",
			NodeId::ResolverProvider => "provider",
			NodeId::ResolverIp => "resolver_ip",
			NodeId::ResolverSpeed => "speed",
			NodeId::EdnsEnabled => "enabled",
			NodeId::EdnsSubnet => "subnet",
			NodeId::EdnsPrivacy => "privacy_impact",
			NodeId::SecurityDnssec => "dnssec",
			NodeId::SecurityDoh => "doh",
			NodeId::SecurityDot => "dot",
			NodeId::SecurityScore => "score",
		}
	}

	/// Human label for the results panel
	pub fn display_label(&self) -> &'static str {
		match self {
			NodeId::Ipv4 => "IPv4",
			NodeId::Ipv6 => "IPv6",
			NodeId::ResolverProvider => "Provider",
			NodeId::ResolverIp => "Resolver IP",
			NodeId::ResolverSpeed => "Speed",
			NodeId::EdnsEnabled => "ECS enabled",
			NodeId::EdnsSubnet => "Subnet",
			NodeId::EdnsPrivacy => "Privacy impact",
			NodeId::SecurityDnssec => "DNSSEC",
			NodeId::SecurityDoh => "DoH",
			NodeId::SecurityDot => "DoT",
			NodeId::SecurityScore => "Score",
		}
	}
}

/// Document values that carry a copy control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
	Ipv4,
	Ipv6,
	ResolverIp,
	EdnsSubnet,
}

impl CopyTarget {
	pub const ALL: [CopyTarget; 4] = [
		CopyTarget::Ipv4,
		CopyTarget::Ipv6,
		CopyTarget::ResolverIp,
		CopyTarget::EdnsSubnet,
	];

	/// The value node this control copies from
	pub fn node(&self) -> NodeId {
		match self {
			CopyTarget::Ipv4 => NodeId::Ipv4,
			CopyTarget::Ipv6 => NodeId::Ipv6,
			CopyTarget::ResolverIp => NodeId::ResolverIp,
			CopyTarget::EdnsSubnet => NodeId::EdnsSubnet,
		}
	}

	/// The control attached to a node, if the node is copyable
	pub fn for_node(id: NodeId) -> Option<CopyTarget> {
		match id {
			NodeId::Ipv4 => Some(CopyTarget::Ipv4),
			NodeId::Ipv6 => Some(CopyTarget::Ipv6),
			NodeId::ResolverIp => Some(CopyTarget::ResolverIp),
			NodeId::EdnsSubnet => Some(CopyTarget::EdnsSubnet),
			_ => None,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			CopyTarget::Ipv4 => "ipv4",
			CopyTarget::Ipv6 => "ipv6",
			CopyTarget::ResolverIp => "resolver-ip",
			CopyTarget::EdnsSubnet => "edns-subnet",
		}
	}
}

impl std::str::FromStr for CopyTarget {
	type Err = String;

	fn from_str(s: &str) -> Result<CopyTarget, String> {
		match s {
			"ipv4" => Ok(CopyTarget::Ipv4),
			"ipv6" => Ok(CopyTarget::Ipv6),
			"resolver-ip" => Ok(CopyTarget::ResolverIp),
			"edns-subnet" => Ok(CopyTarget::EdnsSubnet),
			other => Err(format!(
				"unknown copy target '{}': expected one of {}",
				other,
				CopyTarget::ALL.map(|t| t.as_str()).join(", "),
			)),
		}
	}
}

/// One rendered value: display text plus visual tone
#[derive(Debug, Clone)]
pub struct ValueNode {
	pub text: String,
	pub tone: Tone,
}

/// State of the copy control attached to a copyable value
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyControl {
	pub visible: bool,
	acknowledged_at: Option<Instant>,
}

impl CopyControl {
	/// True while the post-copy acknowledgement is still showing
	pub fn ack_active(&self, now: Instant) -> bool {
		match self.acknowledged_at {
			Some(at) => now.duration_since(at) < ACK_WINDOW,
			None => false,
		}
	}
}

/// The rendered document: status badges, value nodes, copy controls and the
/// query counter. This is the only surface external consumers observe.
#[derive(Debug, Clone)]
pub struct Document {
	statuses: [LaneState; 4],
	nodes: [ValueNode; 12],
	copy_controls: [CopyControl; 4],
	queries: u64,
}

impl Document {
	pub fn new() -> Document {
		Document {
			statuses: [LaneState::Idle; 4],
			nodes: std::array::from_fn(|_| ValueNode {
				text: "-".to_string(),
				tone: Tone::Neutral,
			}),
			copy_controls: [CopyControl::default(); 4],
			queries: 0,
		}
	}

	pub fn status(&self, category: DetectionCategory) -> LaneState {
		self.statuses[category as usize]
	}

	pub fn set_status(&mut self, category: DetectionCategory, state: LaneState) {
		self.statuses[category as usize] = state;
	}

	pub fn node(&self, id: NodeId) -> &ValueNode {
		&self.nodes[id as usize]
	}

	pub fn set_node(&mut self, id: NodeId, text: impl Into<String>, tone: Tone) {
		self.nodes[id as usize] = ValueNode {
			text: text.into(),
			tone,
		};
	}

	pub fn copy_control(&self, target: CopyTarget) -> &CopyControl {
		&self.copy_controls[target as usize]
	}

	/// Show or hide a copy control; an acknowledgement in progress is kept
	pub fn set_copy_visible(&mut self, target: CopyTarget, visible: bool) {
		self.copy_controls[target as usize].visible = visible;
	}

	pub fn acknowledge_copy(&mut self, target: CopyTarget, at: Instant) {
		self.copy_controls[target as usize].acknowledged_at = Some(at);
	}

	pub fn queries(&self) -> u64 {
		self.queries
	}

	pub fn set_queries(&mut self, count: u64) {
		self.queries = count;
	}
}

impl Default for Document {
	fn default() -> Document {
		Document::new()
	}
}
