use serde::{Deserialize, Serialize};

/// Detection category, one per lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionCategory {
	Ip,
	Resolver,
	Edns,
	Security,
}

impl DetectionCategory {
	/// All categories, in launch order
	pub const ALL: [DetectionCategory; 4] = [
		DetectionCategory::Ip,
		DetectionCategory::Resolver,
		DetectionCategory::Edns,
		DetectionCategory::Security,
	];

	/// Short lowercase label used in progress output and the JSON dump
	pub fn label(&self) -> &'static str {
		match self {
			DetectionCategory::Ip => "ip",
			DetectionCategory::Resolver => "resolver",
			DetectionCategory::Edns => "edns",
			DetectionCategory::Security => "security",
		}
	}

	/// API endpoint path for this category
	pub fn endpoint(&self) -> &'static str {
		match self {
			DetectionCategory::Ip => "/api/autolookup/ip",
			DetectionCategory::Resolver => "/api/autolookup/resolver",
			DetectionCategory::Edns => "/api/autolookup/edns",
			DetectionCategory::Security => "/api/autolookup/security",
		}
	}

	/// In-progress wording; the security check analyzes rather than detects
	pub fn progress_label(&self) -> &'static str {
		match self {
			DetectionCategory::Security => "analyzing...",
			_ => "detecting...",
		}
	}
}

/// Lifecycle state of a single detection lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneState {
	Idle,
	Detecting,
	Complete,
	Error,
}

impl LaneState {
	pub fn as_str(&self) -> &'static str {
		match self {
			LaneState::Idle => "idle",
			LaneState::Detecting => "detecting",
			LaneState::Complete => "complete",
			LaneState::Error => "error",
		}
	}
}

/// Access to the backend's explicit error field.
///
/// An empty string does not count as an error, matching how the deployed
/// backend signals success.
pub trait BackendRecord {
	fn error_field(&self) -> Option<&str>;
}

fn non_empty(error: &Option<String>) -> Option<&str> {
	error.as_deref().filter(|message| !message.is_empty())
}

/// Payload of /api/autolookup/ip
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IpRecord {
	pub ipv4: Option<String>,
	pub ipv6: Option<String>,
	pub error: Option<String>,
}

/// Payload of /api/autolookup/resolver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverRecord {
	pub provider: Option<String>,
	pub resolver_ip: Option<String>,
	pub error: Option<String>,
}

/// Payload of /api/autolookup/edns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdnsRecord {
	pub enabled: bool,
	pub subnet: Option<String>,
	pub privacy_impact: Option<String>,
	pub error: Option<String>,
}

/// Payload of /api/autolookup/security
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityRecord {
	pub dnssec: bool,
	pub doh: Option<bool>,
	pub dot: Option<bool>,
	pub score: Option<u8>,
	pub error: Option<String>,
}

impl BackendRecord for IpRecord {
	fn error_field(&self) -> Option<&str> {
		non_empty(&self.error)
	}
}

impl BackendRecord for ResolverRecord {
	fn error_field(&self) -> Option<&str> {
		non_empty(&self.error)
	}
}

impl BackendRecord for EdnsRecord {
	fn error_field(&self) -> Option<&str> {
		non_empty(&self.error)
	}
}

impl BackendRecord for SecurityRecord {
	fn error_field(&self) -> Option<&str> {
		non_empty(&self.error)
	}
}

/// A successfully decoded record for one category
#[derive(Debug, Clone)]
pub enum ResultRecord {
	Ip(IpRecord),
	Resolver(ResolverRecord),
	Edns(EdnsRecord),
	Security(SecurityRecord),
}

impl ResultRecord {
	pub fn category(&self) -> DetectionCategory {
		match self {
			ResultRecord::Ip(_) => DetectionCategory::Ip,
			ResultRecord::Resolver(_) => DetectionCategory::Resolver,
			ResultRecord::Edns(_) => DetectionCategory::Edns,
			ResultRecord::Security(_) => DetectionCategory::Security,
		}
	}
}

/// Latest completed record per category.
///
/// Entries are replaced wholesale when a lane completes; results from
/// different runs are never merged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionSnapshot {
	pub ip: Option<IpRecord>,
	pub resolver: Option<ResolverRecord>,
	pub edns: Option<EdnsRecord>,
	pub security: Option<SecurityRecord>,
}

impl DetectionSnapshot {
	pub fn store(&mut self, record: ResultRecord) {
		match record {
			ResultRecord::Ip(r) => self.ip = Some(r),
			ResultRecord::Resolver(r) => self.resolver = Some(r),
			ResultRecord::Edns(r) => self.edns = Some(r),
			ResultRecord::Security(r) => self.security = Some(r),
		}
	}
}
