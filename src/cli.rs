use clap::Parser;

use crate::view::CopyTarget;

/// DNS diagnostics auto-lookup tool
#[derive(Parser, Debug)]
#[command(name = "dns-autolookup")]
#[command(about = "Detect your public IP, DNS resolver, EDNS exposure, and DNS security posture")]
pub struct Cli {
	/// Base URL of the diagnostics service
	#[arg(
		short = 'u',
		long = "base-url",
		env = "AUTOLOOKUP_BASE_URL",
		default_value = "https://www.dnsscience.io",
	)]
	pub base_url: String,

	/// Request timeout in milliseconds
	#[arg(short = 't', long = "timeout", default_value = "10000")]
	pub timeout: u64,

	/// Re-run all detections every N seconds; press Enter to refresh immediately
	#[arg(
		short = 'w',
		long = "watch",
		value_name = "SECONDS",
		value_parser = clap::value_parser!(u64).range(1..),
	)]
	pub watch: Option<u64>,

	/// Copy a detected value to the clipboard after the run
	/// (ipv4, ipv6, resolver-ip or edns-subnet)
	#[arg(long = "copy", value_name = "TARGET", conflicts_with = "watch")]
	pub copy: Option<CopyTarget>,

	/// Print the final document as JSON instead of a table
	#[arg(long = "json")]
	pub json: bool,

	/// Suppress per-lane progress output
	#[arg(short = 'q', long = "quiet")]
	pub quiet: bool,
}
