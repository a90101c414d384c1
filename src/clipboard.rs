use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use tracing::error;

use crate::view::{CopyTarget, Document};

/// Destination for copied text. The indirection keeps everything above the
/// system clipboard testable on headless machines.
pub trait ClipboardSink {
	fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The real system clipboard
pub struct SystemClipboard {
	inner: arboard::Clipboard,
}

impl SystemClipboard {
	pub fn new() -> Result<SystemClipboard> {
		let inner = arboard::Clipboard::new()
			.context("failed to open system clipboard")?;
		Ok(SystemClipboard { inner })
	}
}

impl ClipboardSink for SystemClipboard {
	fn set_text(&mut self, text: &str) -> Result<()> {
		self.inner
			.set_text(text)
			.context("failed to write to system clipboard")
	}
}

/// Copy the current text of a copyable document value.
///
/// Refuses when the control is hidden, since a hidden control means there is
/// no value to copy. On success the control shows its acknowledgement for
/// the fixed window; on failure the control is left untouched and the fault
/// is logged and returned. No retry.
pub fn copy_node(
	document: &mut Document,
	sink: &mut impl ClipboardSink,
	target: CopyTarget,
) -> Result<String> {
	if !document.copy_control(target).visible {
		return Err(anyhow!("no {} value available to copy", target.as_str()));
	}

	let text = document.node(target.node()).text.clone();
	match sink.set_text(&text) {
		Ok(()) => {
			document.acknowledge_copy(target, Instant::now());
			Ok(text)
		}
		Err(err) => {
			error!("clipboard copy failed: {:#}", err);
			Err(err)
		}
	}
}
