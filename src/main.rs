mod api;
mod binder;
mod cli;
mod clipboard;
mod coordinator;
mod lane;
mod model;
mod output;
mod view;
mod watch;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::cli::Cli;
use crate::clipboard::SystemClipboard;
use crate::coordinator::Coordinator;
use crate::output::Reporter;
use crate::watch::RefreshTrigger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	// Diagnostics go to stderr so the rendered document owns stdout
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();

	let client = ApiClient::new(&cli.base_url, Duration::from_millis(cli.timeout))?;
	if !cli.json {
		output::print_config_summary(client.base_url(), cli.timeout, cli.watch);
	}

	let reporter = Reporter::new(cli.quiet || cli.json);
	let mut coordinator = Coordinator::new(client);

	// All four lanes fire immediately on startup
	coordinator.run_all(&reporter).await;

	// Copy before rendering so the acknowledgement shows in the panel
	let copy_outcome = cli.copy.map(|target| {
		let result = SystemClipboard::new().and_then(|mut sink| {
			clipboard::copy_node(coordinator.document_mut(), &mut sink, target)
		});
		(target, result)
	});

	render(&coordinator, cli.json)?;

	if let Some((target, result)) = copy_outcome {
		let text = result.with_context(|| {
			format!("failed to copy {} to clipboard", target.as_str())
		})?;
		if cli.json {
			eprintln!("✓ Copied! {} = {}", target.as_str(), text);
		} else {
			println!("✓ Copied! {} = {}", target.as_str(), text);
		}
	}

	if let Some(secs) = cli.watch {
		watch_loop(&mut coordinator, &reporter, secs, cli.json).await?;
	}

	Ok(())
}

fn render(coordinator: &Coordinator, json: bool) -> anyhow::Result<()> {
	if json {
		output::print_json(coordinator.document(), coordinator.snapshot())?;
	} else {
		output::print_document(coordinator.document());
	}
	Ok(())
}

/// Re-run all detections on a timer, or immediately when the user hits Enter.
async fn watch_loop(
	coordinator: &mut Coordinator,
	reporter: &Reporter,
	interval_secs: u64,
	json: bool,
) -> anyhow::Result<()> {
	let stdin = tokio::io::BufReader::new(tokio::io::stdin());
	let mut trigger = RefreshTrigger::new(Duration::from_secs(interval_secs), stdin);

	loop {
		trigger.wait().await;

		if !json {
			println!();
		}
		coordinator.refresh(reporter).await;
		render(coordinator, json)?;
	}
}
