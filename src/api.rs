use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::model::{
	BackendRecord, DetectionCategory, EdnsRecord, IpRecord, ResolverRecord, SecurityRecord,
};

/// Fault taxonomy for a single detection call
#[derive(Debug, Error)]
pub enum DetectError {
	/// The request never produced a response body
	#[error("request failed: {0}")]
	Transport(#[from] reqwest::Error),
	/// The response body was not a valid record for the category
	#[error("unreadable response: {0}")]
	Payload(#[from] serde_json::Error),
	/// A well-formed response carrying an explicit backend error
	#[error("{0}")]
	Backend(String),
}

/// HTTP client for the autolookup API endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
	base_url: String,
	client: reqwest::Client,
}

impl ApiClient {
	/// Build a client for the given base URL.
	///
	/// The URL is validated up front; a trailing slash is tolerated. The
	/// timeout is the only limit imposed on individual detection calls.
	pub fn new(base_url: &str, timeout: Duration) -> Result<ApiClient> {
		let trimmed = base_url.trim().trim_end_matches('/');
		if trimmed.is_empty() {
			return Err(anyhow!("empty base URL"));
		}
		let parsed: reqwest::Url = trimmed.parse()
			.map_err(|e| anyhow!("invalid base URL '{}': {}", trimmed, e))?;
		if parsed.scheme() != "http" && parsed.scheme() != "https" {
			return Err(anyhow!(
				"unsupported URL scheme '{}': expected http or https", parsed.scheme(),
			));
		}

		let client = reqwest::Client::builder()
			.timeout(timeout)
			.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
			.build()
			.context("failed to build HTTP client")?;

		Ok(ApiClient {
			base_url: trimmed.to_string(),
			client,
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	pub async fn ip(&self) -> Result<IpRecord, DetectError> {
		self.fetch(DetectionCategory::Ip).await
	}

	pub async fn resolver(&self) -> Result<ResolverRecord, DetectError> {
		self.fetch(DetectionCategory::Resolver).await
	}

	pub async fn edns(&self) -> Result<EdnsRecord, DetectError> {
		self.fetch(DetectionCategory::Edns).await
	}

	pub async fn security(&self) -> Result<SecurityRecord, DetectError> {
		self.fetch(DetectionCategory::Security).await
	}

	/// Fetch and decode one category record.
	///
	/// The HTTP status is deliberately not consulted: the backend signals
	/// failure through a non-empty `error` field in an otherwise valid JSON
	/// body, and does so on 5xx responses as well.
	async fn fetch<T>(&self, category: DetectionCategory) -> Result<T, DetectError>
	where
		T: DeserializeOwned + BackendRecord,
	{
		let url = format!("{}{}", self.base_url, category.endpoint());
		let response = self.client.get(&url).send().await?;
		let body = response.text().await?;
		let record: T = serde_json::from_str(&body)?;
		if let Some(message) = record.error_field() {
			return Err(DetectError::Backend(message.to_string()));
		}
		Ok(record)
	}
}
