use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::error::{EndpointFailure, Error, Result};
use crate::rpc::{Node, RpcClient};

/// The first candidate that answered its liveness probe.
#[derive(Debug)]
pub struct Resolved<N> {
	pub endpoint: String,
	pub node: N,
	/// Chain head reported by the probe.
	pub head: u64,
	/// Candidates tried before this one, in order.
	pub failures: Vec<EndpointFailure>,
}

/// Turn a bare candidate into an HTTP URL. Accepts `host`, `host:port`,
/// either followed by a path, and IPv6 hosts bare (`::1`) or bracketed
/// (`[::1]:8545`). The default port is added when none is given. Anything
/// that already carries a scheme is left alone.
pub fn normalize(endpoint: &str, default_port: u16) -> String {
	let endpoint = endpoint.trim();
	if endpoint.contains("://") {
		return endpoint.to_owned();
	}

	let (authority, path) = match endpoint.find('/') {
		Some(i) => endpoint.split_at(i),
		None => (endpoint, ""),
	};

	let authority = if let Some(rest) = authority.strip_prefix('[') {
		// Bracketed IPv6: a port can only follow the closing bracket.
		match rest.split_once(']') {
			Some((_, after)) if after.starts_with(':') => authority.to_owned(),
			_ => format!("{authority}:{default_port}"),
		}
	} else {
		match authority.matches(':').count() {
			0 => format!("{authority}:{default_port}"),
			1 => authority.to_owned(),
			_ => format!("[{authority}]:{default_port}"),
		}
	};

	format!("http://{authority}{path}")
}

/// Try each candidate strictly in order and return the first whose chain
/// head can be fetched within `probe_timeout`. No retries, no parallel
/// probing: every failure is attributable to one endpoint.
pub async fn resolve<N, F, Fut>(
	candidates: &[String],
	probe_timeout: Duration,
	mut connect: F,
) -> Result<Resolved<N>>
where
	N: Node,
	F: FnMut(&str) -> Fut,
	Fut: Future<Output = Result<N>>,
{
	let mut failures = Vec::new();

	for endpoint in candidates {
		tracing::info!(endpoint = %endpoint, "attempting connection");

		let reason = match connect(endpoint).await {
			Err(e) => e.to_string(),
			Ok(node) => match timeout(probe_timeout, node.block_number()).await {
				Ok(Ok(head)) => {
					tracing::info!(endpoint = %endpoint, head, "connected");
					return Ok(Resolved {
						endpoint: endpoint.clone(),
						node,
						head,
						failures,
					});
				}
				Ok(Err(e)) => e.to_string(),
				Err(_) => format!("no answer within {}ms", probe_timeout.as_millis()),
			},
		};

		tracing::warn!(endpoint = %endpoint, %reason, "connection failed");
		failures.push(EndpointFailure {
			endpoint: endpoint.clone(),
			reason,
		});
	}

	Err(Error::NoReachableEndpoint { attempts: failures })
}

/// Resolve over HTTP JSON-RPC, normalising bare hosts first.
pub async fn resolve_rpc(
	candidates: &[String],
	default_port: u16,
	probe_timeout: Duration,
) -> Result<Resolved<RpcClient>> {
	let urls: Vec<String> = candidates
		.iter()
		.map(|c| normalize(c, default_port))
		.collect();
	resolve(&urls, probe_timeout, |url| std::future::ready(RpcClient::new(url))).await
}
