//! Shared fixtures for integration tests: configuration helpers and a scripted transport.

#![allow(dead_code)]

// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};
// crates.io
use http::StatusCode;
use nb_session::{
	Method,
	auth::{AccessToken, TenantSlug},
	config::{SessionConfig, SessionConfigBuilder},
	session::Session,
	transport::{HttpRequest, HttpResponse, RestHttpClient, TransportFuture},
	url::Url,
};
use parking_lot::Mutex;

pub const TOKEN: &str = "test-token";

pub fn config_builder(endpoint: &str) -> SessionConfigBuilder {
	let slug = TenantSlug::new("test-nation").expect("Test tenant slug should be valid.");
	let endpoint = Url::parse(endpoint).expect("Test endpoint should parse.");

	SessionConfig::builder(slug, AccessToken::new(TOKEN)).endpoint(endpoint)
}

pub fn config(endpoint: &str, concurrency: usize) -> SessionConfig {
	config_builder(endpoint)
		.concurrency(concurrency)
		.build()
		.expect("Test configuration should build.")
}

/// Unix time `offset` from now, formatted like the service's reset header.
pub fn reset_header_in(offset: Duration) -> String {
	let now = SystemTime::now().duration_since(UNIX_EPOCH).expect("Clock should be after epoch.");

	format!("{:.3}", (now + offset).as_secs_f64())
}

/// Canned response produced by a [`ScriptedTransport`] route.
#[derive(Clone, Debug)]
pub struct Reply {
	pub status: u16,
	pub remaining: Option<u64>,
	pub reset_in: Duration,
	pub body: String,
	pub delay: Duration,
}
impl Reply {
	pub fn ok(body: serde_json::Value) -> Self {
		Self {
			status: 200,
			remaining: Some(10_000),
			reset_in: Duration::from_secs(60),
			body: body.to_string(),
			delay: Duration::ZERO,
		}
	}

	pub fn status(mut self, status: u16) -> Self {
		self.status = status;

		self
	}

	pub fn quota(mut self, remaining: u64, reset_in: Duration) -> Self {
		self.remaining = Some(remaining);
		self.reset_in = reset_in;

		self
	}

	pub fn delay(mut self, delay: Duration) -> Self {
		self.delay = delay;

		self
	}
}

/// One request observed by a [`ScriptedTransport`].
#[derive(Clone, Debug)]
pub struct Call {
	pub method: Method,
	pub uri: String,
	pub at: Instant,
}
impl Call {
	pub fn path(&self) -> String {
		Url::parse(&self.uri).expect("Recorded URI should parse.").path().to_owned()
	}

	pub fn query_pairs(&self) -> Vec<(String, String)> {
		Url::parse(&self.uri)
			.expect("Recorded URI should parse.")
			.query_pairs()
			.map(|(k, v)| (k.into_owned(), v.into_owned()))
			.collect()
	}
}

#[derive(Debug)]
pub struct ScriptedError;
impl std::fmt::Display for ScriptedError {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str("Scripted transport failure.")
	}
}
impl std::error::Error for ScriptedError {}

type Route = Box<dyn Fn(&HttpRequest) -> Reply + Send + Sync>;

/// In-process transport that answers from a routing closure and records every call.
pub struct ScriptedTransport {
	route: Route,
	calls: Mutex<Vec<Call>>,
	in_flight: AtomicUsize,
	peak: AtomicUsize,
}
impl ScriptedTransport {
	pub fn new(route: impl Fn(&HttpRequest) -> Reply + Send + Sync + 'static) -> Arc<Self> {
		Arc::new(Self {
			route: Box::new(route),
			calls: Mutex::new(Vec::new()),
			in_flight: AtomicUsize::new(0),
			peak: AtomicUsize::new(0),
		})
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().clone()
	}

	pub fn call_count(&self) -> usize {
		self.calls.lock().len()
	}

	pub fn in_flight(&self) -> usize {
		self.in_flight.load(Ordering::SeqCst)
	}

	pub fn peak(&self) -> usize {
		self.peak.load(Ordering::SeqCst)
	}
}
impl RestHttpClient for ScriptedTransport {
	type TransportError = ScriptedError;

	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(async move {
			self.calls.lock().push(Call {
				method: request.method().clone(),
				uri: request.uri().to_string(),
				at: Instant::now(),
			});

			let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;

			self.peak.fetch_max(current, Ordering::SeqCst);

			let reply = (self.route)(&request);

			if !reply.delay.is_zero() {
				tokio::time::sleep(reply.delay).await;
			}

			self.in_flight.fetch_sub(1, Ordering::SeqCst);

			if reply.status == 0 {
				return Err(ScriptedError);
			}

			let mut response = HttpResponse::new(reply.body.into_bytes());

			*response.status_mut() = StatusCode::from_u16(reply.status).expect("Valid status.");

			if let Some(remaining) = reply.remaining {
				let headers = response.headers_mut();

				headers.insert(
					"x-ratelimit-remaining",
					remaining.to_string().parse().expect("Valid header value."),
				);
				headers.insert(
					"x-ratelimit-reset",
					reset_header_in(reply.reset_in).parse().expect("Valid header value."),
				);
			}

			Ok(response)
		})
	}
}

pub fn scripted_session(
	transport: &Arc<ScriptedTransport>,
	concurrency: usize,
) -> Session<ScriptedTransport> {
	Session::with_http_client(config("http://127.0.0.1:9/api/v1/", concurrency), transport.clone())
}

pub fn query_value(call: &Call, key: &str) -> Option<String> {
	call.query_pairs().into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
}
