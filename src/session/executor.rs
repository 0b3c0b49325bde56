//! Single-request execution: admission, throttle wait, authenticated request, quota accounting.
//!
//! Every public verb funnels into [`Session::send_json`]. A request first takes a concurrency
//! slot, then waits out any active quota pause, then goes to the transport. A non-2xx status
//! fails the request before the quota headers are read. On success the remaining quota is
//! compared with the concurrency ceiling; at or below it, the request engages the session's
//! [`ThrottleGate`](crate::throttle::ThrottleGate) before returning, still holding its slot.
//! The check runs while quota is still positive because every admitted request may spend one
//! more unit before the next header check.

// crates.io
use ::http::{
	Method,
	header::{ACCEPT, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, DecodeError, TransportError},
	obs::{self, RequestOutcome, RequestSpan, RequestVerb},
	rate::RateWindow,
	session::{Query, Session},
	transport::{HttpRequest, HttpResponse, RestHttpClient},
};

const JSON: &str = "application/json";

impl<C> Session<C>
where
	C: ?Sized + RestHttpClient,
{
	/// Sends a request and decodes the JSON body as a [`Value`].
	pub async fn send(
		&self,
		method: Method,
		path: &str,
		payload: Option<&Value>,
		query: &Query,
	) -> Result<Value> {
		self.send_json(method, path, payload, query).await
	}

	/// Sends a request and decodes the JSON body into `T`.
	///
	/// An empty body decodes as JSON `null`. `payload` is ignored for `GET` and `HEAD`.
	pub async fn send_json<T>(
		&self,
		method: Method,
		path: &str,
		payload: Option<&Value>,
		query: &Query,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let verb = RequestVerb::from(&method);
		let span = RequestSpan::new(verb, path);

		obs::record_request_outcome(verb, RequestOutcome::Attempt);
		self.metrics.record_attempt();

		let result = span
			.instrument(async move {
				let response = self.dispatch(method, path, payload, query).await?;

				decode_body(&response)
			})
			.await;

		match &result {
			Ok(_) => {
				obs::record_request_outcome(verb, RequestOutcome::Success);
				self.metrics.record_success();
			},
			Err(err) => {
				obs::record_request_outcome(verb, RequestOutcome::Failure);
				obs::record_failure(err);
				self.metrics.record_failure();
			},
		}

		result
	}

	/// Issues a `GET`.
	pub async fn get(&self, path: &str, query: &Query) -> Result<Value> {
		self.send(Method::GET, path, None, query).await
	}

	/// Issues a `PUT` with an optional JSON payload.
	pub async fn put(&self, path: &str, payload: Option<&Value>, query: &Query) -> Result<Value> {
		self.send(Method::PUT, path, payload, query).await
	}

	/// Issues a `POST` with an optional JSON payload.
	pub async fn create(
		&self,
		path: &str,
		payload: Option<&Value>,
		query: &Query,
	) -> Result<Value> {
		self.send(Method::POST, path, payload, query).await
	}

	/// Issues a `DELETE` with an optional JSON payload.
	pub async fn delete(
		&self,
		path: &str,
		payload: Option<&Value>,
		query: &Query,
	) -> Result<Value> {
		self.send(Method::DELETE, path, payload, query).await
	}

	async fn dispatch(
		&self,
		method: Method,
		path: &str,
		payload: Option<&Value>,
		query: &Query,
	) -> Result<HttpResponse> {
		let _admission = self.limiter.admit(method.clone(), path).await?;

		self.gate.wait_clear().await;

		let request = self.build_request(method, path, payload, query)?;
		let transport = self.transport()?;
		let response = transport.execute(request).await.map_err(TransportError::network)?;
		let status = response.status();

		if !status.is_success() {
			return Err(Error::HttpStatus {
				status: status.as_u16(),
				body: String::from_utf8_lossy(response.body()).into_owned(),
			});
		}

		let window = RateWindow::from_headers(
			response.headers(),
			&self.config.rate_headers,
			OffsetDateTime::now_utc(),
		)?;

		if window.is_exhausting(self.config.concurrency) {
			let role = self.gate.enter_backoff(window.reset_in).await;

			self.metrics.record_backoff(role);
		}

		Ok(response)
	}

	fn build_request(
		&self,
		method: Method,
		path: &str,
		payload: Option<&Value>,
		query: &Query,
	) -> Result<HttpRequest> {
		let url = self.config.request_url(path, query.as_slice())?;
		let mut builder = ::http::Request::builder().uri(url.as_str()).header(ACCEPT, JSON);
		let body = match payload {
			Some(payload) if !is_read(&method) => {
				builder = builder.header(CONTENT_TYPE, JSON);

				serde_json::to_vec(payload).map_err(ConfigError::PayloadSerialize)?
			},
			_ => Vec::new(),
		};

		builder.method(method).body(body).map_err(|e| ConfigError::from(e).into())
	}
}

fn is_read(method: &Method) -> bool {
	matches!(*method, Method::GET | Method::HEAD)
}

fn decode_body<T>(response: &HttpResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	let raw = response.body().as_slice();
	let body = if raw.iter().all(u8::is_ascii_whitespace) { b"null".as_slice() } else { raw };
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| DecodeError::Json { source, status: response.status().as_u16() }.into())
}
