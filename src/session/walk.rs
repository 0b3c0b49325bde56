//! Cursor pagination flattened into one lazy sequence.
//!
//! Listing endpoints answer with `{ "results": [...], "next": "...?__nonce=..&__token=.." }`.
//! [`Walk`] fetches one page at a time, hands out its items in order, and only then follows the
//! `next` link. A `next` that is absent or `null` ends the walk; a `next` without both cursor
//! parameters is an error rather than a silent end. The walk also refuses to follow a cursor it
//! has already seen and honors the configured page cap.

// std
use std::{
	collections::{HashSet, VecDeque},
	mem,
};
// crates.io
use ::http::Method;
use futures::{Stream, stream};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, PaginationError},
	session::{Query, Session},
	transport::RestHttpClient,
};

const NONCE_PARAM: &str = "__nonce";
const TOKEN_PARAM: &str = "__token";

/// Position in a paginated listing, carried by the `next` link of the previous page.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PageCursor {
	/// Value of the `__nonce` parameter.
	pub nonce: String,
	/// Value of the `__token` parameter.
	pub token: String,
}
impl PageCursor {
	/// Creates a cursor from its two parts.
	pub fn new(nonce: impl Into<String>, token: impl Into<String>) -> Self {
		Self { nonce: nonce.into(), token: token.into() }
	}

	/// Extracts the cursor from the query string of a `next` link.
	pub fn from_next(next: &str) -> Result<Self, PaginationError> {
		let query = next.split_once('?').map(|(_, query)| query).unwrap_or_default();
		let query = query.split_once('#').map(|(query, _)| query).unwrap_or(query);
		let mut nonce = None;
		let mut token = None;

		for (key, value) in form_urlencoded::parse(query.as_bytes()) {
			match key.as_ref() {
				NONCE_PARAM if nonce.is_none() => nonce = Some(value.into_owned()),
				TOKEN_PARAM if token.is_none() => token = Some(value.into_owned()),
				_ => {},
			}
		}

		let missing = |param| PaginationError::MissingCursor { param, next: next.to_owned() };

		Ok(Self {
			nonce: nonce.ok_or_else(|| missing(NONCE_PARAM))?,
			token: token.ok_or_else(|| missing(TOKEN_PARAM))?,
		})
	}

	fn append_to(&self, query: &mut Query) {
		query.push(NONCE_PARAM, &self.nonce);
		query.push(TOKEN_PARAM, &self.token);
	}
}

/// One decoded page of a listing.
#[derive(Clone, Debug, Deserialize)]
pub struct Page<T> {
	/// Items on this page, in service order.
	pub results: Vec<T>,
	/// Link to the following page; absent or `null` on the last page.
	#[serde(default)]
	pub next: Option<String>,
}

impl<C> Session<C>
where
	C: ?Sized + RestHttpClient,
{
	/// Walks the listing at `path`, `page_size` items per request, starting at `start`
	/// (`None` for the first page).
	pub fn walk<T>(&self, path: &str, page_size: usize, start: Option<PageCursor>) -> Walk<C, T>
	where
		T: DeserializeOwned,
	{
		Walk::new(self.clone(), path, page_size, start)
	}

	/// Walks the listing at `path` from the first page using the configured page size.
	pub fn hydrate(&self, path: &str) -> Walk<C, Value> {
		self.walk(path, self.config.page_size, None)
	}
}

/// Lazy, restartable sequence over every item of a paginated listing.
///
/// Drive it with [`next_item`](Self::next_item) or [`next_page`](Self::next_page), or convert it
/// with [`into_stream`](Self::into_stream). Once an error is returned the walk is finished;
/// restart by calling [`Session::walk`] again.
pub struct Walk<C, T>
where
	C: ?Sized + RestHttpClient,
{
	session: Session<C>,
	path: String,
	page_size: usize,
	filters: Query,
	step: Step,
	seen: HashSet<PageCursor>,
	pages: usize,
	buffer: VecDeque<T>,
}
impl<C, T> Walk<C, T>
where
	C: ?Sized + RestHttpClient,
	T: DeserializeOwned,
{
	fn new(session: Session<C>, path: &str, page_size: usize, start: Option<PageCursor>) -> Self {
		let mut seen = HashSet::new();
		let step = if page_size == 0 {
			Step::Fail(ConfigError::ZeroPageSize.into())
		} else {
			if let Some(cursor) = &start {
				seen.insert(cursor.clone());
			}

			Step::Fetch(start)
		};

		Self {
			session,
			path: path.to_owned(),
			page_size,
			filters: Query::new(),
			step,
			seen,
			pages: 0,
			buffer: VecDeque::new(),
		}
	}

	/// Adds filter parameters sent with every page request.
	pub fn with_query(mut self, query: Query) -> Self {
		self.filters.extend_from(&query);

		self
	}

	/// Number of pages fetched so far.
	pub fn pages_fetched(&self) -> usize {
		self.pages
	}

	/// Cursor of the next page to fetch, if the walk has not finished.
	pub fn cursor(&self) -> Option<&PageCursor> {
		match &self.step {
			Step::Fetch(cursor) => cursor.as_ref(),
			_ => None,
		}
	}

	/// Fetches the next page and returns its items, or `None` once the listing is exhausted.
	///
	/// A malformed or repeated `next` link is reported on the call after the page that carried
	/// it, so that page's items are still delivered.
	pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
		let cursor = match mem::replace(&mut self.step, Step::Done) {
			Step::Done => return Ok(None),
			Step::Fail(err) => return Err(err),
			Step::Fetch(cursor) => cursor,
		};

		if let Some(max) = self.session.config.max_pages {
			if self.pages >= max {
				return Err(PaginationError::PageLimit { max }.into());
			}
		}

		let mut query = Query::new().with("limit", self.page_size);

		if let Some(cursor) = &cursor {
			cursor.append_to(&mut query);
		}

		query.extend_from(&self.filters);

		let page = self.session.send_json::<Page<T>>(Method::GET, &self.path, None, &query).await?;

		self.pages += 1;
		self.step = match page.next {
			None => Step::Done,
			Some(next) => match PageCursor::from_next(&next) {
				Ok(cursor) if self.seen.insert(cursor.clone()) => Step::Fetch(Some(cursor)),
				Ok(_) => Step::Fail(PaginationError::RepeatedCursor { pages: self.pages }.into()),
				Err(err) => Step::Fail(err.into()),
			},
		};

		#[cfg(feature = "tracing")]
		tracing::debug!(
			path = %self.path,
			page = self.pages,
			items = page.results.len(),
			more = matches!(self.step, Step::Fetch(_)),
			"fetched page"
		);

		Ok(Some(page.results))
	}

	/// Returns the next item, fetching the following page when the current one is used up.
	pub async fn next_item(&mut self) -> Result<Option<T>> {
		loop {
			if let Some(item) = self.buffer.pop_front() {
				return Ok(Some(item));
			}

			match self.next_page().await? {
				Some(items) => self.buffer.extend(items),
				None => return Ok(None),
			}
		}
	}

	/// Drains the remaining items into a vector.
	pub async fn collect_all(mut self) -> Result<Vec<T>> {
		let mut items = Vec::new();

		while let Some(item) = self.next_item().await? {
			items.push(item);
		}

		Ok(items)
	}

	/// Converts the walk into a [`Stream`] of items that ends after the first error.
	pub fn into_stream(self) -> impl Stream<Item = Result<T>> {
		stream::try_unfold(self, |mut walk| async move {
			Ok::<_, Error>(walk.next_item().await?.map(|item| (item, walk)))
		})
	}
}
impl<C, T> Debug for Walk<C, T>
where
	C: ?Sized + RestHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Walk")
			.field("path", &self.path)
			.field("page_size", &self.page_size)
			.field("pages", &self.pages)
			.field("buffered", &self.buffer.len())
			.finish()
	}
}

#[derive(Debug)]
enum Step {
	Fetch(Option<PageCursor>),
	Fail(Error),
	Done,
}
