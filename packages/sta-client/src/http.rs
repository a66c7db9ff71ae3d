use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{ArchiveApi, BoxFuture, Error, Result};
use sta_domain::{
	FacetCascade, FacetPrefix, FacetRow, FacetSet, RatingSummary, ResolveCriteria, Subject,
	SubjectId, TestId, TestRecord,
};

#[derive(Debug, Deserialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum LookupOutcome {
	Found,
	NoMatch,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
	outcome: LookupOutcome,
	test_id: Option<TestId>,
}

/// [`ArchiveApi`] over the JSON HTTP surface of `sta-api`.
#[derive(Debug, Clone)]
pub struct HttpArchiveApi {
	client: Client,
	api_base: String,
}
impl HttpArchiveApi {
	pub fn new(cfg: &sta_config::Client) -> Result<Self> {
		if cfg.api_base.trim().is_empty() {
			return Err(Error::InvalidConfig {
				message: "client.api_base must be non-empty.".to_string(),
			});
		}

		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self { client, api_base: cfg.api_base.trim_end_matches('/').to_string() })
	}

	fn url(&self, path: &str) -> String {
		format!("{}{path}", self.api_base)
	}

	async fn send<T>(&self, request: RequestBuilder) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let res = request.send().await?;
		let status = res.status();

		if !status.is_success() {
			let bytes = res.bytes().await?;

			return Err(match serde_json::from_slice::<ErrorBody>(&bytes) {
				Ok(body) => Error::Api {
					status: status.as_u16(),
					error_code: body.error_code,
					message: body.message,
				},
				Err(_) => Error::InvalidResponse {
					message: format!("Archive API returned {status} without an error body."),
				},
			});
		}

		Ok(res.json().await?)
	}

	async fn search(&self, text: &str) -> Result<Vec<Subject>> {
		let request =
			self.client.get(self.url("/api/subjects/autocomplete")).query(&[("q", text)]);

		self.send(request).await
	}

	async fn rows(&self, subject_id: SubjectId) -> Result<Vec<FacetRow>> {
		require_subject(subject_id)?;

		let request = self.client.get(self.url(&format!("/api/subjects/{subject_id}/filters")));

		self.send(request).await
	}

	async fn cascade(&self, subject_id: SubjectId, prefix: &FacetPrefix) -> Result<FacetSet> {
		require_subject(subject_id)?;
		prefix.validate()?;

		let mut query = vec![("subject_id", subject_id.to_string())];

		if let Some(university) = &prefix.university {
			query.push(("university", university.clone()));
		}
		if let Some(year) = prefix.year {
			query.push(("year", year.to_string()));
		}
		if let Some(semester) = &prefix.semester {
			query.push(("semester", semester.clone()));
		}

		let request = self.client.get(self.url("/api/tests/filters")).query(&query);
		let cascade: FacetCascade = self.send(request).await?;

		Ok(cascade.level(prefix.next_level()))
	}

	async fn lookup(&self, criteria: &ResolveCriteria) -> Result<Option<TestId>> {
		require_subject(criteria.subject_id)?;
		criteria.validate()?;

		let request = self.client.post(self.url("/api/tests/resolve")).json(criteria);
		let response: LookupResponse = self.send(request).await?;

		match (response.outcome, response.test_id) {
			(LookupOutcome::Found, Some(test_id)) => Ok(Some(test_id)),
			(LookupOutcome::NoMatch, _) => Ok(None),
			(LookupOutcome::Found, None) => Err(Error::InvalidResponse {
				message: "Resolve response is found but carries no test_id.".to_string(),
			}),
		}
	}

	async fn test(&self, test_id: TestId) -> Result<TestRecord> {
		self.send(self.client.get(self.url(&format!("/api/tests/{test_id}")))).await
	}

	async fn rating(&self, test_id: TestId) -> Result<RatingSummary> {
		self.send(self.client.get(self.url(&format!("/api/tests/{test_id}/rating")))).await
	}

	async fn view(&self, test_id: TestId) -> Result<()> {
		let _: serde_json::Value =
			self.send(self.client.post(self.url(&format!("/api/tests/{test_id}/view")))).await?;

		Ok(())
	}
}

impl ArchiveApi for HttpArchiveApi {
	fn search_subjects<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<Subject>>> {
		Box::pin(self.search(text))
	}

	fn subject_facets(&self, subject_id: SubjectId) -> BoxFuture<'_, Result<Vec<FacetRow>>> {
		Box::pin(self.rows(subject_id))
	}

	fn next_level_facets<'a>(
		&'a self,
		subject_id: SubjectId,
		prefix: &'a FacetPrefix,
	) -> BoxFuture<'a, Result<FacetSet>> {
		Box::pin(self.cascade(subject_id, prefix))
	}

	fn lookup_test<'a>(
		&'a self,
		criteria: &'a ResolveCriteria,
	) -> BoxFuture<'a, Result<Option<TestId>>> {
		Box::pin(self.lookup(criteria))
	}

	fn get_test(&self, test_id: TestId) -> BoxFuture<'_, Result<TestRecord>> {
		Box::pin(self.test(test_id))
	}

	fn get_rating(&self, test_id: TestId) -> BoxFuture<'_, Result<RatingSummary>> {
		Box::pin(self.rating(test_id))
	}

	fn record_view(&self, test_id: TestId) -> BoxFuture<'_, Result<()>> {
		Box::pin(self.view(test_id))
	}
}

/// Contract check made before any request leaves the process.
fn require_subject(subject_id: SubjectId) -> Result<()> {
	if subject_id <= 0 {
		return Err(Error::NoSubject);
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn cfg(api_base: &str) -> sta_config::Client {
		sta_config::Client { api_base: api_base.to_string(), debounce_ms: 200, timeout_ms: 1_000 }
	}

	#[test]
	fn trailing_slash_is_dropped_from_base() {
		let api = HttpArchiveApi::new(&cfg("http://localhost:8080/")).expect("client");

		assert_eq!(api.url("/health"), "http://localhost:8080/health");
	}

	#[test]
	fn blank_base_is_rejected() {
		assert!(matches!(HttpArchiveApi::new(&cfg("  ")), Err(Error::InvalidConfig { .. })));
	}

	#[tokio::test]
	async fn missing_subject_never_leaves_the_process() {
		// Port 9 is discard; a request would fail with a transport error instead.
		let api = HttpArchiveApi::new(&cfg("http://127.0.0.1:9")).expect("client");
		let prefix = FacetPrefix::default();

		assert!(matches!(api.next_level_facets(0, &prefix).await, Err(Error::NoSubject)));
		assert!(matches!(api.subject_facets(-1).await, Err(Error::NoSubject)));
	}
}
