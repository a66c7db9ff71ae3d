use std::{sync::Arc, time::Duration};

use crate::{ArchiveApi, RequestTokens, Result};
use sta_domain::Subject;

/// Hard cap on suggestions shown for one query.
pub const MAX_SUGGESTIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
	/// Candidates for the latest query.
	Ready(Vec<Subject>),
	/// The input is blank; nothing was queried.
	Cleared,
	/// A newer keystroke made this call irrelevant.
	Superseded,
}

/// Debounced subject search with stale-response suppression.
///
/// Every call to [`Autocomplete::suggest`] issues a token. The call only queries after the
/// debounce delay elapses with its token still current, and only reports results whose token is
/// still current when the response arrives.
pub struct Autocomplete<A> {
	api: Arc<A>,
	tokens: RequestTokens,
	debounce: Duration,
}
impl<A> Autocomplete<A>
where
	A: ArchiveApi,
{
	pub fn new(api: Arc<A>, debounce: Duration) -> Self {
		Self { api, tokens: RequestTokens::new(), debounce }
	}

	pub fn from_config(api: Arc<A>, cfg: &sta_config::Client) -> Self {
		Self::new(api, Duration::from_millis(cfg.debounce_ms))
	}

	pub async fn suggest(&self, text: &str) -> Result<Suggestion> {
		self.suggest_tracked(text).await.1
	}

	/// Like [`Autocomplete::suggest`], also returning the token the call was issued under.
	pub async fn suggest_tracked(&self, text: &str) -> (u64, Result<Suggestion>) {
		let token = self.tokens.issue();

		(token, self.query(token, text).await)
	}

	pub fn is_current(&self, token: u64) -> bool {
		self.tokens.is_current(token)
	}

	/// Retires any in-flight query, as if the input had been cleared.
	pub fn cancel(&self) {
		self.tokens.invalidate();
	}

	async fn query(&self, token: u64, text: &str) -> Result<Suggestion> {
		let query = text.trim();

		if query.is_empty() {
			return Ok(Suggestion::Cleared);
		}

		tokio::time::sleep(self.debounce).await;

		if !self.tokens.is_current(token) {
			return Ok(Suggestion::Superseded);
		}

		let outcome = self.api.search_subjects(query).await;

		if !self.tokens.is_current(token) {
			tracing::debug!(query, token, "Dropping stale autocomplete response.");

			return Ok(Suggestion::Superseded);
		}

		let mut subjects = outcome?;

		subjects.truncate(MAX_SUGGESTIONS);

		Ok(Suggestion::Ready(subjects))
	}
}
