use std::{collections::HashSet, sync::Arc, time::Duration};

use tokio::sync::{Mutex, mpsc};

use crate::{
	ArchiveApi, Autocomplete, Result, Suggestion,
	selection::{Request, Selection, Ticket, Update},
};
use sta_domain::{
	FacetLevel, FacetValue, RatingSummary, ResolveCriteria, Subject, TestId, TestRecord,
};

/// What the presentation layer is told.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
	Suggestions(Vec<Subject>),
	SuggestionsCleared,
	Options { level: FacetLevel, values: Vec<FacetValue> },
	Resolved { record: TestRecord, rating: RatingSummary },
	/// The complete tuple matches nothing; show no document.
	NoMatch,
	/// A request failed. `level` is where the selection stays, if any.
	TransientError { level: Option<FacetLevel>, message: String },
	/// Back to the empty selection.
	Reset,
}

/// One user's search-and-narrow session.
///
/// Methods may be called concurrently from separate tasks; a call that is overtaken by a newer
/// one simply produces no event.
pub struct Session<A> {
	api: Arc<A>,
	autocomplete: Autocomplete<A>,
	selection: Mutex<Selection>,
	viewed: Mutex<HashSet<TestId>>,
	events: mpsc::UnboundedSender<SessionEvent>,
}
impl<A> Session<A>
where
	A: 'static + ArchiveApi,
{
	pub fn new(api: Arc<A>, debounce: Duration) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
		let (events, rx) = mpsc::unbounded_channel();
		let session = Self {
			autocomplete: Autocomplete::new(api.clone(), debounce),
			api,
			selection: Mutex::new(Selection::new()),
			viewed: Mutex::new(HashSet::new()),
			events,
		};

		(session, rx)
	}

	pub fn from_config(
		api: Arc<A>,
		cfg: &sta_config::Client,
	) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
		Self::new(api, Duration::from_millis(cfg.debounce_ms))
	}

	/// Feeds the current search text.
	///
	/// Clearing the text before any facet was chosen also drops the selected subject.
	pub async fn input(&self, text: &str) {
		let (token, outcome) = self.autocomplete.suggest_tracked(text).await;
		let mut selection = self.selection.lock().await;

		// A subject pick or reset may have landed while this call waited for the lock.
		if !self.autocomplete.is_current(token) {
			return;
		}

		match outcome {
			Ok(Suggestion::Ready(subjects)) => self.emit(SessionEvent::Suggestions(subjects)),
			Ok(Suggestion::Cleared) => {
				self.emit(SessionEvent::SuggestionsCleared);

				if selection.subject().is_some() && !selection.is_narrowing() {
					selection.clear();
					self.emit(SessionEvent::Reset);
				}
			},
			Ok(Suggestion::Superseded) => {},
			Err(err) => {
				tracing::warn!(error = %err, "Subject search failed.");

				self.emit(SessionEvent::TransientError { level: None, message: err.to_string() });
			},
		}
	}

	pub async fn select_subject(&self, subject: Subject) {
		let request = {
			let mut selection = self.selection.lock().await;

			self.autocomplete.cancel();

			selection.select_subject(subject)
		};

		self.run(request).await;
	}

	/// Chooses a displayed value. Contract violations are returned without any request.
	pub async fn choose(&self, level: FacetLevel, value: FacetValue) -> Result<()> {
		let request = self.selection.lock().await.choose(level, value)?;

		self.run(request).await;

		Ok(())
	}

	pub async fn clear(&self) {
		let mut selection = self.selection.lock().await;

		self.autocomplete.cancel();
		selection.clear();
		self.emit(SessionEvent::Reset);
	}

	/// Read access to the current selection state.
	pub async fn with_selection<T>(&self, f: impl FnOnce(&Selection) -> T) -> T {
		f(&*self.selection.lock().await)
	}

	/// Applies the response and reports it under one lock, so events stay in state order.
	async fn run(&self, request: Request) {
		match request {
			Request::Facets { ticket, subject_id, prefix } => {
				let outcome = self.api.next_level_facets(subject_id, &prefix).await;
				let mut selection = self.selection.lock().await;

				match selection.apply_facets(ticket, outcome) {
					Update::Options { level } => {
						let values =
							selection.options(level).map(|set| set.values.clone()).unwrap_or_default();

						self.emit(SessionEvent::Options { level, values });
					},
					update => self.report(update),
				}
			},
			Request::Resolve { ticket, criteria } => self.resolve(ticket, criteria).await,
		}
	}

	async fn resolve(&self, ticket: Ticket, criteria: ResolveCriteria) {
		let outcome = self.fetch_resolution(&criteria).await;
		let (lookup, shown) = match outcome {
			Ok(Some((record, rating))) => (Ok(Some(record.id)), Some((record, rating))),
			Ok(None) => (Ok(None), None),
			Err(err) => (Err(err), None),
		};
		let viewed = {
			let mut selection = self.selection.lock().await;

			match (selection.apply_resolution(ticket, lookup), shown) {
				(Update::Resolved { test_id }, Some((record, rating))) => {
					self.emit(SessionEvent::Resolved { record, rating });

					Some(test_id)
				},
				(update, _) => {
					self.report(update);

					None
				},
			}
		};

		if let Some(test_id) = viewed {
			self.mark_viewed(test_id).await;
		}
	}

	/// Lookup plus everything needed to display the hit.
	async fn fetch_resolution(
		&self,
		criteria: &ResolveCriteria,
	) -> Result<Option<(TestRecord, RatingSummary)>> {
		let Some(test_id) = self.api.lookup_test(criteria).await? else {
			return Ok(None);
		};
		let (record, rating) =
			tokio::join!(self.api.get_test(test_id), self.api.get_rating(test_id));
		let rating = rating.unwrap_or_else(|err| {
			tracing::warn!(test_id, error = %err, "Rating unavailable; showing none.");

			RatingSummary::default()
		});

		Ok(Some((record?, rating)))
	}

	/// Records a view at most once per test for this session.
	async fn mark_viewed(&self, test_id: TestId) {
		if !self.viewed.lock().await.insert(test_id) {
			return;
		}

		let api = self.api.clone();

		tokio::spawn(async move {
			if let Err(err) = api.record_view(test_id).await {
				tracing::warn!(test_id, error = %err, "Failed to record view.");
			}
		});
	}

	fn report(&self, update: Update) {
		match update {
			Update::Stale | Update::Options { .. } | Update::Resolved { .. } => {},
			Update::NoMatch => self.emit(SessionEvent::NoMatch),
			Update::Failed { level, error } => {
				tracing::warn!(%level, error = %error, "Facet request failed.");

				self.emit(SessionEvent::TransientError {
					level: Some(level),
					message: error.to_string(),
				});
			},
		}
	}

	fn emit(&self, event: SessionEvent) {
		if self.events.send(event).is_err() {
			tracing::debug!("Session event receiver dropped.");
		}
	}
}
