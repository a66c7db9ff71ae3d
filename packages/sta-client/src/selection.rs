use crate::{Error, RequestTokens, Result};
use sta_domain::{
	FacetLevel, FacetPrefix, FacetSet, FacetValue, ResolveCriteria, Subject, SubjectId, TestId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	/// No subject chosen.
	Idle,
	/// Subject chosen, first facet level still loading.
	SubjectChosen,
	/// Some facet levels offered, no record resolved.
	NarrowingFacets,
	/// All four levels chosen and a record identified.
	Resolved,
}

/// What an outgoing request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
	Options(FacetLevel),
	Resolution,
}

/// Identifies one outgoing request; handed back with its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
	pub token: u64,
	pub target: Target,
}

/// Work the driver must perform for the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
	Facets { ticket: Ticket, subject_id: SubjectId, prefix: FacetPrefix },
	Resolve { ticket: Ticket, criteria: ResolveCriteria },
}
impl Request {
	pub fn ticket(&self) -> Ticket {
		match self {
			Self::Facets { ticket, .. } | Self::Resolve { ticket, .. } => *ticket,
		}
	}
}

/// Effect of applying a response.
#[derive(Debug)]
pub enum Update {
	/// The ticket was superseded; nothing changed.
	Stale,
	/// Options for `level` are now displayed.
	Options { level: FacetLevel },
	Resolved { test_id: TestId },
	/// The complete tuple matches no record. Not an error.
	NoMatch,
	/// The request failed; the machine stays at `level`, which can be re-chosen.
	Failed { level: FacetLevel, error: Error },
}

/// Client-side selection controller for one session.
///
/// Holds no I/O. Transitions return the [`Request`] to run; outcomes come back through
/// [`Selection::apply_facets`] and [`Selection::apply_resolution`] together with their ticket.
/// Only the latest ticket is honored, so an ancestor change or a clear discards every response
/// still in flight.
#[derive(Debug, Default)]
pub struct Selection {
	tokens: RequestTokens,
	subject: Option<Subject>,
	chosen: [Option<FacetValue>; 4],
	options: [Option<FacetSet>; 4],
	resolved: Option<TestId>,
}
impl Selection {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn phase(&self) -> Phase {
		match (&self.subject, self.resolved) {
			(None, _) => Phase::Idle,
			(Some(_), Some(_)) => Phase::Resolved,
			(Some(_), None) if self.options[FacetLevel::University.index()].is_none() =>
				Phase::SubjectChosen,
			(Some(_), None) => Phase::NarrowingFacets,
		}
	}

	pub fn subject(&self) -> Option<&Subject> {
		self.subject.as_ref()
	}

	pub fn chosen(&self, level: FacetLevel) -> Option<&FacetValue> {
		self.chosen[level.index()].as_ref()
	}

	pub fn resolved(&self) -> Option<TestId> {
		self.resolved
	}

	/// Whether any facet value has been chosen for the current subject.
	pub fn is_narrowing(&self) -> bool {
		self.chosen.iter().any(Option::is_some)
	}

	pub fn is_enabled(&self, level: FacetLevel) -> bool {
		self.subject.is_some() && self.chosen[..level.index()].iter().all(Option::is_some)
	}

	/// The contiguous prefix of levels whose every ancestor has a chosen value.
	pub fn enabled_levels(&self) -> Vec<FacetLevel> {
		FacetLevel::ALL.into_iter().take_while(|level| self.is_enabled(*level)).collect()
	}

	/// Displayed options of an enabled level; `None` while loading or when disabled.
	pub fn options(&self, level: FacetLevel) -> Option<&FacetSet> {
		if !self.is_enabled(level) {
			return None;
		}

		self.options[level.index()].as_ref()
	}

	pub fn is_current(&self, ticket: Ticket) -> bool {
		self.tokens.is_current(ticket.token)
	}

	/// Starts over with `subject` and asks for its first facet level.
	pub fn select_subject(&mut self, subject: Subject) -> Request {
		let subject_id = subject.id;

		self.reset();
		self.subject = Some(subject);

		Request::Facets {
			ticket: self.ticket(Target::Options(FacetLevel::University)),
			subject_id,
			prefix: FacetPrefix::default(),
		}
	}

	/// Chooses `value` at `level`, clearing every level below it.
	///
	/// The value must be one of the options currently displayed at `level`; the displayed
	/// spelling is what gets stored.
	pub fn choose(&mut self, level: FacetLevel, value: FacetValue) -> Result<Request> {
		let subject_id = self.subject.as_ref().map(|subject| subject.id).ok_or(Error::NoSubject)?;

		if !self.is_enabled(level) {
			return Err(Error::LevelDisabled { level });
		}

		let offered = self.options[level.index()]
			.as_ref()
			.and_then(|set| set.find(&value))
			.cloned()
			.ok_or_else(|| Error::UnknownOption { level, value: value.to_string() })?;

		for below in &mut self.chosen[level.index()..] {
			*below = None;
		}
		for below in &mut self.options[level.index() + 1..] {
			*below = None;
		}

		self.resolved = None;
		self.chosen[level.index()] = Some(offered);

		match level.next() {
			Some(next) => Ok(Request::Facets {
				ticket: self.ticket(Target::Options(next)),
				subject_id,
				prefix: self.prefix(),
			}),
			None => Ok(Request::Resolve {
				ticket: self.ticket(Target::Resolution),
				criteria: self.criteria(subject_id)?,
			}),
		}
	}

	/// Back to `Idle`; every in-flight response becomes stale.
	pub fn clear(&mut self) {
		self.reset();
	}

	pub fn apply_facets(&mut self, ticket: Ticket, outcome: Result<FacetSet>) -> Update {
		let Target::Options(level) = ticket.target else {
			return Update::Stale;
		};

		if !self.is_current(ticket) {
			tracing::debug!(token = ticket.token, %level, "Dropping stale facet response.");

			return Update::Stale;
		}

		let outcome = outcome.and_then(|set| {
			if set.level == level {
				Ok(set)
			} else {
				Err(Error::InvalidResponse {
					message: format!("Expected {level} options but received {}.", set.level),
				})
			}
		});

		match outcome {
			Ok(set) => {
				self.options[level.index()] = Some(set);

				Update::Options { level }
			},
			Err(error) => {
				// The choice that asked for these options is not committed.
				if let Some(parent) = level.previous() {
					self.chosen[parent.index()] = None;
				}

				Update::Failed { level: level.previous().unwrap_or(level), error }
			},
		}
	}

	pub fn apply_resolution(&mut self, ticket: Ticket, outcome: Result<Option<TestId>>) -> Update {
		if ticket.target != Target::Resolution || !self.is_current(ticket) {
			tracing::debug!(token = ticket.token, "Dropping stale resolution response.");

			return Update::Stale;
		}

		match outcome {
			Ok(Some(test_id)) => {
				self.resolved = Some(test_id);

				Update::Resolved { test_id }
			},
			Ok(None) => Update::NoMatch,
			Err(error) => {
				self.chosen[FacetLevel::Type.index()] = None;

				Update::Failed { level: FacetLevel::Type, error }
			},
		}
	}

	fn ticket(&self, target: Target) -> Ticket {
		Ticket { token: self.tokens.issue(), target }
	}

	fn reset(&mut self) {
		self.tokens.invalidate();
		self.subject = None;
		self.chosen = Default::default();
		self.options = Default::default();
		self.resolved = None;
	}

	fn prefix(&self) -> FacetPrefix {
		FacetPrefix {
			university: self.text(FacetLevel::University),
			year: self.chosen(FacetLevel::Year).and_then(FacetValue::as_year),
			semester: self.text(FacetLevel::Semester),
		}
	}

	fn criteria(&self, subject_id: SubjectId) -> Result<ResolveCriteria> {
		let missing = |level| Error::Domain(sta_domain::Error::MissingFacet { level });
		let prefix = self.prefix();

		Ok(ResolveCriteria {
			subject_id,
			university: prefix.university.ok_or_else(|| missing(FacetLevel::University))?,
			year: prefix.year.ok_or_else(|| missing(FacetLevel::Year))?,
			semester: prefix.semester.ok_or_else(|| missing(FacetLevel::Semester))?,
			exam_type: self.text(FacetLevel::Type).ok_or_else(|| missing(FacetLevel::Type))?,
		})
	}

	fn text(&self, level: FacetLevel) -> Option<String> {
		self.chosen(level).and_then(FacetValue::as_text).map(str::to_string)
	}
}
