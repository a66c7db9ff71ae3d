use serde::{Deserialize, Serialize};

use crate::{ArchiveService, Error, Result, non_blank, require_subject};
use sta_domain::{Candidate, Resolution, ResolveCriteria, SubjectId, TestId, Year};
use sta_storage::queries;

/// Body of a resolution call. Every field is required; `year` may be `"unknown"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveRequest {
	pub subject_id: Option<SubjectId>,
	pub university: Option<String>,
	pub year: Option<Year>,
	pub semester: Option<String>,
	#[serde(rename = "type")]
	pub exam_type: Option<String>,
}
impl ResolveRequest {
	pub fn criteria(&self) -> Result<ResolveCriteria> {
		let subject_id = require_subject(self.subject_id)?;
		let required = |field: &str, value: Option<&String>| {
			non_blank(value.map(String::as_str))
				.map(str::to_string)
				.ok_or_else(|| Error::invalid_field(field, format!("{field} is required.")))
		};
		let university = required("university", self.university.as_ref())?;
		let year = self
			.year
			.ok_or_else(|| Error::invalid_field("year", "year is required."))?;
		let semester = required("semester", self.semester.as_ref())?;
		let exam_type = required("type", self.exam_type.as_ref())?;
		let criteria = ResolveCriteria { subject_id, university, year, semester, exam_type };

		criteria.validate()?;

		Ok(criteria)
	}
}

/// What callers see. An ambiguous tuple is reported as `NoMatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveOutcome {
	Found,
	NoMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveResponse {
	pub outcome: ResolveOutcome,
	pub test_id: Option<TestId>,
}
impl From<&Resolution> for ResolveResponse {
	fn from(resolution: &Resolution) -> Self {
		match resolution.test_id() {
			Some(test_id) => Self { outcome: ResolveOutcome::Found, test_id: Some(test_id) },
			None => Self { outcome: ResolveOutcome::NoMatch, test_id: None },
		}
	}
}

impl ArchiveService {
	pub async fn resolve(&self, req: ResolveRequest) -> Result<ResolveResponse> {
		let criteria = req.criteria()?;
		let resolution = self.resolve_criteria(&criteria).await?;

		Ok(ResolveResponse::from(&resolution))
	}

	/// Exact normalized match of a complete tuple. Performs no writes, so repeated calls with the
	/// same normalized input return the same result.
	pub async fn resolve_criteria(&self, criteria: &ResolveCriteria) -> Result<Resolution> {
		criteria.validate()?;

		let rows = queries::resolve_candidates(&self.db, criteria.subject_id, criteria.year).await?;
		let candidates: Vec<Candidate> = rows.into_iter().map(Candidate::from).collect();
		let resolution = Resolution::from_candidates(criteria, &candidates);

		if let Resolution::Ambiguous { test_ids } = &resolution {
			tracing::warn!(
				subject_id = criteria.subject_id,
				university = %criteria.university,
				year = %criteria.year,
				semester = %criteria.semester,
				exam_type = %criteria.exam_type,
				?test_ids,
				"Facet tuple matches more than one test; treating as no match."
			);
		}

		Ok(resolution)
	}
}
