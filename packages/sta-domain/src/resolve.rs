use serde::{Deserialize, Serialize};

use crate::{Error, FacetLevel, FacetPrefix, FacetRow, Result, SubjectId, TestId, Year, normalize_facet};

/// A complete facet tuple. Every field is required; the year may be the unknown sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveCriteria {
	pub subject_id: SubjectId,
	pub university: String,
	pub year: Year,
	pub semester: String,
	#[serde(rename = "type")]
	pub exam_type: String,
}
impl ResolveCriteria {
	pub fn validate(&self) -> Result<()> {
		for (level, value) in [
			(FacetLevel::University, &self.university),
			(FacetLevel::Semester, &self.semester),
			(FacetLevel::Type, &self.exam_type),
		] {
			if normalize_facet(value).is_empty() {
				return Err(Error::MissingFacet { level });
			}
		}

		Ok(())
	}

	pub fn prefix(&self) -> FacetPrefix {
		FacetPrefix::default()
			.with_university(self.university.clone())
			.with_year(self.year)
			.with_semester(self.semester.clone())
	}

	pub fn matches(&self, candidate: &Candidate) -> bool {
		candidate.subject_id == self.subject_id
			&& self.prefix().matches(&candidate.row)
			&& normalize_facet(&self.exam_type) == normalize_facet(&candidate.row.exam_type)
	}
}

/// A stored record considered during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
	pub test_id: TestId,
	pub subject_id: SubjectId,
	pub row: FacetRow,
}

/// Outcome of resolving a complete facet tuple.
///
/// `Ambiguous` means the one-record-per-tuple invariant is broken in the stored data. Callers
/// must treat it as "not found" and never pick one of the candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
	Found { test_id: TestId },
	NoMatch,
	Ambiguous { test_ids: Vec<TestId> },
}
impl Resolution {
	pub fn from_candidates<'a>(
		criteria: &ResolveCriteria,
		candidates: impl IntoIterator<Item = &'a Candidate>,
	) -> Self {
		let mut test_ids: Vec<TestId> = candidates
			.into_iter()
			.filter(|candidate| criteria.matches(candidate))
			.map(|candidate| candidate.test_id)
			.collect();

		test_ids.sort_unstable();
		test_ids.dedup();

		match test_ids.as_slice() {
			[] => Self::NoMatch,
			[test_id] => Self::Found { test_id: *test_id },
			_ => Self::Ambiguous { test_ids },
		}
	}

	pub fn test_id(&self) -> Option<TestId> {
		match self {
			Self::Found { test_id } => Some(*test_id),
			Self::NoMatch | Self::Ambiguous { .. } => None,
		}
	}

	pub fn is_ambiguous(&self) -> bool {
		matches!(self, Self::Ambiguous { .. })
	}
}
