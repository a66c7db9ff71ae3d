use serde::{Deserialize, Serialize};

use crate::{ArchiveService, Result, non_blank, require_subject};
use sta_domain::{FacetCascade, FacetLevel, FacetPrefix, FacetRow, FacetSet, SubjectId, Year};
use sta_storage::queries;

/// Query parameters of the facet cascade. Blank values count as "not chosen".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacetsRequest {
	pub subject_id: Option<SubjectId>,
	pub university: Option<String>,
	pub year: Option<String>,
	pub semester: Option<String>,
}
impl FacetsRequest {
	pub fn prefix(&self) -> Result<FacetPrefix> {
		let year = non_blank(self.year.as_deref()).map(str::parse::<Year>).transpose()?;
		let prefix = FacetPrefix {
			university: non_blank(self.university.as_deref()).map(str::to_string),
			year,
			semester: non_blank(self.semester.as_deref()).map(str::to_string),
		};

		prefix.validate()?;

		Ok(prefix)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetsResponse {
	#[serde(flatten)]
	pub cascade: FacetCascade,
	/// First level without a chosen value; its list is the one to offer next.
	pub next: FacetLevel,
}

impl ArchiveService {
	pub async fn facets(&self, req: FacetsRequest) -> Result<FacetsResponse> {
		let subject_id = require_subject(req.subject_id)?;
		let prefix = req.prefix()?;
		let rows = self.facet_rows(subject_id).await?;
		let cascade = FacetCascade::derive(&rows, &prefix)?;

		Ok(FacetsResponse { cascade, next: prefix.next_level() })
	}

	pub async fn first_level_facets(&self, subject_id: Option<SubjectId>) -> Result<FacetSet> {
		self.next_level_facets(subject_id, &FacetPrefix::default()).await
	}

	pub async fn next_level_facets(
		&self,
		subject_id: Option<SubjectId>,
		prefix: &FacetPrefix,
	) -> Result<FacetSet> {
		let subject_id = require_subject(subject_id)?;

		prefix.validate()?;

		let rows = self.facet_rows(subject_id).await?;
		let set = FacetSet::next_level(&rows, prefix)?;

		tracing::debug!(
			subject_id,
			level = %set.level,
			values = set.len(),
			"Next facet level derived."
		);

		Ok(set)
	}

	async fn facet_rows(&self, subject_id: SubjectId) -> Result<Vec<FacetRow>> {
		let rows = queries::subject_facet_rows(&self.db, subject_id).await?;

		Ok(rows.into_iter().map(FacetRow::from).collect())
	}
}
