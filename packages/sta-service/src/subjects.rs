use serde::Deserialize;

use crate::{ArchiveService, Result, non_blank, require_subject};
use sta_domain::{FacetRow, Subject, SubjectId};
use sta_storage::queries;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutocompleteRequest {
	#[serde(default)]
	pub q: Option<String>,
}

impl ArchiveService {
	/// Subjects whose code or name contains the query, case-insensitively.
	///
	/// A blank query returns nothing without touching the store.
	pub async fn autocomplete(&self, req: AutocompleteRequest) -> Result<Vec<Subject>> {
		let Some(query) = non_blank(req.q.as_deref()) else {
			return Ok(Vec::new());
		};
		let rows =
			queries::search_subjects(&self.db, query, self.cfg.search.autocomplete_limit).await?;

		tracing::debug!(query, matches = rows.len(), "Autocomplete query served.");

		Ok(rows.into_iter().map(Subject::from).collect())
	}

	pub async fn all_subjects(&self) -> Result<Vec<Subject>> {
		let rows = queries::list_subjects(&self.db).await?;

		Ok(rows.into_iter().map(Subject::from).collect())
	}

	/// Raw distinct facet rows for a subject; an unknown subject simply has none.
	pub async fn subject_facets(&self, subject_id: Option<SubjectId>) -> Result<Vec<FacetRow>> {
		let subject_id = require_subject(subject_id)?;
		let rows = queries::subject_facet_rows(&self.db, subject_id).await?;

		Ok(rows.into_iter().map(FacetRow::from).collect())
	}
}
