use serde::{Deserialize, Serialize};

use crate::{ArchiveService, Error, Result, non_blank};
use sta_domain::{RatingSummary, SubjectId, TestId, TestRecord, Year, normalize_facet};
use sta_storage::{models::TestFilter, queries};

/// Listing filters. Text facets use the shared facet normalization; `query` matches titles.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestSearchRequest {
	pub query: Option<String>,
	pub subject_id: Option<SubjectId>,
	pub university: Option<String>,
	pub year: Option<String>,
	pub semester: Option<String>,
	#[serde(rename = "type")]
	pub exam_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordViewResponse {
	pub views: i64,
}

impl ArchiveService {
	pub async fn get_test(&self, test_id: TestId) -> Result<TestRecord> {
		let row = queries::get_test(&self.db, test_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: format!("test {test_id}") })?;

		Ok(row.into())
	}

	/// Rating summary of a test; a test nobody rated reads as zero reviews.
	pub async fn get_rating(&self, test_id: TestId) -> Result<RatingSummary> {
		let rating = queries::get_rating(&self.db, test_id).await?;

		Ok(rating.map(RatingSummary::from).unwrap_or_default())
	}

	pub async fn record_view(&self, test_id: TestId) -> Result<RecordViewResponse> {
		let views = queries::increment_views(&self.db, test_id).await?;

		tracing::debug!(test_id, views, "Test view recorded.");

		Ok(RecordViewResponse { views })
	}

	pub async fn search_tests(&self, req: TestSearchRequest) -> Result<Vec<TestRecord>> {
		let year = non_blank(req.year.as_deref()).map(str::parse::<Year>).transpose()?;
		let key = |value: &Option<String>| non_blank(value.as_deref()).map(normalize_facet);
		let university = key(&req.university);
		let semester = key(&req.semester);
		let exam_type = key(&req.exam_type);
		let filter = TestFilter {
			subject_id: req.subject_id,
			university: university.as_deref(),
			year,
			semester: semester.as_deref(),
			exam_type: exam_type.as_deref(),
			title: req.query.as_deref(),
			limit: self.cfg.search.test_list_limit,
		};
		let rows = queries::list_tests(&self.db, &filter).await?;

		Ok(rows.into_iter().map(TestRecord::from).collect())
	}
}
