use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{FacetRow, SubjectId, TestId, Year};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
	pub id: SubjectId,
	pub code: String,
	pub name: String,
	pub title: String,
}
impl Subject {
	pub fn new(id: SubjectId, code: impl Into<String>, name: impl Into<String>) -> Self {
		let code = code.into();
		let name = name.into();
		let title = format!("{code} - {name}");

		Self { id, code, name, title }
	}

	/// Case-insensitive substring match on code or name.
	pub fn matches_query(&self, query: &str) -> bool {
		let needle = query.trim().to_lowercase();

		if needle.is_empty() {
			return false;
		}

		self.code.to_lowercase().contains(&needle) || self.name.to_lowercase().contains(&needle)
	}
}

/// One archived exam document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
	pub id: TestId,
	pub subject_id: SubjectId,
	pub university: String,
	pub year: Year,
	pub semester: String,
	#[serde(rename = "type")]
	pub exam_type: String,
	pub title: String,
	pub drive_embed_url: String,
	pub views: i64,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
impl TestRecord {
	pub fn facet_row(&self) -> FacetRow {
		FacetRow {
			university: self.university.clone(),
			year: self.year,
			semester: self.semester.clone(),
			exam_type: self.exam_type.clone(),
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
	pub avg_rating: f32,
	pub total_reviews: i64,
}
