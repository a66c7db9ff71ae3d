use time::OffsetDateTime;

use sta_domain::{Candidate, FacetRow, RatingSummary, Subject, TestRecord, Year};

#[derive(Debug, sqlx::FromRow)]
pub struct SubjectRow {
	pub subject_id: i64,
	pub code: String,
	pub name: String,
}
impl From<SubjectRow> for Subject {
	fn from(row: SubjectRow) -> Self {
		Subject::new(row.subject_id, row.code, row.name)
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct TestRow {
	pub test_id: i64,
	pub subject_id: i64,
	pub university: String,
	pub year: Option<i32>,
	pub semester: String,
	pub r#type: String,
	pub title: String,
	pub drive_embed_url: String,
	pub views: i64,
	pub created_at: OffsetDateTime,
}
impl From<TestRow> for TestRecord {
	fn from(row: TestRow) -> Self {
		TestRecord {
			id: row.test_id,
			subject_id: row.subject_id,
			university: row.university,
			year: Year::from_db(row.year),
			semester: row.semester,
			exam_type: row.r#type,
			title: row.title,
			drive_embed_url: row.drive_embed_url,
			views: row.views,
			created_at: row.created_at,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct FacetRowRecord {
	pub university: String,
	pub year: Option<i32>,
	pub semester: String,
	pub r#type: String,
}
impl From<FacetRowRecord> for FacetRow {
	fn from(row: FacetRowRecord) -> Self {
		FacetRow {
			university: row.university,
			year: Year::from_db(row.year),
			semester: row.semester,
			exam_type: row.r#type,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct CandidateRow {
	pub test_id: i64,
	pub subject_id: i64,
	pub university: String,
	pub year: Option<i32>,
	pub semester: String,
	pub r#type: String,
}
impl From<CandidateRow> for Candidate {
	fn from(row: CandidateRow) -> Self {
		Candidate {
			test_id: row.test_id,
			subject_id: row.subject_id,
			row: FacetRow {
				university: row.university,
				year: Year::from_db(row.year),
				semester: row.semester,
				exam_type: row.r#type,
			},
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct RatingRow {
	pub avg_rating: f32,
	pub total_reviews: i64,
}
impl From<RatingRow> for RatingSummary {
	fn from(row: RatingRow) -> Self {
		RatingSummary { avg_rating: row.avg_rating, total_reviews: row.total_reviews }
	}
}

/// Input for inserting one archived test.
#[derive(Debug, Clone)]
pub struct NewTest<'a> {
	pub subject_id: i64,
	pub university: &'a str,
	pub year: Year,
	pub semester: &'a str,
	pub exam_type: &'a str,
	pub title: &'a str,
	pub drive_embed_url: &'a str,
}

/// Listing filters. Text facets are already normalized comparison keys.
#[derive(Debug, Clone, Default)]
pub struct TestFilter<'a> {
	pub subject_id: Option<i64>,
	pub university: Option<&'a str>,
	pub year: Option<Year>,
	pub semester: Option<&'a str>,
	pub exam_type: Option<&'a str>,
	pub title: Option<&'a str>,
	pub limit: u32,
}
