use sqlx::QueryBuilder;

use crate::{
	Error, Result,
	db::Db,
	models::{CandidateRow, FacetRowRecord, NewTest, RatingRow, SubjectRow, TestFilter, TestRow},
};
use sta_domain::Year;

const TEST_COLUMNS: &str = "\
test_id, subject_id, university, year, semester, type, title, drive_embed_url, views, created_at";

/// Escapes `%`, `_` and `\` so user text is matched literally inside an `ILIKE` pattern.
pub fn escape_like(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());

	for ch in raw.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			out.push('\\');
		}

		out.push(ch);
	}

	out
}

pub async fn search_subjects(db: &Db, query: &str, limit: u32) -> Result<Vec<SubjectRow>> {
	let pattern = format!("%{}%", escape_like(query));
	let rows = sqlx::query_as::<_, SubjectRow>(
		"\
SELECT subject_id, code, name
FROM subjects
WHERE code ILIKE $1 ESCAPE '\\' OR name ILIKE $1 ESCAPE '\\'
ORDER BY code ASC, subject_id ASC
LIMIT $2",
	)
	.bind(pattern)
	.bind(i64::from(limit))
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn list_subjects(db: &Db) -> Result<Vec<SubjectRow>> {
	let rows = sqlx::query_as::<_, SubjectRow>(
		"SELECT subject_id, code, name FROM subjects ORDER BY code ASC, subject_id ASC",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Distinct raw facet tuples of a subject, in the order they were first archived.
pub async fn subject_facet_rows(db: &Db, subject_id: i64) -> Result<Vec<FacetRowRecord>> {
	let rows = sqlx::query_as::<_, FacetRowRecord>(
		"\
SELECT university, year, semester, type
FROM tests
WHERE subject_id = $1
GROUP BY university, year, semester, type
ORDER BY min(test_id) ASC",
	)
	.bind(subject_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Every test of `subject_id` recorded under exactly `year`. An unknown year only matches NULL.
pub async fn resolve_candidates(db: &Db, subject_id: i64, year: Year) -> Result<Vec<CandidateRow>> {
	let rows = sqlx::query_as::<_, CandidateRow>(
		"\
SELECT test_id, subject_id, university, year, semester, type
FROM tests
WHERE subject_id = $1
	AND year IS NOT DISTINCT FROM $2
ORDER BY test_id ASC",
	)
	.bind(subject_id)
	.bind(year.to_db())
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn get_test(db: &Db, test_id: i64) -> Result<Option<TestRow>> {
	let sql = format!("SELECT {TEST_COLUMNS} FROM tests WHERE test_id = $1");
	let row = sqlx::query_as::<_, TestRow>(&sql).bind(test_id).fetch_optional(&db.pool).await?;

	Ok(row)
}

pub async fn get_rating(db: &Db, test_id: i64) -> Result<Option<RatingRow>> {
	let row = sqlx::query_as::<_, RatingRow>(
		"SELECT avg_rating, total_reviews FROM test_ratings WHERE test_id = $1",
	)
	.bind(test_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(row)
}

pub async fn increment_views(db: &Db, test_id: i64) -> Result<i64> {
	let views: Option<i64> =
		sqlx::query_scalar("UPDATE tests SET views = views + 1 WHERE test_id = $1 RETURNING views")
			.bind(test_id)
			.fetch_optional(&db.pool)
			.await?;

	views.ok_or_else(|| Error::NotFound(format!("test {test_id}")))
}

/// SQL counterpart of `sta_domain::normalize_facet` for `column`.
fn facet_key(column: &str) -> String {
	format!("lower(btrim(regexp_replace(normalize({column}, NFKC), '\\s+', ' ', 'g')))")
}

/// Tests matching `filter`, newest first, at most `filter.limit` rows.
pub async fn list_tests(db: &Db, filter: &TestFilter<'_>) -> Result<Vec<TestRow>> {
	let mut builder = QueryBuilder::new(format!("SELECT {TEST_COLUMNS} FROM tests WHERE TRUE"));

	if let Some(subject_id) = filter.subject_id {
		builder.push(" AND subject_id = ");
		builder.push_bind(subject_id);
	}
	if let Some(year) = filter.year {
		builder.push(" AND year IS NOT DISTINCT FROM ");
		builder.push_bind(year.to_db());
	}

	for (column, key) in
		[("university", filter.university), ("semester", filter.semester), ("type", filter.exam_type)]
	{
		if let Some(key) = key {
			builder.push(format!(" AND {} = ", facet_key(column)));
			builder.push_bind(key.to_string());
		}
	}

	if let Some(title) = filter.title.map(str::trim).filter(|title| !title.is_empty()) {
		builder.push(" AND title ILIKE ");
		builder.push_bind(format!("%{}%", escape_like(title)));
		builder.push(" ESCAPE '\\'");
	}

	builder.push(" ORDER BY created_at DESC, test_id DESC LIMIT ");
	builder.push_bind(i64::from(filter.limit));

	let rows = builder.build_query_as::<TestRow>().fetch_all(&db.pool).await?;

	Ok(rows)
}

pub async fn insert_subject(db: &Db, code: &str, name: &str) -> Result<i64> {
	if code.trim().is_empty() {
		return Err(Error::InvalidArgument("subject code must be non-empty".to_string()));
	}

	let subject_id = sqlx::query_scalar(
		"INSERT INTO subjects (code, name) VALUES ($1, $2) RETURNING subject_id",
	)
	.bind(code)
	.bind(name)
	.fetch_one(&db.pool)
	.await?;

	Ok(subject_id)
}

pub async fn insert_test(db: &Db, test: &NewTest<'_>) -> Result<i64> {
	let test_id = sqlx::query_scalar(
		"\
INSERT INTO tests (subject_id, university, year, semester, type, title, drive_embed_url)
VALUES ($1, $2, $3, $4, $5, $6, $7)
RETURNING test_id",
	)
	.bind(test.subject_id)
	.bind(test.university)
	.bind(test.year.to_db())
	.bind(test.semester)
	.bind(test.exam_type)
	.bind(test.title)
	.bind(test.drive_embed_url)
	.fetch_one(&db.pool)
	.await?;

	Ok(test_id)
}

pub async fn upsert_rating(db: &Db, test_id: i64, avg_rating: f32, total_reviews: i64) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO test_ratings (test_id, avg_rating, total_reviews)
VALUES ($1, $2, $3)
ON CONFLICT (test_id) DO UPDATE
SET avg_rating = EXCLUDED.avg_rating, total_reviews = EXCLUDED.total_reviews",
	)
	.bind(test_id)
	.bind(avg_rating)
	.bind(total_reviews)
	.execute(&db.pool)
	.await?;

	Ok(())
}
