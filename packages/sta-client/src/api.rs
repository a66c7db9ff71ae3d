use std::{future::Future, pin::Pin};

use crate::Result;
use sta_domain::{
	FacetPrefix, FacetRow, FacetSet, RatingSummary, ResolveCriteria, Subject, SubjectId, TestId,
	TestRecord,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Everything the client core needs from the archive backend.
///
/// `lookup_test` returns `Ok(None)` for a definitive "no such combination"; `Err` means the
/// lookup could not be performed at all.
pub trait ArchiveApi
where
	Self: Send + Sync,
{
	fn search_subjects<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<Subject>>>;

	fn subject_facets(&self, subject_id: SubjectId) -> BoxFuture<'_, Result<Vec<FacetRow>>>;

	/// Distinct values of the first unchosen level of `prefix`.
	fn next_level_facets<'a>(
		&'a self,
		subject_id: SubjectId,
		prefix: &'a FacetPrefix,
	) -> BoxFuture<'a, Result<FacetSet>>;

	fn lookup_test<'a>(
		&'a self,
		criteria: &'a ResolveCriteria,
	) -> BoxFuture<'a, Result<Option<TestId>>>;

	fn get_test(&self, test_id: TestId) -> BoxFuture<'_, Result<TestRecord>>;

	fn get_rating(&self, test_id: TestId) -> BoxFuture<'_, Result<RatingSummary>>;

	fn record_view(&self, test_id: TestId) -> BoxFuture<'_, Result<()>>;
}
