pub mod facets;
pub mod records;
pub mod resolve;
pub mod subjects;

mod error;

pub use error::{Error, Result};
pub use facets::{FacetsRequest, FacetsResponse};
pub use records::{RecordViewResponse, TestSearchRequest};
pub use resolve::{ResolveOutcome, ResolveRequest, ResolveResponse};
pub use subjects::AutocompleteRequest;

use sta_config::Config;
use sta_domain::SubjectId;
use sta_storage::db::Db;

/// Server-side facet resolution over the archive store.
///
/// Holds no per-session state; every operation is an independent read (or, for views, a single
/// counter update) against the pool.
pub struct ArchiveService {
	pub cfg: Config,
	pub db: Db,
}
impl ArchiveService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db }
	}
}

/// Rejects a missing subject before any store call is made.
pub(crate) fn require_subject(subject_id: Option<SubjectId>) -> Result<SubjectId> {
	match subject_id {
		Some(subject_id) if subject_id > 0 => Ok(subject_id),
		Some(_) => Err(Error::invalid_field("subject_id", "subject_id must be positive.")),
		None => Err(Error::invalid_field("subject_id", "subject_id is required.")),
	}
}

/// Treats absent and blank text parameters the same way.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}
