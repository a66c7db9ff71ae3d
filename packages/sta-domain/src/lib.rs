pub mod facet;
pub mod normalize;
pub mod record;
pub mod resolve;
pub mod time_serde;
pub mod year;

mod error;

pub use error::{Error, Result};
pub use facet::{FacetCascade, FacetLevel, FacetPrefix, FacetRow, FacetSet, FacetValue};
pub use normalize::{display_facet, facet_eq, normalize_facet};
pub use record::{RatingSummary, Subject, TestRecord};
pub use resolve::{Candidate, Resolution, ResolveCriteria};
pub use year::Year;

pub type SubjectId = i64;
pub type TestId = i64;
