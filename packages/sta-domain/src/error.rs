pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Invalid year {raw:?}; expected a non-negative integer or \"unknown\".")]
	InvalidYear { raw: String },
	#[error("Facet {level} cannot be chosen before {missing}.")]
	NonContiguousPrefix { level: crate::FacetLevel, missing: crate::FacetLevel },
	#[error("Facet {level} is required.")]
	MissingFacet { level: crate::FacetLevel },
}
