use sta_domain::FacetLevel;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	Domain(#[from] sta_domain::Error),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
	#[error("{error_code} ({status}): {message}")]
	Api { status: u16, error_code: String, message: String },
	#[error("A subject must be selected first.")]
	NoSubject,
	#[error("Facet level {level} is not enabled.")]
	LevelDisabled { level: FacetLevel },
	#[error("{value} is not offered at facet level {level}.")]
	UnknownOption { level: FacetLevel, value: String },
}
