use sta_domain::FacetLevel;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String, field: Option<String> },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	pub fn invalid(message: impl Into<String>) -> Self {
		Self::InvalidRequest { message: message.into(), field: None }
	}

	/// An invalid request blamed on one named input.
	pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidRequest { message: message.into(), field: Some(field.into()) }
	}
}

impl From<sta_storage::Error> for Error {
	fn from(err: sta_storage::Error) -> Self {
		match err {
			sta_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			sta_storage::Error::InvalidArgument(message) => Self::invalid(message),
			sta_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}

impl From<sta_domain::Error> for Error {
	fn from(err: sta_domain::Error) -> Self {
		let field = match &err {
			sta_domain::Error::InvalidYear { .. } => FacetLevel::Year,
			sta_domain::Error::NonContiguousPrefix { level, .. } => *level,
			sta_domain::Error::MissingFacet { level } => *level,
		};

		Self::invalid_field(field.as_str(), err.to_string())
	}
}
