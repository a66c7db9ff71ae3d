use axum::{
	Json, Router,
	extract::{
		Path, Query, State,
		rejection::{JsonRejection, PathRejection, QueryRejection},
	},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use sta_domain::{FacetRow, RatingSummary, Subject, SubjectId, TestId, TestRecord};
use sta_service::{
	AutocompleteRequest, Error as ServiceError, FacetsRequest, FacetsResponse, RecordViewResponse,
	ResolveRequest, ResolveResponse, TestSearchRequest,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/subjects/autocomplete", get(autocomplete))
		.route("/api/subjects/all", get(all_subjects))
		.route("/api/subjects/{id}/filters", get(subject_filters))
		.route("/api/tests", get(list_tests))
		.route("/api/tests/filters", get(test_filters))
		.route("/api/tests/resolve", post(resolve))
		.route("/api/tests/{id}", get(get_test))
		.route("/api/tests/{id}/rating", get(get_rating))
		.route("/api/tests/{id}/view", post(record_view))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn autocomplete(
	State(state): State<AppState>,
	query: Result<Query<AutocompleteRequest>, QueryRejection>,
) -> Result<Json<Vec<Subject>>, ApiError> {
	let Query(req) = query?;
	let response = state.service.autocomplete(req).await?;

	Ok(Json(response))
}

async fn all_subjects(State(state): State<AppState>) -> Result<Json<Vec<Subject>>, ApiError> {
	let response = state.service.all_subjects().await?;

	Ok(Json(response))
}

async fn subject_filters(
	State(state): State<AppState>,
	path: Result<Path<SubjectId>, PathRejection>,
) -> Result<Json<Vec<FacetRow>>, ApiError> {
	let Path(subject_id) = path?;
	let response = state.service.subject_facets(Some(subject_id)).await?;

	Ok(Json(response))
}

async fn test_filters(
	State(state): State<AppState>,
	query: Result<Query<FacetsRequest>, QueryRejection>,
) -> Result<Json<FacetsResponse>, ApiError> {
	let Query(req) = query?;
	let response = state.service.facets(req).await?;

	Ok(Json(response))
}

async fn resolve(
	State(state): State<AppState>,
	payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<Json<ResolveResponse>, ApiError> {
	let Json(req) = payload?;
	let response = state.service.resolve(req).await?;

	Ok(Json(response))
}

async fn list_tests(
	State(state): State<AppState>,
	query: Result<Query<TestSearchRequest>, QueryRejection>,
) -> Result<Json<Vec<TestRecord>>, ApiError> {
	let Query(req) = query?;
	let response = state.service.search_tests(req).await?;

	Ok(Json(response))
}

async fn get_test(
	State(state): State<AppState>,
	path: Result<Path<TestId>, PathRejection>,
) -> Result<Json<TestRecord>, ApiError> {
	let Path(test_id) = path?;
	let response = state.service.get_test(test_id).await?;

	Ok(Json(response))
}

async fn get_rating(
	State(state): State<AppState>,
	path: Result<Path<TestId>, PathRejection>,
) -> Result<Json<RatingSummary>, ApiError> {
	let Path(test_id) = path?;
	let response = state.service.get_rating(test_id).await?;

	Ok(Json(response))
}

async fn record_view(
	State(state): State<AppState>,
	path: Result<Path<TestId>, PathRejection>,
) -> Result<Json<RecordViewResponse>, ApiError> {
	let Path(test_id) = path?;
	let response = state.service.record_view(test_id).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}

	fn invalid_request(message: impl Into<String>) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None)
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message, field } => Self::new(
				StatusCode::BAD_REQUEST,
				"INVALID_REQUEST",
				message,
				field.map(|field| vec![field]),
			),
			ServiceError::NotFound { message } =>
				Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Archive store failure.");

				Self::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"STORAGE_ERROR",
					"The archive store could not complete the request.",
					None,
				)
			},
		}
	}
}
impl From<QueryRejection> for ApiError {
	fn from(rejection: QueryRejection) -> Self {
		Self::invalid_request(rejection.body_text())
	}
}
impl From<PathRejection> for ApiError {
	fn from(rejection: PathRejection) -> Self {
		Self::invalid_request(rejection.body_text())
	}
}
impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		Self::invalid_request(rejection.body_text())
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
