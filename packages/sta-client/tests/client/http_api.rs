use std::{collections::HashMap, net::SocketAddr};

use axum::{
	Json, Router,
	extract::{Path, Query},
	http::StatusCode,
	routing::{get, post},
};
use serde_json::{Value, json};

use sta_client::{ArchiveApi, Error, HttpArchiveApi};
use sta_domain::{FacetLevel, FacetPrefix, FacetValue, ResolveCriteria, Subject, Year};

async fn autocomplete(Query(params): Query<HashMap<String, String>>) -> Json<Vec<Subject>> {
	let subjects = [Subject::new(1, "CS101", "Intro"), Subject::new(2, "MA201", "Calculus")];
	let q = params.get("q").cloned().unwrap_or_default();

	Json(subjects.into_iter().filter(|s| s.matches_query(&q)).collect())
}

async fn filters(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
	let years = if params.get("university").map(String::as_str) == Some("MIT") {
		json!([2023, "unknown"])
	} else {
		json!([])
	};

	Json(json!({
		"universities": ["MIT"],
		"years": years,
		"semesters": [],
		"types": [],
		"next": "year",
	}))
}

async fn resolve(Json(body): Json<Value>) -> Json<Value> {
	if body["type"] == "Final" && body["year"] == "unknown" {
		Json(json!({ "outcome": "found", "test_id": 7 }))
	} else {
		Json(json!({ "outcome": "no_match", "test_id": null }))
	}
}

async fn missing_test(Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
	(
		StatusCode::NOT_FOUND,
		Json(json!({
			"error_code": "NOT_FOUND",
			"message": format!("Test {id} not found."),
			"fields": [],
		})),
	)
}

async fn serve() -> HttpArchiveApi {
	let app = Router::new()
		.route("/api/subjects/autocomplete", get(autocomplete))
		.route("/api/tests/filters", get(filters))
		.route("/api/tests/resolve", post(resolve))
		.route("/api/tests/{id}", get(missing_test));
	let listener =
		tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind listener.");
	let addr: SocketAddr = listener.local_addr().expect("Missing local address.");

	tokio::spawn(async move {
		axum::serve(listener, app).await.expect("Server failed.");
	});

	let cfg = sta_config::Client {
		api_base: format!("http://{addr}/"),
		debounce_ms: 200,
		timeout_ms: 5_000,
	};

	HttpArchiveApi::new(&cfg).expect("Failed to build client.")
}

fn criteria(year: Year) -> ResolveCriteria {
	ResolveCriteria {
		subject_id: 1,
		university: "MIT".to_string(),
		year,
		semester: "Fall".to_string(),
		exam_type: "Final".to_string(),
	}
}

#[tokio::test]
async fn http_api_speaks_the_json_surface() {
	let api = serve().await;
	let subjects = api.search_subjects("calc").await.expect("search");

	assert_eq!(subjects.len(), 1);
	assert_eq!(subjects[0].title, "MA201 - Calculus");

	let prefix = FacetPrefix::default().with_university("MIT");
	let years = api.next_level_facets(1, &prefix).await.expect("facets");

	assert_eq!(years.level, FacetLevel::Year);
	assert_eq!(
		years.values,
		vec![FacetValue::Year(Year::Known(2023)), FacetValue::Year(Year::Unknown)]
	);
	assert_eq!(api.lookup_test(&criteria(Year::Unknown)).await.expect("lookup"), Some(7));
	assert_eq!(api.lookup_test(&criteria(Year::Known(2023))).await.expect("lookup"), None);
}

#[tokio::test]
async fn error_bodies_become_api_errors() {
	let api = serve().await;
	let err = api.get_test(5).await.expect_err("missing test");

	let Error::Api { status, error_code, message } = err else {
		panic!("Expected an API error, got {err:?}.");
	};

	assert_eq!(status, 404);
	assert_eq!(error_code, "NOT_FOUND");
	assert_eq!(message, "Test 5 not found.");
}
